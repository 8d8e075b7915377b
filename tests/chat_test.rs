// tests/chat_test.rs — Integration test: chat flow with a mock generator

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use bioastra::chat::{ChatOrchestrator, PaperContext, Role, SessionStore};
use bioastra::infra::errors::BioAstraError;
use bioastra::provider::TextGenerator;

/// Records every prompt and replies with canned text. No network.
struct MockGenerator {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    fn id(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn generate(&self, prompt: &str) -> Result<String, BioAstraError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

fn paper_context() -> PaperContext {
    json!({
        "title": "Microgravity Effects",
        "category": "Cell Biology",
        "authors": [{"name": "A. Smith"}, "B. Jones"],
        "keywords": [{"term": "microgravity"}, "bone"],
        "pmcid": "PMC1"
    })
    .as_object()
    .unwrap()
    .clone()
}

#[tokio::test]
async fn test_chat_round_trip_records_and_renders() {
    let store = Arc::new(SessionStore::default());
    let generator = Arc::new(MockGenerator::new(
        "**Key finding**: cells adapt.\n- faster\n- smaller",
    ));
    let orchestrator = ChatOrchestrator::new(store.clone(), Some(generator.clone()));

    let reply = orchestrator
        .handle_chat(None, "What did they find?", paper_context())
        .await
        .unwrap();

    let prompt = generator.last_prompt();
    assert!(prompt.contains("Title: Microgravity Effects"));
    assert!(prompt.contains("Category: Cell Biology"));
    assert!(prompt.contains("Authors: A. Smith, B. Jones"));
    assert!(prompt.contains("Keywords: microgravity, bone"));
    assert!(prompt.contains("Abstract: N/A"));
    assert!(prompt.contains("User Question: What did they find?"));

    assert_eq!(
        reply.response,
        "<strong>Key finding</strong>: cells adapt.<br><ul><br><li>faster</li><br><li>smaller</li><br></ul>"
    );
    assert_eq!(
        reply.raw_response,
        "**Key finding**: cells adapt.\n- faster\n- smaller"
    );

    let history = store.get_history(&reply.session_id);
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, Role::Question);
    assert_eq!(history[0].content, "What did they find?");
    assert_eq!(history[0].context_snapshot["title"], "Microgravity Effects");
    assert_eq!(history[1].role, Role::Answer);
    assert_eq!(history[1].content, reply.raw_response);
}

#[tokio::test]
async fn test_follow_up_resumes_session() {
    let store = Arc::new(SessionStore::default());
    let orchestrator =
        ChatOrchestrator::new(store.clone(), Some(Arc::new(MockGenerator::new("ok"))));

    let first = orchestrator
        .handle_chat(None, "one", PaperContext::new())
        .await
        .unwrap();
    let second = orchestrator
        .handle_chat(Some(&first.session_id), "two", PaperContext::new())
        .await
        .unwrap();

    assert_eq!(first.session_id, second.session_id);
    assert_eq!(store.len(), 1);
    assert_eq!(store.get_history(&first.session_id).len(), 4);
}

#[tokio::test]
async fn test_validation_error_leaves_store_untouched() {
    let store = Arc::new(SessionStore::default());
    let generator = Arc::new(MockGenerator::new("unused"));
    let orchestrator = ChatOrchestrator::new(store.clone(), Some(generator.clone()));

    let err = orchestrator
        .handle_chat(None, "", paper_context())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "validation");
    assert!(store.is_empty());
    assert!(generator.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unconfigured_generator_is_configuration_error() {
    let store = Arc::new(SessionStore::default());
    let orchestrator = ChatOrchestrator::new(store.clone(), None);

    let err = orchestrator
        .handle_chat(None, "hello", PaperContext::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "configuration");
    assert!(store.is_empty());
}
