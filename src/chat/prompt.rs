// src/chat/prompt.rs — Assembles the paper-aware chat prompt

use serde_json::Value;

use super::session::PaperContext;

const NOT_AVAILABLE: &str = "N/A";

const PREAMBLE: &str = "You are a specialized AI assistant for space biology research papers. \
You have access to the following research paper information:";

const ANSWER_INSTRUCTIONS: &str = "Please provide a helpful, accurate response based on the \
research paper information provided. If the question is not directly related to this specific \
paper, you can still provide general information about space biology topics, but make it clear \
when you're doing so.";

const FORMATTING_INSTRUCTIONS: &str = "\
IMPORTANT FORMATTING INSTRUCTIONS:
- Use **bold text** for important terms, concepts, and key findings
- Use *italic text* for emphasis and technical terms
- Use bullet points (- or *) for lists and key points
- Use numbered lists (1. 2. 3.) for step-by-step processes
- Structure your response with clear headings and sections
- Make the response easy to read and well-formatted";

const GUIDELINES: &str = "\
Guidelines:
1. Be specific and reference the paper when relevant
2. Use scientific terminology appropriately
3. Provide clear explanations
4. If you don't have enough information from the paper, say so
5. Keep responses concise but informative
6. Focus on space biology and research methodology when relevant
7. Use proper markdown formatting for better readability";

/// Build the prompt sent to the generation provider.
///
/// Sections (in order):
///   1. Preamble
///   2. Paper fields (title, category, authors, keywords, abstract, conclusion, PMCID)
///   3. The user's question, verbatim
///   4. Answer, formatting and style instructions
pub fn build_chat_prompt(user_message: &str, context: &PaperContext) -> String {
    let mut prompt = String::with_capacity(2048);

    prompt.push_str(PREAMBLE);
    prompt.push_str("\n\n");

    let fields = [
        ("Title", format_scalar(context.get("title"))),
        ("Category", format_scalar(context.get("category"))),
        ("Authors", format_list(context.get("authors"))),
        ("Keywords", format_list(context.get("keywords"))),
        ("Abstract", format_scalar(context.get("abstract"))),
        ("Conclusion", format_scalar(context.get("conclusion"))),
        ("PMCID", format_scalar(context.get("pmcid"))),
    ];
    for (label, value) in fields {
        prompt.push_str(&format!("{label}: {value}\n"));
    }

    prompt.push_str(&format!("\nUser Question: {user_message}\n\n"));
    prompt.push_str(ANSWER_INSTRUCTIONS);
    prompt.push_str("\n\n");
    prompt.push_str(FORMATTING_INSTRUCTIONS);
    prompt.push_str("\n\n");
    prompt.push_str(GUIDELINES);
    prompt.push('\n');

    prompt
}

fn format_scalar(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => NOT_AVAILABLE.to_string(),
        Some(Value::String(s)) if s.is_empty() => NOT_AVAILABLE.to_string(),
        Some(v) => display_value(v),
    }
}

/// Comma-join a list field. Objects contribute their `name` or `term`.
pub fn format_list(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => NOT_AVAILABLE.to_string(),
        Some(Value::Array(items)) if items.is_empty() => NOT_AVAILABLE.to_string(),
        Some(Value::String(s)) if s.is_empty() => NOT_AVAILABLE.to_string(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::Object(obj) => obj
                    .get("name")
                    .or_else(|| obj.get("term"))
                    .map(display_value)
                    .unwrap_or_else(|| item.to_string()),
                other => display_value(other),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => display_value(other),
    }
}

/// Strings without JSON quotes; everything else in JSON form.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
