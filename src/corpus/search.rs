// src/corpus/search.rs — Substring search over papers and search datasets

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::paper::{first, first_string, parse_year, string_list, PaperRecord};

const ABSTRACT_PREVIEW_CHARS: usize = 200;

/// Request body for `POST /api/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Search dataset to include besides the papers; `all` includes every one.
    #[serde(rename = "type", default = "default_search_type")]
    pub search_type: String,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub filters: SearchFilters,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            search_type: default_search_type(),
            query: String::new(),
            filters: SearchFilters::default(),
        }
    }
}

fn default_search_type() -> String {
    "all".into()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Number or string; compared by string form.
    #[serde(default)]
    pub year: Option<Value>,
    #[serde(default)]
    pub category: Option<String>,
}

impl SearchFilters {
    fn year(&self) -> Option<String> {
        match self.year.as_ref()? {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.trim().to_string()),
            other => Some(other.to_string()),
        }
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }

    fn admits(&self, year: Option<i32>, category: Option<&str>) -> bool {
        if let Some(wanted) = self.year() {
            if year.map(|y| y.to_string()).as_deref() != Some(wanted.as_str()) {
                return false;
            }
        }
        if let Some(wanted) = self.category() {
            if category != Some(wanted) {
                return false;
            }
        }
        true
    }
}

/// One entry of a search dataset (`SEARCHES/<type>.json`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchEntry {
    pub pmcid: Option<String>,
    pub title: String,
    pub author: Option<String>,
    pub year: Option<i32>,
    pub category: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub keywords: Vec<String>,
}

impl SearchEntry {
    pub fn from_json(obj: &Map<String, Value>) -> Self {
        Self {
            pmcid: first_string(obj, &["pmcid", "PMCId"]),
            title: first_string(obj, &["title", "Title"]).unwrap_or_default(),
            author: first_string(obj, &["author", "Author"]),
            year: first(obj, &["year", "Year"]).and_then(parse_year),
            category: first_string(obj, &["category", "Category"]),
            abstract_text: first_string(obj, &["abstract", "Abstract"]).unwrap_or_default(),
            keywords: first(obj, &["keywords", "Keywords"])
                .map(string_list)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub pmcid: Option<String>,
    pub title: String,
    pub author: Option<String>,
    pub year: Option<i32>,
    pub category: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_preview: String,
    pub keywords: Vec<String>,
}

/// Case-insensitive substring match on title, abstract, or any keyword.
/// A blank query matches everything.
fn matches_query(query: &str, title: &str, abstract_text: &str, keywords: &[String]) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    title.to_lowercase().contains(&needle)
        || abstract_text.to_lowercase().contains(&needle)
        || keywords.iter().any(|k| k.to_lowercase().contains(&needle))
}

fn preview(text: &str) -> String {
    if text.chars().count() > ABSTRACT_PREVIEW_CHARS {
        let head: String = text.chars().take(ABSTRACT_PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

pub(crate) fn search_papers<'a>(
    papers: impl Iterator<Item = &'a PaperRecord>,
    request: &SearchRequest,
) -> Vec<SearchHit> {
    papers
        .filter(|p| matches_query(&request.query, &p.title, &p.abstract_text, &p.keywords))
        .filter(|p| request.filters.admits(Some(p.year), Some(p.category.as_str())))
        .map(|p| SearchHit {
            pmcid: Some(p.pmcid.clone()),
            title: p.title.clone(),
            author: Some(p.lead_author().to_string()),
            year: Some(p.year),
            category: Some(p.category.clone()),
            abstract_preview: preview(&p.abstract_text),
            keywords: p.keywords.clone(),
        })
        .collect()
}

pub(crate) fn search_entries<'a>(
    entries: impl Iterator<Item = &'a SearchEntry>,
    request: &SearchRequest,
) -> Vec<SearchHit> {
    entries
        .filter(|e| matches_query(&request.query, &e.title, &e.abstract_text, &e.keywords))
        .filter(|e| request.filters.admits(e.year, e.category.as_deref()))
        .map(|e| SearchHit {
            pmcid: e.pmcid.clone(),
            title: e.title.clone(),
            author: e.author.clone(),
            year: e.year,
            category: e.category.clone(),
            abstract_preview: preview(&e.abstract_text),
            keywords: e.keywords.clone(),
        })
        .collect()
}
