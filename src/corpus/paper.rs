// src/corpus/paper.rs — Research paper record and dataset normalisation

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_STUDY_YEAR: i32 = 2023;
pub const DEFAULT_AUTHOR: &str = "Research Team";
const DEFAULT_CATEGORY: &str = "Space Biology";
const DEFAULT_CONCLUSION: &str = "Research conclusions and implications.";
const DEFAULT_RESULTS: &str = "Research results and findings from the study.";
const NCBI_HOME: &str = "https://www.ncbi.nlm.nih.gov/";
const NASA_SPACE_BIOLOGY: &str = "https://www.nasa.gov/space-biology";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphAuthor {
    pub name: String,
    #[serde(default)]
    pub expertise: Vec<String>,
    #[serde(default)]
    pub publications: u32,
    #[serde(default)]
    pub collaborations: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphKeyword {
    pub term: String,
    #[serde(default)]
    pub frequency: u32,
    #[serde(default)]
    pub related_terms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphCategory {
    pub name: String,
    #[serde(default)]
    pub subcategories: Vec<String>,
    #[serde(default)]
    pub related_categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    #[serde(default)]
    pub authors: Vec<GraphAuthor>,
    #[serde(default)]
    pub keywords: Vec<GraphKeyword>,
    #[serde(default)]
    pub category: GraphCategory,
}

/// A paper as served by `/api/research/{pmcid}`. Read-only after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperRecord {
    pub pmcid: String,
    pub title: String,
    /// Plain names or author objects, as they appear in the dataset.
    pub authors: Vec<Value>,
    pub keywords: Vec<String>,
    pub category: String,
    pub year: i32,
    pub doi: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub results: String,
    pub conclusion: String,
    pub explore_more: Vec<Link>,
    pub knowledge_graph: KnowledgeGraph,
}

impl PaperRecord {
    /// Normalise one dataset object. Accepts both the raw export shape
    /// (`PMCId`, `Title`, `Study Year`, ...) and the already-normalised
    /// lowercase shape. Returns `None` when the object has no id.
    pub fn from_json(obj: &Map<String, Value>) -> Option<Self> {
        let pmcid = first(obj, &["PMCId", "pmcid"])
            .map(scalar_string)
            .filter(|id| !id.is_empty())?;

        let category = first_string(obj, &["Category", "category"]).unwrap_or_default();
        let keywords = first(obj, &["Keywords", "keywords"])
            .map(string_list)
            .unwrap_or_default();
        let link = first_string(obj, &["Link", "link"]).unwrap_or_else(|| NCBI_HOME.to_string());

        let explore_more = obj
            .get("explore_more")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_else(|| default_links(&link));

        let knowledge_graph = obj
            .get("knowledge_graph")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_else(|| default_graph(&category, &keywords));

        Some(Self {
            doi: first_string(obj, &["doi", "DOI"])
                .unwrap_or_else(|| format!("10.1038/spacebio.{pmcid}")),
            title: first_string(obj, &["Title", "title"]).unwrap_or_default(),
            authors: first(obj, &["Authors", "authors"])
                .map(|v| match v {
                    Value::Array(items) => items.clone(),
                    Value::Null => Vec::new(),
                    other => vec![other.clone()],
                })
                .unwrap_or_default(),
            year: first(obj, &["Study Year", "year", "Year"])
                .and_then(parse_year)
                .unwrap_or(DEFAULT_STUDY_YEAR),
            abstract_text: first_string(obj, &["Abstract", "abstract"]).unwrap_or_default(),
            results: first_string(obj, &["results", "Results"])
                .unwrap_or_else(|| DEFAULT_RESULTS.to_string()),
            conclusion: first_string(obj, &["Conclusion", "conclusion"])
                .unwrap_or_else(|| DEFAULT_CONCLUSION.to_string()),
            pmcid,
            category,
            keywords,
            explore_more,
            knowledge_graph,
        })
    }

    /// First knowledge-graph author, or the generic team name.
    pub fn lead_author(&self) -> &str {
        self.knowledge_graph
            .authors
            .first()
            .map(|a| a.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_AUTHOR)
    }
}

fn default_links(link: &str) -> Vec<Link> {
    vec![
        Link {
            title: "NCBI Publication".into(),
            url: link.to_string(),
        },
        Link {
            title: "Related NASA Research".into(),
            url: NASA_SPACE_BIOLOGY.into(),
        },
    ]
}

fn default_graph(category: &str, keywords: &[String]) -> KnowledgeGraph {
    let category = if category.is_empty() {
        DEFAULT_CATEGORY
    } else {
        category
    };
    KnowledgeGraph {
        authors: vec![GraphAuthor {
            name: DEFAULT_AUTHOR.into(),
            expertise: vec![category.to_string()],
            publications: 1,
            collaborations: 1,
        }],
        keywords: keywords
            .iter()
            .map(|term| GraphKeyword {
                term: term.clone(),
                frequency: 1,
                related_terms: Vec::new(),
            })
            .collect(),
        category: GraphCategory {
            name: category.to_string(),
            subcategories: vec![category.to_string()],
            related_categories: vec!["Space Biology".into(), "Research".into()],
        },
    }
}

pub(crate) fn first<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

pub(crate) fn first_string(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    first(obj, keys).map(scalar_string)
}

/// Strings as-is, everything else in its JSON form.
pub(crate) fn scalar_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

/// A keyword list may arrive as an array or as one comma-separated string.
pub(crate) fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(scalar_string)
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

pub(crate) fn parse_year(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_normalises_export_shape() {
        let raw = obj(json!({
            "PMCId": "PMC123",
            "Title": "Bone loss in spaceflight",
            "Authors": ["A. Smith", "B. Jones"],
            "Keywords": ["bone", "microgravity"],
            "Category": "Musculoskeletal",
            "Study Year": "2019",
            "Abstract": "We studied bones.",
            "Link": "https://example.org/PMC123"
        }));
        let paper = PaperRecord::from_json(&raw).unwrap();

        assert_eq!(paper.pmcid, "PMC123");
        assert_eq!(paper.title, "Bone loss in spaceflight");
        assert_eq!(paper.authors, vec![json!("A. Smith"), json!("B. Jones")]);
        assert_eq!(paper.keywords, vec!["bone", "microgravity"]);
        assert_eq!(paper.year, 2019);
        assert_eq!(paper.doi, "10.1038/spacebio.PMC123");
        assert_eq!(paper.conclusion, DEFAULT_CONCLUSION);
        assert_eq!(paper.explore_more[0].url, "https://example.org/PMC123");
        assert_eq!(paper.explore_more[1].url, NASA_SPACE_BIOLOGY);
        assert_eq!(paper.knowledge_graph.keywords.len(), 2);
        assert_eq!(paper.knowledge_graph.category.name, "Musculoskeletal");
        assert_eq!(paper.lead_author(), "Research Team");
    }

    #[test]
    fn test_missing_id_is_skipped() {
        assert!(PaperRecord::from_json(&obj(json!({"Title": "No id"}))).is_none());
        assert!(PaperRecord::from_json(&obj(json!({"pmcid": ""}))).is_none());
    }

    #[test]
    fn test_defaults_when_fields_absent() {
        let paper = PaperRecord::from_json(&obj(json!({"pmcid": "PMC9"}))).unwrap();
        assert_eq!(paper.year, DEFAULT_STUDY_YEAR);
        assert_eq!(paper.explore_more[0].url, NCBI_HOME);
        assert_eq!(paper.knowledge_graph.category.name, "Space Biology");
        assert!(paper.keywords.is_empty());
    }

    #[test]
    fn test_prenormalised_shape_keeps_graph() {
        let raw = obj(json!({
            "pmcid": "PMC7",
            "title": "Plants",
            "year": 2021,
            "abstract": "Roots.",
            "doi": "10.1/custom",
            "knowledge_graph": {
                "authors": [{"name": "Dr. Root"}],
                "keywords": [],
                "category": {"name": "Botany"}
            }
        }));
        let paper = PaperRecord::from_json(&raw).unwrap();
        assert_eq!(paper.doi, "10.1/custom");
        assert_eq!(paper.year, 2021);
        assert_eq!(paper.abstract_text, "Roots.");
        assert_eq!(paper.lead_author(), "Dr. Root");
    }

    #[test]
    fn test_keyword_string_is_split() {
        assert_eq!(
            string_list(&json!("bone, muscle ,  ,radiation")),
            vec!["bone", "muscle", "radiation"]
        );
    }

    #[test]
    fn test_serialises_abstract_field_name() {
        let paper = PaperRecord::from_json(&obj(json!({"pmcid": "P", "Abstract": "x"}))).unwrap();
        let json = serde_json::to_value(&paper).unwrap();
        assert_eq!(json["abstract"], "x");
        assert!(json.get("abstract_text").is_none());
    }

    #[test]
    fn test_parse_year_variants() {
        assert_eq!(parse_year(&json!(2020)), Some(2020));
        assert_eq!(parse_year(&json!(" 2018 ")), Some(2018));
        assert_eq!(parse_year(&json!("unknown")), None);
        assert_eq!(parse_year(&json!(null)), None);
    }
}
