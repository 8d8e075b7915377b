// src/corpus/mod.rs — Read-only research paper corpus loaded at startup
//
// RESEARCH_PAPER_DATA/*.json holds papers (an array of dataset items, or a
// single normalised record per file). SEARCHES/<type>.json holds extra
// search datasets keyed by file stem.

pub mod paper;
pub mod search;

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use crate::infra::errors::BioAstraError;
pub use paper::PaperRecord;
pub use search::{SearchEntry, SearchFilters, SearchHit, SearchRequest};

#[derive(Debug, Default)]
pub struct Corpus {
    papers: BTreeMap<String, PaperRecord>,
    search_data: BTreeMap<String, Vec<SearchEntry>>,
}

impl Corpus {
    pub fn new(
        papers: impl IntoIterator<Item = PaperRecord>,
        search_data: BTreeMap<String, Vec<SearchEntry>>,
    ) -> Self {
        Self {
            papers: papers.into_iter().map(|p| (p.pmcid.clone(), p)).collect(),
            search_data,
        }
    }

    /// Load both directories. A missing directory yields an empty section.
    pub fn load(research_dir: &Path, searches_dir: &Path) -> Result<Self, BioAstraError> {
        let mut papers = BTreeMap::new();
        for path in json_files(research_dir)? {
            match read_json(&path)? {
                Value::Array(items) => {
                    for item in items.iter().filter_map(Value::as_object) {
                        if let Some(paper) = PaperRecord::from_json(item) {
                            papers.insert(paper.pmcid.clone(), paper);
                        }
                    }
                }
                Value::Object(obj) => {
                    if let Some(paper) = PaperRecord::from_json(&obj) {
                        papers.insert(paper.pmcid.clone(), paper);
                    }
                }
                _ => tracing::warn!("Ignoring {}: not an object or array", path.display()),
            }
        }

        let mut search_data = BTreeMap::new();
        for path in json_files(searches_dir)? {
            let Some(search_type) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let entries: Vec<SearchEntry> = match read_json(&path)? {
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_object)
                    .map(SearchEntry::from_json)
                    .collect(),
                _ => {
                    tracing::warn!("Ignoring {}: search data must be an array", path.display());
                    continue;
                }
            };
            search_data.insert(search_type.to_string(), entries);
        }

        let corpus = Self {
            papers,
            search_data,
        };
        tracing::info!(
            papers = corpus.papers.len(),
            search_types = corpus.search_data.len(),
            categories = corpus.categories().len(),
            "Corpus loaded"
        );
        Ok(corpus)
    }

    pub fn len(&self) -> usize {
        self.papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }

    pub fn get(&self, pmcid: &str) -> Result<&PaperRecord, BioAstraError> {
        self.papers
            .get(pmcid)
            .ok_or_else(|| BioAstraError::not_found("Research paper"))
    }

    /// The first `n` papers in id order.
    pub fn sample(&self, n: usize) -> Vec<&PaperRecord> {
        self.papers.values().take(n).collect()
    }

    pub fn search_types(&self) -> Vec<String> {
        self.search_data.keys().cloned().collect()
    }

    /// Papers first (id order), then matching search-dataset entries.
    pub fn search(&self, request: &SearchRequest) -> Vec<SearchHit> {
        let mut hits = search::search_papers(self.papers.values(), request);
        for (search_type, entries) in &self.search_data {
            if request.search_type != "all" && *search_type != request.search_type {
                continue;
            }
            hits.extend(search::search_entries(entries.iter(), request));
        }
        tracing::debug!(
            query = %request.query,
            search_type = %request.search_type,
            hits = hits.len(),
            "Search completed"
        );
        hits
    }

    /// Sorted, de-duplicated categories across papers and search data.
    pub fn categories(&self) -> Vec<String> {
        let from_papers = self.papers.values().map(|p| p.category.as_str());
        let from_searches = self
            .search_data
            .values()
            .flatten()
            .filter_map(|e| e.category.as_deref());
        from_papers
            .chain(from_searches)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// De-duplicated years, newest first.
    pub fn years(&self) -> Vec<i32> {
        let from_papers = self.papers.values().map(|p| p.year);
        let from_searches = self.search_data.values().flatten().filter_map(|e| e.year);
        from_papers
            .chain(from_searches)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .rev()
            .collect()
    }
}

fn json_files(dir: &Path) -> Result<Vec<PathBuf>, BioAstraError> {
    if !dir.is_dir() {
        tracing::warn!("Corpus directory {} not found; skipping", dir.display());
        return Ok(Vec::new());
    }
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    Ok(files)
}

fn read_json(path: &Path) -> Result<Value, BioAstraError> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| BioAstraError::Corpus {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
