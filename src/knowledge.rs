//! Knowledge file loading and the process-wide record cache.
//!
//! Loading never fails from the caller's point of view: a missing or
//! unreadable file is logged and produces an empty knowledge base, so the
//! server keeps answering (with the fallback message) instead of crashing.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use faq_harness_core::knowledge::{parse_knowledge_detailed, Grammar, ParseOutput};
use faq_harness_core::models::Record;

use crate::config::KnowledgeConfig;

/// Read and parse a knowledge file, propagating I/O and decode errors.
pub fn read_knowledge(path: &Path, grammar: Grammar) -> Result<ParseOutput> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read knowledge file: {}", path.display()))?;
    Ok(parse_knowledge_detailed(&content, grammar))
}

/// Load records from `path`, degrading to an empty list on any failure.
pub fn load_records(path: &Path, grammar: Grammar) -> Vec<Record> {
    match read_knowledge(path, grammar) {
        Ok(parsed) => {
            if !parsed.discarded_lines.is_empty() {
                tracing::debug!(
                    lines = ?parsed.discarded_lines,
                    "Skipped questions without a usable answer"
                );
            }
            tracing::info!(
                records = parsed.records.len(),
                path = %path.display(),
                "Knowledge base loaded"
            );
            parsed.records
        }
        Err(e) => {
            tracing::error!("Error loading knowledge: {:#}", e);
            Vec::new()
        }
    }
}

/// Lazily loaded, read-only set of knowledge records.
///
/// The file is read on the first call to [`KnowledgeCache::records`];
/// concurrent first calls block on the same initialization and the file is
/// read exactly once. There is no reload.
#[derive(Debug)]
pub struct KnowledgeCache {
    path: PathBuf,
    grammar: Grammar,
    records: OnceLock<Vec<Record>>,
}

impl KnowledgeCache {
    pub fn new(path: impl Into<PathBuf>, grammar: Grammar) -> Self {
        Self {
            path: path.into(),
            grammar,
            records: OnceLock::new(),
        }
    }

    pub fn from_config(config: &KnowledgeConfig) -> Self {
        Self::new(&config.path, config.grammar)
    }

    /// A cache that is already populated; never touches the filesystem.
    pub fn preloaded(records: Vec<Record>) -> Self {
        Self {
            path: PathBuf::new(),
            grammar: Grammar::default(),
            records: OnceLock::from(records),
        }
    }

    /// Load the knowledge file now and return the record count.
    ///
    /// The server calls this before accepting connections so that the
    /// blocking file read never runs on a request's worker thread.
    pub fn preload(&self) -> usize {
        self.records().len()
    }

    /// Records, loading the file on first call. The read is blocking.
    pub fn records(&self) -> &[Record] {
        self.records
            .get_or_init(|| load_records(&self.path, self.grammar))
    }

    pub fn is_loaded(&self) -> bool {
        self.records.get().is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_records_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("faq.txt");
        fs::write(&path, "Q: What is your name?\nA: I am Amedeo's assistant.\n").unwrap();

        let records = load_records(&path, Grammar::TwoLine);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].answer(), "I am Amedeo's assistant.");
    }

    #[test]
    fn test_missing_file_yields_no_records() {
        let records = load_records(Path::new("/nonexistent/faq.txt"), Grammar::TwoLine);
        assert!(records.is_empty());
    }

    #[test]
    fn test_invalid_utf8_yields_no_records() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("faq.txt");
        fs::write(&path, [0x51, 0x3a, 0xff, 0xfe, 0x0a]).unwrap();

        assert!(read_knowledge(&path, Grammar::TwoLine).is_err());
        assert!(load_records(&path, Grammar::TwoLine).is_empty());
    }

    #[test]
    fn test_cache_loads_once() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("faq.txt");
        fs::write(&path, "Q: one\nA: first\n").unwrap();

        let cache = KnowledgeCache::new(&path, Grammar::TwoLine);
        assert!(!cache.is_loaded());
        assert_eq!(cache.records().len(), 1);
        assert!(cache.is_loaded());

        // later edits are not picked up
        fs::write(&path, "Q: one\nA: first\nQ: two\nA: second\n").unwrap();
        assert_eq!(cache.records().len(), 1);
    }

    #[test]
    fn test_preload_reads_file_before_first_request() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("faq.txt");
        fs::write(&path, "Q: one\nA: first\nQ: two\nA: second\n").unwrap();

        let cache = KnowledgeCache::new(&path, Grammar::TwoLine);
        assert_eq!(cache.preload(), 2);
        assert!(cache.is_loaded());

        fs::remove_file(&path).unwrap();
        assert_eq!(cache.records().len(), 2);
    }

    #[test]
    fn test_cache_concurrent_first_access() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("faq.txt");
        fs::write(&path, "Q: one\nA: first\nQ: two\nA: second\n").unwrap();

        let cache = KnowledgeCache::new(&path, Grammar::TwoLine);
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| assert_eq!(cache.records().len(), 2));
            }
        });
    }

    #[test]
    fn test_preloaded_cache() {
        let record = Record::new(["q"], "a").unwrap();
        let cache = KnowledgeCache::preloaded(vec![record]);
        assert!(cache.is_loaded());
        assert_eq!(cache.records().len(), 1);
    }
}
