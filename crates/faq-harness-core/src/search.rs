//! Keyword retrieval over knowledge records.
//!
//! Scoring is a hand-tuned integer heuristic:
//!
//! 1. **Phrasing containment**: +100 for every phrasing `q` where the
//!    lower-cased query contains `q` or `q` contains the query.
//! 2. **Word overlap**: +10 for every distinct `\w+` token shared by the
//!    query and the record's match text (canonical question + answer).
//!
//! Records scoring 0 are never returned. Results are sorted by score,
//! descending; equal scores keep file order.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::Record;

/// Default retrieval depth, and the fixed depth used by [`get_context`].
pub const DEFAULT_TOP_K: usize = 3;

/// Score added per matching phrasing.
pub const PHRASING_MATCH_SCORE: u32 = 100;

/// Score added per shared word token.
pub const WORD_OVERLAP_SCORE: u32 = 10;

/// Default rendering of one context block.
pub const DEFAULT_CONTEXT_TEMPLATE: &str = "[Info {n}] {answer}";

const CONTEXT_SEPARATOR: &str = "\n\n";

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("word pattern is a valid regex"));

/// A record paired with its retrieval score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredRecord<'a> {
    pub record: &'a Record,
    pub score: u32,
}

/// Renders retrieved answers into numbered context blocks.
///
/// `{n}` is replaced by the 1-based rank and `{answer}` by the answer text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextTemplate {
    template: String,
}

impl ContextTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn render(&self, n: usize, answer: &str) -> String {
        self.template
            .replace("{n}", &n.to_string())
            .replace("{answer}", answer)
    }
}

impl Default for ContextTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_TEMPLATE)
    }
}

/// Lower-cased query with its token set, computed once per retrieval.
struct PreparedQuery {
    lower: String,
    words: HashSet<String>,
}

impl PreparedQuery {
    fn new(query: &str) -> Self {
        let lower = query.trim().to_lowercase();
        let words = tokenize(&lower);
        Self { lower, words }
    }

    fn score(&self, record: &Record) -> u32 {
        if self.lower.is_empty() {
            return 0;
        }

        let mut score = 0;

        for q in record.questions() {
            let q = q.to_lowercase();
            if q.contains(&self.lower) || self.lower.contains(&q) {
                score += PHRASING_MATCH_SCORE;
            }
        }

        let record_words = tokenize(&record.match_text().to_lowercase());
        let overlap = self.words.intersection(&record_words).count() as u32;
        score + overlap * WORD_OVERLAP_SCORE
    }
}

/// Split text into its set of `\w+` tokens.
pub fn tokenize(text: &str) -> HashSet<String> {
    WORD.find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Relevance of `record` for `query`. A blank query scores 0.
pub fn score(query: &str, record: &Record) -> u32 {
    PreparedQuery::new(query).score(record)
}

/// Return up to `top_k` records with a positive score, best first.
///
/// The sort is stable, so records with equal scores stay in file order.
pub fn retrieve<'a>(records: &'a [Record], query: &str, top_k: usize) -> Vec<ScoredRecord<'a>> {
    let prepared = PreparedQuery::new(query);

    let mut scored: Vec<ScoredRecord<'a>> = records
        .iter()
        .map(|record| ScoredRecord {
            record,
            score: prepared.score(record),
        })
        .filter(|s| s.score > 0)
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(top_k);
    scored
}

/// Render already-retrieved records as numbered blocks separated by a blank line.
pub fn build_context(results: &[ScoredRecord<'_>], template: &ContextTemplate) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, s)| template.render(i + 1, s.record.answer()))
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}

/// Retrieve the top [`DEFAULT_TOP_K`] records and render them as context.
///
/// Returns an empty string when nothing matches. Callers with their own
/// depth use [`retrieve`] followed by [`build_context`].
pub fn get_context(records: &[Record], query: &str, template: &ContextTemplate) -> String {
    build_context(&retrieve(records, query, DEFAULT_TOP_K), template)
}
