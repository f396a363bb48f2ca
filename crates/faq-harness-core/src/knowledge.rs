//! FAQ knowledge file parser.
//!
//! Knowledge files are plain UTF-8 text. Blank lines and lines starting
//! with `#` are ignored. Two grammars are understood:
//!
//! **Two-line** ([`Grammar::TwoLine`], the default):
//!
//! ```text
//! # Identity
//! Q: What is your name? | Who are you?
//! A: I am Amedeo's assistant.
//! ```
//!
//! The answer must be on the next non-blank, non-comment line. A question
//! not followed by an `A:` line is dropped.
//!
//! **Inline** ([`Grammar::Inline`]):
//!
//! ```text
//! Q: What is your name? | Who are you? A: I am Amedeo's assistant.
//! ```
//!
//! The line is split at the first `A:` after the `Q:` marker.
//!
//! Phrasings are separated by `|`. Parsing never fails; malformed entries
//! are skipped and reported through [`ParseOutput::discarded_lines`].

use serde::Deserialize;

use crate::models::Record;

const QUESTION_MARKER: &str = "Q:";
const ANSWER_MARKER: &str = "A:";
const PHRASING_SEPARATOR: char = '|';

/// Line grammar of a knowledge file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grammar {
    /// `Q:` line followed by an `A:` line.
    #[default]
    TwoLine,
    /// `Q: ... A: ...` on a single line.
    Inline,
}

/// Result of parsing a knowledge file.
#[derive(Debug, Clone, Default)]
pub struct ParseOutput {
    /// Records in file order.
    pub records: Vec<Record>,
    /// 1-based line numbers of `Q:` lines that produced no record.
    pub discarded_lines: Vec<usize>,
}

/// Parse knowledge text into records, in file order.
pub fn parse_knowledge(text: &str, grammar: Grammar) -> Vec<Record> {
    parse_knowledge_detailed(text, grammar).records
}

/// Parse knowledge text, also reporting which question lines were dropped.
pub fn parse_knowledge_detailed(text: &str, grammar: Grammar) -> ParseOutput {
    match grammar {
        Grammar::TwoLine => parse_two_line(text),
        Grammar::Inline => parse_inline(text),
    }
}

/// Iterate over meaningful lines as `(line_number, trimmed_line)`.
fn content_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn parse_two_line(text: &str) -> ParseOutput {
    let mut out = ParseOutput::default();
    // (line number, raw phrasings) of a question waiting for its answer
    let mut pending: Option<(usize, &str)> = None;

    for (line_no, line) in content_lines(text) {
        if let Some(rest) = line.strip_prefix(QUESTION_MARKER) {
            if let Some((prev_line, _)) = pending.replace((line_no, rest)) {
                out.discarded_lines.push(prev_line);
            }
        } else if let Some(answer) = line.strip_prefix(ANSWER_MARKER) {
            if let Some((q_line, phrasings)) = pending.take() {
                match Record::new(phrasings.split(PHRASING_SEPARATOR), answer) {
                    Some(record) => out.records.push(record),
                    None => out.discarded_lines.push(q_line),
                }
            }
        } else if let Some((prev_line, _)) = pending.take() {
            out.discarded_lines.push(prev_line);
        }
    }

    if let Some((q_line, _)) = pending {
        out.discarded_lines.push(q_line);
    }

    out
}

fn parse_inline(text: &str) -> ParseOutput {
    let mut out = ParseOutput::default();

    for (line_no, line) in content_lines(text) {
        let Some(rest) = line.strip_prefix(QUESTION_MARKER) else {
            continue;
        };

        let record = rest.split_once(ANSWER_MARKER).and_then(|(phrasings, answer)| {
            Record::new(phrasings.split(PHRASING_SEPARATOR), answer)
        });

        match record {
            Some(record) => out.records.push(record),
            None => out.discarded_lines.push(line_no),
        }
    }

    out
}
