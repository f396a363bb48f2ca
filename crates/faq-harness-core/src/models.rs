//! Core data models shared by the parser and the retriever.

/// One knowledge-base entry: a set of question phrasings and their answer.
///
/// Records are only built through [`Record::new`], which enforces that the
/// answer is non-empty and that at least one non-empty phrasing exists.
/// They are never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    questions: Vec<String>,
    answer: String,
    match_text: String,
}

impl Record {
    /// Build a record from raw phrasings and an answer.
    ///
    /// Phrasings and the answer are trimmed; empty phrasings are dropped.
    /// Returns `None` when no phrasing survives or the answer is empty.
    pub fn new<I, S>(questions: I, answer: &str) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let questions: Vec<String> = questions
            .into_iter()
            .map(|q| q.as_ref().trim().to_string())
            .filter(|q| !q.is_empty())
            .collect();
        let answer = answer.trim();

        if questions.is_empty() || answer.is_empty() {
            return None;
        }

        let match_text = format!("{} {}", questions[0], answer);
        Some(Self {
            questions,
            answer: answer.to_string(),
            match_text,
        })
    }

    /// All phrasings, in file order.
    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    /// The canonical (first) phrasing.
    pub fn canonical_question(&self) -> &str {
        &self.questions[0]
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Canonical question and answer joined by a space; used for word overlap.
    pub fn match_text(&self) -> &str {
        &self.match_text
    }
}
