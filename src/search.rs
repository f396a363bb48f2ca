//! `faq search`: show how the retriever ranks records for a query.

use anyhow::Result;
use faq_harness_core::search::retrieve;

use crate::config::Config;
use crate::knowledge::load_records;

pub fn run_search(config: &Config, query: &str, limit: Option<usize>) -> Result<()> {
    let records = load_records(&config.knowledge.path, config.knowledge.grammar);
    let limit = limit.unwrap_or(config.knowledge.top_k);

    let results = retrieve(&records, query, limit);
    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, result) in results.iter().enumerate() {
        println!(
            "{}. [{}] {}",
            i + 1,
            result.score,
            result.record.canonical_question()
        );
        let others = &result.record.questions()[1..];
        if !others.is_empty() {
            println!("    also: {}", others.join(" | "));
        }
        println!("    answer: \"{}\"", result.record.answer());
        println!();
    }

    Ok(())
}
