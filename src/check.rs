//! `faq check`: validate a knowledge file and list what was loaded.

use anyhow::Result;

use crate::config::Config;
use crate::knowledge::read_knowledge;

/// Parse the configured knowledge file and print a summary.
///
/// Unlike the server, this surfaces read errors instead of degrading to an
/// empty knowledge base.
pub fn run_check(config: &Config) -> Result<()> {
    let path = &config.knowledge.path;
    let parsed = read_knowledge(path, config.knowledge.grammar)?;

    println!("knowledge file: {}", path.display());
    println!("records: {}", parsed.records.len());
    for (i, record) in parsed.records.iter().enumerate() {
        println!(
            "  {:>3}. {} ({} phrasing{})",
            i + 1,
            record.canonical_question(),
            record.questions().len(),
            if record.questions().len() == 1 { "" } else { "s" }
        );
    }

    if !parsed.discarded_lines.is_empty() {
        let lines: Vec<String> = parsed
            .discarded_lines
            .iter()
            .map(|n| n.to_string())
            .collect();
        println!("skipped questions without answer at lines: {}", lines.join(", "));
    }

    Ok(())
}
