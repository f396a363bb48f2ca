use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn faq_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("faq");
    path
}

const KNOWLEDGE: &str = "\
# About
Q: What is your name? | Who are you?
A: I am Amedeo's assistant.

Q: Which languages do you use?
A: Mostly Rust and Python.

# Contact
Q: How can I contact you?
A: Use the form on the website.

Q: Is there a question without an answer?

Q: Where are you based?
A: In Italy.
";

fn setup_test_env(mode: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    fs::write(root.join("chatbot-data.txt"), KNOWLEDGE).unwrap();

    let config_content = format!(
        r#"[knowledge]
path = "chatbot-data.txt"

[chat]
mode = "{}"

[generation]
provider = "disabled"
"#,
        mode
    );

    let config_path = root.join("faq.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_faq(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = faq_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .env_remove("PORT")
        .current_dir(config_path.parent().unwrap())
        .output()
        .unwrap_or_else(|e| panic!("Failed to run faq binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_check_lists_records() {
    let (_tmp, config_path) = setup_test_env("direct");

    let (stdout, stderr, success) = run_faq(&config_path, &["check"]);
    assert!(success, "check failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("records: 4"));
    assert!(stdout.contains("What is your name? (2 phrasings)"));
    assert!(stdout.contains("skipped questions without answer at lines: 12"));
}

#[test]
fn test_check_missing_knowledge_file_fails() {
    let (tmp, config_path) = setup_test_env("direct");
    fs::remove_file(tmp.path().join("chatbot-data.txt")).unwrap();

    let (_, stderr, success) = run_faq(&config_path, &["check"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read knowledge file"));
}

#[test]
fn test_search_ranks_exact_question_first() {
    let (_tmp, config_path) = setup_test_env("direct");

    let (stdout, stderr, success) = run_faq(&config_path, &["search", "what is your name"]);
    assert!(success, "search failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.starts_with("1. [140] What is your name?"), "stdout: {}", stdout);
    assert!(stdout.contains("also: Who are you?"));
}

#[test]
fn test_search_limit() {
    let (_tmp, config_path) = setup_test_env("direct");

    let (stdout, _, success) = run_faq(&config_path, &["search", "you", "--limit", "2"]);
    assert!(success);
    assert!(stdout.contains("1. "));
    assert!(stdout.contains("2. "));
    assert!(!stdout.contains("3. "));
}

#[test]
fn test_search_no_results() {
    let (_tmp, config_path) = setup_test_env("direct");

    let (stdout, _, success) = run_faq(&config_path, &["search", "xylophone"]);
    assert!(success);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_ask_direct_answer() {
    let (_tmp, config_path) = setup_test_env("direct");

    let (stdout, stderr, success) = run_faq(&config_path, &["ask", "what is your name"]);
    assert!(success, "ask failed: stdout={}, stderr={}", stdout, stderr);
    assert_eq!(stdout.trim(), "I am Amedeo's assistant.");
}

#[test]
fn test_ask_greeting() {
    let (_tmp, config_path) = setup_test_env("direct");

    let (stdout, _, success) = run_faq(&config_path, &["ask", "Hello!"]);
    assert!(success);
    assert_eq!(stdout.trim(), "Hi! I'm Amedeo's assistant. How can I help you?");
}

#[test]
fn test_ask_contact_appends_email() {
    let (_tmp, config_path) = setup_test_env("direct");

    let (stdout, _, success) = run_faq(&config_path, &["ask", "how can I contact you"]);
    assert!(success);
    assert_eq!(
        stdout.trim(),
        "Use the form on the website. Email: amedeo.carraro01@gmail.com"
    );
}

#[test]
fn test_ask_generative_without_generator_uses_answer() {
    let (_tmp, config_path) = setup_test_env("generative");

    let (stdout, _, success) = run_faq(&config_path, &["ask", "where are you based"]);
    assert!(success);
    assert_eq!(stdout.trim(), "In Italy.");
}

#[test]
fn test_ask_missing_knowledge_file_falls_back() {
    let (tmp, config_path) = setup_test_env("direct");
    fs::remove_file(tmp.path().join("chatbot-data.txt")).unwrap();

    let (stdout, stderr, success) = run_faq(&config_path, &["ask", "what is your name"]);
    assert!(success, "ask should degrade, stderr={}", stderr);
    assert_eq!(
        stdout.trim(),
        "I don't have info on this. Contact: amedeo.carraro01@gmail.com"
    );
}

#[test]
fn test_ask_blank_message_errors() {
    let (_tmp, config_path) = setup_test_env("direct");

    let (_, stderr, success) = run_faq(&config_path, &["ask", "   "]);
    assert!(!success);
    assert!(stderr.contains("Message is required"));
}

#[test]
fn test_invalid_config_errors() {
    let (tmp, _) = setup_test_env("direct");
    let bad = tmp.path().join("bad.toml");
    fs::write(&bad, "[knowledge]\ntop_k = 0\n").unwrap();

    let (_, stderr, success) = run_faq(&bad, &["check"]);
    assert!(!success);
    assert!(stderr.contains("top_k"));
}
