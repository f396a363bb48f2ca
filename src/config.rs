//! TOML configuration with environment overrides.
//!
//! Every section and field has a default, so the server runs without a
//! config file at all. When a file is given, relative knowledge paths are
//! resolved against the file's directory.
//!
//! Environment variables applied after the file:
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `PORT` | overrides `[server].port` |
//! | `GEMINI_API_KEY` (name set by `[generation].api_key_env`) | enables generation |

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use faq_harness_core::knowledge::Grammar;
use faq_harness_core::search::DEFAULT_CONTEXT_TEMPLATE;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KnowledgeConfig {
    #[serde(default = "default_knowledge_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub grammar: Grammar,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            path: default_knowledge_path(),
            grammar: Grammar::default(),
            top_k: default_top_k(),
        }
    }
}

fn default_knowledge_path() -> PathBuf {
    PathBuf::from("chatbot-data.txt")
}
fn default_top_k() -> usize {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    5000
}

/// How a matched query is turned into a reply.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChatMode {
    /// Reply with the best-matching answer verbatim.
    Direct,
    /// Send the retrieved context to the generator.
    #[default]
    Generative,
}

impl ChatMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatMode::Direct => "direct",
            ChatMode::Generative => "generative",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    #[serde(default)]
    pub mode: ChatMode,
    #[serde(default = "default_contact_email")]
    pub contact_email: String,
    #[serde(default = "default_greeting_tokens")]
    pub greeting_tokens: Vec<String>,
    #[serde(default = "default_contact_tokens")]
    pub contact_tokens: Vec<String>,
    #[serde(default = "default_greeting")]
    pub greeting: String,
    #[serde(default = "default_fallback")]
    pub fallback: String,
    #[serde(default = "default_contact_suffix")]
    pub contact_suffix: String,
    #[serde(default = "default_context_template")]
    pub context_template: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            mode: ChatMode::default(),
            contact_email: default_contact_email(),
            greeting_tokens: default_greeting_tokens(),
            contact_tokens: default_contact_tokens(),
            greeting: default_greeting(),
            fallback: default_fallback(),
            contact_suffix: default_contact_suffix(),
            context_template: default_context_template(),
        }
    }
}

impl ChatConfig {
    /// Substitute `{email}` with the configured contact address.
    pub fn with_email(&self, text: &str) -> String {
        text.replace("{email}", &self.contact_email)
    }
}

fn default_contact_email() -> String {
    "amedeo.carraro01@gmail.com".to_string()
}
fn default_greeting_tokens() -> Vec<String> {
    ["ciao", "salve", "buongiorno", "buonasera", "hey", "hello", "hi"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_contact_tokens() -> Vec<String> {
    ["contact", "email", "reach", "write", "contatt"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_greeting() -> String {
    "Hi! I'm Amedeo's assistant. How can I help you?".to_string()
}
fn default_fallback() -> String {
    "I don't have info on this. Contact: {email}".to_string()
}
fn default_contact_suffix() -> String {
    " Email: {email}".to_string()
}
fn default_context_template() -> String {
    DEFAULT_CONTEXT_TEMPLATE.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_prompt_template")]
    pub prompt_template: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            max_output_tokens: default_max_output_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            prompt_template: default_prompt_template(),
        }
    }
}

impl GenerationConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}
fn default_max_output_tokens() -> u32 {
    2000
}
fn default_temperature() -> f32 {
    0.3
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_prompt_template() -> String {
    "Answer in English briefly and naturally.\n\nContext: {context}\n\nQuestion: {query}\n\nAnswer:"
        .to_string()
}

/// Load configuration from `path`, or use defaults when `path` is `None`,
/// then apply environment overrides and validate.
pub fn resolve_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    config.apply_env_overrides(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

/// Read and validate a TOML config file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.knowledge.path.is_relative() {
        if let Some(dir) = path.parent() {
            config.knowledge.path = dir.join(&config.knowledge.path);
        }
    }

    config.validate()?;
    Ok(config)
}

impl Config {
    /// Apply `PORT` from the environment. `lookup` abstracts `std::env::var`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number, got '{}'", port))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.knowledge.top_k < 1 {
            bail!("knowledge.top_k must be >= 1");
        }

        if self.server.port == 0 {
            bail!("server.port must be > 0");
        }

        if !self.chat.context_template.contains("{answer}") {
            bail!("chat.context_template must contain '{{answer}}'");
        }

        match self.generation.provider.as_str() {
            "disabled" | "gemini" => {}
            other => bail!(
                "Unknown generation provider: '{}'. Must be disabled or gemini.",
                other
            ),
        }

        if !(0.0..=2.0).contains(&self.generation.temperature) {
            bail!("generation.temperature must be in [0.0, 2.0]");
        }

        if self.generation.max_output_tokens == 0 {
            bail!("generation.max_output_tokens must be > 0");
        }

        if self.generation.timeout_secs == 0 {
            bail!("generation.timeout_secs must be > 0");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(content: &str) -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("faq.toml");
        fs::write(&path, content).unwrap();
        (tmp, path)
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.knowledge.top_k, 3);
        assert_eq!(config.knowledge.grammar, Grammar::TwoLine);
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.chat.mode, ChatMode::Generative);
        assert_eq!(config.generation.max_output_tokens, 2000);
        assert!((config.generation.temperature - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let (_tmp, path) = write_config("");
        let config = load_config(&path).unwrap();
        assert_eq!(config.server.bind_addr(), "0.0.0.0:5000");
        assert_eq!(config.generation.provider, "gemini");
    }

    #[test]
    fn test_relative_knowledge_path_resolved_against_config_dir() {
        let (tmp, path) = write_config("[knowledge]\npath = \"data/faq.txt\"\n");
        let config = load_config(&path).unwrap();
        assert_eq!(config.knowledge.path, tmp.path().join("data/faq.txt"));
    }

    #[test]
    fn test_partial_sections() {
        let (_tmp, path) = write_config(
            r#"[chat]
mode = "direct"
greeting_tokens = ["yo"]

[knowledge]
grammar = "inline"
"#,
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.chat.mode, ChatMode::Direct);
        assert_eq!(config.chat.greeting_tokens, vec!["yo".to_string()]);
        assert_eq!(config.chat.contact_tokens, default_contact_tokens());
        assert_eq!(config.knowledge.grammar, Grammar::Inline);
    }

    #[test]
    fn test_rejects_zero_top_k() {
        let (_tmp, path) = write_config("[knowledge]\ntop_k = 0\n");
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("top_k"));
    }

    #[test]
    fn test_rejects_unknown_provider() {
        let (_tmp, path) = write_config("[generation]\nprovider = \"openai\"\n");
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("Unknown generation provider"));
    }

    #[test]
    fn test_rejects_template_without_answer() {
        let (_tmp, path) = write_config("[chat]\ncontext_template = \"[Info {n}]\"\n");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_rejects_unknown_mode() {
        let (_tmp, path) = write_config("[chat]\nmode = \"creative\"\n");
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_missing_file_errors() {
        let err = load_config(Path::new("/nonexistent/faq.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_port_override() {
        let mut config = Config::default();
        config
            .apply_env_overrides(|key| (key == "PORT").then(|| "8080".to_string()))
            .unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_invalid_port_override() {
        let mut config = Config::default();
        let result = config.apply_env_overrides(|_| Some("not-a-port".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_with_email() {
        let chat = ChatConfig::default();
        assert_eq!(
            chat.with_email(&chat.fallback),
            "I don't have info on this. Contact: amedeo.carraro01@gmail.com"
        );
    }
}
