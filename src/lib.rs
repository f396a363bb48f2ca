//! # FAQ Harness
//!
//! A small FAQ chat backend. Questions are matched against a flat
//! knowledge file with keyword scoring; the best answers are returned
//! directly or handed to an LLM as grounding context.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────┐   ┌─────────────┐
//! │ Knowledge    │──▶│  Retriever  │──▶│ ChatService │──▶ HTTP / CLI
//! │ file (Q:/A:) │   │ score+top-K │   │ (+Generator)│
//! └──────────────┘   └─────────────┘   └─────────────┘
//! ```
//!
//! Parsing and retrieval live in `faq-harness-core`; this crate adds file
//! loading, configuration, generation, and the HTTP server.
//!
//! ## Quick Start
//!
//! ```bash
//! faq check                        # validate the knowledge file
//! faq search "what is your name"   # inspect ranking
//! faq ask "how can I contact you"  # one-off answer
//! faq serve                        # start HTTP server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and environment overrides |
//! | [`knowledge`] | Knowledge file loading and lazy record cache |
//! | [`generation`] | LLM generator abstraction (Gemini) |
//! | [`chat`] | Request pipeline: greeting, retrieval, generation, contact info |
//! | [`server`] | Axum HTTP server |

pub mod ask;
pub mod chat;
pub mod check;
pub mod config;
pub mod generation;
pub mod knowledge;
pub mod search;
pub mod server;
