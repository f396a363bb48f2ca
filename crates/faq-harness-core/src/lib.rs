//! # FAQ Harness Core
//!
//! Shared, I/O-free logic for FAQ Harness: the knowledge record model,
//! the FAQ text parser, keyword retrieval, and intent keyword sets.
//!
//! This crate contains no tokio, filesystem, or network dependencies.
//! Reading the knowledge file and serving requests is the job of the
//! `faq-harness` application crate.

pub mod intent;
pub mod knowledge;
pub mod models;
pub mod search;
