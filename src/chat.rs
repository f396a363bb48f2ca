//! Chat request handling: greeting shortcut, retrieval, optional
//! generation, and the contact-info suffix.
//!
//! # Pipeline
//!
//! 1. Greeting token in the message → fixed greeting, nothing else runs.
//! 2. Retrieve the top records. None → fixed fallback (generator not called).
//! 3. `direct` mode: best answer verbatim. `generative` mode: render the
//!    context, call the generator, and on any error use the best answer.
//! 4. Contact token in the message and no email in the reply → append the
//!    contact suffix.

use std::sync::Arc;

use faq_harness_core::intent::KeywordSet;
use faq_harness_core::models::Record;
use faq_harness_core::search::{build_context, retrieve, ContextTemplate};

use crate::config::{ChatMode, Config};
use crate::generation::{build_prompt, Generator};

/// Where the text of a [`ChatReply`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Greeting,
    /// Best-matching answer, used verbatim.
    Answer,
    /// Produced by the generator from retrieved context.
    Generated,
    /// Nothing matched.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub text: String,
    pub kind: ReplyKind,
}

pub struct ChatService {
    mode: ChatMode,
    top_k: usize,
    greetings: KeywordSet,
    contact_intent: KeywordSet,
    greeting: String,
    fallback: String,
    contact_suffix: String,
    contact_email: String,
    context_template: ContextTemplate,
    prompt_template: String,
    generator: Option<Arc<dyn Generator>>,
}

impl ChatService {
    pub fn new(config: &Config, generator: Option<Arc<dyn Generator>>) -> Self {
        let chat = &config.chat;
        Self {
            mode: chat.mode,
            top_k: config.knowledge.top_k,
            greetings: KeywordSet::new(&chat.greeting_tokens),
            contact_intent: KeywordSet::new(&chat.contact_tokens),
            greeting: chat.with_email(&chat.greeting),
            fallback: chat.with_email(&chat.fallback),
            contact_suffix: chat.with_email(&chat.contact_suffix),
            contact_email: chat.contact_email.clone(),
            context_template: ContextTemplate::new(chat.context_template.clone()),
            prompt_template: config.generation.prompt_template.clone(),
            generator,
        }
    }

    pub fn mode(&self) -> ChatMode {
        self.mode
    }

    /// True when a generator is configured and generative mode is on.
    pub fn generation_enabled(&self) -> bool {
        self.mode == ChatMode::Generative && self.generator.is_some()
    }

    /// True when a generator was constructed, regardless of mode.
    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Answer `query` against `records`.
    pub async fn respond(&self, records: &[Record], query: &str) -> ChatReply {
        if self.greetings.matches(query) {
            return ChatReply {
                text: self.greeting.clone(),
                kind: ReplyKind::Greeting,
            };
        }

        let results = retrieve(records, query, self.top_k);
        tracing::info!(query = %query, matches = results.len(), "Query received");

        let Some(best) = results.first() else {
            return self.with_contact_info(
                query,
                ChatReply {
                    text: self.fallback.clone(),
                    kind: ReplyKind::Fallback,
                },
            );
        };

        let answer = ChatReply {
            text: best.record.answer().to_string(),
            kind: ReplyKind::Answer,
        };

        let reply = match (&self.mode, &self.generator) {
            (ChatMode::Generative, Some(generator)) => {
                let context = build_context(&results, &self.context_template);
                let prompt = build_prompt(&self.prompt_template, query, &context);
                match generator.generate(&prompt).await {
                    Ok(text) => {
                        tracing::debug!(model = generator.model_name(), "Generated reply");
                        ChatReply {
                            text,
                            kind: ReplyKind::Generated,
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Generation failed, using retrieved answer: {}", e);
                        answer
                    }
                }
            }
            _ => answer,
        };

        self.with_contact_info(query, reply)
    }

    fn with_contact_info(&self, query: &str, mut reply: ChatReply) -> ChatReply {
        if self.contact_intent.matches(query)
            && !reply.text.contains(&self.contact_email)
            && !reply.text.contains('@')
        {
            reply.text.push_str(&self.contact_suffix);
        }
        reply
    }
}
