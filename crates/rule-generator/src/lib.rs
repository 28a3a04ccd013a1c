//! Generative text client for editing rules.
//!
//! Talks to an OpenAI-compatible `completions` endpoint and returns the
//! first completion as [`RuleText`](clipsmith_edit_model::RuleText).

pub mod client;

pub use client::RuleGeneratorClient;
