//! Gemini-backed content generation for product listings
//!
//! Sends listing text and product photos to Gemini, asks for JSON shaped by one
//! of the fixed task schemas (listing copy, ad waste, keyword clusters, review
//! and business insights, reel plans, creative prompts) and decodes the reply
//! into typed results. Plain text can also be streamed.

pub mod ai;
pub mod app;
pub mod config;
pub mod error;
pub mod listing;
pub mod models;
pub mod schemas;
pub mod tasks;

pub use error::{Error, Result};
