//! Bangla Captioner - generates Bangla social-media captions for images
//!
//! Loads an image from disk, asks a generative model for captions through a
//! shape-validated flow, and copies a chosen caption to the clipboard.

pub mod ai;
pub mod app;
pub mod clipboard;
pub mod data_url;
pub mod error;
pub mod models;
pub mod prompts;

pub use error::{Error, Result};
