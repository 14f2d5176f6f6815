//! System clipboard integration for caption copying
//!
//! Write-only access: the session copies a chosen caption out, it never reads
//! clipboard contents back.

pub mod client;
pub mod mock;

pub use client::SystemClipboard;
pub use mock::MockClipboard;

use crate::Result;

pub trait ClipboardService: Send {
    fn copy(&self, text: &str) -> Result<()>;
}
