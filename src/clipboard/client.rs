use super::ClipboardService;
use crate::{Error, Result};
use std::sync::Mutex;

/// Real clipboard backed by arboard.
///
/// The handle is created lazily on first copy so that building the app does
/// not fail on headless machines where no clipboard is available.
pub struct SystemClipboard {
    handle: Mutex<Option<arboard::Clipboard>>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self {
            handle: Mutex::new(None),
        }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardService for SystemClipboard {
    fn copy(&self, text: &str) -> Result<()> {
        let mut guard = self
            .handle
            .lock()
            .map_err(|_| Error::Clipboard("clipboard handle poisoned".to_string()))?;

        if guard.is_none() {
            let clipboard = arboard::Clipboard::new()
                .map_err(|e| Error::Clipboard(format!("failed to open clipboard: {}", e)))?;
            *guard = Some(clipboard);
        }

        guard
            .as_mut()
            .expect("clipboard handle initialized above")
            .set_text(text.to_string())
            .map_err(|e| Error::Clipboard(format!("failed to write clipboard: {}", e)))
    }
}
