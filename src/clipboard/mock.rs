use super::ClipboardService;
use crate::Result;
use std::sync::{Arc, Mutex};

/// In-memory clipboard that records every write for assertions.
#[derive(Clone)]
pub struct MockClipboard {
    writes: Arc<Mutex<Vec<String>>>,
}

impl MockClipboard {
    pub fn new() -> Self {
        Self {
            writes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn get_writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    pub fn get_write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }
}

impl Default for MockClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardService for MockClipboard {
    fn copy(&self, text: &str) -> Result<()> {
        self.writes.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
