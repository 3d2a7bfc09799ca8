use seqalign_common::SeqAlignError;
use std::sync::{Arc, Mutex};

/// Destination for copied text
pub trait ClipboardSink {
    fn write_text(&mut self, text: &str) -> Result<(), SeqAlignError>;
}

/// Host text selection, read when a selection gesture ends
pub trait SelectionSource {
    fn selected_text(&self) -> Option<String>;
}

impl SelectionSource for str {
    fn selected_text(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl SelectionSource for String {
    fn selected_text(&self) -> Option<String> {
        Some(self.clone())
    }
}

impl SelectionSource for Option<String> {
    fn selected_text(&self) -> Option<String> {
        self.clone()
    }
}

/// In-process clipboard. Clones share the same history.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    history: Arc<Mutex<Vec<String>>>,
    fail_writes: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clipboard whose writes always fail
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.history.lock().ok()?.last().cloned()
    }

    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }
}

impl ClipboardSink for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), SeqAlignError> {
        if self.fail_writes {
            return Err(SeqAlignError::Clipboard("clipboard is read-only".to_string()));
        }
        let mut history = self
            .history
            .lock()
            .map_err(|e| SeqAlignError::Clipboard(format!("Lock error: {}", e)))?;
        history.push(text.to_string());
        Ok(())
    }
}

/// The operating system clipboard, opened on first use
#[cfg(feature = "system-clipboard")]
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

#[cfg(feature = "system-clipboard")]
impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&mut self) -> Result<&mut arboard::Clipboard, SeqAlignError> {
        if self.inner.is_none() {
            let clipboard = arboard::Clipboard::new()
                .map_err(|e| SeqAlignError::Clipboard(format!("Clipboard not available: {}", e)))?;
            tracing::debug!("System clipboard opened");
            self.inner = Some(clipboard);
        }
        self.inner
            .as_mut()
            .ok_or_else(|| SeqAlignError::Clipboard("Clipboard not available".to_string()))
    }
}

#[cfg(feature = "system-clipboard")]
impl ClipboardSink for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), SeqAlignError> {
        self.handle()?
            .set_text(text.to_string())
            .map_err(|e| SeqAlignError::Clipboard(format!("Failed to set clipboard text: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_clipboard_shares_history() {
        let clipboard = MemoryClipboard::new();
        let mut writer = clipboard.clone();
        writer.write_text("ACD").unwrap();
        writer.write_text("EFG").unwrap();
        assert_eq!(clipboard.contents().as_deref(), Some("EFG"));
        assert_eq!(clipboard.history(), vec!["ACD", "EFG"]);
    }

    #[test]
    fn test_failing_clipboard() {
        let mut clipboard = MemoryClipboard::failing();
        assert!(matches!(
            clipboard.write_text("ACD"),
            Err(SeqAlignError::Clipboard(_))
        ));
        assert_eq!(clipboard.contents(), None);
    }

    #[test]
    fn test_selection_sources() {
        assert_eq!("MKV".selected_text().as_deref(), Some("MKV"));
        assert_eq!(String::from("A").selected_text().as_deref(), Some("A"));
        assert_eq!(None::<String>.selected_text(), None);
    }
}
