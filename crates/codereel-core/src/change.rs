//! File change records and the live text buffer

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A changed file with its immutable endpoints and the live buffer being animated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub path: PathBuf,
    pub original: String,
    pub modified: String,
    /// Live text, edited in place during playback
    pub current: String,
}

impl FileChange {
    pub fn new(path: impl Into<PathBuf>, original: String, modified: String) -> Self {
        Self {
            path: path.into(),
            current: original.clone(),
            original,
            modified,
        }
    }

    /// Label used by the file tabs
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Put the live buffer back to the original text
    pub fn reset(&mut self) {
        self.current.clone_from(&self.original);
    }

    /// Length of the live buffer in codepoints
    pub fn len_chars(&self) -> usize {
        self.current.chars().count()
    }

    /// Insert `text` at codepoint offset `at` (clamped to the buffer end)
    pub fn insert(&mut self, at: usize, text: &str) {
        let byte = byte_offset(&self.current, at);
        self.current.insert_str(byte, text);
    }

    /// Remove the codepoint range `[from, end)` (clamped to the buffer end)
    pub fn delete(&mut self, from: usize, end: usize) {
        if end <= from {
            return;
        }
        let start = byte_offset(&self.current, from);
        let stop = byte_offset(&self.current, end);
        self.current.replace_range(start..stop, "");
    }

    /// True once the live buffer matches the modified text
    pub fn is_complete(&self) -> bool {
        self.current == self.modified
    }
}

/// Byte index of the codepoint at `chars`, or the string length past the end
fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_delete_use_codepoints() {
        let mut file = FileChange::new("a.txt", "héllo".to_string(), String::new());
        file.insert(2, "XY");
        assert_eq!(file.current, "héXYllo");
        file.delete(1, 4);
        assert_eq!(file.current, "hllo");
        assert_eq!(file.len_chars(), 4);
    }

    #[test]
    fn test_offsets_past_end_clamp() {
        let mut file = FileChange::new("a.txt", "ab".to_string(), String::new());
        file.insert(10, "c");
        assert_eq!(file.current, "abc");
        file.delete(1, 99);
        assert_eq!(file.current, "a");
    }

    #[test]
    fn test_reset_restores_original() {
        let mut file = FileChange::new("src/lib.rs", "one".to_string(), "two".to_string());
        file.insert(0, "zero ");
        file.reset();
        assert_eq!(file.current, "one");
        assert!(!file.is_complete());
        assert_eq!(file.display_name(), "lib.rs");
    }
}
