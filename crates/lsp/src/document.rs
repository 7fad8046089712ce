//! Document state and settings for open files in the editor.

use le_core::AnalysisConfig;
use serde_json::Value;
use std::collections::HashMap;

/// Settings section name under which editors nest the server's settings.
pub const SETTINGS_SECTION: &str = "logicalEnglish";

/// Tracks which documents are currently open in the editor.
pub struct DocumentState {
    documents: HashMap<String, DocumentInfo>,
}

/// Information about a single open document.
pub struct DocumentInfo {
    /// Editor-reported version number.
    pub version: i32,
    /// Latest content from the editor.
    pub content: String,
}

impl Default for DocumentState {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentState {
    pub fn new() -> Self {
        Self {
            documents: HashMap::new(),
        }
    }

    /// Track a newly opened document.
    pub fn open(&mut self, uri: &str, version: i32, content: String) {
        self.documents
            .insert(uri.to_owned(), DocumentInfo { version, content });
    }

    /// Update content for an already-open document.
    pub fn change(&mut self, uri: &str, version: i32, content: String) {
        if let Some(doc) = self.documents.get_mut(uri) {
            doc.version = version;
            doc.content = content;
        }
    }

    /// Remove a closed document from tracking.
    pub fn close(&mut self, uri: &str) {
        self.documents.remove(uri);
    }

    /// Get information about an open document.
    pub fn get(&self, uri: &str) -> Option<&DocumentInfo> {
        self.documents.get(uri)
    }

    /// URIs of every open document, sorted.
    pub fn uris(&self) -> Vec<String> {
        let mut uris: Vec<String> = self.documents.keys().cloned().collect();
        uris.sort();
        uris
    }
}

/// Read analysis settings sent by the client.
///
/// Accepts the settings object itself or one nested under
/// [`SETTINGS_SECTION`]. Anything unreadable falls back to the defaults.
pub fn config_from_settings(settings: &Value) -> AnalysisConfig {
    let section = settings.get(SETTINGS_SECTION).unwrap_or(settings);
    if section.is_null() {
        return AnalysisConfig::default();
    }
    serde_json::from_value(section.clone()).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring unreadable settings");
        AnalysisConfig::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn change_ignores_unopened_documents() {
        let mut state = DocumentState::new();
        state.change("file:///a.le", 2, "x".into());
        assert!(state.get("file:///a.le").is_none());

        state.open("file:///a.le", 1, "a".into());
        state.change("file:///a.le", 2, "b".into());
        let doc = state.get("file:///a.le").unwrap();
        assert_eq!((doc.version, doc.content.as_str()), (2, "b"));

        state.close("file:///a.le");
        assert!(state.uris().is_empty());
    }

    #[test]
    fn settings_are_read_flat_or_nested() {
        let flat = config_from_settings(&json!({"maxNumberOfProblems": 4}));
        assert_eq!(flat.max_number_of_problems, 4);
        let nested = config_from_settings(&json!({"logicalEnglish": {"maxNumberOfProblems": 9}}));
        assert_eq!(nested.max_number_of_problems, 9);
    }

    #[test]
    fn unreadable_settings_fall_back_to_defaults() {
        assert_eq!(config_from_settings(&Value::Null), AnalysisConfig::default());
        assert_eq!(
            config_from_settings(&json!({"maxNumberOfProblems": "many"})),
            AnalysisConfig::default()
        );
    }
}
