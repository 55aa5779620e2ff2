//! The currently selected UI item.

/// What the embedding UI has under the cursor.
///
/// Identifiers are opaque strings supplied by the UI; nothing here validates
/// them. The variant alone drives applicability and placeholder resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SelectedItem {
    /// A revision row.
    Revision { change_id: String },
    /// A file row within a revision; the path is repo-relative.
    File { change_id: String, path: String },
    /// An operation-log row.
    Operation { operation_id: String },
    /// Nothing selected, or a row carrying no extractable identifiers.
    #[default]
    None,
}

impl SelectedItem {
    pub fn revision(change_id: impl Into<String>) -> Self {
        Self::Revision {
            change_id: change_id.into(),
        }
    }

    pub fn file(change_id: impl Into<String>, path: impl Into<String>) -> Self {
        Self::File {
            change_id: change_id.into(),
            path: path.into(),
        }
    }

    pub fn operation(operation_id: impl Into<String>) -> Self {
        Self::Operation {
            operation_id: operation_id.into(),
        }
    }
}
