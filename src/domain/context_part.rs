use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextSource {
    Upload,
    Chat,
    Library,
}

impl ContextSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Chat => "chat",
            Self::Library => "library",
        }
    }

    /// Label used in the provenance header of a rendered block.
    pub fn header_label(&self) -> &'static str {
        match self {
            Self::Upload => "UPLOAD",
            Self::Chat => "CHAT FILE",
            Self::Library => "LIBRARY",
        }
    }
}

impl fmt::Display for ContextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of retrieved context. `text` is always extracted text, never raw bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextPart {
    pub source: ContextSource,
    pub name: String,
    pub text: String,
}

impl ContextPart {
    pub fn new(source: ContextSource, name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source,
            name: name.into(),
            text: text.into(),
        }
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn render(&self) -> String {
        format!(
            "--- {}: {} ---\n{}",
            self.source.header_label(),
            self.name,
            self.text
        )
    }
}
