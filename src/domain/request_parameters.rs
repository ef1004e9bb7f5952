use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Implement,
    Explain,
    Refactor,
    Debug,
    Review,
}

impl Mode {
    /// Unknown labels fall back to `Implement`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "explain" => Self::Explain,
            "refactor" => Self::Refactor,
            "debug" => Self::Debug,
            "review" => Self::Review,
            _ => Self::Implement,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Implement => "implement",
            Self::Explain => "explain",
            Self::Refactor => "refactor",
            Self::Debug => "debug",
            Self::Review => "review",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
    Quick,
    #[default]
    Normal,
    Deep,
}

impl Depth {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "quick" | "brief" | "short" => Self::Quick,
            "deep" | "thorough" => Self::Deep,
            _ => Self::Normal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Normal => "normal",
            Self::Deep => "deep",
        }
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which context sources take part in assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceFlags {
    pub uploads: bool,
    pub chat: bool,
    pub library: bool,
}

impl SourceFlags {
    pub fn all() -> Self {
        Self {
            uploads: true,
            chat: true,
            library: true,
        }
    }
}

impl Default for SourceFlags {
    fn default() -> Self {
        Self::all()
    }
}

/// Knobs supplied with one ask request, already clamped.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequestParameters {
    pub prompt: String,
    pub style_profile: Option<String>,
    pub include_style: bool,
    pub mode: Mode,
    pub depth: Depth,
    pub critique: bool,
    pub max_output_tokens: u32,
    pub retrieval: String,
    pub rag_k: u32,
    pub sources: SourceFlags,
    pub pinned_ids: Vec<String>,
    pub char_budget: usize,
}

impl Default for ModelRequestParameters {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            style_profile: None,
            include_style: true,
            mode: Mode::default(),
            depth: Depth::default(),
            critique: false,
            max_output_tokens: 4096,
            retrieval: "semantic".to_string(),
            rag_k: 24,
            sources: SourceFlags::all(),
            pinned_ids: Vec::new(),
            char_budget: 12_000,
        }
    }
}

impl ModelRequestParameters {
    /// The style profile, when supplied and opted in.
    pub fn active_style_profile(&self) -> Option<&str> {
        if !self.include_style {
            return None;
        }
        self.style_profile
            .as_deref()
            .filter(|profile| !profile.trim().is_empty())
    }
}
