/// Extraction strategy for a stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Pdf,
    Docx,
    Text,
    Other,
}

const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "markdown", "rst", "csv", "tsv", "log", "json", "jsonl", "yaml", "yml",
    "toml", "ini", "cfg", "conf", "xml", "html", "htm", "css", "scss", "js", "mjs", "cjs",
    "jsx", "ts", "tsx", "py", "rb", "java", "kt", "kts", "scala", "go", "rs", "c", "h",
    "cc", "cpp", "hpp", "cs", "swift", "php", "sh", "bash", "zsh", "ps1", "sql", "r", "lua",
    "pl", "hs", "ml", "ex", "exs", "erl", "clj", "dart", "vue", "svelte", "gradle", "tex",
];

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

impl FileKind {
    /// Picks a strategy from the declared name first, then the declared media type.
    pub fn detect(name: &str, media_type: Option<&str>) -> Self {
        if let Some(kind) = Self::from_extension(name) {
            return kind;
        }
        media_type.map(Self::from_mime).unwrap_or(Self::Other)
    }

    fn from_extension(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        let ext = ext.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            e if TEXT_EXTENSIONS.contains(&e) => Some(Self::Text),
            _ => None,
        }
    }

    pub fn from_mime(mime: &str) -> Self {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "application/pdf" => Self::Pdf,
            DOCX_MIME => Self::Docx,
            m if m.starts_with("text/") => Self::Text,
            "application/json" | "application/xml" | "application/javascript"
            | "application/x-yaml" | "application/toml" | "application/x-sh" => Self::Text,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Text => "text",
            Self::Other => "other",
        }
    }
}
