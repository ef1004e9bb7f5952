use std::fmt;

const MAX_CHAT_ID_LEN: usize = 128;

/// Identifier of one conversation; doubles as the name of its file folder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChatId(String);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChatIdError {
    #[error("chat id is empty")]
    Empty,
    #[error("chat id exceeds {MAX_CHAT_ID_LEN} characters")]
    TooLong,
    #[error("chat id contains invalid character {0:?}")]
    InvalidCharacter(char),
}

impl ChatId {
    pub fn parse(raw: &str) -> Result<Self, ChatIdError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ChatIdError::Empty);
        }
        if trimmed.chars().count() > MAX_CHAT_ID_LEN {
            return Err(ChatIdError::TooLong);
        }
        if let Some(bad) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(ChatIdError::InvalidCharacter(bad));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reduces a client-declared file name to a bare file name safe to store.
///
/// Returns `None` when nothing usable is left (empty, `.` or `..`).
pub fn sanitize_file_name(declared: &str) -> Option<String> {
    let base = declared
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    match base {
        "" | "." | ".." => None,
        name => Some(name.chars().filter(|c| !c.is_control()).collect()),
    }
}
