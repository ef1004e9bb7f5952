use std::fmt;

use super::chat_id::ChatId;

const CHATS_PREFIX: &str = "chats";
const LIBRARY_PREFIX: &str = "library";

/// Location of a blob relative to the upload root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePath(String);

impl StoragePath {
    pub fn chat_folder(chat_id: &ChatId) -> Self {
        Self(format!("{}/{}", CHATS_PREFIX, chat_id.as_str()))
    }

    pub fn chat_file(chat_id: &ChatId, file_name: &str) -> Self {
        Self(format!("{}/{}/{}", CHATS_PREFIX, chat_id.as_str(), file_name))
    }

    pub fn library_blob(stored_name: &str) -> Self {
        Self(format!("{}/{}", LIBRARY_PREFIX, stored_name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
