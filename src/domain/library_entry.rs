use serde::{Deserialize, Serialize};

/// A reusable document kept across conversations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryEntry {
    pub id: String,
    pub filename: String,
    pub stored_name: String,
    pub size: u64,
    pub uploaded_at: i64,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default)]
    pub pinned: bool,
}

fn default_collection() -> String {
    "default".to_string()
}

impl LibraryEntry {
    pub fn new(filename: String, size: u64, collection: String) -> Self {
        let id = uuid::Uuid::new_v4().simple().to_string();
        Self {
            stored_name: id.clone(),
            id,
            filename,
            size,
            uploaded_at: chrono::Utc::now().timestamp_millis(),
            collection,
            pinned: false,
        }
    }

    /// Pinned globally or picked for this request.
    pub fn is_selected(&self, requested_ids: &[String]) -> bool {
        self.pinned || requested_ids.iter().any(|id| id == &self.id)
    }
}
