//! Display labels for tag categories.
//!
//! Each column of the tags sheet is a category. Known categories carry a
//! fixed label; anything else is rendered as `📌 <category>`. A YAML file can
//! override or extend the built-in labels:
//!
//! ```yaml
//! labels:
//!   VIP: "💎 VIP"
//!   Following: "➡️ Following"
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

const BUILTIN_LABELS: &[(&str, &str)] = &[
    ("Following", "🔗 Following"),
    ("Followers", "⭐ Followers"),
    ("Bookmark", "📖 Bookmark"),
    ("Pending", "⏳ Pending"),
];

/// Maps a tag category (tags-sheet header) to its rendered label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagLabels {
    labels: HashMap<String, String>,
}

impl Default for TagLabels {
    fn default() -> Self {
        Self {
            labels: BUILTIN_LABELS
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
        }
    }
}

impl TagLabels {
    /// The label for `category`; unknown categories get the generic pin.
    #[must_use]
    pub fn label_for(&self, category: &str) -> String {
        let category = category.trim();
        self.labels
            .get(category)
            .cloned()
            .unwrap_or_else(|| format!("📌 {category}"))
    }

    /// Adds or replaces labels.
    pub fn extend(&mut self, overrides: HashMap<String, String>) {
        for (category, label) in overrides {
            self.labels.insert(category.trim().to_owned(), label);
        }
    }
}

#[derive(Debug, Deserialize)]
struct TagLabelsFile {
    #[serde(default)]
    labels: HashMap<String, String>,
}

/// Load the built-in labels plus any overrides from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or parsed.
pub fn load_tag_labels(path: &Path) -> Result<TagLabels, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TagLabelsIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: TagLabelsFile = serde_yaml::from_str(&content)?;
    let mut labels = TagLabels::default();
    labels.extend(file.labels);
    Ok(labels)
}
