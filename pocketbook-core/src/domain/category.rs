//! Category domain model

use serde::{Deserialize, Serialize};

use super::entity::{new_id, Entity};

/// Categories seeded for a user who has none: (name, color)
pub const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Food", "#f97316"),
    ("Transport", "#60a5fa"),
    ("Entertainment", "#a78bfa"),
    ("Utilities", "#34d399"),
];

/// A user-defined spending category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: String,
    pub color: String,
}

impl Category {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: new_id("cat"),
            user_id: user_id.into(),
            name: name.into(),
            color: color.into(),
        }
    }
}

impl Entity for Category {
    fn id(&self) -> &str {
        &self.id
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }
}
