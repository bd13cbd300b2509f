use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Business domain used both to group reports and to tag profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    FinTech,
    Automotive,
    Retail,
    Other,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::FinTech,
        Category::Automotive,
        Category::Retail,
        Category::Other,
    ];

    /// Value stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::FinTech => "FinTech",
            Category::Automotive => "Automotive",
            Category::Retail => "Retail",
            Category::Other => "Other",
        }
    }

    /// Keyboard button text shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            Category::FinTech => "FinTech",
            Category::Automotive => "Automotive",
            Category::Retail => "Retail",
            Category::Other => "Другие",
        }
    }

    pub fn from_label(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.label() == text)
    }

    pub fn from_config_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(key.trim()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCategoryError(pub String);

impl fmt::Display for ParseCategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category: {}", self.0)
    }
}

impl std::error::Error for ParseCategoryError {}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s || c.label() == s)
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: i64,
    pub category: Category,
    pub description: String,
    pub website: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    pub category: Category,
    pub title: String,
    pub source: String,
    pub file_path: String,
}
