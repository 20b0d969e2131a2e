use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Marker stored in place of a summary when a chunk could not be summarized.
pub const SUMMARY_FAILED: &str = "[Summary failed]";

/// A single piece of user-authored content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextItem {
    Post {
        title: String,
        body: String,
        source_url: String,
    },
    Comment {
        body: String,
        source_url: String,
    },
}

impl TextItem {
    pub fn title(&self) -> Option<&str> {
        match self {
            TextItem::Post { title, .. } => Some(title),
            TextItem::Comment { .. } => None,
        }
    }

    pub fn body(&self) -> &str {
        match self {
            TextItem::Post { body, .. } | TextItem::Comment { body, .. } => body,
        }
    }

    pub fn source_url(&self) -> &str {
        match self {
            TextItem::Post { source_url, .. } | TextItem::Comment { source_url, .. } => {
                source_url
            }
        }
    }

    /// Text fed to the summarizer for this item.
    pub fn render(&self) -> String {
        match self.title() {
            Some(title) => format!("Title: {}\n{}", title, self.body()),
            None => self.body().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileInfo {
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub karma_total: i64,
    pub account_created: Option<NaiveDate>,
}

impl ProfileInfo {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_empty()
    }

    /// Account creation date as `YYYY-MM-DD`, or an empty string when unknown.
    pub fn cake_day(&self) -> String {
        self.account_created
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

/// Everything fetched for one user in a single pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserContent {
    pub posts: Vec<TextItem>,
    pub comments: Vec<TextItem>,
    pub profile: ProfileInfo,
}

impl UserContent {
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty() && self.comments.is_empty()
    }

    /// Source URLs of all posts followed by all comments, in fetch order.
    pub fn source_urls(&self) -> Vec<String> {
        self.posts
            .iter()
            .chain(self.comments.iter())
            .map(|item| item.source_url().to_string())
            .collect()
    }
}

/// Final persona text. When `is_error` is set the text is a readable error marker
/// rather than model output; it is still displayed and persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaResult {
    pub text: String,
    pub is_error: bool,
}

impl PersonaResult {
    pub fn generated(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn failed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}
