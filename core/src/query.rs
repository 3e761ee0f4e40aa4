//! Listing query and its URL encoding.

use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: usize = 20;

/// Filter and page window for a course listing.
///
/// `offset`/`limit` always select from the filtered set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseQuery {
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub only_published: Option<bool>,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl Default for CourseQuery {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
            q: None,
            category: None,
            only_published: None,
        }
    }
}

impl CourseQuery {
    pub fn page(offset: usize, limit: usize) -> Self {
        Self {
            offset,
            limit,
            ..Self::default()
        }
    }

    pub fn with_text(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn only_published(mut self, value: bool) -> Self {
        self.only_published = Some(value);
        self
    }

    /// `limit` with a floor of 1.
    pub fn effective_limit(&self) -> usize {
        self.limit.max(1)
    }

    /// Non-empty search text, if any.
    pub fn text(&self) -> Option<&str> {
        self.q.as_deref().filter(|q| !q.is_empty())
    }

    /// Non-empty category id, if any.
    pub fn category_id(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }

    /// Form-urlencoded query string, without the leading `?`.
    ///
    /// Absent and empty-string values are dropped.
    pub fn encode(&self) -> String {
        let mut out = url::form_urlencoded::Serializer::new(String::new());
        out.append_pair("offset", &self.offset.to_string());
        out.append_pair("limit", &self.effective_limit().to_string());
        if let Some(q) = self.text() {
            out.append_pair("q", q);
        }
        if let Some(category) = self.category_id() {
            out.append_pair("category", category);
        }
        if let Some(only_published) = self.only_published {
            out.append_pair("onlyPublished", if only_published { "true" } else { "false" });
        }
        out.finish()
    }
}
