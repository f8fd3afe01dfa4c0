use serde::{Deserialize, Serialize};

use super::error::PageError;

/// A slice of an ordered listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitOffset {
    pub limit: i64,
    pub offset: i64,
}

impl LimitOffset {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }

    /// Apply the window to an already ordered sequence
    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

/// `?limit=&offset=` query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PageQuery {
    /// Resolve the requested window. No `limit` means the listing is not paginated.
    pub fn window(&self, max_limit: Option<i64>) -> Result<Option<LimitOffset>, PageError> {
        let Some(limit) = self.limit else {
            return Ok(None);
        };

        if limit <= 0 {
            return Err(PageError::InvalidLimit("Limit must be a positive integer".to_string()));
        }
        let offset = self.offset.unwrap_or(0);
        if offset < 0 {
            return Err(PageError::InvalidOffset("Offset must be non-negative".to_string()));
        }

        let applied_limit = match max_limit {
            Some(max) if limit > max => {
                tracing::debug!("Limit {} exceeds max {}, capping to max", limit, max);
                max
            }
            _ => limit,
        };

        Ok(Some(LimitOffset::new(applied_limit, offset)))
    }
}

/// Limit/offset page envelope
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Build a page; `base_path` is the collection path the links point back to
    pub fn new(results: Vec<T>, count: i64, window: LimitOffset, base_path: &str) -> Self {
        let LimitOffset { limit, offset } = window;

        // Offsets near i64::MAX are accepted by `window`, so the end may not fit
        let next = offset
            .checked_add(limit)
            .filter(|end| *end < count)
            .map(|end| format!("{}?limit={}&offset={}", base_path, limit, end));

        let previous = if offset <= 0 {
            None
        } else if offset - limit <= 0 {
            Some(format!("{}?limit={}", base_path, limit))
        } else {
            Some(format!("{}?limit={}&offset={}", base_path, limit, offset - limit))
        };

        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

/// A collection response: a bare array, or a page when a limit was requested
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Listing<T> {
    All(Vec<T>),
    Page(Page<T>),
}
