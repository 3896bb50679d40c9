use serde::{Deserialize, Deserializer, Serialize};

/// Query parameters for the backend's paged list endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    100
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl PageQuery {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.page < 1 {
            return Err("page must be >= 1".to_string());
        }
        if self.page_size < 1 || self.page_size > 1000 {
            return Err("page_size must be between 1 and 1000".to_string());
        }
        Ok(())
    }

    pub fn next(&self) -> Self {
        Self {
            page: self.page + 1,
            page_size: self.page_size,
        }
    }
}

/// One page of a list endpoint. `total_pages` is optional because not every
/// backend deployment reports pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, total_pages: Option<u32>) -> Self {
        Self {
            results,
            total_pages,
        }
    }

    /// Whether another page should be requested after `current`.
    pub fn has_more_after(&self, current: u32) -> bool {
        if self.results.is_empty() {
            return false;
        }
        match self.total_pages {
            Some(total) => current < total,
            None => false,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Int(i64),
    Text(String),
}

/// Accepts ids sent either as JSON numbers or as numeric strings.
pub(crate) fn lenient_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<IdRepr>::deserialize(deserializer)?;
    Ok(match raw {
        Some(IdRepr::Int(id)) => Some(id),
        Some(IdRepr::Text(text)) => text.trim().parse().ok(),
        None => None,
    })
}
