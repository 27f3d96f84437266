use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::ApiError;

pub mod analytics;
pub mod article;
pub mod category;
pub mod setting;

const DEFAULT_PAGE_SIZE: u64 = 10;
const MAX_PAGE_SIZE: u64 = 100;

/// Page of elements
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    /// Actual content.
    content: Vec<T>,
    /// Number of the page.
    page_number: u64,
    /// Desired size of the page.
    page_size: u64,
    /// Total number of pages.
    total_pages: u64,
    /// Number of elements returned.
    elements_number: usize,
    /// Total number of elements.
    total_items: u64,
}

impl<T> PagedResult<T>
where
    T: Serialize + Debug,
{
    /// Build a Page from a vector, a number of total element matching a query, the page size and page number
    pub fn new(source: Vec<T>, total_items: u64, page_size: u64, page_number: u64) -> Self {
        let content: Vec<T> = source.into_iter().take(page_size as usize).collect();
        let elements_number = content.len();
        let total_pages = (total_items as f64 / page_size as f64).ceil() as u64;

        PagedResult {
            content,
            page_number,
            page_size,
            total_pages,
            elements_number,
            total_items,
        }
    }

    pub fn content(&self) -> &Vec<T> {
        &self.content
    }

    pub fn page_number(&self) -> &u64 {
        &self.page_number
    }

    pub fn page_size(&self) -> &u64 {
        &self.page_size
    }

    pub fn total_pages(&self) -> &u64 {
        &self.total_pages
    }

    pub fn elements_number(&self) -> &usize {
        &self.elements_number
    }

    pub fn total_items(&self) -> &u64 {
        &self.total_items
    }
}

/// `?page=&size=` query parameters
#[derive(Debug, Deserialize, Default)]
pub struct PageParameters {
    page: Option<u64>,
    size: Option<u64>,
}

impl PageParameters {
    pub fn new(page: Option<u64>, size: Option<u64>) -> Self {
        PageParameters { page, size }
    }

    /// Requested page, starting at 1
    pub fn get_page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Requested page size, between 1 and 100
    pub fn get_size(&self) -> u64 {
        self.size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Rows to skip, saturating at `i64::MAX`: pages past the end are empty
    pub fn offset(&self) -> i64 {
        (self.get_page() - 1)
            .checked_mul(self.get_size())
            .and_then(|offset| i64::try_from(offset).ok())
            .unwrap_or(i64::MAX)
    }
}

/// Trim an optional text field, turning blank values into `None`
pub fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

/// Check a mandatory text field is not blank
pub fn require_text(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::invalid(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// Links are either absolute http(s) URLs or paths on this site (`/images/...`)
pub fn validate_link(field: &str, value: Option<&str>) -> Result<(), ApiError> {
    let value = match value.map(str::trim) {
        None | Some("") => return Ok(()),
        Some(v) => v,
    };

    if value.starts_with('/') && !value.starts_with("//") {
        return Ok(());
    }

    if is_http_url(value) {
        Ok(())
    } else {
        Err(ApiError::invalid(format!(
            "{} must be an absolute http(s) URL or a path starting with /",
            field
        )))
    }
}

pub fn is_http_url(value: &str) -> bool {
    Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}

/// `#rgb` or `#rrggbb`
pub fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => {
            (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use speculoos::prelude::*;

    use super::*;

    #[test]
    fn page_parameters_defaults_and_bounds() {
        let params = PageParameters::default();
        assert_eq!(params.get_page(), 1);
        assert_eq!(params.get_size(), 10);
        assert_eq!(params.offset(), 0);

        let params = PageParameters::new(Some(0), Some(1000));
        assert_eq!(params.get_page(), 1);
        assert_eq!(params.get_size(), 100);

        let params = PageParameters::new(Some(3), Some(20));
        assert_eq!(params.offset(), 40);
    }

    #[test]
    fn huge_pages_do_not_overflow() {
        assert_eq!(PageParameters::new(Some(u64::MAX), Some(100)).offset(), i64::MAX);
        assert_eq!(
            PageParameters::new(Some(100_000_000_000_000_000), Some(100)).offset(),
            i64::MAX
        );
        assert_eq!(
            PageParameters::new(Some(100_000_000_000_000_000), Some(1)).offset(),
            99_999_999_999_999_999
        );
    }

    #[test]
    fn paged_result_computes_pages() {
        let page = PagedResult::new(vec![1, 2, 3, 4], 21, 3, 2);

        assert_eq!(page.content(), &vec![1, 2, 3]);
        assert_eq!(*page.elements_number(), 3);
        assert_eq!(*page.total_pages(), 7);
        assert_eq!(*page.total_items(), 21);
        assert_eq!(*page.page_number(), 2);
        assert_eq!(*page.page_size(), 3);
    }

    #[test]
    fn normalize_blank_values() {
        assert_that!(normalize(Some("  hello "))).is_equal_to(Some("hello".to_owned()));
        assert_that!(normalize(Some("   "))).is_none();
        assert_that!(normalize(None)).is_none();
    }

    #[test]
    fn links() {
        assert_that!(validate_link("link", Some("https://example.com/a?b=c"))).is_ok();
        assert_that!(validate_link("link", Some("/images/abc.png"))).is_ok();
        assert_that!(validate_link("link", Some(""))).is_ok();
        assert_that!(validate_link("link", None)).is_ok();
        assert_that!(validate_link("link", Some("//evil.com/x"))).is_err();
        assert_that!(validate_link("link", Some("javascript:alert(1)"))).is_err();
        assert_that!(validate_link("link", Some("ftp://example.com"))).is_err();
        assert_that!(validate_link("link", Some("not a url"))).is_err();
    }

    #[test]
    fn colors() {
        assert_that!(is_hex_color("#fff")).is_true();
        assert_that!(is_hex_color("#A1b2C3")).is_true();
        assert_that!(is_hex_color("fff")).is_false();
        assert_that!(is_hex_color("#ffff")).is_false();
        assert_that!(is_hex_color("#ggg")).is_false();
    }
}
