//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use blog_core::pagination::PageRequest;
use blog_infra::database::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub pagination: PaginationConfig,
}

/// Page sizes for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    pub page_size: u64,
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            max_page_size: 100,
        }
    }
}

impl PaginationConfig {
    /// Resolve the `page` and `page_size` query parameters.
    ///
    /// A missing `page` means the first one; anything that is not a positive
    /// integer yields `None`. A bad `page_size` falls back to the default and
    /// large ones are capped.
    pub fn page_request(&self, page: Option<&str>, page_size: Option<&str>) -> Option<PageRequest> {
        let page = match page.filter(|p| !p.is_empty()) {
            None => 1,
            Some(raw) => raw.parse::<u64>().ok().filter(|p| *p >= 1)?,
        };

        let page_size = page_size
            .and_then(|raw| raw.parse::<u64>().ok())
            .filter(|size| *size >= 1)
            .map_or(self.page_size, |size| size.min(self.max_page_size));

        Some(PageRequest::new(page, page_size))
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: env_or("DB_MAX_CONNECTIONS", 10),
            min_connections: env_or("DB_MIN_CONNECTIONS", 1),
            bootstrap_schema: env_or("DB_BOOTSTRAP_SCHEMA", true),
        });

        let defaults = PaginationConfig::default();

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env_or("PORT", 8080),
            database,
            pagination: PaginationConfig {
                page_size: env_or("PAGE_SIZE", defaults.page_size).max(1),
                max_page_size: env_or("MAX_PAGE_SIZE", defaults.max_page_size).max(1),
            },
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults() {
        let config = PaginationConfig::default();
        assert_eq!(config.page_request(None, None), Some(PageRequest::new(1, 10)));
        assert_eq!(config.page_request(Some(""), None), Some(PageRequest::new(1, 10)));
    }

    #[test]
    fn test_invalid_page_is_rejected() {
        let config = PaginationConfig::default();
        assert_eq!(config.page_request(Some("0"), None), None);
        assert_eq!(config.page_request(Some("abc"), None), None);
        assert_eq!(config.page_request(Some("-1"), None), None);
    }

    #[test]
    fn test_page_size_falls_back_and_caps() {
        let config = PaginationConfig::default();
        assert_eq!(config.page_request(Some("2"), Some("5")), Some(PageRequest::new(2, 5)));
        assert_eq!(config.page_request(None, Some("zero")), Some(PageRequest::new(1, 10)));
        assert_eq!(config.page_request(None, Some("0")), Some(PageRequest::new(1, 10)));
        assert_eq!(config.page_request(None, Some("5000")), Some(PageRequest::new(1, 100)));
    }
}
