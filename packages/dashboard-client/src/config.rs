use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::payments::{ControllerPolicy, DEFAULT_PAGE_SIZE, DEFAULT_REVIEW_ROLE};
use crate::session::SESSION_KEY;

/// Client configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base: String,
    pub storage_dir: PathBuf,
    pub session_key: String,
    pub search_debounce: Duration,
    pub page_size: u32,
    pub review_roles: Vec<String>,
    pub refetch_after_review: bool,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8080".to_string(),
            storage_dir: PathBuf::from(".dashboard"),
            session_key: SESSION_KEY.to_string(),
            search_debounce: Duration::from_millis(300),
            page_size: DEFAULT_PAGE_SIZE,
            review_roles: vec![DEFAULT_REVIEW_ROLE.to_string()],
            refetch_after_review: false,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let page_size = match lookup("DASHBOARD_PAGE_SIZE") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|size| *size > 0)
                .context("DASHBOARD_PAGE_SIZE must be a positive number")?,
            None => defaults.page_size,
        };

        let search_debounce = match lookup("DASHBOARD_SEARCH_DEBOUNCE_MS") {
            Some(raw) => Duration::from_millis(
                raw.trim()
                    .parse()
                    .context("DASHBOARD_SEARCH_DEBOUNCE_MS must be a number of milliseconds")?,
            ),
            None => defaults.search_debounce,
        };

        let request_timeout = match lookup("DASHBOARD_REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .context("DASHBOARD_REQUEST_TIMEOUT_SECS must be a number of seconds")?,
            ),
            None => defaults.request_timeout,
        };

        let refetch_after_review = match lookup("DASHBOARD_REFETCH_AFTER_REVIEW") {
            Some(raw) => parse_bool(&raw)
                .context("DASHBOARD_REFETCH_AFTER_REVIEW must be true or false")?,
            None => defaults.refetch_after_review,
        };

        let review_roles = match lookup("DASHBOARD_REVIEW_ROLES") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|role| !role.is_empty())
                .map(str::to_string)
                .collect(),
            None => defaults.review_roles,
        };

        Ok(Self {
            api_base: lookup("DASHBOARD_API_BASE").unwrap_or(defaults.api_base),
            storage_dir: lookup("DASHBOARD_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            session_key: lookup("DASHBOARD_SESSION_KEY").unwrap_or(defaults.session_key),
            search_debounce,
            page_size,
            review_roles,
            refetch_after_review,
            request_timeout,
        })
    }

    pub fn controller_policy(&self) -> ControllerPolicy {
        ControllerPolicy {
            debounce: self.search_debounce,
            page_size: self.page_size,
            review_roles: self.review_roles.clone(),
            refetch_after_review: self.refetch_after_review,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
