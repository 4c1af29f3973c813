// Cookie store trait and the JSON file implementation

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

use crate::config::ConfigError;

/// Synchronous cookie lookup keyed by platform name ("youtube")
pub trait CookieStore: Send + Sync {
    fn get_cookie(&self, platform: &str) -> Option<String>;
}

/// Store that never has cookies
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCookies;

impl CookieStore for NoCookies {
    fn get_cookie(&self, _platform: &str) -> Option<String> {
        None
    }
}

impl CookieStore for HashMap<String, String> {
    fn get_cookie(&self, platform: &str) -> Option<String> {
        self.get(platform).cloned()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CookieEntry {
    One(String),
    Many(Vec<String>),
}

struct CookiePool {
    cookies: Vec<String>,
    next: AtomicUsize,
}

/// Cookies loaded from a JSON file shaped like
/// `{ "youtube": ["SID=...; HSID=...", "..."], "other": "a=b" }`.
///
/// Platforms with several cookies hand them out round-robin.
pub struct JsonCookieStore {
    pools: HashMap<String, CookiePool>,
}

impl JsonCookieStore {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_json(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        info!(path = %path.display(), platforms = store.pools.len(), "loaded cookies");
        Ok(store)
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let raw: HashMap<String, CookieEntry> = serde_json::from_str(content)?;

        let pools = raw
            .into_iter()
            .map(|(platform, entry)| {
                let cookies = match entry {
                    CookieEntry::One(cookie) => vec![cookie],
                    CookieEntry::Many(cookies) => cookies,
                };
                let cookies = cookies.into_iter().filter(|c| !c.trim().is_empty()).collect();
                (
                    platform,
                    CookiePool {
                        cookies,
                        next: AtomicUsize::new(0),
                    },
                )
            })
            .collect();

        Ok(Self { pools })
    }
}

impl CookieStore for JsonCookieStore {
    fn get_cookie(&self, platform: &str) -> Option<String> {
        let pool = self.pools.get(platform)?;
        if pool.cookies.is_empty() {
            return None;
        }

        let index = pool.next.fetch_add(1, Ordering::Relaxed) % pool.cookies.len();
        debug!(platform, index, "using stored cookie");
        pool.cookies.get(index).cloned()
    }
}
