//! Cookie-style key-value store
//!
//! Legacy storage location. One cookie per line:
//!
//! ```text
//! loggedAlbums=%5B%7B%22title%22...; expires=Tue, 05 Aug 2025 12:00:00 +0000
//! ```
//!
//! Values are percent-encoded. Lines that are expired or do not parse are
//! ignored on read and dropped on the next write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::KeyValueStore;
use crate::time::{days_from_now, now, parse_cookie_date, to_cookie_date};
use crate::{Error, Result};

/// Lifetime given to every cookie written by this store
pub const COOKIE_LIFETIME_DAYS: i64 = 365;

#[derive(Debug, Clone, PartialEq)]
struct Cookie {
    name: String,
    value: String,
    expires: Option<DateTime<Utc>>,
}

impl Cookie {
    fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split(';');
        let (name, raw_value) = parts.next()?.trim().split_once('=')?;
        if name.is_empty() {
            return None;
        }
        let value = urlencoding::decode(raw_value).ok()?.into_owned();

        let mut expires = None;
        for attr in parts {
            if let Some((key, val)) = attr.trim().split_once('=') {
                if key.eq_ignore_ascii_case("expires") {
                    expires = Some(parse_cookie_date(val)?);
                }
            }
        }

        Some(Self {
            name: name.to_string(),
            value,
            expires,
        })
    }

    fn render(&self) -> String {
        let mut line = format!("{}={}", self.name, urlencoding::encode(&self.value));
        if let Some(expires) = &self.expires {
            line.push_str("; expires=");
            line.push_str(&to_cookie_date(expires));
        }
        line
    }

    fn is_live(&self, at: DateTime<Utc>) -> bool {
        self.expires.map_or(true, |exp| exp > at)
    }
}

/// Store persisted as a cookie jar text file
#[derive(Debug, Clone)]
pub struct CookieJarStore {
    path: PathBuf,
}

impl CookieJarStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<Cookie>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::Io(e)),
        };

        let at = now();
        let mut cookies = Vec::new();
        for line in content.lines().filter(|l| !l.trim().is_empty()) {
            match Cookie::parse(line) {
                Some(cookie) if cookie.is_live(at) => cookies.push(cookie),
                Some(cookie) => debug!(name = %cookie.name, "Dropping expired cookie"),
                None => debug!(path = %self.path.display(), "Skipping malformed cookie line"),
            }
        }
        Ok(cookies)
    }

    async fn save(&self, cookies: &[Cookie]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut content = cookies
            .iter()
            .map(Cookie::render)
            .collect::<Vec<_>>()
            .join("\n");
        content.push('\n');

        let temp_path = self.path.with_extension("txt.tmp");
        tokio::fs::write(&temp_path, content).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for CookieJarStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .find(|c| c.name == key)
            .map(|c| c.value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut cookies = self.load().await?;
        cookies.retain(|c| c.name != key);
        cookies.push(Cookie {
            name: key.to_string(),
            value: value.to_string(),
            expires: Some(days_from_now(COOKIE_LIFETIME_DAYS)),
        });
        self.save(&cookies).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut cookies = self.load().await?;
        let before = cookies.len();
        cookies.retain(|c| c.name != key);
        if cookies.len() != before {
            self.save(&cookies).await?;
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.load().await?.into_iter().map(|c| c.name).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_and_render() {
        let cookie = Cookie::parse("minRating=7; expires=Tue, 05 Aug 2025 12:00:00 +0000").unwrap();
        assert_eq!(cookie.name, "minRating");
        assert_eq!(cookie.value, "7");
        assert!(cookie.expires.is_some());
        assert_eq!(Cookie::parse(&cookie.render()), Some(cookie));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(Cookie::parse("no equals sign").is_none());
        assert!(Cookie::parse("=value").is_none());
        assert!(Cookie::parse("k=v; expires=someday").is_none());
    }

    #[tokio::test]
    async fn test_values_are_percent_encoded_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookies.txt");
        let store = CookieJarStore::new(&path);

        let value = r#"[{"title":"A; B","artist":"C=D"}]"#;
        store.set("loggedAlbums", value).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("A; B"));
        assert_eq!(
            store.get("loggedAlbums").await.unwrap().as_deref(),
            Some(value)
        );
    }

    #[tokio::test]
    async fn test_expired_cookie_is_invisible() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookies.txt");
        std::fs::write(
            &path,
            "old=1; expires=Thu, 01 Jan 1970 00:00:00 GMT\nfresh=2\n",
        )
        .unwrap();

        let store = CookieJarStore::new(&path);
        assert_eq!(store.get("old").await.unwrap(), None);
        assert_eq!(store.get("fresh").await.unwrap().as_deref(), Some("2"));
        assert_eq!(store.keys().await.unwrap(), vec!["fresh"]);
    }

    #[tokio::test]
    async fn test_delete_removes_line() {
        let dir = TempDir::new().unwrap();
        let store = CookieJarStore::new(dir.path().join("cookies.txt"));
        store.set("a", "1").await.unwrap();
        store.set("b", "2").await.unwrap();

        store.delete("a").await.unwrap();
        assert_eq!(store.keys().await.unwrap(), vec!["b"]);
    }
}
