use super::CookieJar;
use crate::error::StoreError;
use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use std::sync::Mutex;

/// Lifetime of the language cookie.
pub const COOKIE_EXPIRY_DAYS: i64 = 30;

/// Build the `name=value;expires=<date>` assignment for the language cookie.
///
/// Name and value are percent-encoded; the expiry is 30 days from now as an
/// HTTP date.
pub fn cookie_assignment(name: &str, value: &str) -> String {
    let expires = Utc::now() + Duration::days(COOKIE_EXPIRY_DAYS);
    format!(
        "{}={};expires={}",
        urlencoding::encode(name),
        urlencoding::encode(value),
        expires.format("%a, %d %b %Y %H:%M:%S GMT")
    )
}

/// Extract and decode the value of cookie `name` from a `document.cookie` style string.
pub fn read_cookie(cookies: &str, name: &str) -> Option<String> {
    let name = regex::escape(&urlencoding::encode(name));
    let pattern = Regex::new(&format!(r"(?:^{name}|;\s*{name})=(.*?)(?:;|$)", name = name)).ok()?;

    let raw = pattern.captures(cookies)?.get(1)?.as_str();
    urlencoding::decode(raw).ok().map(|value| value.into_owned())
}

#[derive(Debug, Clone)]
struct StoredCookie {
    name: String,
    value: String,
    expires: Option<DateTime<Utc>>,
}

/// In-process cookie jar with `document.cookie` semantics.
#[derive(Debug)]
pub struct MemoryCookieJar {
    cookies: Mutex<Vec<StoredCookie>>,
    last_assignment: Mutex<Option<String>>,
    available: bool,
}

impl Default for MemoryCookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self {
            cookies: Mutex::new(Vec::new()),
            last_assignment: Mutex::new(None),
            available: true,
        }
    }

    /// A jar that throws on every access.
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    /// The most recent raw assignment, as passed to `set_cookie`.
    pub fn last_assignment(&self) -> Option<String> {
        self.last_assignment.lock().ok().and_then(|last| last.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<StoredCookie>>, StoreError> {
        if !self.available {
            return Err(StoreError::Unavailable("cookies are disabled".to_string()));
        }
        self.cookies
            .lock()
            .map_err(|_| StoreError::Unavailable("cookie jar lock poisoned".to_string()))
    }
}

fn parse_assignment(assignment: &str) -> Option<StoredCookie> {
    let mut parts = assignment.split(';');
    let (name, value) = parts.next()?.split_once('=')?;

    let expires = parts
        .map(str::trim)
        .filter_map(|attr| attr.split_once('='))
        .find(|(key, _)| key.eq_ignore_ascii_case("expires"))
        .and_then(|(_, date)| DateTime::parse_from_rfc2822(date).ok())
        .map(|date| date.with_timezone(&Utc));

    Some(StoredCookie {
        name: name.trim().to_string(),
        value: value.trim().to_string(),
        expires,
    })
}

impl CookieJar for MemoryCookieJar {
    fn cookie_string(&self) -> Result<String, StoreError> {
        let now = Utc::now();
        let cookies = self.lock()?;

        Ok(cookies
            .iter()
            .filter(|cookie| cookie.expires.map_or(true, |expires| expires > now))
            .map(|cookie| format!("{}={}", cookie.name, cookie.value))
            .collect::<Vec<_>>()
            .join("; "))
    }

    fn set_cookie(&self, assignment: &str) -> Result<(), StoreError> {
        let mut cookies = self.lock()?;
        let cookie = parse_assignment(assignment).ok_or_else(|| {
            StoreError::Unavailable(format!("malformed cookie assignment '{}'", assignment))
        })?;

        cookies.retain(|existing| existing.name != cookie.name);
        cookies.push(cookie);
        drop(cookies);

        if let Ok(mut last) = self.last_assignment.lock() {
            *last = Some(assignment.to_string());
        }
        Ok(())
    }
}
