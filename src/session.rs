// session.rs
//! Credential state captured from a login response

use std::collections::{BTreeMap, HashMap};

use crate::constants::*;
use crate::error::FgtError;

type Result<T> = std::result::Result<T, FgtError>;

/// Cookie set and derived CSRF header of one login.
///
/// A `Session` only exists in authenticated form: it is built from a cookie set that
/// carries a non-empty `ccsrftoken`, so holding one means the headers are derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Session {
    cookies: BTreeMap<String, String>,
    headers: HashMap<String, String>,
}

impl Session {
    /// Validate a login cookie set and derive the request headers from it
    pub fn from_cookies(cookies: BTreeMap<String, String>) -> Result<Self> {
        let token = cookies
            .get(COOKIE_CSRF_TOKEN)
            .map(|value| Self::unquote(value))
            .filter(|value| !value.is_empty())
            .ok_or_else(|| FgtError::MissingRequiredCookie(COOKIE_CSRF_TOKEN.to_string()))?
            .to_string();

        let mut headers = HashMap::new();
        headers.insert(HTTP_HEADER_NAME_CSRF_TOKEN.to_string(), token);
        Ok(Self { cookies, headers })
    }

    pub fn cookies(&self) -> &BTreeMap<String, String> {
        &self.cookies
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn csrf_token(&self) -> &str {
        self.headers.get(HTTP_HEADER_NAME_CSRF_TOKEN).map(String::as_str).unwrap_or_default()
    }

    pub fn has_session_cookie(&self) -> bool {
        self.cookies.keys().any(|name| name.starts_with(COOKIE_SESSION_PREFIX))
    }

    // The appliance sends the token as a quoted cookie value
    fn unquote(value: &str) -> &str {
        value.strip_prefix('"').and_then(|v| v.strip_suffix('"')).unwrap_or(value)
    }
}
