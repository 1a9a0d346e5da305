// response_ext.rs

use crate::error::FgtError;
use bytes::Bytes;
use cookie::Cookie;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::SystemTime;

/// Extension trait for working with `http::Response<Bytes>`.
pub trait ResponseExt {
    /// Collects every live `Set-Cookie` header into name -> value.
    ///
    /// Cookies with `Max-Age <= 0` or an `Expires` in the past are left out.
    fn cookies(&self) -> BTreeMap<String, String>;

    /// Reads the response body as UTF-8 text with lossy fallback.
    fn text(&self) -> String;

    /// Deserializes the response body as JSON.
    fn json<T: DeserializeOwned>(&self) -> Result<T, FgtError>;
}

impl ResponseExt for http::Response<Bytes> {
    fn cookies(&self) -> BTreeMap<String, String> {
        let now = SystemTime::now();
        let mut cookies = BTreeMap::new();

        for header in self.headers().get_all(http::header::SET_COOKIE) {
            let Some(cookie) = header.to_str().ok().and_then(|raw| Cookie::parse(raw).ok()) else {
                continue;
            };

            // A cookie that is already expired deletes any earlier value with the same name
            let expired = cookie.max_age().is_some_and(|age| age.whole_seconds() <= 0)
                || cookie.expires_datetime().is_some_and(|expires| expires <= now);
            if expired {
                cookies.remove(cookie.name());
            } else {
                cookies.insert(cookie.name().to_string(), cookie.value().to_string());
            }
        }

        cookies
    }

    fn text(&self) -> String {
        String::from_utf8_lossy(self.body()).into_owned()
    }

    fn json<T: DeserializeOwned>(&self) -> Result<T, FgtError> {
        let body = self.body();

        if body.is_empty() {
            return Err(FgtError::Decode("Empty response body".to_string()));
        }

        serde_json::from_slice::<T>(body).map_err(|e| {
            let preview_len = body.len().min(100);
            let preview = String::from_utf8_lossy(&body[..preview_len]);
            FgtError::Decode(format!("Failed to deserialize JSON: {}. Body preview: {}", e, preview))
        })
    }
}
