// requester.rs

use crate::error::FgtError;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Method;
use std::collections::{BTreeMap, HashMap};

type Result<T> = std::result::Result<T, FgtError>;

/// Transport used by `SessionClient` to reach the appliance
#[async_trait]
pub trait Requester: Send + Sync {
    /// Send one request to an absolute `url` and return the raw response.
    ///
    /// `cookies` are sent as a single `Cookie` header; the requester keeps no cookie state.
    async fn send(
        &self,
        method: Method,
        url: &str,
        headers: HashMap<String, String>,
        cookies: &BTreeMap<String, String>,
        query: Option<&[(String, String)]>,
        body: Option<Vec<u8>>,
    ) -> Result<http::Response<Bytes>>;
}
