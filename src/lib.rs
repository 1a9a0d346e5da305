// lib.rs
//! FortiGate REST API client for Rust
//!
//! A [`SessionClient`] logs in with a username and secret key, keeps the returned
//! cookie set and CSRF token, and issues GET/POST/PUT/DELETE requests against
//! `/api/v2/{monitor|cmdb}/...` resources, returning the decoded JSON.

mod client_builder;
mod client_http;
mod constants;
mod error;
mod models;
mod requester;
mod response_ext;
mod session;

pub use client_builder::ClientBuilder;
pub use client_http::{RequesterHttp, SessionClient};
pub use error::FgtError;
pub use models::{parse_method, ApiKind, ClientConfig, Resource, Scheme};
pub use requester::Requester;
pub use response_ext::ResponseExt;
