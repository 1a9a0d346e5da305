// models.rs

use reqwest::Method;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::constants::*;
use crate::error::FgtError;

type Result<T> = std::result::Result<T, FgtError>;

/// URL scheme used to reach the appliance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    Http,
    #[default]
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl FromStr for Scheme {
    type Err = FgtError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            other => Err(FgtError::ConfigurationError(format!("unsupported scheme '{}'", other))),
        }
    }
}

/// Top-level API category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKind {
    /// Read-oriented status endpoints
    Monitor,
    /// Configuration-object CRUD
    Cmdb,
}

impl ApiKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monitor => "monitor",
            Self::Cmdb => "cmdb",
        }
    }
}

impl FromStr for ApiKind {
    type Err = FgtError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "monitor" => Ok(Self::Monitor),
            "cmdb" => Ok(Self::Cmdb),
            other => {
                Err(FgtError::InvalidArgument(format!("api parameter must be either \"monitor\" or \"cmdb\", got '{}'", other)))
            }
        }
    }
}

impl fmt::Display for ApiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a request method; only GET, POST, PUT and DELETE are accepted (case-insensitive)
pub fn parse_method(method: &str) -> Result<Method> {
    match method.to_ascii_lowercase().as_str() {
        "get" => Ok(Method::GET),
        "post" => Ok(Method::POST),
        "put" => Ok(Method::PUT),
        "delete" => Ok(Method::DELETE),
        _ => Err(FgtError::InvalidArgument(format!("invalid request method '{}'", method))),
    }
}

/// Address of an API resource below `/api/v2/{monitor|cmdb}`
///
/// `path`, `name` and `action` may contain `/` to reach nested endpoints,
/// `mkey` is always sent as one percent-encoded segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub path: String,
    pub name: String,
    pub action: Option<String>,
    pub mkey: Option<String>,
}

impl Resource {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self { path: path.into(), name: name.into(), action: None, mkey: None }
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn mkey(mut self, mkey: impl Into<String>) -> Self {
        self.mkey = Some(mkey.into());
        self
    }

    /// Build `{api_url}/{api}/{path}/{name}[/{action}][/{mkey}]`
    pub(crate) fn url(&self, api_url: &str, api: ApiKind) -> Result<String> {
        if self.path.trim_matches('/').is_empty() || self.name.trim_matches('/').is_empty() {
            return Err(FgtError::InvalidArgument("resource path and name must not be empty".to_string()));
        }

        let mut url = Url::parse(api_url)?;
        {
            let mut segments =
                url.path_segments_mut().map_err(|_| FgtError::InvalidUrl(format!("cannot be a base: {}", api_url)))?;
            segments.pop_if_empty().push(api.as_str());
            for piece in [Some(&self.path), Some(&self.name), self.action.as_ref()].into_iter().flatten() {
                segments.extend(piece.split('/').filter(|s| !s.is_empty()));
            }
            if let Some(mkey) = &self.mkey {
                segments.push(mkey);
            }
        }
        Ok(url.into())
    }
}

/// Strip any `http://`/`https://` prefix from `host` and prepend `scheme` exactly once
pub(crate) fn normalize_base_url(host: &str, scheme: Scheme) -> Result<String> {
    let host = host.trim();
    let lower = host.to_ascii_lowercase();
    let stripped = ["https://", "http://"]
        .iter()
        .find(|prefix| lower.starts_with(*prefix))
        .map_or(host, |prefix| &host[prefix.len()..])
        .trim_end_matches('/');

    if stripped.is_empty() {
        return Err(FgtError::ConfigurationError("host must not be empty".to_string()));
    }

    let base_url = format!("{}://{}", scheme.as_str(), stripped);
    Url::parse(&base_url)?;
    Ok(base_url)
}

/// Connection parameters and credentials of one session
#[derive(Clone)]
pub struct ClientConfig {
    pub host: String,
    pub username: String,
    pub secret_key: String,
    pub scheme: Scheme,
    pub debug_level: u8,
    pub ssl_ca_cert: Option<PathBuf>,
    pub accept_invalid_certs: bool,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, username: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            secret_key: secret_key.into(),
            scheme: Scheme::default(),
            debug_level: 0,
            ssl_ca_cert: None,
            accept_invalid_certs: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("secret_key", &"<redacted>")
            .field("scheme", &self.scheme)
            .field("debug_level", &self.debug_level)
            .field("ssl_ca_cert", &self.ssl_ca_cert)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url_with_and_without_scheme() {
        let expected = "https://10.0.0.1";
        for host in ["10.0.0.1", "http://10.0.0.1", "https://10.0.0.1", "HTTPS://10.0.0.1/", " 10.0.0.1 "] {
            assert_eq!(normalize_base_url(host, Scheme::Https).unwrap(), expected, "host {:?}", host);
        }
        assert_eq!(normalize_base_url("https://fgt.lab:8443", Scheme::Http).unwrap(), "http://fgt.lab:8443");
    }

    #[test]
    fn test_normalize_base_url_rejects_empty_host() {
        assert!(matches!(normalize_base_url("https://", Scheme::Https), Err(FgtError::ConfigurationError(_))));
        assert!(matches!(normalize_base_url("   ", Scheme::Https), Err(FgtError::ConfigurationError(_))));
    }

    #[test]
    fn test_resource_url_without_optional_segments() {
        let url = Resource::new("firewall", "policy").url("https://fgt/api/v2", ApiKind::Cmdb).unwrap();
        assert_eq!(url, "https://fgt/api/v2/cmdb/firewall/policy");
    }

    #[test]
    fn test_resource_url_with_action_and_mkey() {
        let url = Resource::new("firewall", "policy")
            .action("select")
            .mkey("3")
            .url("https://fgt/api/v2", ApiKind::Cmdb)
            .unwrap();
        assert_eq!(url, "https://fgt/api/v2/cmdb/firewall/policy/select/3");
    }

    #[test]
    fn test_resource_url_mkey_only_and_encoding() {
        let url = Resource::new("firewall", "address")
            .mkey("web server/1")
            .url("https://fgt/api/v2", ApiKind::Cmdb)
            .unwrap();
        assert_eq!(url, "https://fgt/api/v2/cmdb/firewall/address/web%20server%2F1");
    }

    #[test]
    fn test_resource_url_nested_path() {
        let url = Resource::new("system", "interface/select").url("https://fgt/api/v2", ApiKind::Monitor).unwrap();
        assert_eq!(url, "https://fgt/api/v2/monitor/system/interface/select");
    }

    #[test]
    fn test_resource_url_rejects_empty_name() {
        let result = Resource::new("firewall", "").url("https://fgt/api/v2", ApiKind::Cmdb);
        assert!(matches!(result, Err(FgtError::InvalidArgument(_))));
    }

    #[test]
    fn test_parse_method() {
        assert_eq!(parse_method("get").unwrap(), Method::GET);
        assert_eq!(parse_method("DELETE").unwrap(), Method::DELETE);
        assert!(matches!(parse_method("patch"), Err(FgtError::InvalidArgument(_))));
    }

    #[test]
    fn test_parse_api_kind() {
        assert_eq!("monitor".parse::<ApiKind>().unwrap(), ApiKind::Monitor);
        assert_eq!("cmdb".parse::<ApiKind>().unwrap(), ApiKind::Cmdb);
        assert!(matches!("bogus".parse::<ApiKind>(), Err(FgtError::InvalidArgument(_))));
    }

    #[test]
    fn test_config_debug_redacts_secret() {
        let config = ClientConfig::new("fgt", "admin", "s3cr3t");
        let printed = format!("{:?}", config);
        assert!(!printed.contains("s3cr3t"));
        assert!(printed.contains("<redacted>"));
    }
}
