// client_builder.rs
//! Builder pattern for constructing FortiGate session clients with validation

use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::client_http::{RequesterHttp, SessionClient};
use crate::constants::*;
use crate::error::FgtError;
use crate::models::{normalize_base_url, ClientConfig, Scheme};

type Result<T> = std::result::Result<T, FgtError>;

/// Builder for creating FortiGate session clients
///
/// # Examples
///
/// ```no_run
/// use fgtapi::ClientBuilder;
///
/// # async fn run() -> Result<(), fgtapi::FgtError> {
/// let client = ClientBuilder::new()
///     .host("192.168.1.99")
///     .credentials("admin", "secret")
///     .ssl_ca_cert("/etc/ssl/fortigate-ca.pem")
///     .timeout_secs(30)
///     .connect()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct ClientBuilder {
    host: Option<String>,
    username: Option<String>,
    secret_key: Option<String>,
    scheme: Scheme,
    debug_level: u8,
    ssl_ca_cert: Option<PathBuf>,
    accept_invalid_certs: bool,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Read settings from `FGT_HOST`, `FGT_USERNAME`, `FGT_SECRET_KEY` and the optional
    /// `FGT_SCHEME`, `FGT_DEBUG`, `FGT_INSECURE`
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::new()
            .host(Self::required_env(ENV_HOST)?)
            .credentials(Self::required_env(ENV_USERNAME)?, Self::required_env(ENV_SECRET_KEY)?);

        if let Ok(scheme) = env::var(ENV_SCHEME) {
            builder = builder.scheme(scheme.parse()?);
        }
        if let Ok(level) = env::var(ENV_DEBUG) {
            let level = level.trim().parse::<u8>().map_err(|e| {
                FgtError::ConfigurationError(format!("Invalid {} value '{}': {}", ENV_DEBUG, level, e))
            })?;
            builder = builder.debug_level(level);
        }
        if let Ok(insecure) = env::var(ENV_INSECURE) {
            builder = builder.danger_accept_invalid_certs(Self::parse_flag(ENV_INSECURE, &insecure)?);
        }

        Ok(builder)
    }

    fn required_env(name: &str) -> Result<String> {
        env::var(name).map_err(|_| FgtError::ConfigurationError(format!("Missing environment variable: {}", name)))
    }

    fn parse_flag(name: &str, value: &str) -> Result<bool> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            other => Err(FgtError::ConfigurationError(format!("Invalid {} value '{}'", name, other))),
        }
    }

    /// Set the appliance address, with or without `http://`/`https://` prefix
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the login credentials
    pub fn credentials(mut self, username: impl Into<String>, secret_key: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    /// Set the URL scheme
    ///
    /// Default: `https`
    pub fn scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = scheme;
        self
    }

    /// Dump requests and responses at debug log level when greater than zero
    pub fn debug_level(mut self, level: u8) -> Self {
        self.debug_level = level;
        self
    }

    /// Trust an additional PEM CA certificate
    pub fn ssl_ca_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.ssl_ca_cert = Some(path.into());
        self
    }

    /// Accept any server certificate, including self-signed ones.
    ///
    /// Default: `false`
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Set request timeout in seconds
    ///
    /// Default: 60 seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Some(Duration::from_secs(secs));
        self
    }

    /// Set request timeout
    ///
    /// Default: 60 seconds
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Validate the configuration and turn it into a `ClientConfig`
    fn into_config(self) -> Result<ClientConfig> {
        let host = self
            .host
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| FgtError::ConfigurationError("host is required".to_string()))?;
        let username = self
            .username
            .filter(|u| !u.is_empty())
            .ok_or_else(|| FgtError::ConfigurationError("username is required".to_string()))?;

        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(FgtError::ConfigurationError("timeout must be greater than zero".to_string()));
        }

        normalize_base_url(&host, self.scheme)
            .map_err(|e| FgtError::ConfigurationError(format!("Invalid host '{}': {}", host, e)))?;

        let mut config = ClientConfig::new(host, username, self.secret_key.unwrap_or_default());
        config.scheme = self.scheme;
        config.debug_level = self.debug_level;
        config.ssl_ca_cert = self.ssl_ca_cert;
        config.accept_invalid_certs = self.accept_invalid_certs;
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        Ok(config)
    }

    /// Build an unauthenticated client
    pub fn build(self) -> Result<Arc<SessionClient>> {
        SessionClient::new(self.into_config()?)
    }

    /// Build the client and log in
    pub async fn connect(self) -> Result<Arc<SessionClient>> {
        let config = self.into_config()?;
        let http_requester = RequesterHttp::new(&config)?;
        SessionClient::connect_with(Box::new(http_requester), config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_validation() {
        // Should fail: no host
        let result = ClientBuilder::new().credentials("admin", "pw").build();
        assert!(matches!(result, Err(FgtError::ConfigurationError(_))));

        // Should fail: no username
        let result = ClientBuilder::new().host("10.0.0.1").build();
        assert!(matches!(result, Err(FgtError::ConfigurationError(_))));

        // Should fail: host is only a scheme
        let result = ClientBuilder::new().host("https://").credentials("admin", "pw").build();
        assert!(matches!(result, Err(FgtError::ConfigurationError(_))));

        // Should fail: zero timeout
        let result = ClientBuilder::new().host("10.0.0.1").credentials("admin", "pw").timeout_secs(0).build();
        assert!(matches!(result, Err(FgtError::ConfigurationError(_))));
    }

    #[test]
    fn test_builder_missing_ca_file() {
        let result = ClientBuilder::new()
            .host("10.0.0.1")
            .credentials("admin", "pw")
            .ssl_ca_cert("/nonexistent/fgtapi/ca.pem")
            .build();
        assert!(matches!(result, Err(FgtError::IoError(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_builder_keeps_non_utf8_ca_path() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = PathBuf::from(OsStr::from_bytes(b"/etc/ssl/fgt-\xff.pem"));
        let config = ClientBuilder::new()
            .host("10.0.0.1")
            .credentials("admin", "pw")
            .ssl_ca_cert(path.clone())
            .into_config()
            .unwrap();
        assert_eq!(config.ssl_ca_cert, Some(path));
    }

    #[test]
    fn test_builder_applies_settings() {
        let client = ClientBuilder::new()
            .host("https://fgt.lab:8443/")
            .credentials("admin", "")
            .scheme(Scheme::Http)
            .danger_accept_invalid_certs(true)
            .timeout(Duration::from_millis(1500))
            .build()
            .unwrap();

        assert_eq!(client.base_url(), "http://fgt.lab:8443");
        assert_eq!(client.api_url(), "http://fgt.lab:8443/api/v2");
        assert_eq!(client.username(), "admin");
        assert!(!client.is_authenticated());
    }

    #[test]
    fn test_parse_flag() {
        assert!(ClientBuilder::parse_flag(ENV_INSECURE, "TRUE").unwrap());
        assert!(!ClientBuilder::parse_flag(ENV_INSECURE, "0").unwrap());
        assert!(ClientBuilder::parse_flag(ENV_INSECURE, "maybe").is_err());
    }

    // The only test in this binary that touches the environment
    #[test]
    fn test_from_env() {
        for name in [ENV_HOST, ENV_USERNAME, ENV_SECRET_KEY, ENV_SCHEME, ENV_DEBUG, ENV_INSECURE] {
            env::remove_var(name);
        }
        assert!(matches!(ClientBuilder::from_env(), Err(FgtError::ConfigurationError(_))));

        env::set_var(ENV_HOST, "http://10.1.1.1");
        env::set_var(ENV_USERNAME, "api-admin");
        env::set_var(ENV_SECRET_KEY, "pw");
        env::set_var(ENV_SCHEME, "http");
        env::set_var(ENV_DEBUG, "2");
        let client = ClientBuilder::from_env().unwrap().build().unwrap();
        assert_eq!(client.base_url(), "http://10.1.1.1");
        assert_eq!(client.username(), "api-admin");

        env::set_var(ENV_DEBUG, "loud");
        assert!(matches!(ClientBuilder::from_env(), Err(FgtError::ConfigurationError(_))));

        for name in [ENV_HOST, ENV_USERNAME, ENV_SECRET_KEY, ENV_SCHEME, ENV_DEBUG] {
            env::remove_var(name);
        }
    }
}
