// constants.rs

// Endpoints
pub const LOGIN_URI: &str = "/logincheck";
pub const LOGOUT_URI: &str = "/logout";
pub const API_URI: &str = "/api/v2";

// HTTP headers
pub const HTTP_HEADER_NAME_CSRF_TOKEN: &str = "X-CSRFTOKEN";
pub const HTTP_HEADER_KEY_USER_AGENT: &str = "User-Agent";
pub const HTTP_HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HTTP_USER_AGENT: &str = "fgtapi/rust";

// Content types
pub const CONTENT_TYPE_JSON: &str = "application/json";
pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";

// Cookie names
pub const COOKIE_CSRF_TOKEN: &str = "ccsrftoken";
pub const COOKIE_SESSION_PREFIX: &str = "APSCOOKIE_";

// Login form keys
pub const HTTP_BODY_KEY_USERNAME: &str = "username";
pub const HTTP_BODY_KEY_SECRET_KEY: &str = "secretkey";

// Environment variables read by ClientBuilder::from_env
pub const ENV_HOST: &str = "FGT_HOST";
pub const ENV_USERNAME: &str = "FGT_USERNAME";
pub const ENV_SECRET_KEY: &str = "FGT_SECRET_KEY";
pub const ENV_SCHEME: &str = "FGT_SCHEME";
pub const ENV_DEBUG: &str = "FGT_DEBUG";
pub const ENV_INSECURE: &str = "FGT_INSECURE";

// Defaults
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
