// client_http.rs

use async_trait::async_trait;
use bytes::Bytes;
use cookie::Cookie;
use log::{debug, error, warn};
use reqwest::{Client as ReqwestClient, Method};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::constants::*;
use crate::error::FgtError;
use crate::models::*;
use crate::requester::Requester;
use crate::response_ext::ResponseExt;
use crate::session::Session;

type Result<T> = std::result::Result<T, FgtError>;

/// HTTP-based requester implementation
pub struct RequesterHttp {
    client: ReqwestClient,
}

impl RequesterHttp {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut client_builder = ReqwestClient::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs);

        // SSL setup
        if let Some(ssl_ca_cert) = &config.ssl_ca_cert {
            let cert_bytes = std::fs::read(ssl_ca_cert)?;
            client_builder = client_builder.add_root_certificate(reqwest::Certificate::from_pem(&cert_bytes)?);
        }
        if config.accept_invalid_certs {
            warn!("TLS certificate verification is disabled for {}", config.host);
        }

        Ok(Self { client: client_builder.build()? })
    }

    async fn to_http_response(resp: reqwest::Response) -> Result<http::Response<Bytes>> {
        let (status, headers, body) = (resp.status(), resp.headers().clone(), resp.bytes().await?);

        let mut http_resp = http::Response::new(body);
        *http_resp.status_mut() = status;
        *http_resp.headers_mut() = headers;
        Ok(http_resp)
    }

    fn cookie_header(cookies: &BTreeMap<String, String>) -> String {
        cookies
            .iter()
            .map(|(name, value)| Cookie::new(name.as_str(), value.as_str()).stripped().to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[async_trait]
impl Requester for RequesterHttp {
    async fn send(
        &self,
        method: Method,
        url: &str,
        headers: HashMap<String, String>,
        cookies: &BTreeMap<String, String>,
        query: Option<&[(String, String)]>,
        body: Option<Vec<u8>>,
    ) -> Result<http::Response<Bytes>> {
        debug!("{} {}", method, url);

        let mut req = self.client.request(method, url);

        let mut all_headers = headers;
        all_headers.entry(HTTP_HEADER_KEY_USER_AGENT.to_string()).or_insert_with(|| HTTP_USER_AGENT.to_string());
        for (k, v) in all_headers {
            req = req.header(k, v);
        }

        if !cookies.is_empty() {
            req = req.header(http::header::COOKIE, Self::cookie_header(cookies));
        }

        if let Some(query) = query {
            req = req.query(query);
        }

        if let Some(body) = body {
            req = req.body(body);
        }

        let resp = req.send().await?;
        Self::to_http_response(resp).await
    }
}

/// Client for one FortiGate REST API session.
///
/// Login captures the `ccsrftoken` cookie set; every later request echoes those cookies
/// and sends the token as `X-CSRFTOKEN`. Session state sits behind a mutex so a shared
/// `Arc<SessionClient>` can be used from several tasks, but the client itself never
/// issues requests concurrently.
pub struct SessionClient {
    requester: Box<dyn Requester>,
    config: ClientConfig,
    base_url: String,
    api_url: String,
    session: Mutex<Option<Session>>,
}

impl std::fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionClient")
            .field("base_url", &self.base_url)
            .field("username", &self.config.username)
            .field("authenticated", &self.is_authenticated())
            .field("requester", &"<dyn Requester>")
            .finish()
    }
}

impl SessionClient {
    //
    // Session/Client initialization
    //

    /// Create an unauthenticated client using the reqwest transport
    pub fn new(config: ClientConfig) -> Result<Arc<Self>> {
        let http_requester = RequesterHttp::new(&config)?;
        Self::with_requester(Box::new(http_requester), config)
    }

    /// Create an unauthenticated client with a custom requester
    pub fn with_requester(requester: Box<dyn Requester>, config: ClientConfig) -> Result<Arc<Self>> {
        let base_url = normalize_base_url(&config.host, config.scheme)?;
        let api_url = format!("{}{}", base_url, API_URI);

        Ok(Arc::new(Self { requester, config, base_url, api_url, session: Mutex::new(None) }))
    }

    /// Create a client and log in. Fails if no session could be established.
    pub async fn authenticate(
        host: &str,
        username: &str,
        secret_key: &str,
        debug_level: u8,
    ) -> Result<Arc<Self>> {
        let mut config = ClientConfig::new(host, username, secret_key);
        config.debug_level = debug_level;

        let http_requester = RequesterHttp::new(&config)?;
        Self::connect_with(Box::new(http_requester), config).await
    }

    /// Create a client on top of `requester` and log in
    pub async fn connect_with(requester: Box<dyn Requester>, config: ClientConfig) -> Result<Arc<Self>> {
        let client = Self::with_requester(requester, config)?;
        client.login().await?;
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn username(&self) -> &str {
        &self.config.username
    }

    fn session(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn debug_enabled(&self) -> bool {
        self.config.debug_level > 0
    }

    //
    // Authentication Management
    //

    /// Log in with the configured credentials.
    ///
    /// On success the previous session (if any) is replaced. When the appliance answers
    /// without a CSRF token the current state is kept and `AuthenticationFailed` is returned.
    pub async fn login(&self) -> Result<()> {
        let login_url = format!("{}{}", self.base_url, LOGIN_URI);
        debug!("Attempting authentication to: {} as {}", login_url, self.config.username);

        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair(HTTP_BODY_KEY_USERNAME, &self.config.username)
            .append_pair(HTTP_BODY_KEY_SECRET_KEY, &self.config.secret_key)
            .finish();
        let mut headers = HashMap::new();
        headers.insert(HTTP_HEADER_CONTENT_TYPE.to_string(), CONTENT_TYPE_FORM.to_string());

        let response = self
            .requester
            .send(Method::POST, &login_url, headers, &BTreeMap::new(), None, Some(body.into_bytes()))
            .await
            .inspect_err(|e| error!("Login request to {} failed: {}", login_url, e))?;

        if self.debug_enabled() {
            Self::res_debug(&response);
        }
        let response = Self::ensure_success(response).inspect_err(|e| error!("Login to {} rejected: {}", login_url, e))?;

        match self.update_session(response.cookies()) {
            Ok(()) => {
                debug!("Authentication successful for {}", self.config.username);
                Ok(())
            }
            Err(_) => {
                error!("Authentication failed for {} at {}", self.config.username, login_url);
                Err(FgtError::AuthenticationFailed(format!("no CSRF token issued by {}", login_url)))
            }
        }
    }

    /// Replace the session with one derived from `cookies`.
    ///
    /// Requires a non-empty `ccsrftoken`; otherwise nothing changes.
    pub fn update_session(&self, cookies: BTreeMap<String, String>) -> Result<()> {
        let session = Session::from_cookies(cookies).inspect_err(|e| error!("{}", e))?;
        if !session.has_session_cookie() {
            warn!("Login response carried no {}* session cookie", COOKIE_SESSION_PREFIX);
        }

        *self.session() = Some(session);
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }

    /// Current CSRF token, if authenticated
    pub fn csrf_token(&self) -> Option<String> {
        self.session().as_ref().map(|session| session.csrf_token().to_string())
    }

    /// Cookie set captured at login; empty when unauthenticated
    pub fn session_cookies(&self) -> BTreeMap<String, String> {
        self.session().as_ref().map(|session| session.cookies().clone()).unwrap_or_default()
    }

    /// Log out of the current session.
    ///
    /// Local session state is dropped before the request is sent, so the client is
    /// unauthenticated afterwards whatever the appliance answers. Without a session this
    /// is a no-op.
    pub async fn logout(&self) -> Result<()> {
        let session = { self.session().take() };
        let Some(session) = session else {
            debug!("Logout skipped: no active session");
            return Ok(());
        };

        let logout_url = format!("{}{}", self.base_url, LOGOUT_URI);
        debug!("Logging out from {}", logout_url);

        let response = self
            .requester
            .send(Method::POST, &logout_url, session.headers().clone(), session.cookies(), None, None)
            .await
            .inspect_err(|e| error!("Logout request to {} failed: {}", logout_url, e))?;

        if !response.status().is_success() {
            warn!("Logout from {} returned HTTP {}", logout_url, response.status());
        }
        Ok(())
    }

    /// Run `f` with this client and log out afterwards, whether `f` succeeded or not.
    ///
    /// The error of `f` takes precedence over a logout error.
    pub async fn with_session<F, Fut, T>(self: &Arc<Self>, f: F) -> Result<T>
    where
        F: FnOnce(Arc<Self>) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let result = f(Arc::clone(self)).await;
        let logout = self.logout().await;

        match (result, logout) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), _) => Err(e),
        }
    }

    //
    // Resource execution
    //

    /// Issue `method` against `/api/v2/{api}/{path}/{name}[/{action}][/{mkey}]` and decode
    /// the JSON response.
    ///
    /// `method` is one of get/post/put/delete and `api` is `monitor` or `cmdb`; anything
    /// else is rejected before the network is touched.
    #[allow(clippy::too_many_arguments)]
    pub async fn execute(
        &self,
        method: &str,
        api: &str,
        path: &str,
        name: &str,
        action: Option<&str>,
        mkey: Option<&str>,
        query: Option<&[(&str, &str)]>,
        payload: Option<&Value>,
    ) -> Result<Value> {
        let method = parse_method(method).inspect_err(|e| error!("{}", e))?;
        let api = api.parse::<ApiKind>().inspect_err(|e| error!("{}", e))?;

        let mut resource = Resource::new(path, name);
        if let Some(action) = action {
            resource = resource.action(action);
        }
        if let Some(mkey) = mkey {
            resource = resource.mkey(mkey);
        }

        self.request(method, api, &resource, query, payload).await
    }

    /// Typed variant of [`SessionClient::execute`]
    pub async fn request(
        &self,
        method: Method,
        api: ApiKind,
        resource: &Resource,
        query: Option<&[(&str, &str)]>,
        payload: Option<&Value>,
    ) -> Result<Value> {
        if ![Method::GET, Method::POST, Method::PUT, Method::DELETE].contains(&method) {
            let e = FgtError::InvalidArgument(format!("invalid request method '{}'", method));
            error!("{}", e);
            return Err(e);
        }
        let url = resource.url(&self.api_url, api).inspect_err(|e| error!("{}", e))?;

        let session = { self.session().clone() };
        let Some(session) = session else {
            error!("{} {} refused: not authenticated", method, url);
            return Err(FgtError::NotAuthenticated);
        };

        let body = payload.map(serde_json::to_vec).transpose()?;
        let mut headers = session.headers().clone();
        if body.is_some() {
            headers.insert(HTTP_HEADER_CONTENT_TYPE.to_string(), CONTENT_TYPE_JSON.to_string());
        }
        let query: Option<Vec<(String, String)>> =
            query.map(|pairs| pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect());

        if self.debug_enabled() {
            Self::req_debug(&url, &session, query.as_deref(), payload);
        }

        let response = self
            .requester
            .send(method.clone(), &url, headers, session.cookies(), query.as_deref(), body)
            .await
            .inspect_err(|e| error!("{} {} failed: {}", method, url, e))?;

        if self.debug_enabled() {
            Self::res_debug(&response);
        }

        let response = Self::ensure_success(response).inspect_err(|e| error!("{} {}: {}", method, url, e))?;
        response.json::<Value>().inspect_err(|e| error!("{} {}: {}", method, url, e))
    }

    fn ensure_success(response: http::Response<Bytes>) -> Result<http::Response<Bytes>> {
        if response.status().is_success() {
            return Ok(response);
        }
        Err(FgtError::RequestFailed { status: response.status(), message: response.text() })
    }

    fn req_debug(url: &str, session: &Session, query: Option<&[(String, String)]>, payload: Option<&Value>) {
        debug!("---- Pre Request ----");
        debug!("Req URL: {}", url);
        debug!("Req Cookies: {:?}", session.cookies());
        debug!("Req Headers: {} = {}", HTTP_HEADER_NAME_CSRF_TOKEN, session.csrf_token());
        debug!("Req Params: {:?}", query);
        match payload.map(serde_json::to_string_pretty) {
            Some(Ok(pretty)) => debug!("Req Payload:\n{}", pretty),
            Some(Err(e)) => debug!("Req Payload: <unprintable: {}>", e),
            None => debug!("Req Payload: --no payload"),
        }
    }

    fn res_debug(response: &http::Response<Bytes>) {
        debug!("----- Req Results ----");
        debug!("Response Code: {}", response.status());
        debug!("Response Cookies: {:?}", response.cookies());
        debug!("Response Headers: {:?}", response.headers());
        debug!("Response Body: {}", response.text());
    }
}
