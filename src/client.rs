//! Have I Been Pwned async client implementation.

use std::fmt;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use url::Url;

use crate::dispatch::Query;
use crate::{Breach, DataClasses, Error, Paste, Result, validate_email};

const BASE_URL: &str = "https://haveibeenpwned.com/api/v3/";
const USER_AGENT_VALUE: &str = "haveibeenpwned-client/v0.1";
const TIMEOUT: Duration = Duration::from_secs(10);
const POOL_MAX_IDLE_PER_HOST: usize = 20;

/// Async client for the Have I Been Pwned v3 API.
///
/// Use [`Client::new`] for defaults or [`Client::builder`] to point at a
/// different endpoint or tune the transport. The client is cheap to clone
/// and safe to share between tasks; clones reuse the same connection pool.
///
/// Every operation takes a [`CancellationToken`]. Cancelling it aborts the
/// in-flight request and the call returns [`Error::Cancelled`].
#[derive(Clone)]
pub struct Client {
    pub(crate) http: reqwest::Client,
    pub(crate) api_key: String,
    pub(crate) base_url: Url,
    pub(crate) user_agent: String,
    proxy: Option<String>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .field("user_agent", &self.user_agent)
            .field("proxy", &self.proxy)
            .finish()
    }
}

impl Client {
    /// Create a builder for configuring the client.
    pub fn builder(api_key: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(api_key)
    }

    /// Create a client with the default endpoint and transport settings.
    ///
    /// # Examples
    /// ```no_run
    /// # use hibp_client::Client;
    /// let client = Client::new("my-api-key")?;
    /// # Ok::<(), hibp_client::Error>(())
    /// ```
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        ClientBuilder::new(api_key).build()
    }

    /// The endpoint all resource paths are resolved against.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// The `user-agent` sent with every request.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Get the proxy URL if one was configured.
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    /// All breaches an account appears in.
    ///
    /// Requires an API key. The email is validated locally first and nothing
    /// is sent if it is rejected.
    ///
    /// # Arguments
    /// * `email` - The account to look up
    /// * `domain` - Only return breaches of this domain
    /// * `truncate_response` - Return breach names only
    /// * `include_unverified` - Include unverified breaches
    ///
    /// # Examples
    /// ```no_run
    /// # use hibp_client::Client;
    /// # use hibp_client::CancellationToken;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), hibp_client::Error> {
    /// let client = Client::new("my-api-key")?;
    /// let cancel = CancellationToken::new();
    /// let breaches = client
    ///     .breached_account(&cancel, "info@example.com", None, true, false)
    ///     .await?;
    /// for breach in breaches {
    ///     println!("{}", breach.name);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn breached_account(
        &self,
        cancel: &CancellationToken,
        email: &str,
        domain: Option<&str>,
        truncate_response: bool,
        include_unverified: bool,
    ) -> Result<Vec<Breach>> {
        validate_email(email)?;

        let mut query = Query::authenticated("breachedaccount").segment(email);
        if let Some(domain) = domain.filter(|d| !d.is_empty()) {
            query = query.param("domain", domain);
        }
        let query = query
            .param("truncateResponse", truncate_response.to_string())
            .param("includeUnverified", include_unverified.to_string());

        self.fetch(query, cancel).await
    }

    /// Every breach in the system, optionally filtered by domain.
    ///
    /// # Examples
    /// ```no_run
    /// # use hibp_client::Client;
    /// # use hibp_client::CancellationToken;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), hibp_client::Error> {
    /// let client = Client::new("")?;
    /// let breaches = client.breaches(&CancellationToken::new(), Some("adobe.com")).await?;
    /// println!("{}", breaches.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn breaches(
        &self,
        cancel: &CancellationToken,
        domain: Option<&str>,
    ) -> Result<Vec<Breach>> {
        let mut query = Query::public("breaches");
        if let Some(domain) = domain.filter(|d| !d.is_empty()) {
            query = query.param("domain", domain);
        }
        self.fetch(query, cancel).await
    }

    /// A single breach by its name, e.g. `Adobe`.
    pub async fn breached_site(&self, cancel: &CancellationToken, site: &str) -> Result<Breach> {
        self.fetch(Query::public("breach").segment(site), cancel).await
    }

    /// Every data class label known to the service.
    pub async fn data_classes(&self, cancel: &CancellationToken) -> Result<DataClasses> {
        self.fetch(Query::public("dataclasses"), cancel).await
    }

    /// All pastes an account appears in.
    ///
    /// Requires an API key. The email is validated locally first.
    pub async fn pasted_account(
        &self,
        cancel: &CancellationToken,
        email: &str,
    ) -> Result<Vec<Paste>> {
        validate_email(email)?;
        let query = Query::authenticated("pasteaccount").segment(email);
        self.fetch(query, cancel).await
    }
}

/// Builder for configuring a Have I Been Pwned client.
///
/// Start with [`Client::builder`] to override defaults.
#[derive(Clone)]
pub struct ClientBuilder {
    api_key: String,
    base_url: String,
    user_agent: String,
    timeout: Duration,
    pool_max_idle_per_host: usize,
    proxy: Option<String>,
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .field("pool_max_idle_per_host", &self.pool_max_idle_per_host)
            .field("proxy", &self.proxy)
            .finish()
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    ///
    /// Defaults:
    /// - `https://haveibeenpwned.com/api/v3/` endpoint
    /// - `haveibeenpwned-client/v0.1` user agent
    /// - 10 second request timeout
    /// - At most 20 idle pooled connections per host
    /// - No proxy
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            user_agent: USER_AGENT_VALUE.to_string(),
            timeout: TIMEOUT,
            pool_max_idle_per_host: POOL_MAX_IDLE_PER_HOST,
            proxy: None,
        }
    }

    /// Override the API endpoint.
    ///
    /// Useful for testing against a mock server. A trailing `/` is added
    /// when missing.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the default user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Total time allowed for a request, from connect to the end of the body.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Maximum idle connections kept per host.
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Set a proxy URL (e.g., "socks5://127.0.0.1:9050").
    ///
    /// This uses reqwest's proxy support for all requests.
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Build the client.
    ///
    /// Fails with [`Error::UrlResolution`] when the base URL cannot serve as
    /// a base, or [`Error::Transport`] when the HTTP client cannot be built.
    pub fn build(self) -> Result<Client> {
        let mut base_url = Url::parse(&self.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::UrlResolution(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .pool_max_idle_per_host(self.pool_max_idle_per_host);

        if let Some(proxy_url) = &self.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        let http = builder.build()?;

        Ok(Client {
            http,
            api_key: self.api_key,
            base_url,
            user_agent: self.user_agent,
            proxy: self.proxy,
        })
    }
}
