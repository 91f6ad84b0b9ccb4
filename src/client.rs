use crate::error::{EzidError, Result};
use reqwest::blocking::{Client, ClientBuilder};
use reqwest::Proxy;
use std::time::Duration;
use url::Url;

/// Default EZID service endpoint
pub const DEFAULT_SERVER: &str = "https://ezid.cdlib.org";

/// Create the HTTP client for EZID requests from a configuration
pub fn create_http_client(config: &Config) -> Result<Client> {
    let mut builder = ClientBuilder::new()
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(config.user_agent.clone());

    if let Some(ref proxy) = config.proxy {
        let proxy = Proxy::all(proxy.as_str())
            .map_err(|e| EzidError::Config(format!("invalid proxy {}: {}", proxy, e)))?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| EzidError::Config(format!("failed to create HTTP client: {}", e)))
}

/// Configuration for the EZID client
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the service
    pub server: Url,
    /// Total time allowed for one request
    pub timeout: Duration,
    /// Time allowed to establish a connection
    pub connect_timeout: Duration,
    /// Proxy used for both http and https
    pub proxy: Option<Url>,
    /// User-Agent header value
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: Url::parse(DEFAULT_SERVER).expect("default server URL is valid"),
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            proxy: None,
            user_agent: format!("ezid-rs/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Config {
    /// Create a new configuration pointing at the given server
    pub fn new(server: &str) -> Result<Self> {
        Ok(Config {
            server: parse_server(server)?,
            ..Config::default()
        })
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Route every request through a proxy
    pub fn with_proxy(mut self, proxy: &str) -> Result<Self> {
        self.proxy = Some(Url::parse(proxy)?);
        Ok(self)
    }

    /// Set the User-Agent header
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Get the base URL for requests, without a trailing slash
    pub fn base_url(&self) -> String {
        self.server.as_str().trim_end_matches('/').to_string()
    }
}

fn parse_server(server: &str) -> Result<Url> {
    let url = Url::parse(server)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(EzidError::Config(format!(
            "unsupported server scheme: {}",
            other
        ))),
    }
}
