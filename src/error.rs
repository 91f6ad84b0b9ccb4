use thiserror::Error;

/// Boxed cause attached to an error that still carries an HTTP status
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Reasons a login could not produce a usable session
#[derive(Debug, Error)]
pub enum AuthError {
    /// No username/password pair is stored on the client
    #[error("no credentials available for login")]
    MissingCredentials,

    /// The login endpoint refused the credentials
    #[error("login rejected with HTTP {status}: {body}")]
    Rejected {
        status: u16,
        body: String,
        /// Failure while reading the response body, if any
        #[source]
        source: Option<BoxError>,
    },

    /// The login endpoint answered 2xx but set no `sessionid` cookie
    #[error("login response carried no session cookie")]
    NoSessionCookie,
}

/// Main error type for EZID operations
#[derive(Debug, Error)]
pub enum EzidError {
    /// Authentication failure
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Non-success HTTP status returned by the service
    #[error("HTTP error {status} {reason}: {body}")]
    Request {
        status: u16,
        reason: String,
        body: String,
        /// Failure while reading the response body, if any
        #[source]
        source: Option<BoxError>,
    },

    /// Network, TLS or timeout failure; no HTTP response exists
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Malformed ANVL input to the decoder
    #[error("malformed ANVL at line {line}: {reason}")]
    Anvl { line: usize, reason: String },

    /// Invalid client configuration (server URL, proxy, header value)
    #[error("invalid configuration: {0}")]
    Config(String),

    /// URL parsing error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EzidError {
    /// Create a new request error from a status code and response body
    pub fn request(status: reqwest::StatusCode, body: String, source: Option<BoxError>) -> Self {
        EzidError::Request {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
            body,
            source,
        }
    }

    /// Check if this error is an authentication failure
    pub fn is_auth(&self) -> bool {
        matches!(self, EzidError::Auth(_))
    }

    /// Check if this error is a not found error (404)
    pub fn is_not_found(&self) -> bool {
        matches!(self, EzidError::Request { status: 404, .. })
    }

    /// Get the HTTP status code if the service answered
    pub fn status_code(&self) -> Option<u16> {
        match self {
            EzidError::Request { status, .. } => Some(*status),
            EzidError::Auth(AuthError::Rejected { status, .. }) => Some(*status),
            EzidError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Get the response body if the service answered with one
    pub fn body(&self) -> Option<&str> {
        match self {
            EzidError::Request { body, .. } => Some(body),
            EzidError::Auth(AuthError::Rejected { body, .. }) => Some(body),
            _ => None,
        }
    }
}

/// Result type for EZID operations
pub type Result<T> = std::result::Result<T, EzidError>;
