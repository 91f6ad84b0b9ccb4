use crate::anvl::{self, Record};
use crate::client::{create_http_client, Config};
use crate::error::{AuthError, BoxError, EzidError, Result};
use crate::session::{parse_session_cookie, Auth, Credentials, Session};
use reqwest::blocking::{Client, Response as HttpResponse};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE};
use reqwest::Method;
use std::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

const ANVL_CONTENT_TYPE: &str = "text/plain; charset=UTF-8";

/// Client for the EZID identifier service.
///
/// Operations that may log in or out take `&mut self`, so one client is never
/// used from two threads at once without the caller's own locking.
pub struct EzidClient {
    /// HTTP client
    client: Client,
    /// Configuration
    config: Config,
    /// Credentials used by `login`
    credentials: Option<Credentials>,
    /// Cached session
    session: Session,
}

impl EzidClient {
    /// Create a client for the default server
    pub fn new(auth: Auth) -> Result<Self> {
        Self::with_config(Config::default(), auth)
    }

    /// Create a client with custom configuration
    pub fn with_config(config: Config, auth: Auth) -> Result<Self> {
        let client = create_http_client(&config)?;
        let (credentials, session) = match auth {
            Auth::None => (None, Session::default()),
            Auth::SessionId(id) => (None, Session::new(id)),
            Auth::Credentials(credentials) => (Some(credentials), Session::default()),
        };
        Ok(EzidClient {
            client,
            config,
            credentials,
            session,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the cached session id
    pub fn session_id(&self) -> Option<&str> {
        self.session.session_id()
    }

    /// Replace the cached session id; `None` or `""` clears it
    pub fn set_session_id(&mut self, session_id: Option<String>) {
        self.session.set_session_id(session_id);
    }

    /// Log in with the stored credentials and cache the session id
    pub fn login(&mut self) -> Result<String> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(AuthError::MissingCredentials)?;

        let request = self
            .client
            .get(self.url("login")?)
            .header(AUTHORIZATION, credentials.basic_auth_header());
        let response = self.execute(Method::GET, "login", request)?;

        let status = response.status();
        if !status.is_success() {
            let (body, source) = error_body(response);
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                body,
                source,
            }
            .into());
        }

        let session_id = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(parse_session_cookie);

        match session_id {
            Some(id) => {
                info!(user = credentials.username(), "logged in");
                self.session.set_session_id(Some(id.clone()));
                Ok(id)
            }
            None => {
                warn!("login succeeded without a session cookie");
                Err(AuthError::NoSessionCookie.into())
            }
        }
    }

    /// Log out, dropping the cached session.
    ///
    /// Returns the confirmation text from the service.
    pub fn logout(&mut self) -> Result<String> {
        let output = self.send(Method::GET, "logout".to_string(), None)?;
        self.session.clear();
        info!("logged out");
        Ok(output)
    }

    /// View an identifier's metadata. Public identifiers need no login.
    pub fn view(&self, identifier: &str) -> Result<String> {
        self.send(Method::GET, format!("id/{}", identifier), None)
    }

    /// Mint a new identifier under a shoulder and return it
    pub fn mint(&mut self, shoulder: &str, record: Option<&Record>) -> Result<String> {
        self.ensure_session()?;
        let body = record.filter(|r| !r.is_empty()).map(anvl::encode);
        let output = self.send(Method::POST, format!("shoulder/{}", shoulder), body)?;
        Ok(strip_success(&output))
    }

    /// Create an identifier, optionally with metadata
    pub fn create(&mut self, identifier: &str, record: Option<&Record>) -> Result<String> {
        self.ensure_session()?;
        let body = record.filter(|r| !r.is_empty()).map(anvl::encode);
        self.send(Method::PUT, format!("id/{}", identifier), body)
    }

    /// Update an identifier's metadata
    pub fn update(&mut self, identifier: &str, record: &Record) -> Result<String> {
        self.ensure_session()?;
        self.send(
            Method::POST,
            format!("id/{}", identifier),
            Some(anvl::encode(record)),
        )
    }

    /// Delete an identifier
    pub fn delete(&mut self, identifier: &str) -> Result<String> {
        self.ensure_session()?;
        self.send(Method::DELETE, format!("id/{}", identifier), None)
    }

    /// Log in unless a session is already cached
    fn ensure_session(&mut self) -> Result<()> {
        if !self.session.is_authenticated() {
            self.login()?;
        }
        Ok(())
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&format!("{}/{}", self.config.base_url(), path))?)
    }

    /// Issue one request carrying the session cookie and return the body text
    fn send(&self, method: Method, path: String, body: Option<String>) -> Result<String> {
        let mut request = self.client.request(method.clone(), self.url(&path)?);

        if let Some(cookie) = self.session.cookie() {
            request = request.header(COOKIE, cookie);
        }

        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, ANVL_CONTENT_TYPE)
                .body(body.into_bytes());
        }

        let response = self.execute(method, &path, request)?;
        let status = response.status();
        if !status.is_success() {
            let (text, source) = error_body(response);
            return Err(EzidError::request(status, text, source));
        }
        Ok(response.text()?)
    }

    fn execute(
        &self,
        method: Method,
        path: &str,
        request: reqwest::blocking::RequestBuilder,
    ) -> Result<HttpResponse> {
        let start = Instant::now();
        let response = request.send()?;
        debug!(
            %method,
            path,
            status = response.status().as_u16(),
            elapsed = ?start.elapsed(),
            "ezid request"
        );
        Ok(response)
    }
}

impl std::fmt::Debug for EzidClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EzidClient")
            .field("config", &self.config)
            .field("credentials", &self.credentials)
            .field("session", &self.session)
            .finish()
    }
}

/// Read the body of a failed response; a read failure becomes the error source
fn error_body(response: HttpResponse) -> (String, Option<BoxError>) {
    match response.text() {
        Ok(text) => (text, None),
        Err(e) => {
            warn!(error = %e, "could not read error response body");
            (String::new(), Some(Box::new(e)))
        }
    }
}

/// Strip the `success: ` prefix and surrounding whitespace from a mint reply
fn strip_success(output: &str) -> String {
    let trimmed = output.trim();
    trimmed
        .strip_prefix("success: ")
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = EzidClient::new(Auth::None).unwrap();
        assert_eq!(client.config().base_url(), "https://ezid.cdlib.org");
        assert_eq!(client.session_id(), None);
    }

    #[test]
    fn test_client_with_session_id() {
        let mut client = EzidClient::new(Auth::SessionId("abc".to_string())).unwrap();
        assert_eq!(client.session_id(), Some("abc"));

        client.set_session_id(None);
        assert_eq!(client.session_id(), None);
    }

    #[test]
    fn test_mutating_operation_without_credentials() {
        let mut client = EzidClient::with_config(
            Config::new("http://127.0.0.1:9").unwrap(),
            Auth::None,
        )
        .unwrap();

        let mut record = Record::new();
        record.insert("_profile".to_string(), "dc".to_string());

        let err = client.mint("ark:/99999/fk4", Some(&record)).unwrap_err();
        assert!(matches!(err, EzidError::Auth(AuthError::MissingCredentials)));

        let err = client.delete("ark:/99999/fk4x").unwrap_err();
        assert!(err.is_auth());
    }

    #[test]
    fn test_strip_success() {
        assert_eq!(strip_success("success: ark:/99999/fk412345\n"), "ark:/99999/fk412345");
        assert_eq!(
            strip_success("success: doi:10.5072/FK2ABC | ark:/b5072/fk2abc\n"),
            "doi:10.5072/FK2ABC | ark:/b5072/fk2abc"
        );
        assert_eq!(strip_success("  ark:/99999/fk4zz  "), "ark:/99999/fk4zz");
    }

    #[test]
    fn test_url_keeps_identifier_path() {
        let client = EzidClient::new(Auth::None).unwrap();
        let url = client.url("id/ark:/99999/fk4abc").unwrap();
        assert_eq!(url.as_str(), "https://ezid.cdlib.org/id/ark:/99999/fk4abc");
    }
}
