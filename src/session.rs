use base64::{engine::general_purpose::STANDARD, Engine};

/// Name of the cookie EZID uses for sessions
pub const SESSION_COOKIE: &str = "sessionid";

/// Username and password for the login endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Create a new credentials pair
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Get the username
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Value for the `Authorization` header of a Basic login
    pub fn basic_auth_header(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {}", token)
    }
}

// Keep the password out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// How a client authenticates when it is constructed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Auth {
    /// Anonymous; only public identifiers can be viewed
    #[default]
    None,
    /// A session id returned by an earlier login
    SessionId(String),
    /// Username and password, exchanged for a session on first use
    Credentials(Credentials),
}

impl Auth {
    /// Shorthand for `Auth::Credentials`
    pub fn credentials(username: impl Into<String>, password: impl Into<String>) -> Self {
        Auth::Credentials(Credentials::new(username, password))
    }
}

/// Session state held by a client
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Session {
    session_id: Option<String>,
}

impl Session {
    /// Create a session from an existing session id
    pub fn new(session_id: impl Into<String>) -> Self {
        let mut session = Session::default();
        session.set_session_id(Some(session_id.into()));
        session
    }

    /// Get the session id, if authenticated
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Replace the session id; `None` or an empty string clears it
    pub fn set_session_id(&mut self, session_id: Option<String>) {
        self.session_id = session_id.filter(|s| !s.is_empty());
    }

    /// Drop the session
    pub fn clear(&mut self) {
        self.session_id = None;
    }

    /// Check if a session id is present
    pub fn is_authenticated(&self) -> bool {
        self.session_id.is_some()
    }

    /// Value for the `Cookie` header
    pub fn cookie(&self) -> Option<String> {
        self.session_id
            .as_ref()
            .map(|id| format!("{}={}", SESSION_COOKIE, id))
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

/// Extract the session id from a `Set-Cookie` header value.
///
/// Expects `sessionid=<value>; ...` and returns the text between `=` and the
/// first `;`. Returns `None` for other cookies or an empty value.
pub fn parse_session_cookie(header: &str) -> Option<String> {
    let pair = header.split(';').next()?.trim();
    let (name, value) = pair.split_once('=')?;
    if name.trim() != SESSION_COOKIE {
        return None;
    }
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_derivation() {
        let mut session = Session::new("abc123");
        assert!(session.is_authenticated());
        assert_eq!(session.cookie().as_deref(), Some("sessionid=abc123"));

        session.set_session_id(Some(String::new()));
        assert!(!session.is_authenticated());
        assert_eq!(session.cookie(), None);

        session.set_session_id(Some("def".to_string()));
        session.clear();
        assert_eq!(session.session_id(), None);
    }

    #[test]
    fn test_parse_session_cookie() {
        assert_eq!(
            parse_session_cookie("sessionid=x1y2z3; expires=Tue, 01-Jan-2030 00:00:00 GMT; Path=/"),
            Some("x1y2z3".to_string())
        );
        assert_eq!(
            parse_session_cookie("sessionid=x1y2z3"),
            Some("x1y2z3".to_string())
        );
        assert_eq!(parse_session_cookie("csrftoken=abc; Path=/"), None);
        assert_eq!(parse_session_cookie("sessionid=; Path=/"), None);
        assert_eq!(parse_session_cookie("garbage"), None);
    }

    #[test]
    fn test_basic_auth_header() {
        let credentials = Credentials::new("apitest", "apitest");
        assert_eq!(credentials.basic_auth_header(), "Basic YXBpdGVzdDphcGl0ZXN0");
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let credentials = Credentials::new("user", "hunter2");
        let debug = format!("{:?}", Auth::Credentials(credentials));
        assert!(debug.contains("user"));
        assert!(!debug.contains("hunter2"));

        let session = format!("{:?}", Session::new("secret-session"));
        assert!(!session.contains("secret-session"));
    }
}
