use serde::Serialize;
use std::fmt;

/// Username/password pair for services behind basic authentication.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct UsernamePasswordCredential {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl UsernamePasswordCredential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for UsernamePasswordCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsernamePasswordCredential")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
