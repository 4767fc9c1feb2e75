use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("wrong account or password")]
    InvalidCredentials,
}

/// The artist account allowed to upload and delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

/// Login state for the gallery controls.
#[derive(Debug, Clone)]
pub struct Session {
    credentials: Credentials,
    logged_in: bool,
}

impl Session {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            logged_in: false,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    /// Account names are matched trimmed and case-insensitively; passwords exactly.
    pub fn login(&mut self, user: &str, password: &str) -> Result<(), AuthError> {
        let user = user.trim().to_lowercase();
        if user == self.credentials.user.to_lowercase() && password == self.credentials.password {
            self.logged_in = true;
            info!("Artist logged in");
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    pub fn logout(&mut self) {
        if self.logged_in {
            info!("Artist logged out");
        }
        self.logged_in = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(Credentials {
            user: "dpig".into(),
            password: "3088".into(),
        })
    }

    #[test]
    fn test_login_normalizes_account() {
        let mut session = session();
        assert!(session.login("  DPig ", "3088").is_ok());
        assert!(session.is_logged_in());
    }

    #[test]
    fn test_wrong_password_stays_logged_out() {
        let mut session = session();
        assert_eq!(
            session.login("dpig", "3089"),
            Err(AuthError::InvalidCredentials)
        );
        assert!(!session.is_logged_in());
        // Passwords are not trimmed
        assert!(session.login("dpig", " 3088").is_err());
    }

    #[test]
    fn test_logout() {
        let mut session = session();
        session.login("dpig", "3088").unwrap();
        session.logout();
        assert!(!session.is_logged_in());
    }
}
