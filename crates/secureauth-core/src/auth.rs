//! Mocked login and signup.
//!
//! There is no identity provider behind this flow. A form that passes
//! [`validate_form`] is accepted after a short artificial delay, a
//! [`UserRecord`] is written to the [`SessionStore`] and returned. The delay
//! only imitates a network round trip; it carries no ordering guarantees.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::AuthError;
use crate::session::{SessionStore, UserRecord};

/// Delay applied before a submitted form is accepted.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

/// Token handed to every mock session.
pub const MOCK_TOKEN: &str = "jwt-token-example";

/// Counted in UTF-16 code units, the way browsers measure form input.
const MIN_PASSWORD_UNITS: usize = 8;
const DEFAULT_NAME: &str = "Valued";
const DEFAULT_FAMILY: &str = "User";

#[allow(clippy::expect_used)]
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex must compile")
});

/// Which form is being submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    #[default]
    Login,
    Signup,
}

impl AuthMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Signup => "signup",
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthMode {
    type Err = String;

    /// Exact match on `login` / `signup`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "login" => Ok(Self::Login),
            "signup" => Ok(Self::Signup),
            other => Err(format!("unknown auth mode '{other}'")),
        }
    }
}

/// Submitted form fields. Signup-only fields may be left empty on login.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub name: String,
    pub family: String,
}

/// Per-field rejection messages. Empty means the form is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm_password: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<&'static str>,
}

impl FormErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields().next().is_none()
    }

    /// `(field, message)` pairs in form order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        [
            ("email", self.email),
            ("password", self.password),
            ("confirmPassword", self.confirm_password),
            ("name", self.name),
            ("family", self.family),
        ]
        .into_iter()
        .filter_map(|(field, msg)| msg.map(|m| (field, m)))
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, msg)) in self.fields().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {msg}")?;
        }
        Ok(())
    }
}

/// Check the form for `mode`.
#[must_use]
pub fn validate_form(mode: AuthMode, creds: &Credentials) -> FormErrors {
    let mut errors = FormErrors::default();

    if creds.email.is_empty() {
        errors.email = Some("email is required");
    } else if !EMAIL.is_match(&creds.email) {
        errors.email = Some("email format is invalid");
    }

    if creds.password.is_empty() {
        errors.password = Some("password is required");
    } else if creds.password.encode_utf16().count() < MIN_PASSWORD_UNITS {
        errors.password = Some("password must be at least 8 characters");
    }

    if mode == AuthMode::Signup {
        if creds.password != creds.confirm_password {
            errors.confirm_password = Some("passwords do not match");
        }
        if creds.name.is_empty() {
            errors.name = Some("name is required");
        }
        if creds.family.is_empty() {
            errors.family = Some("family name is required");
        }
    }

    errors
}

/// An API-key-looking string: `sk-` followed by 9 lowercase base-36 digits.
#[must_use]
pub fn generate_api_key() -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut n = uuid::Uuid::new_v4().as_u128();
    let mut key = String::with_capacity(12);
    key.push_str("sk-");
    for _ in 0..9 {
        // n % 36 < 36, the cast cannot truncate.
        #[allow(clippy::cast_possible_truncation)]
        key.push(char::from(DIGITS[(n % 36) as usize]));
        n /= 36;
    }
    key
}

/// Accepts any well-formed form and records a session.
#[derive(Debug, Clone)]
pub struct MockAuthenticator {
    sessions: SessionStore,
    delay: Duration,
}

impl MockAuthenticator {
    #[must_use]
    pub fn new(sessions: SessionStore) -> Self {
        Self::with_delay(sessions, DEFAULT_DELAY)
    }

    #[must_use]
    pub fn with_delay(sessions: SessionStore, delay: Duration) -> Self {
        Self { sessions, delay }
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Validate, wait, persist.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidForm`] when validation rejects a field, otherwise
    /// [`AuthError::Failed`] for any later failure.
    pub async fn submit(
        &self,
        mode: AuthMode,
        creds: &Credentials,
    ) -> Result<UserRecord, AuthError> {
        let errors = validate_form(mode, creds);
        if !errors.is_empty() {
            return Err(AuthError::InvalidForm(errors));
        }

        tokio::time::sleep(self.delay).await;

        let or_default = |value: &str, default: &str| {
            let chosen = if value.is_empty() { default } else { value };
            chosen.to_owned()
        };
        let user = UserRecord {
            email: creds.email.clone(),
            name: or_default(&creds.name, DEFAULT_NAME),
            family: or_default(&creds.family, DEFAULT_FAMILY),
            token: MOCK_TOKEN.to_owned(),
            api_key: (mode == AuthMode::Signup).then(generate_api_key),
        };

        self.sessions.persist(&user).await.map_err(|e| {
            warn!(%mode, error = %e, "failed to persist session");
            AuthError::Failed
        })?;

        info!(%mode, "mock session created");
        Ok(user)
    }
}
