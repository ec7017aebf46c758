//! Redirect parameter validation.
//!
//! A partner site sends a visitor to `/incoming?role=…&website=…&name=…&family=…`.
//! [`validate`] checks that link and returns a [`Verdict`]. It is a pure
//! function: no storage, no clock, no randomness, and it never fails. Bad
//! input simply yields `is_valid == false` with one message per broken rule.
//!
//! Rules run in a fixed order, so `errors` always lists the role problem
//! before the website problem:
//!
//! 1. `role` is required and must be one of [`ALLOWED_ROLES`] (any casing).
//! 2. `website` is required and, after stripping an `http://`/`https://`
//!    prefix and lower-casing, must look like `label.tld` or
//!    `label.label.tld`.
//! 3. `name` and `family` are passed through untouched.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Roles a partner may assign, in the order they are shown to users.
pub const ALLOWED_ROLES: [&str; 4] = ["visitor", "user", "admin", "moderator"];

const ROLE_REQUIRED: &str = "role parameter is required.";
const WEBSITE_REQUIRED: &str = "website parameter is required.";

static SCHEME: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)^https?://"));

/// `label.tld`, each label 3–63 characters.
static SINGLE_LABEL_HOST: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^[a-zA-Z0-9][a-zA-Z0-9-]{1,61}[a-zA-Z0-9]\.[a-zA-Z]{2,}$")
});

/// `label.label.tld`, each label 3–63 characters.
static TWO_LABEL_HOST: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"^[a-zA-Z0-9][a-zA-Z0-9-]{1,61}[a-zA-Z0-9]\.[a-zA-Z0-9][a-zA-Z0-9-]{1,61}[a-zA-Z0-9]\.[a-zA-Z]{2,}$",
    )
});

#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    // Patterns are literals in this file; a failure here is a typo.
    Regex::new(pattern).expect("static regex must compile")
}

/// The recognized query parameters of an inbound redirect.
///
/// Values are untrusted and kept exactly as received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
}

impl RedirectParams {
    /// Parse a raw query string (`role=admin&website=…`, leading `?` allowed).
    ///
    /// Percent-escapes and `+` are decoded as in HTML forms. Unknown keys are
    /// ignored; when a key repeats, the first occurrence wins.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                "role" => &mut params.role,
                "website" => &mut params.website,
                "name" => &mut params.name,
                "family" => &mut params.family,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }

    /// Parse the query of a full URL such as
    /// `https://secureauth.ir/incoming?role=user&website=example.com`.
    ///
    /// # Errors
    ///
    /// Returns the URL parser's error if `input` is not an absolute URL.
    pub fn from_url(input: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(input)?;
        Ok(Self::from_query(url.query().unwrap_or_default()))
    }

    /// Copy with empty strings turned into `None`.
    fn present(&self) -> Self {
        let keep = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());
        Self {
            role: keep(&self.role),
            website: keep(&self.website),
            name: keep(&self.name),
            family: keep(&self.family),
        }
    }
}

/// Outcome of validating a set of [`RedirectParams`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    /// `true` exactly when `errors` is empty.
    pub is_valid: bool,
    /// One message per violated rule, in rule order.
    pub errors: Vec<String>,
    /// The raw recognized parameters; empty values are reported as absent.
    pub data: RedirectParams,
}

/// A role accepted in the `role` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Visitor,
    User,
    Admin,
    Moderator,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Visitor => "visitor",
            Self::User => "user",
            Self::Admin => "admin",
            Self::Moderator => "moderator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a string that names no [`Role`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "visitor" => Ok(Self::Visitor),
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "moderator" => Ok(Self::Moderator),
            _ => Err(UnknownRole(s.to_owned())),
        }
    }
}

/// Strip a leading `http://` or `https://` (any casing) and lower-case the rest.
#[must_use]
pub fn normalize_website(website: &str) -> String {
    SCHEME.replace(website, "").to_lowercase()
}

/// Whether `website` is an acceptable origin host.
///
/// Ports, paths, trailing slashes, IP addresses, non-ASCII hosts and more
/// than two labels before the TLD are all rejected.
#[must_use]
pub fn is_valid_website(website: &str) -> bool {
    let host = normalize_website(website);
    SINGLE_LABEL_HOST.is_match(&host) || TWO_LABEL_HOST.is_match(&host)
}

/// Validate the parameters of an inbound redirect.
#[must_use]
pub fn validate(params: &RedirectParams) -> Verdict {
    let data = params.present();
    let mut errors = Vec::new();

    match data.role.as_deref() {
        None => errors.push(ROLE_REQUIRED.to_owned()),
        Some(role) if role.parse::<Role>().is_err() => errors.push(format!(
            "role \"{role}\" is not valid. Allowed roles: {}",
            ALLOWED_ROLES.join(", ")
        )),
        Some(_) => {}
    }

    match data.website.as_deref() {
        None => errors.push(WEBSITE_REQUIRED.to_owned()),
        Some(website) if !is_valid_website(website) => {
            errors.push(format!("website format \"{website}\" is not valid"));
        }
        Some(_) => {}
    }

    Verdict {
        is_valid: errors.is_empty(),
        errors,
        data,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn params(role: Option<&str>, website: Option<&str>) -> RedirectParams {
        RedirectParams {
            role: role.map(str::to_owned),
            website: website.map(str::to_owned),
            ..RedirectParams::default()
        }
    }

    #[test]
    fn minimal_valid_link() {
        let verdict = validate(&params(Some("visitor"), Some("example.com")));
        assert!(verdict.is_valid);
        assert!(verdict.errors.is_empty());
    }

    #[test]
    fn empty_params_report_both_required_in_order() {
        let verdict = validate(&RedirectParams::default());
        assert!(!verdict.is_valid);
        assert_eq!(verdict.errors, vec![ROLE_REQUIRED, WEBSITE_REQUIRED]);
        assert_eq!(verdict.data, RedirectParams::default());
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let verdict = validate(&params(Some(""), Some("")));
        assert_eq!(verdict.errors, vec![ROLE_REQUIRED, WEBSITE_REQUIRED]);
        assert_eq!(verdict.data.role, None);
        assert_eq!(verdict.data.website, None);
    }

    #[test]
    fn role_is_case_insensitive() {
        for role in ["visitor", "USER", "Admin", "mOdErAtOr"] {
            let verdict = validate(&params(Some(role), Some("example.com")));
            assert!(verdict.is_valid, "{role} should be accepted");
        }
    }

    #[test]
    fn unknown_role_names_value_and_allowed_set() {
        let verdict = validate(&params(Some("superadmin"), Some("example.com")));
        assert!(!verdict.is_valid);
        assert_eq!(verdict.errors.len(), 1);
        assert!(verdict.errors[0].contains("\"superadmin\""));
        assert!(verdict.errors[0].contains("visitor, user, admin, moderator"));
    }

    #[test]
    fn missing_website_only() {
        let verdict = validate(&params(Some("user"), None));
        assert_eq!(verdict.errors, vec![WEBSITE_REQUIRED]);
    }

    #[test]
    fn website_shapes() {
        let accepted = [
            "example.com",
            "https://example.com",
            "HTTP://Example.COM",
            "shop.domain.ir",
            "panel.company.ir",
            "my-site.org",
        ];
        for website in accepted {
            assert!(is_valid_website(website), "{website} should be accepted");
        }

        let rejected = [
            "not a domain",
            "ex",
            "ab.com",
            "a.b.c.d.com",
            "api.shop.domain.ir",
            "example.com/",
            "example.com:8080",
            "example.com/path",
            "192.168.1.1",
            "-example.com",
            "example-.com",
            "example.c",
            "ftp://example.com",
            "مثال.ایران",
        ];
        for website in rejected {
            assert!(!is_valid_website(website), "{website} should be rejected");
        }
    }

    #[test]
    fn data_keeps_raw_values() {
        let verdict = validate(&params(Some("ADMIN"), Some("HTTPS://Panel.Company.IR")));
        assert!(verdict.is_valid);
        assert_eq!(verdict.data.role.as_deref(), Some("ADMIN"));
        assert_eq!(verdict.data.website.as_deref(), Some("HTTPS://Panel.Company.IR"));
    }

    #[test]
    fn full_admin_link_passes_names_through() {
        let input = RedirectParams {
            role: Some("ADMIN".to_owned()),
            website: Some("panel.company.ir".to_owned()),
            name: Some("Ali".to_owned()),
            family: Some("Karimi".to_owned()),
        };
        let verdict = validate(&input);
        assert!(verdict.is_valid);
        assert_eq!(verdict.data.name.as_deref(), Some("Ali"));
        assert_eq!(verdict.data.family.as_deref(), Some("Karimi"));
    }

    #[test]
    fn both_rules_fail_with_offending_values() {
        let verdict = validate(&params(Some("king"), Some("bad host")));
        assert!(!verdict.is_valid);
        assert_eq!(verdict.errors.len(), 2);
        assert!(verdict.errors[0].contains("\"king\""));
        assert!(verdict.errors[1].contains("\"bad host\""));
    }

    #[test]
    fn query_parsing_decodes_and_ignores_extras() {
        let parsed = RedirectParams::from_query(
            "?role=user&website=shop.domain.ir&name=%D8%B9%D9%84%DB%8C&family=Ahmadi+Jr&utm=x&role=admin",
        );
        assert_eq!(parsed.role.as_deref(), Some("user"));
        assert_eq!(parsed.website.as_deref(), Some("shop.domain.ir"));
        assert_eq!(parsed.name.as_deref(), Some("علی"));
        assert_eq!(parsed.family.as_deref(), Some("Ahmadi Jr"));
    }

    #[test]
    fn url_parsing_reads_query() {
        let parsed =
            RedirectParams::from_url("https://secureauth.ir/r?role=admin&website=panel.company.ir")
                .unwrap();
        assert!(validate(&parsed).is_valid);
        assert!(RedirectParams::from_url("not a url").is_err());
    }

    #[test]
    fn verdict_serializes_camel_case_without_absent_fields() {
        let verdict = validate(&params(Some("visitor"), Some("example.com")));
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "isValid": true,
                "errors": [],
                "data": { "role": "visitor", "website": "example.com" }
            })
        );
    }

    #[test]
    fn role_round_trips_through_str() {
        for name in ALLOWED_ROLES {
            let role: Role = name.parse().unwrap();
            assert_eq!(role.to_string(), name);
        }
        assert_eq!("king".parse::<Role>(), Err(UnknownRole("king".to_owned())));
    }
}
