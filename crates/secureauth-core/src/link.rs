//! URLs exchanged with partner sites.
//!
//! - [`IncomingLink`] builds the redirect a partner sends users to.
//! - [`callback_url`] renders the illustrative return address shown after a
//!   successful redirect.
//! - [`CallbackOutcome`] is what a partner reads back from that address.

use url::Url;

use crate::error::LinkError;
use crate::redirect::{RedirectParams, normalize_website};

/// Greeting used when the redirect carried no name.
pub const ANONYMOUS_NAME: &str = "Dear user";

/// Placeholder token shown in the sample callback URL.
pub const SAMPLE_TOKEN: &str = "JWT_TOKEN";

/// `"name family"` when both are present, else `name`, else [`ANONYMOUS_NAME`].
#[must_use]
pub fn display_name(name: Option<&str>, family: Option<&str>) -> String {
    let name = name.filter(|s| !s.is_empty());
    let family = family.filter(|s| !s.is_empty());
    match (name, family) {
        (Some(name), Some(family)) => format!("{name} {family}"),
        (Some(name), None) => name.to_owned(),
        (None, _) => ANONYMOUS_NAME.to_owned(),
    }
}

/// `https://{website}/auth-callback?token=…&status=success&user=…`
///
/// The website's scheme prefix is dropped so a raw `https://shop.ir` does not
/// end up doubled.
///
/// # Errors
///
/// Returns [`LinkError::InvalidUrl`] if the website does not form a valid
/// host.
pub fn callback_url(website: &str, user: &str, token: &str) -> Result<Url, LinkError> {
    let host = normalize_website(website);
    let base = format!("https://{host}/auth-callback");
    let mut url = Url::parse(&base).map_err(|e| LinkError::InvalidUrl {
        input: base.clone(),
        reason: e.to_string(),
    })?;
    url.query_pairs_mut()
        .append_pair("token", token)
        .append_pair("status", "success")
        .append_pair("user", user);
    Ok(url)
}

/// Builds `/incoming` links for partner sites.
#[derive(Debug, Clone)]
pub struct IncomingLink {
    base: Url,
}

impl IncomingLink {
    /// Public address of this service, e.g. `https://secureauth.ir`. Links
    /// are built under its path, so `https://host/auth` yields
    /// `https://host/auth/incoming`.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::InvalidUrl`] if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, LinkError> {
        let base = Url::parse(base_url).map_err(|e| LinkError::InvalidUrl {
            input: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self { base })
    }

    /// The `/incoming` URL carrying every non-empty parameter.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::MissingRequired`] if `role` or `website` is
    /// missing or empty.
    pub fn build(&self, params: &RedirectParams) -> Result<Url, LinkError> {
        if non_empty(&params.role).is_none() {
            return Err(LinkError::MissingRequired { field: "role" });
        }
        if non_empty(&params.website).is_none() {
            return Err(LinkError::MissingRequired { field: "website" });
        }

        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|()| LinkError::InvalidUrl {
                input: self.base.to_string(),
                reason: "base URL cannot carry a path".to_owned(),
            })?
            .pop_if_empty()
            .push("incoming");
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in [
                ("role", &params.role),
                ("website", &params.website),
                ("name", &params.name),
                ("family", &params.family),
            ] {
                if let Some(value) = non_empty(value) {
                    query.append_pair(key, value);
                }
            }
        }
        Ok(url)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// What a partner learns when the user comes back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    Success { token: String },
    Failure,
}

impl CallbackOutcome {
    /// Success only when `status=success` and a non-empty `token` are present.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut token = None;
        let mut status = None;
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "token" if token.is_none() => token = Some(value.into_owned()),
                "status" if status.is_none() => status = Some(value.into_owned()),
                _ => {}
            }
        }
        match (status.as_deref(), token) {
            (Some("success"), Some(token)) if !token.is_empty() => Self::Success { token },
            _ => Self::Failure,
        }
    }
}
