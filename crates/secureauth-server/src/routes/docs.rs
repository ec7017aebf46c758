//! Integration guide served at `/docs`.
//!
//! Lists the redirect parameters and their rules, and sample links built
//! with the same [`IncomingLink`](secureauth_core::link::IncomingLink) the
//! CLI uses, so the samples always point at this deployment.

use std::fmt::Write as _;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;

use secureauth_core::redirect::{ALLOWED_ROLES, RedirectParams};

use super::ui::{escape, page};
use crate::state::AppState;

/// Build the docs router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/docs", get(docs_page))
}

struct Sample {
    title: &'static str,
    role: &'static str,
    website: &'static str,
    name: Option<&'static str>,
    family: Option<&'static str>,
}

const SAMPLES: [Sample; 3] = [
    Sample {
        title: "Minimum required parameters",
        role: "visitor",
        website: "example.com",
        name: None,
        family: None,
    },
    Sample {
        title: "With full user details",
        role: "user",
        website: "shop.domain.ir",
        name: Some("Alireza"),
        family: Some("Ahmadi"),
    },
    Sample {
        title: "Administrator",
        role: "admin",
        website: "panel.company.ir",
        name: Some("Fatemeh"),
        family: Some("Karimi"),
    },
];

async fn docs_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let mut body = String::from("<h1>Redirect integration</h1>");

    let _ = write!(
        body,
        "<h2>Parameters</h2><ul>\
         <li><code>role</code> (required): one of {}.</li>\
         <li><code>website</code> (required): your domain without a path, e.g. <code>example.com</code>. \
         A leading <code>http://</code> or <code>https://</code> is ignored.</li>\
         <li><code>name</code> (optional): used to greet the user.</li>\
         <li><code>family</code> (optional): the user's family name.</li></ul>",
        ALLOWED_ROLES.join(", ")
    );

    body.push_str("<h2>Sample links</h2>");
    for sample in &SAMPLES {
        let params = RedirectParams {
            role: Some(sample.role.to_owned()),
            website: Some(sample.website.to_owned()),
            name: sample.name.map(str::to_owned),
            family: sample.family.map(str::to_owned),
        };
        // Samples always carry role and website, so building cannot fail.
        if let Ok(url) = state.links.build(&params) {
            let _ = write!(
                body,
                "<div class=\"card\"><h3>{}</h3><code>{}</code></div>",
                sample.title,
                escape(url.as_str())
            );
        }
    }

    body.push_str(
        "<h2>Coming back</h2><p>After sign-in the user returns to \
         <code>https://your-site/auth-callback?token=…&amp;status=success</code>. \
         Treat anything other than <code>status=success</code> with a non-empty \
         <code>token</code> as a failure.</p>",
    );

    Html(page("Docs", &body))
}
