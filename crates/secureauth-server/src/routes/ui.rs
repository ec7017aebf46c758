//! Marketing pages and the shared HTML shell.
//!
//! `/`, `/features` and `/pricing` are static. Every HTML page in the server
//! goes through [`page`], and every untrusted value through [`escape`].

use std::fmt::Write as _;
use std::sync::Arc;

use axum::Router;
use axum::response::Html;
use axum::routing::get;

use crate::state::AppState;

/// Build the marketing router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(landing_page))
        .route("/features", get(features_page))
        .route("/pricing", get(pricing_page))
}

struct Feature {
    title: &'static str,
    description: &'static str,
}

const FEATURES: [Feature; 8] = [
    Feature {
        title: "Layered security",
        description: "AES-256 encryption, threat detection and round-the-clock monitoring.",
    },
    Feature {
        title: "Two-factor authentication",
        description: "SMS and email codes, authenticator apps, FIDO2 keys and biometrics.",
    },
    Feature {
        title: "User management",
        description: "Roles, permissions, groups and a full activity audit trail.",
    },
    Feature {
        title: "High performance",
        description: "Real-time request handling on auto-scaling infrastructure.",
    },
    Feature {
        title: "Behaviour analytics",
        description: "Spot suspicious patterns before they turn into break-ins.",
    },
    Feature {
        title: "Session control",
        description: "See every active session and end any of them remotely.",
    },
    Feature {
        title: "Multilingual",
        description: "Interfaces localized for the markets you sell to.",
    },
    Feature {
        title: "Mobile first",
        description: "Responsive flows tuned for phones and tablets.",
    },
];

struct Plan {
    name: &'static str,
    price: &'static str,
    blurb: &'static str,
    popular: bool,
    includes: &'static [&'static str],
}

const PLANS: [Plan; 3] = [
    Plan {
        name: "Starter",
        price: "Free",
        blurb: "For small projects and testing.",
        popular: false,
        includes: &[
            "Up to 1,000 active users",
            "Basic authentication",
            "Email support",
            "Full documentation",
        ],
    },
    Plan {
        name: "Professional",
        price: "490,000 toman / month",
        blurb: "For growing businesses.",
        popular: true,
        includes: &[
            "Up to 10,000 active users",
            "Two-factor authentication",
            "Behaviour analytics",
            "Priority support",
            "Full API access",
        ],
    },
    Plan {
        name: "Enterprise",
        price: "1,490,000 toman / month",
        blurb: "For large organizations.",
        popular: false,
        includes: &[
            "Unlimited users",
            "Dedicated 24/7 support",
            "Guaranteed 99.9% SLA",
            "Custom deployment and team training",
        ],
    },
];

async fn landing_page() -> Html<String> {
    let mut body = String::from(
        r#"<section class="hero"><h1>Secure authentication for your users</h1>
<p>Send visitors from your site with a single redirect link and let SecureAuth take it from there.</p>
<p><a class="btn" href="/pricing">Get started</a> <a class="btn btn-outline" href="/docs">Read the docs</a></p></section>
<section class="grid">"#,
    );
    for feature in FEATURES.iter().take(4) {
        push_card(&mut body, feature.title, feature.description);
    }
    body.push_str("</section><h2>Plans</h2><section class=\"grid\">");
    for plan in &PLANS {
        push_card(&mut body, plan.name, plan.price);
    }
    body.push_str("</section>");
    Html(page("Home", &body))
}

async fn features_page() -> Html<String> {
    let mut body = String::from("<h1>Features</h1><section class=\"grid\">");
    for feature in &FEATURES {
        push_card(&mut body, feature.title, feature.description);
    }
    body.push_str("</section>");
    Html(page("Features", &body))
}

async fn pricing_page() -> Html<String> {
    let mut body = String::from("<h1>Pricing</h1><section class=\"grid\">");
    for plan in &PLANS {
        let class = if plan.popular { "card popular" } else { "card" };
        let _ = write!(
            body,
            "<div class=\"{class}\"><h3>{}</h3><p class=\"price\">{}</p><p>{}</p><ul>",
            plan.name, plan.price, plan.blurb
        );
        for item in plan.includes {
            let _ = write!(body, "<li>{item}</li>");
        }
        body.push_str("</ul></div>");
    }
    body.push_str("</section>");
    Html(page("Pricing", &body))
}

fn push_card(out: &mut String, title: &str, text: &str) {
    let _ = write!(out, "<div class=\"card\"><h3>{title}</h3><p>{text}</p></div>");
}

/// Escape text for inclusion in HTML element content or a quoted attribute.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wrap `body` (already escaped) in the site layout.
pub fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en"><head><meta charset="utf-8"/><meta name="viewport" content="width=device-width,initial-scale=1"/>
<title>{title} &middot; SecureAuth</title>
<style>
*{{box-sizing:border-box;margin:0;padding:0}}
body{{font-family:system-ui,-apple-system,sans-serif;background:#0F172A;color:#E2E8F0;line-height:1.6}}
a{{color:#38BDF8;text-decoration:none}}
nav{{display:flex;gap:16px;max-width:1000px;margin:0 auto;padding:20px 24px}}
nav .logo{{font-weight:800;color:#F8FAFC;margin-right:auto}}
main{{max-width:1000px;margin:0 auto;padding:24px}}
h1{{font-size:32px;margin-bottom:16px}}
.hero{{text-align:center;padding:64px 0}}
.grid{{display:grid;grid-template-columns:repeat(auto-fit,minmax(220px,1fr));gap:16px;margin:24px 0}}
.card{{background:rgba(255,255,255,.04);border:1px solid rgba(255,255,255,.08);border-radius:12px;padding:20px}}
.card.popular{{border-color:#38BDF8}}
.price{{font-size:20px;font-weight:700}}
.btn{{display:inline-block;padding:10px 24px;border-radius:999px;background:#38BDF8;color:#0F172A;font-weight:700}}
.btn-outline{{background:transparent;color:#E2E8F0;border:1px solid #475569}}
.error{{color:#F87171}}
code{{background:#1E293B;padding:2px 6px;border-radius:4px;word-break:break-all}}
</style></head><body>
<nav><a class="logo" href="/">SecureAuth</a><a href="/features">Features</a><a href="/pricing">Pricing</a><a href="/docs">Docs</a></nav>
<main>{body}</main>
</body></html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(
            escape(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
        assert_eq!(escape("علی"), "علی");
    }

    #[test]
    fn page_wraps_body_with_title() {
        let html = page("Docs", "<p>hi</p>");
        assert!(html.contains("<title>Docs &middot; SecureAuth</title>"));
        assert!(html.contains("<main><p>hi</p></main>"));
    }
}
