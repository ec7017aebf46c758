//! `SecureAuth` CLI: check redirect links and drive a `SecureAuth` server.
//!
//! `validate`, `link`, `callback` and `outcome` run offline against
//! `secureauth-core`. `logs`, `login`, `signup` and `session` talk to a
//! running server over its JSON API.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use secureauth_core::attempt_log::AttemptRecord;
use secureauth_core::link::{
    CallbackOutcome, IncomingLink, SAMPLE_TOKEN, callback_url, display_name,
};
use secureauth_core::redirect::{RedirectParams, Verdict, validate};
use secureauth_core::session::UserRecord;

// ── ANSI color helpers ───────────────────────────────────────────────

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const WHITE: &str = "\x1b[37m";

// ── CLI structure ────────────────────────────────────────────────────

/// SecureAuth redirect links for partner sites.
#[derive(Parser)]
#[command(
    name = "secureauth",
    version,
    about = "SecureAuth CLI: validate redirect links and manage mock sessions",
    long_about = None,
    after_help = format!(
        "{DIM}Environment variables:{RESET}\n  \
         SECUREAUTH_ADDR         Server address (default: http://127.0.0.1:8300)\n  \
         SECUREAUTH_PUBLIC_URL   Base URL for generated links\n\n\
         {DIM}Examples:{RESET}\n  \
         secureauth validate 'https://secureauth.ir/incoming?role=user&website=example.com'\n  \
         secureauth link --role admin --website panel.company.ir --name Fatemeh\n  \
         secureauth logs --limit 10"
    ),
)]
struct Cli {
    /// SecureAuth server address.
    #[arg(long, env = "SECUREAUTH_ADDR", default_value = "http://127.0.0.1:8300")]
    addr: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate redirect links offline. Exits 1 if any is invalid.
    Validate {
        /// Full URLs (`https://…/incoming?role=…`) or bare query strings.
        inputs: Vec<String>,
        /// Read additional inputs from a file, one per line.
        #[arg(long)]
        file: Option<String>,
        /// Print each verdict as a JSON line.
        #[arg(long)]
        json: bool,
    },
    /// Build an `/incoming` link for a partner site.
    Link {
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        website: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        family: Option<String>,
        /// Public address of the SecureAuth deployment.
        #[arg(long, env = "SECUREAUTH_PUBLIC_URL", default_value = "https://secureauth.ir")]
        base_url: String,
    },
    /// Build the callback URL a partner site receives after sign-in.
    Callback {
        #[arg(long)]
        website: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        family: Option<String>,
        #[arg(long, default_value = SAMPLE_TOKEN)]
        token: String,
    },
    /// Interpret a callback query. Exits 1 on failure.
    Outcome {
        /// Callback URL or its query string.
        input: String,
    },
    /// Show recorded redirect attempts.
    Logs {
        /// Only the most recent N attempts.
        #[arg(long)]
        limit: Option<usize>,
        /// Print raw JSON.
        #[arg(long)]
        json: bool,
    },
    /// Mock login.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SECUREAUTH_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Mock signup.
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SECUREAUTH_PASSWORD", hide_env_values = true)]
        password: String,
        /// Defaults to `--password`.
        #[arg(long)]
        confirm_password: Option<String>,
        #[arg(long)]
        name: String,
        #[arg(long)]
        family: String,
    },
    /// Show the current session.
    Session {
        /// End the session instead.
        #[arg(long)]
        clear: bool,
    },
}

// ── Pretty output helpers ────────────────────────────────────────────

fn header(icon: &str, title: &str) {
    println!("{BOLD}{CYAN}{icon} {title}{RESET}");
    println!("{DIM}─────────────────────────────────────────{RESET}");
}

fn kv_line(key: &str, value: &str) {
    println!("  {DIM}{key:<12}{RESET} {WHITE}{value}{RESET}");
}

fn success(msg: &str) {
    println!("{GREEN}{BOLD}✓{RESET} {msg}");
}

fn failure(msg: &str) {
    println!("{RED}{BOLD}✗{RESET} {RED}{msg}{RESET}");
}

fn warning(msg: &str) {
    println!("{YELLOW}{BOLD}⚠{RESET} {YELLOW}{msg}{RESET}");
}

fn print_params(params: &RedirectParams) {
    for (key, value) in [
        ("role", &params.role),
        ("website", &params.website),
        ("name", &params.name),
        ("family", &params.family),
    ] {
        if let Some(value) = value {
            kv_line(key, value);
        }
    }
}

fn print_verdict(input: &str, verdict: &Verdict) {
    header("⟐", input);
    if verdict.is_valid {
        success("valid redirect");
    } else {
        failure("invalid redirect");
        for error in &verdict.errors {
            println!("  {RED}•{RESET} {error}");
        }
    }
    print_params(&verdict.data);
    println!();
}

fn print_user(user: &UserRecord) {
    kv_line("email", &user.email);
    kv_line("name", &user.display_name());
    kv_line("token", &user.token);
    if let Some(api_key) = &user.api_key {
        kv_line("api key", api_key);
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("failed to format JSON")?);
    Ok(())
}

// ── HTTP client ──────────────────────────────────────────────────────

struct Client {
    http: reqwest::Client,
    addr: String,
}

impl Client {
    fn new(addr: String) -> Self {
        let http = reqwest::Client::new();
        let addr = addr.trim_end_matches('/').to_owned();
        Self { http, addr }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.addr)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let resp = self
            .http
            .get(self.url(path))
            .send()
            .await
            .with_context(|| format!("request to {} failed", self.addr))?;
        handle_response(resp).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<Option<T>> {
        let resp = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .with_context(|| format!("request to {} failed", self.addr))?;
        handle_response(resp).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let resp = self
            .http
            .delete(self.url(path))
            .send()
            .await
            .with_context(|| format!("request to {} failed", self.addr))?;
        handle_response::<Value>(resp).await.map(|_| ())
    }
}

/// `Ok(None)` for 204 and 404, the decoded body for other successes.
async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<Option<T>> {
    let status = resp.status();
    if status == reqwest::StatusCode::NO_CONTENT || status == reqwest::StatusCode::NOT_FOUND {
        return Ok(None);
    }
    let body = resp.text().await.context("failed to read response body")?;
    if !status.is_success() {
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v["message"].as_str().map(str::to_owned))
            .unwrap_or(body);
        bail!("server returned {status}: {message}");
    }
    serde_json::from_str(&body)
        .map(Some)
        .context("failed to parse response JSON")
}

#[derive(Deserialize)]
struct AuthResponse {
    user: UserRecord,
    message: String,
}

// ── Command dispatch ─────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let client = Client::new(cli.addr);

    match run(&client, cli.command).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!();
            eprintln!("  {RED}{BOLD}✗ Error:{RESET} {e:#}");
            eprintln!();
            ExitCode::FAILURE
        }
    }
}

async fn run(client: &Client, cmd: Commands) -> Result<ExitCode> {
    match cmd {
        Commands::Validate { inputs, file, json } => cmd_validate(inputs, file.as_deref(), json),
        Commands::Link {
            role,
            website,
            name,
            family,
            base_url,
        } => {
            let params = RedirectParams {
                role,
                website,
                name,
                family,
            };
            cmd_link(&base_url, &params)
        }
        Commands::Callback {
            website,
            name,
            family,
            token,
        } => cmd_callback(&website, name.as_deref(), family.as_deref(), &token),
        Commands::Outcome { input } => Ok(cmd_outcome(&input)),
        Commands::Logs { limit, json } => cmd_logs(client, limit, json).await,
        Commands::Login { email, password } => {
            let body = json!({ "email": email, "password": password });
            cmd_auth(client, "/v1/auth/login", &body).await
        }
        Commands::Signup {
            email,
            password,
            confirm_password,
            name,
            family,
        } => {
            let confirm_password = confirm_password.unwrap_or_else(|| password.clone());
            let body = json!({
                "email": email,
                "password": password,
                "confirmPassword": confirm_password,
                "name": name,
                "family": family,
            });
            cmd_auth(client, "/v1/auth/signup", &body).await
        }
        Commands::Session { clear } => cmd_session(client, clear).await,
    }
}

// ── Offline commands ─────────────────────────────────────────────────

/// A full URL, a path with a query, or a bare query string.
///
/// A `?` only separates a path from its query when no `=` comes before it,
/// so bare queries may carry `?` inside their values.
fn parse_input(input: &str) -> RedirectParams {
    RedirectParams::from_url(input).unwrap_or_else(|_| {
        let query = match input.split_once('?') {
            Some((path, query)) if !path.contains('=') => query,
            _ => input,
        };
        RedirectParams::from_query(query)
    })
}

fn cmd_validate(mut inputs: Vec<String>, file: Option<&str>, json: bool) -> Result<ExitCode> {
    if let Some(path) = file {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
        inputs.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_owned),
        );
    }
    if inputs.is_empty() {
        bail!("nothing to validate: pass a URL or query, or --file");
    }

    let mut all_valid = true;
    for input in &inputs {
        let verdict = validate(&parse_input(input));
        all_valid &= verdict.is_valid;
        if json {
            println!(
                "{}",
                serde_json::to_string(&verdict).context("failed to format JSON")?
            );
        } else {
            print_verdict(input, &verdict);
        }
    }

    Ok(if all_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn cmd_link(base_url: &str, params: &RedirectParams) -> Result<ExitCode> {
    let url = IncomingLink::new(base_url)?.build(params)?;
    if !validate(params).is_valid {
        eprintln!("{YELLOW}⚠ the link will be rejected by the landing page{RESET}");
    }
    println!("{url}");
    Ok(ExitCode::SUCCESS)
}

fn cmd_callback(
    website: &str,
    name: Option<&str>,
    family: Option<&str>,
    token: &str,
) -> Result<ExitCode> {
    let url = callback_url(website, &display_name(name, family), token)?;
    println!("{url}");
    Ok(ExitCode::SUCCESS)
}

fn cmd_outcome(input: &str) -> ExitCode {
    let query = input.split_once('?').map_or(input, |(_, query)| query);
    match CallbackOutcome::from_query(query) {
        CallbackOutcome::Success { token } => {
            success("sign-in succeeded");
            kv_line("token", &token);
            ExitCode::SUCCESS
        }
        CallbackOutcome::Failure => {
            failure("sign-in failed or was cancelled");
            ExitCode::FAILURE
        }
    }
}

// ── Server commands ──────────────────────────────────────────────────

async fn cmd_logs(client: &Client, limit: Option<usize>, json: bool) -> Result<ExitCode> {
    let mut records: Vec<AttemptRecord> = client
        .get("/v1/incoming/logs")
        .await?
        .unwrap_or_default();
    if let Some(limit) = limit {
        let skip = records.len().saturating_sub(limit);
        records = records.split_off(skip);
    }

    if json {
        print_json(&records)?;
        return Ok(ExitCode::SUCCESS);
    }

    header("⟐", &format!("Redirect attempts ({})", records.len()));
    if records.is_empty() {
        println!("  {DIM}(none){RESET}");
    }
    for record in &records {
        let mark = if record.is_valid {
            format!("{GREEN}✓{RESET}")
        } else {
            format!("{RED}✗{RESET}")
        };
        let params = &record.params;
        println!(
            "  {DIM}{}{RESET} {mark} {:<10} {}  {DIM}{}{RESET}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            params.role.as_deref().unwrap_or("-"),
            params.website.as_deref().unwrap_or("-"),
            display_name(params.name.as_deref(), params.family.as_deref()),
        );
    }
    Ok(ExitCode::SUCCESS)
}

async fn cmd_auth(client: &Client, path: &str, body: &Value) -> Result<ExitCode> {
    let Some(resp) = client.post::<AuthResponse>(path, body).await? else {
        bail!("server has no sign-in endpoint at {path}");
    };
    success(&resp.message);
    print_user(&resp.user);
    Ok(ExitCode::SUCCESS)
}

async fn cmd_session(client: &Client, clear: bool) -> Result<ExitCode> {
    if clear {
        client.delete("/v1/auth/session").await?;
        success("session cleared");
        return Ok(ExitCode::SUCCESS);
    }

    match client.get::<UserRecord>("/v1/auth/session").await? {
        Some(user) => {
            header("⟐", "Current session");
            print_user(&user);
        }
        None => warning("no active session"),
    }
    Ok(ExitCode::SUCCESS)
}
