//! `SecureAuth` HTTP server.
//!
//! Serves the marketing pages, the `/incoming` redirect landing page and its
//! JSON twin, and the mocked sign-in API. All decisions are delegated to
//! `secureauth-core`; this crate only wires requests to it.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
