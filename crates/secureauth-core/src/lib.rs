//! Core library for `SecureAuth`.
//!
//! The heart of the crate is [`redirect::validate`], a pure function that
//! turns the query parameters of an inbound redirect into a [`redirect::Verdict`].
//! Around it sit the collaborators the landing page uses: the bounded
//! [`attempt_log`], the single-slot [`session`] store, the mocked sign-in flow
//! in [`auth`], and URL helpers in [`link`]. Storage is abstracted through
//! `secureauth-storage`; nothing in this crate knows about HTTP.

pub mod attempt_log;
pub mod auth;
pub mod error;
pub mod link;
pub mod redirect;
pub mod session;
