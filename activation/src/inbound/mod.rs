//! Inbound adapters that translate external requests into domain calls while
//! keeping framework details at the edge.
//!
//! HTTP handlers for the reference backend live under [`http`]; the
//! command-line presenter for the client lives under [`cli`].

pub mod cli;
pub mod http;
