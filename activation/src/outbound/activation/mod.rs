//! Activation backend outbound adapters.
//!
//! This module provides a thin HTTP implementation of the
//! `ActivationGateway` port.

mod dto;
mod http_gateway;

pub use http_gateway::HttpActivationGateway;
