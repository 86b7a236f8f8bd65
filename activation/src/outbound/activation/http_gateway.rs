//! Reqwest-backed activation gateway.
//!
//! This adapter owns transport details only: URL construction, bearer
//! authentication, timeout and HTTP error mapping, and JSON decoding into
//! domain records.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::dto::{ClaimRequestDto, ClaimResponseDto, CodeStatusDto, ErrorDto};
use crate::domain::ports::{ActivationGateway, ActivationGatewayError};
use crate::domain::{ActivationCode, ClaimReceipt, CodeStatus, Session};

const ACTIVATION_SEGMENT: &str = "activation";
const CHECK_SEGMENT: &str = "check";
const CLAIM_SEGMENT: &str = "claim";

/// Gateway adapter that talks to one activation backend over HTTP.
pub struct HttpActivationGateway {
    client: Client,
    base_url: Url,
}

impl HttpActivationGateway {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    /// ```rust,ignore
    /// let gateway = HttpActivationGateway::new(base_url, Duration::from_secs(10));
    /// assert!(gateway.is_ok() || gateway.is_err());
    /// ```
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ActivationGatewayError> {
        build_endpoint(&self.base_url, segments)
    }
}

#[async_trait]
impl ActivationGateway for HttpActivationGateway {
    async fn check(&self, code: &ActivationCode) -> Result<CodeStatus, ActivationGatewayError> {
        let url = self.endpoint(&[ACTIVATION_SEGMENT, CHECK_SEGMENT, code.as_ref()])?;
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        decode::<CodeStatusDto>(body.as_ref())?
            .into_domain()
            .map_err(ActivationGatewayError::decode)
    }

    async fn claim(
        &self,
        session: &Session,
        code: &ActivationCode,
    ) -> Result<ClaimReceipt, ActivationGatewayError> {
        let url = self.endpoint(&[ACTIVATION_SEGMENT, CLAIM_SEGMENT])?;
        let response = self
            .client
            .post(url)
            .header(ACCEPT, "application/json")
            .bearer_auth(session.access_token().expose())
            .json(&ClaimRequestDto {
                code: code.as_ref(),
            })
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        decode::<ClaimResponseDto>(body.as_ref()).map(ClaimReceipt::from)
    }
}

fn build_endpoint(base_url: &Url, segments: &[&str]) -> Result<Url, ActivationGatewayError> {
    let mut url = base_url.clone();
    url.path_segments_mut()
        .map_err(|()| {
            ActivationGatewayError::transport(format!(
                "base URL {base_url} cannot carry path segments"
            ))
        })?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ActivationGatewayError> {
    serde_json::from_slice(body).map_err(|error| {
        ActivationGatewayError::decode(format!("invalid activation JSON payload: {error}"))
    })
}

fn map_transport_error(error: reqwest::Error) -> ActivationGatewayError {
    if error.is_timeout() {
        ActivationGatewayError::timeout(error.to_string())
    } else {
        ActivationGatewayError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ActivationGatewayError {
    debug!(
        status = status.as_u16(),
        body = %body_preview(body),
        "activation backend returned an error status"
    );
    let detail = serde_json::from_slice::<ErrorDto>(body)
        .ok()
        .and_then(|payload| payload.detail);
    ActivationGatewayError::rejected(status.as_u16(), detail)
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
