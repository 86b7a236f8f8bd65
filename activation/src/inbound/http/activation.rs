//! Activation API handlers.
//!
//! ```text
//! GET  /activation/check/ABC123
//!   -> 200 {"status":"active"}
//!   -> 200 {"status":"claimed","ownerId":"u1"}
//!   -> 200 {"status":"invalid"}            (unknown or malformed code)
//! POST /activation/claim {"code":"ABC123"}
//!   -> 200 {"success":true,"message":"Activation code claimed"}
//!   -> 401 / 404 / 409 {"detail":"..."}
//! ```

use actix_web::{HttpRequest, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::ApiResult;
use super::auth::authenticated_user;
use super::state::HttpState;
use crate::domain::ports::ActivationRegistryError;
use crate::domain::{ActivationCode, CodeStatus, Error};

const INVALID_STATUS: &str = "invalid";
const NOT_FOUND_DETAIL: &str = "Activation code not found";
const ALREADY_CLAIMED_DETAIL: &str = "Activation code has already been claimed";
const CLAIMED_MESSAGE: &str = "Activation code claimed";

/// Response body for `GET /activation/check/{code}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeStatusResponse {
    /// `active`, `claimed`, or `invalid`.
    pub status: String,
    /// Owner of a claimed code.
    #[serde(rename = "ownerId", skip_serializing_if = "Option::is_none", default)]
    pub owner_id: Option<String>,
}

impl CodeStatusResponse {
    fn invalid() -> Self {
        Self {
            status: INVALID_STATUS.to_owned(),
            owner_id: None,
        }
    }
}

impl From<CodeStatus> for CodeStatusResponse {
    fn from(value: CodeStatus) -> Self {
        Self {
            status: value.status.as_str().to_owned(),
            owner_id: value.owner_id.map(String::from),
        }
    }
}

/// Request body for `POST /activation/claim`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRequest {
    /// Code to claim.
    pub code: String,
}

/// Response body for a successful claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimResponse {
    /// Always `true` on this path.
    pub success: bool,
    /// Confirmation shown to the user.
    pub message: String,
}

fn map_registry_error(err: ActivationRegistryError) -> Error {
    match err {
        ActivationRegistryError::NotFound { .. } => Error::not_found(NOT_FOUND_DETAIL),
        ActivationRegistryError::AlreadyClaimed { .. } => Error::conflict(ALREADY_CLAIMED_DETAIL),
        ActivationRegistryError::Storage { message } => {
            error!(error = %message, "activation registry failed");
            Error::internal(message)
        }
    }
}

/// Report the status of a code. Never mutates state.
///
/// Unknown or malformed codes are reported as `invalid` rather than 404 so
/// the status check cannot be used to distinguish them.
#[get("/activation/check/{code}")]
pub async fn check_code(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<CodeStatusResponse>> {
    let Ok(code) = ActivationCode::new(path.into_inner()) else {
        return Ok(web::Json(CodeStatusResponse::invalid()));
    };
    let record = state.registry.find(&code).await.map_err(map_registry_error)?;
    let response = record.map_or_else(CodeStatusResponse::invalid, |record| {
        CodeStatusResponse::from(record.to_status())
    });
    debug!(code = %code, status = %response.status, "activation code checked");
    Ok(web::Json(response))
}

/// Claim a code for the authenticated caller.
#[post("/activation/claim")]
pub async fn claim_code(
    request: HttpRequest,
    state: web::Data<HttpState>,
    payload: web::Json<ClaimRequest>,
) -> ApiResult<web::Json<ClaimResponse>> {
    let owner = authenticated_user(&request, &state).await?;
    let code = ActivationCode::new(payload.into_inner().code)
        .map_err(|_| Error::not_found(NOT_FOUND_DETAIL))?;
    state
        .registry
        .claim(&code, &owner)
        .await
        .map_err(map_registry_error)?;
    Ok(web::Json(ClaimResponse {
        success: true,
        message: CLAIMED_MESSAGE.to_owned(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::{App, test as actix_test};
    use mockable::DefaultClock;
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::ports::{FixtureAuthenticator, MockActivationRegistry};
    use crate::inbound::http::configure;
    use crate::outbound::registry::InMemoryActivationRegistry;

    fn code(raw: &str) -> ActivationCode {
        ActivationCode::new(raw).expect("fixture code")
    }

    fn in_memory_state(codes: &[&str]) -> HttpState {
        HttpState::new(
            Arc::new(InMemoryActivationRegistry::with_codes(
                Arc::new(DefaultClock),
                codes.iter().copied().map(code),
            )),
            Arc::new(FixtureAuthenticator),
        )
    }

    async fn call(state: HttpState, request: actix_test::TestRequest) -> (StatusCode, Value) {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(configure),
        )
        .await;
        let response = actix_test::call_service(&app, request.to_request()).await;
        let status = response.status();
        let bytes = actix_test::read_body(response).await;
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn claim_request(token: Option<&str>, code: &str) -> actix_test::TestRequest {
        let mut request = actix_test::TestRequest::post()
            .uri("/activation/claim")
            .set_json(json!({ "code": code }));
        if let Some(token) = token {
            request = request.insert_header((AUTHORIZATION, format!("Bearer {token}")));
        }
        request
    }

    fn check_request(code: &str) -> actix_test::TestRequest {
        actix_test::TestRequest::get().uri(&format!("/activation/check/{code}"))
    }

    #[rstest]
    #[case::active("ABC123", json!({ "status": "active" }))]
    #[case::unknown("NOPE", json!({ "status": "invalid" }))]
    #[case::malformed("%07", json!({ "status": "invalid" }))]
    #[actix_web::test]
    async fn check_reports_status_without_owner(#[case] raw: &str, #[case] expected: Value) {
        let (status, body) = call(in_memory_state(&["ABC123"]), check_request(raw)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn claim_then_check_reports_owner() {
        let state = in_memory_state(&["ABC123"]);

        let (claim_status, claim_body) =
            call(state.clone(), claim_request(Some("u1"), "ABC123")).await;
        let (_, check_body) = call(state, check_request("ABC123")).await;

        assert_eq!(claim_status, StatusCode::OK);
        assert_eq!(
            claim_body,
            json!({ "success": true, "message": "Activation code claimed" })
        );
        assert_eq!(check_body, json!({ "status": "claimed", "ownerId": "u1" }));
    }

    #[rstest]
    #[actix_web::test]
    async fn second_claim_conflicts_and_keeps_owner() {
        let state = in_memory_state(&["ABC123"]);
        let _ = call(state.clone(), claim_request(Some("u1"), "ABC123")).await;

        let (status, body) = call(state.clone(), claim_request(Some("u2"), "ABC123")).await;
        let (_, check_body) = call(state, check_request("ABC123")).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body,
            json!({ "detail": "Activation code has already been claimed" })
        );
        assert_eq!(check_body, json!({ "status": "claimed", "ownerId": "u1" }));
    }

    #[rstest]
    #[case::missing_token(None, "ABC123", StatusCode::UNAUTHORIZED)]
    #[case::bad_token(Some("u 1"), "ABC123", StatusCode::UNAUTHORIZED)]
    #[case::unknown_code(Some("u1"), "NOPE", StatusCode::NOT_FOUND)]
    #[case::blank_code(Some("u1"), "  ", StatusCode::NOT_FOUND)]
    #[actix_web::test]
    async fn claim_failures_carry_detail(
        #[case] token: Option<&str>,
        #[case] raw: &str,
        #[case] expected: StatusCode,
    ) {
        let (status, body) = call(in_memory_state(&["ABC123"]), claim_request(token, raw)).await;

        assert_eq!(status, expected);
        assert!(
            body.get("detail").and_then(Value::as_str).is_some(),
            "error body should carry detail: {body}"
        );
    }

    #[rstest]
    #[actix_web::test]
    async fn malformed_claim_body_is_a_bad_request() {
        let request = actix_test::TestRequest::post()
            .uri("/activation/claim")
            .insert_header((AUTHORIZATION, "Bearer u1"))
            .set_json(json!({ "token": "ABC123" }));

        let (status, body) = call(in_memory_state(&["ABC123"]), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.get("detail").is_some());
    }

    #[rstest]
    #[actix_web::test]
    async fn registry_storage_failures_are_redacted() {
        let mut registry = MockActivationRegistry::new();
        registry
            .expect_find()
            .times(1)
            .returning(|_| Err(ActivationRegistryError::storage("disk on fire")));
        let state = HttpState::new(Arc::new(registry), Arc::new(FixtureAuthenticator));

        let (status, body) = call(state, check_request("ABC123")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "detail": "Internal server error" }));
    }

    #[rstest]
    #[actix_web::test]
    async fn check_never_claims() {
        let mut registry = MockActivationRegistry::new();
        registry
            .expect_find()
            .times(1)
            .returning(|code| Ok(Some(crate::domain::ActivationCodeRecord::issued(code.clone()))));
        registry.expect_claim().never();
        let state = HttpState::new(Arc::new(registry), Arc::new(FixtureAuthenticator));

        let (status, body) = call(state, check_request("ABC123")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "active" }));
    }
}
