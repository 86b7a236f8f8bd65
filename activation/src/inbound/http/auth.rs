//! Bearer-token helpers used by HTTP handlers.
//!
//! Keeps the handler modules focused on request/response mapping by
//! concentrating header parsing and identity resolution here.

use actix_web::HttpRequest;
use actix_web::http::header::AUTHORIZATION;

use super::ApiResult;
use super::state::HttpState;
use crate::domain::{Error, UserId};

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the bearer token from the `Authorization` header.
pub fn bearer_token(request: &HttpRequest) -> ApiResult<&str> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("Missing bearer token"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("Malformed authorization header"))?;
    value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("Missing bearer token"))
}

/// Resolve the caller of `request` through the configured authenticator.
pub async fn authenticated_user(request: &HttpRequest, state: &HttpState) -> ApiResult<UserId> {
    let token = bearer_token(request)?;
    state.authenticator.authenticate(token).await
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;
    use rstest::rstest;

    use super::*;
    use crate::domain::ErrorCode;

    #[rstest]
    #[case::bearer(Some("Bearer u1"), Ok("u1"))]
    #[case::padded(Some("Bearer   u1  "), Ok("u1"))]
    #[case::missing(None, Err(()))]
    #[case::basic(Some("Basic dTE6cHc="), Err(()))]
    #[case::empty(Some("Bearer "), Err(()))]
    fn parses_bearer_tokens(#[case] header: Option<&str>, #[case] expected: Result<&str, ()>) {
        let mut request = TestRequest::default();
        if let Some(value) = header {
            request = request.insert_header((AUTHORIZATION, value));
        }
        let request = request.to_http_request();

        match (bearer_token(&request), expected) {
            (Ok(token), Ok(expected)) => assert_eq!(token, expected),
            (Err(error), Err(())) => assert_eq!(error.code(), ErrorCode::Unauthorized),
            (actual, expected) => panic!("expected {expected:?}, got {actual:?}"),
        }
    }
}
