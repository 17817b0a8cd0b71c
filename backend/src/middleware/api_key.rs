//! Shared-secret gate for the inventory API.
//!
//! Agents authenticate with a single `X-API-Key` header. The gate keeps only a
//! SHA-256 digest of the configured key (wiped on drop) and compares digests,
//! so the comparison cost never depends on where the presented key diverges.

use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::ResponseError;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroizing;

use crate::domain::Error;

/// Request header carrying the shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

type KeyDigest = Zeroizing<[u8; 32]>;

fn digest(key: &[u8]) -> KeyDigest {
    Zeroizing::new(Sha256::digest(key).into())
}

fn digests_match(presented: &[u8; 32], expected: &[u8; 32]) -> bool {
    presented
        .iter()
        .zip(expected.iter())
        .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// Middleware rejecting requests without the configured API key.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use inventory_backend::middleware::ApiKeyGate;
/// use zeroize::Zeroizing;
///
/// let gate = ApiKeyGate::new(Zeroizing::new("s3cret".to_owned()));
/// let _app = App::new().service(web::scope("/api/v1").wrap(gate));
/// ```
#[derive(Clone)]
pub struct ApiKeyGate {
    expected: Option<Arc<KeyDigest>>,
}

impl ApiKeyGate {
    /// Require `key` on every request.
    pub fn new(key: Zeroizing<String>) -> Self {
        Self {
            expected: Some(Arc::new(digest(key.as_bytes()))),
        }
    }

    /// Let every request through. Only for local development.
    pub fn disabled() -> Self {
        Self { expected: None }
    }

    /// Whether a key is enforced.
    pub fn is_enforced(&self) -> bool {
        self.expected.is_some()
    }

    fn admits(&self, presented: Option<&[u8]>) -> bool {
        match (&self.expected, presented) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(expected), Some(presented)) => digests_match(&digest(presented), expected),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiKeyGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = ApiKeyMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiKeyMiddleware {
            service: Rc::new(service),
            gate: self.clone(),
        }))
    }
}

/// Service wrapper produced by [`ApiKeyGate`].
pub struct ApiKeyMiddleware<S> {
    service: Rc<S>,
    gate: ApiKeyGate,
}

impl<S, B> Service<ServiceRequest> for ApiKeyMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let presented = req
            .headers()
            .get(API_KEY_HEADER)
            .map(|value| value.as_bytes());
        if self.gate.admits(presented) {
            let service = Rc::clone(&self.service);
            return Box::pin(async move {
                service
                    .call(req)
                    .await
                    .map(ServiceResponse::map_into_left_body)
            });
        }

        Box::pin(async move {
            warn!(path = %req.path(), "rejected request with missing or invalid API key");
            // Built inside the future so the request's trace id is in scope.
            let response = Error::unauthorized("missing or invalid API key").error_response();
            Ok(req.into_response(response).map_into_right_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test as actix_test, web};
    use rstest::rstest;
    use serde_json::Value;

    async fn call_with(gate: ApiKeyGate, key: Option<&str>) -> (StatusCode, Option<Value>) {
        let app = actix_test::init_service(
            App::new().service(
                web::scope("/api/v1")
                    .wrap(gate)
                    .route("/ping", web::get().to(|| async { HttpResponse::Ok().finish() })),
            ),
        )
        .await;
        let mut req = actix_test::TestRequest::get().uri("/api/v1/ping");
        if let Some(key) = key {
            req = req.insert_header((API_KEY_HEADER, key));
        }
        let res = actix_test::call_service(&app, req.to_request()).await;
        let status = res.status();
        let body = actix_test::read_body(res).await;
        (status, serde_json::from_slice(&body).ok())
    }

    fn gate() -> ApiKeyGate {
        ApiKeyGate::new(Zeroizing::new("s3cret".to_owned()))
    }

    #[rstest]
    #[case(None)]
    #[case(Some("wrong"))]
    #[case(Some("s3cret "))]
    #[actix_web::test]
    async fn rejects_missing_or_wrong_keys(#[case] key: Option<&str>) {
        let (status, body) = call_with(gate(), key).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let body = body.expect("error body");
        assert_eq!(body["code"], "unauthorized");
    }

    #[rstest]
    #[actix_web::test]
    async fn admits_the_configured_key() {
        let (status, _) = call_with(gate(), Some("s3cret")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[rstest]
    #[actix_web::test]
    async fn disabled_gate_admits_everything() {
        let gate = ApiKeyGate::disabled();
        assert!(!gate.is_enforced());
        let (status, _) = call_with(gate, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[rstest]
    fn digest_comparison_detects_single_bit_changes() {
        let expected = digest(b"s3cret");
        let mut flipped = *expected;
        flipped[31] ^= 1;
        assert!(digests_match(&expected, &expected));
        assert!(!digests_match(&flipped, &expected));
    }
}
