//! Bearer token gate for CDS service invocations
//!
//! Fails closed: without a configured token every invocation is rejected
//! unless anonymous access was switched on explicitly.

use axum::{
    Extension,
    body::Body,
    extract::Request,
    http::{HeaderMap, HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

const REALM: &str = "cds-services";

/// Bearer token authentication state
#[derive(Clone)]
pub struct BearerAuth {
    token: Option<String>,
    allow_anonymous: bool,
}

impl BearerAuth {
    pub fn new(token: Option<String>, allow_anonymous: bool) -> Self {
        Self {
            token,
            allow_anonymous,
        }
    }

    /// Check the request headers, returning the rejection reason on failure
    pub fn check(&self, headers: &HeaderMap) -> Result<(), &'static str> {
        let Some(expected) = self.token.as_deref() else {
            return if self.allow_anonymous {
                Ok(())
            } else {
                Err("Service authentication is not configured.")
            };
        };

        let provided = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .ok_or("No Bearer token provided.")?;

        if provided == expected {
            Ok(())
        } else {
            Err("The token is invalid.")
        }
    }
}

/// Reject unauthenticated requests with 401 and a `WWW-Authenticate` challenge
pub async fn auth_middleware(
    Extension(auth): Extension<BearerAuth>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // CORS pre-flight never carries credentials
    if request.method() == Method::OPTIONS {
        return next.run(request).await;
    }

    match auth.check(request.headers()) {
        Ok(()) => next.run(request).await,
        Err(reason) => {
            tracing::warn!(path = %request.uri().path(), reason, "Rejected CDS client");
            let challenge = format!(
                "Bearer realm=\"{}\", error=\"invalid_token\", error_description=\"{}\"",
                REALM, reason
            );
            let mut response = StatusCode::UNAUTHORIZED.into_response();
            if let Ok(value) = HeaderValue::from_str(&challenge) {
                response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
            }
            response
        }
    }
}
