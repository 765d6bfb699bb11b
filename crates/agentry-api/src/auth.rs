// X-API-KEY authentication middleware
// Decision: Keys are compared as SHA-256 digests in constant time

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::common::ApiError;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Expected key, stored as a digest
#[derive(Clone)]
pub struct ApiKeyAuth {
    expected: Option<Arc<[u8; 32]>>,
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

impl ApiKeyAuth {
    /// `None` rejects every request
    pub fn new(api_key: Option<&str>) -> Self {
        Self {
            expected: api_key.map(|k| Arc::new(digest(k))),
        }
    }

    pub fn verify(&self, provided: Option<&str>) -> bool {
        let (Some(expected), Some(provided)) = (&self.expected, provided) else {
            return false;
        };
        let provided = digest(provided);
        expected
            .iter()
            .zip(provided.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl std::fmt::Debug for ApiKeyAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyAuth")
            .field("configured", &self.expected.is_some())
            .finish()
    }
}

pub async fn require_api_key(
    State(auth): State<ApiKeyAuth>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if !auth.verify(provided) {
        tracing::debug!(
            path = %request.uri().path(),
            header_present = provided.is_some(),
            "Rejected request without a valid API key"
        );
        return Err(ApiError::unauthorized());
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify() {
        let auth = ApiKeyAuth::new(Some("secret"));
        assert!(auth.verify(Some("secret")));
        assert!(!auth.verify(Some("secret ")));
        assert!(!auth.verify(None));
    }

    #[test]
    fn test_unset_key_rejects_everything() {
        let auth = ApiKeyAuth::new(None);
        assert!(!auth.verify(Some("")));
        assert!(!auth.verify(Some("anything")));
    }
}
