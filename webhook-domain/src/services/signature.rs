// Signature verification for inbound callbacks
//
// signature = hex(sha256(app_id + raw_body + timestamp + secret_key))

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::{error, warn};

const SIGNATURE_PREVIEW_CHARS: usize = 16;

#[derive(Debug, Clone, Default)]
pub struct SignatureVerifier {
    app_id: Option<String>,
    secret_key: Option<String>,
}

impl SignatureVerifier {
    pub fn new(app_id: Option<String>, secret_key: Option<String>) -> Self {
        Self {
            app_id: non_empty(app_id),
            secret_key: non_empty(secret_key),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.app_id.is_some() && self.secret_key.is_some()
    }

    /// Verifies against the configured app id and secret.
    pub fn verify(&self, raw_body: &[u8], signature: &str, timestamp: &str) -> bool {
        self.verify_with(raw_body, signature, timestamp, None, None)
    }

    /// Verifies with explicit credentials, falling back to the configured
    /// ones for whichever is not supplied. Fails closed when either is missing.
    pub fn verify_with(
        &self,
        raw_body: &[u8],
        signature: &str,
        timestamp: &str,
        app_id: Option<&str>,
        secret_key: Option<&str>,
    ) -> bool {
        if signature.is_empty() {
            warn!("missing signature header");
            return false;
        }

        let app_id = app_id
            .filter(|value| !value.is_empty())
            .or(self.app_id.as_deref());
        let secret_key = secret_key
            .filter(|value| !value.is_empty())
            .or(self.secret_key.as_deref());
        let (Some(app_id), Some(secret_key)) = (app_id, secret_key) else {
            error!("missing APP_ID or OA_SECRET_KEY configuration, rejecting signature");
            return false;
        };

        let Ok(body_text) = std::str::from_utf8(raw_body) else {
            warn!("request body is not valid utf-8");
            return false;
        };

        let expected = compute_signature(app_id, body_text, timestamp, secret_key);
        let provided = signature.to_ascii_lowercase();
        let is_valid = signatures_match(&provided, &expected);
        if !is_valid {
            let preview: String = signature.chars().take(SIGNATURE_PREVIEW_CHARS).collect();
            warn!(received = %preview, "signature mismatch");
        }
        is_valid
    }
}

/// Lowercase hex SHA-256 of the canonical signing string.
pub fn compute_signature(app_id: &str, body_text: &str, timestamp: &str, secret_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(app_id.as_bytes());
    hasher.update(body_text.as_bytes());
    hasher.update(timestamp.as_bytes());
    hasher.update(secret_key.as_bytes());
    hex::encode(hasher.finalize())
}

// Every byte is compared regardless of where the first difference sits.
fn signatures_match(provided: &str, expected: &str) -> bool {
    bool::from(provided.as_bytes().ct_eq(expected.as_bytes()))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}
