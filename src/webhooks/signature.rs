//! GitHub webhook signature verification (HMAC-SHA256).
//!
//! GitHub sends `X-Hub-Signature-256: sha256=<hex>` computed over the raw
//! request body with the shared webhook secret. Verification happens before
//! the body is parsed.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const PREFIX: &str = "sha256=";

/// The shared secret configured on the GitHub webhook.
#[derive(Clone)]
pub struct WebhookSecret(Vec<u8>);

impl WebhookSecret {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        WebhookSecret(secret.into())
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.0).expect("HMAC can take key of any size")
    }

    /// Computes the `X-Hub-Signature-256` header value for a payload.
    ///
    /// ```
    /// use override_bot::webhooks::WebhookSecret;
    ///
    /// let secret = WebhookSecret::new("It's a Secret to Everybody");
    /// assert_eq!(
    ///     secret.sign(b"Hello, World!"),
    ///     "sha256=757107ea0eb2509fc211221cce984b8a37570b6d7586c22c46f4379c8b043e17"
    /// );
    /// ```
    pub fn sign(&self, payload: &[u8]) -> String {
        let mut mac = self.mac();
        mac.update(payload);
        format!("{}{}", PREFIX, hex::encode(mac.finalize().into_bytes()))
    }

    /// Verifies a header value against a payload in constant time.
    ///
    /// Malformed headers (missing prefix, bad hex) are rejected, never panic.
    pub fn verify(&self, payload: &[u8], header: &str) -> bool {
        let Some(expected) = header.strip_prefix(PREFIX).and_then(|h| hex::decode(h).ok()) else {
            return false;
        };
        let mut mac = self.mac();
        mac.update(payload);
        mac.verify_slice(&expected).is_ok()
    }
}

impl fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WebhookSecret(<redacted>)")
    }
}
