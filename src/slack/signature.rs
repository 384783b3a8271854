use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Requests older (or newer) than this are treated as replays.
pub const MAX_SKEW_SECS: i64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("missing signature headers")]
    MissingHeaders,

    #[error("request timestamp is malformed or outside the allowed window")]
    StaleTimestamp,

    #[error("signature does not match")]
    Mismatch,
}

fn mac_for(secret: &str, timestamp: &str, body: &[u8]) -> Hmac<Sha256> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC keys may be any length"));
    mac.update(b"v0:");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    mac
}

/// `v0=<hex>` signature Slack sends in `X-Slack-Signature`.
pub fn sign(secret: &str, timestamp: &str, body: &[u8]) -> String {
    let digest = mac_for(secret, timestamp, body).finalize().into_bytes();
    format!("v0={}", hex::encode(digest))
}

/// Check a request against the app's signing secret. `now` is the current
/// unix time in seconds.
pub fn verify(
    secret: &str,
    timestamp: Option<&str>,
    signature: Option<&str>,
    body: &[u8],
    now: i64,
) -> Result<(), SignatureError> {
    let (timestamp, signature) = match (timestamp, signature) {
        (Some(ts), Some(sig)) => (ts, sig),
        _ => return Err(SignatureError::MissingHeaders),
    };

    let sent_at: i64 = timestamp
        .parse()
        .map_err(|_| SignatureError::StaleTimestamp)?;
    if now.abs_diff(sent_at) > MAX_SKEW_SECS.unsigned_abs() {
        return Err(SignatureError::StaleTimestamp);
    }

    let expected = signature
        .strip_prefix("v0=")
        .and_then(|h| hex::decode(h).ok())
        .ok_or(SignatureError::Mismatch)?;

    mac_for(secret, timestamp, body)
        .verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}
