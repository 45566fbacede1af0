//! Stripe webhook signature verification.
//!
//! Verifies `Stripe-Signature` headers using HMAC-SHA256 over
//! `"<timestamp>.<raw body>"`, with a timestamp window against replays.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::webhook_errors::WebhookError;

/// Maximum allowed age for webhook events (5 minutes).
const MAX_EVENT_AGE_SECS: i64 = 300;

/// Maximum allowed clock skew for future events (1 minute).
const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Parsed components from the Stripe-Signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Unix timestamp when the signature was generated.
    pub timestamp: i64,
    /// v1 signatures (HMAC-SHA256). Stripe sends several while a secret is rolled.
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    /// Parses a Stripe-Signature header string.
    ///
    /// Format: `t=<timestamp>,v1=<signature>[,v1=<signature>][,v0=<legacy>]`
    ///
    /// # Errors
    ///
    /// Returns `WebhookError::ParseError` if the header format is invalid.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp: Option<i64> = None;
        let mut v1_signatures = Vec::new();

        for part in header.split(',') {
            let (key, value) = part
                .trim()
                .split_once('=')
                .ok_or_else(|| WebhookError::ParseError("invalid header format".to_string()))?;

            match key {
                "t" => {
                    timestamp = Some(value.parse().map_err(|_| {
                        WebhookError::ParseError("invalid timestamp".to_string())
                    })?);
                }
                "v1" => {
                    v1_signatures.push(hex::decode(value).map_err(|_| {
                        WebhookError::ParseError("invalid v1 signature hex".to_string())
                    })?);
                }
                _ => {
                    // v0 and unknown schemes are ignored for forward compatibility
                }
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| WebhookError::ParseError("missing timestamp".to_string()))?;
        if v1_signatures.is_empty() {
            return Err(WebhookError::ParseError("missing v1 signature".to_string()));
        }

        Ok(SignatureHeader {
            timestamp,
            v1_signatures,
        })
    }
}

/// Verifier for Stripe webhook signatures.
pub struct StripeWebhookVerifier {
    /// The webhook signing secret from the Stripe dashboard.
    secret: SecretString,
}

impl StripeWebhookVerifier {
    /// Creates a new verifier with the given webhook secret.
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Verifies the signature header against the raw payload.
    ///
    /// # Verification Steps
    ///
    /// 1. Parse the signature header
    /// 2. Validate timestamp is within acceptable range
    /// 3. Compute expected signature using HMAC-SHA256
    /// 4. Compare against every v1 signature in constant time
    ///
    /// # Errors
    ///
    /// - `InvalidSignature` - no v1 signature matched
    /// - `TimestampOutOfRange` - event is older than 5 minutes
    /// - `InvalidTimestamp` - event timestamp is in the future
    /// - `ParseError` - header could not be parsed
    pub fn verify(&self, payload: &[u8], signature_header: &str) -> Result<(), WebhookError> {
        let header = SignatureHeader::parse(signature_header)?;

        validate_timestamp(header.timestamp, chrono::Utc::now().timestamp())?;

        let expected = self.compute_signature(header.timestamp, payload)?;

        let matched = header
            .v1_signatures
            .iter()
            .any(|candidate| constant_time_compare(&expected, candidate));
        if !matched {
            return Err(WebhookError::InvalidSignature);
        }

        Ok(())
    }

    /// Computes the HMAC-SHA256 signature for the given timestamp and payload.
    fn compute_signature(&self, timestamp: i64, payload: &[u8]) -> Result<Vec<u8>, WebhookError> {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.secret.expose_secret().as_bytes())
            .map_err(|_| WebhookError::InvalidSignature)?;
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

/// Validates that the timestamp is within acceptable bounds of `now`.
///
/// The header value is untrusted, so an age that does not fit in an `i64`
/// is rejected rather than computed.
fn validate_timestamp(timestamp: i64, now: i64) -> Result<(), WebhookError> {
    let age = now
        .checked_sub(timestamp)
        .ok_or(WebhookError::InvalidTimestamp)?;

    if age > MAX_EVENT_AGE_SECS {
        return Err(WebhookError::TimestampOutOfRange);
    }

    if age < -MAX_CLOCK_SKEW_SECS {
        return Err(WebhookError::InvalidTimestamp);
    }

    Ok(())
}

/// Performs constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "whsec_test_secret_12345";

    /// Builds a `Stripe-Signature` header the way Stripe does.
    fn sign_stripe_payload(
        secret: &str,
        timestamp: i64,
        payload: &str,
    ) -> Result<String, hmac::digest::InvalidLength> {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())?;
        mac.update(format!("{}.{}", timestamp, payload).as_bytes());
        Ok(format!(
            "t={},v1={}",
            timestamp,
            hex::encode(mac.finalize().into_bytes())
        ))
    }

    fn verifier(secret: &str) -> StripeWebhookVerifier {
        StripeWebhookVerifier::new(SecretString::new(secret.to_string()))
    }

    // ══════════════════════════════════════════════════════════════
    // SignatureHeader Parsing Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn parse_header_with_v1_only() {
        let header_str = format!("t=1234567890,v1={}", "a".repeat(64));

        let header = SignatureHeader::parse(&header_str).unwrap();

        assert_eq!(header.timestamp, 1234567890);
        assert_eq!(header.v1_signatures.len(), 1);
        assert_eq!(header.v1_signatures[0].len(), 32);
    }

    #[test]
    fn parse_header_collects_multiple_v1_signatures() {
        let header_str = format!(
            "t=1234567890,v1={},v1={},v0={}",
            "a".repeat(64),
            "b".repeat(64),
            "c".repeat(64)
        );

        let header = SignatureHeader::parse(&header_str).unwrap();

        assert_eq!(header.v1_signatures.len(), 2);
    }

    #[test]
    fn parse_header_tolerates_spaces_after_commas() {
        let header_str = format!("t=1234567890, v1={}", "a".repeat(64));
        assert!(SignatureHeader::parse(&header_str).is_ok());
    }

    #[test]
    fn parse_header_missing_timestamp_fails() {
        let header_str = format!("v1={}", "a".repeat(64));
        assert!(matches!(
            SignatureHeader::parse(&header_str),
            Err(WebhookError::ParseError(_))
        ));
    }

    #[test]
    fn parse_header_missing_v1_fails() {
        assert!(matches!(
            SignatureHeader::parse("t=1234567890"),
            Err(WebhookError::ParseError(_))
        ));
    }

    #[test]
    fn parse_header_invalid_hex_fails() {
        assert!(matches!(
            SignatureHeader::parse("t=1234567890,v1=not_valid_hex"),
            Err(WebhookError::ParseError(_))
        ));
    }

    #[test]
    fn parse_header_no_equals_fails() {
        assert!(matches!(
            SignatureHeader::parse("t1234567890"),
            Err(WebhookError::ParseError(_))
        ));
    }

    // ══════════════════════════════════════════════════════════════
    // Signature Verification Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn verify_valid_signature() {
        let payload = r#"{"id":"evt_test123","type":"checkout.session.completed"}"#;
        let header =
            sign_stripe_payload(TEST_SECRET, chrono::Utc::now().timestamp(), payload).unwrap();

        assert!(verifier(TEST_SECRET).verify(payload.as_bytes(), &header).is_ok());
    }

    #[test]
    fn verify_accepts_any_matching_v1_signature() {
        let payload = r#"{"id":"evt_roll"}"#;
        let timestamp = chrono::Utc::now().timestamp();
        let valid = sign_stripe_payload(TEST_SECRET, timestamp, payload).unwrap();
        let valid_sig = valid.split("v1=").nth(1).unwrap();
        let header = format!("t={},v1={},v1={}", timestamp, "0".repeat(64), valid_sig);

        assert!(verifier(TEST_SECRET).verify(payload.as_bytes(), &header).is_ok());
    }

    #[test]
    fn verify_invalid_signature_fails() {
        let payload = r#"{"id":"evt_test"}"#;
        let header = format!("t={},v1={}", chrono::Utc::now().timestamp(), "a".repeat(64));

        assert!(matches!(
            verifier(TEST_SECRET).verify(payload.as_bytes(), &header),
            Err(WebhookError::InvalidSignature)
        ));
    }

    #[test]
    fn verify_wrong_secret_fails() {
        let payload = r#"{"id":"evt_test"}"#;
        let header =
            sign_stripe_payload(TEST_SECRET, chrono::Utc::now().timestamp(), payload).unwrap();

        assert!(matches!(
            verifier("whsec_other").verify(payload.as_bytes(), &header),
            Err(WebhookError::InvalidSignature)
        ));
    }

    #[test]
    fn verify_tampered_payload_fails() {
        let header = sign_stripe_payload(
            TEST_SECRET,
            chrono::Utc::now().timestamp(),
            r#"{"id":"evt_test"}"#,
        )
        .unwrap();

        assert!(matches!(
            verifier(TEST_SECRET).verify(br#"{"id":"evt_hacked"}"#, &header),
            Err(WebhookError::InvalidSignature)
        ));
    }

    #[test]
    fn verify_stale_signature_fails() {
        let payload = r#"{"id":"evt_old"}"#;
        let header =
            sign_stripe_payload(TEST_SECRET, chrono::Utc::now().timestamp() - 600, payload)
                .unwrap();

        assert!(matches!(
            verifier(TEST_SECRET).verify(payload.as_bytes(), &header),
            Err(WebhookError::TimestampOutOfRange)
        ));
    }

    // ══════════════════════════════════════════════════════════════
    // Timestamp Validation Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn timestamp_within_range_succeeds() {
        assert!(validate_timestamp(1_000 - 120, 1_000).is_ok());
    }

    #[test]
    fn timestamp_at_boundary_succeeds() {
        assert!(validate_timestamp(1_000 - 300, 1_000).is_ok());
    }

    #[test]
    fn timestamp_just_past_boundary_fails() {
        assert!(matches!(
            validate_timestamp(1_000 - 301, 1_000),
            Err(WebhookError::TimestampOutOfRange)
        ));
    }

    #[test]
    fn timestamp_from_future_with_skew_succeeds() {
        assert!(validate_timestamp(1_000 + 30, 1_000).is_ok());
    }

    #[test]
    fn extreme_past_timestamp_is_rejected_without_overflow() {
        assert!(matches!(
            validate_timestamp(i64::MIN, 1_000),
            Err(WebhookError::InvalidTimestamp)
        ));
    }

    #[test]
    fn extreme_future_timestamp_is_rejected_without_overflow() {
        assert!(matches!(
            validate_timestamp(i64::MAX, -1_000),
            Err(WebhookError::InvalidTimestamp)
        ));
        assert!(matches!(
            validate_timestamp(i64::MAX, 1_000),
            Err(WebhookError::InvalidTimestamp)
        ));
    }

    #[test]
    fn verify_rejects_extreme_header_timestamps() {
        for timestamp in [i64::MIN, i64::MAX] {
            let header = format!("t={},v1={}", timestamp, "00".repeat(32));
            assert!(matches!(
                verifier("whsec_x").verify(b"{}", &header),
                Err(WebhookError::InvalidTimestamp)
            ));
        }
    }

    #[test]
    fn timestamp_from_future_beyond_skew_fails() {
        assert!(matches!(
            validate_timestamp(1_000 + 120, 1_000),
            Err(WebhookError::InvalidTimestamp)
        ));
    }

    // ══════════════════════════════════════════════════════════════
    // Constant Time Comparison Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn constant_time_compare_equal_values() {
        assert!(constant_time_compare(&[1, 2, 3], &[1, 2, 3]));
    }

    #[test]
    fn constant_time_compare_different_values() {
        assert!(!constant_time_compare(&[1, 2, 3], &[1, 2, 4]));
    }

    #[test]
    fn constant_time_compare_different_lengths() {
        assert!(!constant_time_compare(&[1, 2, 3], &[1, 2, 3, 4]));
    }
}
