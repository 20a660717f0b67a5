//! Self-describing token codec: payload decoding and expiration arithmetic.
//!
//! Decoding is a pure function with no failure channel: every malformed input
//! (missing delimiter, invalid base64, invalid JSON) yields [`None`], which the
//! expiration helpers collapse to `0`. An expiration of `0` always reads as
//! expired.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use crate::_prelude::*;

/// Claims embedded in a self-describing token's payload segment.
///
/// Field semantics follow the issuing service: `exp` carries a lifetime in
/// seconds relative to `iat`, not an absolute instant. Either claim may be
/// absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
	/// Issued-at instant in unix seconds, when present.
	#[serde(default, rename = "iat")]
	pub issued_at: Option<i64>,
	/// Lifetime in seconds relative to `issued_at`, when present.
	#[serde(default, rename = "exp")]
	pub ttl: Option<i64>,
}

/// Splits the token on its `.` delimiters and decodes the middle segment as
/// base64url (no padding) JSON.
///
/// Returns [`None`] on any malformed input; decoding never raises and has no
/// side effects.
pub fn decode(token: &str) -> Option<TokenClaims> {
	let payload = token.split('.').nth(1)?;
	let raw = URL_SAFE_NO_PAD.decode(payload).ok()?;

	serde_json::from_slice(&raw).ok()
}

/// Computes the expiration instant embedded in a self-describing token.
///
/// Returns `0` when the token is absent, undecodable, or missing either claim;
/// otherwise `issued_at + ttl`. A sum that overflows `i64` collapses to `0` as
/// well, so hostile claims can never panic the codec.
pub fn embedded_expiration(token: Option<&str>) -> i64 {
	let Some(claims) = token.and_then(decode) else {
		return 0;
	};

	match (claims.issued_at, claims.ttl) {
		(Some(issued_at), Some(ttl)) => issued_at.checked_add(ttl).unwrap_or(0),
		_ => 0,
	}
}

/// Computes the expiration instant for an externally-issued token lifetime.
///
/// Reads the wall clock at call time (never cached); returns `0` when no
/// lifetime is known.
pub fn external_expiration(expires_in: Option<i64>) -> i64 {
	match expires_in {
		Some(ttl) => unix_now().checked_add(ttl).unwrap_or(0),
		None => 0,
	}
}

/// Returns `true` when the expiration instant is unset (`0`) or strictly in
/// the past.
///
/// An instant exactly equal to the current second is not expired; the boundary
/// is `<`, not `<=`.
pub fn is_expired(expires_at: i64) -> bool {
	expires_at == 0 || expires_at - unix_now() < 0
}

/// Current wall-clock time in unix seconds.
pub(crate) fn unix_now() -> i64 {
	OffsetDateTime::now_utc().unix_timestamp()
}
