//! Credential model, refresh payloads, reducer events, and expiration policies.

pub mod secret;

pub use secret::TokenSecret;

// self
use crate::{_prelude::*, codec};

/// Access/refresh token pair currently held for the session, plus its computed
/// expiration instant.
///
/// Owned exclusively by a [`CredentialStore`](crate::store::CredentialStore)
/// and mutated only through [`CredentialEvent`] transitions; no other
/// component mutates it in place.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
	/// Access token presented on outgoing requests, when one is held.
	pub access_token: Option<TokenSecret>,
	/// Refresh token exchanged for a new pair once the access token expires.
	pub refresh_token: Option<TokenSecret>,
	/// Expiration instant in unix seconds; `0` means no usable expiration.
	pub expires_at: i64,
}
impl Credential {
	/// Returns `true` when an access token is held and not yet expired.
	pub fn is_usable(&self) -> bool {
		self.access_token.is_some() && !codec::is_expired(self.expires_at)
	}

	/// Reduces a credential event into the next state.
	///
	/// `Set` and `RefreshSuccess` store the pair and recompute the expiration
	/// through the provided policy; `Clear` and `RefreshFailure` reset to the
	/// initial state. The event set is closed, so the identity arm for
	/// unrecognized events lives in the type system rather than the match.
	pub fn apply(&self, event: &CredentialEvent, policy: &dyn ExpirationPolicy) -> Self {
		match event {
			CredentialEvent::Set(pair) | CredentialEvent::RefreshSuccess(pair) => Self {
				access_token: Some(TokenSecret::new(&pair.access_token)),
				refresh_token: pair.refresh_token.as_deref().map(TokenSecret::new),
				expires_at: policy.expires_at(pair),
			},
			CredentialEvent::Clear | CredentialEvent::RefreshFailure => Self::default(),
		}
	}
}

/// Token pair returned by the refresh endpoint or supplied at login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
	/// Newly issued access token.
	#[serde(rename = "authToken")]
	pub access_token: String,
	/// Newly issued refresh token, when the issuer rotates it.
	#[serde(default, rename = "refreshToken")]
	pub refresh_token: Option<String>,
	/// Relative lifetime in seconds for externally-issued tokens.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub expires_in: Option<i64>,
}
impl TokenPair {
	/// Creates a pair holding only an access token.
	pub fn new(access_token: impl Into<String>) -> Self {
		Self { access_token: access_token.into(), refresh_token: None, expires_in: None }
	}

	/// Attaches a refresh token.
	pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
		self.refresh_token = Some(refresh_token.into());

		self
	}

	/// Attaches a relative lifetime for externally-issued tokens.
	pub fn with_expires_in(mut self, expires_in: i64) -> Self {
		self.expires_in = Some(expires_in);

		self
	}
}

/// Events accepted by the credential reducer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CredentialEvent {
	/// Stores a freshly obtained token pair (login or manual set).
	Set(TokenPair),
	/// Stores the pair returned by a successful refresh exchange.
	RefreshSuccess(TokenPair),
	/// Drops the held credential (logout).
	Clear,
	/// Drops the held credential after an irrecoverable refresh failure.
	RefreshFailure,
}

/// Strategy that derives an expiration instant from a token pair being stored.
pub trait ExpirationPolicy
where
	Self: Send + Sync,
{
	/// Computes the expiration instant for the pair.
	fn expires_at(&self, pair: &TokenPair) -> i64;
}

/// Default policy: read the expiration embedded in the access token itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbeddedExpiration;
impl ExpirationPolicy for EmbeddedExpiration {
	fn expires_at(&self, pair: &TokenPair) -> i64 {
		codec::embedded_expiration(Some(&pair.access_token))
	}
}

/// Policy for opaque tokens carrying an explicit relative lifetime.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExternalExpiration;
impl ExpirationPolicy for ExternalExpiration {
	fn expires_at(&self, pair: &TokenPair) -> i64 {
		codec::external_expiration(pair.expires_in)
	}
}
