// std
use std::sync::Arc;
// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::json;
// self
use bearer_interceptor::{
	credential::{Credential, CredentialEvent, ExternalExpiration, TokenPair, TokenSecret},
	store::{CredentialStore, MemoryStore},
};

fn bearer_token(issued_at: i64, ttl: i64) -> String {
	let payload = URL_SAFE_NO_PAD.encode(
		serde_json::to_vec(&json!({ "iat": issued_at, "exp": ttl }))
			.expect("Claim fixture should serialize to JSON."),
	);

	format!("header.{payload}.signature")
}

#[test]
fn starts_in_the_reset_state() {
	let store = MemoryStore::new();

	assert_eq!(store.credential().expect("Store read should succeed."), Credential::default());
}

#[test]
fn set_computes_the_embedded_expiration() {
	let store = MemoryStore::new();
	let access = bearer_token(4_133_980_799, 3_600);

	store
		.apply(CredentialEvent::Set(TokenPair::new(&access).with_refresh_token("refresh-1")))
		.expect("Set transition should succeed.");

	let credential = store.credential().expect("Store read should succeed.");

	assert_eq!(credential.access_token.as_ref().map(TokenSecret::expose), Some(access.as_str()));
	assert_eq!(credential.refresh_token.as_ref().map(TokenSecret::expose), Some("refresh-1"));
	assert_eq!(credential.expires_at, 4_133_980_799 + 3_600);
}

#[test]
fn clear_resets_from_any_state() {
	let store = MemoryStore::new();

	store
		.apply(CredentialEvent::Set(
			TokenPair::new(bearer_token(4_133_980_799, 3_600)).with_refresh_token("refresh-1"),
		))
		.expect("Set transition should succeed.");
	store.apply(CredentialEvent::Clear).expect("Clear transition should succeed.");

	assert_eq!(store.credential().expect("Store read should succeed."), Credential::default());
}

#[test]
fn refresh_failure_resets_like_clear() {
	let store = MemoryStore::new();

	store
		.apply(CredentialEvent::Set(
			TokenPair::new(bearer_token(4_133_980_799, 3_600)).with_refresh_token("refresh-1"),
		))
		.expect("Set transition should succeed.");
	store
		.apply(CredentialEvent::RefreshFailure)
		.expect("Refresh failure transition should succeed.");

	assert_eq!(store.credential().expect("Store read should succeed."), Credential::default());
}

#[test]
fn refresh_success_rotates_the_pair() {
	let store = MemoryStore::new();
	let rotated = bearer_token(4_133_980_799, 7_200);

	store
		.apply(CredentialEvent::Set(
			TokenPair::new(bearer_token(4_133_980_799, 3_600)).with_refresh_token("refresh-1"),
		))
		.expect("Set transition should succeed.");
	store
		.apply(CredentialEvent::RefreshSuccess(
			TokenPair::new(&rotated).with_refresh_token("refresh-2"),
		))
		.expect("Refresh success transition should succeed.");

	let credential = store.credential().expect("Store read should succeed.");

	assert_eq!(credential.access_token.as_ref().map(TokenSecret::expose), Some(rotated.as_str()));
	assert_eq!(credential.refresh_token.as_ref().map(TokenSecret::expose), Some("refresh-2"));
	assert_eq!(credential.expires_at, 4_133_980_799 + 7_200);
}

#[test]
fn external_policy_derives_expiry_from_the_lifetime() {
	let store = MemoryStore::with_policy(Arc::new(ExternalExpiration));
	let before = time::OffsetDateTime::now_utc().unix_timestamp() + 3_600;

	store
		.apply(CredentialEvent::Set(TokenPair::new("opaque-access").with_expires_in(3_600)))
		.expect("Set transition should succeed.");

	let after = time::OffsetDateTime::now_utc().unix_timestamp() + 3_600;
	let credential = store.credential().expect("Store read should succeed.");

	assert!(before <= credential.expires_at && credential.expires_at <= after);
	assert!(credential.is_usable());
}
