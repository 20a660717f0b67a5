#![cfg(feature = "reqwest")]

// std
use std::sync::Arc;
// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use httpmock::prelude::*;
use serde_json::json;
use url::Url;
// self
use bearer_interceptor::{
	credential::{CredentialEvent, TokenPair},
	error::TransportError,
	interceptor::{Action, Disposition, Interceptor},
	refresh::{RefreshConfig, RefreshCoordinator},
	request::{Headers, RequestDescriptor},
	store::{CredentialStore, MemoryStore},
	transport::{RefreshTransport, ReqwestRefreshTransport},
};

fn bearer_token(issued_at: i64, ttl: i64) -> String {
	let payload = URL_SAFE_NO_PAD.encode(
		serde_json::to_vec(&json!({ "iat": issued_at, "exp": ttl }))
			.expect("Claim fixture should serialize to JSON."),
	);

	format!("header.{payload}.signature")
}

fn unix_now() -> i64 {
	time::OffsetDateTime::now_utc().unix_timestamp()
}

#[tokio::test]
async fn exchange_posts_refresh_token_and_parses_pair() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/refresh-token")
				.json_body(json!({ "token": "refresh-1" }));
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"authToken":"access-new","refreshToken":"refresh-new"}"#);
		})
		.await;
	let transport = ReqwestRefreshTransport::default();
	let endpoint = Url::parse(&server.url("/refresh-token"))
		.expect("Mock refresh endpoint should parse successfully.");
	let pair = transport
		.issue_refresh(&endpoint, "refresh-1")
		.await
		.expect("Refresh exchange should succeed against the mock endpoint.");

	mock.assert_async().await;

	assert_eq!(pair.access_token, "access-new");
	assert_eq!(pair.refresh_token.as_deref(), Some("refresh-new"));
}

#[tokio::test]
async fn non_success_status_is_rejected() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/refresh-token");
			then.status(401);
		})
		.await;
	let transport = ReqwestRefreshTransport::default();
	let endpoint = Url::parse(&server.url("/refresh-token"))
		.expect("Mock refresh endpoint should parse successfully.");
	let error = transport
		.issue_refresh(&endpoint, "refresh-1")
		.await
		.expect_err("A 401 response should surface as a transport failure.");

	assert!(matches!(error, TransportError::Rejected { status: Some(401) }));
}

#[tokio::test]
async fn malformed_response_is_a_parse_error() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/refresh-token");
			then.status(200).header("content-type", "application/json").body("not json");
		})
		.await;
	let transport = ReqwestRefreshTransport::default();
	let endpoint = Url::parse(&server.url("/refresh-token"))
		.expect("Mock refresh endpoint should parse successfully.");
	let error = transport
		.issue_refresh(&endpoint, "refresh-1")
		.await
		.expect_err("A malformed body should surface as a parse failure.");

	assert!(matches!(error, TransportError::ResponseParse { status: Some(200), .. }));
}

#[tokio::test]
async fn pipeline_refreshes_through_the_wire() {
	let fresh = bearer_token(unix_now(), 3_600);
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/refresh-token")
				.json_body(json!({ "token": "refresh-1" }));
			then.status(200).header("content-type", "application/json").body(
				json!({ "authToken": fresh, "refreshToken": "refresh-new" }).to_string(),
			);
		})
		.await;
	let store = Arc::new(MemoryStore::new());
	let coordinator = RefreshCoordinator::new(
		store.clone(),
		Arc::new(ReqwestRefreshTransport::default()),
	)
	.with_refresh(RefreshConfig::new(server.url("/refresh-token")))
	.expect("Refresh configuration should validate.");
	let pipeline = Interceptor::new(Arc::new(coordinator));

	store
		.apply(CredentialEvent::Set(
			TokenPair::new(bearer_token(unix_now() - 7_200, 3_600))
				.with_refresh_token("refresh-1"),
		))
		.expect("Seeding the store should succeed.");

	let disposition = pipeline
		.intercept(Action::Api(RequestDescriptor::new("https://example.com/users", "GET")))
		.await
		.expect("Matching actions should never fail in the pipeline.");

	mock.assert_async().await;

	let Disposition::Forward(Action::Api(request)) = disposition else {
		panic!("A successful wire refresh should forward the decorated request.");
	};
	let Headers::Static(headers) = &request.headers else {
		panic!("The decorated request should carry static headers.");
	};

	assert_eq!(headers.get("Authorization"), Some(&format!("Bearer {fresh}")));
}
