//! Transport contract for the refresh exchange plus the bundled reqwest adapter.

// self
use crate::{_prelude::*, credential::TokenPair, error::TransportError};

/// Boxed future returned by [`RefreshTransport::issue_refresh`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<TokenPair, TransportError>> + 'a + Send>>;

/// Async operation that exchanges a refresh token for a new pair.
///
/// The coordinator invokes this at most once per refresh cycle and never
/// retries it; retry and timeout policy belong to the implementation. A
/// non-success status counts as a failure and must surface as an error, not a
/// fabricated pair.
pub trait RefreshTransport
where
	Self: Send + Sync,
{
	/// Issues the refresh exchange against the configured endpoint.
	fn issue_refresh<'a>(
		&'a self,
		endpoint: &'a Url,
		refresh_token: &'a str,
	) -> TransportFuture<'a>;
}

/// JSON body sent to the refresh endpoint.
#[cfg(feature = "reqwest")]
#[derive(Serialize)]
struct RefreshRequestBody<'a> {
	token: &'a str,
}

/// Default transport POSTing `{"token": <refresh token>}` as JSON to the
/// refresh endpoint and parsing the returned pair.
///
/// The exchange goes straight through the wrapped client, outside the
/// interceptor pipeline, so a refresh call can never recurse into
/// credentialing.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestRefreshTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestRefreshTransport {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	async fn exchange(
		client: ReqwestClient,
		endpoint: Url,
		refresh_token: String,
	) -> Result<TokenPair, TransportError> {
		let response = client
			.post(endpoint)
			.json(&RefreshRequestBody { token: &refresh_token })
			.send()
			.await?;
		let status = response.status();

		if !status.is_success() {
			return Err(TransportError::Rejected { status: Some(status.as_u16()) });
		}

		let raw = response.bytes().await?;
		let mut deserializer = serde_json::Deserializer::from_slice(&raw);
		let pair: TokenPair = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| TransportError::ResponseParse {
				source,
				status: Some(status.as_u16()),
			})?;

		Ok(pair)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestRefreshTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl RefreshTransport for ReqwestRefreshTransport {
	fn issue_refresh<'a>(
		&'a self,
		endpoint: &'a Url,
		refresh_token: &'a str,
	) -> TransportFuture<'a> {
		let client = self.0.clone();
		let endpoint = endpoint.clone();
		let refresh_token = refresh_token.to_owned();

		Box::pin(async move { Self::exchange(client, endpoint, refresh_token).await })
	}
}
