//! Interceptor-level error types shared across the codec, stores, coordinator, and transport.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical interceptor error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// State-container integration failure.
	#[error("{0}")]
	Store(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure while calling the refresh endpoint.
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Configuration and validation failures raised at construction time.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Refresh capability was requested without a target endpoint.
	#[error("Refresh capability requires a refresh endpoint.")]
	MissingRefreshEndpoint,
	/// The configured refresh endpoint cannot be parsed as a URL.
	#[error("Refresh endpoint is not a valid URL.")]
	InvalidRefreshEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}

/// Transport-level failures raised while exchanging a refresh token.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the refresh endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Refresh endpoint rejected the exchange with a non-success status.
	#[error("Refresh endpoint rejected the token exchange.")]
	Rejected {
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Refresh endpoint responded with malformed JSON that could not be parsed.
	#[error("Refresh endpoint returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
