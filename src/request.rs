//! Outgoing request descriptors and bearer-header decoration.

// self
use crate::{_prelude::*, credential::Credential};

/// Header name used for attached credentials.
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Source of caller-managed headers computed at dispatch time.
///
/// A request carrying one of these is treated as self-managing: the decorator
/// leaves it untouched and the downstream transport invokes the source when it
/// builds the wire request.
pub trait HeaderSource
where
	Self: Send + Sync,
{
	/// Produces the headers for the outgoing request.
	fn headers(&self) -> BTreeMap<String, String>;
}
impl<F> HeaderSource for F
where
	F: Fn() -> BTreeMap<String, String> + Send + Sync,
{
	fn headers(&self) -> BTreeMap<String, String> {
		self()
	}
}

/// Header field of a request: a static mapping or a caller-managed source.
#[derive(Clone)]
pub enum Headers {
	/// Static name/value mapping the decorator may merge into.
	Static(BTreeMap<String, String>),
	/// Opaque generator handled downstream; the decorator bypasses it.
	Dynamic(Arc<dyn HeaderSource>),
}
impl Headers {
	/// Empty static mapping.
	pub fn empty() -> Self {
		Self::Static(BTreeMap::new())
	}
}
impl Default for Headers {
	fn default() -> Self {
		Self::empty()
	}
}
impl Debug for Headers {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Static(map) => f.debug_tuple("Headers::Static").field(map).finish(),
			Self::Dynamic(_) => f.debug_tuple("Headers::Dynamic").field(&"<opaque>").finish(),
		}
	}
}
impl PartialEq for Headers {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Static(a), Self::Static(b)) => a == b,
			// Dynamic sources compare by identity; a descriptor only equals
			// itself (or a clone sharing the same generator).
			(Self::Dynamic(a), Self::Dynamic(b)) => Arc::ptr_eq(a, b),
			_ => false,
		}
	}
}

/// Immutable shape of an outgoing call before dispatch.
///
/// The interceptor only reads and augments `headers`; every other field passes
/// through unchanged.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestDescriptor {
	/// Target endpoint.
	pub endpoint: String,
	/// HTTP method verb.
	pub method: String,
	/// Header field (static mapping or caller-managed source).
	pub headers: Headers,
	/// Optional JSON body.
	pub body: Option<serde_json::Value>,
	/// Bypasses credentialing entirely when set.
	pub skip_credential: bool,
	/// Additional metadata forwarded untouched.
	pub metadata: BTreeMap<String, serde_json::Value>,
}
impl RequestDescriptor {
	/// Creates a descriptor for the provided endpoint + method.
	pub fn new(endpoint: impl Into<String>, method: impl Into<String>) -> Self {
		Self { endpoint: endpoint.into(), method: method.into(), ..Default::default() }
	}

	/// Replaces the static header mapping.
	pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
		self.headers = Headers::Static(headers);

		self
	}

	/// Marks the headers as caller-managed.
	pub fn with_header_source(mut self, source: impl 'static + HeaderSource) -> Self {
		self.headers = Headers::Dynamic(Arc::new(source));

		self
	}

	/// Attaches a JSON body.
	pub fn with_body(mut self, body: serde_json::Value) -> Self {
		self.body = Some(body);

		self
	}

	/// Opts the request out of credentialing.
	pub fn skip_credential(mut self) -> Self {
		self.skip_credential = true;

		self
	}

	/// Attaches a metadata entry forwarded untouched.
	pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
		self.metadata.insert(key.into(), value);

		self
	}

	/// Returns `true` when the request manages its own headers.
	pub fn has_dynamic_headers(&self) -> bool {
		matches!(self.headers, Headers::Dynamic(_))
	}
}

/// Merges a bearer authorization header into the request, when applicable.
///
/// No-op for opted-out requests, caller-managed headers, and absent access
/// tokens; otherwise the authorization header is added (overwriting a previous
/// entry, preserving the rest) and every other field is returned unchanged.
pub fn decorate(request: RequestDescriptor, credential: &Credential) -> RequestDescriptor {
	if request.skip_credential || request.has_dynamic_headers() {
		return request;
	}

	let Some(access_token) = credential.access_token.as_ref() else {
		return request;
	};
	let mut request = request;

	if let Headers::Static(headers) = &mut request.headers {
		headers
			.insert(AUTHORIZATION_HEADER.into(), format!("Bearer {}", access_token.expose()));
	}

	request
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::credential::TokenSecret;

	fn credential(access_token: &str) -> Credential {
		Credential {
			access_token: Some(TokenSecret::new(access_token)),
			refresh_token: None,
			expires_at: i64::MAX,
		}
	}

	#[test]
	fn decorate_attaches_bearer_header() {
		let request = RequestDescriptor::new("https://example.com/users", "GET");
		let decorated = decorate(request, &credential("access-1"));

		assert_eq!(
			decorated.headers,
			Headers::Static(BTreeMap::from([(
				"Authorization".into(),
				"Bearer access-1".into()
			)]))
		);
	}

	#[test]
	fn decorate_preserves_existing_headers_and_other_fields() {
		let request = RequestDescriptor::new("https://example.com/users", "POST")
			.with_headers(BTreeMap::from([
				("Content-Type".into(), "application/json".into()),
				("Authorization".into(), "Bearer stale".into()),
			]))
			.with_body(serde_json::json!({ "name": "someone" }))
			.with_metadata("correlation", serde_json::json!("abc-123"));
		let decorated = decorate(request.clone(), &credential("access-2"));

		assert_eq!(
			decorated.headers,
			Headers::Static(BTreeMap::from([
				("Content-Type".into(), "application/json".into()),
				("Authorization".into(), "Bearer access-2".into()),
			]))
		);
		assert_eq!(decorated.endpoint, request.endpoint);
		assert_eq!(decorated.method, request.method);
		assert_eq!(decorated.body, request.body);
		assert_eq!(decorated.metadata, request.metadata);
	}

	#[test]
	fn decorate_skips_opted_out_requests() {
		let request = RequestDescriptor::new("https://example.com/users", "GET").skip_credential();
		let decorated = decorate(request.clone(), &credential("access-3"));

		assert_eq!(decorated, request);
	}

	#[test]
	fn decorate_skips_caller_managed_headers() {
		let request = RequestDescriptor::new("https://example.com/users", "GET")
			.with_header_source(BTreeMap::new);
		let decorated = decorate(request.clone(), &credential("access-4"));

		assert_eq!(decorated, request);
	}

	#[test]
	fn decorate_skips_absent_access_token() {
		let request = RequestDescriptor::new("https://example.com/users", "GET");
		let decorated = decorate(request.clone(), &Credential::default());

		assert_eq!(decorated, request);
	}
}
