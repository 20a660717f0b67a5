//! Outward-facing interception pipeline composing the coordinator and decorator.

// self
use crate::{
	_prelude::*,
	obs::{StageKind, StageSpan},
	refresh::{EnsureOutcome, RefreshCoordinator},
	request::{self, RequestDescriptor},
};

/// Application-defined action flowing through the pipeline untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppAction {
	/// Action discriminant.
	pub kind: String,
	/// Optional JSON payload.
	pub payload: Option<serde_json::Value>,
}
impl AppAction {
	/// Creates an action with no payload.
	pub fn new(kind: impl Into<String>) -> Self {
		Self { kind: kind.into(), payload: None }
	}

	/// Attaches a payload.
	pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
		self.payload = Some(payload);

		self
	}
}

/// Outgoing action entering the pipeline.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
	/// Credentialed API request recognized by the interceptor.
	Api(RequestDescriptor),
	/// Anything else; forwarded untouched.
	App(AppAction),
}

/// Result of running an action through the interceptor.
#[derive(Clone, Debug, PartialEq)]
pub enum Disposition {
	/// Forward the (possibly decorated) action downstream.
	Forward(Action),
	/// The refresh failed; the request never reaches the transport and only
	/// the configured failure action is observed downstream.
	Dropped,
}

/// Outward-facing entry point run for every outgoing action.
#[derive(Debug)]
pub struct Interceptor {
	coordinator: Arc<RefreshCoordinator>,
}
impl Interceptor {
	/// Creates the pipeline around a configured coordinator.
	pub fn new(coordinator: Arc<RefreshCoordinator>) -> Self {
		Self { coordinator }
	}

	/// Runs one outgoing action through the pipeline.
	///
	/// Non-API actions and opted-out or self-managing requests pass through
	/// unchanged without consulting the coordinator. Errors are reserved for
	/// state-container integration bugs; a normal matching action never fails
	/// here.
	pub async fn intercept(&self, action: Action) -> Result<Disposition> {
		let request = match action {
			Action::Api(request) => request,
			other => return Ok(Disposition::Forward(other)),
		};

		if request.skip_credential || request.has_dynamic_headers() {
			return Ok(Disposition::Forward(Action::Api(request)));
		}

		let span = StageSpan::new(StageKind::Intercept, "intercept");
		let outcome = span.instrument(self.coordinator.ensure_credential()).await?;

		Ok(match outcome {
			EnsureOutcome::Ready(credential) =>
				Disposition::Forward(Action::Api(request::decorate(request, &credential))),
			EnsureOutcome::Unauthenticated => Disposition::Forward(Action::Api(request)),
			EnsureOutcome::Aborted => Disposition::Dropped,
		})
	}
}
