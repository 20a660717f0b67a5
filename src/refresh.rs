//! Single-flight refresh coordination.
//!
//! [`RefreshCoordinator::ensure_credential`] is the gate every credentialed
//! request passes through. A usable credential resolves immediately; an
//! expired one either joins the refresh already in flight or claims a new
//! session and performs exactly one transport exchange on behalf of every
//! caller that discovered the expiration concurrently. Failed exchanges reset
//! the store, dispatch the configured failure action, and resolve every joined
//! caller as aborted.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	credential::{Credential, CredentialEvent},
	error::ConfigError,
	obs::{self, StageKind, StageOutcome, StageSpan},
	store::CredentialStore,
	transport::RefreshTransport,
};

/// Application hook dispatched when a refresh fails irrecoverably (e.g. a
/// forced logout).
pub trait FailureAction
where
	Self: Send + Sync,
{
	/// Dispatches the failure action.
	fn dispatch(&self);
}
impl<F> FailureAction for F
where
	F: Fn() + Send + Sync,
{
	fn dispatch(&self) {
		self()
	}
}

/// Refresh capability configuration.
///
/// Validated when attached via [`RefreshCoordinator::with_refresh`]; a missing
/// or unparseable endpoint is a construction-time error, never a deferred one.
#[derive(Clone)]
pub struct RefreshConfig {
	/// Target endpoint for the refresh exchange.
	pub endpoint: String,
	/// Action dispatched when a refresh fails irrecoverably.
	pub failure_action: Option<Arc<dyn FailureAction>>,
}
impl RefreshConfig {
	/// Creates a configuration targeting the provided endpoint.
	pub fn new(endpoint: impl Into<String>) -> Self {
		Self { endpoint: endpoint.into(), failure_action: None }
	}

	/// Attaches the action dispatched on irrecoverable refresh failure.
	pub fn with_failure_action(mut self, action: impl 'static + FailureAction) -> Self {
		self.failure_action = Some(Arc::new(action));

		self
	}

	fn validate(self) -> Result<RefreshRuntime> {
		if self.endpoint.trim().is_empty() {
			return Err(ConfigError::MissingRefreshEndpoint.into());
		}

		let endpoint = Url::parse(&self.endpoint)
			.map_err(|source| ConfigError::InvalidRefreshEndpoint { source })?;

		Ok(RefreshRuntime { endpoint, failure_action: self.failure_action })
	}
}
impl Debug for RefreshConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshConfig")
			.field("endpoint", &self.endpoint)
			.field("failure_action_set", &self.failure_action.is_some())
			.finish()
	}
}

/// Validated refresh runtime held by the coordinator.
struct RefreshRuntime {
	endpoint: Url,
	failure_action: Option<Arc<dyn FailureAction>>,
}

/// Resolution of a credential request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnsureOutcome {
	/// A usable credential is available; attach it and forward.
	Ready(Credential),
	/// No credential is available and none can be obtained; forward the
	/// request unauthenticated.
	Unauthenticated,
	/// The refresh failed; the request must never reach the transport.
	Aborted,
}

/// Ephemeral state for a refresh in flight, shared by every joined caller.
///
/// Settles exactly once; joiners wait on the cell instead of issuing a second
/// exchange.
#[derive(Default)]
struct RefreshSession {
	outcome: OnceCell<EnsureOutcome>,
}
impl RefreshSession {
	async fn join(&self) -> EnsureOutcome {
		self.outcome.wait().await.clone()
	}

	async fn settle(&self, outcome: EnsureOutcome) {
		let _ = self.outcome.set(outcome).await;
	}
}

/// Role assigned to a caller after the atomic check-then-claim step.
enum Plan {
	Ready(Credential),
	Unauthenticated,
	Join(Arc<RefreshSession>),
	Lead(Arc<RefreshSession>, String),
}

/// Clears the in-flight marker once the leading future settles or is dropped.
struct SessionGuard<'a> {
	coordinator: &'a RefreshCoordinator,
	session: Arc<RefreshSession>,
}
impl Drop for SessionGuard<'_> {
	fn drop(&mut self) {
		*self.coordinator.in_flight.lock() = None;

		// No-op when the session already settled; joiners must never hang if
		// the leading future is dropped mid-flight.
		let _ = self.session.outcome.set_blocking(EnsureOutcome::Aborted);
	}
}

/// Coordinates credential checks and single-flight refresh exchanges.
pub struct RefreshCoordinator {
	/// Shared metrics recorder for refresh cycle outcomes.
	pub metrics: Arc<RefreshMetrics>,
	store: Arc<dyn CredentialStore>,
	transport: Arc<dyn RefreshTransport>,
	runtime: Option<RefreshRuntime>,
	in_flight: Mutex<Option<Arc<RefreshSession>>>,
}
impl RefreshCoordinator {
	/// Creates a coordinator with refresh disabled.
	///
	/// Credential attachment still works for never-expiring tokens; an expired
	/// or absent credential resolves [`EnsureOutcome::Unauthenticated`].
	pub fn new(store: Arc<dyn CredentialStore>, transport: Arc<dyn RefreshTransport>) -> Self {
		Self {
			metrics: Default::default(),
			store,
			transport,
			runtime: None,
			in_flight: Mutex::new(None),
		}
	}

	/// Enables refresh, validating the configuration before any traffic flows.
	pub fn with_refresh(mut self, config: RefreshConfig) -> Result<Self> {
		self.runtime = Some(config.validate()?);

		Ok(self)
	}

	/// Resolves a usable credential for an outgoing request.
	///
	/// For N concurrent callers that observe an expired credential at the same
	/// time, exactly one transport exchange is issued and all N resolve with
	/// its result. Errors are reserved for state-container integration bugs;
	/// transport failures resolve [`EnsureOutcome::Aborted`] instead.
	pub async fn ensure_credential(&self) -> Result<EnsureOutcome> {
		const KIND: StageKind = StageKind::Refresh;

		let span = StageSpan::new(KIND, "ensure_credential");

		match self.plan()? {
			Plan::Ready(credential) => Ok(EnsureOutcome::Ready(credential)),
			Plan::Unauthenticated => Ok(EnsureOutcome::Unauthenticated),
			Plan::Join(session) => Ok(span.instrument(session.join()).await),
			Plan::Lead(session, refresh_token) => {
				obs::record_stage_outcome(KIND, StageOutcome::Attempt);
				self.metrics.record_attempt();

				let guard = SessionGuard { coordinator: self, session };
				let result = span.instrument(self.lead(&refresh_token)).await;

				match result {
					Ok(outcome) => {
						if matches!(outcome, EnsureOutcome::Ready(_)) {
							self.metrics.record_success();
							obs::record_stage_outcome(KIND, StageOutcome::Success);
						} else {
							self.metrics.record_failure();
							obs::record_stage_outcome(KIND, StageOutcome::Failure);
						}

						guard.session.settle(outcome.clone()).await;

						Ok(outcome)
					},
					Err(err) => {
						self.metrics.record_failure();
						obs::record_stage_outcome(KIND, StageOutcome::Failure);
						guard.session.settle(EnsureOutcome::Aborted).await;

						Err(err)
					},
				}
			},
		}
	}

	// Evaluates the credential and the in-flight marker under one lock so the
	// check-then-claim sequence cannot race a concurrent caller into a second
	// refresh.
	fn plan(&self) -> Result<Plan> {
		let mut in_flight = self.in_flight.lock();
		let credential = self.store.credential()?;

		if credential.is_usable() {
			return Ok(Plan::Ready(credential));
		}

		let Some(refresh_token) =
			credential.refresh_token.as_ref().map(|secret| secret.expose().to_owned())
		else {
			return Ok(Plan::Unauthenticated);
		};

		if self.runtime.is_none() {
			return Ok(Plan::Unauthenticated);
		}
		if let Some(session) = in_flight.as_ref() {
			return Ok(Plan::Join(session.clone()));
		}

		let session = Arc::new(RefreshSession::default());

		*in_flight = Some(session.clone());

		Ok(Plan::Lead(session, refresh_token))
	}

	// Performs the single transport exchange on behalf of every joined caller.
	async fn lead(&self, refresh_token: &str) -> Result<EnsureOutcome> {
		// `plan` only hands out the lead role when a runtime is configured.
		let Some(runtime) = self.runtime.as_ref() else {
			return Ok(EnsureOutcome::Unauthenticated);
		};

		match self.transport.issue_refresh(&runtime.endpoint, refresh_token).await {
			Ok(pair) => {
				self.store.apply(CredentialEvent::RefreshSuccess(pair))?;

				Ok(EnsureOutcome::Ready(self.store.credential()?))
			},
			Err(err) => {
				#[cfg(feature = "tracing")]
				tracing::warn!(error = %err, "Refresh exchange failed; resetting credential.");
				#[cfg(not(feature = "tracing"))]
				let _ = &err;

				self.store.apply(CredentialEvent::RefreshFailure)?;

				if let Some(action) = runtime.failure_action.as_ref() {
					action.dispatch();
				}

				Ok(EnsureOutcome::Aborted)
			},
		}
	}
}
impl Debug for RefreshCoordinator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshCoordinator")
			.field("refresh_enabled", &self.runtime.is_some())
			.field("endpoint", &self.runtime.as_ref().map(|runtime| runtime.endpoint.as_str()))
			.finish()
	}
}
