//! Thread-safe in-memory [`CredentialStore`] for session-lifetime credentials.

// self
use crate::{
	_prelude::*,
	credential::{Credential, CredentialEvent, EmbeddedExpiration, ExpirationPolicy},
	store::{CredentialStore, StoreError},
};

/// Thread-safe store keeping the credential in-process for the session.
///
/// Starts in the reset state and applies the reducer under a write lock so
/// readers never observe a half-applied transition.
pub struct MemoryStore {
	state: RwLock<Credential>,
	policy: Arc<dyn ExpirationPolicy>,
}
impl MemoryStore {
	/// Creates a store that derives expirations from the token's embedded payload.
	pub fn new() -> Self {
		Self::with_policy(Arc::new(EmbeddedExpiration))
	}

	/// Creates a store using a caller-supplied expiration policy.
	pub fn with_policy(policy: Arc<dyn ExpirationPolicy>) -> Self {
		Self { state: RwLock::new(Credential::default()), policy }
	}
}
impl Default for MemoryStore {
	fn default() -> Self {
		Self::new()
	}
}
impl Debug for MemoryStore {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("MemoryStore").field("state", &*self.state.read()).finish()
	}
}
impl CredentialStore for MemoryStore {
	fn credential(&self) -> Result<Credential, StoreError> {
		Ok(self.state.read().clone())
	}

	fn apply(&self, event: CredentialEvent) -> Result<(), StoreError> {
		let mut state = self.state.write();

		*state = state.apply(&event, self.policy.as_ref());

		Ok(())
	}
}
