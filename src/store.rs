//! State-container contracts and the built-in in-memory credential store.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	credential::{Credential, CredentialEvent},
};

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// The state container does not expose the expected credential slice.
	///
	/// Container adapters must raise this on first access instead of treating
	/// the gap as "no credential held", which would mask an integration bug.
	#[error("State container is missing the credential slice.")]
	MissingCredentialSlice,
	/// Backend-level failure reported by the container.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// State-container contract the coordinator reads from and dispatches into.
///
/// Reads are synchronous so the coordinator can evaluate the credential and
/// its in-flight marker under a single coordination point. The store performs
/// no I/O of its own; it is a reducer over [`CredentialEvent`] transitions
/// with session lifetime.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Returns the currently held credential.
	fn credential(&self) -> Result<Credential, StoreError>;

	/// Applies a credential transition.
	fn apply(&self, event: CredentialEvent) -> Result<(), StoreError>;
}
