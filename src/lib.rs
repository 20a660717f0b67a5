//! Rust’s drop-in bearer-token interception layer—single-flight refresh coordination,
//! reducer-backed credential stores, and transport-aware request decoration in one crate
//! built for production.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod codec;
pub mod credential;
pub mod error;
pub mod interceptor;
pub mod obs;
pub mod refresh;
pub mod request;
pub mod store;
pub mod transport;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::OnceCell;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::OffsetDateTime;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {httpmock as _, tokio as _};
