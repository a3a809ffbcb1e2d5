//! Rust's turnkey JS-SDK URL signer - time-boxed page signatures, dependent-expiry credential
//! caches, and pluggable storage hooks in one crate built for production.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod cache;
pub mod config;
pub mod credential;
pub mod error;
pub mod fetch;
pub mod http;
pub mod middleware;
pub mod obs;
pub mod sign;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		config::SignerBuilder,
		http::ReqwestHttpClient,
		middleware::{DEFAULT_PATH, DEFAULT_URL_KEY, RequestContext, Signer},
	};

	/// Fixture application identifier shared by integration tests.
	pub const TEST_APP_ID: &str = "asdf";
	/// Fixture application secret shared by integration tests.
	pub const TEST_SECRET: &str = "biubiubiu";

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Request context hitting the signer's default path with the default URL key.
	pub fn test_context(url: &str) -> RequestContext {
		RequestContext::new(DEFAULT_PATH).with_query_param(DEFAULT_URL_KEY, url)
	}

	/// Builder preconfigured with mock endpoints, fixture credentials, and the insecure test
	/// client.
	pub fn test_signer_builder(token_url: &str, ticket_url: &str) -> SignerBuilder {
		Signer::builder(TEST_APP_ID)
			.secret(TEST_SECRET)
			.token_url(Url::parse(token_url).expect("Mock token endpoint should parse."))
			.ticket_url(Url::parse(ticket_url).expect("Mock ticket endpoint should parse."))
			.http_client(Arc::new(test_reqwest_http_client()))
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _, jssdk_signer as _};
