//! Signer-level error types shared across the cache, fetch strategies, and the request handler.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical signer error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem; surfaced from construction and never caught downstream.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Target URL rejected before any credential work happened.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Non-OK or undecodable response from the token/ticket endpoint.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Caller-supplied storage hook failure.
	#[error("{0}")]
	Hook(
		#[from]
		#[source]
		crate::store::HookError,
	),
}
impl Error {
	/// Upstream error code carried by the failure, when the endpoint supplied one.
	pub fn upstream_code(&self) -> Option<i64> {
		match self {
			Self::Upstream(UpstreamError::Endpoint { code, .. }) => *code,
			_ => None,
		}
	}

	/// Message placed into the default error response body.
	///
	/// Endpoint failures surface the upstream message verbatim; every other variant falls back to
	/// its display rendering.
	pub fn response_message(&self) -> String {
		match self {
			Self::Upstream(UpstreamError::Endpoint { message, .. }) => message.clone(),
			other => other.to_string(),
		}
	}
}

/// Configuration failures raised while building a signer.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// `app_id` was empty.
	#[error("Missing required app_id.")]
	MissingAppId,
	/// Neither a secret nor a custom fetch strategy was supplied.
	#[error("At least one of secret, fetch_ticket, or fetch_token must be supplied.")]
	MissingCredentialSource,
	/// An endpoint URL could not be parsed.
	#[error("Endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// No HTTP client was supplied and the `reqwest` feature is disabled.
	#[error("No HTTP client is configured; supply one or enable the reqwest feature.")]
	MissingHttpClient,
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}

/// Target-URL validation failures; answered with HTTP 400 unless a custom error hook intercepts.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// The configured validator rejected the target URL.
	#[error("{url} is NOT a valid URL.")]
	RejectedUrl {
		/// The rejected value.
		url: String,
	},
	/// The request carried no target URL under the configured query key.
	#[error("Missing `{key}` query parameter.")]
	MissingUrlParam {
		/// Query key the handler looked up.
		key: String,
	},
}

/// Failures attributed to the token/ticket endpoints.
#[derive(Debug, ThisError)]
pub enum UpstreamError {
	/// Endpoint answered with a non-success status.
	///
	/// JSON error bodies are merged onto the variant (`message`/`errmsg` and `code`/`errcode`);
	/// non-JSON bodies surface their raw text as the message.
	#[error("{message}")]
	Endpoint {
		/// Upstream-supplied message summarizing the failure.
		message: String,
		/// Upstream-supplied error code, when present.
		code: Option<i64>,
		/// HTTP status code of the response.
		status: u16,
	},
	/// Endpoint answered successfully but the body could not be decoded.
	#[error("Endpoint returned a malformed response body.")]
	Decode {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the endpoint.")]
	Io(#[from] std::io::Error),
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
