//! Transport primitives for outbound token/ticket endpoint calls.
//!
//! The module exposes [`SignerHttpClient`] as the crate's only dependency on an HTTP stack.
//! Implementations perform a plain GET and normalize the response: non-success statuses become
//! [`UpstreamError::Endpoint`] values (JSON bodies merged onto the error, non-JSON bodies
//! surfaced as the raw message), while success bodies keep their JSON-ness flag so fetch
//! strategies can decode them with a diagnosable path on mismatch.

// std
use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")] use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
// self
#[cfg(feature = "reqwest")] use crate::error::TransportError;
use crate::{_prelude::*, error::UpstreamError};

/// Boxed future returned by [`SignerHttpClient`] implementations.
pub type HttpFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing endpoint GETs.
///
/// Implementations must be `Send + Sync + 'static` so a single client can be shared across
/// concurrent requests behind `Arc<dyn SignerHttpClient>`. The crate adds no timeout or retry:
/// an outbound call that never resolves stalls the owning request.
pub trait SignerHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Executes a GET against the URL and normalizes the outcome.
	///
	/// Non-success statuses must resolve to an error built with [`upstream_failure`]; transport
	/// failures map to [`TransportError`](crate::error::TransportError).
	fn get(&self, url: Url) -> HttpFuture<'_, UpstreamBody>;
}

/// Successful response body together with the metadata fetch strategies need to decode it.
#[derive(Clone, Debug)]
pub struct UpstreamBody {
	/// HTTP status code of the response.
	pub status: u16,
	/// Whether the response advertised a JSON content type.
	pub json: bool,
	/// Raw body text.
	pub text: String,
}

/// Decodes a JSON endpoint body into a typed response.
pub fn decode_json<T>(body: &UpstreamBody) -> Result<T>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_str(&body.text);

	serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| UpstreamError::Decode { source, status: Some(body.status) }.into())
}

/// Normalizes a non-success endpoint response into an [`UpstreamError`].
///
/// JSON bodies contribute `message`/`errmsg` and `code`/`errcode` fields; anything else (or a
/// body that fails to parse despite its content type) surfaces the raw text as the message.
pub fn upstream_failure(status: u16, json: bool, text: &str) -> UpstreamError {
	if json {
		if let Ok(fields) = serde_json::from_str::<JsonValue>(text) {
			let message = fields
				.get("message")
				.or_else(|| fields.get("errmsg"))
				.and_then(JsonValue::as_str)
				.unwrap_or("ERROR")
				.to_owned();
			let code =
				fields.get("code").or_else(|| fields.get("errcode")).and_then(JsonValue::as_i64);

			return UpstreamError::Endpoint { message, code, status };
		}
	}

	UpstreamError::Endpoint { message: text.to_owned(), code: None, status }
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl SignerHttpClient for ReqwestHttpClient {
	fn get(&self, url: Url) -> HttpFuture<'_, UpstreamBody> {
		let client = self.0.clone();

		Box::pin(async move {
			let response = client.get(url).send().await.map_err(TransportError::from)?;
			let status = response.status();
			let json = response
				.headers()
				.get(CONTENT_TYPE)
				.and_then(|value| value.to_str().ok())
				.is_some_and(|value| value.to_ascii_lowercase().contains("application/json"));
			let text = response.text().await.map_err(TransportError::from)?;

			if !status.is_success() {
				return Err(upstream_failure(status.as_u16(), json, &text).into());
			}

			Ok(UpstreamBody { status: status.as_u16(), json, text })
		})
	}
}
