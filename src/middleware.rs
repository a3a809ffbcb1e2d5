//! Framework-agnostic request handler orchestrating path match, credential resolution, signing,
//! and response shaping.
//!
//! The handler never touches a concrete HTTP framework: adapters build a [`RequestContext`] per
//! inbound request and translate the returned [`Outcome`] back into their own response type. A
//! non-matching path yields [`Outcome::Passthrough`] without touching the cache or the network,
//! so the signer composes with whatever routing chain surrounds it.

// crates.io
use serde_json::{Map as JsonMap, Value as JsonValue, json};
// self
use crate::{
	_prelude::*,
	cache::CredentialCache,
	credential::CredentialKind,
	error::ValidationError,
	fetch::FetchCredential,
	sign,
	store::StorageHooks,
};

/// Default request path served by the signer.
pub const DEFAULT_PATH: &str = "/jssdk";
/// Default query key carrying the target URL.
pub const DEFAULT_URL_KEY: &str = "url";

/// Neutral view of an inbound request, built by the embedding framework's adapter.
#[derive(Clone, Debug, Default)]
pub struct RequestContext {
	path: String,
	query: HashMap<String, String>,
}
impl RequestContext {
	/// Creates a context for the provided request path.
	pub fn new(path: impl Into<String>) -> Self {
		Self { path: path.into(), query: HashMap::new() }
	}

	/// Adds a query parameter.
	pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.insert(key.into(), value.into());

		self
	}

	/// Request path.
	pub fn path(&self) -> &str {
		&self.path
	}

	/// Looks up a query parameter by key.
	pub fn query(&self, key: &str) -> Option<&str> {
		self.query.get(key).map(String::as_str)
	}
}

/// Path predicate selecting which requests the signer answers.
#[derive(Clone)]
pub enum PathMatcher {
	/// Exact string comparison against the request path.
	Literal(String),
	/// Caller-supplied predicate receiving the full request context.
	Predicate(Arc<dyn Fn(&RequestContext) -> bool + Send + Sync>),
}
impl PathMatcher {
	/// Builds a literal matcher.
	pub fn literal(path: impl Into<String>) -> Self {
		Self::Literal(path.into())
	}

	/// Builds a predicate matcher.
	pub fn predicate<F>(f: F) -> Self
	where
		F: Fn(&RequestContext) -> bool + Send + Sync + 'static,
	{
		Self::Predicate(Arc::new(f))
	}

	/// Evaluates the matcher against a request context.
	pub fn matches(&self, ctx: &RequestContext) -> bool {
		match self {
			Self::Literal(path) => ctx.path() == path,
			Self::Predicate(f) => f(ctx),
		}
	}
}
impl Default for PathMatcher {
	fn default() -> Self {
		Self::literal(DEFAULT_PATH)
	}
}
impl Debug for PathMatcher {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Literal(path) => f.debug_tuple("PathMatcher::Literal").field(path).finish(),
			Self::Predicate(_) => f.write_str("PathMatcher::Predicate(..)"),
		}
	}
}

/// Caller-supplied target-URL validator.
pub type UrlValidator = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Boxed future returned by [`ErrorHook`] implementations.
pub type ErrorHookFuture<'a> = Pin<Box<dyn Future<Output = SignerResponse> + 'a + Send>>;

/// Caller-supplied error handler with full control over the failure response.
pub trait ErrorHook
where
	Self: Send + Sync,
{
	/// Shapes the response for a failed request.
	fn handle<'a>(&'a self, error: Error, ctx: &'a RequestContext) -> ErrorHookFuture<'a>;
}

/// Successful signing result returned to the page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedPayload {
	/// Application identifier echoed back to the SDK.
	pub app_id: String,
	/// Unix-second timestamp used in the signature, rendered as a numeric string.
	pub timestamp: String,
	/// Nonce used in the signature.
	pub nonce_str: String,
	/// Hex-encoded SHA-1 signature.
	pub signature: String,
}
impl SignedPayload {
	fn into_body(self) -> JsonValue {
		json!({
			"appId": self.app_id,
			"timestamp": self.timestamp,
			"nonceStr": self.nonce_str,
			"signature": self.signature,
		})
	}
}

/// Response emitted by the handler; adapters translate it into their framework's response type.
#[derive(Clone, Debug, PartialEq)]
pub struct SignerResponse {
	/// HTTP status code.
	pub status: u16,
	/// JSON response body.
	pub body: JsonValue,
}
impl SignerResponse {
	/// Wraps a signed payload in a 200 response.
	pub fn ok(payload: SignedPayload) -> Self {
		Self { status: 200, body: payload.into_body() }
	}

	/// Builds the default `{ message, code }` failure body; `code` is omitted when absent.
	pub fn bad_request(message: impl Into<String>, code: Option<i64>) -> Self {
		let mut body = JsonMap::new();

		body.insert("message".into(), JsonValue::from(message.into()));

		if let Some(code) = code {
			body.insert("code".into(), JsonValue::from(code));
		}

		Self { status: 400, body: JsonValue::Object(body) }
	}

	/// Default translation of an error into the 400 failure body.
	pub fn from_error(error: &Error) -> Self {
		Self::bad_request(error.response_message(), error.upstream_code())
	}
}

/// Handler verdict for one inbound request.
#[derive(Clone, Debug)]
pub enum Outcome {
	/// Path did not match; the surrounding chain handles the request unchanged.
	Passthrough,
	/// The signer produced a response.
	Responded(SignerResponse),
}
impl Outcome {
	/// Returns `true` for [`Outcome::Passthrough`].
	pub fn is_passthrough(&self) -> bool {
		matches!(self, Self::Passthrough)
	}

	/// Extracts the response, if one was produced.
	pub fn into_response(self) -> Option<SignerResponse> {
		match self {
			Self::Passthrough => None,
			Self::Responded(response) => Some(response),
		}
	}
}

/// Page-URL signer handling one configured path.
///
/// Built through [`Signer::builder`]; owns its credential cache, so separate signers never share
/// state and tests can isolate themselves with [`reset_cache`](Signer::reset_cache).
pub struct Signer {
	pub(crate) app_id: String,
	pub(crate) path: PathMatcher,
	pub(crate) url_key: String,
	pub(crate) ticket_hooks: StorageHooks,
	pub(crate) on_error: Option<Arc<dyn ErrorHook>>,
	pub(crate) valid_url: Option<UrlValidator>,
	pub(crate) cache: CredentialCache,
	pub(crate) ticket_fetcher: Arc<dyn FetchCredential>,
}
impl Signer {
	/// Starts a builder for the provided application identifier.
	pub fn builder(app_id: impl Into<String>) -> crate::config::SignerBuilder {
		crate::config::SignerBuilder::new(app_id)
	}

	/// The configured application identifier.
	pub fn app_id(&self) -> &str {
		&self.app_id
	}

	/// The credential cache owned by this signer.
	pub fn cache(&self) -> &CredentialCache {
		&self.cache
	}

	/// Clears the in-memory credential cache; used to isolate test runs.
	pub fn reset_cache(&self) {
		self.cache.clear();
	}

	/// Handles one inbound request.
	///
	/// Non-matching paths pass through untouched. Matching requests extract the target URL,
	/// resolve a ticket, and sign; any failure is delegated to the configured error hook or
	/// answered with the default 400 body.
	pub async fn handle(&self, ctx: &RequestContext) -> Outcome {
		if !self.path.matches(ctx) {
			return Outcome::Passthrough;
		}

		match self.sign_for(ctx).await {
			Ok(payload) => Outcome::Responded(SignerResponse::ok(payload)),
			Err(error) => match &self.on_error {
				Some(hook) => Outcome::Responded(hook.handle(error, ctx).await),
				None => Outcome::Responded(SignerResponse::from_error(&error)),
			},
		}
	}

	async fn sign_for(&self, ctx: &RequestContext) -> Result<SignedPayload> {
		// One instant per request: the cache freshness reference and the signed timestamp must
		// agree for the signature to be reproducible against the same cache decision.
		let now = OffsetDateTime::now_utc();
		let nonce = sign::nonce();
		let url = ctx
			.query(&self.url_key)
			.ok_or_else(|| ValidationError::MissingUrlParam { key: self.url_key.clone() })?;

		if let Some(validator) = &self.valid_url {
			if !validator(url) {
				return Err(ValidationError::RejectedUrl { url: url.to_owned() }.into());
			}
		}

		let ticket = self
			.cache
			.resolve(
				CredentialKind::Ticket,
				Some(url),
				&self.ticket_hooks,
				self.ticket_fetcher.as_ref(),
				now,
			)
			.await?;
		let timestamp = now.unix_timestamp();
		let signature = sign::signature(&ticket, &nonce, timestamp, url);

		Ok(SignedPayload {
			app_id: self.app_id.clone(),
			timestamp: timestamp.to_string(),
			nonce_str: nonce,
			signature,
		})
	}
}
impl Debug for Signer {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Signer")
			.field("app_id", &self.app_id)
			.field("path", &self.path)
			.field("url_key", &self.url_key)
			.field("ticket_hooks", &self.ticket_hooks)
			.field("on_error_set", &self.on_error.is_some())
			.field("valid_url_set", &self.valid_url.is_some())
			.finish()
	}
}
