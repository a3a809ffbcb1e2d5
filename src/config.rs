//! Builder assembling a [`Signer`] from its configuration surface.
//!
//! Construction is the only place configuration is validated: a missing `app_id`, or the absence
//! of every credential source (`secret`, `fetch_ticket`, `fetch_token`), fails here with a
//! [`ConfigError`] before any request is served.

// self
use crate::{
	_prelude::*,
	cache::CredentialCache,
	error::ConfigError,
	fetch::{
		DEFAULT_TICKET_URL, DEFAULT_TOKEN_URL, FetchCredential, TicketEndpointFetcher,
		TokenEndpointFetcher,
	},
	http::SignerHttpClient,
	middleware::{DEFAULT_URL_KEY, ErrorHook, PathMatcher, RequestContext, Signer, UrlValidator},
	store::{GetCredentialHook, SetCredentialHook, StorageHooks},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Builder returned by [`Signer::builder`].
///
/// Every option except `app_id` is optional; `secret` may be omitted only when a custom fetch
/// strategy replaces the endpoint that would need it.
pub struct SignerBuilder {
	app_id: String,
	secret: Option<String>,
	path: PathMatcher,
	url_key: String,
	token_url: Option<Url>,
	ticket_url: Option<Url>,
	fetch_token: Option<Arc<dyn FetchCredential>>,
	fetch_ticket: Option<Arc<dyn FetchCredential>>,
	token_hooks: StorageHooks,
	ticket_hooks: StorageHooks,
	on_error: Option<Arc<dyn ErrorHook>>,
	valid_url: Option<UrlValidator>,
	http_client: Option<Arc<dyn SignerHttpClient>>,
}
impl SignerBuilder {
	/// Creates a builder for the provided application identifier.
	pub fn new(app_id: impl Into<String>) -> Self {
		Self {
			app_id: app_id.into(),
			secret: None,
			path: PathMatcher::default(),
			url_key: DEFAULT_URL_KEY.into(),
			token_url: None,
			ticket_url: None,
			fetch_token: None,
			fetch_ticket: None,
			token_hooks: StorageHooks::new(),
			ticket_hooks: StorageHooks::new(),
			on_error: None,
			valid_url: None,
			http_client: None,
		}
	}

	/// Sets the application secret used by the default token strategy.
	pub fn secret(mut self, secret: impl Into<String>) -> Self {
		self.secret = Some(secret.into());

		self
	}

	/// Overrides the served path with a literal string (defaults to `/jssdk`).
	pub fn path(mut self, path: impl Into<String>) -> Self {
		self.path = PathMatcher::literal(path);

		self
	}

	/// Overrides the served path with a caller predicate over the request context.
	pub fn path_predicate<F>(mut self, f: F) -> Self
	where
		F: Fn(&RequestContext) -> bool + Send + Sync + 'static,
	{
		self.path = PathMatcher::predicate(f);

		self
	}

	/// Overrides the query key carrying the target URL (defaults to `url`).
	pub fn url_key(mut self, key: impl Into<String>) -> Self {
		self.url_key = key.into();

		self
	}

	/// Overrides the token endpoint.
	pub fn token_url(mut self, url: Url) -> Self {
		self.token_url = Some(url);

		self
	}

	/// Overrides the ticket endpoint.
	pub fn ticket_url(mut self, url: Url) -> Self {
		self.ticket_url = Some(url);

		self
	}

	/// Replaces the default token strategy.
	pub fn fetch_token(mut self, fetcher: Arc<dyn FetchCredential>) -> Self {
		self.fetch_token = Some(fetcher);

		self
	}

	/// Replaces the default ticket strategy.
	///
	/// A custom ticket strategy bypasses token resolution entirely unless it composes a token
	/// fetch itself.
	pub fn fetch_ticket(mut self, fetcher: Arc<dyn FetchCredential>) -> Self {
		self.fetch_ticket = Some(fetcher);

		self
	}

	/// Attaches a caller-managed token lookup hook.
	pub fn on_get_token(mut self, hook: Arc<dyn GetCredentialHook>) -> Self {
		self.token_hooks = self.token_hooks.with_get(hook);

		self
	}

	/// Attaches a caller-managed token persistence hook.
	pub fn on_set_token(mut self, hook: Arc<dyn SetCredentialHook>) -> Self {
		self.token_hooks = self.token_hooks.with_set(hook);

		self
	}

	/// Attaches a caller-managed ticket lookup hook.
	pub fn on_get_ticket(mut self, hook: Arc<dyn GetCredentialHook>) -> Self {
		self.ticket_hooks = self.ticket_hooks.with_get(hook);

		self
	}

	/// Attaches a caller-managed ticket persistence hook.
	pub fn on_set_ticket(mut self, hook: Arc<dyn SetCredentialHook>) -> Self {
		self.ticket_hooks = self.ticket_hooks.with_set(hook);

		self
	}

	/// Attaches a custom error handler owning the failure response.
	pub fn on_error(mut self, hook: Arc<dyn ErrorHook>) -> Self {
		self.on_error = Some(hook);

		self
	}

	/// Attaches a target-URL validator; rejected URLs answer with HTTP 400.
	pub fn valid_url<F>(mut self, f: F) -> Self
	where
		F: Fn(&str) -> bool + Send + Sync + 'static,
	{
		self.valid_url = Some(Arc::new(f));

		self
	}

	/// Replaces the outbound HTTP client (defaults to a reqwest-backed client).
	pub fn http_client(mut self, client: Arc<dyn SignerHttpClient>) -> Self {
		self.http_client = Some(client);

		self
	}

	/// Validates the configuration and assembles the signer.
	pub fn build(self) -> Result<Signer> {
		if self.app_id.is_empty() {
			return Err(ConfigError::MissingAppId.into());
		}
		if self.secret.is_none() && self.fetch_ticket.is_none() && self.fetch_token.is_none() {
			return Err(ConfigError::MissingCredentialSource.into());
		}

		let http_client = match self.http_client {
			Some(client) => client,
			None => default_http_client()?,
		};
		let ticket_url = match self.ticket_url {
			Some(url) => url,
			None => Url::parse(DEFAULT_TICKET_URL)
				.map_err(|source| ConfigError::InvalidEndpoint { source })?,
		};
		let cache = CredentialCache::new();
		let ticket_fetcher = match self.fetch_ticket {
			Some(fetcher) => fetcher,
			None => {
				let token_fetcher = match self.fetch_token {
					Some(fetcher) => fetcher,
					None => {
						let secret =
							self.secret.ok_or(ConfigError::MissingCredentialSource)?;
						let token_url = match self.token_url {
							Some(url) => url,
							None => Url::parse(DEFAULT_TOKEN_URL)
								.map_err(|source| ConfigError::InvalidEndpoint { source })?,
						};

						Arc::new(TokenEndpointFetcher::new(
							http_client.clone(),
							token_url,
							self.app_id.clone(),
							secret,
						)) as Arc<dyn FetchCredential>
					},
				};

				Arc::new(TicketEndpointFetcher::new(
					http_client,
					ticket_url,
					cache.clone(),
					token_fetcher,
					self.token_hooks,
				)) as Arc<dyn FetchCredential>
			},
		};

		Ok(Signer {
			app_id: self.app_id,
			path: self.path,
			url_key: self.url_key,
			ticket_hooks: self.ticket_hooks,
			on_error: self.on_error,
			valid_url: self.valid_url,
			cache,
			ticket_fetcher,
		})
	}
}

fn default_http_client() -> Result<Arc<dyn SignerHttpClient>> {
	#[cfg(feature = "reqwest")]
	{
		Ok(Arc::new(ReqwestHttpClient::default()))
	}
	#[cfg(not(feature = "reqwest"))]
	{
		Err(ConfigError::MissingHttpClient.into())
	}
}

impl Debug for SignerBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SignerBuilder")
			.field("app_id", &self.app_id)
			.field("secret_set", &self.secret.is_some())
			.field("path", &self.path)
			.field("url_key", &self.url_key)
			.field("fetch_token_set", &self.fetch_token.is_some())
			.field("fetch_ticket_set", &self.fetch_ticket.is_some())
			.field("token_hooks", &self.token_hooks)
			.field("ticket_hooks", &self.ticket_hooks)
			.finish()
	}
}
