//! Fetch strategies that obtain fresh credentials from the platform endpoints.
//!
//! Both default strategies are plain trait objects, so callers can replace either one with their
//! own implementation at construction time. The ticket strategy resolves its access token through
//! the shared [`CredentialCache`], which is what makes the two tiers dependent: an expired token
//! is refreshed transparently on the way to a ticket refresh.

// self
use crate::{
	_prelude::*,
	cache::CredentialCache,
	credential::{CredentialKind, FreshCredential},
	http::{self, SignerHttpClient},
	store::StorageHooks,
};

/// Default token endpoint used when the configuration does not override it.
pub const DEFAULT_TOKEN_URL: &str = "https://api.weixin.qq.com/cgi-bin/token";
/// Default ticket endpoint used when the configuration does not override it.
pub const DEFAULT_TICKET_URL: &str = "https://api.weixin.qq.com/cgi-bin/ticket/getticket";

/// Boxed future returned by [`FetchCredential`] implementations.
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<FreshCredential>> + 'a + Send>>;

/// Strategy contract for producing a fresh credential.
///
/// Implementations are awaited at most once per cache miss and must resolve to the credential
/// value plus its reported lifetime.
pub trait FetchCredential
where
	Self: Send + Sync,
{
	/// Obtains a fresh credential from wherever the strategy sources it.
	fn fetch(&self) -> FetchFuture<'_>;
}

#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
	access_token: String,
	expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TicketEndpointResponse {
	ticket: String,
	expires_in: Option<i64>,
}

/// Default access-token strategy.
///
/// Issues `GET <endpoint>?grant_type=client_credential&appid=<app_id>&secret=<secret>` and reads
/// `{ access_token, expires_in }` from the JSON body.
pub struct TokenEndpointFetcher {
	http: Arc<dyn SignerHttpClient>,
	endpoint: Url,
	app_id: String,
	secret: String,
}
impl TokenEndpointFetcher {
	/// Creates a strategy for the provided endpoint and client credentials.
	pub fn new(
		http: Arc<dyn SignerHttpClient>,
		endpoint: Url,
		app_id: impl Into<String>,
		secret: impl Into<String>,
	) -> Self {
		Self { http, endpoint, app_id: app_id.into(), secret: secret.into() }
	}
}
impl FetchCredential for TokenEndpointFetcher {
	fn fetch(&self) -> FetchFuture<'_> {
		Box::pin(async move {
			let mut url = self.endpoint.clone();

			url.query_pairs_mut()
				.append_pair("grant_type", "client_credential")
				.append_pair("appid", &self.app_id)
				.append_pair("secret", &self.secret);

			let body = self.http.get(url).await?;
			let response: TokenEndpointResponse = http::decode_json(&body)?;

			Ok(FreshCredential::new(
				response.access_token,
				response.expires_in.map(Duration::seconds),
			))
		})
	}
}
impl Debug for TokenEndpointFetcher {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenEndpointFetcher")
			.field("endpoint", &self.endpoint.as_str())
			.field("app_id", &self.app_id)
			.field("secret", &"<redacted>")
			.finish()
	}
}

/// Default ticket strategy.
///
/// Resolves an access token first (through the shared cache under
/// [`CredentialKind::AccessToken`], honoring the configured token hooks and token strategy),
/// then issues `GET <endpoint>?access_token=<token>&type=jsapi` and reads
/// `{ ticket, expires_in }` from the JSON body.
pub struct TicketEndpointFetcher {
	http: Arc<dyn SignerHttpClient>,
	endpoint: Url,
	cache: CredentialCache,
	token_fetcher: Arc<dyn FetchCredential>,
	token_hooks: StorageHooks,
}
impl TicketEndpointFetcher {
	/// Creates a strategy that exchanges tokens from `token_fetcher` for tickets.
	pub fn new(
		http: Arc<dyn SignerHttpClient>,
		endpoint: Url,
		cache: CredentialCache,
		token_fetcher: Arc<dyn FetchCredential>,
		token_hooks: StorageHooks,
	) -> Self {
		Self { http, endpoint, cache, token_fetcher, token_hooks }
	}
}
impl FetchCredential for TicketEndpointFetcher {
	fn fetch(&self) -> FetchFuture<'_> {
		Box::pin(async move {
			let token = self
				.cache
				.resolve(
					CredentialKind::AccessToken,
					None,
					&self.token_hooks,
					self.token_fetcher.as_ref(),
					OffsetDateTime::now_utc(),
				)
				.await?;
			let mut url = self.endpoint.clone();

			url.query_pairs_mut().append_pair("access_token", &token).append_pair("type", "jsapi");

			let body = self.http.get(url).await?;
			let response: TicketEndpointResponse = http::decode_json(&body)?;

			Ok(FreshCredential::new(response.ticket, response.expires_in.map(Duration::seconds)))
		})
	}
}
impl Debug for TicketEndpointFetcher {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TicketEndpointFetcher")
			.field("endpoint", &self.endpoint.as_str())
			.field("token_hooks", &self.token_hooks)
			.finish()
	}
}
