// std
use std::sync::atomic::{AtomicUsize, Ordering};
// crates.io
use httpmock::prelude::*;
use parking_lot::Mutex;
// self
use jssdk_signer::{
	_preludet::*,
	middleware::{ErrorHook, ErrorHookFuture, Outcome, RequestContext, SignerResponse},
	sign,
};

const TOKEN_BODY: &str = r#"{"access_token":"asdf","expires_in":7200}"#;
const TICKET_BODY: &str = r#"{"ticket":"asdf","expires_in":7200}"#;

#[derive(Default)]
struct RecordingErrorHook {
	calls: AtomicUsize,
	messages: Mutex<Vec<String>>,
}
impl ErrorHook for RecordingErrorHook {
	fn handle<'a>(&'a self, error: Error, _: &'a RequestContext) -> ErrorHookFuture<'a> {
		Box::pin(async move {
			self.calls.fetch_add(1, Ordering::SeqCst);
			self.messages.lock().push(error.response_message());

			SignerResponse { status: 502, body: serde_json::json!({ "handled": true }) }
		})
	}
}

async fn mock_endpoints(server: &MockServer) -> (httpmock::Mock<'_>, httpmock::Mock<'_>) {
	let token = server
		.mock_async(|when, then| {
			when.method(GET).path("/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let ticket = server
		.mock_async(|when, then| {
			when.method(GET).path("/getticket");
			then.status(200).header("content-type", "application/json").body(TICKET_BODY);
		})
		.await;

	(token, ticket)
}

#[tokio::test]
async fn responds_with_a_valid_signature_payload() {
	let server = MockServer::start_async().await;
	let (token, ticket) = mock_endpoints(&server).await;
	let signer = test_signer_builder(&server.url("/token"), &server.url("/getticket"))
		.build()
		.expect("Test signer should build.");
	let response = signer
		.handle(&test_context("http://awesome.com"))
		.await
		.into_response()
		.expect("Matching path should produce a response.");

	assert_eq!(response.status, 200);
	assert_eq!(response.body["appId"], TEST_APP_ID);

	let timestamp = response.body["timestamp"].as_str().expect("Timestamp should be a string.");
	let nonce = response.body["nonceStr"].as_str().expect("Nonce should be a string.");
	let signature = response.body["signature"].as_str().expect("Signature should be a string.");

	assert!(timestamp.bytes().all(|b| b.is_ascii_digit()));
	assert_eq!(nonce.len(), 11);
	assert_eq!(signature.len(), 40);
	assert!(signature.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
	// The signature must bind the resolved ticket, the emitted nonce/timestamp, and the page URL.
	assert_eq!(
		signature,
		sign::signature(
			"asdf",
			nonce,
			timestamp.parse().expect("Timestamp should parse as seconds."),
			"http://awesome.com",
		),
	);

	token.assert_async().await;
	ticket.assert_async().await;
}

#[tokio::test]
async fn reuses_cached_credentials_within_the_expiry_window() {
	let server = MockServer::start_async().await;
	let (token, ticket) = mock_endpoints(&server).await;
	let signer = test_signer_builder(&server.url("/token"), &server.url("/getticket"))
		.build()
		.expect("Test signer should build.");

	for _ in 0..2 {
		let response = signer
			.handle(&test_context("http://awesome.com"))
			.await
			.into_response()
			.expect("Matching path should produce a response.");

		assert_eq!(response.status, 200);
	}

	token.assert_calls_async(1).await;
	ticket.assert_calls_async(1).await;
}

#[tokio::test]
async fn reset_cache_forces_a_refetch() {
	let server = MockServer::start_async().await;
	let (token, ticket) = mock_endpoints(&server).await;
	let signer = test_signer_builder(&server.url("/token"), &server.url("/getticket"))
		.build()
		.expect("Test signer should build.");

	signer.handle(&test_context("http://awesome.com")).await;
	signer.reset_cache();
	signer.handle(&test_context("http://awesome.com")).await;

	token.assert_calls_async(2).await;
	ticket.assert_calls_async(2).await;
}

#[tokio::test]
async fn passes_through_unmatched_paths() {
	let server = MockServer::start_async().await;
	let (token, ticket) = mock_endpoints(&server).await;
	let signer = test_signer_builder(&server.url("/token"), &server.url("/getticket"))
		.build()
		.expect("Test signer should build.");
	let outcome = signer
		.handle(&RequestContext::new("/health").with_query_param("url", "http://awesome.com"))
		.await;

	assert!(outcome.is_passthrough());

	token.assert_calls_async(0).await;
	ticket.assert_calls_async(0).await;
}

#[tokio::test]
async fn path_predicate_selects_requests() {
	let server = MockServer::start_async().await;
	let _mocks = mock_endpoints(&server).await;
	let signer = test_signer_builder(&server.url("/token"), &server.url("/getticket"))
		.path_predicate(|ctx| ctx.path().ends_with("/sdk"))
		.build()
		.expect("Test signer should build.");
	let matched = signer
		.handle(&RequestContext::new("/v2/sdk").with_query_param("url", "http://awesome.com"))
		.await;
	let unmatched = signer.handle(&test_context("http://awesome.com")).await;

	assert!(!matched.is_passthrough());
	assert!(unmatched.is_passthrough());
}

#[tokio::test]
async fn rejected_target_url_answers_400_without_fetching() {
	let server = MockServer::start_async().await;
	let (token, ticket) = mock_endpoints(&server).await;
	let signer = test_signer_builder(&server.url("/token"), &server.url("/getticket"))
		.valid_url(|_| false)
		.build()
		.expect("Test signer should build.");
	let response = signer
		.handle(&test_context("http://awesome.com"))
		.await
		.into_response()
		.expect("Matching path should produce a response.");

	assert_eq!(response.status, 400);
	assert_eq!(response.body["message"], "http://awesome.com is NOT a valid URL.");

	token.assert_calls_async(0).await;
	ticket.assert_calls_async(0).await;
}

#[tokio::test]
async fn missing_url_param_answers_400() {
	let server = MockServer::start_async().await;
	let (token, _ticket) = mock_endpoints(&server).await;
	let signer = test_signer_builder(&server.url("/token"), &server.url("/getticket"))
		.build()
		.expect("Test signer should build.");
	let response = signer
		.handle(&RequestContext::new("/jssdk"))
		.await
		.into_response()
		.expect("Matching path should produce a response.");

	assert_eq!(response.status, 400);
	assert_eq!(response.body["message"], "Missing `url` query parameter.");

	token.assert_calls_async(0).await;
}

#[tokio::test]
async fn custom_url_key_reads_the_configured_parameter() {
	let server = MockServer::start_async().await;
	let _mocks = mock_endpoints(&server).await;
	let signer = test_signer_builder(&server.url("/token"), &server.url("/getticket"))
		.url_key("page")
		.build()
		.expect("Test signer should build.");
	let response = signer
		.handle(&RequestContext::new("/jssdk").with_query_param("page", "http://awesome.com"))
		.await
		.into_response()
		.expect("Matching path should produce a response.");

	assert_eq!(response.status, 200);
}

#[tokio::test]
async fn error_hook_owns_the_failure_response() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(GET).path("/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let ticket = server
		.mock_async(|when, then| {
			when.method(GET).path("/getticket");
			then.status(500).header("content-type", "text/plain").body("ERROR");
		})
		.await;
	let hook = Arc::new(RecordingErrorHook::default());
	let signer = test_signer_builder(&server.url("/token"), &server.url("/getticket"))
		.on_error(hook.clone())
		.build()
		.expect("Test signer should build.");
	let response = signer
		.handle(&test_context("http://awesome.com"))
		.await
		.into_response()
		.expect("Matching path should produce a response.");

	assert_eq!(response.status, 502);
	assert_eq!(response.body["handled"], true);
	assert_eq!(hook.calls.load(Ordering::SeqCst), 1);
	assert_eq!(hook.messages.lock().as_slice(), ["ERROR"]);

	token.assert_async().await;
	ticket.assert_async().await;
}

#[tokio::test]
async fn default_error_body_merges_upstream_json() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(GET).path("/token");
			then.status(400)
				.header("content-type", "application/json")
				.body(r#"{"errmsg":"invalid appid","errcode":40013}"#);
		})
		.await;
	let signer = test_signer_builder(&server.url("/token"), &server.url("/getticket"))
		.build()
		.expect("Test signer should build.");
	let response = signer
		.handle(&test_context("http://awesome.com"))
		.await
		.into_response()
		.expect("Matching path should produce a response.");

	assert_eq!(response.status, 400);
	assert_eq!(response.body["message"], "invalid appid");
	assert_eq!(response.body["code"], 40013);

	token.assert_async().await;
}

#[tokio::test]
async fn concurrent_misses_tolerate_duplicate_fetches() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(GET).path("/token");
			then.status(200)
				.header("content-type", "application/json")
				.body(TOKEN_BODY)
				.delay(std::time::Duration::from_millis(200));
		})
		.await;
	let ticket = server
		.mock_async(|when, then| {
			when.method(GET).path("/getticket");
			then.status(200).header("content-type", "application/json").body(TICKET_BODY);
		})
		.await;
	let signer = test_signer_builder(&server.url("/token"), &server.url("/getticket"))
		.build()
		.expect("Test signer should build.");
	let ctx = test_context("http://awesome.com");
	let (first, second) = tokio::join!(signer.handle(&ctx), signer.handle(&ctx));
	let first = first.into_response().expect("First concurrent request should respond.");
	let second = second.into_response().expect("Second concurrent request should respond.");

	assert_eq!(first.status, 200);
	assert_eq!(second.status, 200);

	// Refreshes are deliberately not serialized: both misses fetch, last write wins.
	token.assert_calls_async(2).await;
	ticket.assert_calls_async(2).await;
}

#[tokio::test]
async fn responses_match_the_documented_scenario_shape() {
	let server = MockServer::start_async().await;
	let _mocks = mock_endpoints(&server).await;
	let signer = test_signer_builder(&server.url("/token"), &server.url("/getticket"))
		.build()
		.expect("Test signer should build.");
	let outcome = signer.handle(&test_context("http://awesome.com")).await;
	let response = match outcome {
		Outcome::Responded(response) => response,
		Outcome::Passthrough => panic!("Default path should match /jssdk."),
	};
	let body = response.body.as_object().expect("Body should be a JSON object.");

	assert_eq!(
		body.keys().map(String::as_str).collect::<Vec<_>>(),
		["appId", "nonceStr", "signature", "timestamp"],
	);
}
