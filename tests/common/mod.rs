#![allow(dead_code)]

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use parking_lot::Mutex;
// self
use oauth1_broker::{
	auth::{AccessToken, ConsumerCredential, OwnerId, RequestToken},
	flows::Broker,
	http::{HttpFuture, ProviderHttpClient, ProviderRequest, ProviderResponse, ReqwestHttpClient},
	provider::ProviderDescriptor,
	signing::FixedNonceSource,
	store::MemoryStore,
	url::Url,
};

pub const CONSUMER_KEY: &str = "ck";
pub const CONSUMER_SECRET: &str = "cs";
pub const USER_AGENT: &str = "Needl/1.0";
pub const CALLBACK: &str = "needl://discogs-callback";

/// Transport that forwards to reqwest and keeps a copy of every outgoing request.
#[derive(Debug)]
pub struct RecordingHttpClient {
	inner: ReqwestHttpClient,
	requests: Mutex<Vec<ProviderRequest>>,
}
impl RecordingHttpClient {
	pub fn new() -> Self {
		let inner = ReqwestHttpClient::without_redirects().expect("Reqwest client should build.");

		Self { inner, requests: Mutex::new(Vec::new()) }
	}

	pub fn requests(&self) -> Vec<ProviderRequest> {
		self.requests.lock().clone()
	}
}
impl ProviderHttpClient for RecordingHttpClient {
	fn execute(&self, request: ProviderRequest) -> HttpFuture<'_, ProviderResponse> {
		self.requests.lock().push(request.clone());

		self.inner.execute(request)
	}
}

pub struct TestBroker {
	pub broker: Broker<RecordingHttpClient>,
	pub http: Arc<RecordingHttpClient>,
	pub request_tokens: Arc<MemoryStore<RequestToken>>,
	pub access_tokens: Arc<MemoryStore<AccessToken>>,
}

/// Plain-HTTP URL on the mock server; loopback endpoints may skip TLS.
pub fn http_url(server: &MockServer, path: &str) -> String {
	format!("http://{}{path}", server.address())
}

fn url(server: &MockServer, path: &str) -> Url {
	Url::parse(&http_url(server, path)).expect("Mock endpoint should parse successfully.")
}

pub fn build_descriptor(server: &MockServer) -> ProviderDescriptor {
	ProviderDescriptor::builder("mock-discogs")
		.request_token_endpoint(url(server, "/oauth/request_token"))
		.authorize_endpoint(url(server, "/oauth/authorize"))
		.access_token_endpoint(url(server, "/oauth/access_token"))
		.identity_endpoint(url(server, "/oauth/identity"))
		.api_base(url(server, "/"))
		.callback(CALLBACK)
		.user_agent(USER_AGENT)
		.build()
		.expect("Provider descriptor should build successfully.")
}

pub fn build_test_broker(server: &MockServer) -> TestBroker {
	let http = Arc::new(RecordingHttpClient::new());
	let request_tokens = Arc::new(MemoryStore::<RequestToken>::default());
	let access_tokens = Arc::new(MemoryStore::<AccessToken>::default());
	let consumer = ConsumerCredential::new(CONSUMER_KEY, CONSUMER_SECRET)
		.expect("Consumer credential should be valid.");
	let broker = Broker::<RecordingHttpClient>::with_http_client(
		request_tokens.clone(),
		access_tokens.clone(),
		build_descriptor(server),
		consumer,
		http.clone(),
	)
	.with_nonce_source(Arc::new(FixedNonceSource::new("fixed-nonce", 1_700_000_000)));

	TestBroker { broker, http, request_tokens, access_tokens }
}

pub fn owner(value: &str) -> OwnerId {
	OwnerId::new(value).expect("Owner fixture should be valid.")
}
