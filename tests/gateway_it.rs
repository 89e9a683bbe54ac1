#![cfg(feature = "reqwest")]

mod common;

// std
use std::sync::Arc;
// crates.io
use httpmock::prelude::*;
use serde_json::Value;
// self
use common::{RecordingHttpClient, build_test_broker, owner};
use oauth1_broker::{
	auth::{AccessToken, RemoteIdentity},
	gateway::{Gateway, GatewayResponse, StaticTokenVerifier},
	store::TokenStore,
};

const BEARER: &str = "Bearer jwt-1";

fn build_gateway(server: &MockServer) -> (Gateway<RecordingHttpClient>, common::TestBroker) {
	let test = build_test_broker(server);
	let verifier = StaticTokenVerifier::new().with_token("jwt-1", owner("owner-gateway"));
	let gateway = Gateway::new(test.broker.clone(), Arc::new(verifier));

	(gateway, test)
}

fn json(response: &GatewayResponse) -> Value {
	serde_json::from_slice(&response.body).expect("Gateway responses should be JSON.")
}

#[tokio::test]
async fn unauthenticated_calls_are_rejected_before_any_provider_call() {
	let server = MockServer::start_async().await;
	let (gateway, test) = build_gateway(&server);

	for authorization in [None, Some("Bearer unknown"), Some("Basic abc")] {
		let response = gateway.request_token(authorization).await;

		assert_eq!(response.status, 401);
		assert!(json(&response)["error"].as_str().is_some_and(|e| e.contains("credentials")));
	}

	assert!(test.http.requests().is_empty());
}

#[tokio::test]
async fn request_and_access_token_round_trip_through_the_gateway() {
	let server = MockServer::start_async().await;
	let (gateway, test) = build_gateway(&server);

	server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/request_token");
			then.status(200).body("oauth_token=rt1&oauth_token_secret=rts1");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/access_token");
			then.status(200).body("oauth_token=at1&oauth_token_secret=ats1");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/oauth/identity");
			then.status(200).body("{\"id\":42,\"username\":\"crate-digger\"}");
		})
		.await;

	let started = gateway.request_token(Some(BEARER)).await;

	assert_eq!(started.status, 200);
	assert_eq!(
		json(&started)["authorize_url"],
		common::http_url(&server, "/oauth/authorize?oauth_token=rt1")
	);

	let missing = gateway.access_token(Some(BEARER), b"{\"oauth_token\":\"rt1\"}").await;

	assert_eq!(missing.status, 400);

	let connected = gateway
		.access_token(Some(BEARER), b"{\"oauth_token\":\"rt1\",\"oauth_verifier\":\"v1\"}")
		.await;

	assert_eq!(connected.status, 200);
	assert_eq!(json(&connected)["discogs_username"], "crate-digger");
	assert_eq!(test.access_tokens.len(), 1);

	let replayed = gateway
		.access_token(Some(BEARER), b"{\"oauth_token\":\"rt1\",\"oauth_verifier\":\"v1\"}")
		.await;

	assert_eq!(replayed.status, 400);
	assert_eq!(
		json(&replayed)["error"],
		"No matching request token found. Please restart the OAuth flow."
	);
}

#[tokio::test]
async fn provider_rejections_surface_status_and_details() {
	let server = MockServer::start_async().await;
	let (gateway, _test) = build_gateway(&server);

	server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/request_token");
			then.status(401).body("Invalid consumer.");
		})
		.await;

	let response = gateway.request_token(Some(BEARER)).await;

	assert_eq!(response.status, 401);
	assert_eq!(json(&response)["details"], "Invalid consumer.");
}

#[tokio::test]
async fn api_proxy_maps_errors_and_relays_responses() {
	let server = MockServer::start_async().await;
	let (gateway, test) = build_gateway(&server);
	let disconnected = gateway.api_proxy(Some(BEARER), b"{\"path\":\"/oauth/identity\"}").await;

	assert_eq!(disconnected.status, 401);
	assert_eq!(json(&disconnected)["error"], "Provider account is not connected.");

	test.access_tokens
		.upsert(AccessToken::new(
			owner("owner-gateway"),
			"at1",
			"ats1",
			RemoteIdentity { username: "crate-digger".into(), id: Some(42) },
		))
		.await
		.expect("Seeding the access token should succeed.");

	let missing_path = gateway.api_proxy(Some(BEARER), b"{\"method\":\"GET\"}").await;

	assert_eq!(missing_path.status, 400);
	assert!(json(&missing_path)["error"].as_str().is_some_and(|e| e.contains("path")));

	let malformed = gateway.api_proxy(Some(BEARER), b"{\"path\":").await;

	assert_eq!(malformed.status, 400);

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/releases/249504");
			then.status(429).header("content-type", "text/plain").body("slow down");
		})
		.await;
	let relayed = gateway.api_proxy(Some(BEARER), b"{\"path\":\"/releases/249504\"}").await;

	mock.assert_async().await;

	assert_eq!(relayed.status, 429);
	assert_eq!(relayed.content_type, "text/plain");
	assert_eq!(relayed.text(), "slow down");
}
