#![allow(dead_code)]

use std::{
	net::SocketAddr,
	sync::{Arc, Mutex},
	time::Duration,
};

use axum::{
	body::Bytes,
	extract::{RawQuery, State},
	http::HeaderMap,
	routing::{get, post},
	Router,
};
use hyper::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const TOKEN: &str = "0A0v8OgxqqoocblflR58m9chMdnU";

/// One request as the mock gateway saw it.
#[derive(Clone, Debug)]
pub struct Seen {
	pub route: &'static str,
	pub query: Option<String>,
	pub authorization: Option<String>,
	pub body: Option<Value>,
}

/// How the mock answers each endpoint.
#[derive(Clone)]
pub struct Script {
	pub token: (StatusCode, String),
	pub push: (StatusCode, String),
	pub push_delay: Duration,
	pub token_delay: Duration,
}

impl Default for Script {
	fn default() -> Self {
		Script {
			token: (StatusCode::OK, json!({ "access_token": TOKEN, "expires_in": "3599" }).to_string()),
			push: (
				StatusCode::OK,
				json!({
					"MerchantRequestID": "29115-34620561-1",
					"CheckoutRequestID": "ws_CO_191220191020363925",
					"ResponseCode": "0",
					"ResponseDescription": "Success. Request accepted for processing",
					"CustomerMessage": "Success. Request accepted for processing"
				})
				.to_string(),
			),
			push_delay: Duration::ZERO,
			token_delay: Duration::ZERO,
		}
	}
}

#[derive(Clone)]
struct MockState {
	script: Script,
	seen: Arc<Mutex<Vec<Seen>>>,
}

pub struct MockGateway {
	pub addr: SocketAddr,
	seen: Arc<Mutex<Vec<Seen>>>,
}

impl MockGateway {
	pub async fn start(script: Script) -> MockGateway {
		let seen = Arc::new(Mutex::new(Vec::new()));
		let state = MockState {
			script,
			seen: Arc::clone(&seen),
		};
		let app = Router::new()
			.route("/oauth/v1/generate", get(token))
			.route("/mpesa/stkpush/v1/processrequest", post(push))
			.with_state(state);

		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		tokio::spawn(async move {
			axum::serve(listener, app).await.unwrap();
		});

		MockGateway { addr, seen }
	}

	pub fn base_url(&self) -> String {
		format!("http://{}", self.addr)
	}

	pub fn seen(&self) -> Vec<Seen> {
		self.seen.lock().unwrap().clone()
	}
}

fn authorization(headers: &HeaderMap) -> Option<String> {
	headers
		.get("authorization")
		.and_then(|v| v.to_str().ok())
		.map(str::to_owned)
}

async fn token(
	State(state): State<MockState>,
	RawQuery(query): RawQuery,
	headers: HeaderMap,
) -> (StatusCode, String) {
	state.seen.lock().unwrap().push(Seen {
		route: "token",
		query,
		authorization: authorization(&headers),
		body: None,
	});
	tokio::time::sleep(state.script.token_delay).await;
	state.script.token.clone()
}

async fn push(State(state): State<MockState>, headers: HeaderMap, body: Bytes) -> (StatusCode, String) {
	state.seen.lock().unwrap().push(Seen {
		route: "push",
		query: None,
		authorization: authorization(&headers),
		body: serde_json::from_slice(&body).ok(),
	});
	tokio::time::sleep(state.script.push_delay).await;
	state.script.push.clone()
}

/// Returns an address nothing is listening on.
pub async fn closed_addr() -> SocketAddr {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	listener.local_addr().unwrap()
}
