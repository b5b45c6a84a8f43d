use std::time::Duration;

use hyper::StatusCode;
use log::{debug, info};
use reqwest::{header::CONTENT_TYPE, Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize};

use super::{
	error::GatewayError,
	stk_push::{PushAcknowledgement, StkPushRequest},
};

pub const SANDBOX_BASE_URL: &str = "https://sandbox.safaricom.co.ke";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const TOKEN_PATH: &str = "/oauth/v1/generate?grant_type=client_credentials";
const STK_PUSH_PATH: &str = "/mpesa/stkpush/v1/processrequest";

#[derive(Clone)]
pub struct GatewayOpts {
	pub consumer_key: String,
	pub consumer_secret: String,
	pub base_url: String,
	/// Applies to every outbound call, connect through body.
	pub timeout: Duration,
}

impl GatewayOpts {
	pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>, base_url: impl Into<String>) -> Self {
		GatewayOpts {
			consumer_key: consumer_key.into(),
			consumer_secret: consumer_secret.into(),
			base_url: base_url.into(),
			timeout: DEFAULT_TIMEOUT,
		}
	}

	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}
}

impl std::fmt::Debug for GatewayOpts {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("GatewayOpts")
			.field("consumer_key", &"<redacted>")
			.field("consumer_secret", &"<redacted>")
			.field("base_url", &self.base_url)
			.field("timeout", &self.timeout)
			.finish()
	}
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct AccessToken {
	pub access_token: String,
	pub expires_in: String,
}

impl AccessToken {
	/// `expires_in` arrives as a string of seconds.
	pub fn expires_in(&self) -> Option<Duration> {
		self.expires_in.trim().parse::<u64>().ok().map(Duration::from_secs)
	}
}

// Error fields the gateway may attach to any response, 2xx included.
#[derive(Deserialize, Default)]
struct GatewayFault {
	#[serde(rename = "requestId", default)]
	request_id: Option<String>,
	#[serde(rename = "errorCode", default)]
	error_code: Option<String>,
	#[serde(rename = "errorMessage", default)]
	error_message: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
	value.filter(|v| !v.trim().is_empty())
}

fn body_text(body: &[u8]) -> Option<String> {
	non_empty(Some(String::from_utf8_lossy(body).trim().to_owned()))
}

fn decode<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, GatewayError> {
	let fault = serde_json::from_slice::<GatewayFault>(body).unwrap_or_default();
	let code = non_empty(fault.error_code);

	if code.is_some() || !status.is_success() {
		// Without an errorMessage the raw body is the only diagnostic.
		let message = non_empty(fault.error_message).or_else(|| {
			if status.is_success() {
				None
			} else {
				body_text(body)
			}
		});
		return Err(GatewayError::Rejected {
			status,
			request_id: non_empty(fault.request_id),
			code,
			message,
		});
	}

	serde_json::from_slice(body).map_err(|source| GatewayError::Malformed { status, source })
}

pub struct MpesaClient {
	consumer_key: String,
	consumer_secret: String,
	base_url: String,
	client: Client,
}

impl MpesaClient {
	pub fn new(opts: &GatewayOpts) -> Result<Self, GatewayError> {
		let client = Client::builder().timeout(opts.timeout).build().map_err(GatewayError::Client)?;

		Ok(MpesaClient {
			consumer_key: opts.consumer_key.clone(),
			consumer_secret: opts.consumer_secret.clone(),
			base_url: opts.base_url.trim_end_matches('/').to_owned(),
			client,
		})
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	async fn make_request(&self, request: RequestBuilder) -> Result<(StatusCode, Vec<u8>), GatewayError> {
		let response = request.send().await.map_err(GatewayError::transport)?;
		let status = response.status();
		let body = response.bytes().await.map_err(GatewayError::transport)?;
		debug!("gateway answered {} with {} bytes", status, body.len());

		Ok((status, body.to_vec()))
	}

	/// Fetches a fresh bearer token with the client-credentials grant.
	pub async fn generate_access_token(&self) -> Result<AccessToken, GatewayError> {
		let url = format!("{}{}", self.base_url, TOKEN_PATH);
		debug!("requesting access token from {}", self.base_url);

		let request = self
			.client
			.get(url)
			.basic_auth(&self.consumer_key, Some(&self.consumer_secret))
			.header(CONTENT_TYPE, "application/json");

		let (status, body) = self.make_request(request).await?;
		decode(status, &body)
	}

	/// Always acquires a new token first, then submits the push with it.
	pub async fn initiate_stk_push(&self, body: &StkPushRequest) -> Result<PushAcknowledgement, GatewayError> {
		let url = format!("{}{}", self.base_url, STK_PUSH_PATH);
		let request_body = serde_json::to_vec(body).map_err(GatewayError::Encode)?;

		let token = self.generate_access_token().await?;

		let request = self
			.client
			.post(url)
			.bearer_auth(&token.access_token)
			.header(CONTENT_TYPE, "application/json")
			.body(request_body);

		let (status, body) = self.make_request(request).await?;
		let ack: PushAcknowledgement = decode(status, &body)?;
		info!(
			"stk push {} acknowledged: {} {}",
			ack.checkout_request_id, ack.response_code, ack.response_description
		);

		Ok(ack)
	}
}
