use hyper::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
	#[error("gateway did not answer in time: {0}")]
	Timeout(#[source] reqwest::Error),

	#[error("could not reach gateway: {0}")]
	Connectivity(#[source] reqwest::Error),

	#[error("gateway rejected request (status {status}): {}", describe(.code, .message))]
	Rejected {
		status: StatusCode,
		request_id: Option<String>,
		code: Option<String>,
		message: Option<String>,
	},

	#[error("unexpected gateway response body (status {status}): {source}")]
	Malformed {
		status: StatusCode,
		#[source]
		source: serde_json::Error,
	},

	#[error("failed to encode request body: {0}")]
	Encode(#[source] serde_json::Error),

	#[error("failed to build http client: {0}")]
	Client(#[source] reqwest::Error),
}

fn describe(code: &Option<String>, message: &Option<String>) -> String {
	match (code, message) {
		(Some(code), Some(message)) => format!("{} {}", code, message),
		(Some(code), None) => code.clone(),
		(None, Some(message)) => message.clone(),
		(None, None) => "no error details".to_owned(),
	}
}

impl GatewayError {
	/// Classifies a transport failure returned by reqwest.
	pub(crate) fn transport(err: reqwest::Error) -> Self {
		if err.is_timeout() {
			GatewayError::Timeout(err)
		} else {
			GatewayError::Connectivity(err)
		}
	}

	pub fn is_connectivity(&self) -> bool {
		matches!(self, GatewayError::Timeout(_) | GatewayError::Connectivity(_))
	}

	pub fn is_protocol(&self) -> bool {
		matches!(self, GatewayError::Rejected { .. } | GatewayError::Malformed { .. })
	}

	pub fn is_timeout(&self) -> bool {
		matches!(self, GatewayError::Timeout(_))
	}

	/// The gateway's `errorCode`, when the failure carried one.
	pub fn error_code(&self) -> Option<&str> {
		match self {
			GatewayError::Rejected { code, .. } => code.as_deref(),
			_ => None,
		}
	}

	pub fn error_message(&self) -> Option<&str> {
		match self {
			GatewayError::Rejected { message, .. } => message.as_deref(),
			_ => None,
		}
	}
}
