use async_trait::async_trait;
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope the gateway posts to `CallBackURL` once the subscriber acts on the prompt.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CallbackEnvelope {
	#[serde(rename = "Body")]
	pub body: CallbackBody,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CallbackBody {
	#[serde(rename = "stkCallback")]
	pub stk_callback: StkCallback,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StkCallback {
	#[serde(rename = "MerchantRequestID")]
	pub merchant_request_id: String,
	#[serde(rename = "CheckoutRequestID")]
	pub checkout_request_id: String,
	/// 0 on success, otherwise the gateway's failure reason (1032 cancelled, 1037 timed out, ...).
	#[serde(rename = "ResultCode")]
	pub result_code: i64,
	#[serde(rename = "ResultDesc")]
	pub result_desc: String,
	#[serde(rename = "CallbackMetadata", default, skip_serializing_if = "Option::is_none")]
	pub callback_metadata: Option<CallbackMetadata>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct CallbackMetadata {
	#[serde(rename = "Item", default)]
	pub item: Vec<MetadataItem>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MetadataItem {
	#[serde(rename = "Name")]
	pub name: String,
	// Absent for some items, e.g. Balance.
	#[serde(rename = "Value", default, skip_serializing_if = "Option::is_none")]
	pub value: Option<Value>,
}

impl CallbackEnvelope {
	pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
		serde_json::from_slice(body)
	}

	pub fn into_result(self) -> StkCallback {
		self.body.stk_callback
	}
}

impl StkCallback {
	pub fn is_success(&self) -> bool {
		self.result_code == 0
	}

	fn metadata(&self, name: &str) -> Option<&Value> {
		self.callback_metadata
			.as_ref()?
			.item
			.iter()
			.find(|item| item.name == name)?
			.value
			.as_ref()
	}

	pub fn amount(&self) -> Option<f64> {
		self.metadata("Amount")?.as_f64()
	}

	pub fn receipt_number(&self) -> Option<&str> {
		self.metadata("MpesaReceiptNumber")?.as_str()
	}

	/// Sent as a bare number, e.g. 254708374149.
	pub fn phone_number(&self) -> Option<String> {
		match self.metadata("PhoneNumber")? {
			Value::Number(n) => Some(n.to_string()),
			Value::String(s) => Some(s.clone()),
			_ => None,
		}
	}

	/// YYYYMMDDHHmmss, sent as a number.
	pub fn transaction_date(&self) -> Option<String> {
		match self.metadata("TransactionDate")? {
			Value::Number(n) => Some(n.to_string()),
			Value::String(s) => Some(s.clone()),
			_ => None,
		}
	}
}

/// Reconciles a pending transaction once its outcome arrives.
#[async_trait]
pub trait CallbackHandler: Send + Sync {
	async fn handle(&self, result: StkCallback) -> anyhow::Result<()>;
}

/// Records the outcome in the log and nothing else.
pub struct LoggingHandler;

#[async_trait]
impl CallbackHandler for LoggingHandler {
	async fn handle(&self, result: StkCallback) -> anyhow::Result<()> {
		info!(
			"stk callback {} / {}: result code {} ({})",
			result.merchant_request_id, result.checkout_request_id, result.result_code, result.result_desc
		);
		if let Some(receipt) = result.receipt_number() {
			info!("receipt {} for amount {:?}", receipt, result.amount());
		}
		Ok(())
	}
}
