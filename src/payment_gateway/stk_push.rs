use serde::{Deserialize, Serialize};

use super::merchant_portal::Merchant;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionType {
	/// Paybill shortcodes.
	CustomerPayBillOnline,
	/// Till numbers.
	CustomerBuyGoodsOnline,
}

/// Body of `POST /mpesa/stkpush/v1/processrequest`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct StkPushRequest {
	pub business_short_code: String,
	pub password: String,
	pub timestamp: String,
	pub transaction_type: TransactionType,
	pub amount: String,
	pub party_a: String,
	pub party_b: String,
	pub phone_number: String,
	#[serde(rename = "CallBackURL")]
	pub call_back_url: String,
	pub account_reference: String,
	pub transaction_desc: String,
}

impl StkPushRequest {
	/// A paybill push charging `phone_number`, payable to the merchant's shortcode.
	pub fn new(
		merchant: &Merchant,
		timestamp: &str,
		amount: u64,
		phone_number: &str,
		call_back_url: &str,
		account_reference: &str,
		transaction_desc: &str,
	) -> Self {
		StkPushRequest {
			business_short_code: merchant.business_short_code.clone(),
			password: merchant.password(timestamp),
			timestamp: timestamp.to_owned(),
			transaction_type: TransactionType::CustomerPayBillOnline,
			amount: amount.to_string(),
			party_a: phone_number.to_owned(),
			party_b: merchant.business_short_code.clone(),
			phone_number: phone_number.to_owned(),
			call_back_url: call_back_url.to_owned(),
			account_reference: account_reference.to_owned(),
			transaction_desc: transaction_desc.to_owned(),
		}
	}
}

/// Synchronous reply to a push request.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PushAcknowledgement {
	#[serde(rename = "MerchantRequestID")]
	pub merchant_request_id: String,
	#[serde(rename = "CheckoutRequestID")]
	pub checkout_request_id: String,
	#[serde(rename = "ResponseCode")]
	pub response_code: String,
	#[serde(rename = "ResponseDescription")]
	pub response_description: String,
	#[serde(rename = "CustomerMessage", default)]
	pub customer_message: String,
}

impl PushAcknowledgement {
	/// The prompt was dispatched to the handset.
	pub fn is_accepted(&self) -> bool {
		self.response_code == "0"
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::{json, Value};

	#[test]
	fn request_uses_gateway_field_names() {
		let merchant = Merchant::new("174379", "passkey");
		let request = StkPushRequest::new(
			&merchant,
			"20231001120000",
			1,
			"254712345678",
			"https://example.com/stk-push-callback",
			"TEST",
			"payment via STK push",
		);

		let body: Value = serde_json::to_value(&request).unwrap();
		assert_eq!(
			body,
			json!({
				"BusinessShortCode": "174379",
				"Password": merchant.password("20231001120000"),
				"Timestamp": "20231001120000",
				"TransactionType": "CustomerPayBillOnline",
				"Amount": "1",
				"PartyA": "254712345678",
				"PartyB": "174379",
				"PhoneNumber": "254712345678",
				"CallBackURL": "https://example.com/stk-push-callback",
				"AccountReference": "TEST",
				"TransactionDesc": "payment via STK push",
			})
		);
	}

	#[test]
	fn acknowledgement_decodes() {
		let ack: PushAcknowledgement = serde_json::from_value(json!({
			"MerchantRequestID": "29115-34620561-1",
			"CheckoutRequestID": "ws_CO_191220191020363925",
			"ResponseCode": "0",
			"ResponseDescription": "Success. Request accepted for processing",
			"CustomerMessage": "Success. Request accepted for processing",
		}))
		.unwrap();

		assert!(ack.is_accepted());
		assert_eq!(ack.checkout_request_id, "ws_CO_191220191020363925");
	}

	#[test]
	fn non_zero_response_code_is_not_accepted() {
		let ack = PushAcknowledgement {
			response_code: "1".to_owned(),
			..Default::default()
		};
		assert!(!ack.is_accepted());
	}
}
