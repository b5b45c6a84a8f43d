use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, FixedOffset, Utc};

/// Format the gateway expects for `Timestamp`: YYYYMMDDHHmmss.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// East Africa Time, no daylight saving.
pub const GATEWAY_TIME_ZONE: FixedOffset = match FixedOffset::east_opt(3 * 3600) {
	Some(offset) => offset,
	None => panic!("invalid gateway offset"),
};

#[derive(Clone)]
pub struct Merchant {
	pub business_short_code: String,
	pub pass_key: String,
}

impl Merchant {
	pub fn new(business_short_code: impl Into<String>, pass_key: impl Into<String>) -> Self {
		Merchant {
			business_short_code: business_short_code.into(),
			pass_key: pass_key.into(),
		}
	}

	/// base64(shortcode + passkey + timestamp), standard alphabet with padding.
	pub fn password(&self, timestamp: &str) -> String {
		let input = format!("{}{}{}", self.business_short_code, self.pass_key, timestamp);
		STANDARD.encode(input)
	}
}

impl std::fmt::Debug for Merchant {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Merchant")
			.field("business_short_code", &self.business_short_code)
			.field("pass_key", &"<redacted>")
			.finish()
	}
}

pub fn format_timestamp(now: DateTime<Utc>) -> String {
	now.with_timezone(&GATEWAY_TIME_ZONE).format(TIMESTAMP_FORMAT).to_string()
}

/// Current time on the gateway's wall clock.
pub fn gateway_timestamp() -> String {
	format_timestamp(Utc::now())
}
