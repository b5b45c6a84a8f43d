use std::{env, str::FromStr, time::Duration};

use anyhow::{anyhow, Context};

use crate::{
	payment_gateway::{
		merchant_portal::Merchant,
		mpesa::{GatewayOpts, DEFAULT_TIMEOUT, SANDBOX_BASE_URL},
	},
	server::{ServerConfig, DEFAULT_BIND_ADDR, DEFAULT_CALLBACK_PATH},
};

/// One push to send at startup, mirroring the sandbox walkthrough.
#[derive(Clone, Debug)]
pub struct DemoPush {
	pub phone_number: String,
	pub amount: u64,
	pub call_back_url: String,
	pub account_reference: String,
	pub transaction_desc: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
	pub gateway: GatewayOpts,
	pub merchant: Merchant,
	pub server: ServerConfig,
	pub demo_push: Option<DemoPush>,
}

impl AppConfig {
	pub fn from_env() -> anyhow::Result<Self> {
		Self::from_lookup(|key| env::var(key).ok())
	}

	/// Same as [`AppConfig::from_env`] with an explicit variable source.
	pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let required = |key: &str| lookup(key).filter(|v| !v.is_empty()).ok_or_else(|| anyhow!("{} is not set", key));
		let or_default = |key: &str, default: &str| lookup(key).filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_owned());

		let timeout = match lookup("MPESA_TIMEOUT_SECS").filter(|v| !v.is_empty()) {
			Some(secs) => match parse::<u64>("MPESA_TIMEOUT_SECS", &secs)? {
				0 => return Err(anyhow!("MPESA_TIMEOUT_SECS must be greater than zero")),
				secs => Duration::from_secs(secs),
			},
			None => DEFAULT_TIMEOUT,
		};

		let gateway = GatewayOpts::new(
			required("MPESA_CONSUMER_KEY")?,
			required("MPESA_CONSUMER_SECRET")?,
			or_default("MPESA_BASE_URL", SANDBOX_BASE_URL),
		)
		.with_timeout(timeout);

		let merchant = Merchant::new(required("MPESA_SHORTCODE")?, required("MPESA_PASSKEY")?);

		let server = ServerConfig {
			bind_addr: or_default("CALLBACK_BIND_ADDR", DEFAULT_BIND_ADDR),
			callback_path: or_default("CALLBACK_PATH", DEFAULT_CALLBACK_PATH),
		};
		if !server.callback_path.starts_with('/') {
			return Err(anyhow!("CALLBACK_PATH must start with '/', got {}", server.callback_path));
		}

		let demo_push = match lookup("MPESA_PHONE_NUMBER").filter(|v| !v.is_empty()) {
			Some(phone_number) => Some(DemoPush {
				phone_number,
				amount: parse::<u64>("MPESA_AMOUNT", &or_default("MPESA_AMOUNT", "1"))?,
				call_back_url: required("MPESA_CALLBACK_URL")?,
				account_reference: or_default("MPESA_ACCOUNT_REFERENCE", "TEST"),
				transaction_desc: or_default("MPESA_TRANSACTION_DESC", "payment via STK push"),
			}),
			None => None,
		};

		Ok(AppConfig {
			gateway,
			merchant,
			server,
			demo_push,
		})
	}
}

fn parse<T>(key: &str, value: &str) -> anyhow::Result<T>
where
	T: FromStr,
	T::Err: std::error::Error + Send + Sync + 'static,
{
	value.trim().parse::<T>().with_context(|| format!("invalid {}: {:?}", key, value))
}
