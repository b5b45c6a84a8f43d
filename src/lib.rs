pub mod config;
pub mod payment_gateway;
pub mod server;

pub use payment_gateway::{
	callback::{CallbackHandler, LoggingHandler, StkCallback},
	error::GatewayError,
	merchant_portal::Merchant,
	mpesa::{AccessToken, GatewayOpts, MpesaClient},
	stk_push::{PushAcknowledgement, StkPushRequest, TransactionType},
};
pub use server::{CallbackServer, RunningServer, ServerConfig};
