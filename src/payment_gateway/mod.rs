pub mod callback;
pub mod error;
pub mod merchant_portal;
pub mod mpesa;
pub mod stk_push;
