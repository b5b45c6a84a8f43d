use std::{future::Future, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
	body::Bytes,
	extract::State,
	routing::{get, post},
	Json, Router,
};
use hyper::StatusCode;
use log::{error, info, warn};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use tower_http::limit::RequestBodyLimitLayer;

use crate::payment_gateway::callback::{CallbackEnvelope, CallbackHandler};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_CALLBACK_PATH: &str = "/stk-push-callback";

// Callbacks are a few hundred bytes.
const MAX_CALLBACK_BODY: usize = 64 * 1024;

#[derive(Clone, Debug)]
pub struct ServerConfig {
	pub bind_addr: String,
	pub callback_path: String,
}

impl Default for ServerConfig {
	fn default() -> Self {
		ServerConfig {
			bind_addr: DEFAULT_BIND_ADDR.to_owned(),
			callback_path: DEFAULT_CALLBACK_PATH.to_owned(),
		}
	}
}

#[derive(Clone)]
struct AppState {
	handler: Arc<dyn CallbackHandler>,
}

pub struct CallbackServer {
	config: ServerConfig,
	handler: Arc<dyn CallbackHandler>,
}

impl CallbackServer {
	pub fn new(config: ServerConfig, handler: Arc<dyn CallbackHandler>) -> Self {
		CallbackServer { config, handler }
	}

	pub fn router(&self) -> Router {
		Router::new()
			.route(&self.config.callback_path, post(stk_push_callback))
			.route("/health", get(health))
			.layer(RequestBodyLimitLayer::new(MAX_CALLBACK_BODY))
			.with_state(AppState {
				handler: Arc::clone(&self.handler),
			})
	}

	async fn bind(&self) -> anyhow::Result<(TcpListener, SocketAddr)> {
		anyhow::ensure!(
			self.config.callback_path.starts_with('/'),
			"callback path must start with '/', got {}",
			self.config.callback_path
		);
		let listener = TcpListener::bind(&self.config.bind_addr)
			.await
			.with_context(|| format!("failed to bind callback listener to {}", self.config.bind_addr))?;
		let local_addr = listener.local_addr()?;
		info!("[*] callback server listening on {}{}", local_addr, self.config.callback_path);

		Ok((listener, local_addr))
	}

	/// Binds and serves in the background until [`RunningServer::stop`].
	pub async fn start(self) -> anyhow::Result<RunningServer> {
		let (listener, local_addr) = self.bind().await?;
		let app = self.router();
		let (shutdown, signal) = oneshot::channel::<()>();

		let task = tokio::spawn(async move {
			axum::serve(listener, app)
				.with_graceful_shutdown(async {
					let _ = signal.await;
				})
				.await
		});

		Ok(RunningServer {
			local_addr,
			shutdown,
			task,
		})
	}

	/// Serves on the current task until `shutdown` resolves.
	pub async fn serve_until<F>(self, shutdown: F) -> anyhow::Result<()>
	where
		F: Future<Output = ()> + Send + 'static,
	{
		let (listener, _) = self.bind().await?;
		axum::serve(listener, self.router())
			.with_graceful_shutdown(shutdown)
			.await
			.context("callback server failed")
	}
}

pub struct RunningServer {
	local_addr: SocketAddr,
	shutdown: oneshot::Sender<()>,
	task: JoinHandle<std::io::Result<()>>,
}

impl RunningServer {
	pub fn local_addr(&self) -> SocketAddr {
		self.local_addr
	}

	/// Stops accepting connections and waits for in-flight callbacks.
	pub async fn stop(self) -> anyhow::Result<()> {
		let _ = self.shutdown.send(());
		self.task.await.context("callback server task panicked")??;
		info!("callback server on {} stopped", self.local_addr);
		Ok(())
	}
}

fn reply(status: StatusCode, result_code: i64, desc: &str) -> (StatusCode, Json<Value>) {
	(status, Json(json!({ "ResultCode": result_code, "ResultDesc": desc })))
}

async fn stk_push_callback(State(state): State<AppState>, body: Bytes) -> (StatusCode, Json<Value>) {
	let result = match CallbackEnvelope::from_slice(&body) {
		Ok(envelope) => envelope.into_result(),
		Err(e) => {
			warn!("rejecting undecodable stk callback ({} bytes): {}", body.len(), e);
			return reply(StatusCode::BAD_REQUEST, 1, "Rejected");
		}
	};

	let checkout_request_id = result.checkout_request_id.clone();
	match state.handler.handle(result).await {
		Ok(()) => reply(StatusCode::OK, 0, "Accepted"),
		Err(e) => {
			error!("failed to process stk callback {}: {:#}", checkout_request_id, e);
			reply(StatusCode::INTERNAL_SERVER_ERROR, 1, "Processing failed")
		}
	}
}

async fn health() -> Json<Value> {
	Json(json!({ "status": "ok" }))
}
