//! In-process ledger node stub
//!
//! An axum router on an ephemeral port. Every POSTed JSON body is recorded
//! and answered by a caller-supplied responder returning `(status, body)`.

use axum::extract::{Json, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

type Responder = dyn Fn(&Value) -> (u16, String) + Send + Sync;

struct StubState {
    requests: Mutex<Vec<Value>>,
    responder: Box<Responder>,
}

pub struct StubLedgerNode {
    addr: SocketAddr,
    state: Arc<StubState>,
    handle: JoinHandle<()>,
}

impl StubLedgerNode {
    /// Bind to `127.0.0.1:0` and serve until dropped
    pub async fn start<F>(responder: F) -> std::io::Result<Self>
    where
        F: Fn(&Value) -> (u16, String) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(StubState {
            requests: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        });

        let app = Router::new()
            .route("/", post(handle_rpc))
            .with_state(Arc::clone(&state));

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Request bodies received so far, in arrival order
    pub fn requests(&self) -> Vec<Value> {
        self.state
            .requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl Drop for StubLedgerNode {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_rpc(
    State(state): State<Arc<StubState>>,
    Json(request): Json<Value>,
) -> impl IntoResponse {
    if let Ok(mut requests) = state.requests.lock() {
        requests.push(request.clone());
    }

    let (status, body) = (state.responder)(&request);
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], body)
}
