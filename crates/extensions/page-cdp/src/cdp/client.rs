//! CDP WebSocket client.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};
use url::Url;

use super::error::CdpError;
use super::protocol::{BrowserVersion, CdpRequest, CdpResponse, PageInfo};
use super::session::PageSession;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<Value, CdpError>>>>>;

/// Request plumbing shared by the client and its page sessions.
pub(crate) struct Connection {
    ws_tx: tokio::sync::Mutex<WsSink>,
    pending: PendingMap,
    request_id: AtomicU64,
    request_timeout: Duration,
}

impl Connection {
    /// Send a command and wait for its response.
    pub(crate) async fn call(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
    ) -> Result<Value, CdpError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);

        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: session_id.map(str::to_string),
        };

        let json = serde_json::to_string(&request)?;
        trace!("CDP send: {}", json);

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);

        let sent = {
            let mut ws = self.ws_tx.lock().await;
            ws.send(Message::Text(json.into())).await
        };
        if let Err(e) = sent {
            self.pending.lock().remove(&id);
            return Err(e.into());
        }

        match tokio::time::timeout(self.request_timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(CdpError::SessionClosed),
            Err(_) => {
                self.pending.lock().remove(&id);
                Err(CdpError::Timeout(format!("Request {} timed out", method)))
            }
        }
    }
}

/// CDP client bound to one browser.
pub struct CdpClient {
    /// HTTP endpoint for tab discovery.
    http_endpoint: String,
    http: reqwest::Client,
    connection: Arc<Connection>,
    _recv_task: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Connect to Chrome at the given endpoint (e.g. `http://localhost:9222`).
    pub async fn connect(endpoint: &str, request_timeout: Duration) -> Result<Self, CdpError> {
        let http_endpoint = Url::parse(endpoint)?.as_str().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder().timeout(request_timeout).build()?;

        let version_url = format!("{}/json/version", http_endpoint);
        debug!("Fetching browser version from {}", version_url);

        let version: BrowserVersion = http
            .get(&version_url)
            .send()
            .await
            .map_err(|e| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?
            .json()
            .await
            .map_err(|e| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?;

        debug!(
            "Connected to browser: {} (protocol {})",
            version.browser, version.protocol_version
        );

        let (ws_stream, _) = tokio_tungstenite::connect_async(&version.web_socket_debugger_url)
            .await
            .map_err(|e| CdpError::ConnectionFailed(format!("WebSocket: {}", e)))?;

        let (ws_sink, ws_source) = ws_stream.split();
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));

        let recv_task = {
            let pending = pending.clone();
            tokio::spawn(async move {
                Self::receive_loop(ws_source, pending).await;
            })
        };

        Ok(Self {
            http_endpoint,
            http,
            connection: Arc::new(Connection {
                ws_tx: tokio::sync::Mutex::new(ws_sink),
                pending,
                request_id: AtomicU64::new(1),
                request_timeout,
            }),
            _recv_task: recv_task,
        })
    }

    /// Route responses to their waiting callers. Events are not consumed.
    async fn receive_loop(mut ws_source: WsSource, pending: PendingMap) {
        while let Some(msg) = ws_source.next().await {
            match msg {
                Ok(Message::Text(text)) => match serde_json::from_str::<CdpResponse>(&text) {
                    Ok(resp) => {
                        if let Some(id) = resp.id {
                            let waiter = pending.lock().remove(&id);
                            if let Some(tx) = waiter {
                                let result = match resp.error {
                                    Some(error) => Err(CdpError::Protocol {
                                        code: error.code,
                                        message: error.message,
                                    }),
                                    None => Ok(resp.result.unwrap_or(Value::Null)),
                                };
                                let _ = tx.send(result);
                            }
                        } else if let Some(method) = resp.method {
                            trace!("CDP event {} (session {:?})", method, resp.session_id);
                        }
                    }
                    Err(e) => warn!("Failed to parse CDP message: {}", e),
                },
                Ok(Message::Close(_)) => {
                    debug!("WebSocket closed");
                    break;
                }
                Err(e) => {
                    error!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
        // Wake every waiter; dropped senders surface as SessionClosed.
        pending.lock().clear();
    }

    /// List open tabs (page targets only).
    pub async fn list_tabs(&self) -> Result<Vec<PageInfo>, CdpError> {
        let url = format!("{}/json/list", self.http_endpoint);
        let targets: Vec<PageInfo> = self.http.get(&url).send().await?.json().await?;
        Ok(targets.into_iter().filter(PageInfo::is_page).collect())
    }

    /// Attach to an existing tab by target id.
    pub async fn attach(&self, target_id: &str) -> Result<PageSession, CdpError> {
        let result = self
            .connection
            .call(
                "Target.attachToTarget",
                Some(json!({
                    "targetId": target_id,
                    "flatten": true
                })),
                None,
            )
            .await
            .map_err(|e| match e {
                CdpError::Protocol { .. } => CdpError::PageNotFound(target_id.to_string()),
                other => other,
            })?;

        let session_id = result["sessionId"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("Missing sessionId".to_string()))?
            .to_string();

        let session = PageSession::new(target_id.to_string(), session_id, self.connection.clone());
        session.enable_domains().await?;

        debug!("Attached to tab {}", target_id);
        Ok(session)
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self._recv_task.abort();
    }
}
