//! Local listener that captures the OAuth redirect.
//!
//! Binds `127.0.0.1` on the redirect URI's port, waits for exactly one
//! request carrying `code` (or `error`) on the callback path, answers with a
//! small HTML page and shuts down. The wait is bounded; on timeout the user
//! is told to fall back to pasting the code by hand.

use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use url::Url;
use warp::Filter;
use warp::http::StatusCode;

use crate::errors::{BasecampError, Result};

/// How long `basecamp auth` waits for the browser by default
pub const DEFAULT_WAIT: Duration = Duration::from_secs(300);

type CodeSender = Arc<Mutex<Option<oneshot::Sender<Result<String>>>>>;

/// Port and path the listener should serve, from a redirect URI.
///
/// Only plain-HTTP loopback URIs qualify; anything else means the code has to
/// be entered manually.
pub fn listener_target(redirect_uri: &str) -> Option<(u16, String)> {
    let url = Url::parse(redirect_uri).ok()?;
    if url.scheme() != "http" {
        return None;
    }
    match url.host_str()? {
        "localhost" | "127.0.0.1" => {}
        _ => return None,
    }
    let port = url.port_or_known_default()?;
    let path = match url.path() {
        "" => "/".to_string(),
        p => p.to_string(),
    };
    Some((port, path))
}

/// A running single-shot callback server
pub struct CallbackListener {
    addr: SocketAddr,
    code_rx: oneshot::Receiver<Result<String>>,
    shutdown_tx: oneshot::Sender<()>,
    server: JoinHandle<()>,
}

impl CallbackListener {
    /// Start listening on `127.0.0.1:port` for requests to `path`.
    ///
    /// Port 0 picks a free port; see [`local_addr`](Self::local_addr).
    /// Must be called from within a tokio runtime.
    pub fn bind(port: u16, path: &str) -> Result<Self> {
        let (code_tx, code_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let code_tx: CodeSender = Arc::new(Mutex::new(Some(code_tx)));

        let expected_path = path.to_string();
        let route = warp::get()
            .and(warp::path::full())
            .and(warp::query::<HashMap<String, String>>())
            .and(warp::any().map(move || code_tx.clone()))
            .map(
                move |full: warp::path::FullPath,
                      params: HashMap<String, String>,
                      code_tx: CodeSender| {
                    if full.as_str() != expected_path {
                        debug!("Ignoring request to {}", full.as_str());
                        return warp::reply::with_status(
                            warp::reply::html(page("Not found", "Nothing to see here.")),
                            StatusCode::NOT_FOUND,
                        );
                    }
                    handle_callback(&params, &code_tx)
                },
            );

        let bind_addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
        let (addr, server) = warp::serve(route)
            .try_bind_with_graceful_shutdown(bind_addr, async move {
                shutdown_rx.await.ok();
            })
            .map_err(|e| {
                BasecampError::Listener(format!("cannot listen on {}: {}", bind_addr, e))
            })?;

        info!("Waiting for OAuth callback on http://{}{}", addr, path);
        Ok(Self {
            addr,
            code_rx,
            shutdown_tx,
            server: tokio::spawn(server),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Block until the redirect arrives or `timeout` elapses, then stop the
    /// server.
    pub async fn wait_for_code(self, timeout: Duration) -> Result<String> {
        let outcome = tokio::time::timeout(timeout, self.code_rx).await;

        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.server.await {
            warn!("Callback server task ended abnormally: {}", e);
        }

        match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(BasecampError::Listener(
                "listener stopped before a callback arrived".to_string(),
            )),
            Err(_) => Err(BasecampError::ListenerTimeout {
                seconds: timeout.as_secs(),
            }),
        }
    }
}

fn handle_callback(
    params: &HashMap<String, String>,
    code_tx: &CodeSender,
) -> warp::reply::WithStatus<warp::reply::Html<String>> {
    let (status, html, outcome) = if let Some(code) = params.get("code") {
        (
            StatusCode::OK,
            page(
                "Authorization Successful",
                "You can close this window and return to the terminal.",
            ),
            Ok(code.clone()),
        )
    } else if let Some(error) = params.get("error") {
        let description = params
            .get("error_description")
            .map(String::as_str)
            .unwrap_or("");
        (
            StatusCode::BAD_REQUEST,
            page(
                "Authorization Failed",
                &format!("{} {}", escape_html(error), escape_html(description)),
            ),
            Err(BasecampError::Authentication {
                status: StatusCode::BAD_REQUEST.as_u16(),
                reason: if description.is_empty() {
                    error.clone()
                } else {
                    format!("{}: {}", error, description)
                },
            }),
        )
    } else {
        return warp::reply::with_status(
            warp::reply::html(page(
                "Waiting for authorization...",
                "Please authorize the application in the other window.",
            )),
            StatusCode::OK,
        );
    };

    let sender = code_tx.lock().ok().and_then(|mut slot| slot.take());
    match sender {
        Some(tx) => {
            let _ = tx.send(outcome);
        }
        None => debug!("Callback already received; ignoring duplicate"),
    }

    warp::reply::with_status(warp::reply::html(html), status)
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>{title}</title></head>\
         <body><h1>{title}</h1><p>{body}</p></body></html>"
    )
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
