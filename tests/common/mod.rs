//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use tuning_settings::draft::{ConfigDraft, DraftPayload};
use tuning_settings::service::{ConfigService, ServiceError, SubmitResponse};

/// Valid draft with methods `A` and `B` and a budget of 50.
pub fn two_method_draft_json() -> &'static str {
    r#"{"methods":["A","B"],"budget":50,"priority":1,"r_minimum":2,"k_window":0,"gridding":0,"metric":"f1","selector":"bestk","budget_type":"classifier","tuner":"gp"}"#
}

pub fn two_method_payload() -> DraftPayload {
    serde_json::from_str(two_method_draft_json()).unwrap()
}

/// Config service double answering from queued results.
///
/// When gated, every call parks until [`ScriptedService::release`] hands out
/// a permit, so tests can observe the controller mid-flight.
#[derive(Default)]
pub struct ScriptedService {
    fetches: Mutex<VecDeque<Result<DraftPayload, ServiceError>>>,
    submits: Mutex<VecDeque<Result<SubmitResponse, ServiceError>>>,
    submitted: Mutex<Vec<ConfigDraft>>,
    gate: Option<Semaphore>,
    fetch_calls: AtomicUsize,
    submit_calls: AtomicUsize,
    in_flight_submits: AtomicUsize,
    max_in_flight_submits: AtomicUsize,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    pub fn on_fetch(self, result: Result<DraftPayload, ServiceError>) -> Self {
        self.fetches.lock().unwrap().push_back(result);
        self
    }

    pub fn on_submit(self, result: Result<SubmitResponse, ServiceError>) -> Self {
        self.submits.lock().unwrap().push_back(result);
        self
    }

    pub fn release(&self, calls: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(calls);
        }
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight_submits(&self) -> usize {
        self.max_in_flight_submits.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<ConfigDraft> {
        self.submitted.lock().unwrap().clone()
    }

    async fn pass_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
    }
}

#[async_trait]
impl ConfigService for ScriptedService {
    async fn fetch(&self) -> Result<DraftPayload, ServiceError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate().await;
        self.fetches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::Network("no scripted fetch".into())))
    }

    async fn submit(&self, draft: &ConfigDraft) -> Result<SubmitResponse, ServiceError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        let in_flight = self.in_flight_submits.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight_submits.fetch_max(in_flight, Ordering::SeqCst);
        self.submitted.lock().unwrap().push(draft.clone());

        self.pass_gate().await;

        self.in_flight_submits.fetch_sub(1, Ordering::SeqCst);
        self.submits
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::Network("no scripted submit".into())))
    }
}

/// Poll `condition` until it holds, failing the test after two seconds.
pub async fn wait_until<F: Fn() -> bool>(condition: F) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

/// Request as seen by a programmable backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

/// Start a programmable mock backend on an ephemeral port.
///
/// The full request, body included, is read before `f` is asked for the
/// `(status, body)` reply.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(RecordedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let (status, body) = f(request).await;
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let read = socket.read(&mut chunk).await.ok()?;
        if read == 0 {
            return None;
        }
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut request_line = head.lines().next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buffer.len() < header_end + content_length {
        let read = socket.read(&mut chunk).await.ok()?;
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);
    }

    let body = String::from_utf8_lossy(&buffer[header_end..]).to_string();
    Some(RecordedRequest { method, path, body })
}
