//! Shared fakes for the integration tests: a scripted score client and a
//! chat transport that records what it was asked to send.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::thread::JoinHandle;
use std::time::Duration;

use psiwatch::checklist::CheckItem;
use psiwatch::config::{self, Config};
use psiwatch::notify::{ChatMessage, ChatTransport, NotifyError};
use psiwatch::pipeline::RunPaths;
use psiwatch::scoring::{self, CategoryScores, FetchError, ScoreClient};

pub enum Reply {
    Scores(CategoryScores),
    /// Raw PageSpeed response body.
    Body(serde_json::Value),
    Timeout,
    Status(u16),
}

/// Answers by URL; unknown URLs get a fixed set of scores.
#[derive(Default)]
pub struct ScriptedClient {
    replies: HashMap<String, Reply>,
    pub calls: Cell<usize>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, url: &str, reply: Reply) -> Self {
        self.replies.insert(url.to_string(), reply);
        self
    }
}

impl ScoreClient for ScriptedClient {
    fn fetch_scores(&self, item: &CheckItem) -> Result<CategoryScores, FetchError> {
        self.calls.set(self.calls.get() + 1);
        match self.replies.get(&item.url) {
            Some(Reply::Scores(s)) => Ok(*s),
            Some(Reply::Body(body)) => Ok(scoring::scores_from_response(body)),
            Some(Reply::Timeout) => Err(FetchError::Other("operation timed out".to_string())),
            Some(Reply::Status(code)) => Err(FetchError::Status(
                reqwest::StatusCode::from_u16(*code).expect("valid status"),
            )),
            None => Ok(scores(90, 90, 90, 90)),
        }
    }
}

pub fn scores(performance: u8, accessibility: u8, best_practices: u8, seo: u8) -> CategoryScores {
    CategoryScores {
        performance,
        accessibility,
        best_practices,
        seo,
    }
}

pub struct RecordingTransport<'a> {
    pub sent: &'a RefCell<Vec<ChatMessage>>,
}

impl ChatTransport for RecordingTransport<'_> {
    fn send(&self, message: &ChatMessage) -> Result<(), NotifyError> {
        self.sent.borrow_mut().push(message.clone());
        Ok(())
    }
}

/// Default config with every path under `root`, no delay and chat credentials set.
pub fn config_in(root: &Path) -> Config {
    let mut cfg = config::load_config(None).expect("default config").config;
    cfg.input = root.join("urls.csv");
    cfg.request_delay_secs = 0.0;
    cfg.output.csv = root.join("out").join("psi_results.csv");
    cfg.output.json = root.join("out").join("psi_results.json");
    cfg.output.html = root.join("site").join("dashboard.html");
    cfg.history.dir = root.join("site");
    cfg.notify.bot_token = "test-token".to_string();
    cfg.notify.chat_id = "@test".to_string();
    cfg
}

pub fn write_checklist(cfg: &Config, body: &str) -> RunPaths {
    std::fs::write(&cfg.input, body).expect("write checklist");
    RunPaths::from_config(cfg)
}

pub fn read_json(path: &Path) -> serde_json::Value {
    let text = std::fs::read_to_string(path).expect("read json");
    serde_json::from_str(&text).expect("parse json")
}

// ============================================================================
// Canned HTTP server
// ============================================================================

pub enum Canned {
    /// Status code and body, sent once the request has been read.
    Respond(u16, &'static str),
    /// Read the request, then say nothing for this long.
    Hang(Duration),
}

/// Serves exactly one connection on a loopback port.
pub struct CannedServer {
    pub base: String,
    handle: JoinHandle<String>,
}

impl CannedServer {
    pub fn start(canned: Canned) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let base = format!("http://{}", listener.local_addr().expect("addr"));
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            stream
                .set_read_timeout(Some(Duration::from_secs(5)))
                .expect("read timeout");
            let request = read_request(&mut stream);
            match canned {
                Canned::Respond(code, body) => {
                    let response = format!(
                        "HTTP/1.1 {code} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = stream.write_all(response.as_bytes());
                    let _ = stream.flush();
                }
                Canned::Hang(wait) => std::thread::sleep(wait),
            }
            request
        });
        Self { base, handle }
    }

    /// Raw request text the server received.
    pub fn request(self) -> String {
        self.handle.join().expect("server thread")
    }
}

fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let body_len = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Base url of a loopback port nothing listens on.
pub fn closed_port_base() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}
