//! # Notifier
//!
//! Posts a short run summary to a Telegram chat. One attempt per call; every
//! failure comes back as a [`NotifyError`] for the caller to log.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::NotifyConfig;
use crate::wib::{format_duration, format_wib};

pub const TELEGRAM_API: &str = "https://api.telegram.org";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("chat credentials are not configured")]
    MissingCredentials,
    #[error("request failed: {}", crate::util::error_chain(.0))]
    Transport(#[from] reqwest::Error),
    #[error("chat API returned HTTP status {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub chat_id: String,
    pub text: String,
    pub parse_mode: &'static str,
    pub disable_web_page_preview: bool,
}

/// Delivery of one chat message.
pub trait ChatTransport {
    fn send(&self, message: &ChatMessage) -> Result<(), NotifyError>;
}

/// Telegram Bot API `sendMessage`.
pub struct TelegramTransport {
    http: Client,
    endpoint: String,
}

impl TelegramTransport {
    /// `api_base` is the Bot API host, normally [`TELEGRAM_API`].
    pub fn new(
        api_base: &str,
        bot_token: &str,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Transport(e.without_url()))?;
        let base = api_base.trim_end_matches('/');
        Ok(Self {
            http,
            endpoint: format!("{base}/bot{bot_token}/sendMessage"),
        })
    }
}

impl ChatTransport for TelegramTransport {
    fn send(&self, message: &ChatMessage) -> Result<(), NotifyError> {
        // The endpoint embeds the bot token, keep it out of error text.
        let response = self
            .http
            .post(&self.endpoint)
            .json(message)
            .send()
            .map_err(|e| NotifyError::Transport(e.without_url()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status));
        }
        Ok(())
    }
}

/// What one notification reports.
#[derive(Debug, Clone)]
pub struct RunNotice<'a> {
    pub status: &'a str,
    pub sent_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl<'a> RunNotice<'a> {
    pub fn new(status: &'a str) -> Self {
        Self {
            status,
            sent_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn with_window(
        mut self,
        started_at: Option<DateTime<Utc>>,
        finished_at: Option<DateTime<Utc>>,
    ) -> Self {
        self.started_at = started_at;
        self.finished_at = finished_at;
        self
    }
}

fn link(url: &str) -> String {
    let escaped = crate::dashboard::cards::escape_html(url);
    format!("<a href=\"{escaped}\">{escaped}</a>")
}

/// HTML-formatted message text.
pub fn format_message(cfg: &NotifyConfig, notice: &RunNotice<'_>) -> String {
    let escape = crate::dashboard::cards::escape_html;
    let mut lines = vec![
        format!("<b>{}</b>", escape(&cfg.title)),
        format!("Time: {}", format_wib(notice.sent_at)),
        format!("Status: <b>{}</b>", escape(notice.status)),
    ];
    if let (Some(start), Some(end)) = (notice.started_at, notice.finished_at) {
        lines.push(format!("Duration: {}", format_duration(end - start)));
    }
    if !cfg.dashboard_url.is_empty() {
        lines.push("Dashboard:".to_string());
        lines.push(link(&cfg.dashboard_url));
    }
    if !cfg.history_url.is_empty() {
        lines.push(String::new());
        lines.push("History (json):".to_string());
        lines.push(link(&cfg.history_url));
    }
    lines.join("\n")
}

pub struct Notifier<'a> {
    cfg: &'a NotifyConfig,
    transport: Option<Box<dyn ChatTransport + 'a>>,
}

impl<'a> Notifier<'a> {
    /// Telegram-backed notifier. Without credentials no client is built and
    /// every send fails fast with [`NotifyError::MissingCredentials`].
    pub fn from_config(cfg: &'a NotifyConfig) -> Result<Self, NotifyError> {
        if !has_credentials(cfg) {
            return Ok(Self {
                cfg,
                transport: None,
            });
        }
        let transport = TelegramTransport::new(
            &cfg.api_base,
            &cfg.bot_token,
            Duration::from_secs(cfg.timeout_secs),
        )?;
        Ok(Self {
            cfg,
            transport: Some(Box::new(transport)),
        })
    }

    pub fn with_transport(cfg: &'a NotifyConfig, transport: Box<dyn ChatTransport + 'a>) -> Self {
        Self {
            cfg,
            transport: Some(transport),
        }
    }

    pub fn try_notify(&self, notice: &RunNotice<'_>) -> Result<(), NotifyError> {
        if !has_credentials(self.cfg) {
            return Err(NotifyError::MissingCredentials);
        }
        let transport = self.transport.as_ref().ok_or(NotifyError::MissingCredentials)?;
        let message = ChatMessage {
            chat_id: self.cfg.chat_id.clone(),
            text: format_message(self.cfg, notice),
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };
        transport.send(&message)
    }

    /// Send and report success; failures are logged, never raised.
    pub fn notify(&self, notice: &RunNotice<'_>) -> bool {
        match self.try_notify(notice) {
            Ok(()) => {
                info!("notification sent status={}", notice.status);
                true
            }
            Err(NotifyError::MissingCredentials) => {
                info!("notification skipped: chat credentials are not configured");
                false
            }
            Err(err) => {
                warn!("notification failed: {err}");
                false
            }
        }
    }
}

fn has_credentials(cfg: &NotifyConfig) -> bool {
    !cfg.bot_token.trim().is_empty() && !cfg.chat_id.trim().is_empty()
}
