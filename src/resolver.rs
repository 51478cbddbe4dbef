//! Client side of the Media Resolution Service contract.
//!
//! The service takes an Instagram post URL and answers with a direct media
//! URL plus its kind. This module owns the wire types, the URL pre-check,
//! and the HTTP client; the panel machine in `app` only sees
//! `Result<ResolvedMedia, ResolveError>`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::Settings;
use crate::constants::constants;

// --- Media types ---

/// Classification of resolved content. Anything the service reports beyond
/// the two recognized values is treated as an image; only `video` changes
/// how the result is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
  Image,
  Video,
}

impl MediaKind {
  pub fn parse(s: &str) -> Self {
    match s {
      "video" => MediaKind::Video,
      _ => MediaKind::Image,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      MediaKind::Image => "image",
      MediaKind::Video => "video",
    }
  }
}

/// A successfully resolved piece of media.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMedia {
  pub url: String,
  pub kind: MediaKind,
}

// --- Errors ---

#[derive(Debug, Error)]
pub enum ResolveError {
  /// The request exceeded the configured deadline.
  #[error("resolution request timed out")]
  TimedOut,
  /// The service answered but declined the URL (unsupported post, private
  /// content, …). The message is passed through to the user when present.
  #[error("service rejected the URL: {message:?}")]
  Rejected { message: Option<String> },
  /// Network-level failure: unreachable host, connection reset, TLS, …
  #[error("transport failure: {0}")]
  Transport(#[source] reqwest::Error),
  /// The service answered with a body that doesn't follow the contract.
  #[error("malformed service reply: {0}")]
  Malformed(String),
}

// --- URL validation ---

/// Advisory pre-check before spending a round trip: the string must parse as
/// a URL and its host must contain one of the recognized Instagram domains.
/// Not a security boundary — the service re-validates on its side.
pub fn is_instagram_url(s: &str) -> bool {
  let Ok(url) = Url::parse(s) else {
    return false;
  };
  let Some(host) = url.host_str() else {
    return false;
  };
  constants().recognized_domains.iter().any(|domain| host.contains(domain.as_str()))
}

// --- Wire types ---

#[derive(Debug, Serialize)]
struct ResolveRequest<'a> {
  url: &'a str,
}

/// The service's reply shape. Rejections arrive either as
/// `{"success": false, "error": ...}` or as a bare `{"error": ...}` on
/// HTTP 4xx/5xx — `success` defaults to false so both land in the same arm.
#[derive(Debug, Deserialize)]
struct ResolveReply {
  #[serde(default)]
  success: bool,
  media_url: Option<String>,
  media_type: Option<String>,
  error: Option<String>,
}

/// Decode a reply body into a resolved media or a typed error.
fn decode_reply(body: &str) -> Result<ResolvedMedia, ResolveError> {
  let reply: ResolveReply = serde_json::from_str(body).map_err(|e| ResolveError::Malformed(e.to_string()))?;
  if !reply.success {
    return Err(ResolveError::Rejected { message: reply.error });
  }
  let Some(media_url) = reply.media_url else {
    return Err(ResolveError::Malformed("success reply without media_url".to_string()));
  };
  let kind = reply.media_type.as_deref().map_or(MediaKind::Image, MediaKind::parse);
  Ok(ResolvedMedia { url: media_url, kind })
}

// --- Resolver seam ---

/// Seam between the panel machine and the network, so the whole state
/// machine is exercisable with a stub.
#[async_trait]
pub trait MediaResolver: Send + Sync {
  async fn resolve(&self, url: &str) -> Result<ResolvedMedia, ResolveError>;
}

pub struct HttpResolver {
  client: reqwest::Client,
  endpoint: String,
}

impl HttpResolver {
  pub fn new(settings: &Settings) -> anyhow::Result<Self> {
    let client = reqwest::Client::builder()
      .user_agent(constants().user_agent.clone())
      .timeout(settings.timeout)
      .connect_timeout(Duration::from_secs(constants().connect_timeout_secs))
      .build()?;
    Ok(Self { client, endpoint: settings.endpoint.clone() })
  }
}

#[async_trait]
impl MediaResolver for HttpResolver {
  async fn resolve(&self, url: &str) -> Result<ResolvedMedia, ResolveError> {
    let response = self
      .client
      .post(&self.endpoint)
      .json(&ResolveRequest { url })
      .send()
      .await
      .map_err(|e| if e.is_timeout() { ResolveError::TimedOut } else { ResolveError::Transport(e) })?;

    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|e| if e.is_timeout() { ResolveError::TimedOut } else { ResolveError::Transport(e) })?;
    debug!(%status, bytes = body.len(), "resolution reply received");

    decode_reply(&body)
  }
}
