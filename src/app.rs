use anyhow::Result;
use image::DynamicImage;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::config::{Config, Settings};
use crate::constants::constants;
use crate::download;
use crate::preview;
use crate::resolver::{MediaKind, MediaResolver, ResolveError, ResolvedMedia, is_instagram_url};
use crate::theme::{THEMES, Theme};

// --- Types ---

pub type ResolveOutcome = (u64, Result<ResolvedMedia, ResolveError>);
type SaveOutcome = (u64, Result<PathBuf>);
type PreviewOutcome = (String, Result<DynamicImage>);

/// What the result panel shows: the resolved media plus the filename a
/// download will use. Synthesized once on entry, fully replaced on the next
/// successful submit.
#[derive(Debug, Clone)]
pub struct MediaCard {
  pub media: ResolvedMedia,
  pub filename: String,
}

/// The mutually exclusive page regions. Exactly one renders at a time.
#[derive(Debug)]
pub enum Panel {
  Idle,
  Loading,
  Error(String),
  Result(MediaCard),
}

/// Live validation feedback for the input border. Cosmetic only; never
/// touches the panel machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFeedback {
  Neutral,
  Valid,
  Invalid,
}

/// In-flight async task receivers, one slot per concern.
#[derive(Default)]
pub(crate) struct AsyncTasks {
  pub(crate) resolve_rx: Option<oneshot::Receiver<ResolveOutcome>>,
  pub(crate) save_rx: Option<oneshot::Receiver<SaveOutcome>>,
  pub(crate) preview_rx: Option<oneshot::Receiver<PreviewOutcome>>,
}

pub struct App {
  pub input: String,
  pub cursor_position: usize,
  pub input_scroll: usize,
  pub theme_index: usize,
  pub panel: Panel,
  /// Informational status line (e.g. where a download landed). Lives outside
  /// the panel machine.
  pub info_message: Option<String>,
  pub saving: bool,
  pub should_quit: bool,
  /// Fetched preview image for the current result, keyed by media URL.
  pub preview: Option<(String, DynamicImage)>,
  /// Preview resized to the last-rendered cell area, keyed by (url, w, h).
  pub resized_preview: Option<(String, u16, u16, DynamicImage)>,
  /// Latest issued request sequence number. Outcomes tagged with anything
  /// older are stale and discarded.
  seq: u64,
  pub(crate) tasks: AsyncTasks,
  resolver: Arc<dyn MediaResolver>,
  http: reqwest::Client,
  settings: Settings,
}

impl App {
  pub fn new(resolver: Arc<dyn MediaResolver>, http: reqwest::Client, settings: Settings) -> Self {
    let config = Config::load();
    let theme_index =
      if let Some(ref name) = config.theme_name { THEMES.iter().position(|t| t.name == name).unwrap_or(0) } else { 0 };

    Self {
      input: String::new(),
      cursor_position: 0,
      input_scroll: 0,
      theme_index,
      panel: Panel::Idle,
      info_message: None,
      saving: false,
      should_quit: false,
      preview: None,
      resized_preview: None,
      seq: 0,
      tasks: AsyncTasks::default(),
      resolver,
      http,
      settings,
    }
  }

  pub fn theme(&self) -> &'static Theme {
    &THEMES[self.theme_index]
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    self.save_config();
  }

  fn save_config(&self) {
    let mut config = Config::load();
    config.theme_name = Some(self.theme().name.to_string());
    config.save();
  }

  /// Recomputed on every keystroke (each draw reads it): neutral while
  /// empty, otherwise whether the URL would pass the submit pre-check.
  pub fn input_feedback(&self) -> InputFeedback {
    let trimmed = self.input.trim();
    if trimmed.is_empty() {
      InputFeedback::Neutral
    } else if is_instagram_url(trimmed) {
      InputFeedback::Valid
    } else {
      InputFeedback::Invalid
    }
  }

  // --- Submit ---

  /// The submit contract: validate, then enter `Loading` and spawn exactly
  /// one resolution request tagged with a fresh sequence number. Validation
  /// failures never issue a request.
  pub fn submit(&mut self) {
    let url = self.input.trim().to_string();
    self.info_message = None;

    if url.is_empty() {
      self.panel = Panel::Error(constants().empty_input_prompt.clone());
      return;
    }
    if !is_instagram_url(&url) {
      self.panel = Panel::Error(constants().invalid_url_prompt.clone());
      return;
    }

    self.seq += 1;
    let seq = self.seq;
    info!(seq, url = %url, "resolution triggered");
    self.panel = Panel::Loading;

    let resolver = Arc::clone(&self.resolver);
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send((seq, resolver.resolve(&url).await));
    });
    self.tasks.resolve_rx = Some(rx);
  }

  /// Apply a resolution outcome. Stale outcomes (sequence older than the
  /// latest submit) are discarded entirely.
  pub fn apply_resolve_outcome(&mut self, seq: u64, outcome: Result<ResolvedMedia, ResolveError>) {
    if seq != self.seq {
      debug!(seq, latest = self.seq, "stale resolution outcome discarded");
      return;
    }
    match outcome {
      Ok(media) => {
        info!(seq, url = %media.url, kind = media.kind.label(), "resolution succeeded");
        let filename = download::synthesize_filename(media.kind, download::now_millis());
        self.preview = None;
        self.resized_preview = None;
        self.tasks.preview_rx = None;
        if media.kind == MediaKind::Image {
          self.trigger_preview(&media.url);
        }
        self.panel = Panel::Result(MediaCard { media, filename });
      }
      Err(err) => {
        self.panel = Panel::Error(resolve_error_message(&err));
        match err {
          ResolveError::Rejected { message } => info!(seq, ?message, "service rejected the URL"),
          ResolveError::TimedOut => warn!(seq, "resolution timed out"),
          ResolveError::Transport(e) => error!(seq, err = %e, "resolution transport failure"),
          ResolveError::Malformed(detail) => error!(seq, %detail, "malformed resolution reply"),
        }
      }
    }
  }

  // --- Preview ---

  fn trigger_preview(&mut self, url: &str) {
    let client = self.http.clone();
    let url = url.to_string();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let result = preview::fetch_preview(&client, &url).await;
      let _ = tx.send((url, result));
    });
    self.tasks.preview_rx = Some(rx);
  }

  // --- Download ---

  /// Save the currently shown media to the configured download directory,
  /// under the card's synthesized filename.
  pub fn trigger_save(&mut self) {
    let Panel::Result(ref card) = self.panel else { return };
    if self.saving {
      return;
    }
    self.saving = true;
    self.info_message = None;

    let seq = self.seq;
    let client = self.http.clone();
    let url = card.media.url.clone();
    let filename = card.filename.clone();
    let dir = self.settings.download_dir.clone();
    info!(seq, %filename, "download triggered");

    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send((seq, download::save_media(&client, &url, &dir, &filename).await));
    });
    self.tasks.save_rx = Some(rx);
  }

  fn apply_save_outcome(&mut self, seq: u64, outcome: Result<PathBuf>) {
    self.saving = false;
    if seq != self.seq {
      debug!(seq, latest = self.seq, "stale download outcome discarded");
      return;
    }
    match outcome {
      Ok(path) => {
        self.info_message = Some(format!("Saved to {}", path.display()));
      }
      Err(e) => {
        error!(seq, err = ?e, "download failed");
        self.panel = Panel::Error(constants().save_failed_message.clone());
      }
    }
  }

  // --- Pending outcomes ---

  /// Poll the in-flight task receivers. Called once per draw tick.
  pub fn check_pending(&mut self) {
    if let Some(mut rx) = self.tasks.resolve_rx.take() {
      match rx.try_recv() {
        Ok((seq, outcome)) => self.apply_resolve_outcome(seq, outcome),
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.resolve_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          error!("resolution task dropped without reporting");
          self.panel = Panel::Error(constants().transport_fallback.clone());
        }
      }
    }

    if let Some(mut rx) = self.tasks.save_rx.take() {
      match rx.try_recv() {
        Ok((seq, outcome)) => self.apply_save_outcome(seq, outcome),
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.save_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          error!("download task dropped without reporting");
          self.saving = false;
          self.panel = Panel::Error(constants().save_failed_message.clone());
        }
      }
    }

    if let Some(mut rx) = self.tasks.preview_rx.take() {
      match rx.try_recv() {
        Ok((url, Ok(image))) => {
          if let Panel::Result(ref card) = self.panel
            && card.media.url == url
          {
            self.preview = Some((url, image));
          }
        }
        Ok((url, Err(e))) => {
          // The result panel stands on its own; a missing preview is not an error.
          debug!(%url, err = ?e, "preview fetch failed");
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.preview_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {}
      }
    }
  }
}

/// Map a resolution error onto the single message the error panel shows.
/// Transport and malformed-reply details stay in the log.
fn resolve_error_message(err: &ResolveError) -> String {
  match err {
    ResolveError::TimedOut => constants().timeout_message.clone(),
    ResolveError::Rejected { message } => {
      message.clone().unwrap_or_else(|| constants().rejected_fallback.clone())
    }
    ResolveError::Transport(_) | ResolveError::Malformed(_) => constants().transport_fallback.clone(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use async_trait::async_trait;
  use std::path::PathBuf;
  use std::time::Duration;

  /// Stub resolver returning a canned outcome.
  struct FixedResolver(Result<ResolvedMedia, &'static str>);

  #[async_trait]
  impl MediaResolver for FixedResolver {
    async fn resolve(&self, _url: &str) -> Result<ResolvedMedia, ResolveError> {
      match &self.0 {
        Ok(media) => Ok(media.clone()),
        Err(msg) => Err(ResolveError::Rejected { message: Some((*msg).to_string()) }),
      }
    }
  }

  /// Stub resolver for paths that must never reach the network.
  struct UnreachableResolver;

  #[async_trait]
  impl MediaResolver for UnreachableResolver {
    async fn resolve(&self, url: &str) -> Result<ResolvedMedia, ResolveError> {
      panic!("resolver must not be called for {url}");
    }
  }

  fn test_settings() -> Settings {
    Settings {
      endpoint: "http://example.test/resolve".to_string(),
      timeout: Duration::from_secs(1),
      download_dir: PathBuf::from("/tmp"),
    }
  }

  fn make_app(resolver: Arc<dyn MediaResolver>) -> App {
    App::new(resolver, reqwest::Client::new(), test_settings())
  }

  fn video_media() -> ResolvedMedia {
    ResolvedMedia { url: "http://x/a.mp4".to_string(), kind: MediaKind::Video }
  }

  // --- Submit preconditions ---

  #[test]
  fn empty_submit_shows_prompt_without_request() {
    let mut app = make_app(Arc::new(UnreachableResolver));
    app.input = "   ".to_string();
    app.submit();
    match app.panel {
      Panel::Error(ref msg) => assert_eq!(msg, &constants().empty_input_prompt),
      ref other => panic!("expected error panel, got {other:?}"),
    }
    assert!(app.tasks.resolve_rx.is_none());
    assert_eq!(app.seq, 0);
  }

  #[test]
  fn invalid_submit_shows_prompt_without_request() {
    let mut app = make_app(Arc::new(UnreachableResolver));
    app.input = "not a url".to_string();
    app.submit();
    match app.panel {
      Panel::Error(ref msg) => assert_eq!(msg, &constants().invalid_url_prompt),
      ref other => panic!("expected error panel, got {other:?}"),
    }
    assert!(app.tasks.resolve_rx.is_none());
    assert_eq!(app.seq, 0);
  }

  // --- Outcome application ---

  #[test]
  fn success_outcome_enters_result() {
    let mut app = make_app(Arc::new(UnreachableResolver));
    app.seq = 1;
    app.apply_resolve_outcome(1, Ok(video_media()));
    match app.panel {
      Panel::Result(ref card) => {
        assert_eq!(card.media.url, "http://x/a.mp4");
        assert_eq!(card.media.kind, MediaKind::Video);
        assert!(card.filename.starts_with("instagram-video-"));
        assert!(!card.filename.contains('.'));
      }
      ref other => panic!("expected result panel, got {other:?}"),
    }
  }

  #[test]
  fn rejection_message_passes_through() {
    let mut app = make_app(Arc::new(UnreachableResolver));
    app.seq = 1;
    app.apply_resolve_outcome(1, Err(ResolveError::Rejected { message: Some("private account".to_string()) }));
    match app.panel {
      Panel::Error(ref msg) => assert_eq!(msg, "private account"),
      ref other => panic!("expected error panel, got {other:?}"),
    }
  }

  #[test]
  fn rejection_without_message_uses_fallback() {
    let mut app = make_app(Arc::new(UnreachableResolver));
    app.seq = 1;
    app.apply_resolve_outcome(1, Err(ResolveError::Rejected { message: None }));
    match app.panel {
      Panel::Error(ref msg) => assert_eq!(msg, &constants().rejected_fallback),
      ref other => panic!("expected error panel, got {other:?}"),
    }
  }

  #[test]
  fn malformed_reply_uses_generic_message() {
    let mut app = make_app(Arc::new(UnreachableResolver));
    app.seq = 1;
    app.apply_resolve_outcome(1, Err(ResolveError::Malformed("bad body".to_string())));
    match app.panel {
      Panel::Error(ref msg) => assert_eq!(msg, &constants().transport_fallback),
      ref other => panic!("expected error panel, got {other:?}"),
    }
  }

  #[test]
  fn timeout_uses_distinct_message() {
    let mut app = make_app(Arc::new(UnreachableResolver));
    app.seq = 1;
    app.apply_resolve_outcome(1, Err(ResolveError::TimedOut));
    match app.panel {
      Panel::Error(ref msg) => assert_eq!(msg, &constants().timeout_message),
      ref other => panic!("expected error panel, got {other:?}"),
    }
  }

  #[test]
  fn stale_outcome_is_discarded() {
    let mut app = make_app(Arc::new(UnreachableResolver));
    app.seq = 3;
    app.panel = Panel::Loading;
    app.apply_resolve_outcome(2, Ok(video_media()));
    assert!(matches!(app.panel, Panel::Loading), "stale outcome must not render");
  }

  #[test]
  fn resubmit_replaces_previous_card() {
    let mut app = make_app(Arc::new(UnreachableResolver));
    app.seq = 1;
    app.apply_resolve_outcome(1, Ok(video_media()));
    app.seq = 2;
    let second = ResolvedMedia { url: "http://x/b.mp4".to_string(), kind: MediaKind::Video };
    app.apply_resolve_outcome(2, Ok(second));
    match app.panel {
      Panel::Result(ref card) => assert_eq!(card.media.url, "http://x/b.mp4"),
      ref other => panic!("expected result panel, got {other:?}"),
    }
    assert!(app.preview.is_none(), "previous preview must be cleared");
  }

  // --- Input feedback ---

  #[test]
  fn input_feedback_tracks_validity() {
    let mut app = make_app(Arc::new(UnreachableResolver));
    assert_eq!(app.input_feedback(), InputFeedback::Neutral);
    app.input = "https://instagram.com/p/xyz".to_string();
    assert_eq!(app.input_feedback(), InputFeedback::Valid);
    app.input = "https://example.com/p/xyz".to_string();
    assert_eq!(app.input_feedback(), InputFeedback::Invalid);
  }

  // --- Full submit/response cycle through the channel ---

  async fn drain_pending(app: &mut App) {
    for _ in 0..64 {
      tokio::task::yield_now().await;
      app.check_pending();
      if !matches!(app.panel, Panel::Loading) {
        return;
      }
    }
    panic!("resolution outcome never arrived");
  }

  #[tokio::test]
  async fn submit_cycle_reaches_result() {
    let mut app = make_app(Arc::new(FixedResolver(Ok(video_media()))));
    app.input = "https://instagram.com/p/xyz".to_string();
    app.submit();
    assert!(matches!(app.panel, Panel::Loading));
    drain_pending(&mut app).await;
    assert!(matches!(app.panel, Panel::Result(_)));
  }

  #[tokio::test]
  async fn submit_cycle_reaches_error() {
    let mut app = make_app(Arc::new(FixedResolver(Err("private account"))));
    app.input = "https://instagr.am/p/xyz".to_string();
    app.submit();
    drain_pending(&mut app).await;
    match app.panel {
      Panel::Error(ref msg) => assert_eq!(msg, "private account"),
      ref other => panic!("expected error panel, got {other:?}"),
    }
  }
}
