use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Padding, Paragraph},
};

use crate::app::{App, InputFeedback, Panel};
use crate::preview::{PreviewWidget, resize_for_cells};
use crate::resolver::MediaKind;
use crate::theme::Theme;

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();
  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let [header_area, main_area, status_area, input_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Min(3),
    Constraint::Length(1),
    Constraint::Length(3),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  render_header(frame, theme, header_area);
  render_panel(frame, app, main_area);
  render_status(frame, app, status_area);
  render_input(frame, app, input_area);
  render_footer(frame, app, footer_area);
}

fn render_header(frame: &mut Frame, theme: &Theme, area: Rect) {
  let left = Line::from(Span::styled(" ◆ gramgrab ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)));
  frame.render_widget(left, area);

  let version = format!("v{} ", env!("CARGO_PKG_VERSION"));
  let right = Line::from(Span::styled(&version, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(version.len() as u16), width: version.len() as u16, ..area };
  frame.render_widget(right, right_area);
}

/// Render exactly one of the four mutually exclusive regions.
fn render_panel(frame: &mut Frame, app: &mut App, area: Rect) {
  match app.panel {
    Panel::Idle => render_idle(frame, app.theme(), area),
    Panel::Loading => render_loading(frame, app.theme(), area),
    Panel::Error(_) => render_error(frame, app, area),
    Panel::Result(_) => render_result(frame, app, area),
  }
}

fn render_idle(frame: &mut Frame, theme: &Theme, area: Rect) {
  let text = vec![
    Line::from(""),
    Line::from(Span::styled("◆  gramgrab", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))),
    Line::from(""),
    Line::from(Span::styled("Download Instagram photos and videos. In the terminal.", Style::default().fg(theme.fg))),
    Line::from(""),
    Line::from(Span::styled("Paste a post URL below and press Enter.", Style::default().fg(theme.muted))),
  ];
  let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
    Block::bordered()
      .border_type(ratatui::widgets::BorderType::Rounded)
      .border_style(Style::default().fg(theme.border)),
  );
  frame.render_widget(paragraph, area);
}

fn render_loading(frame: &mut Frame, theme: &Theme, area: Rect) {
  let text = vec![
    Line::from(""),
    Line::from(Span::styled("⏳ Resolving media…", Style::default().fg(theme.status).add_modifier(Modifier::BOLD))),
    Line::from(""),
    Line::from(Span::styled("Asking the resolution service for a direct link.", Style::default().fg(theme.muted))),
  ];
  let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
    Block::bordered()
      .title(" Loading ")
      .title_style(Style::default().fg(theme.status))
      .border_type(ratatui::widgets::BorderType::Rounded)
      .border_style(Style::default().fg(theme.border)),
  );
  frame.render_widget(paragraph, area);
}

fn render_error(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let Panel::Error(ref message) = app.panel else { return };
  let text = vec![
    Line::from(""),
    Line::from(Span::styled(format!("⚠  {}", message), Style::default().fg(theme.error).add_modifier(Modifier::BOLD))),
    Line::from(""),
    Line::from(Span::styled("Correct the URL and press Enter to retry.", Style::default().fg(theme.muted))),
  ];
  let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
    Block::bordered()
      .title(" Error ")
      .title_style(Style::default().fg(theme.error))
      .border_type(ratatui::widgets::BorderType::Rounded)
      .border_style(Style::default().fg(theme.error)),
  );
  frame.render_widget(paragraph, area);
}

fn render_result(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let Panel::Result(card) = &app.panel else { return };
  let card = card.clone();

  let [mut media_area, info_area] =
    Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(area);
  media_area = Rect { y: media_area.y + 1, height: media_area.height.saturating_sub(2), ..media_area };

  match card.media.kind {
    MediaKind::Image => render_image_slot(frame, app, &card.media.url, media_area),
    MediaKind::Video => render_video_slot(frame, theme, media_area),
  }

  let info_block = Block::bordered()
    .title(Span::styled(" Result ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)))
    .border_type(ratatui::widgets::BorderType::Rounded)
    .border_style(Style::default().fg(theme.border))
    .padding(Padding::horizontal(1));

  let inner_w = info_area.width.saturating_sub(4) as usize;
  let lines = vec![
    Line::from(""),
    Line::from(vec![
      Span::styled("Kind      ", Style::default().fg(theme.muted)),
      Span::styled(card.media.kind.label(), Style::default().fg(theme.fg).add_modifier(Modifier::BOLD)),
    ]),
    Line::from(""),
    Line::from(vec![
      Span::styled("Save as   ", Style::default().fg(theme.muted)),
      Span::styled(truncate_str(&card.filename, inner_w.saturating_sub(10)), Style::default().fg(theme.fg)),
    ]),
    Line::from(""),
    Line::from(Span::styled(
      truncate_str(&card.media.url, inner_w),
      Style::default().fg(theme.accent).add_modifier(Modifier::UNDERLINED),
    )),
    Line::from(""),
    Line::from(Span::styled("Press Ctrl+D to save the file.", Style::default().fg(theme.muted))),
  ];
  frame.render_widget(Paragraph::new(lines).block(info_block), info_area);
}

/// The media slot for images: inline preview once fetched, placeholder text
/// until then. The resized copy is cached per (url, area) like any other
/// draw-loop-hot image work.
fn render_image_slot(frame: &mut Frame, app: &mut App, url: &str, area: Rect) {
  let theme = app.theme();
  if let Some((ref preview_url, ref image)) = app.preview
    && preview_url == url
  {
    let inner = Rect {
      x: area.x + 1,
      y: area.y + 1,
      width: area.width.saturating_sub(2),
      height: area.height.saturating_sub(2),
    };
    let needs_resize = match &app.resized_preview {
      Some((u, w, h, _)) => u != url || *w != inner.width || *h != inner.height,
      None => true,
    };
    if needs_resize {
      let resized = resize_for_cells(image, inner.width, inner.height);
      app.resized_preview = Some((url.to_string(), inner.width, inner.height, resized));
    }

    frame.render_widget(
      Block::bordered()
        .border_type(ratatui::widgets::BorderType::Rounded)
        .border_style(Style::default().fg(theme.border)),
      area,
    );
    if let Some((_, _, _, ref resized)) = app.resized_preview {
      frame.render_widget(PreviewWidget { image: resized }, inner);
    }
  } else {
    let text = vec![Line::from(""), Line::from(Span::styled("fetching preview…", Style::default().fg(theme.muted)))];
    frame.render_widget(
      Paragraph::new(text).alignment(Alignment::Center).block(
        Block::bordered()
          .border_type(ratatui::widgets::BorderType::Rounded)
          .border_style(Style::default().fg(theme.border)),
      ),
      area,
    );
  }
}

/// Videos get a labeled card; playback happens in whatever the file is
/// opened with after download.
fn render_video_slot(frame: &mut Frame, theme: &Theme, area: Rect) {
  let text = vec![
    Line::from(""),
    Line::from(Span::styled("▶", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))),
    Line::from(""),
    Line::from(Span::styled("video", Style::default().fg(theme.fg))),
  ];
  frame.render_widget(
    Paragraph::new(text).alignment(Alignment::Center).block(
      Block::bordered()
        .border_type(ratatui::widgets::BorderType::Rounded)
        .border_style(Style::default().fg(theme.border)),
    ),
    area,
  );
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if app.saving {
    (" ⏳ Saving…".to_string(), Style::default().fg(theme.status))
  } else if let Some(msg) = &app.info_message {
    (format!(" ✓ {}", msg), Style::default().fg(theme.ok))
  } else {
    (" Ready".to_string(), Style::default().fg(theme.muted))
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_input(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  // Live validation feedback: border recolors per keystroke, nothing else changes.
  let border_color = match app.input_feedback() {
    InputFeedback::Neutral => theme.border,
    InputFeedback::Valid => theme.ok,
    InputFeedback::Invalid => theme.error,
  };
  let input_block = Block::bordered()
    .title(" Instagram URL ")
    .title_style(Style::default().fg(border_color))
    .border_type(ratatui::widgets::BorderType::Rounded)
    .border_style(Style::default().fg(border_color))
    .padding(Padding::horizontal(1));

  let inner_w = area.width.saturating_sub(4) as usize;
  let cursor_col = display_width(&app.input, app.cursor_position);

  if cursor_col < app.input_scroll {
    app.input_scroll = cursor_col;
  } else if cursor_col >= app.input_scroll + inner_w {
    app.input_scroll = cursor_col.saturating_sub(inner_w) + 1;
  }

  let visible: String = app
    .input
    .chars()
    .scan(0usize, |col, c| {
      let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= app.input_scroll)
    .take_while(|(start, _, _)| *start < app.input_scroll + inner_w)
    .map(|(_, _, c)| c)
    .collect();

  let paragraph = Paragraph::new(visible).style(Style::default().fg(theme.fg)).block(input_block);
  frame.render_widget(paragraph, area);

  let cursor_x = area.x + 2 + (cursor_col - app.input_scroll) as u16;
  frame.set_cursor_position((cursor_x, area.y + 1));
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let mut keys: Vec<(&str, &str)> = vec![("Enter", "Resolve")];
  if matches!(app.panel, Panel::Result(_)) {
    keys.push(("^d", "Save"));
  }
  keys.push(("^t", "Theme"));
  if app.input.is_empty() {
    keys.push(("Esc", "Quit"));
  } else {
    keys.push(("Esc", "Clear"));
  }

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw("  "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(theme_label.len() as u16), width: theme_label.len() as u16, ..area };
  frame.render_widget(right, right_area);
}
