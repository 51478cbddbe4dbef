use ratatui::style::Color;

/// A named color palette for the UI.
pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub accent: Color,
  pub muted: Color,
  pub border: Color,
  pub status: Color,
  pub error: Color,
  pub ok: Color,
  pub key_fg: Color,
  pub key_bg: Color,
}

pub static THEMES: [Theme; 3] = [
  Theme {
    name: "midnight",
    bg: Color::Rgb(18, 18, 24),
    fg: Color::Rgb(220, 220, 228),
    accent: Color::Rgb(225, 48, 108),
    muted: Color::Rgb(110, 110, 125),
    border: Color::Rgb(60, 60, 75),
    status: Color::Rgb(130, 170, 255),
    error: Color::Rgb(235, 87, 87),
    ok: Color::Rgb(111, 207, 151),
    key_fg: Color::Rgb(18, 18, 24),
    key_bg: Color::Rgb(110, 110, 125),
  },
  Theme {
    name: "paper",
    bg: Color::Rgb(248, 246, 240),
    fg: Color::Rgb(40, 40, 46),
    accent: Color::Rgb(193, 53, 132),
    muted: Color::Rgb(140, 138, 130),
    border: Color::Rgb(200, 198, 190),
    status: Color::Rgb(64, 110, 200),
    error: Color::Rgb(190, 46, 46),
    ok: Color::Rgb(46, 140, 90),
    key_fg: Color::Rgb(248, 246, 240),
    key_bg: Color::Rgb(140, 138, 130),
  },
  Theme {
    name: "terminal",
    bg: Color::Reset,
    fg: Color::Reset,
    accent: Color::Magenta,
    muted: Color::DarkGray,
    border: Color::DarkGray,
    status: Color::Blue,
    error: Color::Red,
    ok: Color::Green,
    key_fg: Color::Black,
    key_bg: Color::DarkGray,
  },
];
