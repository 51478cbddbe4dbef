//! Inline preview of a resolved image, painted as true-color half-block
//! cells. Each terminal cell holds two vertical pixels via "▀" with separate
//! fg/bg colors.

use anyhow::{Context, Result, anyhow};
use image::{DynamicImage, imageops::FilterType};
use ratatui::{
  buffer::Buffer,
  layout::Rect,
  style::{Color, Style},
  widgets::Widget,
};

/// Resize an image so it fits a cell grid of `w_cells` x `h_cells`,
/// preserving aspect ratio. One cell column is one pixel wide; one cell row
/// holds two pixel rows.
pub fn resize_for_cells(image: &DynamicImage, w_cells: u16, h_cells: u16) -> DynamicImage {
  let target_w = (w_cells as u32).max(1);
  let target_h = (h_cells as u32 * 2).max(1);
  image.resize(target_w, target_h, FilterType::Lanczos3)
}

pub struct PreviewWidget<'a> {
  /// Already resized by the caller via `resize_for_cells`.
  pub image: &'a DynamicImage,
}

impl Widget for PreviewWidget<'_> {
  fn render(self, area: Rect, buf: &mut Buffer) {
    if area.is_empty() {
      return;
    }
    let rgb = self.image.to_rgb8();
    let img_w = rgb.width().min(area.width as u32);
    let img_h = rgb.height();
    let cell_h = img_h.div_ceil(2).min(area.height as u32);
    let offset_x = (area.width as u32).saturating_sub(img_w) / 2;
    let offset_y = (area.height as u32).saturating_sub(cell_h) / 2;

    for y in 0..cell_h {
      for x in 0..img_w {
        let upper = rgb.get_pixel(x, y * 2);
        let lower_y = y * 2 + 1;
        let fg = Color::Rgb(upper[0], upper[1], upper[2]);
        let bg = if lower_y < img_h {
          let lower = rgb.get_pixel(x, lower_y);
          Color::Rgb(lower[0], lower[1], lower[2])
        } else {
          Color::Reset
        };
        buf.set_string(
          area.x.saturating_add((offset_x + x).min(u16::MAX as u32) as u16),
          area.y.saturating_add((offset_y + y).min(u16::MAX as u32) as u16),
          "▀",
          Style::default().fg(fg).bg(bg),
        );
      }
    }
  }
}

/// Fetch the resolved image and decode it for preview rendering.
pub async fn fetch_preview(client: &reqwest::Client, url: &str) -> Result<DynamicImage> {
  let response = client.get(url).send().await.with_context(|| format!("Failed to fetch preview from {}", url))?;
  if !response.status().is_success() {
    return Err(anyhow!("Preview fetch failed with status {}", response.status()));
  }
  let bytes = response.bytes().await.with_context(|| format!("Failed to read preview bytes from {}", url))?;
  image::load_from_memory(&bytes).with_context(|| format!("Failed to decode preview image (URL: {})", url))
}
