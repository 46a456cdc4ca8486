//! Tile-grid US choropleth widget.
//!
//! Each state with a resolved postal code gets a fixed tile in an 11×8 grid
//! (the familiar square-tile cartogram), shaded by the selected metric
//! relative to the current snapshot's maximum. Records with an absent code or
//! an undefined metric value are counted as off-map / unshaded rather than
//! failing the render.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::domain::{EnrichedRecord, Metric};
use crate::geo::tile_position;
use crate::pipeline::metric_value;

/// Reds ramp, dark to bright; index 0 is "present but lowest bucket".
const RAMP: &[(u8, u8, u8)] = &[
    (64, 16, 16),
    (110, 24, 18),
    (158, 32, 20),
    (205, 48, 28),
    (238, 75, 43),
    (255, 110, 70),
];

/// A lightweight, render-only map description.
///
/// The widget is intentionally data-driven: the snapshot slice and metric are
/// computed outside the render call, which keeps `render()` focused on drawing
/// and the bucketing logic testable on its own.
pub struct UsTileMap<'a> {
    /// One snapshot date's records, table order.
    pub slice: &'a [&'a EnrichedRecord],
    pub metric: Metric,
    /// Postal code of the state highlighted in the detail panel.
    pub selected: Option<&'a str>,
}

impl Widget for UsTileMap<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 33 || area.height < 9 {
            buf.set_string(
                area.x,
                area.y,
                "Map area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let max = self
            .slice
            .iter()
            .filter_map(|r| metric_value(r, self.metric))
            .fold(0.0_f64, f64::max);

        // Reserve one row for the off-map note.
        let grid_height = area.height - 1;
        let tile_w = (area.width / 11).clamp(3, 8);
        let tile_h = (grid_height / 8).clamp(1, 3);

        let mut off_map = 0usize;
        for record in self.slice {
            let Some(code) = record.code else {
                off_map += 1;
                continue;
            };
            let Some((col, row)) = tile_position(code) else {
                off_map += 1;
                continue;
            };

            let value = metric_value(record, self.metric);
            let (bg, fg) = tile_colors(value, max);

            let x = area.x + col * tile_w;
            let y = area.y + row * tile_h;
            let selected = self.selected == Some(code);
            let style = if selected {
                Style::default().bg(Color::White).fg(Color::Black)
            } else {
                Style::default().bg(bg).fg(fg)
            };

            for dy in 0..tile_h {
                let blank = " ".repeat(tile_w.saturating_sub(1) as usize);
                buf.set_string(x, y + dy, &blank, style);
            }
            buf.set_string(x, y, code, style);
            if tile_h >= 2 {
                let label = value.map(short_value).unwrap_or_else(|| "-".to_string());
                let label: String = label.chars().take(tile_w.saturating_sub(1) as usize).collect();
                buf.set_string(x, y + 1, &label, style);
            }
        }

        if off_map > 0 {
            buf.set_string(
                area.x,
                area.y + area.height - 1,
                format!("{off_map} record(s) off-map (no tile for state)"),
                Style::default().fg(Color::DarkGray),
            );
        }
    }
}

/// Background/foreground colors for a tile.
///
/// Undefined values render gray (never as a zero bucket); defined values use
/// the red ramp scaled by the snapshot maximum.
fn tile_colors(value: Option<f64>, max: f64) -> (Color, Color) {
    let Some(value) = value else {
        return (Color::Rgb(50, 50, 50), Color::Gray);
    };
    let idx = ramp_index(value, max);
    let (r, g, b) = RAMP[idx];
    let fg = if idx >= RAMP.len() - 2 { Color::Black } else { Color::White };
    (Color::Rgb(r, g, b), fg)
}

/// Bucket a value into the ramp by its ratio to the snapshot maximum.
fn ramp_index(value: f64, max: f64) -> usize {
    if max <= 0.0 || value <= 0.0 {
        return 0;
    }
    let ratio = (value / max).clamp(0.0, 1.0);
    ((ratio * (RAMP.len() - 1) as f64).round() as usize).min(RAMP.len() - 1)
}

/// Compact value label that fits a tile: `987`, `12k`, `3.4M`, or `0.43` for
/// sub-1 proportions.
fn short_value(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value >= 10_000.0 {
        format!("{:.0}k", value / 1_000.0)
    } else if value >= 1_000.0 {
        format!("{:.1}k", value / 1_000.0)
    } else if value >= 10.0 || value == value.trunc() {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}
