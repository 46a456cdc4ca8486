//! Plotters-powered national trend chart for Ratatui.
//!
//! Why Plotters instead of Ratatui's built-in `Chart` widget?
//! - nicer axis + mesh rendering
//! - less manual work for ticks/labels
//! - easy to extend later (legend, annotations, exportable PNG/SVG backends, etc.)
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use chrono::{Duration, NaiveDate};
use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A lightweight, render-only chart description.
///
/// X values are day offsets from `first_date` (so the axis formatter can print
/// calendar dates); Y is the national cumulative total.
pub struct TrendChart<'a> {
    /// National total per date, ascending.
    pub line: &'a [(f64, f64)],
    /// Day offset of the currently selected date (drawn as a vertical marker).
    pub marker_x: f64,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub first_date: NaiveDate,
}

impl Widget for TrendChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a
        // chart. In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 6 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite())
            || x1 <= x0
            || y1 <= y0
        {
            return;
        }

        let first_date = self.first_date;
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                // Small margins keep the chart readable without wasting space.
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 2)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            // Axes + tick labels; mesh lines disabled to reduce clutter in
            // low-resolution terminal rendering.
            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_labels(6)
                .y_labels(4)
                .x_label_formatter(&|v| {
                    (first_date + Duration::days(v.round() as i64))
                        .format("%m-%d")
                        .to_string()
                })
                .y_label_formatter(&|v| fmt_count(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            // National trend line.
            chart.draw_series(LineSeries::new(
                self.line.iter().copied(),
                &RGBColor(0, 255, 255),
            ))?;

            // Vertical marker at the selected date.
            let marker = [(self.marker_x, y0), (self.marker_x, y1)];
            chart.draw_series(LineSeries::new(
                marker.iter().copied(),
                &RGBColor(255, 255, 0),
            ))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

fn fmt_count(v: f64) -> String {
    if v >= 1_000_000.0 {
        format!("{:.1}M", v / 1_000_000.0)
    } else if v >= 1_000.0 {
        format!("{:.0}k", v / 1_000.0)
    } else {
        format!("{v:.0}")
    }
}
