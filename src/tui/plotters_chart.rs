//! Plotters-powered round chart widget for Ratatui.
//!
//! Plotters output is rendered into the Ratatui buffer through
//! `plotters-ratatui-backend`, so the TUI and the SVG files share one chart
//! description ([`ChartData`]).

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::plot::ChartData;

/// Render-only view of one chart; all series and bounds are precomputed.
pub struct RoundChart<'a> {
    pub chart: &'a ChartData,
}

impl Widget for RoundChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a tiny area; show a hint instead.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.chart.x_bounds;
        let [y0, y1] = self.chart.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let chart = self.chart;
        let widget = widget_fn(move |root| {
            let mut ctx = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res; tick labels are drawn by the caller.
                .set_label_area_size(LabelAreaPosition::Left, 0)
                .set_label_area_size(LabelAreaPosition::Bottom, 0)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            ctx.configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .axis_style(&WHITE)
                .draw()?;

            let model_color = RGBColor(255, 255, 0); // yellow
            let outlier_color = RGBColor(90, 90, 255); // blue
            let inlier_color = RGBColor(0, 255, 0); // green
            let sample_color = RGBColor(255, 0, 0); // red

            for segment in &chart.curve {
                ctx.draw_series(LineSeries::new(segment.iter().copied(), &model_color))?;
            }

            // `Pixel` rather than `Circle`: the ratatui backend scales circle
            // radii in canvas units, which blows markers up to huge discs.
            ctx.draw_series(chart.outliers.iter().map(|&p| Pixel::new(p, outlier_color)))?;
            ctx.draw_series(chart.inliers.iter().map(|&p| Pixel::new(p, inlier_color)))?;
            ctx.draw_series(chart.sample.iter().map(|&p| Pixel::new(p, sample_color)))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}
