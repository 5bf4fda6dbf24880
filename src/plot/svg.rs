//! Per-round SVG charts rendered with Plotters' SVG backend.
//!
//! Layout of an output directory after a demo run:
//!
//! ```text
//! round_001.svg
//! round_002.svg
//! ...
//! result.svg      (only when a round was accepted)
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use tracing::debug;

use crate::error::AppError;
use crate::plot::ChartData;

/// Writes chart files into one output directory.
#[derive(Debug, Clone)]
pub struct SvgWriter {
    dir: PathBuf,
    size: (u32, u32),
}

impl SvgWriter {
    /// Create `dir` if needed and remove `.svg` charts left by earlier runs.
    pub fn prepare(dir: &Path, size: (u32, u32)) -> Result<Self, AppError> {
        fs::create_dir_all(dir).map_err(|e| {
            AppError::new(4, format!("Failed to create output dir '{}': {e}", dir.display()))
        })?;
        let removed = clear_charts(dir)?;
        debug!(dir = %dir.display(), removed, "output directory ready");

        Ok(Self {
            dir: dir.to_path_buf(),
            size,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `round_NNN.svg` for the 1-based round index.
    pub fn write_round(&self, round: usize, chart: &ChartData) -> Result<PathBuf, AppError> {
        let path = self.dir.join(format!("round_{round:03}.svg"));
        draw_chart(&path, chart, self.size)?;
        Ok(path)
    }

    pub fn write_result(&self, chart: &ChartData) -> Result<PathBuf, AppError> {
        let path = self.dir.join("result.svg");
        draw_chart(&path, chart, self.size)?;
        Ok(path)
    }
}

/// Delete every `*.svg` file directly inside `dir`. Returns how many were removed.
pub fn clear_charts(dir: &Path) -> Result<usize, AppError> {
    let io_err =
        |e: std::io::Error| AppError::new(4, format!("Failed to clear '{}': {e}", dir.display()));

    let mut removed = 0;
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let is_svg = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
        if is_svg && path.is_file() {
            fs::remove_file(&path).map_err(io_err)?;
            removed += 1;
        }
    }
    Ok(removed)
}

fn chart_err(e: impl std::fmt::Display) -> AppError {
    AppError::new(4, format!("Chart rendering error: {e}"))
}

/// Render `chart` into a standalone SVG file.
pub fn draw_chart(path: &Path, chart: &ChartData, size: (u32, u32)) -> Result<(), AppError> {
    let [x0, x1] = chart.x_bounds;
    let [y0, y1] = chart.y_bounds;

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut ctx = ChartBuilder::on(&root)
        .caption(&chart.title, ("sans-serif", 24))
        .margin(12)
        .set_label_area_size(LabelAreaPosition::Left, 48)
        .set_label_area_size(LabelAreaPosition::Bottom, 32)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(chart_err)?;

    ctx.configure_mesh()
        .light_line_style(&RGBColor(235, 235, 235))
        .bold_line_style(&RGBColor(190, 190, 190))
        .x_desc("x")
        .y_desc("y")
        .draw()
        .map_err(chart_err)?;

    let inlier_color = RGBColor(0, 204, 0);
    let outlier_color = RGBColor(0, 0, 204);
    let sample_color = RGBColor(204, 0, 0);

    ctx.draw_series(
        chart
            .inliers
            .iter()
            .map(|&p| Circle::new(p, 3, inlier_color.mix(0.4).filled())),
    )
    .map_err(chart_err)?
    .label("Inlier points")
    .legend(move |(x, y)| Circle::new((x, y), 3, inlier_color.filled()));

    ctx.draw_series(
        chart
            .outliers
            .iter()
            .map(|&p| Circle::new(p, 3, outlier_color.mix(0.4).filled())),
    )
    .map_err(chart_err)?
    .label("Outlier points")
    .legend(move |(x, y)| Circle::new((x, y), 3, outlier_color.filled()));

    ctx.draw_series(
        chart
            .sample
            .iter()
            .map(|&p| Circle::new(p, 5, sample_color.filled())),
    )
    .map_err(chart_err)?
    .label("Selected points")
    .legend(move |(x, y)| Circle::new((x, y), 5, sample_color.filled()));

    for (i, segment) in chart.curve.iter().enumerate() {
        let series = ctx
            .draw_series(LineSeries::new(segment.iter().copied(), &sample_color))
            .map_err(chart_err)?;
        if i == 0 {
            series
                .label("Model")
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], &sample_color));
        }
    }

    ctx.configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Model, Point, RoundModel, RoundOutcome};

    fn chart() -> ChartData {
        let outcome = RoundOutcome {
            sample: vec![Point::new(0.0, 1.0), Point::new(4.0, 9.0)],
            model: RoundModel::Fitted(Model::Line {
                slope: 2.0,
                intercept: 1.0,
            }),
            inliers: vec![Point::new(2.0, 5.2)],
            outliers: vec![Point::new(1.0, 8.0), Point::new(3.0, -2.0)],
        };
        ChartData::from_round(&outcome, "RANSAC round 1")
    }

    #[test]
    fn prepare_creates_dir_and_clears_old_charts() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("charts");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("round_009.svg"), "<svg/>").unwrap();
        fs::write(out.join("notes.txt"), "keep me").unwrap();

        let writer = SvgWriter::prepare(&out, (400, 300)).unwrap();
        assert!(!out.join("round_009.svg").exists());
        assert!(out.join("notes.txt").exists());
        assert_eq!(writer.dir(), out.as_path());

        let fresh = tmp.path().join("new/nested");
        SvgWriter::prepare(&fresh, (400, 300)).unwrap();
        assert!(fresh.is_dir());
    }

    #[test]
    fn writes_numbered_rounds_and_result() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = SvgWriter::prepare(tmp.path(), (400, 300)).unwrap();

        let first = writer.write_round(1, &chart()).unwrap();
        let result = writer.write_result(&chart()).unwrap();
        assert_eq!(first.file_name().unwrap(), "round_001.svg");
        assert_eq!(result.file_name().unwrap(), "result.svg");

        let svg = fs::read_to_string(&first).unwrap();
        assert!(svg.contains("<svg"), "not an svg document");
        assert!(svg.contains("RANSAC round 1"));
    }
}
