//! ASCII plotting for terminal output.
//!
//! Deliberately simple (fixed-size grid) so output is deterministic and easy
//! to golden-test.
//!
//! Plot elements:
//! - inliers: `o`
//! - outliers: `.`
//! - sampled points: `X`
//! - model: `-` (vertical lines: `|`)

use crate::domain::{FitResult, Model, Point, RoundOutcome};
use crate::plot::{pad_range, value_range};

/// Point layers of one chart, drawn in this order (later wins a cell).
#[derive(Debug, Clone, Copy)]
struct Layers<'a> {
    outliers: &'a [Point],
    inliers: &'a [Point],
    sample: &'a [Point],
}

impl Layers<'_> {
    fn all(&self) -> impl Iterator<Item = &Point> {
        self.outliers.iter().chain(self.inliers).chain(self.sample)
    }
}

/// Render a single round: its sample, its partition and (if any) its model.
pub fn render_round(outcome: &RoundOutcome, width: usize, height: usize) -> String {
    let layers = Layers {
        outliers: &outcome.outliers,
        inliers: &outcome.inliers,
        sample: &outcome.sample,
    };
    render_plot(layers, outcome.model.model(), width, height)
}

/// Render the terminal result of a fit.
///
/// `points` is only used when no model was accepted; they are drawn as
/// outliers.
pub fn render_fit(result: &FitResult, points: &[Point], width: usize, height: usize) -> String {
    match result {
        FitResult::Accepted {
            model,
            sample,
            inliers,
            outliers,
            ..
        } => render_plot(
            Layers {
                outliers,
                inliers,
                sample,
            },
            Some(model),
            width,
            height,
        ),
        FitResult::NotFound { .. } => render_plot(
            Layers {
                outliers: points,
                inliers: &[],
                sample: &[],
            },
            None,
            width,
            height,
        ),
    }
}

fn render_plot(layers: Layers<'_>, model: Option<&Model>, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = pad_range(value_range(layers.all().map(|p| p.x)).unwrap_or((0.0, 1.0)), 0.0);
    let (y_min, y_max) = pad_range(value_range(layers.all().map(|p| p.y)).unwrap_or((0.0, 1.0)), 0.05);

    let mut grid = vec![vec![' '; width]; height];
    let frame = Frame {
        x_min,
        x_max,
        y_min,
        y_max,
        width,
        height,
    };

    // Model first so points overlay it.
    if let Some(model) = model {
        draw_model(&mut grid, model, &frame);
    }

    for (points, ch) in [(layers.outliers, '.'), (layers.inliers, 'o'), (layers.sample, 'X')] {
        for p in points {
            let col = frame.col(p.x).clamp(0, width as isize - 1) as usize;
            let row = frame.row(p.y).clamp(0, height as isize - 1) as usize;
            grid[row][col] = ch;
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: x=[{x_min:.3}, {x_max:.3}] | y=[{y_min:.3}, {y_max:.3}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

/// Data-to-cell mapping. Cells may fall outside the grid; drawing clips them.
#[derive(Debug, Clone, Copy)]
struct Frame {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    width: usize,
    height: usize,
}

impl Frame {
    fn col(&self, x: f64) -> isize {
        let u = (x - self.x_min) / (self.x_max - self.x_min);
        to_cell(u * (self.width as f64 - 1.0))
    }

    fn row(&self, y: f64) -> isize {
        let u = (y - self.y_min) / (self.y_max - self.y_min);
        // y max is row 0
        to_cell((self.height as f64 - 1.0) * (1.0 - u))
    }
}

fn to_cell(v: f64) -> isize {
    // Far off-grid values only need to stay off-grid.
    v.round().clamp(-1e6, 1e6) as isize
}

fn draw_model(grid: &mut [Vec<char>], model: &Model, frame: &Frame) {
    if let Model::VerticalLine { x } = *model {
        let col = frame.col(x);
        for row in 0..frame.height as isize {
            put(grid, col, row, '|');
        }
        return;
    }

    let n = frame.width.max(2);
    let rows = frame.height as isize;
    let mut prev: Option<(isize, isize)> = None;
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let x = frame.x_min + u * (frame.x_max - frame.x_min);
        let Some(y) = model.predict(x) else { continue };
        // One row past either edge keeps the slope visible without long walks.
        let cell = (frame.col(x), frame.row(y).clamp(-1, rows));
        let (x0, y0) = prev.unwrap_or(cell);
        let both_above = y0 < 0 && cell.1 < 0;
        let both_below = y0 >= rows && cell.1 >= rows;
        if !(both_above || both_below) {
            draw_line(grid, x0, y0, cell.0, cell.1, '-');
        }
        prev = Some(cell);
    }
}

fn put(grid: &mut [Vec<char>], col: isize, row: isize, ch: char) {
    if row < 0 || col < 0 {
        return;
    }
    if let Some(cell) = grid
        .get_mut(row as usize)
        .and_then(|r| r.get_mut(col as usize))
    {
        if *cell == ' ' {
            *cell = ch;
        }
    }
}

/// Integer line drawing (Bresenham), clipped to the grid.
fn draw_line(grid: &mut [Vec<char>], x0: isize, y0: isize, x1: isize, y1: isize, ch: char) {
    let (mut x, mut y) = (x0, y0);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put(grid, x, y, ch);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
