//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks of a profit curve in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - profit curve: `-` line through `o` grid points
//! - optimum: `*`

use crate::report::StudySummary;

/// Plot the aggregate profit curve of a study, marking the optimum.
pub fn render_profit_plot(summary: &StudySummary, width: usize, height: usize) -> String {
    let points: Vec<(f64, f64)> = summary.market.iter().map(|p| (p.price, p.total_profit)).collect();
    let optimum = summary.market_optimum.as_ref().map(|p| (p.price, p.total_profit));
    render_curve(&points, optimum, width, height)
}

/// Plot `(price, profit)` points joined by line segments.
pub fn render_curve(points: &[(f64, f64)], optimum: Option<(f64, f64)>, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let Some((x_min, x_max)) = range(points.iter().map(|p| p.0)) else {
        return "Plot: (not enough points)\n".to_string();
    };
    let (y_min, y_max) = range(points.iter().map(|p| p.1)).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    let mut prev = None;
    for &(x, y) in points {
        let cx = map_x(x, x_min, x_max, width);
        let cy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(&mut grid, x0, y0, cx, cy, '-');
        }
        prev = Some((cx, cy));
    }
    for &(x, y) in points {
        grid[map_y(y, y_min, y_max, height)][map_x(x, x_min, x_max, width)] = 'o';
    }
    if let Some((x, y)) = optimum {
        grid[map_y(y, y_min, y_max, height)][map_x(x, x_min, x_max, width)] = '*';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: price=[{x_min:.2}, {x_max:.2}] | profit=[{y_min:.2}, {y_max:.2}]\n"
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

fn range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() && max > min {
        Some((min, max))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_golden_snapshot_small() {
        let points = [(0.0, 0.0), (5.0, 10.0), (9.0, 0.0)];
        let txt = render_curve(&points, Some((5.0, 10.0)), 10, 5);
        let expected = concat!(
            "Plot: price=[0.00, 9.00] | profit=[-0.50, 10.50]\n",
            "     *\n",
            "    - -\n",
            "  --   -\n",
            " -      -\n",
            "o        o\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn degenerate_input_does_not_panic() {
        assert_eq!(render_curve(&[], None, 10, 5), "Plot: (not enough points)\n");
        assert_eq!(render_curve(&[(1.0, 1.0)], None, 10, 5), "Plot: (not enough points)\n");
    }
}
