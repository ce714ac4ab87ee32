//! PNG rendering via plotters, then hand-off to the OS image viewer.

use crate::render::{Figure, Panel, PlotSink, TimeAxis};
use anyhow::Context;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// 16x10 inches at 100 dpi.
pub const FIGURE_SIZE: (u32, u32) = (1600, 1000);

pub struct PngSink {
    pub out_dir: PathBuf,
    pub open_viewer: bool,
}

impl PngSink {
    pub fn new(open_viewer: bool) -> Self {
        Self {
            out_dir: PathBuf::from("."),
            open_viewer,
        }
    }

    pub fn path_for(&self, figure: &Figure) -> PathBuf {
        self.out_dir.join(format!("{}.png", figure.name))
    }
}

impl PlotSink for PngSink {
    fn show(&self, figure: &Figure) -> anyhow::Result<()> {
        let path = self.path_for(figure);
        render_png(figure, &path).with_context(|| format!("render {}", path.display()))?;
        info!(file = %path.display(), "saved plot");

        if self.open_viewer {
            open_in_viewer(&path);
        }
        Ok(())
    }
}

pub fn render_png(figure: &Figure, path: &Path) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let areas = root.split_evenly((figure.panels.len().max(1), 1));
    for (panel, area) in figure.panels.iter().zip(areas.iter()) {
        draw_panel(area, panel, figure.axis)?;
    }

    root.present()?;
    Ok(())
}

fn draw_panel(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    panel: &Panel,
    axis: TimeAxis,
) -> anyhow::Result<()> {
    let (x_range, y_range) = ranges(&panel.points);

    let mut chart = ChartBuilder::on(area)
        .caption(&panel.title, ("sans-serif", 18))
        .margin(8)
        .x_label_area_size(36)
        .y_label_area_size(64)
        .build_cartesian_2d(x_range, y_range)?;

    let x_fmt = |x: &f64| axis.format_tick(*x);
    chart
        .configure_mesh()
        .x_desc(panel.x_label.as_str())
        .y_desc(panel.y_label.as_str())
        .x_label_formatter(&x_fmt)
        .draw()?;

    chart.draw_series(LineSeries::new(panel.points.iter().copied(), &BLUE))?;
    Ok(())
}

/// Data bounds, widened so a flat or empty series still gets a usable axis.
fn ranges(points: &[(f64, f64)]) -> (Range<f64>, Range<f64>) {
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let mut y_max = 0.0_f64;
    for &(x, y) in points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_max = y_max.max(y);
    }
    if !x_min.is_finite() || !x_max.is_finite() {
        (x_min, x_max) = (0.0, 1.0);
    } else if x_min == x_max {
        (x_min, x_max) = (x_min - 0.5, x_max + 0.5);
    }
    if y_max <= 0.0 || !y_max.is_finite() {
        y_max = 1.0;
    }
    (x_min..x_max, 0.0..y_max * 1.05)
}

/// Ask the host OS to open `path` in its default viewer. Failures are logged
/// only; the image is already on disk.
pub fn open_in_viewer(path: &Path) {
    let status = if cfg!(target_os = "macos") {
        Command::new("open").arg(path).status()
    } else if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", ""]).arg(path).status()
    } else {
        Command::new("xdg-open").arg(path).status()
    };

    match status {
        Ok(s) if s.success() => debug!(file = %path.display(), "opened viewer"),
        Ok(s) => warn!(file = %path.display(), status = %s, "image viewer exited with failure"),
        Err(e) => warn!(file = %path.display(), error = %e, "could not launch image viewer"),
    }
}
