//! Scatter-plot rendering to PNG.
//!
//! Layout follows the usual figure conventions: title above the axes, tick
//! labels and axis labels outside the frame, grid lines at tick positions
//! behind the markers.

pub mod font;

use std::path::Path;

use image::{ImageFormat, Rgb, RgbImage};
use log::{debug, info};

use crate::color::{blend, hsl_to_rgb, BACKGROUND, FOREGROUND, GRID, MARKER_HSL};
use crate::data::model::Dataset;
use font::{draw_text, text_height, text_width};

/// Appearance of the exported scatter plot.
#[derive(Debug, Clone)]
pub struct PlotOptions {
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Marker opacity in `0..=1`
    pub alpha: f32,
    /// Marker radius in pixels
    pub marker_radius: u32,
    /// Whether to draw grid lines at the ticks
    pub grid: bool,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            title: "Scatter Plot of Data".to_string(),
            x_label: "X".to_string(),
            y_label: "Y".to_string(),
            alpha: 0.6,
            marker_radius: 4,
            grid: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Axis scaling
// ---------------------------------------------------------------------------

/// A data interval mapped onto a pixel interval.
#[derive(Debug, Clone, Copy)]
struct Axis {
    min: f64,
    max: f64,
    pixel_start: f64,
    pixel_end: f64,
}

impl Axis {
    fn project(&self, v: f64) -> f64 {
        self.pixel_start + (v - self.min) / (self.max - self.min) * (self.pixel_end - self.pixel_start)
    }
}

/// Finite min/max padded by 5% on each side; `(0, 1)` with no finite data.
/// A single repeated value is padded by 5% of its magnitude (at least 0.5).
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        return (0.0, 1.0);
    }
    if lo == hi {
        let pad = (0.05 * lo.abs()).max(0.5);
        return (lo - pad, hi + pad);
    }
    let pad = 0.05 * (hi - lo);
    (lo - pad, hi + pad)
}

/// Step from {1, 2, 5} × 10^k giving roughly `target` ticks over `span`.
fn nice_step(span: f64, target: usize) -> f64 {
    let raw = span / target.max(1) as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let residual = raw / magnitude;
    let nice = if residual < 1.5 {
        1.0
    } else if residual < 3.0 {
        2.0
    } else if residual < 7.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Most decimals a tick label is printed with.
const MAX_TICK_DECIMALS: usize = 12;

/// Tick positions inside `[min, max]` with their labels. Empty when the
/// range is too narrow (relative to its magnitude) to place distinct ticks.
fn ticks(min: f64, max: f64) -> Vec<(f64, String)> {
    let step = nice_step(max - min, 6);
    if !step.is_finite() || step <= 0.0 {
        return Vec::new();
    }
    let (first, last) = ((min / step).ceil(), (max / step).floor());
    if !(first.is_finite() && last.is_finite()) || last - first > 100.0 {
        return Vec::new();
    }
    let decimals = ((-(step.log10() + 1e-9).floor()).max(0.0) as usize).min(MAX_TICK_DECIMALS);
    (first as i64..=last as i64)
        .map(|k| {
            let v = k as f64 * step;
            (v, format!("{:.*}", decimals, if k == 0 { 0.0 } else { v }))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Drawing primitives
// ---------------------------------------------------------------------------

fn hline(img: &mut RgbImage, x0: u32, x1: u32, y: u32, color: Rgb<u8>) {
    if y >= img.height() {
        return;
    }
    for x in x0..=x1.min(img.width().saturating_sub(1)) {
        img.put_pixel(x, y, color);
    }
}

fn vline(img: &mut RgbImage, x: u32, y0: u32, y1: u32, color: Rgb<u8>) {
    if x >= img.width() {
        return;
    }
    for y in y0..=y1.min(img.height().saturating_sub(1)) {
        img.put_pixel(x, y, color);
    }
}

/// Alpha-blended filled disc, clipped to `clip = (x0, y0, x1, y1)`.
fn disc(
    img: &mut RgbImage,
    cx: f64,
    cy: f64,
    radius: u32,
    color: Rgb<u8>,
    alpha: f32,
    clip: (u32, u32, u32, u32),
) {
    let r = radius as f64;
    let (x0, y0, x1, y1) = clip;
    let left = (cx - r).floor().max(x0 as f64) as u32;
    let right = (cx + r).ceil().min(x1 as f64) as u32;
    let top = (cy - r).floor().max(y0 as f64) as u32;
    let bottom = (cy + r).ceil().min(y1 as f64) as u32;
    for y in top..=bottom {
        for x in left..=right {
            let dx = x as f64 + 0.5 - cx;
            let dy = y as f64 + 0.5 - cy;
            if dx * dx + dy * dy <= r * r {
                let base = *img.get_pixel(x, y);
                img.put_pixel(x, y, blend(base, color, alpha));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Scatter plot
// ---------------------------------------------------------------------------

/// Rasterize a scatter plot of the dataset's `(x, y)` rows.
///
/// Rows with a non-finite coordinate are skipped.
pub fn render_scatter(dataset: &Dataset, options: &PlotOptions) -> RgbImage {
    let (width, height) = (options.width.max(200), options.height.max(150));
    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);

    // Plot frame in pixel coordinates
    let (left, right) = (90u32, width - 30);
    let (top, bottom) = (60u32, height - 70);

    let (x_min, x_max) = padded_range(dataset.x().iter().copied());
    let (y_min, y_max) = padded_range(dataset.y().iter().copied());
    let x_axis = Axis {
        min: x_min,
        max: x_max,
        pixel_start: left as f64,
        pixel_end: right as f64,
    };
    let y_axis = Axis {
        min: y_min,
        max: y_max,
        pixel_start: bottom as f64,
        pixel_end: top as f64,
    };

    let tick_scale = 2;
    let x_ticks = ticks(x_min, x_max);
    let y_ticks = ticks(y_min, y_max);

    for (v, label) in &x_ticks {
        let px = x_axis.project(*v).round() as u32;
        if options.grid {
            vline(&mut img, px, top, bottom, GRID);
        }
        vline(&mut img, px, bottom, bottom + 5, FOREGROUND);
        let w = text_width(label, tick_scale) as i64;
        draw_text(&mut img, px as i64 - w / 2, bottom as i64 + 10, label, tick_scale, FOREGROUND);
    }
    for (v, label) in &y_ticks {
        let py = y_axis.project(*v).round() as u32;
        if options.grid {
            hline(&mut img, left, right, py, GRID);
        }
        hline(&mut img, left.saturating_sub(5), left, py, FOREGROUND);
        let w = text_width(label, tick_scale) as i64;
        let h = text_height(tick_scale) as i64;
        draw_text(&mut img, left as i64 - 10 - w, py as i64 - h / 2, label, tick_scale, FOREGROUND);
    }

    let marker = hsl_to_rgb(MARKER_HSL.0, MARKER_HSL.1, MARKER_HSL.2);
    let mut drawn = 0usize;
    for (x, y) in dataset.rows() {
        if !(x.is_finite() && y.is_finite()) {
            continue;
        }
        disc(
            &mut img,
            x_axis.project(x),
            y_axis.project(y),
            options.marker_radius,
            marker,
            options.alpha,
            (left, top, right, bottom),
        );
        drawn += 1;
    }
    debug!("scatter: drew {drawn} of {} points", dataset.len());

    // Frame on top of grid and markers
    hline(&mut img, left, right, top, FOREGROUND);
    hline(&mut img, left, right, bottom, FOREGROUND);
    vline(&mut img, left, top, bottom, FOREGROUND);
    vline(&mut img, right, top, bottom, FOREGROUND);

    // Title and axis labels
    let title_scale = 3;
    let tw = text_width(&options.title, title_scale) as i64;
    let plot_centre_x = (left + right) as i64 / 2;
    draw_text(&mut img, plot_centre_x - tw / 2, 20, &options.title, title_scale, FOREGROUND);

    let label_scale = 2;
    let xw = text_width(&options.x_label, label_scale) as i64;
    draw_text(
        &mut img,
        plot_centre_x - xw / 2,
        height as i64 - 30,
        &options.x_label,
        label_scale,
        FOREGROUND,
    );
    let plot_centre_y = (top + bottom) as i64 / 2;
    draw_text(
        &mut img,
        8,
        plot_centre_y - text_height(label_scale) as i64 / 2,
        &options.y_label,
        label_scale,
        FOREGROUND,
    );

    img
}

/// Render the scatter plot and write it as PNG to `path`, replacing any
/// existing file.
pub fn save_scatter(
    dataset: &Dataset,
    path: &Path,
    options: &PlotOptions,
) -> Result<(), image::ImageError> {
    let img = render_scatter(dataset, options);
    img.save_with_format(path, ImageFormat::Png)?;
    info!("scatter plot written to {}", path.display());
    Ok(())
}
