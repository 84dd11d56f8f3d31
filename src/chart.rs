//! Chart layout and drawing.
//!
//! A chart is drawn in a fixed order: background, marks (clipped to the plot
//! area), frame, ticks and tick labels, axis labels, title, then the legend.
//! Circles and polygons go below points and curves, each group in entry order.

use std::{f64::consts::TAU, path::Path};

use glam::DVec2;

use crate::{
    axis::{format_tick, nice_ticks, Limits, Ticks, Transform, MARGIN},
    canvas::{Canvas, GLYPH_SIZE},
    color::Color,
    error::Result,
    figure::{Figure, Mark, Shape},
    primitives::{LineDescriptor, MarkerDescriptor, Rect},
};

const OUTER_PAD: i32 = 8;
const TICK_LENGTH: i32 = 4;
const TICK_PAD: i32 = 4;
const LABEL_PAD: i32 = 6;
const TICK_SCALE: u32 = 1;

const LINE_STROKE: u32 = 2;
const MARKER_RADIUS: f64 = 4.0;
const CIRCLE_SEGMENTS: usize = 180;

const LEGEND_INSET: i32 = 8;
const LEGEND_PAD: i32 = 6;
const LEGEND_ROW: i32 = 14;
const LEGEND_SWATCH: i32 = 24;
const LEGEND_GAP: i32 = 6;
const LEGEND_FILL: Color = Color::new(255, 255, 255, 204);

/// Where each part of a chart goes for a given canvas size.
#[derive(Debug, Clone)]
pub struct Chart {
    pub plot_area: Rect,
    pub transform: Transform,
    pub x_ticks: Ticks,
    pub y_ticks: Ticks,
    label_scale: u32,
}

/// Draw `figure` onto a fresh `width` x `height` canvas.
pub fn render(figure: &Figure, width: u32, height: u32) -> Canvas {
    let chart = Chart::layout(figure, width, height);
    let mut canvas = Canvas::new(width, height, Color::WHITE);
    chart.draw(figure, &mut canvas);
    canvas
}

/// Render `figure` at its own size and encode it to `path`.
pub fn save(figure: &Figure, path: &Path) -> Result<()> {
    let canvas = render(figure, figure.width, figure.height);
    canvas.save(path)?;
    log::info!("saved {}x{} chart to {}", figure.width, figure.height, path.display());
    Ok(())
}

impl Chart {
    pub fn layout(figure: &Figure, width: u32, height: u32) -> Self {
        let limits = Limits::of(&figure.marks).with_margins(MARGIN);
        let x_ticks = nice_ticks(limits.min.x, limits.max.x, (width / 100).max(2) as usize);
        let y_ticks = nice_ticks(limits.min.y, limits.max.y, (height / 80).max(2) as usize);

        let label_scale = if width >= 480 && height >= 360 { 2 } else { 1 };
        let label_height = (GLYPH_SIZE * label_scale) as i32;
        let tick_height = (GLYPH_SIZE * TICK_SCALE) as i32;

        let widest_y_tick = y_ticks
            .values
            .iter()
            .map(|v| Canvas::text_width(&format_tick(*v, y_ticks.step), TICK_SCALE))
            .max()
            .unwrap_or(0) as i32;

        let left = OUTER_PAD + label_height + LABEL_PAD + widest_y_tick + TICK_PAD + TICK_LENGTH;
        let bottom = OUTER_PAD + label_height + LABEL_PAD + tick_height + TICK_PAD + TICK_LENGTH;
        let top = OUTER_PAD + label_height + LABEL_PAD;
        let right = OUTER_PAD.max(width as i32 / 20);

        let plot_area = Rect::new(
            left,
            top,
            (width as i32 - left - right).max(1) as u32,
            (height as i32 - top - bottom).max(1) as u32,
        );

        Self {
            plot_area,
            transform: Transform::new(limits, plot_area),
            x_ticks,
            y_ticks,
            label_scale,
        }
    }

    pub fn draw(&self, figure: &Figure, canvas: &mut Canvas) {
        canvas.set_clip(Some(self.plot_area));
        let (patches, lines): (Vec<&Mark>, Vec<&Mark>) =
            figure.marks.iter().partition(|mark| is_patch(&mark.shape));
        for mark in patches.into_iter().chain(lines) {
            self.draw_mark(mark, canvas);
        }
        canvas.set_clip(None);

        canvas.stroke_rect(self.plot_area, Color::BLACK);
        self.draw_ticks(canvas);
        self.draw_labels(figure, canvas);
        self.draw_legend(figure, canvas);
    }

    fn draw_mark(&self, mark: &Mark, canvas: &mut Canvas) {
        match &mark.shape {
            Shape::Markers(points) => {
                for point in points {
                    canvas.draw_marker(&MarkerDescriptor {
                        centre: self.transform.to_pixel(*point),
                        radius: MARKER_RADIUS,
                        color: mark.color,
                    });
                }
            }
            Shape::Polyline(points) => {
                let pixels = self.to_pixels(points);
                canvas.draw_polyline(&pixels, false, mark.color, LINE_STROKE);
            }
            Shape::Circle { center, radius } => {
                let pixels = self.to_pixels(&circle_outline(*center, *radius));
                canvas.draw_polyline(&pixels, true, mark.color, LINE_STROKE);
            }
            Shape::Polygon { vertices, closed } => {
                let pixels = self.to_pixels(vertices);
                canvas.draw_polyline(&pixels, *closed, mark.color, LINE_STROKE);
            }
        }
    }

    fn to_pixels(&self, points: &[DVec2]) -> Vec<DVec2> {
        points.iter().map(|p| self.transform.to_pixel(*p)).collect()
    }

    fn draw_ticks(&self, canvas: &mut Canvas) {
        let area = self.plot_area;
        let glyph = (GLYPH_SIZE * TICK_SCALE) as i32;

        for value in &self.x_ticks.values {
            let x = self.transform.x_to_pixel(*value).round() as i32;
            let x = x.min(area.right() - 1);
            canvas.draw_line(&LineDescriptor {
                start: DVec2::new(x as f64, area.bottom() as f64),
                end: DVec2::new(x as f64, (area.bottom() + TICK_LENGTH - 1) as f64),
                color: Color::BLACK,
                stroke: 1,
            });
            let text = format_tick(*value, self.x_ticks.step);
            let text_width = Canvas::text_width(&text, TICK_SCALE) as i32;
            canvas.draw_text(
                x - text_width / 2,
                area.bottom() + TICK_LENGTH + TICK_PAD,
                &text,
                TICK_SCALE,
                Color::BLACK,
            );
        }

        for value in &self.y_ticks.values {
            let y = self.transform.y_to_pixel(*value).round() as i32;
            let y = y.min(area.bottom() - 1);
            canvas.draw_line(&LineDescriptor {
                start: DVec2::new((area.x - TICK_LENGTH) as f64, y as f64),
                end: DVec2::new((area.x - 1) as f64, y as f64),
                color: Color::BLACK,
                stroke: 1,
            });
            let text = format_tick(*value, self.y_ticks.step);
            let text_width = Canvas::text_width(&text, TICK_SCALE) as i32;
            canvas.draw_text(
                area.x - TICK_LENGTH - TICK_PAD - text_width,
                y - glyph / 2,
                &text,
                TICK_SCALE,
                Color::BLACK,
            );
        }
    }

    fn draw_labels(&self, figure: &Figure, canvas: &mut Canvas) {
        let area = self.plot_area;
        let scale = self.label_scale;
        let label_height = (GLYPH_SIZE * scale) as i32;
        let centre_x = area.x + area.width as i32 / 2;
        let centre_y = area.y + area.height as i32 / 2;

        let xlabel_width = Canvas::text_width(&figure.xlabel, scale) as i32;
        let xlabel_top =
            area.bottom() + TICK_LENGTH + TICK_PAD + (GLYPH_SIZE * TICK_SCALE) as i32 + LABEL_PAD;
        canvas.draw_text(
            centre_x - xlabel_width / 2,
            xlabel_top,
            &figure.xlabel,
            scale,
            Color::BLACK,
        );

        let ylabel_length = Canvas::text_width(&figure.ylabel, scale) as i32;
        canvas.draw_text_up(
            OUTER_PAD,
            centre_y + ylabel_length / 2,
            &figure.ylabel,
            scale,
            Color::BLACK,
        );

        let title_width = Canvas::text_width(&figure.title, scale) as i32;
        canvas.draw_text(
            centre_x - title_width / 2,
            area.y - LABEL_PAD - label_height,
            &figure.title,
            scale,
            Color::BLACK,
        );
    }

    fn draw_legend(&self, figure: &Figure, canvas: &mut Canvas) {
        let entries = figure.legend_entries();
        if entries.is_empty() {
            if !figure.marks.is_empty() {
                log::warn!("no labelled entries, legend omitted");
            }
            return;
        }

        let text_width = entries
            .iter()
            .filter_map(|mark| mark.label.as_deref())
            .map(|label| Canvas::text_width(label, TICK_SCALE))
            .max()
            .unwrap_or(0) as i32;
        let width = LEGEND_PAD * 2 + LEGEND_SWATCH + LEGEND_GAP + text_width;
        let height = LEGEND_PAD * 2 + LEGEND_ROW * entries.len() as i32;

        let frame = self.legend_frame(figure, width, height);
        canvas.fill_rect(frame, LEGEND_FILL);
        canvas.stroke_rect(frame, Color::LIGHT_GRAY);

        let glyph = (GLYPH_SIZE * TICK_SCALE) as i32;
        for (row, mark) in entries.iter().enumerate() {
            let row_top = frame.y + LEGEND_PAD + row as i32 * LEGEND_ROW;
            let mid_y = row_top + LEGEND_ROW / 2;
            let swatch_x = frame.x + LEGEND_PAD;
            draw_swatch(canvas, mark, swatch_x, mid_y);

            if let Some(label) = &mark.label {
                canvas.draw_text(
                    swatch_x + LEGEND_SWATCH + LEGEND_GAP,
                    mid_y - glyph / 2,
                    label,
                    TICK_SCALE,
                    Color::BLACK,
                );
            }
        }
    }

    /// The plot-area corner that hides the fewest data points, upper right on ties.
    fn legend_frame(&self, figure: &Figure, width: i32, height: i32) -> Rect {
        let area = self.plot_area;
        let (w, h) = (width.max(1) as u32, height.max(1) as u32);
        let left = area.x + LEGEND_INSET;
        let right = area.right() - LEGEND_INSET - width;
        let top = area.y + LEGEND_INSET;
        let bottom = area.bottom() - LEGEND_INSET - height;

        let candidates = [
            Rect::new(right, top, w, h),
            Rect::new(left, top, w, h),
            Rect::new(left, bottom, w, h),
            Rect::new(right, bottom, w, h),
        ];

        let samples: Vec<DVec2> = figure
            .marks
            .iter()
            .flat_map(|mark| match &mark.shape {
                Shape::Markers(points) | Shape::Polyline(points) => points.clone(),
                Shape::Polygon { vertices, .. } => vertices.clone(),
                Shape::Circle { center, radius } => circle_outline(*center, *radius),
            })
            .map(|p| self.transform.to_pixel(p))
            .collect();

        let mut best = candidates[0];
        let mut best_score = usize::MAX;
        for candidate in candidates {
            let score = samples.iter().filter(|p| candidate.contains_point(**p)).count();
            if score < best_score {
                best = candidate;
                best_score = score;
            }
        }
        best
    }
}

fn is_patch(shape: &Shape) -> bool {
    matches!(shape, Shape::Circle { .. } | Shape::Polygon { .. })
}

fn draw_swatch(canvas: &mut Canvas, mark: &Mark, x: i32, mid_y: i32) {
    match mark.shape {
        Shape::Markers(_) => canvas.draw_marker(&MarkerDescriptor {
            centre: DVec2::new((x + LEGEND_SWATCH / 2) as f64, mid_y as f64),
            radius: MARKER_RADIUS,
            color: mark.color,
        }),
        Shape::Polyline(_) => canvas.draw_line(&LineDescriptor {
            start: DVec2::new(x as f64, mid_y as f64),
            end: DVec2::new((x + LEGEND_SWATCH) as f64, mid_y as f64),
            color: mark.color,
            stroke: LINE_STROKE,
        }),
        Shape::Circle { .. } | Shape::Polygon { .. } => {
            let rect = Rect::new(x, mid_y - 5, LEGEND_SWATCH as u32, 10);
            canvas.stroke_rect(rect, mark.color);
        }
    }
}

fn circle_outline(center: DVec2, radius: f64) -> Vec<DVec2> {
    (0..CIRCLE_SEGMENTS)
        .map(|i| {
            let angle = TAU * i as f64 / CIRCLE_SEGMENTS as f64;
            center + radius * DVec2::new(angle.cos(), angle.sin())
        })
        .collect()
}
