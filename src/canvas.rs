//! RGBA pixel buffer with the handful of drawing operations a chart needs.

use std::path::Path;

use font8x8::UnicodeFonts;
use glam::DVec2;

use crate::{
    color::Color,
    error::{PlotError, Result},
    primitives::{LineDescriptor, MarkerDescriptor, Rect},
};

/// Width and height of one glyph at scale 1.
pub const GLYPH_SIZE: u32 = 8;

// Keeps Bresenham bounded for coordinates far off the canvas.
const COORD_LIMIT: f64 = 1.0e5;

pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    clip: Option<Rect>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..(width * height) {
            pixels.extend_from_slice(&[background.r, background.g, background.b, background.a]);
        }
        Self {
            width,
            height,
            pixels,
            clip: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major RGBA bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = ((x + y * self.width) * 4) as usize;
        let p = &self.pixels[offset..offset + 4];
        Some(Color::new(p[0], p[1], p[2], p[3]))
    }

    /// Restrict subsequent drawing to `clip`, or lift the restriction.
    pub fn set_clip(&mut self, clip: Option<Rect>) {
        self.clip = clip;
    }

    pub fn plot(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        if let Some(clip) = self.clip {
            if !clip.contains(x, y) {
                return;
            }
        }

        let offset = ((x as u32 + y as u32 * self.width) * 4) as usize;
        let below = Color::new(
            self.pixels[offset],
            self.pixels[offset + 1],
            self.pixels[offset + 2],
            self.pixels[offset + 3],
        );
        let blended = color.over(below);
        self.pixels[offset] = blended.r;
        self.pixels[offset + 1] = blended.g;
        self.pixels[offset + 2] = blended.b;
        self.pixels[offset + 3] = blended.a;
    }

    pub fn draw_line(&mut self, line: &LineDescriptor) {
        if !line.start.is_finite() || !line.end.is_finite() {
            return;
        }
        let start = to_grid(line.start);
        let end = to_grid(line.end);

        let stroke = line.stroke.max(1) as i32;
        let lo = -((stroke - 1) / 2);
        let hi = lo + stroke - 1;

        let pixels = bresenham::Bresenham::new(start, end).chain(std::iter::once(end));
        for (x, y) in pixels {
            for dy in lo..=hi {
                for dx in lo..=hi {
                    self.plot(x as i32 + dx, y as i32 + dy, line.color);
                }
            }
        }
    }

    /// Connected line through `points`, optionally back to the first one.
    pub fn draw_polyline(&mut self, points: &[DVec2], closed: bool, color: Color, stroke: u32) {
        for pair in points.windows(2) {
            self.draw_line(&LineDescriptor {
                start: pair[0],
                end: pair[1],
                color,
                stroke,
            });
        }
        if closed && points.len() > 2 {
            if let (Some(&last), Some(&first)) = (points.last(), points.first()) {
                self.draw_line(&LineDescriptor {
                    start: last,
                    end: first,
                    color,
                    stroke,
                });
            }
        }
    }

    /// Filled disk.
    pub fn draw_marker(&mut self, marker: &MarkerDescriptor) {
        if !marker.centre.is_finite() {
            return;
        }
        let min_x = (marker.centre.x - marker.radius).floor() as i32;
        let max_x = (marker.centre.x + marker.radius).ceil() as i32;
        let min_y = (marker.centre.y - marker.radius).floor() as i32;
        let max_y = (marker.centre.y + marker.radius).ceil() as i32;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let distance = marker.centre.distance(DVec2::new(x as f64, y as f64));
                if distance <= marker.radius {
                    self.plot(x, y, marker.color);
                }
            }
        }
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                self.plot(x, y, color);
            }
        }
    }

    /// One pixel outline just inside `rect`.
    pub fn stroke_rect(&mut self, rect: Rect, color: Color) {
        if rect.width == 0 || rect.height == 0 {
            return;
        }
        let (left, top) = (rect.x, rect.y);
        let (right, bottom) = (rect.right() - 1, rect.bottom() - 1);
        for x in left..=right {
            self.plot(x, top, color);
            self.plot(x, bottom, color);
        }
        for y in top..=bottom {
            self.plot(left, y, color);
            self.plot(right, y, color);
        }
    }

    pub fn text_width(text: &str, scale: u32) -> u32 {
        text.chars().count() as u32 * GLYPH_SIZE * scale
    }

    /// Horizontal text with its top-left corner at `(x, y)`.
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, scale: u32, color: Color) {
        let scale = scale.max(1) as i32;
        let advance = GLYPH_SIZE as i32 * scale;
        for (i, c) in text.chars().enumerate() {
            let origin_x = x + i as i32 * advance;
            self.draw_glyph(c, scale, color, |gx, gy| (origin_x + gx, y + gy));
        }
    }

    /// Text rotated a quarter turn counter-clockwise, reading upwards from
    /// `(x, y)`, which is its bottom-left corner.
    pub fn draw_text_up(&mut self, x: i32, y: i32, text: &str, scale: u32, color: Color) {
        let scale = scale.max(1) as i32;
        let advance = GLYPH_SIZE as i32 * scale;
        for (i, c) in text.chars().enumerate() {
            let origin_y = y - i as i32 * advance;
            self.draw_glyph(c, scale, color, |gx, gy| (x + gy, origin_y - 1 - gx));
        }
    }

    fn draw_glyph<F>(&mut self, c: char, scale: i32, color: Color, place: F)
    where
        F: Fn(i32, i32) -> (i32, i32),
    {
        let glyph = font8x8::BASIC_FONTS
            .get(c)
            .or_else(|| font8x8::LATIN_FONTS.get(c))
            .or_else(|| font8x8::BASIC_FONTS.get('?'));
        let Some(glyph) = glyph else {
            return;
        };

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..8 {
                if bits & (1u8 << col) == 0 {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        let (px, py) = place(col * scale + sx, row as i32 * scale + sy);
                        self.plot(px, py, color);
                    }
                }
            }
        }
    }

    pub fn to_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_fn(self.width, self.height, |x, y| {
            let offset = ((x + y * self.width) * 4) as usize;
            image::Rgba([
                self.pixels[offset],
                self.pixels[offset + 1],
                self.pixels[offset + 2],
                self.pixels[offset + 3],
            ])
        })
    }

    /// Encode to `path`; the format follows the file extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let rgb = image::DynamicImage::ImageRgba8(self.to_image()).to_rgb8();
        rgb.save(path).map_err(|source| PlotError::Image {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn to_grid(point: DVec2) -> (isize, isize) {
    let clamped = point.clamp(DVec2::splat(-COORD_LIMIT), DVec2::splat(COORD_LIMIT));
    (clamped.x.round() as isize, clamped.y.round() as isize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(canvas: &Canvas, color: Color) -> usize {
        let mut n = 0;
        for y in 0..canvas.height() {
            for x in 0..canvas.width() {
                if canvas.get(x, y) == Some(color) {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn test_new_fills_background() {
        let canvas = Canvas::new(4, 3, Color::WHITE);
        assert_eq!(canvas.pixels().len(), 48);
        assert_eq!(count(&canvas, Color::WHITE), 12);
        assert_eq!(canvas.get(4, 0), None);
    }

    #[test]
    fn test_horizontal_line_includes_end_point() {
        let mut canvas = Canvas::new(10, 10, Color::WHITE);
        canvas.draw_line(&LineDescriptor {
            start: DVec2::new(1.0, 5.0),
            end: DVec2::new(8.0, 5.0),
            color: Color::BLACK,
            stroke: 1,
        });
        assert_eq!(count(&canvas, Color::BLACK), 8);
        assert_eq!(canvas.get(1, 5), Some(Color::BLACK));
        assert_eq!(canvas.get(8, 5), Some(Color::BLACK));
    }

    #[test]
    fn test_stroke_width() {
        let mut canvas = Canvas::new(10, 10, Color::WHITE);
        canvas.draw_line(&LineDescriptor {
            start: DVec2::new(2.0, 2.0),
            end: DVec2::new(2.0, 6.0),
            color: Color::BLACK,
            stroke: 3,
        });
        assert_eq!(count(&canvas, Color::BLACK), 15);
    }

    #[test]
    fn test_clip_rect_limits_drawing() {
        let mut canvas = Canvas::new(10, 10, Color::WHITE);
        canvas.set_clip(Some(Rect::new(0, 0, 5, 10)));
        canvas.fill_rect(Rect::new(0, 0, 10, 10), Color::BLACK);
        assert_eq!(count(&canvas, Color::BLACK), 50);
        assert_eq!(canvas.get(6, 0), Some(Color::WHITE));
    }

    #[test]
    fn test_off_canvas_drawing_is_ignored() {
        let mut canvas = Canvas::new(10, 10, Color::WHITE);
        canvas.draw_line(&LineDescriptor {
            start: DVec2::new(-1e12, 5.0),
            end: DVec2::new(f64::NAN, 5.0),
            color: Color::BLACK,
            stroke: 1,
        });
        canvas.draw_marker(&MarkerDescriptor {
            centre: DVec2::new(-50.0, -50.0),
            radius: 3.0,
            color: Color::BLACK,
        });
        assert_eq!(count(&canvas, Color::BLACK), 0);
    }

    #[test]
    fn test_marker_is_round() {
        let mut canvas = Canvas::new(20, 20, Color::WHITE);
        canvas.draw_marker(&MarkerDescriptor {
            centre: DVec2::new(10.0, 10.0),
            radius: 4.0,
            color: Color::BLACK,
        });
        assert_eq!(canvas.get(10, 10), Some(Color::BLACK));
        assert_eq!(canvas.get(14, 10), Some(Color::BLACK));
        assert_eq!(canvas.get(13, 13), Some(Color::WHITE));
    }

    #[test]
    fn test_closed_polyline_returns_to_start() {
        let square = [
            DVec2::new(1.0, 1.0),
            DVec2::new(8.0, 1.0),
            DVec2::new(8.0, 8.0),
            DVec2::new(1.0, 8.0),
        ];
        let mut open = Canvas::new(10, 10, Color::WHITE);
        open.draw_polyline(&square, false, Color::BLACK, 1);
        let mut closed = Canvas::new(10, 10, Color::WHITE);
        closed.draw_polyline(&square, true, Color::BLACK, 1);

        assert_eq!(open.get(1, 4), Some(Color::WHITE));
        assert_eq!(closed.get(1, 4), Some(Color::BLACK));
        assert_eq!(count(&closed, Color::BLACK), 28);
    }

    #[test]
    fn test_text_draws_inside_its_box() {
        let mut canvas = Canvas::new(40, 20, Color::WHITE);
        canvas.draw_text(2, 2, "AB", 1, Color::BLACK);
        let drawn = count(&canvas, Color::BLACK);
        assert!(drawn > 0);
        for y in 0..20 {
            for x in 0..40 {
                if canvas.get(x, y) == Some(Color::BLACK) {
                    assert!((2..18).contains(&x) && (2..10).contains(&y));
                }
            }
        }
        assert_eq!(Canvas::text_width("AB", 2), 32);
    }

    #[test]
    fn test_vertical_text_stays_in_column() {
        let mut canvas = Canvas::new(20, 40, Color::WHITE);
        canvas.draw_text_up(4, 30, "Y", 1, Color::BLACK);
        assert!(count(&canvas, Color::BLACK) > 0);
        for y in 0..40 {
            for x in 0..20 {
                if canvas.get(x, y) == Some(Color::BLACK) {
                    assert!((4..12).contains(&x) && (22..30).contains(&y));
                }
            }
        }
    }
}
