use glam::DVec2;

use crate::color::Color;

/// Pixel rectangle, origin at the top left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn contains_point(&self, point: DVec2) -> bool {
        self.contains(point.x.floor() as i32, point.y.floor() as i32)
    }
}

pub struct MarkerDescriptor {
    pub centre: DVec2,
    pub radius: f64,
    pub color: Color,
}

pub struct LineDescriptor {
    pub start: DVec2,
    pub end: DVec2,
    pub color: Color,
    pub stroke: u32,
}
