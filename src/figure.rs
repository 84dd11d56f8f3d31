use std::path::PathBuf;

use glam::DVec2;

use crate::{
    color::{Color, ColorCycle},
    error::{PlotError, Result},
    scene::{CircleEntry, CurveEntry, Document, Entry, PointEntry, PolygonEntry},
};

pub const DEFAULT_TITLE: &str = "MatPlotLua";
pub const DEFAULT_XLABEL: &str = "X";
pub const DEFAULT_YLABEL: &str = "Y";
pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 480;

const MIN_SIZE: u32 = 16;
const MAX_SIZE: u32 = 8192;

/// Where a finished chart goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Show,
    Save(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Markers(Vec<DVec2>),
    Polyline(Vec<DVec2>),
    Circle { center: DVec2, radius: f64 },
    Polygon { vertices: Vec<DVec2>, closed: bool },
}

/// A resolved, drawable entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Mark {
    pub shape: Shape,
    pub color: Color,
    pub label: Option<String>,
}

/// Everything needed to draw one chart.
#[derive(Debug, Clone)]
pub struct Figure {
    pub title: String,
    pub xlabel: String,
    pub ylabel: String,
    pub width: u32,
    pub height: u32,
    pub output: Output,
    pub marks: Vec<Mark>,
}

impl Figure {
    pub fn from_document(document: Document) -> Result<Self> {
        let options = document.options;
        let width = options.width.unwrap_or(DEFAULT_WIDTH);
        let height = options.height.unwrap_or(DEFAULT_HEIGHT);
        if !(MIN_SIZE..=MAX_SIZE).contains(&width) || !(MIN_SIZE..=MAX_SIZE).contains(&height) {
            return Err(PlotError::InvalidSize { width, height });
        }

        let mut cycle = ColorCycle::default();
        let marks = document
            .entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| resolve(index, entry, &mut cycle))
            .collect::<Result<Vec<_>>>()?;

        let figure = Self {
            title: options.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            xlabel: options.xlabel.unwrap_or_else(|| DEFAULT_XLABEL.to_string()),
            ylabel: options.ylabel.unwrap_or_else(|| DEFAULT_YLABEL.to_string()),
            width,
            height,
            output: options.figure.map_or(Output::Show, Output::Save),
            marks,
        };

        log::debug!(
            "resolved figure {:?}: {} marks, {}x{}, {:?}",
            figure.title,
            figure.marks.len(),
            figure.width,
            figure.height,
            figure.output
        );

        Ok(figure)
    }

    /// Labelled marks, in drawing order.
    pub fn legend_entries(&self) -> Vec<&Mark> {
        self.marks.iter().filter(|mark| mark.label.is_some()).collect()
    }
}

fn resolve(index: usize, entry: Entry, cycle: &mut ColorCycle) -> Result<Mark> {
    match entry {
        Entry::Point(point) => resolve_point(index, point, cycle),
        Entry::Curve(curve) => resolve_curve(index, curve, cycle),
        Entry::Circle(circle) => resolve_circle(index, circle),
        Entry::Polygon(polygon) => resolve_polygon(index, polygon),
    }
}

fn resolve_point(index: usize, point: PointEntry, cycle: &mut ColorCycle) -> Result<Mark> {
    let what = format!("point #{}", index);
    let points = zip_coords(&what, &point.x.values(), &point.y.values())?;
    Ok(Mark {
        shape: Shape::Markers(points),
        color: cycled_color(point.color, cycle)?,
        label: legend_label(point.label),
    })
}

fn resolve_curve(index: usize, curve: CurveEntry, cycle: &mut ColorCycle) -> Result<Mark> {
    let what = format!("curve #{}", index);
    let points = zip_coords(&what, &curve.x, &curve.y)?;
    Ok(Mark {
        shape: Shape::Polyline(points),
        color: cycled_color(curve.color, cycle)?,
        label: legend_label(curve.label),
    })
}

fn resolve_circle(index: usize, circle: CircleEntry) -> Result<Mark> {
    let what = format!("circle #{}", index);
    let center: DVec2 = circle.center.into();
    if !center.is_finite() || !circle.radius.is_finite() {
        return Err(PlotError::NonFinite(what));
    }
    if circle.radius < 0.0 {
        return Err(PlotError::NegativeRadius {
            what,
            radius: circle.radius,
        });
    }
    Ok(Mark {
        shape: Shape::Circle {
            center,
            radius: circle.radius,
        },
        color: fixed_color(circle.color)?,
        label: legend_label(circle.label),
    })
}

fn resolve_polygon(index: usize, polygon: PolygonEntry) -> Result<Mark> {
    if !polygon.vertices.iter().all(|v| v.is_finite()) {
        return Err(PlotError::NonFinite(format!("polygon #{}", index)));
    }
    Ok(Mark {
        shape: Shape::Polygon {
            vertices: polygon.vertices,
            closed: polygon.closed,
        },
        color: fixed_color(polygon.color)?,
        label: legend_label(polygon.label),
    })
}

fn zip_coords(what: &str, xs: &[f64], ys: &[f64]) -> Result<Vec<DVec2>> {
    if xs.len() != ys.len() {
        return Err(PlotError::LengthMismatch {
            what: what.to_string(),
            x: xs.len(),
            y: ys.len(),
        });
    }
    let points: Vec<DVec2> = xs.iter().zip(ys).map(|(&x, &y)| DVec2::new(x, y)).collect();
    if !points.iter().all(|p| p.is_finite()) {
        return Err(PlotError::NonFinite(what.to_string()));
    }
    Ok(points)
}

// An explicit color does not advance the cycle.
fn cycled_color(spec: Option<String>, cycle: &mut ColorCycle) -> Result<Color> {
    match spec {
        Some(spec) => Color::parse(&spec),
        None => Ok(cycle.next_color()),
    }
}

fn fixed_color(spec: Option<String>) -> Result<Color> {
    match spec {
        Some(spec) => Color::parse(&spec),
        None => Ok(Color::BLACK),
    }
}

fn legend_label(label: Option<String>) -> Option<String> {
    label.filter(|l| !l.is_empty() && !l.starts_with('_'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn figure(json: &str) -> Result<Figure> {
        Figure::from_document(Document::from_json(json)?)
    }

    #[test]
    fn test_defaults() {
        let fig = figure("[]").unwrap();
        assert_eq!(fig.title, "MatPlotLua");
        assert_eq!(fig.xlabel, "X");
        assert_eq!(fig.ylabel, "Y");
        assert_eq!((fig.width, fig.height), (640, 480));
        assert_eq!(fig.output, Output::Show);
        assert!(fig.marks.is_empty());
    }

    #[test]
    fn test_options_override_defaults() {
        let fig = figure(
            r#"{"xlabel": "t", "ylabel": "v", "title": "T", "figure": "a.png",
                "width": 200, "height": 100}"#,
        )
        .unwrap();
        assert_eq!(fig.xlabel, "t");
        assert_eq!(fig.ylabel, "v");
        assert_eq!(fig.title, "T");
        assert_eq!(fig.output, Output::Save(PathBuf::from("a.png")));
        assert_eq!((fig.width, fig.height), (200, 100));
    }

    #[test]
    fn test_invalid_size() {
        assert!(matches!(
            figure(r#"{"width": 0}"#).unwrap_err(),
            PlotError::InvalidSize { width: 0, height: 480 }
        ));
        assert!(figure(r#"{"height": 100000}"#).is_err());
    }

    #[test]
    fn test_cycle_only_for_points_and_curves() {
        let fig = figure(
            r#"[
                {"type": "circle", "center": {"x": 0, "y": 0}, "radius": 1},
                {"type": "point", "x": 0, "y": 0},
                {"type": "polygon", "vertices": [[0, 0], [1, 1], [1, 0]]},
                {"type": "curve", "x": [0, 1], "y": [0, 1], "color": "k"},
                {"type": "curve", "x": [0, 1], "y": [1, 0]}
            ]"#,
        )
        .unwrap();

        let colors: Vec<Color> = fig.marks.iter().map(|m| m.color).collect();
        assert_eq!(
            colors,
            [
                Color::BLACK,
                ColorCycle::nth(0),
                Color::BLACK,
                Color::BLACK,
                ColorCycle::nth(1),
            ]
        );
    }

    #[test]
    fn test_point_scalar_and_array() {
        let fig = figure(
            r#"{"points": [{"x": 1, "y": 2}, {"x": [1, 2, 3], "y": [4, 5, 6]}]}"#,
        )
        .unwrap();
        assert_eq!(fig.marks[0].shape, Shape::Markers(vec![DVec2::new(1.0, 2.0)]));
        match &fig.marks[1].shape {
            Shape::Markers(points) => assert_eq!(points.len(), 3),
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_length_mismatch() {
        let err = figure(r#"{"curves": [{"x": [1, 2], "y": [1]}]}"#).unwrap_err();
        assert!(matches!(err, PlotError::LengthMismatch { x: 2, y: 1, .. }));
    }

    #[test]
    fn test_negative_radius() {
        let err = figure(r#"{"circles": [{"center": {"x": 0, "y": 0}, "radius": -1}]}"#)
            .unwrap_err();
        assert!(matches!(err, PlotError::NegativeRadius { .. }));
    }

    #[test]
    fn test_bad_color_is_reported() {
        let err = figure(r#"{"points": [{"x": 0, "y": 0, "color": "plaid"}]}"#).unwrap_err();
        assert!(matches!(err, PlotError::InvalidColor(_)));
    }

    #[test]
    fn test_legend_labels() {
        let fig = figure(
            r#"[
                {"type": "point", "x": 0, "y": 0, "label": "shown"},
                {"type": "point", "x": 0, "y": 0, "label": "_hidden"},
                {"type": "point", "x": 0, "y": 0, "label": ""},
                {"type": "point", "x": 0, "y": 0}
            ]"#,
        )
        .unwrap();
        let labels: Vec<&str> = fig
            .legend_entries()
            .iter()
            .filter_map(|m| m.label.as_deref())
            .collect();
        assert_eq!(labels, ["shown"]);
    }
}
