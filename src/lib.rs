//! Render JSON descriptions of points, curves, circles and polygons as 2D charts.
//!
//! The input is either a sectioned object:
//!
//! ```json
//! {
//!     "points":   [{"x": 1, "y": 2, "label": "p"}],
//!     "curves":   [{"x": [0, 1, 2], "y": [0, 1, 4]}],
//!     "circles":  [{"center": {"x": 0, "y": 0}, "radius": 1, "color": "r"}],
//!     "polygons": [{"vertices": [[0, 0], [1, 0], [0, 1]]}],
//!     "title": "Shapes",
//!     "figure": "shapes.png"
//! }
//! ```
//!
//! or a flat list of entries tagged with `"type"`. When `figure` is set the
//! chart is saved there, otherwise it is shown in a window.

pub mod axis;
pub mod canvas;
pub mod chart;
pub mod color;
pub mod error;
pub mod figure;
pub mod primitives;
pub mod scene;
pub mod source;
pub mod viewer;

pub use color::Color;
pub use error::{PlotError, Result};
pub use figure::{Figure, Mark, Output, Shape};
pub use scene::Document;

/// Parse `json`, then save or show the chart it describes.
pub fn plot_from_json(json: &str) -> Result<()> {
    let figure = Figure::from_document(Document::from_json(json)?)?;
    let output = figure.output.clone();
    match output {
        Output::Save(path) => chart::save(&figure, &path),
        Output::Show => viewer::show(figure),
    }
}
