use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::{fs::File, io::BufReader, path::Path, path::PathBuf};

use glam::DVec2;

use crate::error::{PlotError, Result};

/// A parsed input document, in drawing order.
///
/// Two JSON layouts are accepted. An object with `points`, `curves`,
/// `polygons` and `circles` sections plus optional chart keys, or a flat
/// array of entries tagged with a `type` field.
#[derive(Debug, Default)]
pub struct Document {
    pub entries: Vec<Entry>,
    pub options: ChartOptions,
}

#[derive(Debug, Clone)]
pub enum Entry {
    Point(PointEntry),
    Curve(CurveEntry),
    Circle(CircleEntry),
    Polygon(PolygonEntry),
}

/// Chart-level keys of a sectioned document.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ChartOptions {
    pub xlabel: Option<String>,
    pub ylabel: Option<String>,
    pub title: Option<String>,
    pub figure: Option<PathBuf>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// A number or a list of numbers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Coords {
    One(f64),
    Many(Vec<f64>),
}

impl Coords {
    pub fn values(&self) -> Vec<f64> {
        match self {
            Coords::One(v) => vec![*v],
            Coords::Many(vs) => vs.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PointEntry {
    pub x: Coords,
    pub y: Coords,
    #[serde(default, deserialize_with = "label_text")]
    pub label: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurveEntry {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    #[serde(default, deserialize_with = "label_text")]
    pub label: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Center {
    pub x: f64,
    pub y: f64,
}

impl From<Center> for DVec2 {
    fn from(center: Center) -> Self {
        DVec2::new(center.x, center.y)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CircleEntry {
    pub center: Center,
    pub radius: f64,
    #[serde(default, deserialize_with = "label_text")]
    pub label: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PolygonEntry {
    pub vertices: Vec<DVec2>,
    #[serde(default = "closed_by_default")]
    pub closed: bool,
    #[serde(default, deserialize_with = "label_text")]
    pub label: Option<String>,
    pub color: Option<String>,
}

fn closed_by_default() -> bool {
    true
}

/// Labels go through `str()` semantics: any JSON scalar becomes its text.
fn label_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

#[derive(Deserialize)]
struct Sections {
    #[serde(default)]
    points: Vec<Value>,
    #[serde(default)]
    curves: Vec<Value>,
    #[serde(default)]
    polygons: Vec<Value>,
    #[serde(default)]
    circles: Vec<Value>,
    #[serde(flatten)]
    options: ChartOptions,
}

impl Document {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let value: Value = serde_json::from_reader(reader)?;

        Self::from_value(value)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Array(items) => Self::from_tagged(items),
            Value::Object(_) => Self::from_sections(serde_json::from_value(value)?),
            Value::Null => Err(PlotError::InvalidDocument("null")),
            Value::Bool(_) => Err(PlotError::InvalidDocument("a boolean")),
            Value::Number(_) => Err(PlotError::InvalidDocument("a number")),
            Value::String(_) => Err(PlotError::InvalidDocument("a string")),
        }
    }

    fn from_sections(sections: Sections) -> Result<Self> {
        let mut entries = Vec::new();

        for (index, value) in sections.points.into_iter().enumerate() {
            entries.push(Entry::Point(entry("points", index, value)?));
        }
        for (index, value) in sections.curves.into_iter().enumerate() {
            entries.push(Entry::Curve(entry("curves", index, value)?));
        }
        for (index, value) in sections.polygons.into_iter().enumerate() {
            entries.push(Entry::Polygon(entry("polygons", index, value)?));
        }
        for (index, value) in sections.circles.into_iter().enumerate() {
            entries.push(Entry::Circle(entry("circles", index, value)?));
        }

        log::debug!("parsed sectioned document with {} entries", entries.len());

        Ok(Self {
            entries,
            options: sections.options,
        })
    }

    fn from_tagged(items: Vec<Value>) -> Result<Self> {
        let mut entries = Vec::with_capacity(items.len());

        for (index, value) in items.into_iter().enumerate() {
            let kind = match value.get("type").and_then(Value::as_str) {
                Some(kind) => kind.to_string(),
                None => return Err(PlotError::MissingType { index }),
            };

            let parsed = match kind.as_str() {
                "point" => Entry::Point(entry("entries", index, value)?),
                "curve" => Entry::Curve(entry("entries", index, value)?),
                "circle" => Entry::Circle(entry("entries", index, value)?),
                "polygon" => Entry::Polygon(entry("entries", index, value)?),
                other => {
                    log::warn!("entries[{}]: skipping unrecognized type {:?}", index, other);
                    continue;
                }
            };
            entries.push(parsed);
        }

        log::debug!("parsed tagged document with {} entries", entries.len());

        Ok(Self {
            entries,
            options: ChartOptions::default(),
        })
    }
}

fn entry<T: serde::de::DeserializeOwned>(
    section: &'static str,
    index: usize,
    value: Value,
) -> Result<T> {
    serde_json::from_value(value).map_err(|source| PlotError::Entry {
        section,
        index,
        source,
    })
}
