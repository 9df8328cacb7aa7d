//! Coordinate values and labelled coordinate vectors.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single coordinate point.
///
/// Forecast cubes label their axes with heterogeneous scalars: validity
/// times arrive as Unix epoch seconds, percentiles as floats, site
/// identifiers as integers or strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CoordValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl CoordValue {
    /// Integer view of the value, truncating floats.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CoordValue::Int(v) => Some(*v),
            CoordValue::Float(v) => Some(*v as i64),
            CoordValue::Text(_) => None,
        }
    }

    /// Floating-point view of the value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CoordValue::Int(v) => Some(*v as f64),
            CoordValue::Float(v) => Some(*v),
            CoordValue::Text(_) => None,
        }
    }
}

impl fmt::Display for CoordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordValue::Int(v) => write!(f, "{}", v),
            CoordValue::Float(v) => write!(f, "{}", v),
            CoordValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for CoordValue {
    fn from(v: i64) -> Self {
        CoordValue::Int(v)
    }
}

impl From<f64> for CoordValue {
    fn from(v: f64) -> Self {
        CoordValue::Float(v)
    }
}

impl From<&str> for CoordValue {
    fn from(v: &str) -> Self {
        CoordValue::Text(v.to_string())
    }
}

/// A named, ordered vector of coordinate points.
///
/// A coordinate either varies along one of the cube's dimensions
/// (`dim = Some(..)`, one point per position) or is a scalar attached to
/// the cube as a whole (`dim = None`, exactly one point).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    name: String,
    points: Vec<CoordValue>,
    dim: Option<String>,
}

impl Coordinate {
    /// A coordinate varying along the named dimension.
    pub fn new(
        name: impl Into<String>,
        dim: impl Into<String>,
        points: Vec<CoordValue>,
    ) -> Self {
        Self {
            name: name.into(),
            points,
            dim: Some(dim.into()),
        }
    }

    /// A scalar coordinate with a single point.
    pub fn scalar(name: impl Into<String>, point: CoordValue) -> Self {
        Self {
            name: name.into(),
            points: vec![point],
            dim: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The dimension this coordinate varies along, if any.
    pub fn dim(&self) -> Option<&str> {
        self.dim.as_deref()
    }

    pub fn points(&self) -> &[CoordValue] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True when the coordinate carries a single point.
    pub fn is_scalar(&self) -> bool {
        self.points.len() == 1
    }

    pub fn point(&self, idx: usize) -> Option<&CoordValue> {
        self.points.get(idx)
    }

    /// The single point of a scalar coordinate.
    pub fn scalar_point(&self) -> Option<&CoordValue> {
        if self.is_scalar() {
            self.points.first()
        } else {
            None
        }
    }

    /// Restrict the coordinate to one position along a dimension.
    ///
    /// Coordinates varying along `dim` collapse to the point at
    /// `position`; everything else is returned unchanged.
    pub(crate) fn sliced(&self, dim: &str, position: usize) -> Coordinate {
        if self.dim.as_deref() == Some(dim) {
            Coordinate {
                name: self.name.clone(),
                points: vec![self.points[position].clone()],
                dim: Some(dim.to_string()),
            }
        } else {
            self.clone()
        }
    }
}
