//! Labelled multi-dimensional forecast data cubes.
//!
//! A [`DataCube`] couples a row-major numeric payload with named dimension
//! coordinates, auxiliary coordinates, a semantic name, a physical unit and
//! free-form string attributes. Downstream tabularization only consumes the
//! narrow read interface (`name`/`units`/`attributes`/`coordinate`/
//! `slice_along`/`series`); construction happens once, upstream, through
//! [`CubeBuilder`].

use std::collections::HashMap;

use crate::coords::{CoordValue, Coordinate};
use crate::error::{CubeError, CubeResult};

/// A labelled multi-dimensional numeric array.
///
/// Immutable once built. Dimension order is significant: the payload is laid
/// out row-major over the dimensions in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct DataCube {
    name: String,
    units: String,
    attributes: HashMap<String, String>,
    /// Ordered (dimension name, length) pairs.
    dims: Vec<(String, usize)>,
    /// Dimension and auxiliary coordinates, in declaration order.
    coords: Vec<Coordinate>,
    /// Row-major payload; length equals the product of dimension lengths.
    data: Vec<f64>,
}

impl DataCube {
    /// Semantic name of the physical quantity (e.g. `air_temperature`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Physical unit string (e.g. `K`).
    pub fn units(&self) -> &str {
        &self.units
    }

    /// Free-form string attributes attached to the cube.
    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    /// Ordered dimension names.
    pub fn dim_names(&self) -> impl Iterator<Item = &str> {
        self.dims.iter().map(|(name, _)| name.as_str())
    }

    pub fn has_dim(&self, name: &str) -> bool {
        self.dims.iter().any(|(d, _)| d == name)
    }

    pub fn dim_len(&self, name: &str) -> Option<usize> {
        self.dims.iter().find(|(d, _)| d == name).map(|(_, n)| *n)
    }

    /// Look up a coordinate (dimension or auxiliary) by name.
    pub fn coordinate(&self, name: &str) -> Option<&Coordinate> {
        self.coords.iter().find(|c| c.name() == name)
    }

    /// Total number of data elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The payload values along one dimension, with every other dimension
    /// collapsed.
    ///
    /// Fails with [`CubeError::ShapeMismatch`] if any other dimension is
    /// longer than one element, and [`CubeError::UnknownDimension`] if the
    /// dimension does not exist on the cube.
    pub fn series(&self, dim: &str) -> CubeResult<Vec<f64>> {
        let target = self.dim_index(dim)?;

        for (i, (name, len)) in self.dims.iter().enumerate() {
            if i != target && *len != 1 {
                return Err(CubeError::ShapeMismatch(format!(
                    "cannot collapse dimension '{}' of length {} on cube '{}'",
                    name, len, self.name
                )));
            }
        }

        let stride = self.stride(target);
        let len = self.dims[target].1;
        Ok((0..len).map(|i| self.data[i * stride]).collect())
    }

    /// The single payload value of a fully scalar cube.
    pub fn scalar_value(&self) -> CubeResult<f64> {
        if self.data.len() != 1 {
            return Err(CubeError::ShapeMismatch(format!(
                "cube '{}' holds {} values, expected a scalar",
                self.name,
                self.data.len()
            )));
        }
        Ok(self.data[0])
    }

    /// Split the cube into one sub-cube per position along `dim`.
    ///
    /// Each sub-cube keeps the sliced dimension with length one; auxiliary
    /// coordinates varying along it collapse to the matching single point.
    /// Slices are returned in coordinate order.
    pub fn slice_along(&self, dim: &str) -> CubeResult<Vec<DataCube>> {
        let target = self.dim_index(dim)?;
        let len = self.dims[target].1;

        let slices = (0..len)
            .map(|position| self.extract_slice(target, position))
            .collect();
        Ok(slices)
    }

    fn dim_index(&self, dim: &str) -> CubeResult<usize> {
        self.dims
            .iter()
            .position(|(d, _)| d == dim)
            .ok_or_else(|| CubeError::UnknownDimension(dim.to_string()))
    }

    /// Row-major stride of a dimension.
    fn stride(&self, dim_idx: usize) -> usize {
        self.dims[dim_idx + 1..].iter().map(|(_, n)| n).product()
    }

    fn extract_slice(&self, dim_idx: usize, position: usize) -> DataCube {
        let stride = self.stride(dim_idx);
        let len = self.dims[dim_idx].1;
        let block = stride * len;

        // Row-major: the sliced dimension repeats every `block` elements,
        // contributing `stride` contiguous values per repetition.
        let mut data = Vec::with_capacity(self.data.len() / len);
        let mut offset = position * stride;
        while offset < self.data.len() {
            data.extend_from_slice(&self.data[offset..offset + stride]);
            offset += block;
        }

        let dim_name = self.dims[dim_idx].0.clone();
        let mut dims = self.dims.clone();
        dims[dim_idx].1 = 1;

        DataCube {
            name: self.name.clone(),
            units: self.units.clone(),
            attributes: self.attributes.clone(),
            dims,
            coords: self
                .coords
                .iter()
                .map(|c| c.sliced(&dim_name, position))
                .collect(),
            data,
        }
    }
}

/// Builder for [`DataCube`].
///
/// Dimensions are declared through their dimension coordinates, in payload
/// order; auxiliary coordinates attach to an already-declared dimension or
/// to the cube as a whole (scalar).
pub struct CubeBuilder {
    name: String,
    units: String,
    attributes: HashMap<String, String>,
    dims: Vec<(String, usize)>,
    coords: Vec<Coordinate>,
    data: Vec<f64>,
}

impl CubeBuilder {
    pub fn new(name: impl Into<String>, units: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            units: units.into(),
            attributes: HashMap::new(),
            dims: Vec::new(),
            coords: Vec::new(),
            data: Vec::new(),
        }
    }

    /// Declare a dimension through its dimension coordinate.
    ///
    /// The coordinate's point count fixes the dimension length.
    pub fn dimension(mut self, name: impl Into<String>, points: Vec<CoordValue>) -> Self {
        let name = name.into();
        self.dims.push((name.clone(), points.len()));
        self.coords.push(Coordinate::new(name.clone(), name, points));
        self
    }

    /// Attach an auxiliary coordinate varying along an existing dimension.
    pub fn aux_coord(
        mut self,
        name: impl Into<String>,
        dim: impl Into<String>,
        points: Vec<CoordValue>,
    ) -> Self {
        self.coords.push(Coordinate::new(name, dim, points));
        self
    }

    /// Attach a scalar auxiliary coordinate.
    pub fn scalar_coord(mut self, name: impl Into<String>, point: CoordValue) -> Self {
        self.coords.push(Coordinate::scalar(name, point));
        self
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Set the row-major payload.
    pub fn data(mut self, data: Vec<f64>) -> Self {
        self.data = data;
        self
    }

    /// Validate shapes and produce the cube.
    pub fn build(self) -> CubeResult<DataCube> {
        let expected: usize = self.dims.iter().map(|(_, n)| n).product();
        if self.data.len() != expected {
            return Err(CubeError::InvalidCube(format!(
                "payload holds {} values but dimensions imply {}",
                self.data.len(),
                expected
            )));
        }

        for coord in &self.coords {
            match coord.dim() {
                Some(dim) => {
                    let len = self
                        .dims
                        .iter()
                        .find(|(d, _)| d == dim)
                        .map(|(_, n)| *n)
                        .ok_or_else(|| {
                            CubeError::InvalidCube(format!(
                                "coordinate '{}' references undeclared dimension '{}'",
                                coord.name(),
                                dim
                            ))
                        })?;
                    if coord.len() != len {
                        return Err(CubeError::InvalidCube(format!(
                            "coordinate '{}' holds {} points but dimension '{}' has length {}",
                            coord.name(),
                            coord.len(),
                            dim,
                            len
                        )));
                    }
                }
                None => {
                    if coord.len() != 1 {
                        return Err(CubeError::InvalidCube(format!(
                            "scalar coordinate '{}' holds {} points",
                            coord.name(),
                            coord.len()
                        )));
                    }
                }
            }
        }

        Ok(DataCube {
            name: self.name,
            units: self.units,
            attributes: self.attributes,
            dims: self.dims,
            coords: self.coords,
            data: self.data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_site_cube() -> DataCube {
        CubeBuilder::new("air_temperature", "K")
            .dimension("time", vec![CoordValue::Int(1487311200)])
            .dimension("index", vec![CoordValue::Int(0), CoordValue::Int(1)])
            .aux_coord(
                "altitude",
                "index",
                vec![CoordValue::Int(100), CoordValue::Int(101)],
            )
            .scalar_coord("forecast_period", CoordValue::Int(0))
            .attribute("mosg__model", "uk_det")
            .data(vec![280.0, 281.0])
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_validates_payload_length() {
        let result = CubeBuilder::new("air_temperature", "K")
            .dimension("time", vec![CoordValue::Int(0), CoordValue::Int(3600)])
            .data(vec![280.0])
            .build();
        assert!(matches!(result, Err(CubeError::InvalidCube(_))));
    }

    #[test]
    fn test_build_validates_coord_length() {
        let result = CubeBuilder::new("air_temperature", "K")
            .dimension("index", vec![CoordValue::Int(0), CoordValue::Int(1)])
            .aux_coord("altitude", "index", vec![CoordValue::Int(100)])
            .data(vec![280.0, 281.0])
            .build();
        assert!(matches!(result, Err(CubeError::InvalidCube(_))));
    }

    #[test]
    fn test_read_interface() {
        let cube = two_site_cube();
        assert_eq!(cube.name(), "air_temperature");
        assert_eq!(cube.units(), "K");
        assert_eq!(cube.attributes().get("mosg__model").unwrap(), "uk_det");
        assert!(cube.has_dim("index"));
        assert_eq!(cube.dim_len("index"), Some(2));
        assert_eq!(cube.coordinate("altitude").unwrap().len(), 2);
    }

    #[test]
    fn test_series_requires_collapsed_residual_dims() {
        let cube = two_site_cube();
        // Two sites remain, so a time series cannot be extracted.
        assert!(matches!(
            cube.series("time"),
            Err(CubeError::ShapeMismatch(_))
        ));

        let slices = cube.slice_along("index").unwrap();
        assert_eq!(slices[0].series("time").unwrap(), vec![280.0]);
        assert_eq!(slices[1].series("time").unwrap(), vec![281.0]);
    }

    #[test]
    fn test_series_unknown_dimension() {
        let cube = two_site_cube();
        assert!(matches!(
            cube.series("percentile"),
            Err(CubeError::UnknownDimension(_))
        ));
    }

    #[test]
    fn test_slice_along_collapses_aux_coords() {
        let cube = two_site_cube();
        let slices = cube.slice_along("index").unwrap();
        assert_eq!(slices.len(), 2);

        let altitude = slices[1].coordinate("altitude").unwrap();
        assert_eq!(altitude.points(), &[CoordValue::Int(101)]);

        // Scalar coordinates carry through unchanged.
        let fp = slices[1].coordinate("forecast_period").unwrap();
        assert_eq!(fp.scalar_point(), Some(&CoordValue::Int(0)));
    }

    #[test]
    fn test_slice_data_layout() {
        // 2 times x 2 sites, row-major: [t0s0, t0s1, t1s0, t1s1]
        let cube = CubeBuilder::new("air_temperature", "K")
            .dimension(
                "time",
                vec![CoordValue::Int(1487311200), CoordValue::Int(1487314800)],
            )
            .dimension("index", vec![CoordValue::Int(0), CoordValue::Int(1)])
            .data(vec![280.0, 281.0, 282.0, 283.0])
            .build()
            .unwrap();

        let sites = cube.slice_along("index").unwrap();
        assert_eq!(sites[0].series("time").unwrap(), vec![280.0, 282.0]);
        assert_eq!(sites[1].series("time").unwrap(), vec![281.0, 283.0]);

        let times = cube.slice_along("time").unwrap();
        assert_eq!(times[1].series("index").unwrap(), vec![282.0, 283.0]);
    }

    #[test]
    fn test_scalar_value() {
        let cube = CubeBuilder::new("air_temperature", "K")
            .dimension("time", vec![CoordValue::Int(1487311200)])
            .data(vec![280.0])
            .build()
            .unwrap();
        assert_eq!(cube.scalar_value().unwrap(), 280.0);

        assert!(two_site_cube().scalar_value().is_err());
    }
}
