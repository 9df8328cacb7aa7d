//! Spot forecast cube fixtures.
//!
//! Builders producing the cube shapes the tabularization tests work with:
//! one validity time, one percentile and a configurable number of sites,
//! with the auxiliary coordinates (latitude, longitude, altitude, WMO site
//! number, forecast period, forecast reference time) a post-processed spot
//! cube carries.

use cube_model::{CoordValue, CubeBuilder, DataCube};

/// Default validity time used by the fixtures: 2017-02-17 06:00:00 UTC.
pub const VALIDITY_TIME: i64 = 1487311200;

/// A spot cube at the default validity time and zero forecast period.
pub fn spot_cube(point_data: f64, n_sites: usize) -> DataCube {
    spot_cube_at(point_data, VALIDITY_TIME, 0, n_sites)
}

/// A spot cube at a given validity time and forecast period (hours).
///
/// Every site carries the same payload value. Dimensions are time,
/// percentile and site index; altitude starts at 100 m and WMO site
/// numbers at 1000, increasing per site.
pub fn spot_cube_at(
    point_data: f64,
    validity_time: i64,
    forecast_period_hours: i64,
    n_sites: usize,
) -> DataCube {
    let indices: Vec<CoordValue> = (0..n_sites as i64).map(CoordValue::Int).collect();
    let latitudes = vec![CoordValue::Float(54.0); n_sites];
    let longitudes: Vec<CoordValue> = (0..n_sites as i64).map(CoordValue::Int).collect();
    let altitudes: Vec<CoordValue> =
        (0..n_sites as i64).map(|i| CoordValue::Int(100 + i)).collect();
    let wmo_sites: Vec<CoordValue> =
        (0..n_sites as i64).map(|i| CoordValue::Int(1000 + i)).collect();

    let forecast_period_secs = forecast_period_hours * 3600;
    CubeBuilder::new("air_temperature", "K")
        .dimension("time", vec![CoordValue::Int(validity_time)])
        .dimension("percentile", vec![CoordValue::Float(50.0)])
        .dimension("index", indices)
        .aux_coord("latitude", "index", latitudes)
        .aux_coord("longitude", "index", longitudes)
        .aux_coord("altitude", "index", altitudes)
        .aux_coord("wmo_site", "index", wmo_sites)
        .aux_coord(
            "forecast_period",
            "time",
            vec![CoordValue::Int(forecast_period_secs)],
        )
        .scalar_coord(
            "forecast_reference_time",
            CoordValue::Int(validity_time - forecast_period_secs),
        )
        .data(vec![point_data; n_sites])
        .build()
        .expect("fixture cube must be valid")
}

/// Concatenate single-time spot cubes along the time dimension.
///
/// Mirrors what upstream cube handling does before pivoting: the result
/// carries one time point per input cube, with forecast period and
/// forecast reference time varying along time. All inputs must share the
/// same site layout.
pub fn concat_time_series(cubes: &[DataCube]) -> DataCube {
    let first = cubes.first().expect("need at least one cube");
    let n_sites = first.dim_len("index").expect("fixture cubes have sites");

    let mut times = Vec::with_capacity(cubes.len());
    let mut periods = Vec::with_capacity(cubes.len());
    let mut reference_times = Vec::with_capacity(cubes.len());
    let mut data = Vec::with_capacity(cubes.len() * n_sites);

    for cube in cubes {
        assert_eq!(
            cube.dim_len("index"),
            Some(n_sites),
            "all cubes must share the same site layout"
        );
        let scalar_point = |name: &str| {
            cube.coordinate(name)
                .and_then(|c| c.scalar_point())
                .cloned()
                .expect("single-time fixture cube")
        };
        times.push(scalar_point("time"));
        periods.push(scalar_point("forecast_period"));
        reference_times.push(scalar_point("forecast_reference_time"));

        for site in cube.slice_along("index").expect("fixture cubes have sites") {
            data.push(site.scalar_value().expect("one value per site"));
        }
    }

    let site_points = |name: &str| {
        first
            .coordinate(name)
            .expect("fixture cubes carry site coordinates")
            .points()
            .to_vec()
    };

    CubeBuilder::new(first.name(), first.units())
        .dimension("time", times)
        .dimension("percentile", vec![CoordValue::Float(50.0)])
        .dimension(
            "index",
            (0..n_sites as i64).map(CoordValue::Int).collect(),
        )
        .aux_coord("latitude", "index", site_points("latitude"))
        .aux_coord("longitude", "index", site_points("longitude"))
        .aux_coord("altitude", "index", site_points("altitude"))
        .aux_coord("wmo_site", "index", site_points("wmo_site"))
        .aux_coord("forecast_period", "time", periods)
        .aux_coord("forecast_reference_time", "time", reference_times)
        .data(data)
        .build()
        .expect("concatenated fixture cube must be valid")
}
