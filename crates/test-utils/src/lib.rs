//! Shared test fixtures for the spot-export workspace.

pub mod fixtures;

pub use fixtures::{concat_time_series, spot_cube, spot_cube_at, VALIDITY_TIME};
