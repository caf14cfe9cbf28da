//! Forecast normalization for the dashboard views.
//!
//! Raw 3-hourly samples go through [`day_aggregation`] to build the
//! multi-day summary; one selected day then goes through
//! [`interpolation`] to produce an hourly series, and [`windows`] finds
//! the contiguous rainy stretches in it.
//!
//! Everything here is a pure function of its inputs.

pub mod day_aggregation;
pub mod interpolation;
pub mod windows;
