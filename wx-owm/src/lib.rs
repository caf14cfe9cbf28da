pub mod calendar;
#[cfg(feature = "api")]
pub mod client;
pub mod current;
pub mod payload;
pub mod sample;
