//! Value model produced by evaluation
//!
//! [`ConfValue`] is the universal result type; [`coercion`] holds the
//! primitive conversions operators rely on.

pub mod coercion;
pub mod value;

pub use value::{ConfValue, Mapping};
