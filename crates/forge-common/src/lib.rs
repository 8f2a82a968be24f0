//! Common types shared across the meteoforge crates.
//!
//! Everything in here is about *where* and *when*: coordinate reference
//! systems, validated locations, polygonal areas and time periods.

pub mod area;
pub mod bbox;
pub mod crs;
pub mod error;
pub mod location;
pub mod naming;
pub mod period;

pub use area::{AllowedArea, LocationFilter, PolygonalArea};
pub use bbox::BoundingBox;
pub use crs::{AxisBounds, AxisOrder, BuiltinCrsRegistry, CanonicalPoint, CrsCode, CrsDefinition, CrsKind, CrsRegistry};
pub use error::{GeoError, GeoResult};
pub use location::{Location, LocationValidator, LOCATION_EPSILON};
pub use period::{LeadTimePeriod, Period, TimePeriod};
