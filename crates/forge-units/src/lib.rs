//! Parameter harmonization.
//!
//! A [`CatalogEntry`] links one physical quantity to the unit it is expressed
//! in by the original provider and in the SI, imperial and US systems. The
//! [`ParameterHarmonizer`] uses those unit strings and a [`UnitConverter`] to
//! move values between systems; it holds no quantity-specific knowledge.
//!
//! # Example
//!
//! ```rust
//! use forge_units::{ParameterCatalog, ParameterHarmonizer, UnitSystem};
//!
//! let catalog = ParameterCatalog::eccodes_defaults().unwrap();
//! let entry = catalog.get("2t").unwrap();
//! let harmonizer = ParameterHarmonizer::new();
//!
//! let fahrenheit = harmonizer
//!     .to_system(273.15, entry, UnitSystem::Si, UnitSystem::Imperial)
//!     .unwrap();
//! assert!((fahrenheit - 32.0).abs() < 1e-9);
//! ```

pub mod catalog;
pub mod convert;
pub mod error;
pub mod harmonizer;
pub mod system;

pub use catalog::{CatalogEntry, ParameterCatalog, RawCatalogEntry};
pub use convert::{Dimension, DimensionalConverter, UnitConverter};
pub use error::{HarmonizeError, HarmonizeResult};
pub use harmonizer::{HarmonizedParameter, ParameterHarmonizer};
pub use system::UnitSystem;
