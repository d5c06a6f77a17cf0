//! Shoe catalogue for the stride matcher.
//!
//! This crate provides:
//! - The immutable [`ShoeRecord`] model and the category taxonomy.
//! - A validated, id-indexed [`Catalogue`].
//! - [`CatalogueProvider`] implementations for static and file-backed catalogues.
//!
//! # Examples
//!
//! ```
//! use stride_catalogue::{Catalogue, Category};
//!
//! let json = r#"[{
//!     "id": "pegasus-41",
//!     "brand": "Nike",
//!     "model": "Pegasus",
//!     "version": "41",
//!     "categories": { "daily": true },
//!     "feel": { "cushion": 3, "bounce": 3, "stability": 3, "rocker": 2, "ground_feel": 3, "weight_feel": 3 },
//!     "specs": { "weight_g": 280, "heel_drop_mm": 10.0 }
//! }]"#;
//!
//! let catalogue = Catalogue::from_json_str(json).unwrap();
//! let shoe = catalogue.get("pegasus-41").unwrap();
//! assert!(shoe.categories.has(Category::Daily));
//! ```

#![deny(unsafe_code)]

/// Validated catalogue storage and providers.
pub mod store;
/// Shoe record model and taxonomy.
pub mod types;

pub use store::{
    Catalogue, CatalogueError, CatalogueFormat, CatalogueProvider, FileCatalogue, StaticCatalogue,
};
pub use types::{
    Category, CategoryFlags, Descriptions, DropBucket, FeelDimension, FeelScores, Fit, Meta,
    PlateMaterial, PriceTier, ReleaseStatus, ShoeRecord, Specs, Support, Surface, ToeBox, Volume,
    WetGrip, Width,
};

/// Result type for catalogue operations.
pub type Result<T> = std::result::Result<T, CatalogueError>;
