//! # printdesk-catalog
//!
//! Paper compatibility resolution over the catalog graph:
//!
//! ```text
//! PaperType ──< PaperWeight >── PaperSize
//! ProductType ── ProductTypeSpecification (explicit allow-lists)
//! ```
//!
//! Reads load the ledger without locking. Resolve-or-create and every admin
//! write run as one lock-scoped ledger transaction; the store's unordered
//! dimension constraint backs up the resolve-or-create lookup.

pub mod catalog;
pub mod custom_size;
pub mod error;
pub mod resolver;
pub mod seed;

pub use catalog::PaperCatalog;
pub use custom_size::{
    CUSTOM_SIZE_PREFIX, CustomSizeRequest, SizeResolution, next_custom_size_name,
    resolve_or_create_in,
};
pub use error::CatalogError;
pub use resolver::{
    SpecificationView, compatible_sizes_in, compatible_weights_in, specification_for_in,
};
pub use seed::{STANDARD_SIZES, SeedReport, StandardSize, seed_standard_sizes_in};
