// Portuguese Municipality NIF Reconciliation - Core Library
// Joins the Banco de Portugal public-entity registry (NIFs) against the
// CAOP geographic registry (municipality and district names) into one
// validated table of 308 municipalities.

pub mod cache;
pub mod error;
pub mod geo;
pub mod normalizer;
pub mod parser;
pub mod reconciler;

// Re-export commonly used types
pub use cache::{source_digest, CachedArtifact, ResultCache, CACHE_KEY};
pub use error::{ReconciliationError, ReconciliationResult};
pub use geo::{CsvGeoSource, GeoDistrict, GeoMunicipality, GeoSource};
pub use normalizer::NameMapping;
pub use parser::{parse_date, parse_name, BankRegistryParser, RawRecord, EXPECTED_ROWS};
pub use reconciler::{
    strip_municipal_prefix, GeoIndex, ReconciledMunicipality, ReconciliationEngine,
    EXPECTED_MUNICIPALITIES,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
