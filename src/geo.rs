// 🌍 Geographic Registry Interface - CAOP municipalities and districts
// The CAOP loader proper lives outside this crate; everything here only
// needs the two sequences it returns.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ============================================================================
// REGISTRY TYPES
// ============================================================================

/// A municipality as CAOP publishes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoMunicipality {
    /// Canonical name (accented, upper case)
    pub name: String,

    /// Code of the district (or island, for the autonomous regions) the
    /// municipality belongs to
    pub district_code: String,
}

/// A district as CAOP publishes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoDistrict {
    pub code: String,
    pub name: String,
}

// ============================================================================
// SOURCE TRAIT
// ============================================================================

/// Seam for the external CAOP loader.
///
/// Implementations own acquisition and format concerns; the reconciler
/// consumes only these two sequences.
pub trait GeoSource {
    fn municipalities(&self) -> Result<Vec<GeoMunicipality>>;

    fn districts(&self) -> Result<Vec<GeoDistrict>>;
}

// ============================================================================
// CSV-BACKED SOURCE
// ============================================================================

/// Reads the two CAOP sequences from headered CSV files, one per sequence.
/// This is the implementation the binary uses.
pub struct CsvGeoSource {
    municipalities_path: PathBuf,
    districts_path: PathBuf,
}

impl CsvGeoSource {
    pub fn new(municipalities_path: &Path, districts_path: &Path) -> Self {
        CsvGeoSource {
            municipalities_path: municipalities_path.to_path_buf(),
            districts_path: districts_path.to_path_buf(),
        }
    }
}

impl GeoSource for CsvGeoSource {
    fn municipalities(&self) -> Result<Vec<GeoMunicipality>> {
        let mut reader = csv::Reader::from_path(&self.municipalities_path)
            .with_context(|| {
                format!(
                    "failed to open municipality registry {}",
                    self.municipalities_path.display()
                )
            })?;

        let mut municipalities = Vec::new();
        for row in reader.deserialize() {
            let municipality: GeoMunicipality =
                row.context("failed to deserialize municipality row")?;
            municipalities.push(municipality);
        }
        Ok(municipalities)
    }

    fn districts(&self) -> Result<Vec<GeoDistrict>> {
        let mut reader = csv::Reader::from_path(&self.districts_path).with_context(|| {
            format!(
                "failed to open district registry {}",
                self.districts_path.display()
            )
        })?;

        let mut districts = Vec::new();
        for row in reader.deserialize() {
            let district: GeoDistrict = row.context("failed to deserialize district row")?;
            districts.push(district);
        }
        Ok(districts)
    }
}

// ============================================================================
// TESTS
// ============================================================================
