// ⚖️ Reconciliation Engine - Join bank NIFs to CAOP municipalities
// Builds a name-keyed index over the geographic registry, matches every
// municipal bank record against it, and refuses to emit anything unless
// the result is exactly the national municipality count.

use crate::error::{ReconciliationError, ReconciliationResult};
use crate::geo::{GeoDistrict, GeoMunicipality};
use crate::normalizer::NameMapping;
use crate::parser::RawRecord;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Number of Portuguese municipalities. Both registries must agree on it.
pub const EXPECTED_MUNICIPALITIES: usize = 308;

/// Entity-name prefixes that mark a bank record as a municipality.
/// Checked in order; every other record is a parish or other public body
/// and is skipped.
pub const MUNICIPAL_PREFIXES: [&str; 2] = ["MUNICÍPIO", "CÂMARA MUNICIPAL"];

// ============================================================================
// OUTPUT RECORD
// ============================================================================

/// One row of the final joined table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledMunicipality {
    pub name: String,

    #[serde(rename = "NIF")]
    pub nif: u32,

    pub district: String,
}

// ============================================================================
// GEO INDEX
// ============================================================================

/// Index value: the CAOP municipality with its district name resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub municipality: GeoMunicipality,
    pub district_name: String,
}

/// Lookup index over the geographic registry. Keys are municipality names,
/// district-qualified ("NAME / DISTRICT") where the bare name is shared by
/// more than one municipality. Entries are removed as they are consumed.
pub type GeoIndex = HashMap<String, IndexEntry>;

fn qualified_key(name: &str, district_name: &str) -> String {
    format!("{} / {}", name, district_name)
}

// ============================================================================
// RECONCILIATION ENGINE
// ============================================================================

pub struct ReconciliationEngine {
    /// Required output cardinality. Overridable for tests with synthetic
    /// registries; production callers keep the default.
    pub expected_municipalities: usize,

    /// Correction table applied to bare municipality names before lookup.
    pub mapping: NameMapping,
}

impl ReconciliationEngine {
    pub fn new() -> Self {
        ReconciliationEngine {
            expected_municipalities: EXPECTED_MUNICIPALITIES,
            mapping: NameMapping::new(),
        }
    }

    pub fn with_expected_count(expected_municipalities: usize) -> Self {
        ReconciliationEngine {
            expected_municipalities,
            mapping: NameMapping::new(),
        }
    }

    pub fn with_mapping(mut self, mapping: NameMapping) -> Self {
        self.mapping = mapping;
        self
    }

    /// Build the name index over the geographic registry.
    ///
    /// When two municipalities share a name, both are re-keyed to the
    /// district-qualified form; the bare name stops being a valid key.
    /// A collision that survives qualification means the registry itself
    /// is inconsistent.
    pub fn build_geo_index(
        &self,
        municipalities: &[GeoMunicipality],
        districts: &[GeoDistrict],
    ) -> ReconciliationResult<GeoIndex> {
        let districts_index: HashMap<&str, &GeoDistrict> =
            districts.iter().map(|d| (d.code.as_str(), d)).collect();

        let mut index = GeoIndex::new();
        // Bare names already found to be shared; later homonyms go straight
        // to the qualified key.
        let mut contested: HashSet<String> = HashSet::new();

        for municipality in municipalities {
            let district = districts_index
                .get(municipality.district_code.as_str())
                .ok_or_else(|| ReconciliationError::UnresolvedDistrict {
                    municipality: municipality.name.clone(),
                    district_code: municipality.district_code.clone(),
                })?;

            let entry = IndexEntry {
                municipality: municipality.clone(),
                district_name: district.name.clone(),
            };

            if contested.contains(&municipality.name) {
                let key = qualified_key(&municipality.name, &entry.district_name);
                insert_unique(&mut index, key, entry)?;
            } else if let Some(existing) = index.remove(&municipality.name) {
                // First homonym: the earlier entry loses its bare key too.
                contested.insert(municipality.name.clone());

                let existing_key =
                    qualified_key(&existing.municipality.name, &existing.district_name);
                insert_unique(&mut index, existing_key, existing)?;

                let key = qualified_key(&municipality.name, &entry.district_name);
                insert_unique(&mut index, key, entry)?;
            } else {
                insert_unique(&mut index, municipality.name.clone(), entry)?;
            }
        }

        Ok(index)
    }

    /// Produce the joined table.
    ///
    /// Municipal records must all resolve; each index entry may be consumed
    /// at most once; the result must have exactly the expected cardinality.
    /// Everything else aborts the run.
    pub fn reconcile(
        &self,
        records: &[RawRecord],
        municipalities: &[GeoMunicipality],
        districts: &[GeoDistrict],
    ) -> ReconciliationResult<Vec<ReconciledMunicipality>> {
        let mut index = self.build_geo_index(municipalities, districts)?;

        let mut results = Vec::with_capacity(self.expected_municipalities);
        for record in records {
            let Some(bare) = strip_municipal_prefix(&record.name) else {
                continue;
            };
            let mapped = self.mapping.map(bare);

            // Removing on hit is what enforces at-most-one consumption:
            // a second record for the same municipality misses.
            match index.remove(mapped) {
                Some(entry) => results.push(ReconciledMunicipality {
                    name: mapped.to_string(),
                    nif: record.nif,
                    district: entry.district_name,
                }),
                None => {
                    return Err(ReconciliationError::UnresolvedMunicipality {
                        name: mapped.to_string(),
                    })
                }
            }
        }

        if results.len() != self.expected_municipalities {
            return Err(ReconciliationError::CardinalityMismatch {
                expected: self.expected_municipalities,
                actual: results.len(),
            });
        }

        Ok(results)
    }
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip the municipal entity prefix and its trailing space, if present.
/// Returns `None` for non-municipal entities.
pub fn strip_municipal_prefix(name: &str) -> Option<&str> {
    for prefix in MUNICIPAL_PREFIXES {
        if let Some(rest) = name.strip_prefix(prefix) {
            return Some(rest.strip_prefix(' ').unwrap_or(rest));
        }
    }
    None
}

fn insert_unique(
    index: &mut GeoIndex,
    key: String,
    entry: IndexEntry,
) -> ReconciliationResult<()> {
    if index.contains_key(&key) {
        return Err(ReconciliationError::DuplicateIndexKey { key });
    }
    index.insert(key, entry);
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
