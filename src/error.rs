// ⚠️ Reconciliation Errors - Every invariant violation is fatal
// The two source registries are static historical snapshots, so any
// deviation means the snapshot changed or the exception tables are stale.
// Either way: stop, never produce a wrong table.

// ============================================================================
// RECONCILIATION ERROR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationError {
    /// The bank TSV no longer has the expected number of rows
    RowCountMismatch { expected: usize, actual: usize },

    /// A bank row the reader could not decode at all (bad encoding)
    UnreadableRow { line: usize },

    /// A bank row does not have exactly 5 tab-separated columns
    MalformedRow { line: usize, columns: usize },

    /// Column 1 of a bank row is not exactly 9 characters, or does not
    /// parse as an integer
    MalformedTaxId { line: usize, value: String },

    /// A non-empty date field matched none of the four accepted formats
    UnparseableDate { line: usize, value: String },

    /// A normalized municipality name has no GeoIndex entry, or the entry
    /// was already consumed by an earlier record
    UnresolvedMunicipality { name: String },

    /// A municipality references a district code absent from the district
    /// registry
    UnresolvedDistrict { municipality: String, district_code: String },

    /// Two GeoIndex keys still collide after district qualification
    DuplicateIndexKey { key: String },

    /// The final table does not have the expected number of municipalities
    CardinalityMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for ReconciliationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconciliationError::RowCountMismatch { expected, actual } => {
                write!(
                    f,
                    "bank registry row count changed: expected {} rows, found {}",
                    expected, actual
                )
            }
            ReconciliationError::UnreadableRow { line } => {
                write!(f, "line {}: row could not be decoded", line)
            }
            ReconciliationError::MalformedRow { line, columns } => {
                write!(f, "line {}: expected 5 columns, found {}", line, columns)
            }
            ReconciliationError::MalformedTaxId { line, value } => {
                write!(f, "line {}: NIF field {:?} is not a 9-digit value", line, value)
            }
            ReconciliationError::UnparseableDate { line, value } => {
                write!(f, "line {}: date {:?} matches no accepted format", line, value)
            }
            ReconciliationError::UnresolvedMunicipality { name } => {
                write!(f, "municipality {:?} not found in the geographic index", name)
            }
            ReconciliationError::UnresolvedDistrict {
                municipality,
                district_code,
            } => {
                write!(
                    f,
                    "municipality {:?} references unknown district code {:?}",
                    municipality, district_code
                )
            }
            ReconciliationError::DuplicateIndexKey { key } => {
                write!(f, "index key {:?} collides after district qualification", key)
            }
            ReconciliationError::CardinalityMismatch { expected, actual } => {
                write!(
                    f,
                    "reconciled {} municipalities, expected exactly {}",
                    actual, expected
                )
            }
        }
    }
}

impl std::error::Error for ReconciliationError {}

/// Convenience alias used throughout the matching pipeline.
pub type ReconciliationResult<T> = Result<T, ReconciliationError>;
