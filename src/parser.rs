// 🏛️ Bank Registry Parser - Banco de Portugal public-entity list
// Reads the bp_list.tsv snapshot (the LEFE AP_listas.xls export) into
// typed records. Row count and NIF field width are hard invariants:
// if either fails, the upstream snapshot changed and every hardcoded
// exception table downstream is suspect.

use crate::error::{ReconciliationError, ReconciliationResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Row count of the bp_list.tsv snapshot this crate's exception tables
/// were written against.
pub const EXPECTED_ROWS: usize = 5890;

/// Date formats accepted by the bank export, tried in order. First hit wins.
pub const DATE_FORMATS: [&str; 4] = ["%d/%m/%Y", "%d/%m/%y", "%d-%m-%y", "%d-%m-%Y"];

// ============================================================================
// RAW RECORD
// ============================================================================

/// One row of the bank registry, after field typing but before any
/// municipality-name mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Portuguese tax identification number (9 digits)
    pub nif: u32,

    /// Entity-type code as published by the bank
    pub entity_type: String,

    /// Entity name after syntax repair (see `parse_name`)
    pub name: String,

    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

// ============================================================================
// FIELD PARSERS
// ============================================================================

/// Parse a date field from the bank export.
///
/// Empty string means "no date". A non-empty value must match one of the
/// four `DATE_FORMATS`; anything else is fatal.
pub fn parse_date(value: &str, line: usize) -> ReconciliationResult<Option<NaiveDate>> {
    if value.is_empty() {
        return Ok(None);
    }

    for format in DATE_FORMATS {
        if !year_width_matches(value, format) {
            continue;
        }
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Ok(Some(date));
        }
    }

    Err(ReconciliationError::UnparseableDate {
        line,
        value: value.to_string(),
    })
}

/// chrono's `%Y` happily parses 1-3 digit years, so "25/04/74" would hit
/// the 4-digit format first and come out as year 74. The export's formats
/// are fixed-width; require the trailing year token to match.
fn year_width_matches(value: &str, format: &str) -> bool {
    let delimiter = if format.contains('/') { '/' } else { '-' };
    let year = value.rsplit(delimiter).next().unwrap_or("");
    let expected_len = if format.contains("%Y") { 4 } else { 2 };
    year.len() == expected_len && year.bytes().all(|b| b.is_ascii_digit())
}

/// Repair known transcription errors in an entity name.
///
/// The export carries a fixed set of typos:
/// - "MUNICÍPIOS" / "MUNICIPIO" / "MUNÍCIPIO" for "MUNICÍPIO"
/// - "CAMARA MUNICIPAL" for "CÂMARA MUNICIPAL"
/// - "CÂMARA MUNICIPAL MACEDO DE CAVALEIROS" missing its "DE"
///
/// Anything not in that set passes through with whitespace collapsed.
pub fn parse_name(value: &str) -> String {
    let mut words: Vec<&str> = value.split_whitespace().collect();

    if let Some(first) = words.first() {
        if matches!(*first, "MUNICÍPIOS" | "MUNICIPIO" | "MUNÍCIPIO") {
            words[0] = "MUNICÍPIO";
        } else if *first == "CAMARA" && words.get(1) == Some(&"MUNICIPAL") {
            words[0] = "CÂMARA";
        }
    }

    let repaired = words.join(" ");

    // One historically misspelled row dropped its "DE". Point fix, checked
    // after the token repairs so the unaccented form corrects too.
    if repaired == "CÂMARA MUNICIPAL MACEDO DE CAVALEIROS" {
        return "CÂMARA MUNICIPAL DE MACEDO DE CAVALEIROS".to_string();
    }

    repaired
}

// ============================================================================
// REGISTRY PARSER
// ============================================================================

/// Parser for the 5-column tab-separated bank registry.
pub struct BankRegistryParser {
    /// Rows the snapshot must have. Overridable for tests with synthetic
    /// registries; production callers keep the default.
    pub expected_rows: usize,
}

impl BankRegistryParser {
    pub fn new() -> Self {
        BankRegistryParser {
            expected_rows: EXPECTED_ROWS,
        }
    }

    pub fn with_expected_rows(expected_rows: usize) -> Self {
        BankRegistryParser { expected_rows }
    }

    /// Parse the registry from TSV text.
    pub fn parse_str(&self, data: &str) -> ReconciliationResult<Vec<RawRecord>> {
        self.parse_bytes(data.as_bytes())
    }

    /// Parse the registry from raw TSV bytes. The export is converted to
    /// UTF-8 upstream; a row that still fails to decode is fatal.
    pub fn parse_bytes(&self, data: &[u8]) -> ReconciliationResult<Vec<RawRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .from_reader(data);

        let mut rows: Vec<csv::StringRecord> = Vec::new();
        for row in reader.records() {
            let record = row.map_err(|_| ReconciliationError::UnreadableRow {
                line: rows.len() + 1,
            })?;
            rows.push(record);
        }

        if rows.len() != self.expected_rows {
            return Err(ReconciliationError::RowCountMismatch {
                expected: self.expected_rows,
                actual: rows.len(),
            });
        }

        let mut records = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            records.push(self.parse_row(row, index + 1)?);
        }

        Ok(records)
    }

    fn parse_row(
        &self,
        row: &csv::StringRecord,
        line: usize,
    ) -> ReconciliationResult<RawRecord> {
        if row.len() != 5 {
            return Err(ReconciliationError::MalformedRow {
                line,
                columns: row.len(),
            });
        }
        let field = |i: usize| row.get(i).unwrap_or("");

        let nif_field = field(0);
        // Width check is on the string, not the numeric range. The export
        // pads nothing, so 9 characters means 9 digits in practice.
        if nif_field.chars().count() != 9 {
            return Err(ReconciliationError::MalformedTaxId {
                line,
                value: nif_field.to_string(),
            });
        }
        let nif: u32 = nif_field
            .parse()
            .map_err(|_| ReconciliationError::MalformedTaxId {
                line,
                value: nif_field.to_string(),
            })?;

        Ok(RawRecord {
            nif,
            entity_type: field(1).to_string(),
            name: parse_name(field(2)),
            start_date: parse_date(field(3), line)?,
            end_date: parse_date(field(4), line)?,
        })
    }
}

impl Default for BankRegistryParser {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
