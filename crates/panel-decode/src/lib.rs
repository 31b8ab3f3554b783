//! panel-decode
//!
//! Positional tabular decoding: converts the backend's `{CAM, DAD, RET}`
//! envelope into tagged [`RawRow`] values for a given [`RecordKind`].
//!
//! Contract:
//! - no row is dropped or reordered
//! - arity/type mismatches fail with `PanelError::Decode` naming the row
//! - a non-zero backend return code is surfaced as a warning flag, not an
//!   error; the rows are still decoded and returned
//! - an absent return code decodes as 0 (success) — the settlement
//!   endpoint omits it
//!
//! This crate does **not**:
//! - fetch data (see panel-client)
//! - parse dates or aggregate (see panel-aggregate)

use serde::Deserialize;
use serde_json::Value;

use panel_core::{PanelError, RawRow, RecordKind};

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Raw response envelope shared by the bulk endpoints.
///
/// `CAM` carries column headers, `DAD` the positional data rows, `RET`
/// the backend return code.
#[derive(Debug, Clone, Deserialize)]
pub struct TableEnvelope {
    #[serde(rename = "CAM", default)]
    pub columns: Vec<String>,
    #[serde(rename = "DAD", default)]
    pub rows: Vec<Vec<Value>>,
    #[serde(rename = "RET", default)]
    pub return_code: Option<i64>,
}

/// Decode output: typed rows plus the degraded-data signal.
#[derive(Debug, Clone)]
pub struct DecodedTable {
    pub kind: RecordKind,
    pub rows: Vec<RawRow>,
    pub return_code: i64,
    /// True when the backend reported a non-zero return code. Callers
    /// decide whether to treat the payload as degraded.
    pub warning: bool,
}

// ---------------------------------------------------------------------------
// Positional cell readers
// ---------------------------------------------------------------------------

fn cell_i64(row: &[Value], col: usize, row_ix: usize) -> Result<i64, PanelError> {
    row[col].as_i64().ok_or_else(|| {
        PanelError::decode(row_ix, format!("expected integer in column {col}, got {}", row[col]))
    })
}

fn cell_str(row: &[Value], col: usize, row_ix: usize) -> Result<String, PanelError> {
    row[col].as_str().map(str::to_owned).ok_or_else(|| {
        PanelError::decode(row_ix, format!("expected string in column {col}, got {}", row[col]))
    })
}

fn cell_opt_str(row: &[Value], col: usize, row_ix: usize) -> Result<Option<String>, PanelError> {
    if row[col].is_null() {
        return Ok(None);
    }
    cell_str(row, col, row_ix).map(Some)
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Map every positional tuple of `envelope` into the row variant for
/// `kind`.
pub fn decode(envelope: &TableEnvelope, kind: RecordKind) -> Result<DecodedTable, PanelError> {
    let mut rows = Vec::with_capacity(envelope.rows.len());

    for (row_ix, cells) in envelope.rows.iter().enumerate() {
        if cells.len() != kind.arity() {
            return Err(PanelError::decode(
                row_ix,
                format!(
                    "{} row has {} columns, expected {}",
                    kind.as_str(),
                    cells.len(),
                    kind.arity()
                ),
            ));
        }
        rows.push(decode_row(cells, kind, row_ix)?);
    }

    let return_code = envelope.return_code.unwrap_or(0);
    Ok(DecodedTable {
        kind,
        rows,
        return_code,
        warning: return_code != 0,
    })
}

fn decode_row(cells: &[Value], kind: RecordKind, row_ix: usize) -> Result<RawRow, PanelError> {
    match kind {
        // [company, open, oldest_open|null, closed, oldest_unconsolidated]
        RecordKind::RegisterState => Ok(RawRow::RegisterState {
            company_code: cell_i64(cells, 0, row_ix)?,
            open_count: cell_i64(cells, 1, row_ix)?,
            oldest_open_date: cell_opt_str(cells, 2, row_ix)?,
            closed_count: cell_i64(cells, 3, row_ix)?,
            oldest_unconsolidated_date: cell_str(cells, 4, row_ix)?,
        }),

        // [company, record_count, date, matched, unmatched]
        RecordKind::Reconciliation => Ok(RawRow::Reconciliation {
            company_code: cell_i64(cells, 0, row_ix)?,
            record_count: cell_i64(cells, 1, row_ix)?,
            date: cell_str(cells, 2, row_ix)?,
            matched_count: cell_i64(cells, 3, row_ix)?,
            unmatched_count: cell_i64(cells, 4, row_ix)?,
        }),

        // [company, card_count, date, received, in_open_batch, open, total]
        RecordKind::Settlement => Ok(RawRow::Settlement {
            company_code: cell_i64(cells, 0, row_ix)?,
            card_count: cell_i64(cells, 1, row_ix)?,
            date: cell_str(cells, 2, row_ix)?,
            received: cell_i64(cells, 3, row_ix)?,
            in_open_batch: cell_i64(cells, 4, row_ix)?,
            open: cell_i64(cells, 5, row_ix)?,
            total: cell_i64(cells, 6, row_ix)?,
        }),
    }
}
