//! Saved calculation snapshot.
//!
//! # Responsibility
//! - Define the persisted `SavedPeptide` record and its JSON field names.
//! - Issue timestamp-based ids that never repeat within one process and
//!   stay above every id already observed in storage.
//!
//! # Invariants
//! - `name` is non-empty after trimming; `id` is non-empty.
//! - Numeric fields are finite, so the JSON encoding never degrades to `null`.
//! - Input and result fields are frozen at save time and never recomputed.

use crate::model::dosage::{DosageInput, DosageResult};
use crate::model::syringe::syringe_label;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicI64, Ordering};

/// Identifier of a saved calculation (epoch milliseconds as decimal text).
pub type PeptideId = String;

static LAST_ISSUED_ID_MS: AtomicI64 = AtomicI64::new(0);

/// Validation error for saved records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavedPeptideValidationError {
    EmptyName,
    EmptyId,
    /// Wire name of a numeric field holding NaN or an infinity.
    NonFinite(&'static str),
}

impl Display for SavedPeptideValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "calculation name must not be empty"),
            Self::EmptyId => write!(f, "saved peptide id must not be empty"),
            Self::NonFinite(field) => write!(f, "saved peptide field `{field}` must be finite"),
        }
    }
}

impl Error for SavedPeptideValidationError {}

/// Named calculation snapshot as persisted in the saved list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPeptide {
    pub id: PeptideId,
    /// User-supplied display name, stored as entered.
    pub name: String,
    /// Display-formatted local date captured at save time.
    pub date: String,
    pub peptide_amount: f64,
    pub peptide_unit: String,
    pub bacteriostatic_water: f64,
    pub syringe_size: String,
    pub desired_dose: f64,
    pub desired_dose_unit: String,
    /// Frozen `DosageResult::draw_amount_ml`.
    pub draw_amount: f64,
    /// Frozen `DosageResult::units`.
    pub units: f64,
}

impl SavedPeptide {
    /// Snapshots an input/result pair under a name.
    ///
    /// # Errors
    /// - `EmptyName` when `name` is blank after trimming.
    /// - `EmptyId` when `id` is blank.
    /// - `NonFinite` when an input or result value is NaN or infinite.
    pub fn new(
        id: impl Into<PeptideId>,
        name: impl Into<String>,
        date: impl Into<String>,
        input: &DosageInput,
        result: &DosageResult,
    ) -> Result<Self, SavedPeptideValidationError> {
        let record = Self {
            id: id.into(),
            name: name.into(),
            date: date.into(),
            peptide_amount: input.peptide_amount,
            peptide_unit: input.peptide_unit.clone(),
            bacteriostatic_water: input.bacteriostatic_water,
            syringe_size: input.syringe_size.clone(),
            desired_dose: input.desired_dose,
            desired_dose_unit: input.desired_dose_unit.clone(),
            draw_amount: result.draw_amount_ml,
            units: result.units,
        };
        record.validate()?;
        Ok(record)
    }

    /// Checks record invariants.
    pub fn validate(&self) -> Result<(), SavedPeptideValidationError> {
        if self.id.trim().is_empty() {
            return Err(SavedPeptideValidationError::EmptyId);
        }
        if self.name.trim().is_empty() {
            return Err(SavedPeptideValidationError::EmptyName);
        }
        for (field, value) in [
            ("peptideAmount", self.peptide_amount),
            ("bacteriostaticWater", self.bacteriostatic_water),
            ("desiredDose", self.desired_dose),
            ("drawAmount", self.draw_amount),
            ("units", self.units),
        ] {
            if !value.is_finite() {
                return Err(SavedPeptideValidationError::NonFinite(field));
            }
        }
        Ok(())
    }

    /// Input fields of the snapshot.
    pub fn input(&self) -> DosageInput {
        DosageInput {
            peptide_amount: self.peptide_amount,
            peptide_unit: self.peptide_unit.clone(),
            bacteriostatic_water: self.bacteriostatic_water,
            syringe_size: self.syringe_size.clone(),
            desired_dose: self.desired_dose,
            desired_dose_unit: self.desired_dose_unit.clone(),
        }
    }

    /// Frozen result of the snapshot.
    pub fn result(&self) -> DosageResult {
        DosageResult {
            draw_amount_ml: self.draw_amount,
            units: self.units,
        }
    }

    /// Multi-line syringe details summary for a detail dialog.
    pub fn details_text(&self) -> String {
        format!(
            "Name: {}\n\n\
             Peptide Amount: {} {}\n\
             Bacteriostatic Water: {} ml\n\
             Syringe Size: {}\n\
             Desired Dose: {} {}\n\n\
             → Draw Amount: {} ml ({} units)",
            self.name,
            self.peptide_amount,
            self.peptide_unit,
            self.bacteriostatic_water,
            syringe_label(&self.syringe_size),
            self.desired_dose,
            self.desired_dose_unit,
            self.draw_amount,
            self.units
        )
    }
}

/// Issues a new id from `now_ms`.
///
/// Ids are strictly increasing per process: a second call within the same
/// millisecond (or after a clock step backwards) gets `last + 1`.
pub fn next_peptide_id(now_ms: i64) -> PeptideId {
    let mut last = LAST_ISSUED_ID_MS.load(Ordering::SeqCst);
    loop {
        let candidate = if now_ms > last { now_ms } else { last + 1 };
        match LAST_ISSUED_ID_MS.compare_exchange(
            last,
            candidate,
            Ordering::SeqCst,
            Ordering::SeqCst,
        ) {
            Ok(_) => return candidate.to_string(),
            Err(actual) => last = actual,
        }
    }
}

/// Raises the id floor to `id` when it is a persisted timestamp id.
///
/// Ids that are not decimal integers are ignored; they cannot collide with
/// generated ones.
pub fn observe_peptide_id(id: &str) {
    if let Ok(value) = id.trim().parse::<i64>() {
        LAST_ISSUED_ID_MS.fetch_max(value, Ordering::SeqCst);
    }
}

/// Formats a save date as `M/D/YYYY`.
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::{format_display_date, next_peptide_id, observe_peptide_id};
    use chrono::NaiveDate;

    #[test]
    fn ids_are_strictly_increasing_for_same_timestamp() {
        let first: i64 = next_peptide_id(1_700_000_000_000).parse().unwrap();
        let second: i64 = next_peptide_id(1_700_000_000_000).parse().unwrap();
        let third: i64 = next_peptide_id(1).parse().unwrap();
        assert!(second > first);
        assert!(third > second);
    }

    #[test]
    fn observed_ids_raise_the_floor() {
        observe_peptide_id("4102444800000");
        observe_peptide_id("not-a-timestamp");
        let next: i64 = next_peptide_id(1_700_000_000_000).parse().unwrap();
        assert!(next > 4_102_444_800_000);
    }

    #[test]
    fn display_date_has_no_zero_padding() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(format_display_date(date), "3/7/2026");
    }
}
