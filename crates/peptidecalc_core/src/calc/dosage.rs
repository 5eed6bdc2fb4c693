//! Draw volume and unit reading calculation.
//!
//! `concentration = peptide_amount / bacteriostatic_water`, then
//! `draw_ml = desired_dose / concentration` and
//! `units = draw_ml * units_per_ml`. The unit reading is derived from the
//! unrounded draw volume; both values are rounded only at the end.
//!
//! No conversion happens between the two unit tags: both masses are assumed
//! to be in the same unit.

use crate::model::dosage::{DosageInput, DosageResult, DosageValidationError};
use crate::model::syringe::resolve_units_per_ml;
use log::debug;

/// Decimal places of `DosageResult::draw_amount_ml`.
pub const DRAW_DECIMALS: i32 = 2;
/// Decimal places of `DosageResult::units`.
pub const UNITS_DECIMALS: i32 = 1;

/// Computes the draw volume and syringe unit reading for `input`.
///
/// # Errors
/// - `DosageValidationError::NotPositive` when peptide amount, diluent
///   volume or desired dose is zero, negative or not finite.
/// - `DosageValidationError::OutOfRange` when the draw volume or unit reading
///   overflows `f64`.
pub fn compute_dosage(input: &DosageInput) -> Result<DosageResult, DosageValidationError> {
    input.validate()?;

    let concentration = input.peptide_amount / input.bacteriostatic_water;
    let draw_ml = input.desired_dose / concentration;
    let units_per_ml = resolve_units_per_ml(&input.syringe_size);
    let units = draw_ml * f64::from(units_per_ml);

    let result = DosageResult {
        draw_amount_ml: round_half_away(draw_ml, DRAW_DECIMALS),
        units: round_half_away(units, UNITS_DECIMALS),
    };
    if !result.draw_amount_ml.is_finite() || !result.units.is_finite() {
        debug!("event=dosage_compute module=calc status=error reason=out_of_range");
        return Err(DosageValidationError::OutOfRange);
    }
    debug!(
        "event=dosage_compute module=calc status=ok units_per_ml={}",
        units_per_ml
    );
    Ok(result)
}

/// Rounds `value` to `decimals` places, ties away from zero.
///
/// Values too large to scale are returned unchanged; they have no fractional
/// digits left to round.
pub fn round_half_away(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}
