//! Calculator input/output shapes.
//!
//! # Responsibility
//! - Carry the reconstitution recipe into the calculator.
//! - Parse raw text-field values into validated numeric input.
//!
//! # Invariants
//! - `peptide_amount`, `bacteriostatic_water` and `desired_dose` must be
//!   finite and strictly positive before any arithmetic runs.
//! - Unit tags are carried for display and persistence only.

use crate::model::syringe::DEFAULT_SYRINGE_VALUE;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Unit tag used when the caller does not provide one.
pub const DEFAULT_MASS_UNIT: &str = "mg";

/// Numeric calculator field, used to report which input was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DosageField {
    PeptideAmount,
    BacteriostaticWater,
    DesiredDose,
}

impl DosageField {
    /// Wire-style field name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PeptideAmount => "peptideAmount",
            Self::BacteriostaticWater => "bacteriostaticWater",
            Self::DesiredDose => "desiredDose",
        }
    }
}

/// Validation error for calculator input.
#[derive(Debug, Clone, PartialEq)]
pub enum DosageValidationError {
    /// The raw text field was empty.
    Missing(DosageField),
    /// The raw text field did not parse to a finite number.
    NotANumber(DosageField),
    /// The value was zero, negative or not finite.
    NotPositive { field: DosageField, value: f64 },
    /// Inputs were individually valid but their ratio left the `f64` range.
    OutOfRange,
}

impl DosageValidationError {
    /// Input field at fault; `None` when no single field is.
    pub fn field(&self) -> Option<DosageField> {
        match self {
            Self::Missing(field) | Self::NotANumber(field) => Some(*field),
            Self::NotPositive { field, .. } => Some(*field),
            Self::OutOfRange => None,
        }
    }
}

impl Display for DosageValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(field) => write!(f, "missing numeric field `{}`", field.as_str()),
            Self::NotANumber(field) => {
                write!(f, "field `{}` is not a valid number", field.as_str())
            }
            Self::NotPositive { field, value } => write!(
                f,
                "field `{}` must be a positive number, got {value}",
                field.as_str()
            ),
            Self::OutOfRange => write!(f, "dosage result is out of the representable range"),
        }
    }
}

impl Error for DosageValidationError {}

/// Reconstitution recipe plus syringe selection.
#[derive(Debug, Clone, PartialEq)]
pub struct DosageInput {
    /// Lyophilized peptide mass in the vial.
    pub peptide_amount: f64,
    /// Display tag for `peptide_amount`.
    pub peptide_unit: String,
    /// Diluent volume in milliliters.
    pub bacteriostatic_water: f64,
    /// Raw syringe selection value; unknown values are kept verbatim.
    pub syringe_size: String,
    /// Dose to deliver, in the same mass unit as `peptide_amount`.
    pub desired_dose: f64,
    /// Display tag for `desired_dose`.
    pub desired_dose_unit: String,
}

impl DosageInput {
    /// Builds an input with default `mg` tags and the 1 ml syringe.
    pub fn new(peptide_amount: f64, bacteriostatic_water: f64, desired_dose: f64) -> Self {
        Self {
            peptide_amount,
            peptide_unit: DEFAULT_MASS_UNIT.to_string(),
            bacteriostatic_water,
            syringe_size: DEFAULT_SYRINGE_VALUE.to_string(),
            desired_dose,
            desired_dose_unit: DEFAULT_MASS_UNIT.to_string(),
        }
    }

    /// Replaces the syringe selection value.
    pub fn with_syringe(mut self, syringe_size: impl Into<String>) -> Self {
        self.syringe_size = syringe_size.into();
        self
    }

    /// Replaces both unit tags.
    pub fn with_units(
        mut self,
        peptide_unit: impl Into<String>,
        desired_dose_unit: impl Into<String>,
    ) -> Self {
        self.peptide_unit = peptide_unit.into();
        self.desired_dose_unit = desired_dose_unit.into();
        self
    }

    /// Parses raw text-field values into an input.
    ///
    /// Empty unit tags and an empty syringe value fall back to the form
    /// defaults. Numeric fields go through `parse_decimal_field`; the sign
    /// check happens later in `validate`.
    ///
    /// # Errors
    /// - `Missing` when a numeric field is blank.
    /// - `NotANumber` when a numeric field does not parse to a finite value.
    pub fn from_raw(raw: &RawDosageInput<'_>) -> Result<Self, DosageValidationError> {
        Ok(Self {
            peptide_amount: parse_decimal_field(raw.peptide_amount, DosageField::PeptideAmount)?,
            peptide_unit: tag_or_default(raw.peptide_unit),
            bacteriostatic_water: parse_decimal_field(
                raw.bacteriostatic_water,
                DosageField::BacteriostaticWater,
            )?,
            syringe_size: match raw.syringe_size.trim() {
                "" => DEFAULT_SYRINGE_VALUE.to_string(),
                value => value.to_string(),
            },
            desired_dose: parse_decimal_field(raw.desired_dose, DosageField::DesiredDose)?,
            desired_dose_unit: tag_or_default(raw.desired_dose_unit),
        })
    }

    /// Checks the numeric invariants.
    pub fn validate(&self) -> Result<(), DosageValidationError> {
        ensure_positive(DosageField::PeptideAmount, self.peptide_amount)?;
        ensure_positive(DosageField::BacteriostaticWater, self.bacteriostatic_water)?;
        ensure_positive(DosageField::DesiredDose, self.desired_dose)?;
        Ok(())
    }
}

/// Borrowed raw text-field values, as typed into the calculator form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawDosageInput<'a> {
    pub peptide_amount: &'a str,
    pub peptide_unit: &'a str,
    pub bacteriostatic_water: &'a str,
    pub syringe_size: &'a str,
    pub desired_dose: &'a str,
    pub desired_dose_unit: &'a str,
}

/// Calculator output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DosageResult {
    /// Volume to draw, rounded to 2 decimals.
    pub draw_amount_ml: f64,
    /// Reading on the syringe's printed scale, rounded to 1 decimal.
    pub units: f64,
}

/// Parses one decimal text field.
///
/// # Errors
/// - `Missing` when `raw` is blank after trimming.
/// - `NotANumber` when `raw` is not a finite decimal.
pub fn parse_decimal_field(raw: &str, field: DosageField) -> Result<f64, DosageValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DosageValidationError::Missing(field));
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(DosageValidationError::NotANumber(field)),
    }
}

fn ensure_positive(field: DosageField, value: f64) -> Result<(), DosageValidationError> {
    // NaN fails this comparison as well.
    if value.is_finite() && value > 0.0 {
        return Ok(());
    }
    Err(DosageValidationError::NotPositive { field, value })
}

fn tag_or_default(raw: &str) -> String {
    match raw.trim() {
        "" => DEFAULT_MASS_UNIT.to_string(),
        tag => tag.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        parse_decimal_field, DosageField, DosageInput, DosageValidationError, RawDosageInput,
    };

    #[test]
    fn parse_rejects_blank_and_garbage() {
        assert_eq!(
            parse_decimal_field("  ", DosageField::DesiredDose),
            Err(DosageValidationError::Missing(DosageField::DesiredDose))
        );
        assert_eq!(
            parse_decimal_field("abc", DosageField::PeptideAmount),
            Err(DosageValidationError::NotANumber(DosageField::PeptideAmount))
        );
        assert_eq!(
            parse_decimal_field("inf", DosageField::PeptideAmount),
            Err(DosageValidationError::NotANumber(DosageField::PeptideAmount))
        );
        assert_eq!(
            parse_decimal_field(" 0.25 ", DosageField::DesiredDose),
            Ok(0.25)
        );
    }

    #[test]
    fn from_raw_applies_form_defaults() {
        let raw = RawDosageInput {
            peptide_amount: "5",
            bacteriostatic_water: "2",
            desired_dose: "0.25",
            ..RawDosageInput::default()
        };
        let input = DosageInput::from_raw(&raw).unwrap();
        assert_eq!(input, DosageInput::new(5.0, 2.0, 0.25));
    }

    #[test]
    fn validate_rejects_zero_negative_and_nan() {
        let zero = DosageInput::new(0.0, 2.0, 1.0);
        assert_eq!(
            zero.validate().unwrap_err().field(),
            Some(DosageField::PeptideAmount)
        );

        let negative = DosageInput::new(5.0, -2.0, 1.0);
        assert_eq!(
            negative.validate().unwrap_err().field(),
            Some(DosageField::BacteriostaticWater)
        );

        let nan = DosageInput::new(5.0, 2.0, f64::NAN);
        assert_eq!(
            nan.validate().unwrap_err().field(),
            Some(DosageField::DesiredDose)
        );
    }
}
