//! Syringe capacity catalog.
//!
//! # Responsibility
//! - Map the persisted selection value (`"1"`, `"0.3"`, `"3"`) to a syringe.
//! - Resolve the units-per-ml scale used for the insulin-unit reading.
//!
//! # Invariants
//! - Unknown selection values resolve to `DEFAULT_UNITS_PER_ML` through an
//!   explicit fallback branch, never through an error.

/// Scale of the 1 ml / 100 unit syringe, used for unrecognized selections.
pub const DEFAULT_UNITS_PER_ML: u32 = 100;

/// Selection value pre-selected by the calculator form.
pub const DEFAULT_SYRINGE_VALUE: &str = "1";

/// Physical syringe sizes offered by the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyringeSize {
    /// 1 ml barrel printed with 100 units.
    OneMl,
    /// 0.3 ml barrel printed with 30 units.
    PointThreeMl,
    /// 3 ml barrel printed with 300 units.
    ThreeMl,
}

const CATALOG: [SyringeSize; 3] = [
    SyringeSize::OneMl,
    SyringeSize::PointThreeMl,
    SyringeSize::ThreeMl,
];

impl SyringeSize {
    /// Returns all catalog entries in picker order.
    pub fn all() -> &'static [SyringeSize] {
        &CATALOG
    }

    /// Looks up a catalog entry by its persisted selection value.
    pub fn from_value(value: &str) -> Option<Self> {
        CATALOG
            .iter()
            .copied()
            .find(|size| size.value() == value.trim())
    }

    /// Persisted selection value.
    pub fn value(self) -> &'static str {
        match self {
            Self::OneMl => "1",
            Self::PointThreeMl => "0.3",
            Self::ThreeMl => "3",
        }
    }

    /// Human-readable picker label.
    pub fn label(self) -> &'static str {
        match self {
            Self::OneMl => "1ml (100 units)",
            Self::PointThreeMl => "0.3ml (30 units)",
            Self::ThreeMl => "3ml (300 units)",
        }
    }

    /// Nominal barrel volume in milliliters. Display only.
    pub fn nominal_ml(self) -> f64 {
        match self {
            Self::OneMl => 1.0,
            Self::PointThreeMl => 0.3,
            Self::ThreeMl => 3.0,
        }
    }

    /// Units printed per milliliter on this syringe's scale.
    pub fn units_per_ml(self) -> u32 {
        match self {
            Self::OneMl => 100,
            Self::PointThreeMl => 30,
            Self::ThreeMl => 300,
        }
    }
}

/// Resolves the units-per-ml scale for a raw selection value.
///
/// Falls back to the 1 ml / 100 unit scale when `value` is not in the catalog.
pub fn resolve_units_per_ml(value: &str) -> u32 {
    match SyringeSize::from_value(value) {
        Some(size) => size.units_per_ml(),
        None => DEFAULT_UNITS_PER_ML,
    }
}

/// Returns the catalog label for `value`, or `value` itself when unknown.
pub fn syringe_label(value: &str) -> String {
    SyringeSize::from_value(value)
        .map(|size| size.label().to_string())
        .unwrap_or_else(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::{resolve_units_per_ml, syringe_label, SyringeSize, DEFAULT_SYRINGE_VALUE};

    #[test]
    fn catalog_values_round_trip_through_lookup() {
        for size in SyringeSize::all() {
            assert_eq!(SyringeSize::from_value(size.value()), Some(*size));
        }
    }

    #[test]
    fn unknown_selection_falls_back_to_hundred_units() {
        assert_eq!(resolve_units_per_ml("0.5"), 100);
        assert_eq!(resolve_units_per_ml(""), 100);
        assert_eq!(resolve_units_per_ml("0.3"), 30);
        assert_eq!(resolve_units_per_ml("3"), 300);
    }

    #[test]
    fn label_passes_unknown_values_through() {
        assert_eq!(syringe_label("0.3"), "0.3ml (30 units)");
        assert_eq!(syringe_label("5"), "5");
    }

    #[test]
    fn default_selection_is_in_catalog() {
        assert_eq!(
            SyringeSize::from_value(DEFAULT_SYRINGE_VALUE),
            Some(SyringeSize::OneMl)
        );
    }
}
