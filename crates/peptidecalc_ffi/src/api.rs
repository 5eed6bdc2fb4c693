//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose calculator and saved-list use-cases to Dart via FRB.
//! - Flatten core errors into `{ ok, message }` envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Store calls run one at a time per process, so overlapping UI actions
//!   cannot lose each other's writes.

use log::warn;
use peptidecalc_core::db::open_db;
use peptidecalc_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    syringe_label, DosageInput, KvSavedPeptideRepository, PeptideService, RawDosageInput,
    SavedPeptide, SqliteKeyValueStore, SyringeSize,
};
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

const STORE_DB_FILE_NAME: &str = "peptidecalc.sqlite3";
const STORE_DB_PATH_ENV: &str = "PEPTIDECALC_DB_PATH";
static STORE_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static STORE_LOCK: Mutex<()> = Mutex::new(());

type FfiPeptideService<'conn> = PeptideService<KvSavedPeptideRepository<SqliteKeyValueStore<'conn>>>;

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Idempotent for the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Pins the SQLite file used for saved calculations.
///
/// Call once at startup with a path inside the app documents directory.
/// Without it the path comes from `PEPTIDECALC_DB_PATH` or the temp dir.
///
/// # FFI contract
/// - Returns empty string on success and error message on failure.
/// - Repeating the call with the same path is a no-op; a different path is
///   rejected once the store path is fixed.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_store(db_path: String) -> String {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return "db_path cannot be empty".to_string();
    }

    let requested = PathBuf::from(trimmed);
    let active = STORE_DB_PATH.get_or_init(|| requested.clone());
    if *active != requested {
        return format!(
            "store already configured at `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        );
    }
    String::new()
}

/// One syringe choice for the calculator picker.
#[derive(Debug, Clone, PartialEq)]
pub struct SyringeOptionItem {
    /// Value passed back as `syringe_size`.
    pub value: String,
    pub label: String,
    pub nominal_ml: f64,
    pub units_per_ml: u32,
}

/// Calculator response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct DosageResponse {
    pub ok: bool,
    /// Draw volume in ml, 2 decimals.
    pub draw_amount_ml: Option<f64>,
    /// Syringe unit reading, 1 decimal.
    pub units: Option<f64>,
    /// Wire name of the rejected field on validation failure.
    pub invalid_field: Option<String>,
    pub message: String,
}

/// Saved calculation projected for list display.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedPeptideItem {
    pub id: String,
    pub name: String,
    pub date: String,
    pub peptide_amount: f64,
    pub peptide_unit: String,
    pub bacteriostatic_water: f64,
    pub syringe_size: String,
    pub syringe_label: String,
    pub desired_dose: f64,
    pub desired_dose_unit: String,
    pub draw_amount: f64,
    pub units: f64,
}

/// Saved-list response envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedPeptideListResponse {
    pub ok: bool,
    /// Full list in save order (empty on failure).
    pub items: Vec<SavedPeptideItem>,
    pub message: String,
}

/// Response envelope for single-record actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeptideActionResponse {
    pub ok: bool,
    pub peptide_id: Option<String>,
    /// Details text for `saved_peptide_details`, otherwise a status message.
    pub message: String,
}

impl PeptideActionResponse {
    fn success(message: impl Into<String>, peptide_id: String) -> Self {
        Self {
            ok: true,
            peptide_id: Some(peptide_id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            peptide_id: None,
            message: message.into(),
        }
    }
}

/// Returns the syringe catalog in picker order.
#[flutter_rust_bridge::frb(sync)]
pub fn syringe_options() -> Vec<SyringeOptionItem> {
    SyringeSize::all()
        .iter()
        .map(|size| SyringeOptionItem {
            value: size.value().to_string(),
            label: size.label().to_string(),
            nominal_ml: size.nominal_ml(),
            units_per_ml: size.units_per_ml(),
        })
        .collect()
}

/// Computes draw volume and unit reading from raw form text.
///
/// # FFI contract
/// - Pure computation; never touches storage.
/// - Blank unit tags default to `mg`, blank syringe to `1`.
#[flutter_rust_bridge::frb(sync)]
pub fn calculate_dosage(
    peptide_amount: String,
    peptide_unit: String,
    bacteriostatic_water: String,
    syringe_size: String,
    desired_dose: String,
    desired_dose_unit: String,
) -> DosageResponse {
    let raw = RawDosageInput {
        peptide_amount: &peptide_amount,
        peptide_unit: &peptide_unit,
        bacteriostatic_water: &bacteriostatic_water,
        syringe_size: &syringe_size,
        desired_dose: &desired_dose,
        desired_dose_unit: &desired_dose_unit,
    };

    let computed = DosageInput::from_raw(&raw)
        .and_then(|input| peptidecalc_core::compute_dosage(&input));
    match computed {
        Ok(result) => DosageResponse {
            ok: true,
            draw_amount_ml: Some(result.draw_amount_ml),
            units: Some(result.units),
            invalid_field: None,
            message: format!(
                "Draw Amount: {} ml ({} units)",
                result.draw_amount_ml, result.units
            ),
        },
        Err(err) => DosageResponse {
            ok: false,
            draw_amount_ml: None,
            units: None,
            invalid_field: err.field().map(|field| field.as_str().to_string()),
            message: format!("calculate_dosage failed: {err}"),
        },
    }
}

/// Calculates and saves a named snapshot.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Name must be non-empty after trimming; it is stored as entered.
/// - Returns created id on success.
#[flutter_rust_bridge::frb(sync)]
pub fn save_peptide(
    name: String,
    peptide_amount: String,
    peptide_unit: String,
    bacteriostatic_water: String,
    syringe_size: String,
    desired_dose: String,
    desired_dose_unit: String,
) -> PeptideActionResponse {
    let raw = RawDosageInput {
        peptide_amount: &peptide_amount,
        peptide_unit: &peptide_unit,
        bacteriostatic_water: &bacteriostatic_water,
        syringe_size: &syringe_size,
        desired_dose: &desired_dose,
        desired_dose_unit: &desired_dose_unit,
    };
    let input = match DosageInput::from_raw(&raw) {
        Ok(input) => input,
        Err(err) => return PeptideActionResponse::failure(format!("save_peptide failed: {err}")),
    };

    let saved = with_peptide_service(|service| {
        let result = service.calculate(&input).map_err(|err| err.to_string())?;
        service
            .save_calculation(&name, &input, &result)
            .map_err(|err| err.to_string())
    });
    match saved {
        Ok(record) => PeptideActionResponse::success("Peptide calculation saved.", record.id),
        Err(err) => PeptideActionResponse::failure(format!("save_peptide failed: {err}")),
    }
}

/// Lists all saved calculations in save order.
#[flutter_rust_bridge::frb(sync)]
pub fn list_saved_peptides() -> SavedPeptideListResponse {
    let listed = with_peptide_service(|service| service.list().map_err(|err| err.to_string()));
    to_list_response("list_saved_peptides", listed)
}

/// Deletes one saved calculation and returns the resulting list.
///
/// # FFI contract
/// - Confirmation is the caller's job; this deletes immediately.
/// - Unknown ids succeed and return the list unchanged.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_saved_peptide(id: String) -> SavedPeptideListResponse {
    let id = id.trim().to_string();
    let remaining =
        with_peptide_service(|service| service.delete(&id).map_err(|err| err.to_string()));
    to_list_response("delete_saved_peptide", remaining)
}

/// Returns the syringe details text of one saved calculation.
#[flutter_rust_bridge::frb(sync)]
pub fn saved_peptide_details(id: String) -> PeptideActionResponse {
    let id = id.trim().to_string();
    let found = with_peptide_service(|service| service.find(&id).map_err(|err| err.to_string()));
    match found {
        Ok(Some(record)) => PeptideActionResponse::success(record.details_text(), record.id),
        Ok(None) => PeptideActionResponse::failure(format!("saved peptide not found: {id}")),
        Err(err) => {
            PeptideActionResponse::failure(format!("saved_peptide_details failed: {err}"))
        }
    }
}

fn to_list_response(
    operation: &str,
    listed: Result<Vec<SavedPeptide>, String>,
) -> SavedPeptideListResponse {
    match listed {
        Ok(records) => {
            let items = records
                .into_iter()
                .map(to_saved_peptide_item)
                .collect::<Vec<_>>();
            let message = match items.len() {
                0 => "No saved peptides.".to_string(),
                1 => "1 saved peptide.".to_string(),
                count => format!("{count} saved peptides."),
            };
            SavedPeptideListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => SavedPeptideListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("{operation} failed: {err}"),
        },
    }
}

fn to_saved_peptide_item(record: SavedPeptide) -> SavedPeptideItem {
    SavedPeptideItem {
        syringe_label: syringe_label(&record.syringe_size),
        id: record.id,
        name: record.name,
        date: record.date,
        peptide_amount: record.peptide_amount,
        peptide_unit: record.peptide_unit,
        bacteriostatic_water: record.bacteriostatic_water,
        syringe_size: record.syringe_size,
        desired_dose: record.desired_dose,
        desired_dose_unit: record.desired_dose_unit,
        draw_amount: record.draw_amount,
        units: record.units,
    }
}

fn resolve_store_db_path() -> PathBuf {
    STORE_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(STORE_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(STORE_DB_FILE_NAME)
        })
        .clone()
}

/// Runs `f` against a service built for this call only.
///
/// The service list cache does not outlive the call, so every FFI read goes
/// to the store and sees writes made by other connections.
fn with_peptide_service<T>(
    f: impl FnOnce(&FfiPeptideService<'_>) -> Result<T, String>,
) -> Result<T, String> {
    let _guard = STORE_LOCK.lock().unwrap_or_else(|poisoned| {
        warn!("event=store_lock_poisoned module=ffi status=recovered");
        poisoned.into_inner()
    });

    let db_path = resolve_store_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("store DB open failed: {err}"))?;
    let store = SqliteKeyValueStore::try_new(&conn)
        .map_err(|err| format!("store init failed: {err}"))?;
    let service = PeptideService::new(KvSavedPeptideRepository::new(store));
    f(&service)
}
