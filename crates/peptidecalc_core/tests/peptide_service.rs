use chrono::{TimeZone, Utc};
use peptidecalc_core::{
    compute_dosage, DosageInput, DosageResult, KeyValueStore, KvSavedPeptideRepository,
    MemoryKeyValueStore, PeptideService, PeptideServiceError, RepoError, SavedPeptide,
    SavedPeptideRepository, SavedPeptideValidationError, SAVED_PEPTIDES_KEY,
};

fn scenario_input() -> DosageInput {
    DosageInput::new(5.0, 2.0, 0.25).with_syringe("1")
}

#[test]
fn calculate_then_save_freezes_result() {
    let service = PeptideService::new(KvSavedPeptideRepository::new(MemoryKeyValueStore::new()));
    let input = scenario_input();
    let result = service.calculate(&input).unwrap();

    let now = Utc.with_ymd_and_hms(2026, 3, 7, 12, 0, 0).unwrap();
    let saved = service
        .save_calculation_at("Test A", &input, &result, now)
        .unwrap();

    assert_eq!(saved.date, "3/7/2026");
    assert!(saved.id.parse::<i64>().unwrap() >= now.timestamp_millis());
    assert_eq!(saved.draw_amount, 0.1);
    assert_eq!(saved.units, 10.0);
    assert_eq!(saved.input(), input);

    let listed = service.list().unwrap();
    assert_eq!(listed, vec![saved]);
}

#[test]
fn saved_result_is_not_recomputed() {
    let service = PeptideService::new(KvSavedPeptideRepository::new(MemoryKeyValueStore::new()));
    let stale = DosageResult {
        draw_amount_ml: 9.99,
        units: 999.0,
    };

    let saved = service
        .save_calculation("stale", &scenario_input(), &stale)
        .unwrap();
    let loaded = service.find(&saved.id).unwrap().unwrap();
    assert_eq!(loaded.result(), stale);
}

#[test]
fn blank_name_is_rejected_before_storage() {
    let store = MemoryKeyValueStore::new();
    let service = PeptideService::new(KvSavedPeptideRepository::new(&store));
    let input = scenario_input();
    let result = service.calculate(&input).unwrap();

    let err = service
        .save_calculation(" \t ", &input, &result)
        .unwrap_err();
    assert!(matches!(
        err,
        PeptideServiceError::Validation(SavedPeptideValidationError::EmptyName)
    ));
    assert_eq!(store.get_item(SAVED_PEPTIDES_KEY).unwrap(), None);
}

#[test]
fn name_is_stored_as_entered() {
    let service = PeptideService::new(KvSavedPeptideRepository::new(MemoryKeyValueStore::new()));
    let input = scenario_input();
    let result = service.calculate(&input).unwrap();

    let saved = service
        .save_calculation("  Morning dose ", &input, &result)
        .unwrap();
    assert_eq!(saved.name, "  Morning dose ");
}

#[test]
fn list_cache_is_invalidated_by_mutations() {
    let store = MemoryKeyValueStore::new();
    let service = PeptideService::new(KvSavedPeptideRepository::new(&store));
    let input = scenario_input();
    let result = service.calculate(&input).unwrap();

    assert!(service.list().unwrap().is_empty());
    let first = service.save_calculation("first", &input, &result).unwrap();
    let second = service.save_calculation("second", &input, &result).unwrap();
    assert_eq!(service.list().unwrap().len(), 2);

    let remaining = service.delete(&first.id).unwrap();
    assert_eq!(remaining, vec![second.clone()]);
    assert_eq!(service.list().unwrap(), vec![second]);
}

#[test]
fn refresh_picks_up_external_writes() {
    let store = MemoryKeyValueStore::new();
    let service = PeptideService::new(KvSavedPeptideRepository::new(&store));
    let input = scenario_input();
    let result = service.calculate(&input).unwrap();
    service.save_calculation("mine", &input, &result).unwrap();
    assert_eq!(service.list().unwrap().len(), 1);

    // Another screen writes through its own repository.
    let other = PeptideService::new(KvSavedPeptideRepository::new(&store));
    other.save_calculation("theirs", &input, &result).unwrap();

    assert_eq!(service.list().unwrap().len(), 1);
    assert_eq!(service.refresh().unwrap().len(), 2);
}

#[test]
fn corrupted_store_surfaces_error_and_is_not_reset() {
    let store = MemoryKeyValueStore::new();
    let service = PeptideService::new(KvSavedPeptideRepository::new(&store));
    store.set_item(SAVED_PEPTIDES_KEY, "oops").unwrap();

    assert!(matches!(
        service.list().unwrap_err(),
        RepoError::InvalidData(_)
    ));
    let input = scenario_input();
    let result = service.calculate(&input).unwrap();
    assert!(matches!(
        service.save_calculation("x", &input, &result).unwrap_err(),
        PeptideServiceError::Repo(RepoError::InvalidData(_))
    ));
    assert_eq!(
        store.get_item(SAVED_PEPTIDES_KEY).unwrap().as_deref(),
        Some("oops")
    );
}

#[test]
fn calculate_rejects_invalid_input() {
    let service = PeptideService::new(KvSavedPeptideRepository::new(MemoryKeyValueStore::new()));
    assert!(service.calculate(&DosageInput::new(0.0, 2.0, 1.0)).is_err());
}

#[test]
fn ids_stay_above_persisted_ids_after_clock_moves_back() {
    let store = MemoryKeyValueStore::new();
    let input = scenario_input();
    let result = compute_dosage(&input).unwrap();
    let persisted =
        SavedPeptide::new("4102444800000", "from 2100", "1/1/2100", &input, &result).unwrap();
    KvSavedPeptideRepository::new(&store).append(&persisted).unwrap();

    let service = PeptideService::new(KvSavedPeptideRepository::new(&store));
    let now = Utc.with_ymd_and_hms(2026, 3, 7, 12, 0, 0).unwrap();
    let saved = service
        .save_calculation_at("today", &input, &result, now)
        .unwrap();

    assert!(saved.id.parse::<i64>().unwrap() > 4_102_444_800_000);
    assert_eq!(service.list().unwrap().len(), 2);
}

#[test]
fn overflowing_calculation_is_rejected_and_nothing_is_saved() {
    let store = MemoryKeyValueStore::new();
    let service = PeptideService::new(KvSavedPeptideRepository::new(&store));

    assert!(service.calculate(&DosageInput::new(1.0, 1e307, 1.0)).is_err());
    assert_eq!(store.get_item(SAVED_PEPTIDES_KEY).unwrap(), None);
}
