//! File-backed round trips through the public API.

use hotel_reservations::{
    AccountStore, CsvFileBackend, Reservation, ReservationBackend, ReservationError,
    ReservationManager, ReservationStore, ReservationUpdate, RoomCategory, StoreConfig,
};
use std::fs;
use tempfile::TempDir;

fn open_manager(config: &StoreConfig) -> ReservationManager<CsvFileBackend> {
    let store = ReservationStore::open(CsvFileBackend::new(&config.reservations_path))
        .expect("Failed to open reservation store");
    ReservationManager::new(store)
}

#[test]
fn test_missing_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig::in_dir(dir.path());

    let manager = open_manager(&config);

    assert!(manager.all_reservations().is_empty());
    assert!(!config.reservations_path.exists());
}

#[test]
fn test_mutations_survive_restart() {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig::in_dir(dir.path());

    {
        let mut manager = open_manager(&config);
        manager.book("alice", "Standard", 3, "January").unwrap();
        manager.book("bob", "Deluxe", 2, "June").unwrap();
        manager.book("carol", "Suite", 1, "april").unwrap();
        manager
            .update("bob", 1, ReservationUpdate::keep_current().with_month("December"))
            .unwrap();
        manager.cancel("carol", 1).unwrap();
    }

    assert_eq!(
        fs::read_to_string(&config.reservations_path).unwrap(),
        "alice,Standard,3,3000.00,January\nbob,Deluxe,2,4800.00,December\n"
    );

    let manager = open_manager(&config);
    let bob = manager.list_mine("bob");
    assert_eq!(bob.len(), 1);
    assert_eq!(bob[0].category, RoomCategory::Deluxe);
    assert_eq!(bob[0].total_price, 4800.0);

    let summary = manager.admin_summary();
    assert_eq!(summary.count, 2);
    assert_eq!(summary.total_revenue, 7800.0);
}

#[test]
fn test_save_all_round_trip_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig::in_dir(dir.path());
    let original = "alice,Standard,3,3000.00,January\nbob,Suite,2,7200.00,May\n";
    fs::write(&config.reservations_path, original).unwrap();

    let mut store = ReservationStore::open(CsvFileBackend::new(&config.reservations_path)).unwrap();
    store.save_all().unwrap();

    assert_eq!(fs::read_to_string(&config.reservations_path).unwrap(), original);
    // The temp file is renamed away
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_malformed_lines_skipped_then_dropped_on_rewrite() {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig::in_dir(dir.path());
    fs::write(
        &config.reservations_path,
        "alice,Standard,3,3000.00,January\ngarbage\nbob,Deluxe,x,1.00,June\n",
    )
    .unwrap();

    let mut manager = open_manager(&config);
    assert_eq!(manager.store().skipped().len(), 2);
    assert_eq!(manager.all_reservations().len(), 1);

    manager.book("dave", "Suite", 1, "July").unwrap();
    assert_eq!(
        fs::read_to_string(&config.reservations_path).unwrap(),
        "alice,Standard,3,3000.00,January\ndave,Suite,1,3000.00,July\n"
    );
}

#[test]
fn test_write_failure_leaves_memory_untouched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing-dir").join("reservations.txt");

    let store = ReservationStore::open(CsvFileBackend::new(&path)).unwrap();
    let mut manager = ReservationManager::new(store);

    let result = manager.book("alice", "Standard", 1, "June");

    assert!(matches!(
        result,
        Err(ReservationError::PersistenceWriteFailure { .. })
    ));
    assert!(manager.list_mine("alice").is_empty());
}

#[test]
fn test_accounts_and_reservations_share_owner_ids() {
    let dir = TempDir::new().unwrap();
    let config = StoreConfig::in_dir(dir.path());

    let mut accounts = AccountStore::open(&config.accounts_path).unwrap();
    accounts.ensure_admin(&config.admin_username, &config.admin_password).unwrap();
    let alice = accounts.register("alice", "secret").unwrap();

    let mut manager = open_manager(&config);
    manager.book(&alice.username, "Deluxe", 1, "March").unwrap();

    let logged_in = accounts.authenticate("alice", "secret").unwrap();
    assert_eq!(manager.list_mine(&logged_in.username).len(), 1);

    assert_eq!(
        fs::read_to_string(&config.accounts_path).unwrap(),
        "admin,admin,1\nalice,secret,0\n"
    );
}

#[test]
fn test_failed_rename_cleans_up_temp_file() {
    let dir = TempDir::new().unwrap();
    // A non-empty directory where the file should be makes the final rename fail
    let path = dir.path().join("reservations.txt");
    fs::create_dir(&path).unwrap();
    fs::write(path.join("keep"), "").unwrap();

    let records = vec![Reservation::priced("alice", RoomCategory::Standard, 1, "June")];
    let mut backend = CsvFileBackend::new(&path);

    assert!(matches!(
        backend.save(&records),
        Err(ReservationError::PersistenceWriteFailure { .. })
    ));
    assert!(!dir.path().join("reservations.txt.tmp").exists());
    assert!(path.join("keep").exists());
}
