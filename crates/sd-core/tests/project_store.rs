//! Integration tests: project store over memory and directory backends.
//!
//! Exercises the save → load round-trip, upsert identity, duplication and
//! failure handling through the public `sd-core` API.

use pretty_assertions::assert_eq;
use sd_core::store::DirectoryBackend;
use sd_core::*;

const T0: i64 = 1_700_000_000_000;

fn sample_project() -> Project {
    let mut geometry = StageGeometry::new(32.5, 14.0, 6.0).unwrap();
    geometry.floor_texture = FloorTexture::Concrete;
    let mut project = Project::new("Mehendi Stage", geometry);
    project.show_spotlights = true;
    project.library.push(LibraryAsset {
        id: Id::intern("asset_marigold"),
        src: "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==".to_string(),
    });
    project.items.push(PlacedItem {
        id: Id::intern("item_arch"),
        src: project.library[0].src.clone(),
        x: 12.25,
        y: -3.5,
        w: 120.0,
        h: 90.333,
        z: -4,
        locked: true,
    });
    project.items.push(PlacedItem {
        id: Id::intern("item_drape"),
        src: "https://example.com/drape.jpg".to_string(),
        x: 0.1,
        y: 0.2,
        w: 333.3,
        h: 17.77,
        z: 9_000_000_000,
        locked: false,
    });
    project
}

fn memory_store(clock: &ManualClock) -> ProjectStore<MemoryBackend> {
    ProjectStore::new(
        MemoryBackend::new(),
        StoreConfig::default(),
        Box::new(clock.clone()),
    )
}

// ─── Round-trip ─────────────────────────────────────────────────────────

#[test]
fn save_then_load_reproduces_project_exactly() {
    let clock = ManualClock::new(T0);
    let mut store = memory_store(&clock);
    let mut project = sample_project();

    let receipt = store.save(&mut project).unwrap();
    let loaded = store.load(receipt.id).unwrap();

    assert_eq!(loaded.geometry, project.geometry);
    assert_eq!(loaded.library, project.library);
    assert_eq!(loaded.items, project.items);
    assert_eq!(loaded, project);
}

#[test]
fn directory_backend_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::new(T0);
    let mut store = ProjectStore::new(
        DirectoryBackend::open(dir.path()).unwrap(),
        StoreConfig::default(),
        Box::new(clock.clone()),
    );
    let mut project = sample_project();
    let receipt = store.save(&mut project).unwrap();

    let all = store.load_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0], project);

    store.delete(receipt.id).unwrap();
    assert!(store.load_all().unwrap().is_empty());
    assert!(matches!(store.load(receipt.id), Err(StoreError::NotFound(_))));
}

// ─── Upsert identity ────────────────────────────────────────────────────

#[test]
fn first_save_mints_id_and_later_saves_reuse_it() {
    let clock = ManualClock::new(T0);
    let mut store = memory_store(&clock);
    let mut project = sample_project();
    assert_eq!(project.id, None);

    let first = store.save(&mut project).unwrap();
    assert_eq!(project.id, Some(first.id));
    assert_eq!(project.timestamp, T0);

    clock.advance(60_000);
    project.project_name = "Mehendi Stage v2".to_string();
    let second = store.save(&mut project).unwrap();

    assert_eq!(second.id, first.id);
    assert_eq!(store.load_all().unwrap().len(), 1);
    assert_eq!(store.load(first.id).unwrap().timestamp, T0 + 60_000);
}

#[test]
fn load_all_is_newest_first() {
    let clock = ManualClock::new(T0);
    let mut store = memory_store(&clock);
    let mut older = Project::new("older", StageGeometry::default());
    let mut newer = Project::new("newer", StageGeometry::default());
    store.save(&mut older).unwrap();
    clock.advance(1);
    store.save(&mut newer).unwrap();

    let names: Vec<String> = store
        .load_all()
        .unwrap()
        .into_iter()
        .map(|p| p.project_name)
        .collect();
    assert_eq!(names, vec!["newer", "older"]);
}

#[test]
fn separate_databases_do_not_see_each_other() {
    let clock = ManualClock::new(T0);
    let mut a = memory_store(&clock);
    let mut p = sample_project();
    a.save(&mut p).unwrap();

    let shared = a.backend().clone();
    let b = ProjectStore::new(
        shared,
        StoreConfig {
            db_name: "StageDesignerDB".to_string(),
            version: 2,
        },
        Box::new(clock.clone()),
    );
    assert!(b.load_all().unwrap().is_empty());
}

// ─── Duplicate ──────────────────────────────────────────────────────────

#[test]
fn duplicate_gets_new_id_name_and_timestamp() {
    let clock = ManualClock::new(T0);
    let mut store = memory_store(&clock);
    let mut project = sample_project();
    store.save(&mut project).unwrap();

    clock.advance(5_000);
    let copy = store.duplicate(&project).unwrap();

    assert_ne!(copy.id, project.id);
    assert_eq!(copy.project_name, "Mehendi Stage (Copy)");
    assert_eq!(copy.timestamp, T0 + 5_000);
    assert_eq!(copy.items, project.items);
    assert_eq!(store.load_all().unwrap().len(), 2);
}

// ─── Failures ───────────────────────────────────────────────────────────

struct UnavailableBackend;

impl KeyValueBackend for UnavailableBackend {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("blocked".into()))
    }
    fn put(&mut self, key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::QuotaExceeded(key.to_string()))
    }
    fn delete(&mut self, _key: &str) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("blocked".into()))
    }
    fn keys(&self, _prefix: &str) -> Result<Vec<String>, StoreError> {
        Err(StoreError::Unavailable("blocked".into()))
    }
}

#[test]
fn failed_save_leaves_project_untouched() {
    let mut store = ProjectStore::new(
        UnavailableBackend,
        StoreConfig::default(),
        Box::new(ManualClock::new(T0)),
    );
    let mut project = sample_project();
    let before = project.clone();

    let err = store.save(&mut project).unwrap_err();
    assert!(matches!(err, StoreError::QuotaExceeded(_)));
    assert_eq!(project, before);
    assert!(store.load_all().is_err());
}

#[test]
fn corrupt_records_are_skipped() {
    let clock = ManualClock::new(T0);
    let mut store = memory_store(&clock);
    let mut good = sample_project();
    store.save(&mut good).unwrap();
    store
        .backend_mut()
        .put("StageDesignerDB/v1/project/broken", "{not json")
        .unwrap();

    let all = store.load_all().unwrap();
    assert_eq!(all, vec![good]);
}

#[test]
fn quick_save_slot_round_trip() {
    let clock = ManualClock::new(T0);
    let mut store = memory_store(&clock);
    assert_eq!(store.load_slot().unwrap(), None);
    let project = sample_project();
    store.save_slot(&project).unwrap();
    assert_eq!(store.load_slot().unwrap(), Some(project));
    assert!(store.load_all().unwrap().is_empty());
}
