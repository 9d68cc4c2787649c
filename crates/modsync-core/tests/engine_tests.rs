//! Tests for the ReconcileEngine

use modsync_core::{
    Classification, EntryOutcome, Error, FailureKind, FileTransport, ManifestEntry, Mode,
    ParsePolicy, ReconcileEngine, SyncOptions,
};
use modsync_fs::{NormalizedPath, RootLock};
use modsync_test_utils::{EntrySpec, ManifestBuilder, TestRoot};
use pretty_assertions::assert_eq;
use serde_json::json;

fn engine(root: &TestRoot, mode: Mode) -> ReconcileEngine {
    ReconcileEngine::new(
        NormalizedPath::new(root.root()),
        mode,
        Box::new(FileTransport),
    )
}

fn load(engine: &ReconcileEngine, location: &str) -> modsync_core::Manifest {
    engine.load_manifest(location, ParsePolicy::Strict).unwrap()
}

#[test]
fn sync_installs_missing_entry_and_creates_root() {
    let fixture = TestRoot::new();
    let url = fixture.publish("sodium.jar", b"sodium");
    let location = fixture.publish_manifest(
        &ManifestBuilder::new().entry(EntrySpec::new("Sodium", "sodium.jar", &url, b"sodium")),
    );
    let engine = engine(&fixture, Mode::Client);
    let manifest = load(&engine, &location);

    let report = engine.sync(&manifest, SyncOptions::default()).unwrap();

    assert_eq!(report.entries.len(), 1);
    assert_eq!(report.entries[0].classification, Classification::Missing);
    assert_eq!(
        report.entries[0].outcome,
        EntryOutcome::Fetched {
            bytes: 6,
            replaced: false
        }
    );
    fixture.assert_content("mods/sodium.jar", b"sodium");
    fixture.assert_no_staging_files();
}

#[test]
fn check_does_not_touch_the_filesystem() {
    let fixture = TestRoot::new();
    let url = fixture.publish("a.jar", b"a");
    fixture.write("mods/old.jar", b"old");
    let location = fixture.publish_manifest(
        &ManifestBuilder::new()
            .entry(EntrySpec::new("A", "a.jar", &url, b"a"))
            .entry(EntrySpec::new("Old", "old.jar", &url, b"old").deprecated()),
    );
    let engine = engine(&fixture, Mode::Client);

    let plan = engine.check(&load(&engine, &location)).unwrap();

    assert_eq!(plan.pending(), 2);
    assert_eq!(plan.items[0].classification(), Classification::Missing);
    assert_eq!(plan.items[1].classification(), Classification::ObsoletePresent);
    fixture.assert_absent("mods/a.jar");
    fixture.assert_content("mods/old.jar", b"old");
}

#[test]
fn dry_run_reports_without_changing_anything() {
    let fixture = TestRoot::new();
    let url = fixture.publish("a.jar", b"a");
    fixture.write("mods/old.jar", b"old");
    let location = fixture.publish_manifest(
        &ManifestBuilder::new()
            .entry(EntrySpec::new("A", "a.jar", &url, b"a"))
            .entry(EntrySpec::new("Old", "old.jar", &url, b"old").client(false)),
    );
    let engine = engine(&fixture, Mode::Client);

    let report = engine
        .sync(&load(&engine, &location), SyncOptions { dry_run: true })
        .unwrap();

    assert!(report.dry_run);
    let outcomes: Vec<_> = report.entries.iter().map(|e| e.outcome.clone()).collect();
    assert_eq!(outcomes, vec![EntryOutcome::WouldFetch, EntryOutcome::WouldDelete]);
    fixture.assert_absent("mods/a.jar");
    fixture.assert_content("mods/old.jar", b"old");
}

#[test]
fn failing_entry_does_not_stop_the_rest() {
    let fixture = TestRoot::new();
    let good = fixture.publish("good.jar", b"good");
    let missing = fixture.unpublished("gone.jar");
    let tampered = fixture.publish("bad.jar", b"tampered");
    let location = fixture.publish_manifest(
        &ManifestBuilder::new()
            .entry(EntrySpec::new("Gone", "gone.jar", &missing, b"gone"))
            .entry(EntrySpec::new("Bad", "bad.jar", &tampered, b"expected"))
            .entry(EntrySpec::new("Good", "good.jar", &good, b"good")),
    );
    let engine = engine(&fixture, Mode::Client);

    let report = engine
        .sync(&load(&engine, &location), SyncOptions::default())
        .unwrap();

    let kinds: Vec<_> = report
        .entries
        .iter()
        .map(|e| match &e.outcome {
            EntryOutcome::Failed { kind, .. } => Some(*kind),
            _ => None,
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            Some(FailureKind::Download),
            Some(FailureKind::Verification),
            None
        ]
    );
    assert_eq!(report.summary().failed, 2);
    fixture.assert_content("mods/good.jar", b"good");
    fixture.assert_absent("mods/bad.jar");
    fixture.assert_absent("mods/gone.jar");
    fixture.assert_no_staging_files();
}

#[test]
fn collision_aborts_before_any_action() {
    let fixture = TestRoot::new();
    let url = fixture.publish("a.jar", b"a");
    fixture.write("mods/stale.jar", b"old");
    let location = fixture.publish_manifest(
        &ManifestBuilder::new()
            .entry(EntrySpec::new("Stale", "stale.jar", &url, b"a"))
            .entry(EntrySpec::new("A", "a.jar", &url, b"a"))
            .entry(EntrySpec::new("A again", "a.jar", &url, b"a").destination("./mods/")),
    );
    let engine = engine(&fixture, Mode::Client);

    let err = engine
        .sync(&load(&engine, &location), SyncOptions::default())
        .unwrap_err();

    assert!(matches!(err, Error::TargetCollision { .. }));
    fixture.assert_content("mods/stale.jar", b"old");
    fixture.assert_absent("mods/a.jar");
}

#[test]
fn entry_targeting_the_lock_file_aborts_and_keeps_the_lock() {
    let fixture = TestRoot::new();
    let url = fixture.publish("lock", b"");
    fixture.write(".modsync.lock", b"");
    let location = fixture.publish_manifest(
        &ManifestBuilder::new()
            .entry(EntrySpec::new("Lock", ".modsync.lock", &url, b"").destination("").deprecated()),
    );
    let engine = engine(&fixture, Mode::Client);

    let err = engine
        .sync(&load(&engine, &location), SyncOptions::default())
        .unwrap_err();

    assert!(matches!(err, Error::ReservedTarget { .. }));
    assert!(fixture.exists(".modsync.lock"));
}

#[test]
fn concurrent_run_is_rejected() {
    let fixture = TestRoot::new();
    fixture.write("keep.txt", b"");
    let root = NormalizedPath::new(fixture.root());
    let _held = RootLock::acquire(&root).unwrap();
    let engine = engine(&fixture, Mode::Client);

    let err = engine
        .sync(&modsync_core::Manifest::default(), SyncOptions::default())
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Fs(modsync_fs::Error::LockFailed { .. })
    ));
}

#[test]
fn unreachable_manifest_is_fatal() {
    let fixture = TestRoot::new();
    let engine = engine(&fixture, Mode::Client);

    let err = engine
        .load_manifest(&fixture.unpublished("manifest.json"), ParsePolicy::Strict)
        .unwrap_err();

    assert!(matches!(err, Error::ManifestFetch { .. }));
}

#[test]
fn skip_invalid_policy_processes_remaining_entries() {
    let fixture = TestRoot::new();
    let url = fixture.publish("a.jar", b"a");
    let location = fixture.publish_manifest(
        &ManifestBuilder::new()
            .raw(json!({"name": "No url", "filename": "x.jar"}))
            .entry(EntrySpec::new("A", "a.jar", &url, b"a")),
    );
    let engine = engine(&fixture, Mode::Client);

    assert!(matches!(
        engine.load_manifest(&location, ParsePolicy::Strict),
        Err(Error::InvalidEntry { index: 0, .. })
    ));

    let manifest = engine
        .load_manifest(&location, ParsePolicy::SkipInvalid)
        .unwrap();
    let report = engine.sync(&manifest, SyncOptions::default()).unwrap();

    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.summary().fetched, 1);
    fixture.assert_content("mods/a.jar", b"a");
}

#[test]
fn entries_built_in_code_sync_the_same_way() {
    let fixture = TestRoot::new();
    let url = fixture.publish("options.txt", b"fov:90");
    let entry = ManifestEntry {
        url,
        name: "Options".into(),
        version: String::new(),
        filename: "options.txt".into(),
        content_hash: modsync_fs::compute_content_digest(b"fov:90"),
        destination_subpath: String::new(),
        applies_to_server: true,
        applies_to_client: false,
        deprecated: false,
    };
    let engine = engine(&fixture, Mode::Server);

    let report = engine
        .sync(
            &modsync_core::Manifest::from_entries(vec![entry]),
            SyncOptions::default(),
        )
        .unwrap();

    assert_eq!(report.entries[0].relative_path, "options.txt");
    fixture.assert_content("options.txt", b"fov:90");
}
