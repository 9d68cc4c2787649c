//! Reconciliation scenarios run against the real engine.
//!
//! Content and manifests are served from a local mirror through
//! `FileTransport`; each test drives one or more complete runs and checks the
//! managed root afterwards.

use modsync_core::{
    Classification, EntryOutcome, FailureKind, FileTransport, Manifest, Mode, ParsePolicy,
    PlannedAction, ReconcileEngine, SyncOptions, SyncReport,
};
use modsync_fs::{NormalizedPath, compute_file_digest};
use modsync_test_utils::{EntrySpec, ManifestBuilder, TestRoot, md5_hex};
use pretty_assertions::assert_eq;

// =============================================================================
// Test Infrastructure
// =============================================================================

fn engine(fixture: &TestRoot, mode: Mode) -> ReconcileEngine {
    ReconcileEngine::new(NormalizedPath::new(fixture.root()), mode, Box::new(FileTransport))
}

fn load(engine: &ReconcileEngine, location: &str) -> Manifest {
    engine.load_manifest(location, ParsePolicy::Strict).unwrap()
}

fn sync(engine: &ReconcileEngine, manifest: &Manifest) -> SyncReport {
    engine.sync(manifest, SyncOptions::default()).unwrap()
}

fn outcomes(report: &SyncReport) -> Vec<EntryOutcome> {
    report.entries.iter().map(|e| e.outcome.clone()).collect()
}

// =============================================================================
// Scenario A: applicable and absent is downloaded
// =============================================================================

#[test]
fn scenario_a_missing_client_entry_is_fetched() {
    let fixture = TestRoot::new();
    let url = fixture.publish("sodium-0.5.8.jar", b"sodium bytes");
    let location = fixture.publish_manifest(&ManifestBuilder::new().entry(EntrySpec::new(
        "Sodium",
        "sodium.jar",
        &url,
        b"sodium bytes",
    )));
    let engine = engine(&fixture, Mode::Client);
    let manifest = load(&engine, &location);

    let plan = engine.check(&manifest).unwrap();
    assert_eq!(plan.items[0].classification(), Classification::Missing);
    assert!(matches!(plan.items[0].action, PlannedAction::FetchAndReplace { .. }));

    sync(&engine, &manifest);

    let target = fixture.root().join("mods/sodium.jar");
    assert_eq!(compute_file_digest(&target).unwrap(), md5_hex(b"sodium bytes"));
    fixture.assert_no_staging_files();
}

// =============================================================================
// Scenario B: deprecated and present is deleted
// =============================================================================

#[test]
fn scenario_b_deprecated_present_entry_is_deleted() {
    let fixture = TestRoot::new();
    let url = fixture.publish("optifine.jar", b"optifine");
    fixture.write("mods/optifine.jar", b"optifine");
    let location = fixture.publish_manifest(
        &ManifestBuilder::new()
            .entry(EntrySpec::new("OptiFine", "optifine.jar", &url, b"optifine").deprecated()),
    );
    let engine = engine(&fixture, Mode::Client);
    let manifest = load(&engine, &location);

    let plan = engine.check(&manifest).unwrap();
    assert_eq!(plan.items[0].classification(), Classification::ObsoletePresent);
    assert!(matches!(plan.items[0].action, PlannedAction::Delete { .. }));

    let report = sync(&engine, &manifest);

    assert_eq!(outcomes(&report), vec![EntryOutcome::Deleted]);
    fixture.assert_absent("mods/optifine.jar");
}

// =============================================================================
// Scenario C: not applicable and absent needs nothing
// =============================================================================

#[test]
fn scenario_c_client_only_entry_on_server_is_left_alone() {
    let fixture = TestRoot::new();
    let url = fixture.publish("iris.jar", b"iris");
    let location = fixture.publish_manifest(
        &ManifestBuilder::new().entry(EntrySpec::new("Iris", "iris.jar", &url, b"iris").server(false)),
    );
    let engine = engine(&fixture, Mode::Server);
    let manifest = load(&engine, &location);

    let plan = engine.check(&manifest).unwrap();
    assert_eq!(plan.items[0].classification(), Classification::Satisfied);
    assert_eq!(plan.items[0].action, PlannedAction::None);

    let report = sync(&engine, &manifest);
    assert_eq!(outcomes(&report), vec![EntryOutcome::Unchanged]);
    fixture.assert_absent("mods/iris.jar");
}

// =============================================================================
// Scenario D: stale file survives a failed re-download
// =============================================================================

#[test]
fn scenario_d_stale_file_is_kept_when_redownload_fails_verification() {
    let fixture = TestRoot::new();
    let url = fixture.publish("lithium.jar", b"corrupted mirror copy");
    fixture.write("mods/lithium.jar", b"lithium 0.11");
    let location = fixture.publish_manifest(
        &ManifestBuilder::new()
            .entry(EntrySpec::new("Lithium", "lithium.jar", &url, b"lithium 0.12").version("0.12")),
    );
    let engine = engine(&fixture, Mode::Client);
    let manifest = load(&engine, &location);

    let plan = engine.check(&manifest).unwrap();
    assert_eq!(plan.items[0].classification(), Classification::Stale);
    assert!(matches!(plan.items[0].action, PlannedAction::FetchAndReplace { .. }));

    let report = sync(&engine, &manifest);

    match &report.entries[0].outcome {
        EntryOutcome::Failed { kind, .. } => assert_eq!(*kind, FailureKind::Verification),
        other => panic!("expected verification failure, got {other:?}"),
    }
    fixture.assert_content("mods/lithium.jar", b"lithium 0.11");
    fixture.assert_no_staging_files();
}

#[test]
fn scenario_d_stale_file_is_replaced_when_download_verifies() {
    let fixture = TestRoot::new();
    let url = fixture.publish("lithium.jar", b"lithium 0.12");
    fixture.write("mods/lithium.jar", b"lithium 0.11");
    let location = fixture.publish_manifest(
        &ManifestBuilder::new().entry(EntrySpec::new("Lithium", "lithium.jar", &url, b"lithium 0.12")),
    );
    let engine = engine(&fixture, Mode::Client);

    let report = sync(&engine, &load(&engine, &location));

    assert_eq!(
        outcomes(&report),
        vec![EntryOutcome::Fetched {
            bytes: 12,
            replaced: true
        }]
    );
    fixture.assert_content("mods/lithium.jar", b"lithium 0.12");
}

// =============================================================================
// Scenario E: a second run is a fixed point
// =============================================================================

#[test]
fn scenario_e_second_run_takes_no_action() {
    let fixture = TestRoot::new();
    let sodium = fixture.publish("sodium.jar", b"sodium");
    let shader = fixture.publish("complementary.zip", b"shader");
    let pack = fixture.publish("faithful.zip", b"textures");
    fixture.write("mods/old.jar", b"old");
    fixture.write("mods/server-only.jar", b"server");
    let location = fixture.publish_manifest(
        &ManifestBuilder::new()
            .entry(EntrySpec::new("Sodium", "sodium.jar", &sodium, b"sodium"))
            .entry(
                EntrySpec::new("Complementary", "complementary.zip", &shader, b"shader")
                    .destination("shaderpacks"),
            )
            .legacy_entry(
                EntrySpec::new("Faithful", "faithful.zip", &pack, b"textures")
                    .destination("resourcepacks"),
            )
            .entry(EntrySpec::new("Old", "old.jar", &sodium, b"old").deprecated())
            .entry(
                EntrySpec::new("Server only", "server-only.jar", &sodium, b"server")
                    .server(true)
                    .client(false),
            ),
    );
    let engine = engine(&fixture, Mode::Client);
    let manifest = load(&engine, &location);

    let first = sync(&engine, &manifest);
    assert_eq!(first.summary().fetched, 3);
    assert_eq!(first.summary().deleted, 2);
    assert!(!first.has_failures());

    let second = sync(&engine, &manifest);
    assert!(second
        .entries
        .iter()
        .all(|e| e.outcome == EntryOutcome::Unchanged));
    assert!(engine.check(&manifest).unwrap().is_noop());

    fixture.assert_content("shaderpacks/complementary.zip", b"shader");
    fixture.assert_content("resourcepacks/faithful.zip", b"textures");
    fixture.assert_absent("mods/old.jar");
    fixture.assert_absent("mods/server-only.jar");
}

// =============================================================================
// Additional properties
// =============================================================================

#[test]
fn fetched_entry_classifies_as_satisfied_afterwards() {
    let fixture = TestRoot::new();
    let url = fixture.publish("a.jar", b"a");
    let location =
        fixture.publish_manifest(&ManifestBuilder::new().entry(EntrySpec::new("A", "a.jar", &url, b"a")));
    let engine = engine(&fixture, Mode::Client);
    let manifest = load(&engine, &location);

    sync(&engine, &manifest);

    let plan = engine.check(&manifest).unwrap();
    assert_eq!(plan.items[0].classification(), Classification::Satisfied);
}

#[test]
fn external_tampering_is_repaired_on_the_next_run() {
    let fixture = TestRoot::new();
    let url = fixture.publish("a.jar", b"a");
    let location =
        fixture.publish_manifest(&ManifestBuilder::new().entry(EntrySpec::new("A", "a.jar", &url, b"a")));
    let engine = engine(&fixture, Mode::Client);
    let manifest = load(&engine, &location);
    sync(&engine, &manifest);

    fixture.write("mods/a.jar", b"edited by hand");
    let report = sync(&engine, &manifest);

    assert_eq!(report.entries[0].classification, Classification::Stale);
    fixture.assert_content("mods/a.jar", b"a");
}

#[test]
fn switching_mode_removes_the_other_sides_files() {
    let fixture = TestRoot::new();
    let url = fixture.publish("both.jar", b"both");
    let client_url = fixture.publish("client.jar", b"client");
    let location = fixture.publish_manifest(
        &ManifestBuilder::new()
            .entry(EntrySpec::new("Both", "both.jar", &url, b"both").server(true))
            .entry(EntrySpec::new("Client", "client.jar", &client_url, b"client")),
    );

    let client = engine(&fixture, Mode::Client);
    sync(&client, &load(&client, &location));
    fixture.assert_content("mods/client.jar", b"client");

    let server = engine(&fixture, Mode::Server);
    let report = sync(&server, &load(&server, &location));

    assert_eq!(
        outcomes(&report),
        vec![EntryOutcome::Unchanged, EntryOutcome::Deleted]
    );
    fixture.assert_content("mods/both.jar", b"both");
    fixture.assert_absent("mods/client.jar");
}

#[cfg(unix)]
#[test]
fn file_urls_are_accepted_for_manifest_and_content() {
    let fixture = TestRoot::new();
    let path = fixture.publish("a.jar", b"a");
    let url = format!("file://{path}");
    let manifest_path =
        fixture.publish_manifest(&ManifestBuilder::new().entry(EntrySpec::new("A", "a.jar", &url, b"a")));
    let engine = engine(&fixture, Mode::Client);

    let manifest = load(&engine, &format!("file://{manifest_path}"));
    sync(&engine, &manifest);

    fixture.assert_content("mods/a.jar", b"a");
}

#[test]
fn manifest_with_escaping_destination_is_rejected() {
    let fixture = TestRoot::new();
    let url = fixture.publish("evil.jar", b"evil");
    let location = fixture.publish_manifest(
        &ManifestBuilder::new()
            .entry(EntrySpec::new("Evil", "evil.jar", &url, b"evil").destination("../../outside")),
    );
    let engine = engine(&fixture, Mode::Client);

    let err = engine
        .load_manifest(&location, ParsePolicy::Strict)
        .unwrap_err();

    assert!(matches!(err, modsync_core::Error::InvalidEntry { index: 0, .. }));
    assert!(!fixture.mirror().parent().unwrap().join("outside").exists());
}
