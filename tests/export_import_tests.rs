//! CSV export/import round-trip and legacy-format tests

mod common;

use common::{create_block, create_event, create_orchard, create_sector, o360, setup_test_project};
use predicates::prelude::*;
use std::fs;

const EXPORT_HEADER: &str = "id,sector,orchard,block,status,quantity,tce,notes,lastUpdated,\
                             variety,structureType,rowCount,hectares,latitude,longitude,blockHealth";

fn seeded_project() -> tempfile::TempDir {
    let tmp = setup_test_project();
    create_sector(&tmp, "North");
    create_orchard(&tmp, "North", "Tutaekuri");
    create_block(&tmp, "Tutaekuri", "B3", "Jazz");
    create_event(&tmp, "B3", "18", "kneecapped");
    tmp
}

#[test]
fn test_export_header_and_names() {
    let tmp = seeded_project();

    let output = o360()
        .current_dir(tmp.path())
        .args(["export", "-o", "-"])
        .output()
        .unwrap();
    let csv = String::from_utf8_lossy(&output.stdout);

    assert_eq!(csv.lines().next().unwrap(), EXPORT_HEADER);
    let row = csv.lines().nth(1).unwrap();
    assert!(row.contains(",North,Tutaekuri,B3,Kneecapped,18,"));
}

#[test]
fn test_export_writes_timestamped_file() {
    let tmp = seeded_project();

    o360()
        .current_dir(tmp.path())
        .arg("export")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 events"));

    let exported: Vec<_> = fs::read_dir(tmp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name()
                .to_string_lossy()
                .starts_with("orchard360_export_")
        })
        .collect();
    assert_eq!(exported.len(), 1);
}

#[test]
fn test_export_respects_filters() {
    let tmp = seeded_project();
    create_sector(&tmp, "South");
    create_orchard(&tmp, "South", "Clive");
    create_block(&tmp, "Clive", "Q1", "Envy");
    create_event(&tmp, "Q1", "7", "removed");

    let output = o360()
        .current_dir(tmp.path())
        .args(["export", "-o", "-", "--sector", "South"])
        .output()
        .unwrap();
    let csv = String::from_utf8_lossy(&output.stdout);

    assert_eq!(csv.lines().count(), 2);
    assert!(csv.contains("Q1"));
    assert!(!csv.contains("B3"));
}

#[test]
fn test_roundtrip_into_fresh_project() {
    let source = seeded_project();
    let output = o360()
        .current_dir(source.path())
        .args(["export", "-o", "-"])
        .output()
        .unwrap();
    let csv = String::from_utf8_lossy(&output.stdout).into_owned();

    let target = setup_test_project();
    let file = target.path().join("incoming.csv");
    fs::write(&file, &csv).unwrap();

    o360()
        .current_dir(target.path())
        .args(["import", "incoming.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 new, 0 replaced"));

    // scope entities were re-created by name
    o360()
        .current_dir(target.path())
        .args(["sector", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("North"));
    o360()
        .current_dir(target.path())
        .args(["event", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Kneecapped"));
}

#[test]
fn test_reimport_replaces_by_id() {
    let tmp = seeded_project();
    let output = o360()
        .current_dir(tmp.path())
        .args(["export", "-o", "-"])
        .output()
        .unwrap();
    let csv = String::from_utf8_lossy(&output.stdout).into_owned();

    let file = tmp.path().join("again.csv");
    fs::write(&file, &csv).unwrap();

    o360()
        .current_dir(tmp.path())
        .args(["import", "again.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0 new, 1 replaced"));

    let list = o360()
        .current_dir(tmp.path())
        .args(["event", "list", "--format", "id"])
        .output()
        .unwrap();
    let ids = String::from_utf8_lossy(&list.stdout);
    assert_eq!(ids.lines().count(), 1);
}

#[test]
fn test_import_blank_id_gets_fresh_id() {
    let tmp = setup_test_project();
    let file = tmp.path().join("partial.csv");
    fs::write(
        &file,
        "id,sector,orchard,block,status,quantity\n,North,Tutaekuri,B3,Grafted,19\n",
    )
    .unwrap();

    o360()
        .current_dir(tmp.path())
        .args(["import", "partial.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 new"));

    let list = o360()
        .current_dir(tmp.path())
        .args(["event", "list", "--format", "id"])
        .output()
        .unwrap();
    let ids = String::from_utf8_lossy(&list.stdout);
    assert!(ids.trim().starts_with("EVT-"));
}

#[test]
fn test_import_legacy_flat_format() {
    let tmp = setup_test_project();
    let file = tmp.path().join("legacy.csv");
    fs::write(
        &file,
        "id,orchard,block,row,tree,variety,rootstock,age,healthScore,tce,notes,status,latitude,longitude,lastUpdated\n\
         T-0001,Tutaekuri,B3,4,12,Jazz,M9,6,92,1.2,,OK,-39.5903,176.8506,2024-01-15T09:30:00Z\n\
         T-0002,Tutaekuri,B3,4,13,Jazz,M9,6,88,1.2,,Removed,-39.5903,176.8506,2024-01-16T10:00:00Z\n",
    )
    .unwrap();

    o360()
        .current_dir(tmp.path())
        .args(["import", "legacy.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 new"));

    // no sector column: rows land under "Unknown"
    o360()
        .current_dir(tmp.path())
        .args(["sector", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unknown"));

    // one tree per legacy row, statuses mapped through the legacy table
    o360()
        .current_dir(tmp.path())
        .args(["event", "list", "--status", "removed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 events"));
    o360()
        .current_dir(tmp.path())
        .args(["stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 trees total"));
}

#[test]
fn test_import_empty_file_fails() {
    let tmp = setup_test_project();
    let file = tmp.path().join("empty.csv");
    fs::write(&file, "").unwrap();

    o360()
        .current_dir(tmp.path())
        .args(["import", "empty.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no header row"));
}
