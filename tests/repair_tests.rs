//! Repair work-order command tests

mod common;

use common::{create_test_repair, setup_test_shop, taller};
use predicates::prelude::*;
use tempfile::TempDir;

fn show_json(tmp: &TempDir, id: &str) -> serde_json::Value {
    let output = taller()
        .current_dir(tmp.path())
        .args(["-o", "json", "repair", "show", id])
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

// ============================================================================
// Intake
// ============================================================================

#[test]
fn test_repair_new_registers_quote_stage() {
    let tmp = setup_test_shop();

    taller()
        .current_dir(tmp.path())
        .args([
            "repair",
            "new",
            "--customer",
            "Jane Smith",
            "--device",
            "Apple iPhone 15",
            "--problem",
            "Pantalla rota, no responde al tacto",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Registered repair REP@1"))
        .stdout(predicate::str::contains("Cotización"));

    let files: Vec<_> = std::fs::read_dir(tmp.path().join("repairs"))
        .unwrap()
        .filter_map(|e| e.ok())
        .collect();
    assert_eq!(files.len(), 1);
}

#[test]
fn test_repair_new_defaults() {
    let tmp = setup_test_shop();
    let id = create_test_repair(&tmp, "Jane Smith", "Apple iPhone 15", "No carga la batería");
    assert!(id.starts_with("REP-"));

    let repair = show_json(&tmp, &id);
    assert_eq!(repair["status"], "Cotización");
    assert_eq!(repair["technician"], "No Asignado");
    assert_eq!(repair["device_type"], "Celular");
    assert_eq!(repair["revision"], 1);
    assert!(repair.get("evaluation").is_none());
}

#[test]
fn test_repair_new_rejects_short_problem() {
    let tmp = setup_test_shop();

    taller()
        .current_dir(tmp.path())
        .args([
            "repair", "new", "-c", "Jane Smith", "-d", "iPhone", "-p", "rota",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("problem_description"));

    let count = std::fs::read_dir(tmp.path().join("repairs")).unwrap().count();
    assert_eq!(count, 0);
}

#[test]
fn test_repair_new_requires_fields_without_wizard() {
    let tmp = setup_test_shop();

    taller()
        .current_dir(tmp.path())
        .args(["repair", "new", "--customer", "Jane Smith"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing --device"));
}

#[test]
fn test_repair_new_with_type_and_technician() {
    let tmp = setup_test_shop();

    let output = taller()
        .current_dir(tmp.path())
        .args([
            "-o",
            "json",
            "repair",
            "new",
            "-c",
            "Carlos Gómez",
            "-t",
            "laptop",
            "-d",
            "Dell XPS 13",
            "-p",
            "No enciende después de una caída",
            "--technician",
            "Maria Rodriguez",
            "--password",
            "1234",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let repair: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(repair["device_type"], "Laptop");
    assert_eq!(repair["technician"], "Maria Rodriguez");
    assert_eq!(repair["password"], "1234");
}

// ============================================================================
// Status lifecycle
// ============================================================================

#[test]
fn test_repair_advance_walks_full_lifecycle() {
    let tmp = setup_test_shop();
    let id = create_test_repair(&tmp, "Jane Smith", "Samsung Galaxy S23", "Se reinicia solo cada hora");

    let steps = [
        "Cotización → Confirmado",
        "Confirmado → En Reparación",
        "En Reparación → Reparado",
        "Reparado → Entregado",
    ];
    for step in steps {
        taller()
            .current_dir(tmp.path())
            .args(["repair", "advance", &id])
            .assert()
            .success()
            .stdout(predicate::str::contains(step));
    }

    // Terminal status: nothing happens
    taller()
        .current_dir(tmp.path())
        .args(["repair", "advance", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("already Entregado"));

    let repair = show_json(&tmp, &id);
    assert_eq!(repair["status"], "Entregado");
    assert_eq!(repair["revision"], 5);
}

#[test]
fn test_repair_set_status_cannot_skip_stages() {
    let tmp = setup_test_shop();
    let id = create_test_repair(&tmp, "Jane Smith", "iPad Air", "Pantalla rota en la esquina");

    taller()
        .current_dir(tmp.path())
        .args(["repair", "set", &id, "status=Reparado"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid status transition"));

    taller()
        .current_dir(tmp.path())
        .args(["repair", "set", &id, "status=confirmado"])
        .assert()
        .success();

    assert_eq!(show_json(&tmp, &id)["status"], "Confirmado");
}

#[test]
fn test_repair_advance_unknown_id_fails() {
    let tmp = setup_test_shop();

    taller()
        .current_dir(tmp.path())
        .args(["repair", "advance", "REP-01J8Z3K4M5N6P7Q8R9S0T1V2W3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Repair not found"));
}

#[test]
fn test_repair_set_rejects_path_like_ids() {
    let tmp = setup_test_shop();
    let outside = tmp.path().join("outside.taller.yaml");
    std::fs::write(&outside, "device: original\n").unwrap();

    for id in ["../outside", "../../outside"] {
        taller()
            .current_dir(tmp.path())
            .args(["repair", "set", id, "device=HACKED"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Repair not found"));
    }
    assert_eq!(std::fs::read_to_string(&outside).unwrap(), "device: original\n");
}

// ============================================================================
// Field updates
// ============================================================================

#[test]
fn test_repair_set_merges_only_named_fields() {
    let tmp = setup_test_shop();
    let id = create_test_repair(&tmp, "Jane Smith", "Apple iPhone 13", "Fallo de cámara trasera");

    taller()
        .current_dir(tmp.path())
        .args([
            "repair",
            "set",
            &id,
            "technician=Juan Perez",
            "imei_or_sn=356938035643809",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("updated technician, imei_or_sn"));

    let repair = show_json(&tmp, &id);
    assert_eq!(repair["technician"], "Juan Perez");
    assert_eq!(repair["imei_or_sn"], "356938035643809");
    assert_eq!(repair["customer"], "Jane Smith");
    assert_eq!(repair["revision"], 2);
}

#[test]
fn test_repair_set_rejects_immutable_and_log_fields() {
    let tmp = setup_test_shop();
    let id = create_test_repair(&tmp, "Jane Smith", "Apple iPhone 13", "Fallo de cámara trasera");

    for assignment in ["evaluation=[]", "id=REP-X", "entry_date=2020-01-01"] {
        taller()
            .current_dir(tmp.path())
            .args(["repair", "set", &id, assignment])
            .assert()
            .failure();
    }
    assert_eq!(show_json(&tmp, &id)["revision"], 1);
}

#[test]
fn test_repair_set_requires_assignment_syntax() {
    let tmp = setup_test_shop();
    let id = create_test_repair(&tmp, "Jane Smith", "Apple iPhone 13", "Fallo de cámara trasera");

    taller()
        .current_dir(tmp.path())
        .args(["repair", "set", &id, "technician"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("FIELD=VALUE"));
}

// ============================================================================
// Evaluation log
// ============================================================================

#[test]
fn test_repair_note_requires_technician() {
    let tmp = setup_test_shop();
    let id = create_test_repair(&tmp, "Jane Smith", "Xiaomi Redmi Note 12", "No lee SIM desde ayer");

    taller()
        .current_dir(tmp.path())
        .args(["repair", "note", &id, "Bandeja SIM doblada"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No technician assigned"));

    assert!(show_json(&tmp, &id).get("evaluation").is_none());
}

#[test]
fn test_repair_notes_append_in_order() {
    let tmp = setup_test_shop();
    let id = create_test_repair(&tmp, "Jane Smith", "Xiaomi Redmi Note 12", "No lee SIM desde ayer");

    taller()
        .current_dir(tmp.path())
        .args(["repair", "set", &id, "technician=Juan Perez"])
        .assert()
        .success();

    taller()
        .current_dir(tmp.path())
        .args(["repair", "note", &id, "Bandeja SIM doblada"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 in log"));

    taller()
        .current_dir(tmp.path())
        .args(["repair", "note", &id, "Lector reemplazado", "--author", "Maria Rodriguez"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 in log"));

    let repair = show_json(&tmp, &id);
    let log = repair["evaluation"].as_array().unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0]["note"], "Bandeja SIM doblada");
    assert_eq!(log[0]["author"], "Juan Perez");
    assert_eq!(log[1]["author"], "Maria Rodriguez");
}

#[test]
fn test_repair_note_rejects_blank_text() {
    let tmp = setup_test_shop();
    let id = create_test_repair(&tmp, "Jane Smith", "Xiaomi Redmi Note 12", "No lee SIM desde ayer");

    taller()
        .current_dir(tmp.path())
        .args(["repair", "set", &id, "technician=Juan Perez"])
        .assert()
        .success();

    taller()
        .current_dir(tmp.path())
        .args(["repair", "note", &id, "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty"));
}

// ============================================================================
// Quote
// ============================================================================

#[test]
fn test_repair_quote_total_follows_parts_and_labor() {
    let tmp = setup_test_shop();
    let id = create_test_repair(&tmp, "Jane Smith", "Apple iPhone 15", "Pantalla rota, no responde");

    taller()
        .current_dir(tmp.path())
        .args(["repair", "part", &id, "Pantalla OLED", "150"])
        .assert()
        .success()
        .stdout(predicate::str::contains("total $150.00"));

    taller()
        .current_dir(tmp.path())
        .args(["repair", "labor", &id, "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("total $200.00"));

    taller()
        .current_dir(tmp.path())
        .args(["repair", "part", &id, "Adhesivo", "5.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("total $205.50"));

    taller()
        .current_dir(tmp.path())
        .args(["repair", "unpart", &id, "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("total $55.50"));

    let repair = show_json(&tmp, &id);
    let parts = repair["quote"]["parts"].as_array().unwrap();
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0]["name"], "Adhesivo");
    assert_eq!(repair["quote"]["total"], 55.5);
}

#[test]
fn test_repair_quote_rejects_negative_price() {
    let tmp = setup_test_shop();
    let id = create_test_repair(&tmp, "Jane Smith", "Apple iPhone 15", "Pantalla rota, no responde");

    taller()
        .current_dir(tmp.path())
        .args(["repair", "part", &id, "Pantalla", "--", "-10"])
        .assert()
        .failure();

    assert!(show_json(&tmp, &id).get("quote").is_none());
}

#[test]
fn test_repair_unpart_unknown_position_fails() {
    let tmp = setup_test_shop();
    let id = create_test_repair(&tmp, "Jane Smith", "Apple iPhone 15", "Pantalla rota, no responde");

    taller()
        .current_dir(tmp.path())
        .args(["repair", "unpart", &id, "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no part #3"));
}

#[test]
fn test_repair_unpart_position_zero_fails() {
    let tmp = setup_test_shop();
    let id = create_test_repair(&tmp, "Jane Smith", "Apple iPhone 15", "Pantalla rota, no responde");

    taller()
        .current_dir(tmp.path())
        .args(["repair", "part", &id, "Pantalla", "150"])
        .assert()
        .success();

    taller()
        .current_dir(tmp.path())
        .args(["repair", "unpart", &id, "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no part #0"));
    assert_eq!(show_json(&tmp, &id)["quote"]["total"], 150.0);
}

#[test]
fn test_repair_set_quote_recomputes_total() {
    let tmp = setup_test_shop();
    let id = create_test_repair(&tmp, "Jane Smith", "Apple iPhone 15", "Pantalla rota, no responde");

    taller()
        .current_dir(tmp.path())
        .args([
            "repair",
            "set",
            &id,
            "quote={parts: [{id: PART-01J8Z3K4M5N6P7Q8R9S0T1V2W3, name: Batería, price: 80}], labor: 20, total: 9999}",
        ])
        .assert()
        .success();

    assert_eq!(show_json(&tmp, &id)["quote"]["total"], 100.0);
}

// ============================================================================
// Functionality test
// ============================================================================

#[test]
fn test_repair_functionality_checks() {
    let tmp = setup_test_shop();
    let id = create_test_repair(&tmp, "Jane Smith", "Motorola Edge 40", "Problema de altavoz al llamar");

    taller()
        .current_dir(tmp.path())
        .args(["repair", "test", &id, "speaker=fail", "wifi=ok", "--other", "Rayón en la tapa"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 failing"));

    taller()
        .current_dir(tmp.path())
        .args(["repair", "test", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Falla"))
        .stdout(predicate::str::contains("Rayón en la tapa"));
}

#[test]
fn test_repair_functionality_checks_are_one_write() {
    let tmp = setup_test_shop();
    let id = create_test_repair(&tmp, "Jane Smith", "Motorola Edge 40", "Problema de altavoz al llamar");

    taller()
        .current_dir(tmp.path())
        .args(["repair", "test", &id, "screen=fail", "touch=ok", "--other", "Marco doblado"])
        .assert()
        .success();

    let repair = show_json(&tmp, &id);
    assert_eq!(repair["revision"], 2);
    assert_eq!(repair["functionality_test"]["screen"], "fail");
    assert_eq!(repair["functionality_test"]["other"], "Marco doblado");

    // A bad item anywhere in the list means nothing is written
    taller()
        .current_dir(tmp.path())
        .args(["repair", "test", &id, "wifi=ok", "antenna=ok"])
        .assert()
        .failure();
    assert_eq!(show_json(&tmp, &id)["revision"], 2);
}

#[test]
fn test_repair_set_functionality_test_yaml() {
    let tmp = setup_test_shop();
    let id = create_test_repair(&tmp, "Jane Smith", "Apple iPhone 12", "Fallo de cámara frontal");

    taller()
        .current_dir(tmp.path())
        .args(["repair", "set", &id, "functionalityTest={cameraFront: fail, chargingPort: fail}"])
        .assert()
        .success();

    let repair = show_json(&tmp, &id);
    assert_eq!(repair["functionality_test"]["camera_front"], "fail");
    assert_eq!(repair["functionality_test"]["charging_port"], "fail");
    assert_eq!(repair["functionality_test"]["screen"], "na");

    taller()
        .current_dir(tmp.path())
        .args(["repair", "set", &id, "functionality_test={scren: fail}"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("scren"));
    assert_eq!(show_json(&tmp, &id)["revision"], 2);
}

#[test]
fn test_repair_functionality_unknown_item() {
    let tmp = setup_test_shop();
    let id = create_test_repair(&tmp, "Jane Smith", "Motorola Edge 40", "Problema de altavoz al llamar");

    taller()
        .current_dir(tmp.path())
        .args(["repair", "test", &id, "antenna=ok"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown functionality test item"));
}

// ============================================================================
// Listing, search, short ids
// ============================================================================

#[test]
fn test_repair_list_empty() {
    let tmp = setup_test_shop();

    taller()
        .current_dir(tmp.path())
        .args(["repair", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No repairs found"));
}

#[test]
fn test_repair_list_filters_and_search() {
    let tmp = setup_test_shop();
    let first = create_test_repair(&tmp, "Jane Smith", "Apple iPhone 15", "Pantalla rota, no responde");
    create_test_repair(&tmp, "Carlos Gómez", "Samsung Galaxy A54", "No carga con ningún cable");

    taller()
        .current_dir(tmp.path())
        .args(["repair", "advance", &first])
        .assert()
        .success();

    taller()
        .current_dir(tmp.path())
        .args(["repair", "list", "--count"])
        .assert()
        .success()
        .stdout("2\n");

    taller()
        .current_dir(tmp.path())
        .args(["repair", "list", "--status", "confirmado"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Jane Smith"))
        .stdout(predicate::str::contains("Carlos").not());

    taller()
        .current_dir(tmp.path())
        .args(["repair", "list", "--search", "GALAXY"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Carlos Gómez"))
        .stdout(predicate::str::contains("Jane").not());

    taller()
        .current_dir(tmp.path())
        .args(["repair", "list", "--technician", "No Asignado", "--count"])
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_repair_short_ids_follow_last_listing() {
    let tmp = setup_test_shop();
    create_test_repair(&tmp, "Jane Smith", "Apple iPhone 15", "Pantalla rota, no responde");
    let second = create_test_repair(&tmp, "Carlos Gómez", "Samsung Galaxy A54", "No carga con ningún cable");

    taller()
        .current_dir(tmp.path())
        .args(["repair", "list", "--reverse"])
        .assert()
        .success();

    // @1 is the first row of the last listing: the newest repair
    let output = taller()
        .current_dir(tmp.path())
        .args(["-o", "id", "repair", "show", "@1"])
        .output()
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), second);

    taller()
        .current_dir(tmp.path())
        .args(["repair", "show", "REP@2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Carlos Gómez"));
}

#[test]
fn test_repair_show_masks_password() {
    let tmp = setup_test_shop();

    taller()
        .current_dir(tmp.path())
        .args([
            "repair",
            "new",
            "-c",
            "Jane Smith",
            "-d",
            "Apple iPhone 15",
            "-p",
            "Pantalla rota, no responde",
            "--password",
            "8642",
        ])
        .assert()
        .success();

    taller()
        .current_dir(tmp.path())
        .args(["repair", "show", "REP@1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("****"))
        .stdout(predicate::str::contains("8642").not())
        .stdout(predicate::str::contains("Confirmar Reparación"));

    taller()
        .current_dir(tmp.path())
        .args(["repair", "show", "REP@1", "--reveal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("8642"));
}
