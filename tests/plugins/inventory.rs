use sre_checkpoint::core::board::BoardLookup;
use sre_checkpoint::core::error::CheckpointError;
use sre_checkpoint::core::model::{AppRecord, Board};
use sre_checkpoint::plugins::inventory::FileInventory;
use std::fs;
use tempfile::tempdir;

const INVENTORY: &str = r#"{
  "apps": {
    "/services/zeta/app.yml": {"name": "zeta", "sopsUrl": "https://sops"},
    "/services/alpha/app.yml": {
      "name": "alpha",
      "escalationPolicy": {"channels": {"jiraBoard": [{"name": "ALPHA", "url": "http://jira"}]}}
    }
  },
  "jiraBoards": {
    "/teams/sre/jira/SRE.yml": {"name": "SRE", "url": "http://ticketing"},
    "/teams/many/jira.yml": [
      {"name": "FIRST", "url": "http://one"},
      {"name": "SECOND", "url": "http://two"}
    ]
  }
}"#;

#[test]
fn loads_apps_in_path_order() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("inventory.json");
    fs::write(&path, INVENTORY).expect("write inventory");

    let inventory = FileInventory::load(&path).expect("load");
    assert_eq!(inventory.len(), 2);
    let paths: Vec<&str> = inventory.apps().map(|(p, _)| p).collect();
    assert_eq!(paths, vec!["/services/alpha/app.yml", "/services/zeta/app.yml"]);
}

#[test]
fn finds_apps_by_name() {
    let inventory = FileInventory::from_json_str(INVENTORY).expect("parse");
    let (path, app) = inventory.find_app("alpha").expect("alpha present");
    assert_eq!(path, "/services/alpha/app.yml");
    assert_eq!(
        AppRecord::new(app).board(),
        Some(Board::new("ALPHA", "http://jira"))
    );

    let err = inventory.find_app("ghost").unwrap_err();
    assert!(matches!(err, CheckpointError::NotFound(_)));
}

#[test]
fn unknown_names_do_not_hide_known_apps() {
    let inventory = FileInventory::from_json_str(INVENTORY).expect("parse");
    let names = vec!["ghost".to_string(), "zeta".to_string(), "alpha".to_string()];
    let (found, missing) = inventory.select_apps(&names);

    let paths: Vec<&str> = found.iter().map(|(p, _)| *p).collect();
    assert_eq!(paths, vec!["/services/zeta/app.yml", "/services/alpha/app.yml"]);
    assert_eq!(missing.len(), 1);
    assert!(matches!(&missing[0], CheckpointError::NotFound(msg) if msg.contains("ghost")));
}

#[test]
fn board_lookup_handles_single_list_and_missing() {
    let inventory = FileInventory::from_json_str(INVENTORY).expect("parse");
    assert_eq!(
        inventory.simple_jira_boards("/teams/sre/jira/SRE.yml").unwrap(),
        vec![Board::new("SRE", "http://ticketing")]
    );
    assert_eq!(
        inventory.simple_jira_boards("/teams/many/jira.yml").unwrap().len(),
        2
    );
    assert!(inventory.simple_jira_boards("/nope").unwrap().is_empty());
}

#[test]
fn nameless_app_is_rejected() {
    let err = FileInventory::from_json_str(r#"{"apps": {"/x.yml": {"sopsUrl": "u"}}}"#)
        .unwrap_err();
    assert!(err.to_string().contains("/x.yml"));
}

#[test]
fn unreadable_inventory_is_an_error() {
    let err = FileInventory::load(std::path::Path::new("/no/such/inventory.json")).unwrap_err();
    assert!(matches!(err, CheckpointError::InventoryError(_)));
}
