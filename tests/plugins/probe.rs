#[path = "../common/mod.rs"]
mod common;

use common::{MockResponse, spawn_mock_server};
use serde_json::json;
use sre_checkpoint::core::config::ProbeSettings;
use sre_checkpoint::core::validate::{FieldValidator, HttpProbe, UrlReachable, Verdict};
use sre_checkpoint::plugins::probe::UreqProbe;
use std::net::TcpListener;
use std::sync::Arc;

fn probe() -> UreqProbe {
    UreqProbe::new(&ProbeSettings {
        timeout_secs: 5,
        ..ProbeSettings::default()
    })
}

#[test]
fn reports_success_and_client_error_statuses() {
    let (base_url, handle) = spawn_mock_server(vec![
        MockResponse::new("GET", "/existing", 200, "{}"),
        MockResponse::new("GET", "/gated", 403, "{}"),
        MockResponse::new("GET", "/nonexisting", 404, "{}"),
    ]);
    let probe = probe();
    assert_eq!(probe.status(&format!("{}/existing", base_url)).unwrap(), 200);
    assert_eq!(probe.status(&format!("{}/gated", base_url)).unwrap(), 403);
    assert_eq!(probe.status(&format!("{}/nonexisting", base_url)).unwrap(), 404);
    handle.join().expect("server thread");
}

#[test]
fn url_validator_over_real_probe() {
    let (base_url, handle) = spawn_mock_server(vec![
        MockResponse::new("GET", "/existing", 200, "{}"),
        MockResponse::new("GET", "/nonexisting", 404, "{}"),
    ]);
    let validator = UrlReachable::new(Arc::new(probe()));
    assert_eq!(
        validator.check(Some(&json!(format!("{}/existing", base_url)))),
        Verdict::Valid
    );
    assert_eq!(
        validator.check(Some(&json!(format!("{}/nonexisting", base_url)))),
        Verdict::Invalid
    );
    handle.join().expect("server thread");
}

#[test]
fn refused_connection_is_an_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let result = probe().status(&format!("http://127.0.0.1:{}/doc", port));
    assert!(result.is_err());
}
