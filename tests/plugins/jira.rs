#[path = "../common/mod.rs"]
mod common;

use common::{MockResponse, spawn_mock_server};
use sre_checkpoint::core::config::JiraSettings;
use sre_checkpoint::core::error::CheckpointError;
use sre_checkpoint::core::model::Board;
use sre_checkpoint::core::ticket::{TicketingClient, TicketingConnector};
use sre_checkpoint::plugins::jira::{JiraClient, JiraConnector};

fn settings() -> JiraSettings {
    JiraSettings {
        token_env: "SRE_CHECKPOINT_UNSET_TOKEN_FOR_TESTS".to_string(),
        token: Some("t0ken".to_string()),
        timeout_secs: 5,
        ..JiraSettings::default()
    }
}

fn labels() -> Vec<String> {
    vec!["sre-checkpoint".to_string()]
}

#[test]
fn create_issue_posts_fields_then_links_parent() {
    let (base_url, handle) = spawn_mock_server(vec![
        MockResponse::new(
            "POST",
            "/rest/api/2/issue",
            201,
            r#"{"id":"10001","key":"APP-7","self":"x"}"#,
        ),
        MockResponse::new("POST", "/rest/api/2/issueLink", 201, ""),
    ]);
    let board = Board::new("APP", format!("{}/", base_url));
    let client = JiraClient::new(&board, &settings()).expect("client");
    assert_eq!(client.project(), "APP");

    let issue = client
        .create_issue(
            "Missing metadata sopsUrl for app",
            "body text\n",
            &labels(),
            &["SRE-1".to_string()],
        )
        .expect("issue created");
    assert_eq!(issue.key, "APP-7");
    assert_eq!(issue.url.as_deref(), Some(format!("{}/browse/APP-7", base_url).as_str()));

    let requests = handle.join().expect("server thread");
    assert_eq!(requests.len(), 2);

    let create = &requests[0];
    assert_eq!(create.header("authorization"), Some("Bearer t0ken"));
    let create_body = create.json();
    let fields = &create_body["fields"];
    assert_eq!(fields["project"]["key"], "APP");
    assert_eq!(fields["summary"], "Missing metadata sopsUrl for app");
    assert_eq!(fields["description"], "body text\n");
    assert_eq!(fields["issuetype"]["name"], "Task");
    assert_eq!(fields["labels"], serde_json::json!(["sre-checkpoint"]));

    let link = requests[1].json();
    assert_eq!(link["type"]["name"], "Relates");
    assert_eq!(link["inwardIssue"]["key"], "APP-7");
    assert_eq!(link["outwardIssue"]["key"], "SRE-1");
}

#[test]
fn rejected_create_is_a_ticketing_error() {
    let (base_url, handle) = spawn_mock_server(vec![MockResponse::new(
        "POST",
        "/rest/api/2/issue",
        400,
        r#"{"errors":{"project":"project is required"}}"#,
    )]);
    let client = JiraClient::new(&Board::new("APP", base_url), &settings()).expect("client");

    let err = client
        .create_issue("s", "b", &labels(), &[])
        .expect_err("create should fail");
    match err {
        CheckpointError::TicketingError(msg) => {
            assert!(msg.contains("HTTP 400"), "{msg}");
            assert!(msg.contains("project is required"), "{msg}");
        }
        other => panic!("unexpected error {other:?}"),
    }
    handle.join().expect("server thread");
}

#[test]
fn failed_link_still_returns_the_issue() {
    let (base_url, handle) = spawn_mock_server(vec![
        MockResponse::new("POST", "/rest/api/2/issue", 201, r#"{"key":"APP-8"}"#),
        MockResponse::new("POST", "/rest/api/2/issueLink", 404, r#"{"errorMessages":["nope"]}"#),
    ]);
    let client = JiraClient::new(&Board::new("APP", base_url), &settings()).expect("client");

    let issue = client
        .create_issue("s", "b", &labels(), &["SRE-404".to_string()])
        .expect("issue created despite link failure");
    assert_eq!(issue.key, "APP-8");
    assert_eq!(handle.join().expect("server thread").len(), 2);
}

#[test]
fn missing_token_fails_to_connect() {
    let connector = JiraConnector::new(JiraSettings {
        token: None,
        ..settings()
    });
    let err = connector
        .connect(&Board::new("APP", "http://jira"))
        .err()
        .expect("connect should fail");
    assert!(matches!(err, CheckpointError::ConfigError(_)));
}

#[test]
fn board_without_url_fails_to_connect() {
    let connector = JiraConnector::new(settings());
    let err = connector
        .connect(&Board::new("APP", ""))
        .err()
        .expect("connect should fail");
    assert!(err.to_string().contains("APP"));
}
