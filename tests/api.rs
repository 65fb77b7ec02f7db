use pipegraph::{
    GraphError, Status,
    client::ApiClient,
    config::ApiConfig,
};

fn client(server: &mockito::Server, token: Option<&str>) -> ApiClient {
    ApiClient::new(&ApiConfig {
        base_url: server.url(),
        auth_token: token.map(str::to_string),
    })
    .unwrap()
}

#[test]
fn fetches_wrapped_spec_with_bearer_token() {
    let mut server = mockito::Server::new();
    let spec = r#"{"tasks": {"build": {"dependencies": ["compile"]}, "compile": {}}}"#;
    let mock = server
        .mock("GET", "/api/v1/info/workflow/ci/pipeline/release")
        .match_header("authorization", "Bearer sampleAuthToken")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::json!({ "name": "release", "spec": spec }).to_string())
        .create();

    let spec = client(&server, Some("sampleAuthToken"))
        .pipeline_spec("ci", "release")
        .unwrap();

    mock.assert();
    assert_eq!(spec.tasks.len(), 2);
    assert_eq!(spec.tasks["build"].dependencies, vec!["compile"]);
}

#[test]
fn fetches_run_status() {
    let mut server = mockito::Server::new();
    let run = r#"{"status": "Error", "tasks": {"build": {"status": "Error"}}}"#;
    let mock = server
        .mock("GET", "/api/v1/info/workflow/ci/pipeline/release/runs/42")
        .with_status(200)
        .with_body(serde_json::json!({ "runInfo": run }).to_string())
        .create();

    let run = client(&server, None)
        .pipeline_run("ci", "release", "42")
        .unwrap();

    mock.assert();
    assert_eq!(run.status, Some(Status::Error));
    assert_eq!(run.tasks["build"].status, Some(Status::Error));
}

#[test]
fn non_success_status_is_an_api_error() {
    let mut server = mockito::Server::new();
    let _mock = server
        .mock("GET", "/api/v1/info/workflow/ci/pipeline/missing")
        .with_status(404)
        .create();

    let result = client(&server, None).pipeline_spec("ci", "missing");
    assert!(matches!(result, Err(GraphError::Api(_))));
}
