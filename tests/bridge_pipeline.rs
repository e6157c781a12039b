//! Bridge Pipeline Tests
//!
//! End-to-end calls through `ProcedureBridge` against the in-memory engine:
//! - successful calls pass status and body through unchanged
//! - shape errors and engine parameter errors become 400s
//! - unrecognized errors and reported 500s are faults
//! - exclusivity keys serialize calls

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use procbridge::api::{BridgeRequest, CallOptions, ProcedureBridge, UNSUPPORTED_CONTENT_TYPE};
use procbridge::binder::{ParameterBinding, Scalar};
use procbridge::invoker::{InvokeError, BODY_PARAMETER, STATUS_PARAMETER};
use procbridge::session::{
    CallArguments, EngineError, MemoryConnector, MemoryEngine, OutputValues, ProcedureDef,
};
use procbridge::{BridgeConfig, BridgeError, ConnectionConfig, JsonResult};
use serde_json::{json, Value};
use tempfile::NamedTempFile;

// =============================================================================
// Helper Functions
// =============================================================================

fn respond(status: i64, body: Value) -> Result<OutputValues, EngineError> {
    Ok(OutputValues::new()
        .with(STATUS_PARAMETER, Some(Scalar::Integer(status)))
        .with(BODY_PARAMETER, Some(Scalar::Text(body.to_string()))))
}

/// Echoes its scalar inputs back as a JSON object
fn echo_inputs(args: &CallArguments) -> Result<OutputValues, EngineError> {
    let mut body = serde_json::Map::new();
    for binding in args.bindings() {
        let value = match binding.value.as_scalar() {
            Some(Scalar::Integer(i)) => json!(i),
            Some(other) => json!(other.to_string()),
            None => Value::Null,
        };
        body.insert(binding.name.clone(), value);
    }
    respond(200, Value::Object(body))
}

fn register_procedures(engine: &MemoryEngine) {
    engine.register(
        ProcedureDef::new("GetUser")
            .input("Id")
            .optional("UserId")
            .optional("SessionId")
            .output(STATUS_PARAMETER)
            .output(BODY_PARAMETER)
            .body(echo_inputs),
    );
    engine.register(
        ProcedureDef::new("TwoArgs")
            .optional("A")
            .optional("B")
            .output(STATUS_PARAMETER)
            .output(BODY_PARAMETER)
            .body(|_| respond(200, json!({}))),
    );
    engine.register(
        ProcedureDef::new("SaveOrder")
            .input("CustomerId")
            .table("Lines", ["Sku", "Quantity"])
            .output(STATUS_PARAMETER)
            .output(BODY_PARAMETER)
            .body(|args| {
                let lines = args.table("Lines").map(|t| t.len()).unwrap_or(0);
                respond(201, json!({ "lines": lines }))
            }),
    );
    engine.register(
        ProcedureDef::new("Crash")
            .output(STATUS_PARAMETER)
            .output(BODY_PARAMETER)
            .body(|_| respond(500, json!({ "detail": "kept out of the response" }))),
    );
    engine.register(
        ProcedureDef::new("Divide")
            .output(STATUS_PARAMETER)
            .output(BODY_PARAMETER)
            .body(|_| Err(EngineError::new("Divide by zero error encountered."))),
    );
    engine.register(
        ProcedureDef::new("Slow")
            .optional("Key")
            .output(STATUS_PARAMETER)
            .output(BODY_PARAMETER)
            .latency(Duration::from_millis(40))
            .body(|_| respond(200, json!({}))),
    );
}

fn setup(config: BridgeConfig) -> (Arc<MemoryEngine>, ProcedureBridge<MemoryConnector>) {
    let engine = Arc::new(MemoryEngine::new());
    register_procedures(&engine);
    let connector = MemoryConnector::new(&config.connection, engine.clone()).unwrap();
    (engine, ProcedureBridge::new(config, connector).unwrap())
}

fn setup_default() -> (Arc<MemoryEngine>, ProcedureBridge<MemoryConnector>) {
    setup(BridgeConfig::new(ConnectionConfig::new("Server=memory")))
}

fn request(method: Method, content_type: Option<&'static str>, body: impl Into<String>) -> BridgeRequest {
    let mut headers = HeaderMap::new();
    if let Some(content_type) = content_type {
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    BridgeRequest::new(method, headers, body.into())
}

fn post_json(body: Value) -> BridgeRequest {
    request(Method::POST, Some("application/json"), body.to_string())
}

fn error_message(result: &JsonResult) -> String {
    let body: Value = serde_json::from_str(result.body.as_deref().unwrap()).unwrap();
    body["Error"].as_str().unwrap().to_string()
}

fn body_json(result: &JsonResult) -> Value {
    serde_json::from_str(result.body.as_deref().unwrap()).unwrap()
}

// =============================================================================
// Success Path
// =============================================================================

#[tokio::test]
async fn test_status_and_body_pass_through() {
    let (_, bridge) = setup_default();
    let result = bridge
        .execute("GetUser", &post_json(json!({ "Id": 7 })), CallOptions::new())
        .await
        .unwrap();

    assert_eq!(result.status, StatusCode::OK);
    assert_eq!(body_json(&result), json!({ "Id": 7 }));

    let response = result.into_response();
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache, no-store, must-revalidate");
}

#[tokio::test]
async fn test_table_parameter_end_to_end() {
    let (engine, bridge) = setup_default();
    let body = json!({
        "CustomerId": 3,
        "Lines": [{ "Sku": "A-1", "Quantity": 2 }, { "Sku": "B-2" }]
    });

    for _ in 0..2 {
        let result = bridge
            .execute("SaveOrder", &post_json(body.clone()), CallOptions::new())
            .await
            .unwrap();
        assert_eq!(result.status, StatusCode::CREATED);
        assert_eq!(body_json(&result), json!({ "lines": 2 }));
    }

    // Column lookup cached after the first call
    assert_eq!(engine.catalog_queries(), 1);
    assert_eq!(bridge.resolver().cached_len(), 1);
}

#[tokio::test]
async fn test_form_body_binds_flat_text() {
    let (_, bridge) = setup_default();
    let result = bridge
        .execute(
            "GetUser",
            &request(Method::PUT, Some("application/x-www-form-urlencoded"), "Id=abc"),
            CallOptions::new(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(&result), json!({ "Id": "abc" }));
}

#[tokio::test]
async fn test_identity_cookies_injected_when_absent() {
    let (_, bridge) = setup_default();
    let mut req = post_json(json!({ "Id": 1 }));
    req.headers.insert(
        header::COOKIE,
        HeaderValue::from_static("UserId=42; SessionId=67e55044-10b1-426f-9247-bb680e5fe0c8"),
    );

    let result = bridge.execute("GetUser", &req, CallOptions::new()).await.unwrap();
    assert_eq!(
        body_json(&result),
        json!({ "Id": 1, "UserId": 42, "SessionId": "67e55044-10b1-426f-9247-bb680e5fe0c8" })
    );

    // A body value wins over the cookie
    let mut req = post_json(json!({ "Id": 1, "UserId": 5 }));
    req.headers.insert(header::COOKIE, HeaderValue::from_static("UserId=42"));
    let result = bridge.execute("GetUser", &req, CallOptions::new()).await.unwrap();
    assert_eq!(body_json(&result), json!({ "Id": 1, "UserId": 5 }));

    // Identity can be switched off
    let mut req = post_json(json!({ "Id": 1 }));
    req.headers.insert(header::COOKIE, HeaderValue::from_static("UserId=42"));
    let result = bridge
        .execute("GetUser", &req, CallOptions::new().without_identity())
        .await
        .unwrap();
    assert_eq!(body_json(&result), json!({ "Id": 1 }));
}

#[tokio::test]
async fn test_extra_parameters_without_body() {
    let (_, bridge) = setup_default();
    let options = CallOptions::new()
        .without_body()
        .with_parameter(ParameterBinding::scalar("Id", Scalar::Integer(9)));
    let result = bridge
        .execute("GetUser", &post_json(json!({ "ignored": true })), options)
        .await
        .unwrap();
    assert_eq!(body_json(&result), json!({ "Id": 9 }));
}

// =============================================================================
// Rejections (4xx)
// =============================================================================

#[tokio::test]
async fn test_unsupported_content_type() {
    let (engine, bridge) = setup_default();
    for content_type in [None, Some("text/xml")] {
        let result = bridge
            .execute("GetUser", &request(Method::POST, content_type, "<Id/>"), CallOptions::new())
            .await
            .unwrap();
        assert_eq!(result.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(error_message(&result), UNSUPPORTED_CONTENT_TYPE);
    }
    assert_eq!(engine.executions(), 0);
}

#[tokio::test]
async fn test_shape_errors() {
    let (engine, bridge) = setup_default();
    let cases = [
        (json!([1, 2]), "Could not parse a simple JSON object"),
        (json!({ "Id": ["a", 1] }), "If you pass an array of scalars, they must all be of the same type."),
        (json!({ "Id": { "nested": true } }), "Values with type 'StartObject' are not supported."),
        (
            json!({ "CustomerId": 1, "Lines": [{ "Sku": "x", "Color": "red" }] }),
            "\"Color\" is not a valid property of \"Lines\".",
        ),
    ];

    for (body, expected) in cases {
        let result = bridge
            .execute("SaveOrder", &post_json(body), CallOptions::new())
            .await
            .unwrap();
        assert_eq!(result.status, StatusCode::BAD_REQUEST);
        assert_eq!(error_message(&result), expected);
    }

    let result = bridge
        .execute(
            "SaveOrder",
            &request(Method::POST, Some("application/json"), r#"{"Lines":[{"Sku":"a","Sku":"b"}]}"#),
            CallOptions::new(),
        )
        .await
        .unwrap();
    assert_eq!(error_message(&result), "You specified multiple values for \"Sku\".");

    let result = bridge
        .execute(
            "SaveOrder",
            &request(Method::POST, Some("application/json"), r#"{"Lines":[{"sku":"a"}]}"#),
            CallOptions::new(),
        )
        .await
        .unwrap();
    assert_eq!(error_message(&result), "\"sku\" is not a valid property of \"Lines\".");

    let result = bridge
        .execute(
            "SaveOrder",
            &request(Method::POST, Some("application/json"), r#"{"CustomerId":1e400}"#),
            CallOptions::new(),
        )
        .await
        .unwrap();
    assert_eq!(result.status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&result), "Could not parse the JSON.");
    assert_eq!(engine.executions(), 0);
}

#[tokio::test]
async fn test_parse_details_follow_diagnostics_setting() {
    let truncated = r#"{"Id": 1"#;

    let (_, quiet) = setup_default();
    let result = quiet
        .execute("GetUser", &request(Method::POST, Some("application/json"), truncated), CallOptions::new())
        .await
        .unwrap();
    assert_eq!(error_message(&result), "Could not parse the JSON.");

    let (_, verbose) = setup(BridgeConfig::new(ConnectionConfig::new("Server=memory")).with_diagnostics(true));
    let result = verbose
        .execute("GetUser", &request(Method::POST, Some("application/json"), truncated), CallOptions::new())
        .await
        .unwrap();
    let message = error_message(&result);
    assert!(message.starts_with("Could not parse the JSON.\r\n\r\nDetails:\n"), "{}", message);
}

#[tokio::test]
async fn test_missing_required_parameter() {
    let (_, bridge) = setup_default();
    let result = bridge
        .execute("GetUser", &post_json(json!({})), CallOptions::new())
        .await
        .unwrap();
    assert_eq!(result.status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&result), "The parameter \"Id\" is a required input.");
}

#[tokio::test]
async fn test_unknown_parameter() {
    let (_, bridge) = setup_default();
    let result = bridge
        .execute("TwoArgs", &post_json(json!({ "Zed": 1 })), CallOptions::new())
        .await
        .unwrap();
    assert_eq!(error_message(&result), "The parameter called \"Zed\" is invalid for this endpoint.");

    // A table value for an undeclared name uses the engine's other phrasing
    let result = bridge
        .execute("TwoArgs", &post_json(json!({ "Rows": [1, 2] })), CallOptions::new())
        .await
        .unwrap();
    assert_eq!(error_message(&result), "The parameter called \"Rows\" is invalid for this endpoint.");
}

#[tokio::test]
async fn test_too_many_arguments_names_the_extras() {
    let (_, bridge) = setup_default();

    let result = bridge
        .execute("TwoArgs", &post_json(json!({ "A": 1, "B": 2, "C": 3 })), CallOptions::new())
        .await
        .unwrap();
    assert_eq!(error_message(&result), "The parameter called \"C\" is invalid for this endpoint.");

    let result = bridge
        .execute(
            "TwoArgs",
            &post_json(json!({ "A": 1, "B": 2, "C": 3, "D": 4 })),
            CallOptions::new(),
        )
        .await
        .unwrap();
    assert_eq!(
        error_message(&result),
        "The following parameters are invalid for this endpoint: \"C\", \"D\""
    );
}

#[tokio::test]
async fn test_too_many_arguments_reports_duplicates() {
    let (_, bridge) = setup_default();
    let raw = r#"{"A": 1, "B": 2, "A": 3}"#;
    let result = bridge
        .execute("TwoArgs", &request(Method::POST, Some("application/json"), raw), CallOptions::new())
        .await
        .unwrap();
    assert_eq!(error_message(&result), "The following parameters were duplicates: \"A\"");
}

// =============================================================================
// Faults
// =============================================================================

#[tokio::test]
async fn test_reported_500_is_a_fault() {
    let (_, bridge) = setup_default();
    let err = bridge
        .execute("Crash", &post_json(json!({})), CallOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::Invoke(InvokeError::ReportedServerError(_))));

    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_unrecognized_engine_error_is_a_fault() {
    let (_, bridge) = setup_default();
    let err = bridge
        .execute("Divide", &post_json(json!({})), CallOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::UnrecognizedEngineError(_)));
}

#[tokio::test]
async fn test_missing_table_type_is_a_fault() {
    let (_, bridge) = setup_default();
    let err = bridge
        .execute("TwoArgs", &post_json(json!({ "A": [{ "X": 1 }] })), CallOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::Bind(_)));
}

// =============================================================================
// Exclusivity
// =============================================================================

#[tokio::test]
async fn test_shared_key_serializes_calls() {
    let (engine, bridge) = setup_default();
    let req = post_json(json!({}));
    let (a, b, c) = tokio::join!(
        bridge.execute("Slow", &req, CallOptions::new().exclusive("ledger")),
        bridge.execute("Slow", &req, CallOptions::new().exclusive("ledger")),
        bridge.execute("Slow", &req, CallOptions::new().exclusive("ledger")),
    );
    for result in [a, b, c] {
        assert_eq!(result.unwrap().status, StatusCode::OK);
    }
    assert_eq!(engine.executions(), 3);
    assert_eq!(engine.peak_concurrency(), 1);
}

#[tokio::test]
async fn test_distinct_keys_run_concurrently() {
    let (engine, bridge) = setup_default();
    let req = post_json(json!({}));

    let (a, b) = tokio::join!(
        bridge.execute("Slow", &req, CallOptions::new().exclusive("one")),
        bridge.execute("Slow", &req, CallOptions::new().exclusive("two")),
    );
    assert!(a.is_ok() && b.is_ok());
    assert_eq!(engine.peak_concurrency(), 2);
}

// =============================================================================
// Configuration
// =============================================================================

#[tokio::test]
async fn test_bridge_from_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(br#"{"connection": {"connection_string": "Server=memory", "command_timeout_secs": 30}, "diagnostics": true}"#)
        .unwrap();

    let config = BridgeConfig::load(file.path()).unwrap();
    let (_, bridge) = setup(config);
    assert!(bridge.config().diagnostics);
    assert_eq!(bridge.invoker().timeout(), Duration::from_secs(30));
    assert_eq!(bridge.body_limit().0, 4 * 1024 * 1024);
}
