//! # Procedure Bridge
//!
//! Request flow for one procedure call:
//!
//! 1. open a session from the connector
//! 2. bind the body (POST/PUT only): JSON through the streaming binder, form
//!    bodies flat, anything else is a 415
//! 3. append caller identity, then caller-supplied parameters
//! 4. invoke, holding the exclusivity key if one is given
//! 5. on an engine error, classify it; unrecognized errors are faults

use crate::binder::{bind_form, ParameterBinder, ParameterBinding};
use crate::classifier::{CallContext, ErrorClassifier};
use crate::config::{BridgeConfig, ConfigResult};
use crate::invoker::{InvokeError, ProcedureInvoker};
use crate::observability::{Event, Logger};
use crate::outcome::ClassifiedError;
use crate::schema::SchemaResolver;
use crate::session::SessionConnector;
use crate::token::TokenReader;

use super::errors::{BridgeError, BridgeResult};
use super::identity::CallerIdentity;
use super::request::{BodyLimit, BridgeRequest, ContentKind};
use super::response::JsonResult;

/// Per-call switches
#[derive(Debug, Clone)]
pub struct CallOptions {
    /// Bind parameters from the request body
    pub parse_body: bool,
    /// Pass `UserId`/`SessionId` cookies as parameters
    pub add_identity: bool,
    /// Appended after body and identity parameters
    pub extra_parameters: Vec<ParameterBinding>,
    /// Calls sharing this key never run concurrently
    pub exclusivity: Option<String>,
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            parse_body: true,
            add_identity: true,
            extra_parameters: Vec::new(),
            exclusivity: None,
        }
    }
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_body(mut self) -> Self {
        self.parse_body = false;
        self
    }

    pub fn without_identity(mut self) -> Self {
        self.add_identity = false;
        self
    }

    pub fn with_parameter(mut self, binding: ParameterBinding) -> Self {
        self.extra_parameters.push(binding);
        self
    }

    pub fn exclusive(mut self, key: impl Into<String>) -> Self {
        self.exclusivity = Some(key.into());
        self
    }
}

/// Binds requests to stored procedure calls and answers with their JSON
pub struct ProcedureBridge<C: SessionConnector> {
    config: BridgeConfig,
    connector: C,
    resolver: SchemaResolver,
    invoker: ProcedureInvoker,
    classifier: ErrorClassifier,
}

impl<C: SessionConnector> ProcedureBridge<C> {
    /// Fails when the configuration is invalid
    pub fn new(config: BridgeConfig, connector: C) -> ConfigResult<Self> {
        config.validate()?;

        let timeout = config.connection.command_timeout();
        let secs = config.connection.command_timeout_secs.to_string();
        Logger::event(
            Event::BridgeConfigured,
            &[
                ("command_timeout_secs", secs.as_str()),
                ("diagnostics", if config.diagnostics { "true" } else { "false" }),
            ],
        );

        Ok(Self {
            config,
            connector,
            resolver: SchemaResolver::new(),
            invoker: ProcedureInvoker::new(timeout),
            classifier: ErrorClassifier::new(),
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn resolver(&self) -> &SchemaResolver {
        &self.resolver
    }

    pub fn invoker(&self) -> &ProcedureInvoker {
        &self.invoker
    }

    /// Request extension carrying the configured body limit
    pub fn body_limit(&self) -> BodyLimit {
        BodyLimit(self.config.max_body_bytes)
    }

    /// Run `procedure` for `request`.
    ///
    /// `Ok` carries both successful calls and 4xx rejections; `Err` is a
    /// fault, already logged.
    pub async fn execute(
        &self,
        procedure: &str,
        request: &BridgeRequest,
        options: CallOptions,
    ) -> BridgeResult<JsonResult> {
        let mut session = match self.connector.open().await {
            Ok(session) => session,
            Err(e) => return Err(fault(procedure, e.into())),
        };

        let mut bindings = if options.parse_body && request.has_body() {
            match self.bind_body(&mut session, procedure, request).await {
                Ok(Ok(bindings)) => bindings,
                Ok(Err(rejected)) => return Ok(reject(procedure, rejected)),
                Err(e) => return Err(fault(procedure, e)),
            }
        } else {
            Vec::new()
        };

        if options.add_identity {
            CallerIdentity::from_request(request).inject(&mut bindings);
        }
        bindings.extend(options.extra_parameters);

        let result = self
            .invoker
            .invoke(
                &mut session,
                procedure,
                bindings,
                options.exclusivity.as_deref(),
            )
            .await;

        match result {
            Ok(call) => {
                let status = call.status_code;
                match JsonResult::from_call(call) {
                    Some(response) => {
                        let status = status.to_string();
                        Logger::event(
                            Event::ProcedureCallComplete,
                            &[("procedure", procedure), ("status", status.as_str())],
                        );
                        Ok(response)
                    }
                    None => Err(fault(procedure, BridgeError::InvalidStatus(status))),
                }
            }
            Err(InvokeError::Engine { error, sent_names }) => {
                let context = CallContext {
                    procedure,
                    sent_names: &sent_names,
                };
                match self.classifier.classify(&mut session, &error, &context).await {
                    Ok(Some(classified)) => Ok(reject(procedure, classified)),
                    Ok(None) => Err(fault(procedure, BridgeError::UnrecognizedEngineError(error))),
                    Err(e) => Err(fault(procedure, e.into())),
                }
            }
            Err(e) => Err(fault(procedure, e.into())),
        }
    }

    /// Outer `Err` is a fault, inner `Err` a 4xx to answer with
    async fn bind_body(
        &self,
        session: &mut C::Session,
        procedure: &str,
        request: &BridgeRequest,
    ) -> BridgeResult<Result<Vec<ParameterBinding>, ClassifiedError>> {
        let kind = match request.content_kind() {
            Ok(kind) => kind,
            Err(rejected) => return Ok(Err(rejected)),
        };

        let bound = match kind {
            ContentKind::Json => {
                let mut reader = TokenReader::from_bytes(&request.body);
                ParameterBinder::new(&self.resolver, session, procedure)
                    .bind(&mut reader)
                    .await
            }
            ContentKind::Form => bind_form(&request.body),
        };

        match bound {
            Ok(bindings) => Ok(Ok(bindings)),
            Err(err) => match err.to_classified(self.config.diagnostics) {
                Some(rejected) => Ok(Err(rejected)),
                None => Err(err.into()),
            },
        }
    }
}

fn reject(procedure: &str, rejected: ClassifiedError) -> JsonResult {
    let status = rejected.status.to_string();
    let message = rejected.message().unwrap_or_default();
    Logger::event(
        Event::ProcedureCallRejected,
        &[
            ("message", message.as_str()),
            ("procedure", procedure),
            ("status", status.as_str()),
        ],
    );
    JsonResult::from(rejected)
}

fn fault(procedure: &str, err: BridgeError) -> BridgeError {
    let message = err.to_string();
    Logger::event(
        Event::ProcedureCallFault,
        &[("error", message.as_str()), ("procedure", procedure)],
    );
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};

    use crate::binder::Scalar;
    use crate::config::ConnectionConfig;
    use crate::invoker::{BODY_PARAMETER, STATUS_PARAMETER};
    use crate::session::{MemoryConnector, MemoryEngine, OutputValues, ProcedureDef};

    fn echo() -> ProcedureDef {
        ProcedureDef::new("Echo")
            .optional("Name")
            .optional("UserId")
            .output(STATUS_PARAMETER)
            .output(BODY_PARAMETER)
            .body(|args| {
                let name = args
                    .scalar("Name")
                    .map(|s| s.to_string())
                    .unwrap_or_default();
                Ok(OutputValues::new()
                    .with(STATUS_PARAMETER, Some(Scalar::Integer(200)))
                    .with(
                        BODY_PARAMETER,
                        Some(Scalar::Text(serde_json::json!({ "name": name }).to_string())),
                    ))
            })
    }

    fn bridge() -> (Arc<MemoryEngine>, ProcedureBridge<MemoryConnector>) {
        let engine = Arc::new(MemoryEngine::new());
        engine.register(echo());
        let config = BridgeConfig::new(ConnectionConfig::new("memory"));
        let connector = MemoryConnector::new(&config.connection, engine.clone()).unwrap();
        (engine, ProcedureBridge::new(config, connector).unwrap())
    }

    fn post(content_type: &'static str, body: &'static str) -> BridgeRequest {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        BridgeRequest::new(Method::POST, headers, body)
    }

    #[tokio::test]
    async fn test_json_body_round_trip() {
        let (_, bridge) = bridge();
        let result = bridge
            .execute("Echo", &post("application/json", r#"{"Name":"ada"}"#), CallOptions::new())
            .await
            .unwrap();
        assert_eq!(result.status, StatusCode::OK);
        assert_eq!(result.body.as_deref(), Some(r#"{"name":"ada"}"#));
    }

    #[tokio::test]
    async fn test_get_ignores_body() {
        let (_, bridge) = bridge();
        let request = BridgeRequest::new(Method::GET, HeaderMap::new(), "not json");
        let result = bridge.execute("Echo", &request, CallOptions::new()).await.unwrap();
        assert_eq!(result.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unsupported_content_type_never_runs() {
        let (engine, bridge) = bridge();
        let result = bridge
            .execute("Echo", &post("text/plain", "Name=x"), CallOptions::new())
            .await
            .unwrap();
        assert_eq!(result.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(engine.executions(), 0);
    }

    #[tokio::test]
    async fn test_offline_engine_is_a_fault() {
        let (engine, bridge) = bridge();
        engine.set_offline(true);
        let err = bridge
            .execute("Echo", &post("application/json", "{}"), CallOptions::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Session(_)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let engine = Arc::new(MemoryEngine::new());
        let good = ConnectionConfig::new("memory");
        let connector = MemoryConnector::new(&good, engine).unwrap();
        let config = BridgeConfig::new(ConnectionConfig::new(" "));
        assert!(ProcedureBridge::new(config, connector).is_err());
    }
}
