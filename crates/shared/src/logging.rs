use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::Arc;
use tracing::{Event, Subscriber};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, time::UtcTime},
    layer::SubscriberExt,
    registry::LookupSpan,
    Layer, Registry,
};
use uuid::Uuid;

/// Structured log line shipped to the JSON sink for downstream log collectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredLog {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub level: String,
    pub service: String,
    pub target: String,
    pub message: String,
    pub correlation_id: Option<String>,
    pub span_id: Option<String>,
    pub fields: serde_json::Value,
}

/// Appends structured log lines to a local file so an external shipper can
/// tail it. Path is configurable per binary instead of the teacher's fixed
/// `/tmp/rust-services.log`, since agent and server run on different hosts.
pub struct JsonFileWriter {
    file: std::sync::Mutex<std::fs::File>,
}

impl JsonFileWriter {
    pub fn new(path: &str) -> Result<Self> {
        let file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            file: std::sync::Mutex::new(file),
        })
    }
}

impl Write for JsonFileWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut file = self.file.lock().unwrap();
        file.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let mut file = self.file.lock().unwrap();
        file.flush()
    }
}

/// `tracing_subscriber::Layer` that renders each event as a [`StructuredLog`]
/// and appends it to the JSON sink file.
pub struct JsonFileLayer {
    writer: Arc<JsonFileWriter>,
    service_name: String,
}

impl JsonFileLayer {
    pub fn new(service_name: impl Into<String>, path: &str) -> Result<Self> {
        Ok(Self {
            writer: Arc::new(JsonFileWriter::new(path)?),
            service_name: service_name.into(),
        })
    }
}

impl<S> Layer<S> for JsonFileLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let metadata = event.metadata();
        let span_id = ctx.current_span().id().map(|id| id.into_u64().to_string());

        let mut fields = serde_json::Map::new();
        event.record(&mut JsonVisitor(&mut fields));

        let log_entry = StructuredLog {
            timestamp: chrono::Utc::now(),
            level: metadata.level().to_string(),
            service: self.service_name.clone(),
            target: metadata.target().to_string(),
            message: fields.get("message").and_then(|v| v.as_str()).unwrap_or("").to_string(),
            correlation_id: fields.get("correlation_id").and_then(|v| v.as_str()).map(String::from),
            span_id,
            fields: serde_json::Value::Object(fields),
        };

        if let Ok(json) = serde_json::to_string(&log_entry) {
            let mut writer = self.writer.file.lock().unwrap();
            let _ = writeln!(writer, "{}", json);
            let _ = writer.flush();
        }
    }
}

struct JsonVisitor<'a>(&'a mut serde_json::Map<String, serde_json::Value>);

impl<'a> tracing::field::Visit for JsonVisitor<'a> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), serde_json::Value::String(format!("{:?}", value)));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), serde_json::Value::String(value.to_string()));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.insert(field.name().to_string(), serde_json::Value::Number(value.into()));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.insert(field.name().to_string(), serde_json::Value::Number(value.into()));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.insert(field.name().to_string(), serde_json::Value::Bool(value));
    }
}

/// Installs console + optional JSON-file logging for a binary. `sink_path`
/// of `None` skips the file layer entirely (the common case during local
/// development; set `PULSEGUARD_*_LOG_FILE` to enable it).
pub fn init_unified_logging(service_name: impl Into<String>, sink_path: Option<&str>) -> Result<()> {
    let service_name = service_name.into();

    let console_layer = fmt::layer()
        .with_timer(UtcTime::rfc_3339())
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true);

    let filter = tracing_subscriber::EnvFilter::from_default_env();

    match sink_path {
        Some(path) => {
            let file_layer = JsonFileLayer::new(service_name, path)?;
            let subscriber = Registry::default().with(console_layer).with(file_layer).with(filter);
            tracing::subscriber::set_global_default(subscriber)
                .expect("failed to set tracing subscriber");
        }
        None => {
            let subscriber = Registry::default().with(console_layer).with(filter);
            tracing::subscriber::set_global_default(subscriber)
                .expect("failed to set tracing subscriber");
        }
    }

    Ok(())
}

/// Request-correlation-id middleware: reads `x-correlation-id` from the
/// request, generates one if absent, stashes it in request extensions, and
/// echoes it back on the response.
pub mod correlation {
    use super::*;
    use actix_web::{
        dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
        Error, HttpMessage,
    };
    use futures::future::LocalBoxFuture;
    use std::future::{ready, Ready};

    pub struct CorrelationId;

    impl<S, B> Transform<S, ServiceRequest> for CorrelationId
    where
        S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
        S::Future: 'static,
        B: 'static,
    {
        type Response = ServiceResponse<B>;
        type Error = Error;
        type InitError = ();
        type Transform = CorrelationIdMiddleware<S>;
        type Future = Ready<Result<Self::Transform, Self::InitError>>;

        fn new_transform(&self, service: S) -> Self::Future {
            ready(Ok(CorrelationIdMiddleware { service }))
        }
    }

    pub struct CorrelationIdMiddleware<S> {
        service: S,
    }

    impl<S, B> Service<ServiceRequest> for CorrelationIdMiddleware<S>
    where
        S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
        S::Future: 'static,
        B: 'static,
    {
        type Response = ServiceResponse<B>;
        type Error = Error;
        type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

        forward_ready!(service);

        fn call(&self, req: ServiceRequest) -> Self::Future {
            let correlation_id = req
                .headers()
                .get("x-correlation-id")
                .and_then(|h| h.to_str().ok())
                .map(String::from)
                .unwrap_or_else(|| Uuid::new_v4().to_string());

            req.extensions_mut().insert(correlation_id.clone());

            let fut = self.service.call(req);

            Box::pin(async move {
                let mut res = fut.await?;
                res.headers_mut().insert(
                    actix_web::http::header::HeaderName::from_static("x-correlation-id"),
                    actix_web::http::header::HeaderValue::from_str(&correlation_id).unwrap(),
                );
                Ok(res)
            })
        }
    }
}
