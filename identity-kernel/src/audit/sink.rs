//! # Dual-Sink Audit Logger
//!
//! [`AuditLogger::log`] always writes a structured log line first - so an
//! audit event is guaranteed to exist in logs even if the process later
//! panics, the repository call hangs, or the store is unreachable - then
//! persists through an [`AuditRepository`]. Persistence errors are caught
//! and logged at `warn`, never propagated to the caller (spec §4.7, §9:
//! "audit persistence failure must not cause a business operation to
//! fail").

use std::sync::Arc;

use chrono::Utc;

use crate::audit::event::{AuditEvent, NewAuditEvent};
use crate::context::OperationContext;
use crate::repository::audit_repository::AuditRepository;

/// Case-insensitive key substrings whose values are redacted before a log
/// line is emitted (spec §4.7).
const SENSITIVE_KEY_SUBSTRINGS: &[&str] = &[
    "password",
    "secret",
    "token",
    "key",
    "authorization",
    "hash",
    "credential",
    "private",
    "api_key",
];

/// Replaces the value of any metadata entry whose key matches a sensitive
/// substring (case-insensitive) with `[REDACTED]`. Keys themselves are left
/// intact - only values are ever hidden, so the shape of what was logged
/// remains inspectable.
fn redact_sensitive_metadata(metadata: &std::collections::HashMap<String, String>) -> std::collections::HashMap<String, String> {
    metadata
        .iter()
        .map(|(k, v)| {
            let lower = k.to_lowercase();
            if SENSITIVE_KEY_SUBSTRINGS.iter().any(|s| lower.contains(s)) {
                (k.clone(), "[REDACTED]".to_string())
            } else {
                (k.clone(), v.clone())
            }
        })
        .collect()
}

/// Thin wrapper around `tracing` emitting one structured `info!` line per
/// audit event, with sensitive metadata redacted.
#[derive(Debug, Clone, Default)]
pub struct StructuredLogSink;

impl StructuredLogSink {
    pub fn new() -> Self {
        Self
    }

    pub fn emit(&self, event: &AuditEvent) {
        let redacted = redact_sensitive_metadata(&event.metadata);
        let metadata_json = serde_json::to_string(&redacted).unwrap_or_default();
        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            tenant_id = ?event.tenant_id,
            actor_id = ?event.actor_id,
            actor_name = ?event.actor_name,
            target_id = ?event.target_id,
            target_name = ?event.target_name,
            metadata = %metadata_json,
            "audit event"
        );
    }
}

/// Dual-sink audit logger: a [`StructuredLogSink`] that always fires, and a
/// persistent [`AuditRepository`] whose failures are swallowed.
#[derive(Clone)]
pub struct AuditLogger {
    repository: Arc<dyn AuditRepository>,
    log_sink: StructuredLogSink,
}

impl AuditLogger {
    pub fn new(repository: Arc<dyn AuditRepository>) -> Self {
        Self {
            repository,
            log_sink: StructuredLogSink::new(),
        }
    }

    /// Stamps `id`/`occurred_at`, emits to the log sink, then attempts
    /// persistence. Always returns - this call cannot fail the caller's
    /// business operation.
    pub async fn log(&self, ctx: &OperationContext, new_event: NewAuditEvent) {
        let event = AuditEvent {
            id: kernel_shared::new_id(),
            event_type: new_event
                .event_type
                .expect("NewAuditEvent::new must be used to set event_type"),
            tenant_id: new_event.tenant_id,
            actor_id: new_event.actor_id,
            actor_name: new_event.actor_name,
            resource: new_event.resource,
            target_name: new_event.target_name,
            target_id: new_event.target_id,
            ip_address: new_event.ip_address,
            user_agent: new_event.user_agent,
            metadata: new_event.metadata,
            occurred_at: Utc::now(),
        };

        self.log_sink.emit(&event);

        if let Err(e) = self.repository.log(ctx, event).await {
            tracing::warn!(error = %e, "audit event persistence failed, log entry above is authoritative");
        }
    }
}

impl std::fmt::Debug for AuditLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLogger").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn redaction_hides_sensitive_values_case_insensitively() {
        let mut metadata = HashMap::new();
        metadata.insert("Password".to_string(), "hunter2".to_string());
        metadata.insert("client_SECRET".to_string(), "xyz".to_string());
        metadata.insert("tenant_name".to_string(), "Acme Corp".to_string());

        let redacted = redact_sensitive_metadata(&metadata);
        assert_eq!(redacted["Password"], "[REDACTED]");
        assert_eq!(redacted["client_SECRET"], "[REDACTED]");
        assert_eq!(redacted["tenant_name"], "Acme Corp");
    }
}
