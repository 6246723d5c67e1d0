//! Observability sink for absorbed failures.
//!
//! The dispatch primitive reports every failure it swallows as one [`Event`].
//! [`EventSink::record`] returns nothing, so a sink cannot turn a degraded
//! call into a failed one.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::{error, warn};
use wikiquery::{Action, Query};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// Which call an event is about.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EventContext {
    pub action: Action,
    pub query: Query,
    pub endpoint: String,
    pub attempts: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Event {
    pub message: String,
    pub severity: Severity,
    pub context: Option<EventContext>,
}

/// Records events out of band.
pub trait EventSink: Send + Sync + 'static {
    fn record(&self, event: Event);
}

/// Forwards events to `tracing` at the matching level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: Event) {
        let Event {
            message,
            severity,
            context,
        } = event;
        let (action, endpoint, query, attempts) = match &context {
            Some(ctx) => (
                ctx.action.to_string(),
                ctx.endpoint.clone(),
                serde_json::to_string(&ctx.query).unwrap_or_default(),
                ctx.attempts,
            ),
            None => Default::default(),
        };
        match severity {
            Severity::Error => error!(%action, %endpoint, %query, attempts, "{message}"),
            Severity::Warning => warn!(%action, %endpoint, %query, attempts, "{message}"),
        }
    }
}

/// Keeps every event in memory. For tests and for callers that want to
/// inspect what a batch of calls absorbed.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Event>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for RecordingSink {
    fn record(&self, event: Event) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(severity: Severity) -> Event {
        Event {
            message: "query failed".into(),
            severity,
            context: Some(EventContext {
                action: Action::Query,
                query: Query::new().with("list", "users"),
                endpoint: "https://example.org/w/api.php".into(),
                attempts: 1,
            }),
        }
    }

    #[test]
    fn recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        assert!(sink.is_empty());
        sink.record(event(Severity::Error));
        sink.record(event(Severity::Warning));
        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].severity, Severity::Error);
        assert_eq!(events[1].severity, Severity::Warning);
    }

    #[test]
    fn tracing_sink_accepts_events_without_context() {
        TracingSink.record(Event {
            message: "no context".into(),
            severity: Severity::Error,
            context: None,
        });
        TracingSink.record(event(Severity::Warning));
    }

    #[test]
    fn severity_serialises_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::Warning).unwrap(), r#""warning""#);
    }
}
