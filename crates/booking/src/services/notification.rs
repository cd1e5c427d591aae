//! Notification service trait and in-memory implementation.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use crate::error::{BookingError, Result};
use crate::events::BookingEvent;

/// Trait for dispatching booking events to customers and staff.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &BookingEvent) -> Result<()>;
}

#[derive(Debug, Default)]
struct InMemoryNotifierState {
    sent: Vec<BookingEvent>,
    fail_on_notify: bool,
}

/// Records every event instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotifier {
    state: Arc<RwLock<InMemoryNotifierState>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the notifier to fail on subsequent calls.
    pub fn set_fail_on_notify(&self, fail: bool) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .fail_on_notify = fail;
    }

    /// Events delivered so far, oldest first.
    pub fn sent(&self) -> Vec<BookingEvent> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .sent
            .clone()
    }

    /// Event type names delivered so far.
    pub fn sent_types(&self) -> Vec<&'static str> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .sent
            .iter()
            .map(BookingEvent::event_type)
            .collect()
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn notify(&self, event: &BookingEvent) -> Result<()> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.fail_on_notify {
            return Err(BookingError::Collaborator {
                service: "notification",
                reason: "SMS gateway unavailable".to_string(),
            });
        }
        state.sent.push(event.clone());
        Ok(())
    }
}
