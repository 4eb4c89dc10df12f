// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Topic-keyed event bus for job output.
//!
//! Topics are command names (`create`, `delete`, `configure`). Each topic
//! has at most one live subscriber holding a bounded receiver. Publishing
//! never waits: a full subscriber misses the event, a closed one is pruned.

use parking_lot::Mutex;
use prov_core::{CommandId, LogLine, ProvisionCommand};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Errors from bus subscriptions
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BusError {
    #[error("topic {0:?} already has a subscriber")]
    AlreadySubscribed(String),
    #[error("{0} does not stream output")]
    NotStreaming(String),
}

/// Something a job published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    /// One output line, as written to the job log
    Line(LogLine),
    /// The tool exited; sent once per invocation after its last line
    Finished {
        job: String,
        command: ProvisionCommand,
        command_id: CommandId,
        success: bool,
    },
}

/// Owned by the orchestrator and cloned into every job driver.
#[derive(Clone)]
pub struct EventBus {
    topics: Arc<Mutex<HashMap<String, mpsc::Sender<BusEvent>>>>,
    capacity: usize,
}

/// Receiving side of one topic.
pub struct Subscription {
    rx: mpsc::Receiver<BusEvent>,
}

impl Subscription {
    /// Next event, or `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<BusEvent> {
        self.rx.recv().await
    }
}

impl EventBus {
    /// Create a bus whose subscribers buffer up to `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: Arc::new(Mutex::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Subscribe to `topic`. Fails while another subscriber is alive.
    pub fn subscribe(&self, topic: &str) -> Result<Subscription, BusError> {
        let mut topics = self.topics.lock();
        if topics.get(topic).is_some_and(|tx| !tx.is_closed()) {
            return Err(BusError::AlreadySubscribed(topic.to_string()));
        }
        let (tx, rx) = mpsc::channel(self.capacity);
        topics.insert(topic.to_string(), tx);
        Ok(Subscription { rx })
    }

    /// Deliver `event` to the topic's subscriber, if any.
    ///
    /// Returns whether the event was delivered.
    pub fn publish(&self, topic: &str, event: BusEvent) -> bool {
        let mut topics = self.topics.lock();
        let Some(tx) = topics.get(topic) else {
            return false;
        };
        match tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::debug!(topic, "subscriber lagging, event dropped");
                false
            }
            Err(TrySendError::Closed(_)) => {
                topics.remove(topic);
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "event_bus_tests.rs"]
mod tests;
