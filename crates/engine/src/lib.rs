// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Provisioning job engine

pub mod config;
mod driver;
pub mod env;
mod error;
mod event_bus;
mod orchestrator;

pub use config::{ConfigError, EngineConfig};
pub use driver::JobOutcome;
pub use error::EngineError;
pub use event_bus::{BusError, BusEvent, EventBus, Subscription};
pub use orchestrator::{Accepted, ProvisionOrchestrator, REQUEST_FILE_NAME};
