//! Domain rules for the registry, the ledger and the dashboard.
//!
//! Handlers hand raw payloads to these functions; everything that can be
//! rejected is rejected here before the store is asked to write.

pub mod dashboard;
pub mod ledger;
pub mod registry;
pub mod validation;
