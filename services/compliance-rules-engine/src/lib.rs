//! Transaction compliance engine.
//!
//! Every transaction passes amount-threshold rules, a sanctions check and an
//! optional external fraud scorer. The contributions are normalized into one
//! score, mapped to approve / review / reject, and written to an audit log.

pub mod config;
pub mod database;
pub mod errors;
pub mod fraud;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod rules;
pub mod sanctions;
pub mod scoring;
pub mod service;
pub mod store;

pub use errors::{ComplianceError, ComplianceResult};
pub use service::{ComplianceService, PipelineConfig};
