pub mod matcher;

pub use matcher::{Counterparty, SanctionsMatcher, SanctionsOutcome};
