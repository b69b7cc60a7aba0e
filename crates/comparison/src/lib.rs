//! # BankIQ Comparison Crate
//!
//! The orchestration layer. It turns the user's selection of banks and
//! indicators into backend queries, runs them concurrently through a shared
//! query cache, and assembles the answers into a bank-by-indicator matrix.
//!
//! ## Public API
//!
//! - `IndicatorOrchestrator`: Form 101 comparisons over a month range.
//! - `FormOrchestrator`: fixed-schema forms (123, 810) for a single month.
//! - `QueryCache`: keyed, time-bounded memoization with in-flight dedup.
//! - `ComparisonSession`: the persisted selection and its month-range rules.
//! - `dates`: month tokens to query boundaries.

pub mod cache;
pub mod dates;
pub mod error;
pub mod forms;
pub mod indicators;
pub mod matrix;
pub mod session;

// Re-export key types for a clean public API.
pub use cache::{FetchError, QueryCache, QueryKey};
pub use error::ComparisonError;
pub use forms::{FormColumn, FormOrchestrator};
pub use indicators::IndicatorOrchestrator;
pub use matrix::{Cell, ResultMatrix};
pub use session::{ComparisonSession, EffectiveRange, DEFAULT_BANK_REGS};
