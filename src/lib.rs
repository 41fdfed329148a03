//! Aggregation engine behind the student performance factors dashboard.
//!
//! The presentation layer loads a [`data::model::Dataset`], narrows it with
//! [`data::filter::FilterCriteria`] and asks an [`aggregate::Analyzer`] for
//! the structures each chart renders. Every aggregator is a pure function of
//! its inputs.

pub mod aggregate;
pub mod data;
pub mod state;
pub mod stats;

pub use aggregate::Analyzer;
pub use data::filter::{FilterCriteria, ScoreRange, Selection};
pub use data::model::{Dataset, Record, Value};
pub use data::schema::{ColumnKind, Schema};
pub use state::DashboardState;
