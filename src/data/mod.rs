//! Data layer: schema, records, loading, and filtering.
//!
//! Architecture:
//! ```text
//!  .csv / .json            schema.json (optional)
//!        │                       │
//!        ▼                       ▼
//!   ┌──────────┐           ┌──────────┐
//!   │  loader   │ ◄──────── │  schema   │  numeric columns, tiers, vocabulary
//!   └──────────┘           └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ Dataset   │  Vec<Record>, column index
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  FilterCriteria predicates → filtered records
//!   └──────────┘
//! ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
