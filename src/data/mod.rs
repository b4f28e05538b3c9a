/// Data layer: core types, loading, and the comparison pipeline.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → ExpressionDataset
///   └──────────┘
///        │
///        ▼
///   ┌───────────────────┐
///   │ ExpressionDataset  │  Vec<Probe>, symbol/probe indices
///   └───────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ compare   │  resolve symbol → extract row → group → t-test
///   └──────────┘
/// ```

pub mod compare;
pub mod loader;
pub mod model;
