/// Data layer: passenger types, loading, caching, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → cells → Passenger (+ Title, Family Size, Survival)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ DatasetCache  │  load once, share Arc<Dataset>
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterSelection → View (row indices)
///   └──────────┘
///        │
///        ▼
///   ┌───────────────────┐
///   │ summary / charts   │  KPIs, correlation matrix, chart aggregates
///   └───────────────────┘
/// ```

pub mod cache;
pub mod charts;
pub mod filter;
pub mod loader;
pub mod model;
pub mod summary;
