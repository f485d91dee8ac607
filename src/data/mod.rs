/// Data layer: core types, loading, writing and synthesis.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet        seed
///        │                          │
///        ▼                          ▼
///   ┌──────────┐             ┌────────────┐
///   │  loader   │             │ synthetic  │  x ~ N(0,1), y = 2x + N(0,0.5)
///   └──────────┘             └────────────┘
///        │                          │
///        └────────────┬─────────────┘
///                     ▼
///               ┌──────────┐
///               │ Dataset  │  x: Vec<f64>, y: Vec<f64>
///               └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod synthetic;
pub mod writer;
