/// Data layer: locating inputs, parsing curve columns, unit conversion.
///
/// Architecture:
/// ```text
///  ./data  or  ../data
///        │
///        ▼
///   ┌──────────┐
///   │  paths   │  resolve data dir / named files
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  .txt / .csv / .json / .parquet → MassLimit
///   └──────────┘
///        │            Curve.xystring
///        ▼                 │
///   ┌──────────┐           │
///   │  parse   │ ◄─────────┘  tokenize + unit rescale
///   └──────────┘
///        │
///        ▼
///    MassLimit  (mass, limit)
/// ```

pub mod loader;
pub mod model;
pub mod parse;
pub mod paths;
