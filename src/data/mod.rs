//! Data layer: core types, loading, time conversion and export.
//!
//! Architecture:
//! ```text
//!  .txt (one frequency per line)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → FrequencyDataset
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │   mjd     │  normalize scale, attach time axis, datetime ⇄ MJD
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  export   │  CSV / text table (DataPoint, Frequency, time)
//!   └──────────┘
//! ```

pub mod error;
pub mod export;
pub mod loader;
pub mod mjd;
pub mod model;
