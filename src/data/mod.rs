/// Data layer: core types and text-format parsing.
///
/// Architecture:
/// ```text
///  band.out (per method)        lcurve.out
///        │                          │
///        ▼                          ▼
///   ┌──────────┐              ┌──────────┐
///   │  phonon   │              │  lcurve   │  parse text → LossTable
///   └──────────┘              └──────────┘
///        │
///        ▼
///   ┌───────────────┐
///   │ MethodDataset  │  Vec<Branch>, high-symmetry points
///   └───────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  tidy q,freq,method,branch CSV
///   └──────────┘
/// ```

pub mod export;
pub mod lcurve;
pub mod model;
pub mod phonon;
