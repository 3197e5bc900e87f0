//! # roofgeo
//!
//! Mesure et classement de toitures à partir d'empreintes de bâtiments OSM.
//!
//! ## Features
//!
//! - Projection WGS84 → plan métrique en Rust pur (LV95 pour la Suisse, UTM ailleurs)
//! - Surface, périmètre et compacité via les types `geo`
//! - Score heuristique pondéré (surface normalisée + compacité)
//! - Classement déterministe, mesure parallèle avec `rayon`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use roofgeo::{pipeline, Projection, RankParams};
//!
//! let projection = Projection::for_region(9.6397, 47.4319)?;
//! let (ranking, skipped) = pipeline::run(&buildings, &projection, &RankParams::default());
//! for b in &ranking.ranked {
//!     println!("{} {:.1} m² score={:.3}", b.id(), b.area_m2(), b.score());
//! }
//! ```

pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod project;
pub mod ring;
pub mod score;
pub mod types;

pub use error::GeometryError;
pub use pipeline::{Measurement, RankParams, Ranking, Skipped};
pub use project::Projection;
pub use score::{AreaNormalizer, AreaScale, ScoreWeights};
pub use types::{Building, BuildingId, Category, ElementKind, MeasuredBuilding, ScoredBuilding};
