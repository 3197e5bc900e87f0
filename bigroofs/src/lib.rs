//! # bigroofs
//!
//! Recherche des grandes toitures autour d'un point à partir d'OpenStreetMap.
//!
//! ## Features
//!
//! - Récupération des bâtiments via l'API Overpass (plusieurs endpoints)
//! - Surface, compacité et score calculés par `roofgeo`
//! - Export CSV, GeoJSON et page HTML autonome, publiés ensemble ou pas du tout
//! - Rapport d'exécution avec empreinte du classement
//!
//! ## Usage CLI
//!
//! ```bash
//! # Au SG, 10 km, bâtiments de plus de 100 m²
//! bigroofs
//!
//! # Autre centre, zones commerciales uniquement
//! bigroofs --lat 46.948 --lon 7.447 --radius-km 5 --config au-sg-commercial
//!
//! # Reconstruire la page depuis un GeoJSON exporté
//! bigroofs render --geojson out/au_sg_big_roofs.geojson --output roofs.html
//! ```

pub mod config;
pub mod export;
pub mod fetch;
pub mod report;
pub mod run;

pub use config::Config;
pub use export::OutputFormat;
pub use fetch::{BuildingSource, FetchError, OverpassClient, SearchArea};
pub use report::{RunReport, RunStatus};
pub use run::{execute, RunOptions};
