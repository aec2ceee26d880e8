//! Catalog model, matching and costing logic, and the chat client.

pub mod catalog;
pub mod completion;
pub mod filter;
pub mod http;
pub mod logging;
pub mod lookup;
pub mod models;
pub mod pricing;
pub mod ranking;
pub mod refine;
pub mod scoring;
pub mod session;
pub mod wizard;

pub use catalog::{Catalog, CatalogOrigin, Model, Provider};
pub use filter::Requirements;
pub use models::{RankedModel, RobotOutput};
pub use pricing::{CostReport, CostResult, CostScenario};
pub use scoring::ScoringPolicy;
