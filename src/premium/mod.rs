//! Premium listing upgrades: verification-gated paid boosts

pub mod model;
pub mod service;

pub use model::{UpgradeRequest, UpgradeResponse};
pub use service::PremiumService;
