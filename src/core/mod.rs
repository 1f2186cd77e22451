pub mod config;
pub mod error;
pub mod types;

pub use config::{load_scenario, ArmySpec, BattleConfig, GridConfig, Scenario};
pub use error::{BattleError, Result};
pub use types::{Round, UnitId};
