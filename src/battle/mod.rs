//! Battle system - round-based combat between two rosters on a grid
//!
//! Targeting decides which enemies are exposed, pathfinding decides whether
//! an attacker can reach them, and the execution loop decides who acts when.

pub mod constants;
pub mod execution;
pub mod grid;
pub mod log;
pub mod pathfinding;
pub mod policy;
pub mod preset;
pub mod targeting;
pub mod units;

// Re-exports for convenient access
pub use constants::*;
pub use execution::{check_battle_end, Battle, BattleOutcome, BattlePhase, BattleReport};
pub use grid::{Cell, Grid, OccupancySet};
pub use log::{
    AttackEvent, AttackLog, BattleEventLog, NoPacing, Pacer, SleepPacer, TracingAttackLog,
};
pub use pathfinding::{find_path, find_path_between, path_steps};
pub use policy::{
    choose_melee_target, choose_ranged_target, resolve_strike, strike_damage, AttackPolicy,
    MeleePolicy, RangedPolicy,
};
pub use preset::{deploy, generate_preset};
pub use targeting::{exposed_targets, suitable_targets};
pub use units::{AttackType, Battlefield, Roster, Side, Unit, UnitTemplate};
