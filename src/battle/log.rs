//! Attack logging and playback pacing
//!
//! The battle loop reports every resolved attack to an [`AttackLog`] and then
//! waits on a [`Pacer`]. Pacing is the only point where a battle blocks.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::battle::units::Unit;
use crate::core::error::{BattleError, Result};
use crate::core::types::{Round, UnitId};

/// Receives one call per resolved attack
pub trait AttackLog {
    fn log_attack(&mut self, round: Round, attacker: &Unit, target: &Unit);
}

impl<L: AttackLog + ?Sized> AttackLog for &mut L {
    fn log_attack(&mut self, round: Round, attacker: &Unit, target: &Unit) {
        (**self).log_attack(round, attacker, target);
    }
}

/// Writes each attack as a tracing event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAttackLog;

impl AttackLog for TracingAttackLog {
    fn log_attack(&mut self, round: Round, attacker: &Unit, target: &Unit) {
        tracing::info!(
            round,
            "{} ({}) attacks {} ({}), {} health left",
            attacker.name,
            attacker.id,
            target.name,
            target.id,
            target.health
        );
    }
}

/// Record of a single attack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackEvent {
    pub round: Round,
    pub attacker: UnitId,
    pub attacker_name: String,
    pub target: UnitId,
    pub target_name: String,
    /// Target health after the strike
    pub target_health: i32,
}

/// Keeps every attack in order
#[derive(Debug, Clone, Default)]
pub struct BattleEventLog {
    pub events: Vec<AttackEvent>,
}

impl BattleEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Attacks made by one unit
    pub fn by_attacker(&self, attacker: UnitId) -> impl Iterator<Item = &AttackEvent> {
        self.events.iter().filter(move |e| e.attacker == attacker)
    }
}

impl AttackLog for BattleEventLog {
    fn log_attack(&mut self, round: Round, attacker: &Unit, target: &Unit) {
        self.events.push(AttackEvent {
            round,
            attacker: attacker.id,
            attacker_name: attacker.name.clone(),
            target: target.id,
            target_name: target.name.clone(),
            target_health: target.health,
        });
    }
}

/// Delay between logged attacks
pub trait Pacer {
    /// Block until the next attack may proceed.
    /// An error aborts the battle.
    fn pause(&mut self) -> Result<()>;
}

/// Never waits
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacing;

impl Pacer for NoPacing {
    fn pause(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Sleeps a fixed delay, optionally cut short by a stop signal
#[derive(Debug)]
pub struct SleepPacer {
    delay: Duration,
    stop: Option<Receiver<()>>,
}

impl SleepPacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, stop: None }
    }

    /// Pacer plus the sender that interrupts it. Sending `()` makes the
    /// current or next pause fail with [`BattleError::Interrupted`].
    pub fn with_stop_signal(delay: Duration) -> (Self, Sender<()>) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                delay,
                stop: Some(rx),
            },
            tx,
        )
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Pacer for SleepPacer {
    fn pause(&mut self) -> Result<()> {
        if let Some(stop) = &self.stop {
            match stop.recv_timeout(self.delay) {
                Ok(()) => return Err(BattleError::Interrupted),
                Err(RecvTimeoutError::Timeout) => return Ok(()),
                // Nobody left to interrupt us, fall back to a plain sleep
                Err(RecvTimeoutError::Disconnected) => {}
            }
        }
        self.stop = None;
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        Ok(())
    }
}
