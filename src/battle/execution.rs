//! Battle execution loop
//!
//! Each round: sort both rosters by attack -> left half-round -> right
//! half-round -> liveness check. The battle is decided once a roster has no
//! living units.

use serde::{Deserialize, Serialize};

use crate::battle::log::{AttackLog, BattleEventLog, NoPacing, Pacer};
use crate::battle::units::{Battlefield, Side};
use crate::core::error::Result;
use crate::core::types::Round;

/// Battle phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BattlePhase {
    #[default]
    Ongoing, // Both rosters have living units
    Decided, // At least one roster is wiped out
}

/// Battle outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleOutcome {
    LeftVictory,
    RightVictory,
    MutualDestruction,
    /// Round cap reached with both sides standing
    Stalemate,
}

/// Summary returned once the simulation stops
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleReport {
    pub outcome: BattleOutcome,
    pub rounds: Round,
    pub attacks: usize,
    pub left_survivors: usize,
    pub right_survivors: usize,
    pub left_health: i64,
    pub right_health: i64,
}

/// Outcome if the battle is over, `None` while both sides fight on
pub fn check_battle_end(field: &Battlefield) -> Option<BattleOutcome> {
    match (field.left.has_alive_units(), field.right.has_alive_units()) {
        (true, true) => None,
        (true, false) => Some(BattleOutcome::LeftVictory),
        (false, true) => Some(BattleOutcome::RightVictory),
        (false, false) => Some(BattleOutcome::MutualDestruction),
    }
}

/// Round-by-round simulation of one battle
pub struct Battle<L: AttackLog = BattleEventLog, P: Pacer = NoPacing> {
    field: Battlefield,
    log: L,
    pacer: P,
    round: Round,
    phase: BattlePhase,
    max_rounds: Option<Round>,
    attacks: usize,
}

impl Battle {
    /// Battle that records attacks in memory and never pauses
    pub fn new(field: Battlefield) -> Self {
        Self::with_collaborators(field, BattleEventLog::new(), NoPacing)
    }
}

impl<L: AttackLog, P: Pacer> Battle<L, P> {
    pub fn with_collaborators(field: Battlefield, log: L, pacer: P) -> Self {
        let phase = if check_battle_end(&field).is_some() {
            BattlePhase::Decided
        } else {
            BattlePhase::Ongoing
        };
        Self {
            field,
            log,
            pacer,
            round: 0,
            phase,
            max_rounds: None,
            attacks: 0,
        }
    }

    /// Stop as a stalemate after this many rounds
    pub fn with_max_rounds(mut self, max_rounds: Option<Round>) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn field(&self) -> &Battlefield {
        &self.field
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    pub fn round(&self) -> Round {
        self.round
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn is_decided(&self) -> bool {
        matches!(self.phase, BattlePhase::Decided)
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        check_battle_end(&self.field)
    }

    pub fn into_parts(self) -> (Battlefield, L) {
        (self.field, self.log)
    }

    /// Run rounds until one side is wiped out or the round cap is hit.
    ///
    /// Fails only when the pacer is interrupted; the round in progress is
    /// abandoned.
    pub fn simulate(&mut self) -> Result<BattleReport> {
        tracing::info!(
            "Battle started: {} left units vs {} right units",
            self.field.left.alive_count(),
            self.field.right.alive_count()
        );

        while !self.is_decided() {
            if let Some(max_rounds) = self.max_rounds {
                if self.round >= max_rounds {
                    tracing::warn!("Round cap {} reached, ending as stalemate", max_rounds);
                    break;
                }
            }
            self.run_round()?;
        }

        let report = self.report();
        tracing::info!(
            "Battle ended after {} rounds: {:?}",
            report.rounds,
            report.outcome
        );
        Ok(report)
    }

    /// Resolve one full round
    pub fn run_round(&mut self) -> Result<BattlePhase> {
        if self.is_decided() {
            return Ok(self.phase);
        }

        self.round += 1;
        tracing::debug!(
            "Round {}: left health {}, right health {}",
            self.round,
            self.field.left.total_health(),
            self.field.right.total_health()
        );

        // Attack values may change mid-battle, so order is recomputed every round
        self.field.left.sort_by_attack();
        self.field.right.sort_by_attack();

        self.run_half_round(Side::Left)?;
        self.run_half_round(Side::Right)?;

        if check_battle_end(&self.field).is_some() {
            self.phase = BattlePhase::Decided;
        }
        Ok(self.phase)
    }

    /// Every living unit of `side` attacks once, in roster order.
    ///
    /// Dead units are pruned when their turn comes up, and an attacker that
    /// dies during its own attack is pruned before the next one acts.
    fn run_half_round(&mut self, side: Side) -> Result<()> {
        let mut index = 0;

        while index < self.field.roster(side).len() {
            let unit = &self.field.roster(side).units[index];
            if !unit.is_alive() {
                let removed = self.field.roster_mut(side).units.remove(index);
                tracing::debug!("{} ({}) removed before acting", removed.name, removed.id);
                continue;
            }

            let attacker = unit.id;
            let policy = unit.policy();

            if let Some(target) = policy.attack(attacker, &mut self.field) {
                if let (Some(a), Some(t)) = (self.field.unit(attacker), self.field.unit(target)) {
                    self.log.log_attack(self.round, a, t);
                    self.attacks += 1;
                }
                self.pacer.pause()?;
            }

            // Locate the attacker again by id in case the policy touched the roster
            let roster = self.field.roster_mut(side);
            match roster.units.iter().position(|u| u.id == attacker) {
                Some(pos) if !roster.units[pos].is_alive() => {
                    let removed = roster.units.remove(pos);
                    tracing::debug!("{} ({}) died while attacking", removed.name, removed.id);
                    index = pos;
                }
                Some(pos) => index = pos + 1,
                None => {}
            }
        }
        Ok(())
    }

    /// Snapshot of the current result
    pub fn report(&self) -> BattleReport {
        BattleReport {
            outcome: self.outcome().unwrap_or(BattleOutcome::Stalemate),
            rounds: self.round,
            attacks: self.attacks,
            left_survivors: self.field.left.alive_count(),
            right_survivors: self.field.right.alive_count(),
            left_health: self.field.left.total_health(),
            right_health: self.field.right.total_health(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::grid::{Cell, Grid};
    use crate::battle::policy::{resolve_strike, AttackPolicy};
    use crate::battle::units::{Roster, Unit};
    use crate::core::error::BattleError;
    use crate::core::types::UnitId;
    use std::sync::Arc;

    fn unit(name: &str, health: i32, attack: i32, x: i32, y: i32) -> Unit {
        Unit::new(name, health, attack, Cell::new(x, y))
    }

    fn duel(p: Unit, q: Unit) -> Battle {
        Battle::new(Battlefield::new(
            Grid::new(5, 1),
            Roster::new(vec![p]),
            Roster::new(vec![q]),
        ))
    }

    /// Strikes the first living enemy, then takes a fixed amount of damage itself
    #[derive(Debug)]
    struct RecoilPolicy {
        recoil: i32,
    }

    impl AttackPolicy for RecoilPolicy {
        fn attack(&self, attacker: UnitId, field: &mut Battlefield) -> Option<UnitId> {
            let side = field.side_of(attacker)?;
            let target = field.roster(side.opposite()).alive_units().next()?.id;
            resolve_strike(field, attacker, target)?;
            if let Some(unit) = field.unit_mut(attacker) {
                unit.take_damage(self.recoil);
            }
            Some(target)
        }
    }

    /// Never acts
    #[derive(Debug)]
    struct IdlePolicy;

    impl AttackPolicy for IdlePolicy {
        fn attack(&self, _attacker: UnitId, _field: &mut Battlefield) -> Option<UnitId> {
            None
        }
    }

    /// Pacer that fails on its nth pause
    struct FailingPacer {
        remaining: usize,
    }

    impl Pacer for FailingPacer {
        fn pause(&mut self) -> Result<()> {
            if self.remaining == 0 {
                return Err(BattleError::Interrupted);
            }
            self.remaining -= 1;
            Ok(())
        }
    }

    #[test]
    fn test_first_round_of_duel() {
        let p = unit("P", 10, 5, 0, 0);
        let q = unit("Q", 10, 3, 4, 0);
        let (pid, qid) = (p.id, q.id);
        let mut battle = duel(p, q);

        assert_eq!(battle.run_round().unwrap(), BattlePhase::Ongoing);

        assert_eq!(battle.field().unit(qid).map(|u| u.health), Some(5));
        assert_eq!(battle.field().unit(pid).map(|u| u.health), Some(7));
        let events = &battle.log().events;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].attacker, pid);
        assert_eq!(events[1].attacker, qid);
    }

    #[test]
    fn test_duel_runs_to_completion() {
        let p = unit("P", 10, 5, 0, 0);
        let q = unit("Q", 10, 3, 4, 0);
        let mut battle = duel(p, q);

        let report = battle.simulate().unwrap();

        assert_eq!(report.outcome, BattleOutcome::LeftVictory);
        assert_eq!(report.rounds, 2);
        assert_eq!(report.left_survivors, 1);
        assert_eq!(report.right_survivors, 0);
        // P takes one hit of 3; Q dies in round 2 before striking back
        assert_eq!(report.left_health, 7);
        assert_eq!(report.attacks, 3);
        assert!(battle.is_decided());
    }

    #[test]
    fn test_empty_roster_is_decided_immediately() {
        let mut battle = Battle::new(Battlefield::new(
            Grid::new(5, 1),
            Roster::new(vec![unit("P", 10, 5, 0, 0)]),
            Roster::default(),
        ));

        assert!(battle.is_decided());
        let report = battle.simulate().unwrap();
        assert_eq!(report.outcome, BattleOutcome::LeftVictory);
        assert_eq!(report.rounds, 0);
        assert!(battle.log().is_empty());
        assert_eq!(battle.run_round().unwrap(), BattlePhase::Decided);
    }

    #[test]
    fn test_act_order_follows_attack_then_roster_order() {
        let weak = unit("Weak", 50, 1, 0, 0);
        let strong = unit("Strong", 50, 9, 0, 1);
        let tied = unit("Tied", 50, 1, 0, 2);
        let enemy = unit("Enemy", 500, 1, 4, 1).with_policy(Arc::new(IdlePolicy));
        let order = vec![strong.id, weak.id, tied.id];
        let mut battle = Battle::new(Battlefield::new(
            Grid::new(5, 3),
            Roster::new(vec![weak, strong, tied]),
            Roster::new(vec![enemy]),
        ));

        battle.run_round().unwrap();

        let attackers: Vec<UnitId> = battle.log().events.iter().map(|e| e.attacker).collect();
        assert_eq!(attackers, order);
    }

    #[test]
    fn test_attacker_killed_by_recoil_is_pruned() {
        let berserker = unit("Berserker", 3, 2, 0, 0).with_policy(Arc::new(RecoilPolicy { recoil: 5 }));
        let follower = unit("Follower", 10, 1, 0, 1);
        let enemy = unit("Enemy", 100, 1, 4, 0).with_policy(Arc::new(IdlePolicy));
        let (berserker_id, follower_id) = (berserker.id, follower.id);
        let mut battle = Battle::new(Battlefield::new(
            Grid::new(5, 2),
            Roster::new(vec![berserker, follower]),
            Roster::new(vec![enemy]),
        ));

        battle.run_round().unwrap();

        // Berserker struck, died from recoil and was pruned; the follower still acted
        assert!(!battle.field().left.contains(berserker_id));
        let attackers: Vec<UnitId> = battle.log().events.iter().map(|e| e.attacker).collect();
        assert_eq!(attackers, vec![berserker_id, follower_id]);
    }

    #[test]
    fn test_dead_target_not_struck_again_in_same_half_round() {
        let first = unit("First", 10, 5, 0, 0);
        let second = unit("Second", 10, 4, 0, 1);
        let victim = unit("Victim", 5, 1, 4, 0);
        let victim_id = victim.id;
        let mut battle = Battle::new(Battlefield::new(
            Grid::new(5, 2),
            Roster::new(vec![first, second]),
            Roster::new(vec![victim]),
        ));

        battle.run_round().unwrap();

        // Targets are re-selected per attacker: the corpse is no longer exposed
        let hits_on_victim = battle
            .log()
            .events
            .iter()
            .filter(|e| e.target == victim_id)
            .count();
        assert_eq!(hits_on_victim, 1);
        assert_eq!(battle.log().len(), 1);
        assert!(battle.is_decided());
        assert_eq!(battle.outcome(), Some(BattleOutcome::LeftVictory));
    }

    #[test]
    fn test_dead_units_pruned_on_their_turn() {
        let p = unit("P", 10, 20, 0, 0);
        let q = unit("Q", 10, 3, 4, 0);
        let qid = q.id;
        let mut battle = duel(p, q);

        battle.run_round().unwrap();

        assert!(!battle.field().right.contains(qid));
        assert_eq!(battle.log().len(), 1);
    }

    #[test]
    fn test_mutual_destruction() {
        let a = unit("A", 5, 5, 0, 0).with_policy(Arc::new(RecoilPolicy { recoil: 5 }));
        let b = unit("B", 5, 1, 4, 0).with_policy(Arc::new(IdlePolicy));
        let mut battle = duel(a, b);

        let report = battle.simulate().unwrap();
        assert_eq!(report.outcome, BattleOutcome::MutualDestruction);
        assert_eq!(report.left_survivors, 0);
        assert_eq!(report.right_survivors, 0);
    }

    #[test]
    fn test_report_health_of_huge_units() {
        let field = Battlefield::new(
            Grid::new(5, 2),
            Roster::new(vec![unit("P", 2_000_000_000, 1, 0, 0), unit("R", 2_000_000_000, 1, 0, 1)]),
            Roster::new(vec![unit("Q", 1, 1, 4, 0)]),
        );
        let mut battle = Battle::new(field);

        let report = battle.simulate().unwrap();
        assert_eq!(report.outcome, BattleOutcome::LeftVictory);
        assert_eq!(report.left_health, 4_000_000_000);
    }

    #[test]
    fn test_round_cap_gives_stalemate() {
        let a = unit("A", 5, 5, 0, 0).with_policy(Arc::new(IdlePolicy));
        let b = unit("B", 5, 1, 4, 0).with_policy(Arc::new(IdlePolicy));
        let mut battle = duel(a, b).with_max_rounds(Some(3));

        let report = battle.simulate().unwrap();
        assert_eq!(report.outcome, BattleOutcome::Stalemate);
        assert_eq!(report.rounds, 3);
        assert_eq!(battle.phase(), BattlePhase::Ongoing);
    }

    #[test]
    fn test_interrupted_pacing_aborts() {
        let field = Battlefield::new(
            Grid::new(5, 1),
            Roster::new(vec![unit("P", 100, 5, 0, 0)]),
            Roster::new(vec![unit("Q", 100, 3, 4, 0)]),
        );
        let mut battle =
            Battle::with_collaborators(field, BattleEventLog::new(), FailingPacer { remaining: 3 });

        let err = battle.simulate().unwrap_err();
        assert!(matches!(err, BattleError::Interrupted));
        assert_eq!(battle.log().len(), 4);
        assert_eq!(battle.round(), 2);
        assert!(!battle.is_decided());
    }
}
