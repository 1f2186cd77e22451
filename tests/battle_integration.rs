//! Battle system integration tests

use std::sync::Arc;
use std::time::Duration;

use frontline::battle::*;
use frontline::core::{load_scenario, BattleError, Scenario, UnitId};

fn unit(name: &str, health: i32, attack: i32, x: i32, y: i32) -> Unit {
    Unit::new(name, health, attack, Cell::new(x, y))
}

#[test]
fn test_single_unit_duel() {
    let p = unit("P", 10, 5, 0, 10);
    let q = unit("Q", 10, 3, 26, 10);
    let (pid, qid) = (p.id, q.id);
    let field = Battlefield::new(Grid::default(), Roster::new(vec![p]), Roster::new(vec![q]));
    let mut battle = Battle::new(field);

    battle.run_round().expect("round");
    assert_eq!(battle.field().unit(pid).map(|u| u.health), Some(7));
    assert_eq!(battle.field().unit(qid).map(|u| u.health), Some(5));

    let report = battle.simulate().expect("simulate");
    assert!(battle.is_decided());
    assert_eq!(report.outcome, BattleOutcome::LeftVictory);
    assert!(battle.field().right.is_empty() || !battle.field().right.has_alive_units());
    assert!(battle.field().left.has_alive_units());
}

#[test]
fn test_full_battle_from_scenario() {
    let scenario = Scenario::from_toml_str(
        r#"
        [config.grid]
        width = 12
        height = 6

        [[left.units]]
        name = "Swordsman"
        unit_type = "Swordsman"
        health = 30
        base_attack = 7
        cost = 10
        position = { x = 2, y = 1 }

        [[left.units]]
        name = "Crossbowman"
        unit_type = "Crossbowman"
        health = 20
        base_attack = 5
        cost = 12
        attack_type = "Ranged"
        position = { x = 1, y = 1 }

        [[right.units]]
        name = "Pikeman"
        unit_type = "Pikeman"
        health = 35
        base_attack = 6
        cost = 10
        defence_bonuses = { Swordsman = 2.0 }
        position = { x = 9, y = 1 }

        [[right.units]]
        name = "Archer"
        unit_type = "Archer"
        health = 15
        base_attack = 4
        cost = 12
        attack_type = "Ranged"
        position = { x = 10, y = 4 }
        "#,
    )
    .expect("scenario");

    let field = scenario.build_battlefield().expect("battlefield");
    assert_eq!(field.left.points, 22);
    let mut battle = Battle::new(field);

    let report = battle.simulate().expect("simulate");

    assert_ne!(report.outcome, BattleOutcome::Stalemate);
    let left_alive = battle.field().left.has_alive_units();
    let right_alive = battle.field().right.has_alive_units();
    assert!(!(left_alive && right_alive));
    assert_eq!(report.attacks, battle.log().len());
    assert!(battle.log().events.iter().all(|e| e.round <= report.rounds));
}

#[test]
fn test_preset_armies_fight_to_the_end() {
    let grid = Grid::default();
    let left_templates = vec![
        UnitTemplate::new("Swordsman", "Swordsman", 60, 12, 15, AttackType::Melee),
        UnitTemplate::new("Crossbowman", "Crossbowman", 40, 10, 20, AttackType::Ranged),
    ];
    let right_templates = vec![
        UnitTemplate::new("Pikeman", "Pikeman", 70, 9, 15, AttackType::Melee),
        UnitTemplate::new("Archer", "Archer", 35, 11, 18, AttackType::Ranged),
    ];
    let left = generate_preset(&left_templates, 250, Side::Left, &grid).expect("left");
    let right = generate_preset(&right_templates, 250, Side::Right, &grid).expect("right");
    assert!(left.points <= 250 && right.points <= 250);

    let field = Battlefield::new(grid, left, right);
    field.validate().expect("valid deployment");

    let mut battle = Battle::new(field).with_max_rounds(Some(1000));
    let report = battle.simulate().expect("simulate");

    assert_ne!(report.outcome, BattleOutcome::Stalemate);
    assert!(report.rounds < 1000);
}

#[test]
fn test_occupancy_follows_deaths() {
    // One-row corridor: the ally blocks the way until it dies
    let attacker = unit("Attacker", 10, 4, 0, 0);
    let ally = unit("Ally", 10, 1, 1, 0);
    let enemy = unit("Enemy", 10, 1, 4, 0);
    let (attacker_id, ally_id, enemy_id) = (attacker.id, ally.id, enemy.id);
    let mut field = Battlefield::new(
        Grid::new(5, 1),
        Roster::new(vec![attacker, ally]),
        Roster::new(vec![enemy]),
    );

    assert_eq!(choose_melee_target(&field, attacker_id), None);

    if let Some(ally) = field.unit_mut(ally_id) {
        ally.health = 0;
    }
    assert_eq!(choose_melee_target(&field, attacker_id), Some(enemy_id));
}

#[test]
fn test_stop_signal_interrupts_battle() {
    let field = Battlefield::new(
        Grid::new(5, 1),
        Roster::new(vec![unit("P", 100, 5, 0, 0)]),
        Roster::new(vec![unit("Q", 100, 3, 4, 0)]),
    );
    let (pacer, stop) = SleepPacer::with_stop_signal(Duration::from_millis(5));
    let mut battle = Battle::with_collaborators(field, BattleEventLog::new(), pacer);

    stop.send(()).expect("pacer alive");
    let err = battle.simulate().unwrap_err();

    assert!(matches!(err, BattleError::Interrupted));
    assert_eq!(battle.log().len(), 1);
    assert!(!battle.is_decided());
}

#[test]
fn test_custom_policy_injection() {
    #[derive(Debug)]
    struct Pacifist;

    impl AttackPolicy for Pacifist {
        fn attack(&self, _attacker: UnitId, _field: &mut Battlefield) -> Option<UnitId> {
            None
        }
    }

    let monk = unit("Monk", 10, 50, 0, 0).with_policy(Arc::new(Pacifist));
    let brute = unit("Brute", 10, 1, 4, 0);
    let field = Battlefield::new(
        Grid::new(5, 1),
        Roster::new(vec![monk]),
        Roster::new(vec![brute]),
    );
    let mut battle = Battle::new(field);

    let report = battle.simulate().expect("simulate");

    assert_eq!(report.outcome, BattleOutcome::RightVictory);
    assert!(battle.log().events.iter().all(|e| e.attacker_name == "Brute"));
}

#[test]
fn test_load_scenario_from_file() {
    let path =
        std::env::temp_dir().join(format!("frontline_scenario_{}.toml", std::process::id()));
    std::fs::write(
        &path,
        r#"
        [config]
        max_rounds = 10

        [[left.units]]
        name = "A"
        unit_type = "A"
        health = 5
        base_attack = 5
        cost = 1

        [[right.units]]
        name = "B"
        unit_type = "B"
        health = 5
        base_attack = 1
        cost = 1
        "#,
    )
    .expect("write scenario");

    let scenario = load_scenario(&path).expect("load");
    std::fs::remove_file(&path).ok();

    assert_eq!(scenario.config.max_rounds, Some(10));
    let field = scenario.build_battlefield().expect("battlefield");
    // Unplaced units are deployed at the front columns
    assert_eq!(field.left.units[0].position, Cell::new(2, 0));
    assert_eq!(field.right.units[0].position, Cell::new(24, 0));
}

#[test]
fn test_missing_scenario_file() {
    let err = load_scenario(std::path::Path::new("/nonexistent/frontline.toml")).unwrap_err();
    assert!(matches!(err, BattleError::IoError(_)));
}

#[test]
fn test_invalid_roster_rejected() {
    let scenario = Scenario::from_toml_str(
        r#"
        [[left.units]]
        name = "A"
        unit_type = "A"
        health = 5
        base_attack = 5
        cost = 1
        position = { x = 30, y = 0 }
        "#,
    )
    .expect("parses");

    assert!(matches!(
        scenario.build_battlefield(),
        Err(BattleError::InvalidRoster(_))
    ));
}
