//! Session Flow Tests
//!
//! Drives whole sessions through the public machine API and checks the
//! bookkeeping that has to hold across many spins:
//! - credit accounting against the session stats
//! - seeded reproducibility of the full cue stream
//! - spin lifecycle ordering in the recorded trace
//! - configuration loading feeding the reel timing

use sf_machine::{
    CellId, Machine, MachineConfig, MachineError, RecordingPresentation, SymbolKind,
};
use sf_stage::{SharedRecorder, StageTrace};

// ═══════════════════════════════════════════════════════════════════════════════
// FIXTURES
// ═══════════════════════════════════════════════════════════════════════════════

fn seeded_machine(seed: u64) -> (Machine, SharedRecorder) {
    let recorder = SharedRecorder::new();
    let machine = Machine::from_config(MachineConfig::default().with_seed(seed))
        .unwrap()
        .with_cue_sink(recorder.clone());
    (machine, recorder)
}

/// Play `spins` rounds, feeding coins whenever the stake can't be covered
fn play(machine: &mut Machine, bets: &[SymbolKind], spins: usize) {
    for &symbol in bets {
        machine.place_bet(symbol).unwrap();
    }

    let mut played = 0;
    while played < spins {
        match machine.request_spin() {
            Ok(_) => {
                machine.run_until_idle().unwrap();
                played += 1;
            }
            Err(MachineError::InsufficientCredits { .. }) => {
                machine.insert_coin();
            }
            Err(err) => panic!("unexpected rejection: {err}"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ACCOUNTING
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_credits_balance_against_stats() {
    let (mut machine, recorder) = seeded_machine(2024);
    play(
        &mut machine,
        &[SymbolKind::Apple, SymbolKind::Orange, SymbolKind::Bar],
        300,
    );

    let session = machine.session();
    let stats = &session.stats;
    assert_eq!(
        session.credits,
        100 + stats.coins_inserted + stats.total_won - stats.total_wagered
    );
    assert_eq!(stats.total_spins, 300);
    assert_eq!(stats.wins + stats.losses, 300);
    assert_eq!(machine.pending_awards(), 0);

    // Spin wins plus collection awards make up everything paid
    let trace = StageTrace::from_events("flow", "super_fruit", recorder.events());
    assert_eq!(
        trace.total_win() + stats.collection_bonuses * 500,
        stats.total_won
    );
}

#[test]
fn test_progression_stays_in_bounds() {
    let (mut machine, _recorder) = seeded_machine(77);
    machine.place_bet(SymbolKind::Seven).unwrap();

    for _ in 0..150 {
        if machine.request_spin().is_err() {
            machine.insert_coin();
            continue;
        }
        machine.run_until_idle().unwrap();

        let progression = &machine.session().progression;
        assert!(progression.rage <= 100);
        assert!(progression.rage % 5 == 0);
        assert!(progression.collected.len() < 5);
        // Pity override keeps the streak from running away
        assert!(progression.consecutive_losses <= 10);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REPRODUCIBILITY
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_same_seed_same_session() {
    let (mut a, rec_a) = seeded_machine(99);
    let (mut b, rec_b) = seeded_machine(99);

    play(&mut a, &[SymbolKind::Apple, SymbolKind::Bell], 40);
    play(&mut b, &[SymbolKind::Apple, SymbolKind::Bell], 40);

    assert_eq!(a.session(), b.session());
    assert_eq!(rec_a.events(), rec_b.events());
}

#[test]
fn test_different_seeds_diverge() {
    let (mut a, rec_a) = seeded_machine(1);
    let (mut b, rec_b) = seeded_machine(2);

    play(&mut a, &[SymbolKind::Apple], 20);
    play(&mut b, &[SymbolKind::Apple], 20);

    assert_ne!(rec_a.events(), rec_b.events());
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRACE
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_trace_lifecycle_is_well_formed() {
    let (mut machine, recorder) = seeded_machine(5);
    play(&mut machine, &[SymbolKind::Plum], 25);

    let trace = StageTrace::from_events("flow", "super_fruit", recorder.events());
    let validation = trace.validate();
    assert!(validation.is_valid(), "{:?}", validation.warnings());
    assert_eq!(validation.spin_starts, 25);
    assert_eq!(validation.spin_stops, 25);
    assert_eq!(trace.summary().spins, 25);
}

#[test]
fn test_trace_survives_json() {
    let (mut machine, recorder) = seeded_machine(8);
    play(&mut machine, &[SymbolKind::Apple], 3);

    let trace = StageTrace::from_events("flow", "super_fruit", recorder.events());
    let json = serde_json::to_string(&trace).unwrap();
    let back: StageTrace = serde_json::from_str(&json).unwrap();
    assert_eq!(back.events.len(), trace.events.len());
    assert!(json.contains("\"type\":\"spin_step\""));
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_turbo_config_spins_faster() {
    let yaml = "seed: 3\ntiming:\n  start_delay_ms: 15.0\n  end_delay_ms: 300.0\n";
    let turbo = MachineConfig::from_yaml_str(yaml).unwrap();
    let normal = MachineConfig::default().with_seed(3);

    let mut fast = Machine::from_config(turbo).unwrap();
    let mut slow = Machine::from_config(normal).unwrap();

    for machine in [&mut fast, &mut slow] {
        machine.place_bet(SymbolKind::Apple).unwrap();
        let plan = machine.request_spin_forced(CellId::new(12)).unwrap();
        assert!(plan.total_steps >= 72);
    }

    // Same seed, same step count; only the delays differ
    let mut fast_ms = 0.0;
    while fast.is_spinning() {
        fast.advance(5.0).unwrap();
        fast_ms += 5.0;
    }
    let mut slow_ms = 0.0;
    while slow.is_spinning() {
        slow.advance(5.0).unwrap();
        slow_ms += 5.0;
    }
    assert!(fast_ms < slow_ms);
}

#[test]
fn test_presentation_snapshot_serializes() {
    let (mut machine, _recorder) = seeded_machine(12);
    let presentation = RecordingPresentation::new();
    machine.set_presentation(presentation.clone());

    machine.insert_coin();
    let snapshot = presentation.last_snapshot().unwrap();
    assert_eq!(snapshot.credits, 110);
    assert_eq!(snapshot.message, "COIN IN");

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["credits"], 110);
    assert_eq!(json["message"], "COIN IN");
}
