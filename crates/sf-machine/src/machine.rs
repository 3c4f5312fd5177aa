//! Machine: single owner of the session, reel and clock
//!
//! Player input goes in through `request_spin`, `place_bet`, `clear_bets`
//! and `add_credits`. Time goes in through `advance`. Everything delayed
//! (reel steps, bonus awards, counter ticks) is queued on the one
//! [`Scheduler`], so a deferred award and a new spin always resolve against
//! the same session state in deadline order.

use sf_stage::{BonusKind, CueSink, Stage, StageEvent, StagePayload};

use crate::board::{Board, CellId, SymbolKind};
use crate::config::{ConfigError, MachineConfig};
use crate::counter::WinCounter;
use crate::error::{MachineError, MachineResult};
use crate::payout::{DeferredAward, PayoutEngine, PayoutOutcome};
use crate::presentation::{PresentationSink, SessionSnapshot};
use crate::rng::{RandomSource, SeededRandom};
use crate::sampler::OutcomeSampler;
use crate::scheduler::{ScheduledTask, Scheduler};
use crate::session::{Headline, SessionState, SpinCharge};
use crate::stepper::{ReelStepper, SpinPlan};
use crate::timing::ReelTiming;

/// Spin currently on the reel
#[derive(Debug, Clone, Copy)]
struct ActiveSpin {
    charge: SpinCharge,
}

/// Super Fruit machine
pub struct Machine {
    config: MachineConfig,
    board: Board,
    session: SessionState,
    stepper: ReelStepper,
    sampler: OutcomeSampler,
    payout: PayoutEngine,
    scheduler: Scheduler,
    counter: WinCounter,
    counter_queued: bool,
    rng: Box<dyn RandomSource>,
    sinks: Vec<Box<dyn CueSink>>,
    presentation: Option<Box<dyn PresentationSink>>,
    active: Option<ActiveSpin>,
    trail: Vec<CellId>,
    spin_id: u64,
    last_outcome: Option<PayoutOutcome>,
}

impl Machine {
    /// Machine with default configuration, seeded from the OS
    pub fn new() -> Self {
        Self::build(MachineConfig::default())
    }

    /// Validate `config` and build a machine from it
    pub fn from_config(config: MachineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: MachineConfig) -> Self {
        let board = Board::standard();
        let rng: Box<dyn RandomSource> = match config.seed {
            Some(seed) => Box::new(SeededRandom::new(seed)),
            None => Box::new(SeededRandom::from_entropy()),
        };

        Self {
            sampler: OutcomeSampler::new(config.rules.pity_threshold, board.relief_cells()),
            payout: PayoutEngine::new(config.rules.clone()),
            stepper: ReelStepper::new(config.timing.clone()),
            session: SessionState::new(config.starting_credits),
            counter: WinCounter::new(config.counter.divisor),
            counter_queued: false,
            scheduler: Scheduler::new(),
            rng,
            sinks: Vec::new(),
            presentation: None,
            active: None,
            trail: Vec::new(),
            spin_id: 0,
            last_outcome: None,
            board,
            config,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // WIRING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Builder: replace the random source
    pub fn with_random_source(mut self, rng: impl RandomSource + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Builder: add a cue sink
    pub fn with_cue_sink(mut self, sink: impl CueSink + 'static) -> Self {
        self.add_cue_sink(sink);
        self
    }

    pub fn add_cue_sink(&mut self, sink: impl CueSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub fn set_presentation(&mut self, sink: impl PresentationSink + 'static) {
        self.presentation = Some(Box::new(sink));
    }

    /// Swap reel timing between spins
    pub fn set_timing(&mut self, timing: ReelTiming) -> MachineResult<()> {
        self.stepper.set_timing(timing.clone())?;
        self.config.timing = timing;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // READ ACCESS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Logical time in milliseconds
    pub fn now(&self) -> f64 {
        self.scheduler.now()
    }

    pub fn is_spinning(&self) -> bool {
        !self.stepper.is_idle()
    }

    /// No spin running and nothing queued
    pub fn is_idle(&self) -> bool {
        self.stepper.is_idle() && self.scheduler.is_empty()
    }

    /// Deferred awards not yet applied
    pub fn pending_awards(&self) -> usize {
        self.scheduler.pending_where(ScheduledTask::is_award)
    }

    /// Outcome of the most recent landed spin
    pub fn last_outcome(&self) -> Option<&PayoutOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn win_shown(&self) -> u64 {
        self.counter.shown()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let progression = &self.session.progression;
        SessionSnapshot {
            time_ms: self.scheduler.now(),
            spin_id: self.spin_id,
            credits: self.session.credits,
            win_shown: self.counter.shown(),
            target_win: self.session.target_win,
            headline: self.session.headline,
            message: self.session.headline.to_string(),
            big_win: self.session.big_win,
            spinning: self.is_spinning(),
            active_cell: self.stepper.current(),
            trail: self.trail.clone(),
            rage: progression.rage,
            free_spins_remaining: progression.free_spins_remaining,
            consecutive_losses: progression.consecutive_losses,
            collected: progression.collected.iter().copied().collect(),
            bets: self.session.bets.iter().collect(),
            total_bet: self.session.total_bet(),
            stats: self.session.stats.clone(),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INPUT
    // ═══════════════════════════════════════════════════════════════════════════

    /// Start a spin toward a freshly sampled cell
    pub fn request_spin(&mut self) -> MachineResult<SpinPlan> {
        self.start_spin(None)
    }

    /// Start a spin toward a fixed cell; payout rules still apply
    pub fn request_spin_forced(&mut self, target: CellId) -> MachineResult<SpinPlan> {
        self.start_spin(Some(target))
    }

    fn start_spin(&mut self, forced: Option<CellId>) -> MachineResult<SpinPlan> {
        if self.is_spinning() {
            return Err(self.reject(MachineError::SpinInProgress));
        }
        let charge = match self.session.begin_spin() {
            Ok(charge) => charge,
            Err(err) => return Err(self.reject(err)),
        };

        let target = match forced {
            Some(cell) => cell,
            None => self.sampler.sample(
                self.board.weights(),
                self.session.progression.consecutive_losses,
                self.rng.as_mut(),
            ),
        };
        let plan = self.stepper.start(target, self.rng.as_mut())?;

        self.spin_id += 1;
        self.active = Some(ActiveSpin { charge });
        self.counter.reset();
        self.trail.clear();

        let mut payload = StagePayload::new()
            .spin_id(self.spin_id)
            .balance(self.session.credits);
        payload = match charge {
            SpinCharge::Paid(stake) => payload.bet_amount(stake),
            SpinCharge::Free => {
                payload.spins_remaining(self.session.progression.free_spins_remaining)
            }
        };
        self.cue(
            Stage::SpinStart {
                free_spin: charge.is_free(),
            },
            payload,
        );

        log::debug!(
            "Spin #{} ({:?}) toward {} in {} steps",
            self.spin_id,
            charge,
            plan.target,
            plan.total_steps
        );

        self.scheduler.schedule(0.0, ScheduledTask::ReelStep);
        self.publish();
        Ok(plan)
    }

    /// Stake one credit on `symbol`, returning the new stake
    pub fn place_bet(&mut self, symbol: SymbolKind) -> MachineResult<u32> {
        if self.is_spinning() {
            return Err(self.reject(MachineError::SpinInProgress));
        }
        match self.session.place_bet(symbol) {
            Ok(stake) => {
                let payload = StagePayload::new().bet_amount(self.session.total_bet());
                self.cue(
                    Stage::BetPlaced {
                        symbol: symbol.name().to_string(),
                    },
                    payload,
                );
                self.publish();
                Ok(stake)
            }
            Err(err) => Err(self.reject(err)),
        }
    }

    /// Zero every stake
    pub fn clear_bets(&mut self) -> MachineResult<()> {
        if self.is_spinning() {
            return Err(self.reject(MachineError::SpinInProgress));
        }
        self.session.clear_bets();
        self.publish();
        Ok(())
    }

    /// Add credits; allowed at any time
    pub fn add_credits(&mut self, amount: u64) -> u64 {
        self.session.add_credits(amount);
        let payload = StagePayload::new().balance(self.session.credits);
        self.cue(Stage::CoinIn { amount }, payload);
        self.publish();
        self.session.credits
    }

    /// One coin at the configured value
    pub fn insert_coin(&mut self) -> u64 {
        self.add_credits(self.config.coin_value)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CLOCK
    // ═══════════════════════════════════════════════════════════════════════════

    /// Move the clock forward, running every task that comes due
    pub fn advance(&mut self, delta_ms: f64) -> MachineResult<()> {
        let until = self.scheduler.now() + delta_ms.max(0.0);
        while let Some(task) = self.scheduler.pop_due(until) {
            self.run_task(task)?;
        }
        self.scheduler.advance_to(until);
        Ok(())
    }

    /// Drain the queue completely, returning the logical time elapsed
    pub fn run_until_idle(&mut self) -> MachineResult<f64> {
        let start = self.scheduler.now();
        while let Some(task) = self.scheduler.pop_due(f64::INFINITY) {
            self.run_task(task)?;
        }
        Ok(self.scheduler.now() - start)
    }

    fn run_task(&mut self, task: ScheduledTask) -> MachineResult<()> {
        match task {
            ScheduledTask::ReelStep => self.step_reel(),
            ScheduledTask::Award(award) => {
                self.apply_award(award);
                Ok(())
            }
            ScheduledTask::CounterTick => {
                self.tick_counter();
                Ok(())
            }
        }
    }

    fn step_reel(&mut self) -> MachineResult<()> {
        let Some(frame) = self.stepper.tick() else {
            return Ok(());
        };

        self.trail = frame.trail.clone();
        let mut payload = StagePayload::new()
            .spin_id(self.spin_id)
            .trail(frame.trail.iter().map(|c| c.get()).collect::<Vec<u8>>());
        if let Some(delay) = frame.delay_ms {
            payload = payload.delay_ms(delay);
        }
        self.cue(
            Stage::SpinStep {
                cell: frame.cell.get(),
                speed_ratio: frame.speed_ratio,
            },
            payload,
        );
        if let Some(presentation) = self.presentation.as_mut() {
            presentation.on_frame(&frame);
        }

        match frame.delay_ms {
            Some(delay) => {
                self.scheduler.schedule(delay, ScheduledTask::ReelStep);
                Ok(())
            }
            None => self.land(),
        }
    }

    fn land(&mut self) -> MachineResult<()> {
        let landed = self.stepper.landed_cell()?;
        let free_spin = self.active.take().is_some_and(|spin| spin.charge.is_free());
        self.trail.clear();

        self.cue(
            Stage::SpinStop { cell: landed.get() },
            StagePayload::new().spin_id(self.spin_id),
        );
        if let Some(presentation) = self.presentation.as_mut() {
            presentation.on_landed(landed);
        }

        let cell = *self.board.cell(landed);
        let outcome = self.payout.evaluate(
            &cell,
            &self.session.bets,
            &self.session.progression,
            free_spin,
            self.rng.as_mut(),
        );

        if let Some(symbol) = outcome.collected {
            self.cue(
                Stage::CollectionItem {
                    symbol: symbol.name().to_string(),
                },
                StagePayload::new().spin_id(self.spin_id),
            );
        }

        self.session.apply_payout(&outcome);

        if outcome.is_win() {
            let payload = StagePayload::new()
                .spin_id(self.spin_id)
                .balance(self.session.credits);
            self.cue(
                Stage::Win {
                    multiplier: outcome.multiplier,
                    amount: outcome.win,
                },
                payload,
            );
        }
        if let Some(award) = outcome.jackpot {
            self.cue(
                Stage::BonusTriggered {
                    bonus: BonusKind::Jackpot,
                },
                StagePayload::new().spin_id(self.spin_id).award(award),
            );
        }

        for award in &outcome.deferred {
            let delay = match award {
                DeferredAward::CollectionComplete { .. } => {
                    self.config.timing.collection_bonus_delay_ms
                }
                DeferredAward::FreeSpins { .. } => self.config.timing.rage_bonus_delay_ms,
            };
            self.scheduler.schedule(delay, ScheduledTask::Award(*award));
        }

        self.counter.set_target(outcome.win);
        self.queue_counter();
        self.stepper.finish();

        log::info!(
            "Spin #{} landed {} {} → win {} (credits {})",
            self.spin_id,
            landed,
            cell.symbol,
            outcome.win,
            self.session.credits
        );

        self.last_outcome = Some(outcome);
        self.publish();
        Ok(())
    }

    fn apply_award(&mut self, award: DeferredAward) {
        match award {
            DeferredAward::CollectionComplete { award } => {
                self.session.award_collection(award);
                log::info!("Collection bonus paid: {}", award);
                let payload = StagePayload::new()
                    .award(award)
                    .balance(self.session.credits);
                self.cue(
                    Stage::BonusTriggered {
                        bonus: BonusKind::Collection,
                    },
                    payload,
                );
            }
            DeferredAward::FreeSpins { spins } => {
                self.session.grant_free_spins(spins);
                log::info!("Rage bonus granted {} free spins", spins);
                let payload = StagePayload::new()
                    .spins_remaining(self.session.progression.free_spins_remaining);
                self.cue(
                    Stage::BonusTriggered {
                        bonus: BonusKind::FreeSpins,
                    },
                    payload,
                );
            }
        }
        self.publish();
    }

    fn queue_counter(&mut self) {
        if !self.counter_queued && !self.counter.is_settled() {
            self.scheduler
                .schedule(self.config.counter.tick_ms, ScheduledTask::CounterTick);
            self.counter_queued = true;
        }
    }

    fn tick_counter(&mut self) {
        self.counter_queued = false;
        if let Some(shown) = self.counter.tick() {
            self.cue(Stage::CreditTick { shown }, StagePayload::new());
            self.publish();
            self.queue_counter();
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // OUTPUT
    // ═══════════════════════════════════════════════════════════════════════════

    /// Report a refused action; only the headline and cues change
    fn reject(&mut self, err: MachineError) -> MachineError {
        log::warn!("Rejected: {}", err);
        if let Some(reason) = err.reject_reason() {
            // The display keeps "SPINNING..." while the reel moves
            if err != MachineError::SpinInProgress {
                self.session.headline = Headline::Rejected { reason };
            }
            self.cue(Stage::ErrorRejected { reason }, StagePayload::new());
            self.publish();
        }
        err
    }

    fn cue(&mut self, stage: Stage, payload: StagePayload) {
        let event = StageEvent::with_payload(stage, self.scheduler.now(), payload);
        for sink in &mut self.sinks {
            if let Err(err) = sink.cue(&event) {
                log::warn!("Cue sink failed on {}: {}", event.type_name(), err);
            }
        }
    }

    fn publish(&mut self) {
        if self.presentation.is_some() {
            let snapshot = self.snapshot();
            if let Some(presentation) = self.presentation.as_mut() {
                presentation.on_snapshot(&snapshot);
            }
        }
    }
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::RecordingPresentation;
    use crate::rng::ScriptedRandom;
    use sf_stage::{RejectReason, SharedRecorder, SinkError};

    fn machine() -> (Machine, SharedRecorder) {
        let recorder = SharedRecorder::new();
        let machine = Machine::from_config(MachineConfig::default().with_seed(7))
            .unwrap()
            .with_cue_sink(recorder.clone());
        (machine, recorder)
    }

    fn run_spin(machine: &mut Machine) {
        while machine.is_spinning() {
            machine.advance(10.0).unwrap();
        }
    }

    #[test]
    fn test_apple_spin_end_to_end() {
        let recorder = SharedRecorder::new();
        // r = 20 lands on cell 4 (APPLE ×5), then no extra loop
        let mut machine = Machine::from_config(MachineConfig::default())
            .unwrap()
            .with_random_source(ScriptedRandom::new().with_values([20, 0]))
            .with_cue_sink(recorder.clone());

        machine.place_bet(SymbolKind::Apple).unwrap();
        let plan = machine.request_spin().unwrap();
        assert_eq!(plan.target, CellId::new(4));
        assert_eq!(plan.total_steps, 76);
        assert_eq!(machine.session().credits, 99);

        machine.run_until_idle().unwrap();

        let session = machine.session();
        assert_eq!(session.credits, 104);
        assert_eq!(session.current_cell, CellId::new(4));
        assert_eq!(session.headline, Headline::Winner);
        assert_eq!(machine.win_shown(), 5);
        assert_eq!(recorder.count("spin_start"), 1);
        assert_eq!(recorder.count("spin_step"), 76);
        assert_eq!(recorder.count("spin_stop"), 1);
        assert_eq!(recorder.count("win"), 1);
        assert_eq!(recorder.count("credit_tick"), 5);
        assert!(machine.is_idle());
    }

    #[test]
    fn test_spin_without_bet_is_rejected() {
        let (mut machine, recorder) = machine();

        assert_eq!(machine.request_spin(), Err(MachineError::InsufficientBet));
        assert_eq!(machine.session().credits, 100);
        assert_eq!(machine.snapshot().message, "PLACE BET");
        assert!(!machine.is_spinning());

        let events = recorder.events();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].stage,
            Stage::ErrorRejected {
                reason: RejectReason::NoBet
            }
        );
    }

    #[test]
    fn test_spin_request_while_running_changes_nothing() {
        let (mut machine, recorder) = machine();
        machine.place_bet(SymbolKind::Apple).unwrap();
        machine.request_spin().unwrap();
        machine.advance(100.0).unwrap();

        let before = machine.session().clone();
        let cell = machine.snapshot().active_cell;
        assert_eq!(machine.request_spin(), Err(MachineError::SpinInProgress));
        assert_eq!(machine.place_bet(SymbolKind::Bar), Err(MachineError::SpinInProgress));
        assert_eq!(machine.clear_bets(), Err(MachineError::SpinInProgress));

        assert_eq!(machine.session(), &before);
        assert_eq!(machine.snapshot().active_cell, cell);
        assert_eq!(recorder.count("spin_start"), 1);
        assert_eq!(recorder.count("error_rejected"), 3);
    }

    #[test]
    fn test_coins_during_a_spin() {
        let (mut machine, recorder) = machine();
        machine.place_bet(SymbolKind::Plum).unwrap();
        machine.request_spin().unwrap();
        machine.advance(50.0).unwrap();

        assert_eq!(machine.insert_coin(), 109);
        assert_eq!(machine.session().headline.to_string(), "COIN IN");
        assert_eq!(recorder.count("coin_in"), 1);
        run_spin(&mut machine);
    }

    #[test]
    fn test_deferred_rage_award_lands_during_next_spin() {
        let (mut machine, _recorder) = machine();
        machine.session.progression.rage = 95;
        machine.place_bet(SymbolKind::Apple).unwrap();

        // ORANGE with only APPLE staked: the twentieth loss fills rage
        machine.request_spin_forced(CellId::new(0)).unwrap();
        run_spin(&mut machine);
        assert_eq!(machine.session().progression.rage, 100);
        assert_eq!(machine.pending_awards(), 1);
        assert_eq!(machine.session().progression.free_spins_remaining, 0);

        // Award still pending; this spin is paid
        machine.request_spin_forced(CellId::new(0)).unwrap();
        assert_eq!(machine.session().credits, 98);
        machine.run_until_idle().unwrap();

        let progression = &machine.session().progression;
        assert_eq!(progression.free_spins_remaining, 5);
        assert_eq!(progression.rage, 5);
        assert_eq!(progression.consecutive_losses, 2);
        assert_eq!(machine.pending_awards(), 0);
        assert_eq!(machine.session().stats.free_spin_bonuses, 1);
    }

    #[test]
    fn test_collection_award_is_deferred() {
        let (mut machine, recorder) = machine();
        machine.session.progression.collected =
            [SymbolKind::Bar, SymbolKind::Seven, SymbolKind::Bell, SymbolKind::Orange]
                .into_iter()
                .collect();
        machine.place_bet(SymbolKind::Apple).unwrap();

        // Small APPLE completes the set
        machine.request_spin_forced(CellId::new(5)).unwrap();
        run_spin(&mut machine);
        assert_eq!(recorder.count("collection_item"), 1);
        assert!(machine.session().progression.collected.is_empty());
        assert_eq!(machine.session().credits, 104);
        assert_eq!(machine.pending_awards(), 1);

        machine.advance(1500.0).unwrap();
        assert_eq!(machine.pending_awards(), 0);
        assert_eq!(machine.session().credits, 604);
        assert_eq!(machine.session().headline.to_string(), "COLLECTION BONUS +500");
        assert_eq!(recorder.count("bonus_triggered"), 1);
    }

    #[test]
    fn test_free_spins_need_no_stake() {
        let (mut machine, recorder) = machine();
        machine.session.grant_free_spins(1);

        machine.request_spin().unwrap();
        assert_eq!(machine.session().credits, 100);
        let start = &recorder.events()[0];
        assert_eq!(start.stage, Stage::SpinStart { free_spin: true });
        assert_eq!(start.payload.spins_remaining, Some(0));

        machine.run_until_idle().unwrap();
        assert_eq!(machine.session().progression.free_spins_remaining, 0);
        assert_eq!(machine.request_spin(), Err(MachineError::InsufficientBet));
    }

    #[test]
    fn test_last_free_spin_still_doubles() {
        let recorder = SharedRecorder::new();
        let mut machine = Machine::from_config(MachineConfig::default())
            .unwrap()
            .with_random_source(ScriptedRandom::new().with_values([20, 0]))
            .with_cue_sink(recorder.clone());
        machine.place_bet(SymbolKind::Apple).unwrap();
        machine.session.grant_free_spins(1);
        machine.session.progression.rage = 50;
        machine.session.progression.consecutive_losses = 3;

        machine.request_spin().unwrap();
        assert_eq!(machine.session().progression.free_spins_remaining, 0);
        let start = recorder
            .events()
            .into_iter()
            .find(|e| e.type_name() == "spin_start")
            .unwrap();
        assert_eq!(start.stage, Stage::SpinStart { free_spin: true });
        machine.run_until_idle().unwrap();

        // APPLE ×5 on one credit, doubled
        let outcome = machine.last_outcome().unwrap();
        assert_eq!(outcome.cell, CellId::new(4));
        assert_eq!(outcome.win, 10);

        let session = machine.session();
        assert_eq!(session.credits, 110);
        assert_eq!(session.progression.rage, 50);
        assert_eq!(session.progression.consecutive_losses, 3);
        assert_eq!(session.stats.free_spins_played, 1);
        assert_eq!(session.stats.total_wagered, 0);
    }

    #[test]
    fn test_huge_coin_in_saturates() {
        let (mut machine, recorder) = machine();

        assert_eq!(machine.add_credits(u64::MAX), u64::MAX);
        assert_eq!(machine.add_credits(u64::MAX), u64::MAX);
        assert_eq!(machine.session().stats.coins_inserted, u64::MAX);
        assert_eq!(recorder.count("coin_in"), 2);

        // Ledger still works at the ceiling
        machine.place_bet(SymbolKind::Apple).unwrap();
        machine.request_spin_forced(CellId::new(4)).unwrap();
        machine.run_until_idle().unwrap();
        assert_eq!(machine.session().credits, u64::MAX);
    }

    #[test]
    fn test_losing_streak_lands_on_luck() {
        let (mut machine, _recorder) = machine();
        machine.session.progression.consecutive_losses = 10;
        machine.place_bet(SymbolKind::Apple).unwrap();

        let plan = machine.request_spin().unwrap();
        assert!(plan.target == CellId::new(9) || plan.target == CellId::new(21));
        machine.run_until_idle().unwrap();

        let outcome = machine.last_outcome().unwrap();
        assert!((50..=250).contains(&outcome.win));
        assert_eq!(machine.session().progression.consecutive_losses, 0);
        assert_eq!(machine.session().headline, Headline::Lucky);
    }

    #[test]
    fn test_presentation_follows_the_reel() {
        let (mut machine, _recorder) = machine();
        let presentation = RecordingPresentation::new();
        machine.set_presentation(presentation.clone());

        machine.place_bet(SymbolKind::Apple).unwrap();
        let plan = machine.request_spin().unwrap();
        machine.run_until_idle().unwrap();

        let frames = presentation.frames();
        assert_eq!(frames.len() as u32, plan.total_steps);
        assert_eq!(frames.last().unwrap().cell, plan.target);
        assert_eq!(presentation.landed(), vec![plan.target]);

        let last = presentation.last_snapshot().unwrap();
        assert_eq!(last.credits, machine.session().credits);
        assert!(!last.spinning);
        assert!(last.trail.is_empty());
    }

    struct FailingSink;

    impl CueSink for FailingSink {
        fn cue(&mut self, _event: &StageEvent) -> Result<(), SinkError> {
            Err(SinkError::Unavailable("unplugged".into()))
        }
    }

    #[test]
    fn test_sink_failures_do_not_affect_state() {
        let (machine, recorder) = machine();
        let mut machine = machine.with_cue_sink(FailingSink);

        machine.place_bet(SymbolKind::Apple).unwrap();
        machine.request_spin().unwrap();
        machine.run_until_idle().unwrap();

        assert_eq!(recorder.count("spin_stop"), 1);
        assert_eq!(machine.session().stats.total_spins, 1);
    }

    #[test]
    fn test_timing_locked_while_spinning() {
        let (mut machine, _recorder) = machine();
        machine.place_bet(SymbolKind::Apple).unwrap();
        machine.request_spin().unwrap();
        assert_eq!(
            machine.set_timing(ReelTiming::turbo()),
            Err(MachineError::SpinInProgress)
        );
        machine.run_until_idle().unwrap();
        assert!(machine.set_timing(ReelTiming::turbo()).is_ok());
    }
}
