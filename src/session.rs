//! Round orchestration
//!
//! A round runs start -> (exclusion prompt) -> spin -> resolution ->
//! (interruption -> nudge) -> result -> close. Challenges re-spin with the
//! winner's weight halved. The session owns the weight store and the spin
//! engine and is driven by the host through [`Session::on_frame`].

use glam::DVec2;

use crate::audio::{AudioSink, Cue, LogAudio};
use crate::consts::MIN_PARTICIPANTS;
use crate::error::RouletteError;
use crate::persistence::ShareSnapshot;
use crate::random::{PcgSource, RandomSource};
use crate::roster::{Roster, normalize_key};
use crate::spin::{DragRelease, Resolution, ShiftDirection, SpinEngine, SpinEvent, SpinPhase};
use crate::tuning::{SessionTuning, Tuning, WheelTuning};
use crate::weights::WeightStore;
use crate::wheel::{Segment, hit_test, segments_from};

/// Animal that barges in on a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interruption {
    Cat,
    Duck,
}

/// Confirmation the host has to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Exclude the previous winner from this round?
    ExcludeLastWinner(String),
    /// Re-spin with this winner's weight halved?
    Challenge(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Spinning,
    NeedsExclusionConfirm { last_winner: String },
    Refused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RespinKind {
    Full,
    Nudge,
}

/// Re-spin waiting for its delay to run out
#[derive(Debug, Clone, Copy)]
struct PendingRespin {
    kind: RespinKind,
    armed_at: Option<f64>,
}

/// Who was challenged and what their override was before
#[derive(Debug, Clone, PartialEq)]
struct ChallengeRecord {
    key: String,
    prior: Option<f64>,
}

pub struct Session {
    tuning: SessionTuning,
    wheel: WheelTuning,
    store: WeightStore,
    engine: SpinEngine,
    rng: Box<dyn RandomSource>,
    audio: Box<dyn AudioSink>,
    last_winner: Option<String>,
    challenged: Option<ChallengeRecord>,
    prompt: Option<Prompt>,
    interruption: Option<Interruption>,
    /// One interruption per round at most
    interruption_occurred: bool,
    respin: Option<PendingRespin>,
}

impl Session {
    /// `spin_rng` drives spin magnitudes, `rng` the interruption rolls
    pub fn new(
        roster: Roster,
        tuning: &Tuning,
        spin_rng: Box<dyn RandomSource>,
        rng: Box<dyn RandomSource>,
        audio: Box<dyn AudioSink>,
    ) -> Self {
        Self {
            tuning: tuning.session.clone(),
            wheel: tuning.wheel,
            store: WeightStore::new(roster),
            engine: SpinEngine::new(tuning.spin.clone(), tuning.wheel, spin_rng),
            rng,
            audio,
            last_winner: None,
            challenged: None,
            prompt: None,
            interruption: None,
            interruption_occurred: false,
            respin: None,
        }
    }

    /// Session with PCG randomness and logged audio
    pub fn seeded(roster: Roster, tuning: &Tuning, seed: u64) -> Self {
        log::info!("Session seeded with {}", seed);
        Self::new(
            roster,
            tuning,
            Box::new(PcgSource::new(seed)),
            Box::new(PcgSource::new(seed.wrapping_add(1))),
            Box::new(LogAudio::new()),
        )
    }

    /// Resume from a shared snapshot
    pub fn from_snapshot(snapshot: &ShareSnapshot, tuning: &Tuning, seed: u64) -> Self {
        let mut session = Self::seeded(snapshot.roster(), tuning, seed);
        session.last_winner = snapshot.last_winner_key();
        session
    }

    pub fn snapshot(&self) -> ShareSnapshot {
        ShareSnapshot::new(self.store.roster(), self.last_winner.as_deref())
    }

    #[inline]
    pub fn roster(&self) -> &Roster {
        self.store.roster()
    }

    #[inline]
    pub fn store(&self) -> &WeightStore {
        &self.store
    }

    #[inline]
    pub fn engine(&self) -> &SpinEngine {
        &self.engine
    }

    #[inline]
    pub fn rotation(&self) -> f64 {
        self.engine.rotation()
    }

    pub fn weights(&self) -> Vec<f64> {
        self.store.weights()
    }

    /// Segments for the current weights, for drawing
    pub fn segments(&self) -> Vec<Segment> {
        segments_from(&self.store.weights(), self.wheel.reference_angle)
    }

    pub fn last_winner(&self) -> Option<&str> {
        self.last_winner.as_deref()
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn interruption(&self) -> Option<Interruption> {
        self.interruption
    }

    /// How long the host should play the interruption overlay (ms)
    pub fn interruption_duration_ms(&self) -> f64 {
        self.tuning.interruption_duration_ms
    }

    /// Winner key once it may be shown: resolved and not interrupted
    pub fn displayable_result(&self) -> Option<&str> {
        if self.interruption.is_some() || self.engine.phase() != SpinPhase::Resolved {
            return None;
        }
        self.engine.result()
    }

    /// Display form of a key (honorific applied when enabled)
    pub fn display_name(&self, key: &str) -> String {
        self.store.roster().display_name(key)
    }

    /// Whether the host has to keep delivering frames
    pub fn needs_frame(&self) -> bool {
        self.engine.pending_frame().is_some() || self.respin.is_some()
    }

    fn busy(&self) -> bool {
        self.engine.is_moving() || self.respin.is_some() || self.interruption.is_some()
    }

    /// Start button. May ask to exclude the previous winner first.
    pub fn start(&mut self) -> StartOutcome {
        if self.busy()
            || self.store.roster().len() < MIN_PARTICIPANTS
            || self.store.selectable_count() == 0
        {
            log::debug!("Start refused in {:?}", self.engine.phase());
            return StartOutcome::Refused;
        }

        if let Some(last) = self.last_winner.clone() {
            let roster = self.store.roster();
            if roster.len() >= self.tuning.exclusion_prompt_min_roster
                && roster.contains(&last)
                && self.store.weight(&last) > 0.0
                && self.store.can_exclude(&last)
            {
                self.prompt = Some(Prompt::ExcludeLastWinner(last.clone()));
                return StartOutcome::NeedsExclusionConfirm { last_winner: last };
            }
        }

        let weights = self.store.weights();
        self.spin_with(&weights)
    }

    /// Answer the exclusion prompt and spin
    pub fn confirm_exclusion(&mut self, exclude: bool) -> Result<StartOutcome, RouletteError> {
        let key = match self.prompt.take() {
            Some(Prompt::ExcludeLastWinner(key)) => key,
            other => {
                self.prompt = other;
                return Ok(StartOutcome::Refused);
            }
        };

        let weights = if exclude {
            self.store.try_exclude(&key)?
        } else {
            self.store.weights()
        };
        Ok(self.spin_with(&weights))
    }

    fn spin_with(&mut self, weights: &[f64]) -> StartOutcome {
        let keys = self.store.roster().keys().to_vec();
        if self.engine.spin(&keys, weights) {
            self.prompt = None;
            StartOutcome::Spinning
        } else {
            StartOutcome::Refused
        }
    }

    /// Ask for a challenge on the shown result
    pub fn challenge(&mut self) -> bool {
        let Some(key) = self.displayable_result().map(str::to_string) else {
            return false;
        };
        self.prompt = Some(Prompt::Challenge(key));
        true
    }

    /// Answer the challenge prompt. Accepting halves the winner; either
    /// way the wheel is re-spun after a short pause.
    pub fn confirm_challenge(&mut self, accept: bool) -> bool {
        let key = match self.prompt.take() {
            Some(Prompt::Challenge(key)) => key,
            other => {
                self.prompt = other;
                return false;
            }
        };

        if accept {
            let prior = match self.challenged.take() {
                Some(previous) if previous.key == key => previous.prior,
                Some(previous) => {
                    self.store.set_override(&previous.key, previous.prior);
                    self.store.override_weight(&key)
                }
                None => self.store.override_weight(&key),
            };
            self.store.halve(&key);
            log::info!("{} challenged", key);
            self.challenged = Some(ChallengeRecord { key, prior });
        }

        self.engine.reset();
        self.schedule(RespinKind::Full);
        true
    }

    /// The interruption overlay finished; nudge the wheel again
    pub fn interruption_complete(&mut self) -> bool {
        let Some(kind) = self.interruption.take() else {
            return false;
        };
        log::debug!("{:?} left the wheel", kind);
        self.engine.reset();
        self.schedule(RespinKind::Nudge);
        true
    }

    /// Dismiss the result: it becomes the last winner and last round's
    /// exclusion and challenge are undone.
    pub fn close_result(&mut self) {
        if let Some(key) = self.engine.result().map(str::to_string) {
            // Revert the challenge first: the challenged person may also be
            // the excluded last winner, and the restore has to win
            if let Some(challenged) = self.challenged.take() {
                self.store.set_override(&challenged.key, challenged.prior);
            }
            if let Some(last) = self.last_winner.take() {
                self.store.restore(&last);
            }
            log::info!("Round closed, last winner {}", key);
            self.last_winner = Some(key);
        }
        self.interruption_occurred = false;
        self.interruption = None;
        self.prompt = None;
        self.respin = None;
        self.engine.reset();
    }

    /// Reset button: wheel back to the start, all weights and history gone
    pub fn full_reset(&mut self) {
        self.engine.reset();
        self.engine.reset_rotation();
        self.store.reset_all();
        self.last_winner = None;
        self.challenged = None;
        self.prompt = None;
        self.interruption = None;
        self.interruption_occurred = false;
        self.respin = None;
        log::info!("Session reset");
    }

    /// Move the shown result to a neighbour
    pub fn shift(&mut self, direction: ShiftDirection) -> bool {
        if self.displayable_result().is_none() {
            return false;
        }
        let keys = self.store.roster().keys().to_vec();
        let shifted = self
            .engine
            .shift_result(direction, &keys, &self.store.weights());
        self.pump_events();
        shifted
    }

    /// Grab the wheel. Refused while an interruption is on screen.
    pub fn drag_start(&mut self) -> bool {
        if self.interruption.is_some() {
            log::debug!("Drag refused during interruption");
            return false;
        }
        if self.respin.take().is_some() {
            log::debug!("Pending re-spin dropped for drag");
        }
        let keys = self.store.roster().keys().to_vec();
        self.engine.drag_start(&keys, &self.store.weights());
        true
    }

    pub fn drag_delta(&mut self, delta: f64, timestamp_ms: f64) {
        self.engine.drag_delta(delta, timestamp_ms);
        self.pump_events();
    }

    pub fn drag_end(&mut self, timestamp_ms: f64) -> DragRelease {
        let keys = self.store.roster().keys().to_vec();
        let release = self
            .engine
            .drag_end(&keys, &self.store.weights(), timestamp_ms);
        self.pump_events();
        release
    }

    /// Participant under a screen point (context menu). Nothing while
    /// the wheel moves or an interruption is on screen.
    pub fn context_pick(&self, point: DVec2, center: DVec2, radius: f64) -> Option<String> {
        if self.engine.is_moving() || self.interruption.is_some() {
            return None;
        }
        let index = hit_test(&self.segments(), point, center, radius, self.engine.rotation())?;
        self.store.roster().get(index).map(str::to_string)
    }

    pub fn double_weight(&mut self, key: &str) {
        self.store.double(key);
    }

    pub fn remove(&mut self, key: &str) {
        let key = normalize_key(key);
        self.store.remove(&key);
        if self.last_winner.as_deref() == Some(key.as_str()) {
            self.last_winner = None;
        }
        if self.challenged.as_ref().is_some_and(|c| c.key == key) {
            self.challenged = None;
        }
    }

    /// Replace every weight override
    pub fn set_weights<I, S>(&mut self, weights: I)
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        self.store.set_weights(weights);
    }

    /// Replace the roster from raw input. Refused while the wheel moves.
    pub fn set_names(&mut self, raw: &str) -> bool {
        if self.engine.is_moving() {
            return false;
        }
        let roster = Roster::parse(raw, self.store.roster().with_honorific());
        log::debug!("Roster now has {} participants", roster.len());
        self.store.set_roster(roster);
        true
    }

    pub fn set_with_honorific(&mut self, value: bool) -> bool {
        if self.engine.is_moving() {
            return false;
        }
        self.store.set_with_honorific(value);
        true
    }

    /// Deliver a display frame
    pub fn on_frame(&mut self, timestamp_ms: f64) {
        if let Some(handle) = self.engine.pending_frame() {
            self.engine.on_frame(handle, timestamp_ms);
        }
        self.pump_events();
        self.tick_respin(timestamp_ms);
    }

    fn schedule(&mut self, kind: RespinKind) {
        self.respin = Some(PendingRespin {
            kind,
            armed_at: None,
        });
    }

    fn tick_respin(&mut self, timestamp_ms: f64) {
        let Some(respin) = self.respin.as_mut() else {
            return;
        };
        if !timestamp_ms.is_finite() {
            return;
        }
        let Some(armed_at) = respin.armed_at else {
            respin.armed_at = Some(timestamp_ms);
            return;
        };
        if timestamp_ms - armed_at < self.tuning.respin_delay_ms {
            return;
        }

        let kind = respin.kind;
        self.respin = None;
        let keys = self.store.roster().keys().to_vec();
        let weights = self.store.weights();
        let started = match kind {
            RespinKind::Full => self.engine.spin(&keys, &weights),
            RespinKind::Nudge => self.engine.nudge(&keys, &weights),
        };
        if !started {
            log::warn!("{:?} re-spin could not start", kind);
        }
    }

    fn pump_events(&mut self) {
        for event in self.engine.drain_events() {
            match event {
                SpinEvent::SegmentCrossed { .. } => self.audio.play(Cue::Click),
                SpinEvent::Resolved(resolution) => self.on_resolved(&resolution),
                SpinEvent::Shifted(resolution) => {
                    log::debug!("Showing {} after shift", resolution.key);
                }
                SpinEvent::Aborted => log::warn!("Spin aborted"),
            }
        }
    }

    fn on_resolved(&mut self, resolution: &Resolution) {
        if !self.interruption_occurred && self.rng.chance(self.tuning.interruption_probability) {
            let kind = if self.rng.chance(self.tuning.cat_share) {
                Interruption::Cat
            } else {
                Interruption::Duck
            };
            log::info!("{:?} interrupts the result {}", kind, resolution.key);
            self.interruption = Some(kind);
            self.interruption_occurred = true;
        } else {
            self.audio.play(Cue::Fanfare);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::audio::RecordingAudio;
    use crate::platform::SimulatedClock;
    use crate::polar_to_cartesian;
    use crate::random::ScriptedSource;

    fn session(names: &str, spins: &[f64], rolls: &[f64]) -> (Session, Rc<RefCell<Vec<Cue>>>) {
        let audio = RecordingAudio::new();
        let cues = audio.handle();
        let session = Session::new(
            Roster::parse(names, false),
            &Tuning::default(),
            Box::new(ScriptedSource::new(spins.iter().copied())),
            Box::new(ScriptedSource::new(rolls.iter().copied())),
            Box::new(audio),
        );
        (session, cues)
    }

    fn run(session: &mut Session, clock: &mut SimulatedClock) {
        let mut frames = 0;
        while session.needs_frame() {
            session.on_frame(clock.tick());
            frames += 1;
            assert!(frames < 10_000, "session never settled");
        }
    }

    fn fanfares(cues: &Rc<RefCell<Vec<Cue>>>) -> usize {
        cues.borrow().iter().filter(|c| **c == Cue::Fanfare).count()
    }

    /// Spin, resolve without interruption, close
    fn play_round(session: &mut Session, clock: &mut SimulatedClock) -> String {
        assert_eq!(session.start(), StartOutcome::Spinning);
        run(session, clock);
        let winner = session.displayable_result().unwrap().to_string();
        session.close_result();
        winner
    }

    #[test]
    fn test_round_without_interruption_plays_fanfare() {
        let (mut s, cues) = session("A\nB\nC", &[0.0, 0.0, 0.0], &[0.9]);
        assert_eq!(s.start(), StartOutcome::Spinning);
        assert_eq!(s.start(), StartOutcome::Refused);
        run(&mut s, &mut SimulatedClock::display());

        assert_eq!(s.displayable_result(), Some("A"));
        assert_eq!(s.interruption(), None);
        assert!(cues.borrow().contains(&Cue::Click));
        assert_eq!(cues.borrow().last(), Some(&Cue::Fanfare));
        assert_eq!(fanfares(&cues), 1);
    }

    #[test]
    fn test_start_refused_with_one_participant() {
        let (mut s, _) = session("A", &[], &[]);
        assert_eq!(s.start(), StartOutcome::Refused);
        assert!(!s.needs_frame());
    }

    #[test]
    fn test_no_exclusion_prompt_with_two_participants() {
        let (mut s, _) = session("A\nB", &[], &[0.9, 0.9]);
        let mut clock = SimulatedClock::display();
        assert_eq!(play_round(&mut s, &mut clock), "A");
        assert_eq!(s.last_winner(), Some("A"));
        assert_eq!(s.start(), StartOutcome::Spinning);
    }

    #[test]
    fn test_exclusion_prompt_then_restore_on_close() {
        let (mut s, _) = session("A\nB\nC", &[], &[0.9, 0.9, 0.9]);
        let mut clock = SimulatedClock::display();
        play_round(&mut s, &mut clock);

        assert_eq!(
            s.start(),
            StartOutcome::NeedsExclusionConfirm {
                last_winner: "A".into()
            }
        );
        assert_eq!(s.prompt(), Some(&Prompt::ExcludeLastWinner("A".into())));
        assert_eq!(s.confirm_exclusion(true), Ok(StartOutcome::Spinning));
        assert_eq!(s.weights(), vec![0.0, 1.0, 1.0]);
        assert_eq!(s.prompt(), None);

        run(&mut s, &mut clock);
        // A's slice is empty, so offset 0 belongs to B
        assert_eq!(s.displayable_result(), Some("B"));
        s.close_result();
        assert_eq!(s.weights(), vec![1.0, 1.0, 1.0]);
        assert_eq!(s.last_winner(), Some("B"));
    }

    #[test]
    fn test_keep_last_winner_spins_unchanged() {
        let (mut s, _) = session("A\nB\nC", &[], &[0.9, 0.9]);
        let mut clock = SimulatedClock::display();
        play_round(&mut s, &mut clock);
        assert!(matches!(s.start(), StartOutcome::NeedsExclusionConfirm { .. }));
        assert_eq!(s.confirm_exclusion(false), Ok(StartOutcome::Spinning));
        assert_eq!(s.weights(), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_exclusion_refused_when_nobody_would_remain() {
        let (mut s, _) = session("A\nB\nC", &[], &[0.9]);
        let mut clock = SimulatedClock::display();
        play_round(&mut s, &mut clock);
        assert!(matches!(s.start(), StartOutcome::NeedsExclusionConfirm { .. }));

        s.set_weights([("B", 0.0), ("C", 0.0)]);
        assert_eq!(
            s.confirm_exclusion(true),
            Err(RouletteError::CannotExclude("A".into()))
        );
        assert_eq!(s.store().weight("A"), 1.0);
        assert_eq!(s.engine().phase(), SpinPhase::Idle);
    }

    #[test]
    fn test_challenge_halves_winner_and_respins_after_delay() {
        let (mut s, _) = session("A\nB", &[], &[0.9, 0.9]);
        let mut clock = SimulatedClock::display();
        assert_eq!(s.start(), StartOutcome::Spinning);
        run(&mut s, &mut clock);
        assert_eq!(s.displayable_result(), Some("A"));

        assert!(s.challenge());
        assert_eq!(s.prompt(), Some(&Prompt::Challenge("A".into())));
        assert!(s.confirm_challenge(true));
        assert_eq!(s.weights(), vec![0.5, 1.0]);
        assert_eq!(s.engine().phase(), SpinPhase::Idle);
        assert!(s.needs_frame());

        // First frame arms the delay, the spin starts once 100 ms passed
        let armed = clock.advance(1000.0);
        s.on_frame(armed);
        s.on_frame(clock.advance(50.0));
        assert_eq!(s.engine().phase(), SpinPhase::Idle);
        s.on_frame(clock.advance(50.0));
        assert_eq!(s.engine().phase(), SpinPhase::Spinning);

        run(&mut s, &mut clock);
        assert_eq!(s.displayable_result(), Some("A"));
        s.close_result();
        assert_eq!(s.weights(), vec![1.0, 1.0]);
    }

    #[test]
    fn test_declined_challenge_respins_unchanged() {
        let (mut s, _) = session("A\nB", &[], &[0.9, 0.9]);
        let mut clock = SimulatedClock::display();
        s.start();
        run(&mut s, &mut clock);
        assert!(s.challenge());
        assert!(s.confirm_challenge(false));
        assert_eq!(s.weights(), vec![1.0, 1.0]);
        assert!(s.needs_frame());
        run(&mut s, &mut clock);
        assert!(s.displayable_result().is_some());
    }

    #[test]
    fn test_new_challenge_reverts_previous_challenged() {
        // Second spin: extra 0.6 turns puts the pointer at offset 144, in B
        let (mut s, _) = session("A\nB\nC", &[0.0, 0.0, 0.0, 0.0, 0.6, 0.0], &[0.9, 0.9]);
        let mut clock = SimulatedClock::display();
        s.double_weight("A");
        s.start();
        run(&mut s, &mut clock);
        assert_eq!(s.displayable_result(), Some("A"));

        assert!(s.challenge());
        assert!(s.confirm_challenge(true));
        assert_eq!(s.weights(), vec![1.0, 1.0, 1.0]);
        run(&mut s, &mut clock);
        assert_eq!(s.displayable_result(), Some("B"));

        assert!(s.challenge());
        assert!(s.confirm_challenge(true));
        // A is back to its doubled weight, not reset to the default
        assert_eq!(s.weights(), vec![2.0, 0.5, 1.0]);
    }

    #[test]
    fn test_interruption_hides_result_until_nudge_resolves() {
        // Exhausted rolls fall back to 0.0, which would interrupt again
        let (mut s, cues) = session("A\nB", &[], &[0.1, 0.2]);
        let mut clock = SimulatedClock::display();
        s.start();
        run(&mut s, &mut clock);

        assert_eq!(s.interruption(), Some(Interruption::Cat));
        assert_eq!(s.displayable_result(), None);
        assert!(!s.challenge());
        assert_eq!(s.start(), StartOutcome::Refused);
        assert_eq!(fanfares(&cues), 0);

        clock.advance(s.interruption_duration_ms());
        assert!(s.interruption_complete());
        assert!(!s.interruption_complete());
        s.on_frame(clock.tick());
        s.on_frame(clock.advance(100.0));
        let duration = s.engine().animation_duration().unwrap();
        assert!((2000.0..3000.0).contains(&duration));

        run(&mut s, &mut clock);
        assert_eq!(s.interruption(), None);
        assert!(s.displayable_result().is_some());
        assert_eq!(fanfares(&cues), 1);
    }

    #[test]
    fn test_interruption_stays_spent_until_round_closes() {
        let (mut s, _) = session("A\nB", &[], &[0.1, 0.7]);
        let mut clock = SimulatedClock::display();
        s.start();
        run(&mut s, &mut clock);
        assert_eq!(s.interruption(), Some(Interruption::Duck));
        s.interruption_complete();
        run(&mut s, &mut clock);
        assert!(s.displayable_result().is_some());

        // A challenge re-spin is still part of the same round
        assert!(s.challenge());
        assert!(s.confirm_challenge(true));
        run(&mut s, &mut clock);
        assert_eq!(s.interruption(), None);
        assert!(s.displayable_result().is_some());

        s.close_result();
        s.start();
        run(&mut s, &mut clock);
        assert_eq!(s.interruption(), Some(Interruption::Cat));
    }

    #[test]
    fn test_drag_refused_during_interruption() {
        let (mut s, cues) = session("A\nB", &[], &[0.1, 0.2]);
        let center = DVec2::new(320.0, 320.0);
        s.start();
        run(&mut s, &mut SimulatedClock::display());
        assert_eq!(s.interruption(), Some(Interruption::Cat));

        assert!(!s.drag_start());
        s.drag_delta(-0.1, 0.0);
        s.drag_delta(-0.1, 50.0);
        let release = s.drag_end(50.0);
        assert_eq!(release.velocity, 0.0);
        assert_eq!(s.engine().phase(), SpinPhase::Resolved);
        assert_eq!(s.interruption(), Some(Interruption::Cat));
        assert_eq!(fanfares(&cues), 0);
        let under_pointer = center + polar_to_cartesian(100.0, -90.0);
        assert_eq!(s.context_pick(under_pointer, center, 300.0), None);
    }

    #[test]
    fn test_excluded_winner_challenged_after_shift_comes_back() {
        let (mut s, _) = session("A\nB\nC", &[], &[0.9, 0.9, 0.9]);
        let mut clock = SimulatedClock::display();
        assert_eq!(play_round(&mut s, &mut clock), "A");

        assert!(matches!(s.start(), StartOutcome::NeedsExclusionConfirm { .. }));
        assert_eq!(s.confirm_exclusion(true), Ok(StartOutcome::Spinning));
        run(&mut s, &mut clock);
        assert_eq!(s.displayable_result(), Some("B"));

        // Shift back onto the excluded A and challenge them
        assert!(s.shift(ShiftDirection::Previous));
        assert_eq!(s.displayable_result(), Some("A"));
        assert!(s.challenge());
        assert!(s.confirm_challenge(true));
        assert_eq!(s.weights(), vec![0.0, 1.0, 1.0]);
        run(&mut s, &mut clock);
        assert_eq!(s.displayable_result(), Some("B"));

        s.close_result();
        assert_eq!(s.weights(), vec![1.0, 1.0, 1.0]);
        assert_eq!(s.last_winner(), Some("B"));
    }

    #[test]
    fn test_full_reset_clears_everything() {
        let (mut s, _) = session("A\nB\nC", &[0.3, 0.3, 0.3], &[0.9]);
        let mut clock = SimulatedClock::display();
        s.double_weight("C");
        play_round(&mut s, &mut clock);
        assert!(s.rotation() != 0.0);

        s.full_reset();
        assert_eq!(s.rotation(), 0.0);
        assert_eq!(s.weights(), vec![1.0, 1.0, 1.0]);
        assert_eq!(s.last_winner(), None);
        assert_eq!(s.engine().phase(), SpinPhase::Idle);
        assert_eq!(s.start(), StartOutcome::Spinning);
    }

    #[test]
    fn test_context_pick_agrees_with_pointer() {
        let (mut s, _) = session("A\nB\nC\nD", &[0.2, 0.45, 0.7], &[0.9]);
        let center = DVec2::new(320.0, 320.0);
        s.start();
        let under_pointer = center + polar_to_cartesian(100.0, -90.0);
        assert_eq!(s.context_pick(under_pointer, center, 300.0), None);

        run(&mut s, &mut SimulatedClock::display());
        let winner = s.displayable_result().map(str::to_string);
        assert_eq!(s.context_pick(under_pointer, center, 300.0), winner);
        let outside = center + polar_to_cartesian(400.0, -90.0);
        assert_eq!(s.context_pick(outside, center, 300.0), None);
    }

    #[test]
    fn test_slow_drag_resolves_in_place() {
        let (mut s, cues) = session("A\nB", &[], &[0.9]);
        assert!(s.drag_start());
        s.drag_delta(-0.1, 0.0);
        s.drag_delta(-0.1, 50.0);
        let release = s.drag_end(50.0);
        assert!(release.inertia.is_none());
        assert!(!s.needs_frame());
        assert_eq!(s.displayable_result(), Some("A"));
        assert_eq!(fanfares(&cues), 1);
    }

    #[test]
    fn test_shift_moves_displayed_result() {
        let (mut s, _) = session("A\nB\nC", &[], &[0.9]);
        assert!(!s.shift(ShiftDirection::Next));
        s.start();
        run(&mut s, &mut SimulatedClock::display());
        assert!(s.shift(ShiftDirection::Previous));
        assert_eq!(s.displayable_result(), Some("C"));
    }

    #[test]
    fn test_names_locked_while_spinning() {
        let (mut s, _) = session("A\nB", &[], &[0.9]);
        s.start();
        assert!(!s.set_names("X\nY\nZ"));
        assert!(!s.set_with_honorific(true));
        run(&mut s, &mut SimulatedClock::display());
        assert!(s.set_names("A\nB\nZ"));
        assert!(s.set_with_honorific(true));
        assert_eq!(s.display_name("Z"), "Zさん");
    }

    #[test]
    fn test_remove_forgets_last_winner() {
        let (mut s, _) = session("A\nB\nC", &[], &[0.9]);
        play_round(&mut s, &mut SimulatedClock::display());
        s.remove("Aさん");
        assert_eq!(s.last_winner(), None);
        assert_eq!(s.roster().keys(), ["B", "C"]);
        assert_eq!(s.start(), StartOutcome::Spinning);
    }

    #[test]
    fn test_snapshot_restores_last_winner() {
        let (mut s, _) = session("A\nB\nC", &[], &[0.9]);
        play_round(&mut s, &mut SimulatedClock::display());
        let json = s.snapshot().to_json().unwrap();

        let snapshot = ShareSnapshot::from_json(&json).unwrap();
        let mut resumed = Session::from_snapshot(&snapshot, &Tuning::default(), 7);
        assert_eq!(resumed.last_winner(), Some("A"));
        assert_eq!(resumed.roster().keys(), ["A", "B", "C"]);
        assert!(matches!(
            resumed.start(),
            StartOutcome::NeedsExclusionConfirm { .. }
        ));
    }
}
