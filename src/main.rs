//! Name Roulette entry point
//!
//! Headless demo: plays a few rounds against a simulated 60 Hz display
//! and prints the winners. Names come from the command line (one per
//! argument) or a built-in list.

use name_roulette::audio::{AudioSink, LogAudio, NullAudio};
use name_roulette::platform::SimulatedClock;
use name_roulette::random::PcgSource;
use name_roulette::session::StartOutcome;
use name_roulette::{Roster, Session, Tuning};

const DEFAULT_NAMES: &str = "Taro\nHanako\nJiro\nSakura";
const ROUNDS: usize = 3;
const SEED_ENV_VAR: &str = "NAME_ROULETTE_SEED";
/// Cue volume in [0, 1]; 0 silences cues entirely
const VOLUME_ENV_VAR: &str = "NAME_ROULETTE_VOLUME";

fn main() {
    env_logger::init();
    log::info!("Name Roulette (headless) starting...");

    let tuning = Tuning::load_or_default();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let raw = if args.is_empty() {
        DEFAULT_NAMES.to_string()
    } else {
        args.join("\n")
    };
    let seed = std::env::var(SEED_ENV_VAR)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(2024);

    let roster = Roster::parse(&raw, true);
    if roster.len() < 2 {
        eprintln!("Need at least two names, got {}", roster.len());
        std::process::exit(1);
    }

    let mut session = Session::new(
        roster,
        &tuning,
        Box::new(PcgSource::new(seed)),
        Box::new(PcgSource::new(seed.wrapping_add(1))),
        audio_sink(),
    );
    let mut clock = SimulatedClock::display();

    for round in 1..=ROUNDS {
        match play_round(&mut session, &mut clock, round == 2) {
            Some(winner) => println!("Round {}: {}", round, session.display_name(&winner)),
            None => println!("Round {}: no result", round),
        }
        session.close_result();
    }

    match session.snapshot().to_json() {
        Ok(json) => println!("Share: {}", json),
        Err(e) => log::error!("Snapshot failed: {}", e),
    }
}

fn audio_sink() -> Box<dyn AudioSink> {
    let volume = std::env::var(VOLUME_ENV_VAR)
        .ok()
        .and_then(|v| v.parse::<f32>().ok());
    match volume {
        Some(v) if v <= 0.0 => Box::new(NullAudio),
        Some(v) => {
            let mut audio = LogAudio::new();
            audio.set_master_volume(v);
            Box::new(audio)
        }
        None => Box::new(LogAudio::new()),
    }
}

/// Run one round to a displayable result
fn play_round(session: &mut Session, clock: &mut SimulatedClock, challenge: bool) -> Option<String> {
    match session.start() {
        StartOutcome::Spinning => {}
        StartOutcome::NeedsExclusionConfirm { last_winner } => {
            log::info!("Excluding last winner {}", last_winner);
            if let Err(e) = session.confirm_exclusion(true) {
                log::warn!("{}, spinning without exclusion", e);
                if session.start() != StartOutcome::Spinning {
                    return None;
                }
            }
        }
        StartOutcome::Refused => return None,
    }

    settle(session, clock);
    if challenge && session.challenge() {
        println!("Challenge!");
        session.confirm_challenge(true);
        settle(session, clock);
    }
    session.displayable_result().map(str::to_string)
}

/// Pump frames until the wheel stops and any interruption has played out
fn settle(session: &mut Session, clock: &mut SimulatedClock) {
    loop {
        while session.needs_frame() {
            session.on_frame(clock.tick());
        }
        let Some(kind) = session.interruption() else {
            return;
        };
        println!("A {:?} jumps on the wheel!", kind);
        clock.advance(session.interruption_duration_ms());
        session.interruption_complete();
    }
}
