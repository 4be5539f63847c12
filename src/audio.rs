//! Audio cues
//!
//! The engine never plays sound itself. It emits cues to an [`AudioSink`]
//! and moves on; a web host can turn the tone list into oscillators, the
//! headless demo just logs them.

use std::cell::RefCell;
use std::rc::Rc;

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// A segment boundary passed the pointer
    Click,
    /// A result is on display
    Fanfare,
}

/// Oscillator waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
}

/// One note of a cue
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub freq: f32,
    pub waveform: Waveform,
    /// Start offset from the cue (seconds)
    pub at: f32,
    pub duration: f32,
    /// Peak gain before the exponential decay
    pub gain: f32,
}

const CLICK: [Tone; 1] = [Tone {
    freq: 800.0,
    waveform: Waveform::Square,
    at: 0.0,
    duration: 0.05,
    gain: 0.1,
}];

// C5 E5 G5 C6
const FANFARE: [Tone; 4] = [
    Tone { freq: 523.25, waveform: Waveform::Sine, at: 0.0, duration: 0.15, gain: 0.2 },
    Tone { freq: 659.25, waveform: Waveform::Sine, at: 0.15, duration: 0.15, gain: 0.2 },
    Tone { freq: 783.99, waveform: Waveform::Sine, at: 0.3, duration: 0.15, gain: 0.2 },
    Tone { freq: 1046.5, waveform: Waveform::Sine, at: 0.45, duration: 0.4, gain: 0.2 },
];

impl Cue {
    /// Notes that make up this cue
    pub fn tones(&self) -> &'static [Tone] {
        match self {
            Cue::Click => &CLICK,
            Cue::Fanfare => &FANFARE,
        }
    }
}

/// Fire-and-forget cue consumer
pub trait AudioSink {
    fn play(&mut self, cue: Cue);
}

/// Discards every cue
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _cue: Cue) {}
}

/// Logs cues with their volume
#[derive(Debug, Clone)]
pub struct LogAudio {
    master_volume: f32,
}

impl Default for LogAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl LogAudio {
    pub fn new() -> Self {
        Self { master_volume: 0.8 }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

}

impl AudioSink for LogAudio {
    fn play(&mut self, cue: Cue) {
        let vol = self.master_volume;
        if vol <= 0.0 {
            return;
        }
        match cue {
            // Clicks fire dozens of times per spin
            Cue::Click => log::trace!("cue {:?} at volume {:.2}", cue, vol),
            Cue::Fanfare => log::info!("cue {:?} at volume {:.2}", cue, vol),
        }
    }
}

/// Records cues into a shared list (tests, demo statistics)
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    cues: Rc<RefCell<Vec<Cue>>>,
}

impl RecordingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle that keeps seeing cues after the sink is boxed away
    pub fn handle(&self) -> Rc<RefCell<Vec<Cue>>> {
        Rc::clone(&self.cues)
    }
}

impl AudioSink for RecordingAudio {
    fn play(&mut self, cue: Cue) {
        self.cues.borrow_mut().push(cue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fanfare_notes_are_sequential() {
        let tones = Cue::Fanfare.tones();
        assert_eq!(tones.len(), 4);
        for pair in tones.windows(2) {
            assert!(pair[1].at >= pair[0].at + pair[0].duration - 1e-6);
        }
        assert_eq!(Cue::Click.tones()[0].waveform, Waveform::Square);
    }

    #[test]
    fn test_recording_handle_sees_boxed_cues() {
        let recorder = RecordingAudio::new();
        let cues = recorder.handle();
        let mut sink: Box<dyn AudioSink> = Box::new(recorder);
        sink.play(Cue::Click);
        sink.play(Cue::Fanfare);
        assert_eq!(*cues.borrow(), vec![Cue::Click, Cue::Fanfare]);
    }

    #[test]
    fn test_master_volume_is_clamped() {
        let mut audio = LogAudio::new();
        audio.set_master_volume(2.0);
        assert_eq!(audio.master_volume, 1.0);
        audio.set_master_volume(-1.0);
        assert_eq!(audio.master_volume, 0.0);
    }
}
