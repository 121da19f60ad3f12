//! Web Audio tone synthesis. The context is created lazily on the first tone,
//! which always follows a user gesture, so autoplay policies don't block it.

use web_sys::{AudioContext, OscillatorType};

use crate::capabilities::{Sweep, Tone, ToneEmitter};
use crate::error::MascotError;

const PEAK_GAIN: f32 = 0.2;
const FLOOR_GAIN: f32 = 0.001;

#[derive(Default)]
pub struct WebTones {
    ctx: Option<AudioContext>,
    /// Set after the context failed to open; stops retrying every click.
    unavailable: bool,
}

impl WebTones {
    fn context(&mut self) -> Result<&AudioContext, MascotError> {
        if self.ctx.is_none() {
            let ctx = AudioContext::new().map_err(MascotError::audio)?;
            self.ctx = Some(ctx);
        }
        self.ctx
            .as_ref()
            .ok_or_else(|| MascotError::Audio("context not created".to_owned()))
    }

    fn try_play(&mut self, tone: Tone) -> Result<(), MascotError> {
        let ctx = self.context()?;
        let t0 = ctx.current_time();
        for sweep in tone.sweeps() {
            schedule_sweep(ctx, t0, sweep)?;
        }
        Ok(())
    }
}

impl ToneEmitter for WebTones {
    fn play(&mut self, tone: Tone) {
        if self.unavailable {
            return;
        }
        if let Err(err) = self.try_play(tone) {
            log::debug!("tone {tone:?} skipped: {err}");
            if self.ctx.is_none() {
                self.unavailable = true;
            }
        }
    }
}

fn schedule_sweep(ctx: &AudioContext, t0: f64, sweep: &Sweep) -> Result<(), MascotError> {
    let start = t0 + sweep.delay_ms / 1000.0;
    let end = start + sweep.duration_ms / 1000.0;

    let osc = ctx.create_oscillator().map_err(MascotError::audio)?;
    osc.set_type(OscillatorType::Sine);
    let freq = osc.frequency();
    freq.set_value_at_time(sweep.start_hz as f32, start)
        .map_err(MascotError::audio)?;
    freq.exponential_ramp_to_value_at_time(sweep.end_hz as f32, end)
        .map_err(MascotError::audio)?;

    let gain = ctx.create_gain().map_err(MascotError::audio)?;
    let level = gain.gain();
    level.set_value_at_time(PEAK_GAIN, start).map_err(MascotError::audio)?;
    level
        .exponential_ramp_to_value_at_time(FLOOR_GAIN, end)
        .map_err(MascotError::audio)?;

    osc.connect_with_audio_node(&gain).map_err(MascotError::audio)?;
    gain.connect_with_audio_node(&ctx.destination())
        .map_err(MascotError::audio)?;
    osc.start_with_when(start).map_err(MascotError::audio)?;
    osc.stop_with_when(end).map_err(MascotError::audio)?;
    Ok(())
}
