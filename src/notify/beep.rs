//! Reminder beep tone via cpal.

use crate::config::BeepConfig;
use crate::error::{ClassbellError, Result};
use cpal::StreamConfig;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};
use tracing::debug;

const SAMPLE_RATE: u32 = 44_100;

/// Play the reminder tone, fire-and-forget.
///
/// Spawns a short-lived thread; any audio failure (no device, stream error)
/// is logged at debug level and otherwise ignored.
pub fn play_beep(config: &BeepConfig) {
    if !config.enabled {
        return;
    }
    let config = config.clone();
    std::thread::spawn(move || {
        if let Err(e) = play_tone(&config) {
            debug!("reminder beep unavailable: {e}");
        }
    });
}

/// Synthesize and play one sine tone, blocking until it finishes.
fn play_tone(config: &BeepConfig) -> Result<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| ClassbellError::Notify("no default output device".into()))?;

    let stream_config = StreamConfig {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        buffer_size: cpal::BufferSize::Default,
    };

    let total_frames = (u64::from(SAMPLE_RATE) * config.duration_ms / 1_000) as usize;
    let state = Arc::new(Mutex::new(ToneState {
        frame: 0,
        total_frames,
        finished: false,
    }));
    let callback_state = Arc::clone(&state);

    let step = std::f32::consts::TAU * config.frequency_hz / SAMPLE_RATE as f32;
    let gain = config.gain.clamp(0.0, 1.0);

    let stream = device
        .build_output_stream(
            &stream_config,
            move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                let mut tone = match callback_state.lock() {
                    Ok(t) => t,
                    Err(_) => return,
                };
                for sample in data.iter_mut() {
                    if tone.frame < tone.total_frames {
                        *sample = (tone.frame as f32 * step).sin() * gain;
                        tone.frame += 1;
                    } else {
                        *sample = 0.0;
                        tone.finished = true;
                    }
                }
            },
            move |err| {
                debug!("beep output stream error: {err}");
            },
            None,
        )
        .map_err(|e| ClassbellError::Notify(format!("failed to build output stream: {e}")))?;

    stream
        .play()
        .map_err(|e| ClassbellError::Notify(format!("failed to start output stream: {e}")))?;

    loop {
        std::thread::sleep(std::time::Duration::from_millis(10));
        let tone = state
            .lock()
            .map_err(|e| ClassbellError::Notify(format!("tone state lock poisoned: {e}")))?;
        if tone.finished {
            break;
        }
    }

    drop(stream);
    Ok(())
}

/// Playback progress for one tone.
struct ToneState {
    frame: usize,
    total_frames: usize,
    finished: bool,
}
