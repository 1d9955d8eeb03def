//! Audible scan confirmation
//!
//! `BellCue` rings the terminal bell and works everywhere. With the `tone`
//! feature, `ToneCue` plays a short sine beep on the default output device
//! using cpal.

use super::AudioCue;
use anyhow::Result;
use std::io::{self, Write};

/// Terminal bell
pub struct BellCue<W: Write = io::Stdout> {
    out: W,
}

impl BellCue<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> BellCue<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> AudioCue for BellCue<W> {
    fn play(&mut self) -> Result<()> {
        self.out.write_all(b"\x07")?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(feature = "tone")]
pub use tone::ToneCue;

#[cfg(feature = "tone")]
mod tone {
    use super::AudioCue;
    use anyhow::{Result, anyhow};
    use cpal::SampleFormat;
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use log::{error, info};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc::{SyncSender, TrySendError, sync_channel};
    use std::thread;
    use std::time::Duration;

    /// Sine beep on the default output device
    ///
    /// cpal streams are not `Send`, so the stream lives on its own thread and
    /// `play` only arms a sample counter over a channel.
    pub struct ToneCue {
        trigger: SyncSender<()>,
    }

    impl ToneCue {
        pub fn start(frequency: f32, length: Duration) -> Result<Self> {
            let (ready_tx, ready_rx) = sync_channel::<Result<()>>(1);
            let (trigger_tx, trigger_rx) = sync_channel::<()>(4);

            thread::spawn(move || {
                let remaining = Arc::new(AtomicUsize::new(0));

                let (stream, sample_rate) = match build_stream(frequency, remaining.clone()) {
                    Ok(built) => built,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                if let Err(e) = stream.play() {
                    let _ = ready_tx.send(Err(anyhow!("Failed to start audio stream: {}", e)));
                    return;
                }
                let _ = ready_tx.send(Ok(()));

                let frames = (sample_rate as f64 * length.as_secs_f64()) as usize;
                while trigger_rx.recv().is_ok() {
                    remaining.store(frames, Ordering::Relaxed);
                }

                info!("Audio cue stopped");
            });

            ready_rx
                .recv()
                .map_err(|_| anyhow!("Audio thread exited during setup"))??;

            Ok(Self {
                trigger: trigger_tx,
            })
        }
    }

    fn build_stream(
        frequency: f32,
        remaining: Arc<AtomicUsize>,
    ) -> Result<(cpal::Stream, u32)> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("No default output device found"))?;
        let config = device
            .default_output_config()
            .map_err(|e| anyhow!("Failed to get default output config: {}", e))?;

        info!("Audio cue config: {:?}", config);

        if config.sample_format() != SampleFormat::F32 {
            return Err(anyhow!(
                "Unsupported sample format: {:?}",
                config.sample_format()
            ));
        }

        let sample_rate = config.sample_rate();
        let channels = config.channels() as usize;
        let step = frequency * 2.0 * std::f32::consts::PI / sample_rate as f32;
        let mut phase = 0.0f32;

        let err_fn = |err: cpal::StreamError| error!("Audio stream error: {}", err);

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    let value = if remaining.load(Ordering::Relaxed) > 0 {
                        remaining.fetch_sub(1, Ordering::Relaxed);
                        phase = (phase + step) % (2.0 * std::f32::consts::PI);
                        phase.sin() * 0.2
                    } else {
                        phase = 0.0;
                        0.0
                    };
                    for sample in frame.iter_mut() {
                        *sample = value;
                    }
                }
            },
            err_fn,
            None,
        )?;

        Ok((stream, sample_rate))
    }

    impl AudioCue for ToneCue {
        fn play(&mut self) -> Result<()> {
            match self.trigger.try_send(()) {
                Ok(()) | Err(TrySendError::Full(())) => Ok(()),
                Err(TrySendError::Disconnected(())) => Err(anyhow!("Audio cue thread has stopped")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bell_writes_bel() {
        let mut cue = BellCue::new(Vec::new());
        cue.play().unwrap();
        cue.play().unwrap();
        assert_eq!(cue.into_inner(), b"\x07\x07");
    }
}
