//! Blocking audio playback using cpal
//!
//! One-shot playback: the whole signal is pre-loaded into a lock-free ring
//! buffer, the output stream drains it, and the caller blocks until the last
//! sample has been handed to the device.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleRate, StreamConfig};
use ringbuf::HeapRb;
use thiserror::Error;

use crate::buffer::AudioBuffer;

/// Poll interval while waiting for the stream to drain
const DRAIN_POLL: Duration = Duration::from_millis(10);

/// Grace period after the ring buffer empties, covering device latency
const DEVICE_TAIL: Duration = Duration::from_millis(150);

#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("no audio output device found")]
    NoDevice,

    #[error("failed to get device name: {0}")]
    DeviceName(String),

    #[error("failed to get default output config: {0}")]
    DefaultConfig(String),

    #[error("failed to build output stream: {0}")]
    BuildStream(String),

    #[error("failed to play output stream: {0}")]
    PlayStream(String),

    #[error("playback stalled before the signal finished")]
    Stalled,
}

/// Playback capability
///
/// Injected into the session so the pipeline can run and be tested without
/// audio hardware. `play` blocks until the buffer has finished playing.
pub trait Player {
    fn play(&mut self, buffer: &AudioBuffer) -> Result<(), DeviceError>;
}

/// Player backed by the default cpal output device
///
/// The stream is opened at the buffer's own sample rate; mono samples are
/// duplicated across the device's output channels. Stream and device handles
/// live only for the duration of a single `play` call.
pub struct CpalPlayer;

impl CpalPlayer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CpalPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Player for CpalPlayer {
    fn play(&mut self, buffer: &AudioBuffer) -> Result<(), DeviceError> {
        if buffer.is_empty() {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(DeviceError::NoDevice)?;

        let name = device
            .name()
            .map_err(|e| DeviceError::DeviceName(e.to_string()))?;

        let channels = device
            .default_output_config()
            .map_err(|e| DeviceError::DefaultConfig(e.to_string()))?
            .channels();

        let config = StreamConfig {
            channels,
            sample_rate: SampleRate(buffer.sample_rate()),
            buffer_size: BufferSize::Default,
        };

        // Pre-load the whole signal; the callback only drains
        let rb = HeapRb::<f32>::new(buffer.len());
        let (mut producer, mut consumer) = rb.split();
        let samples: Vec<f32> = buffer.samples().iter().map(|&s| s as f32).collect();
        producer.push_slice(&samples);

        let done = Arc::new(AtomicBool::new(false));
        let done_cb = Arc::clone(&done);
        let frame_width = channels as usize;

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for frame in data.chunks_mut(frame_width) {
                        match consumer.pop() {
                            Some(sample) => frame.fill(sample),
                            None => {
                                frame.fill(0.0);
                                done_cb.store(true, Ordering::Release);
                            }
                        }
                    }
                },
                move |err| {
                    log::warn!("audio output error: {}", err);
                },
                None,
            )
            .map_err(|e| DeviceError::BuildStream(e.to_string()))?;

        stream
            .play()
            .map_err(|e| DeviceError::PlayStream(e.to_string()))?;

        log::info!(
            "playing {:.2} s at {} Hz on '{}'",
            buffer.duration_secs(),
            buffer.sample_rate(),
            name
        );

        // Block until the ring buffer drains; bail out if the device stops
        // asking for samples
        let deadline =
            Instant::now() + Duration::from_secs_f64(buffer.duration_secs()) + Duration::from_secs(2);
        while !done.load(Ordering::Acquire) {
            if Instant::now() > deadline {
                return Err(DeviceError::Stalled);
            }
            thread::sleep(DRAIN_POLL);
        }
        thread::sleep(DEVICE_TAIL);

        Ok(())
    }
}
