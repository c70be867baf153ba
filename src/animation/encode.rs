//! GIF assembly and output
//!
//! Frames are encoded into memory first and the finished file is moved into
//! place in one step, so a failed run never leaves a truncated GIF at the
//! destination.

use crate::error::{MorphError, Result};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// GIF delays are stored in hundredths of a second
pub const GIF_TIME_UNIT_MS: u32 = 10;

/// Timing and encoder settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GifSettings {
    /// Display time of every frame in milliseconds
    pub frame_duration_ms: u32,
    /// Loop forever; when false the animation plays once
    pub repeat: bool,
    /// Color quantization speed, 1 (best) to 30 (fastest)
    pub speed: i32,
}

impl Default for GifSettings {
    fn default() -> Self {
        Self {
            frame_duration_ms: 40,
            repeat: true,
            speed: 10,
        }
    }
}

impl GifSettings {
    pub fn validate(&self) -> Result<()> {
        if self.frame_duration_ms < GIF_TIME_UNIT_MS {
            return Err(MorphError::invalid_parameter(
                "frame_duration_ms",
                self.frame_duration_ms,
                "must be at least 10 ms (GIF timing resolution)",
            ));
        }
        if !(1..=30).contains(&self.speed) {
            return Err(MorphError::invalid_parameter(
                "speed",
                self.speed,
                "must be in 1..=30",
            ));
        }
        Ok(())
    }

    fn delay(&self) -> Delay {
        Delay::from_numer_denom_ms(self.frame_duration_ms, 1)
    }
}

/// Encode `frames` in order into an in-memory GIF.
///
/// Frames are pulled one at a time, so a lazy iterator keeps at most one
/// rendered frame alive. Every frame must have the size of the first one.
/// Returns the encoded bytes and the number of frames written.
pub fn encode_gif<I>(frames: I, settings: &GifSettings) -> Result<(Vec<u8>, usize)>
where
    I: IntoIterator<Item = Result<RgbaImage>>,
{
    settings.validate()?;

    let mut bytes = Vec::new();
    let mut count = 0usize;
    {
        let mut encoder = GifEncoder::new_with_speed(&mut bytes, settings.speed);
        if settings.repeat {
            encoder.set_repeat(Repeat::Infinite)?;
        }

        let mut size = None;
        for frame in frames {
            let frame = frame?;
            let dims = frame.dimensions();
            match size {
                None => size = Some(dims),
                Some(expected) if expected != dims => {
                    return Err(MorphError::EncodingError(format!(
                        "frame {} is {}x{}, expected {}x{}",
                        count, dims.0, dims.1, expected.0, expected.1
                    )));
                }
                Some(_) => {}
            }
            encoder.encode_frame(Frame::from_parts(frame, 0, 0, settings.delay()))?;
            count += 1;
        }
        // Dropping the encoder writes the GIF trailer
    }

    if count == 0 {
        return Err(MorphError::InsufficientData(
            "no frames to encode".to_string(),
        ));
    }

    debug!(frames = count, bytes = bytes.len(), "Encoded GIF");
    Ok((bytes, count))
}

/// Write `bytes` to `path` through a temporary file in the same directory.
///
/// The destination is either left untouched or fully replaced.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

/// Encode `frames` and write the GIF to `path`. Returns the frame count.
pub fn save_gif<I>(frames: I, settings: &GifSettings, path: &Path) -> Result<usize>
where
    I: IntoIterator<Item = Result<RgbaImage>>,
{
    let (bytes, count) = encode_gif(frames, settings)?;
    write_atomic(path, &bytes)?;
    Ok(count)
}
