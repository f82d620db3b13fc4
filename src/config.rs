//! Output configuration shared by the engine and its hosts.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, BUFFER_LIMIT};

pub const MIN_RATE: u32 = 200;
pub const MAX_RATE: u32 = 200_000;
pub const MAX_CHANNELS: usize = 8;

/// Sample rate and interleaved channel count of the output.
///
/// Every channel carries the same mono signal; there is no panning.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthConfig {
    pub rate: u32,
    pub channels: usize,
}

impl SynthConfig {
    pub fn new(rate: u32, channels: usize) -> Result<Self, ConfigError> {
        let config = Self { rate, channels };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_RATE..=MAX_RATE).contains(&self.rate) {
            return Err(ConfigError::Rate(self.rate));
        }
        if !(1..=MAX_CHANNELS).contains(&self.channels) {
            return Err(ConfigError::Channels(self.channels));
        }
        Ok(())
    }

    /// Interleaved samples per generation chunk: [`BUFFER_LIMIT`] rounded down to
    /// whole frames.
    pub fn buffer_limit(&self) -> usize {
        (BUFFER_LIMIT / self.channels) * self.channels
    }

    pub fn frames_per_ms(&self) -> f32 {
        self.rate as f32 / 1000.0
    }
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            rate: 44_100,
            channels: 2,
        }
    }
}
