//! This module defines structures and enumerations based on the TOC.
//! TOC (Table of Contents) signals which of the various modes and
//! configurations a packet uses for coding one or multiple isoconfig
//! Opus frames upto 120 ms (Code 3 only).
//!
//! See [RFC 6716, Section 3.1][1].
//!
//! [1]: (https://datatracker.ietf.org/doc/html/rfc6716#section-3.1)

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Operating mode used for packet coding.
pub enum Mode {
    /// [SILK][2]-only mode for use in low bitrate with wide-band or
    /// more narrow bandwidth connections.
    ///
    /// [2]: https://en.wikipedia.org/wiki/SILK
    SILK,
    /// [CELT][3]-only mode for very low delay speech transmission as well
    /// as music transmission narrow-band to full-band.
    ///
    /// [3]: https://en.wikipedia.org/wiki/CELT
    CELT,
    /// Hybrid (SILK+CELT) mode for super-wide-band or full-band speech at
    /// medium bitrates.
    Hybrid,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Bandwidth of the transmitted signal.
pub enum Bandwidth {
    /// 0-4 kHz (8 kHz samplerate).
    Narrow,
    /// 0-6 kHz (12 kHz samplerate).
    Medium,
    /// 0-8 kHz (16 kHz samplerate).
    Wide,
    /// 0-12 kHz (24 kHz samplerate).
    SuperWide,
    /// 0-20 kHz (48 kHz samplerate).
    ///
    /// Although the [sampling theorem][4] allows a bandwidth as large as half
    /// the sampling rate, Opus never codes audio above 20 kHz, as that is
    /// the generally accepted upper limit of human hearing.
    ///
    /// [4]: https://en.wikipedia.org/wiki/Nyquist%E2%80%93Shannon_sampling_theorem
    FullBand,
}

impl Bandwidth {
    /// Audio bandwidth in Hz.
    pub fn hz(self) -> u32 {
        match self {
            Bandwidth::Narrow => 4000,
            Bandwidth::Medium => 6000,
            Bandwidth::Wide => 8000,
            Bandwidth::SuperWide => 12000,
            Bandwidth::FullBand => 20000,
        }
    }

    /// Effective sample rate for the bandwidth.
    pub fn sample_rate(self) -> u32 {
        match self {
            Bandwidth::Narrow => 8000,
            Bandwidth::Medium => 12000,
            Bandwidth::Wide => 16000,
            Bandwidth::SuperWide => 24000,
            Bandwidth::FullBand => 48000,
        }
    }
}

/// TOC configuration field.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Config {
    /// Index into [`OPUS_CONFIG_TABLE`], the upper five bits of the TOC byte.
    pub id: u8,
    pub mode: Mode,
    pub bandwidth: Bandwidth,
    /// Length of an Opus frame, can be 2.5/5/10/20/40/60 ms depending
    /// on the mode used for coding. Any other value pertains to [Opus
    /// custom][5], which is unsupported here.
    ///
    /// [5]: https://datatracker.ietf.org/doc/html/rfc6716#section-6.2
    pub framesize: f32,
}

impl Config {
    /// Look up a configuration by its id (0..32).
    pub fn of(id: u8) -> Result<Config> {
        OPUS_CONFIG_TABLE
            .get(id as usize)
            .copied()
            .ok_or(Error::InvalidConfig(id))
    }
}

impl Default for Config {
    /// Default according to the reference implementation (libopus).
    ///
    /// - Full-band CELT-mode.
    /// - 20 ms frames.
    fn default() -> Self {
        OPUS_CONFIG_TABLE[31]
    }
}

/// Stereophonic or monophonic signal.
///
/// An Opus decoder may decode as monophonic or stereophonic as per preference,
/// however it must accept both monophonic and stereophonic frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Channel {
    Mono,
    #[default]
    Stereo,
}

const fn cfg(id: u8, mode: Mode, bandwidth: Bandwidth, framesize: f32) -> Config {
    Config { id, mode, bandwidth, framesize }
}

use Bandwidth::*;
use Mode::*;

/// Possible configurations according to the `config` field of the TOC byte.
pub static OPUS_CONFIG_TABLE: [Config; 32] = [
    cfg(0, SILK, Narrow, 10.0),
    cfg(1, SILK, Narrow, 20.0),
    cfg(2, SILK, Narrow, 40.0),
    cfg(3, SILK, Narrow, 60.0),

    cfg(4, SILK, Medium, 10.0),
    cfg(5, SILK, Medium, 20.0),
    cfg(6, SILK, Medium, 40.0),
    cfg(7, SILK, Medium, 60.0),

    cfg(8, SILK, Wide, 10.0),
    cfg(9, SILK, Wide, 20.0),
    cfg(10, SILK, Wide, 40.0),
    cfg(11, SILK, Wide, 60.0),

    cfg(12, Hybrid, SuperWide, 10.0),
    cfg(13, Hybrid, SuperWide, 20.0),

    cfg(14, Hybrid, FullBand, 10.0),
    cfg(15, Hybrid, FullBand, 20.0),

    cfg(16, CELT, Narrow, 2.5),
    cfg(17, CELT, Narrow, 5.0),
    cfg(18, CELT, Narrow, 10.0),
    cfg(19, CELT, Narrow, 20.0),

    cfg(20, CELT, Wide, 2.5),
    cfg(21, CELT, Wide, 5.0),
    cfg(22, CELT, Wide, 10.0),
    cfg(23, CELT, Wide, 20.0),

    cfg(24, CELT, SuperWide, 2.5),
    cfg(25, CELT, SuperWide, 5.0),
    cfg(26, CELT, SuperWide, 10.0),
    cfg(27, CELT, SuperWide, 20.0),

    cfg(28, CELT, FullBand, 2.5),
    cfg(29, CELT, FullBand, 5.0),
    cfg(30, CELT, FullBand, 10.0),
    cfg(31, CELT, FullBand, 20.0),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_ids_match_positions() {
        for (i, config) in OPUS_CONFIG_TABLE.iter().enumerate() {
            assert_eq!(config.id as usize, i);
        }
    }

    #[test]
    fn lookup() {
        let config = Config::of(13).unwrap();
        assert_eq!(config.mode, Mode::Hybrid);
        assert_eq!(config.bandwidth, Bandwidth::SuperWide);
        assert_eq!(config.framesize, 20.0);
        assert_eq!(config.bandwidth.sample_rate(), 24000);

        assert!(matches!(Config::of(32), Err(Error::InvalidConfig(32))));
    }

    #[test]
    fn default_is_fullband_celt() {
        let config = Config::default();
        assert_eq!(config.id, 31);
        assert_eq!(config.mode, Mode::CELT);
        assert_eq!(config.bandwidth.hz(), 20000);
    }
}
