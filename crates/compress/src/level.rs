//! Abstract level to native level translation.

use crate::Level;
use flate2::Compression as FlateLevel;

// Deflate-family codecs (gzip, zlib, raw deflate) share the 1..=9 scale.
// "Better" sits one step below the maximum, leaving the maximum to "Best".
const FLATE_MAX: u32 = 9;
// Zstd speed tiers. "Best" is the highest level outside the ultra range
// (20..=22), which needs a larger window on the decoding side.
const ZSTD_FASTEST: i32 = 1;
const ZSTD_BETTER: i32 = 7;
const ZSTD_BEST: i32 = 19;

impl Level {
    /// Native level for gzip, zlib and raw deflate.
    #[must_use]
    pub(crate) fn flate(&self) -> FlateLevel {
        match self {
            Level::Fastest => FlateLevel::fast(),
            Level::Default => FlateLevel::default(),
            Level::Better => FlateLevel::new(FLATE_MAX - 1),
            Level::Best => FlateLevel::new(FLATE_MAX),
        }
    }

    /// Native level for zstd.
    #[must_use]
    pub(crate) fn zstd(&self) -> i32 {
        match self {
            Level::Fastest => ZSTD_FASTEST,
            Level::Default => zstd::DEFAULT_COMPRESSION_LEVEL,
            Level::Better => ZSTD_BETTER,
            Level::Best => ZSTD_BEST,
        }
    }
}
