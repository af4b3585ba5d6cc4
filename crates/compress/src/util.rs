use crate::{Algorithm, Codec, Level};
use std::fmt::{Display, Formatter, Result as FmtResult};

impl Display for Algorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl AsRef<str> for Algorithm {
    fn as_ref(&self) -> &'static str {
        self.as_str()
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl Display for Codec {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}:{}", self.algorithm, self.level)
    }
}

impl Algorithm {
    /// Every supported algorithm, in declaration order.
    pub const ALL: [Algorithm; 6] = [
        Algorithm::Gzip,
        Algorithm::Zstd,
        Algorithm::S2,
        Algorithm::Snappy,
        Algorithm::Zlib,
        Algorithm::Deflate,
    ];

    /// Returns the file extension for this compression format.
    #[inline]
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Algorithm::Gzip => ".gz",
            Algorithm::Zstd => ".zst",
            Algorithm::S2 => ".s2",
            Algorithm::Snappy => ".sz",
            Algorithm::Zlib => ".zz",
            Algorithm::Deflate => ".deflate",
        }
    }

    /// Returns the short name for configuration (for displaying to user)
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Gzip => "gzip",
            Algorithm::Zstd => "zstd",
            Algorithm::S2 => "s2",
            Algorithm::Snappy => "snappy",
            Algorithm::Zlib => "zlib",
            Algorithm::Deflate => "deflate",
        }
    }

    /// Whether the abstract [`Level`] changes the encoder's output.
    #[inline]
    #[must_use]
    pub fn honors_level(&self) -> bool {
        !matches!(self, Algorithm::S2 | Algorithm::Snappy)
    }

    /// Verify that `bytes` start with the expected signature for this format.
    ///
    /// Returns `true` for raw deflate unconditionally, since it has no header.
    #[must_use]
    pub fn check_magic_bytes(&self, bytes: &[u8]) -> bool {
        if matches!(self, Algorithm::Deflate) {
            return true;
        }
        Self::from_magic_bytes(bytes) == Some(*self)
    }
}

impl Level {
    /// Every abstract level, from fastest to best.
    pub const ALL: [Level; 4] = [Level::Fastest, Level::Default, Level::Better, Level::Best];

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Fastest => "fastest",
            Level::Default => "default",
            Level::Better => "better",
            Level::Best => "best",
        }
    }
}
