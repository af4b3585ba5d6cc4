use crate::error::{Error, ErrorKind};
use crate::{Algorithm, Level};
use std::{path::Path, str::FromStr};

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];
const GZIP_METHOD_DEFLATE: u8 = 8;
const GZIP_RESERVED_FLAGS: u8 = 0xE0;
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];
const S2_MAGIC: &[u8; 10] = b"\xff\x06\x00\x00S2sTwO";
const SNAPPY_MAGIC: &[u8; 10] = b"\xff\x06\x00\x00sNaPpY";

impl FromStr for Algorithm {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gz" | "gzip" => Ok(Algorithm::Gzip),
            "zst" | "zstd" => Ok(Algorithm::Zstd),
            "s2" => Ok(Algorithm::S2),
            "sz" | "snappy" => Ok(Algorithm::Snappy),
            "zz" | "zlib" => Ok(Algorithm::Zlib),
            "deflate" | "flate" | "raw-deflate" => Ok(Algorithm::Deflate),
            _ => exn::bail!(ErrorKind::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

impl TryFrom<u8> for Algorithm {
    type Error = Error;
    /// Numeric tags follow declaration order, starting at zero.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Algorithm::Gzip),
            1 => Ok(Algorithm::Zstd),
            2 => Ok(Algorithm::S2),
            3 => Ok(Algorithm::Snappy),
            4 => Ok(Algorithm::Zlib),
            5 => Ok(Algorithm::Deflate),
            _ => exn::bail!(ErrorKind::UnsupportedAlgorithm(value.to_string())),
        }
    }
}

impl FromStr for Level {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fast" | "fastest" => Ok(Level::Fastest),
            "default" => Ok(Level::Default),
            "better" => Ok(Level::Better),
            "best" => Ok(Level::Best),
            _ => exn::bail!(ErrorKind::UnsupportedLevel(s.to_string())),
        }
    }
}

impl TryFrom<u8> for Level {
    type Error = Error;
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Level::Fastest),
            1 => Ok(Level::Default),
            2 => Ok(Level::Better),
            3 => Ok(Level::Best),
            _ => exn::bail!(ErrorKind::UnsupportedLevel(value.to_string())),
        }
    }
}

impl Algorithm {
    /// Detect the algorithm from a file extension.
    ///
    /// Returns `None` for unknown or missing extensions.
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "gz" => Some(Algorithm::Gzip),
                "zst" => Some(Algorithm::Zstd),
                "s2" => Some(Algorithm::S2),
                "sz" => Some(Algorithm::Snappy),
                "zz" => Some(Algorithm::Zlib),
                "deflate" => Some(Algorithm::Deflate),
                _ => None,
            })
    }

    /// Detect the algorithm from the first bytes of a compressed stream.
    ///
    /// Raw deflate has no header and is never detected. Returns `None` if no
    /// signature matches or the input is too short.
    #[must_use]
    pub fn from_magic_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&GZIP_MAGIC) {
            return Some(Algorithm::Gzip);
        }
        if bytes.starts_with(&ZSTD_MAGIC) {
            return Some(Algorithm::Zstd);
        }
        if bytes.starts_with(S2_MAGIC) {
            return Some(Algorithm::S2);
        }
        if bytes.starts_with(SNAPPY_MAGIC) {
            return Some(Algorithm::Snappy);
        }
        if let [cmf, flg, ..] = bytes
            && is_zlib_header(*cmf, *flg)
        {
            return Some(Algorithm::Zlib);
        }
        None
    }
}

/// RFC 1952 member header check on `ID1 ID2 CM FLG`: the gzip magic, the
/// deflate method, and none of the reserved flag bits set.
pub(crate) fn is_gzip_header(header: &[u8; 4]) -> bool {
    let [id1, id2, method, flags] = *header;
    [id1, id2] == GZIP_MAGIC && method == GZIP_METHOD_DEFLATE && flags & GZIP_RESERVED_FLAGS == 0
}

/// RFC 1950 header check: deflate method, window of at most 32KiB, and the
/// `FCHECK` bits making `CMF * 256 + FLG` a multiple of 31.
pub(crate) fn is_zlib_header(cmf: u8, flg: u8) -> bool {
    cmf & 0x0F == 8 && cmf >> 4 <= 7 && (u16::from(cmf) << 8 | u16::from(flg)) % 31 == 0
}

#[cfg(test)]
mod tests {
    use crate::{Algorithm, Level};
    use rstest::rstest;

    #[rstest]
    #[case("gz", Algorithm::Gzip)]
    #[case("gzip", Algorithm::Gzip)]
    #[case("GZIP", Algorithm::Gzip)]
    #[case("zst", Algorithm::Zstd)]
    #[case("zstd", Algorithm::Zstd)]
    #[case("s2", Algorithm::S2)]
    #[case("S2", Algorithm::S2)]
    #[case("sz", Algorithm::Snappy)]
    #[case("snappy", Algorithm::Snappy)]
    #[case("zz", Algorithm::Zlib)]
    #[case("zlib", Algorithm::Zlib)]
    #[case("deflate", Algorithm::Deflate)]
    #[case("flate", Algorithm::Deflate)]
    #[case("raw-deflate", Algorithm::Deflate)]
    fn test_algorithm_from_str(#[case] test: &str, #[case] expected: Algorithm) {
        assert_eq!(test.parse::<Algorithm>().unwrap(), expected);
    }

    #[rstest]
    #[case("lz4")]
    #[case("brotli")]
    #[case("none")]
    #[case(" ")]
    #[case("")]
    fn test_algorithm_from_str_unsupported(#[case] test: &str) {
        let err = test.parse::<Algorithm>().unwrap_err();
        assert_eq!(*err, crate::error::ErrorKind::UnsupportedAlgorithm(test.to_string()));
    }

    #[rstest]
    #[case(0, Algorithm::Gzip)]
    #[case(1, Algorithm::Zstd)]
    #[case(2, Algorithm::S2)]
    #[case(3, Algorithm::Snappy)]
    #[case(4, Algorithm::Zlib)]
    #[case(5, Algorithm::Deflate)]
    fn test_algorithm_from_tag(#[case] tag: u8, #[case] expected: Algorithm) {
        assert_eq!(Algorithm::try_from(tag).unwrap(), expected);
    }

    #[rstest]
    #[case(6)]
    #[case(99)]
    #[case(u8::MAX)]
    fn test_algorithm_from_tag_unsupported(#[case] tag: u8) {
        let err = Algorithm::try_from(tag).unwrap_err();
        assert!(err.is_configuration());
    }

    #[rstest]
    #[case("fast", Level::Fastest)]
    #[case("fastest", Level::Fastest)]
    #[case("default", Level::Default)]
    #[case("Better", Level::Better)]
    #[case("BEST", Level::Best)]
    fn test_level_from_str(#[case] test: &str, #[case] expected: Level) {
        assert_eq!(test.parse::<Level>().unwrap(), expected);
    }

    #[rstest]
    #[case("9")]
    #[case("ludicrous")]
    fn test_level_from_str_unsupported(#[case] test: &str) {
        assert!(test.parse::<Level>().is_err());
    }

    #[test]
    fn test_level_from_tag() {
        assert_eq!(Level::try_from(0).unwrap(), Level::Fastest);
        assert_eq!(Level::try_from(3).unwrap(), Level::Best);
        assert!(Level::try_from(4).is_err());
    }

    #[rstest]
    #[case("file.txt", None)]
    #[case("file", None)]
    // A dotfile has no extension (like `.bashrc`).
    #[case(".gz", None)]
    #[case("spill-0001.bin.gz", Some(Algorithm::Gzip))]
    #[case("spill-0001.bin.zst", Some(Algorithm::Zstd))]
    #[case("spill-0001.bin.s2", Some(Algorithm::S2))]
    #[case("spill-0001.bin.sz", Some(Algorithm::Snappy))]
    #[case("spill-0001.bin.zz", Some(Algorithm::Zlib))]
    #[case("spill-0001.bin.deflate", Some(Algorithm::Deflate))]
    fn test_from_path(#[case] test: &str, #[case] expected: Option<Algorithm>) {
        assert_eq!(Algorithm::from_path(test), expected);
    }

    #[rstest]
    #[case([0x1F, 0x8B, 0x08, 0x00], true)]
    #[case([0x1F, 0x8B, 0x08, 0x1F], true)]
    #[case([0x1F, 0x8B, 0x07, 0x00], false)]
    #[case([0x1F, 0x8B, 0x08, 0x20], false)]
    #[case([0x1F, 0x8C, 0x08, 0x00], false)]
    fn test_gzip_header(#[case] header: [u8; 4], #[case] expected: bool) {
        assert_eq!(super::is_gzip_header(&header), expected);
    }

    #[rstest]
    #[case(b"", None)]
    #[case(b"plain text", None)]
    #[case(&[0x1F, 0x8B, 0x08, 0x00], Some(Algorithm::Gzip))]
    #[case(&[0x28, 0xB5, 0x2F, 0xFD], Some(Algorithm::Zstd))]
    #[case(b"\xff\x06\x00\x00S2sTwO", Some(Algorithm::S2))]
    #[case(b"\xff\x06\x00\x00sNaPpY", Some(Algorithm::Snappy))]
    #[case(&[0x78, 0x9C], Some(Algorithm::Zlib))]
    #[case(&[0x78, 0x01], Some(Algorithm::Zlib))]
    #[case(&[0x78, 0xDA], Some(Algorithm::Zlib))]
    #[case(&[0x78, 0x9D], None)]
    fn test_from_magic_bytes(#[case] bytes: &[u8], #[case] expected: Option<Algorithm>) {
        assert_eq!(Algorithm::from_magic_bytes(bytes), expected);
    }
}
