//! Configuration Error Types

use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A configuration file could not be located or its format is unknown.
    #[display("failed to load configuration")]
    Load,
    /// The merged configuration could not be parsed, or holds a value the
    /// compression crate rejects.
    #[display("invalid configuration")]
    Invalid,
}
