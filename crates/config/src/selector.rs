//! Serde glue for codec selectors, which accept either a name or a numeric tag.

use serde::Serializer;
use serde::de::{self, Deserializer, Unexpected, Visitor};
use spill_compress::error::Error as CompressError;
use std::fmt::{self, Display};
use std::marker::PhantomData;
use std::str::FromStr;

pub(crate) fn serialize<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

pub(crate) fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: FromStr<Err = CompressError> + TryFrom<u8, Error = CompressError>,
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(Selector(PhantomData))
}

struct Selector<T>(PhantomData<T>);

impl<T> Visitor<'_> for Selector<T>
where
    T: FromStr<Err = CompressError> + TryFrom<u8, Error = CompressError>,
{
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a name or a numeric selector")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<T, E> {
        value.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<T, E> {
        let tag = u8::try_from(value).map_err(|_| E::invalid_value(Unexpected::Unsigned(value), &self))?;
        T::try_from(tag).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<T, E> {
        let value = u64::try_from(value).map_err(|_| E::invalid_value(Unexpected::Signed(value), &self))?;
        self.visit_u64(value)
    }
}
