//! Deserialization helpers for values the store may hand back as `null` or `""`.

use serde::de::{value::StringDeserializer, IntoDeserializer};
use serde::{Deserialize, Deserializer};

/// Treats an explicit `null` the same way as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Select inputs post `""` for "nothing chosen"; that maps to `None` instead of a decode error.
pub(crate) fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.trim().is_empty() => {
            let inner: StringDeserializer<D::Error> = raw.into_deserializer();
            T::deserialize(inner).map(Some)
        }
        _ => Ok(None),
    }
}
