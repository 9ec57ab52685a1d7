//! Serde helpers shared by the content documents.

use serde::{Deserialize, Deserializer};

/// Deserialize a field that may be absent, explicitly `null`, or set.
///
/// - Missing field → `None` (requires `#[serde(default)]`)
/// - `null` → `Some(None)`
/// - Value → `Some(Some(value))`
///
/// Paired with `skip_serializing_if = "Option::is_none"` this writes back
/// exactly what was read, so `"liveUrl": null` survives a round trip.
pub fn nullable<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}
