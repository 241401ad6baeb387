use core::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{de, ser};

use super::SafeInstant;

/// Serialize into an RFC 3339 formatted string, exactly as chrono serializes the inner value.
impl ser::Serialize for SafeInstant {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        ser::Serialize::serialize(self.inner(), serializer)
    }
}

struct SafeInstantVisitor;

impl<'de> de::Visitor<'de> for SafeInstantVisitor {
    type Value = SafeInstant;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an RFC 3339 formatted date and time string")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        DateTime::<FixedOffset>::parse_from_rfc3339(value).map(SafeInstant::from).map_err(E::custom)
    }
}

/// Deserialize an RFC 3339 string, restoring both the instant and its offset.
///
/// Deserialization never goes through the time expression parser: the serialized form is
/// exactly the inner value.
impl<'de> de::Deserialize<'de> for SafeInstant {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_str(SafeInstantVisitor)
    }
}
