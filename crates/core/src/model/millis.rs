//! Serde helpers for millisecond timestamps as written by the archive.

/// `Option<DateTime<Utc>>` as `null` or milliseconds since the Unix epoch.
///
/// Decoding accepts integer and float millisecond values; floats are truncated.
pub mod option {
    use chrono::{DateTime, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(at) => serializer.serialize_some(&at.timestamp_millis()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let Some(raw) = Option::<f64>::deserialize(deserializer)? else {
            return Ok(None);
        };
        if !raw.is_finite() {
            return Err(D::Error::custom("timestamp must be finite"));
        }
        #[allow(clippy::cast_possible_truncation)]
        let millis = raw.trunc() as i64;
        DateTime::<Utc>::from_timestamp_millis(millis)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {millis}")))
    }
}
