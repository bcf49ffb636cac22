use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Number of distinct SRS levels (`0..=4`).
pub const LEVEL_COUNT: usize = 5;

/// Memory-strength level of a saved item.
///
/// `0` is newly learned, `4` is mastered. The value never leaves `[0, 4]`:
/// constructors clamp, and deserialization clamps out-of-range persisted data
/// instead of rejecting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SrsLevel(u8);

impl SrsLevel {
    pub const NEW: Self = Self(0);
    pub const MASTERED: Self = Self(4);

    /// Build a level from any integer, clamping into `[0, 4]`.
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        let max = i64::from(Self::MASTERED.0);
        // clamp keeps the value in 0..=4, so the cast is lossless
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let level = value.clamp(0, max) as u8;
        Self(level)
    }

    /// Returns `None` if `value` is out of range.
    #[must_use]
    pub fn new(value: u8) -> Option<Self> {
        (value <= Self::MASTERED.0).then_some(Self(value))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    /// Position in per-level tables.
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// One level up, plateauing at mastered.
    #[must_use]
    pub fn promoted(self) -> Self {
        Self(self.0.saturating_add(1).min(Self::MASTERED.0))
    }

    /// One level down, flooring at new.
    #[must_use]
    pub fn demoted(self) -> Self {
        Self(self.0.saturating_sub(1))
    }

    #[must_use]
    pub fn is_mastered(self) -> bool {
        self == Self::MASTERED
    }

    /// All levels in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..=Self::MASTERED.0).map(Self)
    }
}

impl fmt::Display for SrsLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for SrsLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for SrsLevel {
    /// Accepts integers, floats, and `null`. Null and non-finite values map to
    /// level 0; everything else is truncated and clamped.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<f64>::deserialize(deserializer)?;
        let level = match raw {
            Some(v) if v.is_finite() => {
                #[allow(clippy::cast_possible_truncation)]
                let truncated = v.trunc() as i64;
                Self::clamped(truncated)
            }
            _ => Self::NEW,
        };
        Ok(level)
    }
}
