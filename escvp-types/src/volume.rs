//! Volume scale conversion
//!
//! `VOL?` reports a raw value in `0..=248`. The on-screen display shows the
//! same setting as a level in `0..=40`, and one `VOL INC` / `VOL DEC` moves
//! it by one level.

use std::fmt;

use crate::error::{Error, Result};

/// Volume as shown on the projector's on-screen display
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VolumeLevel(u8);

impl VolumeLevel {
    /// Highest display level
    pub const MAX: u8 = 40;

    /// Highest raw value reported by `VOL?`
    pub const RAW_MAX: u16 = 248;

    pub fn new(level: u8) -> Result<Self> {
        if level > Self::MAX {
            return Err(Error::OutOfRange(format!(
                "volume level {} exceeds {}",
                level,
                Self::MAX
            )));
        }
        Ok(Self(level))
    }

    /// Convert a raw `VOL?` value, rounding to the nearest level
    ///
    /// Raw values above the device maximum are clamped.
    pub fn from_raw(raw: u16) -> Self {
        let raw = u32::from(raw.min(Self::RAW_MAX));
        let max = u32::from(Self::MAX);
        let raw_max = u32::from(Self::RAW_MAX);

        Self(((raw * max + raw_max / 2) / raw_max) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Levels between `self` and `other`
    pub fn distance(self, other: Self) -> u8 {
        self.0.abs_diff(other.0)
    }
}

impl fmt::Display for VolumeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, Self::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_raw_endpoints() {
        assert_eq!(VolumeLevel::from_raw(0).value(), 0);
        assert_eq!(VolumeLevel::from_raw(248).value(), 40);
        assert_eq!(VolumeLevel::from_raw(124).value(), 20);
    }

    #[test]
    fn test_from_raw_rounds_to_nearest() {
        // 3/248 * 40 = 0.48, 4/248 * 40 = 0.65
        assert_eq!(VolumeLevel::from_raw(3).value(), 0);
        assert_eq!(VolumeLevel::from_raw(4).value(), 1);
        // 130/248 * 40 = 20.97
        assert_eq!(VolumeLevel::from_raw(130).value(), 21);
    }

    #[test]
    fn test_from_raw_clamps() {
        assert_eq!(VolumeLevel::from_raw(u16::MAX).value(), VolumeLevel::MAX);
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert_eq!(VolumeLevel::new(40).unwrap().value(), 40);
        assert!(matches!(VolumeLevel::new(41), Err(Error::OutOfRange(_))));
    }

    #[test]
    fn test_distance_and_display() {
        let low = VolumeLevel::new(12).unwrap();
        let high = VolumeLevel::new(15).unwrap();
        assert_eq!(low.distance(high), 3);
        assert_eq!(high.distance(low), 3);
        assert_eq!(high.to_string(), "15/40");
    }
}
