//! Packed entry timestamps
//!
//! ```text
//! bit 31         25 24   21 20   16 15   11 10      5 4      0
//!     year - 1980  | month | day   | hour  | minute  | sec / 2
//! ```

/// Timestamp of a library entry, DOS-style bit packing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PackedDateTime {
    /// Year, 1980 to 2107
    pub year: u16,
    /// Month, 1 to 12
    pub month: u8,
    /// Day of month, 1 to 31
    pub day: u8,
    /// Hour, 0 to 23
    pub hour: u8,
    /// Minute, 0 to 59
    pub minute: u8,
    /// Second, even values 0 to 58
    pub second: u8,
}

impl PackedDateTime {
    /// Decode the bitfields of `value`
    pub fn from_packed(value: u32) -> Self {
        Self {
            year: ((value >> 25) & 0x7f) as u16 + 1980,
            month: ((value >> 21) & 0x0f) as u8,
            day: ((value >> 16) & 0x1f) as u8,
            hour: ((value >> 11) & 0x1f) as u8,
            minute: ((value >> 5) & 0x3f) as u8,
            second: ((value & 0x1f) * 2) as u8,
        }
    }

    /// Encode into the packed form; fields are masked to their widths and
    /// odd seconds round down
    pub fn to_packed(self) -> u32 {
        let year = u32::from(self.year.saturating_sub(1980)) & 0x7f;
        (year << 25)
            | ((u32::from(self.month) & 0x0f) << 21)
            | ((u32::from(self.day) & 0x1f) << 16)
            | ((u32::from(self.hour) & 0x1f) << 11)
            | ((u32::from(self.minute) & 0x3f) << 5)
            | ((u32::from(self.second) / 2) & 0x1f)
    }
}

impl std::fmt::Display for PackedDateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> PackedDateTime {
        PackedDateTime {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    #[test]
    fn test_known_values() {
        assert_eq!(
            PackedDateTime::from_packed(0x2A4A_5000),
            date(2001, 2, 10, 10, 0, 0)
        );
        assert_eq!(
            PackedDateTime::from_packed(0x2AA5_5000),
            date(2001, 5, 5, 10, 0, 0)
        );
        assert_eq!(
            PackedDateTime::from_packed(0x2F77_74BD),
            date(2003, 11, 23, 14, 37, 58)
        );
        assert_eq!(PackedDateTime::from_packed(0), date(1980, 0, 0, 0, 0, 0));
    }

    #[test]
    fn test_pack_inverts_unpack() {
        for value in [0x2A4A_5000u32, 0x2AA5_5000, 0x2F77_74BD, u32::MAX] {
            assert_eq!(PackedDateTime::from_packed(value).to_packed(), value);
        }
        assert_eq!(date(2001, 5, 5, 10, 0, 1).to_packed(), 0x2AA5_5000);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            PackedDateTime::from_packed(0x2F77_74BD).to_string(),
            "2003-11-23 14:37:58"
        );
    }
}
