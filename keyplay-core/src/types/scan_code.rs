//! Physical keyboard scan codes

use std::fmt;

/// A set-1 keyboard scan code, the unit the injection backends speak.
///
/// Displays as a lowercase hex token (`0x15`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanCode(u16);

impl ScanCode {
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    pub const fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for ScanCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_hex_token() {
        assert_eq!(ScanCode::new(0x15).to_string(), "0x15");
        assert_eq!(ScanCode::new(0x2c).to_string(), "0x2c");
        assert_eq!(ScanCode::new(0x1).to_string(), "0x01");
    }
}
