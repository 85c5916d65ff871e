use std::fmt;

/// 8-bit RGB color, as written in material sidecar files (`#RRGGBB`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB` (either case). Returns `None` for anything else.
    pub fn from_hex(text: &str) -> Option<Self> {
        let hex = text.strip_prefix('#')?;
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let rgb = u32::from_str_radix(hex, 16).ok()?;
        Some(Self::new(
            ((rgb >> 16) & 0xff) as u8,
            ((rgb >> 8) & 0xff) as u8,
            (rgb & 0xff) as u8,
        ))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_cases() {
        assert_eq!(Color::from_hex("#80AACD"), Some(Color::new(0x80, 0xAA, 0xCD)));
        assert_eq!(Color::from_hex("#80aacd"), Some(Color::new(0x80, 0xAA, 0xCD)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(Color::from_hex("80AACD"), None);
        assert_eq!(Color::from_hex("#80AAC"), None);
        assert_eq!(Color::from_hex("#80AACDFF"), None);
        assert_eq!(Color::from_hex("#GG0000"), None);
        assert_eq!(Color::from_hex("#+12345"), None);
    }

    #[test]
    fn display_round_trips() {
        let c = Color::new(1, 2, 255);
        assert_eq!(c.to_string(), "#0102FF");
        assert_eq!(Color::from_hex(&c.to_string()), Some(c));
    }
}
