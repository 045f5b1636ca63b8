//! Parses the handful of CSS-ish color string forms used in style sheets — `#rgb`, `#rrggbb`,
//! `rgb(...)`, `rgba(...)`, `transparent`, and a small named-color table — and memoizes the
//! result, since the same style sheet strings get resolved on every feature of every tile.

use parking_lot::Mutex;
use quick_cache::unsync::Cache;

/// A parsed color, `a` defaulting to fully opaque when the input had no alpha channel.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba {
    const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

const NAMED_COLORS: &[(&str, Rgba)] = &[
    ("black", Rgba::new(0, 0, 0, 255)),
    ("white", Rgba::new(255, 255, 255, 255)),
    ("red", Rgba::new(255, 0, 0, 255)),
    ("green", Rgba::new(0, 128, 0, 255)),
    ("blue", Rgba::new(0, 0, 255, 255)),
    ("yellow", Rgba::new(255, 255, 0, 255)),
    ("cyan", Rgba::new(0, 255, 255, 255)),
    ("magenta", Rgba::new(255, 0, 255, 255)),
    ("orange", Rgba::new(255, 165, 0, 255)),
    ("purple", Rgba::new(128, 0, 128, 255)),
    ("gray", Rgba::new(128, 128, 128, 255)),
    ("grey", Rgba::new(128, 128, 128, 255)),
];

const MEMO_CAPACITY: usize = 500;

/// Memoized color-string parser.
///
/// A target of ~500 distinct strings are kept at a time; `quick_cache`'s approximate-LRU
/// eviction keeps the memo bounded without the caller having to manage a trim pass.
pub struct ColorParser {
    memo: Mutex<Cache<String, Option<Rgba>>>,
}

impl Default for ColorParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorParser {
    /// Creates a parser with an empty memo.
    pub fn new() -> Self {
        Self {
            memo: Mutex::new(Cache::new(MEMO_CAPACITY)),
        }
    }

    /// Parses `s`, returning `None` if it is not one of the recognized forms. The result is
    /// memoized by the exact input string.
    pub fn parse(&self, s: &str) -> Option<Rgba> {
        let mut memo = self.memo.lock();
        if let Some(cached) = memo.get(s) {
            return *cached;
        }

        let parsed = parse_uncached(s);
        memo.insert(s.to_string(), parsed);
        parsed
    }

    /// True if `s` parses and its alpha channel is anything other than fully opaque.
    pub fn has_alpha(&self, s: &str) -> bool {
        self.parse(s).is_some_and(|c| c.a != 255)
    }

    /// Returns `s` re-emitted as `rgba(r, g, b, alpha)` with the given opacity, or `s` unchanged
    /// if it did not parse.
    pub fn with_opacity(&self, s: &str, alpha: f32) -> String {
        match self.parse(s) {
            Some(c) => format!("rgba({}, {}, {}, {})", c.r, c.g, c.b, alpha),
            None => s.to_string(),
        }
    }
}

fn parse_uncached(s: &str) -> Option<Rgba> {
    let s = s.trim();

    if s.eq_ignore_ascii_case("transparent") {
        return Some(Rgba::new(0, 0, 0, 0));
    }

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }

    if let Some(inner) = s.strip_prefix("rgba(").and_then(|rest| rest.strip_suffix(')')) {
        return parse_rgba_components(inner);
    }

    if let Some(inner) = s.strip_prefix("rgb(").and_then(|rest| rest.strip_suffix(')')) {
        return parse_rgba_components(inner);
    }

    NAMED_COLORS
        .iter()
        .find(|(name, _)| s.eq_ignore_ascii_case(name))
        .map(|(_, color)| *color)
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    fn hex_digit(c: u8) -> Option<u8> {
        match c {
            b'0'..=b'9' => Some(c - b'0'),
            b'a'..=b'f' => Some(c - b'a' + 10),
            b'A'..=b'F' => Some(c - b'A' + 10),
            _ => None,
        }
    }
    fn pair(bytes: &[u8], i: usize) -> Option<u8> {
        Some(hex_digit(*bytes.get(i)?)? * 16 + hex_digit(*bytes.get(i + 1)?)?)
    }
    fn single(bytes: &[u8], i: usize) -> Option<u8> {
        let d = hex_digit(*bytes.get(i)?)?;
        Some(d * 16 + d)
    }

    let bytes = hex.as_bytes();
    match bytes.len() {
        3 => Some(Rgba::new(single(bytes, 0)?, single(bytes, 1)?, single(bytes, 2)?, 255)),
        6 => Some(Rgba::new(pair(bytes, 0)?, pair(bytes, 2)?, pair(bytes, 4)?, 255)),
        8 => Some(Rgba::new(pair(bytes, 0)?, pair(bytes, 2)?, pair(bytes, 4)?, pair(bytes, 6)?)),
        _ => None,
    }
}

fn parse_rgba_components(inner: &str) -> Option<Rgba> {
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let r = parts[0].parse::<u8>().ok()?;
    let g = parts[1].parse::<u8>().ok()?;
    let b = parts[2].parse::<u8>().ok()?;
    let a = match parts.get(3) {
        Some(raw) => (raw.parse::<f32>().ok()?.clamp(0.0, 1.0) * 255.0).round() as u8,
        None => 255,
    };

    Some(Rgba::new(r, g, b, a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_recognized_form() {
        let parser = ColorParser::new();
        assert_eq!(parser.parse("#fff"), Some(Rgba::new(255, 255, 255, 255)));
        assert_eq!(parser.parse("#00ff00"), Some(Rgba::new(0, 255, 0, 255)));
        assert_eq!(parser.parse("#00ff0080"), Some(Rgba::new(0, 255, 0, 0x80)));
        assert_eq!(parser.parse("rgb(10, 20, 30)"), Some(Rgba::new(10, 20, 30, 255)));
        assert_eq!(parser.parse("rgba(10, 20, 30, 0.5)"), Some(Rgba::new(10, 20, 30, 128)));
        assert_eq!(parser.parse("transparent"), Some(Rgba::new(0, 0, 0, 0)));
        assert_eq!(parser.parse("Purple"), Some(Rgba::new(128, 0, 128, 255)));
    }

    #[test]
    fn unparseable_input_yields_none() {
        let parser = ColorParser::new();
        assert_eq!(parser.parse("not-a-color"), None);
        assert_eq!(parser.parse("#12345"), None);
    }

    #[test]
    fn with_opacity_passes_through_unparseable_strings() {
        let parser = ColorParser::new();
        assert_eq!(parser.with_opacity("not-a-color", 0.3), "not-a-color");
        assert_eq!(parser.with_opacity("#ff0000", 0.3), "rgba(255, 0, 0, 0.3)");
    }

    #[test]
    fn has_alpha_reflects_parsed_alpha_channel() {
        let parser = ColorParser::new();
        assert!(!parser.has_alpha("#ff0000"));
        assert!(parser.has_alpha("#ff000080"));
    }

    #[test]
    fn repeated_parses_of_the_same_string_are_memoized() {
        let parser = ColorParser::new();
        let first = parser.parse("#123456");
        let second = parser.parse("#123456");
        assert_eq!(first, second);
    }
}
