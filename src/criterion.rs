//! `CRITERION` atom payloads: a single byte, rendered as a name where one is known and as a
//! plain integer otherwise (`spec.md` §4.1, §4.3).

/// The closed table of named criterion codes.
const NAMED: &[(&str, u8)] = &[
    ("select", 1),
    ("close", 2),
    ("gain_focus", 4),
    ("lose_focus", 5),
    ("change", 7),
    ("double_click", 8),
    ("key_press", 10),
    ("mouse_over", 11),
    ("timer", 18),
    ("right_click", 20),
    ("drag_drop", 23),
    ("resize", 24),
    ("scroll", 25),
];

/// The text rendering of a criterion byte: its name if one is known, otherwise the decimal code.
pub fn render(byte: u8) -> String {
    name_of(byte).map(str::to_owned).unwrap_or_else(|| byte.to_string())
}

/// Looks up the name for a criterion byte, if any.
pub fn name_of(byte: u8) -> Option<&'static str> {
    NAMED.iter().find(|&&(_, code)| code == byte).map(|&(name, _)| name)
}

/// Looks up the byte for a criterion name.
pub fn byte_of(name: &str) -> Option<u8> {
    NAMED.iter().find(|&&(n, _)| n == name).map(|&(_, code)| code)
}

/// Parses either a known name or a plain decimal integer into a criterion byte.
pub fn parse(text: &str) -> Option<u8> {
    byte_of(text).or_else(|| text.parse::<u8>().ok())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn known_codes_render_by_name() {
        assert_eq!(render(1), "select");
        assert_eq!(render(25), "scroll");
    }

    #[test]
    fn unknown_codes_render_numerically() {
        assert_eq!(render(99), "99");
    }

    #[test]
    fn parse_accepts_both_forms() {
        assert_eq!(parse("select"), Some(1));
        assert_eq!(parse("99"), Some(99));
        assert_eq!(parse("not_a_thing"), None);
    }
}
