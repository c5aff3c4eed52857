//! The small closed tables of per-atom overrides that defeat the type-based default encoding
//! (`spec.md` §4.3, §9).

/// Atoms that must render their string argument quoted despite their declared type's default.
const MUST_QUOTE: &[&str] =
    &["chat_add_user", "sm_send_token_raw", "sm_send_token_arg", "buf_set_token", "vid_set_token"];

/// Atoms that must render their string argument unquoted despite their declared type's default.
const MUST_NOT_QUOTE: &[&str] =
    &["act_set_criterion", "act_do_action", "uni_use_last_atom_string", "uni_use_last_atom_value", "de_validate"];

/// Atoms whose 3-byte `GID` payload prefers the 3-part-with-type-0 interpretation on decode
/// (`spec.md` §4.3, testable property S5).
const PREFERS_THREE_PART_GID: &[&str] = &["idb_set_context", "lm_table_use_table", "dod_gid", "dod_form_id"];

/// Atoms whose `DWORD` payload is always written at a fixed width, regardless of the value's
/// minimal encoding.
const FIXED_DWORD_WIDTH: &[(&str, usize)] = &[("gen_set_count", 4)];

/// The `IF` protocol: every atom in it uses the list-of-bytes payload shape (`spec.md` §4.3).
pub const IF_PROTOCOL: u8 = 30;

/// `Some(true)`/`Some(false)` override the type-based quoting default; `None` defers to it.
pub fn quote_override(name: &str) -> Option<bool> {
    if MUST_QUOTE.contains(&name) {
        Some(true)
    } else if MUST_NOT_QUOTE.contains(&name) {
        Some(false)
    } else {
        None
    }
}

pub fn prefers_three_part_gid(name: &str) -> bool {
    PREFERS_THREE_PART_GID.contains(&name)
}

pub fn fixed_dword_width(name: &str) -> Option<usize> {
    FIXED_DWORD_WIDTH.iter().find(|&&(n, _)| n == name).map(|&(_, w)| w)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn quote_overrides_are_disjoint() {
        for name in MUST_QUOTE {
            assert!(!MUST_NOT_QUOTE.contains(name));
        }
    }

    #[test]
    fn unlisted_atom_has_no_override() {
        assert_eq!(quote_override("de_data"), None);
    }
}
