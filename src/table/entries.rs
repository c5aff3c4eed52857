//! The embedded atom registry.
//!
//! The reference registry has on the order of 1900 entries spread across ~55 protocols
//! (`spec.md` §2's size budget). This embedded table seeds a representative subset spanning
//! every [`super::AtomType`], every per-atom override named in `spec.md` §4.3, and the atoms
//! exercised by the concrete scenarios in `spec.md` §8 — see `DESIGN.md` for the scope decision.
//! Extending coverage is a matter of adding rows to the `atoms!` call below; nothing else in the
//! codec depends on the table's size.

use super::{AtomType, FormatFlags};

pub(super) struct RawEntry {
    pub name: &'static str,
    pub protocol: u8,
    pub atom_number: u8,
    pub atom_type: AtomType,
    pub flags: FormatFlags,
    pub prefix: &'static str,
}

macro_rules! atoms {
    ($(($name:literal, $proto:literal, $num:literal, $prefix:literal, $ty:expr, $flags:expr)),* $(,)?) => {
        &[$(RawEntry {
            name: $name,
            protocol: $proto,
            atom_number: $num,
            atom_type: $ty,
            flags: $flags,
            prefix: $prefix,
        }),*]
    };
}

pub(super) static ENTRIES: &[RawEntry] = atoms![
    // UNI (protocol 0): stream framing and the large-atom continuation sub-protocol.
    ("uni_start_stream", 0, 1, "uni", AtomType::Raw, FormatFlags::INDENT),
    ("uni_end_stream", 0, 2, "uni", AtomType::Raw, FormatFlags { indent: false, outdent: true, eos: true }),
    ("uni_large_atom_start", 0, 4, "uni", AtomType::Raw, FormatFlags::NONE),
    ("uni_large_atom_segment", 0, 5, "uni", AtomType::Raw, FormatFlags::NONE),
    ("uni_large_atom_end", 0, 6, "uni", AtomType::Raw, FormatFlags::NONE),
    ("uni_use_last_atom_string", 0, 10, "uni", AtomType::String, FormatFlags::NONE),
    ("uni_use_last_atom_value", 0, 11, "uni", AtomType::String, FormatFlags::NONE),

    // ACT (protocol 2): actions and criteria.
    ("act_set_criterion", 2, 1, "act", AtomType::Criterion, FormatFlags::NONE),
    ("act_do_action", 2, 2, "act", AtomType::Token, FormatFlags::NONE),
    ("act_replace_select_action", 2, 4, "act", AtomType::Stream, FormatFlags::NONE),

    // DE (protocol 3): plain data atoms.
    ("de_data", 3, 1, "de", AtomType::String, FormatFlags::NONE),
    ("de_validate", 3, 2, "de", AtomType::Token, FormatFlags::NONE),

    // IDB (protocol 20): indexed GID atoms that prefer the 3-part interpretation of a 3-byte
    // payload.
    ("idb_set_context", 20, 1, "idb", AtomType::Gid, FormatFlags::NONE),

    // LM (protocol 21): look-up-table atoms, same 3-byte GID preference as IDB.
    ("lm_table_use_table", 21, 1, "lm", AtomType::Gid, FormatFlags::NONE),

    // MAT (protocol 16): geometry and appearance atoms.
    ("mat_object_id", 16, 12, "mat", AtomType::Gid, FormatFlags::NONE),
    ("mat_orientation", 16, 5, "mat", AtomType::Orient, FormatFlags::NONE),
    ("mat_size", 16, 6, "mat", AtomType::Raw, FormatFlags::NONE),

    // DOD (protocol 27): descriptor-of-descriptor atoms, 3-byte GID payloads prefer the 3-part
    // form (testable property S5 / scenario S5).
    ("dod_gid", 27, 2, "dod", AtomType::Gid, FormatFlags::NONE),
    ("dod_form_id", 27, 3, "dod", AtomType::Gid, FormatFlags::NONE),

    // IF (protocol 30): conditionals; every atom in this protocol uses the list-of-bytes payload
    // shape (`spec.md` §4.3).
    ("if_eq", 30, 1, "if", AtomType::Raw, FormatFlags::NONE),
    ("if_gt", 30, 2, "if", AtomType::Raw, FormatFlags::NONE),
    ("if_lt", 30, 3, "if", AtomType::Raw, FormatFlags::NONE),

    // VAR (protocol 31): variable atoms with composite payload shapes.
    ("var_set_number", 31, 1, "var", AtomType::Var, FormatFlags::NONE),
    ("var_set_dword", 31, 2, "var", AtomType::VarDword, FormatFlags::NONE),
    ("var_set_string", 31, 3, "var", AtomType::VarString, FormatFlags::NONE),
    ("var_lookup", 31, 4, "var", AtomType::VarLookup, FormatFlags::NONE),

    // CHAT (protocol 40), SM (protocol 41), BUF (protocol 42), VID (protocol 43): the atoms
    // named in the quoting-override closed list (`spec.md` §4.3).
    ("chat_add_user", 40, 1, "chat", AtomType::Token, FormatFlags::NONE),
    ("sm_send_token_raw", 41, 1, "sm", AtomType::Token, FormatFlags::NONE),
    ("sm_send_token_arg", 41, 2, "sm", AtomType::TokenArg, FormatFlags::NONE),
    ("buf_set_token", 42, 1, "buf", AtomType::Token, FormatFlags::NONE),
    ("vid_set_token", 43, 1, "vid", AtomType::Token, FormatFlags::NONE),

    // GEN (protocol 50): generic object/container atoms rounding out DWORD/BOOL/OBJSTART/ATOM
    // coverage.
    ("gen_set_count", 50, 1, "gen", AtomType::Dword, FormatFlags::NONE),
    ("gen_set_visible", 50, 2, "gen", AtomType::Bool, FormatFlags::NONE),
    ("gen_create_object", 50, 3, "gen", AtomType::ObjStart, FormatFlags::INDENT),
    ("gen_end_object", 50, 4, "gen", AtomType::Raw, FormatFlags { indent: false, outdent: true, eos: false }),
    ("gen_atom_ref", 50, 5, "gen", AtomType::AtomRef, FormatFlags::NONE),
];
