//! The static atom table: the registry mapping atom names to `(protocol, atom_number)` pairs,
//! their declared semantic type, and their pretty-printer formatting flags (`spec.md` §4.1).
//!
//! The table is loaded once behind a [`lazy_static`] and is immutable and freely shareable for
//! the remainder of the process, matching the concurrency model of `spec.md` §5.

mod entries;

use std::collections::HashMap;

use lazy_static::lazy_static;

/// The semantic type declared for an atom, controlling how its payload bytes are interpreted
/// and how its text argument is rendered (`spec.md` §4.1).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum AtomType {
    Raw,
    Dword,
    String,
    Gid,
    ObjStart,
    Stream,
    AtomRef,
    Bool,
    Orient,
    Criterion,
    Token,
    TokenArg,
    VarString,
    Var,
    VarDword,
    VarLookup,
}

/// Pretty-printer indent/stream-termination behavior for an atom (`spec.md` §3, §4.6).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct FormatFlags {
    /// Increment the indent level after this atom is written.
    pub indent: bool,
    /// Decrement the indent level before this atom is written.
    pub outdent: bool,
    /// This atom terminates its enclosing stream.
    pub eos: bool,
}

impl FormatFlags {
    pub const NONE: FormatFlags = FormatFlags { indent: false, outdent: false, eos: false };
    pub const INDENT: FormatFlags = FormatFlags { indent: true, outdent: false, eos: false };
    pub const OUTDENT: FormatFlags = FormatFlags { indent: false, outdent: true, eos: false };
    pub const EOS: FormatFlags = FormatFlags { indent: false, outdent: false, eos: true };
}

/// An immutable atom definition: canonical name, protocol/atom-number pair, declared type, and
/// pretty-printer flags.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AtomDefinition {
    pub name: &'static str,
    pub protocol: u8,
    pub atom_number: u8,
    pub atom_type: AtomType,
    pub flags: FormatFlags,
}

/// The static registry of all known atoms.
pub struct AtomTable {
    by_name: HashMap<&'static str, AtomDefinition>,
    by_protocol_atom: HashMap<(u8, u8), AtomDefinition>,
    prefixes: HashMap<u8, &'static str>,
}

impl AtomTable {
    fn build() -> Self {
        let mut by_name = HashMap::new();
        let mut by_protocol_atom = HashMap::new();
        let mut prefixes: HashMap<u8, &'static str> = HashMap::new();

        for entry in entries::ENTRIES {
            let def = AtomDefinition {
                name: entry.name,
                protocol: entry.protocol,
                atom_number: entry.atom_number,
                atom_type: entry.atom_type,
                flags: entry.flags,
            };
            by_name.insert(entry.name, def);
            by_protocol_atom.insert((entry.protocol, entry.atom_number), def);
            prefixes.entry(entry.protocol).or_insert(entry.prefix);
        }

        Self { by_name, by_protocol_atom, prefixes }
    }

    /// Looks up an atom definition by name, case-insensitively.
    pub fn by_name(&self, name: &str) -> Option<AtomDefinition> {
        // Names stored in the table are already lowercase snake-case (`spec.md` §3's invariant);
        // only the lookup key needs folding.
        let lower = name.to_ascii_lowercase();
        self.by_name.get(lower.as_str()).copied()
    }

    /// Looks up an atom definition by its wire identity.
    pub fn by_protocol_atom(&self, protocol: u8, atom_number: u8) -> Option<AtomDefinition> {
        self.by_protocol_atom.get(&(protocol, atom_number)).copied()
    }

    /// Returns the conventional name prefix for a protocol (e.g. `"mat"`, `"dod"`), if any atom
    /// in that protocol is known.
    pub fn prefix_of(&self, protocol: u8) -> Option<&'static str> {
        self.prefixes.get(&protocol).copied()
    }

    /// Iterates over every known atom definition.
    pub fn iter(&self) -> impl Iterator<Item = &AtomDefinition> {
        self.by_name.values()
    }
}

lazy_static! {
    /// The process-wide atom table, loaded once from the embedded registry.
    pub static ref ATOM_TABLE: AtomTable = AtomTable::build();
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let def = ATOM_TABLE.by_name("UNI_START_STREAM").expect("known atom");
        assert_eq!(def.name, "uni_start_stream");
        assert_eq!((def.protocol, def.atom_number), (0, 1));
    }

    #[test]
    fn protocol_atom_lookup_matches_name_lookup() {
        let by_name = ATOM_TABLE.by_name("act_replace_select_action").unwrap();
        let by_proto = ATOM_TABLE.by_protocol_atom(by_name.protocol, by_name.atom_number).unwrap();
        assert_eq!(by_name, by_proto);
    }

    #[test]
    fn prefix_lookup_matches_scenario_protocols() {
        assert_eq!(ATOM_TABLE.prefix_of(16), Some("mat"));
        assert_eq!(ATOM_TABLE.prefix_of(27), Some("dod"));
    }

    #[test]
    fn unknown_name_is_none() {
        assert!(ATOM_TABLE.by_name("not_a_real_atom").is_none());
    }
}
