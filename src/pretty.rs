//! Renders a decoded [`Stream`] back to FDO source text, respecting indent/outdent/eos flags and
//! the per-atom quoting overrides (`spec.md` §4.6).

use crate::model::{Atom, Stream};
use crate::table::AtomType;
use crate::value::overrides;
use crate::value::Value;

/// Renders `stream` as FDO source text.
pub fn render(stream: &Stream) -> String {
    let mut out = String::new();
    render_atoms(stream, 0, &mut out);
    out
}

fn render_atoms(stream: &Stream, mut indent: usize, out: &mut String) {
    for atom in &stream.atoms {
        let flags = atom.definition.map(|d| d.flags).unwrap_or_default();
        if flags.outdent {
            indent = indent.saturating_sub(1);
        }
        render_atom(atom, indent, out);
        if flags.indent {
            indent += 1;
        }
    }
}

fn render_atom(atom: &Atom, indent: usize, out: &mut String) {
    push_indent(out, indent);
    let name = atom.name().unwrap_or("unknown_atom");

    match (atom.definition, &atom.value) {
        (Some(def), Value::Stream(nested)) if def.atom_type == AtomType::Stream => {
            out.push_str(name);
            out.push('\n');
            push_indent(out, indent + 1);
            out.push_str("<\n");
            render_atoms(nested, indent + 2, out);
            push_indent(out, indent + 1);
            out.push_str(">\n");
            return;
        }
        _ => {}
    }

    out.push_str(name);
    if let Some(args) = render_args(atom) {
        out.push('<');
        out.push_str(&args);
        out.push('>');
    }
    out.push('\n');
}

fn push_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str("  ");
    }
}

/// Returns the text inside an atom's `< … >` block, or `None` when the canonical form drops the
/// block entirely (`spec.md` §4.2 rule 1).
fn render_args(atom: &Atom) -> Option<String> {
    let def = atom.definition?;
    if def.atom_type == AtomType::AtomRef {
        let bytes = atom.value.as_raw().ok()?;
        return match bytes {
            [protocol, atom_number] => Some(
                crate::table::ATOM_TABLE
                    .by_protocol_atom(*protocol, *atom_number)
                    .map(|referenced| referenced.name.to_owned())
                    .unwrap_or_else(|| format!("{protocol}:{atom_number}")),
            ),
            _ => None,
        };
    }
    match &atom.value {
        Value::Raw(bytes) => {
            if bytes.is_empty() {
                None
            } else {
                Some(format!("{}x", render_hex(bytes)))
            }
        }
        Value::Number(n) => Some(n.to_string()),
        Value::String(text) => Some(render_text(def.name, def.atom_type, text)),
        Value::Gid(gid) => Some(gid.to_string()),
        Value::Boolean(b) => Some(if *b { "yes".to_owned() } else { "no".to_owned() }),
        Value::Orientation(code) => Some(code.clone()),
        Value::ObjectType { type_name, title } => Some(render_object_type(def.atom_type, type_name, title)),
        Value::List(items) => Some(render_list(def, items)),
        Value::Stream(_) => None, // handled by the nested-stream block form in `render_atom`.
        Value::Empty => None,
    }
}

fn render_object_type(atom_type: AtomType, type_name: &str, title: &str) -> String {
    match atom_type {
        AtomType::VarLookup => type_name.to_owned(),
        AtomType::Var | AtomType::VarDword => format!("{type_name},{title}"),
        AtomType::VarString => format!("{type_name},{}", quote(title)),
        _ => format!("{type_name}, {}", quote(title)),
    }
}

fn render_list(def: crate::table::AtomDefinition, items: &[Value]) -> String {
    if def.protocol == overrides::IF_PROTOCOL {
        return items
            .iter()
            .map(|v| v.as_number().map(|n| n.to_string()).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(", ");
    }
    // TOKENARG's `[token, number]` pair.
    if let [Value::String(tok), Value::Number(n)] = items {
        return format!("{}, {n}", quote(tok));
    }
    items
        .iter()
        .map(|v| match v {
            Value::Number(n) => n.to_string(),
            Value::String(s) => quote(s),
            other => format!("{other:?}"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_text(name: &str, atom_type: AtomType, text: &str) -> String {
    let quoted = match overrides::quote_override(name) {
        Some(decision) => decision,
        None => matches!(atom_type, AtomType::String | AtomType::Token),
    };
    if quoted {
        quote(text)
    } else {
        text.to_owned()
    }
}

fn quote(text: &str) -> String {
    format!("\"{}\"", escape(text))
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c if (c as u32) < 0x20 || (c as u32) > 0x7E => out.push_str(&format!("\\x{:02X}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

fn render_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::text::Parser;

    fn render_source(src: &str) -> String {
        let ast = Parser::parse(src).unwrap();
        let stream = Stream::from_ast(&ast).unwrap();
        render(&stream)
    }

    #[test]
    fn empty_argument_block_renders_without_it() {
        assert_eq!(render_source("uni_start_stream<>"), "uni_start_stream\n");
    }

    #[test]
    fn string_argument_round_trips_quoted() {
        assert_eq!(render_source(r#"de_data<"TOSAdvisor">"#), "de_data<\"TOSAdvisor\">\n");
    }

    #[test]
    fn criterion_atom_renders_unquoted_by_override() {
        assert_eq!(render_source("act_set_criterion<select>"), "act_set_criterion<select>\n");
    }

    #[test]
    fn nested_stream_renders_as_indented_block() {
        let src = "uni_start_stream\nact_replace_select_action<uni_start_stream uni_end_stream>\nuni_end_stream\n";
        let rendered = render_source(src);
        assert_eq!(
            rendered,
            "uni_start_stream\n  act_replace_select_action\n    <\n      uni_start_stream\n      uni_end_stream\n    >\nuni_end_stream\n"
        );
    }

    #[test]
    fn escape_handles_control_and_quote_characters() {
        assert_eq!(escape("a\nb\"c"), "a\\nb\\\"c");
        assert_eq!(escape("\u{1}"), "\\x01");
    }

    #[test]
    fn gid_argument_renders_as_dashed_text() {
        assert_eq!(render_source("mat_object_id<32-105>"), "mat_object_id<32-105>\n");
    }

    #[test]
    fn orientation_argument_round_trips() {
        assert_eq!(render_source("mat_orientation<vcf>"), "mat_orientation<vcf>\n");
    }
}
