//! Per-type conversion between AST argument nodes / decoded payload bytes and the object model's
//! [`Value`] (`spec.md` §4.3).

pub mod object_types;
pub mod overrides;

use crate::error::{Error, ErrorKind};
use crate::gid::FdoGid;
use crate::model::Stream;
use crate::table::{AtomDefinition, AtomType};
use crate::text::ArgumentNode;
use crate::util::{minimal_be_width, write_be_int, ReadUtil};
use crate::{criterion, orientation};

/// A decoded atom value. Closed tagged union (`spec.md` §3). A handful of composite payload
/// shapes (`VAR`'s letter+number/letter+string forms, `ATOM` references) are represented by
/// reusing [`Value::ObjectType`] and [`Value::Raw`] rather than adding new cases, since the data
/// model fixes this union's shape.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    String(String),
    Number(i64),
    Gid(FdoGid),
    Boolean(bool),
    Orientation(String),
    ObjectType { type_name: String, title: String },
    Stream(Box<Stream>),
    Raw(Vec<u8>),
    List(Vec<Value>),
    Empty,
}

impl Value {
    pub fn as_string(&self) -> crate::error::Result<&str> {
        match self {
            Value::String(s) => Ok(s),
            _ => Err(wrong_type()),
        }
    }

    pub fn as_number(&self) -> crate::error::Result<i64> {
        match self {
            Value::Number(n) => Ok(*n),
            _ => Err(wrong_type()),
        }
    }

    pub fn as_gid(&self) -> crate::error::Result<FdoGid> {
        match self {
            Value::Gid(g) => Ok(*g),
            _ => Err(wrong_type()),
        }
    }

    pub fn as_boolean(&self) -> crate::error::Result<bool> {
        match self {
            Value::Boolean(b) => Ok(*b),
            _ => Err(wrong_type()),
        }
    }

    pub fn as_stream(&self) -> crate::error::Result<&Stream> {
        match self {
            Value::Stream(s) => Ok(s),
            _ => Err(wrong_type()),
        }
    }

    pub fn as_raw(&self) -> crate::error::Result<&[u8]> {
        match self {
            Value::Raw(b) => Ok(b),
            _ => Err(wrong_type()),
        }
    }

    /// The infallible sibling of [`Value::as_string`]; never errors.
    pub fn string(&self) -> Option<&str> {
        self.as_string().ok()
    }

    /// The infallible sibling of [`Value::as_number`]; never errors.
    pub fn number(&self) -> Option<i64> {
        self.as_number().ok()
    }
}

fn wrong_type() -> Error {
    Error::new(ErrorKind::WrongType, "value is not of the requested type")
}

fn bad_argument(msg: impl Into<String>) -> Error {
    Error::new(ErrorKind::BadArgumentFormat, msg.into())
}

/// Converts the text representation (from a [`u8`]-encoded `HEX_VALUE` token) into bytes.
fn parse_hex(text: &str) -> crate::error::Result<Vec<u8>> {
    if text.len() % 2 != 0 {
        return Err(bad_argument(format!("hex literal '{text}' has an odd digit count")));
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&text[i..i + 2], 16).map_err(|_| bad_argument(format!("invalid hex literal '{text}'"))))
        .collect()
}

fn render_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// ISO-8859-1 is a direct byte↔codepoint mapping for the first 256 Unicode scalar values
/// (`spec.md` §4.1, §9): no transcoding, no lossy fallback.
fn iso8859_1_encode(s: &str) -> crate::error::Result<Vec<u8>> {
    s.chars()
        .map(|c| u32::from(c).try_into().map_err(|_| bad_argument(format!("'{c}' is outside ISO-8859-1"))))
        .collect()
}

fn iso8859_1_decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn extract_text(args: Option<&[ArgumentNode]>) -> crate::error::Result<String> {
    match args {
        None => Ok(String::new()),
        Some([ArgumentNode::String(s)]) | Some([ArgumentNode::Identifier(s)]) => Ok(s.clone()),
        Some(_) => Err(bad_argument("expected a single string or identifier argument")),
    }
}

fn single_arg(args: Option<&[ArgumentNode]>) -> crate::error::Result<Option<&ArgumentNode>> {
    match args {
        None => Ok(None),
        Some([one]) => Ok(Some(one)),
        Some(_) => Err(bad_argument("expected a single argument")),
    }
}

/// Builds the [`Value`] a text-front-end `AtomNode`'s arguments should encode to, given its
/// resolved [`AtomDefinition`]. Returns [`ErrorKind::UnrecognizedAtom`] is the caller's concern
/// (raised by the compile glue before this is reached): this function assumes `def` is known.
pub fn from_argument(def: AtomDefinition, args: Option<&[ArgumentNode]>) -> crate::error::Result<Value> {
    if def.protocol == overrides::IF_PROTOCOL {
        return Ok(Value::List(list_of_numbers(args)?));
    }

    match def.atom_type {
        AtomType::Raw => {
            let text = match single_arg(args)? {
                None => return Ok(Value::Raw(Vec::new())),
                Some(ArgumentNode::Hex(h)) => h.clone(),
                Some(_) => return Err(bad_argument("RAW argument must be a hex literal")),
            };
            Ok(Value::Raw(parse_hex(&text)?))
        }
        AtomType::Dword => match single_arg(args)? {
            None => Ok(Value::Number(0)),
            Some(ArgumentNode::Number(n)) => Ok(Value::Number(*n)),
            Some(_) => Err(bad_argument("DWORD argument must be a number")),
        },
        AtomType::String | AtomType::Token => Ok(Value::String(extract_text(args)?)),
        AtomType::TokenArg => {
            let (tok, n) = match args {
                Some([ArgumentNode::List(parts)]) => match parts.as_slice() {
                    [ArgumentNode::String(s), ArgumentNode::Number(n)]
                    | [ArgumentNode::Identifier(s), ArgumentNode::Number(n)] => (s.clone(), *n),
                    _ => return Err(bad_argument("TOKENARG expects a token and a number")),
                },
                None => (String::new(), 0),
                _ => return Err(bad_argument("TOKENARG expects a token and a number")),
            };
            Ok(Value::List(vec![Value::String(tok), Value::Number(n)]))
        }
        AtomType::Gid => match single_arg(args)? {
            Some(ArgumentNode::Gid(text)) => Ok(Value::Gid(text.parse()?)),
            _ => Err(bad_argument("GID argument is required")),
        },
        AtomType::ObjStart => match single_arg(args)? {
            Some(ArgumentNode::ObjectType { type_name, title }) => {
                Ok(Value::ObjectType { type_name: type_name.clone(), title: title.clone() })
            }
            Some(ArgumentNode::Identifier(type_name)) => {
                Ok(Value::ObjectType { type_name: type_name.clone(), title: String::new() })
            }
            _ => Err(bad_argument("OBJSTART requires a type name")),
        },
        AtomType::Stream => match single_arg(args)? {
            Some(ArgumentNode::NestedStream { stream, trailing }) => {
                if !trailing.is_empty() {
                    return Err(bad_argument("STREAM atoms do not support trailing arguments"));
                }
                Ok(Value::Stream(Box::new(Stream::from_ast(stream)?)))
            }
            _ => Err(bad_argument("STREAM requires a nested stream argument")),
        },
        AtomType::AtomRef => match single_arg(args)? {
            Some(ArgumentNode::Identifier(name)) => {
                let referenced = crate::table::ATOM_TABLE
                    .by_name(name)
                    .ok_or_else(|| Error::new(ErrorKind::UnrecognizedAtom(name.clone()), format!("unknown atom '{name}'")))?;
                Ok(Value::Raw(vec![referenced.protocol, referenced.atom_number]))
            }
            _ => Err(bad_argument("ATOM reference requires an atom name")),
        },
        AtomType::Bool => match single_arg(args)? {
            None => Ok(Value::Boolean(true)),
            Some(ArgumentNode::Identifier(s)) if s == "yes" || s == "true" => Ok(Value::Boolean(true)),
            Some(ArgumentNode::Identifier(s)) if s == "no" || s == "false" => Ok(Value::Boolean(false)),
            _ => Err(bad_argument("BOOL argument must be 'yes' or 'no'")),
        },
        AtomType::Orient => match single_arg(args)? {
            Some(ArgumentNode::Identifier(code)) => {
                let byte = orientation::encode(code)?;
                Ok(Value::Orientation(orientation::decode(byte)?))
            }
            _ => Err(bad_argument("ORIENT requires a 3-letter code")),
        },
        AtomType::Criterion => match single_arg(args)? {
            Some(ArgumentNode::Identifier(name)) => {
                let byte = criterion::parse(name).ok_or_else(|| bad_argument(format!("unknown criterion '{name}'")))?;
                Ok(Value::Number(byte as i64))
            }
            Some(ArgumentNode::Number(n)) => Ok(Value::Number(*n)),
            _ => Err(bad_argument("CRITERION requires a name or number")),
        },
        AtomType::Var | AtomType::VarDword => match args {
            Some([ArgumentNode::List(parts)]) => match parts.as_slice() {
                [ArgumentNode::Identifier(letter), ArgumentNode::Number(n)] => {
                    Ok(Value::ObjectType { type_name: letter.clone(), title: n.to_string() })
                }
                _ => Err(bad_argument("VAR number form expects a letter and a number")),
            },
            _ => Err(bad_argument("VAR number form expects a letter and a number")),
        },
        AtomType::VarString => match single_arg(args)? {
            Some(ArgumentNode::ObjectType { type_name, title }) => {
                Ok(Value::ObjectType { type_name: type_name.clone(), title: title.clone() })
            }
            _ => Err(bad_argument("VAR string form expects a letter and a string")),
        },
        AtomType::VarLookup => match single_arg(args)? {
            Some(ArgumentNode::Identifier(letter)) => Ok(Value::ObjectType { type_name: letter.clone(), title: String::new() }),
            _ => Err(bad_argument("VAR lookup expects a single letter")),
        },
    }
}

fn list_of_numbers(args: Option<&[ArgumentNode]>) -> crate::error::Result<Vec<Value>> {
    let nodes: Vec<ArgumentNode> = match args {
        None => Vec::new(),
        Some([ArgumentNode::List(parts)]) => parts.clone(),
        Some([single]) => vec![single.clone()],
        Some(_) => return Err(bad_argument("expected a list of numbers")),
    };
    nodes
        .into_iter()
        .map(|node| match node {
            ArgumentNode::Number(n) => Ok(Value::Number(n)),
            _ => Err(bad_argument("list-of-bytes argument must be numeric")),
        })
        .collect()
}

/// Encodes a [`Value`] to its wire payload per `def`'s declared type and any per-atom override
/// (`spec.md` §4.3).
pub fn to_payload(def: AtomDefinition, value: &Value) -> crate::error::Result<Vec<u8>> {
    if def.protocol == overrides::IF_PROTOCOL {
        let items = match value {
            Value::List(items) => items,
            _ => return Err(wrong_type()),
        };
        return items.iter().map(|v| v.as_number().map(|n| n as u8)).collect();
    }

    match def.atom_type {
        AtomType::Raw => Ok(value.as_raw()?.to_vec()),
        AtomType::Dword => {
            let n = value.as_number()?;
            let width = overrides::fixed_dword_width(def.name).unwrap_or_else(|| minimal_be_width(n));
            let mut out = Vec::new();
            write_be_int(&mut out, n, width);
            Ok(out)
        }
        AtomType::String | AtomType::Token => iso8859_1_encode(value.as_string()?),
        AtomType::TokenArg => match value {
            Value::List(parts) => match parts.as_slice() {
                [Value::String(tok), Value::Number(n)] => {
                    let tok_bytes = iso8859_1_encode(tok)?;
                    let mut out = vec![tok_bytes.len() as u8];
                    out.extend_from_slice(&tok_bytes);
                    let width = minimal_be_width(*n);
                    out.push(width as u8);
                    write_be_int(&mut out, *n, width);
                    Ok(out)
                }
                _ => Err(wrong_type()),
            },
            _ => Err(wrong_type()),
        },
        AtomType::Gid => Ok(value.as_gid()?.encode()),
        AtomType::ObjStart => match value {
            Value::ObjectType { type_name, title } => {
                let byte = object_types::byte_of(type_name)
                    .ok_or_else(|| bad_argument(format!("unknown object type '{type_name}'")))?;
                let mut out = vec![byte];
                out.extend(iso8859_1_encode(title)?);
                Ok(out)
            }
            _ => Err(wrong_type()),
        },
        AtomType::Stream => Ok(value.as_stream()?.to_bytes()),
        AtomType::AtomRef => Ok(value.as_raw()?.to_vec()),
        AtomType::Bool => Ok(vec![if value.as_boolean()? { 0x01 } else { 0x00 }]),
        AtomType::Orient => match value {
            Value::Orientation(code) => Ok(vec![orientation::encode(code)?]),
            _ => Err(wrong_type()),
        },
        AtomType::Criterion => Ok(vec![value.as_number()? as u8]),
        AtomType::Var => match value {
            Value::ObjectType { type_name, title } => {
                let letter = single_letter(type_name)?;
                let n: i64 = title.parse().map_err(|_| bad_argument("VAR number form has a non-numeric title"))?;
                let width = minimal_be_width(n);
                let mut out = vec![letter];
                write_be_int(&mut out, n, width);
                Ok(out)
            }
            _ => Err(wrong_type()),
        },
        AtomType::VarDword => match value {
            Value::ObjectType { type_name, title } => {
                let letter = single_letter(type_name)?;
                let n: i64 = title.parse().map_err(|_| bad_argument("VAR dword form has a non-numeric title"))?;
                let mut out = vec![letter];
                write_be_int(&mut out, n, 4);
                Ok(out)
            }
            _ => Err(wrong_type()),
        },
        AtomType::VarString => match value {
            Value::ObjectType { type_name, title } => {
                let letter = single_letter(type_name)?;
                let mut out = vec![letter];
                out.extend(iso8859_1_encode(title)?);
                Ok(out)
            }
            _ => Err(wrong_type()),
        },
        AtomType::VarLookup => match value {
            Value::ObjectType { type_name, .. } => Ok(vec![single_letter(type_name)?]),
            _ => Err(wrong_type()),
        },
    }
}

fn single_letter(text: &str) -> crate::error::Result<u8> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c as u8),
        _ => Err(bad_argument(format!("'{text}' is not a single letter"))),
    }
}

/// Decodes a payload into a [`Value`] per `def`'s declared type and any per-atom override
/// (`spec.md` §4.3, §4.6).
pub fn from_payload(def: AtomDefinition, payload: &[u8]) -> crate::error::Result<Value> {
    if def.protocol == overrides::IF_PROTOCOL {
        return Ok(Value::List(payload.iter().map(|&b| Value::Number(b as i64)).collect()));
    }

    match def.atom_type {
        AtomType::Raw => Ok(Value::Raw(payload.to_vec())),
        AtomType::Dword => {
            if payload.is_empty() {
                return Ok(Value::Number(0));
            }
            let mut reader = payload;
            Ok(Value::Number(reader.read_be_int(payload.len().min(8))?))
        }
        AtomType::String | AtomType::Token => Ok(Value::String(iso8859_1_decode(payload))),
        AtomType::TokenArg => {
            if payload.is_empty() {
                return Ok(Value::List(vec![Value::String(String::new()), Value::Number(0)]));
            }
            let tok_len = payload[0] as usize;
            let tok = iso8859_1_decode(&payload[1..1 + tok_len]);
            let rest = &payload[1 + tok_len..];
            let width = rest[0] as usize;
            let mut reader = &rest[1..1 + width];
            let n = reader.read_be_int(width)?;
            Ok(Value::List(vec![Value::String(tok), Value::Number(n)]))
        }
        AtomType::Gid => Ok(Value::Gid(FdoGid::decode(payload, overrides::prefers_three_part_gid(def.name))?)),
        AtomType::ObjStart => {
            if payload.is_empty() {
                return Err(Error::new(ErrorKind::InvalidBinaryFormat("empty OBJSTART payload".into()), "empty OBJSTART payload"));
            }
            let type_name = object_types::name_of(payload[0])
                .ok_or_else(|| Error::new(ErrorKind::InvalidBinaryFormat("unknown object type byte".into()), "unknown object type byte"))?
                .to_owned();
            Ok(Value::ObjectType { type_name, title: iso8859_1_decode(&payload[1..]) })
        }
        AtomType::Stream => Ok(Value::Stream(Box::new(Stream::decode(payload)?))),
        AtomType::AtomRef => Ok(Value::Raw(payload.to_vec())),
        AtomType::Bool => Ok(Value::Boolean(payload.first().copied().unwrap_or(0) != 0)),
        AtomType::Orient => Ok(Value::Orientation(orientation::decode(*payload.first().unwrap_or(&0))?)),
        AtomType::Criterion => Ok(Value::Number(*payload.first().unwrap_or(&0) as i64)),
        AtomType::Var => {
            let letter = *payload.first().unwrap_or(&b'?') as char;
            let mut reader = &payload[1.min(payload.len())..];
            let n = reader.read_be_int(reader.len())?;
            Ok(Value::ObjectType { type_name: letter.to_string(), title: n.to_string() })
        }
        AtomType::VarDword => {
            let letter = *payload.first().unwrap_or(&b'?') as char;
            let mut reader = &payload[1.min(payload.len())..];
            let n = reader.read_be_int(4)?;
            Ok(Value::ObjectType { type_name: letter.to_string(), title: n.to_string() })
        }
        AtomType::VarString => {
            let letter = *payload.first().unwrap_or(&b'?') as char;
            Ok(Value::ObjectType { type_name: letter.to_string(), title: iso8859_1_decode(&payload[1.min(payload.len())..]) })
        }
        AtomType::VarLookup => {
            let letter = *payload.first().unwrap_or(&b'?') as char;
            Ok(Value::ObjectType { type_name: letter.to_string(), title: String::new() })
        }
    }
}
