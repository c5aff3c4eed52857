//! A codec for the FDO textual UI description language and its tagged binary atom stream.
//!
//! The pipeline is: [`text::Parser`] turns source text into a [`text::StreamNode`]; [`value`]
//! converts its arguments into typed [`value::Value`]s; [`binary`] serialises those into the
//! wire format. Decoding runs the same pipeline in reverse, ending at [`pretty::render`].

pub mod binary;
pub mod criterion;
pub mod error;
pub mod gid;
pub mod model;
pub mod orientation;
pub mod table;
pub mod text;
pub mod util;
pub mod value;

mod pretty;

pub use error::{Error, ErrorKind, Result};
pub use gid::FdoGid;
pub use model::{Atom, Stream};
pub use table::{AtomDefinition, AtomTable, AtomType, ATOM_TABLE};
pub use value::Value;

/// Compiles FDO source text into its binary atom-stream form, using the `FULL`-only style
/// (`spec.md` §9).
pub fn compile(src: &str) -> Result<Vec<u8>> {
    let ast = text::Parser::parse(src)?;
    let stream = model::Stream::from_ast(&ast)?;
    Ok(stream.to_bytes())
}

/// Decompiles a binary atom stream back into FDO source text.
pub fn decompile(bytes: &[u8]) -> Result<String> {
    let stream = model::Stream::decode(bytes)?;
    Ok(pretty::render(&stream))
}
