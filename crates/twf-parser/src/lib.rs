//! AST model and recursive-descent parser for TWF source text (§3, §4.2,
//! §6.1).

pub mod ast;
pub mod parser;

pub use ast::{Definition, File};
pub use parser::{parse_strict, parse_tolerant};
