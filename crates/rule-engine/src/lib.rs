//! Clipsmith Rule Engine
//!
//! Interprets the loosely structured instruction text produced by the
//! rule generator:
//! - **Keywords:** Fixed keyword table with a declared precedence order
//! - **Interpreter:** Line-by-line classification into edit operations
//!
//! This crate is pure computation: no I/O, no errors. Unrecognized lines
//! are dropped, so the worst case is an empty operation list.

pub mod interpreter;
pub mod keywords;

pub use interpreter::{classify_line, parse, parse_str};
pub use keywords::Keyword;
