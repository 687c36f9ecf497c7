//! The arithmetic/logical expression sub-language embedded in attribute and
//! text values.
//!
//! Expressions are version-carrying: every function call and data source
//! reference narrows the range of format revisions able to evaluate the
//! expression, and that range feeds straight back into the document-level
//! version algebra.

pub mod ast;
pub mod parser;
pub mod registry;
pub mod token;

pub use ast::Expr;
pub use parser::{parse, ParseError, ParsedExpression};
pub use registry::VersionRegistry;
pub use token::{tokenize, Token};
