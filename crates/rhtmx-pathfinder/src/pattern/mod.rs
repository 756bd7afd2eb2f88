//! Pattern module: placeholder parsing and regex compilation
//!
//! Registration runs a pattern through three pure stages:
//! tag substitution ([`crate::tag`]) → [`parser`] → [`compiler`].

pub mod compiler;
pub mod parser;

// Re-export commonly used types
pub use compiler::{compile, compile_substituted, CompiledPattern, Variable};
pub use parser::{parse_placeholders, Placeholder, Token, DEFAULT_FRAGMENT};
