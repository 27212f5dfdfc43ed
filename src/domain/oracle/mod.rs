//! Oracle-facing domain logic: reply sanitization and prompt schemas.

pub mod prompts;
mod sanitizer;

pub use sanitizer::{OracleParseError, ResponseSanitizer};
