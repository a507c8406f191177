//! Natural-language question analysis: tokenization, keyword extraction,
//! and time expression recognition.

pub mod keywords;
pub mod lexer;
pub mod time;
