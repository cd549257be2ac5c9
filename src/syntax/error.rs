use thiserror::Error;

/// Errors from reading logical-form text.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SyntaxError {
    #[error("lexical error at byte {pos}")]
    Lex { pos: usize },

    #[error("unexpected {found} at byte {pos}, expected {expected}")]
    Unexpected {
        pos: usize,
        found: String,
        expected: String,
    },

    #[error("unexpected end of input, expected {expected}")]
    Eof { expected: String },
}
