//! Macros backing the lexer's pattern table.

/// Builds a [`Token`](crate::lexer::tokens::Token) from a kind, its text and
/// its span.
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $value:expr, $span:expr) => {
        Token {
            kind: $kind,
            value: $value,
            span: $span,
        }
    };
}

/// A handler for patterns that always lex to the same fixed text, such as
/// punctuation and operators.
///
/// ```ignore
/// RegexPattern { regex: Regex::new("^->").unwrap(), handler: MK_DEFAULT_HANDLER!(TokenKind::Arrow, "->") }
/// ```
#[macro_export]
macro_rules! MK_DEFAULT_HANDLER {
    ($kind:expr, $value:literal) => {
        |lexer: &mut Lexer, _regex: &Regex| {
            lexer.push_token($kind, String::from($value), $value.len());
            Ok(())
        }
    };
}
