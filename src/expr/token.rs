//! Expression tokenizer
//!
//! Single-pass lexer over the raw attribute/content string. One alternation
//! pattern with named groups does all the work; group order is priority
//! order, and the final single-character catch-all guarantees the lexer
//! never gets stuck — unknown characters become [`Token::Unknown`] and are
//! rejected by the parser, not dropped here.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static TOKEN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?xs)
          (?P<number>[0-9]+(?:\.[0-9]+)?)
        | (?P<color>\#(?:[0-9a-fA-F]{8}|[0-9a-fA-F]{6}))
        | (?P<boolean>(?i:true|false)\b)
        | (?P<string>"[^"]*")
        | (?P<word>[a-zA-Z][a-zA-Z0-9_.]*)
        | (?P<operator><=|>=|==|!=|&&|\|\||[+\-*/%~!&|<>?:,])
        | (?P<bracket>[()\[\]])
        | (?P<whitespace>\s+)
        | (?P<unknown>.)
        "#,
    )
    .unwrap()
});

/// One lexical unit of the expression sub-language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Integer or fractional number. No exponent or suffix forms: a trailing
    /// letter lexes as a separate word and fails in the parser.
    Number(f64),
    /// `#RRGGBB` or `#AARRGGBB`, kept as written.
    Color(String),
    /// Case-insensitive `true`/`false`.
    Bool(bool),
    /// Double-quoted string, quotes stripped, no escape handling.
    Str(String),
    /// Identifier; dots allowed after the first letter for source names.
    Word(String),
    /// One of the fixed operator spellings.
    Operator(&'static str),
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    /// A character no other group matched. Always a parse error downstream.
    Unknown(String),
    /// Appended by the parser after the last real token.
    End,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{}", n),
            Token::Color(c) => write!(f, "{}", c),
            Token::Bool(b) => write!(f, "{}", b),
            Token::Str(s) => write!(f, "\"{}\"", s),
            Token::Word(w) => write!(f, "{}", w),
            Token::Operator(op) => write!(f, "{}", op),
            Token::OpenParen => write!(f, "("),
            Token::CloseParen => write!(f, ")"),
            Token::OpenBracket => write!(f, "["),
            Token::CloseBracket => write!(f, "]"),
            Token::Unknown(c) => write!(f, "{}", c),
            Token::End => write!(f, "<end>"),
        }
    }
}

const OPERATORS: &[&str] = &[
    "<=", ">=", "==", "!=", "&&", "||", "+", "-", "*", "/", "%", "~", "!", "&", "|", "<", ">",
    "?", ":", ",",
];

fn intern_operator(text: &str) -> &'static str {
    OPERATORS
        .iter()
        .copied()
        .find(|op| *op == text)
        .expect("operator group matched a spelling outside the operator table")
}

/// Tokenize `input`, yielding each token with its byte offset.
///
/// Whitespace is discarded. The stream is lazy and finite; the caller
/// appends [`Token::End`] to terminate it.
pub fn tokenize(input: &str) -> impl Iterator<Item = (Token, usize)> + '_ {
    TOKEN_PATTERN.captures_iter(input).filter_map(|caps| {
        if caps.name("whitespace").is_some() {
            return None;
        }
        let m = caps.get(0).unwrap();
        let token = if let Some(m) = caps.name("number") {
            Token::Number(m.as_str().parse().unwrap())
        } else if let Some(m) = caps.name("color") {
            Token::Color(m.as_str().to_string())
        } else if let Some(m) = caps.name("boolean") {
            Token::Bool(m.as_str().eq_ignore_ascii_case("true"))
        } else if let Some(m) = caps.name("string") {
            let s = m.as_str();
            Token::Str(s[1..s.len() - 1].to_string())
        } else if let Some(m) = caps.name("word") {
            Token::Word(m.as_str().to_string())
        } else if let Some(m) = caps.name("operator") {
            Token::Operator(intern_operator(m.as_str()))
        } else if let Some(m) = caps.name("bracket") {
            match m.as_str() {
                "(" => Token::OpenParen,
                ")" => Token::CloseParen,
                "[" => Token::OpenBracket,
                _ => Token::CloseBracket,
            }
        } else {
            Token::Unknown(m.as_str().to_string())
        };
        Some((token, m.start()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        tokenize(input).map(|(t, _)| t).collect()
    }

    #[test]
    fn test_arithmetic_scenario() {
        assert_eq!(
            tokens("(5 + 3) * 2"),
            vec![
                Token::OpenParen,
                Token::Number(5.0),
                Token::Operator("+"),
                Token::Number(3.0),
                Token::CloseParen,
                Token::Operator("*"),
                Token::Number(2.0),
            ]
        );
    }

    #[test]
    fn test_number_forms() {
        assert_eq!(tokens("0.6"), vec![Token::Number(0.6)]);
        // No suffix support: the letter lexes separately.
        assert_eq!(
            tokens("5x"),
            vec![Token::Number(5.0), Token::Word("x".to_string())]
        );
    }

    #[test]
    fn test_colors() {
        assert_eq!(
            tokens("#FF0000 #80FF00FF"),
            vec![
                Token::Color("#FF0000".to_string()),
                Token::Color("#80FF00FF".to_string()),
            ]
        );
    }

    #[test]
    fn test_booleans_case_insensitive() {
        assert_eq!(tokens("TRUE"), vec![Token::Bool(true)]);
        assert_eq!(tokens("False"), vec![Token::Bool(false)]);
        // A word starting with "true" is a word, not a boolean.
        assert_eq!(tokens("trueness"), vec![Token::Word("trueness".to_string())]);
    }

    #[test]
    fn test_dotted_words() {
        assert_eq!(
            tokens("WEATHER.CURRENT.TEMPERATURE"),
            vec![Token::Word("WEATHER.CURRENT.TEMPERATURE".to_string())]
        );
    }

    #[test]
    fn test_two_char_operators_win() {
        assert_eq!(
            tokens("a<=b"),
            vec![
                Token::Word("a".to_string()),
                Token::Operator("<="),
                Token::Word("b".to_string()),
            ]
        );
        assert_eq!(
            tokens("x||y"),
            vec![
                Token::Word("x".to_string()),
                Token::Operator("||"),
                Token::Word("y".to_string()),
            ]
        );
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(tokens("\"mon tue\""), vec![Token::Str("mon tue".to_string())]);
    }

    #[test]
    fn test_unknown_character_surfaces() {
        assert_eq!(
            tokens("1 @ 2"),
            vec![
                Token::Number(1.0),
                Token::Unknown("@".to_string()),
                Token::Number(2.0),
            ]
        );
    }

    #[test]
    fn test_offsets() {
        let pairs: Vec<_> = tokenize("1 + 22").collect();
        assert_eq!(pairs[0].1, 0);
        assert_eq!(pairs[1].1, 2);
        assert_eq!(pairs[2].1, 4);
    }
}
