//! A small hand-written lexer producing the token stream spec.md §1 and §6
//! describe as the parser's external collaborator. Lexing itself is out of
//! scope for the compiler's core per spec.md, but a complete, runnable
//! crate needs one somewhere — this module is intentionally thin (a single
//! linear pass, no lookahead state) so the parser/analyzer/generator core
//! remains the part under spec.

use crate::error::{Diagnostic, LexError};
use crate::token::{Token, TokenKind};

const KEYWORDS: &[&str] = &[
    "class", "extends", "public", "static", "void", "int", "boolean", "true",
    "false", "this", "new", "return", "if", "else", "while", "do", "for",
    "break", "continue",
];

/// Multi-character operators, longest first so the scanner never commits to
/// a short match (`=`) when a longer one (`==`) is available.
const MULTI_CHAR_OPERATORS: &[&str] =
    &[">>>", "==", "!=", "<=", ">=", "&&", "||", "+=", "-=", "*=", "/=",
      "&=", "|=", "^=", "++", "--"];

const SINGLE_CHAR_OPERATORS: &str = "+-*/%<>=!&|^~(){}[];,.";

/// Lexes `source` into a flat token vector, including whitespace tokens
/// (the [`crate::token::TokenStream`] adapter filters those out).
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    log::debug!("tokenize: {} bytes of source", source.len());
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut line: u32 = 1;
    let mut column: u32 = 1;

    while i < chars.len() {
        let start_line = line;
        let start_column = column;
        let c = chars[i];

        if c == '\n' {
            tokens.push(Token::new(
                TokenKind::Whitespace,
                "\n",
                start_line,
                start_column,
            ));
            i += 1;
            line += 1;
            column = 1;
            continue;
        }

        if c.is_whitespace() {
            let mut lexeme = String::new();
            while i < chars.len() && chars[i].is_whitespace() && chars[i] != '\n'
            {
                lexeme.push(chars[i]);
                i += 1;
                column += 1;
            }
            tokens.push(Token::new(
                TokenKind::Whitespace,
                lexeme,
                start_line,
                start_column,
            ));
            continue;
        }

        // Line comment.
        if c == '/' && chars.get(i + 1) == Some(&'/') {
            let mut lexeme = String::new();
            while i < chars.len() && chars[i] != '\n' {
                lexeme.push(chars[i]);
                i += 1;
                column += 1;
            }
            tokens.push(Token::new(
                TokenKind::Whitespace,
                lexeme,
                start_line,
                start_column,
            ));
            continue;
        }

        // Block comment.
        if c == '/' && chars.get(i + 1) == Some(&'*') {
            let mut lexeme = String::new();
            lexeme.push(chars[i]);
            lexeme.push(chars[i + 1]);
            i += 2;
            column += 2;
            while i < chars.len()
                && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/'))
            {
                if chars[i] == '\n' {
                    line += 1;
                    column = 1;
                } else {
                    column += 1;
                }
                lexeme.push(chars[i]);
                i += 1;
            }
            if i < chars.len() {
                lexeme.push(chars[i]);
                lexeme.push(chars[i + 1]);
                i += 2;
                column += 2;
            }
            tokens.push(Token::new(
                TokenKind::Whitespace,
                lexeme,
                start_line,
                start_column,
            ));
            continue;
        }

        // Hex / binary / decimal numbers.
        if c.is_ascii_digit() {
            if c == '0'
                && matches!(chars.get(i + 1), Some('x') | Some('X'))
            {
                let mut lexeme = String::new();
                lexeme.push(chars[i]);
                lexeme.push(chars[i + 1]);
                i += 2;
                column += 2;
                while i < chars.len() && chars[i].is_ascii_hexdigit() {
                    lexeme.push(chars[i]);
                    i += 1;
                    column += 1;
                }
                tokens.push(Token::new(
                    TokenKind::HexNumber,
                    lexeme,
                    start_line,
                    start_column,
                ));
                continue;
            }
            if c == '0'
                && matches!(chars.get(i + 1), Some('b') | Some('B'))
                && matches!(chars.get(i + 2), Some('0') | Some('1'))
            {
                let mut lexeme = String::new();
                lexeme.push(chars[i]);
                lexeme.push(chars[i + 1]);
                i += 2;
                column += 2;
                while i < chars.len() && (chars[i] == '0' || chars[i] == '1')
                {
                    lexeme.push(chars[i]);
                    i += 1;
                    column += 1;
                }
                tokens.push(Token::new(
                    TokenKind::BinaryNumber,
                    lexeme,
                    start_line,
                    start_column,
                ));
                continue;
            }

            let mut lexeme = String::new();
            while i < chars.len() && chars[i].is_ascii_digit() {
                lexeme.push(chars[i]);
                i += 1;
                column += 1;
            }
            tokens.push(Token::new(
                TokenKind::Number,
                lexeme,
                start_line,
                start_column,
            ));
            continue;
        }

        // Identifiers and keywords.
        if c.is_alphabetic() || c == '_' {
            let mut lexeme = String::new();
            while i < chars.len()
                && (chars[i].is_alphanumeric() || chars[i] == '_')
            {
                lexeme.push(chars[i]);
                i += 1;
                column += 1;
            }
            let kind = if KEYWORDS.contains(&lexeme.as_str()) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            };
            tokens.push(Token::new(kind, lexeme, start_line, start_column));
            continue;
        }

        // Operators, longest match first.
        let remaining: String = chars[i..].iter().take(3).collect();
        if let Some(op) = MULTI_CHAR_OPERATORS
            .iter()
            .find(|op| remaining.starts_with(*op))
        {
            tokens.push(Token::new(
                TokenKind::Operator,
                *op,
                start_line,
                start_column,
            ));
            i += op.chars().count();
            column += op.chars().count() as u32;
            continue;
        }

        if SINGLE_CHAR_OPERATORS.contains(c) {
            tokens.push(Token::new(
                TokenKind::Operator,
                c.to_string(),
                start_line,
                start_column,
            ));
            i += 1;
            column += 1;
            continue;
        }

        return Err(LexError(Diagnostic::at(
            format!("Unexpected character '{}'", c),
            crate::error::Location {
                line: start_line,
                column: start_column,
            },
        )));
    }

    log::debug!("tokenize: produced {} tokens", tokens.len());
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexemes(source: &str) -> Vec<String> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .filter(|t| t.kind != TokenKind::Whitespace)
            .map(|t| t.lexeme)
            .collect()
    }

    #[test]
    fn lexes_class_skeleton() {
        assert_eq!(
            lexemes("class Main { public static void main() { } }"),
            vec![
                "class", "Main", "{", "public", "static", "void", "main",
                "(", ")", "{", "}", "}"
            ]
        );
    }

    #[test]
    fn lexes_numbers_of_every_base() {
        let tokens = tokenize("42 0x2A 0b101010").unwrap();
        let kinds: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Whitespace)
            .map(|t| t.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Number,
                TokenKind::HexNumber,
                TokenKind::BinaryNumber
            ]
        );
    }

    #[test]
    fn lexes_compound_and_shift_operators() {
        assert_eq!(
            lexemes("x += 1; y >>>= 2; z++; w--;"),
            vec![
                "x", "+=", "1", ";", "y", ">>>", "=", "2", ";", "z", "++",
                ";", "w", "--", ";"
            ]
        );
    }

    #[test]
    fn tracks_line_and_column() {
        let tokens = tokenize("int x;\nint y;").unwrap();
        let y_tok = tokens
            .iter()
            .find(|t| t.lexeme == "y")
            .expect("y token present");
        assert_eq!(y_tok.line, 2);
    }

    #[test]
    fn skips_line_and_block_comments() {
        assert_eq!(
            lexemes("int x; // comment\n/* block \n comment */ int y;"),
            vec!["int", "x", ";", "int", "y", ";"]
        );
    }

    #[test]
    fn rejects_unknown_character() {
        let err = tokenize("int x = 1 @ 2;").unwrap_err();
        assert!(err.0.message.contains('@'));
    }
}
