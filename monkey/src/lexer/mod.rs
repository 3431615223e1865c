//! Lexer implementation using logos

mod token;

pub use token::{LexError, Token};

use crate::ast::Span;
use crate::error::{CompileError, Result};
use logos::Logos;

/// Tokenize source code
pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::new(lexer.span().start, lexer.span().end);
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(LexError::UnexpectedCharacter) => {
                return Err(CompileError::lexer(
                    format!("unexpected character: {:?}", lexer.slice()),
                    span,
                ));
            }
            Err(LexError::IntegerOutOfRange) => {
                return Err(CompileError::lexer(
                    format!("integer literal out of range: {}", lexer.slice()),
                    span,
                ));
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|(t, _)| t)
            .collect()
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").unwrap().is_empty());
    }

    #[test]
    fn test_tokenize_keywords() {
        assert_eq!(
            kinds("let if else true false null"),
            vec![
                Token::Let,
                Token::If,
                Token::Else,
                Token::True,
                Token::False,
                Token::Null
            ]
        );
    }

    #[test]
    fn test_tokenize_let_statement() {
        assert_eq!(
            kinds("let five = 5;"),
            vec![
                Token::Let,
                Token::Ident("five".to_string()),
                Token::Assign,
                Token::IntLit(5),
                Token::Semi
            ]
        );
    }

    #[test]
    fn test_tokenize_operators() {
        assert_eq!(
            kinds("+ - * / ! < > == !="),
            vec![
                Token::Plus,
                Token::Minus,
                Token::Star,
                Token::Slash,
                Token::Bang,
                Token::Lt,
                Token::Gt,
                Token::EqEq,
                Token::NotEq
            ]
        );
    }

    #[test]
    fn test_tokenize_delimiters() {
        assert_eq!(
            kinds("( ) { } [ ] , ; :"),
            vec![
                Token::LParen,
                Token::RParen,
                Token::LBrace,
                Token::RBrace,
                Token::LBracket,
                Token::RBracket,
                Token::Comma,
                Token::Semi,
                Token::Colon
            ]
        );
    }

    #[test]
    fn test_tokenize_builtin_call() {
        assert_eq!(
            kinds(r#"char_at("héllo", 1)"#),
            vec![
                Token::Ident("char_at".to_string()),
                Token::LParen,
                Token::StringLit("héllo".to_string()),
                Token::Comma,
                Token::IntLit(1),
                Token::RParen
            ]
        );
    }

    #[test]
    fn test_tokenize_skips_comments() {
        assert_eq!(kinds("// nothing here\n42"), vec![Token::IntLit(42)]);
    }

    #[test]
    fn test_tokenize_spans() {
        let tokens = tokenize("let x").unwrap();
        assert_eq!(tokens[0].1, Span::new(0, 3));
        assert_eq!(tokens[1].1, Span::new(4, 5));
    }

    #[test]
    fn test_tokenize_invalid_character() {
        let err = tokenize("let x = @;").unwrap_err();
        assert_eq!(err.span(), Some(Span::new(8, 9)));
        assert!(err.message().contains("unexpected character"));
    }

    #[test]
    fn test_tokenize_integer_out_of_range() {
        let err = tokenize("len(99999999999999999999)").unwrap_err();
        assert_eq!(
            err.message(),
            "integer literal out of range: 99999999999999999999"
        );
        assert_eq!(err.span(), Some(Span::new(4, 24)));
    }

    #[test]
    fn test_tokenize_largest_integer() {
        assert_eq!(
            kinds("9223372036854775807"),
            vec![Token::IntLit(i64::MAX)]
        );
    }

    #[test]
    fn test_tokenize_unterminated_string_fails() {
        assert!(tokenize("\"open").is_err());
    }
}
