//! Core lexical analyzer for OData filter expressions

use crate::config::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::tokens::{SpannedToken, Token, TokenStream};
use crate::utils::{Position, Span};
use crate::{log_debug, log_error, log_success};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Lexical analysis errors with compile-time security boundaries
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LexerError {
    #[error("Invalid character '{character}' at {span}")]
    InvalidCharacter { character: char, span: Span },

    #[error("Unterminated string literal starting at {span}")]
    UnterminatedString { span: Span },

    #[error("Invalid number format '{text}' at {span}")]
    InvalidNumber { text: String, span: Span },

    #[error("Identifier too long: {length} characters (max {MAX_IDENTIFIER_LENGTH})")]
    IdentifierTooLong { length: usize, span: Span },

    #[error("String too large: {size} bytes (max {MAX_STRING_SIZE})")]
    StringTooLarge { size: usize, span: Span },

    #[error("Too many tokens: {count} (max {MAX_TOKEN_COUNT})")]
    TooManyTokens { count: usize },

    #[error("Filter expression too long: {length} bytes (max {MAX_EXPRESSION_LENGTH})")]
    ExpressionTooLong { length: usize },
}

impl LexerError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            LexerError::InvalidCharacter { .. } => codes::lexical::INVALID_CHARACTER,
            LexerError::UnterminatedString { .. } => codes::lexical::UNTERMINATED_STRING,
            LexerError::InvalidNumber { .. } => codes::lexical::INVALID_NUMBER,
            LexerError::IdentifierTooLong { .. } => codes::lexical::IDENTIFIER_TOO_LONG,
            LexerError::StringTooLarge { .. } => codes::lexical::STRING_TOO_LARGE,
            LexerError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
            LexerError::ExpressionTooLong { .. } => codes::lexical::EXPRESSION_TOO_LONG,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            LexerError::InvalidCharacter { span, .. }
            | LexerError::UnterminatedString { span }
            | LexerError::InvalidNumber { span, .. }
            | LexerError::IdentifierTooLong { span, .. }
            | LexerError::StringTooLarge { span, .. } => Some(*span),
            LexerError::TooManyTokens { .. } | LexerError::ExpressionTooLong { .. } => None,
        }
    }
}

/// Essential lexical analysis metrics
#[derive(Debug, Default, Clone)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub identifier_tokens: usize,
    pub literal_tokens: usize,
    pub punctuation_tokens: usize,
    pub max_string_length: usize,

    /// Operator word counts, populated when `track_operator_patterns` is on
    pub operator_usage_patterns: HashMap<String, usize>,
}

impl LexicalMetrics {
    pub(crate) fn record_token(&mut self, token: &Token, preferences: &LexicalPreferences) {
        self.total_tokens += 1;

        if token.is_identifier() {
            self.identifier_tokens += 1;
            if preferences.track_operator_patterns && token.is_operator_word() {
                if let Some(word) = token.as_identifier() {
                    *self
                        .operator_usage_patterns
                        .entry(word.to_ascii_lowercase())
                        .or_insert(0) += 1;
                }
            }
        } else if token.is_literal() {
            self.literal_tokens += 1;
        } else if token.is_punctuation() {
            self.punctuation_tokens += 1;
        }
    }

    pub(crate) fn record_string_length(&mut self, length: usize) {
        self.max_string_length = self.max_string_length.max(length);
    }
}

// Anchored patterns for literals that would otherwise lex as numbers or names
fn date_time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}(:\d{2}(\.\d{1,12})?)?(Z|[+-]\d{2}:\d{2})?")
            .expect("valid datetime pattern")
    })
}

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("valid date pattern"))
}

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\d{2}:\d{2}(:\d{2}(\.\d{1,12})?)?").expect("valid time pattern")
    })
}

fn guid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12}",
        )
        .expect("valid guid pattern")
    })
}

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\d+(\.\d+)?([eE][+-]?\d+)?").expect("valid number pattern")
    })
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_identifier_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Lexical analyzer over a single filter expression
pub struct LexicalAnalyzer {
    metrics: LexicalMetrics,
    preferences: LexicalPreferences,
}

impl LexicalAnalyzer {
    pub fn new() -> Self {
        Self::with_preferences(LexicalPreferences::default())
    }

    pub fn with_preferences(preferences: LexicalPreferences) -> Self {
        Self {
            metrics: LexicalMetrics::default(),
            preferences,
        }
    }

    pub fn metrics(&self) -> &LexicalMetrics {
        &self.metrics
    }

    /// Tokenize a filter expression into an Eof-terminated stream
    pub fn tokenize(&mut self, source: &str) -> Result<TokenStream, LexerError> {
        self.metrics = LexicalMetrics::default();

        if source.len() > MAX_EXPRESSION_LENGTH {
            let error = LexerError::ExpressionTooLong {
                length: source.len(),
            };
            log_error!(error.error_code(), "Filter expression exceeds length limit",
                "length" => source.len(),
                "limit" => MAX_EXPRESSION_LENGTH
            );
            return Err(error);
        }

        let mut cursor = Cursor::new(source);
        let mut tokens = Vec::new();

        loop {
            cursor.skip_whitespace();
            if cursor.is_at_end() {
                break;
            }

            if tokens.len() >= MAX_TOKEN_COUNT {
                let error = LexerError::TooManyTokens {
                    count: tokens.len(),
                };
                log_error!(error.error_code(), "Token limit exceeded",
                    "token_count" => tokens.len(),
                    "limit" => MAX_TOKEN_COUNT
                );
                return Err(error);
            }

            let token = match self.next_token(&mut cursor) {
                Ok(token) => token,
                Err(error) => {
                    log_error!(error.error_code(), &error.to_string());
                    return Err(error);
                }
            };

            if self.preferences.log_tokens {
                log_debug!("Token",
                    "token" => &token.token,
                    "span" => token.span
                );
            }

            self.metrics.record_token(&token.token, &self.preferences);
            tokens.push(token);
        }

        tokens.push(SpannedToken::new(Token::Eof, Span::point(cursor.position)));

        log_success!(codes::success::TOKENIZATION_COMPLETE, "Tokenization completed",
            "tokens" => self.metrics.total_tokens,
            "identifiers" => self.metrics.identifier_tokens,
            "literals" => self.metrics.literal_tokens
        );

        Ok(TokenStream::new(tokens))
    }

    fn next_token(&mut self, cursor: &mut Cursor<'_>) -> Result<SpannedToken, LexerError> {
        let start = cursor.position;
        let ch = cursor.peek().unwrap_or('\0');

        let token = match ch {
            '(' => cursor.single(Token::LeftParen),
            ')' => cursor.single(Token::RightParen),
            ',' => cursor.single(Token::Comma),
            ':' => cursor.single(Token::Colon),
            '/' => cursor.single(Token::Slash),
            '-' => cursor.single(Token::Minus),
            '\'' => Token::String(self.lex_string(cursor)?),
            c if c.is_ascii_digit() => self.lex_numeric(cursor)?,
            c if c.is_ascii_hexdigit() && cursor.take_match(guid_pattern()).is_some() => {
                Token::Guid(cursor.text_from(start).to_string())
            }
            c if is_identifier_start(c) => self.lex_word(cursor)?,
            other => {
                let span = Span::new(start, start.advance(other));
                return Err(LexerError::InvalidCharacter {
                    character: other,
                    span,
                });
            }
        };

        Ok(SpannedToken::new(token, Span::new(start, cursor.position)))
    }

    /// Single-quoted string; a doubled quote is an escaped quote
    fn lex_string(&mut self, cursor: &mut Cursor<'_>) -> Result<String, LexerError> {
        let start = cursor.position;
        cursor.bump();

        let mut value = String::new();
        loop {
            match cursor.bump() {
                Some('\'') => {
                    if cursor.peek() == Some('\'') {
                        cursor.bump();
                        value.push('\'');
                    } else {
                        break;
                    }
                }
                Some(c) => value.push(c),
                None => {
                    return Err(LexerError::UnterminatedString {
                        span: Span::new(start, cursor.position),
                    })
                }
            }

            if value.len() > MAX_STRING_SIZE {
                return Err(LexerError::StringTooLarge {
                    size: value.len(),
                    span: Span::new(start, cursor.position),
                });
            }
        }

        self.metrics.record_string_length(value.len());
        Ok(value)
    }

    /// Date/time, guid and number literals all start with a digit
    fn lex_numeric(&mut self, cursor: &mut Cursor<'_>) -> Result<Token, LexerError> {
        let start = cursor.position;

        if cursor.take_match(date_time_pattern()).is_some() {
            return Ok(Token::DateTimeOffset(cursor.text_from(start).to_string()));
        }
        if cursor.take_match(guid_pattern()).is_some() {
            return Ok(Token::Guid(cursor.text_from(start).to_string()));
        }
        if cursor.take_match(date_pattern()).is_some() {
            return Ok(Token::Date(cursor.text_from(start).to_string()));
        }
        if cursor.take_match(time_pattern()).is_some() {
            return Ok(Token::TimeOfDay(cursor.text_from(start).to_string()));
        }

        cursor.take_match(number_pattern());
        let text = cursor.text_from(start).to_string();

        // Trailing letters such as `12abc` make the literal malformed
        if cursor.peek().map(is_identifier_continue).unwrap_or(false) {
            while cursor.peek().map(is_identifier_continue).unwrap_or(false) {
                cursor.bump();
            }
            return Err(LexerError::InvalidNumber {
                text: cursor.text_from(start).to_string(),
                span: Span::new(start, cursor.position),
            });
        }

        let invalid = || LexerError::InvalidNumber {
            text: text.clone(),
            span: Span::new(start, cursor.position),
        };

        if text.contains(['.', 'e', 'E']) {
            text.parse::<f64>().map(Token::Decimal).map_err(|_| invalid())
        } else {
            // Integers beyond i64 degrade to decimals
            match text.parse::<i64>() {
                Ok(value) => Ok(Token::Integer(value)),
                Err(_) => text.parse::<f64>().map(Token::Decimal).map_err(|_| invalid()),
            }
        }
    }

    fn lex_word(&mut self, cursor: &mut Cursor<'_>) -> Result<Token, LexerError> {
        let start = cursor.position;
        cursor.bump();
        while cursor.peek().map(is_identifier_continue).unwrap_or(false) {
            cursor.bump();
        }

        // Qualified names such as `Sample.UserType` for enum literals
        while cursor.peek() == Some('.')
            && cursor
                .peek_second()
                .map(is_identifier_start)
                .unwrap_or(false)
        {
            cursor.bump();
            while cursor.peek().map(is_identifier_continue).unwrap_or(false) {
                cursor.bump();
            }
        }

        let word = cursor.text_from(start);
        let length = word.chars().count();
        if length > MAX_IDENTIFIER_LENGTH {
            return Err(LexerError::IdentifierTooLong {
                length,
                span: Span::new(start, cursor.position),
            });
        }

        let token = match word {
            "true" => Token::Boolean(true),
            "false" => Token::Boolean(false),
            "null" => Token::Null,
            "INF" => Token::Decimal(f64::INFINITY),
            "NaN" => Token::Decimal(f64::NAN),
            w if w.eq_ignore_ascii_case("duration") && cursor.peek() == Some('\'') => {
                Token::Duration(self.lex_string(cursor)?)
            }
            w if w.contains('.') && cursor.peek() == Some('\'') => {
                let type_name = w.to_string();
                Token::Enum {
                    type_name,
                    value: self.lex_string(cursor)?,
                }
            }
            w => Token::Identifier(w.to_string()),
        };
        Ok(token)
    }
}

impl Default for LexicalAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Character cursor tracking line/column positions
struct Cursor<'a> {
    source: &'a str,
    position: Position,
}

impl<'a> Cursor<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            position: Position::start(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.source[self.position.offset..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.rest().chars().nth(1)
    }

    fn is_at_end(&self) -> bool {
        self.rest().is_empty()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position = self.position.advance(ch);
        Some(ch)
    }

    fn single(&mut self, token: Token) -> Token {
        self.bump();
        token
    }

    fn skip_whitespace(&mut self) {
        while self.peek().map(char::is_whitespace).unwrap_or(false) {
            self.bump();
        }
    }

    /// Consume the text matched by an anchored pattern
    fn take_match(&mut self, pattern: &Regex) -> Option<&'a str> {
        let matched = pattern.find(self.rest())?.as_str();
        for ch in matched.chars() {
            self.position = self.position.advance(ch);
        }
        Some(matched)
    }

    fn text_from(&self, start: Position) -> &'a str {
        &self.source[start.offset..self.position.offset]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token> {
        let mut analyzer = LexicalAnalyzer::new();
        analyzer
            .tokenize(source)
            .unwrap()
            .tokens()
            .iter()
            .map(|t| t.token.clone())
            .collect()
    }

    #[test]
    fn test_simple_comparison() {
        assert_eq!(
            lex("id eq 1"),
            vec![
                Token::Identifier("id".into()),
                Token::Identifier("eq".into()),
                Token::Integer(1),
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_string_escape() {
        assert_eq!(
            lex("name eq 'O''Neil'")[2],
            Token::String("O'Neil".to_string())
        );
    }

    #[test]
    fn test_unquoted_datetime_and_date() {
        let tokens = lex("createDate gt 2021-01-02T12:00:00Z and d eq 2021-01-02");
        assert_eq!(
            tokens[2],
            Token::DateTimeOffset("2021-01-02T12:00:00Z".to_string())
        );
        assert_eq!(tokens[6], Token::Date("2021-01-02".to_string()));
    }

    #[test]
    fn test_guid_starting_with_letter() {
        let tokens = lex("id eq cbd3b7e6-0f2a-4c4f-9a5e-0123456789ab");
        assert_eq!(
            tokens[2],
            Token::Guid("cbd3b7e6-0f2a-4c4f-9a5e-0123456789ab".to_string())
        );
    }

    #[test]
    fn test_decimal_and_minus() {
        assert_eq!(
            lex("id gt -1.5"),
            vec![
                Token::Identifier("id".into()),
                Token::Identifier("gt".into()),
                Token::Minus,
                Token::Decimal(1.5),
                Token::Eof
            ]
        );
    }

    #[test]
    fn test_lambda_punctuation() {
        let tokens = lex("logins/any(s: s/name eq 'x')");
        assert_eq!(tokens[1], Token::Slash);
        assert_eq!(tokens[3], Token::LeftParen);
        assert_eq!(tokens[5], Token::Colon);
    }

    #[test]
    fn test_keywords_and_duration() {
        let tokens = lex("enabled eq true or x eq null or t eq duration'P1D'");
        assert_eq!(tokens[2], Token::Boolean(true));
        assert_eq!(tokens[6], Token::Null);
        assert_eq!(tokens[10], Token::Duration("P1D".to_string()));
    }

    #[test]
    fn test_enum_literal_and_special_numbers() {
        let tokens = lex("type has Sample.UserType'Employee' and x lt INF");
        assert_eq!(
            tokens[2],
            Token::Enum {
                type_name: "Sample.UserType".to_string(),
                value: "Employee".to_string()
            }
        );
        assert_eq!(tokens[6], Token::Decimal(f64::INFINITY));
    }

    #[test]
    fn test_unterminated_string() {
        let err = LexicalAnalyzer::new().tokenize("name eq 'abc").unwrap_err();
        assert!(matches!(err, LexerError::UnterminatedString { .. }));
        assert_eq!(err.error_code(), codes::lexical::UNTERMINATED_STRING);
    }

    #[test]
    fn test_invalid_character() {
        let err = LexicalAnalyzer::new().tokenize("id eq #1").unwrap_err();
        match err {
            LexerError::InvalidCharacter { character, span } => {
                assert_eq!(character, '#');
                assert_eq!(span.start.column, 7);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_invalid_number() {
        let err = LexicalAnalyzer::new().tokenize("id eq 12abc").unwrap_err();
        assert!(matches!(err, LexerError::InvalidNumber { ref text, .. } if text == "12abc"));
    }

    #[test]
    fn test_expression_too_long() {
        let source = "a".repeat(MAX_EXPRESSION_LENGTH + 1);
        let err = LexicalAnalyzer::new().tokenize(&source).unwrap_err();
        assert!(matches!(err, LexerError::ExpressionTooLong { .. }));
    }

    #[test]
    fn test_operator_tracking() {
        let preferences = LexicalPreferences {
            track_operator_patterns: true,
            log_tokens: false,
        };
        let mut analyzer = LexicalAnalyzer::with_preferences(preferences);
        analyzer.tokenize("a eq 1 and b EQ 2").unwrap();

        let metrics = analyzer.metrics();
        assert_eq!(metrics.operator_usage_patterns.get("eq"), Some(&2));
        assert_eq!(metrics.operator_usage_patterns.get("and"), Some(&1));
        assert_eq!(metrics.literal_tokens, 2);
    }
}
