//! Token stream with lookahead over spanned filter tokens

use super::Token;
use crate::utils::Span;

/// Token paired with its location in the filter text
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
}

impl SpannedToken {
    pub fn new(token: Token, span: Span) -> Self {
        Self { token, span }
    }
}

/// Token stream always terminated by `Token::Eof`
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<SpannedToken>,
    position: usize,
}

impl TokenStream {
    /// Create a stream, appending an Eof token if the input lacks one
    pub fn new(mut tokens: Vec<SpannedToken>) -> Self {
        if !matches!(tokens.last(), Some(t) if t.token == Token::Eof) {
            let end = tokens.last().map(|t| Span::point(t.span.end)).unwrap_or_default();
            tokens.push(SpannedToken::new(Token::Eof, end));
        }
        Self {
            tokens,
            position: 0,
        }
    }

    pub fn current(&self) -> &SpannedToken {
        let index = self.position.min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    pub fn current_token(&self) -> &Token {
        &self.current().token
    }

    pub fn current_span(&self) -> Span {
        self.current().span
    }

    /// Look `n` tokens past the current one; saturates at Eof
    pub fn peek_ahead(&self, n: usize) -> &Token {
        let index = (self.position + n).min(self.tokens.len() - 1);
        &self.tokens[index].token
    }

    /// Consume and return the current token; Eof is never consumed
    pub fn advance(&mut self) -> SpannedToken {
        let token = self.current().clone();
        if token.token != Token::Eof {
            self.position += 1;
        }
        token
    }

    /// Consume the current token if it equals `expected`
    pub fn advance_if_matches(&mut self, expected: &Token) -> bool {
        if self.current_token() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.current_token() == &Token::Eof
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of tokens, excluding the trailing Eof
    pub fn len(&self) -> usize {
        self.tokens.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn tokens(&self) -> &[SpannedToken] {
        &self.tokens
    }
}
