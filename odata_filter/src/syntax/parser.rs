//! OData `$filter` parser
//!
//! Precedence-climbing parser that binds property paths against an
//! [`EntityModel`] while parsing. Lambda range variables are resolved
//! lexically and replaced by the path of the collection they range over.

use super::ast::{
    BinaryOperator, FilterExpression, LambdaKind, Literal, PropertyPath, UnaryOperator,
};
use super::error::{SyntaxError, SyntaxResult};
use crate::config::compile_time::syntax::*;
use crate::config::runtime::{LexicalPreferences, ParserPreferences};
use crate::lexical::LexicalAnalyzer;
use crate::log_debug;
use crate::model::{EntityModel, PropertyType};
use crate::tokens::{Token, TokenStream};
use crate::utils::Span;

/// Parses filter text into a bound expression.
///
/// The tree builder only depends on this trait, so any OData-compliant parser
/// can be plugged in.
pub trait FilterParser: Send + Sync {
    fn parse_filter(&self, expression: &str, model: &EntityModel)
        -> SyntaxResult<FilterExpression>;
}

/// Canonical functions with their (min, max) argument counts
const CANONICAL_FUNCTIONS: &[(&str, usize, usize)] = &[
    ("contains", 2, 2),
    ("startswith", 2, 2),
    ("endswith", 2, 2),
    ("length", 1, 1),
    ("indexof", 2, 2),
    ("substring", 2, 3),
    ("tolower", 1, 1),
    ("toupper", 1, 1),
    ("trim", 1, 1),
    ("concat", 2, 2),
    ("matchespattern", 2, 2),
    ("hassubset", 2, 2),
    ("hassubsequence", 2, 2),
    ("year", 1, 1),
    ("month", 1, 1),
    ("day", 1, 1),
    ("hour", 1, 1),
    ("minute", 1, 1),
    ("second", 1, 1),
    ("fractionalseconds", 1, 1),
    ("totalseconds", 1, 1),
    ("date", 1, 1),
    ("time", 1, 1),
    ("totaloffsetminutes", 1, 1),
    ("now", 0, 0),
    ("maxdatetime", 0, 0),
    ("mindatetime", 0, 0),
    ("round", 1, 1),
    ("floor", 1, 1),
    ("ceiling", 1, 1),
    ("isof", 1, 2),
    ("cast", 1, 2),
];

/// Argument count range of a canonical function (lowercase name)
pub fn function_arity(name: &str) -> Option<(usize, usize)> {
    CANONICAL_FUNCTIONS
        .iter()
        .find(|(candidate, _, _)| *candidate == name)
        .map(|(_, min, max)| (*min, *max))
}

/// Bundled OData v4 filter parser
#[derive(Debug, Clone, Default)]
pub struct ODataFilterParser {
    preferences: ParserPreferences,
    lexical: LexicalPreferences,
}

impl ODataFilterParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preferences(preferences: ParserPreferences, lexical: LexicalPreferences) -> Self {
        Self {
            preferences,
            lexical,
        }
    }

    pub fn preferences(&self) -> &ParserPreferences {
        &self.preferences
    }
}

impl FilterParser for ODataFilterParser {
    fn parse_filter(
        &self,
        expression: &str,
        model: &EntityModel,
    ) -> SyntaxResult<FilterExpression> {
        if expression.trim().is_empty() {
            return Err(SyntaxError::EmptyExpression);
        }

        let tokens = LexicalAnalyzer::with_preferences(self.lexical.clone()).tokenize(expression)?;

        log_debug!("Parsing filter expression",
            "tokens" => tokens.len(),
            "entity" => model.entity_type().unwrap_or("(untyped)")
        );

        Parser::new(tokens, model, &self.preferences).parse()
    }
}

/// Lambda variable in scope
#[derive(Debug, Clone)]
struct RangeScope {
    variable: String,
    path: PropertyPath,
    /// Element type of the collection; `None` when untyped
    element: Option<PropertyType>,
}

struct Parser<'a> {
    tokens: TokenStream,
    model: &'a EntityModel,
    preferences: &'a ParserPreferences,
    scopes: Vec<RangeScope>,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: TokenStream, model: &'a EntityModel, preferences: &'a ParserPreferences) -> Self {
        Self {
            tokens,
            model,
            preferences,
            scopes: Vec::new(),
            depth: 0,
        }
    }

    fn parse(&mut self) -> SyntaxResult<FilterExpression> {
        if self.tokens.is_empty() {
            return Err(SyntaxError::EmptyExpression);
        }

        let expression = self.parse_binary(0)?;

        if !self.tokens.is_at_end() {
            let current = self.tokens.current();
            return Err(SyntaxError::unexpected_token(
                "operator or end of expression",
                &current.token.describe(),
                current.span,
            ));
        }

        Ok(expression)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn enter(&mut self) -> SyntaxResult<()> {
        self.depth += 1;
        if self.depth > MAX_PARSE_DEPTH {
            return Err(SyntaxError::MaxRecursionDepth {
                span: self.tokens.current_span(),
            });
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn case_insensitive(&self) -> bool {
        self.preferences.case_insensitive
    }

    fn expect(&mut self, expected: &Token, description: &str) -> SyntaxResult<Span> {
        let current = self.tokens.current();
        if &current.token == expected {
            Ok(self.tokens.advance().span)
        } else {
            Err(self.unexpected(description))
        }
    }

    /// Error for the current token not matching `expected`
    fn unexpected(&self, expected: &str) -> SyntaxError {
        let current = self.tokens.current();
        if current.token == Token::Eof {
            SyntaxError::unexpected_end(expected, current.span)
        } else {
            SyntaxError::unexpected_token(expected, &current.token.describe(), current.span)
        }
    }

    fn expect_identifier(&mut self, description: &str) -> SyntaxResult<(String, Span)> {
        match self.tokens.current_token() {
            Token::Identifier(name) => {
                let name = name.clone();
                let span = self.tokens.advance().span;
                Ok((name, span))
            }
            _ => Err(self.unexpected(description)),
        }
    }

    fn peek_binary_operator(&self) -> Option<BinaryOperator> {
        self.tokens
            .current_token()
            .as_identifier()
            .and_then(|word| BinaryOperator::from_word(word, self.case_insensitive()))
    }

    fn find_scope(&self, name: &str) -> Option<&RangeScope> {
        let case_insensitive = self.case_insensitive();
        self.scopes.iter().rev().find(|scope| {
            if case_insensitive {
                scope.variable.eq_ignore_ascii_case(name)
            } else {
                scope.variable == name
            }
        })
    }

    fn lambda_kind(&self, word: &str) -> Option<LambdaKind> {
        [LambdaKind::Any, LambdaKind::All]
            .into_iter()
            .find(|kind| {
                if self.case_insensitive() {
                    kind.name().eq_ignore_ascii_case(word)
                } else {
                    kind.name() == word
                }
            })
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn parse_binary(&mut self, min_precedence: u8) -> SyntaxResult<FilterExpression> {
        self.enter()?;
        let mut left = self.parse_unary()?;

        while let Some(operator) = self.peek_binary_operator() {
            if operator.precedence() < min_precedence {
                break;
            }
            self.tokens.advance();

            let right = if operator == BinaryOperator::In {
                self.parse_in_operand()?
            } else {
                self.parse_binary(operator.precedence() + 1)?
            };
            left = FilterExpression::binary(operator, left, right);
        }

        self.leave();
        Ok(left)
    }

    fn parse_unary(&mut self) -> SyntaxResult<FilterExpression> {
        if self.tokens.current_token().is_word("not", self.case_insensitive()) {
            self.tokens.advance();
            self.enter()?;
            let operand = self.parse_unary()?;
            self.leave();
            return Ok(FilterExpression::unary(UnaryOperator::Not, operand));
        }

        if self.tokens.advance_if_matches(&Token::Minus) {
            match self.tokens.current_token() {
                Token::Integer(value) => {
                    let value = -*value;
                    self.tokens.advance();
                    return Ok(FilterExpression::Literal(Literal::Integer(value)));
                }
                Token::Decimal(value) => {
                    let value = -*value;
                    self.tokens.advance();
                    return Ok(FilterExpression::Literal(Literal::Decimal(value)));
                }
                _ => {
                    self.enter()?;
                    let operand = self.parse_unary()?;
                    self.leave();
                    return Ok(FilterExpression::unary(UnaryOperator::Negate, operand));
                }
            }
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> SyntaxResult<FilterExpression> {
        match self.tokens.current_token() {
            Token::LeftParen => {
                self.tokens.advance();
                let inner = self.parse_binary(0)?;
                self.expect(&Token::RightParen, "')'")?;
                Ok(inner)
            }
            Token::Identifier(_) if self.tokens.peek_ahead(1) == &Token::LeftParen => {
                self.parse_function_call()
            }
            Token::Identifier(_) => self.parse_member_path(),
            token if token.is_literal() => {
                let literal = literal_from_token(token);
                self.tokens.advance();
                literal.map(FilterExpression::Literal).ok_or_else(|| self.unexpected("literal"))
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    fn parse_function_call(&mut self) -> SyntaxResult<FilterExpression> {
        let (written, span) = self.expect_identifier("function name")?;
        let name = written.to_ascii_lowercase();

        let arity = function_arity(&name);
        let known = arity.is_some() && (self.case_insensitive() || written == name);
        if !known && !self.preferences.allow_unknown_functions {
            return Err(SyntaxError::UnknownFunction {
                name: written,
                span,
            });
        }

        self.expect(&Token::LeftParen, "'('")?;
        let mut arguments = Vec::new();

        if !self.tokens.advance_if_matches(&Token::RightParen) {
            loop {
                if arguments.len() >= MAX_FUNCTION_ARGUMENTS {
                    return Err(SyntaxError::InvalidArguments {
                        function: name,
                        expected: format!("at most {}", MAX_FUNCTION_ARGUMENTS),
                        found: arguments.len() + 1,
                        span,
                    });
                }
                arguments.push(self.parse_function_argument(&name)?);

                if self.tokens.advance_if_matches(&Token::Comma) {
                    continue;
                }
                self.expect(&Token::RightParen, "',' or ')'")?;
                break;
            }
        }

        if let Some((min, max)) = arity.filter(|_| known) {
            if arguments.len() < min || arguments.len() > max {
                let expected = if min == max {
                    min.to_string()
                } else {
                    format!("{} to {}", min, max)
                };
                return Err(SyntaxError::InvalidArguments {
                    function: name,
                    expected,
                    found: arguments.len(),
                    span,
                });
            }
        }

        Ok(FilterExpression::Function { name, arguments })
    }

    /// `isof`/`cast` accept an unquoted qualified type name
    fn parse_function_argument(&mut self, function: &str) -> SyntaxResult<FilterExpression> {
        if matches!(function, "isof" | "cast") {
            if let Token::Identifier(name) = self.tokens.current_token() {
                if name.contains('.') {
                    let type_name = name.clone();
                    self.tokens.advance();
                    return Ok(FilterExpression::Literal(Literal::String(type_name)));
                }
            }
        }
        self.parse_binary(0)
    }

    /// Right side of `in`: a parenthesized literal list or a collection expression
    fn parse_in_operand(&mut self) -> SyntaxResult<FilterExpression> {
        if !self.tokens.advance_if_matches(&Token::LeftParen) {
            return self.parse_binary(BinaryOperator::In.precedence() + 1);
        }

        let mut items = Vec::new();
        loop {
            let span = self.tokens.current_span();
            match self.parse_unary()? {
                FilterExpression::Literal(literal) => items.push(literal),
                _ => {
                    return Err(SyntaxError::unexpected_token(
                        "literal in list",
                        "non-literal expression",
                        span,
                    ))
                }
            }

            if self.tokens.advance_if_matches(&Token::Comma) {
                continue;
            }
            self.expect(&Token::RightParen, "',' or ')'")?;
            break;
        }

        Ok(FilterExpression::Literal(Literal::List(items)))
    }

    // ------------------------------------------------------------------
    // Property paths and lambdas
    // ------------------------------------------------------------------

    fn parse_member_path(&mut self) -> SyntaxResult<FilterExpression> {
        let (first, span) = self.expect_identifier("property name")?;
        let (mut path, mut current) = self.resolve_path_start(&first, span)?;

        while self.tokens.advance_if_matches(&Token::Slash) {
            let (segment, segment_span) = self.expect_identifier("property name")?;

            if self.tokens.current_token() == &Token::LeftParen {
                return match self.lambda_kind(&segment) {
                    Some(kind) => self.parse_lambda(kind, path, current, segment_span),
                    None => Err(self.unexpected("'/' or operator")),
                };
            }

            let (canonical, next) =
                self.resolve_property(&path, current.as_ref(), &segment, segment_span)?;
            path.push(canonical);
            current = next;
        }

        if path.is_root() {
            Ok(FilterExpression::Root)
        } else {
            Ok(FilterExpression::Property(path))
        }
    }

    /// First path segment: `$it`, `$this`, a range variable, or a root property
    fn resolve_path_start(
        &self,
        name: &str,
        span: Span,
    ) -> SyntaxResult<(PropertyPath, Option<PropertyType>)> {
        if name == "$it" {
            return Ok((PropertyPath::root(), self.model.root_type()));
        }

        let scope = if name == "$this" {
            self.scopes.last()
        } else {
            self.find_scope(name)
        };
        if let Some(scope) = scope {
            return Ok((scope.path.clone(), scope.element.clone()));
        }

        if name.starts_with('$') {
            return Err(SyntaxError::UnboundRangeVariable {
                name: name.to_string(),
                span,
            });
        }

        let root = self.model.root_type();
        let (canonical, ty) = self.resolve_property(&PropertyPath::root(), root.as_ref(), name, span)?;
        Ok((PropertyPath::new(vec![canonical]), ty))
    }

    /// Resolve `name` on `owner`; an untyped owner accepts any name as written
    fn resolve_property(
        &self,
        path: &PropertyPath,
        owner: Option<&PropertyType>,
        name: &str,
        span: Span,
    ) -> SyntaxResult<(String, Option<PropertyType>)> {
        let Some(owner) = owner else {
            return Ok((name.to_string(), None));
        };

        let full_path = path.child(name).to_string();
        if owner.is_collection {
            return Err(SyntaxError::invalid_navigation(
                &full_path,
                "collections must be navigated with any() or all()",
                span,
            ));
        }

        let Some(structured) = owner
            .structured_name()
            .and_then(|type_name| self.model.structured_type(type_name))
        else {
            return Err(SyntaxError::invalid_navigation(
                &full_path,
                &format!("cannot navigate through primitive type '{}'", owner.type_name()),
                span,
            ));
        };

        match structured.property(name) {
            Some((canonical, ty)) if self.case_insensitive() || canonical == name => {
                Ok((canonical.to_string(), Some(ty.clone())))
            }
            _ => Err(SyntaxError::UnknownProperty {
                property: name.to_string(),
                type_name: structured.name().to_string(),
                span,
            }),
        }
    }

    fn parse_lambda(
        &mut self,
        kind: LambdaKind,
        collection: PropertyPath,
        collection_type: Option<PropertyType>,
        span: Span,
    ) -> SyntaxResult<FilterExpression> {
        if let Some(ty) = &collection_type {
            if !ty.is_collection {
                return Err(SyntaxError::invalid_navigation(
                    &collection.to_string(),
                    &format!("{}() requires a collection", kind.name()),
                    span,
                ));
            }
        }
        if self.scopes.len() >= MAX_LAMBDA_DEPTH {
            return Err(SyntaxError::MaxRecursionDepth { span });
        }

        self.expect(&Token::LeftParen, "'('")?;

        if kind == LambdaKind::Any && self.tokens.advance_if_matches(&Token::RightParen) {
            return Ok(FilterExpression::Lambda {
                kind,
                collection,
                variable: None,
                body: None,
            });
        }

        let (variable, variable_span) = self.expect_identifier("range variable")?;
        if variable.starts_with('$') || self.find_scope(&variable).is_some() {
            return Err(SyntaxError::DuplicateRangeVariable {
                name: variable,
                span: variable_span,
            });
        }
        self.expect(&Token::Colon, "':'")?;

        self.scopes.push(RangeScope {
            variable: variable.clone(),
            path: collection.clone(),
            element: collection_type.map(|ty| PropertyType {
                is_collection: false,
                ..ty
            }),
        });
        let body = self.parse_binary(0);
        self.scopes.pop();
        let body = body?;

        self.expect(&Token::RightParen, "')'")?;

        Ok(FilterExpression::Lambda {
            kind,
            collection,
            variable: Some(variable),
            body: Some(Box::new(body)),
        })
    }
}

fn literal_from_token(token: &Token) -> Option<Literal> {
    let literal = match token {
        Token::Null => Literal::Null,
        Token::Boolean(value) => Literal::Boolean(*value),
        Token::Integer(value) => Literal::Integer(*value),
        Token::Decimal(value) => Literal::Decimal(*value),
        Token::String(value) => Literal::String(value.clone()),
        Token::DateTimeOffset(value) => Literal::DateTimeOffset(value.clone()),
        Token::Date(value) => Literal::Date(value.clone()),
        Token::TimeOfDay(value) => Literal::TimeOfDay(value.clone()),
        Token::Guid(value) => Literal::Guid(value.clone()),
        Token::Duration(value) => Literal::Duration(value.clone()),
        Token::Enum { type_name, value } => Literal::Enum {
            type_name: type_name.clone(),
            value: value.clone(),
        },
        _ => return None,
    };
    Some(literal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn user_model() -> EntityModel {
        EntityModel::builder("User")
            .structured("User", |t| {
                t.property("id", "Edm.Int32")
                    .property("email", "Edm.String")
                    .property("enabled", "Edm.Boolean")
                    .property("name", "Name")
                    .property("sponsor", "User")
                    .collection("phoneNumbers", "Edm.String")
                    .collection("socialLogins", "SocialLogin")
            })
            .structured("Name", |t| {
                t.property("givenName", "Edm.String")
                    .property("surname", "Edm.String")
            })
            .structured("SocialLogin", |t| {
                t.property("name", "Edm.String").property("url", "Edm.String")
            })
            .build()
            .unwrap()
    }

    fn parse(expression: &str) -> SyntaxResult<FilterExpression> {
        ODataFilterParser::new().parse_filter(expression, &user_model())
    }

    #[test]
    fn test_precedence() {
        let expression = parse("id eq 1 or id eq 2 and enabled eq true").unwrap();
        assert_matches!(
            expression,
            FilterExpression::Binary { operator: BinaryOperator::Or, ref right, .. }
                if matches!(**right, FilterExpression::Binary { operator: BinaryOperator::And, .. })
        );
    }

    #[test]
    fn test_has_and_in_bind_tighter_than_arithmetic() {
        let expression = parse("id add 1 in (2, 3)").unwrap();
        assert_matches!(
            expression,
            FilterExpression::Binary { operator: BinaryOperator::Add, ref right, .. }
                if matches!(**right, FilterExpression::Binary { operator: BinaryOperator::In, .. })
        );

        let expression = parse("type has 'Employee' eq true").unwrap();
        assert_matches!(
            expression,
            FilterExpression::Binary { operator: BinaryOperator::Eq, ref left, .. }
                if matches!(**left, FilterExpression::Binary { operator: BinaryOperator::Has, .. })
        );
    }

    #[test]
    fn test_not_binds_tighter_than_comparison() {
        let expression = parse("not contains(email, '@mail')").unwrap();
        assert_matches!(
            expression,
            FilterExpression::Unary { operator: UnaryOperator::Not, ref operand }
                if matches!(**operand, FilterExpression::Function { ref name, .. } if name == "contains")
        );
    }

    #[test]
    fn test_paths_are_canonicalized() {
        let expression = parse("SPONSOR/Name/GIVENNAME eq null").unwrap();
        assert_eq!(
            expression,
            FilterExpression::binary(
                BinaryOperator::Eq,
                FilterExpression::property(&["sponsor", "name", "givenName"]),
                FilterExpression::Literal(Literal::Null),
            )
        );
    }

    #[test]
    fn test_lambda_variable_resolves_to_collection_path() {
        let expression = parse("socialLogins/any(s: s/name eq 'Facebook')").unwrap();
        let FilterExpression::Lambda { body: Some(body), .. } = expression else {
            panic!("expected lambda");
        };
        assert_matches!(
            *body,
            FilterExpression::Binary { ref left, .. }
                if **left == FilterExpression::property(&["socialLogins", "name"])
        );
    }

    #[test]
    fn test_lambda_over_primitive_collection() {
        let expression = parse("phoneNumbers/all(p: p eq '123')").unwrap();
        assert_matches!(
            expression,
            FilterExpression::Lambda { kind: LambdaKind::All, ref body, .. }
                if matches!(body.as_deref(), Some(FilterExpression::Binary { left, .. })
                    if **left == FilterExpression::property(&["phoneNumbers"]))
        );
    }

    #[test]
    fn test_any_without_arguments() {
        let expression = parse("phoneNumbers/any()").unwrap();
        assert_matches!(expression, FilterExpression::Lambda { variable: None, body: None, .. });
    }

    #[test]
    fn test_in_list() {
        let expression = parse("email in ('a@mail.com', 'b@mail.com')").unwrap();
        assert_matches!(
            expression,
            FilterExpression::Binary { operator: BinaryOperator::In, ref right, .. }
                if matches!(**right, FilterExpression::Literal(Literal::List(ref items)) if items.len() == 2)
        );
    }

    #[test]
    fn test_negative_literal_and_negate() {
        assert_eq!(
            parse("id gt -5").unwrap(),
            FilterExpression::binary(
                BinaryOperator::Gt,
                FilterExpression::property(&["id"]),
                FilterExpression::Literal(Literal::Integer(-5)),
            )
        );
        assert_matches!(
            parse("-id lt 0").unwrap(),
            FilterExpression::Binary { ref left, .. }
                if matches!(**left, FilterExpression::Unary { operator: UnaryOperator::Negate, .. })
        );
    }

    #[test]
    fn test_unknown_property() {
        assert_matches!(
            parse("nickname eq 'x'"),
            Err(SyntaxError::UnknownProperty { ref property, ref type_name, .. })
                if property == "nickname" && type_name == "User"
        );
    }

    #[test]
    fn test_navigation_through_primitive() {
        assert_matches!(
            parse("email/length eq 1"),
            Err(SyntaxError::InvalidNavigation { .. })
        );
    }

    #[test]
    fn test_collection_requires_lambda() {
        assert_matches!(
            parse("socialLogins/name eq 'x'"),
            Err(SyntaxError::InvalidNavigation { .. })
        );
        assert_matches!(
            parse("name/any(n: n eq 'x')"),
            Err(SyntaxError::InvalidNavigation { .. })
        );
    }

    #[test]
    fn test_range_variable_scoping() {
        assert_matches!(
            parse("socialLogins/any(s: s/name eq 'x') and s/name eq 'y'"),
            Err(SyntaxError::UnknownProperty { ref property, .. }) if property == "s"
        );
        assert_matches!(
            parse("socialLogins/any(s: phoneNumbers/any(s: s eq 'x'))"),
            Err(SyntaxError::DuplicateRangeVariable { ref name, .. }) if name == "s"
        );
        assert_matches!(
            parse("$this eq null"),
            Err(SyntaxError::UnboundRangeVariable { .. })
        );
    }

    #[test]
    fn test_it_refers_to_root() {
        assert_eq!(
            parse("$it/email eq 'x'").unwrap(),
            FilterExpression::binary(
                BinaryOperator::Eq,
                FilterExpression::property(&["email"]),
                FilterExpression::Literal(Literal::String("x".into())),
            )
        );
    }

    #[test]
    fn test_function_errors() {
        assert_matches!(parse("foo(email)"), Err(SyntaxError::UnknownFunction { .. }));
        assert_matches!(
            parse("contains(email)"),
            Err(SyntaxError::InvalidArguments { ref function, found: 1, .. }) if function == "contains"
        );
        assert!(parse("substring(email, 1, 2) eq 'x'").is_ok());
    }

    #[test]
    fn test_unknown_functions_allowed_by_preference() {
        let preferences = ParserPreferences {
            case_insensitive: true,
            allow_unknown_functions: true,
        };
        let parser = ODataFilterParser::with_preferences(preferences, LexicalPreferences::default());
        let expression = parser.parse_filter("geo.intersects(email, 'x')", &user_model());
        // qualified names lex as one identifier
        assert_matches!(expression, Ok(FilterExpression::Function { ref name, .. }) if name == "geo.intersects");
    }

    #[test]
    fn test_case_sensitive_preference() {
        let preferences = ParserPreferences {
            case_insensitive: false,
            allow_unknown_functions: false,
        };
        let parser = ODataFilterParser::with_preferences(preferences, LexicalPreferences::default());
        let model = user_model();
        assert!(parser.parse_filter("email eq 'x'", &model).is_ok());
        assert_matches!(
            parser.parse_filter("Email eq 'x'", &model),
            Err(SyntaxError::UnknownProperty { .. })
        );
        assert_matches!(
            parser.parse_filter("startsWith(email, 'x')", &model),
            Err(SyntaxError::UnknownFunction { .. })
        );
    }

    #[test]
    fn test_untyped_model_accepts_any_path() {
        let expression = ODataFilterParser::new()
            .parse_filter("a/b/any(x: x/c eq 1)", &EntityModel::untyped())
            .unwrap();
        let FilterExpression::Lambda { collection, body: Some(body), .. } = expression else {
            panic!("expected lambda");
        };
        assert_eq!(collection.to_string(), "a/b");
        assert_matches!(
            *body,
            FilterExpression::Binary { ref left, .. }
                if **left == FilterExpression::property(&["a", "b", "c"])
        );
    }

    #[test]
    fn test_syntax_errors() {
        assert_matches!(parse("   "), Err(SyntaxError::EmptyExpression));
        assert_matches!(parse("id eq"), Err(SyntaxError::UnexpectedEnd { .. }));
        assert_matches!(parse("(id eq 1"), Err(SyntaxError::UnexpectedEnd { .. }));
        assert_matches!(parse("id eq 1 id"), Err(SyntaxError::UnexpectedToken { .. }));
        assert_matches!(parse("id eq 'x"), Err(SyntaxError::Lexical(_)));
    }

    #[test]
    fn test_max_depth() {
        let expression = format!("{}id eq 1{}", "(".repeat(MAX_PARSE_DEPTH + 1), ")".repeat(MAX_PARSE_DEPTH + 1));
        assert_matches!(parse(&expression), Err(SyntaxError::MaxRecursionDepth { .. }));
    }
}
