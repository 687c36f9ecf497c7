//! Expression parser
//!
//! Recursive descent with one token of lookahead. Each binary level
//! recurses into itself on the right operand, so every binary operator is
//! right-associative by construction: `1 - 2 - 3` is `Sub(1, Sub(2, 3))`.
//! Equality and relational operators deliberately do not recurse into
//! themselves — `1 < 2 < 3` leaves `< 3` unconsumed and fails.
//!
//! While parsing, every function call and bracketed source reference is
//! looked up in the version registry and the running `[min, max]` range is
//! narrowed by intersection; the final range is the set of format revisions
//! able to evaluate the expression. The first error encountered aborts the
//! parse; there is no recovery.

use crate::expr::ast::Expr;
use crate::expr::registry::registry;
use crate::expr::token::{tokenize, Token};
use crate::version::VersionRange;
use thiserror::Error;
use tracing::trace;

/// Why an expression failed to parse.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("unknown token '{lexeme}' at offset {offset}")]
    UnknownToken { lexeme: String, offset: usize },

    #[error("unexpected token '{found}' at offset {offset}")]
    UnexpectedToken { found: String, offset: usize },

    #[error("unconsumed tokens starting with '{found}' at offset {offset}")]
    UnconsumedInput { found: String, offset: usize },

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("expected '{expected}' but found '{found}' at offset {offset}")]
    ExpectedToken {
        expected: &'static str,
        found: String,
        offset: usize,
    },

    #[error("unknown function '{name}' with {arity} argument(s)")]
    FunctionNotFound { name: String, arity: usize },
}

/// A successful parse: the AST plus the range of format revisions whose
/// runtime defines every symbol the expression uses. The range may be
/// empty when two symbols have disjoint support.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedExpression {
    pub expr: Expr,
    pub versions: VersionRange,
}

/// Parse one expression string.
pub fn parse(input: &str) -> Result<ParsedExpression, ParseError> {
    let mut tokens: Vec<(Token, usize)> = tokenize(input).collect();
    tokens.push((Token::End, input.len()));

    let mut parser = Parser {
        tokens,
        pos: 0,
        versions: VersionRange::all(),
    };
    let expr = parser.ternary()?;
    if !matches!(parser.peek(), Token::End) {
        return Err(ParseError::UnconsumedInput {
            found: parser.peek().to_string(),
            offset: parser.offset(),
        });
    }
    trace!(versions = %parser.versions, "parsed expression");
    Ok(ParsedExpression {
        expr,
        versions: parser.versions,
    })
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    versions: VersionRange,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos].0
    }

    fn offset(&self) -> usize {
        self.tokens[self.pos].1
    }

    fn bump(&mut self) {
        if !matches!(self.tokens[self.pos].0, Token::End) {
            self.pos += 1;
        }
    }

    /// Consume and return one of `ops` if it is next.
    fn eat_operator(&mut self, ops: &[&'static str]) -> Option<&'static str> {
        let found = match self.peek() {
            Token::Operator(op) => ops.iter().copied().find(|candidate| candidate == op),
            _ => None,
        };
        if found.is_some() {
            self.bump();
        }
        found
    }

    fn expect(&mut self, expected: &'static str) -> Result<(), ParseError> {
        let matches = match (expected, self.peek()) {
            (")", Token::CloseParen) | ("]", Token::CloseBracket) => true,
            (_, Token::Operator(op)) => *op == expected,
            _ => false,
        };
        if matches {
            self.bump();
            Ok(())
        } else if matches!(self.peek(), Token::End) {
            Err(ParseError::UnexpectedEnd)
        } else {
            Err(ParseError::ExpectedToken {
                expected,
                found: self.peek().to_string(),
                offset: self.offset(),
            })
        }
    }

    fn narrow(&mut self, range: VersionRange) {
        self.versions = self.versions.intersect(&range);
    }

    // Precedence levels, lowest first. Each level recurses into itself on
    // the right-hand side, which is what makes the grammar right-associative.

    fn ternary(&mut self) -> Result<Expr, ParseError> {
        let cond = self.logical_or()?;
        if self.eat_operator(&["?"]).is_some() {
            let then = self.ternary()?;
            self.expect(":")?;
            let otherwise = self.ternary()?;
            return Ok(Expr::Ternary {
                cond: cond.boxed(),
                then: then.boxed(),
                otherwise: otherwise.boxed(),
            });
        }
        Ok(cond)
    }

    fn logical_or(&mut self) -> Result<Expr, ParseError> {
        let left = self.logical_and()?;
        if self.eat_operator(&["||"]).is_some() {
            let right = self.logical_or()?;
            return Ok(Expr::Or(left.boxed(), right.boxed()));
        }
        Ok(left)
    }

    fn logical_and(&mut self) -> Result<Expr, ParseError> {
        let left = self.bitwise_or()?;
        if self.eat_operator(&["&&"]).is_some() {
            let right = self.logical_and()?;
            return Ok(Expr::And(left.boxed(), right.boxed()));
        }
        Ok(left)
    }

    fn bitwise_or(&mut self) -> Result<Expr, ParseError> {
        let left = self.bitwise_and()?;
        if self.eat_operator(&["|"]).is_some() {
            let right = self.bitwise_or()?;
            return Ok(Expr::BitOr(left.boxed(), right.boxed()));
        }
        Ok(left)
    }

    fn bitwise_and(&mut self) -> Result<Expr, ParseError> {
        let left = self.equality()?;
        if self.eat_operator(&["&"]).is_some() {
            let right = self.bitwise_and()?;
            return Ok(Expr::BitAnd(left.boxed(), right.boxed()));
        }
        Ok(left)
    }

    /// Non-chainable: the right operand comes from the next level down, so
    /// a second `==` in a row is left for the caller to reject.
    fn equality(&mut self) -> Result<Expr, ParseError> {
        let left = self.relational()?;
        if let Some(op) = self.eat_operator(&["==", "!="]) {
            let right = self.relational()?;
            return Ok(match op {
                "==" => Expr::Eq(left.boxed(), right.boxed()),
                _ => Expr::Ne(left.boxed(), right.boxed()),
            });
        }
        Ok(left)
    }

    /// Non-chainable, like [`Parser::equality`].
    fn relational(&mut self) -> Result<Expr, ParseError> {
        let left = self.additive()?;
        if let Some(op) = self.eat_operator(&["<=", ">=", "<", ">"]) {
            let right = self.additive()?;
            return Ok(match op {
                "<=" => Expr::Le(left.boxed(), right.boxed()),
                ">=" => Expr::Ge(left.boxed(), right.boxed()),
                "<" => Expr::Lt(left.boxed(), right.boxed()),
                _ => Expr::Gt(left.boxed(), right.boxed()),
            });
        }
        Ok(left)
    }

    fn additive(&mut self) -> Result<Expr, ParseError> {
        let left = self.multiplicative()?;
        if let Some(op) = self.eat_operator(&["+", "-"]) {
            let right = self.additive()?;
            return Ok(match op {
                "+" => Expr::Add(left.boxed(), right.boxed()),
                _ => Expr::Sub(left.boxed(), right.boxed()),
            });
        }
        Ok(left)
    }

    fn multiplicative(&mut self) -> Result<Expr, ParseError> {
        let left = self.unary()?;
        if let Some(op) = self.eat_operator(&["*", "/", "%"]) {
            let right = self.multiplicative()?;
            return Ok(match op {
                "*" => Expr::Mul(left.boxed(), right.boxed()),
                "/" => Expr::Div(left.boxed(), right.boxed()),
                _ => Expr::Rem(left.boxed(), right.boxed()),
            });
        }
        Ok(left)
    }

    /// The operand is an atom, not another unary expression: `- -2` is
    /// rejected, `-(-2)` parses.
    fn unary(&mut self) -> Result<Expr, ParseError> {
        if let Some(op) = self.eat_operator(&["+", "-", "!", "~"]) {
            let operand = self.atom()?;
            return Ok(match op {
                "+" => Expr::Pos(operand.boxed()),
                "-" => Expr::Neg(operand.boxed()),
                "!" => Expr::Not(operand.boxed()),
                _ => Expr::BitNot(operand.boxed()),
            });
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<Expr, ParseError> {
        match self.peek().clone() {
            Token::Number(first) => {
                self.bump();
                // Consecutive numbers with no operator between them
                // coalesce into a single list atom.
                let mut values = vec![first];
                while let Token::Number(n) = self.peek() {
                    values.push(*n);
                    self.bump();
                }
                if values.len() == 1 {
                    Ok(Expr::Number(first))
                } else {
                    Ok(Expr::NumberList(values))
                }
            }
            Token::Color(first) => {
                self.bump();
                let mut values = vec![first.clone()];
                while let Token::Color(c) = self.peek() {
                    values.push(c.clone());
                    self.bump();
                }
                if values.len() == 1 {
                    Ok(Expr::Color(first))
                } else {
                    Ok(Expr::ColorList(values))
                }
            }
            Token::Bool(b) => {
                self.bump();
                Ok(Expr::Bool(b))
            }
            Token::Str(s) => {
                self.bump();
                Ok(Expr::Str(s))
            }
            Token::OpenBracket => {
                self.bump();
                let name = match self.peek().clone() {
                    Token::Word(w) => {
                        self.bump();
                        w
                    }
                    Token::End => return Err(ParseError::UnexpectedEnd),
                    other => {
                        return Err(ParseError::UnexpectedToken {
                            found: other.to_string(),
                            offset: self.offset(),
                        })
                    }
                };
                self.expect("]")?;
                self.narrow(registry().source_range(&name));
                Ok(Expr::Source(name))
            }
            Token::OpenParen => {
                self.bump();
                let inner = self.ternary()?;
                self.expect(")")?;
                Ok(inner)
            }
            Token::Word(name) => {
                self.bump();
                if matches!(self.peek(), Token::OpenParen) {
                    self.bump();
                    let args = self.arguments()?;
                    let range = registry()
                        .function_range(&name, args.len())
                        .ok_or_else(|| ParseError::FunctionNotFound {
                            name: name.clone(),
                            arity: args.len(),
                        })?;
                    self.narrow(range);
                    Ok(Expr::Call { name, args })
                } else {
                    Ok(Expr::Var(name))
                }
            }
            Token::Unknown(lexeme) => Err(ParseError::UnknownToken {
                lexeme,
                offset: self.offset(),
            }),
            Token::End => Err(ParseError::UnexpectedEnd),
            other => Err(ParseError::UnexpectedToken {
                found: other.to_string(),
                offset: self.offset(),
            }),
        }
    }

    /// Comma-separated argument list; the opening parenthesis is consumed.
    fn arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = Vec::new();
        if matches!(self.peek(), Token::CloseParen) {
            self.bump();
            return Ok(args);
        }
        loop {
            args.push(self.ternary()?);
            match self.peek() {
                Token::Operator(",") => self.bump(),
                Token::CloseParen => {
                    self.bump();
                    return Ok(args);
                }
                Token::End => return Err(ParseError::UnexpectedEnd),
                other => {
                    return Err(ParseError::ExpectedToken {
                        expected: ")",
                        found: other.to_string(),
                        offset: self.offset(),
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::{Version, MAX_VERSION, MIN_VERSION};

    fn num(n: f64) -> Box<Expr> {
        Expr::Number(n).boxed()
    }

    #[test]
    fn test_precedence_scenario() {
        let parsed = parse("(5 + 3) * 2").unwrap();
        assert_eq!(
            parsed.expr,
            Expr::Mul(Expr::Add(num(5.0), num(3.0)).boxed(), num(2.0))
        );
    }

    #[test]
    fn test_subtraction_is_right_associative() {
        let parsed = parse("1 - 2 - 3").unwrap();
        assert_eq!(
            parsed.expr,
            Expr::Sub(num(1.0), Expr::Sub(num(2.0), num(3.0)).boxed())
        );
    }

    #[test]
    fn test_relational_does_not_chain() {
        let err = parse("1 < 2 < 3").unwrap_err();
        assert!(matches!(err, ParseError::UnconsumedInput { .. }));
    }

    #[test]
    fn test_equality_does_not_chain() {
        let err = parse("1 == 2 == 3").unwrap_err();
        assert!(matches!(err, ParseError::UnconsumedInput { .. }));
    }

    #[test]
    fn test_unary_does_not_chain_without_parens() {
        assert!(parse("- -2").is_err());
        let parsed = parse("-(-2)").unwrap();
        assert_eq!(parsed.expr, Expr::Neg(Expr::Neg(num(2.0)).boxed()));
    }

    #[test]
    fn test_ternary_right_associative() {
        let parsed = parse("1 ? 2 : 3 ? 4 : 5").unwrap();
        match parsed.expr {
            Expr::Ternary { otherwise, .. } => {
                assert!(matches!(*otherwise, Expr::Ternary { .. }));
            }
            other => panic!("expected ternary, got {:?}", other),
        }
    }

    #[test]
    fn test_version_one_expression_spans_all_versions() {
        let parsed = parse("round([SECOND] / 2) + clamp(0, 1, 2)").unwrap();
        assert_eq!(parsed.versions, VersionRange::new(MIN_VERSION, MAX_VERSION));
    }

    #[test]
    fn test_version_four_function_narrows() {
        let parsed = parse("interpolate(0, 1, [SECOND])").unwrap();
        assert_eq!(parsed.versions, VersionRange::new(Version(4), Version(4)));
    }

    #[test]
    fn test_disjoint_symbols_yield_empty_range() {
        let parsed = parse("interpolate(0, 1, unreadNotificationCount(0))").unwrap();
        assert!(parsed.versions.is_empty());
    }

    #[test]
    fn test_source_narrows() {
        let parsed = parse("[WEATHER.TEMPERATURE] > 20").unwrap();
        assert_eq!(parsed.versions, VersionRange::since(Version(3)));
    }

    #[test]
    fn test_number_list_coalesces() {
        let parsed = parse("clamp(1 2 3, 0, 10)").unwrap();
        match parsed.expr {
            Expr::Call { ref args, .. } => {
                assert_eq!(args[0], Expr::NumberList(vec![1.0, 2.0, 3.0]));
                assert_eq!(args.len(), 3);
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_weighted_colors_arity_mismatch() {
        // The weight list is split by commas into two separate arguments,
        // so the call has five arguments and no `{5}` signature exists.
        let err =
            parse("extractColorFromWeightedColors(#FF0000 #000000 #FF00FF,1, 1, true, 0.6)")
                .unwrap_err();
        assert_eq!(
            err,
            ParseError::FunctionNotFound {
                name: "extractColorFromWeightedColors".to_string(),
                arity: 5,
            }
        );
    }

    #[test]
    fn test_weighted_colors_correct_arity() {
        let parsed =
            parse("extractColorFromWeightedColors(#FF0000 #000000, 1 2, true, 0.6)").unwrap();
        assert_eq!(parsed.versions, VersionRange::since(Version(2)));
        match parsed.expr {
            Expr::Call { ref args, .. } => assert_eq!(args.len(), 4),
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_character_is_a_lexical_error() {
        let err = parse("1 + @").unwrap_err();
        assert!(matches!(err, ParseError::UnknownToken { .. }));
    }

    #[test]
    fn test_premature_end() {
        assert_eq!(parse("1 +").unwrap_err(), ParseError::UnexpectedEnd);
        assert_eq!(parse("(1 + 2").unwrap_err(), ParseError::UnexpectedEnd);
    }

    #[test]
    fn test_missing_colon() {
        let err = parse("1 ? 2 , 3").unwrap_err();
        assert!(matches!(err, ParseError::ExpectedToken { expected: ":", .. }));
    }

    #[test]
    fn test_trailing_letters_after_number_fail() {
        let err = parse("5x").unwrap_err();
        assert!(matches!(err, ParseError::UnconsumedInput { .. }));
    }

    #[test]
    fn test_bare_variable_and_string() {
        let parsed = parse("weight == \"bold\"").unwrap();
        assert_eq!(
            parsed.expr,
            Expr::Eq(
                Expr::Var("weight".to_string()).boxed(),
                Expr::Str("bold".to_string()).boxed()
            )
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse("").unwrap_err(), ParseError::UnexpectedEnd);
    }
}
