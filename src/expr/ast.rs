//! Expression AST
//!
//! Immutable tree built once per parse. One variant per operator keeps the
//! shape of a parse directly assertable in tests (`Sub(1, Sub(2, 3))`).

/// A parsed expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `cond ? then : otherwise`, right-associative.
    Ternary {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },

    // Binary operators, grouped by precedence level (low to high).
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    BitOr(Box<Expr>, Box<Expr>),
    BitAnd(Box<Expr>, Box<Expr>),
    Eq(Box<Expr>, Box<Expr>),
    Ne(Box<Expr>, Box<Expr>),
    Lt(Box<Expr>, Box<Expr>),
    Le(Box<Expr>, Box<Expr>),
    Gt(Box<Expr>, Box<Expr>),
    Ge(Box<Expr>, Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Rem(Box<Expr>, Box<Expr>),

    // Unary operators. These do not chain without parentheses.
    Pos(Box<Expr>),
    Neg(Box<Expr>),
    Not(Box<Expr>),
    BitNot(Box<Expr>),

    // Literals.
    Number(f64),
    Color(String),
    Bool(bool),
    Str(String),
    /// A run of juxtaposed numbers (`1 2 3`) coalesced into one atom,
    /// used for unseparated multi-value function arguments.
    NumberList(Vec<f64>),
    /// A run of juxtaposed colors (`#fff000 #000fff`) as one atom.
    ColorList(Vec<String>),

    /// `name(arg, arg, ...)`.
    Call { name: String, args: Vec<Expr> },
    /// Bracketed data source reference `[SOURCE.NAME]`.
    Source(String),
    /// Bare identifier.
    Var(String),
}

impl Expr {
    pub fn boxed(self) -> Box<Expr> {
        Box::new(self)
    }
}
