//! Defines the AST for SQL expressions.

use model::core::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A column or table identifier, e.g., `users` or `users.id`.
    Identifier(Ident),

    /// A value bound as a query parameter.
    Value(Value),

    /// A string constant written into the query text, e.g. the key names
    /// passed to `json_build_object`, where a parameter's type could not be
    /// inferred.
    Literal(String),

    /// A binary comparison, e.g., `"tail"."id" > $1`.
    BinaryOp(Box<BinaryOp>),

    /// A function call, e.g., `json_build_object(...)`.
    FunctionCall(FunctionCall),

    /// An aliased expression, e.g. `COUNT(*) AS total_count`
    Alias { expr: Box<Expr>, alias: String },

    /// `CAST(expr AS data_type)`
    Cast { expr: Box<Expr>, data_type: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub qualifier: Option<String>, // e.g., the 'users' in 'users.id'
    pub name: String,              // e.g., the 'id' in 'users.id'
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOp {
    pub left: Expr,
    pub op: BinaryOperator,
    pub right: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryOperator {
    Gt, // >
}

impl Expr {
    pub fn alias(self, alias: &str) -> Expr {
        Expr::Alias {
            expr: Box::new(self),
            alias: alias.to_string(),
        }
    }

    pub fn cast(self, data_type: &str) -> Expr {
        Expr::Cast {
            expr: Box::new(self),
            data_type: data_type.to_string(),
        }
    }

    pub fn gt(self, right: Expr) -> Expr {
        Expr::BinaryOp(Box::new(BinaryOp {
            left: self,
            op: BinaryOperator::Gt,
            right,
        }))
    }
}
