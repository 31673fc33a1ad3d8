use crate::query::ast::expr::{Expr, Ident};
use model::core::value::Value;

pub mod ast;
pub mod builder;
pub mod dialect;
pub mod renderer;
pub mod tail;

pub fn ident(name: &str) -> Expr {
    Expr::Identifier(Ident {
        qualifier: None,
        name: name.to_string(),
    })
}

pub fn qualified(qualifier: &str, name: &str) -> Expr {
    Expr::Identifier(Ident {
        qualifier: Some(qualifier.to_string()),
        name: name.to_string(),
    })
}

pub fn value(val: Value) -> Expr {
    Expr::Value(val)
}

pub fn literal(text: &str) -> Expr {
    Expr::Literal(text.to_string())
}
