//! Defines the Abstract Syntax Tree (AST) for a SELECT query.

use crate::query::ast::{
    common::{NullsOrder, OrderDir, TableRef},
    expr::Expr,
};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Select {
    /// The list of columns or expressions to be returned.
    /// e.g., `id`, `name`, `COUNT(*)`
    pub columns: Vec<Expr>,

    /// The table or derived table the rows come from.
    pub from: Option<FromClause>,

    /// The WHERE clause condition.
    pub where_clause: Option<Expr>,

    /// The ORDER BY clause.
    pub order_by: Vec<OrderByExpr>,

    /// The LIMIT clause.
    pub limit: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FromClause {
    pub source: FromSource,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FromSource {
    Table(TableRef),

    /// `(SELECT ...)`; Postgres requires the derived table to carry an alias.
    Subquery(Box<Select>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByExpr {
    pub expr: Expr,
    pub direction: Option<OrderDir>,
    pub nulls: Option<NullsOrder>,
}
