//! Provides a type-safe, fluent builder for constructing `Select` ASTs.

// --- Typestate Marker Structs ---
// These zero-sized structs represent the state of the builder.
// They ensure that methods are called in the correct SQL order at compile time.

use crate::query::ast::{
    common::{NullsOrder, OrderDir, TableRef},
    expr::Expr,
    select::{FromClause, FromSource, OrderByExpr, Select},
};

/// The initial state of the builder before any clauses have been added.
#[derive(Debug, Default, Clone)]
pub struct InitialState;

/// The state after the `SELECT` clause has been added.
#[derive(Debug, Default, Clone)]
pub struct SelectState;

/// The state after the `FROM` clause has been added.
#[derive(Debug, Default, Clone)]
pub struct FromState;

// --- The Main Builder ---

#[derive(Debug, Clone)]
pub struct SelectBuilder<State> {
    ast: Select,
    _state: State,
}

impl Default for SelectBuilder<InitialState> {
    fn default() -> Self {
        Self::new()
    }
}

/// Implementation for the initial state of the builder.
impl SelectBuilder<InitialState> {
    pub fn new() -> Self {
        Self {
            ast: Select::default(),
            _state: InitialState,
        }
    }

    /// Adds a `SELECT` clause with a list of columns.
    /// This is the entry point for building a select query.
    pub fn select(mut self, columns: Vec<Expr>) -> SelectBuilder<SelectState> {
        self.ast.columns = columns;
        SelectBuilder {
            ast: self.ast,
            _state: SelectState,
        }
    }
}

/// Implementation for the state after `SELECT` has been called.
/// The only valid next step is to specify where the rows come from.
impl SelectBuilder<SelectState> {
    /// Adds a `FROM` clause specifying the primary table.
    pub fn from(self, table: TableRef, alias: Option<&str>) -> SelectBuilder<FromState> {
        self.from_source(FromSource::Table(table), alias)
    }

    /// Adds a `FROM (subquery) AS alias` clause.
    pub fn from_subquery(self, subquery: Select, alias: &str) -> SelectBuilder<FromState> {
        self.from_source(FromSource::Subquery(Box::new(subquery)), Some(alias))
    }

    fn from_source(mut self, source: FromSource, alias: Option<&str>) -> SelectBuilder<FromState> {
        self.ast.from = Some(FromClause {
            source,
            alias: alias.map(String::from),
        });
        SelectBuilder {
            ast: self.ast,
            _state: FromState,
        }
    }
}

/// Implementation for the state after `FROM` has been called.
/// From here, we can add optional clauses like `WHERE`, `ORDER BY`, etc.
impl SelectBuilder<FromState> {
    /// Adds a `WHERE` clause to the query.
    pub fn where_clause(mut self, condition: Expr) -> Self {
        self.ast.where_clause = Some(condition);
        self
    }

    /// Adds an `ORDER BY` clause to the query.
    pub fn order_by(mut self, expr: Expr, direction: Option<OrderDir>) -> Self {
        self.ast.order_by.push(OrderByExpr {
            expr,
            direction,
            nulls: None,
        });
        self
    }

    /// Adds an `ORDER BY` item with explicit `NULLS FIRST` / `NULLS LAST`.
    pub fn order_by_nulls(mut self, expr: Expr, direction: OrderDir, nulls: NullsOrder) -> Self {
        self.ast.order_by.push(OrderByExpr {
            expr,
            direction: Some(direction),
            nulls: Some(nulls),
        });
        self
    }

    /// Adds a `LIMIT` clause to the query.
    pub fn limit(mut self, limit: Expr) -> Self {
        self.ast.limit = Some(limit);
        self
    }

    /// Finalizes and returns the constructed `Select` AST.
    pub fn build(self) -> Select {
        self.ast
    }
}
