//! Builds the two queries a tail ever runs: the initial snapshot and the
//! incremental "rows after the watermark" poll.
//!
//! Every requested column is projected as `CAST(col AS TEXT)` under its own
//! name, so cells arrive in the server's text form. The table is always
//! aliased `tail` and ordering is done on the qualified input column, never on
//! the text projection, so rows sort by the key's native type.
//!
//! Table and column names are interpolated (quoted) into the query text; they
//! must already have passed the identifier allow-list. The watermark is
//! always a bound parameter.

use crate::query::{
    ast::{
        common::{NullsOrder, OrderDir, TableRef},
        expr::{Expr, FunctionCall},
    },
    builder::select::SelectBuilder,
    dialect::Dialect,
    ident, literal, qualified,
    renderer::{Render, Renderer},
    value,
};
use model::{
    core::value::Value,
    execution::poll::{OutputMode, PollConfig},
    pagination::watermark::Watermark,
};

/// Alias given to the tailed table (or the snapshot derived table).
pub const TAIL_ALIAS: &str = "tail";

pub use model::execution::poll::STRUCTURED_FIELD;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TailQueryKind {
    /// Last N rows, re-ordered ascending.
    Snapshot,

    /// Every row with a key greater than the watermark.
    Incremental,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TailQuery {
    pub kind: TailQueryKind,
    pub sql: String,
    pub params: Vec<Value>,
}

pub struct TailQueryBuilder<'a> {
    config: &'a PollConfig,
    dialect: &'a dyn Dialect,
}

impl<'a> TailQueryBuilder<'a> {
    pub fn new(config: &'a PollConfig, dialect: &'a dyn Dialect) -> Self {
        Self { config, dialect }
    }

    /// Query for the next poll given where the tail currently stands.
    pub fn build(&self, watermark: &Watermark) -> TailQuery {
        match watermark.current() {
            Some(key) => self.incremental(key),
            None => self.snapshot(),
        }
    }

    /// `SELECT .. FROM (SELECT cols FROM table ORDER BY key DESC NULLS LAST LIMIT n) AS tail
    /// ORDER BY tail.key ASC`
    ///
    /// Rows with a NULL key never take the place of the newest keyed rows;
    /// they only fill the snapshot when there are fewer than `n` of those.
    pub fn snapshot(&self) -> TailQuery {
        let key = self.config.key().as_str();
        let limit = i64::try_from(self.config.snapshot_size()).unwrap_or(i64::MAX);

        let latest = SelectBuilder::new()
            .select(self.config.columns().iter().map(|c| ident(c.as_str())).collect())
            .from(self.table(), None)
            .order_by_nulls(ident(key), OrderDir::Desc, NullsOrder::Last)
            .limit(value(Value::Int(limit)))
            .build();

        let ast = SelectBuilder::new()
            .select(self.projection())
            .from_subquery(latest, TAIL_ALIAS)
            .order_by(qualified(TAIL_ALIAS, key), Some(OrderDir::Asc))
            .build();

        self.finish(TailQueryKind::Snapshot, &ast)
    }

    /// `SELECT .. FROM table AS tail WHERE tail.key > $1 ORDER BY tail.key ASC`
    ///
    /// The watermark is bound untyped so the server parses it with the key
    /// column's own input function, exactly as it was read back.
    pub fn incremental(&self, watermark: &str) -> TailQuery {
        let key = self.config.key().as_str();

        let ast = SelectBuilder::new()
            .select(self.projection())
            .from(self.table(), Some(TAIL_ALIAS))
            .where_clause(
                qualified(TAIL_ALIAS, key).gt(value(Value::Untyped(watermark.to_string()))),
            )
            .order_by(qualified(TAIL_ALIAS, key), Some(OrderDir::Asc))
            .build();

        self.finish(TailQueryKind::Incremental, &ast)
    }

    fn table(&self) -> TableRef {
        TableRef::from(self.config.table())
    }

    fn projection(&self) -> Vec<Expr> {
        let text = self.dialect.text_type();
        let mut columns: Vec<Expr> = self
            .config
            .columns()
            .iter()
            .map(|c| {
                qualified(TAIL_ALIAS, c.as_str())
                    .cast(text)
                    .alias(c.as_str())
            })
            .collect();

        if self.config.mode() == OutputMode::StructuredPerRow {
            let args = self
                .config
                .columns()
                .iter()
                .flat_map(|c| [literal(c.as_str()), qualified(TAIL_ALIAS, c.as_str())])
                .collect();
            let object = Expr::FunctionCall(FunctionCall {
                name: self.dialect.json_object_function().to_string(),
                args,
            });
            columns.push(object.cast(text).alias(STRUCTURED_FIELD));
        }

        columns
    }

    fn finish(&self, kind: TailQueryKind, ast: &impl Render) -> TailQuery {
        let mut renderer = Renderer::new(self.dialect);
        ast.render(&mut renderer);
        let (sql, params) = renderer.finish();
        TailQuery { kind, sql, params }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::dialect::Postgres;
    use model::core::identifiers::Identifier;

    fn config(table: &str, cols: &[&str], mode: OutputMode) -> PollConfig {
        PollConfig::new(
            table.parse().unwrap(),
            cols.iter().map(|c| Identifier::parse(c).unwrap()).collect(),
            mode,
        )
        .unwrap()
    }

    #[test]
    fn test_snapshot_query() {
        let cfg = config("events", &["id", "msg"], OutputMode::AlignedText).with_snapshot_size(5);
        let query = TailQueryBuilder::new(&cfg, &Postgres).snapshot();

        assert_eq!(query.kind, TailQueryKind::Snapshot);
        assert_eq!(
            query.sql,
            r#"SELECT CAST("tail"."id" AS TEXT) AS "id", CAST("tail"."msg" AS TEXT) AS "msg" FROM (SELECT "id", "msg" FROM "events" ORDER BY "id" DESC NULLS LAST LIMIT $1) AS "tail" ORDER BY "tail"."id" ASC"#
        );
        assert_eq!(query.params, vec![Value::Int(5)]);
    }

    #[test]
    fn test_incremental_query_binds_watermark() {
        let cfg = config("audit.events", &["id", "msg"], OutputMode::AlignedText);
        let query = TailQueryBuilder::new(&cfg, &Postgres).incremental("20");

        assert_eq!(query.kind, TailQueryKind::Incremental);
        assert_eq!(
            query.sql,
            r#"SELECT CAST("tail"."id" AS TEXT) AS "id", CAST("tail"."msg" AS TEXT) AS "msg" FROM "audit"."events" AS "tail" WHERE ("tail"."id" > $1) ORDER BY "tail"."id" ASC"#
        );
        assert_eq!(query.params, vec![Value::Untyped("20".into())]);
        assert!(!query.sql.contains("LIMIT"));
    }

    #[test]
    fn test_watermark_text_never_reaches_sql() {
        let cfg = config("events", &["id"], OutputMode::AlignedText);
        let hostile = "1'; DROP TABLE events; --";
        let query = TailQueryBuilder::new(&cfg, &Postgres).incremental(hostile);

        assert!(!query.sql.contains("DROP"));
        assert_eq!(query.params, vec![Value::Untyped(hostile.into())]);
    }

    #[test]
    fn test_build_dispatches_on_watermark() {
        let cfg = config("events", &["id"], OutputMode::AlignedText);
        let builder = TailQueryBuilder::new(&cfg, &Postgres);

        assert_eq!(builder.build(&Watermark::new()).kind, TailQueryKind::Snapshot);
        let query = builder.build(&Watermark::at("2024-01-01 00:00:00+00"));
        assert_eq!(query.kind, TailQueryKind::Incremental);
        assert_eq!(
            query.params,
            vec![Value::Untyped("2024-01-01 00:00:00+00".into())]
        );
    }

    #[test]
    fn test_structured_mode_adds_json_field() {
        let cfg = config("events", &["id", "msg"], OutputMode::StructuredPerRow);
        let query = TailQueryBuilder::new(&cfg, &Postgres).incremental("3");

        assert_eq!(
            query.sql,
            r#"SELECT CAST("tail"."id" AS TEXT) AS "id", CAST("tail"."msg" AS TEXT) AS "msg", CAST(json_build_object('id', "tail"."id", 'msg', "tail"."msg") AS TEXT) AS "__pg_tail_row" FROM "events" AS "tail" WHERE ("tail"."id" > $1) ORDER BY "tail"."id" ASC"#
        );
    }

    #[test]
    fn test_snapshot_size_clamped_to_one() {
        let cfg = config("events", &["id"], OutputMode::AlignedText).with_snapshot_size(0);
        let query = TailQueryBuilder::new(&cfg, &Postgres).snapshot();
        assert_eq!(query.params, vec![Value::Int(1)]);
    }
}
