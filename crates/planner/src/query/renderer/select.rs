use crate::query::{
    ast::{
        common::{NullsOrder, OrderDir},
        select::{FromClause, FromSource, OrderByExpr, Select},
    },
    renderer::{Render, Renderer},
};

impl Render for Select {
    fn render(&self, r: &mut Renderer) {
        // 1. SELECT clause
        r.sql.push_str("SELECT ");
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                r.sql.push_str(", ");
            }
            col.render(r);
        }

        // 2. FROM
        if let Some(from) = &self.from {
            r.sql.push(' ');
            from.render(r);
        }

        // 3. WHERE
        if let Some(where_clause) = &self.where_clause {
            r.sql.push_str(" WHERE ");
            where_clause.render(r);
        }

        // 4. ORDER BY
        if !self.order_by.is_empty() {
            r.sql.push_str(" ORDER BY ");
            for (i, order) in self.order_by.iter().enumerate() {
                if i > 0 {
                    r.sql.push_str(", ");
                }
                order.render(r);
            }
        }

        // 5. LIMIT
        if let Some(limit) = &self.limit {
            r.sql.push_str(" LIMIT ");
            limit.render(r);
        }
    }
}

impl Render for FromClause {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("FROM ");
        match &self.source {
            FromSource::Table(table) => r.render_table_ref(table),
            FromSource::Subquery(select) => {
                r.sql.push('(');
                select.render(r);
                r.sql.push(')');
            }
        }
        if let Some(alias) = &self.alias {
            r.sql.push_str(" AS ");
            r.sql.push_str(&r.dialect.quote_identifier(alias));
        }
    }
}

impl Render for OrderByExpr {
    fn render(&self, r: &mut Renderer) {
        self.expr.render(r);
        if let Some(dir) = &self.direction {
            let dir_str = match dir {
                OrderDir::Asc => "ASC",
                OrderDir::Desc => "DESC",
            };
            r.sql.push(' ');
            r.sql.push_str(dir_str);
        }
        if let Some(nulls) = &self.nulls {
            r.sql.push_str(match nulls {
                NullsOrder::First => " NULLS FIRST",
                NullsOrder::Last => " NULLS LAST",
            });
        }
    }
}
