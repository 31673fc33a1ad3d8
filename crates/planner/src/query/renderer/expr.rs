use crate::query::{
    ast::expr::{BinaryOp, BinaryOperator, Expr, FunctionCall, Ident},
    renderer::{Render, Renderer},
};

impl Render for Expr {
    fn render(&self, r: &mut Renderer) {
        match self {
            Expr::Identifier(ident) => ident.render(r),
            Expr::Value(val) => r.add_param(val.clone()),
            Expr::Literal(text) => {
                let quoted = r.dialect.quote_literal(text);
                r.sql.push_str(&quoted);
            }
            Expr::BinaryOp(op) => op.render(r),
            Expr::FunctionCall(func) => func.render(r),
            Expr::Alias { expr, alias } => {
                expr.render(r);
                r.sql.push_str(" AS ");
                r.sql.push_str(&r.dialect.quote_identifier(alias));
            }
            Expr::Cast { expr, data_type } => {
                r.sql.push_str("CAST(");
                expr.render(r);
                r.sql.push_str(" AS ");
                r.sql.push_str(data_type);
                r.sql.push(')');
            }
        }
    }
}

impl Render for Ident {
    fn render(&self, r: &mut Renderer) {
        if let Some(qualifier) = &self.qualifier {
            r.sql.push_str(&r.dialect.quote_identifier(qualifier));
            r.sql.push('.');
        }
        r.sql.push_str(&r.dialect.quote_identifier(&self.name));
    }
}

impl Render for BinaryOp {
    fn render(&self, r: &mut Renderer) {
        r.sql.push('(');
        self.left.render(r);

        let op_str = match self.op {
            BinaryOperator::Gt => " > ",
        };
        r.sql.push_str(op_str);

        self.right.render(r);
        r.sql.push(')');
    }
}

impl Render for FunctionCall {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str(&self.name);
        r.sql.push('(');
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                r.sql.push_str(", ");
            }
            arg.render(r);
        }
        r.sql.push(')');
    }
}
