//! Defines the `Dialect` trait for database-specific SQL syntax.

pub trait Dialect: Send + Sync {
    /// Wraps an identifier (like a table or column name) in the correct
    /// quotation marks for the dialect.
    ///
    /// - PostgreSQL uses double quotes: `"my_column"`
    fn quote_identifier(&self, ident: &str) -> String;

    /// Writes a string constant into query text.
    fn quote_literal(&self, text: &str) -> String;

    /// Returns the placeholder for a parameterized query.
    ///
    /// - PostgreSQL uses `$1`, `$2`, etc.
    fn get_placeholder(&self, index: usize) -> String;

    /// Type every projected column is cast to, so cells come back as text.
    fn text_type(&self) -> &'static str;

    /// Function building a JSON object from alternating key/value arguments.
    fn json_object_function(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl Dialect for Postgres {
    fn quote_identifier(&self, ident: &str) -> String {
        format!(r#""{}""#, ident.replace('"', r#""""#))
    }

    fn quote_literal(&self, text: &str) -> String {
        format!("'{}'", text.replace('\'', "''"))
    }

    fn get_placeholder(&self, index: usize) -> String {
        // PostgreSQL uses $1, $2, etc.
        format!("${}", index + 1)
    }

    fn text_type(&self) -> &'static str {
        "TEXT"
    }

    fn json_object_function(&self) -> &'static str {
        "json_build_object"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postgres_quoting() {
        let d = Postgres;
        assert_eq!(d.quote_identifier("events"), r#""events""#);
        assert_eq!(d.quote_identifier(r#"we"ird"#), r#""we""ird""#);
        assert_eq!(d.quote_literal("it's"), "'it''s'");
        assert_eq!(d.get_placeholder(0), "$1");
        assert_eq!(d.get_placeholder(2), "$3");
    }
}
