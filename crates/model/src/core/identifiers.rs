use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, sync::Arc};
use thiserror::Error;

const MAX_IDENTIFIER_LEN: usize = 63;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("identifier is empty")]
    Empty,

    #[error("identifier '{0}' is longer than 63 characters")]
    TooLong(String),

    #[error(
        "identifier '{0}' contains unsupported characters (expected letters, digits, '_' or '$', not starting with a digit or '$')"
    )]
    InvalidCharacters(String),

    #[error("table name '{0}' has more than one schema qualifier")]
    TooManyParts(String),
}

/// A table or column name that passed the allow-list and is safe to quote
/// into query text.
///
/// Names are folded to lower case, which is how the server resolves
/// unquoted identifiers, and are always emitted double-quoted afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier(Arc<str>);

impl Identifier {
    pub fn parse(raw: &str) -> Result<Self, IdentifierError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(IdentifierError::Empty);
        }
        if raw.chars().count() > MAX_IDENTIFIER_LEN {
            return Err(IdentifierError::TooLong(raw.to_string()));
        }

        let mut chars = raw.chars();
        let first_ok = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
        if !first_ok || !rest_ok {
            return Err(IdentifierError::InvalidCharacters(raw.to_string()));
        }

        Ok(Self(Arc::from(raw.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Identifier::parse(s)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A possibly schema-qualified table name, e.g. `audit.events`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableName {
    pub schema: Option<Identifier>,
    pub name: Identifier,
}

impl FromStr for TableName {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        match parts.as_slice() {
            [name] => Ok(TableName {
                schema: None,
                name: Identifier::parse(name)?,
            }),
            [schema, name] => Ok(TableName {
                schema: Some(Identifier::parse(schema)?),
                name: Identifier::parse(name)?,
            }),
            _ => Err(IdentifierError::TooManyParts(s.to_string())),
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{schema}.{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_is_folded_to_lower_case() {
        let ident = Identifier::parse("Created_At").unwrap();
        assert_eq!(ident.as_str(), "created_at");
    }

    #[test]
    fn test_identifier_rejects_injection() {
        assert!(matches!(
            Identifier::parse("id; DROP TABLE users"),
            Err(IdentifierError::InvalidCharacters(_))
        ));
        assert!(matches!(
            Identifier::parse("name\""),
            Err(IdentifierError::InvalidCharacters(_))
        ));
        assert!(matches!(
            Identifier::parse("1abc"),
            Err(IdentifierError::InvalidCharacters(_))
        ));
        assert_eq!(Identifier::parse("  "), Err(IdentifierError::Empty));
    }

    #[test]
    fn test_identifier_length_limit() {
        let long = "a".repeat(64);
        assert!(matches!(
            Identifier::parse(&long),
            Err(IdentifierError::TooLong(_))
        ));
        assert!(Identifier::parse(&"a".repeat(63)).is_ok());
    }

    #[test]
    fn test_table_name_with_schema() {
        let table: TableName = "Audit.Events".parse().unwrap();
        assert_eq!(table.schema.unwrap().as_str(), "audit");
        assert_eq!(table.name.as_str(), "events");

        let table: TableName = "events".parse().unwrap();
        assert!(table.schema.is_none());
        assert_eq!(table.to_string(), "events");

        assert!(matches!(
            "a.b.c".parse::<TableName>(),
            Err(IdentifierError::TooManyParts(_))
        ));
    }
}
