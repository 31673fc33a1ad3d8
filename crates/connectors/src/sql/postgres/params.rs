use bytes::BytesMut;
use model::core::value::Value;
use std::error::Error;
use tokio_postgres::types::{Format, IsNull, ToSql, Type, to_sql_checked};

/// Text sent in the wire's text format for a parameter of any type; the
/// server runs it through the input function of whatever type it inferred
/// for the placeholder.
#[derive(Debug, Clone)]
pub struct UntypedText(pub String);

impl ToSql for UntypedText {
    fn to_sql(
        &self,
        _ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        out.extend_from_slice(self.0.as_bytes());
        Ok(IsNull::No)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    fn encode_format(&self, _ty: &Type) -> Format {
        Format::Text
    }

    to_sql_checked!();
}

pub struct PgParam(Box<dyn ToSql + Sync + Send>);

impl PgParam {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Int(v) => PgParam(Box::new(v)),
            Value::Untyped(v) => PgParam(Box::new(UntypedText(v))),
        }
    }
}

impl AsRef<dyn ToSql + Sync> for PgParam {
    fn as_ref(&self) -> &(dyn ToSql + Sync + 'static) {
        &*self.0
    }
}

pub struct PgParamStore {
    pub params: Vec<PgParam>,
}

impl PgParamStore {
    pub fn from_values(values: Vec<Value>) -> Self {
        Self {
            params: values.into_iter().map(PgParam::from_value).collect(),
        }
    }

    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|param| param.as_ref())
            .collect::<Vec<_>>()
    }
}
