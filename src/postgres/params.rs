use std::error::Error;

use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use tokio_util::bytes;

use crate::types::RowValues;

/// Borrow a slice of values as Postgres parameters.
#[must_use]
pub fn as_refs(values: &[RowValues]) -> Vec<&(dyn ToSql + Sync)> {
    values.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
}

fn narrow<T: TryFrom<i64>>(value: i64, ty: &Type) -> Result<T, Box<dyn Error + Sync + Send>> {
    T::try_from(value).map_err(|_| format!("integer {value} out of range for {ty}").into())
}

fn parse_text<T: std::str::FromStr>(
    text: &str,
    ty: &Type,
) -> Result<T, Box<dyn Error + Sync + Send>> {
    text.trim()
        .parse::<T>()
        .map_err(|_| format!("cannot convert text `{text}` to {ty}").into())
}

impl ToSql for RowValues {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut bytes::BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            RowValues::Int(i) => match *ty {
                Type::INT2 => narrow::<i16>(*i, ty)?.to_sql(ty, out),
                Type::INT4 => narrow::<i32>(*i, ty)?.to_sql(ty, out),
                Type::FLOAT4 | Type::FLOAT8 => (*i as f64).to_sql(ty, out),
                Type::TEXT | Type::VARCHAR | Type::BPCHAR => i.to_string().to_sql(ty, out),
                _ => i.to_sql(ty, out),
            },
            RowValues::Float(f) => match *ty {
                Type::FLOAT4 => (*f as f32).to_sql(ty, out),
                _ => f.to_sql(ty, out),
            },
            // Insert ids come back as text, so numeric columns parse them.
            RowValues::Text(s) => match *ty {
                Type::INT2 => parse_text::<i16>(s, ty)?.to_sql(ty, out),
                Type::INT4 => parse_text::<i32>(s, ty)?.to_sql(ty, out),
                Type::INT8 => parse_text::<i64>(s, ty)?.to_sql(ty, out),
                Type::FLOAT4 => parse_text::<f32>(s, ty)?.to_sql(ty, out),
                Type::FLOAT8 => parse_text::<f64>(s, ty)?.to_sql(ty, out),
                _ => s.to_sql(ty, out),
            },
            RowValues::Bool(b) => b.to_sql(ty, out),
            RowValues::Timestamp(dt) => dt.to_sql(ty, out),
            RowValues::Null => Ok(IsNull::Yes),
            RowValues::JSON(jsval) => jsval.to_sql(ty, out),
            RowValues::Blob(bytes) => bytes.to_sql(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        matches!(
            *ty,
            Type::INT2
                | Type::INT4
                | Type::INT8
                | Type::FLOAT4
                | Type::FLOAT8
                | Type::TEXT
                | Type::VARCHAR
                | Type::BPCHAR
                | Type::NAME
                | Type::UNKNOWN
                | Type::BOOL
                | Type::TIMESTAMP
                | Type::JSON
                | Type::JSONB
                | Type::BYTEA
        )
    }

    to_sql_checked!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: &RowValues, ty: &Type) -> Result<Vec<u8>, Box<dyn Error + Sync + Send>> {
        let mut out = bytes::BytesMut::new();
        value.to_sql(ty, &mut out)?;
        Ok(out.to_vec())
    }

    #[test]
    fn numeric_text_binds_as_the_column_type() {
        let id = RowValues::from("1");
        assert_eq!(encode(&id, &Type::INT8).unwrap(), 1i64.to_be_bytes());
        assert_eq!(encode(&id, &Type::INT4).unwrap(), 1i32.to_be_bytes());
        assert_eq!(encode(&id, &Type::INT2).unwrap(), 1i16.to_be_bytes());
        assert_eq!(
            encode(&RowValues::from("2.5"), &Type::FLOAT8).unwrap(),
            2.5f64.to_be_bytes()
        );
        assert_eq!(
            encode(&RowValues::from("2.5"), &Type::FLOAT4).unwrap(),
            2.5f32.to_be_bytes()
        );
    }

    #[test]
    fn non_numeric_text_is_a_conversion_error() {
        let err = encode(&RowValues::from("abc"), &Type::INT8).unwrap_err();
        assert!(err.to_string().contains("abc"));
        assert!(encode(&RowValues::from("70000"), &Type::INT2).is_err());
    }

    #[test]
    fn text_columns_keep_text() {
        assert_eq!(encode(&RowValues::from("1"), &Type::TEXT).unwrap(), b"1");
    }

    #[test]
    fn integers_narrow_to_smaller_columns() {
        assert_eq!(encode(&RowValues::Int(7), &Type::INT4).unwrap(), 7i32.to_be_bytes());
        assert!(encode(&RowValues::Int(i64::MAX), &Type::INT4).is_err());
    }
}
