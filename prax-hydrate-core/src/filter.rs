//! Filter types for the WHERE clause of a batched fetch.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A filter value bound as a query parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
    /// String value.
    String(String),
    /// List of values.
    List(Vec<FilterValue>),
}

impl FilterValue {
    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

/// A primary key component.
///
/// Unlike [`FilterValue`], key values are hashable and totally ordered so they
/// can be used for identity-map lookups and deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyValue {
    /// Integer key.
    Int(i64),
    /// UUID key.
    Uuid(Uuid),
    /// String key.
    String(String),
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Uuid(v) => write!(f, "{}", v),
            Self::String(v) => write!(f, "{}", v),
        }
    }
}

impl From<i32> for KeyValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<i64> for KeyValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for KeyValue {
    fn from(v: u32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<Uuid> for KeyValue {
    fn from(v: Uuid) -> Self {
        Self::Uuid(v)
    }
}

impl From<String> for KeyValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for KeyValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<KeyValue> for FilterValue {
    fn from(v: KeyValue) -> Self {
        match v {
            KeyValue::Int(i) => Self::Int(i),
            KeyValue::Uuid(u) => Self::String(u.to_string()),
            KeyValue::String(s) => Self::String(s),
        }
    }
}

/// A filter that can be converted to SQL.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Filter {
    /// No filter (always true).
    #[default]
    None,
    /// Equals comparison.
    Equals(String, FilterValue),
    /// In a list of values.
    In(String, Vec<FilterValue>),
    /// Logical AND of multiple filters.
    And(Vec<Filter>),
    /// Logical OR of multiple filters.
    Or(Vec<Filter>),
}

impl Filter {
    /// Check if this filter is empty.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Create an AND filter.
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut filters: Vec<_> = filters.into_iter().filter(|f| !f.is_none()).collect();
        match filters.len() {
            0 => Self::None,
            1 => filters.remove(0),
            _ => Self::And(filters),
        }
    }

    /// Create an OR filter.
    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        let mut filters: Vec<_> = filters.into_iter().filter(|f| !f.is_none()).collect();
        match filters.len() {
            0 => Self::None,
            1 => filters.remove(0),
            _ => Self::Or(filters),
        }
    }

    /// Generate SQL for this filter with `$n` placeholders starting after `param_offset`.
    /// Returns (sql, params) where params are the values to bind.
    pub fn to_sql(&self, param_offset: usize) -> (String, Vec<FilterValue>) {
        let mut params = Vec::new();
        let sql = self.write_sql(param_offset, &mut params);
        (sql, params)
    }

    fn write_sql(&self, offset: usize, params: &mut Vec<FilterValue>) -> String {
        match self {
            Self::None => "TRUE".to_string(),
            Self::Equals(col, val) => {
                if val.is_null() {
                    format!("{} IS NULL", col)
                } else {
                    params.push(val.clone());
                    format!("{} = ${}", col, offset + params.len())
                }
            }
            Self::In(col, values) => {
                if values.is_empty() {
                    return "FALSE".to_string();
                }
                let placeholders: Vec<_> = values
                    .iter()
                    .map(|v| {
                        params.push(v.clone());
                        format!("${}", offset + params.len())
                    })
                    .collect();
                format!("{} IN ({})", col, placeholders.join(", "))
            }
            Self::And(filters) => {
                if filters.is_empty() {
                    return "TRUE".to_string();
                }
                let parts: Vec<_> = filters.iter().map(|f| f.write_sql(offset, params)).collect();
                format!("({})", parts.join(" AND "))
            }
            Self::Or(filters) => {
                if filters.is_empty() {
                    return "FALSE".to_string();
                }
                let parts: Vec<_> = filters.iter().map(|f| f.write_sql(offset, params)).collect();
                format!("({})", parts.join(" OR "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_value_into_filter_value() {
        assert_eq!(FilterValue::from(KeyValue::from(42)), FilterValue::Int(42));
        assert_eq!(
            FilterValue::from(KeyValue::from("sku-1")),
            FilterValue::String("sku-1".to_string())
        );
    }

    #[test]
    fn test_key_value_display() {
        let id = Uuid::nil();
        assert_eq!(KeyValue::from(10).to_string(), "10");
        assert_eq!(KeyValue::from(id).to_string(), id.to_string());
    }

    #[test]
    fn test_filter_in() {
        let filter = Filter::In("subject.id".to_string(), vec![1.into(), 2.into()]);
        let (sql, params) = filter.to_sql(0);
        assert_eq!(sql, "subject.id IN ($1, $2)");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_filter_in_empty_matches_nothing() {
        let (sql, params) = Filter::In("id".to_string(), vec![]).to_sql(0);
        assert_eq!(sql, "FALSE");
        assert!(params.is_empty());
    }

    #[test]
    fn test_filter_or_of_and_numbers_params_in_order() {
        let filter = Filter::or([
            Filter::and([
                Filter::Equals("a".to_string(), 1.into()),
                Filter::Equals("b".to_string(), 2.into()),
            ]),
            Filter::and([
                Filter::Equals("a".to_string(), 3.into()),
                Filter::Equals("b".to_string(), 4.into()),
            ]),
        ]);

        let (sql, params) = filter.to_sql(0);
        assert_eq!(sql, "((a = $1 AND b = $2) OR (a = $3 AND b = $4))");
        assert_eq!(
            params,
            vec![
                FilterValue::Int(1),
                FilterValue::Int(2),
                FilterValue::Int(3),
                FilterValue::Int(4)
            ]
        );
    }

    #[test]
    fn test_filter_and_collapses_single() {
        let filter = Filter::and([Filter::None, Filter::Equals("id".to_string(), 7.into())]);
        assert!(matches!(filter, Filter::Equals(_, _)));
    }
}
