//! The single batched fetch issued per hydrated path.

use smol_str::SmolStr;

use crate::filter::{Filter, FilterValue};
use crate::identity::IdentityKey;
use crate::metadata::ModelMetadata;
use crate::relations::RelationSpec;

/// Alias of the subject table in generated SQL.
pub const SUBJECT_ALIAS: &str = "subject";

/// Alias of the joined association in generated SQL.
pub const ASSOCIATION_ALIAS: &str = "associations";

/// A request to load `join` for every subject in `keys` with one query.
///
/// Only the subjects' identifier columns are selected, together with the
/// joined association's columns. The join is a LEFT join so subjects without
/// a related row are still matched.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchFetch {
    /// Target model name.
    pub model: SmolStr,
    /// Target table.
    pub table: String,
    /// Identifier columns of the target model.
    pub id_columns: Vec<String>,
    /// Association joined and materialized.
    pub join: RelationSpec,
    /// Deduplicated identities of the subjects, in first-seen order.
    pub keys: Vec<IdentityKey>,
}

impl BatchFetch {
    /// Create a fetch of `join` on `target` for the given subject keys.
    pub fn new(target: &ModelMetadata, join: RelationSpec, keys: Vec<IdentityKey>) -> Self {
        Self {
            model: target.name.clone(),
            table: target.table.clone(),
            id_columns: target.primary_key.clone(),
            join,
            keys,
        }
    }

    /// Name of the joined association.
    pub fn association(&self) -> &str {
        &self.join.name
    }

    /// Number of subject keys.
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// WHERE filter selecting the subject keys.
    ///
    /// Single-column keys become an `IN` list; composite keys become an OR of
    /// per-key conjunctions.
    pub fn filter(&self) -> Filter {
        match self.id_columns.as_slice() {
            [column] => Filter::In(
                format!("{}.{}", SUBJECT_ALIAS, column),
                self.keys
                    .iter()
                    .filter_map(|key| key.values().first().cloned().map(FilterValue::from))
                    .collect(),
            ),
            columns => Filter::or(self.keys.iter().map(|key| {
                Filter::and(columns.iter().zip(key.values()).map(|(column, value)| {
                    Filter::Equals(
                        format!("{}.{}", SUBJECT_ALIAS, column),
                        FilterValue::from(value.clone()),
                    )
                }))
            })),
        }
    }

    /// Render the fetch as parameterized SQL.
    pub fn to_sql(&self) -> (String, Vec<FilterValue>) {
        let ids: Vec<_> = self
            .id_columns
            .iter()
            .map(|c| format!("{}.{}", SUBJECT_ALIAS, c))
            .collect();

        let (where_sql, params) = self.filter().to_sql(0);

        let sql = format!(
            "SELECT {}, {}.* FROM {} AS {} {} WHERE {}",
            ids.join(", "),
            ASSOCIATION_ALIAS,
            self.table,
            SUBJECT_ALIAS,
            self.join.to_left_join_clause(SUBJECT_ALIAS, ASSOCIATION_ALIAS),
            where_sql
        );

        (sql, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::KeyValue;
    use pretty_assertions::assert_eq;

    fn customers() -> ModelMetadata {
        ModelMetadata::new("Customer", "customers")
    }

    fn address_relation() -> RelationSpec {
        RelationSpec::many_to_one("address", "Address", "addresses")
            .fields(["address_id"])
            .references(["id"])
    }

    #[test]
    fn test_single_key_sql() {
        let fetch = BatchFetch::new(
            &customers(),
            address_relation(),
            vec![IdentityKey::single("Customer", 10), IdentityKey::single("Customer", 11)],
        );

        let (sql, params) = fetch.to_sql();
        assert_eq!(
            sql,
            "SELECT subject.id, associations.* FROM customers AS subject \
             LEFT JOIN addresses AS associations ON subject.address_id = associations.id \
             WHERE subject.id IN ($1, $2)"
        );
        assert_eq!(params, vec![FilterValue::Int(10), FilterValue::Int(11)]);
        assert_eq!(fetch.association(), "address");
        assert_eq!(fetch.key_count(), 2);
    }

    #[test]
    fn test_composite_key_sql() {
        let lines = ModelMetadata::new("OrderLine", "order_lines").with_primary_key(["order_id", "line_no"]);
        let product = RelationSpec::many_to_one("product", "Product", "products")
            .fields(["product_id"])
            .references(["id"]);
        let fetch = BatchFetch::new(
            &lines,
            product,
            vec![
                IdentityKey::new("OrderLine", [KeyValue::from(1), KeyValue::from(1)]),
                IdentityKey::new("OrderLine", [KeyValue::from(1), KeyValue::from(2)]),
            ],
        );

        let (sql, params) = fetch.to_sql();
        assert!(sql.starts_with("SELECT subject.order_id, subject.line_no, associations.*"));
        assert!(sql.ends_with(
            "WHERE ((subject.order_id = $1 AND subject.line_no = $2) \
             OR (subject.order_id = $3 AND subject.line_no = $4))"
        ));
        assert_eq!(params.len(), 4);
    }
}
