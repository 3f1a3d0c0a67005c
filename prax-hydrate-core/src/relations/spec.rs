//! Relation specification types.

use indexmap::IndexMap;
use smol_str::SmolStr;

/// Type of relation between models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationType {
    /// One-to-one relation (e.g., Customer has one Address).
    OneToOne,
    /// One-to-many relation (e.g., Order has many Items).
    OneToMany,
    /// Many-to-one relation (e.g., Order belongs to Customer).
    ManyToOne,
    /// Many-to-many relation (e.g., Product has many Tags).
    ManyToMany,
}

impl RelationType {
    /// Check if this relation returns multiple records.
    pub fn is_many(&self) -> bool {
        matches!(self, Self::OneToMany | Self::ManyToMany)
    }

    /// Check if this relation returns a single record.
    pub fn is_one(&self) -> bool {
        matches!(self, Self::OneToOne | Self::ManyToOne)
    }
}

/// Specification for a relation between models.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationSpec {
    /// Name of the relation (association name on the owning model).
    pub name: SmolStr,
    /// Type of relation.
    pub relation_type: RelationType,
    /// Name of the related model.
    pub related_model: SmolStr,
    /// Name of the related table.
    pub related_table: String,
    /// Join columns on the owning model.
    pub fields: Vec<String>,
    /// Referenced columns on the related model.
    pub references: Vec<String>,
    /// Join table for many-to-many relations.
    pub join_table: Option<JoinTableSpec>,
}

impl RelationSpec {
    fn with_type(
        relation_type: RelationType,
        name: impl Into<SmolStr>,
        related_model: impl Into<SmolStr>,
        related_table: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            relation_type,
            related_model: related_model.into(),
            related_table: related_table.into(),
            fields: Vec::new(),
            references: Vec::new(),
            join_table: None,
        }
    }

    /// Create a one-to-one relation spec.
    pub fn one_to_one(
        name: impl Into<SmolStr>,
        related_model: impl Into<SmolStr>,
        related_table: impl Into<String>,
    ) -> Self {
        Self::with_type(RelationType::OneToOne, name, related_model, related_table)
    }

    /// Create a one-to-many relation spec.
    pub fn one_to_many(
        name: impl Into<SmolStr>,
        related_model: impl Into<SmolStr>,
        related_table: impl Into<String>,
    ) -> Self {
        Self::with_type(RelationType::OneToMany, name, related_model, related_table)
    }

    /// Create a many-to-one relation spec.
    pub fn many_to_one(
        name: impl Into<SmolStr>,
        related_model: impl Into<SmolStr>,
        related_table: impl Into<String>,
    ) -> Self {
        Self::with_type(RelationType::ManyToOne, name, related_model, related_table)
    }

    /// Create a many-to-many relation spec.
    pub fn many_to_many(
        name: impl Into<SmolStr>,
        related_model: impl Into<SmolStr>,
        related_table: impl Into<String>,
        join_table: JoinTableSpec,
    ) -> Self {
        let mut spec = Self::with_type(RelationType::ManyToMany, name, related_model, related_table);
        spec.join_table = Some(join_table);
        spec
    }

    /// Set the join columns on the owning model.
    pub fn fields(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the referenced columns on the related model.
    pub fn references(mut self, refs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.references = refs.into_iter().map(Into::into).collect();
        self
    }

    /// Generate the LEFT JOIN clause for this relation.
    ///
    /// Owners without a related row still produce a result row.
    pub fn to_left_join_clause(&self, parent_alias: &str, child_alias: &str) -> String {
        let default_column = "id".to_string();
        if let Some(ref jt) = self.join_table {
            format!(
                "LEFT JOIN {jt} ON {parent}.{field} = {jt}.{source} \
                 LEFT JOIN {table} AS {child} ON {jt}.{target} = {child}.{reference}",
                jt = jt.table_name,
                parent = parent_alias,
                field = self.fields.first().unwrap_or(&default_column),
                source = jt.source_column,
                table = self.related_table,
                child = child_alias,
                target = jt.target_column,
                reference = self.references.first().unwrap_or(&default_column),
            )
        } else {
            let join_conditions: Vec<_> = self
                .fields
                .iter()
                .zip(self.references.iter())
                .map(|(f, r)| format!("{}.{} = {}.{}", parent_alias, f, child_alias, r))
                .collect();

            format!(
                "LEFT JOIN {} AS {} ON {}",
                self.related_table,
                child_alias,
                join_conditions.join(" AND ")
            )
        }
    }
}

/// Specification for a join table (many-to-many).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinTableSpec {
    /// Name of the join table.
    pub table_name: String,
    /// Column referencing the owning model.
    pub source_column: String,
    /// Column referencing the related model.
    pub target_column: String,
}

impl JoinTableSpec {
    /// Create a new join table spec.
    pub fn new(
        table_name: impl Into<String>,
        source_column: impl Into<String>,
        target_column: impl Into<String>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            source_column: source_column.into(),
            target_column: target_column.into(),
        }
    }
}

/// Registry of relation specifications for a model, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct RelationRegistry {
    relations: IndexMap<SmolStr, RelationSpec>,
}

impl RelationRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a relation, replacing any relation with the same name.
    pub fn register(&mut self, spec: RelationSpec) {
        self.relations.insert(spec.name.clone(), spec);
    }

    /// Get a relation by name.
    pub fn get(&self, name: &str) -> Option<&RelationSpec> {
        self.relations.get(name)
    }

    /// Get all relations.
    pub fn all(&self) -> impl Iterator<Item = &RelationSpec> {
        self.relations.values()
    }

    /// Number of relations.
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    /// Check if no relation is registered.
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}
