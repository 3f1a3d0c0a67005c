//! Hydration subjects and in-memory association values.

use std::fmt;

use crate::traits::EntityRef;

/// Value of an association on a loaded entity.
#[derive(Clone, Default)]
pub enum AssociationValue {
    /// No related entity.
    #[default]
    Null,
    /// A single related entity (to-one).
    One(EntityRef),
    /// A collection of related entities (to-many).
    Many(Vec<EntityRef>),
}

impl AssociationValue {
    /// Check if this value holds no entity.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::One(_) => false,
            Self::Many(entities) => entities.is_empty(),
        }
    }

    /// Number of entities held.
    pub fn len(&self) -> usize {
        match self {
            Self::Null => 0,
            Self::One(_) => 1,
            Self::Many(entities) => entities.len(),
        }
    }

    /// Flatten into a list of entities. `Null` yields an empty list.
    pub fn into_entities(self) -> Vec<EntityRef> {
        match self {
            Self::Null => Vec::new(),
            Self::One(entity) => vec![entity],
            Self::Many(entities) => entities,
        }
    }

    /// Iterate over the held entities.
    pub fn iter(&self) -> impl Iterator<Item = &EntityRef> {
        let slice: &[EntityRef] = match self {
            Self::Null => &[],
            Self::One(entity) => std::slice::from_ref(entity),
            Self::Many(entities) => entities,
        };
        slice.iter()
    }
}

impl fmt::Debug for AssociationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::One(entity) => f.debug_tuple("One").field(&describe(entity)).finish(),
            Self::Many(entities) => f
                .debug_tuple("Many")
                .field(&entities.iter().map(describe).collect::<Vec<_>>())
                .finish(),
        }
    }
}

/// Short label such as `Customer#10`.
pub(crate) fn describe(entity: &EntityRef) -> String {
    match entity.primary_key() {
        Some(pk) => {
            let values: Vec<_> = pk.iter().map(ToString::to_string).collect();
            format!("{}#{}", entity.model_name(), values.join(","))
        }
        None => format!("{}#new", entity.model_name()),
    }
}

impl From<EntityRef> for AssociationValue {
    fn from(entity: EntityRef) -> Self {
        Self::One(entity)
    }
}

impl From<Option<EntityRef>> for AssociationValue {
    fn from(entity: Option<EntityRef>) -> Self {
        entity.map_or(Self::Null, Self::One)
    }
}

impl From<Vec<EntityRef>> for AssociationValue {
    fn from(entities: Vec<EntityRef>) -> Self {
        Self::Many(entities)
    }
}

/// In-memory state of an association slot on an entity.
#[derive(Debug, Clone)]
pub enum Association {
    /// Already materialized.
    Loaded(AssociationValue),
    /// Not materialized; reading goes through the session.
    Deferred,
}

impl Association {
    /// Check if the association is materialized.
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

impl From<AssociationValue> for Association {
    fn from(value: AssociationValue) -> Self {
        Self::Loaded(value)
    }
}

impl From<Option<EntityRef>> for Association {
    fn from(entity: Option<EntityRef>) -> Self {
        Self::Loaded(entity.into())
    }
}

impl From<Vec<EntityRef>> for Association {
    fn from(entities: Vec<EntityRef>) -> Self {
        Self::Loaded(entities.into())
    }
}

/// Input of a hydration call: nothing, one entity, or a flat list.
#[derive(Clone, Default)]
pub enum Subjects {
    /// No subject.
    #[default]
    Null,
    /// A single entity.
    One(EntityRef),
    /// A flat list of entities.
    Many(Vec<EntityRef>),
}

impl Subjects {
    /// Check if there is nothing to hydrate.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::One(_) => false,
            Self::Many(entities) => entities.is_empty(),
        }
    }

    /// Normalize into a flat list of entities.
    pub fn into_entities(self) -> Vec<EntityRef> {
        match self {
            Self::Null => Vec::new(),
            Self::One(entity) => vec![entity],
            Self::Many(entities) => entities,
        }
    }
}

impl From<EntityRef> for Subjects {
    fn from(entity: EntityRef) -> Self {
        Self::One(entity)
    }
}

impl From<&EntityRef> for Subjects {
    fn from(entity: &EntityRef) -> Self {
        Self::One(entity.clone())
    }
}

impl From<Option<EntityRef>> for Subjects {
    fn from(entity: Option<EntityRef>) -> Self {
        entity.map_or(Self::Null, Self::One)
    }
}

impl From<Vec<EntityRef>> for Subjects {
    fn from(entities: Vec<EntityRef>) -> Self {
        Self::Many(entities)
    }
}

impl From<&[EntityRef]> for Subjects {
    fn from(entities: &[EntityRef]) -> Self {
        Self::Many(entities.to_vec())
    }
}

impl From<&Vec<EntityRef>> for Subjects {
    fn from(entities: &Vec<EntityRef>) -> Self {
        Self::Many(entities.clone())
    }
}

impl From<AssociationValue> for Subjects {
    fn from(value: AssociationValue) -> Self {
        match value {
            AssociationValue::Null => Self::Null,
            AssociationValue::One(entity) => Self::One(entity),
            AssociationValue::Many(entities) => Self::Many(entities),
        }
    }
}
