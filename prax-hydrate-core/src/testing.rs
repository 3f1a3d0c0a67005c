//! Shared fixtures for unit tests: a small order/customer schema and
//! record entities.

use std::any::Any;
use std::sync::Arc;

use smallvec::smallvec;

use crate::filter::KeyValue;
use crate::hydrator::AssociationHydrator;
use crate::memory::MemoryExecutor;
use crate::metadata::{ModelMetadata, SchemaRegistry};
use crate::relations::RelationSpec;
use crate::session::Session;
use crate::subject::{Association, AssociationValue};
use crate::traits::{Entity, EntityRef, PrimaryKey};

/// Generic entity with named association slots.
pub(crate) struct Record {
    model: &'static str,
    id: Option<i64>,
    slots: Vec<(&'static str, Association)>,
}

impl Record {
    fn entity(model: &'static str, id: Option<i64>, slots: Vec<(&'static str, Association)>) -> EntityRef {
        Arc::new(Self { model, id, slots })
    }
}

impl Entity for Record {
    fn model_name(&self) -> &str {
        self.model
    }

    fn primary_key(&self) -> Option<PrimaryKey> {
        self.id.map(|id| smallvec![KeyValue::Int(id)])
    }

    fn association(&self, name: &str) -> Option<Association> {
        self.slots
            .iter()
            .find(|(slot, _)| *slot == name)
            .map(|(_, association)| association.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Order with a loaded customer and deferred items.
pub(crate) fn order(id: i64, customer: Option<EntityRef>) -> EntityRef {
    Record::entity(
        "Order",
        Some(id),
        vec![("customer", customer.into()), ("items", Association::Deferred)],
    )
}

/// Order without customer and with loaded items.
pub(crate) fn order_with_items(id: i64, items: Vec<EntityRef>) -> EntityRef {
    Record::entity(
        "Order",
        Some(id),
        vec![("customer", AssociationValue::Null.into()), ("items", items.into())],
    )
}

fn customer_slots(address: Option<EntityRef>) -> Vec<(&'static str, Association)> {
    vec![("address", address.into()), ("orders", Association::Deferred)]
}

/// Customer with a loaded address and deferred orders.
pub(crate) fn customer(id: i64, address: Option<EntityRef>) -> EntityRef {
    Record::entity("Customer", Some(id), customer_slots(address))
}

/// Customer reported under an alias model name, address not loaded.
pub(crate) fn customer_proxy(id: i64) -> EntityRef {
    Record::entity(
        "CustomerProxy",
        Some(id),
        vec![("address", Association::Deferred), ("orders", Association::Deferred)],
    )
}

/// Customer that was never persisted.
pub(crate) fn transient_customer() -> EntityRef {
    Record::entity("Customer", None, customer_slots(None))
}

pub(crate) fn address(id: i64) -> EntityRef {
    Record::entity("Address", Some(id), Vec::new())
}

pub(crate) fn item(id: i64, product: Option<EntityRef>) -> EntityRef {
    Record::entity("OrderItem", Some(id), vec![("product", product.into())])
}

pub(crate) fn product(id: i64) -> EntityRef {
    Record::entity("Product", Some(id), Vec::new())
}

/// Order -> Customer -> Address, Order -> OrderItem -> Product.
pub(crate) fn schema() -> SchemaRegistry {
    SchemaRegistry::new()
        .with_model(
            ModelMetadata::new("Order", "orders")
                .with_relation(
                    RelationSpec::many_to_one("customer", "Customer", "customers")
                        .fields(["customer_id"])
                        .references(["id"]),
                )
                .with_relation(
                    RelationSpec::one_to_many("items", "OrderItem", "order_items")
                        .fields(["id"])
                        .references(["order_id"]),
                ),
        )
        .with_model(
            ModelMetadata::new("Customer", "customers")
                .with_relation(
                    RelationSpec::many_to_one("address", "Address", "addresses")
                        .fields(["address_id"])
                        .references(["id"]),
                )
                .with_relation(
                    RelationSpec::one_to_many("orders", "Order", "orders")
                        .fields(["id"])
                        .references(["customer_id"]),
                ),
        )
        .with_model(ModelMetadata::new("Address", "addresses"))
        .with_model(
            ModelMetadata::new("OrderItem", "order_items").with_relation(
                RelationSpec::many_to_one("product", "Product", "products")
                    .fields(["product_id"])
                    .references(["id"]),
            ),
        )
        .with_model(ModelMetadata::new("Product", "products"))
}

/// A session over a spying memory executor and [`schema`].
pub(crate) struct Fixture {
    pub(crate) executor: MemoryExecutor,
    pub(crate) session: Session,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        Self::with_registry(schema())
    }

    pub(crate) fn with_registry(registry: SchemaRegistry) -> Self {
        let executor = MemoryExecutor::with_metadata(registry.clone());
        let session = Session::new(executor.clone(), registry);
        Self { executor, session }
    }

    /// Persisted customer whose address is not loaded.
    pub(crate) fn deferred_customer(&self, id: i64) -> EntityRef {
        let customer = Record::entity(
            "Customer",
            Some(id),
            vec![("address", Association::Deferred), ("orders", Association::Deferred)],
        );
        self.executor
            .insert(customer.clone())
            .expect("fixture customer has an id");
        customer
    }

    pub(crate) fn hydrator(&self, model: &str) -> AssociationHydrator<'_> {
        AssociationHydrator::new(&self.session, model).expect("model is part of the fixture schema")
    }
}
