//! Address routing
//!
//! Splits an address into container, optional inner container and method,
//! then looks the triple up in the active schema table. Anything the table
//! does not know is unrelated traffic and routes to `None`.

use augmenta_core::Address;

use crate::{Lifecycle, ProtocolVersion, Recipe, RecordKind, SchemaTable};

/// Routing decision for one message
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Route {
    pub kind: RecordKind,
    pub recipe: Recipe,
    pub lifecycle: Lifecycle,
}

/// Maps addresses to routes for one protocol version
#[derive(Clone, Copy, Debug, Default)]
pub struct AddressRouter {
    schema: SchemaTable,
}

impl AddressRouter {
    pub fn new(schema: SchemaTable) -> Self {
        AddressRouter { schema }
    }

    pub fn for_version(version: ProtocolVersion) -> Self {
        AddressRouter::new(SchemaTable::for_version(version))
    }

    pub fn schema(&self) -> &SchemaTable {
        &self.schema
    }

    /// Route an address. Pure: the same address always yields the same route.
    pub fn route(&self, address: &Address) -> Option<Route> {
        // Known layouts nest at most two containers deep
        if address.container_count() > 2 {
            return None;
        }

        let entry = self
            .schema
            .lookup(address.container(0), address.container(1), address.method())?;

        Some(Route {
            kind: entry.recipe.kind(),
            recipe: entry.recipe,
            lifecycle: entry.lifecycle,
        })
    }
}
