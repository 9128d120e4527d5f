//! Membranes: named logical partitions of the bus.

use std::any::TypeId;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::errors::BusError;
use crate::receptor::ErasedReceptor;

/// Name of a membrane, unique within the bus.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MembraneId(Arc<str>);

impl MembraneId {
    /// Build a membrane id.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// Membrane name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for MembraneId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MembraneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One partition's receptor registry: message type → ordered receptors.
///
/// Mutated only through the builder during single-threaded startup;
/// immutable once the bus is built, so publish-time lookups take no locks.
pub(crate) struct Membrane {
    id: MembraneId,
    receptors: HashMap<TypeId, Vec<ErasedReceptor>>,
}

impl Membrane {
    pub(crate) fn new(id: MembraneId) -> Self {
        Self {
            id,
            receptors: HashMap::new(),
        }
    }

    pub(crate) fn id(&self) -> &MembraneId {
        &self.id
    }

    /// Append a receptor for `type_id`, preserving registration order.
    ///
    /// Registering the same instance (Arc pointer identity) twice for the
    /// same type is rejected so a message is never double-delivered.
    pub(crate) fn register(
        &mut self,
        type_id: TypeId,
        type_name: &'static str,
        receptor: ErasedReceptor,
    ) -> Result<(), BusError> {
        let chain = self.receptors.entry(type_id).or_default();
        if chain.iter().any(|r| r.identity == receptor.identity) {
            return Err(BusError::DuplicateReceptor {
                membrane: self.id.name().to_owned(),
                message_type: type_name,
                receptor: receptor.name,
            });
        }
        chain.push(receptor);
        Ok(())
    }

    /// Receptors registered for a message type; empty slice when none.
    pub(crate) fn receptors_for(&self, type_id: TypeId) -> &[ErasedReceptor] {
        self.receptors.get(&type_id).map_or(&[], Vec::as_slice)
    }

    /// Number of receptors registered for a message type.
    pub(crate) fn receptor_count(&self, type_id: TypeId) -> usize {
        self.receptors_for(type_id).len()
    }
}
