use std::any::type_name;
use std::any::Any;
use std::any::TypeId;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::rc::Weak;

use tracing::warn;

use crate::Error;
use crate::Result;

/// The receiver an invocation is made on, the `self` a shared debounced
/// method is called through.
///
/// Identity is the allocation behind the `Rc`; the blueprint is the concrete
/// type `T` it was created from.
#[derive(Clone)]
pub struct Receiver {
    object: Rc<dyn Any>,
    blueprint: TypeId,
    blueprint_name: &'static str,
}

impl Receiver {
    pub fn new<T: Any>(object: Rc<T>) -> Self {
        Self {
            object,
            blueprint: TypeId::of::<T>(),
            blueprint_name: type_name::<T>(),
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.object.downcast_ref::<T>()
    }

    pub fn blueprint(&self) -> TypeId {
        self.blueprint
    }

    pub fn blueprint_name(&self) -> &'static str {
        self.blueprint_name
    }

    pub fn same_instance(
        &self,
        other: &Receiver,
    ) -> bool {
        address(&self.object) == address(&other.object)
    }
}

impl fmt::Debug for Receiver {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Receiver")
            .field("blueprint", &self.blueprint_name)
            .field("address", &address(&self.object))
            .finish()
    }
}

fn address(object: &Rc<dyn Any>) -> *const () {
    Rc::as_ptr(object) as *const ()
}

/// Side table remembering the first receiver seen per blueprint.
///
/// Holds weak references: the guard must not keep a receiver alive, and a
/// live `Weak` pins the allocation so its address cannot be reused by a
/// different instance.
#[derive(Default)]
pub(crate) struct ContextGuard {
    owners: HashMap<TypeId, Weak<dyn Any>>,
}

impl ContextGuard {
    /// Binds `receiver` as its blueprint's owner, or rejects it when a
    /// different instance of the same blueprint already owns the debouncer.
    pub(crate) fn admit(
        &mut self,
        receiver: &Receiver,
    ) -> Result<()> {
        match self.owners.entry(receiver.blueprint) {
            Entry::Vacant(slot) => {
                slot.insert(Rc::downgrade(&receiver.object));
                Ok(())
            }
            Entry::Occupied(owner) => {
                if owner.get().as_ptr() as *const () == address(&receiver.object) {
                    return Ok(());
                }
                warn!(blueprint = receiver.blueprint_name, "debounced method called with a second receiver");
                Err(Error::ContextMismatch {
                    blueprint: receiver.blueprint_name,
                })
            }
        }
    }
}
