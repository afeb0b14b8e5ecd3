//! Bean auto-registration via the inventory crate.
//!
//! Every non-generic type deriving `Validate` submits a [`BeanRegistration`],
//! so the constrained types linked into a binary can be listed at runtime.

use std::any::TypeId;

use crate::types::BeanDescriptor;

/// Registration entry submitted by `#[derive(Validate)]`.
pub struct BeanRegistration {
    /// Name of the bean type (e.g., "PersonRecord")
    pub type_name: &'static str,
    pub type_id: fn() -> TypeId,
    pub descriptor_fn: fn() -> &'static BeanDescriptor,
}

impl BeanRegistration {
    pub fn descriptor(&self) -> &'static BeanDescriptor {
        (self.descriptor_fn)()
    }
}

inventory::collect!(BeanRegistration);

/// All registered beans, in no particular order.
pub fn registered_beans() -> impl Iterator<Item = &'static BeanRegistration> {
    inventory::iter::<BeanRegistration>()
}

/// Get a registered bean by type name.
pub fn find_bean(type_name: &str) -> Option<&'static BeanRegistration> {
    registered_beans().find(|bean| bean.type_name == type_name)
}

pub fn is_bean_registered<T: 'static>() -> bool {
    let type_id = TypeId::of::<T>();
    registered_beans().any(|bean| (bean.type_id)() == type_id)
}
