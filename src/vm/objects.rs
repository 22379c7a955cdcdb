//! Object instantiation, cloning, and instanceof support.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::runtime::{ObjectInstance, PropertySlot, Value};
use crate::vm::class::ClassEntry;
use crate::vm::error::VmError;
use crate::vm::Vm;

impl Vm {
    /// Instantiate a class by name. Abstract classes and interfaces
    /// cannot be instantiated. The constructor is not run here; the
    /// compiler schedules it as an ordinary pending method call.
    pub(crate) fn instantiate_class(
        &mut self,
        class_name: &str,
    ) -> Result<Rc<RefCell<ObjectInstance>>, VmError> {
        let class = self
            .find_class(class_name)
            .ok_or_else(|| VmError::UndefinedClass(class_name.to_string()))?;
        if class.is_interface {
            return Err(VmError::CannotInstantiateInterface(class.name.clone()));
        }
        if class.is_abstract {
            return Err(VmError::CannotInstantiateAbstract(class.name.clone()));
        }
        Ok(self.instantiate_unchecked(class))
    }

    /// Build an instance with property slots from the declared defaults.
    /// Parent declarations come first; a redeclaration in a subclass
    /// overrides the slot in place.
    pub(crate) fn instantiate_unchecked(
        &mut self,
        class: Arc<ClassEntry>,
    ) -> Rc<RefCell<ObjectInstance>> {
        let id = self.next_object_id();
        let mut instance = ObjectInstance::new(class.clone(), id);
        for entry in self.class_chain_root_first(&class) {
            for prop in &entry.properties {
                if prop.is_static {
                    continue;
                }
                instance.set_property(
                    &prop.name,
                    PropertySlot {
                        value: prop.default.clone(),
                        visibility: prop.visibility,
                        readonly: prop.readonly,
                    },
                );
            }
        }
        Rc::new(RefCell::new(instance))
    }

    fn class_chain_root_first(&self, class: &Arc<ClassEntry>) -> Vec<Arc<ClassEntry>> {
        let mut chain = vec![class.clone()];
        let mut parent = class.parent.clone();
        while let Some(name) = parent {
            match self.find_class(&name) {
                Some(entry) => {
                    parent = entry.parent.clone();
                    chain.push(entry);
                }
                None => break,
            }
        }
        chain.reverse();
        chain
    }

    /// Fresh empty object used for property-write auto-vivification.
    pub(crate) fn vivify_std_object(&mut self) -> Result<Value, VmError> {
        let object = self.instantiate_class("stdClass")?;
        Ok(Value::Object(object))
    }

    /// Shallow copy with a fresh object id. `__clone` is the caller's
    /// responsibility.
    pub(crate) fn clone_instance(
        &mut self,
        source: &Rc<RefCell<ObjectInstance>>,
    ) -> Rc<RefCell<ObjectInstance>> {
        let id = self.next_object_id();
        let src = source.borrow();
        let mut instance = ObjectInstance::new(src.class.clone(), id);
        instance.properties = src.properties.clone();
        Rc::new(RefCell::new(instance))
    }

    /// True when `class_name`, one of its ancestors, or any interface
    /// implemented along the chain matches `target`. Name matching is
    /// case-insensitive.
    pub(crate) fn is_instance_of(&self, class_name: &str, target: &str) -> bool {
        let mut current = Some(class_name.to_string());
        while let Some(name) = current {
            if name.eq_ignore_ascii_case(target) {
                return true;
            }
            match self.find_class(&name) {
                Some(class) => {
                    if class
                        .interfaces
                        .iter()
                        .any(|iface| self.interface_matches(iface, target))
                    {
                        return true;
                    }
                    current = class.parent.clone();
                }
                None => break,
            }
        }
        false
    }

    fn interface_matches(&self, interface: &str, target: &str) -> bool {
        if interface.eq_ignore_ascii_case(target) {
            return true;
        }
        match self.find_class(interface) {
            Some(entry) => {
                entry
                    .interfaces
                    .iter()
                    .any(|parent| self.interface_matches(parent, target))
                    || entry
                        .parent
                        .as_deref()
                        .map(|parent| self.interface_matches(parent, target))
                        .unwrap_or(false)
            }
            None => false,
        }
    }
}
