use std::sync::Arc;

use crate::vm::class::{ClassEntry, Visibility};

/// A single property slot on an object instance.
#[derive(Debug, Clone)]
pub struct PropertySlot {
    pub value: super::Value,
    pub visibility: Visibility,
    pub readonly: bool,
}

impl PropertySlot {
    pub fn public(value: super::Value) -> Self {
        Self {
            value,
            visibility: Visibility::Public,
            readonly: false,
        }
    }
}

/// A live object. Held behind `Rc<RefCell<..>>` so that every Value
/// pointing at it observes mutations (reference semantics).
#[derive(Debug, Clone)]
pub struct ObjectInstance {
    pub class_name: String,
    pub class: Arc<ClassEntry>,
    /// Unique for the lifetime of the VM that created the object.
    pub id: u64,
    pub destroyed: bool,
    /// Declaration order is preserved and observable in dumps.
    pub properties: Vec<(String, PropertySlot)>,
}

impl ObjectInstance {
    pub fn new(class: Arc<ClassEntry>, id: u64) -> Self {
        Self {
            class_name: class.name.clone(),
            class,
            id,
            destroyed: false,
            properties: Vec::new(),
        }
    }

    pub fn get_property(&self, name: &str) -> Option<&PropertySlot> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, slot)| slot)
    }

    pub fn get_property_mut(&mut self, name: &str) -> Option<&mut PropertySlot> {
        self.properties
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, slot)| slot)
    }

    /// Replaces an existing slot in place (keeping its position) or
    /// appends a new one.
    pub fn set_property(&mut self, name: &str, slot: PropertySlot) {
        match self.get_property_mut(name) {
            Some(existing) => *existing = slot,
            None => self.properties.push((name.to_string(), slot)),
        }
    }

    pub fn remove_property(&mut self, name: &str) -> bool {
        match self.properties.iter().position(|(n, _)| n == name) {
            Some(pos) => {
                self.properties.remove(pos);
                true
            }
            None => false,
        }
    }
}

/// External resource handle. The issuing subsystem manages the lifecycle;
/// the VM only tracks identity and the open/closed flag.
#[derive(Debug, Clone)]
pub struct ResourceHandle {
    pub id: u64,
    pub kind: String,
    pub open: bool,
}
