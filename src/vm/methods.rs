//! Method resolution and class hierarchy walking.

use std::sync::Arc;

use crate::vm::class::{MagicMethod, MethodDef};
use crate::vm::error::VmError;
use crate::vm::Vm;

impl Vm {
    /// Look a method up through the inheritance chain. Returns the
    /// definition together with the class that declared it (the lexical
    /// scope a frame running it gets).
    pub(crate) fn find_method_in_chain(
        &self,
        class_name: &str,
        method_name: &str,
    ) -> Option<(Arc<MethodDef>, String)> {
        let mut current = Some(class_name.to_string());
        while let Some(name) = current {
            match self.find_class(&name) {
                Some(class) => {
                    if let Some(def) = class.get_method(method_name) {
                        return Some((def.clone(), class.name.clone()));
                    }
                    current = class.parent.clone();
                }
                None => break,
            }
        }
        None
    }

    /// Look a magic method up through the inheritance chain via the
    /// per-class magic tables.
    pub(crate) fn find_magic_in_chain(
        &self,
        class_name: &str,
        magic: MagicMethod,
    ) -> Option<(Arc<MethodDef>, String)> {
        let mut current = Some(class_name.to_string());
        while let Some(name) = current {
            match self.find_class(&name) {
                Some(class) => {
                    if let Some(def) = class.magic.get_entry(magic) {
                        return Some((def.clone(), class.name.clone()));
                    }
                    current = class.parent.clone();
                }
                None => break,
            }
        }
        None
    }

    /// Resolve a class operand for a static call: `self` is the current
    /// (lexical) class, `parent` its parent, `static` the called class
    /// (late static binding). Anything else names a class literally.
    pub(crate) fn resolve_class_name(&self, name: &str) -> Result<String, VmError> {
        let frame = self.current_frame();
        match name.to_ascii_lowercase().as_str() {
            "self" => frame
                .current_class
                .clone()
                .ok_or_else(|| VmError::UndefinedClass("self".to_string())),
            "parent" => {
                let current = frame
                    .current_class
                    .clone()
                    .ok_or_else(|| VmError::UndefinedClass("parent".to_string()))?;
                self.find_class(&current)
                    .and_then(|class| class.parent.clone())
                    .ok_or_else(|| VmError::UndefinedClass("parent".to_string()))
            }
            "static" => frame
                .called_class
                .clone()
                .or_else(|| frame.current_class.clone())
                .ok_or_else(|| VmError::UndefinedClass("static".to_string())),
            _ => Ok(name.to_string()),
        }
    }
}
