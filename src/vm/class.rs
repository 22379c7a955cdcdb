//! Class, interface, and method definitions.
//!
//! Interfaces reuse the same record with the interface flag set and
//! abstract method definitions as their signatures.

use std::collections::HashMap;
use std::sync::Arc;

use crate::runtime::Value;
use crate::vm::opcode::CompiledFunction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

/// A method definition. The body carries the parameter count, local
/// slot count, and instruction list.
#[derive(Debug, Clone)]
pub struct MethodDef {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
    pub body: Arc<CompiledFunction>,
}

impl MethodDef {
    pub fn new(name: impl Into<String>, body: CompiledFunction) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            is_static: false,
            is_final: false,
            is_abstract: false,
            body: Arc::new(body),
        }
    }

    /// Abstract signature, as used by interfaces.
    pub fn abstract_signature(name: impl Into<String>, num_params: u8) -> Self {
        let name = name.into();
        let mut body = CompiledFunction::new(name.clone());
        body.num_params = num_params;
        Self {
            name,
            visibility: Visibility::Public,
            is_static: false,
            is_final: false,
            is_abstract: true,
            body: Arc::new(body),
        }
    }
}

/// A declared property.
#[derive(Debug, Clone)]
pub struct PropertyDef {
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub type_hint: Option<String>,
    pub default: Value,
    pub readonly: bool,
    /// Accessor hook method names, when the property declares them.
    pub get_hook: Option<String>,
    pub set_hook: Option<String>,
}

impl PropertyDef {
    pub fn new(name: impl Into<String>, default: Value) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            is_static: false,
            type_hint: None,
            default,
            readonly: false,
            get_hook: None,
            set_hook: None,
        }
    }
}

/// The fixed set of specially-named methods the VM consults when a
/// primary property or method lookup fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagicMethod {
    Construct,
    Get,
    Set,
    Isset,
    Unset,
    Call,
    CallStatic,
    Clone,
}

impl MagicMethod {
    pub fn name(&self) -> &'static str {
        match self {
            MagicMethod::Construct => "__construct",
            MagicMethod::Get => "__get",
            MagicMethod::Set => "__set",
            MagicMethod::Isset => "__isset",
            MagicMethod::Unset => "__unset",
            MagicMethod::Call => "__call",
            MagicMethod::CallStatic => "__callStatic",
            MagicMethod::Clone => "__clone",
        }
    }

    fn from_name(name: &str) -> Option<MagicMethod> {
        let all = [
            MagicMethod::Construct,
            MagicMethod::Get,
            MagicMethod::Set,
            MagicMethod::Isset,
            MagicMethod::Unset,
            MagicMethod::Call,
            MagicMethod::CallStatic,
            MagicMethod::Clone,
        ];
        all.into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(name))
    }
}

/// Per-class magic method table, populated as methods are added.
#[derive(Debug, Clone, Default)]
pub struct MagicTable {
    pub construct: Option<Arc<MethodDef>>,
    pub get: Option<Arc<MethodDef>>,
    pub set: Option<Arc<MethodDef>>,
    pub isset: Option<Arc<MethodDef>>,
    pub unset: Option<Arc<MethodDef>>,
    pub call: Option<Arc<MethodDef>>,
    pub call_static: Option<Arc<MethodDef>>,
    pub clone: Option<Arc<MethodDef>>,
}

impl MagicTable {
    pub fn get_entry(&self, magic: MagicMethod) -> Option<&Arc<MethodDef>> {
        match magic {
            MagicMethod::Construct => self.construct.as_ref(),
            MagicMethod::Get => self.get.as_ref(),
            MagicMethod::Set => self.set.as_ref(),
            MagicMethod::Isset => self.isset.as_ref(),
            MagicMethod::Unset => self.unset.as_ref(),
            MagicMethod::Call => self.call.as_ref(),
            MagicMethod::CallStatic => self.call_static.as_ref(),
            MagicMethod::Clone => self.clone.as_ref(),
        }
    }

    fn set_entry(&mut self, magic: MagicMethod, def: Arc<MethodDef>) {
        let slot = match magic {
            MagicMethod::Construct => &mut self.construct,
            MagicMethod::Get => &mut self.get,
            MagicMethod::Set => &mut self.set,
            MagicMethod::Isset => &mut self.isset,
            MagicMethod::Unset => &mut self.unset,
            MagicMethod::Call => &mut self.call,
            MagicMethod::CallStatic => &mut self.call_static,
            MagicMethod::Clone => &mut self.clone,
        };
        *slot = Some(def);
    }
}

/// A class or interface definition.
#[derive(Debug, Clone, Default)]
pub struct ClassEntry {
    pub name: String,
    pub parent: Option<String>,
    pub interfaces: Vec<String>,
    pub is_abstract: bool,
    pub is_final: bool,
    pub is_interface: bool,
    pub constants: HashMap<String, Value>,
    /// Declaration order is preserved; instances inherit it.
    pub properties: Vec<PropertyDef>,
    pub methods: HashMap<String, Arc<MethodDef>>,
    pub magic: MagicTable,
}

impl ClassEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_interface: true,
            ..Default::default()
        }
    }

    pub fn add_method(&mut self, def: MethodDef) {
        let def = Arc::new(def);
        if let Some(magic) = MagicMethod::from_name(&def.name) {
            self.magic.set_entry(magic, def.clone());
        }
        self.methods.insert(def.name.clone(), def);
    }

    pub fn add_property(&mut self, def: PropertyDef) {
        self.properties.push(def);
    }

    /// Method lookup. Magic names resolve case-insensitively.
    pub fn get_method(&self, name: &str) -> Option<&Arc<MethodDef>> {
        self.methods.get(name).or_else(|| {
            if name.starts_with("__") {
                self.methods
                    .iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(name))
                    .map(|(_, v)| v)
            } else {
                None
            }
        })
    }

    pub fn get_property_def(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.iter().find(|p| p.name == name)
    }
}
