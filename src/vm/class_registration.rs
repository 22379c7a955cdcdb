//! Built-in class registration and load-time class assembly checks.

use std::collections::HashMap;
use std::sync::Arc;

use crate::vm::class::ClassEntry;
use crate::vm::error::VmError;

/// Register the classes every VM starts with. `stdClass` is the target
/// of property-write auto-vivification.
pub fn register_builtin_classes(classes: &mut HashMap<String, Arc<ClassEntry>>) {
    let std_class = ClassEntry::new("stdClass");
    classes.insert(std_class.name.clone(), Arc::new(std_class));
}

/// Walk the parent chain starting at `name` (exclusive of `entry`).
fn ancestors<'a>(
    classes: &'a HashMap<String, Arc<ClassEntry>>,
    mut name: Option<String>,
) -> Vec<&'a Arc<ClassEntry>> {
    let mut chain = Vec::new();
    while let Some(current) = name {
        match classes.get(&current) {
            Some(class) => {
                name = class.parent.clone();
                chain.push(class);
            }
            None => break,
        }
    }
    chain
}

/// Collect the interface names a class transitively implements,
/// including interfaces declared by ancestors and interface parents.
fn collect_interfaces(
    classes: &HashMap<String, Arc<ClassEntry>>,
    entry: &ClassEntry,
) -> Vec<String> {
    let mut found = Vec::new();
    let mut queue: Vec<String> = entry.interfaces.clone();
    for ancestor in ancestors(classes, entry.parent.clone()) {
        queue.extend(ancestor.interfaces.iter().cloned());
    }
    while let Some(name) = queue.pop() {
        if found.iter().any(|f: &String| f.eq_ignore_ascii_case(&name)) {
            continue;
        }
        if let Some(iface) = classes.get(&name) {
            // An interface extends through the same fields a class does.
            queue.extend(iface.interfaces.iter().cloned());
            if let Some(parent) = &iface.parent {
                queue.push(parent.clone());
            }
        }
        found.push(name);
    }
    found
}

/// Validate a class entry against the already-registered registry.
/// Runs at registration time, before the entry becomes visible.
pub fn validate_class(
    classes: &HashMap<String, Arc<ClassEntry>>,
    entry: &ClassEntry,
) -> Result<(), VmError> {
    if let Some(parent_name) = &entry.parent {
        let parent = classes
            .get(parent_name)
            .ok_or_else(|| VmError::UndefinedClass(parent_name.clone()))?;
        if parent.is_final {
            return Err(VmError::CannotExtendFinal {
                child: entry.name.clone(),
                parent: parent_name.clone(),
            });
        }
    }

    for method_name in entry.methods.keys() {
        for ancestor in ancestors(classes, entry.parent.clone()) {
            if let Some(inherited) = ancestor.get_method(method_name) {
                if inherited.is_final {
                    return Err(VmError::CannotOverrideFinal {
                        class: entry.name.clone(),
                        method: method_name.clone(),
                    });
                }
            }
        }
    }

    if !entry.is_abstract && !entry.is_interface {
        let chain_has_method = |name: &str| {
            entry.get_method(name).map(|m| !m.is_abstract).unwrap_or(false)
                || ancestors(classes, entry.parent.clone())
                    .iter()
                    .any(|a| a.get_method(name).map(|m| !m.is_abstract).unwrap_or(false))
        };
        for iface_name in collect_interfaces(classes, entry) {
            if let Some(iface) = classes.get(&iface_name) {
                for method_name in iface.methods.keys() {
                    if !chain_has_method(method_name) {
                        return Err(VmError::InterfaceMethodMissing {
                            class: entry.name.clone(),
                            interface: iface_name.clone(),
                            method: method_name.clone(),
                        });
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vm::class::{MethodDef, Visibility};
    use crate::vm::opcode::CompiledFunction;

    fn registry() -> HashMap<String, Arc<ClassEntry>> {
        let mut classes = HashMap::new();
        register_builtin_classes(&mut classes);
        classes
    }

    fn insert(classes: &mut HashMap<String, Arc<ClassEntry>>, entry: ClassEntry) {
        classes.insert(entry.name.clone(), Arc::new(entry));
    }

    #[test]
    fn extending_a_final_class_is_rejected() {
        let mut classes = registry();
        let mut base = ClassEntry::new("Sealed");
        base.is_final = true;
        insert(&mut classes, base);

        let mut child = ClassEntry::new("Child");
        child.parent = Some("Sealed".to_string());
        assert_eq!(
            validate_class(&classes, &child).unwrap_err(),
            VmError::CannotExtendFinal {
                child: "Child".to_string(),
                parent: "Sealed".to_string(),
            }
        );
    }

    #[test]
    fn overriding_a_final_method_is_rejected() {
        let mut classes = registry();
        let mut base = ClassEntry::new("Base");
        let mut locked = MethodDef::new("locked", CompiledFunction::new("Base::locked"));
        locked.is_final = true;
        base.add_method(locked);
        insert(&mut classes, base);

        let mut child = ClassEntry::new("Child");
        child.parent = Some("Base".to_string());
        child.add_method(MethodDef::new("locked", CompiledFunction::new("Child::locked")));
        assert!(matches!(
            validate_class(&classes, &child).unwrap_err(),
            VmError::CannotOverrideFinal { .. }
        ));
    }

    #[test]
    fn missing_interface_method_is_rejected() {
        let mut classes = registry();
        let mut iface = ClassEntry::interface("Shape");
        iface.add_method(MethodDef::abstract_signature("area", 0));
        insert(&mut classes, iface);

        let mut class = ClassEntry::new("Circle");
        class.interfaces.push("Shape".to_string());
        assert!(matches!(
            validate_class(&classes, &class).unwrap_err(),
            VmError::InterfaceMethodMissing { .. }
        ));

        class.add_method(MethodDef::new("area", CompiledFunction::new("Circle::area")));
        assert!(validate_class(&classes, &class).is_ok());
    }

    #[test]
    fn interface_methods_via_parent_chain_count() {
        let mut classes = registry();
        let mut iface = ClassEntry::interface("Shape");
        iface.add_method(MethodDef::abstract_signature("area", 0));
        insert(&mut classes, iface);

        let mut parent = ClassEntry::new("Base");
        let mut area = MethodDef::new("area", CompiledFunction::new("Base::area"));
        area.visibility = Visibility::Public;
        parent.add_method(area);
        insert(&mut classes, parent);

        let mut child = ClassEntry::new("Child");
        child.parent = Some("Base".to_string());
        child.interfaces.push("Shape".to_string());
        assert!(validate_class(&classes, &child).is_ok());
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let classes = registry();
        let mut child = ClassEntry::new("Orphan");
        child.parent = Some("Missing".to_string());
        assert_eq!(
            validate_class(&classes, &child).unwrap_err(),
            VmError::UndefinedClass("Missing".to_string())
        );
    }
}
