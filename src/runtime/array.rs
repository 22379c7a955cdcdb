//! Ordered array container.
//!
//! An insertion-ordered map from normalized keys to values. The next
//! auto-index counter is monotonic: it only moves forward, even when the
//! highest integer key is unset afterwards.

use crate::runtime::{ArrayKey, Value};

#[derive(Debug, Clone, Default)]
pub struct PhpArray {
    entries: Vec<(ArrayKey, Value)>,
    next_index: i64,
}

impl PhpArray {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_index: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            next_index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &ArrayKey) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    pub fn get(&self, key: &ArrayKey) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &ArrayKey) -> Option<&mut Value> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn has_key(&self, key: &ArrayKey) -> bool {
        self.position(key).is_some()
    }

    /// Insert or overwrite. Overwriting keeps the entry's position;
    /// inserting appends. Integer keys advance the auto-index counter.
    pub fn set(&mut self, key: ArrayKey, value: Value) {
        if let ArrayKey::Integer(n) = key {
            self.next_index = self.next_index.max(n.saturating_add(1));
        }
        match self.position(&key) {
            Some(pos) => self.entries[pos].1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Append with an auto-generated integer key. Returns the key used.
    pub fn append(&mut self, value: Value) -> i64 {
        let key = self.next_index;
        self.set(ArrayKey::Integer(key), value);
        key
    }

    pub fn unset(&mut self, key: &ArrayKey) -> bool {
        match self.position(key) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Loose-equality membership test.
    pub fn contains(&self, value: &Value) -> bool {
        self.entries.iter().any(|(_, v)| v.loose_equals(value))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (ArrayKey, Value)> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, (ArrayKey, Value)> {
        self.entries.iter_mut()
    }

    /// Visit entries in insertion order until the callback returns false.
    pub fn each(&self, mut callback: impl FnMut(&ArrayKey, &Value) -> bool) {
        for (k, v) in &self.entries {
            if !callback(k, v) {
                break;
            }
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &ArrayKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    #[test]
    fn set_then_get() {
        let mut arr = PhpArray::new();
        arr.set(ArrayKey::String("name".into()), Value::String("a".into()));
        arr.set(ArrayKey::Integer(3), Value::Integer(30));
        assert_eq!(
            arr.get(&ArrayKey::String("name".into())),
            Some(&Value::String("a".into()))
        );
        assert_eq!(arr.get(&ArrayKey::Integer(3)), Some(&Value::Integer(30)));
        assert_eq!(arr.get(&ArrayKey::Integer(9)), None);
    }

    #[test]
    fn iteration_order_is_insertion_order() {
        let mut arr = PhpArray::new();
        arr.set(ArrayKey::String("b".into()), Value::Integer(1));
        arr.set(ArrayKey::Integer(0), Value::Integer(2));
        arr.set(ArrayKey::String("a".into()), Value::Integer(3));
        // Overwriting keeps the original position.
        arr.set(ArrayKey::String("b".into()), Value::Integer(9));
        let keys: Vec<String> = arr.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["b", "0", "a"]);
        assert_eq!(
            arr.get(&ArrayKey::String("b".into())),
            Some(&Value::Integer(9))
        );
    }

    #[test]
    fn append_uses_monotonic_auto_index() {
        let mut arr = PhpArray::new();
        assert_eq!(arr.append(Value::Integer(10)), 0);
        arr.set(ArrayKey::Integer(7), Value::Integer(11));
        assert_eq!(arr.append(Value::Integer(12)), 8);
        arr.unset(&ArrayKey::Integer(8));
        // The counter does not rewind after unset.
        assert_eq!(arr.append(Value::Integer(13)), 9);
    }

    #[test]
    fn negative_keys_do_not_drive_the_counter_backwards() {
        let mut arr = PhpArray::new();
        arr.set(ArrayKey::Integer(-5), Value::Integer(1));
        assert_eq!(arr.append(Value::Integer(2)), 0);
    }

    #[test]
    fn unset_and_membership() {
        let mut arr = PhpArray::new();
        arr.append(Value::Integer(7));
        arr.append(Value::String("10".into()));
        assert!(arr.contains(&Value::Integer(7)));
        // Loose membership: "10" == 10.
        assert!(arr.contains(&Value::Integer(10)));
        assert!(arr.unset(&ArrayKey::Integer(0)));
        assert!(!arr.unset(&ArrayKey::Integer(0)));
        assert!(!arr.contains(&Value::Integer(7)));
    }

    #[test]
    fn each_walks_in_order_and_honors_early_stop() {
        let mut arr = PhpArray::new();
        arr.append(Value::Integer(1));
        arr.append(Value::Integer(2));
        arr.append(Value::Integer(3));
        let mut visited = Vec::new();
        arr.each(|key, value| {
            visited.push((key.to_string(), value.to_int()));
            value.to_int() < 2
        });
        assert_eq!(visited, vec![("0".to_string(), 1), ("1".to_string(), 2)]);
    }

    #[test]
    fn copy_on_write_diverges_shared_handles() {
        let mut a = Rc::new(PhpArray::new());
        Rc::make_mut(&mut a).append(Value::Integer(1));
        let mut b = a.clone();
        Rc::make_mut(&mut b).append(Value::Integer(2));
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 2);
    }
}
