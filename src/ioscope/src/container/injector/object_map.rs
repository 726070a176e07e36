use std::any::TypeId;
use std::collections::HashMap;
use std::mem;

use crate::container::{Managed, SharedManaged};
use crate::key::Key;

/// The cache of shared objects owned by one scope, grouped by target type.
#[derive(Default)]
pub struct ObjectMap {
    objects: HashMap<TypeId, Slot>,
    len: usize,
}

impl ObjectMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        key: Box<dyn Key>,
        object: Box<dyn SharedManaged>,
    ) -> Option<ObjectEntry> {
        let target = key.target_type();
        let original = if let Some(slot) = self.objects.get_mut(&target) {
            slot.insert(key, ObjectEntry(object))
        } else {
            self.objects
                .insert(target, Slot::Single(key, ObjectEntry(object)));
            None
        };

        if original.is_none() {
            self.len += 1;
        }
        original
    }

    pub fn get(&self, key: &dyn Key) -> Option<&ObjectEntry> {
        self.objects
            .get(&key.target_type())
            .and_then(|slot| slot.get(key))
    }

    pub fn len(&self) -> usize {
        self.len
    }
}

enum Slot {
    Single(Box<dyn Key>, ObjectEntry),
    Map(HashMap<Box<dyn Key>, ObjectEntry>),
}

impl Slot {
    fn insert(&mut self, key: Box<dyn Key>, entry: ObjectEntry) -> Option<ObjectEntry> {
        match self {
            Self::Single(k, e) if k == &key => Some(mem::replace(e, entry)),
            Self::Single(_, _) => {
                let Self::Single(k, e) = mem::replace(self, Self::Map(HashMap::with_capacity(2)))
                else {
                    unreachable!("`self` should match `Self::Single(_, _)`")
                };
                let Self::Map(entries) = self else {
                    unreachable!("`self` should already be assigned to `Self::Map(_)`")
                };
                entries.insert(k, e);
                entries.insert(key, entry);
                None
            }
            Self::Map(entries) => entries.insert(key, entry),
        }
    }

    fn get(&self, key: &dyn Key) -> Option<&ObjectEntry> {
        match self {
            Self::Single(k, _) if k.as_ref() != key => None,
            Self::Single(_, e) => Some(e),
            Self::Map(entries) => entries.get(key),
        }
    }
}

pub struct ObjectEntry(Box<dyn SharedManaged>);

impl ObjectEntry {
    /// Hands out another reference to the cached object.
    pub fn clone_managed(&self) -> Box<dyn Managed> {
        self.0.dyn_clone().upcast_managed()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::key;
    use crate::util::any::Downcast;

    use super::*;

    #[test]
    fn object_map_insert_succeeds() {
        let mut map = ObjectMap::new();
        let db = Arc::new(String::from("db"));
        let cache = Arc::new(String::from("cache"));

        assert!(map
            .insert(Box::new(key::named::<Arc<String>>("db")), Box::new(Arc::clone(&db)))
            .is_none());
        assert!(map
            .insert(
                Box::new(key::named::<Arc<String>>("cache")),
                Box::new(Arc::clone(&cache))
            )
            .is_none());
        assert_eq!(map.len(), 2);

        let object = map
            .get(&key::named::<Arc<String>>("db"))
            .unwrap()
            .clone_managed()
            .downcast::<Arc<String>>()
            .unwrap_or_else(|_| panic!("object should be `Arc<String>`"));
        assert!(Arc::ptr_eq(&object, &db));
        assert!(map.get(&key::named::<Arc<String>>("queue")).is_none());
    }

    #[test]
    fn object_map_insert_succeeds_when_key_is_cached() {
        let mut map = ObjectMap::new();
        let first = Arc::new(1i32);
        map.insert(Box::new(key::of::<Arc<i32>>()), Box::new(first));

        let replaced = map.insert(Box::new(key::of::<Arc<i32>>()), Box::new(Arc::new(2i32)));
        assert!(replaced.is_some());
        assert_eq!(map.len(), 1);
    }
}
