use crate::entity::EntityId;

struct ArrayEntry<T> {
    value: T,
    generation: u64,
}

/// One optional component per entity slot, tagged with the owner's generation.
pub struct ComponentSet<T> {
    entries: Vec<Option<ArrayEntry<T>>>,
}

impl<T> ComponentSet<T> {
    pub fn new(max_size: usize) -> Self {
        let mut entries = Vec::new();
        entries.resize_with(max_size, Default::default);
        ComponentSet {
            entries
        }
    }

    // Overwrites whatever an older generation left in the slot.
    pub fn set(&mut self, entity: &EntityId, value: T) {
        debug_assert!(entity.index < self.entries.len());

        self.entries[entity.index] = Some(ArrayEntry {
            value,
            generation: entity.generation,
        });
    }

    pub fn remove(&mut self, entity: &EntityId) -> Option<T> {
        if !self.contains(entity) {
            return None;
        }

        self.entries[entity.index].take().map(|entry| entry.value)
    }

    pub fn get(&self, entity: &EntityId) -> Option<&T> {
        match self.entries.get(entity.index) {
            Some(Some(entry)) if entry.generation == entity.generation => Some(&entry.value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, entity: &EntityId) -> Option<&mut T> {
        match self.entries.get_mut(entity.index) {
            Some(Some(entry)) if entry.generation == entity.generation => Some(&mut entry.value),
            _ => None,
        }
    }

    pub fn contains(&self, entity: &EntityId) -> bool {
        self.get(entity).is_some()
    }
}
