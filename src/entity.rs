use anyhow::{anyhow, bail};
use std::collections::HashSet;

#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct EntityId {
    pub index: usize,
    pub generation: u64,
}

pub struct EntityAllocator {
    generations: Vec<u64>,
    free: Vec<usize>,
    pub max_size: usize,
    pub active_entities: HashSet<EntityId>,
}

impl EntityAllocator {
    pub fn new(max_size: usize) -> Self {
        EntityAllocator {
            generations: Vec::new(),
            free: Vec::new(),
            max_size,
            active_entities: HashSet::new(),
        }
    }

    pub fn allocate(&mut self) -> anyhow::Result<EntityId> {
        let entity = match self.free.pop() {
            Some(index) => {
                self.generations[index] += 1;
                EntityId { index, generation: self.generations[index] }
            }
            None => {
                if self.generations.len() >= self.max_size {
                    bail!("Exceeded the maximum of {} entities", self.max_size);
                }
                self.generations.push(0);
                EntityId { index: self.generations.len() - 1, generation: 0 }
            }
        };

        self.active_entities.insert(entity);
        Ok(entity)
    }

    pub fn deallocate(&mut self, entity: &EntityId) -> anyhow::Result<()> {
        if !self.active_entities.remove(entity) {
            return Err(anyhow!("Attempt to free an inactive entity {:?}", entity));
        }

        self.free.push(entity.index);
        Ok(())
    }

    pub fn is_alive(&self, entity: &EntityId) -> bool {
        self.active_entities.contains(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::EntityAllocator;
    use super::EntityId;

    #[test]
    fn consecutive_allocates_increments_index_with_generation_zero() {
        let mut allocator = EntityAllocator::new(5);
        let first = allocator.allocate().unwrap();
        let second = allocator.allocate().unwrap();
        assert_eq!(first, EntityId { index: 0, generation: 0 });
        assert_eq!(second, EntityId { index: 1, generation: 0 });
        assert!(allocator.is_alive(&first));
    }

    #[test]
    fn dealloc_without_alloc_fails() {
        let mut allocator = EntityAllocator::new(5);
        assert!(allocator.deallocate(&EntityId { index: 0, generation: 0 }).is_err());
    }

    #[test]
    fn alloc_dealloc_alloc_reuses_slot_with_next_generation() {
        let mut allocator = EntityAllocator::new(5);
        let entity = allocator.allocate().unwrap();
        allocator.deallocate(&entity).unwrap();
        assert!(!allocator.is_alive(&entity));
        let entity = allocator.allocate().unwrap();
        assert_eq!(entity, EntityId { index: 0, generation: 1 });
    }

    #[test]
    fn alloc_more_than_max_size_fails() {
        let mut allocator = EntityAllocator::new(1);
        allocator.allocate().unwrap();
        assert!(allocator.allocate().is_err());
    }
}
