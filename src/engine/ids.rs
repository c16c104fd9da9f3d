//issues ids for newly opened lots; owned by one engine, starts at 0
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        IdAllocator { next: 0 }
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    //number of ids handed out so far
    pub fn issued(&self) -> u64 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_increase_from_zero() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.next_id(), 0);
        assert_eq!(ids.next_id(), 1);
        assert_eq!(ids.next_id(), 2);
        assert_eq!(ids.issued(), 3);
    }

    #[test]
    fn test_allocators_are_independent() {
        let mut first = IdAllocator::new();
        let mut second = IdAllocator::default();
        first.next_id();
        first.next_id();
        assert_eq!(second.next_id(), 0);
    }
}
