//! Pending command queue

use std::collections::VecDeque;

use puppet_core::Command;

/// Bounded FIFO of commands waiting behind the current execution.
///
/// When full, the newest arrival is shed and counted.
#[derive(Debug)]
pub struct CommandQueue {
    items: VecDeque<Command>,
    capacity: usize,
    shed: u64,
}

impl CommandQueue {
    pub fn new(capacity: usize) -> Self {
        CommandQueue {
            items: VecDeque::new(),
            capacity,
            shed: 0,
        }
    }

    /// Append `command`. Returns false if it was shed.
    pub fn push(&mut self, command: Command) -> bool {
        if self.items.len() >= self.capacity {
            self.shed += 1;
            tracing::warn!(
                capacity = self.capacity,
                shed = self.shed,
                "command queue full, dropping newest command"
            );
            return false;
        }
        self.items.push_back(command);
        true
    }

    pub fn pop(&mut self) -> Option<Command> {
        self.items.pop_front()
    }

    /// Drop everything; returns how many were pending
    pub fn clear(&mut self) -> usize {
        let n = self.items.len();
        self.items.clear();
        n
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Commands dropped because the queue was full
    pub fn shed_count(&self) -> u64 {
        self.shed
    }
}
