//! Elastic pipeline stage.
//!
//! A skid buffer sits between a producer and a consumer and registers the
//! ready signal, so backpressure never has to ripple combinationally through
//! a chain of stages. Readiness is decided from the state committed at the
//! start of a step: a stage accepts a word only if it had room before any of
//! this step's transfers.
//!
//! With capacity 1 the stage behaves like a plain register and can only move
//! a word every other step under sustained traffic. Capacity 2 adds the skid
//! slot that keeps full throughput.

use std::collections::VecDeque;

/// A bounded, order-preserving elastic stage.
#[derive(Debug, Clone)]
pub struct SkidBuffer<T> {
    slots: VecDeque<T>,
    capacity: usize,
}

impl<T> SkidBuffer<T> {
    /// Create an empty stage. A zero capacity is rounded up to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Registered ready: there is room for one more word.
    #[inline]
    pub fn can_accept(&self) -> bool {
        self.slots.len() < self.capacity
    }

    /// Valid: a word is waiting at the output.
    #[inline]
    pub fn is_valid(&self) -> bool {
        !self.slots.is_empty()
    }

    /// The word presented at the output, if any.
    pub fn front(&self) -> Option<&T> {
        self.slots.front()
    }

    /// Store a word. Hands it back when the stage is full; a producer must
    /// only push after seeing [`Self::can_accept`].
    pub fn push(&mut self, item: T) -> Result<(), T> {
        if !self.can_accept() {
            return Err(item);
        }
        self.slots.push_back(item);
        Ok(())
    }

    /// Remove the word at the output.
    pub fn pop(&mut self) -> Option<T> {
        self.slots.pop_front()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
