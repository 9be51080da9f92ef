//! Bounded screen history

/// Number of screens remembered for `go_back`
pub const STACK_DEPTH: usize = 4;

/// Fixed-depth LIFO of previously active screens
///
/// Pushing onto a full stack silently drops the oldest entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScreenStack<S> {
    entries: [Option<S>; STACK_DEPTH],
}

impl<S: Copy> Default for ScreenStack<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Copy> ScreenStack<S> {
    pub const fn new() -> Self {
        Self {
            entries: [None; STACK_DEPTH],
        }
    }

    /// Push `screen` on top, dropping the bottom entry if full
    pub fn push(&mut self, screen: S) {
        self.entries.copy_within(0..STACK_DEPTH - 1, 1);
        self.entries[0] = Some(screen);
    }

    /// Remove and return the top entry
    pub fn pop(&mut self) -> Option<S> {
        let top = self.entries[0];
        self.forget();
        top
    }

    /// Discard the top entry
    pub fn forget(&mut self) {
        self.entries.copy_within(1..STACK_DEPTH, 0);
        self.entries[STACK_DEPTH - 1] = None;
    }

    pub fn peek(&self) -> Option<S> {
        self.entries[0]
    }

    pub fn len(&self) -> usize {
        self.entries.iter().take_while(|e| e.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries[0].is_none()
    }

    /// Entries from top to bottom
    pub fn iter(&self) -> impl Iterator<Item = S> + '_ {
        self.entries.iter().map_while(|e| *e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_lifo() {
        let mut stack = ScreenStack::new();
        stack.push(1u8);
        stack.push(2);
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.pop(), Some(2));
        assert_eq!(stack.pop(), Some(1));
        assert_eq!(stack.pop(), None);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_overflow_drops_oldest() {
        let mut stack = ScreenStack::new();
        for screen in 1u8..=6 {
            stack.push(screen);
        }
        assert_eq!(stack.len(), STACK_DEPTH);
        let remaining: heapless::Vec<u8, STACK_DEPTH> = stack.iter().collect();
        assert_eq!(remaining.as_slice(), &[6, 5, 4, 3]);
    }

    #[test]
    fn test_forget_discards_top() {
        let mut stack = ScreenStack::new();
        stack.push(1u8);
        stack.push(2);
        stack.forget();
        assert_eq!(stack.peek(), Some(1));
    }
}
