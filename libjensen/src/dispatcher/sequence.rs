// libjensen/src/dispatcher/sequence.rs

//! Request sequence ids.

/// Per-connection request sequence ids. Ids increase by one and wrap from
/// `u32::MAX` back to 1; 0 is never handed out.
#[derive(Debug, Default, Clone)]
pub struct SequenceCounter {
    last: u32,
}

impl SequenceCounter {
    /// Counter whose first id is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next id.
    pub fn next(&mut self) -> u32 {
        self.last = match self.last.checked_add(1) {
            Some(n) => n,
            None => 1,
        };
        self.last
    }

    /// Pretend `last` was the most recent id. Used to exercise wraparound.
    pub fn force(&mut self, last: u32) {
        self.last = last;
    }
}
