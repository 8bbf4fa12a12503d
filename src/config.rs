/// Construction-time options for a [`SplitMap`](crate::SplitMap).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapConfig {
    /// Overwrite the value of an existing key instead of storing a second
    /// entry (default: true)
    pub unique_keys: bool,

    /// Number of entries to reserve up front in both arrays (default: 0)
    pub initial_capacity: usize,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            unique_keys: true,
            initial_capacity: 0,
        }
    }
}

impl MapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duplicate key policy
    pub fn with_unique_keys(mut self, unique: bool) -> Self {
        self.unique_keys = unique;
        self
    }

    /// Set the number of entries reserved at construction
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}
