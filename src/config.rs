/// Cache sizing for one reader instance, in entries per cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    pub block_cache_size: usize,
    pub shape_cache_size: usize,
    pub region_cache_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            block_cache_size: 5000,
            shape_cache_size: 1000,
            region_cache_size: 1000,
        }
    }
}

impl ReaderConfig {
    /// A small-footprint preset for memory-constrained hosts.
    pub fn compact() -> Self {
        Self {
            block_cache_size: 500,
            shape_cache_size: 100,
            region_cache_size: 100,
        }
    }
}
