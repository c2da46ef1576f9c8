use serde::{Deserialize, Serialize};

/// Read-path counters for one reader instance.
///
/// Hits and misses are recorded per cache; a miss always implies one
/// stream read. Evictions count entries displaced by the LRU policy.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ReaderMetrics {
    pub block_hits: u64,
    pub block_misses: u64,
    pub shape_hits: u64,
    pub shape_misses: u64,
    pub region_hits: u64,
    pub region_misses: u64,
    pub evictions: u64,
}

impl ReaderMetrics {
    pub fn block_hit_rate(&self) -> f64 {
        hit_rate(self.block_hits, self.block_misses)
    }

    pub fn shape_hit_rate(&self) -> f64 {
        hit_rate(self.shape_hits, self.shape_misses)
    }

    pub fn region_hit_rate(&self) -> f64 {
        hit_rate(self.region_hits, self.region_misses)
    }

    /// Stream reads performed so far (one per cache miss).
    pub fn stream_reads(&self) -> u64 {
        self.block_misses + self.shape_misses + self.region_misses
    }
}

fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}
