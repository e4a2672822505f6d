#[derive(Clone, Debug)]
pub struct ReadbackConfig {
    /// Number of resolved textures kept in the result cache. `0` disables caching; concurrent
    /// identical requests are still coalesced.
    pub cache_capacity: usize,
    /// Upper bound on the scratch allocation for a single readback.
    pub max_image_bytes: u64,
}

impl Default for ReadbackConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 64,
            max_image_bytes: 256 * 1024 * 1024,
        }
    }
}
