//! Pool configuration parameters.

use crate::error::PoolError;

/// Configuration for a memory pool.
///
/// Controls page sizing and the growth limit per record type. Validated
/// by [`PoolConfig::validate`]; all values are immutable once a pool is
/// created from them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Number of record slots per page.
    ///
    /// Default: 1024. Must be a power of two in `1..=65536` so a slot
    /// index always fits the id's slot field.
    pub page_slots: u32,

    /// Maximum number of pages per record type in one pool.
    ///
    /// Default: 65536, the full page field of an id. At the default page
    /// size that is 64M records of one type per scope.
    pub max_pages: u32,
}

impl PoolConfig {
    /// Default number of slots per page.
    pub const DEFAULT_PAGE_SLOTS: u32 = 1024;

    /// Default page limit per record type.
    pub const DEFAULT_MAX_PAGES: u32 = 1 << 16;

    /// Largest page size an id can address.
    pub const MAX_PAGE_SLOTS: u32 = 1 << 16;

    /// Create a config with the given page size and the default page limit.
    pub fn new(page_slots: u32) -> Self {
        Self {
            page_slots,
            max_pages: Self::DEFAULT_MAX_PAGES,
        }
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.page_slots == 0
            || !self.page_slots.is_power_of_two()
            || self.page_slots > Self::MAX_PAGE_SLOTS
        {
            return Err(PoolError::InvalidConfig {
                reason: format!(
                    "page_slots must be a power of two in 1..={}, got {}",
                    Self::MAX_PAGE_SLOTS,
                    self.page_slots
                ),
            });
        }
        if self.max_pages == 0 || self.max_pages > Self::DEFAULT_MAX_PAGES {
            return Err(PoolError::InvalidConfig {
                reason: format!(
                    "max_pages must be in 1..={}, got {}",
                    Self::DEFAULT_MAX_PAGES,
                    self.max_pages
                ),
            });
        }
        Ok(())
    }

    /// Maximum number of records of one type a pool can hold.
    pub fn capacity_per_type(&self) -> u64 {
        u64::from(self.page_slots) * u64::from(self.max_pages)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PAGE_SLOTS)
    }
}
