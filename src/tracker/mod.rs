//! Bookkeeping utilities used by scene maintenance.
//!
//! - [`SortedIds`] - Lazily sorted multiset of prim paths
//! - [`dependency_sort`] - Topological ordering with cycle detection
//! - [`dirty_bits`] - Locator set / bitmask translation
//! - [`PerfLog`] - Process-wide counters and cache statistics

mod sorted_ids;
mod dependency_sort;
mod perf_log;
pub mod dirty_bits;

pub use sorted_ids::SortedIds;
pub use dependency_sort::{dependency_sort, format_dependency_map, DependencyMap};
pub use perf_log::{CacheStats, PerfLog};
pub use dirty_bits::{
    register_translators_for_custom_sprim_type, rprim_dirty_bits_to_locator_set,
    rprim_locator_set_to_dirty_bits, sprim_dirty_bits_to_locator_set,
    sprim_locator_set_to_dirty_bits, DirtyBits,
};
