//! On-disk layout stages applied to freshly updated mods.

pub mod keys;
pub mod link;
pub mod normalize;

pub use keys::{KeyOutcome, KeyReport, propagate_keys};
pub use link::{LinkReport, LinkStatus, link_mods};
pub use normalize::{NormalizeReport, normalize_mods, normalize_tree};
