pub mod duplicates;
pub mod groups;
pub mod same_name;

pub use duplicates::find_duplicate_groups;
pub use groups::{group_by_key, order_group, order_groups, EquivalenceGroup, Order};
pub use same_name::find_same_name_groups;
