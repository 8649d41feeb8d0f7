pub mod balanced;
pub mod interval;

pub use balanced::{ALPHA, BalancedTree, NodeId, TreeValue};
pub use interval::{Event, IntervalIndex};
