//! 拓扑生成
//!
//! 核心算法只需要节点与单向链路；这里提供常用的数据中心拓扑。

pub mod fat_tree;
pub mod one_big_switch;

pub use fat_tree::{FatTreeOpts, FatTreeTopology, build_fat_tree};
pub use one_big_switch::{OneBigSwitchOpts, OneBigSwitchTopology, build_one_big_switch};
