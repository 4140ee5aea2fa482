//! 网络模型模块
//!
//! 此模块包含拓扑图（节点、单向链路）以及基于最短跳数的 ECMP 路由。

// 子模块声明
mod id;
mod link;
mod network;
mod node;
mod routing;

// 重新导出公共接口
pub use id::{FlowId, LinkId, NodeId};
pub use link::Link;
pub use network::Network;
pub use node::{Node, NodeKind};
pub use routing::{
    Route, ShortestPathDag, all_shortest_paths, count_shortest_paths, links_for_path, route_ecmp,
};
