//! 节点类型
//!
//! 节点的类别只在生成拓扑时有意义，路由与分配算法不关心。

use super::id::{LinkId, NodeId};
use serde::{Deserialize, Serialize};

/// 节点类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Host,
    Tor,
    Agg,
    Core,
}

impl NodeKind {
    pub fn is_switch(self) -> bool {
        !matches!(self, NodeKind::Host)
    }
}

/// 网络节点
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub name: String,
    /// 以该节点为源的链路（出边邻接表），按添加顺序排列
    pub out_links: Vec<LinkId>,
}

impl Node {
    /// 创建新节点
    pub fn new(id: NodeId, kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            out_links: Vec::new(),
        }
    }
}
