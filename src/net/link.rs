//! 链路类型
//!
//! 单向链路，只保存静态数据；每轮分配用到的临时状态在 `sim::alloc` 中。

use super::id::{LinkId, NodeId};

/// 单向网络链路
#[derive(Debug, Clone)]
pub struct Link {
    pub id: LinkId,
    pub from: NodeId,
    pub to: NodeId,
    /// 链路带宽（数据量单位 / 秒）
    pub bandwidth: f64,
}

impl Link {
    /// 创建新链路
    pub fn new(id: LinkId, from: NodeId, to: NodeId, bandwidth: f64) -> Self {
        Self {
            id,
            from,
            to,
            bandwidth,
        }
    }

    /// 链路是否连接 `from -> to`
    pub fn joins(&self, from: NodeId, to: NodeId) -> bool {
        self.from == from && self.to == to
    }
}
