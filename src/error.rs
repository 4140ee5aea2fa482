//! 错误类型
//!
//! 路由失败与分配不一致都属于“停止并报告”的错误，不做重试或降级。

use crate::net::{FlowId, LinkId, NodeId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("no route for flow {flow:?}: {src:?} cannot reach {dst:?}")]
    NoRoute {
        flow: FlowId,
        src: NodeId,
        dst: NodeId,
    },

    /// 活跃流没有任何链路约束，例如 Running 的流却没有路由链路
    #[error("allocation round {round}: {active} active flows but no link constrains them")]
    UnboundedIncrement { active: usize, round: usize },

    /// 每轮至少冻结一条链路，正常输入下轮数不超过 `链路数 + 流数`；仅作簿记检查
    #[error("allocation did not converge within {bound} rounds")]
    IterationBoundExceeded { bound: usize },

    /// 链路带宽都为正时不会出现；仅作簿记检查
    #[error("flow {flow:?} is running with zero throughput after allocation")]
    StalledFlow { flow: FlowId },

    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    #[error("unknown link {0:?}")]
    UnknownLink(LinkId),

    #[error("link {from:?} -> {to:?} has invalid bandwidth {bandwidth}")]
    InvalidBandwidth {
        from: NodeId,
        to: NodeId,
        bandwidth: f64,
    },

    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    #[error("invalid workload: {0}")]
    InvalidWorkload(String),

    #[error("invalid flow {flow:?}: {reason}")]
    InvalidFlow { flow: FlowId, reason: String },

    #[error("clock stalled at t={time} after {ticks} ticks")]
    ClockStalled { time: f64, ticks: u64 },
}

pub type Result<T, E = SimError> = std::result::Result<T, E>;
