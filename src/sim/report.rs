//! 仿真结果记录
//!
//! 全部可序列化，CLI 用 serde_json 输出，测试直接断言字段。

use serde::{Deserialize, Serialize};

use crate::net::{FlowId, NodeId};

/// 一个 tick 的记录（在带宽分配之后、推进时间之前采样）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    pub index: u64,
    pub time: f64,
    pub running: usize,
    pub completed: usize,
    /// 距下一个事件的时长；`None` 表示仿真在此结束
    pub horizon: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowCompletion {
    pub flow: FlowId,
    pub start_time: f64,
    pub completion_time: f64,
}

impl FlowCompletion {
    /// 流完成时间（FCT）
    pub fn duration(&self) -> f64 {
        self.completion_time - self.start_time
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingFailure {
    pub flow: FlowId,
    pub src: NodeId,
    pub dst: NodeId,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimReport {
    pub final_time: f64,
    pub tick_count: u64,
    #[serde(default)]
    pub ticks: Vec<TickRecord>,
    pub completions: Vec<FlowCompletion>,
    #[serde(default)]
    pub routing_failures: Vec<RoutingFailure>,
}

impl SimReport {
    pub fn completion_of(&self, flow: FlowId) -> Option<&FlowCompletion> {
        self.completions.iter().find(|c| c.flow == flow)
    }

    pub fn is_clean(&self) -> bool {
        self.routing_failures.is_empty()
    }
}
