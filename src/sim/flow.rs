//! 流及其生命周期
//!
//! 状态只会单调推进：NotStarted -> Running -> Complete。

use serde::{Deserialize, Serialize};

use super::time::SimTime;
use crate::error::{Result, SimError};
use crate::net::{FlowId, LinkId, NodeId, Route};

/// 判定“已到开始时间”的容差
pub const START_EPSILON: f64 = 1e-5;
/// 判定“剩余数据已传完”的容差
pub const COMPLETE_EPSILON: f64 = 1e-5;

/// 外部提供的一条流需求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowDemand {
    pub src: NodeId,
    pub dst: NodeId,
    pub size: f64,
    #[serde(default)]
    pub start: f64,
}

impl FlowDemand {
    pub fn new(src: NodeId, dst: NodeId, size: f64, start: f64) -> Self {
        Self {
            src,
            dst,
            size,
            start,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    NotStarted,
    Running,
    Complete,
}

/// `Flow::progress` 中发生的状态迁移
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Started,
    Completed,
}

#[derive(Debug, Clone)]
pub struct Flow {
    pub id: FlowId,
    pub src: NodeId,
    pub dst: NodeId,
    pub size: f64,
    pub start: SimTime,
    state: FlowState,
    route: Option<Route>,
    routing_failed: bool,
    throughput: f64,
    remaining: f64,
    started_at: Option<SimTime>,
    completed_at: Option<SimTime>,
}

impl Flow {
    pub fn new(id: FlowId, demand: &FlowDemand) -> Result<Self> {
        if !(demand.size.is_finite() && demand.size > 0.0) {
            return Err(SimError::InvalidFlow {
                flow: id,
                reason: format!("size must be positive, got {}", demand.size),
            });
        }
        if !(demand.start.is_finite() && demand.start >= 0.0) {
            return Err(SimError::InvalidFlow {
                flow: id,
                reason: format!("start time must be non-negative, got {}", demand.start),
            });
        }
        Ok(Self {
            id,
            src: demand.src,
            dst: demand.dst,
            size: demand.size,
            start: SimTime(demand.start),
            state: FlowState::NotStarted,
            route: None,
            routing_failed: false,
            throughput: 0.0,
            remaining: 0.0,
            started_at: None,
            completed_at: None,
        })
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == FlowState::Running
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    /// 路径上的链路；未路由时为空
    pub fn links(&self) -> &[LinkId] {
        self.route.as_ref().map(|r| r.links.as_slice()).unwrap_or(&[])
    }

    pub fn routing_failed(&self) -> bool {
        self.routing_failed
    }

    /// 当前吞吐（仅 Running 时有意义）
    pub fn throughput(&self) -> f64 {
        self.throughput
    }

    /// 剩余数据量（仅 Running 时有意义，Complete 时恰为 0）
    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    pub fn started_at(&self) -> Option<SimTime> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<SimTime> {
        self.completed_at
    }

    pub(crate) fn set_route(&mut self, route: Route) {
        self.route = Some(route);
        self.routing_failed = false;
    }

    pub(crate) fn mark_unroutable(&mut self) {
        self.route = None;
        self.routing_failed = true;
    }

    pub(crate) fn reset_throughput(&mut self) {
        self.throughput = 0.0;
    }

    pub(crate) fn raise_throughput(&mut self, delta: f64) {
        self.throughput += delta;
    }

    /// 当前速率分配保持有效的时长；`None` 表示这条流不会再产生事件。
    ///
    /// 路由失败的流永远停在 NotStarted，也不会再产生事件。
    pub fn stable_time(&self, now: SimTime) -> Option<f64> {
        match self.state {
            FlowState::NotStarted if self.route.is_none() => None,
            FlowState::NotStarted => Some((self.start.0 - now.0).max(0.0)),
            FlowState::Running if self.throughput > 0.0 => Some(self.remaining / self.throughput),
            FlowState::Running | FlowState::Complete => None,
        }
    }

    /// 把这条流推进 `dt` 秒。
    ///
    /// 本次调用中刚开始的流不会同时扣减数据。源点等于目的点的流没有链路，
    /// 开始即完成。
    pub fn progress(&mut self, now: SimTime, dt: f64) -> Option<Transition> {
        match self.state {
            FlowState::NotStarted => {
                let local = self.route.as_ref()?.is_local();
                if now.0 + dt < self.start.0 - START_EPSILON {
                    return None;
                }
                let at = SimTime(self.start.0.max(now.0));
                self.started_at = Some(at);
                if local {
                    self.state = FlowState::Complete;
                    self.remaining = 0.0;
                    self.completed_at = Some(at);
                    return Some(Transition::Completed);
                }
                self.state = FlowState::Running;
                self.remaining = self.size;
                Some(Transition::Started)
            }
            FlowState::Running => {
                self.remaining -= self.throughput * dt;
                if self.remaining < COMPLETE_EPSILON {
                    self.state = FlowState::Complete;
                    self.remaining = 0.0;
                    self.throughput = 0.0;
                    self.completed_at = Some(now + dt);
                    return Some(Transition::Completed);
                }
                None
            }
            FlowState::Complete => None,
        }
    }
}
