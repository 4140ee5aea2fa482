//! 最大最小公平带宽分配（water-filling）
//!
//! 每轮把所有仍可增长的流的速率同步抬高，直到某条链路饱和；饱和链路上的流
//! 被冻结，剩下的流继续抬高。链路上的已用带宽和流集合是每次分配时从零重建
//! 的临时数据，由分配器独占，拓扑本身保持只读。

use super::flow::Flow;
use crate::error::{Result, SimError};
use crate::net::{LinkId, Network};
use tracing::{debug, trace};

/// 判定链路饱和的容差
pub const SATURATION_EPSILON: f64 = 1e-6;

/// 单条链路在本次分配中的临时状态
#[derive(Debug, Clone, Default)]
struct LinkUsage {
    used: f64,
    /// 仍约束着它们的流（在 `flows` 切片中的下标）；链路饱和后清空
    flows: Vec<usize>,
    /// `flows` 中尚未冻结的流数量
    active: usize,
}

/// 一次分配的概要
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AllocationSummary {
    pub rounds: usize,
    pub running: usize,
    pub saturated_links: usize,
}

#[derive(Debug, Default)]
pub struct FairShareAllocator {
    usage: Vec<LinkUsage>,
    /// 至少登记过一条流的链路
    touched: Vec<LinkId>,
    /// 按切片下标标记仍可增长的流
    active: Vec<bool>,
}

impl FairShareAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset(&mut self, net: &Network, flows: &[Flow]) {
        self.usage.clear();
        self.usage.resize_with(net.link_count(), LinkUsage::default);
        self.touched.clear();
        self.active.clear();
        self.active.resize(flows.len(), false);
    }

    /// 为所有 Running 的流重新计算吞吐。
    ///
    /// 临时状态按流在 `flows` 中的位置索引，不要求 `FlowId` 与位置一致。
    ///
    /// 活跃集合非空却没有任何链路约束它，或轮数超过 `链路数 + 流数`，
    /// 都说明簿记出错，直接返回错误而不是给出默认速率。
    pub fn allocate(&mut self, net: &Network, flows: &mut [Flow]) -> Result<AllocationSummary> {
        self.reset(net, flows);

        let mut active_count = 0usize;
        for (pos, flow) in flows.iter_mut().enumerate() {
            if !flow.is_running() {
                continue;
            }
            flow.reset_throughput();
            self.active[pos] = true;
            active_count += 1;
            for &link in flow.links() {
                net.check_link(link)?;
                let u = &mut self.usage[link.0];
                if u.flows.is_empty() {
                    self.touched.push(link);
                }
                u.flows.push(pos);
                u.active += 1;
            }
        }

        let mut summary = AllocationSummary {
            running: active_count,
            ..AllocationSummary::default()
        };
        let bound = net.link_count() + flows.len();

        while active_count > 0 {
            summary.rounds += 1;
            if summary.rounds > bound {
                return Err(SimError::IterationBoundExceeded { bound });
            }

            // 所有仍受约束的链路上，每条活跃流还能分到的最小余量
            let delta = self
                .touched
                .iter()
                .map(|l| (&self.usage[l.0], net.link(*l).bandwidth))
                .filter(|(u, _)| u.active > 0)
                .map(|(u, bw)| (bw - u.used) / u.active as f64)
                .fold(f64::INFINITY, f64::min);
            if !delta.is_finite() {
                return Err(SimError::UnboundedIncrement {
                    active: active_count,
                    round: summary.rounds,
                });
            }

            for (pos, flow) in flows.iter_mut().enumerate() {
                if self.active[pos] {
                    flow.raise_throughput(delta);
                }
            }
            for &l in &self.touched {
                let u = &mut self.usage[l.0];
                if u.active > 0 {
                    u.used += delta * u.active as f64;
                }
            }

            // 先统一累加已用带宽，再冻结饱和链路上的流，避免同一轮内计数被提前改掉
            for i in 0..self.touched.len() {
                let l = self.touched[i];
                let bw = net.link(l).bandwidth;
                let u = &mut self.usage[l.0];
                if u.flows.is_empty() || u.used < bw - SATURATION_EPSILON {
                    continue;
                }
                summary.saturated_links += 1;
                let frozen = std::mem::take(&mut u.flows);
                u.active = 0;
                trace!(link = ?l, used = u.used, bandwidth = bw, flows = frozen.len(), "链路饱和");
                for pos in frozen {
                    if !self.active[pos] {
                        continue;
                    }
                    self.active[pos] = false;
                    active_count -= 1;
                    for &other in flows[pos].links() {
                        let ou = &mut self.usage[other.0];
                        ou.active = ou.active.saturating_sub(1);
                    }
                }
            }

            trace!(round = summary.rounds, delta, remaining_active = active_count, "分配一轮");
        }

        if let Some(stalled) = flows
            .iter()
            .find(|f| f.is_running() && f.throughput() <= 0.0)
        {
            return Err(SimError::StalledFlow { flow: stalled.id });
        }

        debug!(
            running = summary.running,
            rounds = summary.rounds,
            saturated_links = summary.saturated_links,
            "带宽分配完成"
        );
        Ok(summary)
    }
}

/// 每条链路上 Running 流的吞吐之和（按 `LinkId` 下标）
pub fn link_loads(net: &Network, flows: &[Flow]) -> Vec<f64> {
    let mut loads = vec![0.0; net.link_count()];
    for flow in flows.iter().filter(|f| f.is_running()) {
        for &l in flow.links() {
            loads[l.0] += flow.throughput();
        }
    }
    loads
}
