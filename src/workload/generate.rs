//! 流需求生成器

use rand::Rng;

use crate::error::{Result, SimError};
use crate::net::{Network, NodeId};
use crate::sim::FlowDemand;

#[derive(Debug, Clone)]
pub struct RandomFlowsOpts {
    pub count: usize,
    /// 数据量在 `1..=max_size` 中均匀取整数
    pub max_size: u64,
    /// 开始时间在 `[0, time_range]` 中均匀取值
    pub time_range: f64,
}

impl Default for RandomFlowsOpts {
    fn default() -> Self {
        Self {
            count: 3,
            max_size: 100,
            time_range: 10.0,
        }
    }
}

/// 两条流共享一条下行链路的固定场景：
/// node0 -> node1（100，t=0）与 最后一个节点 -> node1（30，t=0.5）。
pub fn simple_flows(net: &Network) -> Result<Vec<FlowDemand>> {
    let n = net.node_count();
    if n < 3 {
        return Err(SimError::InvalidTopology(format!(
            "simple flows need at least 3 nodes, got {n}"
        )));
    }
    Ok(vec![
        FlowDemand::new(NodeId(0), NodeId(1), 100.0, 0.0),
        FlowDemand::new(NodeId(n - 1), NodeId(1), 30.0, 0.5),
    ])
}

/// 源、目的在所有节点中均匀选取（二者不同）
///
/// `time_range` 必须是有限的非负数。
pub fn random_flows<R: Rng + ?Sized>(
    net: &Network,
    opts: &RandomFlowsOpts,
    rng: &mut R,
) -> Result<Vec<FlowDemand>> {
    let n = net.node_count();
    if n < 2 {
        return Err(SimError::InvalidTopology(format!(
            "random flows need at least 2 nodes, got {n}"
        )));
    }
    if !(opts.time_range.is_finite() && opts.time_range >= 0.0) {
        return Err(SimError::InvalidWorkload(format!(
            "time range must be finite and non-negative, got {}",
            opts.time_range
        )));
    }
    let max_size = opts.max_size.max(1);

    let mut flows = Vec::with_capacity(opts.count);
    for _ in 0..opts.count {
        let src = rng.gen_range(0..n);
        let mut dst = rng.gen_range(0..n);
        while dst == src {
            dst = rng.gen_range(0..n);
        }
        let size = rng.gen_range(1..=max_size) as f64;
        let start = if opts.time_range > 0.0 {
            rng.gen_range(0.0..=opts.time_range)
        } else {
            0.0
        };
        flows.push(FlowDemand::new(NodeId(src), NodeId(dst), size, start));
    }
    Ok(flows)
}
