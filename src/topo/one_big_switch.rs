//! 单交换机拓扑构建
//!
//! 所有主机挂在同一台交换机上：h0..h{n-1} 之后是交换机。

use crate::error::{Result, SimError};
use crate::net::{Network, NodeId, NodeKind};

#[derive(Debug, Clone)]
pub struct OneBigSwitchOpts {
    pub hosts: usize,
    pub link_bw: f64,
}

impl Default for OneBigSwitchOpts {
    fn default() -> Self {
        Self {
            hosts: 2,
            link_bw: 100.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OneBigSwitchTopology {
    pub hosts: Vec<NodeId>,
    pub switch: NodeId,
}

pub fn build_one_big_switch(net: &mut Network, opts: &OneBigSwitchOpts) -> Result<OneBigSwitchTopology> {
    if opts.hosts == 0 {
        return Err(SimError::InvalidTopology(
            "one big switch needs at least one host".to_string(),
        ));
    }
    net.set_description(format!("one big switch (hosts={})", opts.hosts));

    let hosts: Vec<NodeId> = (0..opts.hosts)
        .map(|i| net.add_host(format!("h{i}")))
        .collect();
    let switch = net.add_switch(NodeKind::Agg, "s0");

    // 先建所有上行链路，再建所有下行链路
    for &h in &hosts {
        net.connect(h, switch, opts.link_bw)?;
    }
    for &h in &hosts {
        net.connect(switch, h, opts.link_bw)?;
    }

    Ok(OneBigSwitchTopology { hosts, switch })
}
