//! Fat-tree 拓扑构建
//!
//! 节点编号顺序：主机、ToR、Agg、Core。`pods` 可以小于 `k`，
//! 此时只生成前 `pods` 个 pod，核心层仍然是完整的 (k/2)^2 台交换机。

use crate::error::{Result, SimError};
use crate::net::{Network, NodeId, NodeKind};

#[derive(Debug, Clone)]
pub struct FatTreeOpts {
    pub k: usize,
    pub pods: usize,
    pub link_bw: f64,
}

impl Default for FatTreeOpts {
    fn default() -> Self {
        Self {
            k: 4,
            pods: 4,
            link_bw: 100.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FatTreeTopology {
    pub k: usize,
    pub pods: usize,
    pub hosts: Vec<NodeId>,
    pub tor_switches: Vec<NodeId>,
    pub agg_switches: Vec<NodeId>,
    pub core_switches: Vec<NodeId>,
}

impl FatTreeTopology {
    fn half(&self) -> usize {
        self.k / 2
    }

    pub fn host(&self, pod: usize, tor: usize, host: usize) -> NodeId {
        let half = self.half();
        let idx = (pod * half + tor) * half + host;
        self.hosts[idx]
    }

    pub fn tor(&self, pod: usize, tor: usize) -> NodeId {
        let half = self.half();
        self.tor_switches[pod * half + tor]
    }

    pub fn agg(&self, pod: usize, agg: usize) -> NodeId {
        let half = self.half();
        self.agg_switches[pod * half + agg]
    }

    /// 核心交换机 `c` 与每个 pod 的第 `c % (k/2)` 台 Agg 相连
    pub fn core(&self, c: usize) -> NodeId {
        self.core_switches[c]
    }

    /// 与第 `agg` 台 Agg 相连的核心交换机：`c ≡ agg (mod k/2)`
    pub fn cores_of_agg(&self, agg: usize) -> impl Iterator<Item = NodeId> + '_ {
        let half = self.half();
        self.core_switches[..half * half]
            .iter()
            .skip(agg)
            .step_by(half)
            .copied()
    }
}

pub fn build_fat_tree(net: &mut Network, opts: &FatTreeOpts) -> Result<FatTreeTopology> {
    let k = opts.k;
    if k < 2 || k % 2 != 0 {
        return Err(SimError::InvalidTopology(format!(
            "fat-tree k must be even and >= 2, got {k}"
        )));
    }
    if opts.pods == 0 || opts.pods > k {
        return Err(SimError::InvalidTopology(format!(
            "fat-tree pods must be in 1..={k}, got {}",
            opts.pods
        )));
    }

    let half = k / 2;
    let pods = opts.pods;
    let bw = opts.link_bw;
    net.set_description(format!("fat tree (k={k}, pods={pods})"));

    let mut hosts = Vec::with_capacity(pods * half * half);
    for pod in 0..pods {
        for tor in 0..half {
            for h in 0..half {
                hosts.push(net.add_host(format!("h{pod}_{tor}_{h}")));
            }
        }
    }

    let mut tor_switches = Vec::with_capacity(pods * half);
    for pod in 0..pods {
        for tor in 0..half {
            tor_switches.push(net.add_switch(NodeKind::Tor, format!("p{pod}_t{tor}")));
        }
    }

    let mut agg_switches = Vec::with_capacity(pods * half);
    for pod in 0..pods {
        for agg in 0..half {
            agg_switches.push(net.add_switch(NodeKind::Agg, format!("p{pod}_a{agg}")));
        }
    }

    let mut core_switches = Vec::with_capacity(half * half);
    for c in 0..half * half {
        core_switches.push(net.add_switch(NodeKind::Core, format!("c{c}")));
    }

    let topo = FatTreeTopology {
        k,
        pods,
        hosts,
        tor_switches,
        agg_switches,
        core_switches,
    };

    for pod in 0..pods {
        for tor in 0..half {
            for h in 0..half {
                net.connect_duplex(topo.host(pod, tor, h), topo.tor(pod, tor), bw)?;
            }
        }
    }

    for pod in 0..pods {
        for tor in 0..half {
            for agg in 0..half {
                net.connect_duplex(topo.tor(pod, tor), topo.agg(pod, agg), bw)?;
            }
        }
    }

    for pod in 0..pods {
        for agg in 0..half {
            for core in topo.cores_of_agg(agg) {
                net.connect_duplex(topo.agg(pod, agg), core, bw)?;
            }
        }
    }

    Ok(topo)
}
