use rand::Rng;
use serde::{Deserialize, Serialize};

use super::generate::{RandomFlowsOpts, random_flows};
use crate::error::{Result, SimError};
use crate::net::{Network, NodeId, NodeKind};
use crate::sim::FlowDemand;
use crate::topo::{FatTreeOpts, OneBigSwitchOpts, build_fat_tree, build_one_big_switch};

const DEFAULT_LINK_BW: f64 = 100.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkloadSpec {
    pub schema_version: u32,
    #[serde(default)]
    pub seed: Option<u64>,
    pub topology: TopologySpec,
    #[serde(default)]
    pub flows: Vec<FlowDemand>,
    #[serde(default)]
    pub random: Option<RandomFlowsSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TopologySpec {
    FatTree {
        k: usize,
        #[serde(default)]
        pods: Option<usize>,
        #[serde(default)]
        link_bw: Option<f64>,
    },
    OneBigSwitch {
        #[serde(default)]
        hosts: Option<usize>,
        #[serde(default)]
        link_bw: Option<f64>,
    },
    Explicit {
        nodes: Vec<NodeSpec>,
        #[serde(default)]
        links: Vec<LinkSpec>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: usize,
    #[serde(default = "default_node_kind")]
    pub kind: NodeKind,
    #[serde(default)]
    pub name: Option<String>,
}

fn default_node_kind() -> NodeKind {
    NodeKind::Host
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSpec {
    pub src: usize,
    pub dst: usize,
    pub bandwidth: f64,
    /// 同时创建反向链路
    #[serde(default)]
    pub duplex: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomFlowsSpec {
    pub count: usize,
    #[serde(default)]
    pub max_size: Option<u64>,
    #[serde(default)]
    pub time_range: Option<f64>,
}

impl RandomFlowsSpec {
    pub fn opts(&self) -> RandomFlowsOpts {
        let defaults = RandomFlowsOpts::default();
        RandomFlowsOpts {
            count: self.count,
            max_size: self.max_size.unwrap_or(defaults.max_size),
            time_range: self.time_range.unwrap_or(defaults.time_range),
        }
    }
}

impl TopologySpec {
    pub fn build(&self) -> Result<Network> {
        let mut net = Network::default();
        match self {
            TopologySpec::FatTree { k, pods, link_bw } => {
                let opts = FatTreeOpts {
                    k: *k,
                    pods: pods.unwrap_or(*k),
                    link_bw: link_bw.unwrap_or(DEFAULT_LINK_BW),
                };
                build_fat_tree(&mut net, &opts)?;
            }
            TopologySpec::OneBigSwitch { hosts, link_bw } => {
                let defaults = OneBigSwitchOpts::default();
                let opts = OneBigSwitchOpts {
                    hosts: hosts.unwrap_or(defaults.hosts),
                    link_bw: link_bw.unwrap_or(defaults.link_bw),
                };
                build_one_big_switch(&mut net, &opts)?;
            }
            TopologySpec::Explicit { nodes, links } => {
                net.set_description(format!("explicit ({} nodes)", nodes.len()));
                for (idx, node) in nodes.iter().enumerate() {
                    if node.id != idx {
                        return Err(SimError::InvalidTopology(format!(
                            "node ids must be dense and ordered: expected {idx}, got {}",
                            node.id
                        )));
                    }
                    let name = node.name.clone().unwrap_or_else(|| format!("n{idx}"));
                    net.add_node(node.kind, name);
                }
                for link in links {
                    let (src, dst) = (NodeId(link.src), NodeId(link.dst));
                    if link.duplex {
                        net.connect_duplex(src, dst, link.bandwidth)?;
                    } else {
                        net.connect(src, dst, link.bandwidth)?;
                    }
                }
            }
        }
        Ok(net)
    }
}

impl WorkloadSpec {
    /// 显式列出的流在前，随机生成的流在后
    pub fn demands<R: Rng + ?Sized>(&self, net: &Network, rng: &mut R) -> Result<Vec<FlowDemand>> {
        let mut demands = self.flows.clone();
        if let Some(random) = &self.random {
            demands.extend(random_flows(net, &random.opts(), rng)?);
        }
        Ok(demands)
    }
}
