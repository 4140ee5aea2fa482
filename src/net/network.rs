//! 网络拓扑管理
//!
//! 节点与链路存放在扁平数组中并通过下标相互引用，避免所有权环。
//! 仿真开始后拓扑只读。

use std::collections::VecDeque;

use super::id::{LinkId, NodeId};
use super::link::Link;
use super::node::{Node, NodeKind};
use crate::error::{Result, SimError};
use tracing::trace;

/// 网络拓扑
#[derive(Debug, Default, Clone)]
pub struct Network {
    nodes: Vec<Node>,
    links: Vec<Link>,
    desc: String,
}

impl Network {
    pub fn new(desc: impl Into<String>) -> Self {
        Self {
            desc: desc.into(),
            ..Self::default()
        }
    }

    /// 拓扑描述（由拓扑生成器填写）
    pub fn description(&self) -> &str {
        &self.desc
    }

    pub fn set_description(&mut self, desc: impl Into<String>) {
        self.desc = desc.into();
    }

    /// 添加任意类别的节点
    pub fn add_node(&mut self, kind: NodeKind, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(id, kind, name));
        id
    }

    /// 添加主机节点
    pub fn add_host(&mut self, name: impl Into<String>) -> NodeId {
        self.add_node(NodeKind::Host, name)
    }

    /// 添加交换机节点
    pub fn add_switch(&mut self, kind: NodeKind, name: impl Into<String>) -> NodeId {
        debug_assert!(kind.is_switch());
        self.add_node(kind, name)
    }

    /// 连接两个节点（创建单向链路）
    pub fn connect(&mut self, from: NodeId, to: NodeId, bandwidth: f64) -> Result<LinkId> {
        self.check_node(from)?;
        self.check_node(to)?;
        if !(bandwidth.is_finite() && bandwidth > 0.0) {
            return Err(SimError::InvalidBandwidth {
                from,
                to,
                bandwidth,
            });
        }

        let id = LinkId(self.links.len());
        self.links.push(Link::new(id, from, to, bandwidth));
        self.nodes[from.0].out_links.push(id);
        trace!(link = ?id, ?from, ?to, bandwidth, "添加链路");
        Ok(id)
    }

    /// 创建一对方向相反、带宽相同的链路
    pub fn connect_duplex(&mut self, a: NodeId, b: NodeId, bandwidth: f64) -> Result<(LinkId, LinkId)> {
        let forward = self.connect(a, b, bandwidth)?;
        let backward = self.connect(b, a, bandwidth)?;
        Ok((forward, backward))
    }

    pub fn check_node(&self, id: NodeId) -> Result<()> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(SimError::UnknownNode(id))
        }
    }

    pub fn check_link(&self, id: LinkId) -> Result<()> {
        if id.0 < self.links.len() {
            Ok(())
        } else {
            Err(SimError::UnknownLink(id))
        }
    }

    /// 下标越界时 panic；来自外部的标识符先经过 `check_node`
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn link(&self, id: LinkId) -> &Link {
        &self.links[id.0]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// 从 `from` 出发的链路（按添加顺序）
    pub fn out_links(&self, from: NodeId) -> impl Iterator<Item = &Link> + '_ {
        self.nodes[from.0].out_links.iter().map(|id| &self.links[id.0])
    }

    /// 查找 `from -> to` 的链路。
    ///
    /// 存在多条平行链路时返回邻接表中的第一条。
    pub fn link_between(&self, from: NodeId, to: NodeId) -> Option<LinkId> {
        self.out_links(from).find(|l| l.to == to).map(|l| l.id)
    }

    /// 按跳数计算的最短距离；不可达时返回 `Ok(None)`
    pub fn hop_distance(&self, src: NodeId, dst: NodeId) -> Result<Option<usize>> {
        self.check_node(src)?;
        self.check_node(dst)?;
        let mut dist = vec![usize::MAX; self.nodes.len()];
        let mut q = VecDeque::new();
        dist[src.0] = 0;
        q.push_back(src);
        while let Some(v) = q.pop_front() {
            if v == dst {
                return Ok(Some(dist[v.0]));
            }
            for link in self.out_links(v) {
                if dist[link.to.0] == usize::MAX {
                    dist[link.to.0] = dist[v.0] + 1;
                    q.push_back(link.to);
                }
            }
        }
        Ok(None)
    }

    /// 所有主机节点
    pub fn hosts(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Host)
            .map(|n| n.id)
    }
}
