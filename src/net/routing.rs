//! 路由（ECMP）
//!
//! 对每条流按最短跳数选路：从源点做一次 BFS，记录每个节点的跳数、
//! 全部等距前驱以及源点到它的最短路径条数；随后从目的点反向回溯，
//! 每一步按前驱的最短路径条数加权随机选择前驱。
//!
//! 这样得到的路径在所有最短路径上均匀分布，但不需要把路径集合全部展开
//! （等价路径很多的拓扑上，展开的规模是指数级的）。

use std::collections::VecDeque;

use rand::Rng;

use super::id::{LinkId, NodeId};
use super::network::Network;
use tracing::trace;

/// 一条流的路由结果：节点序列与对应的链路序列
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Route {
    pub nodes: Vec<NodeId>,
    /// `links.len() == nodes.len() - 1`
    pub links: Vec<LinkId>,
}

impl Route {
    /// 源点与目的点相同时的单节点路由
    pub fn local(node: NodeId) -> Self {
        Self {
            nodes: vec![node],
            links: Vec::new(),
        }
    }

    pub fn hops(&self) -> usize {
        self.links.len()
    }

    pub fn is_local(&self) -> bool {
        self.links.is_empty()
    }
}

/// 从某个源点出发的最短路径 DAG
#[derive(Debug, Clone)]
pub struct ShortestPathDag {
    src: NodeId,
    dist: Vec<Option<usize>>,
    preds: Vec<Vec<NodeId>>,
    /// 源点到各节点的最短路径条数（饱和计数）
    paths: Vec<u128>,
}

impl ShortestPathDag {
    /// 在有向图上从 `src` 做 BFS。
    ///
    /// 同一对节点之间的平行链路只计一次前驱，路径按节点序列区分。
    /// `src` 不在拓扑中时所有节点都不可达。
    pub fn build(net: &Network, src: NodeId) -> Self {
        let n = net.node_count();
        let mut dist: Vec<Option<usize>> = vec![None; n];
        let mut preds: Vec<Vec<NodeId>> = vec![Vec::new(); n];
        let mut paths: Vec<u128> = vec![0; n];
        let mut q = VecDeque::new();

        if src.0 >= n {
            return Self {
                src,
                dist,
                preds,
                paths,
            };
        }

        dist[src.0] = Some(0);
        paths[src.0] = 1;
        q.push_back(src);

        while let Some(v) = q.pop_front() {
            let Some(dv) = dist[v.0] else { continue };
            for link in net.out_links(v) {
                let next = link.to;
                let seen = dist[next.0];
                match seen {
                    None => {
                        dist[next.0] = Some(dv + 1);
                        preds[next.0].push(v);
                        paths[next.0] = paths[v.0];
                        q.push_back(next);
                    }
                    Some(dn) if dn == dv + 1 && !preds[next.0].contains(&v) => {
                        preds[next.0].push(v);
                        paths[next.0] = paths[next.0].saturating_add(paths[v.0]);
                    }
                    _ => {}
                }
            }
        }

        Self {
            src,
            dist,
            preds,
            paths,
        }
    }

    pub fn src(&self) -> NodeId {
        self.src
    }

    pub fn distance(&self, node: NodeId) -> Option<usize> {
        self.dist.get(node.0).copied().flatten()
    }

    pub fn predecessors(&self, node: NodeId) -> &[NodeId] {
        self.preds.get(node.0).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn path_count(&self, node: NodeId) -> u128 {
        self.paths.get(node.0).copied().unwrap_or(0)
    }

    /// 随机回溯出一条到 `dst` 的最短路径（节点序列）
    pub fn sample_path<R: Rng + ?Sized>(&self, dst: NodeId, rng: &mut R) -> Option<Vec<NodeId>> {
        let hops = self.distance(dst)?;
        let mut rev = Vec::with_capacity(hops + 1);
        let mut cur = dst;
        rev.push(cur);
        while cur != self.src {
            let preds = &self.preds[cur.0];
            cur = if preds.len() == 1 {
                preds[0]
            } else {
                self.weighted_pick(preds, rng)
            };
            rev.push(cur);
        }
        rev.reverse();
        Some(rev)
    }

    fn weighted_pick<R: Rng + ?Sized>(&self, preds: &[NodeId], rng: &mut R) -> NodeId {
        let total = preds
            .iter()
            .fold(0u128, |acc, p| acc.saturating_add(self.paths[p.0]));
        let mut ticket = rng.gen_range(0..total);
        for &p in preds {
            let w = self.paths[p.0];
            if ticket < w {
                return p;
            }
            ticket -= w;
        }
        // 饱和计数时 total 可能小于各权重之和，落在这里的只能是最后一个
        preds[preds.len() - 1]
    }

    /// 展开到 `dst` 的全部最短路径，最多 `cap` 条
    pub fn enumerate_paths(&self, dst: NodeId, cap: usize) -> Vec<Vec<NodeId>> {
        let mut out = Vec::new();
        if self.distance(dst).is_none() || cap == 0 {
            return out;
        }
        let mut stack = vec![dst];
        self.expand(dst, &mut stack, &mut out, cap);
        out
    }

    fn expand(&self, node: NodeId, stack: &mut Vec<NodeId>, out: &mut Vec<Vec<NodeId>>, cap: usize) {
        if out.len() >= cap {
            return;
        }
        if node == self.src {
            out.push(stack.iter().rev().copied().collect());
            return;
        }
        for &p in &self.preds[node.0] {
            stack.push(p);
            self.expand(p, stack, out, cap);
            stack.pop();
            if out.len() >= cap {
                return;
            }
        }
    }
}

/// 把节点序列映射为链路序列。
///
/// 平行链路取源节点邻接表中第一条匹配的链路。
pub fn links_for_path(net: &Network, nodes: &[NodeId]) -> Option<Vec<LinkId>> {
    nodes
        .windows(2)
        .map(|pair| net.link_between(pair[0], pair[1]))
        .collect()
}

/// 在所有最短路径中均匀随机选一条；不可达（含端点不在拓扑中）时返回 `None`
#[tracing::instrument(skip(net, rng))]
pub fn route_ecmp<R: Rng + ?Sized>(
    net: &Network,
    src: NodeId,
    dst: NodeId,
    rng: &mut R,
) -> Option<Route> {
    if src == dst {
        return (src.0 < net.node_count()).then(|| Route::local(src));
    }
    let dag = ShortestPathDag::build(net, src);
    let nodes = dag.sample_path(dst, rng)?;
    let links = links_for_path(net, &nodes)?;
    trace!(hops = links.len(), candidates = %dag.path_count(dst), "选定路径");
    Some(Route { nodes, links })
}

/// 展开 `src -> dst` 的最短路径（最多 `cap` 条）
pub fn all_shortest_paths(net: &Network, src: NodeId, dst: NodeId, cap: usize) -> Vec<Route> {
    if src == dst {
        return (src.0 < net.node_count())
            .then(|| Route::local(src))
            .into_iter()
            .collect();
    }
    ShortestPathDag::build(net, src)
        .enumerate_paths(dst, cap)
        .into_iter()
        .filter_map(|nodes| {
            let links = links_for_path(net, &nodes)?;
            Some(Route { nodes, links })
        })
        .collect()
}

/// `src -> dst` 的最短路径条数；不可达时为 0
pub fn count_shortest_paths(net: &Network, src: NodeId, dst: NodeId) -> u128 {
    if src == dst {
        return u128::from(src.0 < net.node_count());
    }
    ShortestPathDag::build(net, src).path_count(dst)
}
