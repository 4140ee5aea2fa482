//! 仿真时钟
//!
//! 主循环：重新分配带宽 -> 计算下一个事件的时间跨度 -> 推进所有流 -> 推进全局时间。
//! 只有流的开始与完成会改变活跃流集合，所以只在这些边界上重新分配。

use rand::SeedableRng;
use rand_pcg::Pcg64;

use super::alloc::{AllocationSummary, FairShareAllocator};
use super::flow::{Flow, FlowDemand, FlowState, Transition};
use super::observer::{NoopObserver, Observer};
use super::report::{FlowCompletion, RoutingFailure, SimReport, TickRecord};
use super::time::SimTime;
use crate::error::{Result, SimError};
use crate::net::{FlowId, Network, route_ecmp};
use tracing::{debug, info, trace, warn};

/// 单次仿真的配置
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// ECMP 随机选路的种子；每个仿真实例持有自己的随机源
    pub seed: u64,
    /// 为 true 时任一流路由失败即返回 `SimError::NoRoute`
    pub strict_routing: bool,
    /// tick 数上限，超过后返回 `SimError::ClockStalled`
    pub max_ticks: Option<u64>,
    /// 是否在报告中保留每个 tick 的记录
    pub record_ticks: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            strict_routing: false,
            max_ticks: None,
            record_ticks: true,
        }
    }
}

/// 流级仿真器：拥有拓扑、流、随机源与分配器。
pub struct Simulation {
    net: Network,
    flows: Vec<Flow>,
    rng: Pcg64,
    cfg: SimConfig,
    allocator: FairShareAllocator,
    now: SimTime,
    ticks: u64,
    routed: bool,
    last_alloc: AllocationSummary,
    tick_log: Vec<TickRecord>,
    completions: Vec<FlowCompletion>,
    routing_failures: Vec<RoutingFailure>,
}

impl Simulation {
    /// 校验流需求并创建仿真；流的标识符即其在 `demands` 中的下标。
    pub fn new(net: Network, demands: &[FlowDemand], cfg: SimConfig) -> Result<Self> {
        let mut flows = Vec::with_capacity(demands.len());
        for (idx, demand) in demands.iter().enumerate() {
            net.check_node(demand.src)?;
            net.check_node(demand.dst)?;
            flows.push(Flow::new(FlowId(idx), demand)?);
        }

        Ok(Self {
            net,
            flows,
            rng: Pcg64::seed_from_u64(cfg.seed),
            cfg,
            allocator: FairShareAllocator::new(),
            now: SimTime::ZERO,
            ticks: 0,
            routed: false,
            last_alloc: AllocationSummary::default(),
            tick_log: Vec::new(),
            completions: Vec::new(),
            routing_failures: Vec::new(),
        })
    }

    /// 获取当前仿真时间
    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn network(&self) -> &Network {
        &self.net
    }

    pub fn flows(&self) -> &[Flow] {
        &self.flows
    }

    pub fn flow(&self, id: FlowId) -> &Flow {
        &self.flows[id.0]
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn last_allocation(&self) -> AllocationSummary {
        self.last_alloc
    }

    pub fn routing_failures(&self) -> &[RoutingFailure] {
        &self.routing_failures
    }

    pub fn completions(&self) -> &[FlowCompletion] {
        &self.completions
    }

    /// 为每条流选路，只执行一次。
    ///
    /// 路由失败的流永远不会开始，并被记录在 `routing_failures` 中；
    /// 严格模式下直接返回第一个失败。
    #[tracing::instrument(skip(self), fields(flows = self.flows.len(), seed = self.cfg.seed))]
    pub fn route_all(&mut self) -> Result<&[RoutingFailure]> {
        if self.routed {
            return Ok(self.routing_failures.as_slice());
        }
        for flow in self.flows.iter_mut() {
            match route_ecmp(&self.net, flow.src, flow.dst, &mut self.rng) {
                Some(route) => {
                    trace!(flow = ?flow.id, hops = route.hops(), path = ?route.nodes, "路由完成");
                    flow.set_route(route);
                }
                None => {
                    warn!(flow = ?flow.id, src = ?flow.src, dst = ?flow.dst, "目的节点不可达");
                    flow.mark_unroutable();
                    if self.cfg.strict_routing {
                        return Err(SimError::NoRoute {
                            flow: flow.id,
                            src: flow.src,
                            dst: flow.dst,
                        });
                    }
                    self.routing_failures.push(RoutingFailure {
                        flow: flow.id,
                        src: flow.src,
                        dst: flow.dst,
                    });
                }
            }
        }
        self.routed = true;
        debug!(failures = self.routing_failures.len(), "所有流路由完成");
        Ok(self.routing_failures.as_slice())
    }

    /// 所有流的最小稳定时间；`None` 表示不会再有事件
    pub fn next_event_horizon(&self) -> Option<f64> {
        self.flows
            .iter()
            .filter_map(|f| f.stable_time(self.now))
            .reduce(f64::min)
    }

    /// 执行一个 tick；返回 false 表示仿真已结束。
    pub fn step(&mut self, observer: &mut dyn Observer) -> Result<bool> {
        if !self.routed {
            self.route_all()?;
        }
        if let Some(max) = self.cfg.max_ticks {
            if self.ticks >= max {
                return Err(SimError::ClockStalled {
                    time: self.now.0,
                    ticks: self.ticks,
                });
            }
        }

        self.last_alloc = self.allocator.allocate(&self.net, &mut self.flows)?;
        let horizon = self.next_event_horizon();

        let record = TickRecord {
            index: self.ticks,
            time: self.now.0,
            running: self.last_alloc.running,
            completed: self.completions.len(),
            horizon,
        };
        debug!(tick = record.index, time = record.time, running = record.running, horizon = ?horizon, "⏱️  tick");
        observer.on_tick(&record, &self.net, &self.flows);
        if self.cfg.record_ticks {
            self.tick_log.push(record);
        }
        self.ticks += 1;

        let Some(dt) = horizon else {
            return Ok(false);
        };

        let now = self.now;
        for flow in self.flows.iter_mut() {
            match flow.progress(now, dt) {
                Some(Transition::Started) => {
                    trace!(flow = ?flow.id, at = now.0 + dt, "流开始");
                }
                Some(Transition::Completed) => {
                    let completion = FlowCompletion {
                        flow: flow.id,
                        start_time: flow.started_at().unwrap_or(flow.start).0,
                        completion_time: flow.completed_at().unwrap_or(now + dt).0,
                    };
                    debug!(flow = ?flow.id, at = completion.completion_time, "✅ 流完成");
                    self.completions.push(completion);
                }
                None => {}
            }
        }
        self.now += dt;
        Ok(true)
    }

    /// 运行直到所有可完成的流都完成
    pub fn run(&mut self) -> Result<SimReport> {
        self.run_with(&mut NoopObserver)
    }

    /// 运行直到结束，每个 tick 回调一次 `observer`
    #[tracing::instrument(skip(self, observer), fields(flows = self.flows.len(), links = self.net.link_count()))]
    pub fn run_with(&mut self, observer: &mut dyn Observer) -> Result<SimReport> {
        info!("▶️  开始运行仿真");
        self.route_all()?;

        while self.step(observer)? {}

        let unfinished = self
            .flows
            .iter()
            .filter(|f| f.state() != FlowState::Complete)
            .count();
        info!(
            final_time = self.now.0,
            ticks = self.ticks,
            completed = self.completions.len(),
            unfinished,
            "✅ 仿真完成"
        );
        Ok(self.report())
    }

    /// 当前为止的结果快照
    pub fn report(&self) -> SimReport {
        SimReport {
            final_time: self.now.0,
            tick_count: self.ticks,
            ticks: self.tick_log.clone(),
            completions: self.completions.clone(),
            routing_failures: self.routing_failures.clone(),
        }
    }
}
