//! 观察者 trait
//!
//! 每次带宽分配完成后回调一次，可用于逐 tick 检查或采样。

use super::flow::Flow;
use super::report::TickRecord;
use crate::net::Network;

/// 仿真观察者：由调用方实现（例如容量检查、吞吐采样等）。
pub trait Observer {
    fn on_tick(&mut self, tick: &TickRecord, net: &Network, flows: &[Flow]);
}

/// 什么都不做的观察者
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn on_tick(&mut self, _tick: &TickRecord, _net: &Network, _flows: &[Flow]) {}
}
