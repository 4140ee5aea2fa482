//! 仿真核心模块
//!
//! 此模块包含流级仿真的核心组件：仿真时间、流生命周期、最大最小公平分配器以及仿真时钟。

// 子模块声明
mod alloc;
mod flow;
mod observer;
mod report;
mod simulation;
mod time;

// 重新导出公共接口
pub use alloc::{AllocationSummary, FairShareAllocator, SATURATION_EPSILON, link_loads};
pub use flow::{COMPLETE_EPSILON, Flow, FlowDemand, FlowState, START_EPSILON, Transition};
pub use observer::{NoopObserver, Observer};
pub use report::{FlowCompletion, RoutingFailure, SimReport, TickRecord};
pub use simulation::{SimConfig, Simulation};
pub use time::SimTime;
