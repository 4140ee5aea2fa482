//! 工作负载
//!
//! JSON 工作负载描述以及流需求生成器。

mod generate;
mod spec;

pub use generate::{RandomFlowsOpts, random_flows, simple_flows};
pub use spec::{LinkSpec, NodeSpec, RandomFlowsSpec, TopologySpec, WorkloadSpec};
