mod allocator;

use crate::net::{Network, NodeId, route_ecmp};
use crate::sim::{Flow, FlowDemand, SimTime};
use rand::SeedableRng;
use rand_pcg::Pcg64;

/// 按 (src, dst) 建流、选路并推进到 Running
pub(crate) fn running_flows(net: &Network, pairs: &[(NodeId, NodeId)]) -> Vec<Flow> {
    let mut rng = Pcg64::seed_from_u64(0);
    pairs
        .iter()
        .enumerate()
        .map(|(idx, &(src, dst))| {
            let demand = FlowDemand::new(src, dst, 100.0, 0.0);
            let mut flow = Flow::new(crate::net::FlowId(idx), &demand).expect("valid flow");
            let route = route_ecmp(net, src, dst, &mut rng).expect("route exists");
            flow.set_route(route);
            flow.progress(SimTime::ZERO, 0.0);
            assert!(flow.is_running());
            flow
        })
        .collect()
}

pub(crate) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}
