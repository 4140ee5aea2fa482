use super::{assert_close, running_flows};
use crate::SimError;
use crate::net::{FlowId, LinkId, Network, NodeId, NodeKind, Route};
use crate::sim::{
    FairShareAllocator, Flow, FlowDemand, SATURATION_EPSILON, SimTime, link_loads,
};

fn chain(bandwidths: &[f64]) -> (Network, Vec<NodeId>) {
    let mut net = Network::new("chain");
    let nodes: Vec<NodeId> = (0..=bandwidths.len())
        .map(|i| net.add_node(NodeKind::Host, format!("n{i}")))
        .collect();
    for (i, &bw) in bandwidths.iter().enumerate() {
        net.connect(nodes[i], nodes[i + 1], bw).expect("connect");
    }
    (net, nodes)
}

#[test]
fn single_flow_takes_bottleneck_bandwidth() {
    let (net, n) = chain(&[100.0, 40.0]);
    let mut flows = running_flows(&net, &[(n[0], n[2])]);

    let summary = FairShareAllocator::new()
        .allocate(&net, &mut flows)
        .expect("allocate");
    assert_close(flows[0].throughput(), 40.0);
    assert_eq!(summary.running, 1);
    assert_eq!(summary.rounds, 1);
}

#[test]
fn classic_max_min_split() {
    // a -> b (10) shared by f0, f1; b -> c (100) shared by f1, f2
    let (net, n) = chain(&[10.0, 100.0]);
    let mut flows = running_flows(&net, &[(n[0], n[1]), (n[0], n[2]), (n[1], n[2])]);

    let summary = FairShareAllocator::new()
        .allocate(&net, &mut flows)
        .expect("allocate");
    assert_close(flows[0].throughput(), 5.0);
    assert_close(flows[1].throughput(), 5.0);
    assert_close(flows[2].throughput(), 95.0);
    assert_eq!(summary.rounds, 2);
    assert_eq!(summary.saturated_links, 2);
}

#[test]
fn frozen_flows_stop_counting_on_other_links() {
    // f0 crosses both links and is bottlenecked on the first one; f1 and f2
    // share the wide link with it and must split what f0 leaves behind.
    let (net, n) = chain(&[30.0, 120.0]);
    let mut flows = running_flows(&net, &[(n[0], n[2]), (n[1], n[2]), (n[1], n[2])]);

    FairShareAllocator::new()
        .allocate(&net, &mut flows)
        .expect("allocate");
    assert_close(flows[0].throughput(), 30.0);
    assert_close(flows[1].throughput(), 45.0);
    assert_close(flows[2].throughput(), 45.0);

    let loads = link_loads(&net, &flows);
    assert_close(loads[0], 30.0);
    assert_close(loads[1], 120.0);
}

#[test]
fn allocation_is_recomputed_from_scratch() {
    let (net, n) = chain(&[100.0]);
    let mut flows = running_flows(&net, &[(n[0], n[1]), (n[0], n[1])]);
    let mut alloc = FairShareAllocator::new();

    alloc.allocate(&net, &mut flows).expect("allocate");
    assert_close(flows[0].throughput(), 50.0);

    // 只剩一条流在运行：上一轮的已用带宽不能残留
    flows[1].progress(crate::sim::SimTime::ZERO, 2.0);
    assert!(!flows[1].is_running());
    alloc.allocate(&net, &mut flows).expect("allocate");
    assert_close(flows[0].throughput(), 100.0);
}

#[test]
fn near_tolerance_bandwidths_still_terminate() {
    let eps = SATURATION_EPSILON / 2.0;
    let (net, n) = chain(&[100.0, 100.0 + eps, 100.0 - eps]);
    let mut flows = running_flows(
        &net,
        &[
            (n[0], n[3]),
            (n[0], n[1]),
            (n[1], n[2]),
            (n[2], n[3]),
        ],
    );

    let summary = FairShareAllocator::new()
        .allocate(&net, &mut flows)
        .expect("allocator must converge");
    assert!(summary.rounds <= net.link_count() + flows.len());

    let loads = link_loads(&net, &flows);
    for (link, load) in net.links().iter().zip(&loads) {
        assert!(*load <= link.bandwidth + 1e-6, "{link:?} load {load}");
    }
    for flow in &flows {
        assert!((flow.throughput() - 50.0).abs() < 1e-5, "{flow:?}");
    }
}

#[test]
fn many_flows_on_one_link_share_equally() {
    let (net, n) = chain(&[90.0]);
    let pairs = vec![(n[0], n[1]); 9];
    let mut flows = running_flows(&net, &pairs);

    FairShareAllocator::new()
        .allocate(&net, &mut flows)
        .expect("allocate");
    for flow in &flows {
        assert_close(flow.throughput(), 10.0);
    }
}

#[test]
fn idle_network_allocates_nothing() {
    let (net, _) = chain(&[10.0]);
    let mut flows = Vec::new();
    let summary = FairShareAllocator::new()
        .allocate(&net, &mut flows)
        .expect("allocate");
    assert_eq!(summary.rounds, 0);
    assert_eq!(summary.running, 0);
}

#[test]
fn flow_ids_need_not_match_slice_positions() {
    let (net, n) = chain(&[60.0]);
    let demand = FlowDemand::new(n[0], n[1], 100.0, 0.0);
    let mut flow = Flow::new(FlowId(5), &demand).expect("valid flow");
    flow.set_route(Route {
        nodes: vec![n[0], n[1]],
        links: vec![LinkId(0)],
    });
    flow.progress(SimTime::ZERO, 0.0);
    let mut flows = vec![flow];

    let summary = FairShareAllocator::new()
        .allocate(&net, &mut flows)
        .expect("allocate");
    assert_eq!(summary.running, 1);
    assert_close(flows[0].throughput(), 60.0);
}

#[test]
fn allocates_a_subset_of_flows() {
    let (net, n) = chain(&[10.0, 100.0]);
    let mut flows = running_flows(&net, &[(n[0], n[1]), (n[0], n[2]), (n[1], n[2])]);

    // 只剩 f1、f2 时，f1 独占 a -> b
    let mut alloc = FairShareAllocator::new();
    alloc.allocate(&net, &mut flows[1..]).expect("allocate");
    assert_close(flows[1].throughput(), 10.0);
    assert_close(flows[2].throughput(), 90.0);
}

#[test]
fn running_flow_without_links_is_an_unbounded_increment() {
    let (net, n) = chain(&[10.0]);
    let mut flows = running_flows(&net, &[(n[0], n[1])]);
    // Running 却没有链路约束：只能来自簿记错误
    flows[0].set_route(Route::local(n[0]));

    let err = FairShareAllocator::new()
        .allocate(&net, &mut flows)
        .expect_err("no link constrains the flow");
    assert_eq!(err, SimError::UnboundedIncrement { active: 1, round: 1 });
}

#[test]
fn route_through_unknown_link_is_rejected() {
    let (net, n) = chain(&[10.0]);
    let mut flows = running_flows(&net, &[(n[0], n[1])]);
    flows[0].set_route(Route {
        nodes: vec![n[0], n[1]],
        links: vec![LinkId(7)],
    });

    let err = FairShareAllocator::new()
        .allocate(&net, &mut flows)
        .expect_err("link 7 does not exist");
    assert_eq!(err, SimError::UnknownLink(LinkId(7)));
}
