//! 流级仿真
//!
//! 选择拓扑与工作负载，按最大最小公平分配推进仿真直到所有流完成。

use clap::{Parser, ValueEnum};
use flowsim_rs::net::Network;
use flowsim_rs::sim::{FlowDemand, SimConfig, SimReport, Simulation};
use flowsim_rs::topo::{FatTreeOpts, OneBigSwitchOpts, build_fat_tree, build_one_big_switch};
use flowsim_rs::workload::{RandomFlowsOpts, WorkloadSpec, random_flows, simple_flows};
use rand::SeedableRng;
use rand_pcg::Pcg64;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TopologyKind {
    OneBigSwitch,
    FatTree,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FlowsKind {
    Simple,
    Random,
}

#[derive(Debug, Parser)]
#[command(
    name = "flow-sim",
    about = "Flow-level simulation with ECMP routing and max-min fair sharing"
)]
struct Args {
    /// Path to workload.json (overrides --topology / --flows)
    #[arg(long)]
    workload: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = TopologyKind::OneBigSwitch)]
    topology: TopologyKind,

    /// Fat-tree port count
    #[arg(long, default_value_t = 4)]
    k: usize,

    /// Fat-tree pods to build (defaults to k)
    #[arg(long)]
    pods: Option<usize>,

    /// Hosts on the single switch
    #[arg(long, default_value_t = 2)]
    hosts: usize,

    #[arg(long, default_value_t = 100.0)]
    link_bw: f64,

    #[arg(long, value_enum, default_value_t = FlowsKind::Simple)]
    flows: FlowsKind,

    #[arg(long, default_value_t = 3)]
    random_count: usize,

    #[arg(long, default_value_t = 100)]
    max_size: u64,

    #[arg(long, default_value_t = 10.0)]
    time_range: f64,

    /// Seed for ECMP path choice and random flow generation
    #[arg(long)]
    seed: Option<u64>,

    /// Fail the run if any flow cannot be routed
    #[arg(long)]
    strict_routing: bool,

    #[arg(long)]
    max_ticks: Option<u64>,

    /// Write the JSON report here
    #[arg(long)]
    report_json: Option<PathBuf>,

    /// Do not print per-tick lines
    #[arg(long)]
    quiet_ticks: bool,
}

fn build_from_args(args: &Args, rng: &mut Pcg64) -> flowsim_rs::Result<(Network, Vec<FlowDemand>)> {
    let mut net = Network::default();
    match args.topology {
        TopologyKind::OneBigSwitch => {
            let opts = OneBigSwitchOpts {
                hosts: args.hosts,
                link_bw: args.link_bw,
            };
            build_one_big_switch(&mut net, &opts)?;
        }
        TopologyKind::FatTree => {
            let opts = FatTreeOpts {
                k: args.k,
                pods: args.pods.unwrap_or(args.k),
                link_bw: args.link_bw,
            };
            build_fat_tree(&mut net, &opts)?;
        }
    }
    let demands = match args.flows {
        FlowsKind::Simple => simple_flows(&net)?,
        FlowsKind::Random => {
            let opts = RandomFlowsOpts {
                count: args.random_count,
                max_size: args.max_size,
                time_range: args.time_range,
            };
            random_flows(&net, &opts, rng)?
        }
    };
    Ok((net, demands))
}

fn print_report(report: &SimReport, quiet_ticks: bool) {
    if !quiet_ticks {
        for tick in &report.ticks {
            println!(
                "tick index={} time={} running={} completed={}",
                tick.index, tick.time, tick.running, tick.completed
            );
        }
    }
    for c in &report.completions {
        println!(
            "flow_complete flow={} start={} end={} fct={}",
            c.flow.0,
            c.start_time,
            c.completion_time,
            c.duration()
        );
    }
    for f in &report.routing_failures {
        println!(
            "routing_failure flow={} src={} dst={}",
            f.flow.0, f.src.0, f.dst.0
        );
    }
    println!("simulation finished");
    println!("final_time={}", report.final_time);
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();

    let spec = args.workload.as_ref().map(|path| {
        let raw = fs::read_to_string(path).unwrap_or_else(|_| panic!("read {}", path.display()));
        serde_json::from_str::<WorkloadSpec>(&raw)
            .unwrap_or_else(|e| panic!("parse workload.json {}: {e}", path.display()))
    });

    let seed = args
        .seed
        .or_else(|| spec.as_ref().and_then(|s| s.seed))
        .unwrap_or(0);
    // 工作负载生成与选路各用一个随机源，互不影响
    let mut workload_rng = Pcg64::seed_from_u64(seed);

    let built = match &spec {
        Some(spec) => spec.topology.build().and_then(|net| {
            let demands = spec.demands(&net, &mut workload_rng)?;
            Ok((net, demands))
        }),
        None => build_from_args(&args, &mut workload_rng),
    };
    let (net, demands) = match built {
        Ok(v) => v,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    eprintln!(
        "topology: {} nodes={} links={} flows={}",
        net.description(),
        net.node_count(),
        net.link_count(),
        demands.len()
    );

    let cfg = SimConfig {
        seed,
        strict_routing: args.strict_routing,
        max_ticks: args.max_ticks,
        record_ticks: true,
    };
    let report = match Simulation::new(net, &demands, cfg).and_then(|mut sim| sim.run()) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    print_report(&report, args.quiet_ticks);

    if let Some(path) = &args.report_json {
        let json = serde_json::to_string_pretty(&report).expect("serialize report");
        fs::write(path, json).expect("write report json");
        eprintln!("wrote report to {}", path.display());
    }

    ExitCode::SUCCESS
}
