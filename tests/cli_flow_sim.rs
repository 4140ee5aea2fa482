use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "flowsim-rs-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write_file(dir: &PathBuf, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write temp file");
    path
}

fn parse_final_time(stdout: &str) -> f64 {
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("final_time="))
        .expect("final_time line")
        .trim()
        .parse()
        .expect("final_time is a number")
}

#[test]
fn flow_sim_default_run_shares_the_switch_downlink() {
    let output = Command::new(env!("CARGO_BIN_EXE_flow_sim"))
        .output()
        .expect("run flow_sim");
    assert!(
        output.status.success(),
        "flow_sim failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("simulation finished"));
    assert!((parse_final_time(&stdout) - 1.3).abs() < 1e-6);

    let completions: Vec<&str> = stdout
        .lines()
        .filter(|line| line.starts_with("flow_complete "))
        .collect();
    assert_eq!(completions.len(), 2);
    assert!(completions[0].starts_with("flow_complete flow=1 "));
    assert!(completions[1].starts_with("flow_complete flow=0 "));
    assert!(stdout.lines().any(|line| line.starts_with("tick ")));
}

#[test]
fn flow_sim_writes_json_report_for_workload_file() {
    let dir = unique_temp_dir("report");
    let workload = write_file(
        &dir,
        "workload.json",
        r#"
{
    "schema_version": 1,
    "seed": 3,
    "topology": { "kind": "fat_tree", "k": 4 },
    "flows": [
        { "src": 0, "dst": 15, "size": 100, "start": 0 },
        { "src": 1, "dst": 15, "size": 100, "start": 0 }
    ],
    "random": { "count": 6, "max_size": 50, "time_range": 1.0 }
}
        "#,
    );
    let report_path = dir.join("report.json");

    let output = Command::new(env!("CARGO_BIN_EXE_flow_sim"))
        .args([
            "--workload",
            workload.to_str().unwrap(),
            "--report-json",
            report_path.to_str().unwrap(),
            "--quiet-ticks",
        ])
        .output()
        .expect("run flow_sim");
    assert!(
        output.status.success(),
        "flow_sim failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.lines().any(|line| line.starts_with("tick ")));

    let raw = fs::read_to_string(&report_path).expect("report written");
    let report: serde_json::Value = serde_json::from_str(&raw).expect("report is json");
    assert_eq!(report["completions"].as_array().map(Vec::len), Some(8));
    assert_eq!(report["routing_failures"].as_array().map(Vec::len), Some(0));
    let final_time = report["final_time"].as_f64().expect("final_time");
    // 两条流共享主机 15 的下行链路，至少需要 2 秒
    assert!(final_time >= 2.0 - 1e-6);
    assert!(report["tick_count"].as_u64().unwrap_or(0) > 0);

    let _ = fs::remove_dir_all(&dir);
}

fn unreachable_workload(dir: &PathBuf) -> PathBuf {
    write_file(
        dir,
        "unreachable.json",
        r#"
{
    "schema_version": 1,
    "topology": {
        "kind": "explicit",
        "nodes": [ { "id": 0 }, { "id": 1 } ],
        "links": [ { "src": 0, "dst": 1, "bandwidth": 10 } ]
    },
    "flows": [
        { "src": 0, "dst": 1, "size": 10 },
        { "src": 1, "dst": 0, "size": 10 }
    ]
}
        "#,
    )
}

#[test]
fn flow_sim_reports_routing_failures() {
    let dir = unique_temp_dir("unreachable");
    let workload = unreachable_workload(&dir);

    let output = Command::new(env!("CARGO_BIN_EXE_flow_sim"))
        .args(["--workload", workload.to_str().unwrap()])
        .output()
        .expect("run flow_sim");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("routing_failure flow=1 src=1 dst=0"));
    assert!((parse_final_time(&stdout) - 1.0).abs() < 1e-6);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn flow_sim_exits_nonzero_with_strict_routing() {
    let dir = unique_temp_dir("strict");
    let workload = unreachable_workload(&dir);

    let output = Command::new(env!("CARGO_BIN_EXE_flow_sim"))
        .args(["--workload", workload.to_str().unwrap(), "--strict-routing"])
        .output()
        .expect("run flow_sim");
    assert!(
        !output.status.success(),
        "expected non-zero exit, got success"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("no route for flow"),
        "stderr did not contain expected message: {stderr}"
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn flow_sim_rejects_invalid_fat_tree() {
    let output = Command::new(env!("CARGO_BIN_EXE_flow_sim"))
        .args(["--topology", "fat-tree", "--k", "3"])
        .output()
        .expect("run flow_sim");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("fat-tree k must be even"), "{stderr}");
}

#[test]
fn flow_sim_rejects_infinite_time_range() {
    let output = Command::new(env!("CARGO_BIN_EXE_flow_sim"))
        .args(["--flows", "random", "--time-range", "inf"])
        .output()
        .expect("run flow_sim");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("time range must be finite"), "{stderr}");
}
