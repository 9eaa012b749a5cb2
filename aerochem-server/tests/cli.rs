use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::process::{Command, Stdio};

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "aerochem-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_lists_airports_to_file() {
    let exe = env!("CARGO_BIN_EXE_aerochem-server");
    let output_path = temp_path("airports");
    let status = Command::new(exe)
        .args(["airports", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available airports"));
    assert!(content.contains("LSZH"));
}

#[test]
fn cli_plays_seeds_with_json_report() {
    let exe = env!("CARGO_BIN_EXE_aerochem-server");
    let output_path = temp_path("play");
    let status = Command::new(exe)
        .args(["play", "--seeds", "1,2", "--report", "json", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    let report: serde_json::Value = serde_json::from_str(&content).expect("json report");
    assert_eq!(report["games"], 2);
    assert_eq!(report["records"][0]["seed"], 1);
}

#[test]
fn cli_rejects_bad_config() {
    let exe = env!("CARGO_BIN_EXE_aerochem-server");
    let config_path = temp_path("config");
    std::fs::write(&config_path, r#"{ "chemical_sites": 2 }"#).expect("write config");
    let output = Command::new(exe)
        .arg("--config")
        .arg(&config_path)
        .args(["play", "--seeds", "1"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid config"));
}

#[test]
fn cli_serves_line_json() {
    let exe = env!("CARGO_BIN_EXE_aerochem-server");
    let mut child = Command::new(exe)
        .args(["serve", "--addr", "127.0.0.1:0", "--seed", "5"])
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn server");

    let stdout = child.stdout.take().expect("server stdout");
    let mut banner = String::new();
    BufReader::new(stdout)
        .read_line(&mut banner)
        .expect("read banner");
    let addr = banner
        .split_whitespace()
        .last()
        .expect("listening address")
        .to_string();

    let mut stream = TcpStream::connect(&addr).expect("connect");
    stream
        .write_all(b"{\"op\":\"newgame\",\"player\":\"cli\"}\n")
        .expect("send request");
    let mut reply = String::new();
    BufReader::new(stream.try_clone().expect("clone stream"))
        .read_line(&mut reply)
        .expect("read reply");
    let _ = child.kill();
    let _ = child.wait();

    let created: serde_json::Value = serde_json::from_str(&reply).expect("json reply");
    assert_eq!(created["name"], "cli");
    assert_eq!(created["location"], "LSZH");
}
