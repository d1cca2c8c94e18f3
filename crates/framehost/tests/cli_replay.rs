#![cfg(feature = "cli")]

use std::path::PathBuf;
use std::process::{Command, Output};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "framehost-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn framehost(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_framehost"))
        .arg("--log-level")
        .arg("error")
        .args(args)
        .output()
        .expect("framehost should run")
}

fn json_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).expect("stdout line should be json"))
        .collect()
}

const TWO_FRAMES: &str = r#"{
    "windows": [
        { "name": "ad-a" },
        { "name": "ad-a-inner", "parent": "ad-a" },
        { "name": "ad-b" },
        { "name": "rogue" }
    ],
    "frames": [
        { "window": "ad-a", "rect": { "top": 100, "width": 300, "height": 250 } },
        { "window": "ad-b", "rect": { "top": 600, "width": 728, "height": 90 } }
    ],
    "viewport": { "width": 1280, "height": 720 },
    "overlay_container": { "width": 1280, "height": 720 },
    "pending": [
        { "from": "ad-a-inner", "origin": "https://a.example",
          "message": { "type": "send-positions", "sentinel": "sa" } }
    ],
    "messages": [
        { "from": "ad-b", "origin": "https://b.example",
          "message": { "type": "full-overlay-frame", "sentinel": "sb" } },
        { "from": "rogue", "origin": "https://evil.example",
          "message": { "type": "send-positions", "sentinel": "sr" } },
        { "from": "ad-a", "origin": "https://a.example", "data": "not for us" },
        { "from": "ad-a", "origin": "https://a.example",
          "message": { "type": "send-positions", "sentinel": "sa" } }
    ],
    "updates": [
        { "window": "ad-a", "rect": { "top": 50, "width": 300, "height": 250 } }
    ]
}"#;

#[test]
fn replay_answers_trusted_frames_only() {
    let dir = unique_temp_dir("replay");
    let scenario = dir.join("page.json");
    std::fs::write(&scenario, TWO_FRAMES).expect("scenario should be writable");

    let output = framehost(&["--format", "json", "replay", scenario.to_str().unwrap()]);
    assert!(
        output.status.success(),
        "replay failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let lines = json_lines(&output);
    let (summary, outbound) = lines.split_last().expect("summary line should be printed");
    assert_eq!(summary["processed"], 5);
    assert_eq!(summary["accepted"], 3);
    assert_eq!(summary["subscriptions"], 1);
    assert_eq!(summary["outbound"], 4);

    for msg in outbound {
        match msg["window"].as_str().unwrap() {
            "ad-a-inner" | "ad-a" => {
                assert_eq!(msg["origin"], "https://a.example");
                assert_eq!(msg["sentinel"], "sa");
            }
            "ad-b" => {
                assert_eq!(msg["origin"], "https://b.example");
                assert_eq!(msg["type"], "full-overlay-frame-response");
                assert_eq!(msg["payload"]["success"], true);
                assert_eq!(msg["payload"]["boxRect"]["width"], 1280.0);
            }
            other => panic!("unexpected recipient {other}"),
        }
    }
    let last = outbound.last().unwrap();
    assert_eq!(last["type"], "position");
    assert_eq!(last["payload"]["targetRect"]["top"], 50.0);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn replay_missing_scenario_fails() {
    let dir = unique_temp_dir("missing");
    let output = framehost(&["replay", dir.join("absent.json").to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn replay_invalid_scenario_returns_60() {
    let dir = unique_temp_dir("invalid");
    let scenario = dir.join("page.json");
    std::fs::write(&scenario, r#"{ "frames": [{ "window": "missing" }] }"#)
        .expect("scenario should be writable");

    let output = framehost(&["replay", scenario.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(60));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn decode_prints_envelope() {
    let output = framehost(&[
        "--format",
        "json",
        "decode",
        r#"amp-{"type":"position","sentinel":"s1","targetRect":{"top":3}}"#,
    ]);
    assert!(output.status.success());
    let lines = json_lines(&output);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["type"], "position");
    assert_eq!(lines[0]["known"], true);
    assert_eq!(lines[0]["sentinel"], "s1");
    assert_eq!(lines[0]["payload"]["targetRect"]["top"], 3);
}

#[test]
fn decode_rejects_foreign_data_with_60() {
    let output = framehost(&["decode", "hello world"]);
    assert_eq!(output.status.code(), Some(60));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("prefix"), "stderr was: {stderr}");
}

#[test]
fn kinds_lists_every_message_kind() {
    let output = framehost(&["--format", "raw", "kinds"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let kinds: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        kinds,
        vec![
            "send-positions",
            "full-overlay-frame",
            "cancel-full-overlay-frame",
            "position",
            "full-overlay-frame-response",
            "cancel-full-overlay-frame-response",
        ]
    );
}

#[test]
fn version_reports_package_version() {
    let output = framehost(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        format!("framehost {}", env!("CARGO_PKG_VERSION"))
    );
}
