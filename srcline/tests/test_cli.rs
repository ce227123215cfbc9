#![cfg(unix)]

use std::fs;
use std::process::Command;

fn srcline() -> Command {
    Command::new(env!("CARGO_BIN_EXE_srcline"))
}

#[test]
fn test_missing_input_is_usage_error() {
    let output = srcline().arg("0x1000").output().expect("Failed to run srcline");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Missing required argument"));
}

#[test]
fn test_missing_image_is_error() {
    let output = srcline()
        .args(["--image", "/nonexistent/demo", "0x1000"])
        .output()
        .expect("Failed to run srcline");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Image not found"));
}

#[test]
fn test_frames_file_through_mock_resolver() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("resolver.sh");
    fs::write(
        &script,
        "if [ \"$1\" = \"--help\" ]; then exit 0; fi\n\
         while read addr; do echo \"handler at /src/server.rs:77\"; done\n",
    )
    .unwrap();

    let frames = dir.path().join("frames.json");
    fs::write(
        &frames,
        r#"[
            {"raw_address": 4096, "image_relative_address": 4096,
             "owning_image_path": "/usr/bin/server", "known_symbol": null},
            {"raw_address": 8192, "image_relative_address": 8192,
             "owning_image_path": "", "known_symbol": "orphan"}
        ]"#,
    )
    .unwrap();

    let output = srcline()
        .arg("--frames")
        .arg(&frames)
        .args(["--flavor", "addr2line", "--resolver", "/bin/sh", "--resolver-arg"])
        .arg(&script)
        .args(["--format", "json"])
        .output()
        .expect("Failed to run srcline");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).expect("Invalid JSON");
    let frames = parsed["frames"].as_array().unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0]["symbol"], "handler");
    assert_eq!(frames[0]["file"], "/src/server.rs");
    assert_eq!(frames[0]["line"], 77);
    assert_eq!(frames[1]["symbol"], "orphan");
    assert_eq!(frames[1]["address"], "0x2000");
}

#[test]
fn test_unavailable_resolver_warns_and_passes_through() {
    let dir = tempfile::tempdir().unwrap();
    let frames = dir.path().join("frames.json");
    fs::write(
        &frames,
        r#"[{"raw_address": 16, "image_relative_address": 16,
             "owning_image_path": "/usr/bin/demo", "known_symbol": "main"}]"#,
    )
    .unwrap();

    let output = srcline()
        .arg("--frames")
        .arg(&frames)
        .args(["--resolver", "/nonexistent/addr2line"])
        .output()
        .expect("Failed to run srcline");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("not available"));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("main"));
    assert!(stdout.contains("at /usr/bin/demo"));
}
