use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn make_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before UNIX_EPOCH")
        .as_nanos();
    let pid = std::process::id();
    let dir = std::env::temp_dir().join(format!("cmltime-integ-{prefix}-{pid}-{nanos}"));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn cmltime() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cmltime"));
    cmd.env_remove("TIME").env_remove("RUST_LOG");
    cmd
}

/// Something harmless and always available to time: the binary itself.
fn child() -> &'static str {
    env!("CARGO_BIN_EXE_cmltime")
}

#[test]
fn help_works() {
    let out = cmltime()
        .arg("--help")
        .output()
        .expect("failed to run cmltime --help");
    assert!(
        out.status.success(),
        "cmltime --help failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        String::from_utf8_lossy(&out.stderr),
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("Usage: cmltime")
            && stdout.contains("-f, --format <FORMAT>")
            && stdout.contains("[COMMAND]..."),
        "unexpected help output:\n{stdout}"
    );
}

#[test]
fn missing_command_is_a_usage_error() {
    let out = cmltime().output().expect("failed to run cmltime");
    assert_eq!(
        out.status.code(),
        Some(2),
        "stderr:\n{}",
        String::from_utf8_lossy(&out.stderr)
    );
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("missing command"), "stderr:\n{stderr}");
}

#[test]
fn unknown_option_prints_error_and_help() {
    let out = cmltime()
        .args(["--bogus", "x"])
        .output()
        .expect("failed to run cmltime");
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("error: unknown option") && stderr.contains("--bogus"),
        "stderr:\n{stderr}"
    );
    assert!(stderr.contains("Usage: cmltime"), "stderr:\n{stderr}");
}

#[test]
fn portable_report_goes_to_output_file() {
    let dir = make_temp_dir("portable");
    let report = dir.join("time.txt");

    let out = cmltime()
        .arg("-po")
        .arg(&report)
        .arg("--")
        .arg(child())
        .arg("--help")
        .output()
        .expect("failed to run cmltime");
    assert!(
        out.status.success(),
        "cmltime -p failed:\nstatus: {}\nstderr:\n{}",
        out.status,
        String::from_utf8_lossy(&out.stderr),
    );

    let text = fs::read_to_string(&report).expect("report file not written");
    assert!(text.starts_with("real "), "unexpected report: {text}");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn append_keeps_previous_reports() {
    let dir = make_temp_dir("append");
    let report = dir.join("time.txt");

    for _ in 0..2 {
        let out = cmltime()
            .args(["-a", "-f", "%x %C", "-o"])
            .arg(&report)
            .arg("--")
            .arg(child())
            .arg("--help")
            .output()
            .expect("failed to run cmltime");
        assert!(
            out.status.success(),
            "stderr:\n{}",
            String::from_utf8_lossy(&out.stderr)
        );
    }

    let text = fs::read_to_string(&report).expect("report file not written");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2, "unexpected report: {text}");
    assert!(lines.iter().all(|l| l.starts_with("0 ") && l.ends_with("--help")));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn format_defaults_to_time_env_var() {
    let dir = make_temp_dir("env");
    let report = dir.join("time.txt");

    let out = cmltime()
        .env("TIME", "took %e")
        .arg("-o")
        .arg(&report)
        .arg("--")
        .arg(child())
        .arg("--help")
        .output()
        .expect("failed to run cmltime");
    assert!(out.status.success());

    let text = fs::read_to_string(&report).expect("report file not written");
    assert!(text.starts_with("took "), "unexpected report: {text}");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn describe_prints_schema() {
    let out = cmltime()
        .arg("--describe")
        .output()
        .expect("failed to run cmltime --describe");
    assert!(out.status.success());
    let schema: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("schema is not JSON");
    assert_eq!(schema["program"], "cmltime");
    let names: Vec<&str> = schema["parameters"]
        .as_array()
        .expect("parameters array")
        .iter()
        .filter_map(|p| p["name"].as_str())
        .collect();
    assert!(names.contains(&"format") && names.contains(&"command"));
}
