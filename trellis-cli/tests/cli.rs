use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const DECODE: &str = "xyxzzxyxyy
--------
x   y   z
--------
A   B
--------
    A   B
A   0.641   0.359
B   0.729   0.271
--------
    x   y   z
A   0.117   0.691   0.192
B   0.097   0.42    0.483
";

const WEATHER: &str = "xyxz
--------
x y z
--------
A B
--------
    A   B
A   0.86    0.14
B   0.41    0.59
--------
    x   y   z
A   0.669   0.312   0.02
B   0.467   0.295   0.238
";

const PATH: &str = "ABABBBAAAA
--------
A B
--------
    A   B
A   0.377   0.623
B   0.26    0.74
";

const EMISSION: &str = "zzzyxyyzzx
--------
x   y   z
--------
BAAAAAAAAB
--------
A   B
--------
    x   y   z
A   0.176   0.596   0.228
B   0.225   0.572   0.203
";

fn write_input(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn trellis(args: &[&str], input: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_trellis"))
        .env_remove("RUST_LOG")
        .args(args)
        .arg(input)
        .output()
        .unwrap()
}

fn stdout_line(output: &Output) -> String {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap().trim_end().to_string()
}

#[test]
fn viterbi_prints_decoded_path() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "decode.txt", DECODE);
    let output = trellis(&["viterbi"], &input);
    assert_eq!(stdout_line(&output), "AAABBAAAAA");
}

#[test]
fn path_probability_prints_plain_decimal() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "path.txt", PATH);
    let line = stdout_line(&trellis(&["path-prob"], &input));
    assert!(!line.contains('e'), "unexpected notation: {line}");
    let p: f64 = line.parse().unwrap();
    assert!((p - 0.000384928691755).abs() < 1e-15);
}

#[test]
fn emission_probability_prints_scientific_notation() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "emission.txt", EMISSION);
    let line = stdout_line(&trellis(&["emission-prob"], &input));
    assert!(line.contains("e-6"), "unexpected notation: {line}");
    let p: f64 = line.parse().unwrap();
    assert!((p - 4.599063341926444e-06).abs() < 1e-16);
}

#[test]
fn forward_prints_likelihood() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "forward.txt", DECODE);
    let line = stdout_line(&trellis(&["forward"], &input));
    let p: f64 = line.parse().unwrap();
    assert!(p > 0.0 && p < 1.0);
}

#[test]
fn output_flag_writes_file() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "decode.txt", DECODE);
    let out = dir.path().join("decoded.txt");
    let output = trellis(&["viterbi", "--output", out.to_str().unwrap()], &input);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert_eq!(fs::read_to_string(&out).unwrap(), "AAABBAAAAA\n");
}

#[test]
fn unknown_symbol_exits_with_error() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "bad.txt", &DECODE.replacen("xyxzzxyxyy", "xyq", 1));
    let output = trellis(&["viterbi"], &input);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown symbol 'q'"), "stderr: {stderr}");
}

#[test]
fn malformed_document_exits_with_error() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "short.txt", "xyxz\n--------\nx y z\n");
    let output = trellis(&["forward"], &input);
    assert!(!output.status.success());
}

#[test]
fn tolerance_flag_controls_row_sum_warnings() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir, "weather.txt", WEATHER);

    let output = trellis(&["viterbi"], &input);
    assert_eq!(stdout_line(&output), "AAAB");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("emission row 'A' sums to"), "stderr: {stderr}");

    let output = trellis(&["viterbi", "--tolerance", "0.01"], &input);
    assert_eq!(stdout_line(&output), "AAAB");
    assert!(!String::from_utf8_lossy(&output.stderr).contains("sums to"));
}
