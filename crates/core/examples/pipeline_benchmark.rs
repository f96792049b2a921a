//! Lightweight parse/highlight/emit/expand benchmark harness for local baselines.
//!
//! Run from repository root:
//! `cargo run -p url_template_core --example pipeline_benchmark --release`

use std::time::Instant;

use url_template_core::highlight::highlight_file;
use url_template_core::{Bindings, emit_file, expand_line, parse_str};

/// Synthetic template file: `lines` templates cycling through every
/// component shape, with a malformed line every tenth line.
fn sample(lines: usize) -> String {
    let shapes = [
        "https://api.{env}.example.com:8443/v1/users/{id}?limit={n}&active=true",
        "localhost:3000/health",
        "/users/:user/posts/{post}/comments?page={page}&sort=desc",
        "{{baseUrl}}/items/{{itemId}}?expand=owner",
        "ws://10.0.0.1:9000/socket?token={token}",
        "http://cdn.example.com/assets/user-{id}.png",
        "/search?q=hello world&lang={lang}",
        "ftp://files.example.org/pub/{path}",
        "?a&b=&c={c}",
        "host:99999/a//b?x=&{broken",
    ];
    let mut out = String::new();
    for i in 0..lines {
        out.push_str(shapes[i % shapes.len()]);
        out.push('\n');
    }
    out
}

fn per_iter_ms(elapsed: std::time::Duration, iterations: usize) -> f64 {
    elapsed.as_secs_f64() * 1000.0 / iterations as f64
}

fn run_benchmark(label: &str, input: &str, iterations: usize) {
    let parse_start = Instant::now();
    for _ in 0..iterations {
        let _ = parse_str(input);
    }
    let parse_elapsed = parse_start.elapsed();

    let parse_once = parse_str(input);

    let highlight_start = Instant::now();
    for _ in 0..iterations {
        let _ = highlight_file(&parse_once.file);
    }
    let highlight_elapsed = highlight_start.elapsed();

    let emit_start = Instant::now();
    for _ in 0..iterations {
        let _ = emit_file(&parse_once.file);
    }
    let emit_elapsed = emit_start.elapsed();

    let mut bindings = Bindings::default();
    for name in ["env", "id", "n", "post", "page", "token", "lang", "path"] {
        bindings.set_variable(name, "x");
    }
    bindings.set_path_param("user", "42");
    let expand_start = Instant::now();
    for _ in 0..iterations {
        for line in &parse_once.file.lines {
            let _ = expand_line(line, &bindings);
        }
    }
    let expand_elapsed = expand_start.elapsed();

    println!("Benchmark: {label}");
    println!(
        "  input_bytes: {}, lines: {}, diagnostics: {}",
        input.len(),
        parse_once.file.lines.len(),
        parse_once.diagnostics.len()
    );
    for (name, elapsed) in [
        ("parse", parse_elapsed),
        ("highlight", highlight_elapsed),
        ("emit", emit_elapsed),
        ("expand", expand_elapsed),
    ] {
        println!(
            "  {name:<10} total={:?}, per_iter={:.3} ms",
            elapsed,
            per_iter_ms(elapsed, iterations)
        );
    }
}

fn main() {
    let iterations = std::env::var("URLT_BENCH_ITERS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(500);

    for (label, lines) in [("small", 10), ("medium", 1_000), ("large", 10_000)] {
        run_benchmark(label, &sample(lines), iterations);
    }
}
