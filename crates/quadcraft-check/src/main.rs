use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use quadcraft_check::report::{self, CheckReport};
use quadcraft_check::runner::CheckRunner;
use quadcraft_check::scenes;
use quadcraft_core::config::{load_config_from_str, CoreConfig};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    let mut json = false;
    let mut config_path: Option<PathBuf> = None;
    let mut extent: Option<i32> = None;
    let mut radius = 4.0f64;
    let mut iterations = 5u32;
    let mut threads = 0usize;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--json" => json = true,
            "--config" => {
                i += 1;
                config_path = Some(PathBuf::from(arg_value(&args, i, "--config")));
            }
            "--extent" => {
                i += 1;
                extent = Some(parse_arg(&args, i, "--extent"));
            }
            "--radius" => {
                i += 1;
                radius = parse_arg(&args, i, "--radius");
            }
            "--iterations" => {
                i += 1;
                iterations = parse_arg(&args, i, "--iterations");
            }
            "--threads" => {
                i += 1;
                threads = parse_arg(&args, i, "--threads");
            }
            "--help" | "-h" => {
                eprintln!("Usage: quadcraft-check [OPTIONS]");
                eprintln!("  --json               Print the report as JSON");
                eprintln!("  --config <path>      Load CoreConfig from a RON file");
                eprintln!("  --extent <n>         Chunk extent (overrides config)");
                eprintln!("  --radius <r>         Demo blob radius (default: 4)");
                eprintln!("  --iterations <n>     Remesh passes per scene (default: 5)");
                eprintln!("  --threads <n>        Background mesh workers (default: all cores)");
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    let mut config = match config_path {
        Some(path) => {
            let contents = std::fs::read_to_string(&path).unwrap_or_else(|e| {
                eprintln!("failed to read {}: {e}", path.display());
                process::exit(1);
            });
            load_config_from_str(&contents).unwrap_or_else(|e| {
                eprintln!("{}: {e}", path.display());
                process::exit(1);
            })
        }
        None => CoreConfig::default(),
    };
    if let Some(extent) = extent {
        config.chunk_extent = extent;
    }
    if let Err(e) = config.validate() {
        eprintln!("invalid configuration: {e}");
        process::exit(1);
    }

    log::info!("Running integrity checks...");
    let integrity = quadcraft_core::verify_integrity();
    if !integrity.all_passed() {
        if json {
            let report = CheckReport {
                integrity,
                scenes: Vec::new(),
            };
            print_json(&report);
        } else {
            println!("{}", report::format_integrity(&integrity));
        }
        eprintln!("ERROR: integrity checks failed, exiting with code 1");
        process::exit(1);
    }

    let runner = CheckRunner::new(config, iterations, threads);
    let mut results = Vec::new();
    for scene in scenes::standard_scenes(radius) {
        match runner.run_scene(&scene) {
            Ok(result) => results.push(result),
            Err(e) => {
                eprintln!("scene '{}' failed: {e}", scene.name);
                process::exit(1);
            }
        }
    }

    let report = CheckReport {
        integrity,
        scenes: results,
    };
    if json {
        print_json(&report);
    } else {
        println!("\n## Integrity\n");
        println!("{}", report::format_integrity(&report.integrity));
        println!("## Meshing\n");
        println!("{}", report::format_markdown(&report.scenes));
    }

    if !report.passed() {
        eprintln!("ERROR: background meshes disagree with synchronous meshes");
        process::exit(1);
    }
    log::info!("Check complete.");
}

fn arg_value<'a>(args: &'a [String], i: usize, flag: &str) -> &'a str {
    match args.get(i) {
        Some(v) => v,
        None => {
            eprintln!("missing value for {flag}");
            process::exit(1);
        }
    }
}

fn parse_arg<T: FromStr>(args: &[String], i: usize, flag: &str) -> T {
    let raw = arg_value(args, i, flag);
    raw.parse().unwrap_or_else(|_| {
        eprintln!("invalid {flag} value: {raw}");
        process::exit(1);
    })
}

fn print_json(report: &CheckReport) {
    match report::to_json(report) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("failed to serialize report: {e}");
            process::exit(1);
        }
    }
}
