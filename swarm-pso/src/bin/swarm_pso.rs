use std::path::PathBuf;
use std::str::FromStr;

use swarm_pso::{Backend, ObjectiveKind, OverflowPolicy, RunConfig};
use tracing_subscriber::EnvFilter;

fn usage() -> ! {
    eprintln!(
        "Usage: swarm_pso [OPTIONS] [num_particles dimensions function max_iterations]"
    );
    eprintln!();
    eprintln!("Functions: sphere (f1), rosenbrock, matyas (f2; always 2-D on [-10, 10])");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <file.json>          load a (partial) run configuration");
    eprintln!("  --backend float|fixed         numeric backend (default: float)");
    eprintln!("  --seed <u64>                  random seed (default: 42)");
    eprintln!("  --bounds <lo> <hi>            initial sampling domain (default: -5 5)");
    eprintln!("  --overflow wrap|saturate|fail fixed-point overflow policy (default: wrap)");
    eprintln!("  --trajectory <out.ndjson>     write every iteration to a trajectory file");
    eprintln!("  --help                        print this message");
    eprintln!();
    eprintln!("Example:");
    eprintln!("  swarm_pso --backend fixed --trajectory run.ndjson 30 2 rosenbrock 500");
    std::process::exit(2);
}

fn parse<T: FromStr>(flag: &str, value: Option<String>) -> T {
    let Some(value) = value else {
        eprintln!("error: {flag} needs a value");
        usage();
    };
    match value.parse() {
        Ok(v) => v,
        Err(_) => {
            eprintln!("error: invalid value `{value}` for {flag}");
            usage();
        }
    }
}

fn parse_overflow(value: Option<String>) -> OverflowPolicy {
    match value.as_deref() {
        Some("wrap") => OverflowPolicy::Wrap,
        Some("saturate") => OverflowPolicy::Saturate,
        Some("fail") => OverflowPolicy::Fail,
        other => {
            eprintln!("error: invalid value {other:?} for --overflow");
            usage();
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let mut config_path: Option<PathBuf> = None;
    let mut backend: Option<Backend> = None;
    let mut seed: Option<u64> = None;
    let mut bounds: Option<(f64, f64)> = None;
    let mut overflow: Option<OverflowPolicy> = None;
    let mut trajectory: Option<PathBuf> = None;
    let mut positional = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => usage(),
            "--config" => config_path = Some(parse("--config", args.next())),
            "--backend" => backend = Some(parse("--backend", args.next())),
            "--seed" => seed = Some(parse("--seed", args.next())),
            "--bounds" => {
                let lo = parse("--bounds", args.next());
                let hi = parse("--bounds", args.next());
                bounds = Some((lo, hi));
            }
            "--overflow" => overflow = Some(parse_overflow(args.next())),
            "--trajectory" => trajectory = Some(parse("--trajectory", args.next())),
            flag if flag.starts_with("--") => {
                eprintln!("error: unknown option {flag}");
                usage();
            }
            _ => positional.push(arg),
        }
    }

    let mut config = match &config_path {
        Some(path) => match RunConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("error: {e}");
                std::process::exit(2);
            }
        },
        None => RunConfig::default(),
    };

    match positional.len() {
        0 => {
            if config_path.is_none() {
                println!(
                    "Using defaults: {} particles, {} dimensions, {} function, {} iterations",
                    config.num_particles, config.dimensions, config.objective, config.max_iterations
                );
            }
        }
        4 => {
            config.num_particles = parse("num_particles", positional.first().cloned());
            config.dimensions = parse("dimensions", positional.get(1).cloned());
            config.objective = match ObjectiveKind::from_str(&positional[2]) {
                Ok(objective) => objective,
                Err(e) => {
                    tracing::warn!("{e}; using sphere");
                    ObjectiveKind::Sphere
                }
            };
            config.max_iterations = parse("max_iterations", positional.get(3).cloned());
        }
        _ => usage(),
    }

    if let Some(backend) = backend {
        config.backend = backend;
    }
    if let Some(seed) = seed {
        config.seed = seed;
    }
    if let Some((lo, hi)) = bounds {
        config.lower_bound = lo;
        config.upper_bound = hi;
    }
    if let Some(overflow) = overflow {
        config.overflow = overflow;
    }
    if trajectory.is_some() {
        config.trajectory = trajectory;
    }

    let report = match swarm_pso::run(&config) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    println!("Best score: {}", report.best_score);
    println!("Best position: {:?}", report.best_position);
    match report.best_iteration {
        Some(iteration) => println!(
            "Found at iteration {iteration} after {:.3} ms",
            report.time_to_best.as_secs_f64() * 1e3
        ),
        None => println!("Found during initialization"),
    }
    if report.overflows > 0 {
        println!("Overflows absorbed ({:?}): {}", config.overflow, report.overflows);
    }
    if let (Some(path), Some(digest)) = (&config.trajectory, &report.trajectory_digest) {
        println!("Trajectory: {} (sha256 {digest})", path.display());
    }
}
