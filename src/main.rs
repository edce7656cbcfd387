use startboard::board::Board;
use startboard::config::LayoutConfig;
use std::env;
use std::fs;
use std::process;
use tracing_subscriber::EnvFilter;

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <state.json> [options]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o, --output <file>     Output file (default: stdout)");
    eprintln!("  -W, --max-width <px>    Usable canvas width for placement (default: 1200)");
    eprintln!("  -c, --config <file>     Layout config JSON (partial overrides allowed)");
    eprintln!("      --add <name>        Create a category and place it in free space (repeatable)");
    eprintln!("      --repair            Re-place categories that overlap earlier ones");
    eprintln!("      --check             Report overlapping categories, exit 1 if any");
    process::exit(1);
}

fn read_file(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read {}: {}", path, e);
            process::exit(1);
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        usage(&args[0]);
    }

    let input_path = &args[1];
    let mut output_path: Option<String> = None;
    let mut max_width: i64 = 1200;
    let mut config_path: Option<String> = None;
    let mut additions: Vec<String> = Vec::new();
    let mut repair = false;
    let mut check = false;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "-o" | "--output" => {
                i += 1;
                if i < args.len() {
                    output_path = Some(args[i].clone());
                }
            }
            "-W" | "--max-width" => {
                i += 1;
                if i < args.len() {
                    max_width = args[i].parse().unwrap_or_else(|_| {
                        eprintln!("Invalid width: {}", args[i]);
                        process::exit(1);
                    });
                }
            }
            "-c" | "--config" => {
                i += 1;
                if i < args.len() {
                    config_path = Some(args[i].clone());
                }
            }
            "--add" => {
                i += 1;
                if i < args.len() {
                    additions.push(args[i].clone());
                }
            }
            "--repair" => repair = true,
            "--check" => check = true,
            "-h" | "--help" => usage(&args[0]),
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let config = match config_path {
        Some(path) => match LayoutConfig::from_json(&read_file(&path)) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Invalid config {}: {}", path, e);
                process::exit(1);
            }
        },
        None => LayoutConfig::default(),
    };

    let input = read_file(input_path);
    let mut board = match Board::from_json(&input, config) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Failed to load {}: {}", input_path, e);
            process::exit(1);
        }
    };

    if repair {
        let moved = board.repair(max_width);
        tracing::info!(moved, "repaired layout");
    }

    for name in &additions {
        if let Err(e) = board.add_category(name, max_width) {
            eprintln!("Cannot add {:?}: {}", name, e);
            process::exit(1);
        }
    }

    if check {
        let overlaps = board.overlaps();
        for (a, b) in &overlaps {
            eprintln!("Overlap: {} <-> {}", a, b);
        }
        if !overlaps.is_empty() {
            process::exit(1);
        }
        if output_path.is_none() && additions.is_empty() && !repair {
            return;
        }
    }

    let json = match board.to_json() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to serialize state: {}", e);
            process::exit(1);
        }
    };

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &json) {
                eprintln!("Failed to write {}: {}", path, e);
                process::exit(1);
            }
        }
        None => println!("{}", json),
    }
}
