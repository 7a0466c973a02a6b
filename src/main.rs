extern crate clap;
use clap::{App, Arg, ArgMatches, SubCommand};
use log::info;
use num_bigint::BigInt;
use plurality::dealer::create_share_records;
use plurality::math::{MAX_BASE, MIN_BASE};
use plurality::{reconstruct_secret_from_file, Reconstruction, DEFAULT_MAX_COMBINATIONS};
use std::error::Error;
use std::fs::write;

/// The subcommand to reconstruct secrets.
const RECONSTRUCT_SUBCOMMAND: &str = "reconstruct";

/// The subcommand to create share records.
const SPLIT_SUBCOMMAND: &str = "split";

/// The input files that are processed if no file is provided.
const DEFAULT_INPUT_FILES: [&str; 2] = ["input1.json", "input2.json"];

/// The default base for encoding shares.
const DEFAULT_BASE: &str = "10";

/// The function parses the command-line arguments.
fn parse_command_line<'a>() -> ArgMatches<'a> {
    // Extract the version from the Cargo.toml file.
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

    // The reconstruct subcommand.
    let reconstruct_subcommand = SubCommand::with_name(RECONSTRUCT_SUBCOMMAND)
        .about("Reconstructs the secret of each input file")
        .arg(
            Arg::with_name("files") // The input files.
                .multiple(true)
                .index(1)
                .help("Sets the JSON input files (default: input1.json input2.json)"),
        )
        .arg(
            Arg::with_name("max-combinations") // The bound on the number of combinations.
                .takes_value(true)
                .short("m")
                .long("max-combinations")
                .help("Sets the maximum number of share combinations per file"),
        );

    // The split subcommand.
    let split_subcommand = SubCommand::with_name(SPLIT_SUBCOMMAND)
        .about("Creates share records for a secret")
        .arg(
            Arg::with_name("secret") // The secret to share.
                .required(true)
                .takes_value(true)
                .short("s")
                .long("secret")
                .help("Sets the secret (a non-negative integer)"),
        )
        .arg(
            Arg::with_name("num-shares") // The total number of shares.
                .required(true)
                .takes_value(true)
                .short("n")
                .long("num-shares")
                .help("Sets the total number of shares to the given value"),
        )
        .arg(
            Arg::with_name("threshold") // The threshold for reconstruction.
                .required(true)
                .takes_value(true)
                .short("t")
                .long("threshold")
                .help("Sets the threshold to the given value"),
        )
        .arg(
            Arg::with_name("base") // The base of the encoded share values.
                .takes_value(true)
                .short("b")
                .long("base")
                .default_value(DEFAULT_BASE)
                .help("Sets the base used to encode the share values"),
        )
        .arg(
            Arg::with_name("corrupt") // The number of corrupted shares.
                .takes_value(true)
                .short("c")
                .long("corrupt")
                .default_value("0")
                .help("Corrupts the given number of randomly chosen shares"),
        )
        .arg(
            Arg::with_name("file") // The output file.
                .takes_value(true)
                .short("f")
                .long("file")
                .help("Writes the share records to the provided file"),
        );

    // The application including the top-level arguments.
    App::new("plurality")
        .version(VERSION)
        .author(AUTHORS)
        .about("A tool to reconstruct secret-shared integers from possibly corrupted shares.")
        .arg(
            Arg::with_name("verbose") // Verbose output can be enabled.
                .short("v")
                .long("verbose")
                .help("Prints verbose output")
                .takes_value(false),
        )
        .subcommand(reconstruct_subcommand)
        .subcommand(split_subcommand)
        .get_matches()
}

/// The function initializes the logger. `RUST_LOG` takes precedence over the verbose flag.
fn init_logger(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn print_reconstruction(reconstruction: &Reconstruction) {
    println!("Result: {}", reconstruction.secret);
    println!(
        "  {} of {} combinations agree ({} skipped)",
        reconstruction.votes,
        reconstruction.total_combinations,
        reconstruction.skipped_combinations
    );
    for vote in reconstruction.dissent() {
        println!("  Dissenting secret: {}", vote);
    }
}

/// The function processes every input file independently and returns the number of failures.
fn handle_reconstruct(command_line: &ArgMatches) -> Result<usize, Box<dyn Error>> {
    let max_combinations = match command_line.value_of("max-combinations") {
        Some(value) => value.parse::<u64>()?,
        None => DEFAULT_MAX_COMBINATIONS,
    };
    let files: Vec<&str> = match command_line.values_of("files") {
        Some(files) => files.collect(),
        None => DEFAULT_INPUT_FILES.to_vec(),
    };
    let mut num_failures = 0;
    for file in files {
        println!("Processing {}:", file);
        match reconstruct_secret_from_file(file, max_combinations) {
            Ok(reconstruction) => print_reconstruction(&reconstruction),
            Err(err) => {
                println!("Failed to process {}: {}", file, err);
                num_failures += 1;
            }
        }
        println!("---");
    }
    Ok(num_failures)
}

fn handle_split(command_line: &ArgMatches) -> Result<(), Box<dyn Error>> {
    // The unwrap() calls are okay because these arguments are required or have defaults.
    let secret = command_line
        .value_of("secret")
        .unwrap()
        .parse::<BigInt>()?;
    let num_shares = command_line
        .value_of("num-shares")
        .unwrap()
        .parse::<usize>()?;
    let threshold = command_line
        .value_of("threshold")
        .unwrap()
        .parse::<usize>()?;
    let base = command_line.value_of("base").unwrap().parse::<u32>()?;
    if !(MIN_BASE..=MAX_BASE).contains(&base) {
        return Err(format!("The base must be between {} and {}.", MIN_BASE, MAX_BASE).into());
    }
    let num_corrupted = command_line
        .value_of("corrupt")
        .unwrap()
        .parse::<usize>()?;
    let records = create_share_records(&secret, threshold, num_shares, base, num_corrupted)?;
    let output = serde_json::to_string_pretty(&records)?;
    match command_line.value_of("file") {
        Some(file_path) => {
            write(file_path, output)?;
            info!("Wrote {} share records to {}.", num_shares, file_path);
        }
        None => println!("{}", output),
    }
    Ok(())
}

/// The main function uses the command-line arguments to trigger the right command execution.
fn main() {
    let command_line = parse_command_line();
    init_logger(command_line.is_present("verbose"));
    let success = match command_line.subcommand() {
        (RECONSTRUCT_SUBCOMMAND, Some(matches)) => match handle_reconstruct(matches) {
            Ok(num_failures) => num_failures == 0,
            Err(err) => {
                println!("Error: {}", err);
                false
            }
        },
        (SPLIT_SUBCOMMAND, Some(matches)) => match handle_split(matches) {
            Ok(()) => true,
            Err(err) => {
                println!("Error: {}", err);
                false
            }
        },
        _ => {
            println!("Error: A subcommand must be provided. Use --help to view options.");
            false
        }
    };
    if !success {
        std::process::exit(1);
    }
}
