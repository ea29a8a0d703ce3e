use std::fs;
use std::path::Path;
use std::process;

use anyhow::Result;
use clap::{ArgMatches, Command};

const BINARY_NAME: &str = "fsr";

fn main() -> Result<()> {
    let args = clap::command!()
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(Command::new("install").about("Install the fsr binary locally"))
        .subcommand(
            Command::new("run")
                .about("Build and run fsr with arguments")
                .trailing_var_arg(true)
                .allow_hyphen_values(true)
                .arg(clap::Arg::new("args")
                    .help("Arguments to pass to fsr")
                    .action(clap::ArgAction::Append)
                    .num_args(0..))
        )
        .subcommand(
            Command::new("test")
                .about("Test Operations")
                .subcommand(Command::new("all").about("Run every test suite"))
                .subcommand(Command::new("core").about("Run tests for fsr-core"))
                .subcommand(Command::new("bin").about("Run tests for fsr-bin"))
                .subcommand(Command::new("integration").about("Smoke test the built fsr binary"))
        )
        .get_matches();

    match args.subcommand() {
        Some(("install", _args)) => install(),
        Some(("run", args)) => run(args),
        Some(("test", args)) => handle_test_commands(args),
        Some((command, _)) => anyhow::bail!("Unexpected command: {command}"),
        None => anyhow::bail!("Expected subcommand"),
    }
}

fn install() -> Result<()> {
    println!("Installing {BINARY_NAME}...");
    cargo(&["install", "--path", "crates/fsr-bin"], "Failed to install fsr")?;
    println!("✓ {BINARY_NAME} installed successfully");
    Ok(())
}

fn run(args: &ArgMatches) -> Result<()> {
    let run_args: Vec<String> = args.get_many::<String>("args")
        .map_or(Vec::new(), |vals| vals.cloned().collect());

    let mut command = vec!["run", "--bin", BINARY_NAME, "--"];
    command.extend(run_args.iter().map(String::as_str));

    cargo(&command, "Failed to run fsr")
}

fn handle_test_commands(args: &ArgMatches) -> Result<()> {
    match args.subcommand() {
        Some(("all", _args)) => test_all(),
        Some(("core", _args)) => cargo(&["test", "--package", "fsr-core"], "Core tests failed"),
        Some(("bin", _args)) => cargo(&["test", "--package", "fsr-bin"], "Binary tests failed"),
        Some(("integration", _args)) => test_integration(),
        _ => {
            println!("Available test commands:");
            println!("  all          - Run every test suite");
            println!("  core         - Run tests for fsr-core");
            println!("  bin          - Run tests for fsr-bin");
            println!("  integration  - Smoke test the built fsr binary");
            Ok(())
        }
    }
}

fn test_all() -> Result<()> {
    let suites: [(&str, fn() -> Result<()>); 3] = [
        ("workspace", || cargo(&["test", "--workspace"], "Workspace tests failed")),
        ("documentation", || cargo(&["test", "--doc", "--package", "fsr-core"], "Documentation tests failed")),
        ("integration", test_integration),
    ];

    let mut failed = Vec::new();
    for (name, suite) in suites {
        println!("🧪 Running {name} tests...");
        match suite() {
            Ok(()) => println!("✅ {name} tests passed\n"),
            Err(err) => {
                println!("❌ {name} tests failed: {err:?}\n");
                failed.push(name);
            }
        }
    }

    if !failed.is_empty() {
        anyhow::bail!("Test suites failed: {}", failed.join(", "));
    }

    println!("🎉 All tests passed successfully!");
    Ok(())
}

fn test_integration() -> Result<()> {
    cargo(&["build", "--bin", BINARY_NAME], "Failed to build fsr binary")?;
    cargo(&["run", "--bin", BINARY_NAME, "--", "--help"], "CLI help command failed")?;
    cargo(&["run", "--bin", BINARY_NAME, "--", "--version"], "CLI version command failed")?;

    let fixture = std::env::temp_dir().join("fsr-xtask-smoke");
    if fixture.exists() {
        fs::remove_dir_all(&fixture)?;
    }
    let reference = fixture.join("my_folder");
    fs::create_dir_all(reference.join("WordToReplace"))?;
    fs::write(reference.join("WordToReplace/WordToReplace.txt"), "Hello wordtoreplace world")?;
    let pairs = fixture.join("map_file.txt");
    fs::write(&pairs, "WordToReplace,NewWord\n")?;
    let destination = fixture.join("out");

    let (reference, pairs, destination) = (path_arg(&reference)?, path_arg(&pairs)?, path_arg(&destination)?);
    cargo(
        &["run", "--bin", BINARY_NAME, "--", "-s", reference, "-f", pairs, "-d", destination, "--code-mode"],
        "Duplicating the smoke fixture failed",
    )?;

    let generated = fs::read_to_string(fixture.join("out/NewWord/NewWord.txt"))?;
    if generated != "Hello newword world" {
        anyhow::bail!("Unexpected generated content: {generated:?}");
    }

    let missing = fixture.join("missing");
    let status = process::Command::new("cargo")
        .args(["run", "--bin", BINARY_NAME, "--", "-s", path_arg(&missing)?, "-f", pairs])
        .status()?;
    if status.success() {
        anyhow::bail!("fsr should fail when the reference folder is missing");
    }

    fs::remove_dir_all(&fixture)?;
    Ok(())
}

fn path_arg(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| anyhow::anyhow!("Fixture path is not valid UTF-8: {:?}", path))
}

fn cargo(args: &[&str], failure: &str) -> Result<()> {
    let status = process::Command::new("cargo").args(args).status()?;

    if !status.success() {
        anyhow::bail!("{failure}");
    }
    Ok(())
}
