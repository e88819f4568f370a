mod report;

use anyhow::{Context, Result};
use cmlparse::{
    DefaultParameter, Input, OptionalParameter, ParameterBuilder, Parser, Settings, options,
};
use std::{
    env,
    fs::OpenOptions,
    io::Write,
    path::PathBuf,
    process::{Command, ExitCode},
    time::Instant,
};
use tracing_subscriber::{EnvFilter, fmt};

use crate::report::Report;

const DEFAULT_FORMAT: &str = "%e real";

/// Exit code for a command line that didn't parse.
const USAGE_ERROR: u8 = 2;

#[derive(Clone, Debug)]
struct TimeArgs {
    format: DefaultParameter<String>,
    portability: DefaultParameter<bool>,
    output: OptionalParameter<PathBuf>,
    append: DefaultParameter<bool>,
    verbose: DefaultParameter<bool>,
    describe: DefaultParameter<bool>,
    command: OptionalParameter<Vec<String>>,
}

options!(TimeArgs {
    format,
    portability,
    output,
    append,
    verbose,
    describe,
    command,
});

fn parser(default_format: String) -> Parser<TimeArgs> {
    let args = TimeArgs {
        format: ParameterBuilder::new()
            .identifier("format", Some('f'))
            .description("Output format (%e seconds, %x exit status, %C command)")
            .default_value(default_format)
            .create_default(),
        portability: ParameterBuilder::new()
            .identifier("portability", Some('p'))
            .description("Use the POSIX output format")
            .default_value(false)
            .create_default(),
        output: ParameterBuilder::new()
            .identifier("output", Some('o'))
            .description("Write the report to FILE instead of stderr")
            .value_name("FILE")
            .create_optional(),
        append: ParameterBuilder::new()
            .identifier("append", Some('a'))
            .description("Append to the output file instead of overwriting it")
            .default_value(false)
            .create_default(),
        verbose: ParameterBuilder::new()
            .identifier("verbose", Some('v'))
            .description("Print a labelled multi-line report")
            .default_value(false)
            .create_default(),
        describe: ParameterBuilder::new()
            .identifier("describe", None)
            .description("Print the parameter schema as JSON and exit")
            .default_value(false)
            .create_default(),
        command: ParameterBuilder::new()
            .description("Command to run, after `--` if it has options of its own")
            .create_optional(),
    };
    let settings = Settings::new("cmltime").summary("Run a command and report how long it took");
    Parser::with_settings(args, settings)
}

fn main() -> ExitCode {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    init_tracing();

    let default_format = env::var("TIME").unwrap_or_else(|_| DEFAULT_FORMAT.to_string());
    let parser = parser(default_format);

    if cfg!(debug_assertions) {
        if let Err(e) = parser.check() {
            eprintln!("cmltime: {e}");
            return ExitCode::FAILURE;
        }
    }

    let args = match parser.parse(Input::args(env::args().skip(1))) {
        Ok(args) => args,
        Err(e) if e.is_help() => {
            print!("{}", parser.help_text());
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{e}\n");
            eprint!("{}", parser.help_text());
            return ExitCode::from(USAGE_ERROR);
        }
    };

    if *args.describe.value() {
        return match serde_json::to_string_pretty(&parser.schema()) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("cmltime: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let Some(command) = args.command.get().filter(|c| !c.is_empty()) else {
        eprintln!("error: missing command\n");
        eprint!("{}", parser.help_text());
        return ExitCode::from(USAGE_ERROR);
    };

    match run(&args, command) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("cmltime: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Time `command`, write the report, and return the child's exit code.
fn run(args: &TimeArgs, command: &[String]) -> Result<u8> {
    let (program, rest) = command.split_first().context("missing command")?;

    tracing::debug!(program = %program, args = rest.len(), "spawning command");
    let started = Instant::now();
    let status = Command::new(program)
        .args(rest)
        .status()
        .with_context(|| format!("failed to run {program}"))?;
    let elapsed = started.elapsed();
    tracing::debug!(?status, elapsed_ms = elapsed.as_millis() as u64, "command finished");

    let report = Report {
        command: command.to_vec(),
        elapsed,
        status: status.code(),
    };
    let text = if *args.portability.value() {
        report.portable()
    } else if *args.verbose.value() {
        report.verbose()
    } else {
        report.render(args.format.value())
    };
    write_report(args, &text)?;

    Ok(match status.code() {
        Some(code) => u8::try_from(code).unwrap_or(1),
        None => 1,
    })
}

fn write_report(args: &TimeArgs, text: &str) -> Result<()> {
    let Some(path) = args.output.get() else {
        if *args.append.value() {
            tracing::warn!("--append has no effect without --output");
        }
        eprintln!("{text}");
        return Ok(());
    };

    let append = *args.append.value();
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    writeln!(file, "{text}").with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
