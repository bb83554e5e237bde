//! Stratus CLI entry point.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use stratus_compose::Environment;
use stratus_foundation::{AttrMap, Value};
use stratus_runtime::{
    OutputFormat, Session, SynthConfig, apply_assignments, encode, load_attributes, save_to_file,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stratus", version)]
#[command(about = "Synthesize infrastructure documents from composed architectures")]
struct Cli {
    /// Log at debug level regardless of `STRATUS_LOG`
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (TOML)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compose an architecture and emit its document
    Synth {
        /// Architecture to compose, e.g. `web_application`
        architecture: String,

        /// Logical name of the composition
        #[arg(short, long)]
        name: String,

        /// Environment: development, staging, or production
        #[arg(short, long)]
        env: Option<String>,

        /// Attributes file (.json or .toml)
        #[arg(short, long, value_name = "FILE")]
        attrs: Option<PathBuf>,

        /// Set an attribute, e.g. `--set auto_scaling.min=2`; repeatable
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,

        /// Output format: json or msgpack
        #[arg(short, long)]
        format: Option<String>,

        /// Write the document here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Indent JSON output
        #[arg(long)]
        pretty: bool,

        /// Print members, fallbacks, and computed properties to stderr
        #[arg(long)]
        summary: bool,
    },

    /// List registered resource kinds, components, and architectures
    Kinds,

    /// Validate attributes against a resource kind or architecture
    Validate {
        /// Resource kind or architecture name
        kind: String,

        /// Attributes file (.json or .toml)
        #[arg(short, long, value_name = "FILE")]
        attrs: Option<PathBuf>,

        /// Set an attribute; repeatable
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            if let Some(context) = e
                .downcast_ref::<stratus_foundation::Error>()
                .and_then(|e| e.context.as_ref())
            {
                eprint!("{context}");
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("STRATUS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_attributes(file: Option<&PathBuf>, set: &[String]) -> stratus_foundation::Result<AttrMap> {
    let base = match file {
        Some(path) => load_attributes(path)?,
        None => AttrMap::new(),
    };
    apply_assignments(&base, set)
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => SynthConfig::load(path)?,
        None => SynthConfig::new(),
    };

    match cli.command {
        Command::Synth {
            architecture,
            name,
            env,
            attrs,
            set,
            format,
            output,
            pretty,
            summary,
        } => {
            if let Some(format) = format {
                config = config.with_format(format.parse::<OutputFormat>()?);
            }
            if pretty {
                config = config.with_pretty(true);
            }
            if let Some(output) = output {
                config = config.with_output(output);
            }
            let mut raw = read_attributes(attrs.as_ref(), &set)?;
            let environment = env.map(|env| env.parse::<Environment>()).transpose()?;
            if let Some(environment) = environment {
                config = config.with_environment(environment);
            }

            let session = Session::new(config)?;
            // An explicit --env beats an environment named in the attributes.
            let declares_environment = session
                .blueprints()
                .lookup(&architecture)
                .is_some_and(|b| b.schema().field("environment").is_some());
            if let Some(environment) = environment.filter(|_| declares_environment) {
                raw = raw.insert("environment".into(), Value::from(environment.as_str()));
            }
            let synthesis = session.synthesize(&architecture, &name, &raw)?;
            if summary {
                print_summary(&synthesis);
            }

            let config = session.config();
            match &config.output {
                Some(path) => {
                    save_to_file(synthesis.document(), config.format, config.pretty, path)?;
                    eprintln!(
                        "wrote {} resources to {}",
                        synthesis.document().resource_count(),
                        path.display()
                    );
                }
                None => {
                    let bytes = encode(synthesis.document(), config.format, config.pretty)?;
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(&bytes)?;
                    if config.format == OutputFormat::Json {
                        writeln!(stdout)?;
                    }
                }
            }
        }

        Command::Kinds => {
            let session = Session::new(config)?;
            print_listing("Resource kinds", session.kinds().names(), |name| {
                session.kinds().lookup(name).and_then(|k| k.description())
            });
            print_listing("Components", session.components().names(), |name| {
                session.components().lookup(name).and_then(|c| c.description())
            });
            print_listing("Architectures", session.blueprints().names(), |name| {
                session.blueprints().lookup(name).and_then(|b| b.description())
            });
        }

        Command::Validate { kind, attrs, set } => {
            let session = Session::new(config)?;
            let raw = read_attributes(attrs.as_ref(), &set)?;
            let validated = session.validate(&kind, &raw)?;
            println!("{kind}: valid");
            for (field, value) in validated.iter() {
                println!("  {field} = {value}");
            }
        }
    }

    Ok(())
}

fn print_listing(
    heading: &str,
    names: Vec<String>,
    describe: impl Fn(&str) -> Option<&'static str>,
) {
    println!("\x1b[1m{heading}:\x1b[0m");
    for name in names {
        match describe(&name) {
            Some(description) => println!("  {name:<32} {description}"),
            None => println!("  {name}"),
        }
    }
    println!();
}

fn print_summary(synthesis: &stratus_runtime::Synthesis) {
    let aggregate = synthesis.aggregate();
    eprintln!("\x1b[1;36m=== {} {} ===\x1b[0m", aggregate.kind(), aggregate.name());
    for (member, value) in aggregate.members() {
        let marker = if value.is_fallback() { " (fallback)" } else { "" };
        eprintln!("  member {member}{marker}");
    }
    for (name, value) in aggregate.computed_values().iter() {
        eprintln!("  {name} = {value}");
    }
    eprintln!("  resources: {}", synthesis.document().resource_count());
}
