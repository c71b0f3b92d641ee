//! Interactive card demo: type assignments, watch the card re-render.
//!
//! Renders a small profile card to stdout and reads commands from stdin:
//!
//! ```text
//! <path> = <value>    write through the mutation gate
//! get <path>          resolve a path against the tree
//! snapshot            print the whole data tree
//! quit                exit
//! ```
//!
//! Values parse as `null`, `true`/`false`, integer, float, then bare
//! string; double quotes force the string reading. Set `RUST_LOG=debug`
//! to watch writes and render passes flow through the engine.

use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use weft::{Engine, EngineConfig, EngineOptions, Surface, SurfaceProvider, Value, WritePolicy};

#[derive(Parser)]
#[command(
    name = "weft-demo",
    version,
    about = "Interactive terminal demo for the Weft binding engine"
)]
struct Cli {
    /// Load engine options from a TOML config instead of the built-in card.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the write admission policy ('first-write' or 'batch').
    #[arg(long, value_parser = parse_policy)]
    policy: Option<WritePolicy>,
}

fn parse_policy(raw: &str) -> Result<WritePolicy, String> {
    match raw {
        "first-write" => Ok(WritePolicy::FirstWriteOnly),
        "batch" => Ok(WritePolicy::BatchAll),
        other => Err(format!(
            "unknown policy '{other}' (expected 'first-write' or 'batch')"
        )),
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    let mut options = match &cli.config {
        Some(path) => {
            let raw = fs::read_to_string(path)?;
            EngineConfig::from_toml_str(&raw)?.into_options()?
        }
        None => demo_options(),
    };
    if let Some(policy) = cli.policy {
        options = options.with_policy(policy);
    }

    let mut host = StdoutHost;
    let mut engine = Engine::new(options, &mut host)?;
    tracing::debug!(?engine, "engine ready");
    banner();

    for line in io::stdin().lock().lines() {
        if !dispatch(&mut engine, &line?) {
            break;
        }
    }
    Ok(())
}

/// Dev diagnostics via `RUST_LOG`, stderr, compact. Defaults to `warn`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr).compact())
        .init();
}

fn banner() {
    eprintln!("commands: <path> = <value> | get <path> | snapshot | quit");
}

// ---------------------------------------------------------------------------
// Stdout surfaces
// ---------------------------------------------------------------------------

/// Resolves every target to a surface that prints each pass to stdout.
struct StdoutHost;

impl SurfaceProvider for StdoutHost {
    fn lookup(&mut self, id: &str) -> Option<Box<dyn Surface>> {
        Some(Box::new(StdoutSurface {
            id: id.to_string(),
            pass: 0,
        }))
    }
}

struct StdoutSurface {
    id: String,
    pass: u64,
}

impl Surface for StdoutSurface {
    fn set_content(&mut self, text: &str) {
        self.pass += 1;
        println!("── {} · pass {} ──", self.id, self.pass);
        println!("{text}");
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Handle one input line. Returns `false` when the session should end.
fn dispatch(engine: &mut Engine, line: &str) -> bool {
    let line = line.trim();
    match line {
        "" => return true,
        "quit" | "exit" => return false,
        "snapshot" => {
            println!("{}", engine.snapshot());
            return true;
        }
        _ => {}
    }
    if let Some(path) = line.strip_prefix("get ") {
        match engine.get(path.trim()) {
            Some(value) => println!("{value}"),
            None => println!("(unresolved)"),
        }
        return true;
    }
    if let Some((path, raw)) = line.split_once('=') {
        let outcome = engine.set_data(|d| d.set(path.trim(), parse_value(raw.trim())));
        for dropped in &outcome.dropped {
            eprintln!("dropped {}: {}", dropped.path, dropped.reason);
        }
        return true;
    }
    eprintln!("unrecognized input: {line}");
    true
}

/// Interpret an input token: `null`, bool, int, float, then bare string.
fn parse_value(raw: &str) -> Value {
    if let Some(quoted) = raw.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
        return Value::from(quoted);
    }
    match raw {
        "null" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => {
            if let Ok(n) = raw.parse::<i64>() {
                Value::Int(n)
            } else if let Ok(x) = raw.parse::<f64>() {
                Value::Float(x)
            } else {
                Value::from(raw)
            }
        }
    }
}

fn demo_options() -> EngineOptions {
    let data = Value::from_pairs([
        ("name", Value::from("mog")),
        ("hobby", Value::from("chasing the red dot")),
        (
            "address",
            Value::from_pairs([
                ("country", Value::from("China")),
                ("city", Value::from("Shenzhen")),
                (
                    "street",
                    Value::from_pairs([("num", Value::from(7)), ("block", Value::from(23))]),
                ),
            ]),
        ),
    ]);
    let template = "\
{{name}} · {{hobby}}
{{address.city}}, {{address.country}} (street {{address.street.num}}, block {{address.street.block}})";
    EngineOptions::new(template, "card", data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft::NullSurface;

    #[test]
    fn parse_defaults() {
        let cli = Cli::parse_from(["weft-demo"]);
        assert!(cli.config.is_none());
        assert!(cli.policy.is_none());
    }

    #[test]
    fn parse_policy_flag() {
        let cli = Cli::parse_from(["weft-demo", "--policy", "batch"]);
        assert_eq!(cli.policy, Some(WritePolicy::BatchAll));
    }

    #[test]
    fn parse_value_forms() {
        assert_eq!(parse_value("null"), Value::Null);
        assert_eq!(parse_value("true"), Value::Bool(true));
        assert_eq!(parse_value("-3"), Value::Int(-3));
        assert_eq!(parse_value("0.5"), Value::Float(0.5));
        assert_eq!(parse_value("Nanjing"), Value::from("Nanjing"));
        assert_eq!(parse_value("\"7\""), Value::from("7"), "quotes force a string");
    }

    #[test]
    fn dispatch_assignment_then_quit() {
        let mut engine = Engine::new(demo_options(), &mut NullSurface).unwrap();

        assert!(dispatch(&mut engine, "address.city = Nanjing"));
        assert_eq!(engine.get("address.city"), Some(Value::from("Nanjing")));
        assert!(!dispatch(&mut engine, "quit"));
    }

    #[test]
    fn dispatch_reports_unrecognized_lines_and_continues() {
        let mut engine = Engine::new(demo_options(), &mut NullSurface).unwrap();
        assert!(dispatch(&mut engine, "what is this"));
        assert!(dispatch(&mut engine, ""));
    }
}
