//! Enercode - non-interactive CLI for the compliance calculator core.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, bail};
use directories::ProjectDirs;

use enercode::{INTENSITY_FIELD, Scenario};

fn print_usage() {
    eprintln!("Usage: enercode [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [FILE]                    Document to import (.toml)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -s, --set <ID=VALUE>      Apply a field edit (can be repeated)");
    eprintln!("  -p, --print <ID>          Print a field's display value (can be repeated)");
    eprintln!("  -o, --output <FILE>       Export the document after edits");
    eprintln!("  --mode <target|reference> Displayed scenario (default: target)");
    eprintln!("  --cache-dir <DIR>         Override the state-cache directory");
    eprintln!("  --no-cache                Disable the durable state cache");
    eprintln!("  -h, --help                Print help");
}

struct Options {
    file: Option<PathBuf>,
    edits: Vec<(String, String)>,
    prints: Vec<String>,
    output: Option<PathBuf>,
    mode: Scenario,
    cache_dir: Option<PathBuf>,
    no_cache: bool,
}

fn parse_args(args: &[String]) -> anyhow::Result<Option<Options>> {
    let mut opts = Options {
        file: None,
        edits: Vec::new(),
        prints: Vec::new(),
        output: None,
        mode: Scenario::Target,
        cache_dir: None,
        no_cache: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                return Ok(None);
            }
            "-s" | "--set" => {
                i += 1;
                let arg = args.get(i).context("--set requires ID=VALUE")?;
                let (id, value) = arg
                    .split_once('=')
                    .with_context(|| format!("malformed --set argument: {arg}"))?;
                opts.edits.push((id.to_string(), value.to_string()));
            }
            "-p" | "--print" => {
                i += 1;
                let id = args.get(i).context("--print requires a field id")?;
                opts.prints.push(id.to_string());
            }
            "-o" | "--output" => {
                i += 1;
                let path = args.get(i).context("--output requires a file path")?;
                opts.output = Some(PathBuf::from(path));
            }
            "--mode" => {
                i += 1;
                let mode = args.get(i).context("--mode requires a value")?;
                opts.mode = Scenario::parse(mode)
                    .with_context(|| format!("unknown mode: {mode}"))?;
            }
            "--cache-dir" => {
                i += 1;
                let dir = args.get(i).context("--cache-dir requires a path")?;
                opts.cache_dir = Some(PathBuf::from(dir));
            }
            "--no-cache" => opts.no_cache = true,
            other if other.starts_with('-') => bail!("unknown option: {other}"),
            other => {
                if opts.file.is_some() {
                    bail!("only one input file may be given");
                }
                opts.file = Some(PathBuf::from(other));
            }
        }
        i += 1;
    }
    Ok(Some(opts))
}

fn default_cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "enercode").map(|dirs| dirs.cache_dir().to_path_buf())
}

fn run(opts: Options) -> anyhow::Result<()> {
    let cache_dir = if opts.no_cache {
        None
    } else {
        opts.cache_dir.clone().or_else(default_cache_dir)
    };

    let mut model = enercode::build_model(cache_dir)?;
    model.initialize();

    if let Some(path) = &opts.file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        model
            .import_toml(&text)
            .with_context(|| format!("cannot import {}", path.display()))?;
    }

    model.switch_mode(opts.mode);

    for (id, value) in &opts.edits {
        model
            .set_field(id, value)
            .with_context(|| format!("cannot set {id}"))?;
    }

    if opts.prints.is_empty() {
        print_summary(&model);
    } else {
        for id in &opts.prints {
            println!("{}", model.display_value(id)?);
        }
    }

    if let Some(path) = &opts.output {
        std::fs::write(path, model.export_toml()?)
            .with_context(|| format!("cannot write {}", path.display()))?;
    }
    Ok(())
}

fn print_summary(model: &enercode::Model) {
    println!("{:<28} {:>14} {:>14}", "", "Target", "Reference");
    for id in ["d_20", "i_98", "i_120", "i_71", "i_104", INTENSITY_FIELD] {
        let target = model
            .get(Scenario::Target, id)
            .map(|v| v.encode())
            .unwrap_or_else(|| "-".into());
        let reference = model
            .get(Scenario::Reference, id)
            .map(|v| v.encode())
            .unwrap_or_else(|| "-".into());
        println!("{id:<28} {target:>14} {reference:>14}");
    }
    match model.compliance(INTENSITY_FIELD) {
        Some(c) => {
            let verdict = if c.passes { "PASS" } else { "FAIL" };
            println!(
                "compliance ({INTENSITY_FIELD}): {verdict} (target {:.1}, reference {:.1})",
                c.target, c.reference
            );
        }
        None => println!("compliance ({INTENSITY_FIELD}): not available"),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let opts = match parse_args(&args) {
        Ok(Some(opts)) => opts,
        Ok(None) => return,
        Err(err) => {
            eprintln!("Error: {err}");
            print_usage();
            std::process::exit(2);
        }
    };

    if let Err(err) = run(opts) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
