use clap::Parser;
use std::io::{stdin, Read};
use std::path::{Path, PathBuf};
use std::process;

use dns_zone::zones::types::Zone;

mod fs_util;

use fs_util::FileIncludeResolver;

// the doc comments for this struct turn into the CLI help text
#[derive(Parser)]
/// Read a zone file, output it in a normalised form to stdout.
///
/// Records which are malformed, or of an unsupported type, are
/// dropped.  Set RUST_LOG=debug to see which.
struct Args {
    /// Zone file to read; if absent, the zone is read from stdin
    #[clap(value_parser)]
    zone_file: Option<PathBuf>,

    /// Origin to use if the zone does not have an $ORIGIN directive
    #[clap(short, long, value_parser, env = "ZTOZ_ORIGIN")]
    origin: Option<String>,

    /// Group the records by type
    #[clap(short, long, action(clap::ArgAction::SetTrue))]
    pretty: bool,

    /// Directory relative $INCLUDE file names are resolved against;
    /// defaults to the directory of the zone file, or the current
    /// directory when reading from stdin
    #[clap(short = 'I', long, value_parser, env = "ZTOZ_INCLUDE_DIR")]
    include_dir: Option<PathBuf>,
}

fn begin_logging() {
    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_default();
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter);

    match log_format.as_str() {
        "json" => builder.json().init(),
        "pretty" => builder.pretty().init(),
        "compact" => builder.compact().init(),
        _ => builder.init(),
    }
}

fn read_zone(path: Option<&Path>) -> Result<String, String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|error| format!("error reading zone file '{}': {error}", path.display())),
        None => {
            let mut buf = String::new();
            stdin()
                .read_to_string(&mut buf)
                .map_err(|error| format!("error reading zone file from stdin: {error}"))?;
            Ok(buf)
        }
    }
}

fn main() {
    let args = Args::parse();

    begin_logging();

    let data = match read_zone(args.zone_file.as_deref()) {
        Ok(data) => data,
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    };

    let base_dir = args
        .include_dir
        .or_else(|| {
            args.zone_file
                .as_deref()
                .and_then(Path::parent)
                .map(Path::to_path_buf)
        })
        .unwrap_or_else(|| PathBuf::from("."));
    tracing::debug!(?base_dir, "resolving includes");

    match Zone::load(
        &data,
        args.origin.as_deref(),
        FileIncludeResolver::new(base_dir),
    ) {
        Ok(zone) if args.pretty => print!("{}", zone.dump_pretty()),
        Ok(zone) => print!("{}", zone.dump()),
        Err(err) => {
            eprintln!("error parsing zone file: {err}");
            process::exit(1);
        }
    }
}
