//! Raw tag viewer
//!
//! Prints the tags stored in audio files, one file at a time.
//!
//! **Usage:**
//! ```bash
//! show_tags [--no-sort] [-f '== {0} =='] [-t '{0:20} {1}'] *.flac
//! ```

use std::path::PathBuf;
use std::process;

use clap::Parser;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use tagsheet::config::handle_defaults_flags;
use tagsheet::logging::init_logging;
use tagsheet::{Config, LoftyAdapter, Result, TagAdapter};

/// `{N}`, `{N:W}`, `{N:<W}`, `{N:>W}` or `{N:^W}`.
static FIELD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\d+)(?::([<>^]?)(\d+))?\}").unwrap());

/// Print the tags of audio files
#[derive(Parser, Debug)]
#[command(name = "show_tags")]
#[command(about = "Print the tags stored in audio files")]
struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Format of the file header; {0} is the file name
    #[arg(short, long, value_name = "FORMAT", default_value = "{0}")]
    filename_format: String,

    /// Text printed after each file
    #[arg(long, value_name = "TEXT", default_value = "")]
    file_trailer: String,

    /// Format of each tag; {0} is the name and {1} the value
    #[arg(short, long, value_name = "FORMAT", default_value = "\t{0:30} = {1}")]
    tag_format: String,

    /// Show tags in file order
    #[arg(long)]
    no_sort: bool,

    /// Suppress all warnings
    #[arg(short = 'W', long)]
    no_warn: bool,

    /// Show built-in and saved defaults, then exit
    #[arg(long)]
    show_defaults: bool,

    /// Save the given options as defaults, then exit
    #[arg(long)]
    save_defaults: bool,

    /// Audio files
    #[arg(value_name = "FILE", required_unless_present_any = ["show_defaults", "save_defaults"])]
    files: Vec<PathBuf>,
}

/// Substitute positional fields in `template`.  A width pads the value,
/// left-aligned unless another alignment is given.  Fields past the end of
/// `values` are left as written.
fn format_fields(template: &str, values: &[&str]) -> String {
    FIELD
        .replace_all(template, |caps: &Captures| {
            let value = match caps[1].parse::<usize>().ok().and_then(|i| values.get(i)) {
                Some(value) => *value,
                None => return caps[0].to_string(),
            };
            let width = caps.get(3).and_then(|w| w.as_str().parse::<usize>().ok()).unwrap_or(0);
            match caps.get(2).map(|a| a.as_str()) {
                Some(">") => format!("{:>width$}", value, width = width),
                Some("^") => format!("{:^width$}", value, width = width),
                _ => format!("{:<width$}", value, width = width),
            }
        })
        .into_owned()
}

fn run(args: &Args) -> Result<()> {
    let saved = Config::load()?;
    let mut cli = Config::new();
    if args.no_warn {
        cli.warnings = Some(false);
    }
    if handle_defaults_flags(&saved, &cli, args.show_defaults, args.save_defaults)? {
        return Ok(());
    }

    let adapter = LoftyAdapter::new(Config::resolve(&saved, &cli).warning_policy());

    for path in &args.files {
        let name = path.to_string_lossy();
        println!("{}", format_fields(&args.filename_format, &[name.as_ref()]));

        let mut tags = adapter.read(path)?;
        if !args.no_sort {
            tags.sort_by(|a, b| a.0.cmp(&b.0));
        }
        for (tag, value) in &tags {
            println!("{}", format_fields(&args.tag_format, &[tag.as_str(), value.as_str()]));
        }

        if !args.file_trailer.is_empty() {
            println!("{}", args.file_trailer);
        }
    }

    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tag_format_pads_name() {
        let line = format_fields("\t{0:8} = {1}", &["Album", "Tommy"]);
        assert_eq!(line, "\tAlbum    = Tommy");
    }

    #[test]
    fn test_alignment_and_unknown_fields() {
        assert_eq!(format_fields("[{0:>4}]", &["ab"]), "[  ab]");
        assert_eq!(format_fields("{0} {2}", &["x"]), "x {2}");
        assert_eq!(format_fields("== {0} ==", &["a.flac"]), "== a.flac ==");
    }
}
