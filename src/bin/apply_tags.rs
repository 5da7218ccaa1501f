//! Tag file applier
//!
//! Writes the tags described by a tag file to audio files.  Each file is
//! matched to the file's disc and track lines by the numbers in its name.
//!
//! **Usage:**
//! ```bash
//! apply_tags [-v] [-p] tags.txt [01\ -\ *.flac]
//! cat tags.txt | apply_tags - *.flac
//! ```

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use clap::builder::BoolishValueParser;
use clap::Parser;
use tracing::{info, warn};

use tagsheet::config::handle_defaults_flags;
use tagsheet::logging::init_logging;
use tagsheet::{
    apply_tag_text, supported_files_in, ApplyOptions, Config, Error, LoftyAdapter, Result, SortNameMode,
};

/// Apply a tag file to audio files
#[derive(Parser, Debug)]
#[command(name = "apply_tags")]
#[command(about = "Write the tags of a tag file to audio files")]
struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Resolve and check tags without writing any file
    #[arg(short, long)]
    pretend: bool,

    /// Treat the files as one lone track
    #[arg(short = '1', long)]
    single_file: bool,

    /// Path expression with named groups disc and track
    #[arg(short = 'P', long, value_name = "REGEX")]
    path_regex: Option<String>,

    /// Build a missing Title from Work and Part (y/n)
    #[arg(short = 'w', long, value_name = "Y|N", value_parser = BoolishValueParser::new())]
    work_title: Option<bool>,

    /// Write names exactly as given (default)
    #[arg(long, group = "names")]
    preserve_names: bool,

    /// Store sort names in the name tags and drop plain names
    #[arg(long, group = "names")]
    sort_names_only: bool,

    /// Store sort names in the name tags and plain names in NonSort tags
    #[arg(long, group = "names")]
    nonsort_names: bool,

    /// Suppress all warnings
    #[arg(short = 'W', long)]
    no_warn: bool,

    /// Do not warn about unrecognized tag names
    #[arg(short = 'u', long)]
    no_warn_unrecognized: bool,

    /// Do not warn about tag file lines that match no file
    #[arg(short = 'U', long)]
    no_warn_unused: bool,

    /// Show built-in and saved defaults, then exit
    #[arg(long)]
    show_defaults: bool,

    /// Save the given options as defaults, then exit
    #[arg(long)]
    save_defaults: bool,

    /// Tag file, or - for stdin
    #[arg(value_name = "TAG_FILE", required_unless_present_any = ["show_defaults", "save_defaults"])]
    tag_file: Option<String>,

    /// Audio files; defaults to the supported files next to the tag file
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,
}

impl Args {
    fn to_config(&self) -> Config {
        let mut config = Config::new();
        config.apply_path_regex = self.path_regex.clone();
        if self.no_warn {
            config.warnings = Some(false);
        }
        if self.no_warn_unrecognized {
            config.warn_unrecognized = Some(false);
        }
        if self.no_warn_unused {
            config.warn_unused = Some(false);
        }
        config
    }

    fn sort_names(&self) -> SortNameMode {
        if self.sort_names_only {
            SortNameMode::SortOnly
        } else if self.nonsort_names {
            SortNameMode::SortAndNonSort
        } else {
            SortNameMode::Preserve
        }
    }
}

fn read_tag_text(tag_file: &str) -> Result<String> {
    if tag_file == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(fs::read_to_string(tag_file)?)
    }
}

/// The supported files in the tag file's directory (or the current one for stdin).
fn default_files(tag_file: &str) -> Result<Vec<PathBuf>> {
    let dir = match Path::new(tag_file).parent() {
        Some(parent) if tag_file != "-" && !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let files = supported_files_in(&dir)?;
    if files.is_empty() {
        return Err(Error::Config(format!("no supported audio files in {}", dir.display())));
    }
    Ok(files)
}

fn run(args: &Args) -> Result<()> {
    let saved = Config::load()?;
    let cli = args.to_config();
    if handle_defaults_flags(&saved, &cli, args.show_defaults, args.save_defaults)? {
        return Ok(());
    }

    let tag_file = args
        .tag_file
        .as_deref()
        .ok_or_else(|| Error::Config("no tag file given".to_string()))?;

    let config = Config::resolve(&saved, &cli);
    let text = read_tag_text(tag_file)?;
    let files = if args.files.is_empty() {
        default_files(tag_file)?
    } else {
        args.files.clone()
    };

    let opts = ApplyOptions {
        pretend: args.pretend,
        single_file: args.single_file,
        path_regex: config.apply_path_regex.clone(),
        work_title: args.work_title.unwrap_or(true),
        sort_names: args.sort_names(),
        warnings: config.warning_policy(),
    };

    let adapter = LoftyAdapter::new(opts.warnings);
    let report = apply_tag_text(&text, &files, &adapter, &opts)?;

    let verb = if opts.pretend { "would write" } else { "wrote" };
    info!("{} tags to {} of {} files", verb, report.written.len(), files.len());
    if !report.skipped.is_empty() && opts.warnings.general() {
        warn!("{} files skipped without a track number", report.skipped.len());
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
