//! Tag file generator
//!
//! Reads the tags of a set of audio files, merges common values up to the
//! disc and release level and writes an editable tag file.
//!
//! **Usage:**
//! ```bash
//! init_tags [-v] [-o tags.txt] [-p] [-M y] [--release-mbid ID] 01\ -\ *.flac
//! ```

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::builder::BoolishValueParser;
use clap::Parser;
use tracing::{debug, info};

use tagsheet::config::handle_defaults_flags;
use tagsheet::logging::init_logging;
use tagsheet::musicbrainz::parse_release_id;
use tagsheet::{
    generate, Config, Error, LayoutOptions, LoftyAdapter, MusicBrainzClient, ReadOptions, ReleaseBuilder, Result,
    WarningPolicy,
};

/// Generate a tag file from audio files
#[derive(Parser, Debug)]
#[command(name = "init_tags")]
#[command(about = "Create an editable tag file from the tags of audio files")]
struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Write the tag file here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Suppress all warnings
    #[arg(short = 'W', long)]
    no_warn: bool,

    /// Fill missing tags from the file path
    #[arg(short = 'p', long)]
    infer_from_path: bool,

    /// Path expression with named groups artist, album, date, disc, track and title
    #[arg(short = 'P', long, value_name = "REGEX")]
    path_regex: Option<String>,

    /// Album artist label for various-artists releases
    #[arg(short = 'V', long, value_name = "LABEL")]
    various_artists: Option<String>,

    /// Split titles into Work and Part (y/n)
    #[arg(short = 't', long, value_name = "Y|N", value_parser = BoolishValueParser::new())]
    parse_title: Option<bool>,

    /// Split "Album (disc N: Subtitle)" album titles (y/n)
    #[arg(short = 'd', long, value_name = "Y|N", value_parser = BoolishValueParser::new())]
    parse_disc: Option<bool>,

    /// Strip instrument roles from performers (y/n)
    #[arg(short = 'i', long, value_name = "Y|N", value_parser = BoolishValueParser::new())]
    remove_instruments: Option<bool>,

    /// Classical layout: plain titles are works (y/n)
    #[arg(short = 'c', long, value_name = "Y|N", value_parser = BoolishValueParser::new())]
    classical: Option<bool>,

    /// Look up releases and recordings on MusicBrainz (y/n)
    #[arg(short = 'M', long, value_name = "Y|N", value_parser = BoolishValueParser::new())]
    musicbrainz_lookup: Option<bool>,

    /// Treat the files as one lone track
    #[arg(short = '1', long)]
    single_file: bool,

    /// MusicBrainz release id or URL to use instead of the files' album id
    #[arg(long, value_name = "MBID")]
    release_mbid: Option<String>,

    /// User agent for MusicBrainz requests
    #[arg(long, value_name = "AGENT")]
    user_agent: Option<String>,

    /// Sectioned layout (default)
    #[arg(short = 'S', long, conflicts_with = "unstructured")]
    structured: bool,

    /// Dump every tag of every entity
    #[arg(short = 'U', long)]
    unstructured: bool,

    /// Output standard tags (y/n)
    #[arg(short = 's', long, value_name = "Y|N", value_parser = BoolishValueParser::new())]
    standard: Option<bool>,

    /// Output MusicBrainz identifiers (y/n)
    #[arg(short = 'm', long, value_name = "Y|N", value_parser = BoolishValueParser::new())]
    musicbrainz: Option<bool>,

    /// Output ReplayGain tags (y/n)
    #[arg(short = 'r', long, value_name = "Y|N", value_parser = BoolishValueParser::new())]
    replaygain: Option<bool>,

    /// Artists, composers and performers blocks (y/n)
    #[arg(short = 'a', long, value_name = "Y|N", value_parser = BoolishValueParser::new())]
    artist_block: Option<bool>,

    /// Blank line after every track (y/n)
    #[arg(short = 'b', long, value_name = "Y|N", value_parser = BoolishValueParser::new())]
    break_tracks: Option<bool>,

    /// Works block (y/n)
    #[arg(short = 'w', long, value_name = "Y|N", value_parser = BoolishValueParser::new())]
    work_block: Option<bool>,

    /// Multi-value Artists tags for tracks (y/n)
    #[arg(long, value_name = "Y|N", value_parser = BoolishValueParser::new())]
    track_artists: Option<bool>,

    /// Output tags outside the supported sets (y/n)
    #[arg(short = 'u', long, value_name = "Y|N", value_parser = BoolishValueParser::new())]
    output_unsupported: Option<bool>,

    /// Show built-in and saved defaults, then exit
    #[arg(long)]
    show_defaults: bool,

    /// Save the given options as defaults, then exit
    #[arg(long)]
    save_defaults: bool,

    /// Audio files, in track order
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,
}

impl Args {
    /// The options given on the command line, as a config layer.
    fn to_config(&self) -> Config {
        let mut config = Config::new();
        config.various = self.various_artists.clone();
        config.read_path_regex = self.path_regex.clone();
        config.user_agent = self.user_agent.clone();
        if self.infer_from_path {
            config.infer_from_path = Some(true);
        }
        if self.no_warn {
            config.warnings = Some(false);
        }
        config.parse_title = self.parse_title;
        config.parse_disc = self.parse_disc;
        config.remove_instruments = self.remove_instruments;
        config.classical = self.classical;
        config.call_musicbrainz = self.musicbrainz_lookup;
        config.artist_block = self.artist_block;
        config.break_tracks = self.break_tracks;
        config.work_block = self.work_block;
        config.track_artists = self.track_artists;
        config.output_unsupported = self.output_unsupported;
        config
    }
}

fn read_options(config: &Config, args: &Args) -> Result<ReadOptions> {
    let release_mbid = match &args.release_mbid {
        Some(input) => Some(
            parse_release_id(input).ok_or_else(|| Error::Config(format!("not a MusicBrainz release id: {}", input)))?,
        ),
        None => None,
    };

    Ok(ReadOptions {
        various: config.various_label().to_string(),
        infer_from_path: config.infer_from_path.unwrap_or(false),
        path_regex: config.read_path_regex.clone(),
        remove_instruments: config.remove_instruments.unwrap_or(false),
        parse_disc: config.parse_disc.unwrap_or(false),
        parse_title: config.parse_title.unwrap_or(false),
        classical: config.classical.unwrap_or(false),
        call_musicbrainz: config.call_musicbrainz.unwrap_or(false),
        release_mbid,
        warnings: config.warning_policy(),
    })
}

fn layout_options(config: &Config, args: &Args) -> LayoutOptions {
    let defaults = LayoutOptions::default();
    LayoutOptions {
        structured: args.structured || !args.unstructured,
        standard: args.standard.unwrap_or(defaults.standard),
        musicbrainz: args.musicbrainz.unwrap_or(defaults.musicbrainz),
        replaygain: args.replaygain.unwrap_or(defaults.replaygain),
        artist_block: config.artist_block.unwrap_or(defaults.artist_block),
        break_tracks: config.break_tracks.unwrap_or(defaults.break_tracks),
        work_block: config.work_block.unwrap_or(defaults.work_block),
        track_artists: config.track_artists.unwrap_or(defaults.track_artists),
        output_unsupported: config.output_unsupported.unwrap_or(defaults.output_unsupported),
        classical: config.classical.unwrap_or(defaults.classical),
        single_file: args.single_file,
    }
}

fn run(args: &Args) -> Result<()> {
    let saved = Config::load()?;
    let cli = args.to_config();
    if handle_defaults_flags(&saved, &cli, args.show_defaults, args.save_defaults)? {
        return Ok(());
    }

    if args.files.is_empty() {
        return Err(Error::Config("no audio files given".to_string()));
    }

    let config = Config::resolve(&saved, &cli);
    let read_opts = read_options(&config, args)?;
    let layout = layout_options(&config, args);
    debug!("read options: {:?}", read_opts);
    debug!("layout options: {:?}", layout);

    let adapter = LoftyAdapter::new(read_opts.warnings);
    let mut client = MusicBrainzClient::new(config.user_agent.as_deref());
    let call_musicbrainz = read_opts.call_musicbrainz;

    let mut builder = ReleaseBuilder::new(&adapter, read_opts)?;
    if call_musicbrainz {
        builder = builder.with_lookup(&mut client);
    }
    let release = builder.read(&args.files)?;
    info!("read {} files into {} discs", args.files.len(), release.discs.len());

    // The generated file is meant to be edited, so builder warnings stay off.
    let builder_warnings = WarningPolicy {
        unrecognized: false,
        ..config.warning_policy()
    };
    let tag_file = generate(&release, &layout, builder_warnings)?;

    let mut text = tag_file.to_string();
    if !text.ends_with('\n') {
        text.push('\n');
    }

    match &args.output {
        Some(path) => {
            fs::write(path, text)?;
            info!("wrote {}", path.display());
        }
        None => print!("{}", text),
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
