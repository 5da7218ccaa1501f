//! Writing a tag file's tags to audio files.
//!
//! Each file is matched to tag file lines by the disc and track numbers in
//! its name.  Lines that never match a file are reported at the end, since
//! they usually point at a typo in a range.

use std::path::{self, Path, PathBuf};

use regex::Regex;
use tracing::{debug, info, trace, warn};

use crate::audiofile::TagAdapter;
use crate::config::WarningPolicy;
use crate::entity::pad_track;
use crate::error::Result;
use crate::tagfile::TagFile;
use crate::tagmap::TagMap;
use crate::tags::{SortNameMode, MINIMAL_TAGS, SINGLE_FILE_MINIMAL_TAGS};
use crate::titles;

/// Default expression for the disc and track number:
/// `<sep><disc?><track> - anything`
pub fn default_disc_track_regex() -> String {
    let sep = regex::escape(path::MAIN_SEPARATOR_STR);
    format!(r"{sep}(?P<disc>\d*)(?P<track>\d\d) - [^{sep}]+$", sep = sep)
}

#[derive(Debug, Clone)]
pub struct ApplyOptions {
    /// Resolve and check tags without writing files.
    pub pretend: bool,
    /// A lone file: no track number required.
    pub single_file: bool,
    /// Expression with named groups `disc` and `track`.  `None` uses
    /// [`default_disc_track_regex`].
    pub path_regex: Option<String>,
    /// Build a missing Title from Work and Part.
    pub work_title: bool,
    pub sort_names: SortNameMode,
    pub warnings: WarningPolicy,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        ApplyOptions {
            pretend: false,
            single_file: false,
            path_regex: None,
            work_title: true,
            sort_names: SortNameMode::Preserve,
            warnings: WarningPolicy::default(),
        }
    }
}

/// Outcome of [`apply_tag_file`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Files whose tags were written (or would be, in pretend mode).
    pub written: Vec<PathBuf>,
    /// Files skipped for lack of a track number.
    pub skipped: Vec<PathBuf>,
    /// Files missing some of the minimal tags, with the missing names.
    pub incomplete: Vec<(PathBuf, Vec<String>)>,
    /// Source text of directive lines that matched no file.
    pub unused: Vec<String>,
}

/// Disc and track number from a file path.  A group that is missing, empty
/// or not all digits yields `None`.
pub fn disc_track_from_path(path: &Path, regex: &Regex) -> (Option<String>, Option<String>) {
    let full = path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let text = full.to_string_lossy();
    let Some(caps) = regex.captures(&text) else {
        return (None, None);
    };
    let digits = |name: &str| {
        caps.name(name)
            .map(|m| m.as_str())
            .filter(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))
            .map(str::to_string)
    };
    (digits("disc"), digits("track"))
}

/// Minimal tags absent from `tags`, in vocabulary order.
pub fn missing_minimal_tags(tags: &TagMap, single_file: bool) -> Vec<&'static str> {
    let minimal = if single_file { SINGLE_FILE_MINIMAL_TAGS } else { MINIMAL_TAGS };
    minimal.iter().copied().filter(|t| !tags.contains_key(t)).collect()
}

/// Resolve and write the tags for one file, recording the outcome in `report`.
fn apply_file(
    file: &mut TagFile,
    path: &Path,
    regex: &Regex,
    adapter: &dyn TagAdapter,
    opts: &ApplyOptions,
    report: &mut ApplyReport,
) -> Result<()> {
    info!("{}", path.display());
    let warn_on = opts.warnings.general();

    let (disc, track) = disc_track_from_path(path, regex);
    if track.is_none() && !opts.single_file {
        if warn_on {
            warn!("{}: unable to determine track number from filename; file will be skipped", path.display());
        }
        report.skipped.push(path.to_path_buf());
        return Ok(());
    }

    let mut tags = file.resolve(disc.as_deref(), track.as_deref());

    if let Some(track) = &track {
        if !tags.contains_key("TrackNumber") {
            tags.append("TrackNumber", pad_track(track));
        }
    }

    if opts.work_title && !tags.contains_key("Title") && (tags.contains_key("Work") || tags.contains_key("Part")) {
        let work = tags.get("Work").unwrap_or_default().to_vec();
        let parts = tags.get("Part").unwrap_or_default().to_vec();
        tags.append("Title", titles::build_work_part_title(&work, &parts));
    }

    let missing = missing_minimal_tags(&tags, opts.single_file);
    if !missing.is_empty() {
        if warn_on {
            warn!("{}: file missing minimal tags: {}", path.display(), missing.join(", "));
        }
        report
            .incomplete
            .push((path.to_path_buf(), missing.iter().map(|t| t.to_string()).collect()));
    }
    if warn_on && tags.contains_key("Work") && !tags.contains_key("Composer") {
        warn!("{}: work without composer", path.display());
    }

    trace!("{}:\n{}", path.display(), tags);

    if opts.pretend {
        debug!("pretend mode, not writing {}", path.display());
    } else {
        adapter.write(path, &tags)?;
    }
    report.written.push(path.to_path_buf());
    Ok(())
}

/// Apply a parsed tag file to `files`.
///
/// # Returns
/// The report of written, skipped and incomplete files plus the unused
/// lines.  An adapter error aborts the run.
pub fn apply_tag_file<P: AsRef<Path>>(
    file: &mut TagFile,
    files: &[P],
    adapter: &dyn TagAdapter,
    opts: &ApplyOptions,
) -> Result<ApplyReport> {
    let pattern = opts.path_regex.clone().unwrap_or_else(default_disc_track_regex);
    let regex = Regex::new(&pattern)?;

    if let Some(renames) = opts.sort_names.rename_map() {
        file.apply_map(&renames, &opts.warnings);
    }

    let mut report = ApplyReport::default();
    for path in files {
        apply_file(file, path.as_ref(), &regex, adapter, opts, &mut report)?;
    }

    for line in file.unused_lines() {
        if opts.warnings.unused() {
            warn!("unused tag line: {}", line.source);
        }
        report.unused.push(line.source.clone());
    }

    Ok(report)
}

/// Parse tag file text and apply it to `files`.
pub fn apply_tag_text<P: AsRef<Path>>(
    text: &str,
    files: &[P],
    adapter: &dyn TagAdapter,
    opts: &ApplyOptions,
) -> Result<ApplyReport> {
    let mut file = TagFile::parse(text, &opts.warnings)?;
    apply_tag_file(&mut file, files, adapter, opts)
}
