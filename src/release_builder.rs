//! Builds a [`Release`] hierarchy from audio files.
//!
//! Each file becomes a track.  Its tags come from the file itself, optionally
//! patched from the path and from MusicBrainz, then tracks are grouped into
//! discs and common values are merged upwards.

use std::path::{self, Path};

use regex::Regex;
use tracing::{debug, info, trace, warn};

use crate::audiofile::TagAdapter;
use crate::config::{WarningPolicy, DEFAULT_VARIOUS};
use crate::entity::{pad_track, Disc, Release, Track};
use crate::error::Result;
use crate::merge::merge_children;
use crate::musicbrainz::{MetadataLookup, Relation, ReleaseRecord};
use crate::tagmap::TagMap;
use crate::tags::VARIOUS_ARTISTS;
use crate::titles;

/// Album artist tags that may carry the various-artists label.
const ALBUM_ARTIST_TAGS: &[&str] = &["AlbumArtist", "AlbumArtistSort", "AlbumArtists", "AlbumArtistsSort"];

/// Default expression for `infer_from_path`:
/// `<sep>artist<sep>album<sep><disc?><track> - <title>.ext`
pub fn default_path_regex() -> String {
    let sep = regex::escape(path::MAIN_SEPARATOR_STR);
    format!(
        r"{sep}(?P<artist>[^{sep}]+){sep}(?P<album>[^{sep}]+){sep}(?P<disc>\d*)(?P<track>\d\d) - (?P<title>[^{sep}]+)\.[^{sep}]+$",
        sep = sep
    )
}

/// Options controlling how files are read into a release.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Label for various-artists album artists.
    pub various: String,
    pub infer_from_path: bool,
    /// Expression with named groups `artist`, `album`, `date`, `disc`, `track`
    /// and `title`.  `None` uses [`default_path_regex`].
    pub path_regex: Option<String>,
    pub remove_instruments: bool,
    pub parse_disc: bool,
    pub parse_title: bool,
    /// Treat a plain title as the name of a work.
    pub classical: bool,
    pub call_musicbrainz: bool,
    /// Release MBID used instead of the files' `musicbrainz_albumid`.
    pub release_mbid: Option<String>,
    pub warnings: WarningPolicy,
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptions {
            various: DEFAULT_VARIOUS.to_string(),
            infer_from_path: false,
            path_regex: None,
            remove_instruments: false,
            parse_disc: false,
            parse_title: false,
            classical: false,
            call_musicbrainz: false,
            release_mbid: None,
            warnings: WarningPolicy::default(),
        }
    }
}

// ── Per-track edits ──────────────────────────────────────────────────────

/// Fill missing tags from the file path.
///
/// Only absent tags are set, except that a generic `Track N` title is
/// replaced.  When `regex` does not match, the file stem becomes the title
/// if there is none.
pub fn infer_from_path(tags: &mut TagMap, path: &Path, regex: &Regex) {
    let full = path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let text = full.to_string_lossy();

    let Some(caps) = regex.captures(&text) else {
        if !tags.contains_key("Title") {
            if let Some(stem) = full.file_stem() {
                tags.set("Title", [stem.to_string_lossy().into_owned()]);
            }
        }
        return;
    };

    let group = |name: &str| caps.name(name).map(|m| m.as_str()).filter(|s| !s.is_empty());

    for (tag, name) in [("Artist", "artist"), ("Album", "album"), ("Date", "date"), ("DiscNumber", "disc")] {
        if let Some(value) = group(name) {
            if !tags.contains_key(tag) {
                tags.set(tag, [value]);
            }
        }
    }
    if let Some(track) = group("track") {
        if !tags.contains_key("TrackNumber") {
            tags.set("TrackNumber", [pad_track(track)]);
        }
    }
    if let Some(title) = group("title") {
        let generic = tags.first("Title").map_or(true, |t| t.starts_with("Track "));
        if generic {
            tags.set("Title", [title]);
        }
    }
}

/// Strip `(instrument)` roles from performer credits.
pub fn remove_instruments(tags: &mut TagMap) {
    if let Some(performers) = tags.get("Performer") {
        let names = titles::remove_artist_roles(performers);
        tags.set("Performer", names);
    }
}

/// Split a `Title (disc N: Subtitle)` album title.
pub fn split_disc_title(tags: &mut TagMap) {
    let Some(albums) = tags.get("Album").map(|v| v.to_vec()) else {
        return;
    };
    for album in albums {
        let parsed = titles::parse_album_title(&album);
        if let Some(disc) = parsed.disc {
            tags.set("Album", [parsed.title]);
            tags.set("DiscNumber", [disc]);
        }
        if let Some(subtitle) = parsed.subtitle {
            tags.set("DiscSubtitle", [subtitle]);
        }
    }
}

/// Split `Work: Part / Part` titles into `Work` and `Part` tags.
///
/// With `classical`, a title that is left without a work becomes the work.
pub fn split_title_to_work_and_parts(tags: &mut TagMap, classical: bool) {
    let Some(titles_list) = tags.get("Title").map(|v| v.to_vec()) else {
        return;
    };
    for title in titles_list {
        let parsed = titles::parse_track_title(&title);
        if let Some(parts) = parsed.parts {
            tags.remove("Title", &title);
            if let Some(work) = parsed.work {
                tags.append_unique("Work", work);
            }
            tags.extend_unique("Part", parts);
        }
        if classical && !tags.contains_key("Work") {
            tags.move_values("Title", "Work");
        }
    }
}

/// Spell every various-artists album artist as the internal sentinel so
/// merges compare like with like.
pub fn normalize_various(tags: &mut TagMap, various: &str) {
    for tag in ALBUM_ARTIST_TAGS {
        tags.replace(tag, DEFAULT_VARIOUS, VARIOUS_ARTISTS);
        tags.replace(tag, various, VARIOUS_ARTISTS);
    }
}

/// Apply an artist relation.  A name stored in the wrong tag (sort name as
/// name or the reverse) is corrected in place.
pub fn apply_relation(tags: &mut TagMap, relation: &Relation) {
    tags.append_replace(&relation.tag, &relation.sort_name, &relation.name);
    let sort_tag = format!("{}Sort", relation.tag);
    tags.append_replace(&sort_tag, &relation.name, &relation.sort_name);
}

/// Apply release metadata to a merged disc.
pub fn apply_release_record(disc: &mut Disc, record: &ReleaseRecord) {
    disc.flags.is_single_artist = Some(record.is_single_artist);
    let tags = &mut disc.tags;

    let parsed = titles::parse_album_title(&record.title);
    if let Some(number) = parsed.disc {
        tags.set("Album", [parsed.title]);
        tags.set("DiscNumber", [number]);
    }
    if let Some(subtitle) = parsed.subtitle {
        tags.set("DiscSubtitle", [subtitle]);
    }

    if let Some(date) = record.earliest_release_date() {
        match tags.first("Date") {
            None => tags.set("Date", [date]),
            Some(existing) if existing != date && !tags.contains_key("OriginalDate") => {
                tags.set("OriginalDate", [date]);
            }
            Some(_) => {}
        }
    }

    for relation in record.artist_relations() {
        apply_relation(tags, &relation);
    }
}

// ── Release builder ──────────────────────────────────────────────────────

pub struct ReleaseBuilder<'a> {
    adapter: &'a dyn TagAdapter,
    lookup: Option<&'a mut dyn MetadataLookup>,
    options: ReadOptions,
    path_regex: Regex,
}

impl<'a> ReleaseBuilder<'a> {
    /// # Returns
    /// `Error::Regex` when the configured path expression does not compile.
    pub fn new(adapter: &'a dyn TagAdapter, options: ReadOptions) -> Result<Self> {
        let pattern = options.path_regex.clone().unwrap_or_else(default_path_regex);
        let path_regex = Regex::new(&pattern)?;
        Ok(ReleaseBuilder {
            adapter,
            lookup: None,
            options,
            path_regex,
        })
    }

    /// Use `lookup` for MusicBrainz data when `call_musicbrainz` is set.
    pub fn with_lookup(mut self, lookup: &'a mut dyn MetadataLookup) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Read `files` into a merged release.
    pub fn read<P: AsRef<Path>>(&mut self, files: &[P]) -> Result<Release> {
        if self.options.call_musicbrainz && self.lookup.is_none() && self.options.warnings.general() {
            warn!("no metadata lookup available; skipping MusicBrainz data");
        }

        let mut release = Release::new();
        for path in files {
            let track = self.read_track(path.as_ref())?;
            let number = track.tags.first("DiscNumber").map(str::to_string);
            let index = match release.discs.iter().position(|d| d.number() == number.as_deref()) {
                Some(index) => index,
                None => {
                    release.discs.push(Disc::new(number.as_deref()));
                    release.discs.len() - 1
                }
            };
            release.discs[index].tracks.push(track);
        }

        let various = self.options.various.clone();
        for disc in &mut release.discs {
            merge_children(disc, &various);
            self.lookup_disc(disc);
        }

        merge_children(&mut release, &various);

        for tag in ALBUM_ARTIST_TAGS {
            release.replace_all(tag, VARIOUS_ARTISTS, &various);
        }

        info!("Read {} tracks on {} discs", release.track_count(), release.discs.len());
        trace!("{}", release);
        Ok(release)
    }

    fn read_track(&mut self, path: &Path) -> Result<Track> {
        debug!("Reading {}", path.display());
        let mut tags = TagMap::from_pairs_unique(self.adapter.read(path)?);
        let opts = &self.options;

        if opts.infer_from_path {
            infer_from_path(&mut tags, path, &self.path_regex);
        }
        if opts.remove_instruments {
            remove_instruments(&mut tags);
        }
        if opts.parse_disc {
            split_disc_title(&mut tags);
        }
        if opts.parse_title {
            split_title_to_work_and_parts(&mut tags, opts.classical);
        }
        normalize_various(&mut tags, &opts.various);

        if opts.call_musicbrainz {
            self.lookup_track(&mut tags);
        }

        Ok(Track::new(tags))
    }

    fn lookup_track(&mut self, tags: &mut TagMap) {
        let Some(lookup) = self.lookup.as_deref_mut() else {
            return;
        };
        let ids = tags.get("musicbrainz_trackid").map(|v| v.to_vec()).unwrap_or_default();
        for id in ids {
            match lookup.recording(&id) {
                Ok(record) => {
                    for relation in record.artist_relations() {
                        apply_relation(tags, &relation);
                    }
                }
                Err(e) => {
                    if self.options.warnings.general() {
                        warn!("recording lookup for {} skipped: {}", id, e);
                    }
                }
            }
        }
    }

    fn lookup_disc(&mut self, disc: &mut Disc) {
        if !self.options.call_musicbrainz {
            return;
        }
        let Some(lookup) = self.lookup.as_deref_mut() else {
            return;
        };
        let ids = match &self.options.release_mbid {
            Some(id) => vec![id.clone()],
            None => disc.tags.get("musicbrainz_albumid").map(|v| v.to_vec()).unwrap_or_default(),
        };
        for id in ids {
            match lookup.release(&id) {
                Ok(record) => apply_release_record(disc, &record),
                Err(e) => {
                    if self.options.warnings.general() {
                        warn!("release lookup for {} skipped: {}", id, e);
                    }
                }
            }
        }
    }
}
