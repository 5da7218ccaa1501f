//! Canonical tag vocabulary.
//!
//! Tag names used throughout the crate, the groups of tags supported at each
//! level of the release hierarchy, and the rename maps used when writing
//! sort names.

use std::collections::HashMap;

/// Internal placeholder for the various-artists album artist while a release
/// is being assembled.  Replaced by the caller's label once merging is done.
pub const VARIOUS_ARTISTS: &str = "Various Artists";

/// Every tag name the tool knows about.  Names outside this set pass through
/// untouched but trigger an "unrecognized tag" warning.
pub const CANONICAL_TAGS: &[&str] = &[
    "Album",
    "AlbumArtist",
    "AlbumArtistNonSort",
    "AlbumArtistSort",
    "AlbumArtists",
    "AlbumArtistsSort",
    "Arranger",
    "ArrangerSort",
    "Artist",
    "ArtistNonSort",
    "ArtistSort",
    "Artists",
    "ArtistsSort",
    "ASIN",
    "Barcode",
    "CatalogNumber",
    "Comment",
    "Compilation",
    "Composer",
    "ComposerSort",
    "Conductor",
    "ConductorSort",
    "CoverNumber",
    "Date",
    "DiscNumber",
    "DiscSubtitle",
    "DJMixer",
    "Engineer",
    "Genre",
    "ISRC",
    "Label",
    "LabelId",
    "Language",
    "Lyricist",
    "LyricistSort",
    "Media",
    "Mixer",
    "OriginalDate",
    "OriginalYear",
    "Part",
    "Performer",
    "PerformerSort",
    "Producer",
    "ReleaseCountry",
    "ReleaseStatus",
    "ReleaseType",
    "Script",
    "Title",
    "TotalDiscs",
    "TotalTracks",
    "TrackNumber",
    "Version",
    "Work",
    "Writer",
    "WriterSort",
    "acoustid_id",
    "musicbrainz_albumartistid",
    "musicbrainz_albumid",
    "musicbrainz_albumstatus",
    "musicbrainz_albumtype",
    "musicbrainz_artistid",
    "musicbrainz_discid",
    "musicbrainz_releasegroupid",
    "musicbrainz_trackid",
    "musicbrainz_releasetrackid",
    "musicbrainz_workid",
    "replaygain_album_peak",
    "replaygain_album_gain",
    "replaygain_track_peak",
    "replaygain_track_gain",
];

/// Names written by other taggers that map onto a different canonical tag.
const READ_ALIASES: &[(&str, &str)] = &[
    ("remixer", "Arranger"),
    ("djmixer", "Arranger"),
    ("disctotal", "TotalDiscs"),
    ("tracktotal", "TotalTracks"),
];

// ── Per-level tag groups used by the structured layout ───────────────────

pub const RELEASE_TAGS: &[&str] = &[
    "Album", "AlbumArtist", "AlbumArtistSort", "AlbumArtists", "AlbumArtistsSort", "Arranger",
    "ArrangerSort", "Artist", "ArtistSort", "ASIN", "Barcode", "CatalogNumber", "Comment",
    "Composer", "ComposerSort", "Conductor", "ConductorSort", "Date", "Genre", "LabelId",
    "Lyricist", "LyricistSort", "OriginalDate", "Part", "Performer", "PerformerSort", "Title",
    "Version", "Writer", "Work", "WriterSort",
];

pub const DISC_TAGS: &[&str] = &[
    "AlbumArtist", "AlbumArtistSort", "AlbumArtists", "AlbumArtistsSort", "Arranger",
    "ArrangerSort", "Artist", "ArtistSort", "Comment", "Composer", "ComposerSort", "Conductor",
    "ConductorSort", "CoverNumber", "Date", "DiscNumber", "DiscSubtitle", "Genre", "Lyricist",
    "LyricistSort", "OriginalDate", "Part", "Performer", "PerformerSort", "Title", "Version",
    "Work", "Writer", "WriterSort",
];

pub const TRACK_TAGS: &[&str] = &[
    "Arranger", "ArrangerSort", "Artist", "ArtistSort", "Artists", "ArtistsSort", "Comment",
    "Composer", "ComposerSort", "Conductor", "ConductorSort", "CoverNumber", "Genre", "Lyricist",
    "LyricistSort", "Part", "Performer", "PerformerSort", "Title", "TrackNumber", "Version",
    "Work", "Writer", "WriterSort",
];

pub const MUSICBRAINZ_TAGS: &[&str] = &[
    "musicbrainz_albumid",
    "musicbrainz_albumartistid",
    "musicbrainz_artistid",
    "musicbrainz_discid",
    "musicbrainz_releasegroupid",
    "musicbrainz_releasetrackid",
    "musicbrainz_trackid",
    "musicbrainz_workid",
    "acoustid_id",
];

pub const REPLAYGAIN_TAGS: &[&str] = &[
    "replaygain_album_peak",
    "replaygain_album_gain",
    "replaygain_track_peak",
    "replaygain_track_gain",
];

// ── Apply-time checks ────────────────────────────────────────────────────

/// Tags every written file is expected to carry.
pub const MINIMAL_TAGS: &[&str] = &[
    "AlbumArtist",
    "AlbumArtistSort",
    "AlbumArtists",
    "AlbumArtistsSort",
    "Artist",
    "ArtistSort",
    "Date",
    "LabelId",
    "Title",
    "Performer",
    "PerformerSort",
    "TrackNumber",
    "Genre",
    "musicbrainz_albumartistid",
    "musicbrainz_albumid",
    "musicbrainz_artistid",
    "musicbrainz_trackid",
    "replaygain_album_peak",
    "replaygain_album_gain",
    "replaygain_track_peak",
    "replaygain_track_gain",
];

/// Tags a lone file is expected to carry when there is no album around it.
pub const SINGLE_FILE_MINIMAL_TAGS: &[&str] = &[
    "Artist",
    "ArtistSort",
    "Date",
    "Title",
    "Performer",
    "PerformerSort",
    "Genre",
    "musicbrainz_artistid",
    "musicbrainz_trackid",
    "replaygain_track_peak",
    "replaygain_track_gain",
];

/// Whether `tag` is part of the canonical vocabulary.
pub fn is_canonical(tag: &str) -> bool {
    CANONICAL_TAGS.contains(&tag)
}

/// Map a tag name read from an audio file onto its canonical spelling.
///
/// Matching is case-insensitive and goes through the alias table first.
/// Returns `None` when the name is not part of the vocabulary.
pub fn canonical_name(tag: &str) -> Option<&'static str> {
    let lower = tag.to_lowercase();
    let lookup = READ_ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, target)| target.to_lowercase())
        .unwrap_or(lower);

    CANONICAL_TAGS
        .iter()
        .copied()
        .find(|canonical| canonical.to_lowercase() == lookup)
}

/// How artist names and sort names are laid out in written files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortNameMode {
    /// Write names exactly as they appear in the tag file.
    #[default]
    Preserve,
    /// Store sort names in the regular name tags and drop plain names.
    SortOnly,
    /// Store sort names in the regular name tags and plain names in `*NonSort` tags.
    SortAndNonSort,
}

const SORT_NAMES: &[(&str, &str)] = &[
    ("AlbumArtistSort", "AlbumArtist"),
    ("ArrangerSort", "Arranger"),
    ("ArtistSort", "Artist"),
    ("ComposerSort", "Composer"),
    ("ConductorSort", "Conductor"),
    ("LyricistSort", "Lyricist"),
    ("PerformerSort", "Performer"),
    ("WriterSort", "Writer"),
];

const PLAIN_NAMES: &[(&str, &str)] = &[
    ("AlbumArtist", "AlbumArtistNonSort"),
    ("Arranger", "ArrangerNonSort"),
    ("Artist", "ArtistNonSort"),
    ("Composer", "ComposerNonSort"),
    ("Lyricist", "LyricistNonSort"),
    ("Performer", "PerformerNonSort"),
    ("Writer", "WriterNonSort"),
];

impl SortNameMode {
    /// The tag rename map for this mode.  A `None` destination deletes the
    /// line.  `Preserve` has no map.
    pub fn rename_map(self) -> Option<HashMap<String, Option<String>>> {
        let plain_target = |nonsort: &str| match self {
            SortNameMode::SortOnly => None,
            _ => Some(nonsort.to_string()),
        };

        match self {
            SortNameMode::Preserve => None,
            SortNameMode::SortOnly | SortNameMode::SortAndNonSort => {
                let mut map = HashMap::new();
                for (sort, plain) in SORT_NAMES {
                    map.insert(sort.to_string(), Some(plain.to_string()));
                }
                for (plain, nonsort) in PLAIN_NAMES {
                    map.insert(plain.to_string(), plain_target(nonsort));
                }
                Some(map)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_name_is_case_insensitive() {
        assert_eq!(canonical_name("albumartist"), Some("AlbumArtist"));
        assert_eq!(canonical_name("TITLE"), Some("Title"));
        assert_eq!(canonical_name("MusicBrainz_TrackId"), Some("musicbrainz_trackid"));
    }

    #[test]
    fn test_canonical_name_aliases() {
        assert_eq!(canonical_name("REMIXER"), Some("Arranger"));
        assert_eq!(canonical_name("djmixer"), Some("Arranger"));
        assert_eq!(canonical_name("DISCTOTAL"), Some("TotalDiscs"));
        assert_eq!(canonical_name("tracktotal"), Some("TotalTracks"));
    }

    #[test]
    fn test_unknown_tag() {
        assert_eq!(canonical_name("MOOD"), None);
        assert!(!is_canonical("title"));
        assert!(is_canonical("Title"));
    }

    #[test]
    fn test_sort_only_map_drops_plain_names() {
        let map = SortNameMode::SortOnly.rename_map().unwrap();
        assert_eq!(map.get("ArtistSort"), Some(&Some("Artist".to_string())));
        assert_eq!(map.get("Artist"), Some(&None));
    }

    #[test]
    fn test_nonsort_map_moves_plain_names() {
        let map = SortNameMode::SortAndNonSort.rename_map().unwrap();
        assert_eq!(map.get("ComposerSort"), Some(&Some("Composer".to_string())));
        assert_eq!(
            map.get("AlbumArtist"),
            Some(&Some("AlbumArtistNonSort".to_string()))
        );
        assert!(SortNameMode::Preserve.rename_map().is_none());
    }
}
