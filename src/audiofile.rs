//! Reading and writing tags on audio files.
//!
//! The [`TagAdapter`] trait is the seam between the tag-file logic and real
//! audio containers.  [`LoftyAdapter`] implements it for Ogg Vorbis, Opus,
//! FLAC, MP3 and M4A files using `lofty`.

use std::fs;
use std::path::{Path, PathBuf};

use lofty::config::WriteOptions;
use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::{ItemKey, ItemValue, Tag, TagItem};
use tracing::{debug, warn};

use crate::config::WarningPolicy;
use crate::error::{Error, Result};
use crate::tagmap::TagMap;
use crate::tags;

pub const SUPPORTED_EXTENSIONS: &[&str] = &["ogg", "opus", "flac", "mp3", "m4a"];

/// Tag storage for one audio file.
pub trait TagAdapter {
    /// Read the file's tags as `(canonical name, value)` pairs in file order.
    fn read(&self, path: &Path) -> Result<Vec<(String, String)>>;

    /// Replace the file's tags with `tags`.
    fn write(&self, path: &Path, tags: &TagMap) -> Result<()>;
}

/// Fail with `FileType` unless `path` has a supported extension.
pub fn check_extension(path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(())
    } else {
        Err(Error::FileType(format!("invalid file extension: {}", path.display())))
    }
}

pub fn is_supported(path: &Path) -> bool {
    check_extension(path).is_ok()
}

/// Supported audio files directly inside `dir`, sorted by name.
pub fn supported_files_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_supported(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

// ── Canonical name <-> lofty key ─────────────────────────────────────────

/// Canonical tag name for a lofty key, if it has a dedicated variant.
fn tag_name(key: &ItemKey) -> Option<&'static str> {
    let name = match key {
        ItemKey::AlbumTitle => "Album",
        ItemKey::AlbumArtist => "AlbumArtist",
        ItemKey::AlbumArtistSortOrder => "AlbumArtistSort",
        ItemKey::TrackArtist => "Artist",
        ItemKey::TrackArtistSortOrder => "ArtistSort",
        ItemKey::Arranger | ItemKey::Remixer => "Arranger",
        ItemKey::Barcode => "Barcode",
        ItemKey::CatalogNumber => "CatalogNumber",
        ItemKey::Comment => "Comment",
        ItemKey::FlagCompilation => "Compilation",
        ItemKey::Composer => "Composer",
        ItemKey::ComposerSortOrder => "ComposerSort",
        ItemKey::Conductor => "Conductor",
        ItemKey::RecordingDate | ItemKey::Year => "Date",
        ItemKey::DiscNumber => "DiscNumber",
        ItemKey::DiscTotal => "TotalDiscs",
        ItemKey::SetSubtitle => "DiscSubtitle",
        ItemKey::Engineer => "Engineer",
        ItemKey::Genre => "Genre",
        ItemKey::Isrc => "ISRC",
        ItemKey::Label => "Label",
        ItemKey::Language => "Language",
        ItemKey::Lyricist => "Lyricist",
        ItemKey::MixDj => "DJMixer",
        ItemKey::MixEngineer => "Mixer",
        ItemKey::OriginalReleaseDate => "OriginalDate",
        ItemKey::Performer => "Performer",
        ItemKey::Producer => "Producer",
        ItemKey::TrackTitle => "Title",
        ItemKey::TrackSubtitle => "Version",
        ItemKey::TrackNumber => "TrackNumber",
        ItemKey::TrackTotal => "TotalTracks",
        ItemKey::Work => "Work",
        ItemKey::Writer => "Writer",
        ItemKey::MusicBrainzReleaseId => "musicbrainz_albumid",
        ItemKey::MusicBrainzReleaseArtistId => "musicbrainz_albumartistid",
        ItemKey::MusicBrainzArtistId => "musicbrainz_artistid",
        ItemKey::MusicBrainzReleaseGroupId => "musicbrainz_releasegroupid",
        ItemKey::MusicBrainzRecordingId => "musicbrainz_trackid",
        ItemKey::MusicBrainzTrackId => "musicbrainz_releasetrackid",
        ItemKey::MusicBrainzWorkId => "musicbrainz_workid",
        ItemKey::ReplayGainAlbumGain => "replaygain_album_gain",
        ItemKey::ReplayGainAlbumPeak => "replaygain_album_peak",
        ItemKey::ReplayGainTrackGain => "replaygain_track_gain",
        ItemKey::ReplayGainTrackPeak => "replaygain_track_peak",
        _ => return None,
    };
    Some(name)
}

/// lofty key used to store a canonical tag.  Tags without a dedicated
/// variant are stored under their own name.
fn item_key(tag: &str) -> ItemKey {
    match tag {
        "Album" => ItemKey::AlbumTitle,
        "AlbumArtist" => ItemKey::AlbumArtist,
        "AlbumArtistSort" => ItemKey::AlbumArtistSortOrder,
        "Artist" => ItemKey::TrackArtist,
        "ArtistSort" => ItemKey::TrackArtistSortOrder,
        "Arranger" => ItemKey::Arranger,
        "Barcode" => ItemKey::Barcode,
        "CatalogNumber" => ItemKey::CatalogNumber,
        "Comment" => ItemKey::Comment,
        "Compilation" => ItemKey::FlagCompilation,
        "Composer" => ItemKey::Composer,
        "ComposerSort" => ItemKey::ComposerSortOrder,
        "Conductor" => ItemKey::Conductor,
        "Date" => ItemKey::RecordingDate,
        "DiscNumber" => ItemKey::DiscNumber,
        "TotalDiscs" => ItemKey::DiscTotal,
        "DiscSubtitle" => ItemKey::SetSubtitle,
        "Engineer" => ItemKey::Engineer,
        "Genre" => ItemKey::Genre,
        "ISRC" => ItemKey::Isrc,
        "Label" => ItemKey::Label,
        "Language" => ItemKey::Language,
        "Lyricist" => ItemKey::Lyricist,
        "DJMixer" => ItemKey::MixDj,
        "Mixer" => ItemKey::MixEngineer,
        "OriginalDate" => ItemKey::OriginalReleaseDate,
        "Performer" => ItemKey::Performer,
        "Producer" => ItemKey::Producer,
        "Title" => ItemKey::TrackTitle,
        "Version" => ItemKey::TrackSubtitle,
        "TrackNumber" => ItemKey::TrackNumber,
        "TotalTracks" => ItemKey::TrackTotal,
        "Work" => ItemKey::Work,
        "Writer" => ItemKey::Writer,
        "musicbrainz_albumid" => ItemKey::MusicBrainzReleaseId,
        "musicbrainz_albumartistid" => ItemKey::MusicBrainzReleaseArtistId,
        "musicbrainz_artistid" => ItemKey::MusicBrainzArtistId,
        "musicbrainz_releasegroupid" => ItemKey::MusicBrainzReleaseGroupId,
        "musicbrainz_trackid" => ItemKey::MusicBrainzRecordingId,
        "musicbrainz_releasetrackid" => ItemKey::MusicBrainzTrackId,
        "musicbrainz_workid" => ItemKey::MusicBrainzWorkId,
        "replaygain_album_gain" => ItemKey::ReplayGainAlbumGain,
        "replaygain_album_peak" => ItemKey::ReplayGainAlbumPeak,
        "replaygain_track_gain" => ItemKey::ReplayGainTrackGain,
        "replaygain_track_peak" => ItemKey::ReplayGainTrackPeak,
        other => ItemKey::Unknown(other.to_string()),
    }
}

// ── lofty implementation ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct LoftyAdapter {
    warnings: WarningPolicy,
}

impl LoftyAdapter {
    pub fn new(warnings: WarningPolicy) -> Self {
        LoftyAdapter { warnings }
    }

    fn canonical(&self, key: &ItemKey) -> Option<String> {
        if let Some(name) = tag_name(key) {
            return Some(name.to_string());
        }
        let ItemKey::Unknown(raw) = key else {
            debug!("ignoring unmapped key {:?}", key);
            return None;
        };
        match tags::canonical_name(raw) {
            Some(name) => Some(name.to_string()),
            None => {
                if self.warnings.unrecognized() {
                    warn!("unrecognized tag: {}", raw);
                }
                Some(raw.clone())
            }
        }
    }
}

impl TagAdapter for LoftyAdapter {
    fn read(&self, path: &Path) -> Result<Vec<(String, String)>> {
        check_extension(path)?;
        let tagged = Probe::open(path)?.read()?;

        let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) else {
            return Ok(Vec::new());
        };

        let mut result = Vec::new();
        for item in tag.items() {
            let Some(value) = item.value().text() else {
                continue;
            };
            if let Some(name) = self.canonical(item.key()) {
                result.push((name, value.to_string()));
            }
        }
        debug!("{}: read {} tag values", path.display(), result.len());
        Ok(result)
    }

    fn write(&self, path: &Path, tags: &TagMap) -> Result<()> {
        check_extension(path)?;
        let tagged = Probe::open(path)?.read()?;
        let tag_type = tagged.file_type().primary_tag_type();

        let mut tag = Tag::new(tag_type);
        if let Some(existing) = tagged.primary_tag() {
            for picture in existing.pictures() {
                tag.push_picture(picture.clone());
            }
        }

        for (name, value) in tags.pairs() {
            let item = TagItem::new(item_key(name), ItemValue::Text(value.to_string()));
            if !tag.push(item) {
                warn!("{}: {} cannot be stored in a {:?} tag", path.display(), name, tag_type);
            }
        }

        tag.save_to_path(path, WriteOptions::default())?;
        debug!("{}: wrote {} tags", path.display(), tags.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_extension() {
        assert!(check_extension(Path::new("/music/01 - a.FLAC")).is_ok());
        assert!(check_extension(Path::new("/music/01 - a.opus")).is_ok());
        assert!(matches!(
            check_extension(Path::new("/music/01 - a.wav")),
            Err(Error::FileType(_))
        ));
        assert!(check_extension(Path::new("/music/noext")).is_err());
    }

    #[test]
    fn test_unsupported_file_is_rejected_before_io() {
        let adapter = LoftyAdapter::new(WarningPolicy::silent());
        let result = adapter.read(Path::new("/does/not/exist.txt"));
        assert!(matches!(result, Err(Error::FileType(_))));
        let result = adapter.write(Path::new("/does/not/exist.wav"), &TagMap::new());
        assert!(matches!(result, Err(Error::FileType(_))));
    }

    #[test]
    fn test_supported_files_in_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["02 - b.flac", "01 - a.mp3", "cover.jpg", "tags.txt", "03 - c.ogg"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let files = supported_files_in(dir.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["01 - a.mp3", "02 - b.flac", "03 - c.ogg"]);
    }

    #[test]
    fn test_key_mapping_round_trips() {
        for name in ["Album", "Artist", "Date", "musicbrainz_trackid", "musicbrainz_releasetrackid", "Work"] {
            assert_eq!(tag_name(&item_key(name)), Some(name));
        }
        assert_eq!(tag_name(&ItemKey::Remixer), Some("Arranger"));
        assert_eq!(item_key("Mood"), ItemKey::Unknown("Mood".to_string()));
    }

    #[test]
    fn test_unknown_keys_are_canonicalized() {
        let adapter = LoftyAdapter::new(WarningPolicy::silent());
        assert_eq!(
            adapter.canonical(&ItemKey::Unknown("ALBUMARTISTS".into())).as_deref(),
            Some("AlbumArtists")
        );
        assert_eq!(
            adapter.canonical(&ItemKey::Unknown("DISCTOTAL".into())).as_deref(),
            Some("TotalDiscs")
        );
        assert_eq!(
            adapter.canonical(&ItemKey::Unknown("MOOD".into())).as_deref(),
            Some("MOOD")
        );
    }
}
