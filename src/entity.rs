//! Release / disc / track hierarchy.
//!
//! Each entity owns one [`TagMap`] with its own tags.  Discs and releases also
//! own their children and a pair of artist flags that the merge step fills in.

use std::fmt;

use crate::tagfile::LineKind;
use crate::tagmap::TagMap;

/// Zero-pad a track number to two digits.
pub fn pad_track(number: &str) -> String {
    format!("{:0>2}", number)
}

/// Artist-identity flags.  `None` means "not determined yet".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArtistFlags {
    /// Every track shares one primary artist.  A release can have several
    /// track artists without being a various-artists release.
    pub is_single_artist: Option<bool>,
    pub is_various: Option<bool>,
}

impl ArtistFlags {
    fn describe(&self) -> String {
        let mut s = String::from(if self.is_single_artist == Some(true) {
            "Single-artist"
        } else {
            "Multi-artist"
        });
        if self.is_various == Some(true) {
            s.push_str("/Various");
        }
        s
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Release,
    Disc,
    Track,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Release => "release",
            EntityKind::Disc => "disc",
            EntityKind::Track => "track",
        };
        f.write_str(name)
    }
}

// ── Track ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Track {
    pub tags: TagMap,
}

impl Track {
    pub fn new(tags: TagMap) -> Self {
        Track { tags }
    }

    /// Track number, backed by the `TrackNumber` tag.
    pub fn number(&self) -> Option<&str> {
        self.tags.first("TrackNumber")
    }

    pub fn set_number(&mut self, number: &str) {
        self.tags.set("TrackNumber", [number]);
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TRACK: {}:", self.number().unwrap_or("None"))?;
        write!(f, "{}", self.tags)
    }
}

// ── Disc ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Disc {
    pub tags: TagMap,
    pub tracks: Vec<Track>,
    pub flags: ArtistFlags,
}

impl Disc {
    /// A new disc.  `None` means the release makes no disc distinction.
    pub fn new(number: Option<&str>) -> Self {
        let mut disc = Disc::default();
        if let Some(number) = number {
            disc.set_number(number);
        }
        disc
    }

    /// Disc number, backed by the `DiscNumber` tag.
    pub fn number(&self) -> Option<&str> {
        self.tags.first("DiscNumber")
    }

    pub fn set_number(&mut self, number: &str) {
        self.tags.set("DiscNumber", [number]);
    }

    /// Replace `old` with `new` under `key` in the disc and every track.
    pub fn replace_all(&mut self, key: &str, old: &str, new: &str) {
        self.tags.replace(key, old, new);
        for track in &mut self.tracks {
            track.tags.replace(key, old, new);
        }
    }
}

impl fmt::Display for Disc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "DISC: {} [{}]",
            self.number().unwrap_or("None"),
            self.flags.describe()
        )?;
        write!(f, "{}", self.tags)?;
        for track in &self.tracks {
            write!(f, "{}", track)?;
        }
        Ok(())
    }
}

// ── Release ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Release {
    pub tags: TagMap,
    pub discs: Vec<Disc>,
    pub flags: ArtistFlags,
}

impl Release {
    pub fn new() -> Self {
        Release::default()
    }

    /// Replace `old` with `new` under `key` everywhere in the hierarchy.
    pub fn replace_all(&mut self, key: &str, old: &str, new: &str) {
        self.tags.replace(key, old, new);
        for disc in &mut self.discs {
            disc.replace_all(key, old, new);
        }
    }

    /// Number of tracks across every disc.
    pub fn track_count(&self) -> usize {
        self.discs.iter().map(|d| d.tracks.len()).sum()
    }
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let multi_disc = if self.discs.len() > 1 { "/Multi-disc" } else { "" };
        writeln!(f, "RELEASE [{}{}]", self.flags.describe(), multi_disc)?;
        write!(f, "{}", self.tags)?;
        for disc in &self.discs {
            writeln!(f, "{}", disc)?;
        }
        Ok(())
    }
}

// ── Borrowed view over any entity ────────────────────────────────────────

/// A borrowed reference to one entity of the hierarchy.
///
/// Tracks carry their parent disc, because a track's address in a tag file
/// is composed from both numbers.
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Release(&'a Release),
    Disc(&'a Disc),
    Track {
        track: &'a Track,
        disc: Option<&'a Disc>,
    },
}

impl<'a> EntityRef<'a> {
    pub fn track(track: &'a Track, disc: &'a Disc) -> Self {
        EntityRef::Track {
            track,
            disc: Some(disc),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRef::Release(_) => EntityKind::Release,
            EntityRef::Disc(_) => EntityKind::Disc,
            EntityRef::Track { .. } => EntityKind::Track,
        }
    }

    pub fn tags(&self) -> &'a TagMap {
        match self {
            EntityRef::Release(release) => &release.tags,
            EntityRef::Disc(disc) => &disc.tags,
            EntityRef::Track { track, .. } => &track.tags,
        }
    }

    /// Line kind and composite id used to address this entity in a tag file.
    ///
    /// The release has an empty id.  A disc is addressed by its number, and a
    /// track by its disc number followed by the two-digit track number (or the
    /// bare track number when the disc has none).  Returns `None` when the
    /// number needed for the id is missing.
    pub fn scope(&self) -> Option<(LineKind, String)> {
        match self {
            EntityRef::Release(_) => Some((LineKind::Album, String::new())),
            EntityRef::Disc(disc) => disc.number().map(|n| (LineKind::Disc, n.to_string())),
            EntityRef::Track { track, disc } => {
                let number = pad_track(track.number()?);
                let id = match disc.and_then(|d| d.number()) {
                    Some(disc_number) => format!("{}{}", disc_number, number),
                    None => number,
                };
                Some((LineKind::Track, id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(number: &str, title: &str) -> Track {
        Track::new(
            [("TrackNumber", number), ("Title", title)]
                .into_iter()
                .collect(),
        )
    }

    #[test]
    fn test_numbers_come_from_tags() {
        let disc = Disc::new(Some("2"));
        assert_eq!(disc.number(), Some("2"));
        assert_eq!(Disc::new(None).number(), None);
        assert_eq!(track("7", "x").number(), Some("7"));
    }

    #[test]
    fn test_track_scope_with_disc() {
        let disc = Disc::new(Some("2"));
        let t = track("7", "x");
        let (kind, id) = EntityRef::track(&t, &disc).scope().unwrap();
        assert_eq!(kind, LineKind::Track);
        assert_eq!(id, "207");
    }

    #[test]
    fn test_track_scope_without_disc_number() {
        let disc = Disc::new(None);
        let t = track("3", "x");
        assert_eq!(EntityRef::track(&t, &disc).scope().unwrap().1, "03");

        let orphan = EntityRef::Track { track: &t, disc: None };
        assert_eq!(orphan.scope().unwrap().1, "03");
    }

    #[test]
    fn test_scope_missing_number() {
        let disc = Disc::new(None);
        assert!(EntityRef::Disc(&disc).scope().is_none());
        let t = Track::default();
        assert!(EntityRef::track(&t, &disc).scope().is_none());

        let release = Release::new();
        assert_eq!(
            EntityRef::Release(&release).scope(),
            Some((LineKind::Album, String::new()))
        );
    }

    #[test]
    fn test_replace_all_reaches_tracks() {
        let mut disc = Disc::new(Some("1"));
        let mut t = track("01", "x");
        t.tags.append("AlbumArtist", "Various Artists");
        disc.tracks.push(t);
        disc.tags.append("AlbumArtist", "Various Artists");

        let mut release = Release::new();
        release.tags.append("AlbumArtist", "Various Artists");
        release.discs.push(disc);

        release.replace_all("AlbumArtist", "Various Artists", "Various");
        assert_eq!(release.tags.first("AlbumArtist"), Some("Various"));
        assert_eq!(release.discs[0].tags.first("AlbumArtist"), Some("Various"));
        assert_eq!(
            release.discs[0].tracks[0].tags.first("AlbumArtist"),
            Some("Various")
        );
    }

    #[test]
    fn test_display_flags() {
        let mut release = Release::new();
        release.flags.is_various = Some(true);
        release.discs.push(Disc::new(Some("1")));
        release.discs.push(Disc::new(Some("2")));
        let text = release.to_string();
        assert!(text.starts_with("RELEASE [Multi-artist/Various/Multi-disc]"));
        assert!(text.contains("DISC: 2"));
    }
}
