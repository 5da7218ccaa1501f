//! Release and recording metadata from the MusicBrainz web service.
//!
//! The rest of the crate only sees the [`MetadataLookup`] trait and the
//! pre-shaped records below; [`MusicBrainzClient`] is the HTTP implementation.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::rate_limiter::RateLimiter;

const BASE_URL: &str = "https://musicbrainz.org/ws/2";

/// MBID of the special "Various Artists" artist.
pub const VARIOUS_ARTISTS_MBID: &str = "89ad4ac3-39f7-470e-963a-56509c546377";

/// Artist relation types and the tag each one is stored under.
const RELATION_TAGS: &[(&str, &str)] = &[
    ("arranger", "Arranger"),
    ("composer", "Composer"),
    ("conductor", "Conductor"),
    ("chorus master", "Conductor"),
    ("instrument", "Performer"),
    ("instrumentator", "Arranger"),
    ("lyricist", "Lyricist"),
    ("librettist", "Lyricist"),
    ("orchestrator", "Arranger"),
    ("performer", "Performer"),
    ("performing orchestra", "Performer"),
    ("programming", "Performer"),
    ("remixer", "Arranger"),
    ("vocal", "Performer"),
    ("writer", "Writer"),
];

// ── Records handed to the rest of the crate ──────────────────────────────

/// An artist credit as a display name plus sort name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credit {
    pub name: String,
    pub sort_name: String,
}

/// An artist relation mapped onto a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub tag: String,
    pub name: String,
    pub sort_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseEvent {
    pub date: String,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRecord {
    pub title: String,
    /// The credited artist is also the artist of every track.
    pub is_single_artist: bool,
    pub artist: Option<Credit>,
    pub events: Vec<ReleaseEvent>,
    pub relations: Vec<Relation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingRecord {
    pub title: String,
    pub artist: Option<Credit>,
    pub relations: Vec<Relation>,
}

impl ReleaseRecord {
    /// Earliest US release date, or the earliest date anywhere when there is
    /// no US release.
    pub fn earliest_release_date(&self) -> Option<&str> {
        let dated = || self.events.iter().filter(|e| !e.date.is_empty());
        let earliest_us = dated()
            .filter(|e| e.country.as_deref() == Some("US"))
            .map(|e| e.date.as_str())
            .min();
        earliest_us.or_else(|| dated().map(|e| e.date.as_str()).min())
    }

    /// Relations plus the credited artist, stored as `Artist` on a
    /// single-artist release and as `AlbumArtist` otherwise.
    pub fn artist_relations(&self) -> Vec<Relation> {
        let mut result = self.relations.clone();
        if let Some(credit) = &self.artist {
            let tag = if self.is_single_artist { "Artist" } else { "AlbumArtist" };
            result.push(Relation {
                tag: tag.to_string(),
                name: credit.name.clone(),
                sort_name: credit.sort_name.clone(),
            });
        }
        result
    }
}

impl RecordingRecord {
    /// Relations plus the recording artist as `Artist`.
    pub fn artist_relations(&self) -> Vec<Relation> {
        let mut result = self.relations.clone();
        if let Some(credit) = &self.artist {
            result.push(Relation {
                tag: "Artist".to_string(),
                name: credit.name.clone(),
                sort_name: credit.sort_name.clone(),
            });
        }
        result
    }
}

/// Source of release and recording metadata keyed by MBID.
pub trait MetadataLookup {
    fn release(&mut self, id: &str) -> Result<ReleaseRecord>;
    fn recording(&mut self, id: &str) -> Result<RecordingRecord>;
}

// ── Web service response types ───────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ArtistCredit {
    name: String,
    #[serde(default)]
    joinphrase: String,
    artist: Artist,
}

#[derive(Debug, Deserialize)]
struct Artist {
    id: String,
    name: String,
    #[serde(rename = "sort-name")]
    sort_name: String,
}

#[derive(Debug, Deserialize)]
struct RawRelation {
    #[serde(rename = "type")]
    relation_type: String,
    #[serde(rename = "target-type", default)]
    target_type: String,
    #[serde(default)]
    artist: Option<Artist>,
}

#[derive(Debug, Deserialize)]
struct Area {
    #[serde(rename = "iso-3166-1-codes", default)]
    codes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawReleaseEvent {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    area: Option<Area>,
}

#[derive(Debug, Deserialize)]
struct RawTrack {
    #[serde(rename = "artist-credit", default)]
    artist_credit: Vec<ArtistCredit>,
}

#[derive(Debug, Deserialize)]
struct Medium {
    #[serde(default)]
    tracks: Vec<RawTrack>,
}

#[derive(Debug, Deserialize)]
struct RawRelease {
    title: String,
    #[serde(rename = "artist-credit", default)]
    artist_credit: Vec<ArtistCredit>,
    #[serde(rename = "release-events", default)]
    release_events: Vec<RawReleaseEvent>,
    #[serde(default)]
    relations: Vec<RawRelation>,
    #[serde(default)]
    media: Vec<Medium>,
}

#[derive(Debug, Deserialize)]
struct RawRecording {
    title: String,
    #[serde(rename = "artist-credit", default)]
    artist_credit: Vec<ArtistCredit>,
    #[serde(default)]
    relations: Vec<RawRelation>,
}

// ── Response shaping ─────────────────────────────────────────────────────

fn credit(credits: &[ArtistCredit]) -> Option<Credit> {
    if credits.is_empty() {
        return None;
    }
    let mut name = String::new();
    let mut sort_name = String::new();
    for c in credits {
        name.push_str(&c.name);
        name.push_str(&c.joinphrase);
        sort_name.push_str(&c.artist.sort_name);
        sort_name.push_str(&c.joinphrase);
    }
    Some(Credit { name, sort_name })
}

fn credit_ids(credits: &[ArtistCredit]) -> Vec<&str> {
    credits.iter().map(|c| c.artist.id.as_str()).collect()
}

/// Map artist relations onto tags, dropping relation types with no tag.
fn map_relations(relations: &[RawRelation]) -> Vec<Relation> {
    relations
        .iter()
        .filter(|r| r.target_type.is_empty() || r.target_type == "artist")
        .filter_map(|r| {
            let (_, tag) = RELATION_TAGS
                .iter()
                .find(|(rel_type, _)| *rel_type == r.relation_type)?;
            let artist = r.artist.as_ref()?;
            Some(Relation {
                tag: tag.to_string(),
                name: artist.name.clone(),
                sort_name: artist.sort_name.clone(),
            })
        })
        .collect()
}

fn release_record(raw: RawRelease) -> ReleaseRecord {
    let release_ids = credit_ids(&raw.artist_credit);
    let is_various = release_ids.contains(&VARIOUS_ARTISTS_MBID);
    let tracks_match = raw
        .media
        .iter()
        .flat_map(|m| m.tracks.iter())
        .all(|t| t.artist_credit.is_empty() || credit_ids(&t.artist_credit) == release_ids);

    let events = raw
        .release_events
        .iter()
        .filter_map(|e| {
            let date = e.date.clone().filter(|d| !d.is_empty())?;
            let country = e.area.as_ref().and_then(|a| a.codes.first().cloned());
            Some(ReleaseEvent { date, country })
        })
        .collect();

    ReleaseRecord {
        is_single_artist: !release_ids.is_empty() && !is_various && tracks_match,
        artist: credit(&raw.artist_credit),
        relations: map_relations(&raw.relations),
        events,
        title: raw.title,
    }
}

fn recording_record(raw: RawRecording) -> RecordingRecord {
    RecordingRecord {
        artist: credit(&raw.artist_credit),
        relations: map_relations(&raw.relations),
        title: raw.title,
    }
}

/// Extract a release MBID from a MusicBrainz URL or a bare id.
pub fn parse_release_id(input: &str) -> Option<String> {
    // https://musicbrainz.org/release/768a1c5f-3657-4e29-aac4-c1de6ee5221f
    if let Some(idx) = input.rfind("/release/") {
        let id = &input[idx + "/release/".len()..];
        let id = id.split(['?', '#', '/']).next().unwrap_or(id);
        return Some(id.to_string());
    }
    if input.len() == 36 && input.chars().filter(|c| *c == '-').count() == 4 {
        Some(input.to_string())
    } else {
        None
    }
}

// ── HTTP client ──────────────────────────────────────────────────────────

pub struct MusicBrainzClient {
    user_agent: String,
    limiter: RateLimiter,
}

impl MusicBrainzClient {
    pub fn new(user_agent: Option<&str>) -> Self {
        let default_agent = concat!("tagsheet/", env!("CARGO_PKG_VERSION"));
        MusicBrainzClient {
            user_agent: user_agent.unwrap_or(default_agent).to_string(),
            limiter: RateLimiter::from_millis("MusicBrainz", 1100),
        }
    }

    fn fetch<T: DeserializeOwned>(&mut self, url: &str) -> Result<T> {
        self.limiter.pace();
        debug!("GET {}", url);

        let response = match ureq::get(url).set("User-Agent", &self.user_agent).call() {
            Ok(response) => response,
            Err(e) => {
                self.limiter.failed();
                return Err(Error::Lookup(format!("{}: {}", url, e)));
            }
        };
        self.limiter.succeeded();

        serde_json::from_reader(response.into_reader())
            .map_err(|e| Error::Lookup(format!("{}: {}", url, e)))
    }
}

impl MetadataLookup for MusicBrainzClient {
    fn release(&mut self, id: &str) -> Result<ReleaseRecord> {
        let url = format!(
            "{}/release/{}?inc=artist-credits+artist-rels+recordings&fmt=json",
            BASE_URL, id
        );
        let raw: RawRelease = self.fetch(&url)?;
        info!("MusicBrainz release {}: {}", id, raw.title);
        Ok(release_record(raw))
    }

    fn recording(&mut self, id: &str) -> Result<RecordingRecord> {
        let url = format!(
            "{}/recording/{}?inc=artist-credits+artist-rels&fmt=json",
            BASE_URL, id
        );
        let raw: RawRecording = self.fetch(&url)?;
        info!("MusicBrainz recording {}: {}", id, raw.title);
        Ok(recording_record(raw))
    }
}
