//! Parsing of MusicBrainz-style artist, track and album titles.

use once_cell::sync::Lazy;
use regex::Regex;

static ARTIST_ROLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<name>[^(]*) \((?P<role>.*)\)$").unwrap());
static TRACK_TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<work>[^:]+): (?P<parts>.+)$").unwrap());
static ALBUM_TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<title>.+) \(disc (?P<disc>\d+)(: (?P<subtitle>.*))?\)").unwrap()
});

/// A performer credit split into name and role, e.g. `Jane Doe (violin)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistRole {
    pub name: String,
    pub role: Option<String>,
}

/// A track title split into work and parts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkParts {
    pub work: Option<String>,
    /// `None` when the title has no part structure at all.
    pub parts: Option<Vec<String>>,
}

/// An album title split into title, disc number and disc subtitle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumTitle {
    pub title: String,
    pub disc: Option<String>,
    pub subtitle: Option<String>,
}

pub fn parse_artist_role(artist: &str) -> ArtistRole {
    match ARTIST_ROLE_RE.captures(artist) {
        Some(caps) => ArtistRole {
            name: caps["name"].to_string(),
            role: Some(caps["role"].to_string()),
        },
        None => ArtistRole {
            name: artist.to_string(),
            role: None,
        },
    }
}

/// Drop the role suffix from every performer credit.
pub fn remove_artist_roles(artists: &[String]) -> Vec<String> {
    artists.iter().map(|a| parse_artist_role(a).name).collect()
}

/// Split `Work: Part A / Part B` into its work and parts.
///
/// A title without a colon can still carry parts separated by ` / `.
pub fn parse_track_title(title: &str) -> WorkParts {
    let (work, rest) = match TRACK_TITLE_RE.captures(title) {
        Some(caps) => (Some(caps["work"].to_string()), caps["parts"].to_string()),
        None => (None, title.to_string()),
    };

    let parts = if rest.contains(" / ") {
        Some(rest.split(" / ").map(str::to_string).collect())
    } else if work.is_some() {
        Some(vec![rest])
    } else {
        None
    };

    WorkParts { work, parts }
}

/// Split `Title (disc 2: Subtitle)`.
pub fn parse_album_title(title: &str) -> AlbumTitle {
    match ALBUM_TITLE_RE.captures(title) {
        Some(caps) => AlbumTitle {
            title: caps["title"].to_string(),
            disc: Some(caps["disc"].to_string()),
            subtitle: caps.name("subtitle").map(|m| m.as_str().to_string()),
        },
        None => AlbumTitle {
            title: title.to_string(),
            disc: None,
            subtitle: None,
        },
    }
}

/// Build a title from work and part values: `Work: Part 1 / Part 2`.
pub fn build_work_part_title(work: &[String], parts: &[String]) -> String {
    let mut title = work.join(" / ");
    if !work.is_empty() && !parts.is_empty() {
        title.push_str(": ");
    }
    title.push_str(&parts.join(" / "));
    title
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artist_role() {
        let parsed = parse_artist_role("Jane Doe (violin)");
        assert_eq!(parsed.name, "Jane Doe");
        assert_eq!(parsed.role.as_deref(), Some("violin"));

        let plain = parse_artist_role("Jane Doe");
        assert_eq!(plain.name, "Jane Doe");
        assert!(plain.role.is_none());
    }

    #[test]
    fn test_remove_artist_roles() {
        let performers = vec!["A (piano)".to_string(), "B".to_string()];
        assert_eq!(remove_artist_roles(&performers), vec!["A", "B"]);
    }

    #[test]
    fn test_track_title_with_work() {
        let parsed = parse_track_title("Symphony No. 5: I. Allegro con brio");
        assert_eq!(parsed.work.as_deref(), Some("Symphony No. 5"));
        assert_eq!(parsed.parts.unwrap(), vec!["I. Allegro con brio"]);
    }

    #[test]
    fn test_track_title_with_several_parts() {
        let parsed = parse_track_title("Suite: Prelude / Fugue");
        assert_eq!(parsed.parts.unwrap(), vec!["Prelude", "Fugue"]);

        let no_work = parse_track_title("Prelude / Fugue");
        assert!(no_work.work.is_none());
        assert_eq!(no_work.parts.unwrap(), vec!["Prelude", "Fugue"]);
    }

    #[test]
    fn test_plain_track_title() {
        assert_eq!(parse_track_title("Yesterday"), WorkParts::default());
    }

    #[test]
    fn test_album_title() {
        let parsed = parse_album_title("The Wall (disc 2: Live)");
        assert_eq!(parsed.title, "The Wall");
        assert_eq!(parsed.disc.as_deref(), Some("2"));
        assert_eq!(parsed.subtitle.as_deref(), Some("Live"));

        let no_subtitle = parse_album_title("The Wall (disc 1)");
        assert_eq!(no_subtitle.disc.as_deref(), Some("1"));
        assert!(no_subtitle.subtitle.is_none());

        let plain = parse_album_title("Abbey Road");
        assert_eq!(plain.title, "Abbey Road");
        assert!(plain.disc.is_none());
    }

    #[test]
    fn test_build_work_part_title() {
        let work = vec!["Suite".to_string()];
        let parts = vec!["Prelude".to_string(), "Fugue".to_string()];
        assert_eq!(build_work_part_title(&work, &parts), "Suite: Prelude / Fugue");
        assert_eq!(build_work_part_title(&work, &[]), "Suite");
        assert_eq!(build_work_part_title(&[], &parts), "Prelude / Fugue");
    }
}
