//! Hoisting of tag values shared by every child up to the parent.
//!
//! A value common to all children of a disc (or all discs of a release) is
//! stored once on the parent and removed from the children.  The hoisted set
//! also drives the single-artist / various-artists flags.

use tracing::debug;

use crate::entity::{ArtistFlags, Disc, Release};
use crate::tagmap::TagMap;
use crate::tags::VARIOUS_ARTISTS;

/// A parent entity whose children can be merged into it.
pub trait ParentEntity {
    fn tags_mut(&mut self) -> &mut TagMap;
    fn flags_mut(&mut self) -> &mut ArtistFlags;
    fn child_tags(&self) -> Vec<&TagMap>;
    fn child_tags_mut(&mut self) -> Vec<&mut TagMap>;
}

impl ParentEntity for Disc {
    fn tags_mut(&mut self) -> &mut TagMap {
        &mut self.tags
    }

    fn flags_mut(&mut self) -> &mut ArtistFlags {
        &mut self.flags
    }

    fn child_tags(&self) -> Vec<&TagMap> {
        self.tracks.iter().map(|t| &t.tags).collect()
    }

    fn child_tags_mut(&mut self) -> Vec<&mut TagMap> {
        self.tracks.iter_mut().map(|t| &mut t.tags).collect()
    }
}

impl ParentEntity for Release {
    fn tags_mut(&mut self) -> &mut TagMap {
        &mut self.tags
    }

    fn flags_mut(&mut self) -> &mut ArtistFlags {
        &mut self.flags
    }

    fn child_tags(&self) -> Vec<&TagMap> {
        self.discs.iter().map(|d| &d.tags).collect()
    }

    fn child_tags_mut(&mut self) -> Vec<&mut TagMap> {
        self.discs.iter_mut().map(|d| &mut d.tags).collect()
    }
}

/// Set the artist flags from the values hoisted in a merge.
///
/// A single-artist flag that an earlier step already decided is kept.  When
/// the entity turns out to be various-artists and no album artist was common
/// to the children, `various` is added as the album artist.
fn set_artist_flags<P: ParentEntity>(parent: &mut P, common: &TagMap, various: &str) {
    let flags = parent.flags_mut();
    let single = *flags
        .is_single_artist
        .get_or_insert_with(|| common.contains_key("Artist"));

    let various_album_artist = match common.get("AlbumArtist") {
        None => true,
        Some(values) => values.iter().any(|v| v == VARIOUS_ARTISTS || v == various),
    };
    let is_various = !single && various_album_artist;
    flags.is_various = Some(is_various);

    if is_various && !common.contains_key("AlbumArtist") {
        let tags = parent.tags_mut();
        tags.append("AlbumArtist", various);
        tags.append("AlbumArtistSort", various);
    }
}

/// Merge the values common to all children into `parent`.
///
/// Returns the hoisted values.  A parent without children is left untouched
/// and an empty map is returned.
pub fn merge_children<P: ParentEntity>(parent: &mut P, various: &str) -> TagMap {
    let common = {
        let children = parent.child_tags();
        if children.is_empty() {
            return TagMap::new();
        }
        TagMap::common_values(&children)
    };

    parent.tags_mut().merge_unique(&common);
    set_artist_flags(parent, &common, various);

    for child in parent.child_tags_mut() {
        child.remove_all(&common);
    }

    debug!("Hoisted {} common tags", common.len());
    common
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Track;

    fn track(pairs: &[(&str, &str)]) -> Track {
        Track::new(pairs.iter().copied().collect())
    }

    fn disc_with(tracks: Vec<Track>) -> Disc {
        let mut disc = Disc::new(Some("1"));
        disc.tracks = tracks;
        disc
    }

    #[test]
    fn test_common_values_move_to_parent() {
        let mut disc = disc_with(vec![
            track(&[("TrackNumber", "01"), ("Genre", "Rock"), ("Artist", "A")]),
            track(&[("TrackNumber", "02"), ("Genre", "Rock"), ("Artist", "A")]),
        ]);
        let common = merge_children(&mut disc, "Various");

        assert!(common.contains("Genre", "Rock"));
        assert!(disc.tags.contains("Genre", "Rock"));
        assert!(disc.tags.contains("Artist", "A"));
        for t in &disc.tracks {
            assert!(!t.tags.contains_key("Genre"));
            assert!(!t.tags.contains_key("Artist"));
            assert!(t.tags.contains_key("TrackNumber"));
        }
        assert_eq!(disc.flags.is_single_artist, Some(true));
        assert_eq!(disc.flags.is_various, Some(false));
    }

    #[test]
    fn test_parent_keeps_its_own_values_first() {
        let mut disc = disc_with(vec![
            track(&[("Genre", "Jazz"), ("Genre", "Rock")]),
            track(&[("Genre", "Rock"), ("Genre", "Jazz")]),
        ]);
        disc.tags.append("Genre", "Rock");
        merge_children(&mut disc, "Various");
        assert_eq!(disc.tags.get("Genre").unwrap(), &["Rock", "Jazz"]);
    }

    #[test]
    fn test_no_common_values_after_merge() {
        let mut disc = disc_with(vec![
            track(&[("Genre", "Rock"), ("Composer", "X"), ("Title", "a")]),
            track(&[("Genre", "Rock"), ("Composer", "X"), ("Title", "b")]),
            track(&[("Genre", "Rock"), ("Composer", "Y"), ("Title", "c")]),
        ]);
        let hoisted = merge_children(&mut disc, "Various");
        let after = TagMap::common_values(&disc.child_tags());
        for key in hoisted.keys() {
            assert!(!after.contains_key(key), "{} still common", key);
        }
    }

    #[test]
    fn test_single_child_is_emptied() {
        let mut disc = disc_with(vec![track(&[("Title", "Only"), ("Artist", "A")])]);
        merge_children(&mut disc, "Various");
        assert!(disc.tracks[0].tags.is_empty());
        assert_eq!(disc.tags.first("Title"), Some("Only"));
    }

    #[test]
    fn test_zero_children_is_a_noop() {
        let mut disc = Disc::new(Some("1"));
        let common = merge_children(&mut disc, "Various");
        assert!(common.is_empty());
        assert_eq!(disc.flags, ArtistFlags::default());
        assert_eq!(disc.tags.len(), 1);
    }

    #[test]
    fn test_various_artists_get_label() {
        let mut disc = disc_with(vec![
            track(&[("Artist", "A"), ("Title", "a")]),
            track(&[("Artist", "B"), ("Title", "b")]),
        ]);
        merge_children(&mut disc, "Various");
        assert_eq!(disc.flags.is_single_artist, Some(false));
        assert_eq!(disc.flags.is_various, Some(true));
        assert_eq!(disc.tags.first("AlbumArtist"), Some("Various"));
        assert_eq!(disc.tags.first("AlbumArtistSort"), Some("Various"));
    }

    #[test]
    fn test_shared_album_artist_is_not_various() {
        let mut disc = disc_with(vec![
            track(&[("Artist", "A"), ("AlbumArtist", "A & B")]),
            track(&[("Artist", "B"), ("AlbumArtist", "A & B")]),
        ]);
        merge_children(&mut disc, "Various");
        assert_eq!(disc.flags.is_various, Some(false));
        assert_eq!(disc.tags.get("AlbumArtist").unwrap(), &["A & B"]);
    }

    #[test]
    fn test_sentinel_album_artist_is_various() {
        let mut disc = disc_with(vec![
            track(&[("Artist", "A"), ("AlbumArtist", VARIOUS_ARTISTS)]),
            track(&[("Artist", "B"), ("AlbumArtist", VARIOUS_ARTISTS)]),
        ]);
        merge_children(&mut disc, "VA");
        assert_eq!(disc.flags.is_various, Some(true));
        assert_eq!(disc.tags.get("AlbumArtist").unwrap(), &[VARIOUS_ARTISTS]);
        assert!(!disc.tags.contains_key("AlbumArtistSort"));
    }

    #[test]
    fn test_predetermined_single_artist_is_kept() {
        let mut disc = disc_with(vec![
            track(&[("Artist", "A")]),
            track(&[("Artist", "A feat. B")]),
        ]);
        disc.flags.is_single_artist = Some(true);
        merge_children(&mut disc, "Various");
        assert_eq!(disc.flags.is_single_artist, Some(true));
        assert_eq!(disc.flags.is_various, Some(false));
        assert!(!disc.tags.contains_key("AlbumArtist"));
    }

    #[test]
    fn test_release_merges_discs() {
        let mut release = Release::new();
        for n in ["1", "2"] {
            let mut disc = Disc::new(Some(n));
            disc.tags.append("Genre", "Classical");
            release.discs.push(disc);
        }
        merge_children(&mut release, "Various");
        assert!(release.tags.contains("Genre", "Classical"));
        assert!(release.discs.iter().all(|d| !d.tags.contains_key("Genre")));
        assert_eq!(release.discs[1].number(), Some("2"));
    }
}
