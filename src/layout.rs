//! Tag file generation from a merged [`Release`].
//!
//! The structured layout groups lines into commented sections (album info,
//! artists, composers, performers, works, discs, tracks) so the file reads
//! like a liner note.  The unstructured layout dumps every tag of every
//! entity in hierarchy order.

use crate::builder::TagFileBuilder;
use crate::config::WarningPolicy;
use crate::entity::{Disc, EntityKind, EntityRef, Release};
use crate::error::Result;
use crate::tagfile::TagFile;
use crate::tags::{DISC_TAGS, MUSICBRAINZ_TAGS, RELEASE_TAGS, REPLAYGAIN_TAGS, TRACK_TAGS};

/// Output switches for [`generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutOptions {
    /// Sectioned layout; `false` dumps every tag.
    pub structured: bool,
    /// Standard (non-MusicBrainz, non-ReplayGain) tags.
    pub standard: bool,
    pub musicbrainz: bool,
    pub replaygain: bool,
    /// Artists, composers and performers in blocks before the track list.
    pub artist_block: bool,
    /// Blank line after every track.
    pub break_tracks: bool,
    /// Works in a block before the track list.
    pub work_block: bool,
    /// Multi-value `Artists` tags for tracks.
    pub track_artists: bool,
    /// Tags outside the per-level supported sets.
    pub output_unsupported: bool,
    pub classical: bool,
    /// Lone file: no release identifier block.
    pub single_file: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        LayoutOptions {
            structured: true,
            standard: true,
            musicbrainz: true,
            replaygain: true,
            artist_block: true,
            break_tracks: false,
            work_block: false,
            track_artists: false,
            output_unsupported: false,
            classical: false,
            single_file: false,
        }
    }
}

// ── Line targets ─────────────────────────────────────────────────────────

/// Either one entity or all tracks of a disc, grouped by value.
#[derive(Clone, Copy)]
enum Target<'a> {
    One(EntityRef<'a>),
    Tracks(&'a Disc),
}

impl<'a> Target<'a> {
    fn refs(disc: &'a Disc) -> Vec<EntityRef<'a>> {
        disc.tracks.iter().map(|t| EntityRef::track(t, disc)).collect()
    }

    fn has(&self, key: &str) -> bool {
        match self {
            Target::One(entity) => entity.tags().contains_key(key),
            Target::Tracks(disc) => disc.tracks.iter().any(|t| t.tags.contains_key(key)),
        }
    }

    fn add(&self, b: &mut TagFileBuilder, key: &str) -> Result<()> {
        self.add_as(b, key, key)
    }

    fn add_as(&self, b: &mut TagFileBuilder, key: &str, as_tag: &str) -> Result<()> {
        match self {
            Target::One(entity) => {
                b.add_values_as(*entity, key, as_tag);
                Ok(())
            }
            Target::Tracks(disc) => b.add_grouped(&Self::refs(disc), as_tag, |tags| {
                tags.get(key).map(|v| v.to_vec()).unwrap_or_default()
            }),
        }
    }
}

fn add_artists(b: &mut TagFileBuilder, target: Target<'_>, opts: &LayoutOptions) -> Result<()> {
    target.add(b, "Artist")?;
    target.add(b, "ArtistSort")?;
    if opts.track_artists {
        for (multi, single) in [("Artists", "Artist"), ("ArtistsSort", "ArtistSort")] {
            if target.has(multi) {
                target.add(b, multi)?;
            } else {
                target.add_as(b, single, multi)?;
            }
        }
    }
    Ok(())
}

fn add_composers(b: &mut TagFileBuilder, target: Target<'_>) -> Result<()> {
    for key in [
        "Composer", "ComposerSort", "Writer", "WriterSort", "Arranger", "ArrangerSort", "Lyricist",
        "LyricistSort",
    ] {
        target.add(b, key)?;
    }
    Ok(())
}

fn add_performers(b: &mut TagFileBuilder, target: Target<'_>) -> Result<()> {
    for key in ["Conductor", "ConductorSort", "Performer", "PerformerSort"] {
        target.add(b, key)?;
    }
    Ok(())
}

/// Date, plus OriginalDate when it differs from Date.
fn add_dates(b: &mut TagFileBuilder, entity: EntityRef<'_>, require_date: bool) {
    if require_date {
        b.add_values_req(entity, "Date");
    } else {
        b.add_values(entity, "Date");
    }
    let tags = entity.tags();
    if let Some(original) = tags.first("OriginalDate") {
        if tags.first("Date") != Some(original) {
            b.add_values(entity, "OriginalDate");
        }
    }
}

/// Tags outside the supported set for the entity's level, in a
/// `Miscellaneous` section.
fn add_unsupported(b: &mut TagFileBuilder, entity: EntityRef<'_>) {
    let supported = match entity.kind() {
        EntityKind::Release => RELEASE_TAGS,
        EntityKind::Disc => DISC_TAGS,
        EntityKind::Track => TRACK_TAGS,
    };

    let mut found = false;
    for key in entity.tags().keys() {
        if supported.contains(&key) || MUSICBRAINZ_TAGS.contains(&key) || REPLAYGAIN_TAGS.contains(&key) {
            continue;
        }
        if !found {
            b.add_blank();
            b.add_comment("Miscellaneous");
            found = true;
        }
        b.add_values(entity, key);
    }
    if found {
        b.add_blank();
    }
}

// ── Sections ─────────────────────────────────────────────────────────────

fn add_album_block(b: &mut TagFileBuilder, release: &Release, opts: &LayoutOptions) -> Result<()> {
    let rel = EntityRef::Release(release);
    let tags = &release.tags;
    let single = release.flags.is_single_artist == Some(true);
    let various = release.flags.is_various == Some(true);

    b.add_comment("Album / common track info");
    // A various-artists release already got its label during the merge.
    if tags.contains_key("AlbumArtist") {
        b.add_values(rel, "AlbumArtist");
        b.add_values(rel, "AlbumArtistSort");
    } else if single {
        b.add_values_as(rel, "Artist", "AlbumArtist");
        b.add_values_as(rel, "ArtistSort", "AlbumArtistSort");
    }

    if tags.contains_key("AlbumArtists") {
        b.add_values(rel, "AlbumArtists");
        b.add_values(rel, "AlbumArtistsSort");
    } else if tags.contains_key("AlbumArtist") {
        b.add_values_as(rel, "AlbumArtist", "AlbumArtists");
        b.add_values_as(rel, "AlbumArtistSort", "AlbumArtistsSort");
    } else if single {
        b.add_values_as(rel, "Artist", "AlbumArtists");
        b.add_values_as(rel, "ArtistSort", "AlbumArtistsSort");
    }

    add_artists(b, Target::One(rel), opts)?;
    if tags.contains_key("Performer") {
        // written in the performers block
    } else if single {
        b.add_values_as(rel, "Artist", "Performer");
        b.add_values_as(rel, "ArtistSort", "PerformerSort");
    } else if !various {
        // Album artists are taken as the primary performers.
        if tags.contains_key("AlbumArtists") {
            b.add_values_as(rel, "AlbumArtists", "Performer");
            b.add_values_as(rel, "AlbumArtistsSort", "PerformerSort");
        } else {
            b.add_values_as(rel, "AlbumArtist", "Performer");
            b.add_values_as(rel, "AlbumArtistSort", "PerformerSort");
        }
    }
    if opts.classical && !opts.artist_block && single && !tags.contains_key("Composer") {
        b.add_values_as(rel, "Artist", "Composer");
        b.add_values_as(rel, "ArtistSort", "ComposerSort");
    }

    b.add_values_req(rel, "Album");
    if !opts.work_block {
        b.add_values(rel, "Work");
        b.add_values(rel, "Title");
        b.add_values(rel, "Part");
    }
    add_dates(b, rel, true);
    b.add_values_req(rel, "Genre");
    b.add_values(rel, "Version");
    b.add_values(rel, "Comment");
    b.add_values(rel, "Compilation");

    if !opts.single_file {
        b.add_comment("The following should be a unique identifier for the release (e.g., UPC or");
        b.add_comment("catalog number) to allow clients to merge a multi-disc set.");
        match ["LabelId", "Barcode", "CatalogNumber", "ASIN"]
            .into_iter()
            .find(|key| tags.contains_key(key))
        {
            Some(key) => b.add_values_as(rel, key, "LabelId"),
            None => b.add_value(rel, "LabelId", ""),
        }
    }
    b.add_blank();
    Ok(())
}

fn add_people_blocks(b: &mut TagFileBuilder, release: &Release, opts: &LayoutOptions) -> Result<()> {
    let rel = EntityRef::Release(release);
    let tags = &release.tags;
    let single = release.flags.is_single_artist == Some(true);

    if opts.artist_block && !single {
        b.add_comment("Artists");
        for disc in &release.discs {
            add_artists(b, Target::One(EntityRef::Disc(disc)), opts)?;
            add_artists(b, Target::Tracks(disc), opts)?;
        }
        b.add_blank();
    }

    if opts.artist_block || ["Composer", "Arranger", "Lyricist", "Writer"].iter().any(|k| tags.contains_key(k)) {
        b.add_comment("Composers");
    }
    if opts.classical && opts.artist_block && single && !tags.contains_key("Composer") {
        b.add_values_as(rel, "Artist", "Composer");
        b.add_values_as(rel, "ArtistSort", "ComposerSort");
    }
    add_composers(b, Target::One(rel))?;
    if opts.artist_block {
        for disc in &release.discs {
            add_composers(b, Target::One(EntityRef::Disc(disc)))?;
            add_composers(b, Target::Tracks(disc))?;
        }
    }
    b.add_blank();

    if opts.artist_block || tags.contains_key("Conductor") || tags.contains_key("Performer") {
        b.add_comment("Performers");
    }
    add_performers(b, Target::One(rel))?;
    if opts.artist_block {
        for disc in &release.discs {
            add_performers(b, Target::One(EntityRef::Disc(disc)))?;
            add_performers(b, Target::Tracks(disc))?;
        }
    }
    b.add_blank();
    Ok(())
}

fn add_work_block(b: &mut TagFileBuilder, release: &Release) -> Result<()> {
    let rel = EntityRef::Release(release);
    b.add_comment("Works");
    b.add_values(rel, "Work");
    b.add_values(rel, "Title");
    for disc in &release.discs {
        b.add_values(EntityRef::Disc(disc), "Work");
        Target::Tracks(disc).add(b, "Work")?;
    }
    b.add_values(rel, "Part");
    b.add_blank();
    Ok(())
}

fn add_disc_block(b: &mut TagFileBuilder, release: &Release, opts: &LayoutOptions) -> Result<()> {
    // A single disc normally has nothing left after the release merge.
    let needed = release.discs.len() > 1 || release.discs.first().is_some_and(|d| !d.tags.is_empty());
    if !needed {
        return Ok(());
    }

    b.add_comment("Disc info");
    for disc in &release.discs {
        let entity = EntityRef::Disc(disc);
        if let Some(number) = disc.number() {
            b.add_value(entity, "DiscNumber", number);
        }
        for key in ["DiscSubtitle", "AlbumArtist", "AlbumArtistSort", "AlbumArtists", "AlbumArtistsSort"] {
            b.add_values(entity, key);
        }
        add_dates(b, entity, false);
        for key in ["Genre", "Version", "Comment"] {
            b.add_values(entity, key);
        }

        if !opts.artist_block {
            add_artists(b, Target::One(entity), opts)?;
            add_composers(b, Target::One(entity))?;
            add_performers(b, Target::One(entity))?;
        }
        if !opts.work_block {
            b.add_values(entity, "Work");
        }
        b.add_values(entity, "Title");
        b.add_values(entity, "Part");
        b.add_values(entity, "CoverNumber");

        if opts.output_unsupported {
            add_unsupported(b, entity);
        }
    }
    b.add_blank();
    Ok(())
}

fn add_track_list(b: &mut TagFileBuilder, release: &Release, opts: &LayoutOptions) -> Result<()> {
    for disc in &release.discs {
        if release.discs.len() == 1 {
            b.add_comment("Track info");
        } else {
            b.add_comment(&format!("Disc {}", disc.number().unwrap_or("?")));
        }

        for track in &disc.tracks {
            let entity = EntityRef::track(track, disc);
            if !opts.artist_block {
                add_artists(b, Target::One(entity), opts)?;
            }
            if !opts.work_block {
                b.add_values(entity, "Work");
            }
            b.add_values(entity, "Title");
            b.add_values(entity, "Part");
            b.add_values(entity, "Version");
            if !opts.artist_block {
                add_composers(b, Target::One(entity))?;
                add_performers(b, Target::One(entity))?;
            }
            b.add_values(entity, "CoverNumber");
            b.add_values(entity, "Genre");
            b.add_values(entity, "Comment");
            add_dates(b, entity, false);

            if opts.output_unsupported {
                add_unsupported(b, entity);
            }
            if opts.break_tracks {
                b.add_blank();
            }
        }
        b.add_blank();
    }
    Ok(())
}

/// Standard tags in the sectioned layout.
pub fn add_structured(b: &mut TagFileBuilder, release: &Release, opts: &LayoutOptions) -> Result<()> {
    add_album_block(b, release, opts)?;
    add_people_blocks(b, release, opts)?;
    if opts.work_block {
        add_work_block(b, release)?;
    }
    if opts.output_unsupported {
        add_unsupported(b, EntityRef::Release(release));
    }
    add_disc_block(b, release, opts)?;
    add_track_list(b, release, opts)
}

fn add_group(b: &mut TagFileBuilder, release: &Release, title: &str, keys: &[&str]) {
    b.add_comment(title);
    let rel = EntityRef::Release(release);
    for key in keys {
        b.add_values(rel, key);
    }
    for disc in &release.discs {
        for key in keys {
            b.add_values(EntityRef::Disc(disc), key);
        }
        for track in &disc.tracks {
            for key in keys {
                b.add_values(EntityRef::track(track, disc), key);
            }
        }
    }
}

pub fn add_musicbrainz(b: &mut TagFileBuilder, release: &Release) {
    add_group(b, release, "Musicbrainz info", MUSICBRAINZ_TAGS);
}

pub fn add_replaygain(b: &mut TagFileBuilder, release: &Release) {
    add_group(b, release, "Replaygain info", REPLAYGAIN_TAGS);
}

/// Every tag of every entity, in hierarchy order.
pub fn add_unstructured(b: &mut TagFileBuilder, release: &Release) {
    let dump = |b: &mut TagFileBuilder, entity: EntityRef<'_>| {
        for key in entity.tags().keys() {
            b.add_values(entity, key);
        }
    };
    dump(b, EntityRef::Release(release));
    for disc in &release.discs {
        dump(b, EntityRef::Disc(disc));
        for track in &disc.tracks {
            dump(b, EntityRef::track(track, disc));
        }
    }
}

/// Generate the tag file for `release`.
///
/// # Arguments
/// * `release` - a release whose discs and tracks have been merged
/// * `opts` - layout switches
/// * `warnings` - passed to the line builder
pub fn generate(release: &Release, opts: &LayoutOptions, warnings: WarningPolicy) -> Result<TagFile> {
    let mut b = TagFileBuilder::new(warnings);
    if opts.structured {
        if opts.standard {
            add_structured(&mut b, release, opts)?;
        }
        if opts.musicbrainz {
            b.add_blank();
            add_musicbrainz(&mut b, release);
        }
        if opts.replaygain {
            b.add_blank();
            add_replaygain(&mut b, release);
        }
    } else {
        add_unstructured(&mut b, release);
    }
    b.add_blank();
    Ok(b.finish())
}
