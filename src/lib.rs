pub mod apply;
pub mod audiofile;
pub mod builder;
pub mod config;
pub mod entity;
pub mod error;
pub mod layout;
pub mod logging;
pub mod merge;
pub mod musicbrainz;
pub mod range;
pub mod rate_limiter;
pub mod release_builder;
pub mod tagfile;
pub mod tagmap;
pub mod tags;
pub mod titles;

pub use apply::{apply_tag_file, apply_tag_text, ApplyOptions, ApplyReport};
pub use audiofile::{supported_files_in, LoftyAdapter, TagAdapter};
pub use builder::TagFileBuilder;
pub use config::{Config, WarningPolicy};
pub use entity::{Disc, EntityKind, EntityRef, Release, Track};
pub use error::{Error, RangeError, Result};
pub use layout::{generate, LayoutOptions};
pub use merge::merge_children;
pub use musicbrainz::{MetadataLookup, MusicBrainzClient};
pub use release_builder::{ReadOptions, ReleaseBuilder};
pub use tagfile::{LineKind, TagFile, TagLine};
pub use tagmap::TagMap;
pub use tags::SortNameMode;
