//! Assembles a [`TagFile`] from entities of a release hierarchy.

use tracing::warn;

use crate::config::WarningPolicy;
use crate::entity::{EntityKind, EntityRef};
use crate::error::{Error, Result};
use crate::range;
use crate::tagfile::{check_tag_name, LineKind, TagFile, TagLine};
use crate::tagmap::TagMap;

/// Sort key for composite numeric ids.
fn id_order(id: &str) -> (u64, String) {
    (id.parse().unwrap_or(u64::MAX), id.to_string())
}

pub struct TagFileBuilder {
    file: TagFile,
    warnings: WarningPolicy,
}

impl TagFileBuilder {
    pub fn new(warnings: WarningPolicy) -> Self {
        TagFileBuilder {
            file: TagFile::new(),
            warnings,
        }
    }

    pub fn file(&self) -> &TagFile {
        &self.file
    }

    pub fn finish(self) -> TagFile {
        self.file
    }

    /// Add a single line addressed to `entity`.
    ///
    /// A disc or track without the number needed to address it cannot be
    /// written; the value is skipped with a warning.
    pub fn add_value(&mut self, entity: EntityRef<'_>, tag: &str, value: &str) {
        let Some((kind, id)) = entity.scope() else {
            if self.warnings.general() {
                warn!("{} has no number; skipping {}={}", entity.kind(), tag, value);
            }
            return;
        };

        check_tag_name(tag, &self.warnings);
        let line = match kind {
            LineKind::Album => TagLine::album(tag, value),
            _ => TagLine::scoped(kind, id.clone(), vec![id], tag, value),
        };
        self.file.push(line);
    }

    /// Add one line per value stored under `key`.
    pub fn add_values(&mut self, entity: EntityRef<'_>, key: &str) {
        self.add_values_as(entity, key, key);
    }

    /// Add one line per value stored under `key`, written as `as_tag`.
    pub fn add_values_as(&mut self, entity: EntityRef<'_>, key: &str, as_tag: &str) {
        if let Some(values) = entity.tags().get(key) {
            for value in values {
                self.add_value(entity, as_tag, value);
            }
        }
    }

    /// Like [`add_values`](Self::add_values), but writes an empty-valued line
    /// when the tag is missing so the gap is visible in the file.
    pub fn add_values_req(&mut self, entity: EntityRef<'_>, key: &str) {
        self.add_values_as_req(entity, key, key);
    }

    pub fn add_values_as_req(&mut self, entity: EntityRef<'_>, key: &str, as_tag: &str) {
        if entity.tags().contains_key(key) {
            self.add_values_as(entity, key, as_tag);
        } else {
            self.add_value(entity, as_tag, "");
        }
    }

    /// Add the values of several discs or tracks, one line per distinct value.
    ///
    /// `select` picks the values of each entity.  Entities sharing a value are
    /// addressed together: their ids are sorted and condensed into a range.
    /// Values are emitted in order of first appearance.
    ///
    /// # Returns
    /// `UnsupportedKind` when `entities` contains a release or mixes discs
    /// and tracks.
    pub fn add_grouped<F>(&mut self, entities: &[EntityRef<'_>], tag: &str, select: F) -> Result<()>
    where
        F: Fn(&TagMap) -> Vec<String>,
    {
        let Some(first) = entities.first() else {
            return Ok(());
        };
        let kind = first.kind();
        if kind == EntityKind::Release {
            return Err(Error::UnsupportedKind {
                expected: "disc or track",
                found: kind,
            });
        }

        let mut groups: Vec<(String, Vec<String>)> = Vec::new();
        for entity in entities {
            if entity.kind() != kind {
                return Err(Error::UnsupportedKind {
                    expected: if kind == EntityKind::Disc { "disc" } else { "track" },
                    found: entity.kind(),
                });
            }

            let values = select(entity.tags());
            if values.is_empty() {
                continue;
            }
            let Some((_, id)) = entity.scope() else {
                if self.warnings.general() {
                    warn!("{} has no number; skipping {} values", entity.kind(), tag);
                }
                continue;
            };

            for value in values {
                match groups.iter_mut().find(|(v, _)| *v == value) {
                    Some((_, ids)) => {
                        if !ids.contains(&id) {
                            ids.push(id.clone());
                        }
                    }
                    None => groups.push((value, vec![id.clone()])),
                }
            }
        }

        check_tag_name(tag, &self.warnings);
        let line_kind = if kind == EntityKind::Disc {
            LineKind::Disc
        } else {
            LineKind::Track
        };
        for (value, mut ids) in groups {
            ids.sort_by_key(|id| id_order(id));
            let range = range::condense(&ids);
            self.file
                .push(TagLine::scoped(line_kind, range, ids, tag, &value));
        }

        Ok(())
    }

    /// Grouped lines for the values stored under `key`.
    pub fn add_grouped_values(&mut self, entities: &[EntityRef<'_>], key: &str) -> Result<()> {
        self.add_grouped(entities, key, |tags| {
            tags.get(key).map(|v| v.to_vec()).unwrap_or_default()
        })
    }

    pub fn add_comment(&mut self, text: &str) {
        self.file.push(TagLine::comment(text));
    }

    /// Add a spacer line, unless the file is empty or already ends with one.
    pub fn add_blank(&mut self) {
        match self.file.last() {
            Some(line) if line.kind != LineKind::Blank => self.file.push(TagLine::blank()),
            _ => {}
        }
    }
}
