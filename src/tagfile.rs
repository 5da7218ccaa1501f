//! Line-oriented tag file format.
//!
//! One directive per line:
//!
//! ```text
//! # comment
//! a Album=Abbey Road
//! d 1-2 Genre=Rock
//! t 101-103,105 Artist=The Beatles
//! ```
//!
//! `a` lines apply to every file, `d` lines to the listed discs, and `t`
//! lines to the listed disc+track ids.  Resolving a (disc, track) coordinate
//! walks the file top to bottom, so values for one tag keep file order.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, warn};

use crate::config::WarningPolicy;
use crate::error::{Error, Result};
use crate::range;
use crate::tagmap::TagMap;
use crate::tags;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Comment,
    Album,
    Disc,
    Track,
    /// Empty spacer line, produced only by the builder.
    Blank,
}

impl LineKind {
    fn from_marker(marker: char) -> Option<Self> {
        match marker.to_ascii_lowercase() {
            'a' => Some(LineKind::Album),
            'd' => Some(LineKind::Disc),
            't' => Some(LineKind::Track),
            _ => None,
        }
    }

    fn marker(self) -> &'static str {
        match self {
            LineKind::Comment => "#",
            LineKind::Album => "a",
            LineKind::Disc => "d",
            LineKind::Track => "t",
            LineKind::Blank => "",
        }
    }
}

/// One line of a tag file.
#[derive(Debug, Clone, PartialEq)]
pub struct TagLine {
    pub kind: LineKind,
    /// Expanded disc or disc+track ids.  Empty for comment, album and blank lines.
    pub applies_to: Vec<String>,
    /// Range text as written, used when rendering the line.
    pub range: String,
    /// Tag name.  Empty for comment and blank lines.
    pub tag: String,
    /// Tag value, or the comment text.
    pub value: String,
    /// 1-based line number in the parsed text, 0 for built lines.
    pub line_number: usize,
    /// Source text, kept unchanged when the line is edited later.
    pub source: String,
    used: bool,
}

/// Log an unrecognized tag name when the policy asks for it.
pub(crate) fn check_tag_name(tag: &str, warnings: &WarningPolicy) {
    if warnings.unrecognized() && !tags::is_canonical(tag) {
        warn!("unrecognized tag: {}", tag);
    }
}

/// Split `Tag=Value`, rejecting an empty name or value.
fn split_assignment<'a>(text: &'a str, line: usize, source: &str) -> Result<(&'a str, &'a str)> {
    let (tag, value) = text
        .split_once('=')
        .ok_or_else(|| Error::format(line, source, "missing '='"))?;
    if tag.is_empty() {
        return Err(Error::format(line, source, "missing tag name"));
    }
    if value.is_empty() {
        return Err(Error::format(line, source, "missing tag value"));
    }
    Ok((tag, value))
}

impl TagLine {
    fn empty(kind: LineKind) -> Self {
        TagLine {
            kind,
            applies_to: Vec::new(),
            range: String::new(),
            tag: String::new(),
            value: String::new(),
            line_number: 0,
            source: String::new(),
            used: false,
        }
    }

    pub fn comment(text: &str) -> Self {
        let mut line = TagLine::empty(LineKind::Comment);
        line.value = text.to_string();
        line.used = true;
        line.source = line.to_string();
        line
    }

    pub fn blank() -> Self {
        let mut line = TagLine::empty(LineKind::Blank);
        line.used = true;
        line
    }

    /// An album line.
    pub fn album(tag: &str, value: &str) -> Self {
        let mut line = TagLine::empty(LineKind::Album);
        line.tag = tag.to_string();
        line.value = value.to_string();
        line.source = line.to_string();
        line
    }

    /// A disc or track line addressing `ids`, rendered with `range`.
    pub fn scoped(kind: LineKind, range: String, ids: Vec<String>, tag: &str, value: &str) -> Self {
        let mut line = TagLine::empty(kind);
        line.range = range;
        line.applies_to = ids;
        line.tag = tag.to_string();
        line.value = value.to_string();
        line.source = line.to_string();
        line
    }

    /// Parse one source line.  Returns `Ok(None)` for a blank line.
    ///
    /// # Arguments
    /// * `line_number` - 1-based position of the line, used in errors
    /// * `text` - the raw line, surrounding whitespace is ignored
    /// * `warnings` - controls the unrecognized-tag warning
    pub fn parse(line_number: usize, text: &str, warnings: &WarningPolicy) -> Result<Option<Self>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        if let Some(comment) = text.strip_prefix('#') {
            let mut line = TagLine::empty(LineKind::Comment);
            line.value = comment.trim().to_string();
            line.used = true;
            line.line_number = line_number;
            line.source = text.to_string();
            return Ok(Some(line));
        }

        let mut chars = text.chars();
        let kind = chars
            .next()
            .and_then(LineKind::from_marker)
            .ok_or_else(|| Error::format(line_number, text, "unrecognized line kind"))?;
        let rest = chars
            .as_str()
            .strip_prefix(' ')
            .ok_or_else(|| Error::format(line_number, text, "unrecognized line kind"))?;

        let mut line = TagLine::empty(kind);
        line.line_number = line_number;
        line.source = text.to_string();

        let assignment = match kind {
            LineKind::Album => rest,
            _ => {
                let (range_text, assignment) = rest
                    .split_once(' ')
                    .ok_or_else(|| Error::format(line_number, text, "missing range"))?;
                line.applies_to = range::expand(range_text)
                    .map_err(|e| Error::format(line_number, text, e.to_string()))?;
                line.range = range_text.to_string();
                assignment
            }
        };

        let (tag, value) = split_assignment(assignment, line_number, text)?;
        check_tag_name(tag, warnings);
        line.tag = tag.to_string();
        line.value = value.to_string();

        Ok(Some(line))
    }

    /// Whether the line contributed to at least one resolved tag set.
    pub fn is_used(&self) -> bool {
        self.used
    }

    /// Whether the line addresses the given disc id or disc+track id.
    fn matches(&self, disc: Option<&str>, disc_track: Option<&str>) -> bool {
        let contains = |id: Option<&str>| id.is_some_and(|id| self.applies_to.iter().any(|a| a == id));
        match self.kind {
            LineKind::Album => true,
            LineKind::Disc => contains(disc),
            LineKind::Track => contains(disc_track),
            LineKind::Comment | LineKind::Blank => false,
        }
    }
}

impl fmt::Display for TagLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            LineKind::Blank => Ok(()),
            LineKind::Comment => write!(f, "# {}", self.value),
            LineKind::Album => write!(f, "a {}={}", self.tag, self.value),
            LineKind::Disc | LineKind::Track => write!(
                f,
                "{} {} {}={}",
                self.kind.marker(),
                self.range,
                self.tag,
                self.value
            ),
        }
    }
}

/// An ordered list of tag lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagFile {
    lines: Vec<TagLine>,
}

impl TagFile {
    pub fn new() -> Self {
        TagFile { lines: Vec::new() }
    }

    /// Parse tag file text.  The first malformed line aborts the parse.
    pub fn parse(text: &str, warnings: &WarningPolicy) -> Result<Self> {
        let mut lines = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            if let Some(line) = TagLine::parse(index + 1, raw, warnings)? {
                lines.push(line);
            }
        }
        debug!("Parsed {} tag file lines", lines.len());
        Ok(TagFile { lines })
    }

    pub fn lines(&self) -> &[TagLine] {
        &self.lines
    }

    pub fn last(&self) -> Option<&TagLine> {
        self.lines.last()
    }

    pub fn push(&mut self, line: TagLine) {
        self.lines.push(line);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Rename tags in place.  A `None` destination deletes the line.
    pub fn apply_map(&mut self, renames: &HashMap<String, Option<String>>, warnings: &WarningPolicy) {
        self.lines.retain_mut(|line| match renames.get(&line.tag) {
            None => true,
            Some(None) => false,
            Some(Some(new_tag)) => {
                check_tag_name(new_tag, warnings);
                line.tag = new_tag.clone();
                true
            }
        });
    }

    /// Collect the tags for the file at the given coordinate.
    ///
    /// The composite track key is `disc + track`, or `track` alone when there
    /// is no disc.  Matching lines are appended in file order and marked used.
    pub fn resolve(&mut self, disc: Option<&str>, track: Option<&str>) -> TagMap {
        let disc_track = track.map(|t| match disc {
            Some(d) => format!("{}{}", d, t),
            None => t.to_string(),
        });

        let mut result = TagMap::new();
        for line in &mut self.lines {
            if line.matches(disc, disc_track.as_deref()) {
                result.append(line.tag.as_str(), line.value.as_str());
                line.used = true;
            }
        }
        result
    }

    /// Directive lines that never matched a resolved file.
    pub fn unused_lines(&self) -> impl Iterator<Item = &TagLine> {
        self.lines.iter().filter(|line| !line.used)
    }

    /// Tag names used in the file that are outside the canonical vocabulary.
    pub fn unrecognized_tags(&self) -> Vec<&str> {
        let mut found: Vec<&str> = Vec::new();
        for line in &self.lines {
            let tag = line.tag.as_str();
            if !tag.is_empty() && !tags::is_canonical(tag) && !found.contains(&tag) {
                found.push(tag);
            }
        }
        found
    }
}

impl fmt::Display for TagFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> TagFile {
        TagFile::parse(text, &WarningPolicy::silent()).unwrap()
    }

    #[test]
    fn test_parse_line_kinds() {
        let file = parse("# hello\na Album=X\nd 1-2 Genre=Rock\nT 101,103 Title=Y=Z\n");
        let lines = file.lines();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].kind, LineKind::Comment);
        assert_eq!(lines[0].value, "hello");
        assert!(lines[0].is_used());
        assert_eq!(lines[1].kind, LineKind::Album);
        assert_eq!(lines[1].tag, "Album");
        assert_eq!(lines[2].applies_to, vec!["1", "2"]);
        assert_eq!(lines[3].kind, LineKind::Track);
        assert_eq!(lines[3].value, "Y=Z");
        assert_eq!(lines[3].line_number, 4);
        assert!(!lines[3].is_used());
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let file = parse("\n   \na Album=X\n\n");
        assert_eq!(file.len(), 1);
        assert_eq!(file.lines()[0].line_number, 3);
    }

    #[test]
    fn test_malformed_range_is_a_format_error() {
        let err = TagFile::parse("a Album=X\nt 01-0a Title=X", &WarningPolicy::silent()).unwrap_err();
        match err {
            Error::Format { line, text, .. } => {
                assert_eq!(line, 2);
                assert_eq!(text, "t 01-0a Title=X");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_malformed_lines() {
        for bad in ["x Title=Y", "aTitle=Y", "a Title", "t 01 Title", "t 01", "a =Y", "a Title="] {
            let result = TagFile::parse(bad, &WarningPolicy::silent());
            assert!(matches!(result, Err(Error::Format { .. })), "{:?} accepted", bad);
        }
    }

    #[test]
    fn test_render_round_trips() {
        let text = "# Album info\na Album=X\nd 1 DiscSubtitle=Live\nt 101-103,105 Artist=A";
        assert_eq!(parse(text).to_string(), text);
    }

    #[test]
    fn test_resolve_keeps_file_order() {
        let mut file = parse("a Genre=Rock\nt 01 Genre=Jazz\n");
        let tags = file.resolve(None, Some("01"));
        assert_eq!(tags.get("Genre").unwrap(), &["Rock", "Jazz"]);
    }

    #[test]
    fn test_resolve_disc_and_track() {
        let mut file = parse("d 2 DiscSubtitle=B\nt 201 Title=X\nt 01 Title=Wrong\n");
        let tags = file.resolve(Some("2"), Some("01"));
        assert_eq!(tags.first("DiscSubtitle"), Some("B"));
        assert_eq!(tags.get("Title").unwrap(), &["X"]);

        let unused: Vec<usize> = file.unused_lines().map(|l| l.line_number).collect();
        assert_eq!(unused, vec![3]);
    }

    #[test]
    fn test_resolve_without_track_skips_track_lines() {
        let mut file = parse("a Album=X\nt 01 Title=Y\n");
        let tags = file.resolve(None, None);
        assert_eq!(tags.first("Album"), Some("X"));
        assert!(!tags.contains_key("Title"));
    }

    #[test]
    fn test_unused_line_is_reported() {
        let mut text = String::from("a Album=X\n");
        for n in 1..=10 {
            text.push_str(&format!("t {:02} Title=Song {}\n", n, n));
        }
        text.push_str("t 99 Title=Ghost\n");
        let mut file = parse(&text);
        for n in 1..=10 {
            file.resolve(None, Some(&format!("{:02}", n)));
        }
        let unused: Vec<&TagLine> = file.unused_lines().collect();
        assert_eq!(unused.len(), 1);
        assert_eq!(unused[0].source, "t 99 Title=Ghost");
    }

    #[test]
    fn test_apply_map_renames_and_deletes() {
        let mut file = parse("a ArtistSort=Beatles, The\na Artist=The Beatles\na Album=X");
        let mut renames = HashMap::new();
        renames.insert("ArtistSort".to_string(), Some("Artist".to_string()));
        renames.insert("Artist".to_string(), None);
        file.apply_map(&renames, &WarningPolicy::silent());

        assert_eq!(file.len(), 2);
        assert_eq!(file.lines()[0].tag, "Artist");
        assert_eq!(file.lines()[0].value, "Beatles, The");
        assert_eq!(file.lines()[0].source, "a ArtistSort=Beatles, The");
        assert_eq!(file.lines()[1].tag, "Album");
    }

    #[test]
    fn test_unrecognized_tags() {
        let file = parse("a Mood=Happy\na Album=X\nt 01 Mood=Sad");
        assert_eq!(file.unrecognized_tags(), vec!["Mood"]);
    }
}
