//! Ordered multi-map from tag name to a list of values.
//!
//! Keys keep insertion order and each key maps to an ordered list of values.
//! A key present in the map always has at least one value: removing the last
//! value of a key removes the key.  Duplicates are kept unless an operation
//! explicitly asks for uniqueness (`append_unique`, `extend_unique`, ...).

use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagMap {
    entries: Vec<(String, Vec<String>)>,
}

/// Values of `a` that are not in `b`, in `a`'s order.
fn list_diff(a: &[String], b: &[String]) -> Vec<String> {
    a.iter().filter(|v| !b.contains(v)).cloned().collect()
}

/// Values of `a` that are also in `b`, in `a`'s order.
fn list_intersection(a: &[String], b: &[String]) -> Vec<String> {
    a.iter().filter(|v| b.contains(v)).cloned().collect()
}

impl TagMap {
    pub fn new() -> Self {
        TagMap { entries: Vec::new() }
    }

    /// Build a map from flat `(tag, value)` pairs, dropping repeated values.
    pub fn from_pairs_unique<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = TagMap::new();
        for (key, value) in pairs {
            map.append_unique(key, value);
        }
        map
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    fn values_mut(&mut self, key: &str) -> Option<&mut Vec<String>> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
    }

    /// First value stored under `key`.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|values| values.first()).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn contains(&self, key: &str, value: &str) -> bool {
        self.get(key).is_some_and(|values| values.iter().any(|v| v == value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Every `(tag, value)` pair in key order, then value order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(k, values)| values.iter().map(move |v| (k.as_str(), v.as_str())))
    }

    /// Replace the whole list at `key`.  An empty list removes the key.
    pub fn set<I, V>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let key = key.into();
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        match (self.position(&key), values.is_empty()) {
            (Some(i), true) => {
                self.entries.remove(i);
            }
            (Some(i), false) => self.entries[i].1 = values,
            (None, true) => {}
            (None, false) => self.entries.push((key, values)),
        }
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.values_mut(&key) {
            Some(values) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Append `value` unless it is already present under `key`.
    pub fn append_unique(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.values_mut(&key) {
            Some(values) => {
                if !values.contains(&value) {
                    values.push(value);
                }
            }
            None => self.entries.push((key, vec![value])),
        }
    }

    pub fn extend<I, V>(&mut self, key: &str, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        for value in values {
            self.append(key, value);
        }
    }

    pub fn extend_unique<I, V>(&mut self, key: &str, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        for value in values {
            self.append_unique(key, value);
        }
    }

    /// Add every value of `other` that is not already present.
    pub fn merge_unique(&mut self, other: &TagMap) {
        for (key, values) in other.iter() {
            self.extend_unique(key, values.iter().cloned());
        }
    }

    /// Replace every occurrence of `old` under `key` with `new`.
    /// Returns whether anything was replaced.
    pub fn replace(&mut self, key: &str, old: &str, new: &str) -> bool {
        self.replace_where(key, new, |v| v == old)
    }

    pub fn replace_case_insensitive(&mut self, key: &str, old: &str, new: &str) -> bool {
        let old = old.to_lowercase();
        self.replace_where(key, new, |v| v.to_lowercase() == old)
    }

    fn replace_where(&mut self, key: &str, new: &str, matches: impl Fn(&str) -> bool) -> bool {
        let mut replaced = false;
        if let Some(values) = self.values_mut(key) {
            for value in values.iter_mut().filter(|v| matches(v)) {
                *value = new.to_string();
                replaced = true;
            }
        }
        replaced
    }

    /// Replace `old` with `new` in place; when there was nothing to replace and
    /// `new` is not already present, append it.  Position is kept on a genuine
    /// replace, so repeated calls leave the map unchanged.
    pub fn append_replace(&mut self, key: &str, old: &str, new: &str) {
        match self.values_mut(key) {
            Some(values) => {
                let mut replaced = false;
                for value in values.iter_mut().filter(|v| *v == old) {
                    *value = new.to_string();
                    replaced = true;
                }
                if !replaced && !values.iter().any(|v| v == new) {
                    values.push(new.to_string());
                }
            }
            None => self.entries.push((key.to_string(), vec![new.to_string()])),
        }
    }

    /// Remove every occurrence of `value` under `key`, dropping the key when empty.
    pub fn remove(&mut self, key: &str, value: &str) {
        if let Some(i) = self.position(key) {
            let values = &mut self.entries[i].1;
            values.retain(|v| v != value);
            if values.is_empty() {
                self.entries.remove(i);
            }
        }
    }

    pub fn remove_key(&mut self, key: &str) -> Option<Vec<String>> {
        self.position(key).map(|i| self.entries.remove(i).1)
    }

    /// Remove from `self` every `(key, value)` pair present in `other`.
    pub fn remove_all(&mut self, other: &TagMap) {
        for (key, values) in other.iter() {
            if let Some(i) = self.position(key) {
                let remaining = list_diff(&self.entries[i].1, values);
                if remaining.is_empty() {
                    self.entries.remove(i);
                } else {
                    self.entries[i].1 = remaining;
                }
            }
        }
    }

    /// Move the list at `from` to `to`, overwriting `to`, and delete `from`.
    pub fn move_values(&mut self, from: &str, to: &str) {
        if let Some(values) = self.remove_key(from) {
            self.set(to, values);
        }
    }

    /// Values shared by every map, anchored to the first map's keys and value order.
    pub fn common_values(maps: &[&TagMap]) -> TagMap {
        let mut result = TagMap::new();
        let Some((first, rest)) = maps.split_first() else {
            return result;
        };

        for (key, values) in first.iter() {
            let mut common = values.to_vec();
            for other in rest {
                common = match other.get(key) {
                    Some(other_values) => list_intersection(&common, other_values),
                    None => Vec::new(),
                };
                if common.is_empty() {
                    break;
                }
            }
            if !common.is_empty() {
                result.entries.push((key.to_string(), common));
            }
        }

        result
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = TagMap::new();
        for (key, value) in iter {
            map.append(key, value);
        }
        map
    }
}

impl fmt::Display for TagMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, values) in self.iter() {
            writeln!(f, "  {}: {}", key, values.join(" | "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> TagMap {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_append_keeps_duplicates() {
        let mut m = TagMap::new();
        m.append("Genre", "Rock");
        m.append("Genre", "Rock");
        assert_eq!(m.get("Genre").unwrap(), &["Rock", "Rock"]);
    }

    #[test]
    fn test_append_unique() {
        let mut m = TagMap::new();
        m.append_unique("Genre", "Rock");
        m.append_unique("Genre", "Jazz");
        m.append_unique("Genre", "Rock");
        assert_eq!(m.get("Genre").unwrap(), &["Rock", "Jazz"]);
    }

    #[test]
    fn test_keys_keep_insertion_order() {
        let m = map(&[("Title", "a"), ("Artist", "b"), ("Album", "c"), ("Artist", "d")]);
        let keys: Vec<&str> = m.keys().collect();
        assert_eq!(keys, vec!["Title", "Artist", "Album"]);
    }

    #[test]
    fn test_replace_all_occurrences() {
        let mut m = map(&[("Artist", "A"), ("Artist", "B"), ("Artist", "A")]);
        assert!(m.replace("Artist", "A", "C"));
        assert_eq!(m.get("Artist").unwrap(), &["C", "B", "C"]);
        assert!(!m.replace("Missing", "A", "C"));
        assert!(!m.contains_key("Missing"));
    }

    #[test]
    fn test_replace_case_insensitive() {
        let mut m = map(&[("AlbumArtist", "various ARTISTS")]);
        m.replace_case_insensitive("AlbumArtist", "Various Artists", "Various");
        assert_eq!(m.first("AlbumArtist"), Some("Various"));
    }

    #[test]
    fn test_append_replace_preserves_position() {
        let mut m = map(&[("Composer", "Bach, J.S."), ("Composer", "Handel")]);
        m.append_replace("Composer", "Bach, J.S.", "J.S. Bach");
        assert_eq!(m.get("Composer").unwrap(), &["J.S. Bach", "Handel"]);
    }

    #[test]
    fn test_append_replace_appends_when_absent() {
        let mut m = map(&[("Composer", "Handel")]);
        m.append_replace("Composer", "Bach, J.S.", "J.S. Bach");
        assert_eq!(m.get("Composer").unwrap(), &["Handel", "J.S. Bach"]);

        let mut empty = TagMap::new();
        empty.append_replace("Composer", "x", "y");
        assert_eq!(empty.get("Composer").unwrap(), &["y"]);
    }

    #[test]
    fn test_append_replace_is_idempotent() {
        let base = map(&[("Artist", "Beatles, The"), ("Artist", "Wings")]);
        for (old, new) in [("Beatles, The", "The Beatles"), ("Nobody", "Wings"), ("X", "Y")] {
            let mut once = base.clone();
            once.append_replace("Artist", old, new);
            let mut twice = once.clone();
            twice.append_replace("Artist", old, new);
            assert_eq!(once, twice, "append_replace({}, {}) not idempotent", old, new);
        }
    }

    #[test]
    fn test_remove_last_value_removes_key() {
        let mut m = map(&[("Genre", "Rock"), ("Genre", "Rock"), ("Title", "x")]);
        m.remove("Genre", "Rock");
        assert!(!m.contains_key("Genre"));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn test_remove_all() {
        let mut m = map(&[("Genre", "Rock"), ("Genre", "Jazz"), ("Title", "x")]);
        let other = map(&[("Genre", "Rock"), ("Title", "x"), ("Date", "1999")]);
        m.remove_all(&other);
        assert_eq!(m, map(&[("Genre", "Jazz")]));
    }

    #[test]
    fn test_move_values() {
        let mut m = map(&[("Title", "Symphony No. 5"), ("Work", "old"), ("Artist", "a")]);
        m.move_values("Title", "Work");
        assert!(!m.contains_key("Title"));
        assert_eq!(m.get("Work").unwrap(), &["Symphony No. 5"]);

        m.move_values("Missing", "Artist");
        assert_eq!(m.first("Artist"), Some("a"));
    }

    #[test]
    fn test_set_empty_removes_key() {
        let mut m = map(&[("Genre", "Rock")]);
        m.set("Genre", Vec::<String>::new());
        assert!(m.is_empty());
    }

    #[test]
    fn test_common_values_anchored_to_first() {
        let a = map(&[("Genre", "Rock"), ("Genre", "Pop"), ("Artist", "X"), ("Date", "1990")]);
        let b = map(&[("Genre", "Pop"), ("Genre", "Rock"), ("Artist", "Y"), ("Date", "1990")]);
        let c = map(&[("Date", "1990"), ("Genre", "Rock"), ("Genre", "Pop")]);
        let common = TagMap::common_values(&[&a, &b, &c]);
        assert_eq!(common.get("Genre").unwrap(), &["Rock", "Pop"]);
        assert_eq!(common.get("Date").unwrap(), &["1990"]);
        assert!(!common.contains_key("Artist"));
        let keys: Vec<&str> = common.keys().collect();
        assert_eq!(keys, vec!["Genre", "Date"]);
    }

    #[test]
    fn test_common_values_edge_cases() {
        assert!(TagMap::common_values(&[]).is_empty());
        let only = map(&[("Genre", "Rock"), ("Title", "x")]);
        assert_eq!(TagMap::common_values(&[&only]), only);
    }

    #[test]
    fn test_from_pairs_unique() {
        let m = TagMap::from_pairs_unique(vec![("Artist", "A"), ("Artist", "A"), ("Artist", "B")]);
        assert_eq!(m.get("Artist").unwrap(), &["A", "B"]);
    }
}
