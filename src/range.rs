//! Compact numeric range notation used to address discs and tracks.
//!
//! `expand` turns `101-103,105` into `["101", "102", "103", "105"]` and
//! `condense` goes the other way.  Every number in a `start-end` pair has the
//! same digit width, and expansion pads to that width.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::RangeError;

static RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(-\d+)?)(,(\d+(-\d+)?))*$").unwrap());

/// Expand a range string into the ordered list of ids it names.
///
/// # Arguments
/// * `range` - comma separated list of bare numbers or `start-end` pairs
///
/// # Returns
/// The ids in left-to-right order.  Bare numbers pass through unchanged and
/// each pair expands to the inclusive sequence padded to the width of `start`.
pub fn expand(range: &str) -> Result<Vec<String>, RangeError> {
    if !RANGE_RE.is_match(range) {
        return Err(RangeError::Malformed(range.to_string()));
    }

    let mut ids = Vec::new();
    for token in range.split(',') {
        let Some((start, end)) = token.split_once('-') else {
            ids.push(token.to_string());
            continue;
        };

        if start.len() != end.len() {
            return Err(RangeError::MixedWidth(token.to_string()));
        }
        let width = start.len();
        let first: u64 = start
            .parse()
            .map_err(|_| RangeError::Malformed(token.to_string()))?;
        let last: u64 = end
            .parse()
            .map_err(|_| RangeError::Malformed(token.to_string()))?;
        if first > last {
            return Err(RangeError::Descending(token.to_string()));
        }

        ids.extend((first..=last).map(|n| format!("{:0width$}", n, width = width)));
    }

    Ok(ids)
}

/// Numeric value of an all-digit id.
fn numeric(id: &str) -> Option<u64> {
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    id.parse().ok()
}

/// Condense an ordered id list into range notation.
///
/// Runs of ids that increase by one and share a digit width collapse into
/// `start-end`.  Everything else is kept as comma separated singles, in the
/// given order, so that `expand(&condense(ids))` returns `ids`.
pub fn condense<S: AsRef<str>>(ids: &[S]) -> String {
    let mut tokens: Vec<String> = Vec::new();
    let mut run: Option<(&str, &str, u64)> = None; // (start, end, end value)

    let flush = |run: Option<(&str, &str, u64)>, tokens: &mut Vec<String>| {
        if let Some((start, end, _)) = run {
            if start == end {
                tokens.push(start.to_string());
            } else {
                tokens.push(format!("{}-{}", start, end));
            }
        }
    };

    for id in ids.iter().map(AsRef::as_ref) {
        let Some(value) = numeric(id) else {
            flush(run.take(), &mut tokens);
            tokens.push(id.to_string());
            continue;
        };

        run = match run {
            Some((start, _, last))
                if id.len() == start.len() && last.checked_add(1) == Some(value) =>
            {
                Some((start, id, value))
            }
            other => {
                flush(other, &mut tokens);
                Some((id, id, value))
            }
        };
    }
    flush(run, &mut tokens);

    tokens.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_mixed_tokens() {
        assert_eq!(
            expand("101-103,105,107-108").unwrap(),
            vec!["101", "102", "103", "105", "107", "108"]
        );
    }

    #[test]
    fn test_expand_pads_to_start_width() {
        assert_eq!(expand("08-11").unwrap(), vec!["08", "09", "10", "11"]);
    }

    #[test]
    fn test_expand_keeps_token_order() {
        assert_eq!(expand("05,01-02").unwrap(), vec!["05", "01", "02"]);
    }

    #[test]
    fn test_expand_rejects_malformed() {
        for bad in ["01-0a", "", "1,", ",1", "1--2", "a", "01 02"] {
            assert!(
                matches!(expand(bad), Err(RangeError::Malformed(_))),
                "{:?} accepted",
                bad
            );
        }
    }

    #[test]
    fn test_expand_rejects_mixed_width_and_descending() {
        assert!(matches!(expand("1-10"), Err(RangeError::MixedWidth(_))));
        assert!(matches!(expand("05-03"), Err(RangeError::Descending(_))));
    }

    #[test]
    fn test_condense_runs() {
        let ids = ["01", "02", "03", "05", "07", "08"];
        assert_eq!(condense(&ids), "01-03,05,07-08");
    }

    #[test]
    fn test_condense_width_break() {
        assert_eq!(condense(&["8", "9", "10", "11"]), "8-9,10-11");
        assert_eq!(condense(&["109", "110", "201"]), "109-110,201");
    }

    #[test]
    fn test_condense_empty() {
        assert_eq!(condense::<&str>(&[]), "");
    }

    #[test]
    fn test_condense_inverts_expand() {
        for range in ["01-10", "101-103,105,107-108", "01,03,05", "9,10-12", "05,01-02"] {
            let ids = expand(range).unwrap();
            assert_eq!(condense(&ids), range);
            assert_eq!(expand(&condense(&ids)).unwrap(), ids);
        }
    }

    #[test]
    fn test_condense_normalizes_split_runs() {
        let ids = expand("01-02,03-04").unwrap();
        assert_eq!(condense(&ids), "01-04");
    }

    #[test]
    fn test_expand_inverts_condense() {
        let ids: Vec<String> = ["101", "102", "104", "201", "202", "203"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(expand(&condense(&ids)).unwrap(), ids);
    }
}
