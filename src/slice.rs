//! Slicing a `/`-separated path into segments, with regex match/rewrite over
//! the sliced-out portion. See spec §3/§4.3.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::DsError;

/// Default pattern assumed when a rule needs one but none was set: matches
/// anything, capturing the whole slice as group 1.
pub static DEFAULT_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new("(.*)").unwrap());

/// A path split into a prefix, the slice under inspection, and a suffix.
/// `unslice()` always recovers the original path exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSlice {
    pre: Option<String>,
    inner: String,
    suf: Option<String>,
}

/// Python-style `list[start:stop]` slicing with negative-index wraparound
/// and index clamping, over a slice of path segments.
fn python_slice<'a>(segs: &[&'a str], start: Option<i64>, stop: Option<i64>) -> Vec<&'a str> {
    let len = segs.len() as i64;
    let norm = |idx: i64| -> i64 { if idx < 0 { (idx + len).clamp(0, len) } else { idx.clamp(0, len) } };
    let s = norm(start.unwrap_or(0));
    let e = norm(stop.unwrap_or(len));
    if s >= e {
        Vec::new()
    } else {
        segs[s as usize..e as usize].to_vec()
    }
}

impl PathSlice {
    /// Slice `path` on `/` boundaries. `stop == Some(0)` means "through the
    /// end" (so `(Some(0), Some(0))` means "the full path").
    pub fn into(path: &str, start: Option<i64>, stop: Option<i64>) -> PathSlice {
        let segs: Vec<&str> = path.split('/').collect();

        let pre_stop = match start {
            Some(s) if s != 0 => s,
            _ => 0,
        };
        let pre = python_slice(&segs, None, Some(pre_stop)).join("/");

        let stop_eff = match stop {
            Some(0) | None => None,
            Some(x) => Some(x),
        };
        let inner = python_slice(&segs, start, stop_eff).join("/");

        let suf = match stop {
            Some(s) if s != 0 => python_slice(&segs, Some(s), None).join("/"),
            _ => String::new(),
        };

        PathSlice {
            pre: (!pre.is_empty()).then_some(pre),
            inner,
            suf: (!suf.is_empty()).then_some(suf),
        }
    }

    /// The portion of the path currently under inspection.
    pub fn inner(&self) -> &str {
        &self.inner
    }

    /// Inverse of [`PathSlice::into`]: recovers the original path.
    pub fn unslice(&self) -> String {
        [
            self.pre.as_deref(),
            (!self.inner.is_empty()).then_some(self.inner.as_str()),
            self.suf.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join("/")
    }

    /// Full-match `pat` (or the default `(.*)`) against the inner slice.
    pub fn full_match<'p>(&self, pat: Option<&'p Regex>) -> Option<Captures<'_>> {
        let pat = pat.unwrap_or(&DEFAULT_PATTERN);
        full_match(pat, &self.inner)
    }

    /// Match and rewrite the inner slice. `sub = None` performs a match-only
    /// check. Returns `Ok(None)` on match failure, `Err` if `sub` contains an
    /// out-of-range capture-group backreference.
    pub fn rewrite(&self, pat: Option<&Regex>, sub: Option<&str>) -> Result<Option<PathSlice>, DsError> {
        let pat = pat.unwrap_or(&DEFAULT_PATTERN);
        let caps = match full_match(pat, &self.inner) {
            Some(c) => c,
            None => return Ok(None),
        };

        let inner = match sub {
            None => self.inner.clone(),
            Some(sub) => {
                validate_backrefs(sub, caps.len().saturating_sub(1))?;
                let mut dst = String::new();
                caps.expand(sub, &mut dst);
                dst
            }
        };

        Ok(Some(PathSlice {
            pre: self.pre.clone(),
            inner,
            suf: self.suf.clone(),
        }))
    }
}

fn full_match<'t>(re: &Regex, text: &'t str) -> Option<Captures<'t>> {
    re.captures(text).filter(|c| {
        let m = c.get(0).expect("group 0 always present");
        m.start() == 0 && m.end() == text.len()
    })
}

/// Check that every numeric backreference (`\N`) in `sub` refers to a group
/// that actually exists (group 0 is the whole match).
fn validate_backrefs(sub: &str, max_group: usize) -> Result<(), DsError> {
    let bytes = sub.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            if i + 1 < bytes.len() && bytes[i + 1].is_ascii_digit() {
                let mut j = i + 1;
                let mut num: usize = 0;
                while j < bytes.len() && bytes[j].is_ascii_digit() {
                    num = num * 10 + (bytes[j] - b'0') as usize;
                    j += 1;
                }
                if num > max_group {
                    return Err(DsError::InvalidRewrite(sub.to_string()));
                }
                i = j;
            } else {
                i += 2;
            }
        } else {
            i += 1;
        }
    }
    Ok(())
}

/// Expand `template`'s backreferences against the surrounding match over
/// `psl`'s inner slice. Used for custom `description` strings, which may
/// reference capture groups of the surrounding match.
///
/// A custom description is reported as a validation failure, not a schema
/// error, so this must never fail merely because `pat` didn't fully match
/// `psl` (that's exactly the common case: a description explaining *why* a
/// match rule failed). It falls back, in order, to: the full match, a
/// partial (non-anchored) search with the same pattern, and finally the
/// default pattern's trivial whole-slice capture — so there is always a
/// capture-group basis to expand against, per the "last attempted capture
/// groups" rule. Only a template whose numeric backreference exceeds even
/// that fallback's group count is a genuine schema/user error.
pub fn expand_description(psl: &PathSlice, pat: Option<&Regex>, template: &str) -> Result<String, DsError> {
    let pat = pat.unwrap_or(&DEFAULT_PATTERN);
    let caps = full_match(pat, &psl.inner)
        .or_else(|| pat.captures(&psl.inner))
        .or_else(|| DEFAULT_PATTERN.captures(&psl.inner))
        .expect("the default pattern `(.*)` matches every string");
    validate_backrefs(template, caps.len().saturating_sub(1))?;
    let mut dst = String::new();
    caps.expand(template, &mut dst);
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn re(s: &str) -> Regex {
        Regex::new(s).unwrap()
    }

    #[test]
    fn identity_roundtrip_for_all_boundary_slices() {
        for start in [None, Some(0)] {
            for end in [None, Some(0), Some(4), Some(5)] {
                assert_eq!(
                    PathSlice::into("", start, end).rewrite(None, None).unwrap().unwrap().unslice(),
                    ""
                );
                assert_eq!(
                    PathSlice::into("hello", start, end).rewrite(None, None).unwrap().unwrap().unslice(),
                    "hello"
                );
                assert_eq!(
                    PathSlice::into("a/b/c/d", start, end).rewrite(None, None).unwrap().unwrap().unslice(),
                    "a/b/c/d"
                );
            }
        }
    }

    #[test]
    fn non_trivial_slices_match_python_semantics() {
        let arr = ["a", "b", "c"];
        let cases: [(Option<i64>, Option<i64>); 6] =
            [(None, Some(1)), (Some(0), Some(2)), (Some(1), Some(3)), (Some(-2), Some(-1)), (Some(1), Some(-1)), (Some(-3), Some(2))];
        for (start, end) in cases {
            let sl = PathSlice::into("a/b/c", start, end);
            let expect = python_slice_ref(&arr, start, end).join("/");
            assert_eq!(sl.inner(), expect);
            assert!(!sl.inner().is_empty());
        }
        assert_eq!(PathSlice::into("a/b/c", Some(1), Some(0)).inner(), "b/c");
    }

    fn python_slice_ref<'a>(arr: &[&'a str], start: Option<i64>, stop: Option<i64>) -> Vec<&'a str> {
        python_slice(arr, start, stop)
    }

    #[test]
    fn empty_slices() {
        for (start, end) in [(Some(-1), Some(1)), (Some(-1), Some(-2)), (Some(1), Some(1)), (Some(2), Some(1))] {
            assert_eq!(PathSlice::into("a/b/c", start, end).inner(), "");
        }
    }

    #[test]
    fn rewrite_matches_or_fails() {
        let psl = PathSlice::into("a/bbc/d", Some(1), Some(2));
        assert_eq!(psl.inner(), "bbc");
        assert!(psl.rewrite(Some(&re("b")), None).unwrap().is_none());
        assert!(psl.rewrite(Some(&re("b")), Some("c")).unwrap().is_none());
        assert_eq!(
            psl.rewrite(Some(&re("b*c")), None).unwrap().unwrap().unslice(),
            "a/bbc/d"
        );
        assert_eq!(
            psl.rewrite(Some(&re("(b*)(c)")), Some("\\2\\1\\2")).unwrap().unwrap().unslice(),
            "a/cbbc/d"
        );
        assert_eq!(psl.inner(), "bbc");
        assert!(psl.rewrite(Some(&re("(b*)c")), Some("\\2")).is_err());
    }

    #[test]
    fn rewrite_multiple_segments() {
        let psl = PathSlice::into("a/b/c/d", Some(1), Some(3));
        assert_eq!(
            psl.rewrite(Some(&re("([^/]+)/(.+)")), Some("\\2/\\1")).unwrap().unwrap().unslice(),
            "a/c/b/d"
        );
        assert_eq!(
            psl.rewrite(Some(&re("([^/]+)/(.+)")), Some("")).unwrap().unwrap().unslice(),
            "a/d"
        );
    }

    #[test]
    fn description_expands_even_when_pattern_does_not_fully_match() {
        let psl = PathSlice::into("a/bbc/d", Some(1), Some(2));
        assert_eq!(psl.inner(), "bbc");
        // A custom description with no backreferences must render verbatim
        // even though `b` alone doesn't fully match "bbc".
        assert_eq!(
            expand_description(&psl, Some(&re("b")), "must be named exactly 'b'").unwrap(),
            "must be named exactly 'b'"
        );
        // A backreference the pattern can still capture via a partial search
        // expands successfully.
        assert_eq!(
            expand_description(&psl, Some(&re("(b+)")), "leading run: \\1").unwrap(),
            "leading run: bb"
        );
    }

    #[test]
    fn description_rejects_out_of_range_backref_even_on_non_match() {
        let psl = PathSlice::into("a/bbc/d", Some(1), Some(2));
        assert!(expand_description(&psl, Some(&re("b")), "\\9").is_err());
    }
}
