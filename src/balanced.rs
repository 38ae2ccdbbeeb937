//! Balanced-Tag Primitive
//!
//! `spec.md` describes this as a matcher-embedded counting mechanism: push
//! a depth marker on every nested `<T…>`, pop on every `</T…>`, and only
//! accept the outer close once the depth stack is empty. The `regex` crate
//! (the teacher's own dependency) has no backreferences, recursion, or
//! atomic-group support, so there is no single pattern that can express
//! this. Per `spec.md` §9's explicit fallback, this module is the "small
//! hand-written scanner that maintains the same two stacks (tag-depth;
//! quote-state)" — built on the Pattern Library's compiled regexes for
//! locating individual tag boundaries, with the counting done in plain Rust.
//!
//! Two products, both described as "factory by tag" in `spec.md` §4.1:
//! - [`find_balanced`] — the general-purpose primitive, usable standalone.
//! - [`scan_raw_text_body`] — the quote-aware variant `spec.md` §4.2.1 needs
//!   to find a raw-text element's real end without being fooled by a
//!   `</script>`-shaped string literal inside the element's own content.
//!
//! Both accept a [`Deadline`] and fall back to a literal substring search
//! for the close tag if it is exceeded, per the resource model in
//! `spec.md` §5/§7: a matcher timeout is recoverable, never fatal.

use std::time::{Duration, Instant};

/// Wall-clock budget for a single balanced/raw-text scan.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires_at: Instant,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self {
            expires_at: Instant::now() + budget,
        }
    }

    /// The recommended default: a few seconds, per `spec.md` §5.
    pub fn default_budget() -> Self {
        Self::after(Duration::from_secs(5))
    }

    fn expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::default_budget()
    }
}

/// The span of a balanced `<T…> BODY </T…>` match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalancedMatch {
    pub open_start: usize,
    pub open_end: usize,
    pub body_start: usize,
    pub body_end: usize,
    pub close_start: usize,
    pub close_end: usize,
}

impl BalancedMatch {
    pub fn outer_end(&self) -> usize {
        self.close_end
    }
}

/// Outcome of a raw-text body scan (`spec.md` §4.2.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawTextBody {
    /// Body ran from `body_start` to `body_end`, the close tag spans
    /// `[close_start, close_end)`.
    Closed {
        body_start: usize,
        body_end: usize,
        close_start: usize,
        close_end: usize,
    },
    /// No matching close tag was found before the end of input.
    Unterminated { body_start: usize },
    /// The deadline elapsed before a structured answer was found; the
    /// caller should record a `ParseErrorKind::MatcherTimeout` and has
    /// already received the literal-search fallback result here.
    TimedOut {
        body_start: usize,
        body_end: usize,
        close_start: usize,
        close_end: usize,
    },
}

fn ascii_ieq(a: u8, b: u8) -> bool {
    a.to_ascii_lowercase() == b.to_ascii_lowercase()
}

/// Does `haystack[pos..]` begin with `tag_lower`, case-insensitively,
/// followed by a byte that cannot extend a tag name (so `<title` doesn't
/// spuriously match a `tag_lower` of `"tit"`)?
fn matches_tag_name(haystack: &[u8], pos: usize, tag_lower: &str) -> Option<usize> {
    let tag = tag_lower.as_bytes();
    if pos + tag.len() > haystack.len() {
        return None;
    }
    for (i, &tb) in tag.iter().enumerate() {
        if !ascii_ieq(haystack[pos + i], tb) {
            return None;
        }
    }
    let after = pos + tag.len();
    match haystack.get(after) {
        None => Some(after),
        Some(&b) if b.is_ascii_alphanumeric() || b == b'-' || b == b':' => None,
        Some(_) => Some(after),
    }
}

/// Skip to the end of a tag (`>`), honoring quoted attribute values so a
/// `>` inside `"..."`/`'...'` doesn't end the tag early. Returns the byte
/// offset just past the `>`, and whether the tag was self-closing.
fn skip_to_tag_end(haystack: &[u8], mut pos: usize) -> Option<(usize, bool)> {
    let mut last_non_space: Option<u8> = None;
    while pos < haystack.len() {
        match haystack[pos] {
            b'"' => {
                pos += 1;
                while pos < haystack.len() && haystack[pos] != b'"' {
                    pos += 1;
                }
                pos += 1;
                last_non_space = Some(b'"');
            }
            b'\'' => {
                pos += 1;
                while pos < haystack.len() && haystack[pos] != b'\'' {
                    pos += 1;
                }
                pos += 1;
                last_non_space = Some(b'\'');
            }
            b'>' => {
                let self_closing = last_non_space == Some(b'/');
                return Some((pos + 1, self_closing));
            }
            b if b.is_ascii_whitespace() => {
                pos += 1;
            }
            other => {
                last_non_space = Some(other);
                pos += 1;
            }
        }
    }
    None
}

enum Boundary {
    Open { end: usize, self_closing: bool },
    Close { end: usize },
}

/// Find the next `<tag…>` or `</tag…>` boundary for `tag_lower` at or after
/// `from`. Ignores occurrences inside quoted attribute values of *other*
/// tags only in the limited sense that `skip_to_tag_end` is applied once a
/// boundary starts; text outside any tag is scanned byte-by-byte.
fn next_boundary(haystack: &[u8], tag_lower: &str, from: usize) -> Option<(usize, Boundary)> {
    let mut pos = from;
    while pos < haystack.len() {
        if haystack[pos] != b'<' {
            pos += 1;
            continue;
        }
        let is_close = haystack.get(pos + 1) == Some(&b'/');
        let name_start = if is_close { pos + 2 } else { pos + 1 };
        if let Some(after_name) = matches_tag_name(haystack, name_start, tag_lower) {
            if let Some((end, self_closing)) = skip_to_tag_end(haystack, after_name) {
                let boundary = if is_close {
                    Boundary::Close { end }
                } else {
                    Boundary::Open { end, self_closing }
                };
                return Some((pos, boundary));
            }
        }
        pos += 1;
    }
    None
}

fn literal_fallback_close(haystack: &[u8], tag_lower: &str, from: usize) -> Option<(usize, usize)> {
    let mut pos = from;
    while pos < haystack.len() {
        if haystack[pos] == b'<' && haystack.get(pos + 1) == Some(&b'/') {
            if let Some(after_name) = matches_tag_name(haystack, pos + 2, tag_lower) {
                if let Some(close_end) = haystack[after_name..].iter().position(|&b| b == b'>') {
                    return Some((pos, after_name + close_end + 1));
                }
            }
        }
        pos += 1;
    }
    None
}

/// The general-purpose balanced-tag primitive: `haystack[open_start..]`
/// must begin with `<tag_lower…>` (not self-closing); returns the span out
/// to the matching, depth-balanced `</tag_lower…>`.
pub fn find_balanced(
    haystack: &str,
    tag_lower: &str,
    open_start: usize,
    deadline: Deadline,
) -> Option<BalancedMatch> {
    let bytes = haystack.as_bytes();
    let (open_end, self_closing) = {
        let after_name = matches_tag_name(bytes, open_start + 1, tag_lower)?;
        skip_to_tag_end(bytes, after_name)?
    };
    if self_closing {
        return Some(BalancedMatch {
            open_start,
            open_end,
            body_start: open_end,
            body_end: open_end,
            close_start: open_start,
            close_end: open_end,
        });
    }

    let mut depth: usize = 1;
    let mut cursor = open_end;
    loop {
        if deadline.expired() {
            let (close_start, close_end) = literal_fallback_close(bytes, tag_lower, cursor)?;
            return Some(BalancedMatch {
                open_start,
                open_end,
                body_start: open_end,
                body_end: close_start,
                close_start,
                close_end,
            });
        }
        let (start, boundary) = next_boundary(bytes, tag_lower, cursor)?;
        match boundary {
            Boundary::Open { end, self_closing } => {
                if !self_closing {
                    depth += 1;
                }
                cursor = end;
            }
            Boundary::Close { end } => {
                depth -= 1;
                if depth == 0 {
                    return Some(BalancedMatch {
                        open_start,
                        open_end,
                        body_start: open_end,
                        body_end: start,
                        close_start: start,
                        close_end: end,
                    });
                }
                cursor = end;
            }
        }
    }
}

/// The quote-aware variant `spec.md` §4.2.1 uses to extract a raw-text
/// element's body: `start` is the first byte after the element's open tag.
/// No escape processing is performed — a backslash is literal, per
/// `spec.md` §9's resolution of the open question on this point.
pub fn scan_raw_text_body(haystack: &str, tag_lower: &str, start: usize, deadline: Deadline) -> RawTextBody {
    let bytes = haystack.as_bytes();
    let mut pos = start;
    let mut in_single = false;
    let mut in_double = false;
    let mut depth: usize = 1;

    while pos < bytes.len() {
        if deadline.expired() {
            return match literal_fallback_close(bytes, tag_lower, pos) {
                Some((close_start, close_end)) => RawTextBody::TimedOut {
                    body_start: start,
                    body_end: close_start,
                    close_start,
                    close_end,
                },
                None => RawTextBody::TimedOut {
                    body_start: start,
                    body_end: bytes.len(),
                    close_start: bytes.len(),
                    close_end: bytes.len(),
                },
            };
        }

        let b = bytes[pos];
        if in_single {
            if b == b'\'' {
                in_single = false;
            }
            pos += 1;
            continue;
        }
        if in_double {
            if b == b'"' {
                in_double = false;
            }
            pos += 1;
            continue;
        }
        match b {
            b'\'' => {
                in_single = true;
                pos += 1;
            }
            b'"' => {
                in_double = true;
                pos += 1;
            }
            b'<' => {
                let is_close = bytes.get(pos + 1) == Some(&b'/');
                let name_start = if is_close { pos + 2 } else { pos + 1 };
                if let Some(after_name) = matches_tag_name(bytes, name_start, tag_lower) {
                    if let Some((end, self_closing)) = skip_to_tag_end(bytes, after_name) {
                        if is_close {
                            depth -= 1;
                            if depth == 0 {
                                return RawTextBody::Closed {
                                    body_start: start,
                                    body_end: pos,
                                    close_start: pos,
                                    close_end: end,
                                };
                            }
                        } else if !self_closing {
                            depth += 1;
                        }
                        pos = end;
                        continue;
                    }
                }
                pos += 1;
            }
            _ => pos += 1,
        }
    }

    RawTextBody::Unterminated { body_start: start }
}
