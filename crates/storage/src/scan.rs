//! Prefix scan requests and their key-range bounds
//!
//! A scan covers every key starting with `prefix`, walked in byte order
//! (forward) or reverse byte order (backward). An optional `start` is an
//! inclusive seek position:
//!
//! - forward: first key `>= max(prefix, start)`
//! - backward: last key `<= start` that still carries the prefix
//!
//! The upper end of a prefix is the smallest string greater than every string
//! with that prefix ([`prefix_successor`]). An empty prefix is unbounded.

use std::ops::Bound;

/// Iteration direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Ascending key order
    Forward,
    /// Descending key order
    Backward,
}

/// A prefix-bounded scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRequest<'a> {
    /// Only keys starting with this are visited
    pub prefix: &'a str,
    /// Walk order
    pub direction: Direction,
    /// Inclusive seek position
    pub start: Option<&'a str>,
}

impl<'a> ScanRequest<'a> {
    /// Ascending scan over `prefix`
    pub fn forward(prefix: &'a str) -> Self {
        Self {
            prefix,
            direction: Direction::Forward,
            start: None,
        }
    }

    /// Descending scan over `prefix`
    pub fn backward(prefix: &'a str) -> Self {
        Self {
            prefix,
            direction: Direction::Backward,
            start: None,
        }
    }

    /// Scan in `direction` over `prefix`
    pub fn new(prefix: &'a str, direction: Direction) -> Self {
        Self {
            prefix,
            direction,
            start: None,
        }
    }

    /// Seek to `start` before visiting
    pub fn starting_at(mut self, start: Option<&'a str>) -> Self {
        self.start = start;
        self
    }

    /// Resolve to concrete key bounds, or `None` when the range is empty
    pub fn bounds(&self) -> Option<ScanBounds> {
        ScanBounds::for_request(self)
    }
}

/// Concrete key range of a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanBounds {
    /// Lower end
    pub lower: Bound<String>,
    /// Upper end
    pub upper: Bound<String>,
}

impl ScanBounds {
    fn for_request(req: &ScanRequest<'_>) -> Option<Self> {
        let prefix_end = match prefix_successor(req.prefix) {
            Some(s) => Bound::Excluded(s),
            None => Bound::Unbounded,
        };

        let bounds = match (req.direction, req.start) {
            (_, None) => ScanBounds {
                lower: Bound::Included(req.prefix.to_string()),
                upper: prefix_end,
            },
            (Direction::Forward, Some(start)) => {
                let lower = if start > req.prefix { start } else { req.prefix };
                ScanBounds {
                    lower: Bound::Included(lower.to_string()),
                    upper: prefix_end,
                }
            }
            (Direction::Backward, Some(start)) => {
                let upper = match &prefix_end {
                    Bound::Excluded(end) if start >= end.as_str() => prefix_end.clone(),
                    _ => Bound::Included(start.to_string()),
                };
                ScanBounds {
                    lower: Bound::Included(req.prefix.to_string()),
                    upper,
                }
            }
        };

        if bounds.is_empty() {
            None
        } else {
            Some(bounds)
        }
    }

    fn is_empty(&self) -> bool {
        let lower = match &self.lower {
            Bound::Included(s) | Bound::Excluded(s) => s,
            Bound::Unbounded => return false,
        };
        match &self.upper {
            Bound::Included(u) => match &self.lower {
                Bound::Included(_) => lower > u,
                _ => lower >= u,
            },
            Bound::Excluded(u) => lower >= u,
            Bound::Unbounded => false,
        }
    }

    /// Borrowed view usable with `BTreeMap::range` and redb ranges
    pub fn as_str_bounds(&self) -> (Bound<&str>, Bound<&str>) {
        (as_str_bound(&self.lower), as_str_bound(&self.upper))
    }

    /// Narrow the range so a resumed scan continues after `last_key`
    pub fn resume_after(&mut self, direction: Direction, last_key: &str) {
        match direction {
            Direction::Forward => self.lower = Bound::Excluded(last_key.to_string()),
            Direction::Backward => self.upper = Bound::Excluded(last_key.to_string()),
        }
    }

    /// True if the narrowed range still holds keys
    pub fn has_remaining(&self) -> bool {
        !self.is_empty()
    }
}

fn as_str_bound(bound: &Bound<String>) -> Bound<&str> {
    match bound {
        Bound::Included(s) => Bound::Included(s.as_str()),
        Bound::Excluded(s) => Bound::Excluded(s.as_str()),
        Bound::Unbounded => Bound::Unbounded,
    }
}

/// Smallest string greater than every string starting with `prefix`.
///
/// Returns `None` when no such string exists (empty prefix, or a prefix made
/// only of `char::MAX`), meaning the range is unbounded above.
pub fn prefix_successor(prefix: &str) -> Option<String> {
    let mut chars: Vec<char> = prefix.chars().collect();
    while let Some(last) = chars.pop() {
        let next = match last as u32 {
            0xD7FF => Some('\u{E000}'),
            n => char::from_u32(n + 1),
        };
        if let Some(next) = next {
            chars.push(next);
            return Some(chars.into_iter().collect());
        }
    }
    None
}
