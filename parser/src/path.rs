//! FILENAME: parser/src/path.rs
//! PURPOSE: Hierarchical inspection-plan paths.
//! CONTEXT: A Path is the universal key for every lookup the engine performs
//! (measured values, attributes, child entities, nested formulas) and for the
//! membership tests used by cycle detection. Equality is structural: the same
//! segment names with the same segment kinds in the same order.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// The delimiter between segments and the textual marker of the root path.
pub const DELIMITER: char = '/';

/// Kind of entity a path segment denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SegmentKind {
    Part,
    Characteristic,
}

impl SegmentKind {
    /// Returns the other kind (Part <-> Characteristic).
    pub fn flipped(self) -> Self {
        match self {
            SegmentKind::Part => SegmentKind::Characteristic,
            SegmentKind::Characteristic => SegmentKind::Part,
        }
    }
}

/// One typed, named step in a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathSegment {
    pub kind: SegmentKind,
    pub name: String,
}

impl PathSegment {
    pub fn new(kind: SegmentKind, name: impl Into<String>) -> Self {
        PathSegment {
            kind,
            name: name.into(),
        }
    }

    pub fn part(name: impl Into<String>) -> Self {
        Self::new(SegmentKind::Part, name)
    }

    pub fn characteristic(name: impl Into<String>) -> Self {
        Self::new(SegmentKind::Characteristic, name)
    }

    /// False if the name contains `"`. Formula text has no escape for it, so
    /// such a segment can be stored and looked up but not written in a formula.
    pub fn is_renderable(&self) -> bool {
        !self.name.contains('"')
    }

    /// True if the segment must be quoted to survive a round trip through a formula.
    fn needs_quotes(&self) -> bool {
        self.name.is_empty()
            || self.name == ".."
            || self.name.trim() != self.name
            || self.name.chars().any(crate::lexer::is_terminal)
    }
}

/// A root-anchored, ordered sequence of segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Path {
    segments: SmallVec<[PathSegment; 4]>,
}

impl Path {
    /// The root path (no segments).
    pub fn root() -> Self {
        Path::default()
    }

    pub fn from_segments(segments: impl IntoIterator<Item = PathSegment>) -> Self {
        Path {
            segments: segments.into_iter().collect(),
        }
    }

    /// Builds a path of part segments followed by one characteristic segment.
    /// Convenient for the common "characteristic below a part chain" layout.
    pub fn characteristic(parts: &[&str], name: &str) -> Self {
        let mut path = Path::from_segments(parts.iter().map(|p| PathSegment::part(*p)));
        path.push(PathSegment::characteristic(name));
        path
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Name of the last segment, or an empty string for the root.
    pub fn name(&self) -> &str {
        self.segments.last().map(|s| s.name.as_str()).unwrap_or("")
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }

    /// Returns a new path with `segment` appended.
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut path = self.clone();
        path.push(segment);
        path
    }

    /// The parent path. The root is its own parent.
    pub fn parent(&self) -> Self {
        let mut path = self.clone();
        path.pop();
        path
    }

    /// True if every segment can be written in formula text.
    pub fn is_renderable(&self) -> bool {
        self.segments.iter().all(PathSegment::is_renderable)
    }

    /// True if `self` is `other` or lies below it.
    pub fn starts_with(&self, other: &Path) -> bool {
        self.segments.len() >= other.segments.len()
            && self.segments[..other.segments.len()] == other.segments[..]
    }
}

/// Formula text of the path, with segments quoted where needed. The text
/// parses back to the same names only if `is_renderable()` holds.
impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "{}", DELIMITER);
        }
        for segment in &self.segments {
            if segment.needs_quotes() {
                write!(f, "{}\"{}\"", DELIMITER, segment.name)?;
            } else {
                write!(f, "{}{}", DELIMITER, segment.name)?;
            }
        }
        Ok(())
    }
}

impl FromIterator<PathSegment> for Path {
    fn from_iter<T: IntoIterator<Item = PathSegment>>(iter: T) -> Self {
        Path::from_segments(iter)
    }
}
