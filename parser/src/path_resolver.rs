//! FILENAME: parser/src/path_resolver.rs
//! PURPOSE: Turns the text between braces into an absolute Path.
//! CONTEXT: Formula references are written relative to the entity that holds
//! the formula's owner (the anchor), may climb with `..`, may start at the
//! root with `/`, and may quote segments that contain reserved characters.
//!
//! ALGORITHM:
//! 1. Trim. A lone `/` is the root path.
//! 2. Split into `/`-delimited, optionally quoted segments, all typed as
//!    characteristics for now.
//! 3. Relative text is appended to the anchor; every unquoted `..` removes
//!    the most recent segment. Climbing above the root fails.
//! 4. Walk the common prefix with the anchor: where a name matches, take the
//!    anchor's segment (and so its kind). Stop at the first mismatch and keep
//!    the rest as parsed.

use crate::path::{Path, PathSegment, SegmentKind, DELIMITER};

/// Resolves formula path text relative to some anchor.
pub trait PathResolver {
    fn resolve(&self, raw: &str) -> Option<Path>;
}

/// Creates a resolver for a given anchor. Lets hosts replace the default rules.
pub trait PathResolverFactory: Send + Sync {
    fn create(&self, anchor: &Path) -> Box<dyn PathResolver>;
}

impl<F> PathResolverFactory for F
where
    F: Fn(&Path) -> Box<dyn PathResolver> + Send + Sync,
{
    fn create(&self, anchor: &Path) -> Box<dyn PathResolver> {
        self(anchor)
    }
}

/// Factory for [`DefaultPathResolver`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPathResolverFactory;

impl PathResolverFactory for DefaultPathResolverFactory {
    fn create(&self, anchor: &Path) -> Box<dyn PathResolver> {
        Box::new(DefaultPathResolver::new(anchor.clone()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DefaultPathResolver {
    anchor: Path,
}

/// A segment as written, before resolution.
#[derive(Debug, Clone, PartialEq)]
struct RawSegment {
    name: String,
    quoted: bool,
}

impl RawSegment {
    fn is_parent(&self) -> bool {
        !self.quoted && self.name == ".."
    }
}

impl DefaultPathResolver {
    pub fn new(anchor: Path) -> Self {
        DefaultPathResolver { anchor }
    }

    pub fn anchor(&self) -> &Path {
        &self.anchor
    }

    /// Replaces kinds along the prefix shared with the anchor.
    fn correct_kinds(&self, path: Path) -> Path {
        let anchor = self.anchor.segments();
        let segments = path.segments();

        let verified = segments
            .iter()
            .zip(anchor)
            .take_while(|(seg, anc)| seg.name == anc.name)
            .count();

        anchor[..verified]
            .iter()
            .chain(&segments[verified..])
            .cloned()
            .collect()
    }
}

impl PathResolver for DefaultPathResolver {
    fn resolve(&self, raw: &str) -> Option<Path> {
        let text = raw.trim();
        let root_marker = DELIMITER.to_string();
        if text == root_marker {
            return Some(Path::root());
        }

        let absolute = text.starts_with(DELIMITER);
        let mut path = if absolute {
            Path::root()
        } else {
            self.anchor.clone()
        };

        for segment in split_segments(text) {
            if segment.is_parent() {
                path.pop()?;
            } else {
                path.push(PathSegment::new(SegmentKind::Characteristic, segment.name));
            }
        }

        Some(self.correct_kinds(path))
    }
}

/// Splits path text at `/` outside of double quotes. Empty unquoted
/// segments (leading or doubled delimiters) are dropped.
fn split_segments(text: &str) -> Vec<RawSegment> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut in_quotes = false;

    let mut finish = |current: &mut String, quoted: &mut bool| {
        let name = if *quoted {
            std::mem::take(current)
        } else {
            let trimmed = current.trim().to_string();
            current.clear();
            trimmed
        };
        if *quoted || !name.is_empty() {
            segments.push(RawSegment {
                name,
                quoted: *quoted,
            });
        }
        *quoted = false;
    };

    for ch in text.chars() {
        match ch {
            '"' => {
                if in_quotes {
                    in_quotes = false;
                } else {
                    // Text before the opening quote is only whitespace in well-formed input.
                    current.clear();
                    in_quotes = true;
                    quoted = true;
                }
            }
            c if c == DELIMITER && !in_quotes => finish(&mut current, &mut quoted),
            c if quoted && !in_quotes => {
                // Whitespace after a closing quote is insignificant.
                if !c.is_whitespace() {
                    current.push(c);
                }
            }
            c => current.push(c),
        }
    }
    finish(&mut current, &mut quoted);

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor3() -> Path {
        Path::from_segments([
            PathSegment::part("Plant"),
            PathSegment::part("Engine"),
            PathSegment::part("Block"),
        ])
    }

    #[test]
    fn test_split_plain_and_quoted() {
        let segments = split_segments("a/\"b c/d\"/ e ");
        let names: Vec<&str> = segments.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b c/d", "e"]);
        assert!(segments[1].quoted);
        assert!(!segments[2].quoted);
    }

    #[test]
    fn test_root_marker() {
        let resolver = DefaultPathResolver::new(anchor3());
        assert_eq!(resolver.resolve(" / "), Some(Path::root()));
    }

    #[test]
    fn test_relative_resolution_keeps_anchor_kinds() {
        let resolver = DefaultPathResolver::new(anchor3());
        let path = resolver.resolve("Bore").unwrap();
        assert_eq!(path, anchor3().child(PathSegment::characteristic("Bore")));
    }

    #[test]
    fn test_two_levels_up() {
        let resolver = DefaultPathResolver::new(anchor3());
        let path = resolver.resolve("../..").unwrap();
        assert_eq!(path, Path::from_segments([PathSegment::part("Plant")]));
    }

    #[test]
    fn test_climbing_above_root_fails() {
        let resolver = DefaultPathResolver::new(anchor3());
        assert_eq!(resolver.resolve("../../../.."), None);
        assert_eq!(resolver.resolve("../../.."), Some(Path::root()));
    }

    #[test]
    fn test_quoted_parent_is_a_name() {
        let resolver = DefaultPathResolver::new(anchor3());
        let path = resolver.resolve("\"..\"").unwrap();
        assert_eq!(path.name(), "..");
        assert_eq!(path.len(), 4);
    }

    #[test]
    fn test_absolute_path_kinds_corrected_along_anchor() {
        let resolver = DefaultPathResolver::new(anchor3());
        let path = resolver.resolve("/Plant/Engine/Cover/Width").unwrap();
        assert_eq!(
            path.segments(),
            &[
                PathSegment::part("Plant"),
                PathSegment::part("Engine"),
                PathSegment::characteristic("Cover"),
                PathSegment::characteristic("Width"),
            ]
        );
    }

    #[test]
    fn test_factory_closure() {
        let factory = |_: &Path| -> Box<dyn PathResolver> {
            Box::new(DefaultPathResolver::new(Path::root()))
        };
        let resolver = factory.create(&anchor3());
        assert_eq!(resolver.resolve("X"), Some(Path::characteristic(&[], "X")));
    }
}
