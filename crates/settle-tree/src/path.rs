//! Dotted node paths
//!
//! Provides [`NodePath`] for addressing nodes below a branch, e.g.
//! `server.tls.enabled`.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Path from a branch to one of its descendants
///
/// The empty path addresses the branch itself.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodePath(Vec<String>);

impl NodePath {
    /// Create path from segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Path of one segment
    #[inline]
    #[must_use]
    pub fn single(segment: impl Into<String>) -> Self {
        Self(vec![segment.into()])
    }

    /// Empty path
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Path addresses the starting branch
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Path without its last segment
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.0.split_last()?;
        Some(Self(init.to_vec()))
    }

    /// Last segment
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Append a segment, returning a new path
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut path = self.clone();
        path.0.push(segment.into());
        path
    }

    /// This path is a prefix of `other`
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Segments from first to last
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Display for NodePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl FromStr for NodePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        s.split('.')
            .map(|segment| {
                if segment.is_empty() {
                    Err(PathError::EmptySegment(s.to_string()))
                } else {
                    Ok(segment.to_string())
                }
            })
            .collect::<Result<_, _>>()
            .map(Self)
    }
}

impl From<Vec<String>> for NodePath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl From<&str> for NodePath {
    /// Single segment, not split on dots
    fn from(segment: &str) -> Self {
        Self::single(segment)
    }
}

/// Errors parsing a [`NodePath`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Two dots in a row, or a leading or trailing dot
    #[error("path '{0}' contains an empty segment")]
    EmptySegment(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dotted_segments() {
        let path: NodePath = "server.tls.enabled".parse().unwrap();
        assert_eq!(path.segments(), &["server", "tls", "enabled"]);
        assert_eq!(path.to_string(), "server.tls.enabled");
    }

    #[test]
    fn empty_string_is_root() {
        let path: NodePath = "".parse().unwrap();
        assert!(path.is_empty());
        assert!(path.parent().is_none());
    }

    #[test]
    fn rejects_empty_segments() {
        assert_eq!(
            "a..b".parse::<NodePath>(),
            Err(PathError::EmptySegment("a..b".into()))
        );
        assert!(".a".parse::<NodePath>().is_err());
        assert!("a.".parse::<NodePath>().is_err());
    }

    #[test]
    fn parent_and_child() {
        let path = NodePath::single("a").child("b");
        assert_eq!(path.last(), Some("b"));
        assert_eq!(path.parent(), Some(NodePath::single("a")));
        assert!(NodePath::single("a").is_prefix_of(&path));
        assert!(!path.is_prefix_of(&NodePath::single("a")));
    }

    #[test]
    fn single_segment_keeps_dots() {
        let path = NodePath::from("a.b");
        assert_eq!(path.len(), 1);
    }
}
