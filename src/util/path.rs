//! Hierarchical prim paths.
//!
//! A [`ScenePath`] is either absolute (`/World/Geo`) or relative
//! (`Geo/mesh`). The absolute root is `/`; the empty path names nothing.
//!
//! Paths order element by element with a parent sorting before all of its
//! descendants, so any subtree occupies one contiguous run of a sorted
//! sequence: `/B < /B/A < /B/Z < /Ba < /C`.

use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

use super::{Error, Result, Token};

/// A hierarchical path naming a prim.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScenePath {
    absolute: bool,
    elements: SmallVec<[Token; 6]>,
}

impl ScenePath {
    /// The absolute root path `/`.
    pub fn absolute_root() -> Self {
        Self {
            absolute: true,
            elements: SmallVec::new(),
        }
    }

    /// The empty path.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a path string.
    ///
    /// Accepts `/`, absolute paths (`/A/B`) and relative paths (`A/B`).
    /// The empty string parses to the empty path.
    pub fn parse(text: &str) -> Result<Self> {
        if text.is_empty() {
            return Ok(Self::empty());
        }
        if text == "/" {
            return Ok(Self::absolute_root());
        }

        let (absolute, body) = match text.strip_prefix('/') {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let mut elements = SmallVec::new();
        for name in body.split('/') {
            if name.is_empty() {
                return Err(Error::invalid_path(text, "empty path element"));
            }
            if !is_valid_name(name) {
                return Err(Error::invalid_path(
                    text,
                    format!("invalid element name '{}'", name),
                ));
            }
            elements.push(Token::new(name));
        }

        Ok(Self { absolute, elements })
    }

    /// Build an absolute path from element names.
    pub fn from_elements<I, T>(elements: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        Self {
            absolute: true,
            elements: elements.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if this is the empty path.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.absolute && self.elements.is_empty()
    }

    /// Check if this path is absolute.
    #[inline]
    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    /// Check if this is `/`.
    #[inline]
    pub fn is_absolute_root(&self) -> bool {
        self.absolute && self.elements.is_empty()
    }

    /// Path elements, outermost first.
    #[inline]
    pub fn elements(&self) -> &[Token] {
        &self.elements
    }

    /// Number of name elements (`/` has zero).
    #[inline]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Last element name, or `None` for `/` and the empty path.
    pub fn name(&self) -> Option<&Token> {
        self.elements.last()
    }

    /// Parent path. The parent of `/` and of a single-element relative
    /// path is the empty path.
    pub fn parent(&self) -> Self {
        if self.elements.is_empty() {
            return Self::empty();
        }
        let mut elements = self.elements.clone();
        elements.pop();
        Self {
            absolute: self.absolute,
            elements,
        }
    }

    /// Append a child name.
    pub fn append_child(&self, name: impl Into<Token>) -> Self {
        let mut elements = self.elements.clone();
        elements.push(name.into());
        Self {
            absolute: self.absolute,
            elements,
        }
    }

    /// Append a relative path.
    pub fn append_path(&self, relative: &ScenePath) -> Self {
        let mut elements = self.elements.clone();
        elements.extend(relative.elements.iter().cloned());
        Self {
            absolute: self.absolute,
            elements,
        }
    }

    /// Check if `prefix` is this path or one of its ancestors.
    pub fn has_prefix(&self, prefix: &ScenePath) -> bool {
        if prefix.is_empty() {
            return false;
        }
        self.absolute == prefix.absolute
            && self.elements.len() >= prefix.elements.len()
            && self.elements[..prefix.elements.len()] == prefix.elements[..]
    }

    /// Replace a leading `old` prefix with `new`.
    ///
    /// Returns `None` when `old` is not a prefix of this path.
    pub fn replace_prefix(&self, old: &ScenePath, new: &ScenePath) -> Option<Self> {
        if !self.has_prefix(old) {
            return None;
        }
        let mut elements = new.elements.clone();
        elements.extend(self.elements[old.elements.len()..].iter().cloned());
        Some(Self {
            absolute: new.absolute,
            elements,
        })
    }

    /// Longest common ancestor of two paths.
    pub fn common_prefix(&self, other: &ScenePath) -> Self {
        if self.absolute != other.absolute {
            return Self::empty();
        }
        let shared = self
            .elements
            .iter()
            .zip(other.elements.iter())
            .take_while(|(a, b)| a == b)
            .count();
        Self {
            absolute: self.absolute,
            elements: self.elements[..shared].iter().cloned().collect(),
        }
    }

    /// Iterate this path and its ancestors, innermost first, ending at `/`
    /// for absolute paths.
    pub fn ancestors(&self) -> impl Iterator<Item = ScenePath> + '_ {
        let lowest = if self.absolute { 0 } else { 1 };
        let count = self.elements.len();
        (lowest..=count).rev().map(move |n| Self {
            absolute: self.absolute,
            elements: self.elements[..n].iter().cloned().collect(),
        })
    }

    /// Prefixes from outermost to this path, excluding `/`.
    pub fn prefixes(&self) -> Vec<ScenePath> {
        (1..=self.elements.len())
            .map(|n| Self {
                absolute: self.absolute,
                elements: self.elements[..n].iter().cloned().collect(),
            })
            .collect()
    }
}

/// Check that a path element is a usable prim name.
fn is_valid_name(name: &str) -> bool {
    name != "." && name != ".." && !name.contains(char::is_whitespace)
}

impl FromStr for ScenePath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ScenePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_absolute_root() {
            return f.write_str("/");
        }
        for (i, name) in self.elements.iter().enumerate() {
            if i > 0 || self.absolute {
                f.write_str("/")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ScenePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> ScenePath {
        ScenePath::parse(s).unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        assert!(p("").is_empty());
        assert!(p("/").is_absolute_root());
        assert_eq!(p("/A/B").to_string(), "/A/B");
        assert_eq!(p("A/B").to_string(), "A/B");
        assert!(!p("A/B").is_absolute());
        assert_eq!(p("/A/B").element_count(), 2);

        assert!(ScenePath::parse("/A//B").is_err());
        assert!(ScenePath::parse("/A/").is_err());
        assert!(ScenePath::parse("/A/..").is_err());
    }

    #[test]
    fn test_parent_and_child() {
        assert_eq!(p("/A/B").parent(), p("/A"));
        assert_eq!(p("/A").parent(), p("/"));
        assert!(p("/").parent().is_empty());
        assert_eq!(p("/").append_child("A"), p("/A"));
        assert_eq!(p("/A").append_child("B").name().unwrap(), "B");
        assert_eq!(p("/A").append_path(&p("B/C")), p("/A/B/C"));
    }

    #[test]
    fn test_prefix_queries() {
        assert!(p("/A/B").has_prefix(&p("/")));
        assert!(p("/A/B").has_prefix(&p("/A")));
        assert!(p("/A/B").has_prefix(&p("/A/B")));
        assert!(!p("/A").has_prefix(&p("/A/B")));
        assert!(!p("/AB").has_prefix(&p("/A")));
        assert!(!p("A/B").has_prefix(&p("/A")));

        assert_eq!(p("/A/B/C").replace_prefix(&p("/A"), &p("/X/Y")), Some(p("/X/Y/B/C")));
        assert_eq!(p("/A/B").replace_prefix(&p("/C"), &p("/X")), None);
        assert_eq!(p("/A/B/C").common_prefix(&p("/A/B/D")), p("/A/B"));
        assert_eq!(p("/A").common_prefix(&p("/B")), p("/"));
    }

    #[test]
    fn test_ancestors() {
        let all: Vec<_> = p("/A/B").ancestors().collect();
        assert_eq!(all, vec![p("/A/B"), p("/A"), p("/")]);
        assert_eq!(p("/A/B").prefixes(), vec![p("/A"), p("/A/B")]);
    }

    #[test]
    fn test_subtree_is_contiguous() {
        let mut v = vec![p("/C"), p("/B/Z"), p("/Ba"), p("/B"), p("/B/A"), p("/A")];
        v.sort();
        assert_eq!(v, vec![p("/A"), p("/B"), p("/B/A"), p("/B/Z"), p("/Ba"), p("/C")]);
    }
}
