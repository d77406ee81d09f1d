//! Locators addressing nested data sources, and normalized locator sets.
//!
//! A [`DataSourceLocator`] is a sequence of container keys, written dotted
//! (`primvars.points.primvarValue`). The empty locator addresses the whole
//! prim container. A [`DataSourceLocatorSet`] is the structured form of
//! "what changed" carried by dirty notices.

use smallvec::SmallVec;
use std::fmt;

use crate::util::Token;

/// A path of container keys.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DataSourceLocator {
    elements: SmallVec<[Token; 4]>,
}

impl DataSourceLocator {
    /// Build a locator from element names.
    pub fn new<I, T>(elements: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        Self {
            elements: elements.into_iter().map(Into::into).collect(),
        }
    }

    /// The empty locator.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a dotted locator.
    ///
    /// A trailing dot yields an empty final element, so
    /// `"materialBindings."` addresses the all-purpose binding.
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self::empty();
        }
        Self::new(text.split('.'))
    }

    #[inline]
    pub fn elements(&self) -> &[Token] {
        &self.elements
    }

    #[inline]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn first_element(&self) -> Option<&Token> {
        self.elements.first()
    }

    pub fn last_element(&self) -> Option<&Token> {
        self.elements.last()
    }

    /// Locator with one more trailing element.
    pub fn append(&self, name: impl Into<Token>) -> Self {
        let mut elements = self.elements.clone();
        elements.push(name.into());
        Self { elements }
    }

    /// Locator with `other`'s elements appended.
    pub fn append_locator(&self, other: &DataSourceLocator) -> Self {
        let mut elements = self.elements.clone();
        elements.extend(other.elements.iter().cloned());
        Self { elements }
    }

    /// Locator with one more leading element.
    pub fn prepend(&self, name: impl Into<Token>) -> Self {
        let mut elements: SmallVec<[Token; 4]> = SmallVec::with_capacity(self.elements.len() + 1);
        elements.push(name.into());
        elements.extend(self.elements.iter().cloned());
        Self { elements }
    }

    /// Locator without its last element.
    pub fn remove_last(&self) -> Self {
        let mut elements = self.elements.clone();
        elements.pop();
        Self { elements }
    }

    /// Locator without its first element.
    pub fn remove_first(&self) -> Self {
        Self {
            elements: self.elements.iter().skip(1).cloned().collect(),
        }
    }

    /// Check if `prefix` equals or is an ancestor of this locator.
    pub fn has_prefix(&self, prefix: &DataSourceLocator) -> bool {
        self.elements.len() >= prefix.elements.len()
            && self.elements[..prefix.elements.len()] == prefix.elements[..]
    }

    /// True when one locator is a prefix of the other.
    pub fn intersects(&self, other: &DataSourceLocator) -> bool {
        let n = self.elements.len().min(other.elements.len());
        self.elements[..n] == other.elements[..n]
    }

    /// Replace a leading `old` prefix with `new`; unchanged when `old` is
    /// not a prefix.
    pub fn replace_prefix(&self, old: &DataSourceLocator, new: &DataSourceLocator) -> Self {
        if !self.has_prefix(old) {
            return self.clone();
        }
        let mut elements = new.elements.clone();
        elements.extend(self.elements[old.elements.len()..].iter().cloned());
        Self { elements }
    }

    /// Longest shared prefix.
    pub fn common_prefix(&self, other: &DataSourceLocator) -> Self {
        Self {
            elements: self
                .elements
                .iter()
                .zip(other.elements.iter())
                .take_while(|(a, b)| a == b)
                .map(|(a, _)| a.clone())
                .collect(),
        }
    }
}

impl From<&str> for DataSourceLocator {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl fmt::Display for DataSourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.elements.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}

impl fmt::Debug for DataSourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Locator({})", self)
    }
}

/// A normalized set of locators.
///
/// No member is a prefix of another: inserting a locator absorbs any
/// existing descendants, and inserting a descendant of an existing member
/// is a no-op. Members are kept sorted.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct DataSourceLocatorSet {
    locators: Vec<DataSourceLocator>,
}

impl DataSourceLocatorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The set containing the empty locator, which intersects everything.
    pub fn universal() -> Self {
        Self {
            locators: vec![DataSourceLocator::empty()],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }

    /// Check if this set contains the empty locator.
    pub fn is_universal(&self) -> bool {
        self.locators.first().is_some_and(DataSourceLocator::is_empty)
    }

    pub fn len(&self) -> usize {
        self.locators.len()
    }

    /// Insert a locator, keeping the set normalized.
    pub fn insert(&mut self, locator: DataSourceLocator) {
        if self.contains(&locator) {
            return;
        }
        self.locators.retain(|existing| !existing.has_prefix(&locator));
        let pos = self.locators.partition_point(|existing| existing < &locator);
        self.locators.insert(pos, locator);
    }

    /// Insert every member of `other`.
    pub fn insert_set(&mut self, other: &DataSourceLocatorSet) {
        for locator in &other.locators {
            self.insert(locator.clone());
        }
    }

    /// True when some member equals or is a prefix of `locator`.
    pub fn contains(&self, locator: &DataSourceLocator) -> bool {
        self.locators.iter().any(|member| locator.has_prefix(member))
    }

    /// True when some member intersects `locator`.
    pub fn intersects(&self, locator: &DataSourceLocator) -> bool {
        self.locators.iter().any(|member| member.intersects(locator))
    }

    /// True when any pair of members intersects.
    pub fn intersects_set(&self, other: &DataSourceLocatorSet) -> bool {
        other.locators.iter().any(|locator| self.intersects(locator))
    }

    /// Members with `old` replaced by `new` where it is a prefix.
    pub fn replace_prefix(&self, old: &DataSourceLocator, new: &DataSourceLocator) -> Self {
        self.iter().map(|l| l.replace_prefix(old, new)).collect()
    }

    /// Iterate members in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &DataSourceLocator> {
        self.locators.iter()
    }
}

impl FromIterator<DataSourceLocator> for DataSourceLocatorSet {
    fn from_iter<I: IntoIterator<Item = DataSourceLocator>>(iter: I) -> Self {
        let mut set = Self::new();
        for locator in iter {
            set.insert(locator);
        }
        set
    }
}

impl From<DataSourceLocator> for DataSourceLocatorSet {
    fn from(locator: DataSourceLocator) -> Self {
        Self {
            locators: vec![locator],
        }
    }
}

impl<'a> IntoIterator for &'a DataSourceLocatorSet {
    type Item = &'a DataSourceLocator;
    type IntoIter = std::slice::Iter<'a, DataSourceLocator>;

    fn into_iter(self) -> Self::IntoIter {
        self.locators.iter()
    }
}

impl fmt::Debug for DataSourceLocatorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.locators.iter().map(|l| l.to_string())).finish()
    }
}
