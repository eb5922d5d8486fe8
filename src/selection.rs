use std::fmt;

use crate::{
    error::{Result, WalkshedError},
    feature::FeatureCollection,
};

/// Maximum number of registered categories; the cache key is a 64-bit mask.
pub const MAX_CATEGORIES: usize = 64;

/// A toggleable group of transit geometries (e.g. light rail, rapid ride).
#[derive(Debug, Clone, Default)]
pub struct TransitCategory {
    code: char,
    name: String,
    stops: FeatureCollection,
    lines: FeatureCollection,
}

impl TransitCategory {
    /// `code` is a single character used in cache-key labels, e.g. `'L'`.
    pub fn new(code: char, name: impl Into<String>) -> Self {
        Self { code, name: name.into(), ..Default::default() }
    }

    pub fn with_stops(mut self, stops: FeatureCollection) -> Self {
        self.stops = stops;
        self
    }

    pub fn with_lines(mut self, lines: FeatureCollection) -> Self {
        self.lines = lines;
        self
    }

    #[inline] pub fn code(&self) -> char { self.code }

    #[inline] pub fn name(&self) -> &str { &self.name }

    #[inline] pub fn stops(&self) -> &FeatureCollection { &self.stops }

    #[inline] pub fn lines(&self) -> &FeatureCollection { &self.lines }

    /// Number of input geometries (stops + lines).
    #[inline] pub fn len(&self) -> usize { self.stops.len() + self.lines.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Identifies one (active categories, radius) combination.
///
/// Bit *i* of `mask` is set when the *i*-th registered category is active.
/// Registration order is fixed for a session, so keys are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    mask: u64,
    radius_ft: u32,
}

impl CacheKey {
    pub(crate) fn new(mask: u64, radius_ft: u32) -> Self { Self { mask, radius_ft } }

    #[inline] pub fn mask(&self) -> u64 { self.mask }

    #[inline] pub fn radius_ft(&self) -> u32 { self.radius_ft }

    /// True when no category is active.
    #[inline] pub fn is_empty_selection(&self) -> bool { self.mask == 0 }

    /// Whether the `idx`-th registered category is active.
    #[inline] pub fn is_active(&self, idx: usize) -> bool { idx < MAX_CATEGORIES && self.mask & (1 << idx) != 0 }

    /// Short label: one slot per category (its code when active) then the radius,
    /// e.g. `L--1320` for the first of two categories at a quarter mile.
    pub fn label(&self, categories: &[TransitCategory]) -> String {
        let mut label = String::new();
        for (i, category) in categories.iter().enumerate() {
            if self.is_active(i) { label.push(category.code()) }
            label.push('-');
        }
        label.push_str(&self.radius_ft.to_string());
        label
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#b}@{}ft", self.mask, self.radius_ft)
    }
}

/// The externally supplied selection state: active category codes and radius.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    active: Vec<char>,
    radius_ft: u32,
}

impl Selection {
    /// A selection with no active categories.
    pub fn new(radius_ft: u32) -> Self { Self { active: Vec::new(), radius_ft } }

    /// Activate the category with the given code.
    pub fn with(mut self, code: char) -> Self {
        if !self.active.contains(&code) { self.active.push(code) }
        self
    }

    /// Set a category's flag explicitly.
    pub fn toggle(mut self, code: char, on: bool) -> Self {
        self.active.retain(|&c| c != code);
        if on { self.active.push(code) }
        self
    }

    #[inline] pub fn radius_ft(&self) -> u32 { self.radius_ft }

    #[inline] pub fn active(&self) -> &[char] { &self.active }
}

/// Categories registered on a session, in registration order.
#[derive(Debug, Clone, Default)]
pub struct Categories {
    list: Vec<TransitCategory>,
}

impl Categories {
    /// Register a category. Codes must be unique.
    pub fn register(&mut self, category: TransitCategory) -> Result<()> {
        if self.list.len() >= MAX_CATEGORIES {
            return Err(WalkshedError::TooManyCategories { max: MAX_CATEGORIES });
        }
        if self.list.iter().any(|c| c.code() == category.code()) {
            return Err(WalkshedError::DuplicateCategory(category.code()));
        }
        self.list.push(category);
        Ok(())
    }

    #[inline] pub fn as_slice(&self) -> &[TransitCategory] { &self.list }

    /// Position of the category with the given code.
    pub fn position(&self, code: char) -> Option<usize> {
        self.list.iter().position(|c| c.code() == code)
    }

    /// Turn a selection into its cache key.
    pub fn key(&self, selection: &Selection) -> Result<CacheKey> {
        let mask = selection.active().iter().try_fold(0u64, |mask, &code| {
            let i = self.position(code).ok_or_else(|| WalkshedError::UnknownCategory(code.to_string()))?;
            Ok::<_, WalkshedError>(mask | 1 << i)
        })?;
        Ok(CacheKey::new(mask, selection.radius_ft()))
    }

    /// The categories active under `key`, in registration order.
    pub fn active(&self, key: CacheKey) -> impl Iterator<Item = &TransitCategory> + '_ {
        self.list.iter().enumerate()
            .filter(move |(i, _)| key.is_active(*i))
            .map(|(_, category)| category)
    }
}
