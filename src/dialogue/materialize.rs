//! # Node Materialization
//!
//! Resolves stored content into the concrete node a session shows: one line picked from
//! its variants, options copied with their follow-up nodes left unresolved until chosen.

use crate::dialogue::{ContentEntry, DialogueNode, DialogueOption, Lines, SILENT_LINE};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of the random choice among line variants.
pub trait LinePicker {
    /// Returns an index in `0..count`. Only called with `count >= 1`.
    fn pick(&mut self, count: usize) -> usize;
}

/// Uniform picker backed by a `rand` generator.
#[derive(Debug, Clone)]
pub struct RandomPicker<R = StdRng> {
    rng: R,
}

impl RandomPicker<StdRng> {
    /// Creates a picker seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Creates a reproducible picker.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomPicker<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> LinePicker for RandomPicker<R> {
    fn pick(&mut self, count: usize) -> usize {
        self.rng.gen_range(0..count.max(1))
    }
}

/// Picker that always returns the same index, clamped to the available variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedPicker {
    pub index: usize,
}

impl FixedPicker {
    pub fn new(index: usize) -> Self {
        Self { index }
    }

    /// Always picks the first variant.
    pub fn first() -> Self {
        Self::new(0)
    }
}

impl LinePicker for FixedPicker {
    fn pick(&mut self, count: usize) -> usize {
        self.index.min(count.saturating_sub(1))
    }
}

/// Where a materialized node came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A flat list of flavour lines
    Flavor,
    /// A structured node, possibly with options
    Structured,
    /// Content was missing or malformed
    Placeholder,
}

/// A node ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveNode {
    pub line: String,
    pub options: Vec<DialogueOption>,
    pub kind: NodeKind,
}

impl ActiveNode {
    /// A placeholder line with no options.
    pub fn placeholder(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            options: Vec::new(),
            kind: NodeKind::Placeholder,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.options.is_empty()
    }
}

/// Picks one concrete line, drawing once from the picker for a variant list.
pub fn choose_line(lines: &Lines, picker: &mut dyn LinePicker) -> String {
    match lines {
        Lines::One(line) => line.clone(),
        Lines::Variants(variants) => pick_variant(variants, picker),
    }
}

fn pick_variant(variants: &[String], picker: &mut dyn LinePicker) -> String {
    if variants.is_empty() {
        return SILENT_LINE.to_string();
    }
    let index = picker.pick(variants.len());
    variants
        .get(index)
        .or_else(|| variants.last())
        .cloned()
        .unwrap_or_else(|| SILENT_LINE.to_string())
}

/// Materializes a structured node. Responses of its options are not touched.
pub fn materialize_node(node: &DialogueNode, picker: &mut dyn LinePicker) -> ActiveNode {
    ActiveNode {
        line: choose_line(&node.lines, picker),
        options: node.options.clone(),
        kind: NodeKind::Structured,
    }
}

/// Materializes a store lookup result for the named speaker.
///
/// `None` (nothing found even after the fallback chain) and malformed entries both
/// produce a speaker-attributed placeholder rather than an error.
///
/// # Examples
///
/// ```
/// use wayfarer::{materialize_entry, ContentEntry, FixedPicker};
///
/// let entry = ContentEntry::Lines(vec!["a".into(), "b".into()]);
/// let node = materialize_entry(Some(&entry), "Mira", &mut FixedPicker::first());
/// assert_eq!(node.line, "a");
///
/// let missing = materialize_entry(None, "Mira", &mut FixedPicker::first());
/// assert_eq!(missing.line, "Mira: Dialogue not found.");
/// ```
pub fn materialize_entry(
    entry: Option<&ContentEntry>,
    speaker: &str,
    picker: &mut dyn LinePicker,
) -> ActiveNode {
    match entry {
        Some(ContentEntry::Lines(variants)) => ActiveNode {
            line: pick_variant(variants, picker),
            options: Vec::new(),
            kind: NodeKind::Flavor,
        },
        Some(ContentEntry::Node(node)) => materialize_node(node, picker),
        Some(ContentEntry::Malformed) => {
            ActiveNode::placeholder(format!("{}: Invalid dialogue format.", speaker))
        }
        None => ActiveNode::placeholder(format!("{}: Dialogue not found.", speaker)),
    }
}
