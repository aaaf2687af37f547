//! # Dialogue Content
//!
//! The read-only store of dialogue entries, decoded once from the content file.
//!
//! The content file is a JSON object. Each key maps either to a flat list of line
//! variants or to a structured node:
//!
//! ```json
//! {
//!     "shopkeeper": {
//!         "dialogue": ["Welcome!", "Back again?"],
//!         "options": [
//!             { "option": "Buy", "effect": "open_store" },
//!             { "option": "Chat", "response": { "dialogue": "Lovely weather.", "options": [] } }
//!         ]
//!     },
//!     "beggar": ["Spare a coin?", "Bless you."],
//!     "default": ["..."],
//!     "generic": { "no_interaction": ["They ignore you."] }
//! }
//! ```
//!
//! Shapes are sniffed exactly once here. Anything that is neither a non-empty list of
//! strings nor a well-formed node becomes [`ContentEntry::Malformed`], which later shows
//! up in game as a placeholder line instead of failing the load.

use crate::{WayfarerError, WayfarerResult};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Reserved key holding the two-level flavour text mapping.
pub const GENERIC_KEY: &str = "generic";

/// Reserved key used when an agent's own key cannot be resolved.
pub const DEFAULT_KEY: &str = "default";

/// Generic sub-key tried first when a key cannot be resolved.
pub const NO_INTERACTION_KEY: &str = "no_interaction";

/// Line shown for a structured node that has no `dialogue` field.
pub const SILENT_LINE: &str = "...";

/// The text of a node: a single line or a list of variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Lines {
    One(String),
    Variants(Vec<String>),
}

impl Lines {
    /// True for a variant list with nothing in it.
    pub fn is_empty(&self) -> bool {
        matches!(self, Lines::Variants(variants) if variants.is_empty())
    }
}

impl Default for Lines {
    fn default() -> Self {
        Lines::One(SILENT_LINE.to_string())
    }
}

/// One conversational turn as stored in the content file.
///
/// Only decodes from a JSON object; serde would otherwise accept a positional array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct DialogueNode {
    #[serde(rename = "dialogue")]
    pub lines: Lines,
    pub options: Vec<DialogueOption>,
}

#[derive(Deserialize)]
struct NodeFields {
    #[serde(rename = "dialogue", default)]
    lines: Lines,
    #[serde(default)]
    options: Vec<DialogueOption>,
}

impl TryFrom<Map<String, Value>> for DialogueNode {
    type Error = serde_json::Error;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let fields: NodeFields = serde_json::from_value(Value::Object(map))?;
        Ok(Self {
            lines: fields.lines,
            options: fields.options,
        })
    }
}

impl DialogueNode {
    /// Creates a node with the given lines and no options.
    pub fn new(lines: Lines) -> Self {
        Self {
            lines,
            options: Vec::new(),
        }
    }

    /// Creates a terminal node with a single line.
    pub fn line(text: impl Into<String>) -> Self {
        Self::new(Lines::One(text.into()))
    }

    /// Creates a terminal node with several line variants.
    pub fn variants<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Lines::Variants(variants.into_iter().map(Into::into).collect()))
    }

    /// Appends an option.
    pub fn with_option(mut self, option: DialogueOption) -> Self {
        self.options.push(option);
        self
    }

    /// A node with no options closes the conversation when confirmed.
    pub fn is_terminal(&self) -> bool {
        self.options.is_empty()
    }

    /// Checks that every line list in this node and all nested responses is non-empty.
    pub fn is_well_formed(&self) -> bool {
        !self.lines.is_empty()
            && self.options.iter().all(|option| {
                option
                    .response
                    .as_deref()
                    .map_or(true, DialogueNode::is_well_formed)
            })
    }

    /// Depth of the deepest response chain, counting this node as 1.
    pub fn depth(&self) -> usize {
        1 + self
            .options
            .iter()
            .filter_map(|option| option.response.as_deref())
            .map(DialogueNode::depth)
            .max()
            .unwrap_or(0)
    }
}

/// One player-facing choice. Like nodes, options only decode from objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct DialogueOption {
    #[serde(rename = "option")]
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Box<DialogueNode>>,
}

#[derive(Deserialize)]
struct OptionFields {
    #[serde(rename = "option")]
    text: String,
    #[serde(default)]
    effect: Option<String>,
    #[serde(default)]
    response: Option<Box<DialogueNode>>,
}

impl TryFrom<Map<String, Value>> for DialogueOption {
    type Error = serde_json::Error;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        let fields: OptionFields = serde_json::from_value(Value::Object(map))?;
        Ok(Self {
            text: fields.text,
            effect: fields.effect,
            response: fields.response,
        })
    }
}

impl DialogueOption {
    /// Creates an option that simply closes the conversation.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            effect: None,
            response: None,
        }
    }

    /// Tags the option with an effect for game logic to act on.
    pub fn with_effect(mut self, effect: impl Into<String>) -> Self {
        self.effect = Some(effect.into());
        self
    }

    /// Makes the option lead to a follow-up node.
    pub fn with_response(mut self, response: DialogueNode) -> Self {
        self.response = Some(Box::new(response));
        self
    }
}

/// A decoded entry of the content store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentEntry {
    /// Flat list of flavour lines, one picked at random
    Lines(Vec<String>),
    /// Structured node with options
    Node(DialogueNode),
    /// The entry had a shape we do not understand
    Malformed,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEntry {
    Lines(Vec<String>),
    Node(DialogueNode),
}

impl ContentEntry {
    /// Decodes one raw JSON value into an entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use wayfarer::ContentEntry;
    /// use serde_json::json;
    ///
    /// assert!(matches!(ContentEntry::decode(json!(["a", "b"])), ContentEntry::Lines(_)));
    /// assert!(matches!(ContentEntry::decode(json!({"dialogue": "hi"})), ContentEntry::Node(_)));
    /// assert_eq!(ContentEntry::decode(json!(42)), ContentEntry::Malformed);
    /// ```
    pub fn decode(value: Value) -> Self {
        match serde_json::from_value::<RawEntry>(value) {
            Ok(RawEntry::Lines(lines)) if !lines.is_empty() => ContentEntry::Lines(lines),
            Ok(RawEntry::Node(node)) if node.is_well_formed() => ContentEntry::Node(node),
            _ => ContentEntry::Malformed,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, ContentEntry::Malformed)
    }
}

/// Address of an entry in the content store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DialogueKey {
    /// Top-level key, `store[key]`
    Entry(String),
    /// Flavour text, `store["generic"][key]`
    Generic(String),
}

impl DialogueKey {
    pub fn entry(key: impl Into<String>) -> Self {
        DialogueKey::Entry(key.into())
    }

    pub fn generic(key: impl Into<String>) -> Self {
        DialogueKey::Generic(key.into())
    }

    /// Parses a dotted path: `"generic.greeting"` addresses the generic mapping,
    /// anything else is a top-level key.
    pub fn from_path(path: &str) -> Self {
        match path.strip_prefix("generic.") {
            Some(subkey) => DialogueKey::generic(subkey),
            None => DialogueKey::entry(path),
        }
    }

    /// The same key looked up in the generic mapping.
    pub fn to_generic(&self) -> Self {
        match self {
            DialogueKey::Entry(key) | DialogueKey::Generic(key) => DialogueKey::generic(key.clone()),
        }
    }
}

impl fmt::Display for DialogueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialogueKey::Entry(key) => write!(f, "{}", key),
            DialogueKey::Generic(key) => write!(f, "{}.{}", GENERIC_KEY, key),
        }
    }
}

/// Immutable index of all dialogue content.
#[derive(Debug, Clone, Default)]
pub struct ContentStore {
    entries: HashMap<String, ContentEntry>,
    generic: HashMap<String, ContentEntry>,
}

impl ContentStore {
    /// Loads the store from a JSON file.
    ///
    /// A missing or unparsable file is an error; the game cannot start without content.
    pub fn load(path: impl AsRef<Path>) -> WayfarerResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| WayfarerError::ContentLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_json_str(&text)?;

        info!(
            "Loaded {} dialogue entries and {} generic entries from {}",
            store.entries.len(),
            store.generic.len(),
            path.display()
        );
        Ok(store)
    }

    /// Parses the store from JSON text.
    pub fn from_json_str(json: &str) -> WayfarerResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Builds the store from an already parsed JSON value.
    pub fn from_value(value: Value) -> WayfarerResult<Self> {
        let Value::Object(map) = value else {
            return Err(WayfarerError::InvalidContent(
                "top level must be an object of dialogue entries".to_string(),
            ));
        };

        let mut store = Self::default();
        for (key, value) in map {
            if key == GENERIC_KEY {
                let Value::Object(generic) = value else {
                    return Err(WayfarerError::InvalidContent(format!(
                        "\"{}\" must be an object of flavour entries",
                        GENERIC_KEY
                    )));
                };
                for (subkey, value) in generic {
                    let entry = decode_entry(&format!("{}.{}", GENERIC_KEY, subkey), value);
                    store.generic.insert(subkey, entry);
                }
            } else {
                let entry = decode_entry(&key, value);
                store.entries.insert(key, entry);
            }
        }

        if !store.has_default() {
            warn!(
                "Dialogue content has no \"{}\" entry; unresolved keys fall back to placeholders",
                DEFAULT_KEY
            );
        }
        Ok(store)
    }

    /// Single-key lookup, `store[key]`.
    pub fn lookup(&self, key: &str) -> Option<&ContentEntry> {
        self.entries.get(key)
    }

    /// Two-level lookup, `store["generic"][subkey]`.
    pub fn lookup_generic(&self, subkey: &str) -> Option<&ContentEntry> {
        self.generic.get(subkey)
    }

    /// Looks up a key directly.
    pub fn get(&self, key: &DialogueKey) -> Option<&ContentEntry> {
        match key {
            DialogueKey::Entry(key) => self.lookup(key),
            DialogueKey::Generic(subkey) => self.lookup_generic(subkey),
        }
    }

    /// Looks up a key, walking the fallback chain when it is absent:
    /// `generic.no_interaction`, then `default`. `None` means the caller shows its
    /// hardcoded placeholder.
    pub fn resolve(&self, key: &DialogueKey) -> Option<&ContentEntry> {
        self.get(key).or_else(|| self.fallback())
    }

    /// The entry used for keys that cannot be resolved.
    pub fn fallback(&self) -> Option<&ContentEntry> {
        self.lookup_generic(NO_INTERACTION_KEY)
            .or_else(|| self.lookup(DEFAULT_KEY))
    }

    pub fn has_default(&self) -> bool {
        self.entries.contains_key(DEFAULT_KEY)
    }

    /// Number of top-level entries, not counting the generic mapping.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.generic.is_empty()
    }
}

fn decode_entry(key: &str, value: Value) -> ContentEntry {
    let entry = ContentEntry::decode(value);
    if entry.is_malformed() {
        warn!("Dialogue entry \"{}\" has an unrecognised shape", key);
    }
    entry
}
