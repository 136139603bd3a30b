//! Dictionary of the known data elements.
//!
//! The table is generated at build time from `tags/tags.csv` (see `build.rs`) and indexed once,
//! on first use. Lookups never mutate it, so it can be shared by parsers running on different
//! threads.
use crate::error::{DicomError, DicomResult};
use crate::tag::Tag;
use crate::ValueRepresentation;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// How an entry of the dictionary matches tags.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TagRange {
    Single,
    /// Repeating group of the form (ggxx,eeee), e.g. overlays (60xx,3000).
    Group100,
    /// Repeating element of the form (gggg,eexx).
    Element100,
    /// Any (gggg,0000).
    GroupLength,
    /// Any (gggg,00xx) with an odd group.
    PrivateCreator,
}

/// Number of values an element may hold: between `min` and `max` (unbounded if `None`), in
/// steps of `step` when unbounded.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct ValueMultiplicity {
    pub min: u32,
    pub max: Option<u32>,
    pub step: u32,
}

impl ValueMultiplicity {
    pub fn accepts(&self, count: usize) -> bool {
        let count = count as u32;
        match self.max {
            Some(max) => count >= self.min && count <= max,
            None => count >= self.min && count % self.step.max(1) == 0,
        }
    }
}

impl fmt::Display for ValueMultiplicity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{}", self.min),
            Some(max) => write!(f, "{}-{}", self.min, max),
            None if self.step > 1 => write!(f, "{}-{}n", self.min, self.step),
            None => write!(f, "{}-n", self.min),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DictEntry {
    /// For repeating entries, the varying part is zero.
    pub tag: Tag,
    pub range: TagRange,
    pub name: &'static str,
    /// VR code as written in the standard. `OX` stands for OB or OW, `XS` for US or SS and `XO`
    /// for US, SS or OW: the actual VR depends on the context of the data set.
    pub vr: &'static str,
    pub vm: ValueMultiplicity,
    pub retired: bool,
}

impl DictEntry {
    /// VR to use when it is not in the stream.
    pub fn implicit_vr(&self) -> ValueRepresentation {
        match self.vr {
            "OX" | "XO" => ValueRepresentation::OW,
            "XS" => ValueRepresentation::US,
            code => ValueRepresentation::from_code(code).unwrap_or(ValueRepresentation::UN),
        }
    }
}

include!(concat!(env!("OUT_DIR"), "/entries.rs"));

static GROUP_LENGTH_ENTRY: DictEntry = DictEntry {
    tag: Tag::new(0x0000, 0x0000),
    range: TagRange::GroupLength,
    name: "GenericGroupLength",
    vr: "UL",
    vm: ValueMultiplicity {
        min: 1,
        max: Some(1),
        step: 1,
    },
    retired: false,
};

static PRIVATE_CREATOR_ENTRY: DictEntry = DictEntry {
    tag: Tag::new(0x0001, 0x0010),
    range: TagRange::PrivateCreator,
    name: "PrivateCreator",
    vr: "LO",
    vm: ValueMultiplicity {
        min: 1,
        max: Some(1),
        step: 1,
    },
    retired: false,
};

static DICT: Lazy<Registry> = Lazy::new(|| Registry::new(ENTRIES));

struct Registry {
    by_tag: HashMap<Tag, &'static DictEntry>,
    by_name: HashMap<&'static str, &'static DictEntry>,
    /// repeating elements of the form (ggxx, eeee). The `xx` portion is zeroed.
    repeating_ggxx: HashSet<Tag>,
    /// repeating elements of the form (gggg, eexx). The `xx` portion is zeroed.
    repeating_eexx: HashSet<Tag>,
}

impl Registry {
    fn new(entries: &'static [DictEntry]) -> Registry {
        let mut registry = Registry {
            by_tag: HashMap::with_capacity(entries.len()),
            by_name: HashMap::with_capacity(entries.len()),
            repeating_ggxx: HashSet::new(),
            repeating_eexx: HashSet::new(),
        };
        for entry in entries {
            registry.by_tag.insert(entry.tag, entry);
            registry.by_name.insert(entry.name, entry);
            match entry.range {
                TagRange::Group100 => {
                    registry.repeating_ggxx.insert(entry.tag);
                }
                TagRange::Element100 => {
                    registry.repeating_eexx.insert(entry.tag);
                }
                _ => {}
            }
        }
        registry
    }

    fn by_tag(&self, tag: Tag) -> Option<&'static DictEntry> {
        if let Some(entry) = self.by_tag.get(&tag) {
            return Some(entry);
        }

        // Repeating groups only use even groups, odd ones are private.
        if !tag.is_private() {
            let group_masked = Tag::new(tag.group & 0xFF00, tag.element);
            if self.repeating_ggxx.contains(&group_masked) {
                return self.by_tag.get(&group_masked).copied();
            }
        }

        let element_masked = Tag::new(tag.group, tag.element & 0xFF00);
        if self.repeating_eexx.contains(&element_masked) {
            return self.by_tag.get(&element_masked).copied();
        }

        if tag.element == 0x0000 {
            return Some(&GROUP_LENGTH_ENTRY);
        }

        if tag.is_private() && tag.element >= 0x0010 && tag.element <= 0x00FF {
            return Some(&PRIVATE_CREATOR_ENTRY);
        }

        None
    }
}

/// Find the dictionary entry of a tag.
pub fn lookup_by_tag(tag: Tag) -> DicomResult<&'static DictEntry> {
    DICT.by_tag(tag).ok_or(DicomError::UnknownTag(tag))
}

/// Find a dictionary entry from its keyword, e.g. "TransferSyntaxUID".
pub fn lookup_by_name(name: &str) -> DicomResult<&'static DictEntry> {
    DICT.by_name
        .get(name)
        .copied()
        .ok_or_else(|| DicomError::UnknownName(name.to_string()))
}

/// All the entries of the table, in table order.
pub fn entries() -> &'static [DictEntry] {
    ENTRIES
}
