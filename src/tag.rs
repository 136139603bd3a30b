//! Tag are represented by two 2bytes unsigned integer: gggg,eeee where gggg is the group and
//! eeee is the element.
//!
//! Tags are ordered by group first, then element. This is also the order in which elements are
//! expected to appear in a data set. Names are resolved through the
//! [`dictionary`](crate::dictionary).
use crate::error::{DicomError, DicomResult};
use nom::bytes::complete::take_while_m_n;
use nom::character::complete::char;
use nom::combinator::{all_consuming, map_res};
use nom::sequence::{delimited, separated_pair};
use nom::IResult;
use std::fmt;
use std::str::FromStr;

#[derive(Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Hash)]
pub struct Tag {
    pub group: u16,
    pub element: u16,
}

impl Tag {
    pub const META_ELEMENT_GROUP_LENGTH: Tag = Tag::new(0x0002, 0x0000);
    pub const FILE_META_INFORMATION_VERSION: Tag = Tag::new(0x0002, 0x0001);
    pub const MEDIA_STORAGE_SOP_CLASS_UID: Tag = Tag::new(0x0002, 0x0002);
    pub const MEDIA_STORAGE_SOP_INSTANCE_UID: Tag = Tag::new(0x0002, 0x0003);
    pub const TRANSFER_SYNTAX_UID: Tag = Tag::new(0x0002, 0x0010);
    pub const IMPLEMENTATION_CLASS_UID: Tag = Tag::new(0x0002, 0x0012);
    pub const IMPLEMENTATION_VERSION_NAME: Tag = Tag::new(0x0002, 0x0013);
    pub const SOP_CLASS_UID: Tag = Tag::new(0x0008, 0x0016);
    pub const SOP_INSTANCE_UID: Tag = Tag::new(0x0008, 0x0018);
    pub const PIXEL_DATA: Tag = Tag::new(0x7FE0, 0x0010);

    /// Start of a sequence item, or of an encapsulated pixel data fragment.
    pub const ITEM: Tag = Tag::new(0xFFFE, 0xE000);
    /// Ends an item of undefined length.
    pub const ITEM_DELIMITATION: Tag = Tag::new(0xFFFE, 0xE00D);
    /// Ends a sequence (or encapsulated pixel data) of undefined length.
    pub const SEQUENCE_DELIMITATION: Tag = Tag::new(0xFFFE, 0xE0DD);

    pub const fn new(group: u16, element: u16) -> Tag {
        Tag { group, element }
    }

    /// Return the group for the given tag.
    pub fn get_group(&self) -> u16 {
        self.group
    }

    pub fn get_element(&self) -> u16 {
        self.element
    }

    /// Private tags live in odd groups.
    pub fn is_private(&self) -> bool {
        self.group % 2 == 1
    }

    /// File meta information lives in group 0x0002.
    pub fn is_meta(&self) -> bool {
        self.group == 0x0002
    }

    pub fn is_delimiter(&self) -> bool {
        *self == Tag::ITEM_DELIMITATION || *self == Tag::SEQUENCE_DELIMITATION
    }

    /// Keyword of the tag in the dictionary, "Unknown" if there is none.
    pub fn get_keyword(&self) -> &'static str {
        crate::dictionary::lookup_by_tag(*self)
            .map(|entry| entry.name)
            .unwrap_or("Unknown")
    }
}

impl From<(u16, u16)> for Tag {
    fn from((group, element): (u16, u16)) -> Self {
        Tag::new(group, element)
    }
}

fn hex_u16(input: &str) -> IResult<&str, u16> {
    map_res(take_while_m_n(4, 4, |c: char| c.is_ascii_hexdigit()), |s| {
        u16::from_str_radix(s, 16)
    })(input)
}

fn parse_tag_str(input: &str) -> IResult<&str, Tag> {
    let (rest, (group, element)) = all_consuming(delimited(
        char('('),
        separated_pair(hex_u16, char(','), hex_u16),
        char(')'),
    ))(input)?;
    Ok((rest, Tag::new(group, element)))
}

/// Parse the `(gggg,eeee)` notation used by the standard.
impl FromStr for Tag {
    type Err = DicomError;

    fn from_str(s: &str) -> DicomResult<Tag> {
        parse_tag_str(s.trim())
            .map(|(_, tag)| tag)
            .map_err(|_| DicomError::InvalidTagString(s.to_string()))
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.get_keyword(), self)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.group, self.element)
    }
}
