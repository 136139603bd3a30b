//! Value representation defines what type is the data in the data element.
//! VR defined in the DICOM standard are created from the macro `vr!`.

use std::fmt;

/// How the bytes of a value are laid out for a given VR.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum VrKind {
    /// Text that may hold several values separated by a backslash.
    Text,
    /// Text holding a single value, where a backslash is just another character.
    SingleText,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
    /// Attribute tags, encoded as pairs of u16.
    Tag,
    /// Bytes passed through as they are.
    Bytes,
    Sequence,
}

impl VrKind {
    /// Width of one value for fixed-width kinds.
    pub fn width(&self) -> Option<usize> {
        match self {
            VrKind::U16 | VrKind::I16 => Some(2),
            VrKind::U32 | VrKind::I32 | VrKind::F32 | VrKind::Tag => Some(4),
            VrKind::U64 | VrKind::I64 | VrKind::F64 => Some(8),
            _ => None,
        }
    }
}

macro_rules! vr {
    ( $(( $name:ident, $repr:expr, $desc:expr, $kind:expr, $special_length:expr)),+) => {

        #[allow(non_camel_case_types)]
        #[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
        pub enum ValueRepresentation {
            $($name,)+
        }


        impl ValueRepresentation {

            /// Value representation from its two letters code.
            pub fn from_code(code: &str) -> Option<Self> {
                match code {
                    $(
                        $repr => Some(ValueRepresentation::$name),
                    )+
                    _ => None,
                }
            }

            /// Value representation as found in the stream, two ascii bytes.
            pub fn from_bytes(bytes: [u8; 2]) -> Option<Self> {
                std::str::from_utf8(&bytes).ok().and_then(Self::from_code)
            }

            pub fn code(&self) -> &'static str {
                match self {
                    $(ValueRepresentation::$name => $repr,)+
                }
            }

            pub fn description(&self) -> &'static str {
                match self {
                    $(ValueRepresentation::$name => $desc,)+
                }
            }

            pub fn kind(&self) -> VrKind {
                match self {
                    $(ValueRepresentation::$name => $kind,)+
                }
            }

            /// With explicit VR, these are followed by 2 reserved bytes and a 4 bytes length
            /// instead of a 2 bytes length.
            pub fn has_special_length(&self) -> bool {
                match self {
                    $(
                        ValueRepresentation::$name => {
                            $special_length
                        }
                    )+
                }
            }
        }

        impl fmt::Display for ValueRepresentation {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", self.code())
            }
        }
    }

}

vr! {
    (AE, "AE", "Application Entity", VrKind::Text, false),
    (AS, "AS", "Age String", VrKind::Text, false),
    (AT, "AT", "Attribute Tag", VrKind::Tag, false),
    (CS, "CS", "Code String", VrKind::Text, false),
    (DA, "DA", "Date", VrKind::Text, false),
    (DS, "DS", "Decimal String", VrKind::Text, false),
    (DT, "DT", "Date Time", VrKind::Text, false),
    (FL, "FL", "Floating Point Single", VrKind::F32, false),
    (FD, "FD", "Floating Point Double", VrKind::F64, false),
    (IS, "IS", "Integer String", VrKind::Text, false),
    (LO, "LO", "Long String", VrKind::Text, false),
    (LT, "LT", "Long Text", VrKind::SingleText, false),
    (PN, "PN", "Person Name", VrKind::Text, false),
    (SH, "SH", "Short String", VrKind::Text, false),
    (SL, "SL", "Signed Long", VrKind::I32, false),
    (SS, "SS", "Signed Short", VrKind::I16, false),
    (ST, "ST", "Short Text", VrKind::SingleText, false),
    (TM, "TM", "Time", VrKind::Text, false),
    (UI, "UI", "Unique Identifier", VrKind::Text, false),
    (UL, "UL", "Unsigned Long", VrKind::U32, false),
    (US, "US", "Unsigned Short", VrKind::U16, false),

    // Special length parsing
    (OB, "OB", "Other byte", VrKind::Bytes, true),
    (OD, "OD", "Other double", VrKind::Bytes, true),
    (OF, "OF", "Other float", VrKind::Bytes, true),
    (OL, "OL", "Other long", VrKind::Bytes, true),
    (OV, "OV", "Other 64-bits very long", VrKind::Bytes, true),
    (OW, "OW", "Other word", VrKind::Bytes, true),
    (SQ, "SQ", "Sequence of items", VrKind::Sequence, true),
    (SV, "SV", "Signed 64-bits very long", VrKind::I64, true),
    (UC, "UC", "Unlimited characters", VrKind::Text, true),
    (UR, "UR", "URI or URL", VrKind::SingleText, true),
    (UT, "UT", "Unlimited text", VrKind::SingleText, true),
    (UN, "UN", "Unknown", VrKind::Bytes, true),
    (UV, "UV", "Unsigned 64-bits very long", VrKind::U64, true)
}

impl ValueRepresentation {
    /// Only sequences and the binary VRs that can carry encapsulated pixel data may have an
    /// undefined length. UN is allowed because it may hide a sequence of an unknown tag.
    pub fn allows_undefined_length(&self) -> bool {
        matches!(
            self,
            ValueRepresentation::SQ
                | ValueRepresentation::OB
                | ValueRepresentation::OW
                | ValueRepresentation::UN
        )
    }

    /// Byte used to pad text values to an even length.
    pub fn padding(&self) -> u8 {
        match self.kind() {
            VrKind::Text | VrKind::SingleText if *self != ValueRepresentation::UI => b' ',
            _ => 0,
        }
    }
}
