use thiserror::Error;

/// An ordinal that does not name any gesture symbol.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no gesture symbol with ordinal {0}")]
pub struct UnknownSymbol(pub usize);

/// The closed universe of recognizable hand poses.
///
/// Ordinals are stable and used as document keys; never reorder variants.
/// The last member is the protected symbol reserved for the cancel binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureSymbol {
    OpenPalm,
    ClosedFist,
    ThumbsUp,
    Pointing,
    Pinch,
    Peace,
    CallMe,
    ThreeFingers,
    PointRight,
    PointLeft,
    PointUp,
    PointDown,
    PalmDown,
    Ok,
    Horns,
}

impl GestureSymbol {
    /// All symbols in ordinal order.
    pub const ALL: [GestureSymbol; 15] = [
        GestureSymbol::OpenPalm,
        GestureSymbol::ClosedFist,
        GestureSymbol::ThumbsUp,
        GestureSymbol::Pointing,
        GestureSymbol::Pinch,
        GestureSymbol::Peace,
        GestureSymbol::CallMe,
        GestureSymbol::ThreeFingers,
        GestureSymbol::PointRight,
        GestureSymbol::PointLeft,
        GestureSymbol::PointUp,
        GestureSymbol::PointDown,
        GestureSymbol::PalmDown,
        GestureSymbol::Ok,
        GestureSymbol::Horns,
    ];

    /// The reserved symbol that always carries the cancel command.
    pub const PROTECTED: GestureSymbol = GestureSymbol::Horns;

    /// Stable 0-based ordinal of this symbol.
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Resolve an ordinal back to its symbol.
    ///
    /// # Errors
    /// Returns [`UnknownSymbol`] when the ordinal is outside the enumeration.
    pub fn from_ordinal(ordinal: usize) -> Result<Self, UnknownSymbol> {
        Self::ALL.get(ordinal).copied().ok_or(UnknownSymbol(ordinal))
    }

    /// Canonical human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            GestureSymbol::OpenPalm => "Open Palm",
            GestureSymbol::ClosedFist => "Closed Fist",
            GestureSymbol::ThumbsUp => "Thumbs Up",
            GestureSymbol::Pointing => "Pointing",
            GestureSymbol::Pinch => "Pinch",
            GestureSymbol::Peace => "Peace",
            GestureSymbol::CallMe => "Call Me",
            GestureSymbol::ThreeFingers => "Three Fingers",
            GestureSymbol::PointRight => "Point Right",
            GestureSymbol::PointLeft => "Point Left",
            GestureSymbol::PointUp => "Point Up",
            GestureSymbol::PointDown => "Point Down",
            GestureSymbol::PalmDown => "Palm Down",
            GestureSymbol::Ok => "Ok",
            GestureSymbol::Horns => "Horns",
        }
    }

    pub fn is_protected(self) -> bool {
        self == Self::PROTECTED
    }
}

impl std::fmt::Display for GestureSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
