//! Dock screen edge.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Screen edge the dock is attached to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DockPosition {
    /// Along the bottom edge.
    #[default]
    Bottom,
    /// Along the left edge.
    Left,
    /// Along the right edge.
    Right,
    /// The preference holds a value we do not recognise.
    Unknown,
}

impl DockPosition {
    /// Parse the dock `orientation` preference value.
    ///
    /// The dock only writes the key once the user moves it away from the
    /// bottom edge, so an absent value means `Bottom`.
    pub fn from_orientation(value: Option<&str>) -> Self {
        let Some(v) = value else {
            return Self::Bottom;
        };
        match v.trim().to_ascii_lowercase().as_str() {
            "bottom" => Self::Bottom,
            "left" => Self::Left,
            "right" => Self::Right,
            _ => Self::Unknown,
        }
    }
}

impl Display for DockPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let s = match self {
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_orientation() {
        assert_eq!(DockPosition::from_orientation(None), DockPosition::Bottom);
        assert_eq!(DockPosition::from_orientation(Some("LEFT")), DockPosition::Left);
        assert_eq!(DockPosition::from_orientation(Some("right")), DockPosition::Right);
        assert_eq!(DockPosition::from_orientation(Some(" bottom ")), DockPosition::Bottom);
        assert_eq!(DockPosition::from_orientation(Some("top")), DockPosition::Unknown);
    }

    #[test]
    fn displays_lowercase() {
        assert_eq!(DockPosition::Left.to_string(), "left");
    }
}
