use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

string_id!(
    /// Identifier of a node in the root genome.
    NodeId
);
string_id!(
    /// Identifier of a link in the root genome.
    LinkId
);
string_id!(
    /// Identifier of an instance in the model hierarchy.
    InstanceId
);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    #[default]
    Gene,
    Box,
    Bubble,
    Diamond,
    Intercell,
    Slash,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Gene => "gene",
            Self::Box => "box",
            Self::Bubble => "bubble",
            Self::Diamond => "diamond",
            Self::Intercell => "intercell",
            Self::Slash => "slash",
        };
        write!(f, "{s}")
    }
}

impl FromStr for NodeType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s.trim(), true)
            .map_err(|_| ModelError::InvalidNodeType(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LinkSign {
    #[default]
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Rect {
    #[must_use]
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Whether `point` lies inside the rectangle grown by `tolerance` on every side.
    #[must_use]
    pub fn contains(&self, point: Point, tolerance: f64) -> bool {
        point.x >= self.min_x - tolerance
            && point.x <= self.max_x + tolerance
            && point.y >= self.min_y - tolerance
            && point.y <= self.max_y + tolerance
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

/// An sRGB color, written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ModelError::InvalidColor(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };
        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

impl TryFrom<String> for Rgb {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_type_parses_case_insensitively() {
        assert_eq!("Bubble".parse::<NodeType>().ok(), Some(NodeType::Bubble));
        assert_eq!(" gene ".parse::<NodeType>().ok(), Some(NodeType::Gene));
    }

    #[test]
    fn node_type_rejects_unknown_names() {
        let err = "hexagon".parse::<NodeType>().expect_err("should fail");
        assert!(err.to_string().contains("hexagon"));
    }

    #[test]
    fn rgb_display_is_lowercase_hex() {
        assert_eq!(Rgb::new(255, 0, 171).to_string(), "#ff00ab");
    }

    #[test]
    fn rgb_parses_hex_with_hash() -> anyhow::Result<()> {
        let color: Rgb = "#10A0fF".parse()?;
        assert_eq!(color, Rgb::new(0x10, 0xa0, 0xff));
        Ok(())
    }

    #[test]
    fn rgb_rejects_malformed_input() {
        assert!("10a0ff".parse::<Rgb>().is_err());
        assert!("#10a0f".parse::<Rgb>().is_err());
        assert!("#zzzzzz".parse::<Rgb>().is_err());
    }

    #[test]
    fn rect_contains_respects_tolerance() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(Point::new(5.0, 5.0), 0.0));
        assert!(!rect.contains(Point::new(11.0, 5.0), 0.0));
        assert!(rect.contains(Point::new(11.0, 5.0), 1.5));
    }

    #[test]
    fn rect_center_is_midpoint() {
        let rect = Rect::new(0.0, 10.0, 20.0, 30.0);
        assert_eq!(rect.center(), Point::new(10.0, 20.0));
    }
}
