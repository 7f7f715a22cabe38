//! Geometry parsing and canonical forms.
//!
//! A geometry string is one of `"W"`, `"WxH"` or `"xH"`. Parsing is action
//! aware: `thumbnail` keeps a missing dimension absent so the renderer can
//! derive it from the source aspect ratio, every other action turns a bare
//! width into a square box.

use crate::{Error, Result};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Action whose geometry keeps missing dimensions absent.
pub const THUMBNAIL: &str = "thumbnail";

static WIDTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)(?:x\d+)?$").expect("static regex"));
static HEIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d+)?x(\d+)$").expect("static regex"));

/// A target size with optional width and height.
///
/// At least one dimension is always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Geometry {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Geometry {
    /// Build a geometry from explicit dimensions.
    pub fn new(width: Option<u32>, height: Option<u32>) -> Result<Self> {
        match (width, height) {
            (None, None) => Err(Error::InvalidGeometry(
                "at least one dimension is required".into(),
            )),
            (Some(0), _) | (_, Some(0)) => {
                Err(Error::InvalidGeometry("dimensions must be positive".into()))
            }
            _ => Ok(Self { width, height }),
        }
    }

    /// Parse a raw geometry string for the given action.
    pub fn parse(action: &str, raw: &str) -> Result<Self> {
        let width = capture(&WIDTH, raw)?;
        let height = capture(&HEIGHT, raw)?;

        if width.is_none() && height.is_none() {
            return Err(Error::InvalidGeometry(raw.to_string()));
        }

        let height = match (action, width, height) {
            (THUMBNAIL, _, h) => h,
            (_, Some(w), None) => Some(w),
            (_, _, h) => h,
        };

        Self::new(width, height).map_err(|_| Error::InvalidGeometry(raw.to_string()))
    }

    /// Build the geometry string for loose numeric inputs.
    ///
    /// A width alone yields `"W"`; anything else yields `"WxH"` with missing
    /// parts left empty, which may not parse.
    pub fn from_dimensions(width: Option<u32>, height: Option<u32>) -> String {
        match (width, height) {
            (Some(w), None) => w.to_string(),
            (w, h) => format!(
                "{}x{}",
                w.map(|v| v.to_string()).unwrap_or_default(),
                h.map(|v| v.to_string()).unwrap_or_default()
            ),
        }
    }

    /// Canonical string form used in keys and render URLs.
    pub fn canonical(&self) -> String {
        canonicalize(self.width, self.height)
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

/// Canonical geometry string for a width/height pair.
pub fn canonicalize(width: Option<u32>, height: Option<u32>) -> String {
    match (width, height) {
        (Some(w), Some(h)) => format!("{}x{}", w, h),
        (None, Some(h)) => format!("x{}", h),
        (Some(w), None) => w.to_string(),
        (None, None) => String::new(),
    }
}

fn capture(re: &Regex, raw: &str) -> Result<Option<u32>> {
    re.captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| {
            m.as_str()
                .parse::<u32>()
                .map_err(|_| Error::InvalidGeometry(raw.to_string()))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dims(action: &str, raw: &str) -> (Option<u32>, Option<u32>) {
        let g = Geometry::parse(action, raw).unwrap();
        (g.width, g.height)
    }

    #[test]
    fn test_parse_thumbnail() {
        assert_eq!(dims("thumbnail", "100x50"), (Some(100), Some(50)));
        assert_eq!(dims("thumbnail", "100"), (Some(100), None));
        assert_eq!(dims("thumbnail", "x50"), (None, Some(50)));
    }

    #[test]
    fn test_parse_resize_squares_width() {
        assert_eq!(dims("resize", "100"), (Some(100), Some(100)));
        assert_eq!(dims("resize", "100x50"), (Some(100), Some(50)));
        assert_eq!(dims("resize", "x50"), (None, Some(50)));
    }

    #[test]
    fn test_parse_rejects_junk() {
        for raw in ["bogus", "", "x", "10x", "10x20x30", "-5", "0", "0x10", "99999999999"] {
            let err = Geometry::parse("resize", raw).unwrap_err();
            assert!(matches!(err, Error::InvalidGeometry(_)), "{raw}");
        }
    }

    #[test]
    fn test_canonicalize() {
        assert_eq!(canonicalize(Some(100), None), "100");
        assert_eq!(canonicalize(None, Some(50)), "x50");
        assert_eq!(canonicalize(Some(100), Some(50)), "100x50");
    }

    #[test]
    fn test_equivalent_requests_collapse() {
        let a = Geometry::parse("resize", "100").unwrap();
        let b = Geometry::parse("resize", "100x100").unwrap();
        assert_eq!(a.canonical(), b.canonical());
    }

    #[test]
    fn test_from_dimensions() {
        assert_eq!(Geometry::from_dimensions(Some(40), None), "40");
        assert_eq!(Geometry::from_dimensions(Some(40), Some(30)), "40x30");
        assert_eq!(Geometry::from_dimensions(None, Some(30)), "x30");
        assert_eq!(Geometry::from_dimensions(None, None), "x");
    }
}
