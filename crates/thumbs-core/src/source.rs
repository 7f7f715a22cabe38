//! Source descriptors and the fallback attribute probe.
//!
//! A descriptor can tell where an image lives and, when cheaply known, its
//! natural size. Descriptors may wrap other descriptors (an article that
//! carries a `photo`, say); those nested providers are probed after the
//! descriptor itself, one level deep.

use serde::{Deserialize, Serialize};

/// Natural pixel dimensions, when known without decoding.
pub trait HasDimensions {
    fn width(&self) -> Option<u32>;
    fn height(&self) -> Option<u32>;
}

/// Something that can locate an image.
pub trait SourceDescriptor: Send + Sync {
    fn name(&self) -> Option<&str> {
        None
    }

    fn url(&self) -> Option<&str> {
        None
    }

    fn path(&self) -> Option<&str> {
        None
    }

    fn dimensions(&self) -> Option<&dyn HasDimensions> {
        None
    }

    /// Nested providers, in probe order.
    fn providers(&self) -> Vec<&dyn SourceDescriptor> {
        Vec::new()
    }
}

/// What the URL resolver is asked to resolve.
#[derive(Clone, Copy)]
pub enum Source<'a> {
    Url(&'a str),
    Descriptor(&'a dyn SourceDescriptor),
}

impl<'a> Source<'a> {
    pub fn descriptor(&self) -> Option<&'a dyn SourceDescriptor> {
        match self {
            Source::Url(_) => None,
            Source::Descriptor(d) => Some(*d),
        }
    }
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(url: &'a str) -> Self {
        Source::Url(url)
    }
}

/// Values the probe treats as present only when non-empty.
pub trait Present {
    fn is_present(&self) -> bool;
}

impl Present for String {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl Present for u32 {
    fn is_present(&self) -> bool {
        *self != 0
    }
}

/// One attribute lookup against a descriptor.
pub type Lookup<T> = fn(&dyn SourceDescriptor) -> Option<T>;

fn name_of(s: &dyn SourceDescriptor) -> Option<String> {
    s.name().map(str::to_owned)
}

fn url_of(s: &dyn SourceDescriptor) -> Option<String> {
    s.url().map(str::to_owned)
}

fn path_of(s: &dyn SourceDescriptor) -> Option<String> {
    s.path().map(str::to_owned)
}

fn width_of(s: &dyn SourceDescriptor) -> Option<u32> {
    s.dimensions().and_then(|d| d.width())
}

fn height_of(s: &dyn SourceDescriptor) -> Option<u32> {
    s.dimensions().and_then(|d| d.height())
}

/// Location lookups, most preferred first.
pub const LOCATION: &[Lookup<String>] = &[name_of, url_of, path_of];
pub const WIDTH: &[Lookup<u32>] = &[width_of];
pub const HEIGHT: &[Lookup<u32>] = &[height_of];

/// Return the first present value, searching the descriptor and then each
/// nested provider.
pub fn probe<T: Present>(source: &dyn SourceDescriptor, lookups: &[Lookup<T>]) -> Option<T> {
    std::iter::once(source)
        .chain(source.providers())
        .find_map(|candidate| {
            lookups
                .iter()
                .find_map(|lookup| lookup(candidate).filter(Present::is_present))
        })
}

/// Like [`probe`], falling back to `default`.
pub fn probe_or<T: Present>(
    source: Option<&dyn SourceDescriptor>,
    lookups: &[Lookup<T>],
    default: T,
) -> T {
    source.and_then(|s| probe(s, lookups)).unwrap_or(default)
}

pub fn natural_width(source: Option<&dyn SourceDescriptor>) -> Option<u32> {
    source.and_then(|s| probe(s, WIDTH))
}

pub fn natural_height(source: Option<&dyn SourceDescriptor>) -> Option<u32> {
    source.and_then(|s| probe(s, HEIGHT))
}

/// Plain descriptor for callers without their own model types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub providers: Vec<ImageInfo>,
}

impl ImageInfo {
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_provider(mut self, provider: ImageInfo) -> Self {
        self.providers.push(provider);
        self
    }
}

impl HasDimensions for ImageInfo {
    fn width(&self) -> Option<u32> {
        self.width
    }

    fn height(&self) -> Option<u32> {
        self.height
    }
}

impl SourceDescriptor for ImageInfo {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    fn dimensions(&self) -> Option<&dyn HasDimensions> {
        Some(self)
    }

    fn providers(&self) -> Vec<&dyn SourceDescriptor> {
        self.providers
            .iter()
            .map(|p| p as &dyn SourceDescriptor)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_prefers_earlier_lookups() {
        let info = ImageInfo {
            url: Some("u.jpg".into()),
            path: Some("p.jpg".into()),
            ..Default::default()
        };
        assert_eq!(probe(&info, LOCATION).as_deref(), Some("u.jpg"));
    }

    #[test]
    fn test_probe_skips_empty_values() {
        let info = ImageInfo {
            name: Some(String::new()),
            path: Some("p.jpg".into()),
            ..Default::default()
        };
        assert_eq!(probe(&info, LOCATION).as_deref(), Some("p.jpg"));
    }

    #[test]
    fn test_probe_searches_providers_after_top_level() {
        let info = ImageInfo::default()
            .with_provider(ImageInfo::at("photo.jpg").with_size(640, 480))
            .with_provider(ImageInfo::at("image.jpg").with_size(10, 10));
        assert_eq!(probe(&info, LOCATION).as_deref(), Some("photo.jpg"));
        assert_eq!(natural_width(Some(&info)), Some(640));

        let top = ImageInfo::at("top.jpg").with_provider(ImageInfo::at("nested.jpg"));
        assert_eq!(probe(&top, LOCATION).as_deref(), Some("top.jpg"));
    }

    #[test]
    fn test_probe_is_one_level_deep() {
        let deep = ImageInfo::default()
            .with_provider(ImageInfo::default().with_provider(ImageInfo::at("deep.jpg")));
        assert_eq!(probe(&deep, LOCATION), None);
    }

    #[test]
    fn test_probe_default() {
        assert_eq!(probe_or(None, WIDTH, 7), 7);
        let zero = ImageInfo::default().with_size(0, 0);
        assert_eq!(probe_or(Some(&zero), WIDTH, 3), 3);
    }
}
