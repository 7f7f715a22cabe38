//! Image URL and dimension resolution.
//!
//! Given a source, an action and a geometry this works out the `src`,
//! `width` and `height` a page should use: either a render URL served by the
//! `lt_cache` endpoint, or the original asset when transforming would not
//! help.

use crate::geometry::{Geometry, THUMBNAIL};
use crate::source::{LOCATION, Source, natural_height, natural_width, probe_or};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Path segment the render endpoint is mounted under.
pub const RENDER_SEGMENT: &str = "lt_cache";

/// Settings that shape generated URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlSettings {
    /// Base the render endpoint is mounted at.
    pub render_url_base: String,
    /// Public URL prefix of the media root.
    pub media_url: String,
    /// Serve placeholder images instead of real renders.
    pub dummy: bool,
    /// Placeholder template with `{width}` and `{height}` markers.
    pub dummy_url: String,
}

impl Default for UrlSettings {
    fn default() -> Self {
        Self {
            render_url_base: "/".to_string(),
            media_url: "/media/".to_string(),
            dummy: false,
            dummy_url: "https://placekitten.com/{width}/{height}".to_string(),
        }
    }
}

/// Resolved image attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttrs {
    /// URL to request; empty when nothing could be resolved.
    pub src: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Builds image URLs for templates and API consumers.
#[derive(Debug, Clone, Default)]
pub struct ImageUrlResolver {
    settings: UrlSettings,
}

impl ImageUrlResolver {
    pub fn new(settings: UrlSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &UrlSettings {
        &self.settings
    }

    /// Resolve `src`, `width` and `height` for a source. Never fails.
    pub fn compute(&self, source: Source<'_>, action: &str, geometry: &str) -> ImageAttrs {
        let descriptor = source.descriptor();
        let url = match source {
            Source::Url(url) => url.to_string(),
            Source::Descriptor(d) => probe_or(Some(d), LOCATION, String::new()),
        };

        if url.is_empty() {
            return ImageAttrs {
                src: String::new(),
                width: natural_width(descriptor),
                height: natural_height(descriptor),
            };
        }

        let media = self.settings.media_url.as_str();
        let url = match url.strip_prefix(media) {
            Some(rest) if !media.is_empty() => rest.to_string(),
            _ => url,
        };

        if url.starts_with("http") {
            debug!(url = %url, "External image, passing through");
            return ImageAttrs {
                src: url,
                width: None,
                height: None,
            };
        }

        let parsed = match Geometry::parse(action, geometry) {
            Ok(g) => g,
            Err(e) => {
                warn!(geometry = %geometry, error = %e, "Bad geometry, serving original");
                return self.exit(&url, natural_width(descriptor), natural_height(descriptor));
            }
        };

        let natural = (natural_width(descriptor), natural_height(descriptor));
        let (mut width, mut height) = (parsed.width, parsed.height);

        if action == THUMBNAIL {
            match (width, height, natural) {
                (None, Some(h), (Some(sw), Some(sh))) => width = Some(scale(sw, h, sh)),
                (Some(w), None, (Some(sw), Some(sh))) => height = Some(scale(sh, w, sw)),
                _ => {}
            }
        }

        // Never enlarge: the original is already the best we can do.
        if let (Some(sw), Some(w)) = (natural.0, width)
            && w >= sw
        {
            return self.exit(&url, natural.0, natural.1);
        }
        if let (Some(sh), Some(h)) = (natural.1, height)
            && h >= sh
        {
            return self.exit(&url, natural.0, natural.1);
        }

        let src = if self.settings.dummy {
            self.settings
                .dummy_url
                .replace("{width}", &dimension(width))
                .replace("{height}", &dimension(height))
        } else {
            self.render_url(action, &parsed, &url)
        };

        self.exit(&src, width, height)
    }

    /// Like [`compute`](Self::compute) with numeric dimensions.
    pub fn attrs_for(
        &self,
        source: Source<'_>,
        action: &str,
        width: Option<u32>,
        height: Option<u32>,
    ) -> ImageAttrs {
        self.compute(source, action, &Geometry::from_dimensions(width, height))
    }

    /// Only the `src` of [`attrs_for`](Self::attrs_for).
    pub fn url_for(
        &self,
        source: Source<'_>,
        action: &str,
        width: Option<u32>,
        height: Option<u32>,
    ) -> String {
        self.attrs_for(source, action, width, height).src
    }

    /// Internal URL of the render endpoint for a source path.
    pub fn render_url(&self, action: &str, geometry: &Geometry, source_path: &str) -> String {
        let base = &self.settings.render_url_base;
        let slash = if base.ends_with('/') { "" } else { "/" };
        format!(
            "{}{}{}/{}/{}/{}",
            base,
            slash,
            RENDER_SEGMENT,
            action,
            geometry.canonical(),
            source_path.trim_start_matches('/')
        )
    }

    fn exit(&self, url: &str, width: Option<u32>, height: Option<u32>) -> ImageAttrs {
        ImageAttrs {
            src: join_url(&self.settings.media_url, url),
            width,
            height,
        }
    }
}

fn scale(natural_other: u32, requested: u32, natural: u32) -> u32 {
    (u64::from(natural_other) * u64::from(requested) / u64::from(natural)) as u32
}

fn dimension(value: Option<u32>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Resolve `reference` against `base` the way a browser would.
fn join_url(base: &str, reference: &str) -> String {
    if let Ok(base) = url::Url::parse(base) {
        return base
            .join(reference)
            .map(String::from)
            .unwrap_or_else(|_| reference.to_string());
    }

    if reference.starts_with('/') || url::Url::parse(reference).is_ok() {
        return reference.to_string();
    }

    match base.rfind('/') {
        Some(idx) => format!("{}{}", &base[..=idx], reference),
        None => reference.to_string(),
    }
}
