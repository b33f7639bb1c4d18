//! Web Mercator projection between `[lon, lat]` and screen pixels.
//!
//! The base scale is fitted once per document so that, at zoom 1, the
//! whole document fills the viewport. Zoom multiplies that scale.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

/// Latitude limit of the Web Mercator projection.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

/// Fraction of the viewport the fitted document occupies at zoom 1.
const FIT_PADDING: f64 = 0.9;

/// Span in degrees shown at zoom 1 when there is nothing to fit.
const FALLBACK_SPAN_DEG: f64 = 20.0;

/// A geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    /// Western edge.
    pub west: f64,
    /// Southern edge.
    pub south: f64,
    /// Eastern edge.
    pub east: f64,
    /// Northern edge.
    pub north: f64,
}

impl GeoBounds {
    /// Grows the bounds to include `other`.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            west: self.west.min(other.west),
            south: self.south.min(other.south),
            east: self.east.max(other.east),
            north: self.north.max(other.north),
        }
    }
}

/// Projects a longitude/latitude pair to Mercator units (radians).
#[must_use]
pub fn to_mercator(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    (lon.to_radians(), (FRAC_PI_4 + lat / 2.0).tan().ln())
}

/// Inverse of [`to_mercator`].
#[must_use]
pub fn from_mercator(x: f64, y: f64) -> (f64, f64) {
    (x.to_degrees(), (2.0 * y.exp().atan() - FRAC_PI_2).to_degrees())
}

/// Pixels per Mercator unit at zoom 1 so that `bounds` fits a
/// `width` × `height` viewport.
#[must_use]
pub fn fit_scale(bounds: Option<GeoBounds>, width: f64, height: f64) -> f64 {
    let Some(bounds) = bounds else {
        return width / FALLBACK_SPAN_DEG.to_radians();
    };

    let (x0, y0) = to_mercator(bounds.west, bounds.south);
    let (x1, y1) = to_mercator(bounds.east, bounds.north);
    let span_x = (x1 - x0).abs();
    let span_y = (y1 - y0).abs();

    let scale_x = if span_x > 0.0 { width / span_x } else { f64::INFINITY };
    let scale_y = if span_y > 0.0 { height / span_y } else { f64::INFINITY };
    let scale = scale_x.min(scale_y);

    if scale.is_finite() {
        scale * FIT_PADDING
    } else {
        width / FALLBACK_SPAN_DEG.to_radians()
    }
}

/// A concrete projection for one frame: center, scale and viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    center_x: f64,
    center_y: f64,
    scale: f64,
    width: f64,
    height: f64,
}

impl Projection {
    /// Creates a projection centered on `center` (`[lon, lat]`) with
    /// `scale` pixels per Mercator unit.
    #[must_use]
    pub fn new(center: [f64; 2], scale: f64, width: f64, height: f64) -> Self {
        let (center_x, center_y) = to_mercator(center[0], center[1]);
        Self {
            center_x,
            center_y,
            scale,
            width,
            height,
        }
    }

    /// Pixels per Mercator unit.
    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// Projects `[lon, lat]` to screen `(x, y)`; y grows downwards.
    #[must_use]
    pub fn project(&self, lon: f64, lat: f64) -> (f64, f64) {
        let (mx, my) = to_mercator(lon, lat);
        (
            (mx - self.center_x).mul_add(self.scale, self.width / 2.0),
            (self.center_y - my).mul_add(self.scale, self.height / 2.0),
        )
    }

    /// Maps screen `(x, y)` back to `[lon, lat]`.
    #[must_use]
    pub fn unproject(&self, x: f64, y: f64) -> [f64; 2] {
        let mx = (x - self.width / 2.0) / self.scale + self.center_x;
        let my = (self.height / 2.0 - y) / self.scale + self.center_y;
        let (lon, lat) = from_mercator(mx, my);
        [lon, lat]
    }

    /// The `[lon, lat]` that ends up at the viewport center after the
    /// content is dragged by `(dx, dy)` pixels.
    #[must_use]
    pub fn panned_center(&self, dx: f64, dy: f64) -> [f64; 2] {
        let (lon, lat) = from_mercator(
            self.center_x - dx / self.scale,
            self.center_y + dy / self.scale,
        );
        [wrap_longitude(lon), lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)]
    }
}

fn wrap_longitude(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}
