//! Scale fitting
//!
//! The fit probes a projection at a fixed scale with no translation, measures
//! the projected bounds of a geometry and derives the scale at which those
//! bounds fill a target extent.

use super::{ClipExtent, Projection, ProjectionStream};
use crate::geometry::{BoundsStream, Streamable};

/// Scale the projection is probed at
pub const FIT_PROBE_SCALE: f64 = 150.0;

/// Compute the scale that makes `object` fit inside `extent`.
///
/// The projection is left at the probe scale and zero translation; any clip
/// extent it carried is removed for the measurement and put back before
/// returning. Returns a scale of `0.0` when the projected bounds are empty or
/// have no area in either direction.
pub fn fit_extent<P, T>(mut projection: P, extent: &ClipExtent, object: &T) -> (P, f64)
where
    P: Projection,
    T: Streamable + ?Sized,
{
    let clip = projection.clip_extent();
    projection.set_scale(FIT_PROBE_SCALE);
    projection.set_translate([0.0, 0.0]);
    if clip.is_some() {
        projection.set_clip_extent(None);
    }

    let mut sink = BoundsStream::new();
    object.stream(&mut ProjectionStream::new(&projection, &mut sink));
    let bounds = sink.result();

    if clip.is_some() {
        projection.set_clip_extent(clip);
    }

    let ratios = [
        extent.width() / bounds.width(),
        extent.height() / bounds.height(),
    ];
    let k = ratios
        .into_iter()
        .filter(|r| r.is_finite() && *r > 0.0)
        .fold(f64::INFINITY, f64::min);

    let scale = if k.is_finite() {
        FIT_PROBE_SCALE * k
    } else {
        0.0
    };
    (projection, scale)
}
