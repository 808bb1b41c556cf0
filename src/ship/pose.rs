use std::sync::{Arc, PoisonError, RwLock};

use crate::math::{FreeCoordinate, ShipTransform};

/// The two tick-boundary poses of one ship: where it was at the end of the
/// previous simulation tick and where it is now.
///
/// Anything sampling between ticks interpolates between the two; physics
/// reads `current` only.
#[derive(Clone, Copy, Debug, PartialEq)]
#[allow(clippy::exhaustive_structs)]
pub struct TickTransforms {
    /// Pose at the previous tick boundary.
    pub previous: ShipTransform,
    /// Pose at the current tick boundary.
    pub current: ShipTransform,
}

impl TickTransforms {
    /// Computes the pose at `fraction` of the way through the current tick.
    #[inline]
    pub fn interpolated(&self, fraction: FreeCoordinate) -> ShipTransform {
        ShipTransform::interpolate(&self.previous, &self.current, fraction)
    }
}

/// Owns a ship's [`TickTransforms`] and advances them once per simulation
/// tick.
///
/// Writing happens only through `&mut self` on the simulation thread.
/// Concurrent readers (the render thread, via [`TransformSampler`]) copy the
/// whole pair out from behind a lock, and [`TransformBuffer::advance`]
/// replaces the whole pair in one store, so a half-written pair is never
/// observable.
#[derive(Debug)]
pub struct TransformBuffer {
    shared: Arc<RwLock<TickTransforms>>,
}

impl TransformBuffer {
    /// Creates a buffer whose previous and current transforms are both
    /// `initial`, so that interpolation is well-defined from the first tick.
    pub fn new(initial: ShipTransform) -> Self {
        Self {
            shared: Arc::new(RwLock::new(TickTransforms {
                previous: initial,
                current: initial,
            })),
        }
    }

    /// Advances one tick: the current transform becomes the previous one,
    /// and `new_transform` becomes current.
    ///
    /// Must be called exactly once per simulation tick per ship, and never
    /// concurrently with same-tick physics reads; concurrent interpolation
    /// reads are fine.
    pub fn advance(&mut self, new_transform: ShipTransform) {
        let mut pair = self.shared.write().unwrap_or_else(PoisonError::into_inner);
        *pair = TickTransforms {
            previous: pair.current,
            current: new_transform,
        };
    }

    /// The pose at the current tick boundary; the pose collision resolution
    /// must use.
    #[inline]
    pub fn current(&self) -> ShipTransform {
        self.pair().current
    }

    /// The pose at the previous tick boundary.
    #[inline]
    pub fn previous(&self) -> ShipTransform {
        self.pair().previous
    }

    /// Copies out both tick-boundary poses as one consistent snapshot.
    #[inline]
    pub fn pair(&self) -> TickTransforms {
        *self.shared.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Computes the pose at `fraction` of the way through the current tick.
    #[inline]
    pub fn interpolated(&self, fraction: FreeCoordinate) -> ShipTransform {
        self.pair().interpolated(fraction)
    }

    /// Creates a read-only handle to this buffer which may be sent to and
    /// kept by another thread (typically the renderer).
    pub fn sampler(&self) -> TransformSampler {
        TransformSampler {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// Cloneable, read-only view of a ship's [`TransformBuffer`] for sampling
/// interpolated poses from outside the simulation thread.
///
/// The sampler never blocks the simulation for longer than one pair copy and
/// never observes a partially advanced pair.
#[derive(Clone, Debug)]
pub struct TransformSampler {
    shared: Arc<RwLock<TickTransforms>>,
}

impl TransformSampler {
    /// Copies out both tick-boundary poses as one consistent snapshot.
    #[inline]
    pub fn pair(&self) -> TickTransforms {
        *self.shared.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Computes the pose at `fraction` of the way through the current tick,
    /// for render-time positioning.
    #[inline]
    pub fn interpolated(&self, fraction: FreeCoordinate) -> ShipTransform {
        self.pair().interpolated(fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{FreePoint, Rotation};
    use euclid::point3;
    use pretty_assertions::assert_eq;

    fn transform_at(x: f64) -> ShipTransform {
        ShipTransform::new(point3(x, 0.0, 0.0), Rotation::identity(), FreePoint::origin())
    }

    #[test]
    fn advance_shifts_pair() {
        let mut buffer = TransformBuffer::new(transform_at(0.0));
        for i in 1..=5 {
            buffer.advance(transform_at(f64::from(i)));
            assert_eq!(buffer.previous(), transform_at(f64::from(i - 1)));
            assert_eq!(buffer.current(), transform_at(f64::from(i)));
        }
    }

    #[test]
    fn interpolation_midpoint() {
        let mut buffer = TransformBuffer::new(transform_at(0.0));
        buffer.advance(transform_at(10.0));
        let midpoint = buffer.interpolated(0.5);
        assert_eq!(midpoint.position(), point3(5.0, 0.0, 0.0));
    }

    #[test]
    fn sampler_sees_consistent_pairs_across_threads() {
        let mut buffer = TransformBuffer::new(transform_at(0.0));
        let sampler = buffer.sampler();

        let reader = std::thread::spawn(move || {
            for _ in 0..1000 {
                let pair = sampler.pair();
                // Each advance writes (previous: n, current: n + 1), so any
                // consistent snapshot satisfies this relation.
                let gap = pair.current.position().x - pair.previous.position().x;
                assert!(gap == 0.0 || gap == 1.0, "torn pair: {pair:?}");
            }
        });

        for i in 1..=1000 {
            buffer.advance(transform_at(f64::from(i)));
        }
        reader.join().unwrap();
    }
}
