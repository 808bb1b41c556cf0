use core::time::Duration;

/// The amount of simulated time a single simulation step covers.
///
/// [`Tick`] values are passed along through stepping operations; they are
/// produced by whatever clock the host engine runs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Tick {
    delta_t: Duration,
}

impl Tick {
    /// Construct a [`Tick`] from a duration expressed in fractional seconds.
    ///
    /// Panics if `dt` is negative or not finite.
    #[inline]
    #[track_caller]
    pub fn from_seconds(dt: f64) -> Self {
        Self {
            delta_t: Duration::from_secs_f64(dt),
        }
    }

    /// Length of the tick.
    #[inline]
    pub fn delta_t(self) -> Duration {
        self.delta_t
    }

    /// Length of the tick in fractional seconds, for multiplying with
    /// velocities.
    #[inline]
    pub fn delta_t_f64(self) -> f64 {
        self.delta_t.as_secs_f64()
    }
}
