//! Fixture actuator abstraction.

use crate::profile::ActuatorProfile;

/// Motion controller that moves the DUT through an [`ActuatorProfile`].
///
/// The validator owns the actuator for the duration of a run and only ever
/// issues one motion at a time.
pub trait Actuator {
    /// Error type produced by the actuator transport.
    type Error;

    /// Starts `profile`. Must return without waiting for the motion to end.
    fn begin(&mut self, profile: ActuatorProfile) -> Result<(), Self::Error>;

    /// Returns `true` once the motion started by [`Actuator::begin`] has finished.
    fn is_complete(&mut self) -> Result<bool, Self::Error>;

    /// Stops any motion in flight and leaves the fixture in its safe position.
    fn halt(&mut self) -> Result<(), Self::Error>;
}

impl<T: Actuator + ?Sized> Actuator for &mut T {
    type Error = T::Error;

    fn begin(&mut self, profile: ActuatorProfile) -> Result<(), Self::Error> {
        (**self).begin(profile)
    }

    fn is_complete(&mut self) -> Result<bool, Self::Error> {
        (**self).is_complete()
    }

    fn halt(&mut self) -> Result<(), Self::Error> {
        (**self).halt()
    }
}

/// Halts the actuator when dropped unless the motion was seen to complete.
pub struct MotionGuard<'a, A>
where
    A: Actuator,
{
    actuator: &'a mut A,
    armed: bool,
}

impl<'a, A> MotionGuard<'a, A>
where
    A: Actuator,
{
    /// Starts `profile`. The guard is armed even if the command fails.
    pub fn begin(actuator: &'a mut A, profile: ActuatorProfile) -> (Self, Result<(), A::Error>) {
        let result = actuator.begin(profile);
        (Self { actuator, armed: true }, result)
    }

    /// Polls the actuator for completion.
    pub fn is_complete(&mut self) -> Result<bool, A::Error> {
        self.actuator.is_complete()
    }

    /// Marks the motion as finished; dropping the guard no longer halts.
    pub fn complete(mut self) {
        self.armed = false;
    }

    /// Halts the motion now and reports the outcome.
    pub fn halt(mut self) -> Result<(), A::Error> {
        self.armed = false;
        self.actuator.halt()
    }
}

impl<A> Drop for MotionGuard<'_, A>
where
    A: Actuator,
{
    fn drop(&mut self) {
        if self.armed && self.actuator.halt().is_err() {
            log_error!("actuator could not be halted");
        }
    }
}
