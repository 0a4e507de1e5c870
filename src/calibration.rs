//! User calibration routine
//!
//! The chip collects readings while the host rotates it on a flat surface at least
//! once (two slow turns over about 20s works well). Exiting calibration mode makes
//! the chip compute and store new hard-iron offsets and scale factors. The window
//! must last at least [`MIN_CALIBRATION_MS`] and should not exceed
//! [`MAX_CALIBRATION_MS`].

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal_async::{delay::DelayNs, i2c::I2c};

use crate::hmc6352::{Hmc6352, Hmc6352Error};

/// Shortest window the chip accepts, milliseconds
pub const MIN_CALIBRATION_MS: u32 = 6000;
/// Longest window, milliseconds; longer requests are clamped
pub const MAX_CALIBRATION_MS: u32 = 180_000;
/// Granularity of progress reports and cancellation checks; the last step is
/// shortened so the window ends on the requested duration
pub const CALIBRATION_STEP_MS: u32 = 500;

const CALIBRATION_TIME_DELAY_MS: u8 = 10;
const CALIBRATION_SUMMED_MEASUREMENTS: u8 = 10;

/// Polled once per calibration step
pub trait Cancellation {
    fn is_cancelled(&self) -> bool;
}

impl Cancellation for AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(Ordering::Acquire)
    }
}

impl<F> Cancellation for F
where
    F: Fn() -> bool,
{
    fn is_cancelled(&self) -> bool {
        self()
    }
}

/// Hooks into the calibration sequence, e.g. to drive a UI prompt
pub trait CalibrationObserver {
    /// Calibration mode is about to be entered
    fn begin(&mut self) {}
    /// One step elapsed; total time spent in the window so far
    fn progress(&mut self, _elapsed_ms: u32) {}
    /// Window closed, waiting for the chip to finish
    fn finalizing(&mut self) {}
    /// Calibration mode was left successfully
    fn end(&mut self) {}
}

impl CalibrationObserver for () {}

/// Outcome of [`Hmc6352::calibrate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationReport {
    /// Requested window after clamping
    pub duration_ms: u32,
    /// Time spent in the step loop
    pub elapsed_ms: u32,
    /// Extra wait added to reach the minimum window
    pub settle_ms: u32,
    /// The window was closed by cancellation rather than by running out
    pub cancelled: bool,
}

/// Settings overridden for the length of a calibration
struct CalibrationSession {
    time_delay: u8,
    summed_measurements: u8,
    elapsed_ms: u32,
    cancelled: bool,
}

impl<I2C, D, CommE> Hmc6352<I2C, D>
where
    I2C: I2c<Error = CommE>,
    D: DelayNs,
    CommE: core::fmt::Debug,
{
    /// Run a user calibration for up to `duration_ms`, or until `cancel` fires.
    ///
    /// Time delay and summed measurements are raised for the window and put back
    /// afterwards on every exit path, along with leaving calibration mode. If the
    /// window closes before [`MIN_CALIBRATION_MS`], the remainder is waited out
    /// first. Blocks the caller for the whole sequence, at least 20s.
    pub async fn calibrate<C, O>(
        &mut self,
        duration_ms: u32,
        cancel: &C,
        observer: &mut O,
    ) -> Result<CalibrationReport, Hmc6352Error<CommE>>
    where
        C: Cancellation + ?Sized,
        O: CalibrationObserver,
    {
        let duration_ms = if duration_ms > MAX_CALIBRATION_MS {
            #[cfg(feature = "defmt")]
            defmt::info!("calibration time reduced to {}ms", MAX_CALIBRATION_MS);
            MAX_CALIBRATION_MS
        } else {
            duration_ms
        };

        #[cfg(feature = "defmt")]
        defmt::info!("rotate the compass on a flat surface once every 10 seconds");

        let mut session = CalibrationSession {
            time_delay: self.time_delay().await?,
            summed_measurements: self.summed_measurements().await?,
            elapsed_ms: 0,
            cancelled: false,
        };

        let window = self
            .run_calibration_window(&mut session, duration_ms, cancel, observer)
            .await;
        let closed = self.close_calibration(&session, observer).await;

        window?;
        let settle_ms = closed?;
        Ok(CalibrationReport {
            duration_ms,
            elapsed_ms: session.elapsed_ms,
            settle_ms,
            cancelled: session.cancelled,
        })
    }

    async fn run_calibration_window<C, O>(
        &mut self,
        session: &mut CalibrationSession,
        duration_ms: u32,
        cancel: &C,
        observer: &mut O,
    ) -> Result<(), Hmc6352Error<CommE>>
    where
        C: Cancellation + ?Sized,
        O: CalibrationObserver,
    {
        self.set_time_delay(CALIBRATION_TIME_DELAY_MS).await?;
        self.set_summed_measurements(CALIBRATION_SUMMED_MEASUREMENTS)
            .await?;

        #[cfg(feature = "defmt")]
        defmt::info!("beginning calibration");
        observer.begin();
        self.begin_calibration().await?;

        while session.elapsed_ms < duration_ms {
            if cancel.is_cancelled() {
                session.cancelled = true;
                break;
            }
            let step = CALIBRATION_STEP_MS.min(duration_ms - session.elapsed_ms);
            self.pause(step).await;
            session.elapsed_ms += step;
            observer.progress(session.elapsed_ms);

            #[cfg(feature = "defmt")]
            defmt::debug!("calibration in progress, {}ms elapsed", session.elapsed_ms);
        }
        Ok(())
    }

    /// Always runs: waits out the minimum window, leaves calibration mode and
    /// restores the saved settings. Returns the extra wait.
    async fn close_calibration<O>(
        &mut self,
        session: &CalibrationSession,
        observer: &mut O,
    ) -> Result<u32, Hmc6352Error<CommE>>
    where
        O: CalibrationObserver,
    {
        #[cfg(feature = "defmt")]
        defmt::info!("finalising calibration");
        observer.finalizing();

        let settle_ms = MIN_CALIBRATION_MS.saturating_sub(session.elapsed_ms);
        if settle_ms > 0 {
            self.pause(settle_ms).await;
        }

        let ended = self.end_calibration().await;
        if ended.is_ok() {
            observer.end();
            #[cfg(feature = "defmt")]
            defmt::info!("calibration complete");
        }

        let time_delay = self.set_time_delay(session.time_delay).await;
        let summed = self
            .set_summed_measurements(session.summed_measurements)
            .await;

        ended?;
        time_delay?;
        summed?;
        Ok(settle_ms)
    }
}
