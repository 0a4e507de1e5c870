//! Async driver for the Honeywell HMC6352 two-axis digital compass.
//!
//! ```ignore
//! let mut compass = Hmc6352::new(i2c, delay).await?;
//! let mut mode = compass.operational_mode();
//! mode.set_mode(OperationalMode::Continuous);
//! mode.set_rate(MeasurementRate::Hz10);
//! compass.set_operational_mode(mode, false).await?;
//! let heading = compass.heading().await?;
//! ```
#![no_std]

pub mod calibration;
pub mod heading;
pub mod hmc6352;
pub mod reg_data;
pub mod registers;

pub use calibration::{CalibrationObserver, CalibrationReport, Cancellation};
pub use heading::Heading;
pub use hmc6352::{Hmc6352, Hmc6352Error, ReadStrategy};
pub use reg_data::hmc6352::I2C_ADDRESS;
pub use registers::{
    MeasurementRate, OperationalMode, OperationalModeRegister, OutputDataMode,
    OutputDataModeRegister,
};
