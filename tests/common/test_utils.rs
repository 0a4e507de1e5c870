//! Test utilities and helper functions

use crate::common::mock_i2c::{MockDelay, MockI2c, SimulatedChip};
use hmc6352_async::Hmc6352;

pub type MockDriver = Hmc6352<MockI2c, MockDelay>;

pub fn block_on<F: core::future::Future>(f: F) -> F::Output {
    futures::executor::block_on(f)
}

/// Create a driver over a factory-fresh simulated chip.
/// Returns (driver, chip) with the initialisation traffic cleared from the log.
pub fn create_mock_driver() -> (MockDriver, SimulatedChip) {
    let chip = SimulatedChip::new();
    let driver =
        block_on(Hmc6352::new(chip.bus(), chip.delay())).expect("Failed to create mock driver");
    chip.clear_operations();
    (driver, chip)
}
