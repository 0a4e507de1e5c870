//! Detection and start-up sequence

use crate::common::{block_on, BusOp, MockError, SimulatedChip};
use hmc6352_async::{
    Hmc6352, Hmc6352Error, MeasurementRate, OperationalMode, OutputDataMode, ReadStrategy,
};

#[test]
fn test_init_sequence() {
    let chip = SimulatedChip::new();
    let driver = block_on(Hmc6352::new(chip.bus(), chip.delay())).unwrap();

    assert_eq!(
        chip.operations(),
        vec![
            // software version
            BusOp::Write(vec![0x72, 0x07]),
            BusOp::Delay(70),
            BusOp::Read(1),
            // set/reset
            BusOp::Write(vec![0x4F]),
            BusOp::Delay(6000),
            // operational mode
            BusOp::Write(vec![0x67, 0x74]),
            BusOp::Delay(70),
            BusOp::Read(1),
            // output mode
            BusOp::Write(vec![0x67, 0x4E]),
            BusOp::Delay(70),
            BusOp::Read(1),
        ]
    );

    assert_eq!(driver.software_version(), 0x02);
    assert_eq!(driver.address(), 0x21);
    assert!(!driver.is_disabled());
}

#[test]
fn test_init_caches_factory_registers() {
    let chip = SimulatedChip::new();
    let driver = block_on(Hmc6352::new(chip.bus(), chip.delay())).unwrap();

    let op = driver.operational_mode();
    assert_eq!(op.mode(), OperationalMode::Standby);
    assert_eq!(op.rate(), MeasurementRate::Hz10);
    assert!(op.periodic_set_reset());
    assert_eq!(driver.output_data_mode().value(), Some(OutputDataMode::Heading));
    assert_eq!(driver.read_strategy(), ReadStrategy::Standby);
}

#[test]
fn test_init_reads_current_ram_registers() {
    let chip = SimulatedChip::new();
    chip.set_ram(0x74, 0x22);
    chip.set_ram(0x4E, 0x03);

    let driver = block_on(Hmc6352::new(chip.bus(), chip.delay())).unwrap();

    assert_eq!(driver.operational_mode().mode(), OperationalMode::Continuous);
    assert_eq!(driver.operational_mode().rate(), MeasurementRate::Hz5);
    assert!(!driver.operational_mode().periodic_set_reset());
    assert_eq!(
        driver.output_data_mode().value(),
        Some(OutputDataMode::CompensatedX)
    );
    assert_eq!(driver.read_strategy(), ReadStrategy::Suppressed);
}

#[test]
fn test_init_coerces_corrupt_mode() {
    let chip = SimulatedChip::new();
    chip.set_ram(0x74, 0xFF);

    let driver = block_on(Hmc6352::new(chip.bus(), chip.delay())).unwrap();

    assert_eq!(driver.operational_mode().mode(), OperationalMode::Standby);
    assert_eq!(driver.operational_mode().to_byte(), 0x70);
    assert_eq!(driver.read_strategy(), ReadStrategy::Standby);
}

#[test]
fn test_init_keeps_unassigned_output_mode() {
    let chip = SimulatedChip::new();
    chip.set_ram(0x4E, 0x05);
    chip.set_data(1234);

    let mut driver = block_on(Hmc6352::new(chip.bus(), chip.delay())).unwrap();
    chip.clear_operations();

    assert_eq!(driver.output_data_mode().value(), None);
    assert_eq!(driver.output_data_mode().to_byte(), 0x05);
    assert_eq!(driver.read_strategy(), ReadStrategy::Suppressed);

    assert_eq!(block_on(driver.heading()).unwrap().tenths(), 0);
    assert_eq!(
        block_on(driver.read_magnetometer()),
        Err(Hmc6352Error::NotMagnetometerOutput)
    );
    assert!(chip.operations().is_empty());
}

#[test]
fn test_zero_software_version_is_not_detected() {
    let chip = SimulatedChip::new();
    chip.set_eeprom(0x07, 0x00);

    let result = block_on(Hmc6352::new(chip.bus(), chip.delay()));

    assert!(matches!(result, Err(Hmc6352Error::DeviceNotDetected)));
    // no set/reset, no mode reads, no retry
    assert_eq!(
        chip.operations(),
        vec![
            BusOp::Write(vec![0x72, 0x07]),
            BusOp::Delay(70),
            BusOp::Read(1),
        ]
    );
}

#[test]
fn test_bus_error_during_detection_is_propagated() {
    let chip = SimulatedChip::new();
    chip.fail_next_read();

    let result = block_on(Hmc6352::new(chip.bus(), chip.delay()));

    assert!(matches!(
        result,
        Err(Hmc6352Error::I2c(MockError::Communication))
    ));
    assert_eq!(chip.bus_operations().len(), 2);
}

#[test]
fn test_wrong_address() {
    let chip = SimulatedChip::new();
    chip.set_address(0x30);

    let result = block_on(Hmc6352::new(chip.bus(), chip.delay()));
    assert!(matches!(result, Err(Hmc6352Error::I2c(MockError::Nack))));

    let driver = block_on(Hmc6352::new_with_addr(chip.bus(), chip.delay(), 0x30)).unwrap();
    assert_eq!(driver.address(), 0x30);
}

#[test]
fn test_release_returns_bus() {
    let chip = SimulatedChip::new();
    let driver = block_on(Hmc6352::new(chip.bus(), chip.delay())).unwrap();
    chip.clear_operations();

    let (bus, delay) = driver.release();

    // the released handles still talk to the same chip
    let mut driver = block_on(Hmc6352::new(bus, delay)).unwrap();
    block_on(driver.sleep()).unwrap();
    assert!(chip.is_sleeping());
}
