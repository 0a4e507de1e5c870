//! Heading and magnetometer reads in each operational mode

use crate::common::{block_on, create_mock_driver, BusOp, MockDriver, SimulatedChip};
use hmc6352_async::{Hmc6352Error, OperationalMode, OutputDataMode, ReadStrategy};

fn driver_in_mode(mode: OperationalMode) -> (MockDriver, SimulatedChip) {
    let (mut driver, chip) = create_mock_driver();
    let mut op = driver.operational_mode();
    op.set_mode(mode);
    block_on(driver.set_operational_mode(op, false)).unwrap();
    chip.clear_operations();
    (driver, chip)
}

#[test]
fn test_standby_heading_requests_measurement_first() {
    let (mut driver, chip) = driver_in_mode(OperationalMode::Standby);
    chip.set_data(1234);

    let heading = block_on(driver.heading()).unwrap();

    assert_eq!(heading.tenths(), 1234);
    assert_eq!(
        chip.operations(),
        vec![
            BusOp::Write(vec![0x41]),
            BusOp::Delay(6000),
            BusOp::Read(2)
        ]
    );
}

#[test]
fn test_query_heading_reads_then_triggers() {
    let (mut driver, chip) = driver_in_mode(OperationalMode::Query);
    assert_eq!(driver.read_strategy(), ReadStrategy::Query);
    chip.set_data(3599);

    let heading = block_on(driver.heading()).unwrap();

    assert_eq!(heading.tenths(), 3599);
    // next measurement is fired without waiting for it
    assert_eq!(
        chip.operations(),
        vec![BusOp::Read(2), BusOp::Write(vec![0x41])]
    );
}

#[test]
fn test_continuous_heading_only_reads() {
    let (mut driver, chip) = driver_in_mode(OperationalMode::Continuous);
    chip.set_data(0x0384);

    let heading = block_on(driver.heading()).unwrap();

    assert_eq!(heading.tenths(), 900);
    assert!((heading.degrees() - 90.0).abs() < 1e-4);
    assert_eq!(chip.operations(), vec![BusOp::Read(2)]);
}

#[test]
fn test_heading_suppressed_outside_heading_output() {
    let (mut driver, chip) = driver_in_mode(OperationalMode::Continuous);
    block_on(driver.set_output_data_mode(OutputDataMode::RawX.into())).unwrap();
    chip.clear_operations();
    chip.set_data(1234);

    let heading = block_on(driver.heading()).unwrap();

    assert_eq!(heading.tenths(), 0);
    assert!(chip.operations().is_empty());
}

#[test]
fn test_strategy_follows_mode_changes() {
    let (mut driver, chip) = driver_in_mode(OperationalMode::Continuous);
    chip.set_data(450);
    assert_eq!(block_on(driver.heading()).unwrap().tenths(), 450);

    let mut op = driver.operational_mode();
    op.set_mode(OperationalMode::Standby);
    block_on(driver.set_operational_mode(op, false)).unwrap();
    chip.clear_operations();

    block_on(driver.heading()).unwrap();
    assert_eq!(chip.delay_count(6000), 1);
}

#[test]
fn test_heading_read_error_is_propagated() {
    let (mut driver, chip) = driver_in_mode(OperationalMode::Query);
    chip.fail_next_read();

    let result = block_on(driver.heading());

    assert!(matches!(result, Err(Hmc6352Error::I2c(_))));
    // no trigger after a failed read
    assert_eq!(chip.operations(), vec![BusOp::Read(2)]);
}

#[test]
fn test_read_magnetometer_signed() {
    let (mut driver, chip) = driver_in_mode(OperationalMode::Continuous);
    block_on(driver.set_output_data_mode(OutputDataMode::CompensatedY.into())).unwrap();
    chip.clear_operations();
    chip.set_data(0xFE0C);

    assert_eq!(block_on(driver.read_magnetometer()).unwrap(), -500);
    assert_eq!(chip.operations(), vec![BusOp::Read(2)]);
}

#[test]
fn test_read_magnetometer_standby_requests_measurement() {
    let (mut driver, chip) = driver_in_mode(OperationalMode::Standby);
    block_on(driver.set_output_data_mode(OutputDataMode::RawX.into())).unwrap();
    chip.clear_operations();
    chip.set_data(0x0123);

    assert_eq!(block_on(driver.read_magnetometer()).unwrap(), 0x0123);
    assert_eq!(
        chip.operations(),
        vec![
            BusOp::Write(vec![0x41]),
            BusOp::Delay(6000),
            BusOp::Read(2)
        ]
    );
}

#[test]
fn test_read_magnetometer_rejected_in_heading_output() {
    let (mut driver, chip) = driver_in_mode(OperationalMode::Continuous);

    let result = block_on(driver.read_magnetometer());

    assert_eq!(result, Err(Hmc6352Error::NotMagnetometerOutput));
    assert!(chip.operations().is_empty());
}
