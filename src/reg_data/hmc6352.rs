//! Command bytes, register addresses and settle times of the HMC6352.

/// 7-bit bus address of a factory-fresh part (`0x42` in 8-bit write form)
pub const I2C_ADDRESS: u8 = 0x21;

/// Factory address as stored in EEPROM, 8-bit write form
pub const FACTORY_EEPROM_ADDRESS: u8 = 0x42;

/// Lowest programmable slave address (8-bit form)
pub const I2C_ADDRESS_MIN: u8 = 0x10;
/// Highest programmable slave address (8-bit form)
pub const I2C_ADDRESS_MAX: u8 = 0xF6;

/// Settle time after any EEPROM/RAM read or write, in milliseconds
pub const READ_WRITE_SETTLE_MS: u32 = 70;

/// Factory number of summed measurements
pub const DEFAULT_SUMMED_MEASUREMENTS: u8 = 0x04;
/// Factory measurement time delay, milliseconds
pub const DEFAULT_TIME_DELAY_MS: u8 = 0x01;

/// Single-byte commands understood by the chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    /// `w` - write to EEPROM
    EepromWrite = 0x77,
    /// `r` - read from EEPROM
    EepromRead = 0x72,
    /// `G` - write to RAM register
    RamWrite = 0x47,
    /// `g` - read from RAM register
    RamRead = 0x67,
    /// `S` - enter sleep mode
    Sleep = 0x53,
    /// `W` - exit sleep mode
    Wakeup = 0x57,
    /// `O` - update bridge offsets (set/reset now)
    SetReset = 0x4F,
    /// `C` - enter user calibration mode
    CalibrationStart = 0x43,
    /// `E` - exit user calibration mode
    CalibrationEnd = 0x45,
    /// `L` - save operational mode to EEPROM
    SaveOpMode = 0x4C,
    /// `A` - get data, compensate and compute a new heading
    GetData = 0x41,
}

impl Command {
    pub const ALL: [Command; 11] = [
        Command::EepromWrite,
        Command::EepromRead,
        Command::RamWrite,
        Command::RamRead,
        Command::Sleep,
        Command::Wakeup,
        Command::SetReset,
        Command::CalibrationStart,
        Command::CalibrationEnd,
        Command::SaveOpMode,
        Command::GetData,
    ];

    /// Wire byte for this command
    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// Minimum time the chip needs after receiving this command, in milliseconds
    pub const fn settle_ms(self) -> u32 {
        match self {
            Command::Sleep => 10,
            Command::Wakeup => 100,
            Command::SetReset => 6000,
            Command::CalibrationStart => 10,
            Command::CalibrationEnd => 14000,
            Command::SaveOpMode => 125,
            Command::GetData => 6000,
            Command::EepromWrite | Command::EepromRead | Command::RamWrite | Command::RamRead => {
                READ_WRITE_SETTLE_MS
            }
        }
    }
}

/// EEPROM locations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Eeprom {
    /// Slave address, 8-bit form (factory 0x42)
    I2cAddress = 0x00,
    XOffsetMsb = 0x01,
    XOffsetLsb = 0x02,
    YOffsetMsb = 0x03,
    YOffsetLsb = 0x04,
    /// Measurement delay, 0-255ms (factory 0x01)
    TimeDelay = 0x05,
    /// Number of summed measurements, 0-15 (factory 0x04)
    SummedMeasurements = 0x06,
    /// Software version, non-zero on production parts
    SoftwareVersion = 0x07,
    /// Power-up operational mode (factory 0x50)
    OperationMode = 0x08,
}

impl Eeprom {
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

/// RAM registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Ram {
    OperationalMode = 0x74,
    OutputMode = 0x4E,
}

impl Ram {
    pub const fn addr(self) -> u8 {
        self as u8
    }
}
