//! Bit-packed configuration registers
//!
//! Both registers are built from raw bytes read off the chip and turned back into
//! bytes when written. Construction never fails: reserved bits are masked off and
//! the invalid operational mode pattern is coerced to standby.

/// Operational mode, bits 0-1 of the operational mode register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum OperationalMode {
    /// Measure only on a Get Data command (factory default)
    Standby = 0x00,
    /// Measure again automatically after every read
    Query = 0x01,
    /// Free-running at the configured [`MeasurementRate`]
    Continuous = 0x02,
    /// Invalid; never stored in an [`OperationalModeRegister`]
    NotAllowed = 0x03,
}

impl OperationalMode {
    const fn from_bits(bits: u8) -> Self {
        match bits & MODE_MASK {
            0x00 => OperationalMode::Standby,
            0x01 => OperationalMode::Query,
            0x02 => OperationalMode::Continuous,
            _ => OperationalMode::NotAllowed,
        }
    }
}

/// Continuous mode measurement rate, bits 5-6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MeasurementRate {
    Hz1 = 0x00,
    Hz5 = 0x20,
    Hz10 = 0x40,
    Hz20 = 0x60,
}

impl MeasurementRate {
    const fn from_bits(bits: u8) -> Self {
        match bits & RATE_MASK {
            0x00 => MeasurementRate::Hz1,
            0x20 => MeasurementRate::Hz5,
            0x40 => MeasurementRate::Hz10,
            _ => MeasurementRate::Hz20,
        }
    }
}

const MODE_MASK: u8 = 0x03;
const PERIODIC_SET_RESET: u8 = 0x10;
const RATE_MASK: u8 = 0x60;
const OPERATIONAL_MASK: u8 = MODE_MASK | PERIODIC_SET_RESET | RATE_MASK;

/// RAM register 0x74 / EEPROM 0x08
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OperationalModeRegister(u8);

impl OperationalModeRegister {
    /// Power-up value: standby, 10Hz, periodic set/reset on
    pub const FACTORY_DEFAULT: u8 = 0x50;

    /// Build from a raw register byte. Reserved bits are dropped and the
    /// `NotAllowed` mode pattern is coerced to `Standby`.
    pub const fn from_byte(value: u8) -> Self {
        let value = value & OPERATIONAL_MASK;
        if value & MODE_MASK == OperationalMode::NotAllowed as u8 {
            Self(value & !MODE_MASK)
        } else {
            Self(value)
        }
    }

    pub const fn to_byte(self) -> u8 {
        self.0
    }

    pub const fn mode(&self) -> OperationalMode {
        OperationalMode::from_bits(self.0)
    }

    /// Change the mode. `NotAllowed` is ignored and the current mode kept.
    pub fn set_mode(&mut self, mode: OperationalMode) {
        if mode == OperationalMode::NotAllowed {
            return;
        }
        self.0 = (self.0 & !MODE_MASK) | mode as u8;
    }

    /// Only used by the chip in continuous mode, but always stored
    pub const fn rate(&self) -> MeasurementRate {
        MeasurementRate::from_bits(self.0)
    }

    pub fn set_rate(&mut self, rate: MeasurementRate) {
        self.0 = (self.0 & !RATE_MASK) | rate as u8;
    }

    pub const fn periodic_set_reset(&self) -> bool {
        self.0 & PERIODIC_SET_RESET != 0
    }

    pub fn set_periodic_set_reset(&mut self, enabled: bool) {
        if enabled {
            self.0 |= PERIODIC_SET_RESET;
        } else {
            self.0 &= !PERIODIC_SET_RESET;
        }
    }
}

impl Default for OperationalModeRegister {
    fn default() -> Self {
        Self::from_byte(Self::FACTORY_DEFAULT)
    }
}

impl From<u8> for OperationalModeRegister {
    fn from(value: u8) -> Self {
        Self::from_byte(value)
    }
}

impl From<OperationalModeRegister> for u8 {
    fn from(register: OperationalModeRegister) -> Self {
        register.to_byte()
    }
}

/// What a data read returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum OutputDataMode {
    /// Heading in tenths of a degree, 0-3599
    Heading = 0x00,
    /// Raw X magnetometer ADC counts
    RawX = 0x01,
    /// Raw Y magnetometer ADC counts
    RawY = 0x02,
    /// X magnetometer data with calibration offsets and scaling applied
    CompensatedX = 0x03,
    /// Y magnetometer data with calibration offsets and scaling applied
    CompensatedY = 0x04,
}

const OUTPUT_MASK: u8 = 0x07;

/// RAM register 0x4E
///
/// Holds the masked byte as read. Patterns 5-7 name no mode; they survive a
/// round trip and [`value`](Self::value) reports them as `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputDataModeRegister(u8);

impl OutputDataModeRegister {
    pub const FACTORY_DEFAULT: u8 = 0x00;

    pub const fn new(value: OutputDataMode) -> Self {
        Self(value as u8)
    }

    pub const fn from_byte(value: u8) -> Self {
        Self(value & OUTPUT_MASK)
    }

    pub const fn to_byte(self) -> u8 {
        self.0
    }

    /// Selected output, `None` for an unassigned pattern
    pub const fn value(&self) -> Option<OutputDataMode> {
        match self.0 {
            0x00 => Some(OutputDataMode::Heading),
            0x01 => Some(OutputDataMode::RawX),
            0x02 => Some(OutputDataMode::RawY),
            0x03 => Some(OutputDataMode::CompensatedX),
            0x04 => Some(OutputDataMode::CompensatedY),
            _ => None,
        }
    }

    pub fn set_value(&mut self, value: OutputDataMode) {
        self.0 = value as u8;
    }
}

impl Default for OutputDataModeRegister {
    fn default() -> Self {
        Self::from_byte(Self::FACTORY_DEFAULT)
    }
}

impl From<u8> for OutputDataModeRegister {
    fn from(value: u8) -> Self {
        Self::from_byte(value)
    }
}

impl From<OutputDataMode> for OutputDataModeRegister {
    fn from(value: OutputDataMode) -> Self {
        Self::new(value)
    }
}

impl From<OutputDataModeRegister> for u8 {
    fn from(register: OutputDataModeRegister) -> Self {
        register.to_byte()
    }
}
