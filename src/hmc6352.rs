use embedded_hal_async::{delay::DelayNs, i2c::I2c};
use nalgebra::Vector2;

use crate::heading::Heading;
use crate::reg_data::hmc6352::*;
use crate::registers::{
    OperationalMode, OperationalModeRegister, OutputDataMode, OutputDataModeRegister,
};

#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Hmc6352Error<E> {
    /// I2C bus error
    I2c(E),

    /// Software version read back as zero: no chip, or wrong address
    DeviceNotDetected,

    /// Slave address outside 0x10..=0xF6, nothing was written
    InvalidAddress(u8),

    /// Magnetometer read requested while the chip outputs heading, or an
    /// unassigned output mode
    NotMagnetometerOutput,
}

/// How a heading read talks to the chip, derived from the cached registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadStrategy {
    /// Send Get Data, wait for the measurement, then read
    Standby,
    /// Read the previous result, then trigger the next measurement
    Query,
    /// Read the latest free-running result
    Continuous,
    /// Output mode is not heading; no bus access, heading is zero
    Suppressed,
}

impl ReadStrategy {
    pub const fn select(
        operational_mode: OperationalModeRegister,
        output_mode: OutputDataModeRegister,
    ) -> Self {
        match output_mode.value() {
            Some(OutputDataMode::Heading) => Self::for_mode(operational_mode.mode()),
            _ => ReadStrategy::Suppressed,
        }
    }

    pub(crate) const fn for_mode(mode: OperationalMode) -> Self {
        match mode {
            OperationalMode::Standby => ReadStrategy::Standby,
            OperationalMode::Query => ReadStrategy::Query,
            OperationalMode::Continuous => ReadStrategy::Continuous,
            OperationalMode::NotAllowed => ReadStrategy::Suppressed,
        }
    }
}

/// HMC6352 digital compass
///
/// The chip is half-duplex with long settle times; every call runs to completion
/// on the bus (and through its delay) before returning. Share it between tasks
/// only behind a mutex.
#[derive(Debug)]
pub struct Hmc6352<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    operational_mode: OperationalModeRegister,
    output_mode: OutputDataModeRegister,
    strategy: ReadStrategy,
    software_version: u8,
    disabled: bool,
}

impl<I2C, D, CommE> Hmc6352<I2C, D>
where
    I2C: I2c<Error = CommE>,
    D: DelayNs,
    CommE: core::fmt::Debug,
{
    /// Detect and initialise a chip at the factory address
    pub async fn new(i2c: I2C, delay: D) -> Result<Self, Hmc6352Error<CommE>> {
        Self::new_with_addr(i2c, delay, I2C_ADDRESS).await
    }

    /// Same as `new`, with a 7-bit bus address
    pub async fn new_with_addr(
        i2c: I2C,
        delay: D,
        address: u8,
    ) -> Result<Self, Hmc6352Error<CommE>> {
        let operational_mode = OperationalModeRegister::default();
        let output_mode = OutputDataModeRegister::default();
        let mut dev = Self {
            i2c,
            delay,
            address,
            operational_mode,
            output_mode,
            strategy: ReadStrategy::select(operational_mode, output_mode),
            software_version: 0,
            disabled: false,
        };
        dev.init().await?;
        Ok(dev)
    }

    async fn init(&mut self) -> Result<(), Hmc6352Error<CommE>> {
        let version = self
            .read_register(Command::EepromRead, Eeprom::SoftwareVersion.addr())
            .await?;
        if version == 0 {
            #[cfg(feature = "defmt")]
            defmt::warn!("no HMC6352 at {=u8:#x}", self.address);
            return Err(Hmc6352Error::DeviceNotDetected);
        }
        self.software_version = version;

        self.update_bridge_offsets().await?;

        self.operational_mode = OperationalModeRegister::from_byte(
            self.read_register(Command::RamRead, Ram::OperationalMode.addr())
                .await?,
        );
        self.output_mode = OutputDataModeRegister::from_byte(
            self.read_register(Command::RamRead, Ram::OutputMode.addr())
                .await?,
        );
        self.rebuild_strategy();

        #[cfg(feature = "defmt")]
        defmt::info!(
            "HMC6352 v{} at {=u8:#x}: {} / {}",
            version,
            self.address,
            self.operational_mode,
            self.output_mode
        );
        Ok(())
    }

    /// Consume the driver and hand back the bus and delay
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Version byte read during detection, always non-zero
    pub fn software_version(&self) -> u8 {
        self.software_version
    }

    pub fn operational_mode(&self) -> OperationalModeRegister {
        self.operational_mode
    }

    pub fn output_data_mode(&self) -> OutputDataModeRegister {
        self.output_mode
    }

    pub fn read_strategy(&self) -> ReadStrategy {
        self.strategy
    }

    /// Whether the chip was last put to sleep through this driver
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Write the operational mode to RAM, optionally making it the power-up
    /// default with the Save Op Mode command.
    pub async fn set_operational_mode(
        &mut self,
        mode: OperationalModeRegister,
        save_to_eeprom: bool,
    ) -> Result<(), Hmc6352Error<CommE>> {
        self.write_register(Command::RamWrite, Ram::OperationalMode.addr(), mode.to_byte())
            .await?;
        self.operational_mode = mode;
        self.rebuild_strategy();

        if save_to_eeprom {
            self.write_command(Command::SaveOpMode, true).await?;
        }
        Ok(())
    }

    pub async fn set_output_data_mode(
        &mut self,
        mode: OutputDataModeRegister,
    ) -> Result<(), Hmc6352Error<CommE>> {
        self.write_register(Command::RamWrite, Ram::OutputMode.addr(), mode.to_byte())
            .await?;
        self.output_mode = mode;
        self.rebuild_strategy();
        Ok(())
    }

    /// Program a new slave address (8-bit form) into EEPROM.
    /// The chip only picks it up after a power cycle.
    pub async fn set_i2c_address(&mut self, address: u8) -> Result<(), Hmc6352Error<CommE>> {
        if !(I2C_ADDRESS_MIN..=I2C_ADDRESS_MAX).contains(&address) {
            #[cfg(feature = "defmt")]
            defmt::debug!("rejected slave address {=u8:#x}", address);
            return Err(Hmc6352Error::InvalidAddress(address));
        }
        self.write_register(Command::EepromWrite, Eeprom::I2cAddress.addr(), address)
            .await
    }

    /// Number of summed (averaged) measurements, 0-15
    pub async fn summed_measurements(&mut self) -> Result<u8, Hmc6352Error<CommE>> {
        self.read_register(Command::EepromRead, Eeprom::SummedMeasurements.addr())
            .await
    }

    /// Only the low nibble is written; larger values wrap silently
    pub async fn set_summed_measurements(&mut self, count: u8) -> Result<(), Hmc6352Error<CommE>> {
        self.write_register(
            Command::EepromWrite,
            Eeprom::SummedMeasurements.addr(),
            count & 0x0F,
        )
        .await
    }

    /// Delay between a measurement request and the measurement, milliseconds
    pub async fn time_delay(&mut self) -> Result<u8, Hmc6352Error<CommE>> {
        self.read_register(Command::EepromRead, Eeprom::TimeDelay.addr())
            .await
    }

    pub async fn set_time_delay(&mut self, ms: u8) -> Result<(), Hmc6352Error<CommE>> {
        self.write_register(Command::EepromWrite, Eeprom::TimeDelay.addr(), ms)
            .await
    }

    /// Hard-iron offsets left by the last user calibration
    pub async fn magnetometer_offsets(&mut self) -> Result<Vector2<i16>, Hmc6352Error<CommE>> {
        let mut raw = [0u8; 4];
        let regs = [
            Eeprom::XOffsetMsb,
            Eeprom::XOffsetLsb,
            Eeprom::YOffsetMsb,
            Eeprom::YOffsetLsb,
        ];
        for (byte, reg) in raw.iter_mut().zip(regs) {
            *byte = self.read_register(Command::EepromRead, reg.addr()).await?;
        }
        Ok(Vector2::new(
            i16::from_be_bytes([raw[0], raw[1]]),
            i16::from_be_bytes([raw[2], raw[3]]),
        ))
    }

    pub async fn sleep(&mut self) -> Result<(), Hmc6352Error<CommE>> {
        self.set_shutdown(true).await
    }

    pub async fn wake(&mut self) -> Result<(), Hmc6352Error<CommE>> {
        self.set_shutdown(false).await
    }

    /// Put the chip to sleep (`true`) or wake it up (`false`)
    pub async fn set_shutdown(&mut self, shutdown: bool) -> Result<(), Hmc6352Error<CommE>> {
        let cmd = if shutdown {
            Command::Sleep
        } else {
            Command::Wakeup
        };
        self.write_command(cmd, true).await?;
        self.disabled = shutdown;
        Ok(())
    }

    /// Enter user calibration mode
    pub async fn begin_calibration(&mut self) -> Result<(), Hmc6352Error<CommE>> {
        self.write_command(Command::CalibrationStart, true).await
    }

    /// Leave user calibration mode; the chip stores new offsets and scale factors
    pub async fn end_calibration(&mut self) -> Result<(), Hmc6352Error<CommE>> {
        self.write_command(Command::CalibrationEnd, true).await
    }

    /// Force a set/reset pulse to realign the sensor bridges
    pub async fn update_bridge_offsets(&mut self) -> Result<(), Hmc6352Error<CommE>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("set/reset");
        self.write_command(Command::SetReset, true).await
    }

    /// Read the heading using the strategy of the current modes.
    ///
    /// In query mode the value returned is the one measured after the previous
    /// read. Outside heading output mode this returns zero without touching the bus.
    pub async fn heading(&mut self) -> Result<Heading, Hmc6352Error<CommE>> {
        let raw = self.acquire(self.strategy).await?;
        Ok(Heading::from_tenths(u16::from_be_bytes(raw)))
    }

    /// Read the magnetometer axis selected by the output mode, as signed ADC counts
    pub async fn read_magnetometer(&mut self) -> Result<i16, Hmc6352Error<CommE>> {
        match self.output_mode.value() {
            Some(OutputDataMode::Heading) | None => {
                return Err(Hmc6352Error::NotMagnetometerOutput)
            }
            Some(_) => {}
        }
        let raw = self
            .acquire(ReadStrategy::for_mode(self.operational_mode.mode()))
            .await?;
        Ok(i16::from_be_bytes(raw))
    }

    async fn acquire(&mut self, strategy: ReadStrategy) -> Result<[u8; 2], Hmc6352Error<CommE>> {
        match strategy {
            ReadStrategy::Standby => {
                self.write_command(Command::GetData, true).await?;
                self.read_word().await
            }
            ReadStrategy::Query => {
                let data = self.read_word().await?;
                self.write_command(Command::GetData, false).await?;
                Ok(data)
            }
            ReadStrategy::Continuous => self.read_word().await,
            ReadStrategy::Suppressed => Ok([0; 2]),
        }
    }

    fn rebuild_strategy(&mut self) {
        self.strategy = ReadStrategy::select(self.operational_mode, self.output_mode);
        #[cfg(feature = "defmt")]
        defmt::debug!("read strategy {}", self.strategy);
    }

    pub(crate) async fn pause(&mut self, ms: u32) {
        self.delay.delay_ms(ms).await;
    }

    async fn write_command(&mut self, cmd: Command, settle: bool) -> Result<(), Hmc6352Error<CommE>> {
        self.i2c
            .write(self.address, &[cmd.byte()])
            .await
            .map_err(Hmc6352Error::I2c)?;
        if settle {
            self.delay.delay_ms(cmd.settle_ms()).await;
        }
        Ok(())
    }

    /// Read a single EEPROM or RAM location
    async fn read_register(&mut self, cmd: Command, reg: u8) -> Result<u8, Hmc6352Error<CommE>> {
        self.i2c
            .write(self.address, &[cmd.byte(), reg])
            .await
            .map_err(Hmc6352Error::I2c)?;
        self.delay.delay_ms(READ_WRITE_SETTLE_MS).await;

        let mut buf = [0u8; 1];
        self.i2c
            .read(self.address, &mut buf)
            .await
            .map_err(Hmc6352Error::I2c)?;
        Ok(buf[0])
    }

    async fn write_register(
        &mut self,
        cmd: Command,
        reg: u8,
        val: u8,
    ) -> Result<(), Hmc6352Error<CommE>> {
        self.i2c
            .write(self.address, &[cmd.byte(), reg, val])
            .await
            .map_err(Hmc6352Error::I2c)?;
        self.delay.delay_ms(READ_WRITE_SETTLE_MS).await;
        Ok(())
    }

    /// Two-byte data read, MSB first
    async fn read_word(&mut self) -> Result<[u8; 2], Hmc6352Error<CommE>> {
        let mut buf = [0u8; 2];
        self.i2c
            .read(self.address, &mut buf)
            .await
            .map_err(Hmc6352Error::I2c)?;
        Ok(buf)
    }
}
