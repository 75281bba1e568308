//! embedded-hal driver for the FocalTech FT6206/FT6236/FT6236U capacitive touch controllers.
//!
//! The controller tracks up to two touch points. Each poll reads a 16-byte register dump
//! starting at the device mode register and decodes it into a [`ControllerState`].
//!
//! ```ignore
//! let mut touch = FT6236::new_default(i2c);
//! if !touch.begin(DEFAULT_THRESHOLD)? {
//!     // not a FocalTech FT62xx
//! }
//! loop {
//!     let p = touch.get_point(0)?;
//!     if p.is_valid() {
//!         // p.x, p.y
//!     }
//! }
//! ```
#![no_std]

use embedded_hal_1::i2c::I2c;

pub mod compat;

pub const DEFAULT_ADDR: u8 = 0x38;

/// Touch detection threshold written by [`FT6236::begin`] when the caller has no tuned value.
pub const DEFAULT_THRESHOLD: u8 = 128;

/// Reserved coordinate/ID value meaning "no valid data".
pub const INVALID_STATE: u16 = 0xFFFF;

/// Number of touch slots tracked by the chip.
pub const MAX_TOUCHES: usize = 2;

/// Length of the touch data dump read by [`FT6236::read_data`].
pub const TOUCH_DATA_LEN: usize = 16;

pub mod regs {
    pub const DEV_MODE: u8 = 0x00;
    pub const TD_STATUS: u8 = 0x02;
    /// First byte of touch point 0, each point occupies 6 registers.
    pub const P1_XH: u8 = 0x03;
    pub const POINT_STRIDE: u8 = 6;

    pub const THRESHHOLD: u8 = 0x80;
    pub const POINTRATE: u8 = 0x88;
    pub const CHIPID: u8 = 0xA3;
    pub const FIRMVERS: u8 = 0xA6;
    pub const VENDID: u8 = 0xA8;
}

const VENDID_FOCALTECH: u8 = 0x11;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ChipId {
    FT6206 = 0x06,
    FT6236 = 0x36,
    FT6236U = 0x64,
}

impl ChipId {
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0x06 => Some(Self::FT6206),
            0x36 => Some(Self::FT6236),
            0x64 => Some(Self::FT6236U),
            _ => None,
        }
    }
}

/// A touch coordinate. Either field set to [`INVALID_STATE`] means no touch.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchPoint {
    pub x: u16,
    pub y: u16,
}

impl TouchPoint {
    pub const INVALID: Self = Self {
        x: INVALID_STATE,
        y: INVALID_STATE,
    };

    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    pub fn is_valid(&self) -> bool {
        self.x != INVALID_STATE && self.y != INVALID_STATE
    }
}

impl Default for TouchPoint {
    fn default() -> Self {
        Self::INVALID
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Slot {
    pub x: u16,
    pub y: u16,
    /// Touch ID, 0 or 1
    pub id: u16,
}

impl Slot {
    pub const INVALID: Self = Self {
        x: INVALID_STATE,
        y: INVALID_STATE,
        id: INVALID_STATE,
    };

    pub fn is_valid(&self) -> bool {
        self.id != INVALID_STATE
    }

    pub fn point(&self) -> TouchPoint {
        TouchPoint::new(self.x, self.y)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerState {
    touch_count: u16,
    slots: [Slot; MAX_TOUCHES],
}

impl ControllerState {
    pub const UNREAD: Self = Self {
        touch_count: INVALID_STATE,
        slots: [Slot::INVALID; MAX_TOUCHES],
    };

    pub const NO_TOUCH: Self = Self {
        touch_count: 0,
        slots: [Slot::INVALID; MAX_TOUCHES],
    };

    /// Decode a register dump starting at [`regs::DEV_MODE`].
    pub fn decode(buf: &[u8; TOUCH_DATA_LEN]) -> Self {
        let count = buf[usize::from(regs::TD_STATUS)];
        if count == 0 || usize::from(count) > MAX_TOUCHES {
            return Self::NO_TOUCH;
        }

        let mut slots = [Slot::INVALID; MAX_TOUCHES];
        for (i, slot) in slots.iter_mut().enumerate() {
            let base = usize::from(regs::P1_XH) + i * usize::from(regs::POINT_STRIDE);
            let raw = &buf[base..base + 4];

            // both slots are decoded whatever the count says
            let id = raw[2] >> 4;
            if id > 1 {
                continue;
            }
            *slot = Slot {
                x: (u16::from(raw[0] & 0x0f) << 8) | u16::from(raw[1]),
                y: (u16::from(raw[2] & 0x0f) << 8) | u16::from(raw[3]),
                id: u16::from(id),
            };
        }

        Self {
            touch_count: u16::from(count),
            slots,
        }
    }

    /// 0, 1 or 2 after a read, [`INVALID_STATE`] before the first one.
    pub fn touch_count(&self) -> u16 {
        self.touch_count
    }

    pub fn slot(&self, nth: usize) -> Option<&Slot> {
        self.slots.get(nth)
    }

    pub fn slots(&self) -> &[Slot; MAX_TOUCHES] {
        &self.slots
    }
}

impl Default for ControllerState {
    fn default() -> Self {
        Self::UNREAD
    }
}

/// Identification and configuration registers, see [`FT6236::device_info`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceInfo {
    pub vendor_id: u8,
    pub chip_id: u8,
    pub firmware_version: u8,
    /// Active report rate in Hz
    pub point_rate: u8,
    pub threshold: u8,
}

/// FT62xx driver.
///
/// Bus errors from `I2C` are returned as-is; the driver never retries.
pub struct FT6236<I2C> {
    i2c: I2C,
    addr: u8,
    state: ControllerState,
    chip: Option<ChipId>,
}

impl<I2C> FT6236<I2C>
where
    I2C: I2c,
{
    pub fn new(i2c: I2C, addr: u8) -> Self {
        Self {
            i2c,
            addr,
            state: ControllerState::UNREAD,
            chip: None,
        }
    }

    pub fn new_default(i2c: I2C) -> Self {
        Self::new(i2c, DEFAULT_ADDR)
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Write the touch threshold, then check vendor and chip ID.
    ///
    /// Returns `Ok(false)` if the attached device is not a supported FocalTech controller.
    /// The touch state is left as it is.
    pub fn begin(&mut self, threshold: u8) -> Result<bool, I2C::Error> {
        self.chip = None;
        self.write_register8(regs::THRESHHOLD, threshold)?;

        let vendor_id = self.read_register8(regs::VENDID)?;
        if vendor_id != VENDID_FOCALTECH {
            #[cfg(feature = "defmt")]
            defmt::warn!("invalid vendid 0x{:02x}", vendor_id);
            return Ok(false);
        }

        let chip_id = self.read_register8(regs::CHIPID)?;
        match ChipId::from_u8(chip_id) {
            Some(chip) => {
                self.chip = Some(chip);
                Ok(true)
            }
            None => {
                #[cfg(feature = "defmt")]
                defmt::warn!("invalid chipid 0x{:02x}", chip_id);
                Ok(false)
            }
        }
    }

    /// Whether the last [`begin`](Self::begin) found a supported chip.
    pub fn is_initialized(&self) -> bool {
        self.chip.is_some()
    }

    pub fn chip_id(&self) -> Option<ChipId> {
        self.chip
    }

    /// Number of touches, 0, 1 or 2. Does not touch the decoded state.
    pub fn touched(&mut self) -> Result<u8, I2C::Error> {
        let n = self.read_register8(regs::TD_STATUS)?;
        if usize::from(n) > MAX_TOUCHES {
            Ok(0)
        } else {
            Ok(n)
        }
    }

    /// Read the 16-byte touch dump and replace the decoded state.
    ///
    /// On a bus error the previous state is kept.
    pub fn read_data(&mut self) -> Result<(), I2C::Error> {
        let mut buf = [0u8; TOUCH_DATA_LEN];
        self.i2c.write(self.addr, &[regs::DEV_MODE])?;
        self.i2c.read(self.addr, &mut buf)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("touch regs: {:02x}", buf);

        self.state = ControllerState::decode(&buf);
        Ok(())
    }

    /// Read the chip and return touch point `nth` (0 or 1).
    ///
    /// Always performs a fresh [`read_data`](Self::read_data). Returns
    /// [`TouchPoint::INVALID`] when nothing is touched, `nth > 1`, or the slot is inactive.
    pub fn get_point(&mut self, nth: u8) -> Result<TouchPoint, I2C::Error> {
        self.read_data()?;

        if self.state.touch_count == 0 || usize::from(nth) >= MAX_TOUCHES {
            return Ok(TouchPoint::INVALID);
        }
        Ok(self.state.slots[usize::from(nth)].point())
    }

    pub fn get_point0(&mut self) -> Result<TouchPoint, I2C::Error> {
        self.get_point(0)
    }

    pub fn get_point1(&mut self) -> Result<TouchPoint, I2C::Error> {
        self.get_point(1)
    }

    /// Decoded state of the last successful read, `None` if the chip was never read.
    pub fn state(&self) -> Option<&ControllerState> {
        if self.state.touch_count == INVALID_STATE {
            None
        } else {
            Some(&self.state)
        }
    }

    pub fn firmware_version(&mut self) -> Result<u8, I2C::Error> {
        self.read_register8(regs::FIRMVERS)
    }

    pub fn point_rate(&mut self) -> Result<u8, I2C::Error> {
        self.read_register8(regs::POINTRATE)
    }

    pub fn threshold(&mut self) -> Result<u8, I2C::Error> {
        self.read_register8(regs::THRESHHOLD)
    }

    pub fn set_threshold(&mut self, threshold: u8) -> Result<(), I2C::Error> {
        self.write_register8(regs::THRESHHOLD, threshold)
    }

    pub fn device_info(&mut self) -> Result<DeviceInfo, I2C::Error> {
        let info = DeviceInfo {
            vendor_id: self.read_register8(regs::VENDID)?,
            chip_id: self.read_register8(regs::CHIPID)?,
            firmware_version: self.firmware_version()?,
            point_rate: self.point_rate()?,
            threshold: self.threshold()?,
        };

        #[cfg(feature = "defmt")]
        defmt::info!(
            "vendid 0x{:02x}, chipid 0x{:02x}, firmware {}, point rate {}Hz, threshold {}",
            info.vendor_id,
            info.chip_id,
            info.firmware_version,
            info.point_rate,
            info.threshold
        );

        Ok(info)
    }

    pub fn read_register8(&mut self, reg: u8) -> Result<u8, I2C::Error> {
        let mut buf = [0u8; 1];
        self.i2c.write_read(self.addr, &[reg], &mut buf)?;
        Ok(buf[0])
    }

    pub fn write_register8(&mut self, reg: u8, val: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.addr, &[reg, val])
    }
}
