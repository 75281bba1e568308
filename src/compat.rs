//! Run the driver on a bus that only implements the embedded-hal 0.2 blocking I2C traits.

use core::fmt::Debug;

use embedded_hal_02::blocking::i2c::{Read, Write, WriteRead};
use embedded_hal_1::i2c::{ErrorKind, ErrorType, I2c, Operation, SevenBitAddress};

/// Wraps an embedded-hal 0.2 I2C bus as an embedded-hal 1.0 one.
///
/// Only transactions the 0.2 traits can express are accepted: a single write, a single
/// read, or a write followed by a read (sent as `WriteRead`, repeated start). Anything
/// longer fails with [`Hal02Error::Unsupported`] before touching the bus.
pub struct Hal02I2c<I2C> {
    i2c: I2C,
}

impl<I2C> Hal02I2c<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Hal02Error<E> {
    Bus(E),
    Unsupported,
}

impl<E: Debug> embedded_hal_1::i2c::Error for Hal02Error<E> {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

impl<I2C, E> ErrorType for Hal02I2c<I2C>
where
    I2C: Read<Error = E> + Write<Error = E> + WriteRead<Error = E>,
    E: Debug,
{
    type Error = Hal02Error<E>;
}

impl<I2C, E> I2c for Hal02I2c<I2C>
where
    I2C: Read<Error = E> + Write<Error = E> + WriteRead<Error = E>,
    E: Debug,
{
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        match operations {
            [] => Ok(()),
            [Operation::Write(bytes)] => {
                Write::write(&mut self.i2c, address, bytes).map_err(Hal02Error::Bus)
            }
            [Operation::Read(buf)] => {
                Read::read(&mut self.i2c, address, buf).map_err(Hal02Error::Bus)
            }
            [Operation::Write(bytes), Operation::Read(buf)] => {
                WriteRead::write_read(&mut self.i2c, address, bytes, buf).map_err(Hal02Error::Bus)
            }
            _ => Err(Hal02Error::Unsupported),
        }
    }

    fn write_read(
        &mut self,
        address: SevenBitAddress,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<(), Self::Error> {
        WriteRead::write_read(&mut self.i2c, address, write, read).map_err(Hal02Error::Bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{BusError, FakeBus};
    use crate::{regs, TouchPoint, DEFAULT_ADDR, DEFAULT_THRESHOLD, FT6236, TOUCH_DATA_LEN};

    impl Write for FakeBus {
        type Error = BusError;

        fn write(&mut self, _address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
            if self.fail {
                return Err(BusError);
            }
            self.write_bytes(bytes);
            Ok(())
        }
    }

    impl Read for FakeBus {
        type Error = BusError;

        fn read(&mut self, _address: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
            if self.fail {
                return Err(BusError);
            }
            self.read_bytes(buffer);
            Ok(())
        }
    }

    impl WriteRead for FakeBus {
        type Error = BusError;

        fn write_read(
            &mut self,
            address: u8,
            bytes: &[u8],
            buffer: &mut [u8],
        ) -> Result<(), Self::Error> {
            Write::write(self, address, bytes)?;
            Read::read(self, address, buffer)
        }
    }

    #[test]
    fn test_begin_over_hal02_bus() {
        let mut touch = FT6236::new_default(Hal02I2c::new(FakeBus::new()));

        assert_eq!(touch.begin(DEFAULT_THRESHOLD), Ok(true));
        let bus = touch.release().release();
        assert_eq!(bus.regs[usize::from(regs::THRESHHOLD)], DEFAULT_THRESHOLD);
    }

    #[test]
    fn test_get_point_over_hal02_bus() {
        let mut data = [0xFF; TOUCH_DATA_LEN];
        data[..7].copy_from_slice(&[0x00, 0x00, 0x01, 0x00, 0x64, 0x00, 0xC8]);
        let mut touch = FT6236::new_default(Hal02I2c::new(FakeBus::with_touch_data(data)));

        assert_eq!(touch.get_point(0), Ok(TouchPoint::new(100, 200)));
        assert_eq!(touch.get_point(1), Ok(TouchPoint::INVALID));
    }

    #[test]
    fn test_bus_error_is_wrapped() {
        let mut bus = FakeBus::new();
        bus.fail = true;
        let mut touch = FT6236::new_default(Hal02I2c::new(bus));

        assert_eq!(touch.touched(), Err(Hal02Error::Bus(BusError)));
    }

    #[test]
    fn test_write_read_uses_repeated_start() {
        let mut bus = Hal02I2c::new(FakeBus::new());
        let mut buf = [0u8; 1];
        let mut ops = [Operation::Write(&[regs::VENDID]), Operation::Read(&mut buf)];

        assert_eq!(bus.transaction(DEFAULT_ADDR, &mut ops), Ok(()));
        assert_eq!(buf, [0x11]);
    }

    #[test]
    fn test_longer_transaction_is_rejected() {
        let mut bus = Hal02I2c::new(FakeBus::new());
        let mut buf = [0u8; 1];
        let mut ops = [
            Operation::Write(&[regs::THRESHHOLD, 0x20]),
            Operation::Write(&[regs::VENDID]),
            Operation::Read(&mut buf),
        ];

        assert_eq!(
            bus.transaction(DEFAULT_ADDR, &mut ops),
            Err(Hal02Error::Unsupported)
        );
        // nothing reached the bus
        assert!(bus.release().writes.is_empty());
    }
}
