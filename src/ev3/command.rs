use super::{Error, Result, CHECKSUM_SEED, HEARTBEAT_TIMEOUT};
use crate::link::{get_byte, Link};
use crate::timer::Timer;

/// Reads the payload announced by `frame_byte` into `buf`, then the checksum
/// byte. Every byte must arrive within the heartbeat timeout.
///
/// `buf` is only meaningful on `Ok`.
pub fn read_command<L, T>(
    link: &mut L,
    timer: &mut T,
    frame_byte: u8,
    buf: &mut [u8],
) -> Result<()>
where
    L: Link + ?Sized,
    T: Timer + ?Sized,
{
    let mut crc = CHECKSUM_SEED ^ frame_byte;
    for slot in buf.iter_mut() {
        *slot = get_byte(link, timer, HEARTBEAT_TIMEOUT)?;
        crc ^= *slot;
    }
    let received = get_byte(link, timer, HEARTBEAT_TIMEOUT)?;
    if received != crc {
        return Err(Error::CrcError);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;
    use crate::ev3::frame::{checksum, make_command};
    use crate::ev3::CMD_WRITE;
    use crate::mock::{MockLink, MockTimer};
    use std::vec::Vec;

    fn message(payload: &[u8]) -> Vec<u8> {
        let mut msg = Vec::new();
        msg.push(make_command(CMD_WRITE, payload.len()));
        msg.extend_from_slice(payload);
        msg.push(checksum(&msg));
        msg
    }

    #[test]
    fn well_formed_command_is_read() {
        let msg = message(&[0x11, 0x22, 0x33, 0x44]);
        let mut link = MockLink::new();
        link.feed(&msg[1..]);
        let mut timer = MockTimer::new();
        let mut buf = [0u8; 4];
        assert_eq!(read_command(&mut link, &mut timer, msg[0], &mut buf), Ok(()));
        assert_eq!(buf, [0x11, 0x22, 0x33, 0x44]);
        assert_eq!(timer.now().ticks(), 0);
    }

    #[test]
    fn any_corrupted_byte_is_rejected() {
        let msg = message(&[0x20, 0x01]);
        for i in 1..msg.len() {
            for bit in 0..8 {
                let mut corrupted = msg.clone();
                corrupted[i] ^= 1 << bit;
                let mut link = MockLink::new();
                link.feed(&corrupted[1..]);
                let mut buf = [0u8; 2];
                assert_eq!(
                    read_command(&mut link, &mut MockTimer::new(), corrupted[0], &mut buf),
                    Err(Error::CrcError)
                );
            }
        }
    }

    #[test]
    fn corrupted_frame_byte_is_rejected() {
        let msg = message(&[0x20, 0x01]);
        let mut link = MockLink::new();
        link.feed(&msg[1..]);
        let mut buf = [0u8; 2];
        assert_eq!(
            read_command(&mut link, &mut MockTimer::new(), msg[0] ^ 0x01, &mut buf),
            Err(Error::CrcError)
        );
    }

    #[test]
    fn missing_checksum_times_out() {
        let msg = message(&[0x43]);
        let mut link = MockLink::new();
        link.feed(&msg[1..msg.len() - 1]);
        let mut timer = MockTimer::new();
        let mut buf = [0u8; 1];
        assert_eq!(
            read_command(&mut link, &mut timer, msg[0], &mut buf),
            Err(Error::Timeout)
        );
        assert_eq!(timer.now().ticks(), HEARTBEAT_TIMEOUT.ticks());
    }
}
