//! Actuator interface to the physical pan/tilt head

use std::io::Write;
use std::thread;
use std::time::Duration;

use crate::error::{EngineError, Result};
use crate::visca;

/// Sink for motion/zoom commands.
///
/// Implementations must suppress redundant repeated calls with identical
/// values so the controller cannot saturate the transport.
pub trait Actuator: Send {
    /// Drive pan/tilt at the given signed speeds; (0, 0) is the explicit stop
    fn set_motion(&mut self, pan: i32, tilt: i32) -> Result<()>;

    /// Positive zooms in, negative zooms out, 0 stops
    fn set_zoom(&mut self, speed: i32) -> Result<()>;

    /// Drive to the preset home position
    fn home(&mut self) -> Result<()>;

    /// Toggle the vendor on-screen menu
    fn open_menu(&mut self) -> Result<()>;

    /// Stop all motion
    fn stop(&mut self) -> Result<()>;
}

/// VISCA actuator over any byte transport (typically a serial port opened
/// as a `Write`). Each write is followed by a short settle delay, bounding
/// the command rate the head sees.
pub struct ViscaActuator<W: Write + Send> {
    transport: W,
    settle: Duration,
    last_pan: i32,
    last_tilt: i32,
    last_zoom: i32,
}

impl<W: Write + Send> ViscaActuator<W> {
    pub fn new(transport: W) -> Self {
        Self::with_settle_delay(transport, Duration::from_millis(30))
    }

    /// Override the post-write settle delay (tests use zero)
    pub fn with_settle_delay(transport: W, settle: Duration) -> Self {
        Self {
            transport,
            settle,
            last_pan: 0,
            last_tilt: 0,
            last_zoom: 0,
        }
    }

    pub fn into_transport(self) -> W {
        self.transport
    }

    fn send(&mut self, frame: &[u8]) -> Result<()> {
        self.transport
            .write_all(frame)
            .and_then(|_| self.transport.flush())
            .map_err(|e| {
                log::warn!("transport write failed: {e}");
                EngineError::ActuatorUnavailable
            })?;
        log::debug!("sent {}", visca::to_hex(frame));
        if !self.settle.is_zero() {
            thread::sleep(self.settle);
        }
        Ok(())
    }
}

impl<W: Write + Send> Actuator for ViscaActuator<W> {
    fn set_motion(&mut self, pan: i32, tilt: i32) -> Result<()> {
        if pan == self.last_pan && tilt == self.last_tilt {
            return Ok(());
        }
        self.last_pan = pan;
        self.last_tilt = tilt;
        self.send(&visca::pan_tilt(pan, tilt))
    }

    fn set_zoom(&mut self, speed: i32) -> Result<()> {
        if speed == self.last_zoom {
            return Ok(());
        }
        self.last_zoom = speed;
        self.send(&visca::zoom(speed))
    }

    fn home(&mut self) -> Result<()> {
        self.send(&visca::home())
    }

    fn open_menu(&mut self) -> Result<()> {
        self.send(&visca::menu_toggle())
    }

    fn stop(&mut self) -> Result<()> {
        self.last_pan = 0;
        self.last_tilt = 0;
        self.last_zoom = 0;
        self.send(&visca::stop())
    }
}

/// Actuator for running without a connected head: every call is a no-op.
pub struct NullActuator;

impl Actuator for NullActuator {
    fn set_motion(&mut self, _pan: i32, _tilt: i32) -> Result<()> {
        Ok(())
    }

    fn set_zoom(&mut self, _speed: i32) -> Result<()> {
        Ok(())
    }

    fn home(&mut self) -> Result<()> {
        Ok(())
    }

    fn open_menu(&mut self) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actuator() -> ViscaActuator<Vec<u8>> {
        ViscaActuator::with_settle_delay(Vec::new(), Duration::ZERO)
    }

    #[test]
    fn motion_writes_expected_frame() {
        let mut a = actuator();
        a.set_motion(8, -6).unwrap();
        let bytes = a.into_transport();
        assert_eq!(
            bytes,
            vec![0x81, 0x01, 0x06, 0x01, 0x08, 0x06, 0x02, 0x02, 0xFF]
        );
    }

    #[test]
    fn redundant_motion_is_suppressed() {
        let mut a = actuator();
        a.set_motion(8, -6).unwrap();
        a.set_motion(8, -6).unwrap();
        a.set_motion(8, -6).unwrap();
        let bytes = a.into_transport();
        assert_eq!(bytes.len(), 9, "identical commands must hit the wire once");
    }

    #[test]
    fn changed_motion_is_sent() {
        let mut a = actuator();
        a.set_motion(8, -6).unwrap();
        a.set_motion(9, -6).unwrap();
        assert_eq!(a.into_transport().len(), 18);
    }

    #[test]
    fn stop_resets_suppression_state() {
        let mut a = actuator();
        a.set_motion(8, 0).unwrap();
        a.stop().unwrap();
        // After a stop, re-sending the previous speeds must go out again
        a.set_motion(8, 0).unwrap();
        assert_eq!(a.into_transport().len(), 27);
    }

    #[test]
    fn initial_stop_via_set_motion_is_suppressed() {
        // The head boots stopped; an initial (0, 0) has nothing to change
        let mut a = actuator();
        a.set_motion(0, 0).unwrap();
        assert!(a.into_transport().is_empty());
    }

    #[test]
    fn redundant_zoom_is_suppressed() {
        let mut a = actuator();
        a.set_zoom(3).unwrap();
        a.set_zoom(3).unwrap();
        a.set_zoom(0).unwrap();
        assert_eq!(a.into_transport().len(), 12);
    }

    #[test]
    fn failing_transport_reports_unavailable() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let mut a = ViscaActuator::with_settle_delay(Broken, Duration::ZERO);
        assert!(matches!(
            a.set_motion(5, 5),
            Err(EngineError::ActuatorUnavailable)
        ));
    }
}
