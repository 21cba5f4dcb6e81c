//! Bit-exact VISCA command frames
//!
//! Every frame starts with 0x81 (camera address broadcast) and ends with
//! 0xFF. The direction bytes are decoupled from the command sign: the sign
//! selects which direction byte is used, the magnitude becomes the speed
//! byte.

/// Device cap on pan speed
pub const PAN_SPEED_MAX: i32 = 24;
/// Device cap on tilt speed
pub const TILT_SPEED_MAX: i32 = 20;
/// Device cap on zoom speed
pub const ZOOM_SPEED_MAX: i32 = 7;

const HEADER: u8 = 0x81;
const TERMINATOR: u8 = 0xFF;

const PAN_LEFT: u8 = 0x01;
const PAN_RIGHT: u8 = 0x02;
const TILT_UP: u8 = 0x01;
const TILT_DOWN: u8 = 0x02;
const DIR_STOP: u8 = 0x03;

/// Motion frame: `81 01 06 01 <panSpeed> <tiltSpeed> <panDir> <tiltDir> FF`.
/// Speeds are clamped to the device caps; (0, 0) produces the explicit stop
/// frame with both direction bytes 0x03.
pub fn pan_tilt(pan: i32, tilt: i32) -> [u8; 9] {
    let pan_speed = pan.abs().min(PAN_SPEED_MAX) as u8;
    let tilt_speed = tilt.abs().min(TILT_SPEED_MAX) as u8;
    let pan_dir = match pan {
        p if p > 0 => PAN_RIGHT,
        p if p < 0 => PAN_LEFT,
        _ => DIR_STOP,
    };
    let tilt_dir = match tilt {
        t if t > 0 => TILT_UP,
        t if t < 0 => TILT_DOWN,
        _ => DIR_STOP,
    };
    [
        HEADER, 0x01, 0x06, 0x01, pan_speed, tilt_speed, pan_dir, tilt_dir, TERMINATOR,
    ]
}

/// Stop frame: motion frame with both speeds zero and both directions 0x03
pub fn stop() -> [u8; 9] {
    pan_tilt(0, 0)
}

/// Zoom frame: `81 01 04 07 <byte> FF`; `0x20|speed` zooms in, `0x30|speed`
/// zooms out, 0x00 stops.
pub fn zoom(speed: i32) -> [u8; 6] {
    let byte = match speed {
        s if s > 0 => 0x20 | (s.min(ZOOM_SPEED_MAX) as u8),
        s if s < 0 => 0x30 | ((-s).min(ZOOM_SPEED_MAX) as u8),
        _ => 0x00,
    };
    [HEADER, 0x01, 0x04, 0x07, byte, TERMINATOR]
}

/// Home frame: drive the head to its preset position
pub fn home() -> [u8; 5] {
    [HEADER, 0x01, 0x06, 0x04, TERMINATOR]
}

/// Vendor on-screen-menu toggle
pub fn menu_toggle() -> [u8; 6] {
    [HEADER, 0x01, 0x06, 0x06, 0x02, TERMINATOR]
}

/// Hex rendering of a command frame, for logs
pub fn to_hex(frame: &[u8]) -> String {
    frame
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn motion_frame_right_up() {
        assert_eq!(
            pan_tilt(10, 8),
            [0x81, 0x01, 0x06, 0x01, 0x0A, 0x08, 0x02, 0x01, 0xFF]
        );
    }

    #[test]
    fn motion_frame_left_down() {
        assert_eq!(
            pan_tilt(-6, -5),
            [0x81, 0x01, 0x06, 0x01, 0x06, 0x05, 0x01, 0x02, 0xFF]
        );
    }

    #[test]
    fn motion_frame_clamps_to_device_caps() {
        assert_eq!(
            pan_tilt(99, -99),
            [0x81, 0x01, 0x06, 0x01, 0x18, 0x14, 0x02, 0x02, 0xFF]
        );
    }

    #[test]
    fn stop_frame_bytes() {
        assert_eq!(
            stop(),
            [0x81, 0x01, 0x06, 0x01, 0x00, 0x00, 0x03, 0x03, 0xFF]
        );
    }

    #[test]
    fn single_axis_motion_stops_other_axis() {
        assert_eq!(
            pan_tilt(12, 0),
            [0x81, 0x01, 0x06, 0x01, 0x0C, 0x00, 0x02, 0x03, 0xFF]
        );
    }

    #[test]
    fn zoom_frames() {
        assert_eq!(zoom(3), [0x81, 0x01, 0x04, 0x07, 0x23, 0xFF]);
        assert_eq!(zoom(-7), [0x81, 0x01, 0x04, 0x07, 0x37, 0xFF]);
        assert_eq!(zoom(9), [0x81, 0x01, 0x04, 0x07, 0x27, 0xFF]);
        assert_eq!(zoom(0), [0x81, 0x01, 0x04, 0x07, 0x00, 0xFF]);
    }

    #[test]
    fn home_frame_bytes() {
        assert_eq!(home(), [0x81, 0x01, 0x06, 0x04, 0xFF]);
    }

    #[test]
    fn menu_frame_bytes() {
        assert_eq!(menu_toggle(), [0x81, 0x01, 0x06, 0x06, 0x02, 0xFF]);
    }

    #[test]
    fn hex_rendering() {
        assert_eq!(to_hex(&home()), "81 01 06 04 FF");
    }
}
