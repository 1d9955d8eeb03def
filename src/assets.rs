pub const FRAME_RATE: u32 = 30;
pub const FRAME_WIDTH: u32 = 640;
pub const FRAME_HEIGHT: u32 = 360;

// scanning
pub const COOLDOWN_SECS: f64 = 40.0;
pub const STATS_EVERY_FRAMES: u64 = 900;

// actuator link
pub const SERIAL_PORT: &str = "/dev/ttyUSB0";
pub const SERIAL_BAUD: u32 = 9600;
pub const SERIAL_OPEN_TIMEOUT_SECS: f64 = 1.0;
/// The board resets when the port opens; writes before this are lost.
pub const SERIAL_SETTLE_MILLIS: u64 = 2000;

// audio cue
pub const TONE_HZ: f32 = 880.0;
pub const TONE_MILLIS: u64 = 150;

// operator console
pub const CONSOLE_QUEUE: usize = 16;
