//! Capture session configuration

use std::time::Duration;

/// Configuration for one capture session
///
/// All values are fixed for the lifetime of a session; there is no
/// hot-reload. Changing the configuration takes effect the next time the
/// demand gate starts a session.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Capture width in pixels
    pub width: u32,

    /// Capture height in pixels
    pub height: u32,

    /// Capture frame rate
    pub fps: u32,

    /// V4L2 device path
    pub device: String,

    /// Target video bitrate in kbit/s
    pub bitrate_kbps: u32,

    /// x264 encoder preset
    pub preset: String,

    /// Mirror the image horizontally
    pub horizontal_flip: bool,

    /// Mirror the image vertically
    pub vertical_flip: bool,

    /// Clockwise rotation in degrees (0, 90, 180 or 270)
    pub rotation: u32,

    /// Working-buffer capacity for the NAL scanner
    ///
    /// Bounds memory per session. A frame larger than this is dropped
    /// rather than grown into.
    pub buffer_capacity: usize,

    /// Maximum bytes per read from the capture process
    pub read_chunk_size: usize,

    /// Subprocess failures tolerated before the session is abandoned
    pub max_restart_attempts: u32,

    /// Delay between restart attempts
    ///
    /// Zero re-enters the capture loop immediately on failure, matching the
    /// historical behavior. A consistently broken device then fails fast
    /// through its retry budget; set a delay to spread the attempts out.
    pub restart_delay: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            fps: 15,
            device: "/dev/video0".to_string(),
            bitrate_kbps: 50,
            preset: "veryfast".to_string(),
            horizontal_flip: false,
            vertical_flip: false,
            rotation: 0,
            buffer_capacity: 64 * 1024,
            read_chunk_size: 4096,
            max_restart_attempts: 3,
            restart_delay: Duration::ZERO,
        }
    }
}

impl CaptureConfig {
    /// Set the capture width
    pub fn width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Set the capture height
    pub fn height(mut self, height: u32) -> Self {
        self.height = height;
        self
    }

    /// Set the capture frame rate
    pub fn fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// Set the V4L2 device path
    pub fn device(mut self, device: impl Into<String>) -> Self {
        self.device = device.into();
        self
    }

    /// Set the target bitrate in kbit/s
    pub fn bitrate_kbps(mut self, kbps: u32) -> Self {
        self.bitrate_kbps = kbps;
        self
    }

    /// Mirror the image horizontally
    pub fn horizontal_flip(mut self, flip: bool) -> Self {
        self.horizontal_flip = flip;
        self
    }

    /// Mirror the image vertically
    pub fn vertical_flip(mut self, flip: bool) -> Self {
        self.vertical_flip = flip;
        self
    }

    /// Set clockwise rotation in degrees (0, 90, 180 or 270)
    pub fn rotation(mut self, degrees: u32) -> Self {
        self.rotation = degrees % 360;
        self
    }

    /// Set the NAL scanner working-buffer capacity
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Set the maximum bytes per read
    pub fn read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size;
        self
    }

    /// Set the restart budget per session
    pub fn max_restart_attempts(mut self, attempts: u32) -> Self {
        self.max_restart_attempts = attempts;
        self
    }

    /// Set the delay between restart attempts
    pub fn restart_delay(mut self, delay: Duration) -> Self {
        self.restart_delay = delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CaptureConfig::default();

        assert_eq!(config.width, 640);
        assert_eq!(config.height, 480);
        assert_eq!(config.fps, 15);
        assert_eq!(config.device, "/dev/video0");
        assert_eq!(config.read_chunk_size, 4096);
        assert_eq!(config.buffer_capacity, 64 * 1024);
        assert_eq!(config.max_restart_attempts, 3);
        assert_eq!(config.restart_delay, Duration::ZERO);
        assert!(!config.horizontal_flip);
        assert!(!config.vertical_flip);
    }

    #[test]
    fn test_builder_chaining() {
        let config = CaptureConfig::default()
            .width(1280)
            .height(720)
            .fps(30)
            .device("/dev/video2")
            .bitrate_kbps(1000)
            .buffer_capacity(256 * 1024)
            .read_chunk_size(8192)
            .max_restart_attempts(5)
            .restart_delay(Duration::from_millis(250));

        assert_eq!(config.width, 1280);
        assert_eq!(config.height, 720);
        assert_eq!(config.fps, 30);
        assert_eq!(config.device, "/dev/video2");
        assert_eq!(config.bitrate_kbps, 1000);
        assert_eq!(config.buffer_capacity, 256 * 1024);
        assert_eq!(config.read_chunk_size, 8192);
        assert_eq!(config.max_restart_attempts, 5);
        assert_eq!(config.restart_delay, Duration::from_millis(250));
    }

    #[test]
    fn test_rotation_wraps() {
        let config = CaptureConfig::default().rotation(450);
        assert_eq!(config.rotation, 90);
    }
}
