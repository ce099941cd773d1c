//! Capture command-line construction
//!
//! Builds the argument vector for the external capture tool. The output is
//! always a raw Annex-B H.264 elementary stream on stdout:
//!
//! ```text
//! ffmpeg -f v4l2 -i /dev/video0 -c:v libx264 -f h264 -an \
//!        -b:v 50k -preset veryfast -s 640x480 -r 15 -
//! ```

use super::config::CaptureConfig;

/// Executable used for capture
pub const CAPTURE_COMMAND: &str = "ffmpeg";

/// Build the deterministic argument vector for a capture session
pub fn capture_args(config: &CaptureConfig) -> Vec<String> {
    let mut args = vec![
        "-f".to_string(),
        "v4l2".to_string(),
        "-i".to_string(),
        config.device.clone(),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-f".to_string(),
        "h264".to_string(),
        "-an".to_string(), // ignore audio
        "-b:v".to_string(),
        format!("{}k", config.bitrate_kbps),
        "-preset".to_string(),
        config.preset.clone(),
        "-s".to_string(),
        format!("{}x{}", config.width, config.height),
        "-r".to_string(),
        config.fps.to_string(),
    ];

    if let Some(filters) = filter_chain(config) {
        args.push("-vf".to_string());
        args.push(filters);
    }

    args.push("-".to_string()); // stream to stdout
    args
}

/// Compose the video filter chain for flip/rotation options
fn filter_chain(config: &CaptureConfig) -> Option<String> {
    let mut filters: Vec<&str> = Vec::new();

    if config.horizontal_flip {
        filters.push("hflip");
    }
    if config.vertical_flip {
        filters.push("vflip");
    }
    match config.rotation {
        0 => {}
        90 => filters.push("transpose=1"),
        180 => {
            filters.push("transpose=1");
            filters.push("transpose=1");
        }
        270 => filters.push("transpose=2"),
        other => {
            tracing::warn!(rotation = other, "Unsupported rotation, ignoring");
        }
    }

    if filters.is_empty() {
        None
    } else {
        Some(filters.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = capture_args(&CaptureConfig::default());

        assert_eq!(
            args,
            vec![
                "-f", "v4l2", "-i", "/dev/video0", "-c:v", "libx264", "-f", "h264", "-an",
                "-b:v", "50k", "-preset", "veryfast", "-s", "640x480", "-r", "15", "-",
            ]
        );
    }

    #[test]
    fn test_geometry_and_bitrate() {
        let config = CaptureConfig::default()
            .width(1280)
            .height(720)
            .fps(30)
            .bitrate_kbps(1000);
        let args = capture_args(&config);

        assert!(args.windows(2).any(|w| w == ["-s", "1280x720"]));
        assert!(args.windows(2).any(|w| w == ["-r", "30"]));
        assert!(args.windows(2).any(|w| w == ["-b:v", "1000k"]));
    }

    #[test]
    fn test_no_filter_chain_by_default() {
        let args = capture_args(&CaptureConfig::default());
        assert!(!args.contains(&"-vf".to_string()));
    }

    #[test]
    fn test_flip_filters() {
        let config = CaptureConfig::default()
            .horizontal_flip(true)
            .vertical_flip(true);
        let args = capture_args(&config);

        let vf = args.iter().position(|a| a == "-vf").unwrap();
        assert_eq!(args[vf + 1], "hflip,vflip");
    }

    #[test]
    fn test_rotation_filters() {
        for (degrees, expected) in [(90, "transpose=1"), (180, "transpose=1,transpose=1"), (270, "transpose=2")] {
            let config = CaptureConfig::default().rotation(degrees);
            let args = capture_args(&config);
            let vf = args.iter().position(|a| a == "-vf").unwrap();
            assert_eq!(args[vf + 1], expected, "rotation {}", degrees);
        }
    }

    #[test]
    fn test_stdout_is_last() {
        let args = capture_args(&CaptureConfig::default().rotation(90));
        assert_eq!(args.last().unwrap(), "-");
    }
}
