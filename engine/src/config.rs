//! Video settings read from a `key=value` text file.

use std::fs;
use std::path::Path;

use log::warn;

/// Window and presentation settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VideoConfig {
    pub width: i32,
    pub height: i32,
    pub fullscreen: bool,
    pub vsync: bool,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 800,
            fullscreen: false,
            vsync: false,
        }
    }
}

type Apply = fn(&mut VideoConfig, i32);

const KEYS: [(&str, Apply); 4] = [
    ("resx=", set_width),
    ("resy=", set_height),
    ("fullscreen=", set_fullscreen),
    ("vsync=", set_vsync),
];

fn set_width(config: &mut VideoConfig, value: i32) {
    config.width = value;
}

fn set_height(config: &mut VideoConfig, value: i32) {
    config.height = value;
}

fn set_fullscreen(config: &mut VideoConfig, value: i32) {
    config.fullscreen = value != 0;
}

fn set_vsync(config: &mut VideoConfig, value: i32) {
    config.vsync = value != 0;
}

impl VideoConfig {
    /// Overlays the settings found in `path` onto `self`.
    ///
    /// Returns `false` and leaves `self` untouched when the file cannot be
    /// read.
    pub fn load_from(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => {
                self.parse_str(&text);
                true
            }
            Err(err) => {
                warn!("cannot open config file {}: {err}", path.display());
                false
            }
        }
    }

    /// Applies every recognised `key=value` line of `text`.
    pub fn parse_str(&mut self, text: &str) {
        for line in text.lines() {
            self.apply_line(line);
        }
    }

    fn apply_line(&mut self, line: &str) {
        for (key, apply) in KEYS {
            let Some(rest) = line.strip_prefix(key) else {
                continue;
            };
            if let Some(value) = leading_int(rest) {
                apply(self, value);
                return;
            }
        }
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.width.max(1) as u32, self.height.max(1) as u32)
    }
}

/// Parses an optionally signed decimal prefix, skipping leading whitespace.
/// Trailing text is ignored; overflow yields `None`.
fn leading_int(text: &str) -> Option<i32> {
    let text = text.trim_start();
    let sign_len = usize::from(text.starts_with(['+', '-']));
    let digits = text[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits == 0 {
        return None;
    }
    text[..sign_len + digits].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn single_key_changes_only_its_field() {
        let mut config = VideoConfig::default();
        config.parse_str("resx=640\n");
        assert_eq!(
            config,
            VideoConfig {
                width: 640,
                ..VideoConfig::default()
            }
        );
    }

    #[test]
    fn all_keys_in_any_order() {
        let mut config = VideoConfig::default();
        config.parse_str("vsync=1\nfullscreen=2\nresy=600\nresx=800\n");
        assert_eq!(
            config,
            VideoConfig {
                width: 800,
                height: 600,
                fullscreen: true,
                vsync: true,
            }
        );
    }

    #[test]
    fn bad_values_keep_previous_field() {
        let mut config = VideoConfig {
            width: 1280,
            height: 720,
            fullscreen: true,
            vsync: true,
        };
        let before = config;
        config.parse_str("resx=wide\nresy=99999999999\nfullscreen=\nvsync=on\n");
        assert_eq!(config, before);
    }

    #[test]
    fn keys_are_case_sensitive_and_anchored() {
        let mut config = VideoConfig::default();
        config.parse_str("RESX=10\n resx=20\n# resy=30\nresx = 40\n");
        assert_eq!(config, VideoConfig::default());
    }

    #[test]
    fn value_prefix_is_scanned_like_an_integer() {
        let mut config = VideoConfig::default();
        config.parse_str("resx= 1920px\nresy=-5\nvsync=0\r\n");
        assert_eq!(config.width, 1920);
        assert_eq!(config.height, -5);
        assert!(!config.vsync);
        assert_eq!(config.window_size(), (1920, 1));
    }

    #[test]
    fn missing_file_leaves_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = VideoConfig {
            width: 1,
            height: 2,
            fullscreen: true,
            vsync: false,
        };
        let before = config;
        assert!(!config.load_from(dir.path().join("config.ini")));
        assert_eq!(config, before);
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "resy=480").unwrap();
        writeln!(file, "unrelated=1").unwrap();

        let mut config = VideoConfig::default();
        assert!(config.load_from(file.path()));
        assert_eq!(config.height, 480);
        assert_eq!(config.width, 1024);
    }
}
