//! Configuration Vault – reads/writes `~/.gatenav/config.toml`.

use gatenav_hal::DEFAULT_BAUD_RATE;
use gatenav_perception::EngineConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// `input` value that selects standard input.
pub const STDIN_INPUT: &str = "-";
/// `output` value that selects standard output.
pub const STDOUT_OUTPUT: &str = "stdout";

/// Persisted configuration stored in `~/.gatenav/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Detector output to read: `"-"` for stdin, otherwise a file or FIFO of
    /// JSON lines.
    #[serde(default = "default_input")]
    pub input: String,

    /// Where command bytes go: a serial device node, or `"stdout"`.
    #[serde(default = "default_output")]
    pub output: String,

    /// Line speed of the serial output.  Ignored for `"stdout"`.
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Decision engine settings.
    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_input() -> String {
    STDIN_INPUT.to_string()
}
fn default_output() -> String {
    "/dev/serial0".to_string()
}
fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
            baud_rate: default_baud_rate(),
            engine: EngineConfig::default(),
        }
    }
}

/// Return the config path: `$GATENAV_CONFIG` if set, else
/// `~/.gatenav/config.toml`.
pub fn config_path() -> PathBuf {
    if let Ok(p) = std::env::var("GATENAV_CONFIG") {
        return PathBuf::from(p);
    }
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".gatenav").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: Config = toml::from_str(&raw)
        .map_err(|e| format!("Failed to parse config: {}", e))?;
    Ok(Some(cfg))
}

/// Apply `GATENAV_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `GATENAV_INPUT` | `input` |
/// | `GATENAV_OUTPUT` | `output` |
/// | `GATENAV_BAUD_RATE` | `baud_rate` |
/// | `GATENAV_FRAME_WIDTH` | `engine.frame_width` |
///
/// Unparseable numbers are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("GATENAV_INPUT") {
        cfg.input = v;
    }
    if let Ok(v) = std::env::var("GATENAV_OUTPUT") {
        cfg.output = v;
    }
    if let Ok(v) = std::env::var("GATENAV_BAUD_RATE")
        && let Ok(baud) = v.parse::<u32>()
    {
        cfg.baud_rate = baud;
    }
    if let Ok(v) = std::env::var("GATENAV_FRAME_WIDTH")
        && let Ok(width) = v.parse::<f64>()
    {
        cfg.engine.frame_width = width;
    }
}

/// Save the config to disk, creating the parent directory if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatenav_perception::{PairingStrategy, PassDetection};

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let cfg = Config::default();
        save_to(&cfg, &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded, cfg);
        assert_eq!(loaded.input, "-");
        assert_eq!(loaded.output, "/dev/serial0");
        assert_eq!(loaded.baud_rate, 9600);
        assert_eq!(loaded.engine.frame_width, 640.0);
        assert_eq!(loaded.engine.pairing, PairingStrategy::ExhaustiveScan);
        assert_eq!(loaded.engine.pass_detection, PassDetection::WidthDrop);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "output = \"stdout\"\nbaud_rate = 115200\n\n[engine]\npairing = \"best-of-two\"\narea_match_threshold = 500.0\n",
        )
        .unwrap();

        let cfg = load_from(&path).expect("load ok").expect("some");
        assert_eq!(cfg.output, STDOUT_OUTPUT);
        assert_eq!(cfg.baud_rate, 115200);
        assert_eq!(cfg.input, STDIN_INPUT);
        assert_eq!(cfg.engine.pairing, PairingStrategy::BestOfTwo);
        assert_eq!(cfg.engine.area_match_threshold, 500.0);
        assert_eq!(cfg.engine.roles.gate_left, 0);
    }

    #[test]
    fn unknown_strategy_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[engine]\npass_detection = \"vibes\"\n").unwrap();
        let err = load_from(&path).unwrap_err();
        assert!(err.contains("Failed to parse config"));
    }

    #[test]
    fn config_path_points_to_gatenav_dir() {
        let p = config_path_for_home("/home/rover");
        assert!(p.to_string_lossy().contains(".gatenav"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        let result = load_from(&path).expect("no error");
        assert!(result.is_none());
    }

    // The env-override cases share process-wide variables, so they run in
    // one test to keep them from racing each other.
    #[test]
    fn apply_env_overrides_updates_fields() {
        // SAFETY: no other test touches the GATENAV_* variables.
        unsafe {
            std::env::set_var("GATENAV_INPUT", "/tmp/detections.jsonl");
            std::env::set_var("GATENAV_OUTPUT", "stdout");
            std::env::set_var("GATENAV_FRAME_WIDTH", "1280");
            std::env::set_var("GATENAV_BAUD_RATE", "57600");
        }
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.input, "/tmp/detections.jsonl");
        assert_eq!(cfg.output, "stdout");
        assert_eq!(cfg.engine.frame_width, 1280.0);
        assert_eq!(cfg.baud_rate, 57600);

        unsafe {
            std::env::set_var("GATENAV_FRAME_WIDTH", "wide");
            std::env::set_var("GATENAV_BAUD_RATE", "fast");
        }
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.engine.frame_width, 640.0);
        assert_eq!(cfg.baud_rate, 9600);

        unsafe {
            std::env::remove_var("GATENAV_INPUT");
            std::env::remove_var("GATENAV_OUTPUT");
            std::env::remove_var("GATENAV_FRAME_WIDTH");
            std::env::remove_var("GATENAV_BAUD_RATE");
        }
    }
}
