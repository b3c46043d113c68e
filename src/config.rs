use std::path::{Path, PathBuf};

use log::warn;
use serde::Deserialize;

use crate::error::{AppletError, Result};
use crate::gradient::in_range;
use crate::status::parse_color;

/// Length of every colour ramp.
pub const LEVEL_COLORS: usize = 6;

pub type ColorRamp = [String; LEVEL_COLORS];

fn default_ramp() -> ColorRamp {
    ["red", "yellow", "green", "blue", "cyan", "magenta"].map(String::from)
}

/// How a measured value becomes a colour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Pick from the fixed six-colour ramp.
    #[default]
    Ramp,
    /// Truecolour hue between green and red.
    Gradient,
}

fn parse_mode(field: &str, s: &str) -> Option<ColorMode> {
    match s.trim().to_lowercase().as_str() {
        "ramp" => Some(ColorMode::Ramp),
        "gradient" => Some(ColorMode::Gradient),
        _ => {
            warn!("{}: unknown mode {:?}", field, s);
            None
        }
    }
}

// ---------------------------------------------------------------------------
// GradientConfig
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub struct GradientConfig {
    /// Percent, 0..=100.
    pub saturation: f64,
    /// Percent, 0..=100.
    pub lightness: f64,
}

impl Default for GradientConfig {
    fn default() -> Self {
        Self {
            saturation: 100.0,
            lightness: 50.0,
        }
    }
}

// ---------------------------------------------------------------------------
// CpuFreqConfig
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub struct CpuFreqConfig {
    /// Cores shown when no argument is given.
    pub cores: u32,
    /// Level 0 is the first entry of the available-frequencies list.
    pub colors: ColorRamp,
    /// Directory holding `cpu<N>/cpufreq/...`.
    pub sysfs_root: PathBuf,
    pub mode: ColorMode,
}

impl Default for CpuFreqConfig {
    fn default() -> Self {
        Self {
            cores: 6,
            colors: default_ramp(),
            sysfs_root: PathBuf::from("/sys/devices/system/cpu"),
            mode: ColorMode::Ramp,
        }
    }
}

// ---------------------------------------------------------------------------
// MemConfig
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub struct MemConfig {
    /// Level 0 is nearly out of memory, level 5 is nearly all free.
    pub colors: ColorRamp,
    pub meminfo_path: PathBuf,
    pub source: MemSource,
    pub mode: ColorMode,
}

/// Which meminfo lines feed the free figure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MemSource {
    /// First four lines by position: total, free, buffers, cached.
    #[default]
    Fixed,
    /// `MemTotal` and `MemAvailable`, looked up by label.
    Available,
}

impl Default for MemConfig {
    fn default() -> Self {
        Self {
            colors: default_ramp(),
            meminfo_path: PathBuf::from("/proc/meminfo"),
            source: MemSource::Fixed,
            mode: ColorMode::Ramp,
        }
    }
}

// ---------------------------------------------------------------------------
// PingConfig
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub struct PingConfig {
    pub program: String,
    pub count: u32,
    pub timeout_secs: u32,
    /// Target used when no host argument is given.
    pub host: String,
    pub okay_color: String,
    pub error_color: String,
    pub mode: ColorMode,
}

impl Default for PingConfig {
    fn default() -> Self {
        Self {
            program: "ping".to_string(),
            count: 1,
            timeout_secs: 1,
            host: "127.0.0.1".to_string(),
            okay_color: "green".to_string(),
            error_color: "red".to_string(),
            mode: ColorMode::Ramp,
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Config {
    pub cpu_freq: CpuFreqConfig,
    pub mem: MemConfig,
    pub ping: PingConfig,
    pub gradient: GradientConfig,
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("tmux-applets").join("config.toml"))
    }

    /// Load from `explicit`, or from the default location.
    ///
    /// A missing default file is not worth mentioning; everything else that
    /// goes wrong is logged and the defaults are used.
    pub fn load(explicit: Option<&Path>) -> Self {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) if p.exists() => p,
                _ => return Self::default(),
            },
        };

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{}", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AppletError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let raw: RawConfig = toml::from_str(&content).map_err(|e| AppletError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawConfig) -> Self {
        let mut config = Self::default();

        if let Some(c) = raw.cpu_freq {
            if let Some(n) = c.cores {
                if n > 0 {
                    config.cpu_freq.cores = n;
                } else {
                    warn!("cpu_freq.cores must be positive, keeping {}", config.cpu_freq.cores);
                }
            }
            if let Some(colors) = c.colors {
                if let Some(ramp) = parse_ramp("cpu_freq.colors", colors) {
                    config.cpu_freq.colors = ramp;
                }
            }
            if let Some(root) = c.sysfs_root {
                config.cpu_freq.sysfs_root = root;
            }
            if let Some(mode) = c.mode.and_then(|m| parse_mode("cpu_freq.mode", &m)) {
                config.cpu_freq.mode = mode;
            }
        }

        if let Some(m) = raw.mem {
            if let Some(colors) = m.colors {
                if let Some(ramp) = parse_ramp("mem.colors", colors) {
                    config.mem.colors = ramp;
                }
            }
            if let Some(path) = m.meminfo_path {
                config.mem.meminfo_path = path;
            }
            if let Some(src) = m.source {
                match src.trim().to_lowercase().as_str() {
                    "fixed" => config.mem.source = MemSource::Fixed,
                    "available" => config.mem.source = MemSource::Available,
                    _ => warn!("mem.source: unknown source {:?}", src),
                }
            }
            if let Some(mode) = m.mode.and_then(|m| parse_mode("mem.mode", &m)) {
                config.mem.mode = mode;
            }
        }

        if let Some(p) = raw.ping {
            if let Some(program) = p.program {
                if !program.is_empty() {
                    config.ping.program = program;
                }
            }
            if let Some(n) = p.count {
                if n > 0 {
                    config.ping.count = n;
                }
            }
            if let Some(n) = p.timeout_secs {
                if n > 0 {
                    config.ping.timeout_secs = n;
                }
            }
            if let Some(host) = p.host {
                if !host.is_empty() {
                    config.ping.host = host;
                }
            }
            if let Some(s) = p.okay_color {
                match parse_color(&s) {
                    Some(c) => config.ping.okay_color = c,
                    None => warn!("ping.okay_color: unknown colour {:?}", s),
                }
            }
            if let Some(s) = p.error_color {
                match parse_color(&s) {
                    Some(c) => config.ping.error_color = c,
                    None => warn!("ping.error_color: unknown colour {:?}", s),
                }
            }
            if let Some(mode) = p.mode.and_then(|m| parse_mode("ping.mode", &m)) {
                config.ping.mode = mode;
            }
        }

        if let Some(g) = raw.gradient {
            if let Some(v) = g.saturation {
                if in_range(v) {
                    config.gradient.saturation = v;
                } else {
                    warn!("gradient.saturation {} out of range [0, 100]", v);
                }
            }
            if let Some(v) = g.lightness {
                if in_range(v) {
                    config.gradient.lightness = v;
                } else {
                    warn!("gradient.lightness {} out of range [0, 100]", v);
                }
            }
        }

        config
    }
}

/// A ramp is all-or-nothing: one bad entry keeps the default ramp.
fn parse_ramp(field: &str, raw: Vec<String>) -> Option<ColorRamp> {
    if raw.len() != LEVEL_COLORS {
        warn!(
            "{}: expected {} colours, got {}",
            field,
            LEVEL_COLORS,
            raw.len()
        );
        return None;
    }
    let mut parsed = Vec::with_capacity(LEVEL_COLORS);
    for s in &raw {
        match parse_color(s) {
            Some(c) => parsed.push(c),
            None => {
                warn!("{}: unknown colour {:?}", field, s);
                return None;
            }
        }
    }
    ColorRamp::try_from(parsed).ok()
}

// ---------------------------------------------------------------------------
// Raw TOML structs (all-optional for merge)
// ---------------------------------------------------------------------------

#[derive(Deserialize, Default)]
struct RawConfig {
    cpu_freq: Option<RawCpuFreq>,
    mem: Option<RawMem>,
    ping: Option<RawPing>,
    gradient: Option<RawGradient>,
}

#[derive(Deserialize, Default)]
struct RawGradient {
    saturation: Option<f64>,
    lightness: Option<f64>,
}

#[derive(Deserialize, Default)]
struct RawCpuFreq {
    cores: Option<u32>,
    colors: Option<Vec<String>>,
    sysfs_root: Option<PathBuf>,
    mode: Option<String>,
}

#[derive(Deserialize, Default)]
struct RawMem {
    colors: Option<Vec<String>>,
    meminfo_path: Option<PathBuf>,
    source: Option<String>,
    mode: Option<String>,
}

#[derive(Deserialize, Default)]
struct RawPing {
    program: Option<String>,
    count: Option<u32>,
    timeout_secs: Option<u32>,
    host: Option<String>,
    okay_color: Option<String>,
    error_color: Option<String>,
    mode: Option<String>,
}
