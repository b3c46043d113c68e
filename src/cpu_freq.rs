//! CPU scaling-frequency applet.
//!
//! Each core's current frequency is looked up in the list of available
//! scaling frequencies; its position in that list picks the block colour.
//! In gradient mode the frequency is instead normalised between the core's
//! scaling minimum and maximum and shown as a green-to-red hue.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;
use nix::unistd::{sysconf, SysconfVar};

use crate::config::{ColorRamp, CpuFreqConfig};
use crate::gradient::Gradient;
use crate::status::StatusLine;

/// At most this many available frequencies are considered.
pub const MAX_CPU_LEVELS: usize = 6;

/// Core counts above this are clamped.
pub const MAX_CORES: u32 = u16::MAX as u32;

fn available_path(root: &Path) -> PathBuf {
    root.join("cpu0")
        .join("cpufreq")
        .join("scaling_available_frequencies")
}

fn freq_path(root: &Path, cpu: u32, file: &str) -> PathBuf {
    root.join(format!("cpu{}", cpu)).join("cpufreq").join(file)
}

fn cur_freq_path(root: &Path, cpu: u32) -> PathBuf {
    freq_path(root, cpu, "scaling_cur_freq")
}

fn read_u32(path: &Path) -> Option<u32> {
    fs::read_to_string(path)
        .ok()
        .and_then(|s| s.split_whitespace().next()?.parse().ok())
}

/// Parse up to `MAX_CPU_LEVELS` whitespace-separated frequencies, stopping
/// at the first token that is not an unsigned integer.
pub fn parse_levels(s: &str) -> Vec<u32> {
    s.split_whitespace()
        .map_while(|tok| tok.parse::<u32>().ok())
        .take(MAX_CPU_LEVELS)
        .collect()
}

/// Available frequencies for the system; empty if unreadable.
pub fn read_levels(root: &Path) -> Vec<u32> {
    let path = available_path(root);
    match fs::read_to_string(&path) {
        Ok(s) => parse_levels(&s),
        Err(e) => {
            debug!("{}: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Current frequency of `cpu`; 0 if unreadable or unparsable.
pub fn read_cur_freq(root: &Path, cpu: u32) -> u32 {
    read_u32(&cur_freq_path(root, cpu)).unwrap_or(0)
}

/// Scaling bounds and current frequency of one core, in kHz.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuInfo {
    pub min_freq: u32,
    pub max_freq: u32,
    pub cur_freq: u32,
}

/// Any unreadable value is 0.
pub fn read_cpu_info(root: &Path, cpu: u32) -> CpuInfo {
    CpuInfo {
        min_freq: read_u32(&freq_path(root, cpu, "scaling_min_freq")).unwrap_or(0),
        max_freq: read_u32(&freq_path(root, cpu, "scaling_max_freq")).unwrap_or(0),
        cur_freq: read_cur_freq(root, cpu),
    }
}

/// Current frequency as a fraction of the scaling range, clamped to
/// `0.0..=1.0`. An empty or inverted range gives 0.0.
pub fn normalise_cur_freq(cpu: &CpuInfo) -> f64 {
    if cpu.max_freq <= cpu.min_freq {
        return 0.0;
    }
    let cur = cpu.cur_freq.clamp(cpu.min_freq, cpu.max_freq);
    f64::from(cur - cpu.min_freq) / f64::from(cpu.max_freq - cpu.min_freq)
}

/// Position of the first exact match, or `levels.len()` when absent.
pub fn level_of(levels: &[u32], freq: u32) -> usize {
    levels
        .iter()
        .position(|&l| l == freq)
        .unwrap_or(levels.len())
}

/// Build the status line for the given per-core frequencies.
///
/// Cores whose level falls outside the colour ramp produce no block.
pub fn render(levels: &[u32], freqs: &[u32], colors: &ColorRamp) -> StatusLine {
    let mut line = StatusLine::new();
    for (cpu, &freq) in freqs.iter().enumerate() {
        let level = level_of(levels, freq);
        debug!("cpu{}: {} kHz -> level {}", cpu, freq, level);
        if let Some(color) = colors.get(level) {
            line.block(color);
        }
    }
    line.reset();
    line
}

/// One gradient block per core; every core gets one.
pub fn render_gradient(cpus: &[CpuInfo], gradient: &Gradient) -> StatusLine {
    let mut line = StatusLine::new();
    for (idx, cpu) in cpus.iter().enumerate() {
        let norm = normalise_cur_freq(cpu);
        debug!("cpu{}: {:?} -> {:.2}", idx, cpu, norm);
        line.block(&gradient.color(norm));
    }
    line.reset();
    line
}

/// Lenient core-count parsing in the manner of `strtol`: optional sign,
/// leading digits, anything after them ignored. Returns `None` for values
/// that should leave the default in place.
pub fn parse_core_count(arg: &str) -> Option<u32> {
    let s = arg.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if negative || end == 0 {
        return None;
    }
    match digits[..end].parse::<u32>() {
        Ok(n) if n > 0 => Some(n),
        _ => None,
    }
}

/// Number of online processors, if the OS will say.
pub fn online_cpus() -> Option<u32> {
    match sysconf(SysconfVar::_NPROCESSORS_ONLN) {
        Ok(Some(n)) if n > 0 => u32::try_from(n).ok(),
        _ => None,
    }
}

/// Resolve the positional argument against the configured default,
/// clamped to `MAX_CORES`.
pub fn resolve_cores(arg: Option<&str>, default: u32) -> u32 {
    let cores = match arg {
        None => default,
        Some(a) if a.eq_ignore_ascii_case("auto") => online_cpus().unwrap_or(default),
        Some(a) => parse_core_count(a).unwrap_or(default),
    };
    if cores > MAX_CORES {
        debug!("clamping {} cores to {}", cores, MAX_CORES);
    }
    cores.min(MAX_CORES)
}

/// Read everything and write one line. Never fails on missing data.
pub fn run<W: Write>(
    config: &CpuFreqConfig,
    cores: u32,
    gradient: Option<&Gradient>,
    out: &mut W,
) -> std::io::Result<()> {
    let root = &config.sysfs_root;
    let cores = cores.min(MAX_CORES);
    let line = match gradient {
        Some(g) => {
            let cpus: Vec<CpuInfo> = (0..cores).map(|cpu| read_cpu_info(root, cpu)).collect();
            render_gradient(&cpus, g)
        }
        None => {
            let levels = read_levels(root);
            debug!("available frequencies: {:?}", levels);
            let freqs: Vec<u32> = (0..cores).map(|cpu| read_cur_freq(root, cpu)).collect();
            render(&levels, &freqs, &config.colors)
        }
    };
    line.write_to(out)
}
