//! Memory applet.
//!
//! Reads the first four lines of a meminfo-style source (total, free,
//! buffers, cached), computes percent free and maps it onto the colour ramp.
//! Alternatively `MemTotal` and `MemAvailable` are looked up by label, and
//! the used fraction can be shown as a gradient hue.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use log::debug;

use crate::config::{ColorRamp, MemConfig, MemSource, LEVEL_COLORS};
use crate::error::{AppletError, Result};
use crate::gradient::Gradient;
use crate::status::StatusLine;

/// Memory figures in kilobytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemSnapshot {
    pub total: u64,
    pub free: u64,
    pub buffers: u64,
    pub cached: u64,
}

impl MemSnapshot {
    /// Free plus reclaimable memory.
    pub fn free_equivalent(&self) -> u64 {
        self.free + self.buffers + self.cached
    }
}

/// Parse `<label>:<spaces><digits><spaces>kB` into its label and value.
pub fn parse_line(line: &str) -> std::result::Result<(&str, u64), String> {
    let (label, rest) = line
        .split_once(':')
        .ok_or_else(|| "missing ':'".to_string())?;
    let label = label.trim();
    if label.is_empty() {
        return Err("empty label".to_string());
    }

    let rest = rest.trim_start_matches(' ');
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return Err(format!("{}: no value", label));
    }
    let value = rest[..end]
        .parse::<u64>()
        .map_err(|e| format!("{}: {}", label, e))?;

    if !rest[end..].trim_start_matches(' ').starts_with('k') {
        return Err(format!("{}: expected kB unit", label));
    }

    Ok((label, value))
}

/// Read total, free, buffers and cached, in that order, from the first
/// four lines.
pub fn parse_snapshot<R: BufRead>(reader: R) -> Result<MemSnapshot> {
    let mut values = [0u64; 4];
    let mut lines = reader.lines();

    for (idx, slot) in values.iter_mut().enumerate() {
        let line_no = idx + 1;
        let line = match lines.next() {
            Some(Ok(l)) => l,
            Some(Err(e)) => {
                return Err(AppletError::Malformed {
                    line: line_no,
                    reason: e.to_string(),
                })
            }
            None => {
                return Err(AppletError::Malformed {
                    line: line_no,
                    reason: "unexpected end of input".to_string(),
                })
            }
        };
        let (label, value) = parse_line(&line).map_err(|reason| AppletError::Malformed {
            line: line_no,
            reason,
        })?;
        debug!("{} = {} kB", label, value);
        *slot = value;
    }

    let [total, free, buffers, cached] = values;
    if total == 0 {
        return Err(AppletError::Malformed {
            line: 1,
            reason: "total memory is zero".to_string(),
        });
    }

    Ok(MemSnapshot {
        total,
        free,
        buffers,
        cached,
    })
}

/// Look up `MemTotal` and `MemAvailable` anywhere in the input. Other lines
/// are not checked.
pub fn parse_available<R: BufRead>(reader: R) -> Result<MemSnapshot> {
    let mut total = None;
    let mut available = None;

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| AppletError::Malformed {
            line: idx + 1,
            reason: e.to_string(),
        })?;
        let slot = match line.split_once(':').map(|(label, _)| label.trim()) {
            Some("MemTotal") => &mut total,
            Some("MemAvailable") => &mut available,
            _ => continue,
        };
        let (_, value) = parse_line(&line).map_err(|reason| AppletError::Malformed {
            line: idx + 1,
            reason,
        })?;
        *slot = Some(value);
        if total.is_some() && available.is_some() {
            break;
        }
    }

    let missing = |label: &str| AppletError::Malformed {
        line: 0,
        reason: format!("no {} line", label),
    };
    let total = total.ok_or_else(|| missing("MemTotal"))?;
    let available = available.ok_or_else(|| missing("MemAvailable"))?;
    if total == 0 {
        return Err(AppletError::Malformed {
            line: 0,
            reason: "total memory is zero".to_string(),
        });
    }

    Ok(MemSnapshot {
        total,
        free: available,
        buffers: 0,
        cached: 0,
    })
}

pub fn read_snapshot(path: &Path, kind: MemSource) -> Result<MemSnapshot> {
    let file = File::open(path).map_err(|source| AppletError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    match kind {
        MemSource::Fixed => parse_snapshot(reader),
        MemSource::Available => parse_available(reader),
    }
}

/// Truncating percentage of memory that is free or reclaimable.
pub fn percent_free(snap: &MemSnapshot) -> u64 {
    snap.free_equivalent().saturating_mul(100) / snap.total
}

/// Fraction of memory in use, 0.0 when everything is free.
pub fn used_fraction(snap: &MemSnapshot) -> f64 {
    let free = snap.free_equivalent() as f64 / snap.total as f64;
    (1.0 - free).clamp(0.0, 1.0)
}

/// Highest level whose threshold `level * (100 / 6)` the percentage
/// exceeds; 0 when it exceeds none.
pub fn level_for_percent(pct: u64) -> usize {
    let width = (100 / LEVEL_COLORS) as u64;
    (0..LEVEL_COLORS)
        .rev()
        .find(|&level| pct > level as u64 * width)
        .unwrap_or(0)
}

pub fn render(snap: &MemSnapshot, colors: &ColorRamp) -> StatusLine {
    let pct = percent_free(snap);
    let level = level_for_percent(pct);
    debug!("{}% free -> level {}", pct, level);

    let mut line = StatusLine::new();
    line.block(&colors[level]).reset();
    line
}

pub fn render_gradient(snap: &MemSnapshot, gradient: &Gradient) -> StatusLine {
    let used = used_fraction(snap);
    debug!("{:.2} used", used);

    let mut line = StatusLine::new();
    line.block(&gradient.color(used)).reset();
    line
}

/// Read the configured source and write one line.
///
/// Errors are returned before anything is written, so the caller can print
/// the error marker instead.
pub fn run<W: Write>(
    config: &MemConfig,
    gradient: Option<&Gradient>,
    out: &mut W,
) -> anyhow::Result<()> {
    let snap = read_snapshot(&config.meminfo_path, config.source)?;
    let line = match gradient {
        Some(g) => render_gradient(&snap, g),
        None => render(&snap, &config.colors),
    };
    line.write_to(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::report;
    use std::io::Cursor;

    const SAMPLE: &str = "MemTotal: 1000 kB\nMemFree: 100 kB\nMemBuffers: 50 kB\nMemCached: 150 kB\n";

    fn ramp() -> ColorRamp {
        MemConfig::default().colors
    }

    fn snap(total: u64, free: u64) -> MemSnapshot {
        MemSnapshot {
            total,
            free,
            buffers: 0,
            cached: 0,
        }
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("MemTotal:       16314828 kB"), Ok(("MemTotal", 16314828)));
        assert_eq!(parse_line("Buffers: 42 kB"), Ok(("Buffers", 42)));
        assert_eq!(parse_line("Cached:0kB"), Ok(("Cached", 0)));
    }

    #[test]
    fn test_parse_line_rejects_malformed() {
        assert!(parse_line("MemTotal 1000 kB").is_err());
        assert!(parse_line(": 1000 kB").is_err());
        assert!(parse_line("MemTotal: kB").is_err());
        assert!(parse_line("MemTotal: 1000").is_err());
        assert!(parse_line("MemTotal: 1000 MB").is_err());
        assert!(parse_line("").is_err());
    }

    #[test]
    fn test_parse_snapshot() {
        let s = parse_snapshot(Cursor::new(SAMPLE)).unwrap();
        assert_eq!(
            s,
            MemSnapshot {
                total: 1000,
                free: 100,
                buffers: 50,
                cached: 150,
            }
        );
    }

    #[test]
    fn test_parse_snapshot_ignores_trailing_lines() {
        let input = format!("{}SwapCached: 0 kB\nnot a meminfo line\n", SAMPLE);
        assert!(parse_snapshot(Cursor::new(input)).is_ok());
    }

    #[test]
    fn test_parse_snapshot_short_input() {
        let err = parse_snapshot(Cursor::new("MemTotal: 1000 kB\nMemFree: 100 kB\n")).unwrap_err();
        assert!(matches!(err, AppletError::Malformed { line: 3, .. }));
    }

    #[test]
    fn test_parse_snapshot_blank_line() {
        let input = "MemTotal: 1000 kB\n\nMemFree: 100 kB\nBuffers: 1 kB\nCached: 1 kB\n";
        let err = parse_snapshot(Cursor::new(input)).unwrap_err();
        assert!(matches!(err, AppletError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_parse_snapshot_zero_total() {
        let input = "MemTotal: 0 kB\nMemFree: 0 kB\nBuffers: 0 kB\nCached: 0 kB\n";
        assert!(matches!(
            parse_snapshot(Cursor::new(input)),
            Err(AppletError::Malformed { line: 1, .. })
        ));
    }

    #[test]
    fn test_percent_free() {
        let s = parse_snapshot(Cursor::new(SAMPLE)).unwrap();
        assert_eq!(percent_free(&s), 30);
        assert_eq!(percent_free(&snap(3, 2)), 66);
    }

    #[test]
    fn test_level_for_percent() {
        assert_eq!(level_for_percent(30), 1);
        assert_eq!(level_for_percent(100), 5);
        assert_eq!(level_for_percent(81), 5);
        assert_eq!(level_for_percent(80), 4);
        assert_eq!(level_for_percent(17), 1);
        assert_eq!(level_for_percent(16), 0);
        assert_eq!(level_for_percent(1), 0);
        assert_eq!(level_for_percent(0), 0);
    }

    #[test]
    fn test_level_above_hundred_is_top() {
        assert_eq!(level_for_percent(250), 5);
        assert_eq!(level_for_percent(u64::MAX), 5);
    }

    #[test]
    fn test_render() {
        let s = parse_snapshot(Cursor::new(SAMPLE)).unwrap();
        assert_eq!(render(&s, &ramp()).as_str(), "#[bg=yellow]  #[default]");
        assert_eq!(render(&snap(10, 10), &ramp()).as_str(), "#[bg=magenta]  #[default]");
        assert_eq!(render(&snap(10, 0), &ramp()).as_str(), "#[bg=red]  #[default]");
    }

    #[test]
    fn test_run_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meminfo");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = MemConfig {
            meminfo_path: path,
            ..MemConfig::default()
        };

        let mut first = Vec::new();
        let mut second = Vec::new();
        run(&config, None, &mut first).unwrap();
        run(&config, None, &mut second).unwrap();
        assert_eq!(String::from_utf8(first.clone()).unwrap(), "#[bg=yellow]  #[default]\n");
        assert_eq!(first, second);
    }

    const PROC_SAMPLE: &str = "MemTotal:       16000000 kB
MemFree:         2000000 kB
MemAvailable:    4000000 kB
Buffers:          100000 kB
Cached:          1900000 kB
HugePages_Total:       0
";

    #[test]
    fn test_parse_available() {
        let s = parse_available(Cursor::new(PROC_SAMPLE)).unwrap();
        assert_eq!(s.total, 16000000);
        assert_eq!(s.free_equivalent(), 4000000);
        assert_eq!(percent_free(&s), 25);
    }

    #[test]
    fn test_parse_available_missing_label() {
        let err = parse_available(Cursor::new(SAMPLE)).unwrap_err();
        assert!(matches!(err, AppletError::Malformed { .. }));
        assert!(err.to_string().contains("MemAvailable"));
    }

    #[test]
    fn test_parse_available_malformed_value() {
        let input = "MemTotal: 1000 kB\nMemAvailable: lots\n";
        assert!(matches!(
            parse_available(Cursor::new(input)),
            Err(AppletError::Malformed { line: 2, .. })
        ));
    }

    #[test]
    fn test_used_fraction() {
        assert_eq!(used_fraction(&snap(100, 25)), 0.75);
        assert_eq!(used_fraction(&snap(100, 100)), 0.0);
        assert_eq!(used_fraction(&snap(100, 300)), 0.0);
    }

    #[test]
    fn test_render_gradient() {
        let g = Gradient::default();
        assert_eq!(render_gradient(&snap(10, 10), &g).as_str(), "#[bg=#00ff00]  #[default]");
        assert_eq!(render_gradient(&snap(10, 0), &g).as_str(), "#[bg=#ff0000]  #[default]");
    }

    #[test]
    fn test_run_available_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meminfo");
        std::fs::write(&path, PROC_SAMPLE).unwrap();
        let config = MemConfig {
            meminfo_path: path,
            source: MemSource::Available,
            ..MemConfig::default()
        };
        let mut out = Vec::new();
        run(&config, None, &mut out).unwrap();
        // 25% free is level 1.
        assert_eq!(String::from_utf8(out).unwrap(), "#[bg=yellow]  #[default]\n");
    }

    #[test]
    fn test_run_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let config = MemConfig {
            meminfo_path: dir.path().join("nonexistent"),
            ..MemConfig::default()
        };
        let mut out = Vec::new();
        let err = run(&config, None, &mut out).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppletError>(),
            Some(AppletError::Io { .. })
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_report_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let config = MemConfig {
            meminfo_path: dir.path().join("nonexistent"),
            ..MemConfig::default()
        };
        let mut out = Vec::new();
        let code = report(run(&config, None, &mut out), &mut out);
        assert_eq!(code, 1);
        assert_eq!(String::from_utf8(out).unwrap(), "ER\n");
    }

    #[test]
    fn test_report_malformed_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meminfo");
        std::fs::write(&path, "MemTotal: 1000 kB\nMemFree: 100 kB\n").unwrap();
        let config = MemConfig {
            meminfo_path: path,
            ..MemConfig::default()
        };
        let mut out = Vec::new();
        let code = report(run(&config, None, &mut out), &mut out);
        assert_eq!(code, 1);
        assert_eq!(String::from_utf8(out).unwrap(), "ER\n");
    }

    #[test]
    fn test_report_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meminfo");
        std::fs::write(&path, SAMPLE).unwrap();
        let config = MemConfig {
            meminfo_path: path,
            ..MemConfig::default()
        };
        let mut out = Vec::new();
        let code = report(run(&config, None, &mut out), &mut out);
        assert_eq!(code, 0);
        assert_eq!(String::from_utf8(out).unwrap(), "#[bg=yellow]  #[default]\n");
    }
}
