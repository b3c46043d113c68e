use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use log::error;
use tmux_applets::config::{ColorMode, Config};
use tmux_applets::cpu_freq;
use tmux_applets::gradient::AppletArgs;

#[derive(Parser)]
#[command(name = "tmux-cpu-freq", version, about = "Show per-core CPU scaling level as tmux colour blocks")]
struct Cli {
    /// Config file (default: <config dir>/tmux-applets/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
    /// [cores|auto] [s:<saturation>] [l:<lightness>]; extra arguments are ignored
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

/// Write the status line. A failed write is only logged, so the process
/// still exits 0.
fn emit<W: Write>(config: &Config, args: &AppletArgs, out: &mut W) {
    let cores = cpu_freq::resolve_cores(args.first(), config.cpu_freq.cores);
    let gradient = args.gradient(
        &config.gradient,
        config.cpu_freq.mode == ColorMode::Gradient,
    );
    if let Err(e) = cpu_freq::run(&config.cpu_freq, cores, gradient.as_ref(), out) {
        error!("writing status line: {}", e);
    }
}

fn main() {
    tmux_applets::init_logging();
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref());
    let args = AppletArgs::parse(&cli.args);
    emit(&config, &args, &mut io::stdout().lock());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extra_arguments_accepted() {
        let cli = Cli::try_parse_from(["tmux-cpu-freq", "4", "5"]).unwrap();
        assert_eq!(cli.args, ["4", "5"]);
        assert_eq!(AppletArgs::parse(&cli.args).first(), Some("4"));
    }

    #[test]
    fn test_hyphen_and_colour_arguments() {
        let cli = Cli::try_parse_from(["tmux-cpu-freq", "-3", "s:50", "x"]).unwrap();
        let args = AppletArgs::parse(&cli.args);
        assert_eq!(args.first(), Some("-3"));
        assert_eq!(args.saturation, Some(50.0));
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::ErrorKind::BrokenPipe.into())
        }
    }

    fn missing_sysfs() -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.cpu_freq.sysfs_root = dir.path().join("nonexistent");
        (dir, config)
    }

    #[test]
    fn test_emit_ignores_write_failure() {
        let (_dir, config) = missing_sysfs();
        let args = AppletArgs::parse(&["2".to_string()]);
        // Returns normally; main then exits 0.
        emit(&config, &args, &mut BrokenPipe);
    }

    #[test]
    fn test_emit_writes_line() {
        let (_dir, config) = missing_sysfs();
        let args = AppletArgs::parse(&["1".to_string(), "ignored".to_string()]);
        let mut out = Vec::new();
        emit(&config, &args, &mut out);
        assert_eq!(String::from_utf8(out).unwrap(), "#[bg=red]  #[default]\n");
    }

    #[test]
    fn test_config_flag_before_arguments() {
        let cli = Cli::try_parse_from(["tmux-cpu-freq", "--config", "/tmp/c.toml", "2"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        assert_eq!(cli.args, ["2"]);
    }
}
