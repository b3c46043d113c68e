use std::io;
use std::path::PathBuf;

use clap::Parser;
use tmux_applets::config::{ColorMode, Config};
use tmux_applets::gradient::AppletArgs;
use tmux_applets::{mem, status};

#[derive(Parser)]
#[command(name = "tmux-mem", version, about = "Show free memory as a tmux colour block")]
struct Cli {
    /// Config file (default: <config dir>/tmux-applets/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
    /// [s:<saturation>] [l:<lightness>]; anything else is ignored
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() {
    tmux_applets::init_logging();
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref());
    let args = AppletArgs::parse(&cli.args);

    let gradient = args.gradient(&config.gradient, config.mem.mode == ColorMode::Gradient);
    let mut out = io::stdout().lock();
    let code = status::report(mem::run(&config.mem, gradient.as_ref(), &mut out), &mut out);
    std::process::exit(code);
}
