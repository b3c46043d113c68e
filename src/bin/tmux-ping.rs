use std::io;
use std::path::PathBuf;

use clap::Parser;
use tmux_applets::config::{ColorMode, Config};
use tmux_applets::gradient::AppletArgs;
use tmux_applets::{ping, status};

#[derive(Parser)]
#[command(name = "tmux-ping", version, about = "Show whether a host answers ping as a tmux colour block")]
struct Cli {
    /// Config file (default: <config dir>/tmux-applets/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
    /// [host] [s:<saturation>] [l:<lightness>]; host defaults to 127.0.0.1,
    /// extra arguments are ignored
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() {
    tmux_applets::init_logging();
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref());
    let args = AppletArgs::parse(&cli.args);

    let gradient = args.gradient(&config.gradient, config.ping.mode == ColorMode::Gradient);
    let mut out = io::stdout().lock();
    let result = ping::run(&config.ping, args.first(), gradient.as_ref(), &mut out);
    std::process::exit(status::report(result, &mut out));
}
