//! tmux-applets: one-shot helpers for the tmux status line.
//!
//! Each binary reads one piece of system state, maps it onto a fixed colour
//! ramp and prints a single line of tmux markup:
//!   - `tmux-cpu-freq [cores]`: one block per core, coloured by scaling level
//!   - `tmux-mem`: one block coloured by percent of memory free
//!   - `tmux-ping [host]`: one block, green if the host answers, red if not
//!
//! Any applet also takes `s:<saturation>` / `l:<lightness>` arguments, which
//! switch it to truecolour gradient blocks. Arguments past the first
//! positional one are ignored.

pub mod config;
pub mod cpu_freq;
pub mod error;
pub mod gradient;
pub mod mem;
pub mod ping;
pub mod status;

/// Environment variable holding the `env_logger` filter.
pub const LOG_ENV: &str = "TMUX_APPLETS_LOG";

/// Log to stderr only; tmux reads stdout. Silent unless `TMUX_APPLETS_LOG`
/// is set.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, "off"))
        .format_timestamp(None)
        .init();
}
