pub mod logging;

use clap::{
    Arg, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

pub const ARG_PORT: &str = "port";
pub const ARG_DSN: &str = "dsn";
pub const ARG_STORE: &str = "store";
pub const ARG_MAX_CONNECTIONS: &str = "max-connections";
pub const ARG_SIGNUP_WINDOW_MS: &str = "signup-window-ms";

pub const STORE_POSTGRES: &str = "postgres";
pub const STORE_MEMORY: &str = "memory";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("userhub")
        .about("User accounts, groups and states")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("USERHUB_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_DSN)
                .short('d')
                .long("dsn")
                .help("Database connection string")
                .long_help("Postgres connection string. Required unless --store memory is used.")
                .env("USERHUB_DSN"),
        )
        .arg(
            Arg::new(ARG_STORE)
                .long("store")
                .help("Where users are kept")
                .default_value(STORE_POSTGRES)
                .env("USERHUB_STORE")
                .value_parser([STORE_POSTGRES, STORE_MEMORY]),
        )
        .arg(
            Arg::new(ARG_MAX_CONNECTIONS)
                .long("max-connections")
                .help("Maximum Postgres pool size")
                .default_value("5")
                .env("USERHUB_MAX_CONNECTIONS")
                .value_parser(clap::value_parser!(u32).range(1..)),
        )
        .arg(
            Arg::new(ARG_SIGNUP_WINDOW_MS)
                .long("signup-window-ms")
                .help("How long a new login is held before the user is written, 0 disables")
                .long_help(
                    "How long, in milliseconds, a login is held before the user row is written. A second create for the same login inside this window fails both requests. 0 disables the guard and the delay.",
                )
                .default_value("5000")
                .env("USERHUB_SIGNUP_WINDOW_MS")
                .value_parser(clap::value_parser!(u64)),
        );

    logging::with_args(command)
}
