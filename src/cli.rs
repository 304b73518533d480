use clap::Parser;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "+", env!("BUILD_NUMBER"));

#[derive(Parser, Debug)]
#[command(name = "madm", version = VERSION, about = "Metorg report and board admin TUI")]
pub struct Cli {
    /// Base URL of the server hosting the CGI services
    #[arg(short, long, default_value = "http://localhost")]
    pub server: String,

    /// Select this application at startup
    #[arg(long)]
    pub app: Option<String>,

    /// Select this version at startup (requires --app)
    #[arg(long = "app-version")]
    pub app_version: Option<String>,

    /// Select this test at startup (requires --app-version)
    #[arg(long)]
    pub test: Option<String>,

    /// Request timeout in seconds
    #[arg(short, long, default_value_t = 15)]
    pub timeout: u64,

    /// Do not read or write the saved selection state
    #[arg(long)]
    pub no_persist: bool,
}
