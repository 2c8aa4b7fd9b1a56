use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "lazyrealm", version, about = "TUI for administering IAM realms")]
pub struct Args {
    /// Base URL of the identity server (e.g., "https://id.example.com")
    #[arg(short, long)]
    pub server: Option<String>,

    /// Realm to open directly, skipping the realm selector
    #[arg(short, long)]
    pub realm: Option<String>,

    /// Admin username used for the password grant
    #[arg(short, long, default_value = "admin")]
    pub username: String,

    /// Admin password; prefer the environment variable over the flag
    #[arg(short, long, env = "LAZYREALM_PASSWORD", hide_env_values = true)]
    pub password: String,
}
