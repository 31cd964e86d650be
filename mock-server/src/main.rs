use clap::Parser;
use mock_server::Account;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// Local stand-in for the PetFriends shelter API.
#[derive(Parser)]
struct Args {
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Email of the seeded account.
    #[arg(long, env = "SHELTER_EMAIL", default_value = "user@example.com")]
    email: String,

    /// Password of the seeded account.
    #[arg(long, env = "SHELTER_PASSWORD", default_value = "password")]
    password: String,
}

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let addr = format!("127.0.0.1:{}", args.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, email = %args.email, "shelter listening");
    mock_server::run(listener, vec![Account::new(args.email, args.password)]).await
}
