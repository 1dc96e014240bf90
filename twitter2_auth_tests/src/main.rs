use std::{env, io::{self, BufRead, Write}, process::ExitCode, time::Duration};

use tracing_subscriber::EnvFilter;
use twitter2_auth::{
    AppOnlyAuthHandler, ApplicationCredential, AuthHandler, Config, DelegatedAuthHandler,
};

const USAGE: &str = "usage: twitter2_auth_tests [pin|app-only]";

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mode = env::args().nth(1).unwrap_or_else(|| "pin".to_owned());

    let app = match app_from_env() {
        Ok(app) => app,
        Err(name) => {
            eprintln!("{} is not set", name);
            return ExitCode::FAILURE;
        }
    };

    let config = Config::new().timeout(Duration::from_secs(30));

    let result = match &*mode {
        "pin" => pin_flow(app, config).await,
        "app-only" => app_only(app, config).await,
        _ => {
            eprintln!("{}", USAGE);
            return ExitCode::FAILURE;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn app_from_env() -> Result<ApplicationCredential, &'static str> {
    let key = env::var("TWITTER_CONSUMER_KEY").map_err(|_| "TWITTER_CONSUMER_KEY")?;
    let secret = env::var("TWITTER_CONSUMER_SECRET").map_err(|_| "TWITTER_CONSUMER_SECRET")?;
    Ok(ApplicationCredential::new(key, secret))
}

async fn pin_flow(
    app: ApplicationCredential,
    config: Config,
) -> Result<(), Box<dyn std::error::Error>>
{
    let callback = env::var("TWITTER_CALLBACK").ok();
    let mut handler = DelegatedAuthHandler::with_config(app, callback.as_deref(), config)?;

    let pending = handler.get_authorization_url(false).await?;
    println!("Visit {} and enter the verifier:", pending.authorization_url());
    print!("> ");
    io::stdout().flush()?;

    let mut verifier = String::new();
    io::stdin().lock().read_line(&mut verifier)?;

    let access_token = handler.get_access_token(pending, verifier.trim()).await?;
    println!("access token: {}", access_token.token());

    let username = handler.get_username().await?;
    println!("authenticated as @{}", username);

    Ok(())
}

async fn app_only(
    app: ApplicationCredential,
    config: Config,
) -> Result<(), Box<dyn std::error::Error>>
{
    let handler = AppOnlyAuthHandler::with_config(app, config).await?;
    println!("{:?}", handler.apply_auth()?);
    Ok(())
}
