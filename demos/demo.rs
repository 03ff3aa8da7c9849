//! Queries every endpoint once and prints the results.
//!
//! ```text
//! HIBP_API_KEY=... RUST_LOG=hibp_client=debug cargo run --example demo
//! ```

use hibp_client::{CancellationToken, Client};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), hibp_client::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let api_key = std::env::var("HIBP_API_KEY").unwrap_or_default();
    let client = Client::new(api_key)?;
    let cancel = CancellationToken::new();

    // https://haveibeenpwned.com/API/v3#BreachesForAccount
    match client
        .breached_account(&cancel, "info@example.com", None, false, false)
        .await
    {
        Ok(breaches) => {
            for breach in breaches {
                println!("{breach:#?}");
            }
        }
        Err(err) => println!("{err}"),
    }

    // https://haveibeenpwned.com/API/v3#AllBreaches
    match client.breaches(&cancel, Some("adobe.com")).await {
        Ok(breaches) => {
            for breach in breaches {
                println!("{breach:#?}");
            }
        }
        Err(err) => println!("{err}"),
    }

    // https://haveibeenpwned.com/API/v3#SingleBreach
    match client.breached_site(&cancel, "Adobe").await {
        Ok(breach) => println!("{breach:#?}"),
        Err(err) => println!("{err}"),
    }

    // https://haveibeenpwned.com/API/v3#AllDataClasses
    match client.data_classes(&cancel).await {
        Ok(classes) => println!("{classes:#?}"),
        Err(err) => println!("{err}"),
    }

    // https://haveibeenpwned.com/API/v3#PastesForAccount
    match client.pasted_account(&cancel, "info@example.com").await {
        Ok(pastes) => {
            for paste in pastes {
                println!("{paste:#?}");
            }
        }
        Err(err) => println!("{err}"),
    }

    Ok(())
}
