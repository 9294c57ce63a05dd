use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use powchain_core::signature::SigningKey;
use powchain_core::wire::{AmountResponse, ChainResponse};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "powchain-cli")]
#[command(about = "Wallet and inspection client for a powchain node")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a P-256 signing key
    Keygen {
        /// File receiving the hex-encoded PKCS#8 key
        #[arg(long)]
        out: PathBuf,
    },
    /// Sign a transfer and submit it
    Submit {
        /// Node base URL (e.g. http://127.0.0.1:5000)
        #[arg(long, default_value = "http://127.0.0.1:5000")]
        node: String,
        /// Key file written by `keygen`
        #[arg(long)]
        key: PathBuf,
        /// Sender
        #[arg(long)]
        from: String,
        /// Recipient
        #[arg(long)]
        to: String,
        /// Value
        #[arg(long)]
        value: f64,
    },
    /// Print the node's chain
    Chain {
        #[arg(long, default_value = "http://127.0.0.1:5000")]
        node: String,
    },
    /// Print an address's confirmed balance
    Amount {
        #[arg(long, default_value = "http://127.0.0.1:5000")]
        node: String,
        #[arg(long)]
        address: String,
    },
}

async fn write_key(path: &Path, key: &SigningKey) -> Result<()> {
    tokio::fs::write(path, key.pkcs8_hex())
        .await
        .with_context(|| format!("writing key to {}", path.display()))
}

async fn read_key(path: &Path) -> Result<SigningKey> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading key from {}", path.display()))?;
    SigningKey::from_pkcs8_hex(&text).with_context(|| format!("decoding key in {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .pretty()
        .init();

    let cli = Cli::parse();
    let client = reqwest::Client::new();
    match cli.cmd {
        Command::Keygen { out } => {
            let key = SigningKey::generate()?;
            write_key(&out, &key).await?;
            println!("{}", key.public_key().to_hex());
        }
        Command::Submit {
            node,
            key,
            from,
            to,
            value,
        } => {
            let key = read_key(&key).await?;
            let request = key.transfer(from, to, value)?.to_request();
            debug!(?request, "submitting");
            let res = client
                .post(format!("{node}/transactions"))
                .json(&request)
                .send()
                .await?;
            let status = res.status();
            let body = res.text().await?;
            println!("status: {}", status);
            println!("{body}");
        }
        Command::Chain { node } => {
            let body: ChainResponse = client
                .get(format!("{node}/chain"))
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Command::Amount { node, address } => {
            let body: AmountResponse = client
                .get(format!("{node}/amount"))
                .query(&[("address", address.as_str())])
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            println!("{}", body.amount);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_arguments_parse() {
        let cli = Cli::parse_from([
            "powchain-cli",
            "submit",
            "--key",
            "alice.key",
            "--from",
            "alice",
            "--to",
            "bob",
            "--value",
            "1.5",
        ]);
        match cli.cmd {
            Command::Submit { node, value, .. } => {
                assert_eq!(node, "http://127.0.0.1:5000");
                assert_eq!(value, 1.5);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[tokio::test]
    async fn key_file_round_trips() {
        let path = std::env::temp_dir().join(format!("powchain-cli-{}.key", std::process::id()));
        let key = SigningKey::generate().unwrap();
        write_key(&path, &key).await.unwrap();
        let loaded = read_key(&path).await.unwrap();
        let _ = tokio::fs::remove_file(&path).await;
        assert_eq!(loaded.public_key(), key.public_key());

        let transfer = loaded.transfer("alice", "bob", 3.0).unwrap();
        assert!(transfer.verify());
    }
}
