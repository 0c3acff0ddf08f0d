// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `ton-payments` operator CLI: inspect and verify transactions.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use ton_payments::config::init_tracing;
use ton_payments::models::{
    AssetDirection, CoinTransaction, NftTransaction, TokenTransaction, Transaction,
    DEFAULT_WAIT_INTERVAL,
};
use ton_payments::{NetworkConfig, Provider, TonError};

/// Inspect and verify TON transactions through toncenter.
#[derive(Parser, Debug)]
#[command(name = "ton-payments")]
#[command(about = "Resolve and verify TON payments")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show type, status and ledger details of a transaction
    Status {
        tx: String,
        /// Poll until the transaction is final, for at most this many seconds
        #[arg(long)]
        wait: Option<u64>,
    },
    /// Check a transaction against an expected transfer
    Verify {
        kind: Kind,
        direction: Direction,
        /// Counterparty: the receiver for incoming, the sender for outgoing
        address: String,
        /// Decimal amount, or the item address for NFTs
        expected: String,
        tx: String,
    },
    /// Check that the indexer answers
    Ping,
    /// Detect the wallet contract revision at an address
    WalletVersion { address: String },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
    Coin,
    Token,
    Nft,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Direction {
    Incoming,
    Outgoing,
}

impl From<Direction> for AssetDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Incoming => AssetDirection::Incoming,
            Direction::Outgoing => AssetDirection::Outgoing,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing();

    let provider = match NetworkConfig::from_env().and_then(Provider::new) {
        Ok(provider) => Arc::new(provider),
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(args.command, provider).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, provider: Arc<Provider>) -> Result<ExitCode, TonError> {
    match command {
        Command::Status { tx, wait } => {
            let mut transaction = Transaction::new(tx, provider);
            if let Some(seconds) = wait {
                transaction
                    .wait_for(DEFAULT_WAIT_INTERVAL, Duration::from_secs(seconds))
                    .await;
            }
            print_status(&transaction).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Verify {
            kind,
            direction,
            address,
            expected,
            tx,
        } => {
            let direction = AssetDirection::from(direction);
            let status = match kind {
                Kind::Coin => {
                    CoinTransaction::new(tx, provider)
                        .verify_transfer(direction, &address, &expected)
                        .await?
                }
                Kind::Token => {
                    TokenTransaction::new(tx, provider)
                        .verify_transfer(direction, &address, &expected)
                        .await?
                }
                Kind::Nft => {
                    NftTransaction::new(tx, provider)
                        .verify_transfer(direction, &address, &expected)
                        .await?
                }
            };
            println!("{status:?}");
            Ok(ExitCode::SUCCESS)
        }
        Command::Ping => {
            if provider.check_rpc_connection().await {
                println!("ok ({})", provider.config().api_base_url);
                Ok(ExitCode::SUCCESS)
            } else {
                println!("unreachable ({})", provider.config().api_base_url);
                Ok(ExitCode::FAILURE)
            }
        }
        Command::WalletVersion { address } => {
            let version = provider.find_wallet_version(&address).await?;
            println!("{version:?}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn print_status(transaction: &Transaction) -> Result<(), TonError> {
    println!("id:     {}", transaction.id());
    println!("type:   {:?}", transaction.transaction_type().await?);
    println!("status: {:?}", transaction.status().await?);
    if transaction.data().await?.is_some() {
        println!("signer: {}", transaction.signer().await?);
        println!("fee:    {} TON", transaction.fee().await?);
        println!("block:  {}", transaction.block_id().await?);
        if let Some(time) = transaction.block_time().await? {
            println!("time:   {}", time.to_rfc3339());
        }
        println!(
            "confirmations: {}",
            transaction.block_confirmation_count().await?
        );
        let comment = transaction.comment().await?;
        if !comment.is_empty() {
            println!("comment: {comment}");
        }
    }
    println!("url:    {}", transaction.url());
    Ok(())
}
