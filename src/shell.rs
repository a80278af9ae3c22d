//! Interactive menu over the tracking service
//!
//! Each action runs to completion before the next prompt; per-action
//! errors are printed and never abort the loop.

use crate::{
    config::Config,
    constants::DEFAULT_SEARCH_LIMIT,
    error::TrackerError,
    tracker::AssetTracker,
    types::{PriceSnapshot, TrackedAsset},
};
use std::io::{self, Write};

fn print_menu() {
    println!();
    println!("=== Crypto Monitoring System ===");
    println!("1) Search & add tracked asset");
    println!("2) List tracked assets");
    println!("3) Record snapshots for all tracked assets");
    println!("4) Record snapshot for one asset");
    println!("5) Show price history");
    println!("6) Market summary");
    println!("7) Trend analysis");
    println!("8) Set asset active/inactive");
    println!("9) Delete tracked asset");
    println!("10) Percentage change");
    println!("0) Exit");
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn prompt_usize(label: &str, default: usize) -> io::Result<usize> {
    loop {
        let raw = prompt(label)?;
        if raw.is_empty() {
            return Ok(default);
        }
        match raw.parse() {
            Ok(n) => return Ok(n),
            Err(_) => println!("Enter a number, or leave blank for {}.", default),
        }
    }
}

fn prompt_yes(label: &str) -> io::Result<bool> {
    let raw = prompt(label)?.to_lowercase();
    Ok(matches!(raw.as_str(), "yes" | "y" | "true" | "1"))
}

fn print_asset(asset: &TrackedAsset) {
    let flag = if asset.is_active { "active" } else { "inactive" };
    println!("- {} [{}] {} ({})", asset.asset_id, asset.symbol, asset.name, flag);
}

fn print_snapshot(snapshot: &PriceSnapshot) {
    println!(
        "- {} {} @ {}",
        snapshot.asset_id,
        snapshot.price,
        snapshot.recorded_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
}

/// Runs the menu loop until the user exits
pub async fn run(tracker: &AssetTracker, config: &Config) -> io::Result<()> {
    loop {
        print_menu();
        let choice = prompt("Select option")?;

        let result = match choice.as_str() {
            "1" => search_and_add(tracker).await,
            "2" => list_assets(tracker).await,
            "3" => record_all(tracker).await,
            "4" => record_one(tracker).await,
            "5" => show_history(tracker, config).await,
            "6" => market_summary(tracker, config).await,
            "7" => trend_analysis(tracker, config).await,
            "8" => set_active(tracker).await,
            "9" => delete_asset(tracker).await,
            "10" => percentage_change(tracker).await,
            "0" => {
                println!("Exiting...");
                return Ok(());
            }
            _ => {
                println!("Invalid option.");
                continue;
            }
        };

        if let Err(e) = result {
            println!("Error: {}", e);
        }
    }
}

async fn search_and_add(tracker: &AssetTracker) -> Result<(), TrackerError> {
    let query = prompt("Search query (symbol, id or name)")?;
    let results = tracker.search_coins(&query, DEFAULT_SEARCH_LIMIT).await?;

    if results.is_empty() {
        println!("No matches.");
        return Ok(());
    }

    for (i, coin) in results.iter().enumerate() {
        println!("{}) {} [{}] {}", i + 1, coin.id, coin.symbol, coin.name);
    }

    loop {
        let raw = prompt("Select number to track (or 0 to cancel)")?;
        match raw.parse::<usize>() {
            Ok(0) => {
                println!("Cancelled.");
                return Ok(());
            }
            Ok(n) if n <= results.len() => {
                let coin = &results[n - 1];
                let asset = tracker
                    .add_asset(&coin.id, Some(&coin.name), Some(&coin.symbol))
                    .await?;
                println!("Tracking {} [{}]", asset.asset_id, asset.symbol);
                return Ok(());
            }
            _ => println!("Pick a number between 0 and {}.", results.len()),
        }
    }
}

async fn list_assets(tracker: &AssetTracker) -> Result<(), TrackerError> {
    let assets = tracker.list_assets(false).await?;
    if assets.is_empty() {
        println!("No tracked assets.");
    }
    for asset in &assets {
        print_asset(asset);
    }
    Ok(())
}

async fn record_all(tracker: &AssetTracker) -> Result<(), TrackerError> {
    let report = tracker.record_all_tracked().await?;
    if report.attempted == 0 {
        println!("No tracked assets to record.");
        return Ok(());
    }

    for snapshot in &report.snapshots {
        print_snapshot(snapshot);
    }
    println!("{}", report);
    Ok(())
}

async fn record_one(tracker: &AssetTracker) -> Result<(), TrackerError> {
    let asset_id = prompt("Asset id")?;
    let snapshot = tracker.record_snapshot(&asset_id).await?;
    print_snapshot(&snapshot);
    Ok(())
}

async fn show_history(tracker: &AssetTracker, config: &Config) -> Result<(), TrackerError> {
    let asset_id = prompt("Asset id")?;
    let limit = prompt_usize("How many snapshots? (default)", config.history_limit)?;

    let history = tracker.history(&asset_id, limit).await?;
    if history.is_empty() {
        println!("No history found.");
    }
    for snapshot in &history {
        print_snapshot(snapshot);
    }
    Ok(())
}

async fn market_summary(tracker: &AssetTracker, config: &Config) -> Result<(), TrackerError> {
    let asset_id = prompt("Asset id")?;
    let limit = prompt_usize("Window size (default)", config.history_limit)?;

    let summary = tracker.market_analytics(&asset_id, limit).await?;
    println!(
        "{} over {} samples: open={} close={} high={} low={} avg={:.4} change={:+.2}%",
        summary.asset_id,
        summary.samples,
        summary.open,
        summary.close,
        summary.high,
        summary.low,
        summary.average,
        summary.change_pct
    );
    Ok(())
}

async fn trend_analysis(tracker: &AssetTracker, config: &Config) -> Result<(), TrackerError> {
    let asset_id = prompt("Asset id")?;
    let limit = prompt_usize("Window size (default)", config.history_limit)?;

    let analysis = tracker.trend_analysis(&asset_id, limit).await?;
    println!(
        "{} over {} samples: trend={} volatility={} momentum={:.2}/10 change={:+.2}%",
        analysis.asset_id,
        analysis.samples,
        analysis.trend,
        analysis.volatility,
        analysis.momentum,
        analysis.change_pct
    );
    Ok(())
}

async fn set_active(tracker: &AssetTracker) -> Result<(), TrackerError> {
    let asset_id = prompt("Asset id")?;
    let active = prompt_yes("Set active? (yes/no)")?;

    let asset = tracker.set_active(&asset_id, active).await?;
    print_asset(&asset);
    Ok(())
}

async fn percentage_change(tracker: &AssetTracker) -> Result<(), TrackerError> {
    let asset_id = prompt("Asset id")?;
    let lookback = prompt_usize("Lookback count (default 2)", 2)?;

    match tracker.change_pct(&asset_id, lookback).await? {
        Some(change) => println!(
            "Change over last {} snapshots: {:+.4} %",
            lookback, change
        ),
        None => println!("Not enough data to calculate change."),
    }
    Ok(())
}

async fn delete_asset(tracker: &AssetTracker) -> Result<(), TrackerError> {
    let asset_id = prompt("Asset id")?;
    let purge = prompt_yes("Delete price history too? (yes/no)")?;

    let (_, snapshots) = tracker.remove_asset(&asset_id, purge).await?;
    println!("Deleted {} ({} snapshots purged).", asset_id, snapshots);
    Ok(())
}
