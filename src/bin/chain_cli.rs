use std::path::PathBuf;

use chain_lib::analytics::expiry::{days_to_expiration, years};
use chain_lib::chain::types::parse_expiration;
use chain_lib::settings::Settings;
use chain_lib::{
    analyze_expiration, build_report, build_strategy, chain_metrics, delta_weighted_implied_move,
    fill_missing_greeks, load_chain, render_prompt_text, straddle_implied_move, AnalysisRequest,
    ChainClient, ExpirationSlice, ImpliedMove, OptionsChain, PriceSource, StrategyKind,
};
use clap::Parser;

#[derive(Parser)]
#[command(name = "chain-cli")]
#[command(about = "Analyze one expiration of an options chain")]
struct Args {
    /// Underlying symbol, e.g. AAPL
    symbol: String,

    /// Current price of the underlying
    #[arg(short, long)]
    spot: f64,

    /// Expiration date (YYYY-MM-DD); defaults to the nearest one
    #[arg(short, long)]
    expiration: Option<String>,

    /// Read contracts from a .json or .csv file instead of the backend
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Path to a TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the backend base URL from the settings file
    #[arg(long)]
    base_url: Option<String>,

    /// Ask the backend for contracts with greeks only
    #[arg(long)]
    greeks: bool,

    /// Build a strategy and print its payoff (long-call, bull-spread, iron-condor, ...)
    #[arg(long)]
    strategy: Option<String>,

    /// Request strategy suggestions from the backend
    #[arg(long)]
    suggest: bool,

    /// Volatility ETF price sent along with suggestion requests
    #[arg(long)]
    vxx: Option<f64>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    chain_lib::logger::init_cli_logger(args.verbose);

    let mut settings = match &args.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    if let Some(base_url) = &args.base_url {
        settings.client.base_url = base_url.clone();
    }

    let chain = match &args.input {
        Some(path) => {
            tracing::info!("Loading contracts from: {}", path.display());
            load_chain(&args.symbol, path)?
        }
        None => {
            let client = ChainClient::new(settings.client.clone())?;
            client.fetch_chain(&args.symbol, args.greeks).await?
        }
    };

    if chain.is_empty() {
        eprintln!("No option contracts found for {}", args.symbol);
        std::process::exit(1);
    }

    let mut slice = match select_slice(&chain, args.expiration.as_deref()) {
        Some(slice) => slice,
        None => {
            eprintln!(
                "Expiration {} not found. Available: {}",
                args.expiration.as_deref().unwrap_or("-"),
                chain.expiration_dates().join(", ")
            );
            std::process::exit(1);
        }
    };

    let today = chrono::Local::now().date_naive();
    let config = &settings.analytics;

    let days = days_to_expiration(parse_expiration(&slice.expiration_date)?, today);
    let filled = fill_missing_greeks(&mut slice, args.spot, years(days), config.market);
    if filled > 0 {
        tracing::info!(filled, "backfilled implied volatility from quotes");
    }

    let analysis = analyze_expiration(&slice, args.spot, today, config)?;
    let cards = build_report(&analysis);

    let straddle = straddle_implied_move(&slice, args.spot, days, PriceSource::Last).ok();
    let weighted = delta_weighted_implied_move(&slice, args.spot, days, PriceSource::Mid).ok();
    let metrics = chain_metrics(chain.contracts());

    let strategy = match args.strategy.as_deref() {
        Some(name) => {
            let kind: StrategyKind = name.parse()?;
            Some(build_strategy(kind, &slice, args.spot)?)
        }
        None => None,
    };

    if args.json {
        let output = serde_json::json!({
            "symbol": chain.symbol,
            "expirationDate": slice.expiration_date,
            "calculationResults": cards,
            "impliedMove": { "straddle": straddle, "deltaWeighted": weighted },
            "chainMetrics": metrics,
            "strategy": strategy.as_ref().map(|s| serde_json::json!({
                "strategy": s,
                "payoff": s.payoff_profile(),
            })),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{} options, expiration {}", chain.symbol, slice.expiration_date);
        println!();
        print!("{}", render_prompt_text(&cards));

        if let Some(m) = &straddle {
            print_move("ATM straddle (last)", m);
        }
        if let Some(m) = &weighted {
            print_move("Delta-weighted (mid)", m);
        }

        println!();
        println!("Chain: {} expirations", metrics.expiration_count);
        println!(
            "  Open interest: {} calls / {} puts",
            metrics.total_call_oi, metrics.total_put_oi
        );
        println!(
            "  Average IV: {:.1}% (calls {:.1}%, puts {:.1}%), skew {}",
            metrics.avg_iv * 100.0,
            metrics.avg_call_iv * 100.0,
            metrics.avg_put_iv * 100.0,
            metrics.skew_class.label()
        );
        println!("  Sentiment: {}", metrics.sentiment);

        if let Some(s) = &strategy {
            let profile = s.payoff_profile();
            println!();
            println!("{} ({})", s.kind, s.expiration_date);
            for leg in &s.legs {
                println!(
                    "  {} {} x{} {} @ ${:.2}",
                    leg.action, leg.option_type, leg.quantity, leg.strike, leg.price
                );
            }
            println!("  Net debit: ${:.2}", s.net_debit);
            println!("  Max profit: {}", profile.max_profit);
            println!("  Max loss: {}", profile.max_loss);
            let break_evens: Vec<String> =
                profile.break_evens.iter().map(|b| format!("${:.2}", b)).collect();
            println!("  Break-even: {}", break_evens.join(", "));
        }
    }

    if args.suggest {
        let client = ChainClient::new(settings.client.clone())?;
        let mut request = AnalysisRequest::new(&args.symbol, args.spot, &slice, cards);
        if let Some(vxx) = args.vxx {
            request = request.with_vxx_price(vxx);
        }

        match client.analyze_options(&request).await {
            Ok(response) => {
                println!();
                println!("Summary: {}", response.summary);
                if !response.market_outlook.is_empty() {
                    println!("Outlook: {}", response.market_outlook);
                }
                for idea in &response.strategies {
                    println!("  - {}: {}", idea.name, idea.description);
                }
                for risk in &response.risks {
                    println!("  ! {}", risk);
                }
                if let Some(contrarian) = &response.contrarian {
                    println!("Contrarian: {}", contrarian);
                }
            }
            Err(e) => {
                tracing::error!("Strategy suggestion request failed: {}", e);
                eprintln!("Failed to get strategy suggestions: {}", e);
                std::process::exit(2);
            }
        }
    }

    Ok(())
}

fn select_slice(chain: &OptionsChain, expiration: Option<&str>) -> Option<ExpirationSlice> {
    match expiration {
        Some(date) => chain.slice(date).cloned(),
        None => chain.nearest_slice().cloned(),
    }
}

fn print_move(label: &str, m: &ImpliedMove) {
    println!(
        "{}: ±${:.2} ({:.2}%), range ${:.2} - ${:.2} at strike {:.2}",
        label,
        m.straddle,
        m.implied_move_pct(),
        m.low,
        m.high,
        m.strike
    );
}
