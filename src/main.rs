use std::io::{BufRead, Write};
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

use fix_client::builder::MessageBuilder;
use fix_client::cache::OrderCache;
use fix_client::commands::{CommandHandler, Reply};
use fix_client::core::{Config, Credentials, Session};
use fix_client::fix::{tags::msg_type, FixMessage};
use fix_client::rfq::{NegotiationHandler, TakeQuotedSide};
use fix_client::session::{ChannelSession, FixApplication};
use fix_client::signer::HmacSigner;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let (mut cfg, load_err) = Config::load_default();
    cfg.apply_env();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_filter));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_level(true)
        .init();

    tracing::info!("fix-client {} starting", env!("CARGO_PKG_VERSION"));
    match load_err {
        Some(e) => tracing::warn!("{}; using defaults", e),
        None => tracing::info!("Loaded config from config.toml"),
    }

    let creds = Credentials::from_env();
    if let Err(e) = creds.validate() {
        tracing::warn!("{}; logon will be rejected", e);
    }
    let signer = Arc::new(HmacSigner::new(
        creds.api_key,
        creds.api_secret,
        creds.passphrase,
    ));

    let portfolio = cfg.session.portfolio_id.clone();
    let session_id = format!(
        "FIX.4.2:{}->{}",
        cfg.session.sender_comp_id, cfg.session.target_comp_id
    );

    let cache = Arc::new(OrderCache::new(
        cfg.orders.file.clone(),
        cfg.orders.track_full_lifecycle,
    ));
    let builder = Arc::new(MessageBuilder::new(&cfg.session, &cfg.vwap));
    let (session, outbound) = ChannelSession::new(session_id.clone());
    let session: Arc<dyn Session> = Arc::new(session);

    // No transport is linked in; outbound traffic is logged.
    tokio::spawn(async move {
        while let Ok(msg) = outbound.recv_async().await {
            tracing::info!("OUT {}", msg.describe());
        }
    });

    let negotiation =
        NegotiationHandler::new(builder.clone(), Box::new(TakeQuotedSide), portfolio.clone());
    let app = FixApplication::new(
        cache.clone(),
        builder.clone(),
        negotiation,
        signer,
        session.clone(),
        portfolio.clone(),
    );

    app.on_create(session.id());
    let mut logon = FixMessage::new(msg_type::LOGON);
    app.to_admin(&mut logon);
    session.submit(logon)?;
    app.on_logon(&session_id);
    tracing::info!("{} cached orders", cache.len());

    let handler = CommandHandler::new(builder, cache, session, portfolio);

    let (line_tx, line_rx) = flume::unbounded::<String>();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    prompt();
    loop {
        tokio::select! {
            line = line_rx.recv_async() => {
                let Ok(line) = line else { break };
                match handler.handle_line(&line) {
                    Ok(Some(Reply::Exit)) => break,
                    Ok(Some(reply)) => println!("{}", reply),
                    Ok(None) => {}
                    Err(e) => println!("error: {}", e),
                }
                prompt();
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        }
    }

    app.on_logout(&session_id);
    tracing::info!("fix-client stopped");
    Ok(())
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}
