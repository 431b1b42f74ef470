//! Gopherman CLI

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use gopherman::config::Config;
use gopherman::network::RecordingServer;
use gopherman::proxy::ForwardingHandler;
use gopherman::recording::Recorder;
use gopherman::replay::{status_and_body, Tester};
use gopherman::storage;

fn usage() -> ! {
    eprintln!("Gopherman v{}", env!("CARGO_PKG_VERSION"));
    eprintln!();
    eprintln!("Usage: gopherman <command> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  record <config.toml>");
    eprintln!("      Run a recording proxy in front of the configured upstream");
    eprintln!("  replay [--config <config.toml>] <base-dir> <environment> <request-name> <collection>...");
    eprintln!("      Replay a named request from each collection and verify the responses");
    process::exit(1);
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gopherman=info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        usage();
    }

    let result = match args[1].as_str() {
        "record" => match args.get(2) {
            Some(config) => record(Path::new(config)).await,
            None => usage(),
        },
        "replay" => replay(&args[2..]).await,
        command => {
            eprintln!("Unknown command: {command}");
            eprintln!("Run 'gopherman' for usage information.");
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn record(config_path: &Path) -> anyhow::Result<()> {
    let config = Config::from_file(config_path)?;
    config.validate_recorder()?;

    let session_dir = match &config.recorder.session_dir {
        Some(dir) => dir.clone(),
        None => storage::default_session_dir()?,
    };

    let handler = ForwardingHandler::new(config.upstream_authority());
    let recorder = Recorder::new(handler, session_dir).with_auth(config.recorder.auth.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.recorder.listen_port));
    let server = RecordingServer::bind(addr, recorder, &config.limits)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        "Recording traffic for {} (sessions in {})",
        config.upstream_authority(),
        server.recorder().session_dir().display()
    );

    server.run().await?;
    Ok(())
}

async fn replay(args: &[String]) -> anyhow::Result<()> {
    let (config, args) = match args {
        [flag, path, rest @ ..] if flag == "--config" => (Config::from_file(Path::new(path))?, rest),
        _ => (Config::default(), args),
    };

    let [base, environment, request_name, collections @ ..] = args else {
        usage();
    };
    if collections.is_empty() {
        usage();
    }

    let tester = Tester::load(&PathBuf::from(base), environment, collections)?
        .with_hostname(config.tester.hostname)
        .with_port(config.tester.port);

    let errors = tester.replay_named(request_name, status_and_body).await;
    if errors.is_empty() {
        println!("PASS {request_name} ({} collections)", tester.collections().len());
        return Ok(());
    }

    for error in &errors {
        println!("FAIL {error}");
    }
    anyhow::bail!("{} replay errors", errors.len())
}
