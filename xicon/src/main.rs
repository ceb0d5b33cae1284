use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use xicon::Layout;

/// Generates Windows and Android app icons from a single source image.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Source image [default: assets/branding/FS.png]
    src: Option<PathBuf>,
}

fn main() -> Result<()> {
    use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};
    tracing_log::LogTracer::init().ok();
    let env = std::env::var("XICON_LOG").unwrap_or_else(|_| "error".into());
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_span_events(FmtSpan::ACTIVE | FmtSpan::CLOSE)
        .with_env_filter(EnvFilter::new(env))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();
    log_panics::init();
    let args = Args::parse();
    let layout = Layout::from_current_dir()?;
    xicon::generate(&layout, args.src.as_deref())?;
    println!("OK: icons updated");
    Ok(())
}
