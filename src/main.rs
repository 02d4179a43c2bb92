//! qabot - question-answering assistant
//!
//! Finds the closest known question and returns its answer, or learns a new
//! pair when nothing is close enough.

use qabot::cli;

fn main() -> anyhow::Result<()> {
    // Initialize logging (WARN level by default, use RUST_LOG=info for more)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into())
        )
        .init();

    cli::run()
}
