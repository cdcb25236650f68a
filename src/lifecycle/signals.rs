//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for the interrupt signal (SIGINT / Ctrl+C)
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Each call waits for a fresh delivery, so a second interrupt during
//!   shutdown can be observed and forces exit

/// Wait for the next interrupt.
pub async fn interrupt() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::info!("Interrupt signal received");
    Ok(())
}
