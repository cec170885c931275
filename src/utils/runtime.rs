use anyhow::Result;

/// The tracker is driven by a single timer and a single mutator, so a current thread runtime is
/// all it needs.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
