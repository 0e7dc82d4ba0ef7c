use anyhow::Result;

/// Sessions are driven by one user at a time, a single thread is all they need.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
