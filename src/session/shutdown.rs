use tokio::select;
use tokio_util::sync::CancellationToken;

/// Cancels the session on Ctrl-C. Returns as soon as the session is cancelled for any other
/// reason, so it never outlives the session.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            cancelation.cancel();
        },
        _ = cancelation.cancelled() => {},
    };
}
