use tempfile::tempdir;
use toolx_logger::{LevelFilter, Logger};

#[test]
fn below_warn_events_are_sampled() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");

    let logger = Logger::builder()
        .name("sampled")
        .console(false)
        .sampling(5)
        .level(LevelFilter::INFO)
        .path(&log_dir)
        .init()?;

    for i in 0..100 {
        tracing::info!(i, "worker heartbeat");
    }
    tracing::warn!("first warning");
    tracing::warn!("second warning");
    tracing::error!("boom");

    let counters = logger.counters();
    assert_eq!(counters.info, 20, "one info event in five should pass");
    assert_eq!(counters.warn, 2, "warnings always pass");
    assert_eq!(counters.error, 1, "errors always pass");

    Ok(())
}
