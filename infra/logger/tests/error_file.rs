use std::fs;
use std::time::Duration;

use tempfile::tempdir;
use toolx_logger::{LevelFilter, Logger, Rotation};

#[test]
fn error_events_are_duplicated_into_the_error_file() -> Result<(), Box<dyn std::error::Error>> {
    let tmp_dir = tempdir()?;
    let log_dir = tmp_dir.path().join("logs");

    let logger = Logger::builder()
        .name("svc")
        .console(false)
        .level(LevelFilter::INFO)
        .path(&log_dir)
        .rotation(Rotation::NEVER)
        .error_file()
        .init()?;

    tracing::info!("routine progress");
    tracing::error!("request failed");

    std::thread::sleep(Duration::from_millis(30));
    drop(logger);

    let main = fs::read_to_string(log_dir.join("svc.log"))?;
    assert!(main.contains("routine progress"));
    assert!(main.contains("request failed"));

    let errors = fs::read_to_string(log_dir.join("svc.error.log"))?;
    assert!(errors.contains("request failed"));
    assert!(!errors.contains("routine progress"));

    Ok(())
}
