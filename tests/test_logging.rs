// Copyright (C) Brian G. Milnes 2025

//! Tests for per-file log buffers and the tool runner

use anyhow::{anyhow, Result};

use deroot::logging::logging::{Level, LogBuffer, ToolLogger};
use deroot::tool_runner::tool_runner::{run_tool, ToolConfig};

#[test]
fn test_log_buffer_keeps_order_and_counts_warnings() {
    let mut buffer = LogBuffer::new();
    assert!(buffer.entries().is_empty());
    buffer.info("parsed");
    buffer.warn("skipped");
    buffer.info("done");

    assert_eq!(buffer.warnings(), 1);
    let levels: Vec<Level> = buffer.entries().iter().map(|(level, _)| *level).collect();
    assert_eq!(levels, vec![Level::Info, Level::Warning, Level::Info]);
}

#[test]
fn test_logger_absorbs_buffers() {
    let mut logger = ToolLogger::new_disabled();
    let mut first = LogBuffer::new();
    first.warn("a.php: syntax error");
    let mut second = LogBuffer::new();
    second.warn("b.php: syntax error");
    second.info("b.php: 2 paths");

    logger.absorb(&first);
    logger.absorb(&second);
    assert_eq!(logger.warnings(), 2);
    assert!(logger.log_path().is_none());
}

#[test]
fn test_run_tool_without_logging() -> Result<()> {
    let config = ToolConfig::new("deroot-test", ".".into()).without_logging();
    assert!(!config.enable_logging);

    let mut ran = false;
    run_tool(config, |logger| {
        logger.log("working");
        ran = true;
        Ok("Summary: nothing".to_string())
    })?;
    assert!(ran);
    Ok(())
}

#[test]
fn test_run_tool_propagates_failure() {
    let config = ToolConfig::new("deroot-test", ".".into()).without_logging();
    let result = run_tool(config, |_| Err(anyhow!("manifest missing")));
    assert_eq!(result.map_err(|e| e.to_string()), Err("manifest missing".to_string()));
}
