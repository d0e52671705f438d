use super::{CommandRecord, OperationLog};
use crate::git::parser::DecodeSkip;
use std::path::Path;

/// Forwards events to `tracing`; the host decides where they end up
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl OperationLog for TracingLog {
    fn command_finished(&self, record: &CommandRecord<'_>) {
        let elapsed_ms = record.elapsed.as_millis() as u64;
        match record.exit_code {
            Some(0) => tracing::debug!(
                dir = %record.working_dir.display(),
                command = %record.command_line(),
                elapsed_ms,
                "git command finished"
            ),
            Some(code) => tracing::info!(
                dir = %record.working_dir.display(),
                command = %record.command_line(),
                exit_code = code,
                elapsed_ms,
                "git command failed"
            ),
            None => tracing::warn!(
                dir = %record.working_dir.display(),
                command = %record.command_line(),
                elapsed_ms,
                "git command did not exit normally"
            ),
        }
    }

    fn line_skipped(&self, working_dir: &Path, skip: &DecodeSkip) {
        tracing::warn!(
            dir = %working_dir.display(),
            parser = %skip.parser,
            line_number = skip.line_number,
            line = %skip.line,
            reason = %skip.reason,
            "skipped undecodable line"
        );
    }
}
