use crate::error::CommandError;
use crate::service::RedactionService;
use redact_core::RedactionLevel;
use std::path::PathBuf;

pub async fn handle(
    service: &RedactionService,
    input: PathBuf,
    output: PathBuf,
    level: RedactionLevel,
) -> Result<String, CommandError> {
    let entry = service.redact_file(input, output, level).await?;

    Ok(format!(
        "✓ Redacted {}\n  Output: {}\n  Last operation: {}\n",
        entry.input_path.display(),
        entry.output_path.display(),
        entry.description()
    ))
}
