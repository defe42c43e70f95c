use crate::error::CommandError;
use crate::service::RedactionService;
use redact_core::RedactionLevel;
use std::path::PathBuf;

pub async fn handle(
    service: &RedactionService,
    input: PathBuf,
    level: RedactionLevel,
) -> Result<String, CommandError> {
    let display = input.display().to_string();

    match service.preview(input, level).await? {
        Some(mut text) => {
            if !text.ends_with('\n') {
                text.push('\n');
            }
            Ok(text)
        }
        None => Ok(format!(
            "Preview unavailable for {display}: only .txt and .docx files can be previewed\n"
        )),
    }
}
