use crate::cli::ConfigCommands;
use crate::error::CommandError;
use crate::state::AppState;

pub fn handle(state: &AppState, cmd: ConfigCommands) -> Result<String, CommandError> {
    match cmd {
        ConfigCommands::Path => Ok(format!("{}\n", state.config_path.display())),
        ConfigCommands::Show => toml::to_string_pretty(&state.config()).map_err(|e| {
            CommandError::new("SERIALIZATION_ERROR", format!("Failed to render settings: {e}"))
        }),
    }
}
