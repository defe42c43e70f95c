use crate::cli::PatternCommands;
use crate::error::CommandError;
use crate::service::RedactionService;

pub fn handle(service: &RedactionService, cmd: PatternCommands) -> Result<String, CommandError> {
    match cmd {
        PatternCommands::List => Ok(list(service)),
        PatternCommands::Add { name, regex } => {
            service.add_pattern(&name, &regex)?;
            Ok(format!("✓ Saved pattern: {name}\n"))
        }
        PatternCommands::Remove { name } => {
            if service.remove_pattern(&name)? {
                Ok(format!("✓ Removed pattern: {name}\n"))
            } else {
                Err(CommandError::new(
                    "PATTERN_NOT_FOUND",
                    format!("No custom pattern named '{name}'"),
                ))
            }
        }
    }
}

fn list(service: &RedactionService) -> String {
    let context = &service.state().context;
    let custom = context.custom_patterns();

    let mut out = String::from("Patterns (applied at levels 2 and 3, in order):\n");
    for pattern in context.pattern_snapshot().iter() {
        let marker = if custom.contains_key(pattern.name()) { "custom" } else { "built-in" };
        out.push_str(&format!("  {:<16} [{marker}] {}\n", pattern.name(), pattern.as_str()));
    }
    out
}
