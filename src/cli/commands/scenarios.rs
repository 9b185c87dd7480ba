//! Scenarios command handlers
//!
//! Implements `scenarios list` and `scenarios show`.

use std::fmt::Write as _;

use crate::cli::args::{OutputFormat, ScenariosListArgs, ScenariosShowArgs};
use crate::error::AlertTrustError;
use crate::scenarios::{self, ScenarioCategory};

/// List available built-in scenarios.
///
/// Displays scenarios grouped by category (human) or as a JSON array.
///
/// # Errors
///
/// Returns a JSON error if output serialization fails.
pub fn list(args: &ScenariosListArgs) -> Result<(), AlertTrustError> {
    let results = scenarios::list_scenarios(args.category, args.tag.as_deref());

    match args.format {
        OutputFormat::Json => {
            let json_entries: Vec<serde_json::Value> = results
                .iter()
                .map(|s| {
                    serde_json::json!({
                        "name": s.name,
                        "description": s.description,
                        "category": s.category.to_string(),
                        "tags": s.tags,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&json_entries)?);
        }
        OutputFormat::Human => {
            if results.is_empty() {
                println!("No scenarios match the given filters.");
                return Ok(());
            }

            let total = results.len();
            println!("Built-in Scenarios ({total} available)\n");

            for cat in ScenarioCategory::all() {
                let in_cat: Vec<_> = results.iter().filter(|s| s.category == *cat).collect();
                if in_cat.is_empty() {
                    continue;
                }

                println!("  {}", cat.label());
                for s in in_cat {
                    let tags = format!("[{}]", s.tags.join(", "));
                    println!("    {:<40}{tags}", s.name);
                    println!("      {}", s.description);
                }
                println!();
            }

            println!("Replay a scenario: alert-trust replay --scenario <name>");
            println!("View YAML:         alert-trust scenarios show <name>");
        }
    }

    Ok(())
}

/// Display the YAML trace of a built-in scenario.
///
/// Prints raw YAML to stdout, suitable for piping into `replay --trace`.
///
/// # Errors
///
/// Returns a usage error if the scenario name is not found.
pub fn show(args: &ScenariosShowArgs) -> Result<(), AlertTrustError> {
    let scenario = scenarios::find_scenario(&args.name)
        .ok_or_else(|| AlertTrustError::Usage(unknown_scenario_message(&args.name)))?;

    print!("{}", scenario.yaml);
    Ok(())
}

fn unknown_scenario_message(name: &str) -> String {
    let mut message = format!("Unknown scenario '{name}'");

    if let Some(suggestion) = scenarios::suggest_scenario(name) {
        let _ = write!(message, "\n\nDid you mean '{suggestion}'?");
    }

    message.push_str("\n\nAvailable scenarios:");
    for name in scenarios::list_scenario_names() {
        let _ = write!(message, "\n  {name}");
    }

    message.push_str("\n\nUse 'alert-trust scenarios list' for full details.");
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_message_suggests_and_lists() {
        let message = unknown_scenario_message("quiet-episod");
        assert!(message.contains("Did you mean 'quiet-episode'?"));
        assert!(message.contains("\n  blackout-no-attack"));
    }

    #[test]
    fn show_unknown_is_usage_error() {
        let err = show(&ScenariosShowArgs {
            name: "nope-nope-nope".to_string(),
        })
        .unwrap_err();
        assert_eq!(err.exit_code(), crate::error::ExitCode::USAGE_ERROR);
    }
}
