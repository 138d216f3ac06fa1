//! Line commands for the interactive dashboard.

use thiserror::Error;

use crate::filters::FilterChange;

pub const HELP: &str = "\
Commands:
  location [name]       filter by location (no name clears it)
  timezone [zone]       filter by timezone (no zone clears it)
  rate <min> <max>      hourly rate range in dollars
  rating <min>          minimum rating, 0 to 5
  available on|off      only show available freelancers
  skill <description>   toggle a skill
  search [term]         narrow the list by name or skill
  reset                 restore the default filters
  refresh               fetch again with the current filters
  logout                sign out
  quit                  leave";

#[derive(Debug, Clone, PartialEq)]
pub enum BrowseCommand {
    Change(FilterChange),
    Search(String),
    Refresh,
    Logout,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command: {0} (try `help`)")]
    Unknown(String),
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("not a number: {0}")]
    InvalidNumber(String),
    #[error("expected on or off, got {0}")]
    InvalidToggle(String),
}

pub fn parse_command(line: &str) -> Result<Option<BrowseCommand>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let argument = (!rest.is_empty()).then(|| rest.to_string());

    let command = match word.to_lowercase().as_str() {
        "location" => BrowseCommand::Change(FilterChange::Location(argument)),
        "timezone" => BrowseCommand::Change(FilterChange::Timezone(argument)),
        "rate" => {
            let mut bounds = rest.split_whitespace();
            let min = parse_number(bounds.next(), "min")?;
            let max = parse_number(bounds.next(), "max")?;
            BrowseCommand::Change(FilterChange::HourlyRate { min, max })
        }
        "rating" => {
            let min = rest
                .parse::<f64>()
                .map_err(|_| number_error(rest, "rating"))?;
            BrowseCommand::Change(FilterChange::RatingMin(min))
        }
        "available" => match rest.to_lowercase().as_str() {
            "on" | "true" | "yes" => BrowseCommand::Change(FilterChange::AvailableOnly(true)),
            "off" | "false" | "no" => BrowseCommand::Change(FilterChange::AvailableOnly(false)),
            "" => return Err(CommandError::MissingArgument("on|off")),
            other => return Err(CommandError::InvalidToggle(other.to_string())),
        },
        "skill" => BrowseCommand::Change(FilterChange::ToggleSkill(
            argument.ok_or(CommandError::MissingArgument("description"))?,
        )),
        "search" => BrowseCommand::Search(rest.to_string()),
        "reset" => BrowseCommand::Change(FilterChange::Reset),
        "refresh" => BrowseCommand::Refresh,
        "logout" => BrowseCommand::Logout,
        "help" | "?" => BrowseCommand::Help,
        "quit" | "exit" | "q" => BrowseCommand::Quit,
        _ => return Err(CommandError::Unknown(word.to_string())),
    };
    Ok(Some(command))
}

fn parse_number(value: Option<&str>, name: &'static str) -> Result<u32, CommandError> {
    let value = value.ok_or(CommandError::MissingArgument(name))?;
    value
        .trim_start_matches('$')
        .parse()
        .map_err(|_| CommandError::InvalidNumber(value.to_string()))
}

fn number_error(value: &str, name: &'static str) -> CommandError {
    if value.is_empty() {
        CommandError::MissingArgument(name)
    } else {
        CommandError::InvalidNumber(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_line_is_ignored() {
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn test_location_with_spaces_and_clearing() {
        assert_eq!(
            parse_command("location New York"),
            Ok(Some(BrowseCommand::Change(FilterChange::Location(Some(
                "New York".to_string()
            )))))
        );
        assert_eq!(
            parse_command("location"),
            Ok(Some(BrowseCommand::Change(FilterChange::Location(None))))
        );
    }

    #[test]
    fn test_rate_range() {
        assert_eq!(
            parse_command("rate $20 90"),
            Ok(Some(BrowseCommand::Change(FilterChange::HourlyRate {
                min: 20,
                max: 90
            })))
        );
        assert_eq!(
            parse_command("rate 20"),
            Err(CommandError::MissingArgument("max"))
        );
        assert_eq!(
            parse_command("rate a 20"),
            Err(CommandError::InvalidNumber("a".to_string()))
        );
    }

    #[test]
    fn test_rating_and_availability() {
        assert_eq!(
            parse_command("rating 4.5"),
            Ok(Some(BrowseCommand::Change(FilterChange::RatingMin(4.5))))
        );
        assert_eq!(
            parse_command("rating"),
            Err(CommandError::MissingArgument("rating"))
        );
        assert_eq!(
            parse_command("available ON"),
            Ok(Some(BrowseCommand::Change(FilterChange::AvailableOnly(true))))
        );
        assert_eq!(
            parse_command("available maybe"),
            Err(CommandError::InvalidToggle("maybe".to_string()))
        );
    }

    #[test]
    fn test_skill_needs_description() {
        assert_eq!(
            parse_command("skill Machine Learning"),
            Ok(Some(BrowseCommand::Change(FilterChange::ToggleSkill(
                "Machine Learning".to_string()
            ))))
        );
        assert_eq!(
            parse_command("skill"),
            Err(CommandError::MissingArgument("description"))
        );
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(
            parse_command("search  ada "),
            Ok(Some(BrowseCommand::Search("ada".to_string())))
        );
        assert_eq!(
            parse_command("reset"),
            Ok(Some(BrowseCommand::Change(FilterChange::Reset)))
        );
        assert_eq!(parse_command("QUIT"), Ok(Some(BrowseCommand::Quit)));
        assert_eq!(
            parse_command("dance"),
            Err(CommandError::Unknown("dance".to_string()))
        );
    }
}
