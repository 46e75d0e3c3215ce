use std::path::PathBuf;

use allerlens_core::domain::allergy::{entities::Severity, selection::COMMON_ALLERGIES};
use thiserror::Error;

/// One line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    Health,
    Status,

    // identity
    SignIn { email: String, password: String },
    SignUp {
        email: String,
        password: String,
        full_name: Option<String>,
    },
    ShowSignIn,
    ShowSignUp,
    OAuth,
    SignOut,

    // workflow
    File(PathBuf),
    Upload,
    Parse,
    Allergies,
    Toggle(String),
    Custom(Option<String>),
    Cancel,
    Remove(String),
    Ask(String),

    // profile and saved allergies
    Profile,
    ProfileSet { field: String, value: String },
    Categories,
    Saved,
    LoadSaved,
    Save { label: String, severity: Option<Severity> },
    Unsave(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ParseError(pub String);

fn usage(text: &str) -> ParseError {
    ParseError(format!("usage: {}", text))
}

/// `toggle 2` picks the second common allergen; anything else is taken as
/// the label itself.
fn allergy_label(arg: &str) -> String {
    arg.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| COMMON_ALLERGIES.get(i))
        .map(|label| label.to_string())
        .unwrap_or_else(|| arg.to_string())
}

pub fn parse_command(line: &str) -> Result<Option<Command>, ParseError> {
    let line = line.trim();
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    let command = match name.to_ascii_lowercase().as_str() {
        "" => return Ok(None),
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "health" => Command::Health,
        "status" => Command::Status,

        "signin" | "login" if rest.is_empty() => Command::ShowSignIn,
        "signin" | "login" => {
            let (email, password) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| usage("signin <email> <password>"))?;
            Command::SignIn {
                email: email.to_string(),
                password: password.trim().to_string(),
            }
        }
        "signup" | "register" if rest.is_empty() => Command::ShowSignUp,
        "signup" | "register" => {
            let mut parts = rest.splitn(3, char::is_whitespace);
            let (Some(email), Some(password)) = (parts.next(), parts.next()) else {
                return Err(usage("signup <email> <password> [full name]"));
            };
            let full_name = parts
                .next()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string);
            Command::SignUp {
                email: email.to_string(),
                password: password.to_string(),
                full_name,
            }
        }
        "oauth" | "google" => Command::OAuth,
        "signout" | "logout" => Command::SignOut,

        "file" if rest.is_empty() => return Err(usage("file <path>")),
        "file" => Command::File(PathBuf::from(rest)),
        "upload" => Command::Upload,
        "parse" => Command::Parse,
        "allergies" | "list" => Command::Allergies,
        "toggle" if rest.is_empty() => return Err(usage("toggle <label|number>")),
        "toggle" => Command::Toggle(allergy_label(rest)),
        "custom" if rest.is_empty() => Command::Custom(None),
        "custom" => Command::Custom(Some(rest.to_string())),
        "cancel" => Command::Cancel,
        "remove" if rest.is_empty() => return Err(usage("remove <label>")),
        "remove" => Command::Remove(allergy_label(rest)),
        "ask" => Command::Ask(rest.to_string()),

        "profile" if rest.is_empty() => Command::Profile,
        "profile" => {
            let rest = rest.strip_prefix("set").map(str::trim).unwrap_or(rest);
            let (field, value) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| usage("profile set <field> <value>"))?;
            Command::ProfileSet {
                field: field.to_string(),
                value: value.trim().to_string(),
            }
        }
        "categories" => Command::Categories,
        "saved" => Command::Saved,
        "load-saved" | "load" => Command::LoadSaved,
        "save" if rest.is_empty() => return Err(usage("save <label> [mild|moderate|severe]")),
        "save" => {
            let (label, severity) = match rest.rsplit_once(char::is_whitespace) {
                Some((label, last)) => match last.parse::<Severity>() {
                    Ok(severity) => (label.trim(), Some(severity)),
                    Err(_) => (rest, None),
                },
                None => (rest, None),
            };
            Command::Save {
                label: allergy_label(label),
                severity,
            }
        }
        "unsave" if rest.is_empty() => return Err(usage("unsave <label>")),
        "unsave" => Command::Unsave(allergy_label(rest)),

        other => return Err(ParseError(format!("unknown command: {} (try help)", other))),
    };

    Ok(Some(command))
}

pub const HELP: &str = "\
Account
  signin [<email> <password>]     sign in, or show the sign-in form
  signup [<email> <password> [full name]]
  oauth                           print the Google sign-in link
  signout
  profile | profile set <field> <value>

Menu
  file <path>                     pick a menu image or PDF
  upload                          upload the picked file
  parse                           parse the uploaded menu for your allergies
  ask <question>                  ask about the parsed menu

Allergies
  allergies                       show the selection
  toggle <label|number>           select or deselect a common allergen
  custom [<text>]                 add your own allergen
  cancel                          close the custom allergen form
  remove <label>
  categories | saved | load-saved
  save <label> [severity] | unsave <label>

  status | health | help | quit";

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        parse_command(line).unwrap().unwrap()
    }

    #[test]
    fn test_blank_line_is_nothing() {
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn test_toggle_by_number_or_label() {
        assert_eq!(parse("toggle 2"), Command::Toggle("tree_nut".to_string()));
        assert_eq!(parse("toggle kiwi"), Command::Toggle("kiwi".to_string()));
        assert_eq!(parse("toggle 42"), Command::Toggle("42".to_string()));
        assert!(parse_command("toggle").is_err());
    }

    #[test]
    fn test_ask_keeps_the_whole_question() {
        assert_eq!(
            parse("ask  Is the pad thai safe?  "),
            Command::Ask("Is the pad thai safe?".to_string())
        );
        assert_eq!(parse("ask"), Command::Ask(String::new()));
    }

    #[test]
    fn test_sign_in_forms() {
        assert_eq!(parse("signin"), Command::ShowSignIn);
        assert_eq!(parse("register"), Command::ShowSignUp);
        assert_eq!(
            parse("login sam@example.com hunter2"),
            Command::SignIn {
                email: "sam@example.com".to_string(),
                password: "hunter2".to_string(),
            }
        );
        assert_eq!(
            parse("signup sam@example.com hunter2 Sam Rivera"),
            Command::SignUp {
                email: "sam@example.com".to_string(),
                password: "hunter2".to_string(),
                full_name: Some("Sam Rivera".to_string()),
            }
        );
        assert!(parse_command("signin sam@example.com").is_err());
    }

    #[test]
    fn test_profile_set() {
        assert_eq!(
            parse("profile set phone +1 555 0100"),
            Command::ProfileSet {
                field: "phone".to_string(),
                value: "+1 555 0100".to_string(),
            }
        );
        assert_eq!(parse("profile"), Command::Profile);
    }

    #[test]
    fn test_save_with_optional_severity() {
        assert_eq!(
            parse("save peanut severe"),
            Command::Save {
                label: "peanut".to_string(),
                severity: Some(Severity::Severe),
            }
        );
        assert_eq!(
            parse("save passion fruit"),
            Command::Save {
                label: "passion fruit".to_string(),
                severity: None,
            }
        );
    }

    #[test]
    fn test_unknown_command() {
        let error = parse_command("dance").unwrap_err();
        assert!(error.to_string().contains("unknown command: dance"));
    }
}
