use std::fmt::Write;

use allerlens_core::domain::{
    allergy::{
        entities::{AllergyCategory, CustomAllergy, UserAllergy},
        selection::{AllergySelection, COMMON_ALLERGIES, CustomAllergyDraft, display_label},
    },
    menu::entities::{MenuFile, ParseStatus, UploadedMenu},
    profile::entities::UserProfile,
    safety::entities::{SafetyAnswer, SafetyVerdict},
    session::AuthForm,
    workflow::{StatusKind, StatusLine},
};

const RESET: &str = "\x1b[0m";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const GREY: &str = "\x1b[90m";

pub fn verdict_badge(verdict: SafetyVerdict) -> String {
    let (color, text) = match verdict {
        SafetyVerdict::Safe => (GREEN, "SAFE"),
        SafetyVerdict::Unsafe => (RED, "UNSAFE"),
        SafetyVerdict::NeedsReview => (YELLOW, "NEEDS REVIEW"),
        SafetyVerdict::Error => (RED, "ERROR"),
    };
    format!("{}[{}]{}", color, text, RESET)
}

/// Every field of the answer is printed as received.
pub fn render_answer(answer: &SafetyAnswer) -> String {
    let mut out = format!("{} {}\n", verdict_badge(answer.result), answer.summary);

    if !answer.reasons.is_empty() {
        out.push_str("Reasons:\n");
        for reason in &answer.reasons {
            let _ = writeln!(out, "  - {}", reason);
        }
    }

    if !answer.alternatives.is_empty() {
        out.push_str("Alternatives:\n");
        for alternative in &answer.alternatives {
            let _ = writeln!(out, "  - {}", alternative);
        }
    }

    if !answer.citations.is_empty() {
        out.push_str("Sources:\n");
        for citation in &answer.citations {
            let _ = writeln!(
                out,
                "  {}p.{} {}: {}{}",
                GREY, citation.page, citation.kind, citation.text, RESET
            );
        }
    }

    out
}

pub fn render_status(status: &StatusLine) -> String {
    match status.kind {
        StatusKind::Info => status.text.clone(),
        StatusKind::Error => format!("{}{}{}", RED, status.text, RESET),
    }
}

pub fn render_allergies(selection: &AllergySelection, draft: &CustomAllergyDraft) -> String {
    let mut out = String::from("Common allergies:\n");

    for (i, label) in COMMON_ALLERGIES.iter().enumerate() {
        let mark = if selection.contains(label) { "x" } else { " " };
        let _ = writeln!(out, "  {}. [{}] {}", i + 1, mark, display_label(label));
    }

    let custom: Vec<&String> = selection
        .labels()
        .iter()
        .filter(|label| !COMMON_ALLERGIES.contains(&label.as_str()))
        .collect();
    if !custom.is_empty() {
        out.push_str("Custom:\n");
        for label in custom {
            let _ = writeln!(out, "  [x] {}", label);
        }
    }

    if selection.is_empty() {
        out.push_str("No allergies selected.\n");
    } else {
        let _ = writeln!(out, "Selected: {}", selection.labels().join(", "));
    }

    if draft.open {
        out.push_str("Custom allergy form is open: type the allergen, or `cancel`.\n");
    }

    out
}

pub fn render_workflow(
    file: Option<&MenuFile>,
    menu: Option<&UploadedMenu>,
    status: Option<&StatusLine>,
) -> String {
    let mut out = String::new();

    match file {
        Some(file) => {
            let _ = writeln!(out, "File: {} ({}, {} bytes)", file.file_name, file.mime_type, file.size());
        }
        None => out.push_str("File: none selected\n"),
    }

    match menu {
        Some(menu) => {
            let parsed = match menu.parse_status {
                ParseStatus::NotParsed => "not parsed".to_string(),
                ParseStatus::Parsed { pages } => format!("parsed, {} page(s)", pages),
            };
            let _ = writeln!(out, "Menu: {} ({})", menu.id, parsed);
        }
        None => out.push_str("Menu: not uploaded\n"),
    }

    if let Some(status) = status {
        let _ = writeln!(out, "{}", render_status(status));
    }

    out
}

pub fn render_setup() -> String {
    "\
Setup required

AllerLens needs a hosted identity project before you can sign in.
  1. Create a project with your identity provider.
  2. Copy the project URL and the anonymous API key.
  3. Set them in .env or the environment:
       ALLERLENS_IDENTITY_URL=<project url>
       ALLERLENS_IDENTITY_ANON_KEY=<anon key>
  4. Start allerlens again.
"
    .to_string()
}

pub fn render_signed_out(form: AuthForm) -> String {
    match form {
        AuthForm::SignIn => "Sign in: signin <email> <password>  (or `oauth`, or `signup` to create an account)".to_string(),
        AuthForm::SignUp => "Create account: signup <email> <password> [full name]  (or `signin` if you have one)".to_string(),
    }
}

pub fn render_profile(profile: &UserProfile) -> String {
    let field = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    format!(
        "Email: {}\nName: {}\nPhone: {}\nDate of birth: {}\nEmergency contact: {} {}\n",
        profile.email,
        field(&profile.full_name),
        field(&profile.phone),
        field(&profile.date_of_birth),
        field(&profile.emergency_contact_name),
        field(&profile.emergency_contact_phone),
    )
}

pub fn render_categories(categories: &[AllergyCategory]) -> String {
    if categories.is_empty() {
        return "No allergy categories.\n".to_string();
    }

    let mut out = String::new();
    for category in categories {
        let icon = category.icon.as_deref().unwrap_or(" ");
        let _ = write!(out, "  {} {}", icon, category.name);
        if let Some(description) = &category.description {
            let _ = write!(out, " {}{}{}", GREY, description, RESET);
        }
        out.push('\n');
    }
    out
}

pub fn render_saved(allergies: &[UserAllergy], custom: &[CustomAllergy]) -> String {
    if allergies.is_empty() && custom.is_empty() {
        return "No saved allergies.\n".to_string();
    }

    let mut out = String::new();
    for allergy in allergies {
        let name = allergy
            .category
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or("unknown category");
        let _ = writeln!(out, "  {} ({})", name, allergy.severity);
    }
    for allergy in custom {
        let _ = writeln!(out, "  {} ({}, custom)", allergy.name, allergy.severity);
    }
    out
}
