use std::io::Write;

use allerlens_core::{
    application::AllerLensService,
    domain::{
        allergy::{
            entities::Severity,
            services::AllergyRecordService,
            value_objects::{CustomAllergyUpdate, UserAllergyUpdate},
        },
        authentication::entities::{OAuthProvider, PasswordCredentials, SignUpInput, SignUpOutcome},
        common::entities::app_errors::CoreError,
        menu::{entities::MenuFile, ports::MenuBackend},
        profile::{services::ProfileService, value_objects::ProfileUpdate},
        session::{GateView, SessionContext, SessionGate, SessionSubscription},
        workflow::{MenuWorkflow, WorkflowError},
    },
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;
use uuid::Uuid;

use self::commands::{Command, HELP, parse_command};
use self::render::*;

pub mod commands;
pub mod render;

/// Interactive front-end: the identity gate in front of the menu workflow.
pub struct Console<B> {
    workflow: MenuWorkflow<B>,
    gate: SessionGate,
    session: Option<SessionContext<AllerLensService>>,
    oauth_redirect: String,
}

fn say(text: impl AsRef<str>) {
    println!("{}", text.as_ref().trim_end());
}

fn prompt(text: &str) {
    print!("{}", text);
    let _ = std::io::stdout().flush();
}

impl<B> Console<B>
where
    B: MenuBackend,
{
    pub fn new(
        workflow: MenuWorkflow<B>,
        gate: SessionGate,
        session: Option<SessionContext<AllerLensService>>,
        oauth_redirect: String,
    ) -> Self {
        Self {
            workflow,
            gate,
            session,
            oauth_redirect,
        }
    }

    pub async fn run(&mut self) -> Result<(), anyhow::Error> {
        let Some(session) = self.session.as_ref() else {
            say(render_setup());
            return Ok(());
        };

        // Held for the lifetime of the console; dropping it unsubscribes.
        let mut subscription = session.subscribe();
        session.initialize().await;

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut last_view = None;

        loop {
            let view = self.view(&mut subscription);
            if last_view.as_ref() != Some(&view) {
                self.announce(&view);
                last_view = Some(view.clone());
            }

            prompt(&self.prompt_text(&view));
            let Some(line) = lines.next_line().await? else {
                break;
            };

            if self.workflow.custom_draft().open {
                match draft_line(&line) {
                    DraftLine::Quit => break,
                    DraftLine::Help => say(HELP),
                    DraftLine::Cancel => self.workflow.cancel_custom_allergy(),
                    DraftLine::Input(text) => {
                        if !self.add_custom(text) {
                            say(FORM_RETRY);
                        }
                    }
                }
                continue;
            }

            let command = match parse_command(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    say(e.to_string());
                    continue;
                }
            };

            if command == Command::Quit {
                break;
            }

            self.dispatch(&view, command).await;
        }

        subscription.unsubscribe();
        Ok(())
    }

    fn view(&self, subscription: &mut SessionSubscription) -> GateView {
        let snapshot = subscription.seen();
        self.gate.view(Some(&snapshot))
    }

    fn announce(&self, view: &GateView) {
        match view {
            GateView::SetupRequired => say(render_setup()),
            GateView::Loading => say("Loading..."),
            GateView::SignedOut(form) => say(render_signed_out(*form)),
            GateView::SignedIn(user) => {
                say(format!("Signed in as {}. Type `help` for commands.", user.display_name()));
            }
        }
    }

    fn prompt_text(&self, view: &GateView) -> String {
        if self.workflow.custom_draft().open {
            return "custom allergy> ".to_string();
        }

        match view {
            GateView::SignedIn(_) => format!("allerlens [{}]> ", self.workflow.state().name()),
            _ => "allerlens> ".to_string(),
        }
    }

    fn add_custom(&mut self, text: &str) -> bool {
        self.workflow.set_custom_allergy_input(text);
        let added = self.workflow.add_custom_allergy();
        if added {
            say(format!("Added {}.", text.trim()));
        }
        added
    }

    async fn dispatch(&mut self, view: &GateView, command: Command) {
        match command {
            Command::Help => say(HELP),
            Command::Quit => {}
            Command::Health => match self.workflow.check_health().await {
                Ok(status) => say(format!("Backend status: {}", status.status)),
                Err(e) => say(format!("Backend unreachable: {}", e)),
            },
            Command::ShowSignIn => self.gate.show_sign_in(),
            Command::ShowSignUp => self.gate.show_sign_up(),
            Command::SignIn { email, password } => self.sign_in(email, password).await,
            Command::SignUp {
                email,
                password,
                full_name,
            } => self.sign_up(email, password, full_name).await,
            Command::OAuth => self.oauth().await,
            command => match view {
                GateView::SignedIn(user) => self.signed_in(user.id, command).await,
                GateView::SignedOut(form) => say(render_signed_out(*form)),
                GateView::Loading => say("Still checking your session..."),
                GateView::SetupRequired => say(render_setup()),
            },
        }
    }

    async fn signed_in(&mut self, user_id: Uuid, command: Command) {
        match command {
            Command::SignOut => self.sign_out().await,
            Command::Status => say(render_workflow(
                self.workflow.file(),
                self.workflow.menu(),
                self.workflow.status(),
            )),

            Command::File(path) => match MenuFile::from_path(&path).await {
                Ok(file) => {
                    say(format!("Selected {} ({} bytes).", file.file_name, file.size()));
                    self.workflow.select_file(file);
                }
                Err(e) => say(format!("Cannot read {}: {}", path.display(), e)),
            },
            Command::Upload => {
                let result = self.workflow.upload().await;
                self.report_step(result.map(|_| ()));
            }
            Command::Parse => {
                if self.workflow.menu().is_some() {
                    say("Parsing menu...");
                }
                let result = self.workflow.parse().await;
                self.report_step(result.map(|_| ()));
            }
            Command::Ask(question) => match self.workflow.ask(&question).await {
                Ok(answer) => say(render_answer(answer)),
                Err(e) => say(e.to_string()),
            },

            Command::Allergies => say(render_allergies(
                self.workflow.allergies(),
                self.workflow.custom_draft(),
            )),
            Command::Toggle(label) => {
                let selected = self.workflow.toggle_allergy(&label);
                say(format!("{} {}.", if selected { "Selected" } else { "Deselected" }, label));
            }
            Command::Custom(None) => self.workflow.open_custom_allergy(),
            Command::Custom(Some(text)) => {
                self.workflow.open_custom_allergy();
                if !self.add_custom(&text) {
                    say(one_shot_rejected(&text));
                }
                self.workflow.cancel_custom_allergy();
            }
            Command::Cancel => self.workflow.cancel_custom_allergy(),
            Command::Remove(label) => {
                if !self.workflow.remove_allergy(&label) {
                    say(format!("{} is not selected.", label));
                }
            }

            Command::Profile => self.show_profile().await,
            Command::ProfileSet { field, value } => self.set_profile(field, value).await,
            Command::Categories => self.categories().await,
            Command::Saved => self.saved(user_id).await,
            Command::LoadSaved => self.load_saved(user_id).await,
            Command::Save { label, severity } => self.save(user_id, label, severity).await,
            Command::Unsave(label) => self.unsave(user_id, label).await,

            Command::Help
            | Command::Quit
            | Command::Health
            | Command::ShowSignIn
            | Command::ShowSignUp
            | Command::SignIn { .. }
            | Command::SignUp { .. }
            | Command::OAuth => {}
        }
    }

    fn report_step(&self, result: Result<(), WorkflowError>) {
        match result {
            Ok(()) | Err(WorkflowError::Backend(_)) => {
                if let Some(status) = self.workflow.status() {
                    say(render_status(status));
                }
            }
            Err(gate) => say(gate.to_string()),
        }
    }

    fn session(&self) -> Option<&SessionContext<AllerLensService>> {
        self.session.as_ref()
    }

    async fn sign_in(&mut self, email: String, password: String) {
        let Some(session) = self.session() else {
            return;
        };

        if let Err(e) = session.sign_in(PasswordCredentials { email, password }).await {
            error!("Sign in failed: {}", e.with_body());
            say(format!("Sign in failed: {}", e.with_body()));
        }
    }

    async fn sign_up(&mut self, email: String, password: String, full_name: Option<String>) {
        let Some(session) = self.session() else {
            return;
        };

        let input = SignUpInput {
            email,
            password,
            full_name,
        };

        match session.sign_up(input).await {
            Ok(SignUpOutcome::SignedIn(_)) => {}
            Ok(SignUpOutcome::ConfirmationRequired(user)) => {
                say(format!(
                    "Check {} for a confirmation link, then sign in.",
                    user.email.as_deref().unwrap_or("your inbox")
                ));
                self.gate.show_sign_in();
            }
            Err(e) => say(format!("Sign up failed: {}", e.with_body())),
        }
    }

    async fn oauth(&self) {
        let Some(session) = self.session() else {
            return;
        };

        match session
            .sign_in_with_oauth(OAuthProvider::Google, self.oauth_redirect.clone())
            .await
        {
            Ok(redirect) => say(format!("Open this link to continue with Google:\n{}", redirect.url)),
            Err(e) => say(format!("Google sign in failed: {}", e)),
        }
    }

    async fn sign_out(&mut self) {
        let Some(session) = self.session() else {
            return;
        };

        if let Err(e) = session.sign_out().await {
            say(format!("Sign out failed: {}", e));
        }
    }

    async fn show_profile(&self) {
        let Some(session) = self.session() else {
            return;
        };

        session.refresh_profile().await;
        match session.snapshot().profile {
            Some(profile) => say(render_profile(&profile)),
            None => say("No profile yet. Use `profile set <field> <value>` to create it."),
        }
    }

    async fn set_profile(&self, field: String, value: String) {
        let Some(session) = self.session() else {
            return;
        };

        let mut update = ProfileUpdate::default();
        if let Err(e) = update.set(&field, value) {
            say(e);
            return;
        }

        match session.update_profile(update.clone()).await {
            Ok(profile) => say(render_profile(&profile)),
            Err(CoreError::NotFound) => self.create_profile(update).await,
            Err(e) => say(format!("Profile update failed: {}", e.with_body())),
        }
    }

    /// First profile write for an account that has no row yet.
    async fn create_profile(&self, mut update: ProfileUpdate) {
        let Some(session) = self.session() else {
            return;
        };
        let Some(user) = session.user() else {
            return;
        };

        if update.email.is_none() {
            update.email = user.email.clone();
        }

        match session.service().create_profile(user.id, update).await {
            Ok(profile) => {
                session.refresh_profile().await;
                say(render_profile(&profile));
            }
            Err(e) => say(format!("Could not create profile: {}", e.with_body())),
        }
    }

    async fn categories(&self) {
        let Some(session) = self.session() else {
            return;
        };

        match session.service().get_categories().await {
            Ok(categories) => say(render_categories(&categories)),
            Err(e) => say(format!("Could not load categories: {}", e)),
        }
    }

    async fn saved(&self, user_id: Uuid) {
        let Some(session) = self.session() else {
            return;
        };

        let service = session.service();
        let result = tokio::try_join!(
            service.get_user_allergies(user_id),
            service.get_custom_allergies(user_id)
        );

        match result {
            Ok((allergies, custom)) => say(render_saved(&allergies, &custom)),
            Err(e) => say(format!("Could not load saved allergies: {}", e)),
        }
    }

    /// Adds saved allergies to the current selection. Category names are
    /// matched against the common list so `Peanut` selects `peanut`.
    async fn load_saved(&mut self, user_id: Uuid) {
        let Some(session) = self.session() else {
            return;
        };

        let service = session.service();
        let result = tokio::try_join!(
            service.get_user_allergies(user_id),
            service.get_custom_allergies(user_id)
        );

        let (allergies, custom) = match result {
            Ok(saved) => saved,
            Err(e) => {
                say(format!("Could not load saved allergies: {}", e));
                return;
            }
        };

        let labels: Vec<String> = allergies
            .iter()
            .filter_map(|a| a.category.as_ref())
            .map(|c| selection_label(&c.name))
            .chain(custom.into_iter().map(|c| c.name))
            .collect();

        let added = self.workflow.extend_allergies(&labels);
        say(format!("Added {} saved allerg{}.", added, if added == 1 { "y" } else { "ies" }));
    }

    /// Saves an allergy to the account. Names matching a category become
    /// category allergies, anything else a custom one. Saving one that is
    /// already stored only changes its severity.
    async fn save(&self, user_id: Uuid, label: String, severity: Option<Severity>) {
        let Some(session) = self.session() else {
            return;
        };

        let service = session.service();
        let wanted = selection_label(&label);

        let loaded = tokio::try_join!(
            service.get_categories(),
            service.get_user_allergies(user_id),
            service.get_custom_allergies(user_id)
        );
        let (categories, allergies, custom) = match loaded {
            Ok(loaded) => loaded,
            Err(e) => {
                say(format!("Could not load saved allergies: {}", e));
                return;
            }
        };

        let existing_category = allergies.iter().find(|a| {
            a.category
                .as_ref()
                .is_some_and(|c| selection_label(&c.name) == wanted)
        });
        let existing_custom = custom.iter().find(|c| selection_label(&c.name) == wanted);

        let result = match (existing_category, existing_custom, severity) {
            (Some(_), _, None) | (None, Some(_), None) => {
                say(format!("{} is already saved.", label));
                return;
            }
            (Some(allergy), _, Some(severity)) => {
                let update = UserAllergyUpdate {
                    severity: Some(severity),
                    ..Default::default()
                };
                service
                    .update_user_allergy(allergy.id, update)
                    .await
                    .map(|a| format!("Updated {} to {}", label, a.severity))
            }
            (None, Some(allergy), Some(severity)) => {
                let update = CustomAllergyUpdate {
                    severity: Some(severity),
                    ..Default::default()
                };
                service
                    .update_custom_allergy(allergy.id, update)
                    .await
                    .map(|a| format!("Updated {} to {}", a.name, a.severity))
            }
            (None, None, _) => match categories.iter().find(|c| selection_label(&c.name) == wanted) {
                Some(category) => service
                    .add_user_allergy(user_id, category.id, severity, None)
                    .await
                    .map(|a| format!("Saved {} ({})", category.name, a.severity)),
                None => service
                    .add_custom_allergy(user_id, label.clone(), None, severity)
                    .await
                    .map(|a| format!("Saved {} ({}, custom)", a.name, a.severity)),
            },
        };

        match result {
            Ok(message) => say(format!("{}.", message)),
            Err(e) => say(format!("Could not save {}: {}", label, e)),
        }
    }

    async fn unsave(&self, user_id: Uuid, label: String) {
        let Some(session) = self.session() else {
            return;
        };

        let service = session.service();
        let wanted = selection_label(&label);

        let result = match service.get_user_allergies(user_id).await {
            Ok(allergies) => match allergies.iter().find(|a| {
                a.category
                    .as_ref()
                    .is_some_and(|c| selection_label(&c.name) == wanted)
            }) {
                Some(allergy) => service.remove_user_allergy(allergy.id).await.map(|_| true),
                None => match service.get_custom_allergies(user_id).await {
                    Ok(custom) => match custom.iter().find(|c| selection_label(&c.name) == wanted) {
                        Some(allergy) => service.remove_custom_allergy(allergy.id).await.map(|_| true),
                        None => Ok(false),
                    },
                    Err(e) => Err(e),
                },
            },
            Err(e) => Err(e),
        };

        match result {
            Ok(true) => say(format!("Removed {} from saved allergies.", label)),
            Ok(false) => say(format!("{} is not saved.", label)),
            Err(e) => say(format!("Could not remove {}: {}", label, e)),
        }
    }
}

const FORM_RETRY: &str =
    "Nothing added: empty or already selected. Type the allergen, `cancel` or `quit`.";

fn one_shot_rejected(text: &str) -> String {
    match text.trim() {
        "" => "Nothing added: the allergen is empty.".to_string(),
        label => format!("Nothing added: {} is already selected.", label),
    }
}

/// A line typed while the custom allergy form is open.
#[derive(Debug, PartialEq, Eq)]
enum DraftLine<'a> {
    Quit,
    Help,
    Cancel,
    Input(&'a str),
}

fn draft_line(line: &str) -> DraftLine<'_> {
    let text = line.trim();
    match parse_command(text) {
        Ok(Some(Command::Quit)) => DraftLine::Quit,
        Ok(Some(Command::Help)) => DraftLine::Help,
        Ok(Some(Command::Cancel)) => DraftLine::Cancel,
        _ => DraftLine::Input(text),
    }
}

/// Category names are title-cased (`Tree Nut`); selection labels are the
/// snake-case keys of the common list.
fn selection_label(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}
