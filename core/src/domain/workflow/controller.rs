use tracing::{debug, error, info, instrument, warn};

use crate::domain::{
    allergy::selection::{AllergySelection, CustomAllergyDraft},
    common::entities::app_errors::CoreError,
    health::entities::HealthStatus,
    menu::{
        entities::{MenuFile, MenuId, UploadedMenu},
        ports::MenuBackend,
        value_objects::{DietProfile, ParseMenuRequest, QaRequest},
    },
    safety::entities::SafetyAnswer,
    workflow::state::{StatusLine, WorkflowError, WorkflowState},
};

/// Client-side controller for one page view: file selection, upload,
/// parse, the allergy list and question answering.
///
/// Steps take `&mut self`, so calls against one controller never overlap;
/// the latest response always wins.
pub struct MenuWorkflow<B> {
    backend: B,
    state: WorkflowState,
    file: Option<MenuFile>,
    menu: Option<UploadedMenu>,
    answer: Option<SafetyAnswer>,
    status: Option<StatusLine>,
    allergies: AllergySelection,
    custom_draft: CustomAllergyDraft,
}

impl<B> MenuWorkflow<B>
where
    B: MenuBackend,
{
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: WorkflowState::Empty,
            file: None,
            menu: None,
            answer: None,
            status: None,
            allergies: AllergySelection::new(),
            custom_draft: CustomAllergyDraft::default(),
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn file(&self) -> Option<&MenuFile> {
        self.file.as_ref()
    }

    pub fn menu(&self) -> Option<&UploadedMenu> {
        self.menu.as_ref()
    }

    pub fn answer(&self) -> Option<&SafetyAnswer> {
        self.answer.as_ref()
    }

    pub fn status(&self) -> Option<&StatusLine> {
        self.status.as_ref()
    }

    pub fn allergies(&self) -> &AllergySelection {
        &self.allergies
    }

    pub fn custom_draft(&self) -> &CustomAllergyDraft {
        &self.custom_draft
    }

    pub async fn check_health(&self) -> Result<HealthStatus, CoreError> {
        self.backend.health().await
    }

    /// Picks the file for the next upload. Whatever was uploaded or answered
    /// before stays around until replaced.
    pub fn select_file(&mut self, file: MenuFile) {
        debug!(file_name = %file.file_name, size = file.size(), "Menu file selected");
        self.file = Some(file);
        self.state = WorkflowState::FileSelected;
    }

    #[instrument(skip(self))]
    pub async fn upload(&mut self) -> Result<MenuId, WorkflowError> {
        let file = self.file.clone().ok_or(WorkflowError::NoFileSelected)?;

        match self.backend.upload_menu(file).await {
            Ok(receipt) => {
                let menu_id = receipt.menu_id;
                info!(%menu_id, "Menu uploaded");

                self.menu = Some(UploadedMenu::new(menu_id.clone()));
                self.status = Some(StatusLine::info(format!("Uploaded menu_id: {}", menu_id)));
                self.state = WorkflowState::Uploaded(menu_id.clone());
                Ok(menu_id)
            }
            Err(e) => {
                error!("Upload error: {}", e);
                self.fail(format!("Error uploading file: {}", e));
                Err(e.into())
            }
        }
    }

    /// Asks the backend to parse the uploaded menu for the current
    /// selection. A failure keeps the menu so parse can be retried.
    #[instrument(skip(self))]
    pub async fn parse(&mut self) -> Result<u32, WorkflowError> {
        let menu_id = self
            .menu
            .as_ref()
            .map(|m| m.id.clone())
            .ok_or(WorkflowError::NoMenuUploaded)?;

        debug!(%menu_id, allergies = ?self.allergies.labels(), "Parsing menu");
        self.status = Some(StatusLine::info("Parsing menu..."));

        let request = ParseMenuRequest {
            allergies: self.allergies.to_vec(),
        };

        match self.backend.parse_menu(menu_id.clone(), request).await {
            Ok(report) => {
                match self.menu.as_mut() {
                    Some(menu) if menu.id == menu_id => menu.mark_parsed(report.pages),
                    _ => {
                        warn!(%menu_id, "Parse finished for a menu that is no longer current");
                        return Err(WorkflowError::NoMenuUploaded);
                    }
                }

                info!(%menu_id, pages = report.pages, "Menu parsed");
                self.status = Some(StatusLine::info(format!(
                    "Menu parsed successfully! {} page(s) processed.",
                    report.pages
                )));
                self.state = WorkflowState::Parsed(menu_id);
                Ok(report.pages)
            }
            Err(e) => {
                error!(%menu_id, "Parse error: {}", e.with_body());
                self.fail(format!("Error parsing menu: {}", e.with_body()));
                Err(e.into())
            }
        }
    }

    pub fn toggle_allergy(&mut self, label: &str) -> bool {
        self.allergies.toggle(label)
    }

    pub fn remove_allergy(&mut self, label: &str) -> bool {
        self.allergies.remove(label)
    }

    pub fn open_custom_allergy(&mut self) {
        self.custom_draft.open();
    }

    pub fn set_custom_allergy_input(&mut self, text: impl Into<String>) {
        self.custom_draft.set_input(text);
    }

    pub fn add_custom_allergy(&mut self) -> bool {
        self.allergies.add_custom(&mut self.custom_draft)
    }

    pub fn cancel_custom_allergy(&mut self) {
        self.custom_draft.clear();
    }

    /// Adds labels that are not selected yet, keeping their order.
    pub fn extend_allergies<I, S>(&mut self, labels: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        labels
            .into_iter()
            .filter(|label| self.allergies.add(label.as_ref()))
            .count()
    }

    /// Why `ask` would be a no-op right now, if it would.
    pub fn ask_gate(&self, question: &str) -> Result<MenuId, WorkflowError> {
        let menu = self
            .menu
            .as_ref()
            .filter(|m| m.is_parsed())
            .ok_or(WorkflowError::MenuNotParsed)?;

        if question.trim().is_empty() {
            return Err(WorkflowError::EmptyQuestion);
        }

        if self.allergies.is_empty() {
            return Err(WorkflowError::NoAllergiesSelected);
        }

        Ok(menu.id.clone())
    }

    /// Sends the question with the current allergy profile. Gate failures
    /// leave every field untouched; backend failures still produce an
    /// answer, classified as an error.
    #[instrument(skip(self))]
    pub async fn ask(&mut self, question: &str) -> Result<&SafetyAnswer, WorkflowError> {
        let menu_id = self.ask_gate(question)?;

        let request = QaRequest {
            menu_id,
            question: question.to_string(),
            profile: DietProfile::for_allergens(self.allergies.to_vec()),
        };

        let answer = match self.backend.ask(request).await {
            Ok(answer) => answer,
            Err(e) => {
                error!("Ask error: {}", e);
                SafetyAnswer::from_failure(&e)
            }
        };

        info!(result = %answer.result, "Question answered");
        self.state = WorkflowState::Answered(answer.clone());
        Ok(self.answer.insert(answer))
    }

    pub fn is_parsed(&self) -> bool {
        self.menu.as_ref().is_some_and(UploadedMenu::is_parsed)
    }

    fn fail(&mut self, message: String) {
        self.status = Some(StatusLine::error(message.clone()));
        self.state = WorkflowState::Error(message);
    }
}
