use serde::Serialize;

/// Allergens offered as one-tap choices, in display order.
pub const COMMON_ALLERGIES: [&str; 9] = [
    "peanut",
    "tree_nut",
    "shellfish",
    "fish",
    "egg",
    "dairy",
    "gluten",
    "soy",
    "sesame",
];

/// Ordered, duplicate-free list of allergen labels chosen by the user.
/// Labels compare by exact string match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AllergySelection {
    labels: Vec<String>,
}

impl AllergySelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    /// Removes the label when present, appends it otherwise. Returns whether
    /// the label is selected afterwards.
    pub fn toggle(&mut self, label: &str) -> bool {
        if self.remove(label) {
            false
        } else {
            self.labels.push(label.to_string());
            true
        }
    }

    /// Appends the label unless it is already selected.
    pub fn add(&mut self, label: &str) -> bool {
        if self.contains(label) {
            return false;
        }
        self.labels.push(label.to_string());
        true
    }

    pub fn remove(&mut self, label: &str) -> bool {
        let before = self.labels.len();
        self.labels.retain(|l| l != label);
        self.labels.len() != before
    }

    /// Commits the draft's trimmed text. Blank or duplicate input leaves both
    /// the selection and the draft untouched.
    pub fn add_custom(&mut self, draft: &mut CustomAllergyDraft) -> bool {
        let label = draft.input.trim();
        if label.is_empty() || self.contains(label) {
            return false;
        }

        self.labels.push(label.to_string());
        draft.clear();
        true
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.labels.clone()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Input buffer of the "add custom allergy" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomAllergyDraft {
    pub input: String,
    pub open: bool,
}

impl CustomAllergyDraft {
    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Empties the buffer and collapses the form.
    pub fn clear(&mut self) {
        self.input.clear();
        self.open = false;
    }
}

/// Human label for an allergen: the first underscore becomes a space, then
/// each word starts upper-case (`tree_nut` -> `Tree Nut`).
pub fn display_label(label: &str) -> String {
    let spaced = label.replacen('_', " ", 1);
    let mut out = String::with_capacity(spaced.len());
    let mut in_word = false;

    for c in spaced.chars() {
        let is_word = c.is_alphanumeric() || c == '_';
        if is_word && !in_word {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        in_word = is_word;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_is_its_own_inverse() {
        let mut selection = AllergySelection::new();
        selection.add("egg");

        for count in [2usize, 4, 6] {
            let before = selection.clone();
            for _ in 0..count {
                selection.toggle("peanut");
            }
            assert_eq!(selection, before);

            let before = selection.clone();
            for _ in 0..count {
                selection.toggle("egg");
            }
            assert_eq!(selection.contains("egg"), before.contains("egg"));
        }
    }

    #[test]
    fn test_toggle_appends_in_order() {
        let mut selection = AllergySelection::new();
        assert!(selection.toggle("soy"));
        assert!(selection.toggle("fish"));
        assert!(!selection.toggle("soy"));
        assert_eq!(selection.labels(), ["fish"]);
    }

    #[test]
    fn test_remove_missing_label_is_noop() {
        let mut selection = AllergySelection::new();
        selection.add("dairy");
        assert!(!selection.remove("gluten"));
        assert_eq!(selection.labels(), ["dairy"]);
    }

    #[test]
    fn test_add_custom_whitespace_is_noop() {
        let mut selection = AllergySelection::new();
        let mut draft = CustomAllergyDraft::default();
        draft.open();
        draft.set_input("   ");

        assert!(!selection.add_custom(&mut draft));
        assert!(selection.is_empty());
        assert_eq!(draft.input, "   ");
        assert!(draft.open);
    }

    #[test]
    fn test_add_custom_duplicate_is_noop() {
        let mut selection = AllergySelection::new();
        selection.add("kiwi");
        let mut draft = CustomAllergyDraft::default();
        draft.open();
        draft.set_input(" kiwi ");

        assert!(!selection.add_custom(&mut draft));
        assert_eq!(selection.len(), 1);
        assert!(draft.open);
    }

    #[test]
    fn test_add_custom_trims_and_collapses_form() {
        let mut selection = AllergySelection::new();
        let mut draft = CustomAllergyDraft::default();
        draft.open();
        draft.set_input("  mustard ");

        assert!(selection.add_custom(&mut draft));
        assert_eq!(selection.labels(), ["mustard"]);
        assert_eq!(draft, CustomAllergyDraft::default());
    }

    #[test]
    fn test_labels_are_case_sensitive() {
        let mut selection = AllergySelection::new();
        selection.add("Peanut");
        assert!(selection.add("peanut"));
        assert_eq!(selection.len(), 2);
    }

    #[test]
    fn test_display_label() {
        assert_eq!(display_label("tree_nut"), "Tree Nut");
        assert_eq!(display_label("shellfish"), "Shellfish");
        assert_eq!(display_label("red_food_dye"), "Red Food_dye");
        assert_eq!(display_label("sulfite sensitivity"), "Sulfite Sensitivity");
    }
}
