use me_types::context::ContextMap;
use me_types::events::{ButtonStyle, ModalForm, RenderedComponent};

use crate::component::{DEFAULT_ADDON, LinkedView, NavOptions, TextField, component_id};

/// A button that opens a form and navigates once the form is submitted.
///
/// Contributes nothing until its form has been submitted. After that it
/// contributes every submitted field under its label, plus the `on_filled`
/// patch when the watched field came back non-empty.
#[derive(Debug, Clone)]
pub struct ModalButton {
    custom_id: String,
    label: String,
    style: ButtonStyle,
    disabled: bool,
    row: Option<u8>,
    title: String,
    template: Vec<TextField>,
    /// Empty means every template field is shown.
    allowed: Vec<String>,
    denied: Vec<String>,
    link: Option<LinkedView>,
    nav: NavOptions,
    on_filled: Option<(String, ContextMap)>,
    submitted: Vec<TextField>,
    publish: bool,
}

impl ModalButton {
    pub fn new(label: impl Into<String>, title: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            custom_id: component_id("ModalButton", DEFAULT_ADDON, &label),
            label,
            style: ButtonStyle::Primary,
            disabled: false,
            row: None,
            title: title.into(),
            template: Vec::new(),
            allowed: Vec::new(),
            denied: Vec::new(),
            link: None,
            nav: NavOptions::default(),
            on_filled: None,
            submitted: Vec::new(),
            publish: false,
        }
    }

    pub fn field(mut self, field: TextField) -> Self {
        self.template.push(field);
        self
    }

    /// Only show these fields.
    pub fn allow(mut self, labels: &[&str]) -> Self {
        self.allowed = labels.iter().map(|l| l.to_string()).collect();
        self
    }

    /// Never show these fields.
    pub fn deny(mut self, labels: &[&str]) -> Self {
        self.denied = labels.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn style(mut self, style: ButtonStyle) -> Self {
        self.style = style;
        self
    }

    pub fn row(mut self, row: u8) -> Self {
        self.row = Some(row);
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn links_to(mut self, link: LinkedView) -> Self {
        self.link = Some(link);
        self
    }

    pub fn ephemeral(mut self, ephemeral: bool) -> Self {
        self.nav.ephemeral = ephemeral;
        self
    }

    /// Merge `patch` into the contribution whenever `field` is submitted with
    /// a non-empty value.
    pub fn on_filled(mut self, field: impl Into<String>, patch: ContextMap) -> Self {
        self.on_filled = Some((field.into(), patch));
        self
    }

    pub fn custom_id(&self) -> &str {
        &self.custom_id
    }

    pub fn modal_id(&self) -> String {
        format!("{}:modal", self.custom_id)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn link(&self) -> Option<&LinkedView> {
        self.link.as_ref()
    }

    pub fn nav(&self) -> NavOptions {
        self.nav
    }

    pub fn is_published(&self) -> bool {
        self.publish
    }

    fn is_shown(&self, label: &str) -> bool {
        let allowed = self.allowed.is_empty() || self.allowed.iter().any(|a| a == label);
        allowed && !self.denied.iter().any(|d| d == label)
    }

    /// The fields that make it past the allow and deny lists, prefilled from
    /// `previous` where the template has no default of its own.
    pub fn visible_fields(&self, previous: &ContextMap) -> Vec<TextField> {
        self.template
            .iter()
            .filter(|field| self.is_shown(field.label()))
            .map(|field| match previous.text(field.label()) {
                Some(prior) if field.default().is_empty() => field.clone().default_value(prior),
                _ => field.clone(),
            })
            .collect()
    }

    pub fn open(&self, previous: &ContextMap) -> ModalForm {
        ModalForm {
            custom_id: self.modal_id(),
            title: self.title.clone(),
            fields: self
                .visible_fields(previous)
                .iter()
                .map(TextField::spec)
                .collect(),
        }
    }

    /// Store submitted values. Values for fields the form did not show are
    /// dropped.
    pub fn submit(&mut self, values: &[(String, String)]) {
        self.submitted = self
            .template
            .iter()
            .filter(|field| self.is_shown(field.label()))
            .filter_map(|field| {
                let (_, value) = values.iter().find(|(label, _)| label == field.label())?;
                let mut field = field.clone();
                field.set_value(value.clone());
                Some(field)
            })
            .collect();
        self.publish = true;
    }

    pub fn contribute(&self) -> ContextMap {
        let mut context = ContextMap::new();
        if !self.publish {
            return context;
        }

        for field in &self.submitted {
            context.merge(field.contribute());
        }

        if let Some((watched, patch)) = &self.on_filled {
            let filled = self
                .submitted
                .iter()
                .any(|f| f.label() == watched && f.value().is_some_and(|v| !v.is_empty()));
            if filled {
                for (key, value) in patch.iter() {
                    context.insert(key, value.clone());
                }
            }
        }
        context
    }

    pub(crate) fn render(&self) -> RenderedComponent {
        RenderedComponent::Button {
            custom_id: self.custom_id.clone(),
            label: self.label.clone(),
            style: self.style,
            disabled: self.disabled,
            row: self.row,
            emoji: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use me_types::context::ContextValue;

    fn description_button() -> ModalButton {
        ModalButton::new("Set Descriptions", "Role Descriptions")
            .field(TextField::new("Short Description").required(true))
            .field(TextField::new("Long Description").paragraph())
            .field(TextField::new("Discord Role Name"))
            .on_filled(
                "Discord Role Name",
                ContextMap::new()
                    .with("Select Role", ContextValue::Unset)
                    .with("Existing Discord Role", false),
            )
    }

    fn fields(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn contributes_nothing_before_submit() {
        let button = description_button();
        assert!(!button.is_published());
        assert!(button.contribute().is_empty());
    }

    #[test]
    fn filled_watched_field_applies_patch() {
        let mut button = description_button();
        button.submit(&fields(&[
            ("Short Description", "Mods"),
            ("Long Description", ""),
            ("Discord Role Name", "Moderators"),
        ]));

        let context = button.contribute();
        assert_eq!(context.text("Short Description"), Some("Mods"));
        assert_eq!(context.text("Discord Role Name"), Some("Moderators"));
        assert_eq!(context.flag("Existing Discord Role"), Some(false));
        assert!(context.iter().any(|(k, v)| k == "Select Role" && *v == ContextValue::Unset));
    }

    #[test]
    fn empty_watched_field_skips_patch() {
        let mut button = description_button();
        button.submit(&fields(&[("Short Description", "Mods"), ("Discord Role Name", "")]));

        let context = button.contribute();
        assert!(!context.contains_key("Existing Discord Role"));
        assert_eq!(context.len(), 2);
    }

    #[test]
    fn allow_and_deny_prune_the_form() {
        let button = description_button()
            .allow(&["Short Description", "Discord Role Name"])
            .deny(&["Discord Role Name"]);
        let form = button.open(&ContextMap::new());
        let labels: Vec<_> = form.fields.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["Short Description"]);
        assert_eq!(form.custom_id, "me:ModalButton:default:Set Descriptions:modal");
    }

    #[test]
    fn hidden_fields_are_not_accepted_on_submit() {
        let mut button = description_button().deny(&["Discord Role Name"]);
        button.submit(&fields(&[("Short Description", "Mods"), ("Discord Role Name", "Sneaky")]));
        let context = button.contribute();
        assert!(!context.contains_key("Discord Role Name"));
        assert!(!context.contains_key("Existing Discord Role"));
    }

    #[test]
    fn form_is_prefilled_from_previous_context() {
        let previous = ContextMap::new().with("Short Description", "Old");
        let form = description_button().open(&previous);
        assert_eq!(form.fields[0].default, "Old");
        assert_eq!(form.fields[1].default, "");
    }
}
