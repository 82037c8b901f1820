use std::fmt;
use std::sync::Arc;

use me_types::context::{ContextMap, ContextValue};
use me_types::events::{ButtonStyle, RenderedComponent, SelectOption, TextInputSpec, TextInputStyle};
use me_types::listing::Listing;

use crate::modal::ModalButton;
use crate::registry::ViewId;
use crate::view::Screen;

pub const DEFAULT_ADDON: &str = "default";

/// Stable component id: `me:<kind>:<addon>:<label>`. The platform echoes it
/// back with every interaction.
pub fn component_id(kind: &str, addon: &str, label: &str) -> String {
    format!("me:{}:{}:{}", kind, addon, label)
}

/// Where a component navigates to.
#[derive(Clone)]
pub enum LinkedView {
    /// A live view, reused as is. Its back-link is moved to the clicking view.
    Instance(ViewId),
    /// A screen, built fresh with the merged context on every click.
    Screen(Arc<dyn Screen>),
}

impl LinkedView {
    pub fn screen<S: Screen + 'static>(screen: S) -> Self {
        Self::Screen(Arc::new(screen))
    }
}

impl fmt::Debug for LinkedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instance(id) => f.debug_tuple("Instance").field(id).finish(),
            Self::Screen(screen) => f.debug_tuple("Screen").field(&screen.name()).finish(),
        }
    }
}

/// How the target of a navigation is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavOptions {
    pub ephemeral: bool,
    /// Edit the originating message instead of sending a new one.
    pub replace: bool,
}

impl Default for NavOptions {
    fn default() -> Self {
        Self {
            ephemeral: true,
            replace: true,
        }
    }
}

// -- Button --

#[derive(Debug, Clone)]
pub struct Button {
    custom_id: String,
    label: String,
    style: ButtonStyle,
    disabled: bool,
    row: Option<u8>,
    emoji: Option<String>,
    link: Option<LinkedView>,
    nav: NavOptions,
    /// Merged into the owning view's previous context before navigating.
    overrides: ContextMap,
}

impl Button {
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            custom_id: component_id("NavButton", DEFAULT_ADDON, &label),
            label,
            style: ButtonStyle::Secondary,
            disabled: false,
            row: None,
            emoji: None,
            link: None,
            nav: NavOptions::default(),
            overrides: ContextMap::new(),
        }
    }

    pub fn custom_id_addon(mut self, addon: &str) -> Self {
        self.custom_id = component_id("NavButton", addon, &self.label);
        self
    }

    pub fn custom_id(mut self, custom_id: impl Into<String>) -> Self {
        self.custom_id = custom_id.into();
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

    pub fn emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
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

    pub fn replace_message(mut self, replace: bool) -> Self {
        self.nav.replace = replace;
        self
    }

    /// Set `key` in the owning view's previous context when clicked.
    /// `ContextValue::Unset` removes the key instead.
    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.overrides.insert(key, value);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn overrides(&self) -> &ContextMap {
        &self.overrides
    }

    pub fn nav(&self) -> NavOptions {
        self.nav
    }

    /// `{label: was this the clicked button}`.
    pub fn contribute(&self, clicked_id: Option<&str>) -> ContextMap {
        ContextMap::new().with(self.label.clone(), clicked_id == Some(self.custom_id.as_str()))
    }

    fn render(&self) -> RenderedComponent {
        RenderedComponent::Button {
            custom_id: self.custom_id.clone(),
            label: self.label.clone(),
            style: self.style,
            disabled: self.disabled,
            row: self.row,
            emoji: self.emoji.clone(),
        }
    }
}

// -- Select --

#[derive(Debug, Clone)]
pub struct Select {
    custom_id: String,
    /// Doubles as the context key the choice is published under.
    placeholder: String,
    options: Vec<SelectOption>,
    /// `value -> label` when built from an id map, for the `_desc` key.
    labels: Option<Vec<(String, String)>>,
    min_values: u8,
    max_values: u8,
    disabled: bool,
    row: Option<u8>,
    link: Option<LinkedView>,
    nav: NavOptions,
    chosen: Vec<String>,
}

impl Select {
    /// Options as `(value, label)` pairs.
    pub fn new(placeholder: impl Into<String>, options: Vec<(String, String)>) -> Self {
        let placeholder = placeholder.into();
        Self {
            custom_id: component_id("NavSelect", DEFAULT_ADDON, &placeholder),
            placeholder,
            options: options
                .into_iter()
                .map(|(value, label)| SelectOption {
                    label,
                    value,
                    default: false,
                })
                .collect(),
            labels: None,
            min_values: 1,
            max_values: 1,
            disabled: false,
            row: None,
            link: None,
            nav: NavOptions::default(),
            chosen: Vec::new(),
        }
    }

    /// Like [`Select::new`], and also publishes `<placeholder>_desc` with the
    /// chosen option's label.
    pub fn from_map(placeholder: impl Into<String>, options: Vec<(String, String)>) -> Self {
        let labels = options.clone();
        let mut select = Self::new(placeholder, options);
        select.labels = Some(labels);
        select
    }

    pub fn from_listing(placeholder: impl Into<String>, listing: &Listing) -> Self {
        Self::from_map(placeholder, listing.options())
    }

    /// Pre-select the options whose values are listed.
    pub fn defaults(mut self, values: &[String]) -> Self {
        for option in &mut self.options {
            option.default = values.contains(&option.value);
        }
        self
    }

    /// Pre-select whatever `previous` holds under this select's key.
    pub fn defaults_from(self, previous: &ContextMap) -> Self {
        let values = previous.list(&self.placeholder);
        self.defaults(&values)
    }

    pub fn custom_id_addon(mut self, addon: &str) -> Self {
        self.custom_id = component_id("NavSelect", addon, &self.placeholder);
        self
    }

    pub fn max_values(mut self, max_values: u8) -> Self {
        self.max_values = max_values;
        self
    }

    pub fn min_values(mut self, min_values: u8) -> Self {
        self.min_values = min_values;
        self
    }

    pub fn row(mut self, row: u8) -> Self {
        self.row = Some(row);
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

    pub fn replace_message(mut self, replace: bool) -> Self {
        self.nav.replace = replace;
        self
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn nav(&self) -> NavOptions {
        self.nav
    }

    /// Record the values the user just picked.
    pub fn choose(&mut self, values: Vec<String>) {
        self.chosen = values;
    }

    /// The chosen values, or the previous ones when nothing was picked so an
    /// unrelated click does not clear an earlier choice.
    pub fn contribute(&self, previous: &ContextMap) -> ContextMap {
        let values = if self.chosen.is_empty() {
            previous.list(&self.placeholder)
        } else {
            self.chosen.clone()
        };

        let mut context = ContextMap::new();
        if values.len() == 1 && self.max_values == 1 {
            let value = values[0].clone();
            let label = self
                .labels
                .as_ref()
                .and_then(|labels| labels.iter().find(|(v, _)| *v == value))
                .map(|(_, label)| label.clone());

            context.insert(self.placeholder.clone(), value);
            if let Some(label) = label {
                context.insert(format!("{}_desc", self.placeholder), label);
            }
        } else {
            context.insert(self.placeholder.clone(), values);
        }
        context
    }

    fn render(&self) -> RenderedComponent {
        RenderedComponent::Select {
            custom_id: self.custom_id.clone(),
            placeholder: self.placeholder.clone(),
            options: self.options.clone(),
            min_values: self.min_values,
            max_values: self.max_values,
            disabled: self.disabled,
            row: self.row,
        }
    }
}

// -- Text field --

/// A single text input. Lives inside modal forms; contributes its value once
/// one has been submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextField {
    label: String,
    placeholder: Option<String>,
    default: String,
    required: bool,
    max_length: Option<u16>,
    style: TextInputStyle,
    value: Option<String>,
}

impl TextField {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            placeholder: None,
            default: String::new(),
            required: false,
            max_length: None,
            style: TextInputStyle::Short,
            value: None,
        }
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn max_length(mut self, max_length: u16) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn paragraph(mut self) -> Self {
        self.style = TextInputStyle::Paragraph;
        self
    }

    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.default = default.into();
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn default(&self) -> &str {
        &self.default
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = Some(value.into());
    }

    pub fn contribute(&self) -> ContextMap {
        match &self.value {
            Some(value) => ContextMap::new().with(self.label.clone(), value.clone()),
            None => ContextMap::new(),
        }
    }

    pub fn spec(&self) -> TextInputSpec {
        TextInputSpec {
            label: self.label.clone(),
            placeholder: self.placeholder.clone(),
            default: self.default.clone(),
            required: self.required,
            max_length: self.max_length,
            style: self.style,
        }
    }
}

// -- Component --

/// Everything a view can hold.
#[derive(Debug, Clone)]
pub enum Component {
    Button(Button),
    Select(Select),
    ModalButton(ModalButton),
    TextField(TextField),
}

impl Component {
    pub fn custom_id(&self) -> &str {
        match self {
            Self::Button(b) => &b.custom_id,
            Self::Select(s) => &s.custom_id,
            Self::ModalButton(m) => m.custom_id(),
            Self::TextField(t) => &t.label,
        }
    }

    pub fn link(&self) -> Option<&LinkedView> {
        match self {
            Self::Button(b) => b.link.as_ref(),
            Self::Select(s) => s.link.as_ref(),
            Self::ModalButton(m) => m.link(),
            Self::TextField(_) => None,
        }
    }

    pub fn nav(&self) -> NavOptions {
        match self {
            Self::Button(b) => b.nav(),
            Self::Select(s) => s.nav(),
            Self::ModalButton(m) => m.nav(),
            Self::TextField(_) => NavOptions::default(),
        }
    }

    /// This component's share of the view's outgoing context.
    pub fn contribute(&self, previous: &ContextMap, clicked_id: Option<&str>) -> ContextMap {
        match self {
            Self::Button(b) => b.contribute(clicked_id),
            Self::Select(s) => s.contribute(previous),
            Self::ModalButton(m) => m.contribute(),
            Self::TextField(t) => t.contribute(),
        }
    }

    /// Text fields only appear inside modal forms and render nothing here.
    pub fn render(&self) -> Option<RenderedComponent> {
        match self {
            Self::Button(b) => Some(b.render()),
            Self::Select(s) => Some(s.render()),
            Self::ModalButton(m) => Some(m.render()),
            Self::TextField(_) => None,
        }
    }
}

impl From<Button> for Component {
    fn from(button: Button) -> Self {
        Self::Button(button)
    }
}

impl From<Select> for Component {
    fn from(select: Select) -> Self {
        Self::Select(select)
    }
}

impl From<ModalButton> for Component {
    fn from(button: ModalButton) -> Self {
        Self::ModalButton(button)
    }
}

impl From<TextField> for Component {
    fn from(field: TextField) -> Self {
        Self::TextField(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role_options() -> Vec<(String, String)> {
        vec![("5".to_string(), "Admin".to_string())]
    }

    #[test]
    fn button_flags_only_the_clicked_one() {
        let create = Button::new("Create");
        let back = Button::new("Back");
        let clicked = Some("me:NavButton:default:Create");

        assert_eq!(create.contribute(clicked).flag("Create"), Some(true));
        assert_eq!(back.contribute(clicked).flag("Back"), Some(false));
        assert_eq!(create.contribute(None).flag("Create"), Some(false));
    }

    #[test]
    fn addon_changes_the_id() {
        let button = Button::new("Admin").custom_id_addon("panel");
        assert_eq!(Component::from(button).custom_id(), "me:NavButton:panel:Admin");
    }

    #[test]
    fn single_choice_from_map_publishes_description() {
        let mut select = Select::from_map("Select Role", role_options());
        select.choose(vec!["5".to_string()]);
        let context = select.contribute(&ContextMap::new());

        assert_eq!(context.text("Select Role"), Some("5"));
        assert_eq!(context.text("Select Role_desc"), Some("Admin"));
        assert_eq!(context.len(), 2);
    }

    #[test]
    fn select_falls_back_to_previous_choice() {
        let select = Select::from_map("Select Role", role_options());
        let previous = ContextMap::new().with("Select Role", "5");
        let context = select.contribute(&previous);
        assert_eq!(context.text("Select Role"), Some("5"));
        assert_eq!(context.text("Select Role_desc"), Some("Admin"));
    }

    #[test]
    fn select_without_map_has_no_description() {
        let mut select = Select::new("Colour", vec![("r".into(), "Red".into())]);
        select.choose(vec!["r".to_string()]);
        let context = select.contribute(&ContextMap::new());
        assert_eq!(context.text("Colour"), Some("r"));
        assert!(!context.contains_key("Colour_desc"));
    }

    #[test]
    fn multi_select_publishes_list() {
        let mut select = Select::new(
            "Channels",
            vec![("1".into(), "a".into()), ("2".into(), "b".into())],
        )
        .max_values(2);
        select.choose(vec!["1".to_string(), "2".to_string()]);
        let context = select.contribute(&ContextMap::new());
        assert_eq!(context.list("Channels"), vec!["1", "2"]);
        assert_eq!(context.text("Channels"), None);
    }

    #[test]
    fn nothing_chosen_and_nothing_before_is_empty_list() {
        let select = Select::new("Channels", vec![]);
        let context = select.contribute(&ContextMap::new());
        assert_eq!(context.get("Channels"), Some(&ContextValue::List(vec![])));
    }

    #[test]
    fn defaults_mark_previous_choice() {
        let previous = ContextMap::new().with("Select Role", "5");
        let select = Select::from_map("Select Role", role_options()).defaults_from(&previous);
        assert!(select.options()[0].default);
    }

    #[test]
    fn text_field_contributes_only_once_filled() {
        let mut field = TextField::new("Emoji");
        assert!(field.contribute().is_empty());
        field.set_value(":tada:");
        assert_eq!(field.contribute().text("Emoji"), Some(":tada:"));
        assert!(Component::from(field).render().is_none());
    }
}
