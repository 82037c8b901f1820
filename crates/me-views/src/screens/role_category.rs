use std::time::Duration;

use async_trait::async_trait;

use me_types::events::{ButtonStyle, InteractionEvent};

use crate::component::{Button, LinkedView, TextField};
use crate::error::{Result, ViewError};
use crate::host::HostContext;
use crate::modal::ModalButton;
use crate::screens::{BANNER, CHECK, CRITICAL, interaction_scope, validate_emoji};
use crate::view::{Screen, View};

const CATEGORY_NAME: &str = "Category Name";
const CATEGORY_EMOJI: &str = "Category Emoji";

pub struct RoleCategoryManage;

#[async_trait]
impl Screen for RoleCategoryManage {
    fn name(&self) -> &'static str {
        "RoleCategoryManage"
    }

    async fn build(&self, _host: &HostContext, view: &mut View) -> Result<()> {
        view.add(
            Button::new("Add Category")
                .style(ButtonStyle::Primary)
                .links_to(LinkedView::screen(RoleCategoryAdd)),
        );
        view.add_back_button(true)
    }

    async fn message(
        &self,
        host: &HostContext,
        view: &View,
        _event: Option<&InteractionEvent>,
    ) -> Result<String> {
        let (server_id, _) = interaction_scope(view)?;
        let mut msg = ":desktop:  **Role Category Management**\n".to_string();
        for category in host.db().get_role_categories(server_id)? {
            match category.emoji {
                Some(emoji) => msg.push_str(&format!(":{}: {}\n", emoji, category.name)),
                None => msg.push_str(&format!("{}\n", category.name)),
            }
        }
        Ok(msg)
    }
}

/// Form for a new role category. Creating it shows a confirmation and closes
/// the dialog soon after; bad input is shown as a warning with the form
/// offered again.
pub struct RoleCategoryAdd;

#[async_trait]
impl Screen for RoleCategoryAdd {
    fn name(&self) -> &'static str {
        "RoleCategoryAdd"
    }

    async fn build(&self, host: &HostContext, view: &mut View) -> Result<()> {
        let category = sanitize_category(view.previous_context().text(CATEGORY_NAME).unwrap_or(""));

        let mut created = false;
        let mut banner = String::new();
        if !category.is_empty() {
            match add_category(host, view, &category) {
                Ok(emoji) => {
                    banner = format!("{}  Created Category: {}{}\n", CHECK, emoji, category);
                    view.set_timeout(Some(Duration::from_secs(10)));
                    created = true;
                }
                Err(ViewError::UserInput(reason)) => {
                    banner = format!("{}  {}\n", CRITICAL, reason);
                }
                Err(e) => return Err(e),
            }
        }

        if !created {
            view.add(
                ModalButton::new("New Category", "Add Role Category")
                    .field(
                        TextField::new(CATEGORY_NAME)
                            .placeholder("Enter a category name")
                            .max_length(100)
                            .required(true),
                    )
                    .field(
                        TextField::new(CATEGORY_EMOJI)
                            .placeholder("Paste emoji here (format -> :star:)"),
                    )
                    .links_to(LinkedView::screen(RoleCategoryAdd)),
            );
        }
        view.add_back_button(true)?;
        view.previous_context_mut().insert(BANNER, banner);
        Ok(())
    }

    async fn message(
        &self,
        _host: &HostContext,
        view: &View,
        _event: Option<&InteractionEvent>,
    ) -> Result<String> {
        let banner = view.previous_context().text(BANNER).unwrap_or("");
        Ok(format!(":desktop:  **Add Role Category**\n{}", banner))
    }
}

/// Letters, digits, `_`, `-` and spaces only.
fn sanitize_category(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ' '))
        .collect()
}

/// Stores the category; returns the emoji prefix for the confirmation.
fn add_category(host: &HostContext, view: &View, category: &str) -> Result<String> {
    let (server_id, _) = interaction_scope(view)?;
    let emoji = validate_emoji(view.previous_context().text(CATEGORY_EMOJI).unwrap_or(""))?;
    let stored = emoji.strip_prefix(':').and_then(|e| e.strip_suffix(':'));

    if !host.db().add_role_category(server_id, category, stored)? {
        return Err(ViewError::UserInput(format!("Category {} already exists", category)));
    }
    Ok(if emoji.is_empty() { emoji } else { format!("{} ", emoji) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_names_are_sanitized() {
        assert_eq!(sanitize_category("Games! & <Fun>_2-x"), "Games  Fun_2-x");
        assert_eq!(sanitize_category("!!!"), "");
    }
}
