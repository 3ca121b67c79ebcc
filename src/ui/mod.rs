//! The builder's JSON export format and its conversion into a snapshot.

mod types;

pub use types::*;

use crate::error::ScriptConversionError;
use crate::script::naming::{to_api_name, unique_api_name};
use crate::script::{
    Choice, Field, FieldType, IntoScript, Page, PageType, RuleSet, ScriptSnapshot,
};

impl UiScript {
    pub fn from_json(json: &str) -> Result<Self, ScriptConversionError> {
        serde_json::from_str(json).map_err(|e| ScriptConversionError::JsonParseError(e.to_string()))
    }
}

impl IntoScript for UiScript {
    fn into_script(self) -> Result<ScriptSnapshot, ScriptConversionError> {
        let pages = self
            .pages
            .into_iter()
            .map(convert_page)
            .collect::<Result<Vec<_>, _>>()?;

        let (rules, skipped) = RuleSet::from_legacy_keys(
            self.logic_rules
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
            &pages,
        );
        if !skipped.is_empty() {
            tracing::warn!(count = skipped.len(), "Dropped rule keys with no matching page");
        }

        let id = self.id.unwrap_or_default();
        let name = self.name.unwrap_or_else(|| id.clone());
        Ok(ScriptSnapshot::new(id, name, pages, rules)?)
    }
}

impl ScriptSnapshot {
    /// Parses the builder's JSON export straight into a snapshot.
    pub fn from_builder_json(json: &str) -> Result<Self, ScriptConversionError> {
        UiScript::from_json(json)?.into_script()
    }
}

fn convert_page(page: UiPage) -> Result<Page, ScriptConversionError> {
    if page.id.trim().is_empty() {
        return Err(ScriptConversionError::ValidationError(
            "Page without an id".to_string(),
        ));
    }

    let mut fields: Vec<Field> = Vec::new();
    for ui_field in page.fields.unwrap_or_default() {
        let field = convert_field(ui_field, &page.id, &fields)?;
        fields.push(field);
    }

    Ok(Page {
        id: page.id,
        page_type: PageType::from_type_name(&page.page_type),
        title: page.title,
        content: page.content,
        visible: page.visible.unwrap_or(true),
        fields,
        question: page.question,
        choices: convert_choices(page.choices),
        placeholder: page.placeholder,
    })
}

fn convert_field(
    field: UiField,
    page_id: &str,
    siblings: &[Field],
) -> Result<Field, ScriptConversionError> {
    if field.id.trim().is_empty() {
        return Err(ScriptConversionError::ValidationError(format!(
            "Field without an id on page '{}'",
            page_id
        )));
    }

    let base = match field.api_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => to_api_name(name),
        _ if !field.label.trim().is_empty() => to_api_name(&field.label),
        _ => to_api_name(&field.id),
    };

    Ok(Field {
        api_name: unique_api_name(&base, siblings, None),
        id: field.id,
        label: field.label,
        field_type: FieldType::from_type_name(&field.field_type),
        required: field.required,
        choices: convert_choices(field.choices),
        placeholder: field.placeholder,
    })
}

fn convert_choices(choices: Option<Vec<UiChoice>>) -> Vec<Choice> {
    choices
        .unwrap_or_default()
        .into_iter()
        .map(|c| Choice::new(c.id, c.text))
        .collect()
}
