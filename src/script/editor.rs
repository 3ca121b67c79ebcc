use super::definition::{Choice, Field, FieldType, Page, PageType};
use super::naming::{to_api_name, unique_api_name};
use super::rules::{Destination, RuleKey};
use super::snapshot::ScriptSnapshot;
use crate::error::ScriptError;

/// Authoring operations over a script.
///
/// The editor owns a snapshot while it is being changed and keeps the
/// script's invariants intact: at least one page, script-wide unique ids,
/// page-unique apiNames and no rules pointing at deleted pages.
pub struct ScriptEditor {
    script: ScriptSnapshot,
}

impl ScriptEditor {
    pub fn new(script: ScriptSnapshot) -> Self {
        Self { script }
    }

    pub fn script(&self) -> &ScriptSnapshot {
        &self.script
    }

    pub fn finish(self) -> ScriptSnapshot {
        self.script
    }

    /// Appends a new page and returns its generated id.
    pub fn add_page(&mut self, page_type: PageType, title: &str) -> String {
        let id = self.next_id("page", |s, id| s.page(id).is_some());
        let page = Page::new(id.clone(), page_type).with_title(title);
        self.script.pages_mut().push(page);
        id
    }

    /// Removes a page along with every rule that starts from it or leads to it.
    ///
    /// Rules that led to the deleted page disappear, so runs fall back to the
    /// next rule in precedence or to sequential order.
    pub fn delete_page(&mut self, page_id: &str) -> Result<Page, ScriptError> {
        let index = self.page_index(page_id)?;
        if self.script.pages().len() == 1 {
            return Err(ScriptError::LastPage(page_id.to_string()));
        }

        let (pages, rules) = self.script.parts_mut();
        let removed = pages.remove(index);
        rules.retain(|rule| {
            rule.key.source() != page_id && rule.destination.page_id() != Some(page_id)
        });
        tracing::debug!(page_id, "Deleted page");
        Ok(removed)
    }

    /// Moves a page to `new_index`, clamped to the end of the sequence.
    pub fn move_page(&mut self, page_id: &str, new_index: usize) -> Result<(), ScriptError> {
        let index = self.page_index(page_id)?;
        let pages = self.script.pages_mut();
        let page = pages.remove(index);
        let target = new_index.min(pages.len());
        pages.insert(target, page);
        Ok(())
    }

    pub fn set_page_visibility(&mut self, page_id: &str, visible: bool) -> Result<(), ScriptError> {
        self.page_mut(page_id)?.visible = visible;
        Ok(())
    }

    pub fn set_page_text(
        &mut self,
        page_id: &str,
        title: &str,
        content: &str,
    ) -> Result<(), ScriptError> {
        let page = self.page_mut(page_id)?;
        page.title = title.to_string();
        page.content = content.to_string();
        Ok(())
    }

    /// Adds a field to a page and returns its generated id.
    ///
    /// The apiName is derived from the label and suffixed if another field on
    /// the same page already uses it.
    pub fn add_field(
        &mut self,
        page_id: &str,
        field_type: FieldType,
        label: &str,
        required: bool,
    ) -> Result<String, ScriptError> {
        self.page_index(page_id)?;
        let field_id = self.next_id("field", |s, id| s.field(id).is_some());

        let page = self.page_mut(page_id)?;
        let api_name = unique_api_name(&to_api_name(label), &page.fields, None);
        let mut field = Field::new(field_id.clone(), api_name, label, field_type);
        field.required = required;
        page.fields.push(field);
        Ok(field_id)
    }

    /// Removes a field and any choice rules that branch on it.
    pub fn remove_field(&mut self, page_id: &str, field_id: &str) -> Result<Field, ScriptError> {
        let page = self.page_mut(page_id)?;
        let index = page
            .fields
            .iter()
            .position(|f| f.id == field_id)
            .ok_or_else(|| field_not_found(page_id, field_id))?;
        let removed = page.fields.remove(index);

        self.script.rules_mut().retain(|rule| {
            !matches!(&rule.key, RuleKey::FieldChoice { source, field_id: f, .. } if source == page_id && f == field_id)
        });
        Ok(removed)
    }

    /// Renames a field's apiName, normalising it and suffixing on collision.
    /// Returns the name actually stored.
    pub fn rename_api_name(
        &mut self,
        page_id: &str,
        field_id: &str,
        requested: &str,
    ) -> Result<String, ScriptError> {
        let page = self.page_mut(page_id)?;
        let api_name = unique_api_name(&to_api_name(requested), &page.fields, Some(field_id));
        let field = page
            .fields
            .iter_mut()
            .find(|f| f.id == field_id)
            .ok_or_else(|| field_not_found(page_id, field_id))?;
        field.api_name = api_name.clone();
        Ok(api_name)
    }

    /// Appends a choice to a choice-typed field and returns its generated id.
    pub fn add_choice(
        &mut self,
        page_id: &str,
        field_id: &str,
        text: &str,
    ) -> Result<String, ScriptError> {
        let page = self.page_mut(page_id)?;
        let field = page
            .fields
            .iter_mut()
            .find(|f| f.id == field_id)
            .ok_or_else(|| field_not_found(page_id, field_id))?;
        if !field.field_type.has_choices() {
            return Err(ScriptError::NotAChoiceField(field_id.to_string()));
        }

        let choice_id = (1..)
            .map(|n| format!("choice-{}", n))
            .find(|id| !field.has_choice(id))
            .unwrap_or_default();
        field.choices.push(Choice::new(choice_id.clone(), text));
        Ok(choice_id)
    }

    /// Sets the destination of a rule. The source page and destination must
    /// exist when authoring, even though runs tolerate dangling rules.
    pub fn connect(&mut self, key: RuleKey, destination: Destination) -> Result<(), ScriptError> {
        self.page_index(key.source())?;
        if let Destination::Page(target) = &destination {
            if self.script.page(target).is_none() {
                return Err(ScriptError::UnknownDestination(target.clone()));
            }
        }
        self.script.rules_mut().insert(key, destination);
        Ok(())
    }

    pub fn disconnect(&mut self, key: &RuleKey) -> Option<Destination> {
        self.script.rules_mut().remove(key)
    }

    fn page_index(&self, page_id: &str) -> Result<usize, ScriptError> {
        self.script
            .pages()
            .iter()
            .position(|p| p.id == page_id)
            .ok_or_else(|| ScriptError::PageNotFound(page_id.to_string()))
    }

    fn page_mut(&mut self, page_id: &str) -> Result<&mut Page, ScriptError> {
        self.script
            .pages_mut()
            .iter_mut()
            .find(|p| p.id == page_id)
            .ok_or_else(|| ScriptError::PageNotFound(page_id.to_string()))
    }

    fn next_id(&self, prefix: &str, taken: impl Fn(&ScriptSnapshot, &str) -> bool) -> String {
        (1..)
            .map(|n| format!("{}-{}", prefix, n))
            .find(|id| !taken(&self.script, id.as_str()))
            .unwrap_or_default()
    }
}

fn field_not_found(page_id: &str, field_id: &str) -> ScriptError {
    ScriptError::FieldNotFound {
        page_id: page_id.to_string(),
        field_id: field_id.to_string(),
    }
}
