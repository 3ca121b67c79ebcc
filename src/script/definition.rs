use serde::{Deserialize, Serialize};

/// The role a page plays in a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageType {
    Welcome,
    Form,
    Ending,
    /// Single-question page types from older script formats. They are shown
    /// as plain display pages and never expose fields.
    Legacy(String),
}

impl PageType {
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "welcome" => PageType::Welcome,
            "form" => PageType::Form,
            "ending" => PageType::Ending,
            other => PageType::Legacy(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PageType::Welcome => "welcome",
            PageType::Form => "form",
            PageType::Ending => "ending",
            PageType::Legacy(name) => name,
        }
    }
}

/// The input kind of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    ShortText,
    LongText,
    Email,
    Phone,
    Number,
    Website,
    MultipleChoice,
    Radio,
    Dropdown,
    Checkbox,
    Date,
    Time,
    Rating,
    File,
    Address,
    Payment,
    /// Static content block; carries no answer.
    Content,
    Other(String),
}

impl FieldType {
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "short-text" | "text" => FieldType::ShortText,
            "long-text" | "textarea" => FieldType::LongText,
            "email" => FieldType::Email,
            "phone" => FieldType::Phone,
            "number" => FieldType::Number,
            "website" | "url" => FieldType::Website,
            "multiple-choice" => FieldType::MultipleChoice,
            "radio" => FieldType::Radio,
            "dropdown" | "select" => FieldType::Dropdown,
            "checkbox" => FieldType::Checkbox,
            "date" => FieldType::Date,
            "time" => FieldType::Time,
            "rating" => FieldType::Rating,
            "file" | "file-upload" => FieldType::File,
            "address" => FieldType::Address,
            "payment" => FieldType::Payment,
            "content" | "content-block" => FieldType::Content,
            other => FieldType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldType::ShortText => "short-text",
            FieldType::LongText => "long-text",
            FieldType::Email => "email",
            FieldType::Phone => "phone",
            FieldType::Number => "number",
            FieldType::Website => "website",
            FieldType::MultipleChoice => "multiple-choice",
            FieldType::Radio => "radio",
            FieldType::Dropdown => "dropdown",
            FieldType::Checkbox => "checkbox",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::Rating => "rating",
            FieldType::File => "file",
            FieldType::Address => "address",
            FieldType::Payment => "payment",
            FieldType::Content => "content",
            FieldType::Other(name) => name,
        }
    }

    /// Field kinds that carry an ordered list of choices.
    pub fn has_choices(&self) -> bool {
        matches!(
            self,
            FieldType::MultipleChoice | FieldType::Radio | FieldType::Dropdown | FieldType::Checkbox
        )
    }

    /// Field kinds whose selected choice can branch the script.
    pub fn branches_on_choice(&self) -> bool {
        matches!(self, FieldType::MultipleChoice | FieldType::Radio)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub text: String,
}

impl Choice {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// One input inside a form page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Unique across the whole script.
    pub id: String,
    /// External key used by CRM and webhook consumers. Unique within the page.
    pub api_name: String,
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    pub choices: Vec<Choice>,
    pub placeholder: Option<String>,
}

impl Field {
    pub fn new(
        id: impl Into<String>,
        api_name: impl Into<String>,
        label: impl Into<String>,
        field_type: FieldType,
    ) -> Self {
        Self {
            id: id.into(),
            api_name: api_name.into(),
            label: label.into(),
            field_type,
            required: false,
            choices: Vec::new(),
            placeholder: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_choice(mut self, id: impl Into<String>, text: impl Into<String>) -> Self {
        self.choices.push(Choice::new(id, text));
        self
    }

    pub fn has_choice(&self, choice_id: &str) -> bool {
        self.choices.iter().any(|c| c.id == choice_id)
    }
}

/// One step of a script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub page_type: PageType,
    pub title: String,
    pub content: String,
    pub visible: bool,
    pub fields: Vec<Field>,
    // Single-answer attributes kept for scripts authored before form pages existed.
    pub question: Option<String>,
    pub choices: Vec<Choice>,
    pub placeholder: Option<String>,
}

impl Page {
    pub fn new(id: impl Into<String>, page_type: PageType) -> Self {
        Self {
            id: id.into(),
            page_type,
            title: String::new(),
            content: String::new(),
            visible: true,
            fields: Vec::new(),
            question: None,
            choices: Vec::new(),
            placeholder: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_choice(mut self, id: impl Into<String>, text: impl Into<String>) -> Self {
        self.choices.push(Choice::new(id, text));
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn is_form(&self) -> bool {
        self.page_type == PageType::Form
    }

    /// Fields that take part in validation and branching.
    ///
    /// Only form pages expose their fields; every other page type is a
    /// field-less display page.
    pub fn active_fields(&self) -> &[Field] {
        if self.is_form() { &self.fields } else { &[] }
    }

    pub fn field(&self, field_id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == field_id)
    }
}
