use serde::Deserialize;
use std::collections::HashMap;

/// Choice entry of a builder field or legacy page
#[derive(Debug, Deserialize, Clone)]
pub struct UiChoice {
    pub id: String,
    #[serde(default)]
    pub text: String,
}

/// Field inside a form page
#[derive(Debug, Deserialize, Clone)]
pub struct UiField {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    #[serde(alias = "apiName")]
    pub api_name: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub choices: Option<Vec<UiChoice>>,
    #[serde(default)]
    pub placeholder: Option<String>,
}

/// Page as exported by the builder
#[derive(Debug, Deserialize, Clone)]
pub struct UiPage {
    pub id: String,
    #[serde(rename = "type")]
    pub page_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub fields: Option<Vec<UiField>>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub choices: Option<Vec<UiChoice>>,
    #[serde(default)]
    pub placeholder: Option<String>,
}

/// Complete builder script with its flat rule mapping
#[derive(Debug, Deserialize)]
pub struct UiScript {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub pages: Vec<UiPage>,
    #[serde(default)]
    #[serde(alias = "logicRules")]
    pub logic_rules: HashMap<String, String>,
}
