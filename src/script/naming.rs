//! apiName normalisation.
//!
//! apiNames are the keys CRM and webhook consumers see, so they are kept as
//! lowercase snake_case and unique within a page.

use super::definition::Field;

/// Turns free text such as a field label into a snake_case identifier.
pub fn to_api_name(text: &str) -> String {
    let mut name = String::with_capacity(text.len());
    let mut pending_separator = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !name.is_empty() {
                name.push('_');
            }
            pending_separator = false;
            name.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    if name.is_empty() {
        "field".to_string()
    } else {
        name
    }
}

/// Returns `base` if no other field on the page uses it, otherwise the first
/// free `base_2`, `base_3`, ...
///
/// `skip_field_id` excludes the field being renamed from the collision check.
pub fn unique_api_name(base: &str, fields: &[Field], skip_field_id: Option<&str>) -> String {
    let taken = |candidate: &str| {
        fields
            .iter()
            .filter(|f| Some(f.id.as_str()) != skip_field_id)
            .any(|f| f.api_name == candidate)
    };

    if !taken(base) {
        return base.to_string();
    }

    (2..)
        .map(|n| format!("{}_{}", base, n))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}
