// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! NFT metadata document and the lenient normalization of upload fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use super::ContentLocator;

pub const DEFAULT_NAME: &str = "NFT Example";
pub const DEFAULT_DESCRIPTION: &str = "This is an unchangeable NFT";

/// Descriptive fields of an upload after trimming and defaulting.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetFields {
    pub name: String,
    pub description: String,
    pub properties: Map<String, Value>,
}

impl Default for AssetFields {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            properties: Map::new(),
        }
    }
}

impl AssetFields {
    /// Normalize raw form values. Never fails.
    ///
    /// Blank strings fall back to the defaults. `properties` must be a JSON
    /// object; anything else becomes `{}`.
    pub fn from_form(
        name: Option<&str>,
        description: Option<&str>,
        properties: Option<&str>,
    ) -> Self {
        Self {
            name: trimmed_or(name, DEFAULT_NAME),
            description: trimmed_or(description, DEFAULT_DESCRIPTION),
            properties: parse_properties(properties),
        }
    }

    pub fn into_metadata(self, image: ContentLocator) -> NftMetadata {
        NftMetadata {
            name: self.name,
            description: self.description,
            image,
            properties: self.properties,
        }
    }
}

/// Metadata document pinned next to the asset image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NftMetadata {
    pub name: String,
    pub description: String,
    /// Locator of the pinned image.
    #[schema(value_type = String, example = "ipfs://bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi")]
    pub image: ContentLocator,
    #[schema(value_type = Object)]
    pub properties: Map<String, Value>,
}

fn trimmed_or(value: Option<&str>, default: &str) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

fn parse_properties(raw: Option<&str>) -> Map<String, Value> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Map::new();
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            tracing::debug!(kind = json_kind(&other), "properties is not a JSON object, using {{}}");
            Map::new()
        }
        Err(e) => {
            tracing::debug!(error = %e, "properties is not valid JSON, using {{}}");
            Map::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_fields_use_defaults() {
        assert_eq!(AssetFields::from_form(None, None, None), AssetFields::default());
    }

    #[test]
    fn whitespace_name_falls_back_to_default() {
        let fields = AssetFields::from_form(Some("  "), Some("\t\n"), None);
        assert_eq!(fields.name, DEFAULT_NAME);
        assert_eq!(fields.description, DEFAULT_DESCRIPTION);
    }

    #[test]
    fn values_are_trimmed() {
        let fields = AssetFields::from_form(Some("  Sunset #1 "), Some(" warm "), None);
        assert_eq!(fields.name, "Sunset #1");
        assert_eq!(fields.description, "warm");
    }

    #[test]
    fn invalid_properties_become_empty_object() {
        let fields = AssetFields::from_form(None, None, Some("not json"));
        assert!(fields.properties.is_empty());

        let fields = AssetFields::from_form(None, None, Some("[1, 2, 3]"));
        assert!(fields.properties.is_empty());
    }

    #[test]
    fn object_properties_are_kept() {
        let fields = AssetFields::from_form(None, None, Some(r#"{"rarity":"rare","level":3}"#));
        assert_eq!(Value::Object(fields.properties), json!({"rarity": "rare", "level": 3}));
    }

    #[test]
    fn metadata_embeds_image_locator() {
        let image = ContentLocator::from_hash("bafyimage").unwrap();
        let metadata = AssetFields::from_form(Some("Cat"), None, Some(r#"{"a":1}"#))
            .into_metadata(image);
        assert_eq!(
            serde_json::to_value(&metadata).unwrap(),
            json!({
                "name": "Cat",
                "description": DEFAULT_DESCRIPTION,
                "image": "ipfs://bafyimage",
                "properties": {"a": 1}
            })
        );
    }
}
