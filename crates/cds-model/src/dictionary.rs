use serde::{Deserialize, Serialize};

/// Value type of a dictionary field.
///
/// The dictionary service publishes `integer` and `number` as distinct types;
/// both coerce to a numeric value here, so `integer` is accepted as an alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    #[serde(alias = "integer")]
    Number,
    Boolean,
}

/// Constraints attached to a single field definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Restrictions {
    pub required: bool,
    pub regex: Option<String>,
    pub code_list: Option<Vec<String>>,
}

/// One field of a schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    pub value_type: ValueType,
    /// Array-of-string fields carry `;`-delimited values in the raw file.
    #[serde(default)]
    pub is_array: bool,
    #[serde(default)]
    pub restrictions: Option<Restrictions>,
}

impl Field {
    pub fn is_required(&self) -> bool {
        self.restrictions.as_ref().is_some_and(|r| r.required)
    }

    pub fn regex(&self) -> Option<&str> {
        self.restrictions.as_ref().and_then(|r| r.regex.as_deref())
    }

    pub fn code_list(&self) -> Option<&[String]> {
        self.restrictions
            .as_ref()
            .and_then(|r| r.code_list.as_deref())
    }
}

/// Typed field definitions for one tabular entity (e.g. "biospecimen").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// A named, versioned collection of schemas. Immutable once published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dictionary {
    pub name: String,
    pub version: String,
    pub schemas: Vec<Schema>,
}

impl Dictionary {
    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.iter().find(|schema| schema.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_dictionary_json() {
        let json = r#"{
            "name": "clinical-dictionary",
            "version": "5.12",
            "schemas": [
                {
                    "name": "sample_registration",
                    "fields": [
                        {
                            "name": "study_id",
                            "valueType": "string",
                            "restrictions": { "required": true }
                        },
                        {
                            "name": "age_at_collection",
                            "valueType": "integer"
                        },
                        {
                            "name": "tissue_codes",
                            "valueType": "string",
                            "isArray": true,
                            "restrictions": { "codeList": ["Blood", "Saliva"] }
                        }
                    ]
                }
            ]
        }"#;

        let dictionary: Dictionary = serde_json::from_str(json).unwrap();
        assert_eq!(dictionary.version, "5.12");

        let schema = dictionary.schema("sample_registration").unwrap();
        assert!(schema.field("study_id").unwrap().is_required());
        assert_eq!(
            schema.field("age_at_collection").unwrap().value_type,
            ValueType::Number
        );
        let codes = schema.field("tissue_codes").unwrap();
        assert!(codes.is_array);
        assert_eq!(codes.code_list().unwrap().len(), 2);
    }

    #[test]
    fn unknown_schema_is_none() {
        let dictionary = Dictionary {
            name: "d".to_string(),
            version: "1.0".to_string(),
            schemas: Vec::new(),
        };
        assert!(dictionary.schema("donor").is_none());
    }
}
