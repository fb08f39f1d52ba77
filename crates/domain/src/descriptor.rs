use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use bunkerdesk_core::{AppError, AppResult, NonEmptyString};

/// Supported descriptor field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// UTF-8 string field.
    Text,
    /// Numeric field.
    Number,
    /// Boolean field.
    Boolean,
    /// Date-only string field.
    Date,
    /// Date-time string field.
    DateTime,
    /// Arbitrary JSON field.
    Json,
    /// Many-to-one reference to another resource's record.
    Reference,
}

impl FieldType {
    /// Returns a stable storage value for the field type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Json => "json",
            Self::Reference => "reference",
        }
    }

    fn validate_value(self, value: &Value) -> AppResult<()> {
        let is_valid = match self {
            Self::Text | Self::Date | Self::DateTime => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Json => true,
            Self::Reference => value
                .as_str()
                .map(|text| !text.trim().is_empty())
                .unwrap_or(false),
        };

        if !is_valid {
            return Err(AppError::Validation(format!(
                "value does not match field type '{}'",
                self.as_str()
            )));
        }

        Ok(())
    }
}

/// Declarative definition of one resource field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    logical_name: NonEmptyString,
    display_name: NonEmptyString,
    field_type: FieldType,
    is_required: bool,
    is_unique: bool,
    reference_target: Option<NonEmptyString>,
    reference_projection: Vec<String>,
}

impl FieldDefinition {
    /// Creates a validated non-reference field definition.
    pub fn new(
        logical_name: impl Into<String>,
        display_name: impl Into<String>,
        field_type: FieldType,
        is_required: bool,
        is_unique: bool,
    ) -> AppResult<Self> {
        if matches!(field_type, FieldType::Reference) {
            return Err(AppError::Validation(
                "reference fields must be declared through FieldDefinition::reference".to_owned(),
            ));
        }

        if is_unique && matches!(field_type, FieldType::Json) {
            return Err(AppError::Validation(
                "unique constraints are not supported for json field type".to_owned(),
            ));
        }

        Ok(Self {
            logical_name: NonEmptyString::new(logical_name)?,
            display_name: NonEmptyString::new(display_name)?,
            field_type,
            is_required,
            is_unique,
            reference_target: None,
            reference_projection: Vec::new(),
        })
    }

    /// Creates a validated reference field pointing at another resource.
    ///
    /// `projection` names the target's fields embedded on read.
    pub fn reference(
        logical_name: impl Into<String>,
        display_name: impl Into<String>,
        is_required: bool,
        target_resource: impl Into<String>,
        projection: Vec<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            logical_name: NonEmptyString::new(logical_name)?,
            display_name: NonEmptyString::new(display_name)?,
            field_type: FieldType::Reference,
            is_required,
            is_unique: false,
            reference_target: Some(NonEmptyString::new(target_resource)?),
            reference_projection: projection,
        })
    }

    /// Returns the field logical name.
    #[must_use]
    pub fn logical_name(&self) -> &NonEmptyString {
        &self.logical_name
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &NonEmptyString {
        &self.display_name
    }

    /// Returns the field type.
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Returns whether the field is required on creation.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.is_required
    }

    /// Returns whether the field value must be unique within the resource.
    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.is_unique
    }

    /// Returns the referenced resource type for reference fields.
    #[must_use]
    pub fn reference_target(&self) -> Option<&NonEmptyString> {
        self.reference_target.as_ref()
    }

    /// Returns the target fields embedded when populating the reference.
    #[must_use]
    pub fn reference_projection(&self) -> &[String] {
        &self.reference_projection
    }

    /// Validates a record value against this field definition.
    pub fn validate_value(&self, value: &Value) -> AppResult<()> {
        self.field_type.validate_value(value).map_err(|_| {
            AppError::Validation(format!(
                "field '{}' does not match field type '{}'",
                self.logical_name.as_str(),
                self.field_type.as_str()
            ))
        })
    }
}

/// Sequence numbering configuration for a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceNumbering {
    field_name: NonEmptyString,
    scope_field: Option<NonEmptyString>,
}

impl SequenceNumbering {
    /// Creates a numbering configuration.
    ///
    /// `scope_field` names the record field whose value partitions the
    /// counter (e.g. a parent reference); global numbering when absent.
    pub fn new(field_name: impl Into<String>, scope_field: Option<String>) -> AppResult<Self> {
        Ok(Self {
            field_name: NonEmptyString::new(field_name)?,
            scope_field: scope_field.map(NonEmptyString::new).transpose()?,
        })
    }

    /// Returns the record field receiving the allocated number.
    #[must_use]
    pub fn field_name(&self) -> &NonEmptyString {
        &self.field_name
    }

    /// Returns the field partitioning the counter scope.
    #[must_use]
    pub fn scope_field(&self) -> Option<&NonEmptyString> {
        self.scope_field.as_ref()
    }
}

/// Declarative schema for one resource type driving the generic CRUD facade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    logical_name: NonEmptyString,
    display_name: NonEmptyString,
    fields: Vec<FieldDefinition>,
    numbering: Option<SequenceNumbering>,
}

impl ResourceDescriptor {
    /// Creates a descriptor with invariant checks.
    pub fn new(
        logical_name: impl Into<String>,
        display_name: impl Into<String>,
        fields: Vec<FieldDefinition>,
        numbering: Option<SequenceNumbering>,
    ) -> AppResult<Self> {
        let logical_name = NonEmptyString::new(logical_name)?;

        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.logical_name().as_str().to_owned()) {
                return Err(AppError::Validation(format!(
                    "duplicate field logical name '{}' in resource '{}'",
                    field.logical_name().as_str(),
                    logical_name.as_str()
                )));
            }
        }

        if let Some(numbering) = &numbering {
            if seen.contains(numbering.field_name().as_str()) {
                return Err(AppError::Validation(format!(
                    "sequence field '{}' must not also be declared as a regular field in resource '{}'",
                    numbering.field_name().as_str(),
                    logical_name.as_str()
                )));
            }

            if let Some(scope_field) = numbering.scope_field() {
                if !seen.contains(scope_field.as_str()) {
                    return Err(AppError::Validation(format!(
                        "sequence scope field '{}' is not declared in resource '{}'",
                        scope_field.as_str(),
                        logical_name.as_str()
                    )));
                }
            }
        }

        Ok(Self {
            logical_name,
            display_name: NonEmptyString::new(display_name)?,
            fields,
            numbering,
        })
    }

    /// Returns the logical (stable) resource name.
    #[must_use]
    pub fn logical_name(&self) -> &NonEmptyString {
        &self.logical_name
    }

    /// Returns the display (human-friendly) name.
    #[must_use]
    pub fn display_name(&self) -> &NonEmptyString {
        &self.display_name
    }

    /// Returns all declared fields.
    #[must_use]
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    /// Returns the numbering configuration, if the resource is numbered.
    #[must_use]
    pub fn numbering(&self) -> Option<&SequenceNumbering> {
        self.numbering.as_ref()
    }

    /// Looks up a declared field by logical name.
    #[must_use]
    pub fn find_field(&self, logical_name: &str) -> Option<&FieldDefinition> {
        self.fields
            .iter()
            .find(|field| field.logical_name().as_str() == logical_name)
    }

    fn validate_known_fields(&self, data: &Map<String, Value>) -> AppResult<()> {
        for field_name in data.keys() {
            if let Some(numbering) = &self.numbering {
                if numbering.field_name().as_str() == field_name {
                    return Err(AppError::Validation(format!(
                        "field '{}' is assigned by the system and cannot be written",
                        field_name
                    )));
                }
            }

            if self.find_field(field_name).is_none() {
                return Err(AppError::Validation(format!(
                    "unknown field '{}' for resource '{}'",
                    field_name,
                    self.logical_name.as_str()
                )));
            }
        }

        Ok(())
    }

    /// Validates a full creation payload against the descriptor.
    pub fn validate_create(&self, data: &Map<String, Value>) -> AppResult<()> {
        self.validate_known_fields(data)?;

        for field in &self.fields {
            let value = data.get(field.logical_name().as_str());
            match value {
                Some(value) if !value.is_null() => field.validate_value(value)?,
                _ if field.is_required() => {
                    return Err(AppError::Validation(format!(
                        "field '{}' is required for resource '{}'",
                        field.logical_name().as_str(),
                        self.logical_name.as_str()
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Validates a partial update payload against the descriptor.
    pub fn validate_update(&self, fields: &Map<String, Value>) -> AppResult<()> {
        self.validate_known_fields(fields)?;

        for (field_name, value) in fields {
            let Some(field) = self.find_field(field_name) else {
                continue;
            };

            if value.is_null() {
                if field.is_required() {
                    return Err(AppError::Validation(format!(
                        "required field '{}' cannot be cleared",
                        field_name
                    )));
                }
                continue;
            }

            field.validate_value(value)?;
        }

        Ok(())
    }
}
