use serde::Serialize;

use bunkerdesk_domain::ResourceDescriptor;

/// API projection of one registered resource descriptor.
#[derive(Debug, Serialize)]
pub struct ResourceDescriptorResponse {
    pub logical_name: String,
    pub display_name: String,
    pub fields: Vec<ResourceFieldResponse>,
    pub sequence_field: Option<String>,
}

/// API projection of one descriptor field.
#[derive(Debug, Serialize)]
pub struct ResourceFieldResponse {
    pub logical_name: String,
    pub display_name: String,
    pub field_type: String,
    pub is_required: bool,
    pub is_unique: bool,
    pub reference_target: Option<String>,
}

impl From<&ResourceDescriptor> for ResourceDescriptorResponse {
    fn from(descriptor: &ResourceDescriptor) -> Self {
        Self {
            logical_name: descriptor.logical_name().as_str().to_owned(),
            display_name: descriptor.display_name().as_str().to_owned(),
            fields: descriptor
                .fields()
                .iter()
                .map(|field| ResourceFieldResponse {
                    logical_name: field.logical_name().as_str().to_owned(),
                    display_name: field.display_name().as_str().to_owned(),
                    field_type: field.field_type().as_str().to_owned(),
                    is_required: field.is_required(),
                    is_unique: field.is_unique(),
                    reference_target: field
                        .reference_target()
                        .map(|target| target.as_str().to_owned()),
                })
                .collect(),
            sequence_field: descriptor
                .numbering()
                .map(|numbering| numbering.field_name().as_str().to_owned()),
        }
    }
}
