//! Built-in form schemas.
//!
//! Used by the offline schema generator and by the demo seed.

use crate::schema::{FieldDefinition, FieldSchema, FieldType};

const CONDITION_GRADES: &[&str] = &["Excellent", "Good", "Fair", "Poor", "Critical"];

pub const POLE_INSPECTION_TITLE: &str = "Electrical Pole Inspection Form";
pub const FIELD_INSPECTION_TITLE: &str = "Field Inspection Form";
pub const EQUIPMENT_MAINTENANCE_TITLE: &str = "Equipment Maintenance Log";
pub const SITE_SAFETY_AUDIT_TITLE: &str = "Site Safety Audit Form";

/// Electrical pole inspection with a high-voltage alert above 400 V.
pub fn pole_inspection() -> FieldSchema {
    FieldSchema::new(
        POLE_INSPECTION_TITLE,
        vec![
            FieldDefinition::new("inspector_name", "Inspector Name", FieldType::String)
                .required()
                .placeholder("Enter your full name"),
            FieldDefinition::new("pole_id", "Pole ID", FieldType::String)
                .required()
                .placeholder("e.g., POLE-2024-001"),
            FieldDefinition::new("inspection_date", "Inspection Date", FieldType::Date).required(),
            FieldDefinition::new("voltage", "Voltage Reading (V)", FieldType::Number)
                .required()
                .range(0.0, 1000.0)
                .notify_if(">400")
                .placeholder("Enter voltage in volts"),
            FieldDefinition::new("pole_condition", "Pole Condition", FieldType::Select)
                .required()
                .options(CONDITION_GRADES),
            FieldDefinition::new("photos", "Inspection Photos", FieldType::File),
            FieldDefinition::new("remarks", "Additional Remarks", FieldType::Textarea)
                .placeholder("Any additional observations..."),
        ],
    )
}

/// Generic pass/fail inspection.
pub fn field_inspection() -> FieldSchema {
    FieldSchema::new(
        FIELD_INSPECTION_TITLE,
        vec![
            FieldDefinition::new("inspector_name", "Inspector Name", FieldType::String).required(),
            FieldDefinition::new("location", "Location", FieldType::String).required(),
            FieldDefinition::new("inspection_date", "Inspection Date", FieldType::Date).required(),
            FieldDefinition::new("status", "Status", FieldType::Select)
                .required()
                .options(&["Pass", "Fail", "Needs Review"]),
            FieldDefinition::new("notes", "Notes", FieldType::Textarea),
        ],
    )
}

pub fn equipment_maintenance() -> FieldSchema {
    FieldSchema::new(
        EQUIPMENT_MAINTENANCE_TITLE,
        vec![
            FieldDefinition::new("equipment_id", "Equipment ID", FieldType::String)
                .required()
                .placeholder("EQ-2024-XXX"),
            FieldDefinition::new("technician_name", "Technician Name", FieldType::String)
                .required(),
            FieldDefinition::new("technician_email", "Technician Email", FieldType::Email)
                .required()
                .placeholder("technician@example.com"),
            FieldDefinition::new("maintenance_date", "Maintenance Date", FieldType::Date)
                .required(),
            FieldDefinition::new("hours_worked", "Hours Worked", FieldType::Number)
                .required()
                .range(0.0, 24.0),
            FieldDefinition::new("parts_replaced", "Parts Replaced", FieldType::Textarea)
                .placeholder("List parts that were replaced..."),
            FieldDefinition::new("condition_rating", "Equipment Condition", FieldType::Select)
                .required()
                .options(CONDITION_GRADES),
            FieldDefinition::new("requires_followup", "Requires Follow-up", FieldType::Boolean),
        ],
    )
}

/// Safety audit that alerts when the score drops below 70.
pub fn site_safety_audit() -> FieldSchema {
    FieldSchema::new(
        SITE_SAFETY_AUDIT_TITLE,
        vec![
            FieldDefinition::new("auditor_name", "Auditor Name", FieldType::String).required(),
            FieldDefinition::new("site_location", "Site Location", FieldType::String)
                .required()
                .placeholder("Enter site address or identifier"),
            FieldDefinition::new("audit_date", "Audit Date", FieldType::Date).required(),
            FieldDefinition::new("safety_score", "Safety Score (0-100)", FieldType::Number)
                .required()
                .range(0.0, 100.0)
                .notify_if("<70")
                .placeholder("Overall safety rating"),
            FieldDefinition::new("hazards_identified", "Hazards Identified", FieldType::Textarea)
                .required()
                .placeholder("List all identified hazards..."),
            FieldDefinition::new(
                "corrective_actions",
                "Corrective Actions Required",
                FieldType::Textarea,
            )
            .required()
            .placeholder("List required corrective actions..."),
            FieldDefinition::new("audit_photos", "Audit Photos", FieldType::File),
        ],
    )
}
