//! The closed annotation label vocabulary

/// Every label the generation prompt asks the model to produce, plus the
/// catch-all. Used as the allowed-label filter for span exports.
pub const KNOWN_LABELS: [&str; 9] = [
    "First_Name",
    "Last_Name",
    "Location",
    "Health_Care_Unit",
    "Age",
    "Phone_Number",
    "Social_Security_Number",
    "Date",
    "PHI",
];

/// Label used when only yes/no de-identification is scored, with entity
/// categories collapsed.
pub const CATCH_ALL_LABEL: &str = "PHI";

/// Whether a label belongs to the known vocabulary.
pub fn is_known_label(label: &str) -> bool {
    KNOWN_LABELS.contains(&label)
}
