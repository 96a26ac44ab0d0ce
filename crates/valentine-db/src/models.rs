/// Database row types. These map directly to SQLite rows.
/// Distinct from valentine-types API models to keep the DB layer independent.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRow {
    pub id: String,
    pub sender_name: String,
    pub recipient_name: String,
    pub message: String,
    pub custom_message: Option<String>,
    pub gift: String,
    pub theme: String,
    pub music: String,
    pub accepted: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Column values for a fresh insert. Timestamps are assigned by the database layer.
pub struct NewRequestRow<'a> {
    pub id: &'a str,
    pub sender_name: &'a str,
    pub recipient_name: &'a str,
    pub message: &'a str,
    pub custom_message: Option<&'a str>,
    pub gift: &'a str,
    pub theme: &'a str,
    pub music: &'a str,
    pub accepted: bool,
}
