use uuid::Uuid;

pub fn get_uuid() -> Uuid {
    Uuid::new_v4()
}

/// Fresh correlation identifier in its wire (hyphenated string) form.
pub fn new_correlation_id() -> String {
    get_uuid().to_string()
}
