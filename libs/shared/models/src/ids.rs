use uuid::Uuid;

use crate::error::AppError;

/// Parses a path or query identifier, naming the entity in the error.
pub fn parse_id(entity: &str, raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::InvalidArgument(format!("invalid {} id '{}'", entity, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_ids_are_invalid_arguments() {
        assert!(parse_id("doctor", "67e55044-10b1-426f-9247-bb680e5fe0c8").is_ok());
        match parse_id("doctor", "not-a-uuid") {
            Err(AppError::InvalidArgument(msg)) => assert!(msg.contains("doctor")),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
