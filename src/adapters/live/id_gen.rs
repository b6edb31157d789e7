//! Conversation ids from random UUIDs.

use uuid::Uuid;

use crate::ports::IdGenerator;

/// Names each conversation with a fresh v4 UUID.
#[derive(Debug, Default, Clone, Copy)]
pub struct LiveIdGenerator;

impl IdGenerator for LiveIdGenerator {
    fn generate_id(&self) -> String {
        Uuid::new_v4().hyphenated().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_v4_uuids_and_do_not_repeat() {
        let ids: HashSet<String> = (0..100).map(|_| LiveIdGenerator.generate_id()).collect();
        assert_eq!(ids.len(), 100);
        for id in &ids {
            assert_eq!(Uuid::parse_str(id).unwrap().get_version_num(), 4);
        }
    }
}
