use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// A library the user can access: their own, or a group library.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Group {
    pub id: u64,
    pub name: String,
}
impl Group {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

impl Display for Group {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Look up the id of a library by its display name.
pub fn library_id(groups: &[Group], name: &str) -> Option<u64> {
    groups.iter().find(|g| g.name == name).map(|g| g.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_id_by_exact_name() {
        let groups = [Group::new(1, "My Library"), Group::new(4, "Lab Papers")];
        assert_eq!(library_id(&groups, "Lab Papers"), Some(4));
        assert_eq!(library_id(&groups, "lab papers"), None);
        assert_eq!(library_id(&[], "My Library"), None);
    }

    #[test]
    fn test_deserialize_ignores_extra_fields() {
        let group: Group = serde_json::from_str(r#"{"id": 2, "name": "Shared", "type": "group"}"#).unwrap();
        assert_eq!(group, Group::new(2, "Shared"));
    }
}
