use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use crate::traits::HostForm;

/// In-memory host form with a fixed set of named fields.
#[derive(Debug, Default)]
pub struct FormState {
    fields: Mutex<BTreeMap<String, String>>,
}

impl FormState {
    pub fn with_fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: Mutex::new(
                names
                    .into_iter()
                    .map(|name| (name.into(), String::new()))
                    .collect(),
            ),
        }
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.fields
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl HostForm for FormState {
    fn field(&self, name: &str) -> Option<String> {
        self.fields
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    fn set_field(&self, name: &str, value: &str) -> bool {
        let mut fields = self.fields.lock().unwrap_or_else(PoisonError::into_inner);
        match fields.get_mut(name) {
            Some(slot) => {
                *slot = value.to_string();
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_declared_fields_are_writable() {
        let form = FormState::with_fields(["selectedSdms"]);
        assert!(form.set_field("selectedSdms", "123"));
        assert!(!form.set_field("selectedGuideSdms", "9"));
        assert_eq!(form.field("selectedSdms").as_deref(), Some("123"));
        assert_eq!(form.field("selectedGuideSdms"), None);
    }
}
