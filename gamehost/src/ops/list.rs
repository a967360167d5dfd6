//! List operation - built-in templates.

use gamehost_template::builtin::BUILTINS;

use crate::reports::{BuiltinInfo, ListReport};

/// Execute the list operation.
pub fn list() -> ListReport {
    ListReport {
        builtins: BUILTINS
            .iter()
            .map(|b| BuiltinInfo {
                name: b.name.to_string(),
                summary: b.summary.to_string(),
            })
            .collect(),
    }
}
