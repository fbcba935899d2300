//! Doctor - Dependency checking

use crate::core::model::{ResultItem, ResultSet, SweepIssue};
use crate::core::util::command_exists;

/// Dependency status
#[derive(Debug, Clone)]
pub struct DependencyStatus {
    pub name: String,
    pub available: bool,
    /// What the tool is needed for
    pub needed_for: String,
    pub notes: Option<String>,
}

impl DependencyStatus {
    pub fn to_result_item(&self) -> ResultItem {
        let status = if self.available { "✓" } else { "✗" };
        let found = if self.available {
            format!("found: {}", self.name)
        } else {
            "not found".to_string()
        };

        let mut excerpt = format!(
            "{} {} (needed for {}) - {}",
            status, self.name, self.needed_for, found
        );
        if let Some(notes) = &self.notes {
            excerpt.push_str(&format!("\n  Note: {}", notes));
        }

        let item = ResultItem::check(excerpt);
        if self.available {
            item
        } else {
            item.with_error(SweepIssue::new(
                "MISSING_DEPENDENCY",
                format!("{} is needed for {} but was not found", self.name, self.needed_for),
            ))
        }
    }
}

/// Check all dependencies
pub fn check_dependencies() -> Vec<DependencyStatus> {
    vec![DependencyStatus {
        name: "git".to_string(),
        available: command_exists("git"),
        needed_for: "rename --push".to_string(),
        notes: Some("Install: https://git-scm.com/downloads".to_string()),
    }]
}

pub fn doctor_report() -> ResultSet {
    check_dependencies()
        .iter()
        .map(DependencyStatus::to_result_item)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Kind;

    #[test]
    fn test_check_dependencies() {
        let deps = check_dependencies();
        let names: Vec<_> = deps.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["git"]);
    }

    #[test]
    fn test_missing_dependency_carries_error() {
        let status = DependencyStatus {
            name: "git".to_string(),
            available: false,
            needed_for: "rename --push".to_string(),
            notes: None,
        };

        let item = status.to_result_item();
        assert_eq!(item.kind, Kind::Check);
        assert!(item.excerpt.as_deref().unwrap().starts_with("✗ git"));
        assert_eq!(item.errors[0].code, "MISSING_DEPENDENCY");
    }

    #[test]
    fn test_available_dependency_has_no_error() {
        let status = DependencyStatus {
            name: "git".to_string(),
            available: true,
            needed_for: "rename --push".to_string(),
            notes: Some("hint".to_string()),
        };

        let item = status.to_result_item();
        assert!(item.errors.is_empty());
        assert!(item.excerpt.as_deref().unwrap().ends_with("Note: hint"));
    }

    #[test]
    fn test_doctor_report_one_item_per_dependency() {
        assert_eq!(doctor_report().len(), check_dependencies().len());
    }
}
