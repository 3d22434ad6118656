//! Name Filter

use crate::domain::ControllerRef;

/// Case-sensitive substring match; an empty pattern matches every name
pub fn matches(name: &str, pattern: &str) -> bool {
    name.contains(pattern)
}

/// Keep the controllers whose name contains `pattern`, preserving order
pub fn filter(controllers: Vec<ControllerRef>, pattern: &str) -> Vec<ControllerRef> {
    controllers
        .into_iter()
        .filter(|c| matches(&c.name, pattern))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ControllerKind;

    #[test]
    fn test_matches() {
        assert!(matches("database-primary", "database"));
        assert!(matches("orders-database", "database"));
        assert!(matches("database", "database"));
        assert!(!matches("web-api", "database"));
        assert!(!matches("Database-primary", "database"));
        assert!(!matches("data-base", "database"));
    }

    #[test]
    fn test_no_pattern_semantics() {
        assert!(!matches("database-primary", "data*"));
        assert!(!matches("database-primary", "^database"));
        assert!(matches("cache.*", ".*"));
    }

    #[test]
    fn test_empty_pattern_matches_all() {
        assert!(matches("anything", ""));
        assert!(matches("", ""));
    }

    #[test]
    fn test_filter_preserves_order() {
        let controllers = ["database-primary", "web-api", "database-cache"]
            .iter()
            .map(|n| ControllerRef::new(ControllerKind::Deployment, *n, "prod"))
            .collect::<Vec<_>>();

        let kept: Vec<_> = filter(controllers.clone(), "database")
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(kept, vec!["database-primary", "database-cache"]);

        assert_eq!(filter(controllers.clone(), "").len(), controllers.len());
        assert!(filter(controllers, "redis").is_empty());
    }
}
