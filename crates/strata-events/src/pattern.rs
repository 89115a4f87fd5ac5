/// Subscription pattern over event type tags: exact (`load.started`),
/// trailing wildcard (`load.*`), or everything (`*`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypePattern {
    All,
    Exact(String),
    Prefix(String),
}

impl TypePattern {
    pub fn parse(raw: &str) -> Self {
        if raw == "*" {
            Self::All
        } else if let Some(prefix) = raw.strip_suffix(".*") {
            Self::Prefix(format!("{prefix}."))
        } else {
            Self::Exact(raw.to_string())
        }
    }

    pub fn matches(&self, event_type: &str) -> bool {
        match self {
            Self::All => true,
            Self::Exact(tag) => event_type == tag,
            Self::Prefix(prefix) => event_type.starts_with(prefix.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_matches_only_itself() {
        let p = TypePattern::parse("load.started");
        assert!(p.matches("load.started"));
        assert!(!p.matches("load.completed"));
    }

    #[test]
    fn trailing_wildcard_matches_operation() {
        let p = TypePattern::parse("load.*");
        assert!(p.matches("load.started"));
        assert!(p.matches("load.failed"));
        assert!(!p.matches("search.started"));
        assert!(!p.matches("loader.started"));
    }

    #[test]
    fn star_matches_everything() {
        let p = TypePattern::parse("*");
        assert!(p.matches("load.started"));
        assert!(p.matches("engine.stopped"));
    }
}
