use serde::{Deserialize, Serialize};

/// Programming language tag used by plans, translators and runners
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Language {
    Python,
    JavaScript,
    Java,
    Other(String),
}

impl Language {
    /// Parse a free-form language tag. Never fails: unknown tags become `Other`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "python" | "py" => Language::Python,
            "javascript" | "js" | "node" => Language::JavaScript,
            "java" => Language::Java,
            _ => Language::Other(tag.trim().to_string()),
        }
    }

    /// Canonical lowercase tag
    pub fn tag(&self) -> &str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::Java => "java",
            Language::Other(tag) => tag,
        }
    }

    pub fn extension(&self) -> Option<&'static str> {
        match self {
            Language::Python => Some(".py"),
            Language::JavaScript => Some(".js"),
            Language::Java => Some(".java"),
            Language::Other(_) => None,
        }
    }

    pub fn paradigm(&self) -> Option<&'static str> {
        match self {
            Language::Python | Language::JavaScript => Some("multi-paradigm"),
            Language::Java => Some("object-oriented"),
            Language::Other(_) => None,
        }
    }

    /// Whether translated output gets `;` appended to each statement line
    pub fn uses_statement_terminators(&self) -> bool {
        matches!(self, Language::JavaScript)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::Python => write!(f, "Python"),
            Language::JavaScript => write!(f, "JavaScript"),
            Language::Java => write!(f, "Java"),
            Language::Other(name) => write!(f, "{}", name),
        }
    }
}

impl std::str::FromStr for Language {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Language::from_tag(s))
    }
}

impl From<String> for Language {
    fn from(tag: String) -> Self {
        Language::from_tag(&tag)
    }
}

impl From<&str> for Language {
    fn from(tag: &str) -> Self {
        Language::from_tag(tag)
    }
}

impl From<Language> for String {
    fn from(lang: Language) -> Self {
        lang.tag().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag_aliases() {
        assert_eq!(Language::from_tag("python"), Language::Python);
        assert_eq!(Language::from_tag("PY"), Language::Python);
        assert_eq!(Language::from_tag("js"), Language::JavaScript);
        assert_eq!(Language::from_tag("Node"), Language::JavaScript);
        assert_eq!(Language::from_tag(" java "), Language::Java);
    }

    #[test]
    fn test_unknown_tag_is_other() {
        let lang = Language::from_tag("cobol");
        assert_eq!(lang, Language::Other("cobol".to_string()));
        assert_eq!(lang.tag(), "cobol");
        assert!(lang.extension().is_none());
        assert!(lang.paradigm().is_none());
    }

    #[test]
    fn test_metadata() {
        assert_eq!(Language::Python.extension(), Some(".py"));
        assert_eq!(Language::Java.paradigm(), Some("object-oriented"));
        assert_eq!(Language::JavaScript.paradigm(), Some("multi-paradigm"));
    }

    #[test]
    fn test_statement_terminators() {
        assert!(Language::JavaScript.uses_statement_terminators());
        assert!(!Language::Java.uses_statement_terminators());
        assert!(!Language::Python.uses_statement_terminators());
        assert!(!Language::Other("go".to_string()).uses_statement_terminators());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Language::JavaScript), "JavaScript");
        assert_eq!(format!("{}", Language::Other("lua".to_string())), "lua");
    }

    #[test]
    fn test_serde_as_tag() {
        let json = serde_json::to_string(&Language::JavaScript).unwrap();
        assert_eq!(json, "\"javascript\"");
        let back: Language = serde_json::from_str("\"py\"").unwrap();
        assert_eq!(back, Language::Python);
    }

    #[test]
    fn test_from_str_infallible() {
        let lang: Language = "brainfuck".parse().unwrap();
        assert_eq!(lang.tag(), "brainfuck");
    }
}
