use crate::RefError;

/// A validated reference name, e.g. `HEAD` or `refs/heads/master`.
///
/// Validation is deliberately conservative: names map straight onto
/// paths under `.git`, so anything that could escape or alias the refs
/// tree is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RefName(String);

impl RefName {
    pub fn new(name: impl Into<String>) -> Result<Self, RefError> {
        let name = name.into();
        if !is_valid(&name) {
            return Err(RefError::InvalidName(name));
        }
        Ok(Self(name))
    }

    /// Shorthand for `refs/heads/<branch>`.
    pub fn branch(branch: &str) -> Result<Self, RefError> {
        Self::new(format!("refs/heads/{branch}"))
    }

    pub fn head() -> Self {
        Self("HEAD".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name without its `refs/heads/` prefix, if it is a branch.
    pub fn branch_name(&self) -> Option<&str> {
        self.0.strip_prefix("refs/heads/")
    }
}

fn is_valid(name: &str) -> bool {
    if name == "HEAD" {
        return true;
    }
    if name.is_empty() || !name.starts_with("refs/") {
        return false;
    }
    if name.ends_with('/') || name.contains("//") {
        return false;
    }
    for component in name.split('/') {
        if component.is_empty() || component == "." || component == ".." {
            return false;
        }
        if component.ends_with(".lock") {
            return false;
        }
    }
    !name.bytes().any(|b| {
        b.is_ascii_control() || matches!(b, b' ' | b'~' | b'^' | b':' | b'?' | b'*' | b'[' | b'\\')
    })
}

impl std::fmt::Display for RefName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_standard_names() {
        for name in ["HEAD", "refs/heads/master", "refs/tags/v1.0", "refs/heads/a/b"] {
            assert!(RefName::new(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn rejects_traversal_and_specials() {
        for name in [
            "",
            "refs/",
            "refs/heads/../escape",
            "refs/heads//double",
            "refs/heads/sp ace",
            "refs/heads/co:lon",
            "refs/heads/name.lock",
            "master",
        ] {
            assert!(RefName::new(name).is_err(), "{name:?} should be invalid");
        }
    }

    #[test]
    fn branch_shorthand() {
        let name = RefName::branch("master").unwrap();
        assert_eq!(name.as_str(), "refs/heads/master");
        assert_eq!(name.branch_name(), Some("master"));
        assert_eq!(RefName::head().branch_name(), None);
    }
}
