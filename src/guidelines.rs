use std::{fs, path::PathBuf};

use tracing::debug;

pub const DESIGN_GUIDELINES_FILE: &str = "design_guidelines.md";
pub const POLICY_GUIDELINES_FILE: &str = "policy_guidelines.md";

const DEFAULT_DESIGN_GUIDELINES: &str = "\
Default design guidelines:
- Use only these colors: #FE7743 (orange), #EFEEEA (background), #273F4F (navy), #000000 (black)
- Flat 2D style only, no gradients, shadows or 3D effects
- Geometric shapes only (circles, squares, rectangles, lines, triangles)
- Bauhaus-inspired: balanced asymmetry, interlocking forms, clear visual hierarchy
- Minimalist, clean composition with ample negative space
- Typography: Open Sans font only
- Smooth transitions and stable footage for video
- Minimum 1080p resolution";

const DEFAULT_POLICY_GUIDELINES: &str = "\
Default policy guidelines:
- No prohibited or sensitive content (violence, discrimination, explicit material)
- Professional, authentic tone
- No misleading claims or exaggerated statements
- No copyright violations, original content only
- Accessible design with proper contrast (WCAG 2.1 AA)
- No real individuals or public figures
- Avoid flashing content for accessibility";

/// Read-only access to the design and policy guideline documents. The
/// documents are forwarded verbatim into remote requests, never parsed.
/// Built-in text stands in when a file is missing or empty.
#[derive(Clone, Debug)]
pub struct GuidelineStore {
    dir: PathBuf,
}

impl GuidelineStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn design(&self) -> String {
        self.read_or_default(DESIGN_GUIDELINES_FILE, DEFAULT_DESIGN_GUIDELINES)
    }

    pub fn policy(&self) -> String {
        self.read_or_default(POLICY_GUIDELINES_FILE, DEFAULT_POLICY_GUIDELINES)
    }

    fn read_or_default(&self, file_name: &str, fallback: &str) -> String {
        let path = self.dir.join(file_name);
        match fs::read_to_string(&path) {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => fallback.to_string(),
            Err(err) => {
                debug!(
                    target: "guidelines",
                    path = %path.display(),
                    %err,
                    "guideline file unavailable, using built-in text"
                );
                fallback.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_uses_builtin_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = GuidelineStore::new(dir.path().to_path_buf());
        assert!(store.design().contains("Default design guidelines"));
        assert!(store.policy().contains("Default policy guidelines"));
    }

    #[test]
    fn file_contents_win_over_builtin_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join(DESIGN_GUIDELINES_FILE),
            "Brand rules: blue only",
        )
        .expect("write");

        let store = GuidelineStore::new(dir.path().to_path_buf());
        assert_eq!(store.design(), "Brand rules: blue only");
        assert!(store.policy().contains("Default policy guidelines"));
    }

    #[test]
    fn empty_file_uses_builtin_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(POLICY_GUIDELINES_FILE), "  \n").expect("write");

        let store = GuidelineStore::new(dir.path().to_path_buf());
        assert!(store.policy().contains("Default policy guidelines"));
    }
}
