use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::engines::expression::{ExprTree, Parser};
use crate::error::Result;

/// Saved expressions, one serialized tree per line
pub struct ExpressionLibrary {
    path: PathBuf,
}

impl ExpressionLibrary {
    /// A missing file is an empty library; it is created on first append
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Non-blank lines, trimmed
    pub fn entries(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    pub fn load(&self, parser: &Parser) -> Result<Vec<ExprTree>> {
        let trees = self
            .entries()?
            .iter()
            .map(|line| parser.parse(line))
            .collect::<Result<Vec<_>>>()?;
        log::debug!("Loaded {} expressions from {}", trees.len(), self.path.display());
        Ok(trees)
    }

    pub fn append(&self, tree: &ExprTree) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", tree)?;
        Ok(())
    }

    /// Overwrite the file with exactly these expressions
    pub fn write_all(&self, trees: &[ExprTree]) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let content: String = trees.iter().map(|tree| format!("{}\n", tree)).collect();
        fs::write(&self.path, content)?;
        Ok(())
    }

    /// Drop every line holding `tree`; returns how many were removed
    pub fn remove(&self, tree: &ExprTree) -> Result<usize> {
        let target = tree.to_string();
        let entries = self.entries()?;
        let kept: Vec<&String> = entries.iter().filter(|line| **line != target).collect();
        let removed = entries.len() - kept.len();

        if removed > 0 {
            let mut content = String::new();
            for line in kept {
                content.push_str(line);
                content.push('\n');
            }
            fs::write(&self.path, content)?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::FunctionRegistry;
    use std::sync::Arc;

    fn parser() -> Parser {
        Parser::new(Arc::new(FunctionRegistry::with_builtins().unwrap()))
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let library = ExpressionLibrary::open(dir.path().join("none.txt"));
        assert!(library.entries().unwrap().is_empty());
        assert!(library.load(&parser()).unwrap().is_empty());
    }

    #[test]
    fn test_append_load_remove() {
        let dir = tempfile::tempdir().unwrap();
        let library = ExpressionLibrary::open(dir.path().join("saved").join(".library.txt"));
        let parser = parser();
        let a = parser.parse("(sin x)").unwrap();
        let b = parser.parse("(+ y #0.1,0.2,0.3)").unwrap();

        library.append(&a).unwrap();
        library.append(&b).unwrap();
        library.append(&a).unwrap();

        let loaded: Vec<String> = library
            .load(&parser)
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(loaded, vec!["(sin x)", "(+ y #0.1,0.2,0.3)", "(sin x)"]);

        assert_eq!(library.remove(&a).unwrap(), 2);
        assert_eq!(library.entries().unwrap(), vec!["(+ y #0.1,0.2,0.3)"]);
        assert_eq!(library.remove(&a).unwrap(), 0);
    }

    #[test]
    fn test_bad_line_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib.txt");
        std::fs::write(&path, "(sin x)\n(nope x)\n").unwrap();
        assert!(ExpressionLibrary::open(&path).load(&parser()).is_err());
    }
}
