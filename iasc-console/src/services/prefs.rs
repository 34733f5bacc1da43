use std::path::Path;

use serde::{Deserialize, Serialize};

/// Which entity listing the console opens with.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Users,
    Groups,
}

/// Console state persisted between runs. Corrupt or missing files are
/// replaced with defaults rather than surfaced as errors.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct Prefs {
    #[serde(default)]
    pub view: View,
    #[serde(default)]
    pub selected_user: Option<String>,
    #[serde(default)]
    pub selected_group: Option<String>,
}

impl Prefs {
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let content = match std::fs::read_to_string(path.as_ref()) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };
        match toml::from_str(&content) {
            Ok(prefs) => prefs,
            Err(err) => {
                tracing::error!(
                    path = %path.as_ref().display(),
                    "discarding unreadable preferences: {err}"
                );
                Self::default()
            }
        }
    }

    pub fn store<P: AsRef<Path>>(&self, path: P) {
        let content = match toml::to_string_pretty(self) {
            Ok(content) => content,
            Err(err) => {
                tracing::error!("could not serialize preferences: {err}");
                return;
            }
        };
        if let Err(err) = std::fs::write(path.as_ref(), content) {
            tracing::error!(
                path = %path.as_ref().display(),
                "could not persist preferences: {err}"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let prefs = Prefs::load("/definitely/not/here.toml");
        assert_eq!(prefs, Prefs::default());
    }

    #[test]
    fn corrupt_file_yields_defaults() {
        let path = std::env::temp_dir().join("iasc-prefs-corrupt.toml");
        std::fs::write(&path, "view = {{{{").unwrap();
        let prefs = Prefs::load(&path);
        assert_eq!(prefs, Prefs::default());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn roundtrip() {
        let path = std::env::temp_dir().join("iasc-prefs-roundtrip.toml");
        let prefs = Prefs {
            view: View::Groups,
            selected_user: Some("u-1".to_owned()),
            selected_group: None,
        };
        prefs.store(&path);
        assert_eq!(Prefs::load(&path), prefs);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn partial_file_fills_defaults() {
        let prefs: Prefs = toml::from_str(r#"view = "groups""#).unwrap();
        assert_eq!(prefs.view, View::Groups);
        assert_eq!(prefs.selected_user, None);
    }
}
