use anyhow::Context;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Named float settings shared by the hosted components.
#[derive(Default, Debug, Clone)]
pub struct Preferences {
    floats: HashMap<String, f32>,
}

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a JSON object of `name: number` pairs. A missing file is an empty store.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = match fs::read(path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                log::info!("No preferences at {:?}, using defaults", path);
                return Ok(Self::new());
            }
            Err(error) => return Err(error).with_context(|| format!("Failed to read preferences {:?}", path)),
        };

        Self::from_json(&contents).with_context(|| format!("Failed to parse preferences {:?}", path))
    }

    pub fn from_json(contents: &[u8]) -> anyhow::Result<Self> {
        let floats: HashMap<String, f32> = serde_json::from_slice(contents)?;
        Ok(Self { floats })
    }

    pub fn get_float(&self, name: &str) -> Option<f32> {
        self.floats.get(name).copied()
    }

    pub fn get_float_or(&self, name: &str, default: f32) -> f32 {
        self.get_float(name).unwrap_or(default)
    }

    #[allow(dead_code)]
    pub fn set_float(&mut self, name: &str, value: f32) {
        self.floats.insert(name.to_owned(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::Preferences;

    #[test]
    fn parses_named_floats() {
        let preferences = Preferences::from_json(br#"{"Rotation Speed": 15.0, "Movement Speed": 2}"#).unwrap();
        assert_eq!(preferences.get_float("Rotation Speed"), Some(15.0));
        assert_eq!(preferences.get_float("Movement Speed"), Some(2.0));
        assert_eq!(preferences.get_float("Jump Height"), None);
    }

    #[test]
    fn get_float_or_falls_back_when_unset() {
        let mut preferences = Preferences::new();
        assert_eq!(preferences.get_float_or("Movement Speed", 1.0), 1.0);
        preferences.set_float("Movement Speed", 3.5);
        assert_eq!(preferences.get_float_or("Movement Speed", 1.0), 3.5);
    }

    #[test]
    fn rejects_non_numeric_values() {
        assert!(Preferences::from_json(br#"{"Rotation Speed": "fast"}"#).is_err());
    }

    #[test]
    fn missing_file_is_an_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let preferences = Preferences::load(&dir.path().join("preferences.json")).unwrap();
        assert_eq!(preferences.get_float("Rotation Speed"), None);
    }

    #[test]
    fn loads_from_file_and_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");

        std::fs::write(&path, r#"{"Movement Speed": 0.25}"#).unwrap();
        assert_eq!(Preferences::load(&path).unwrap().get_float("Movement Speed"), Some(0.25));

        std::fs::write(&path, "{not json").unwrap();
        assert!(Preferences::load(&path).is_err());
    }
}
