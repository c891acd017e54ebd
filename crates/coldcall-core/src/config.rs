use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Course code; request subjects are `<course>skip` and `<course>switch`.
    #[serde(default = "default_course")]
    pub course: String,
    /// Institutional mail domain. Anything else is spam.
    #[serde(default = "default_domain")]
    pub domain: String,
    /// Lifetime skip allowance per student.
    #[serde(default = "default_skip_limit")]
    pub skip_limit: u32,
    /// Roster csv, relative to the project root.
    #[serde(default = "default_roster")]
    pub roster: PathBuf,
    /// Mailbox directory holding `inbox/` and `processed/`.
    #[serde(default = "default_mailbox")]
    pub mailbox: PathBuf,
    /// Where `call_list_<section>.csv` files are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_course() -> String {
    "econ26".to_string()
}

fn default_domain() -> String {
    "dartmouth.edu".to_string()
}

fn default_skip_limit() -> u32 {
    5
}

fn default_roster() -> PathBuf {
    PathBuf::from("roster.csv")
}

fn default_mailbox() -> PathBuf {
    PathBuf::from("mail")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            course: default_course(),
            domain: default_domain(),
            skip_limit: default_skip_limit(),
            roster: default_roster(),
            mailbox: default_mailbox(),
            output_dir: default_output_dir(),
        }
    }
}

impl Config {
    /// Load `coldcall.yaml`, falling back to defaults when the file is absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn skip_subject(&self) -> String {
        format!("{}skip", self.course_key())
    }

    pub fn switch_subject(&self) -> String {
        format!("{}switch", self.course_key())
    }

    /// Course code in the same normalized form as incoming subjects.
    fn course_key(&self) -> String {
        self.course
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase()
    }

    pub fn roster_path(&self, root: &Path) -> PathBuf {
        root.join(&self.roster)
    }

    pub fn mailbox_path(&self, root: &Path) -> PathBuf {
        root.join(&self.mailbox)
    }

    pub fn output_path(&self, root: &Path) -> PathBuf {
        root.join(&self.output_dir)
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.course.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "course is empty; every request would be unclassifiable".to_string(),
            });
        }
        if self.domain.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "domain is empty; every sender would be treated as spam".to_string(),
            });
        } else if self.domain.starts_with('@') {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "domain '{}' should not start with '@'; it is stripped when matching",
                    self.domain
                ),
            });
        }
        if self.skip_limit == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "skip_limit is 0; every skip request will be denied".to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.skip_limit, 5);
        assert_eq!(cfg.course, "econ26");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("coldcall.yaml"),
            "course: ECON 10\nskip_limit: 3\n",
        )
        .unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.skip_limit, 3);
        assert_eq!(cfg.domain, "dartmouth.edu");
        assert_eq!(cfg.skip_subject(), "econ10skip");
        assert_eq!(cfg.switch_subject(), "econ10switch");
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let cfg = Config {
            domain: "x.edu".to_string(),
            ..Config::default()
        };
        cfg.save(dir.path()).unwrap();
        assert_eq!(Config::load(dir.path()).unwrap(), cfg);
    }

    #[test]
    fn validate_default_config_no_warnings() {
        assert!(Config::default().validate().is_empty());
    }

    #[test]
    fn validate_flags_empty_domain_and_zero_limit() {
        let cfg = Config {
            domain: " ".to_string(),
            skip_limit: 0,
            ..Config::default()
        };
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().any(|w| w.level == WarnLevel::Error));
    }

    #[test]
    fn validate_flags_leading_at() {
        let cfg = Config {
            domain: "@x.edu".to_string(),
            ..Config::default()
        };
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Warning);
    }
}
