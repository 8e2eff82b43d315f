//! Group templates and the YAML configuration loader.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_yaml::Value;
use tracing::{debug, info};

use crate::framework::{GroupArgs, RoleType};

const ARGS_KEY: &str = "args";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Group '{group}' has unknown role '{key}'")]
    UnknownRole { group: String, key: String },
    #[error("Group '{group}' binds role '{role}' to a non-string value")]
    InvalidClassName { group: String, role: RoleType },
    #[error("Group '{0}' declares no members")]
    EmptyGroup(String),
}

/// A named, ordered mapping from role type to artifact class name.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTemplate {
    name: String,
    members: BTreeMap<RoleType, String>,
    args: GroupArgs,
}

impl GroupTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: BTreeMap::new(),
            args: GroupArgs::new(),
        }
    }

    /// Builder-style member declaration.
    pub fn with_member(mut self, role: RoleType, class: impl Into<String>) -> Self {
        self.members.insert(role, class.into());
        self
    }

    /// Builder-style default argument.
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.args.insert(key, value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Members in role order.
    pub fn members(&self) -> impl Iterator<Item = (RoleType, &str)> {
        self.members.iter().map(|(role, class)| (*role, class.as_str()))
    }

    pub fn class_for(&self, role: RoleType) -> Option<&str> {
        self.members.get(&role).map(String::as_str)
    }

    pub fn roles(&self) -> Vec<RoleType> {
        self.members.keys().copied().collect()
    }

    /// Default args, merged under the args given at creation.
    pub fn args(&self) -> &GroupArgs {
        &self.args
    }

    fn from_raw(name: String, raw: BTreeMap<String, Value>) -> Result<Self, ConfigError> {
        let mut template = GroupTemplate::new(name);
        for (key, value) in raw {
            if key == ARGS_KEY {
                template.args = serde_yaml::from_value(value)?;
                continue;
            }
            let role: RoleType = key.parse().map_err(|_| ConfigError::UnknownRole {
                group: template.name.clone(),
                key: key.clone(),
            })?;
            let Value::String(class) = value else {
                return Err(ConfigError::InvalidClassName {
                    group: template.name.clone(),
                    role,
                });
            };
            template.members.insert(role, class);
        }
        if template.members.is_empty() {
            return Err(ConfigError::EmptyGroup(template.name));
        }
        Ok(template)
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    groups: BTreeMap<String, BTreeMap<String, Value>>,
}

/// Application configuration: the table of group templates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    groups: BTreeMap<String, GroupTemplate>,
}

impl AppConfig {
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_yaml::from_str(source)?;
        let mut groups = BTreeMap::new();
        for (name, members) in raw.groups {
            let template = GroupTemplate::from_raw(name.clone(), members)?;
            debug!(group = %name, roles = ?template.roles(), "Template loaded");
            groups.insert(name, template);
        }
        info!(count = groups.len(), "Group templates loaded");
        Ok(Self { groups })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&source)
    }

    /// Adds or replaces a template.
    pub fn with_template(mut self, template: GroupTemplate) -> Self {
        self.groups.insert(template.name().to_string(), template);
        self
    }

    pub fn template(&self, name: &str) -> Option<&GroupTemplate> {
        self.groups.get(name)
    }

    pub fn templates(&self) -> impl Iterator<Item = &GroupTemplate> {
        self.groups.values()
    }

    pub fn into_templates(self) -> Vec<GroupTemplate> {
        self.groups.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
groups:
  sample:
    controller: sample
    model: app::SampleModel
    view: SampleView
    args:
      title: "Hello"
      width: 640
  status:
    model: StatusModel
"#;

    #[test]
    fn test_parse_groups_in_role_order() {
        let config = AppConfig::from_yaml_str(YAML).unwrap();
        let sample = config.template("sample").unwrap();

        let members: Vec<_> = sample.members().collect();
        assert_eq!(
            members,
            vec![
                (RoleType::Model, "app::SampleModel"),
                (RoleType::View, "SampleView"),
                (RoleType::Controller, "sample"),
            ]
        );
        assert_eq!(sample.args().get::<String>("title").as_deref(), Some("Hello"));
        assert_eq!(sample.args().get::<u32>("width"), Some(640));

        let status = config.template("status").unwrap();
        assert_eq!(status.roles(), vec![RoleType::Model]);
        assert!(status.args().is_empty());
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let err = AppConfig::from_yaml_str("groups:\n  bad:\n    widget: Foo\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownRole { ref key, .. } if key == "widget"));
    }

    #[test]
    fn test_non_string_class_is_rejected() {
        let err = AppConfig::from_yaml_str("groups:\n  bad:\n    model: 12\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidClassName { role: RoleType::Model, .. }));
    }

    #[test]
    fn test_group_without_members_is_rejected() {
        let err = AppConfig::from_yaml_str("groups:\n  empty:\n    args: {}\n").unwrap_err();
        assert!(matches!(err, ConfigError::EmptyGroup(ref name) if name == "empty"));
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("groups.yaml");
        std::fs::write(&path, YAML).unwrap();

        let config = AppConfig::from_path(&path).unwrap();
        assert_eq!(config.templates().count(), 2);

        let missing = AppConfig::from_path(dir.path().join("missing.yaml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
