//! Workflow loader - serialized rule data
//!
//! This module reads and writes collections of workflow records. JSON is
//! the primary form; YAML is accepted for hand-written rule files.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

use crate::engine::error::EngineError;

/// Text format of a rule file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFormat {
    Json,
    Yaml,
}

impl RuleFormat {
    /// Pick the format from a file extension, defaulting to JSON
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                RuleFormat::Yaml
            }
            _ => RuleFormat::Json,
        }
    }
}

/// Loads and saves workflow record collections
pub struct WorkflowLoader;

impl WorkflowLoader {
    pub fn parse<R: DeserializeOwned>(content: &str, format: RuleFormat) -> Result<Vec<R>, EngineError> {
        match format {
            RuleFormat::Json => Self::parse_json(content),
            RuleFormat::Yaml => Self::parse_yaml(content),
        }
    }

    /// Parse records from a JSON array
    pub fn parse_json<R: DeserializeOwned>(content: &str) -> Result<Vec<R>, EngineError> {
        let records: Vec<R> = serde_json::from_str(content)?;
        Ok(records)
    }

    /// Parse records from a YAML sequence
    pub fn parse_yaml<R: DeserializeOwned>(content: &str) -> Result<Vec<R>, EngineError> {
        let records: Vec<R> = serde_yaml::from_str(content)?;
        Ok(records)
    }

    pub fn render<R: Serialize>(records: &[R], format: RuleFormat) -> Result<String, EngineError> {
        match format {
            RuleFormat::Json => Self::to_json(records),
            RuleFormat::Yaml => Self::to_yaml(records),
        }
    }

    /// Render records as pretty-printed JSON
    pub fn to_json<R: Serialize>(records: &[R]) -> Result<String, EngineError> {
        Ok(serde_json::to_string_pretty(records)?)
    }

    pub fn to_yaml<R: Serialize>(records: &[R]) -> Result<String, EngineError> {
        Ok(serde_yaml::to_string(records)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ruleflow::workflow::types::{EligibilityLine, LogicalOperator, WorkflowRecord};
    use serde::Deserialize;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
    enum Property {
        Alpha,
        Beta,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
    enum Check {
        Equals,
        Contains,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
    enum Activity {
        Set,
    }

    type Record = WorkflowRecord<Property, Check, Activity>;

    #[test]
    fn test_format_from_path() {
        assert_eq!(RuleFormat::from_path("rules.yaml"), RuleFormat::Yaml);
        assert_eq!(RuleFormat::from_path("rules.YML"), RuleFormat::Yaml);
        assert_eq!(RuleFormat::from_path("rules.json"), RuleFormat::Json);
        assert_eq!(RuleFormat::from_path("rules"), RuleFormat::Json);
    }

    #[test]
    fn test_parse_json_records() {
        let json = r#"
[
  {
    "name": "Workflow of test",
    "eligibilityLines": [
      { "operator": "AND", "property": "Alpha", "eligibilityKind": "Equals", "compareValue": "Alpha" },
      { "operator": "AND", "group": [
          { "operator": "AND", "property": "Beta", "eligibilityKind": "Contains", "compareValue": "alpha" },
          { "operator": "OR", "property": "Beta", "eligibilityKind": "Equals", "compareValue": "Beta" }
      ] }
    ],
    "activityLines": [
      { "property": "Beta", "activityKind": "Set", "value": "Ceta" }
    ]
  }
]
"#;
        let records: Vec<Record> = WorkflowLoader::parse_json(json).unwrap();
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.name, "Workflow of test");
        assert_eq!(record.eligibility_lines.len(), 2);

        let group = record.eligibility_lines[1].group.as_ref().unwrap();
        assert_eq!(group[1].operator, LogicalOperator::Or);
        assert_eq!(group[1].property, Some(Property::Beta));
        assert_eq!(record.activity_lines[0].kind, Activity::Set);
    }

    #[test]
    fn test_parse_yaml_records() {
        let yaml = r#"
- name: YamlWorkflow
  eligibilityLines:
    - property: Alpha
      eligibilityKind: Contains
      compareValue: lph
    - operator: OR
      property: Beta
      eligibilityKind: Equals
      compareValue: Beta
  activityLines: []
"#;
        let records: Vec<Record> = WorkflowLoader::parse_yaml(yaml).unwrap();
        assert_eq!(records[0].name, "YamlWorkflow");
        assert_eq!(records[0].eligibility_lines[0].operator, LogicalOperator::And);
        assert_eq!(records[0].eligibility_lines[1].operator, LogicalOperator::Or);
        assert!(records[0].activity_lines.is_empty());
    }

    #[test]
    fn test_missing_line_lists_default_to_empty() {
        let records: Vec<Record> = WorkflowLoader::parse_json(r#"[{"name": "bare"}]"#).unwrap();
        assert!(records[0].eligibility_lines.is_empty());
        assert!(records[0].activity_lines.is_empty());
    }

    #[test]
    fn test_json_and_yaml_render_the_same_records() {
        let records = vec![Record {
            name: "render".to_string(),
            eligibility_lines: vec![EligibilityLine::condition(
                LogicalOperator::And,
                Property::Alpha,
                Check::Equals,
                "Alpha",
            )],
            activity_lines: vec![],
        }];

        let json = WorkflowLoader::render(&records, RuleFormat::Json).unwrap();
        assert!(json.contains("\"eligibilityKind\": \"Equals\""));
        let from_json: Vec<Record> = WorkflowLoader::parse(&json, RuleFormat::Json).unwrap();

        let yaml = WorkflowLoader::render(&records, RuleFormat::Yaml).unwrap();
        let from_yaml: Vec<Record> = WorkflowLoader::parse(&yaml, RuleFormat::Yaml).unwrap();

        assert_eq!(from_json, records);
        assert_eq!(from_yaml, records);
    }

    #[test]
    fn test_wrong_shape_returns_error() {
        let result: Result<Vec<Record>, _> =
            WorkflowLoader::parse_json(r#"{"name": "not a list"}"#);
        assert!(matches!(result, Err(EngineError::Json(_))));

        let result: Result<Vec<Record>, _> = WorkflowLoader::parse_json(
            r#"[{"name": "x", "activityLines": [{"property": "Gamma", "activityKind": "Set"}]}]"#,
        );
        assert!(result.is_err());
    }
}
