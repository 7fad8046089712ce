use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_NUMBER_OF_PROBLEMS: usize = 1000;

/// Settings for one analysis pass.
///
/// Field names follow the editor setting names (`maxNumberOfProblems`), so the
/// same value deserializes from client JSON and from a TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisConfig {
    pub max_number_of_problems: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            max_number_of_problems: DEFAULT_MAX_NUMBER_OF_PROBLEMS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: AnalysisConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.max_number_of_problems, 1000);
    }

    #[test]
    fn reads_camel_case_names() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"maxNumberOfProblems": 3, "other": true}"#).unwrap();
        assert_eq!(config.max_number_of_problems, 3);
    }
}
