//! Run parameters for a single pipeline run.
//!
//! Parameters are an open mapping: any key produced by the decision step is
//! carried through and echoed into manifests, but the keys in [`REQUIRED`] must
//! be present because callback tasks are built from them.

use crate::error::{ActionsError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::Path;

pub const REQUIRED: &[&str] = &[
    "head_repository",
    "head_rev",
    "head_ref",
    "level",
    "owner",
    "project",
    "pushlog_id",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, Value>", into = "BTreeMap<String, Value>")]
pub struct Parameters {
    values: BTreeMap<String, Value>,
}

impl Parameters {
    /// Build parameters from a mapping, rejecting it if a required key is absent.
    pub fn new(values: BTreeMap<String, Value>) -> Result<Self> {
        if let Some(missing) = REQUIRED.iter().find(|k| !values.contains_key(**k)) {
            return Err(ActionsError::MissingParameter((*missing).to_string()));
        }
        Ok(Self { values })
    }

    pub fn from_json_map(map: Map<String, Value>) -> Result<Self> {
        Self::new(map.into_iter().collect())
    }

    /// Read parameters from a YAML or JSON document.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let values: BTreeMap<String, Value> = serde_yaml::from_str(&data)?;
        Self::new(values)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Render a scalar parameter as text. Numbers are accepted so that `level: 3`
    /// and `level: "3"` behave the same.
    pub fn text(&self, key: &str) -> Result<Cow<'_, str>> {
        match self.values.get(key) {
            None => Err(ActionsError::MissingParameter(key.to_string())),
            Some(Value::String(s)) => Ok(Cow::Borrowed(s)),
            Some(Value::Number(n)) => Ok(Cow::Owned(n.to_string())),
            Some(other) => Err(ActionsError::InvalidParameter {
                key: key.to_string(),
                reason: format!("expected a string or number, got {other}"),
            }),
        }
    }

    pub fn head_repository(&self) -> Result<Cow<'_, str>> {
        self.text("head_repository")
    }

    pub fn head_rev(&self) -> Result<Cow<'_, str>> {
        self.text("head_rev")
    }

    pub fn head_ref(&self) -> Result<Cow<'_, str>> {
        self.text("head_ref")
    }

    pub fn level(&self) -> Result<Cow<'_, str>> {
        self.text("level")
    }

    pub fn owner(&self) -> Result<Cow<'_, str>> {
        self.text("owner")
    }

    pub fn project(&self) -> Result<Cow<'_, str>> {
        self.text("project")
    }

    pub fn pushlog_id(&self) -> Result<Cow<'_, str>> {
        self.text("pushlog_id")
    }
}

impl TryFrom<BTreeMap<String, Value>> for Parameters {
    type Error = ActionsError;

    fn try_from(values: BTreeMap<String, Value>) -> Result<Self> {
        Self::new(values)
    }
}

impl From<Parameters> for BTreeMap<String, Value> {
    fn from(params: Parameters) -> Self {
        params.values
    }
}

impl<'a> IntoIterator for &'a Parameters {
    type Item = (&'a String, &'a Value);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
pub(crate) fn sample() -> Parameters {
    let value = serde_json::json!({
        "head_repository": "https://hg.mozilla.org/mozilla-central",
        "head_rev": "abcdef0123",
        "head_ref": "default",
        "level": "3",
        "owner": "dev@example.com",
        "project": "mozilla-central",
        "pushlog_id": "1234",
    });
    serde_json::from_value(value).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_required_key_is_rejected() {
        let mut map: BTreeMap<String, Value> = sample().into();
        map.remove("pushlog_id");
        let err = Parameters::new(map).unwrap_err();
        assert!(matches!(err, ActionsError::MissingParameter(k) if k == "pushlog_id"));
    }

    #[test]
    fn numeric_level_renders_as_text() {
        let mut map: BTreeMap<String, Value> = sample().into();
        map.insert("level".into(), serde_json::json!(1));
        let params = Parameters::new(map).unwrap();
        assert_eq!(params.level().unwrap(), "1");
    }

    #[test]
    fn non_scalar_value_is_invalid() {
        let mut map: BTreeMap<String, Value> = sample().into();
        map.insert("owner".into(), serde_json::json!(["a", "b"]));
        let params = Parameters::new(map).unwrap();
        assert!(matches!(
            params.owner().unwrap_err(),
            ActionsError::InvalidParameter { .. }
        ));
    }

    #[test]
    fn extra_keys_are_kept_and_echoed() {
        let mut map: BTreeMap<String, Value> = sample().into();
        map.insert("optimize_target_tasks".into(), Value::Bool(true));
        let params = Parameters::new(map).unwrap();
        let echoed = serde_json::to_value(&params).unwrap();
        assert_eq!(echoed["optimize_target_tasks"], Value::Bool(true));
        assert_eq!(params.iter().count(), REQUIRED.len() + 1);
    }

    #[test]
    fn deserialize_rejects_incomplete_mapping() {
        let result: std::result::Result<Parameters, _> =
            serde_json::from_value(serde_json::json!({ "head_rev": "abc" }));
        assert!(result.is_err());
    }

    #[test]
    fn load_reads_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("parameters.yml");
        std::fs::write(
            &path,
            "head_repository: https://hg.mozilla.org/try\nhead_rev: abc\nhead_ref: abc\n\
             level: 1\nowner: me@example.com\nproject: try\npushlog_id: '7'\n",
        )
        .unwrap();
        let params = Parameters::load(&path).unwrap();
        assert_eq!(params.project().unwrap(), "try");
        assert_eq!(params.pushlog_id().unwrap(), "7");
    }
}
