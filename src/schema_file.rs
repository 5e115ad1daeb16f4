//! JSON schema files for import and export.
//!
//! ```json
//! { "name": "tasks", "fields": [ { "type": "bool", "name": "done" } ], "version": "1" }
//! ```
//!
//! Unknown keys are ignored. Imports are validated before they are returned, so a
//! file with `min > max` or a dangling pointer is rejected up front.

use std::io;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::node::{Node, Schema};
use crate::{Error, Result};

/// Version string written by [`SchemaFile::new`].
pub const FILE_VERSION: &str = "1";

fn default_version() -> String {
    FILE_VERSION.to_string()
}

/// A schema as stored on disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SchemaFile {
    pub name: String,
    pub fields: Vec<Node>,
    #[serde(default = "default_version")]
    pub version: String,
}

impl SchemaFile {
    pub fn new(name: &str, fields: Vec<Node>) -> Self {
        SchemaFile {
            name: name.to_string(),
            fields,
            version: default_version(),
        }
    }

    /// Reads and validates a schema file.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        let file: SchemaFile = serde_json::from_reader(reader)?;
        file.check()?;
        Ok(file)
    }

    /// Writes the file as pretty-printed JSON.
    pub fn to_writer<W: io::Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn to_string_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn schema(&self) -> Schema {
        Schema::new(&self.name, self.fields.clone())
    }

    pub fn into_schema(self) -> Schema {
        Schema {
            name: self.name,
            fields: self.fields,
        }
    }

    fn check(&self) -> Result<()> {
        let schema = self.schema();
        schema.validate()?;
        schema.resolve_pointers()?;
        tracing::debug!(
            schema = %self.name,
            fields = self.fields.len(),
            version = %self.version,
            "loaded schema file"
        );
        Ok(())
    }
}

impl FromStr for SchemaFile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let file: SchemaFile = serde_json::from_str(s)?;
        file.check()?;
        Ok(file)
    }
}

impl From<Schema> for SchemaFile {
    fn from(schema: Schema) -> Self {
        SchemaFile::new(&schema.name, schema.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TASKS: &str = r#"{
        "name": "tasks",
        "version": "2",
        "author": "ignored",
        "fields": [
            { "type": "bool", "name": "done" },
            { "type": "int", "name": "priority", "min": 1, "max": 5 },
            { "type": "enumArray", "name": "labels", "minLength": 0, "maxLength": 3,
              "enum": { "name": "label", "options": ["bug", "feature"] } }
        ]
    }"#;

    #[test]
    fn test_import_ignores_unknown_keys() {
        let file: SchemaFile = TASKS.parse().unwrap();
        assert_eq!(file.name, "tasks");
        assert_eq!(file.version, "2");
        assert_eq!(file.fields.len(), 3);
        assert_eq!(file.fields[1], Node::int("priority", 1, 5).unwrap());
    }

    #[test]
    fn test_missing_version_gets_default() {
        let file: SchemaFile = r#"{"name": "s", "fields": []}"#.parse().unwrap();
        assert_eq!(file.version, FILE_VERSION);
    }

    #[test]
    fn test_export_then_import() {
        let file: SchemaFile = TASKS.parse().unwrap();
        let mut out = Vec::new();
        file.to_writer(&mut out).unwrap();
        let back = SchemaFile::from_reader(out.as_slice()).unwrap();
        assert_eq!(back, file);
        assert!(file.to_string_pretty().unwrap().contains("\"enumArray\""));
    }

    #[test]
    fn test_invalid_attributes_are_rejected() {
        let text = r#"{"name": "s", "fields": [{"type": "int", "name": "n", "min": 5, "max": 1}]}"#;
        assert!(matches!(
            text.parse::<SchemaFile>(),
            Err(Error::Construction { .. })
        ));
    }

    #[test]
    fn test_dangling_pointer_is_rejected() {
        let text = r#"{"name": "s", "fields": [{"type": "pointer", "name": "p", "targetName": "x"}]}"#;
        assert_eq!(
            text.parse::<SchemaFile>().unwrap_err(),
            Error::unresolved_pointer("p", "x")
        );
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            "{".parse::<SchemaFile>(),
            Err(Error::Json(_))
        ));
    }
}
