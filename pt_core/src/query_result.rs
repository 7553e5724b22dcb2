use std::io::Write;

use serde_json::{Map, Value};

use crate::{DisplayMode, QueryError, ResultRecord};

// Printed for missing or null values.
const NONE_MARKER: &str = "None";

impl ResultRecord {
    pub fn from_fields(fields: Map<String, Value>) -> Result<ResultRecord, QueryError> {
        /*!
         * Build a record from one object of the `results` array.
         * Name is the only key that must be present.
         */
        let name = match fields.get("Name") {
            Some(Value::String(name)) => name.to_owned(),
            Some(other) => return Err(QueryError::DataFormat(format!("Name is not a string: {other}"))),
            None => return Err(QueryError::DataFormat("record has no Name".into())),
        };

        return Ok(ResultRecord {
            name,
            description: string_field(&fields, "Description"),
            maintainer: string_field(&fields, "Maintainer"),
            version: string_field(&fields, "Version"),
            popularity: fields.get("Popularity").filter(|x| !x.is_null()).cloned(),
            url_path: string_field(&fields, "URLPath"),
            fields,
        });
    }

    pub fn name(&self) -> &str {
        return &self.name;
    }
    pub fn description(&self) -> Option<&str> {
        return self.description.as_deref();
    }
    pub fn maintainer(&self) -> Option<&str> {
        return self.maintainer.as_deref();
    }
    pub fn version(&self) -> Option<&str> {
        return self.version.as_deref();
    }
    pub fn url_path(&self) -> Option<&str> {
        return self.url_path.as_deref();
    }

    pub fn fields(&self) -> &Map<String, Value> {
        return &self.fields;
    }

    /// Popularity as a number. Missing or non-numeric values are a DataFormat error.
    pub fn popularity_score(&self) -> Result<f64, QueryError> {
        return match &self.popularity {
            Some(Value::Number(num)) => num.as_f64()
                .ok_or_else(|| QueryError::DataFormat(format!("Popularity of '{}' is out of range", self.name))),
            Some(other) => Err(QueryError::DataFormat(format!("Popularity of '{}' is not a number: {other}", self.name))),
            None => Err(QueryError::DataFormat(format!("'{}' has no Popularity", self.name))),
        };
    }

    /// Trailing segment of URLPath, e.g. /cgit/aur.git/snapshot/foo.tar.gz -> foo.tar.gz
    pub fn artifact_filename(&self) -> Option<&str> {
        return self.url_path.as_deref()
            .and_then(|path| path.rsplit('/').next())
            .filter(|name| !name.is_empty());
    }

    pub fn display(&self, mode: DisplayMode) -> String {
        /*!
         * Summary:
         * {Name}
         *     Description: {..}
         *     Maintainer: {..}
         *     Version: {..}
         *     Popularity: {..}
         *
         * FullDetail prints every upstream field except Name, in upstream order.
         */
        let mut lines = vec![self.name.to_owned()];
        match mode {
            DisplayMode::Summary => {
                let summary = [
                    ("Description", self.description.to_owned()),
                    ("Maintainer", self.maintainer.to_owned()),
                    ("Version", self.version.to_owned()),
                    ("Popularity", self.popularity.as_ref().map(render_value)),
                ];
                for (key, value) in summary {
                    lines.push(format!("\t{key}: {}", value.as_deref().unwrap_or(NONE_MARKER)));
                }
            },
            DisplayMode::FullDetail => {
                for (key, value) in self.fields.iter().filter(|(key, _)| key.as_str() != "Name") {
                    lines.push(format!("\t{key}: {}", render_value(value)));
                }
            },
        }
        return lines.join("\n");
    }

    pub fn print_entry(&self, out: &mut dyn Write, mode: DisplayMode) -> std::io::Result<()> {
        return writeln!(out, "{}", self.display(mode));
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    return match fields.get(key) {
        Some(Value::String(val)) => Some(val.to_owned()),
        Some(Value::Number(num)) => Some(num.to_string()),
        _ => None,
    };
}

fn render_value(value: &Value) -> String {
    return match value {
        Value::Null => NONE_MARKER.into(),
        Value::String(val) => val.to_owned(),
        Value::Array(items) => items.iter().map(render_value).collect::<Vec<String>>().join(", "),
        other => other.to_string(),
    };
}
