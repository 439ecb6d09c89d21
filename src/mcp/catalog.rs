//! Tool catalog
//!
//! The fixed set of tools the server advertises, and the typed argument
//! records each tool's input is validated into. Input schemas are generated
//! from those same records, so what `tools/list` advertises is what
//! `tools/call` enforces.

use std::collections::HashMap;

use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use validator::Validate;

use crate::error::{CatalogError, ValidationError};
use crate::mcp::types::Tool;

/// Tool names
pub mod names {
    pub const SEARCH: &str = "wikipedia_search";
    pub const SUMMARY: &str = "wikipedia_summary";
    pub const CONTENT: &str = "wikipedia_content";
    pub const PAGE_INFO: &str = "wikipedia_page_info";
}

/// Which handler a catalog entry routes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Search,
    Summary,
    Content,
    PageInfo,
}

impl ToolKind {
    /// Validate raw arguments into this tool's typed request
    pub fn parse(self, arguments: Value) -> Result<ToolRequest, ValidationError> {
        Ok(match self {
            ToolKind::Search => ToolRequest::Search(parse_args(arguments)?),
            ToolKind::Summary => ToolRequest::Summary(parse_args(arguments)?),
            ToolKind::Content => ToolRequest::Content(parse_args(arguments)?),
            ToolKind::PageInfo => ToolRequest::PageInfo(parse_args(arguments)?),
        })
    }
}

/// A validated call, ready for the upstream adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolRequest {
    Search(SearchArgs),
    Summary(SummaryArgs),
    Content(TitleArgs),
    PageInfo(TitleArgs),
}

/// Arguments of `wikipedia_search`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct SearchArgs {
    /// Search query for Wikipedia articles
    #[validate(custom = "not_blank")]
    pub query: String,

    /// Number of search results to return (default: 5)
    #[serde(default = "default_results", deserialize_with = "count")]
    #[schemars(with = "u32")]
    #[validate(range(min = 1, max = 500))]
    pub results: u32,
}

/// Arguments of `wikipedia_summary`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct SummaryArgs {
    /// Title of the Wikipedia article
    #[validate(custom = "not_blank")]
    pub title: String,

    /// Number of sentences in summary (default: 3)
    #[serde(default = "default_sentences", deserialize_with = "count")]
    #[schemars(with = "u32")]
    #[validate(range(min = 1, max = 10))]
    pub sentences: u32,
}

/// Arguments of the title-only tools
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct TitleArgs {
    /// Title of the Wikipedia article
    #[validate(custom = "not_blank")]
    pub title: String,
}

fn default_results() -> u32 {
    5
}

fn default_sentences() -> u32 {
    3
}

fn not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

/// Accept counts sent as integers, integral floats or numeric strings
fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Int(u64),
        Float(f64),
        Text(String),
    }

    match Count::deserialize(deserializer)? {
        Count::Int(n) => u32::try_from(n).map_err(|_| de::Error::custom("count out of range")),
        Count::Float(f) if f.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&f) => Ok(f as u32),
        Count::Float(f) => Err(de::Error::custom(format!("expected a whole number, got {}", f))),
        Count::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("expected a whole number, got \"{}\"", s))),
    }
}

/// Deserialize and validate one tool's arguments
pub fn parse_args<T>(arguments: Value) -> Result<T, ValidationError>
where
    T: DeserializeOwned + Validate,
{
    let arguments = match arguments {
        Value::Null => Value::Object(Map::new()),
        Value::Object(map) => Value::Object(map),
        other => {
            return Err(ValidationError::Malformed {
                message: format!("arguments must be an object, got {}", json_type(&other)),
            })
        }
    };

    let args: T = serde_json::from_value(arguments).map_err(|e| classify_serde_error(&e))?;
    args.validate().map_err(from_validation_errors)?;
    Ok(args)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Map serde's messages onto the validation taxonomy
fn classify_serde_error(err: &serde_json::Error) -> ValidationError {
    let message = err.to_string();

    let quoted = || {
        message
            .split('`')
            .nth(1)
            .map(str::to_string)
            .unwrap_or_default()
    };

    if message.starts_with("missing field") {
        ValidationError::MissingField { field: quoted() }
    } else if message.starts_with("unknown field") {
        ValidationError::UnknownField { field: quoted() }
    } else {
        ValidationError::Malformed { message }
    }
}

fn from_validation_errors(errors: validator::ValidationErrors) -> ValidationError {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(name, _)| *name);

    let Some((name, errs)) = fields.into_iter().next() else {
        return ValidationError::Malformed {
            message: errors.to_string(),
        };
    };

    let message = match errs.first() {
        Some(err) if err.code == "range" => {
            let bound = |key: &str| {
                err.params
                    .get(key)
                    .and_then(Value::as_f64)
                    .map(|bound| bound.to_string())
                    .unwrap_or_else(|| "?".to_string())
            };
            format!("must be between {} and {}", bound("min"), bound("max"))
        }
        Some(err) if err.code == "blank" => "must not be blank".to_string(),
        Some(err) => format!("failed {} check", err.code),
        None => "is invalid".to_string(),
    };

    ValidationError::InvalidParameter {
        name: name.to_string(),
        message,
    }
}

/// JSON Schema for an argument record, without the root title/description
fn input_schema<T: JsonSchema>() -> Value {
    let settings = SchemaSettings::draft07().with(|s| {
        s.inline_subschemas = true;
        s.meta_schema = None;
    });
    let schema = settings.into_generator().into_root_schema_for::<T>();

    let mut value = serde_json::to_value(schema).unwrap_or_else(|_| json!({"type": "object"}));
    if let Some(root) = value.as_object_mut() {
        root.remove("title");
        root.remove("description");
    }
    value
}

/// One advertised tool
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub kind: ToolKind,
}

impl ToolDefinition {
    pub fn new(
        kind: ToolKind,
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            kind,
        }
    }

    /// Wire shape for `tools/list`
    pub fn to_tool(&self) -> Tool {
        Tool {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema.clone(),
        }
    }
}

/// Immutable, ordered set of tools with unique names
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    tools: Vec<ToolDefinition>,
    index: HashMap<String, usize>,
}

impl ToolCatalog {
    /// Build a catalog, rejecting duplicate names
    pub fn new(tools: Vec<ToolDefinition>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(tools.len());
        for (position, tool) in tools.iter().enumerate() {
            if index.insert(tool.name.clone(), position).is_some() {
                return Err(CatalogError::DuplicateTool {
                    name: tool.name.clone(),
                });
            }
        }

        Ok(Self { tools, index })
    }

    /// The Wikipedia tools, in the order they are advertised
    pub fn wikipedia() -> Result<Self, CatalogError> {
        Self::new(vec![
            ToolDefinition::new(
                ToolKind::Search,
                names::SEARCH,
                "Search Wikipedia articles by query",
                input_schema::<SearchArgs>(),
            ),
            ToolDefinition::new(
                ToolKind::Summary,
                names::SUMMARY,
                "Get summary of a Wikipedia article",
                input_schema::<SummaryArgs>(),
            ),
            ToolDefinition::new(
                ToolKind::Content,
                names::CONTENT,
                "Get full content of a Wikipedia article",
                input_schema::<TitleArgs>(),
            ),
            ToolDefinition::new(
                ToolKind::PageInfo,
                names::PAGE_INFO,
                "Get detailed information about a Wikipedia page",
                input_schema::<TitleArgs>(),
            ),
        ])
    }

    /// All tools in declaration order
    pub fn list(&self) -> &[ToolDefinition] {
        &self.tools
    }

    pub fn find(&self, name: &str) -> Option<&ToolDefinition> {
        self.index.get(name).map(|&position| &self.tools[position])
    }

    /// Wire shapes for `tools/list`
    pub fn tools(&self) -> Vec<Tool> {
        self.tools.iter().map(ToolDefinition::to_tool).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ToolCatalog {
        ToolCatalog::wikipedia().unwrap()
    }

    #[test]
    fn test_catalog_order() {
        let names: Vec<_> = catalog().list().iter().map(|t| t.name.clone()).collect();
        assert_eq!(
            names,
            vec![
                "wikipedia_search",
                "wikipedia_summary",
                "wikipedia_content",
                "wikipedia_page_info"
            ]
        );
    }

    #[test]
    fn test_find() {
        let catalog = catalog();
        assert_eq!(catalog.find("wikipedia_summary").unwrap().kind, ToolKind::Summary);
        assert!(catalog.find("wikipedia_edit").is_none());
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let tool = ToolDefinition::new(ToolKind::Search, "dup", "first", json!({}));
        let err = ToolCatalog::new(vec![tool.clone(), tool]).unwrap_err();
        assert_eq!(err, CatalogError::DuplicateTool { name: "dup".to_string() });
    }

    #[test]
    fn test_search_schema() {
        let catalog = catalog();
        let schema = &catalog.find("wikipedia_search").unwrap().input_schema;
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["query"]));
        assert_eq!(schema["properties"]["query"]["type"], "string");
        assert_eq!(schema["properties"]["results"]["default"], 5);
        assert!(schema.get("title").is_none());
    }

    #[test]
    fn test_summary_schema_defaults() {
        let catalog = catalog();
        let schema = &catalog.find("wikipedia_summary").unwrap().input_schema;
        assert_eq!(schema["required"], json!(["title"]));
        assert_eq!(schema["properties"]["sentences"]["default"], 3);
        assert_eq!(schema["properties"]["sentences"]["type"], "integer");
    }

    #[test]
    fn test_defaults_applied() {
        let args: SearchArgs = parse_args(json!({"query": "Rust"})).unwrap();
        assert_eq!(args.results, 5);

        let args: SummaryArgs = parse_args(json!({"title": "Rust"})).unwrap();
        assert_eq!(args.sentences, 3);
    }

    #[test]
    fn test_count_coercion() {
        let args: SearchArgs = parse_args(json!({"query": "Rust", "results": "7"})).unwrap();
        assert_eq!(args.results, 7);

        let args: SearchArgs = parse_args(json!({"query": "Rust", "results": 3.0})).unwrap();
        assert_eq!(args.results, 3);

        let err = parse_args::<SearchArgs>(json!({"query": "Rust", "results": "many"})).unwrap_err();
        assert!(matches!(err, ValidationError::Malformed { .. }));
    }

    #[test]
    fn test_missing_required_field() {
        let err = parse_args::<TitleArgs>(json!({})).unwrap_err();
        assert_eq!(err, ValidationError::MissingField { field: "title".to_string() });

        let err = parse_args::<TitleArgs>(Value::Null).unwrap_err();
        assert_eq!(err, ValidationError::MissingField { field: "title".to_string() });
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = parse_args::<TitleArgs>(json!({"title": "Rust", "lang": "de"})).unwrap_err();
        assert_eq!(err, ValidationError::UnknownField { field: "lang".to_string() });
    }

    #[test]
    fn test_range_and_blank_checks() {
        let err = parse_args::<SearchArgs>(json!({"query": "Rust", "results": 0})).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidParameter {
                name: "results".to_string(),
                message: "must be between 1 and 500".to_string(),
            }
        );

        let err = parse_args::<TitleArgs>(json!({"title": "   "})).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidParameter { name, .. } if name == "title"));
    }

    #[test]
    fn test_non_object_arguments() {
        let err = parse_args::<TitleArgs>(json!(["Rust"])).unwrap_err();
        assert!(matches!(err, ValidationError::Malformed { .. }));
    }

    #[test]
    fn test_kind_parse_routes() {
        let request = ToolKind::PageInfo.parse(json!({"title": "Rust"})).unwrap();
        assert_eq!(
            request,
            ToolRequest::PageInfo(TitleArgs { title: "Rust".to_string() })
        );
    }
}
