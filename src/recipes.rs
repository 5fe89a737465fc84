//! Mapping between Notion page objects and the recipe app's JSON.
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::config;
use crate::notion::{CreatePageRequest, Icon, Parent};

/// A Notion page did not have the shape the recipes database promises.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("missing or malformed field `{path}`")]
    Missing { path: String },
}

fn missing(path: impl Into<String>) -> ShapeError {
    ShapeError::Missing { path: path.into() }
}

/// One row of the recipes database as returned by the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntrySummary {
    pub id: String,
    pub created_time: String,
    pub name: String,
    pub tags: Vec<TagSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagSummary {
    pub name: String,
    pub color: String,
}

/// Body of `POST /v1/api/recetas`. Blocks are forwarded as-is.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RecipeCreationRequest {
    #[serde(rename = "dbID")]
    pub database_id: String,
    #[serde(rename = "pageName")]
    pub page_name: String,
    pub tag: String,
    pub content: RecipeContent,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RecipeContent {
    pub ingredients: Vec<Value>,
    pub steps: Vec<Value>,
    pub details: Details,
}

/// `details` is either a single block or a list of blocks.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Details {
    Many(Vec<Value>),
    One(Value),
}

impl Details {
    fn into_blocks(self) -> Vec<Value> {
        match self {
            Details::Many(blocks) => blocks,
            Details::One(block) => vec![block],
        }
    }
}

fn string_at<'a>(value: &'a Value, key: &str, path: &str) -> Result<&'a str, ShapeError> {
    value
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| missing(format!("{path}.{key}")))
}

fn summarize_entry(
    entry: &Value,
    index: usize,
    fields: &config::SummaryFields,
) -> Result<EntrySummary, ShapeError> {
    let at = format!("results[{index}]");
    let id = string_at(entry, "id", &at)?;
    let created_time = string_at(entry, "created_time", &at)?;

    let properties = entry
        .get("properties")
        .ok_or_else(|| missing(format!("{at}.properties")))?;

    let title_path = format!("{at}.properties.{}.title[0].plain_text", fields.title);
    let name = properties
        .get(&fields.title)
        .and_then(|p| p.get("title"))
        .and_then(Value::as_array)
        .and_then(|runs| runs.first())
        .and_then(|run| run.get("plain_text"))
        .and_then(Value::as_str)
        .ok_or_else(|| missing(title_path))?;

    let tags_path = format!("{at}.properties.{}.multi_select", fields.tags);
    let options = properties
        .get(&fields.tags)
        .and_then(|p| p.get("multi_select"))
        .and_then(Value::as_array)
        .ok_or_else(|| missing(tags_path.clone()))?;
    let tags = options
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let at = format!("{tags_path}[{i}]");
            Ok(TagSummary {
                name: string_at(option, "name", &at)?.to_string(),
                color: string_at(option, "color", &at)?.to_string(),
            })
        })
        .collect::<Result<Vec<_>, ShapeError>>()?;

    Ok(EntrySummary {
        id: id.replace('-', ""),
        created_time: created_time.to_string(),
        name: name.to_string(),
        tags,
    })
}

/// Turn a database query response into summaries, one per result.
/// Fails on the first entry that lacks a title or tag list.
pub fn summarize_entries(
    response: &Value,
    fields: &config::SummaryFields,
) -> Result<Vec<EntrySummary>, ShapeError> {
    let results = response
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| missing("results"))?;
    results
        .iter()
        .enumerate()
        .map(|(i, entry)| summarize_entry(entry, i, fields))
        .collect()
}

/// A `heading_2` block with a single text run.
pub fn heading(text: &str) -> Value {
    json!({
        "object": "block",
        "type": "heading_2",
        "heading_2": {
            "rich_text": [
                {
                    "type": "text",
                    "text": { "content": text }
                }
            ]
        }
    })
}

/// Build the Notion page for a new recipe: title and tag properties, then
/// each section heading followed by the caller's blocks for that section.
pub fn build_create_page(
    req: RecipeCreationRequest,
    schema: &config::Recipes,
) -> CreatePageRequest {
    let mut properties = Map::new();
    properties.insert(
        schema.create_fields.title.clone(),
        json!({
            "title": [
                {
                    "text": {
                        "content": req.page_name,
                    }
                }
            ]
        }),
    );
    properties.insert(
        schema.create_fields.tags.clone(),
        json!({ "multi_select": [ { "name": req.tag } ] }),
    );

    let RecipeContent {
        ingredients,
        steps,
        details,
    } = req.content;
    let details = details.into_blocks();

    let mut children = Vec::with_capacity(3 + ingredients.len() + steps.len() + details.len());
    children.push(heading(&schema.headings.ingredients));
    children.extend(ingredients);
    children.push(heading(&schema.headings.steps));
    children.extend(steps);
    children.push(heading(&schema.headings.details));
    children.extend(details);

    CreatePageRequest {
        parent: Parent::DatabaseId {
            database_id: req.database_id,
        },
        icon: Some(Icon::Emoji {
            emoji: schema.icon.clone(),
        }),
        properties,
        children,
    }
}
