use serde::Serialize;
use serde_json::{Map, Value};

/// Body of `POST /v1/pages`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CreatePageRequest {
    pub parent: Parent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    pub properties: Map<String, Value>,
    pub children: Vec<Value>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Parent {
    DatabaseId { database_id: String },
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Icon {
    Emoji { emoji: String },
}
