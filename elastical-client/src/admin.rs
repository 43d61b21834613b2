//! Index administration: stats, mappings, settings, aliases and analysis.

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::{
    client::Client,
    error::Result,
    request::{Names, QueryParams, RequestOptions},
    response::Payload,
    shape::{self, insert_some},
};

/// Options for [`Client::stats`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsOptions {
    /// Indices to report on. Defaults to all.
    pub index: Names,
    /// Restrict indexing and search stats to these types.
    pub types: Vec<String>,
    /// Stat groups to switch on or off (`docs`, `store`, `indexing`, ...),
    /// and any other query parameters.
    pub params: Map<String, Value>,
}

impl StatsOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to indices.
    pub fn index(mut self, index: impl Into<Names>) -> Self {
        self.index = index.into();
        self
    }

    /// Restrict to types.
    pub fn types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Switch a stat group on or off.
    pub fn metric(mut self, name: impl Into<String>, enabled: bool) -> Self {
        self.params.insert(name.into(), Value::Bool(enabled));
        self
    }

    /// Add a pass-through query parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }
}

/// One step of an alias update.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AliasAction {
    /// Point an alias at an index.
    Add(AliasTarget),
    /// Remove an alias from an index.
    Remove(AliasTarget),
}

/// Target of an [`AliasAction`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AliasTarget {
    /// Index name.
    pub index: String,
    /// Alias name.
    pub alias: String,
    /// Filter applied through the alias.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    /// Routing applied through the alias.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing: Option<String>,
}

impl AliasAction {
    /// Add `alias` to `index`.
    pub fn add(index: impl Into<String>, alias: impl Into<String>) -> Self {
        AliasAction::Add(AliasTarget::new(index, alias))
    }

    /// Remove `alias` from `index`.
    pub fn remove(index: impl Into<String>, alias: impl Into<String>) -> Self {
        AliasAction::Remove(AliasTarget::new(index, alias))
    }

    /// Attach a filter.
    pub fn filter(mut self, filter: Value) -> Self {
        self.target_mut().filter = Some(filter);
        self
    }

    /// Attach a routing value.
    pub fn routing(mut self, routing: impl Into<String>) -> Self {
        self.target_mut().routing = Some(routing.into());
        self
    }

    fn target_mut(&mut self) -> &mut AliasTarget {
        match self {
            AliasAction::Add(target) | AliasAction::Remove(target) => target,
        }
    }
}

impl AliasTarget {
    fn new(index: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            alias: alias.into(),
            filter: None,
            routing: None,
        }
    }
}

/// Options for [`Client::analyze`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyzeOptions {
    /// Use this index's analyzers.
    pub index: Option<String>,
    /// Analyzer name.
    pub analyzer: Option<String>,
    /// Tokenizer name.
    pub tokenizer: Option<String>,
    /// Token filters.
    pub filters: Vec<String>,
    /// Use the analyzer mapped for this field.
    pub field: Option<String>,
    /// Response format (`detailed`, `text`).
    pub format: Option<String>,
    /// Extra query parameters, passed through unchanged.
    pub params: Map<String, Value>,
}

impl AnalyzeOptions {
    /// Default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an index's analyzers.
    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Set the analyzer.
    pub fn analyzer(mut self, analyzer: impl Into<String>) -> Self {
        self.analyzer = Some(analyzer.into());
        self
    }

    /// Set the tokenizer.
    pub fn tokenizer(mut self, tokenizer: impl Into<String>) -> Self {
        self.tokenizer = Some(tokenizer.into());
        self
    }

    /// Set token filters.
    pub fn filters<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters = filters.into_iter().map(Into::into).collect();
        self
    }

    /// Use a field's analyzer.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Set the response format.
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Add a pass-through query parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }
}

impl Client {
    /// Index statistics.
    pub async fn stats(&self, options: StatsOptions) -> Result<Payload> {
        let mut path = String::new();
        if !options.index.is_empty() {
            path.push('/');
            path.push_str(&options.index.segment());
        }
        path.push_str("/_stats");

        let mut query = QueryParams::new();
        if !options.types.is_empty() {
            query.push("types", options.types.join(","));
        }
        query.extend_map(&options.params);

        self.request(&query.append_to(path), RequestOptions::get())
            .await
    }

    /// Mappings for indices (all when empty), optionally narrowed to a type.
    pub async fn get_mapping(
        &self,
        names: impl Into<Names>,
        doc_type: Option<&str>,
    ) -> Result<Payload> {
        let mut path = format!("/{}", names.into().segment_or("_all"));
        if let Some(doc_type) = doc_type {
            path.push('/');
            path.push_str(&shape::encode(doc_type));
        }
        path.push_str("/_mapping");
        self.request(&path, RequestOptions::get()).await
    }

    /// Put a type mapping on indices (all when empty).
    pub async fn put_mapping(
        &self,
        names: impl Into<Names>,
        doc_type: &str,
        mapping: Value,
    ) -> Result<Payload> {
        let path = format!(
            "/{}/{}/_mapping",
            names.into().segment_or("_all"),
            shape::encode(doc_type)
        );
        self.request(&path, RequestOptions::put().json(mapping))
            .await
    }

    /// Settings for indices (all when empty).
    pub async fn get_settings(&self, names: impl Into<Names>) -> Result<Payload> {
        let path = format!("/{}/_settings", names.into().segment_or("_all"));
        self.request(&path, RequestOptions::get()).await
    }

    /// Update settings on indices (all when empty).
    pub async fn update_settings(&self, names: impl Into<Names>, settings: Value) -> Result<Payload> {
        let path = format!("/{}/_settings", names.into().segment_or("_all"));
        self.request(&path, RequestOptions::put().json(settings))
            .await
    }

    /// Apply alias actions atomically.
    pub async fn apply_aliases_actions(&self, actions: &[AliasAction]) -> Result<Payload> {
        let body = json!({ "actions": serde_json::to_value(actions)? });
        self.request("/_aliases", RequestOptions::post().json(body))
            .await
    }

    /// Aliases for indices, or for every index when empty.
    pub async fn get_aliases(&self, names: impl Into<Names>) -> Result<Payload> {
        let names = names.into();
        let path = if names.is_empty() {
            "/_aliases".to_string()
        } else {
            format!("/{}/_aliases", names.segment())
        };
        self.request(&path, RequestOptions::get()).await
    }

    /// Run text through an analyzer and return its tokens.
    pub async fn analyze(&self, text: &str, options: AnalyzeOptions) -> Result<Payload> {
        let mut path = String::new();
        if let Some(index) = &options.index {
            path.push('/');
            path.push_str(&shape::encode(index));
        }
        path.push_str("/_analyze");

        let mut bag = Map::new();
        bag.insert("text".to_string(), Value::String(text.to_string()));
        insert_some(&mut bag, "analyzer", options.analyzer.clone());
        insert_some(&mut bag, "tokenizer", options.tokenizer.clone());
        if !options.filters.is_empty() {
            bag.insert("filters".to_string(), json!(options.filters));
        }
        insert_some(&mut bag, "field", options.field.clone());
        insert_some(&mut bag, "format", options.format.clone());

        let mut query = QueryParams::new();
        query.extend_map(&shape::merge(&[&bag, &options.params]));

        self.request(&query.append_to(path), RequestOptions::get())
            .await
    }
}
