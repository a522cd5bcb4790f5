//! Value types shared between the lifecycle core and its collaborators.
//!
//! Wire forms follow the service's JSON contract: enum values are
//! UPPERCASE strings, field names are camelCase.

use serde::{Deserialize, Serialize};

/// The kind of artifact a task produces.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum ContentType {
    Image,
    Video,
    Audio,
}

/// The routing decision attached to a task, at most once.
///
/// Produced by the analysis engine (a different actor than the one driving
/// progress), persisted verbatim and never re-computed. Equality over the
/// whole value is what makes idempotent re-attachment checkable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AgentAnalysis {
    /// Intent scene label, e.g. `text_to_image` or `image_to_video`.
    pub intent: String,
    /// Content type the request was routed to.
    pub content_type: ContentType,
    /// Identifier of the model chosen for generation.
    pub selected_model: String,
    /// The prompt actually sent to generation.
    pub optimized_prompt: String,
}

/// The finished outcome of a completed task.
///
/// `asset_id` references a durable asset record that is guaranteed to exist
/// before any reader can observe the task as completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub asset_id: String,
    pub content_type: ContentType,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub prompt: String,
    pub model: String,
    /// Opaque extension data, e.g. `width`/`height` for images or
    /// `duration` for video and audio.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "utoipa", schema(value_type = Option<Object>))]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Raw output handed to the result materializer by a generation provider.
///
/// Identical to [`GenerationResult`] minus the `asset_id`, which only exists
/// once the asset row has been persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutput {
    pub content_type: ContentType,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub prompt: String,
    pub model: String,
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl GenerationOutput {
    /// Bind this output to a persisted asset, producing the final result.
    pub fn into_result(self, asset_id: impl Into<String>) -> GenerationResult {
        GenerationResult {
            asset_id: asset_id.into(),
            content_type: self.content_type,
            url: self.url,
            thumbnail_url: self.thumbnail_url,
            prompt: self.prompt,
            model: self.model,
            metadata: self.metadata,
        }
    }
}

/// Catalog entry for a generation model the router may select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub content_type: ContentType,
    pub provider: String,
    pub available: bool,
}
