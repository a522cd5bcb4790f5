//! Routing agent: the analysis stage that turns a free-form request into a
//! routing decision.
//!
//! The agent owns three decisions: which content type the request is asking
//! for, which model from the catalog should produce it, and what prompt is
//! actually sent to generation. Its output is an [`AgentAnalysis`] that the
//! lifecycle controller persists exactly once per task; the agent itself
//! holds no task state and performs no I/O.

use thiserror::Error;

use atelier_core::{AgentAnalysis, ContentType, ModelInfo};

/// Routing failure: the request was understood but cannot be served.
#[derive(Debug, Clone, Error)]
pub enum RoutingError {
    /// The catalog has no available model for the requested content type.
    /// The task this request created transitions straight to `FAILED`.
    #[error("no available model for content type {content_type}")]
    NoModelAvailable { content_type: ContentType },
}

/// Intent classification, model selection, and prompt optimization.
#[derive(Debug, Clone)]
pub struct RoutingAgent {
    catalog: Vec<ModelInfo>,
}

impl Default for RoutingAgent {
    fn default() -> Self {
        Self::new(default_catalog())
    }
}

impl RoutingAgent {
    pub fn new(catalog: Vec<ModelInfo>) -> Self {
        Self { catalog }
    }

    /// The full model catalog, including currently unavailable entries.
    pub fn models(&self) -> &[ModelInfo] {
        &self.catalog
    }

    /// Analyze a request and produce the routing decision.
    ///
    /// Deterministic keyword classification: a prompt mentioning motion or
    /// footage routes to video, one mentioning sound routes to audio,
    /// everything else is an image request. `has_reference` distinguishes
    /// the `image_to_*` intent scenes from the `text_to_*` ones.
    pub fn analyze(
        &self,
        prompt: &str,
        has_reference: bool,
    ) -> Result<AgentAnalysis, RoutingError> {
        let content_type = classify(prompt);
        let intent = intent_scene(content_type, has_reference);

        let model = self
            .catalog
            .iter()
            .find(|m| m.content_type == content_type && m.available)
            .ok_or(RoutingError::NoModelAvailable { content_type })?;

        Ok(AgentAnalysis {
            intent: intent.to_owned(),
            content_type,
            selected_model: model.id.clone(),
            optimized_prompt: enhance(prompt, content_type),
        })
    }

    /// Rough completion estimate shown to the client at creation time.
    pub fn estimate_seconds(content_type: ContentType) -> u32 {
        match content_type {
            ContentType::Image => 30,
            ContentType::Video => 120,
            ContentType::Audio => 60,
        }
    }
}

const VIDEO_KEYWORDS: &[&str] = &[
    "video", "animate", "animation", "motion", "footage", "clip", "视频", "动画", "动起来",
];

const AUDIO_KEYWORDS: &[&str] = &[
    "audio", "music", "song", "melody", "soundtrack", "voice", "speech", "音乐", "音频", "歌曲",
    "配乐",
];

fn classify(prompt: &str) -> ContentType {
    let lower = prompt.to_lowercase();
    if VIDEO_KEYWORDS.iter().any(|k| lower.contains(k)) {
        ContentType::Video
    } else if AUDIO_KEYWORDS.iter().any(|k| lower.contains(k)) {
        ContentType::Audio
    } else {
        ContentType::Image
    }
}

fn intent_scene(content_type: ContentType, has_reference: bool) -> &'static str {
    match (content_type, has_reference) {
        (ContentType::Image, false) => "text_to_image",
        (ContentType::Image, true) => "image_to_image",
        (ContentType::Video, false) => "text_to_video",
        (ContentType::Video, true) => "image_to_video",
        (ContentType::Audio, _) => "text_to_audio",
    }
}

/// Append a content-type-specific quality suffix to the trimmed prompt.
fn enhance(prompt: &str, content_type: ContentType) -> String {
    let prompt = prompt.trim();
    let suffix = match content_type {
        ContentType::Image => "highly detailed, professional quality",
        ContentType::Video => "smooth motion, cinematic lighting",
        ContentType::Audio => "studio quality, clear mix",
    };
    format!("{prompt}, {suffix}")
}

/// The built-in model catalog. Audio is wired through the routing stage but
/// has no generation backend yet, so its entry is marked unavailable.
pub fn default_catalog() -> Vec<ModelInfo> {
    vec![
        ModelInfo {
            id: "nano-banana".into(),
            name: "Nano Banana".into(),
            description: "High-quality image generation with broad style support".into(),
            content_type: ContentType::Image,
            provider: "Nano Banana".into(),
            available: true,
        },
        ModelInfo {
            id: "sora-2".into(),
            name: "Sora 2".into(),
            description: "Text-to-video and image-to-video generation".into(),
            content_type: ContentType::Video,
            provider: "OpenAI".into(),
            available: true,
        },
        ModelInfo {
            id: "lyria".into(),
            name: "Lyria".into(),
            description: "Music generation (backend not yet wired up)".into(),
            content_type: ContentType::Audio,
            provider: "Google".into(),
            available: false,
        },
    ]
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn plain_prompt_routes_to_image() {
        let agent = RoutingAgent::default();
        let analysis = agent.analyze("a cat astronaut", false).unwrap();
        assert_eq!(analysis.content_type, ContentType::Image);
        assert_eq!(analysis.intent, "text_to_image");
        assert_eq!(analysis.selected_model, "nano-banana");
        assert!(analysis.optimized_prompt.starts_with("a cat astronaut"));
    }

    #[test]
    fn motion_prompt_routes_to_video() {
        let agent = RoutingAgent::default();
        let analysis = agent
            .analyze("a short video of cherry blossoms falling", false)
            .unwrap();
        assert_eq!(analysis.content_type, ContentType::Video);
        assert_eq!(analysis.intent, "text_to_video");
        assert_eq!(analysis.selected_model, "sora-2");
    }

    #[test]
    fn reference_media_switches_intent_scene() {
        let agent = RoutingAgent::default();
        let analysis = agent.analyze("make this watercolor", true).unwrap();
        assert_eq!(analysis.intent, "image_to_image");
        let analysis = agent.analyze("animate this picture", true).unwrap();
        assert_eq!(analysis.intent, "image_to_video");
    }

    #[test]
    fn audio_routing_is_rejected_without_an_available_model() {
        let agent = RoutingAgent::default();
        let err = agent.analyze("a calm piano music track", false).unwrap_err();
        assert!(matches!(
            err,
            RoutingError::NoModelAvailable {
                content_type: ContentType::Audio
            }
        ));
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(classify("Generate A VIDEO of waves"), ContentType::Video);
        assert_eq!(classify("Epic MUSIC please"), ContentType::Audio);
    }
}
