use crate::{
    capabilities::BinaryArtifact,
    config::{ImageQuality, ImageSize},
    errors::Result,
    guidelines::GuidelineStore,
};
use rig::{
    client::ImageGenerationClient, image_generation::ImageGenerationModel, providers::openai,
};
use serde_json::{Map, Value, json};

pub struct ImageGenerator {
    model: openai::image_generation::ImageGenerationModel,
    model_name: String,
    guidelines: GuidelineStore,
}

impl ImageGenerator {
    pub fn new(client: openai::Client, model_name: &str, guidelines: GuidelineStore) -> Self {
        let model = client.image_generation_model(model_name);
        Self {
            model,
            model_name: model_name.to_string(),
            guidelines,
        }
    }

    pub async fn generate(
        &self,
        prompt: &str,
        size: ImageSize,
        quality: ImageQuality,
    ) -> Result<BinaryArtifact> {
        let (width, height) = size.dimensions();
        let enriched = self.enforced_prompt(prompt, size, quality);

        let response = self
            .model
            .image_generation_request()
            .prompt(&enriched)
            .width(width)
            .height(height)
            .send()
            .await?;

        let mut metadata = Map::new();
        metadata.insert("prompt".to_string(), Value::String(prompt.to_string()));
        metadata.insert("model".to_string(), Value::String(self.model_name.clone()));
        metadata.insert("size".to_string(), json!(size.as_str()));
        metadata.insert("quality".to_string(), json!(quality.as_str()));

        Ok(BinaryArtifact::with_metadata(
            response.image,
            "image/png",
            "png",
            format!(
                "Model: {} | Size: {} | Quality: {}",
                self.model_name, size, quality
            ),
            metadata,
        ))
    }

    /// The guideline documents take priority over the creative request, so
    /// they are embedded verbatim ahead of it.
    fn enforced_prompt(&self, prompt: &str, size: ImageSize, quality: ImageQuality) -> String {
        let policy = self.guidelines.policy();
        let design = self.guidelines.design();

        format!(
            "STRICT COMPLIANCE REQUIRED:\n\
             - Adhere to the policy and design guidelines below.\n\
             - If the primary task conflicts with the guidelines, the guidelines win.\n\
             - Do not include any elements that violate policy constraints.\n\
             \n\
             Policy guidelines:\n\
             ------------------\n\
             {policy}\n\
             \n\
             Design guidelines:\n\
             ------------------\n\
             {design}\n\
             \n\
             Output requirements:\n\
             - Follow all policy constraints and design rules.\n\
             - Target image size: {size}\n\
             - Image quality: {quality}\n\
             \n\
             PRIMARY TASK:\n\
             {prompt}\n\
             \n\
             Ensure the output image conforms to all guidelines above."
        )
    }
}
