//! Prompt construction for the text-generation and synthesis calls.
//!
//! Each category has its own instruction template sent to the
//! text-generation service. The generated description is then decorated
//! with the trigger-word prefix before being handed to image synthesis.

use crate::category::ProductCategory;

/// Trigger word baked into every trained model and synthesis prompt.
pub const TRIGGER_WORD: &str = "TOK";

/// System prompt for every text-generation call.
pub const SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Inputs for rendering the category instruction template.
#[derive(Debug, Clone, Default)]
pub struct PromptInputs {
    /// Base product description supplied by the client.
    pub base_prompt: Option<String>,
    /// Caller-chosen scene/location override.
    pub custom_prompt: Option<String>,
    /// Free-form extra details appended to the instruction.
    pub extra_detail: Option<String>,
}

/// Render the instruction message sent to the text-generation service.
pub fn render_instruction(category: ProductCategory, inputs: &PromptInputs) -> String {
    let base = inputs.base_prompt.as_deref().unwrap_or("");
    let custom = inputs.custom_prompt.as_deref().unwrap_or("");
    let extra = inputs.extra_detail.as_deref().unwrap_or("");

    match category {
        ProductCategory::OnModel => {
            let mut message = format!(
                "I would like you to write an English prompt in a style that provides a very \
                 detailed and well-explained description of this product. Please write the prompt \
                 as if you are describing this item on a real model. Aim for a prompt around 500 \
                 words. Include all details regarding the model and setting in the prompt as well. \
                 Describe every detail of this image thoroughly, presenting it as if it were being \
                 worn by a real model in a professional fashion photoshoot. Ensure the prompt \
                 captures the aesthetic, elegance, and visual appeal suitable for a model photo. \
                 Adjust the camera perspective according to the product. All details: {base}"
            );
            if !custom.is_empty() {
                message.push_str(&format!("\nCustom Location: {custom}"));
            }
            if !extra.is_empty() {
                message.push_str(&format!("\nExtra details: {extra}"));
            }
            message
        }
        ProductCategory::Photoshoot => {
            // The scene context prefers the custom prompt, falling back to
            // the base description when none was given.
            let context = if !custom.is_empty() { custom } else { base };
            format!(
                "Write a 250-word prompt in English that provides a highly detailed and vivid \
                 description of the item. Imagine a creative photoshoot scene for this product, \
                 focusing on highlighting the item with captivating angles and an atmosphere that \
                 draws the viewer in. Base the scene and all descriptive details on the provided \
                 environment context (for example: {context}). Ensure every aspect of the item is \
                 described meticulously to fully capture its unique appeal and characteristics. \
                 As you describe, bring the environment to life with rich sensory details, \
                 considering the quality of light, shadows, textures, and any relevant background \
                 elements. Paint a clear image of how the product interacts with its surroundings, \
                 whether it is blending into a scene or standing out as the focal point. Use \
                 language that conveys the mood and setting effectively to evoke emotions and \
                 engage the viewer's imagination."
            )
        }
        ProductCategory::Retouch => format!(
            "Write a 250-word prompt. Write a detailed prompt describing the product in the \
             middle of a clean, white background. Focus on capturing texture, material, and \
             stitching details to enhance clarity and realism. Avoid any distractions; the \
             emphasis should solely be on the product's quality and craftsmanship. Additional \
             details: {extra}"
        ),
    }
}

/// Decorate a generated description into the final synthesis prompt.
///
/// Every prompt is prefixed with the trigger word; retouch prompts are
/// additionally anchored to a centered white-background composition.
pub fn decorate_synthesis_prompt(category: ProductCategory, description: &str) -> String {
    let mut prompt = format!("A photo of {TRIGGER_WORD} {description}");
    if category == ProductCategory::Retouch {
        prompt.push_str(" in the middle, white background");
    }
    prompt
}
