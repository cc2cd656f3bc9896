//! System instructions and user turns sent to the model.

use visionary_core::Platform;

pub const LAYOUT_SYSTEM: &str = "You are a world-class UI/UX designer.
- Return the COMPLETE list of elements and the pageStyle.
- For complex structures (tables, lists) you may put full Tailwind HTML in the 'content' field.
- Give every element an absolute position in pixels.
- Prioritize responsiveness and high-end visual aesthetics.";

pub const REFINE_SYSTEM: &str = "You are a component architect.
- Modify the provided component according to the user prompt.
- Do NOT change the id.
- Focus on its tailwindClasses, style properties and content.
- If the prompt asks for different content (more rows, other text), put the HTML or text in 'content'.
- Return ONLY the updated element object.";

pub const TEMPLATE_SYSTEM: &str = "You are a component architect.
- Create a single polished, self-contained UI component.
- Use Tailwind CSS classes for all styling within the HTML content.
- Follow modern, clean design standards.
- Return exactly ONE element object.";

pub const EXPORT_SYSTEM: &str = "You are a master React developer. Return only code.";

pub fn layout_turn(prompt: &str, platform: Platform, current_elements: &str) -> String {
    format!("Current State: {current_elements}\nPlatform: {platform}\nPrompt: {prompt}")
}

pub fn refine_turn(element_json: &str, instruction: &str) -> String {
    format!("Current Element: {element_json}\nRefinement Prompt: {instruction}")
}

pub fn template_turn(description: &str) -> String {
    format!("Create a reusable component for: {description}")
}

pub fn image_turn(prompt: &str) -> String {
    format!("{prompt}. Create a professional, high-end design asset.")
}

pub fn refine_image_turn(instruction: &str) -> String {
    format!("{instruction}. Maintain the core subject but transform it.")
}

pub fn export_turn(elements_json: &str) -> String {
    format!(
        "Convert this UI design into a production React component using Tailwind CSS: \
         {elements_json}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_turn_mentions_platform() {
        let turn = layout_turn("a dashboard", Platform::Mobile, "[]");
        assert!(turn.contains("Platform: mobile"));
        assert!(turn.ends_with("Prompt: a dashboard"));
    }
}
