pub const CAPTION_SYSTEM: &str = include_str!("../data/prompts/caption_system.txt");
pub const CAPTION_USER: &str = include_str!("../data/prompts/caption_user.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// Render the user-facing caption instruction for a caption count.
///
/// Kept separate from the network call so the prompt text can be tested
/// without a provider client.
pub fn caption_instruction(number_of_captions: u32) -> String {
    render(
        CAPTION_USER,
        &[("count", &number_of_captions.to_string())],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_single_var() {
        assert_eq!(
            render("Hello {{name}}!", &[("name", "world")]),
            "Hello world!"
        );
    }

    #[test]
    fn test_render_multiple_vars() {
        assert_eq!(
            render("{{a}} and {{b}}", &[("a", "cats"), ("b", "dogs")]),
            "cats and dogs"
        );
    }

    #[test]
    fn test_prompts_are_non_empty() {
        assert!(!CAPTION_SYSTEM.is_empty());
        assert!(!CAPTION_USER.is_empty());
    }

    #[test]
    fn test_caption_user_has_count_placeholder() {
        assert!(CAPTION_USER.contains("{{count}}"));
    }

    #[test]
    fn test_caption_instruction_embeds_count() {
        let instruction = caption_instruction(5);
        assert!(instruction.contains("Generate 5 Bangla captions"));
        assert!(!instruction.contains("{{count}}"));
    }

    #[test]
    fn test_caption_system_demands_json_shape() {
        assert!(CAPTION_SYSTEM.contains("\"captions\""));
    }
}
