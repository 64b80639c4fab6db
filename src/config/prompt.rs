use log::info;
use std::fs;

use super::ConfigError;

pub const CONTEXT_PLACEHOLDER: &str = "{context}";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Shanin Hossain's portfolio assistant. \
Answer questions about Shanin's background, projects, publications and skills. \
Use the following pieces of retrieved context to answer the question. \
If you don't know the answer, say that you don't know. \
Use three sentences maximum and keep the answer concise.\n\n{context}";

/// Loads the system prompt from `path`, or the built-in prompt when no path is set.
pub fn load_system_prompt(path: Option<&str>) -> Result<String, ConfigError> {
    let template = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::PromptIo {
                path: path.to_string(),
                source,
            })?;
            info!("Loaded system prompt from: {}", path);
            content
        }
        None => DEFAULT_SYSTEM_PROMPT.to_string(),
    };

    if !template.contains(CONTEXT_PLACEHOLDER) {
        return Err(ConfigError::PromptMissingContext);
    }
    Ok(template)
}

pub fn render_system_prompt(template: &str, context: &str) -> String {
    template.replace(CONTEXT_PLACEHOLDER, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_prompt_has_context_slot() {
        let prompt = load_system_prompt(None).unwrap();
        assert!(prompt.contains(CONTEXT_PLACEHOLDER));
    }

    #[test]
    fn renders_context_into_template() {
        let rendered = render_system_prompt("Facts:\n{context}\nEnd", "a\n\nb");
        assert_eq!(rendered, "Facts:\na\n\nb\nEnd");
    }

    #[test]
    fn file_without_placeholder_is_rejected() {
        let path = std::env::temp_dir().join(format!("prompt-{}.txt", uuid::Uuid::new_v4()));
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "No slot here").unwrap();

        let err = load_system_prompt(path.to_str()).unwrap_err();
        assert!(matches!(err, ConfigError::PromptMissingContext));
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_system_prompt(Some("/nonexistent/prompt.txt")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/prompt.txt"));
    }
}
