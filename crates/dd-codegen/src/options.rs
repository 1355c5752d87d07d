use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorOptions {
    pub indent_char: char,
    pub indent_size: usize,
    pub include_comments: bool,
    /// Banner above dialogs that carry no comments of their own.
    pub section_headers: bool,
    pub uppercase_keywords: bool,
    /// Captured keyword spelling, paren spacing and property spacing win
    /// over the normalized defaults.
    pub preserve_source_style: bool,
    /// Multi-condition `if` headers that fit are kept on one line.
    pub max_line_length: Option<usize>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            indent_char: '\t',
            indent_size: 1,
            include_comments: true,
            section_headers: true,
            uppercase_keywords: false,
            preserve_source_style: true,
            max_line_length: None,
        }
    }
}

impl GeneratorOptions {
    pub fn indent(&self) -> String {
        self.indent_char.to_string().repeat(self.indent_size)
    }

    pub(crate) fn keyword(&self, keyword: &str) -> String {
        if self.uppercase_keywords {
            keyword.to_uppercase()
        } else {
            keyword.to_lowercase()
        }
    }
}

#[cfg(test)]
mod options_tests {
    use super::*;

    #[test]
    fn defaults_use_one_tab() {
        let options = GeneratorOptions::default();
        assert_eq!(options.indent(), "\t");
        assert!(options.include_comments);
        assert!(options.preserve_source_style);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let options: GeneratorOptions =
            serde_json::from_str(r#"{"indentChar":" ","indentSize":4}"#)
                .expect("options should deserialize");
        assert_eq!(options.indent(), "    ");
        assert!(options.section_headers);
        assert_eq!(options.max_line_length, None);
    }
}
