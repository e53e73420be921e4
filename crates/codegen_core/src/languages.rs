use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LanguageOption {
    pub id: &'static str,
    pub label: &'static str,
}

/// Languages offered by the form. The first entry is the default selection.
pub const SUPPORTED_LANGUAGES: &[LanguageOption] = &[
    LanguageOption { id: "python", label: "Python" },
    LanguageOption { id: "javascript", label: "JavaScript" },
    LanguageOption { id: "typescript", label: "TypeScript" },
    LanguageOption { id: "java", label: "Java" },
    LanguageOption { id: "csharp", label: "C#" },
    LanguageOption { id: "cpp", label: "C++" },
    LanguageOption { id: "go", label: "Go" },
    LanguageOption { id: "rust", label: "Rust" },
    LanguageOption { id: "ruby", label: "Ruby" },
    LanguageOption { id: "php", label: "PHP" },
    LanguageOption { id: "swift", label: "Swift" },
    LanguageOption { id: "kotlin", label: "Kotlin" },
    LanguageOption { id: "sql", label: "SQL" },
    LanguageOption { id: "html", label: "HTML" },
    LanguageOption { id: "css", label: "CSS" },
    LanguageOption { id: "bash", label: "Shell (Bash)" },
];

pub fn default_language() -> &'static LanguageOption {
    &SUPPORTED_LANGUAGES[0]
}

pub fn find_language(id: &str) -> Option<&'static LanguageOption> {
    let id = id.trim();
    SUPPORTED_LANGUAGES
        .iter()
        .find(|option| option.id.eq_ignore_ascii_case(id))
}
