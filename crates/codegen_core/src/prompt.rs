use serde::Serialize;

/// Sampling knobs sent with every completion. They are fixed; callers never vary them.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SamplingConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
}

pub const SAMPLING: SamplingConfig = SamplingConfig {
    temperature: 0.5,
    top_p: 0.95,
    top_k: 40,
};

/// Builds the instruction sent to the completion service.
///
/// The prompt is interpolated verbatim; callers trim it beforehand.
pub fn build_instruction(prompt: &str, language: &str) -> String {
    format!(
        "\nYou are an expert code generation assistant.\n\
Your task is to generate a high-quality, functional code snippet based on the user's request.\n\
Programming Language: {language}\n\
User Request: \"{prompt}\"\n\
\n\
Please adhere to the following guidelines:\n\
1.  Provide only the code snippet itself.\n\
2.  Do NOT include any explanatory text, greetings, or sign-offs before or after the code block.\n\
3.  If any brief explanation is absolutely necessary, include it as comments within the code.\n\
4.  Ensure the code is well-formatted and idiomatic for the specified language.\n\
5.  If the request is ambiguous or lacks detail, try to generate a common or best-practice implementation.\n\
6.  If the request is for something that cannot be reasonably expressed in a single snippet (e.g. \"build a whole app\"), provide a core functional part or a starting point.\n\
7.  Do not use markdown code fences (like ```{language} ... ```) around the code. Just output the raw code.\n"
    )
}
