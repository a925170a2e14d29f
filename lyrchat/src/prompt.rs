//! System prompt construction for the lyric answering backend
//!
//! The prompt instructs the model to answer with exactly N lines of
//! `歌词--歌手《歌名》` formatted text, with genre and region preferences
//! rendered as human-readable phrases in the target language.

use serde::{Deserialize, Serialize};

/// Prompt language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Zh,
    En,
}

impl Language {
    /// Resolves a language from a BCP 47 style tag ("zh-CN", "en-US", "en").
    /// Unknown tags fall back to Chinese, matching the service default.
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim();
        if tag.len() >= 2 && tag[..2].eq_ignore_ascii_case("en") {
            Language::En
        } else {
            Language::Zh
        }
    }

    /// Resolves the preferred language from an `Accept-Language` header value
    pub fn from_accept_language(header: &str) -> Self {
        let primary = header.split(',').next().unwrap_or("");
        let primary = primary.split(';').next().unwrap_or("").trim();
        if primary.is_empty() {
            Language::Zh
        } else {
            Self::from_tag(primary)
        }
    }
}

/// Genre tag to human-readable phrase, per language
const GENRE_PHRASES: &[(&str, &str, &str)] = &[
    ("pop", "流行音乐", "pop music"),
    ("rock", "摇滚", "rock"),
    ("folk", "民谣", "folk"),
    ("classical", "古典音乐", "classical music"),
    ("rap", "说唱", "rap"),
    ("electronic", "电子音乐", "electronic music"),
    ("jazz", "爵士乐", "jazz"),
    ("country", "乡村音乐", "country music"),
];

/// Region tag to human-readable phrase, per language
const REGION_PHRASES: &[(&str, &str, &str)] = &[
    ("china", "中国大陆", "mainland China"),
    ("hongkong", "香港", "Hong Kong"),
    ("taiwan", "台湾", "Taiwan"),
    ("japan", "日本", "Japan"),
    ("korea", "韩国", "Korea"),
    ("western", "欧美", "the West"),
];

/// Builds the localized system prompt sent to the chat backend
///
/// The builder is stateless: the same arguments always produce the same
/// prompt text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Builds the system prompt.
    ///
    /// * `track_count` - number of lyric lines the model must produce
    ///   (validated to 1..=20 by the caller)
    /// * `language` - prompt language
    /// * `genres` / `regions` - preference tags; known tags are mapped to a
    ///   phrase in the target language, unknown tags pass through verbatim,
    ///   empty sets get a language-appropriate default phrase
    pub fn build(
        &self,
        track_count: usize,
        language: Language,
        genres: &[String],
        regions: &[String],
    ) -> String {
        let genre_phrase = Self::preference_phrase(
            genres,
            GENRE_PHRASES,
            ("偏好流行音乐", "prefer pop music"),
            language,
        );
        let region_phrase = Self::preference_phrase(
            regions,
            REGION_PHRASES,
            ("偏好来自中国的歌手", "prefer artists from China"),
            language,
        );

        match language {
            Language::Zh => format!(
                "你是一个精准的曲库应答器。当用户提出任何问题或陈述时，\
                 你必须且仅能用{n}句最贴切、最符合当下情境的歌词来回应。\n\
                 严格遵循以下规则：\n\
                 1. 只使用{n}句歌词：回应内容必须是完整的{n}句歌词，不多不少，每句占一行。\n\
                 2. 精准贴合语境：所选歌词必须在意义、情绪或主题上，高度契合用户的问题或陈述的核心。\n\
                 3. 曲风偏好：{genres}。\n\
                 4. 地区偏好：{regions}。\n\
                 5. 固定格式：每一行的格式必须且只能是：`歌词--歌手《歌名》`。\n\
                 6. 零额外内容：禁止添加任何解释、问候、评论、表情符号等非歌词内容。\
                 回应只有格式要求的{n}行文字。\n\n\
                 示例（用户输入：感到迷茫怎么办？）：\n\
                 `敢问路在何方？路在脚下。--许镜清《敢问路在何方》`",
                n = track_count,
                genres = genre_phrase,
                regions = region_phrase,
            ),
            Language::En => format!(
                "You are a precise song-lyric answering machine. Whenever the user asks a \
                 question or makes a statement, you must reply with exactly {n} lines of the \
                 most fitting song lyrics, no more and no less.\n\
                 Strictly follow these rules:\n\
                 1. Exactly {n} lyric lines: the reply must consist of {n} complete lyric \
                 lines, one per line.\n\
                 2. Stay on topic: each chosen lyric must closely match the meaning, mood or \
                 theme of the user's input.\n\
                 3. Genre preference: {genres}.\n\
                 4. Region preference: {regions}.\n\
                 5. Fixed format: every line must be exactly `lyric--artist《title》`.\n\
                 6. No extra content: never add explanations, greetings, comments or emoji. \
                 The reply contains only the {n} formatted lines.\n\n\
                 Example (user input: What should I do when I feel lost?):\n\
                 `敢问路在何方？路在脚下。--许镜清《敢问路在何方》`",
                n = track_count,
                genres = genre_phrase,
                regions = region_phrase,
            ),
        }
    }

    fn preference_phrase(
        tags: &[String],
        table: &[(&str, &str, &str)],
        default_phrase: (&str, &str),
        language: Language,
    ) -> String {
        if tags.is_empty() {
            return match language {
                Language::Zh => default_phrase.0.to_string(),
                Language::En => default_phrase.1.to_string(),
            };
        }

        let rendered: Vec<&str> = tags
            .iter()
            .map(|tag| {
                table
                    .iter()
                    .find(|(key, _, _)| key.eq_ignore_ascii_case(tag))
                    .map(|(_, zh, en)| match language {
                        Language::Zh => *zh,
                        Language::En => *en,
                    })
                    .unwrap_or(tag.as_str())
            })
            .collect();

        match language {
            Language::Zh => format!("偏好{}", rendered.join("、")),
            Language::En => format!("prefer {}", rendered.join(", ")),
        }
    }
}
