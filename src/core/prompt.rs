use crate::domain::model::{BirdSighting, CategoryMap};
use crate::utils::error::{ChirpyError, Result};
use indexmap::IndexMap;
use regex::{Captures, Regex};
use serde::Deserialize;
use std::path::Path;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(user_input|category|vocabulary|sighting)\}").expect("placeholder pattern is valid")
});

const INTERPRETATION_TEMPLATE: &str = r#"You are a specialist in interpretation and a bird expert. Your job is to take a bird description and to interpret it and classify it in different categories in our specific wording.

Here is the user input:
<user_input>
{user_input}
</user_input>

{category}
Output your interpretation in the following format:
<bird_sighting>
    <size>[BIRD SIZE]</size>
    <plumage_colour></plumage_colour>
    <pattern></pattern>
    <beak_shape_1></beak_shape_1>
    <beak_colour></beak_colour>
    <leg_colour></leg_colour>
    <habitat></habitat>
    <pattern_markings></pattern_markings>
    <tail_shape_1></tail_shape_1>
    <feet_colour></feet_colour>
</bird_sighting>

the values to fill the XML should exclusively be taken from this JSON:
{vocabulary}

Here are some important rules to follow:
-only output in the XML format and nothing else than the XML
-In the XML dict only include the fields you have data for
-if you have no relavant data for a field do not include it in the XML dict
-if the input is irrelevant to bird identification dont output it in the XML
-if the XML is empty just output an empty XML
This is a very important rule:
-If the input or part of it dont match with any categories nor adjective but is relevant to bird identification add a dict with a new entry tagged as <new_attribute> with your interpretation of this new characteristic

Here are some examples:
user input: it was in my garden and singing super loudly and was quite fast
the output:
<bird_sighting>
    <habitat>garden</habitat>
    <new_attribute>
        <flight_speed>fast</flight_speed>
        <call>loud</call>
    </new_attribute>
</bird_sighting>

user input: A small bird with a bright yellow chest, brown wings, and a short black beak. It has a long tail and sings a cheerful melody. I also like to play tennis.
the output:
<bird_sighting>
    <size>small</size>
    <beak_shape_1>short</beak_shape_1>
    <beak_colour>black</beak_colour>
    <plumage_colour>yellow, brown</plumage_colour>
    <tail_shape_1>long</tail_shape_1>
    <new_attribute>
        <call>cheerful</call>
    </new_attribute>
</bird_sighting>
"#;

const SUMMARY_TEMPLATE: &str = r#"Your task is to transform technical data into a friendly, informative description. Use variety in your descriptions. Use different adjectives to describe key features. Be creative.

Here's the bird data you need to summarize in JSON format:
{sighting}

Please follow these steps to create your summary:
1. Carefully read and parse the JSON data provided.
2. Consider how to make the description engaging and conversational.
3. Create a summary based on your analysis, adhering to these rules:
   - Use the exact words from the JSON values, wrapping them in <> tags.
   - Craft a conversational and varied paragraph structure.
   - Incorporate engaging descriptors and maintain a friendly tone.
   - Ensure the summary flows naturally and is pleasant to read aloud.

Your final output should be a single paragraph without any additional text or explanations.

Example output structure:
This delightful <size> bird boasts a stunning plumage of <color1>, <color2>, and <color3>. Its most striking feature is its <pattern> pattern. You're most likely to spot this feathered friend in <habitat> areas.

Remember, this is just an example structure. Feel free to be creative in your composition while maintaining accuracy and using the provided data.
"#;

/// 以單次掃描替換佔位符，使用者輸入中的 `{...}` 不會被再次展開
fn render(template: &str, values: &[(&str, &str)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let key = &caps[1];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// 組出把使用者描述分類成詞彙表用語的提示詞
///
/// `category_prompt` 是上一輪詢問的類別；有值時會加一句提示，請模型優先考慮該類別。
pub fn interpretation_prompt(
    user_input: &str,
    category_prompt: Option<&str>,
    vocabulary: &Vocabulary,
) -> String {
    let category = match category_prompt.map(str::trim) {
        Some(category) if !category.is_empty() => format!(
            "The user_input is an answer to a question asking description for this category : {}. Consider it strongly in your classification but still make sure it is relevant and matching one of the words",
            category
        ),
        _ => String::new(),
    };
    let vocabulary = vocabulary.render();

    render(
        INTERPRETATION_TEMPLATE,
        &[
            ("user_input", user_input),
            ("category", &category),
            ("vocabulary", &vocabulary),
        ],
    )
}

/// 請模型把目前的特徵寫成一段口語化摘要；new_attribute 不列入
pub fn summary_prompt(sighting: &BirdSighting) -> Result<String> {
    let json = serde_json::to_string_pretty(&sighting.categories)?;
    Ok(render(SUMMARY_TEMPLATE, &[("sighting", &json)]))
}

/// 對話中詢問某個類別時顯示給使用者的問題
pub fn category_question(category: &str) -> String {
    match category {
        "size" => "How big was the bird? Was it extra small, small, medium or large?".to_string(),
        "plumage_colour" => "What colours were its feathers?".to_string(),
        "beak_colour" => "What colour was its beak?".to_string(),
        "feet_colour" => "Did you notice the colour of its feet?".to_string(),
        "leg_colour" => "What colour were its legs?".to_string(),
        "beak_shape_1" => "What did its beak look like? Short, long, curved, hooked...?".to_string(),
        "tail_shape_1" => "How would you describe its tail?".to_string(),
        "pattern_markings" => "Did it have any markings or patterns, like a cap, stripes or speckles?".to_string(),
        "habitat" => "Where did you see it? A garden, woodland, wetland...?".to_string(),
        other => format!("Can you tell me more about its {}?", humanize(other)),
    }
}

fn humanize(category: &str) -> String {
    category
        .trim_end_matches(|c: char| c.is_ascii_digit() || c == '_')
        .replace('_', " ")
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WordList {
    List(Vec<String>),
    Joined(String),
}

impl WordList {
    fn into_words(self) -> Vec<String> {
        match self {
            WordList::List(words) => words
                .into_iter()
                .map(|w| w.trim().to_string())
                .filter(|w| !w.is_empty())
                .collect(),
            WordList::Joined(joined) => joined
                .split(',')
                .map(|w| w.trim().to_string())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }
}

/// 模型只能從這份類別/用語表中挑字
#[derive(Debug, Clone, PartialEq)]
pub struct Vocabulary {
    categories: CategoryMap,
}

impl Vocabulary {
    pub fn new(categories: CategoryMap) -> Self {
        Self { categories }
    }

    /// 從 JSON 檔載入，值可以是字串陣列或以逗號分隔的字串
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: IndexMap<String, WordList> = serde_json::from_str(content)?;
        let categories: CategoryMap = raw
            .into_iter()
            .map(|(category, words)| (category, words.into_words()))
            .collect();

        if categories.is_empty() {
            return Err(ChirpyError::ConfigValidationError {
                field: "vocabulary".to_string(),
                message: "Vocabulary must define at least one category".to_string(),
            });
        }

        Ok(Self { categories })
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn words(&self, category: &str) -> Option<&[String]> {
        self.categories.get(category).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// 以提示詞中使用的格式輸出整份詞彙表
    pub fn render(&self) -> String {
        let lines: Vec<String> = self
            .categories
            .iter()
            .map(|(category, words)| format!("    \"{}\": \"{}\"", category, words.join(", ")))
            .collect();
        format!("[\n{}\n]", lines.join(",\n"))
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        let table: [(&str, &str); 9] = [
            ("size", "medium, extra small, large, small"),
            (
                "plumage_colour",
                "orange, blue, cream/buff, brown, pink, buff, cream, yellow, grey, purple, white, green, pale brown, beige, black, red",
            ),
            ("beak_colour", "orange, yellow, grey, white, brown, black"),
            ("feet_colour", "blue, pink, grey, brown, black, red"),
            ("leg_colour", "pink, grey, brown, black, red"),
            (
                "beak_shape_1",
                "sharp, thick, narrow, short, curved, thin, hooked, long, pointed, stubby",
            ),
            (
                "tail_shape_1",
                "double, thin, fan, fanned in flight, square, long, pointed, forked",
            ),
            (
                "pattern_markings",
                "black, yellow, bright yellow breast, green, white cheeks, black cap, red, black neck collar, blue, red breast, dark brown, sooty black, yellow bill, brown back, white, green gloss to the tail, black plumage, orange breast, darker wings and tail, speckles, green back, yellow eye ring, black stripe, purplish-blue iridescent sheen to the wing feathers",
            ),
            (
                "habitat",
                "grassland, city, hedgerow, heathland, meadow, suburban, wetland, farmland, woodland, town, garden, park, urban, upland",
            ),
        ];

        let categories = table
            .iter()
            .map(|(category, words)| {
                (
                    category.to_string(),
                    words.split(", ").map(str::to_string).collect(),
                )
            })
            .collect();

        Self { categories }
    }
}
