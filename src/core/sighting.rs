use crate::domain::model::{BirdSighting, CategoryMap};
use regex::Regex;
use std::sync::LazyLock;

static SIGHTING_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<bird_sighting\s*>(.*?)</bird_sighting\s*>").expect("sighting pattern is valid")
});

static NEW_ATTRIBUTE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<new_attribute\s*>(.*?)</new_attribute\s*>").expect("new_attribute pattern is valid")
});

// 結尾標籤不要求與開頭同名，模型偶爾會寫出 <a>x</b> 或 <a>x<a>
static FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<([A-Za-z_][\w\-]*)\s*>([^<]*)</?[A-Za-z_][\w\-]*\s*>").expect("field pattern is valid")
});

/// 沒有任何資訊時的固定回覆
pub const NO_INFORMATION: &str = "We couldn't manage to get any informations from your input";

const SUMMARY_TEMPLATES: [(&str, &str); 9] = [
    ("plumage_colour", "The bird has a plumage that is described as {}."),
    ("beak_colour", "Its beak is coloured {}."),
    ("feet_colour", "The feet of the bird appear {}."),
    ("leg_colour", "Its legs are {}."),
    ("beak_shape_1", "The beak is shaped {}."),
    ("tail_shape_1", "It has a tail that is {}."),
    ("pattern_markings", "There are visible markings or patterns described as {}."),
    ("size", "The bird is {} in size."),
    ("habitat", "It is commonly found in habitats described as {}."),
];

impl BirdSighting {
    /// 從模型回覆中取出 `<bird_sighting>` 區塊
    ///
    /// 回覆前後夾雜文字、XML 不完整或根本沒有 XML 時，回傳空的結果而不是錯誤。
    pub fn from_xml(text: &str) -> Self {
        let mut sighting = BirdSighting::default();

        let Some(block) = SIGHTING_BLOCK.captures(text).and_then(|caps| caps.get(1)) else {
            tracing::debug!("No <bird_sighting> element found in model output");
            return sighting;
        };
        let mut body = block.as_str().to_string();

        let nested = NEW_ATTRIBUTE_BLOCK
            .captures(&body)
            .map(|caps| parse_fields(&caps[1]));
        if let Some(nested) = nested {
            sighting.new_attribute = nested;
            body = NEW_ATTRIBUTE_BLOCK.replace(&body, "").into_owned();
        }

        for (name, words) in parse_fields(&body) {
            if name == "image" {
                sighting.image = words.into_iter().next();
                continue;
            }
            push_unique(sighting.categories.entry(name).or_default(), words);
        }

        sighting
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.new_attribute.is_empty()
    }

    pub fn describes(&self, category: &str) -> bool {
        self.categories
            .get(category)
            .is_some_and(|words| !words.is_empty())
    }

    /// 依類別取聯集：保留既有順序，新字接在後面，重複的略過
    pub fn merge(&mut self, other: &BirdSighting) {
        merge_maps(&mut self.categories, &other.categories);
        merge_maps(&mut self.new_attribute, &other.new_attribute);
        if other.image.is_some() {
            self.image = other.image.clone();
        }
    }

    /// 以固定句型組成摘要，形容詞用 `<>` 包起來；未知類別略過
    pub fn hard_summary(&self) -> String {
        let mut sentences = Vec::new();

        for (category, words) in &self.categories {
            if words.is_empty() {
                continue;
            }
            if let Some((_, template)) = SUMMARY_TEMPLATES.iter().find(|(name, _)| *name == category.as_str()) {
                let adjectives = words
                    .iter()
                    .map(|w| format!("<{}>", w))
                    .collect::<Vec<_>>()
                    .join(", ");
                sentences.push(template.replacen("{}", &adjectives, 1));
            }
        }

        sentences.join(" ")
    }
}

fn parse_fields(body: &str) -> CategoryMap {
    let mut fields = CategoryMap::new();

    for caps in FIELD.captures_iter(body) {
        let name = normalize_tag(&caps[1]);
        let value = unescape(caps[2].trim());

        // 樣板中的 [BIRD SIZE] 之類佔位字
        if value.starts_with('[') && value.ends_with(']') {
            continue;
        }

        let words: Vec<String> = value
            .split(',')
            .map(|w| w.trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        if words.is_empty() {
            continue;
        }

        push_unique(fields.entry(name).or_default(), words);
    }

    fields
}

/// 模型常寫成美式拼法 plumage_color
fn normalize_tag(tag: &str) -> String {
    let tag = tag.trim().to_lowercase();
    if tag.contains("colour") {
        tag
    } else {
        tag.replace("color", "colour")
    }
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn push_unique(target: &mut Vec<String>, words: Vec<String>) {
    for word in words {
        if !target.contains(&word) {
            target.push(word);
        }
    }
}

fn merge_maps(target: &mut CategoryMap, source: &CategoryMap) {
    for (category, words) in source {
        push_unique(target.entry(category.clone()).or_default(), words.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_parse_sighting_with_new_attribute() {
        let output = r#"<bird_sighting>
    <habitat>garden</habitat>
    <new_attribute>
        <flight_speed>fast<flight_speed>
        <call>loud</call>
    </new_attribute>
</bird_sighting>"#;

        let sighting = BirdSighting::from_xml(output);

        assert_eq!(sighting.categories.len(), 1);
        assert_eq!(sighting.categories["habitat"], words(&["garden"]));
        assert_eq!(sighting.new_attribute["flight_speed"], words(&["fast"]));
        assert_eq!(sighting.new_attribute["call"], words(&["loud"]));
    }

    #[test]
    fn test_parse_splits_and_normalizes() {
        let output = "Here you go:\n<bird_sighting>\n  <size>small</size>\n  <plumage_color>yellow, brown</plumage_color>\n  <beak_shape_1>short</beak_shape>\n  <pattern></pattern>\n</bird_sighting>\nThanks!";

        let sighting = BirdSighting::from_xml(output);

        let keys: Vec<&str> = sighting.categories.keys().map(String::as_str).collect();
        assert_eq!(keys, ["size", "plumage_colour", "beak_shape_1"]);
        assert_eq!(sighting.categories["plumage_colour"], words(&["yellow", "brown"]));
        assert!(sighting.new_attribute.is_empty());
    }

    #[test]
    fn test_parse_malformed_or_empty_output() {
        assert!(BirdSighting::from_xml("I am not sure what bird that is.").is_empty());
        assert!(BirdSighting::from_xml("<bird_sighting></bird_sighting>").is_empty());
        assert!(BirdSighting::from_xml("<bird_sighting><size>small</size>").is_empty());
        assert!(BirdSighting::from_xml("<bird_sighting><size>[BIRD SIZE]</size></bird_sighting>").is_empty());
    }

    #[test]
    fn test_parse_image_reference_and_entities() {
        let output = "<bird_sighting><image>robin.jpg</image><habitat>farmland &amp; meadow</habitat></bird_sighting>";
        let sighting = BirdSighting::from_xml(output);

        assert_eq!(sighting.image.as_deref(), Some("robin.jpg"));
        assert_eq!(sighting.categories["habitat"], words(&["farmland & meadow"]));
    }

    #[test]
    fn test_merge_is_ordered_union() {
        let mut state = BirdSighting::default();
        state.categories.insert("plumage_colour".into(), words(&["red", "brown"]));
        state.new_attribute.insert("call".into(), words(&["loud"]));

        let mut incoming = BirdSighting::default();
        incoming.categories.insert("plumage_colour".into(), words(&["brown", "grey"]));
        incoming.categories.insert("size".into(), words(&["small"]));
        incoming.new_attribute.insert("call".into(), words(&["loud", "sharp"]));

        state.merge(&incoming);

        assert_eq!(state.categories["plumage_colour"], words(&["red", "brown", "grey"]));
        assert_eq!(state.categories["size"], words(&["small"]));
        assert_eq!(state.new_attribute["call"], words(&["loud", "sharp"]));

        let before = state.clone();
        state.merge(&incoming);
        assert_eq!(state, before);
    }

    #[test]
    fn test_hard_summary() {
        let mut sighting = BirdSighting::default();
        sighting.categories.insert("size".into(), words(&["small"]));
        sighting.categories.insert("wing_span".into(), words(&["wide"]));
        sighting.categories.insert("plumage_colour".into(), words(&["orange", "grey"]));

        assert_eq!(
            sighting.hard_summary(),
            "The bird is <small> in size. The bird has a plumage that is described as <orange>, <grey>."
        );
        assert_eq!(BirdSighting::default().hard_summary(), "");
    }

    #[test]
    fn test_describes() {
        let mut sighting = BirdSighting::default();
        sighting.categories.insert("size".into(), words(&["large"]));
        sighting.categories.insert("habitat".into(), vec![]);

        assert!(sighting.describes("size"));
        assert!(!sighting.describes("habitat"));
        assert!(!sighting.describes("beak_colour"));
    }
}
