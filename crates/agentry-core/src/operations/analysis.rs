//! Text, statistics and pattern analysis tools

use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Map, Value};
use std::sync::LazyLock;

use super::{
    array_arg, has_array, has_str, numbers_arg, operation_of, str_arg, OperationError,
    OperationOutcome, OperationResult, OperationTool,
};

const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "excellent", "amazing", "wonderful", "fantastic", "terrific", "outstanding",
    "superb", "brilliant", "awesome", "happy", "love", "best", "perfect", "positive",
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "awful", "horrible", "poor", "disappointing", "mediocre", "subpar", "worst",
    "hate", "dislike", "negative", "failure", "failed", "useless", "waste",
];

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "with", "by", "of", "is",
    "are",
];

static PERSON_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-z]+ [A-Z][a-z]+\b").ok());
static ORGANIZATION_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{2,}\b").ok());
static LOCATION_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\bin ([A-Z][a-z]+)\b").ok());

/// Render a float without a trailing `.0` when it is integral
fn number_text(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn mean(data: &[f64]) -> f64 {
    data.iter().sum::<f64>() / data.len() as f64
}

/// Sample standard deviation; 0 for fewer than two points
fn sample_std_dev(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let m = mean(data);
    let variance = data.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (data.len() - 1) as f64;
    variance.sqrt()
}

// ============================================================================
// Text analysis
// ============================================================================

/// Keyword-count sentiment in [-1, 1]
pub fn analyze_sentiment(text: &str) -> Value {
    let lower = text.to_lowercase();
    let positive = POSITIVE_WORDS.iter().filter(|w| lower.contains(*w)).count() as f64;
    let negative = NEGATIVE_WORDS.iter().filter(|w| lower.contains(*w)).count() as f64;

    let total = positive + negative;
    let score = if total == 0.0 {
        0.0
    } else {
        (positive - negative) / total
    };

    let label = if score > 0.2 {
        "positive"
    } else if score < -0.2 {
        "negative"
    } else {
        "neutral"
    };

    json!({ "score": score, "label": label })
}

/// Regex-based person / organization / location extraction
pub fn extract_entities(text: &str) -> Vec<Value> {
    let mut entities = Vec::new();

    if let Some(re) = PERSON_RE.as_ref() {
        for m in re.find_iter(text) {
            entities.push(json!({"text": m.as_str(), "type": "person", "start": m.start(), "end": m.end()}));
        }
    }
    if let Some(re) = ORGANIZATION_RE.as_ref() {
        for m in re.find_iter(text) {
            entities.push(json!({"text": m.as_str(), "type": "organization", "start": m.start(), "end": m.end()}));
        }
    }
    if let Some(re) = LOCATION_RE.as_ref() {
        for caps in re.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                entities.push(json!({"text": m.as_str(), "type": "location", "start": m.start(), "end": m.end()}));
            }
        }
    }

    entities
}

/// Most frequent non-stopword words longer than three characters
pub fn extract_keywords(text: &str, max_keywords: usize) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for word in lower.split_whitespace() {
        if STOPWORDS.contains(&word) || word.chars().count() <= 3 {
            continue;
        }
        match counts.iter_mut().find(|(w, _)| w == word) {
            Some((_, count)) => *count += 1,
            None => counts.push((word.to_string(), 1)),
        }
    }

    // stable sort keeps first-seen order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(max_keywords)
        .map(|(word, _)| word)
        .collect()
}

pub struct TextAnalysisTool;

#[async_trait]
impl OperationTool for TextAnalysisTool {
    fn name(&self) -> &str {
        "text_analysis_tool"
    }

    fn kind(&self) -> &str {
        "text analysis"
    }

    fn description(&self) -> &str {
        "Analyzes text with operations like sentiment analysis, entity extraction, and keyword extraction. Operations: sentiment, entities, keywords."
    }

    fn operations(&self) -> &'static [&'static str] {
        &["sentiment", "entities", "keywords"]
    }

    fn argument_properties(&self) -> Value {
        json!({
            "text": { "type": "string", "description": "Text to analyze" },
            "max_keywords": { "type": "integer", "description": "Keyword limit (default 5)" }
        })
    }

    fn validate_input(&self, input: &Value) -> bool {
        match operation_of(input) {
            Some("sentiment") | Some("entities") | Some("keywords") => has_str(input, "text"),
            _ => false,
        }
    }

    async fn run(&self, operation: &str, input: &Value) -> OperationOutcome {
        match operation {
            "sentiment" => Ok(OperationResult::ok(analyze_sentiment(str_arg(input, "text")?))),
            "entities" => Ok(OperationResult::ok(extract_entities(str_arg(input, "text")?))),
            "keywords" => {
                let max_keywords = input
                    .get("max_keywords")
                    .and_then(Value::as_u64)
                    .unwrap_or(5) as usize;
                Ok(OperationResult::ok(extract_keywords(
                    str_arg(input, "text")?,
                    max_keywords,
                )))
            }
            other => Err(OperationError::UnknownOperation(other.to_string())),
        }
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Mean, median, mode, sample std-dev, min, max and count
pub fn basic_stats(data: &[f64]) -> Result<Value, OperationError> {
    if data.is_empty() {
        return Err(OperationError::failed("Data list cannot be empty"));
    }

    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    let median = if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };

    let mut frequencies: Vec<(f64, usize)> = Vec::new();
    for &x in data {
        match frequencies.iter_mut().find(|(v, _)| *v == x) {
            Some((_, count)) => *count += 1,
            None => frequencies.push((x, 1)),
        }
    }
    let mut mode = frequencies[0];
    for &(value, count) in &frequencies {
        if count > mode.1 {
            mode = (value, count);
        }
    }

    Ok(json!({
        "mean": mean(data),
        "median": median,
        "mode": mode.0,
        "std_dev": sample_std_dev(data),
        "min": sorted[0],
        "max": sorted[sorted.len() - 1],
        "count": data.len(),
    }))
}

/// Pearson correlation coefficient
pub fn correlation(x: &[f64], y: &[f64]) -> Result<f64, OperationError> {
    if x.len() != y.len() {
        return Err(OperationError::failed("Data series must have the same length"));
    }
    if x.len() < 2 {
        return Err(OperationError::failed("Data series must have at least 2 points"));
    }

    let mx = mean(x);
    let my = mean(y);
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        sxy += (a - mx) * (b - my);
        sxx += (a - mx).powi(2);
        syy += (b - my).powi(2);
    }

    if sxx == 0.0 || syy == 0.0 {
        return Err(OperationError::failed(
            "Error calculating correlation: at least one of the inputs is constant",
        ));
    }
    Ok(sxy / (sxx.sqrt() * syy.sqrt()))
}

pub struct StatisticsTool;

#[async_trait]
impl OperationTool for StatisticsTool {
    fn name(&self) -> &str {
        "statistics_tool"
    }

    fn kind(&self) -> &str {
        "statistics"
    }

    fn description(&self) -> &str {
        "Performs statistical analysis with operations like basic statistics and correlation. Operations: basic_stats, correlation."
    }

    fn operations(&self) -> &'static [&'static str] {
        &["basic_stats", "correlation"]
    }

    fn argument_properties(&self) -> Value {
        json!({
            "data": { "type": "array", "items": { "type": "number" } },
            "x": { "type": "array", "items": { "type": "number" } },
            "y": { "type": "array", "items": { "type": "number" } }
        })
    }

    fn validate_input(&self, input: &Value) -> bool {
        match operation_of(input) {
            Some("basic_stats") => has_array(input, "data"),
            Some("correlation") => has_array(input, "x") && has_array(input, "y"),
            _ => false,
        }
    }

    async fn run(&self, operation: &str, input: &Value) -> OperationOutcome {
        match operation {
            "basic_stats" => Ok(OperationResult::ok(basic_stats(&numbers_arg(input, "data")?)?)),
            "correlation" => {
                let x = numbers_arg(input, "x")?;
                let y = numbers_arg(input, "y")?;
                Ok(OperationResult::ok(json!({ "correlation": correlation(&x, &y)? })))
            }
            other => Err(OperationError::UnknownOperation(other.to_string())),
        }
    }
}

// ============================================================================
// Patterns
// ============================================================================

fn item_key(item: &Value) -> String {
    match item {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Detect repetition, arithmetic sequences and z-score outliers
pub fn find_patterns(data: &[Value]) -> Vec<Value> {
    let mut patterns = Vec::new();
    let len = data.len() as f64;

    if data.len() > 1 {
        let mut repeats: Vec<(String, usize)> = Vec::new();
        for item in data {
            let key = item_key(item);
            match repeats.iter_mut().find(|(k, _)| *k == key) {
                Some((_, count)) => *count += 1,
                None => repeats.push((key, 1)),
            }
        }
        for (item, count) in repeats {
            let ratio = count as f64 / len;
            if count > 1 && ratio > 0.2 {
                patterns.push(json!({
                    "pattern_type": "repetition",
                    "description": format!("Item '{}' repeats {} times", item, count),
                    "confidence": ratio.min(1.0),
                }));
            }
        }
    }

    let numbers: Option<Vec<f64>> = data.iter().map(Value::as_f64).collect();
    let Some(numbers) = numbers else {
        return patterns;
    };

    if numbers.len() > 2 {
        let diffs: Vec<f64> = numbers.windows(2).map(|w| w[1] - w[0]).collect();
        if diffs.iter().all(|d| *d == diffs[0]) {
            patterns.push(json!({
                "pattern_type": "sequence",
                "description": format!("Arithmetic sequence with difference {}", number_text(diffs[0])),
                "confidence": 1.0,
            }));
        }
    }

    if numbers.len() > 4 {
        let m = mean(&numbers);
        let std_dev = sample_std_dev(&numbers);
        if std_dev > 0.0 {
            for (i, value) in numbers.iter().enumerate() {
                let z = (value - m).abs() / std_dev;
                if z > 2.0 {
                    patterns.push(json!({
                        "pattern_type": "outlier",
                        "description": format!("Outlier at position {}: value {}", i, item_key(&data[i])),
                        "confidence": (z / 3.0).min(1.0),
                    }));
                }
            }
        }
    }

    patterns
}

/// All matches of `pattern` in `text` with numbered and named groups
pub fn apply_regex(text: &str, pattern: &str) -> Result<Vec<Value>, OperationError> {
    let re = Regex::new(pattern)
        .map_err(|e| OperationError::failed(format!("Invalid regex pattern: {}", e)))?;

    let names: Vec<Option<&str>> = re.capture_names().collect();
    let mut matches = Vec::new();

    for caps in re.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let mut groups = Map::new();

        for (i, name) in names.iter().enumerate().skip(1) {
            let value = caps
                .get(i)
                .map(|m| Value::String(m.as_str().to_string()))
                .unwrap_or(Value::Null);
            if let Some(name) = name {
                groups.insert(name.to_string(), value.clone());
            }
            groups.insert(i.to_string(), value);
        }

        matches.push(json!({
            "match": whole.as_str(),
            "start": whole.start(),
            "end": whole.end(),
            "groups": groups,
        }));
    }

    Ok(matches)
}

pub struct PatternTool;

#[async_trait]
impl OperationTool for PatternTool {
    fn name(&self) -> &str {
        "pattern_tool"
    }

    fn kind(&self) -> &str {
        "pattern"
    }

    fn description(&self) -> &str {
        "Analyzes patterns in data with operations like pattern finding and regex application. Operations: find_patterns, apply_regex."
    }

    fn operations(&self) -> &'static [&'static str] {
        &["find_patterns", "apply_regex"]
    }

    fn argument_properties(&self) -> Value {
        json!({
            "data": { "type": "array", "items": {} },
            "text": { "type": "string" },
            "pattern": { "type": "string", "description": "Regular expression" }
        })
    }

    fn validate_input(&self, input: &Value) -> bool {
        match operation_of(input) {
            Some("find_patterns") => has_array(input, "data"),
            Some("apply_regex") => has_str(input, "text") && has_str(input, "pattern"),
            _ => false,
        }
    }

    async fn run(&self, operation: &str, input: &Value) -> OperationOutcome {
        match operation {
            "find_patterns" => Ok(OperationResult::ok(find_patterns(array_arg(input, "data")?))),
            "apply_regex" => Ok(OperationResult::ok(apply_regex(
                str_arg(input, "text")?,
                str_arg(input, "pattern")?,
            )?)),
            other => Err(OperationError::UnknownOperation(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_labels() {
        assert_eq!(analyze_sentiment("This is a great and amazing day")["label"], json!("positive"));
        assert_eq!(analyze_sentiment("terrible, awful service")["label"], json!("negative"));
        let neutral = analyze_sentiment("The sky is blue");
        assert_eq!(neutral["label"], json!("neutral"));
        assert_eq!(neutral["score"], json!(0.0));
    }

    #[test]
    fn test_entities() {
        let entities = extract_entities("John Smith works at NASA in Houston");
        let types: Vec<&str> = entities.iter().filter_map(|e| e["type"].as_str()).collect();
        assert_eq!(types, vec!["person", "organization", "location"]);
        assert_eq!(entities[0]["text"], json!("John Smith"));
        assert_eq!(entities[0]["start"], json!(0));
        assert_eq!(entities[2]["text"], json!("Houston"));
        assert_eq!(entities[2]["start"], json!(28));
    }

    #[test]
    fn test_keywords_frequency_then_first_seen() {
        let keywords = extract_keywords("rust tokio rust axum tokio rust serde and the", 3);
        assert_eq!(keywords, vec!["rust", "tokio", "axum"]);
    }

    #[test]
    fn test_basic_stats() {
        let stats = basic_stats(&[1.0, 2.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(stats["mean"], json!(2.4));
        assert_eq!(stats["median"], json!(2.0));
        assert_eq!(stats["mode"], json!(2.0));
        assert_eq!(stats["min"], json!(1.0));
        assert_eq!(stats["max"], json!(4.0));
        assert_eq!(stats["count"], json!(5));
    }

    #[test]
    fn test_mode_ties_keep_first_seen() {
        let stats = basic_stats(&[5.0, 1.0, 1.0, 5.0]).unwrap();
        assert_eq!(stats["mode"], json!(5.0));
        assert_eq!(stats["median"], json!(3.0));
    }

    #[test]
    fn test_single_value_std_dev_is_zero() {
        let stats = basic_stats(&[7.0]).unwrap();
        assert_eq!(stats["std_dev"], json!(0.0));
    }

    #[tokio::test]
    async fn test_empty_stats_is_error() {
        let result = StatisticsTool
            .execute(json!({"operation": "basic_stats", "data": []}))
            .await;
        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("Error executing statistics tool: Data list cannot be empty")
        );
    }

    #[test]
    fn test_correlation() {
        let r = correlation(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
        assert!((r - 1.0).abs() < 1e-9);
        let r = correlation(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap();
        assert!((r + 1.0).abs() < 1e-9);
        assert!(correlation(&[1.0], &[1.0]).is_err());
        assert!(correlation(&[1.0, 2.0], &[1.0]).is_err());
        assert!(correlation(&[1.0, 1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_find_patterns_sequence_and_repetition() {
        let patterns = find_patterns(&[json!(2), json!(4), json!(6), json!(8)]);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0]["pattern_type"], json!("sequence"));
        assert_eq!(
            patterns[0]["description"],
            json!("Arithmetic sequence with difference 2")
        );

        let patterns = find_patterns(&[json!("a"), json!("b"), json!("a")]);
        assert_eq!(patterns[0]["pattern_type"], json!("repetition"));
        assert_eq!(patterns[0]["description"], json!("Item 'a' repeats 2 times"));
    }

    #[test]
    fn test_find_patterns_outlier() {
        let data: Vec<Value> = [10, 10, 10, 10, 10, 10, 10, 10, 10, 100]
            .iter()
            .map(|v| json!(v))
            .collect();
        let patterns = find_patterns(&data);
        let outliers: Vec<&Value> = patterns
            .iter()
            .filter(|p| p["pattern_type"] == "outlier")
            .collect();
        assert_eq!(outliers.len(), 1);
        assert_eq!(outliers[0]["description"], json!("Outlier at position 9: value 100"));
    }

    #[test]
    fn test_constant_data_has_no_outliers() {
        let data: Vec<Value> = vec![json!(3); 6];
        let patterns = find_patterns(&data);
        assert!(patterns.iter().all(|p| p["pattern_type"] != "outlier"));
    }

    #[test]
    fn test_apply_regex_groups() {
        let matches = apply_regex("a1 b2", r"(?P<letter>[a-z])(\d)").unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0]["match"], json!("a1"));
        assert_eq!(matches[0]["groups"]["letter"], json!("a"));
        assert_eq!(matches[0]["groups"]["1"], json!("a"));
        assert_eq!(matches[0]["groups"]["2"], json!("1"));
        assert_eq!(matches[1]["start"], json!(3));
    }

    #[tokio::test]
    async fn test_apply_regex_invalid_pattern() {
        let result = PatternTool
            .execute(json!({"operation": "apply_regex", "text": "x", "pattern": "("}))
            .await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("Invalid regex pattern"));
    }
}
