//! 测验题库类型：测验 → 题目 → 计分选项 → 结果区间
//!
//! 结果区间在 JSON 里是 "min-max" → 建议文本的对象；声明顺序即匹配优先级，
//! 反序列化时按出现顺序读入 Vec（serde_json 的默认 Map 会打乱顺序）。

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

/// 测验：题目序列 + 按声明顺序排列的结果区间
#[derive(Debug, Clone, Deserialize)]
pub struct Quiz {
    pub id: u32,
    pub title: String,
    pub questions: Vec<Question>,
    #[serde(deserialize_with = "deserialize_result_bands")]
    pub results: Vec<ResultBand>,
}

/// 题目：选项与分值按下标一一对应（options[i] 计 scores[i] 分）
#[derive(Debug, Clone, Deserialize)]
pub struct Question {
    pub text: String,
    pub options: Vec<String>,
    pub scores: Vec<i32>,
}

/// 结果区间：标签形如 "min-max"，命中时返回建议文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultBand {
    pub range: String,
    pub recommendation: String,
}

impl ResultBand {
    /// 解析 "min-max" 为闭区间边界；格式不符返回 None。
    /// 已知限制：标签只含一个 `-`，负数边界无法表示。
    fn bounds(&self) -> Option<(i32, i32)> {
        let (min, max) = self.range.split_once('-')?;
        Some((min.trim().parse().ok()?, max.trim().parse().ok()?))
    }
}

impl Quiz {
    /// 按下标取题（0 起）
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// 按声明顺序扫描结果区间，返回第一个包含 score 的建议文本；
    /// 无命中返回 None（静默穿透，不算错误）
    pub fn result_for(&self, score: i32) -> Option<&str> {
        self.results.iter().find_map(|band| {
            let (min, max) = match band.bounds() {
                Some(b) => b,
                None => {
                    tracing::debug!(range = %band.range, "Skipping malformed score range");
                    return None;
                }
            };
            (min <= score && score <= max).then_some(band.recommendation.as_str())
        })
    }
}

impl Question {
    /// 按选项文字全等匹配，返回其分值；不匹配返回 None
    pub fn score_for(&self, answer: &str) -> Option<i32> {
        let index = self.options.iter().position(|o| o == answer)?;
        self.scores.get(index).copied()
    }
}

/// 将 JSON 对象按出现顺序读入 Vec，保留声明顺序作为匹配优先级
fn deserialize_result_bands<'de, D>(deserializer: D) -> Result<Vec<ResultBand>, D::Error>
where
    D: Deserializer<'de>,
{
    struct BandsVisitor;

    impl<'de> Visitor<'de> for BandsVisitor {
        type Value = Vec<ResultBand>;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            f.write_str("a map of score ranges to recommendations")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut bands = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((range, recommendation)) = map.next_entry::<String, String>()? {
                bands.push(ResultBand {
                    range,
                    recommendation,
                });
            }
            Ok(bands)
        }
    }

    deserializer.deserialize_map(BandsVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz_with_bands(bands: &[(&str, &str)]) -> Quiz {
        Quiz {
            id: 1,
            title: "test".to_string(),
            questions: Vec::new(),
            results: bands
                .iter()
                .map(|(range, rec)| ResultBand {
                    range: range.to_string(),
                    recommendation: rec.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_band_declaration_order_wins() {
        // 区间重叠时取声明更早的
        let quiz = quiz_with_bands(&[("0-10", "first"), ("5-15", "second")]);
        assert_eq!(quiz.result_for(7), Some("first"));
        assert_eq!(quiz.result_for(12), Some("second"));
    }

    #[test]
    fn test_band_no_match_is_silent() {
        let quiz = quiz_with_bands(&[("0-5", "low")]);
        assert_eq!(quiz.result_for(99), None);
    }

    #[test]
    fn test_malformed_band_is_skipped() {
        let quiz = quiz_with_bands(&[("oops", "bad"), ("0-10", "good")]);
        assert_eq!(quiz.result_for(3), Some("good"));
    }

    #[test]
    fn test_results_preserve_json_order() {
        let json = r#"{
            "id": 1,
            "title": "t",
            "questions": [],
            "results": {"6-10": "high", "0-5": "low"}
        }"#;
        let quiz: Quiz = serde_json::from_str(json).unwrap();
        assert_eq!(quiz.results[0].range, "6-10");
        assert_eq!(quiz.results[1].range, "0-5");
    }

    #[test]
    fn test_score_for_matches_option_text() {
        let question = Question {
            text: "q".to_string(),
            options: vec!["A".to_string(), "B".to_string()],
            scores: vec![0, 10],
        };
        assert_eq!(question.score_for("B"), Some(10));
        assert_eq!(question.score_for("C"), None);
    }
}
