//! Configuration module for loading TOML config files.
//!
//! Every section falls back to the embedded defaults, so a config file only
//! needs to contain the values it overrides. Credentials are never read from
//! the file; see [`Credentials`].

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::classifier::{EvidenceBucket, SectionType};
use crate::error::CoachError;
use crate::participant::Position;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub patterns: PatternsConfig,
    pub feedback: FeedbackConfig,
    pub fact_check: FactCheckConfig,
    pub surrender: SurrenderConfig,
    pub opponent: OpponentConfig,
    pub coach: CoachConfig,
    pub services: ServicesConfig,
    pub prompts: PromptsConfig,
}

/// Ordered regular-expression lists used by the text classifier.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PatternsConfig {
    pub intro: Vec<String>,
    pub conclusion: Vec<String>,
    pub claim: Vec<String>,
    pub evidence: Vec<String>,
    pub reinforcement: Vec<String>,
    /// One entry per ordinal; the number of entries matched is the count.
    pub ordinals: Vec<String>,
    /// Literal phrases that follow a cited source name.
    pub citation_markers: Vec<String>,
    /// Regexes whose first capture group is a cited source name. The cited
    /// claim is the text after the match.
    pub source_patterns: Vec<String>,
}

/// How coaching feedback is produced.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStrategy {
    /// Model when a generation service is available, templates otherwise.
    #[default]
    Auto,
    Template,
    Model,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub strategy: FeedbackStrategy,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Lookup table; the first matching entry wins.
    pub templates: Vec<TemplateEntry>,
    /// Used when no template entry matches.
    pub generic: Vec<String>,
}

/// A canned feedback pool. Unset key fields match anything.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateEntry {
    #[serde(default)]
    pub section: Option<SectionType>,
    #[serde(default)]
    pub evidence: Option<EvidenceBucket>,
    #[serde(default)]
    pub has_sources: Option<bool>,
    pub messages: Vec<String>,
}

impl TemplateEntry {
    fn new(
        section: Option<SectionType>,
        evidence: Option<EvidenceBucket>,
        has_sources: Option<bool>,
        messages: &[&str],
    ) -> Self {
        Self {
            section,
            evidence,
            has_sources,
            messages: owned(messages),
        }
    }
}

/// Verdict keyword lists and retrieval parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FactCheckConfig {
    pub search_max_tokens: u32,
    pub search_temperature: f32,
    pub max_sources: usize,
    pub supported_keywords: Vec<String>,
    pub partial_keywords: Vec<String>,
    pub unsupported_keywords: Vec<String>,
    pub summary_true_keywords: Vec<String>,
    pub summary_false_keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SurrenderConfig {
    /// Rounds required before the opponent may concede.
    pub min_rounds: u32,
    pub round_weight: f64,
    pub round_cap: f64,
    /// Elapsed seconds from which `mid_factor` applies (inclusive).
    pub mid_after_secs: u64,
    pub mid_factor: f64,
    /// Elapsed seconds after which `late_factor` applies (exclusive).
    pub late_after_secs: u64,
    pub late_factor: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpponentConfig {
    pub name: String,
    pub topic: String,
    pub stance: String,
    pub pillars: Vec<String>,
    /// Number of prior turns sent to the model.
    pub context_turns: usize,
    pub max_tokens: u32,
    pub temperature: f32,
    pub fallback: FallbackConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Checked in order; the first entry with a matching keyword wins.
    pub keyword_rebuttals: Vec<KeywordRebuttal>,
    pub generic: Vec<String>,
    pub concessions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeywordRebuttal {
    pub keywords: Vec<String>,
    pub rebuttal: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoachConfig {
    /// Fact-check automatically when a submission names a source.
    pub auto_fact_check: bool,
    pub example_topics: Vec<String>,
}

/// An OpenAI-compatible chat endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    pub api_base: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub generation: EndpointConfig,
    pub groundedness: EndpointConfig,
    pub retrieval: EndpointConfig,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

/// Prompt templates. Placeholders are written as `{name}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub coach_system: String,
    pub coach_user: String,
    pub fact_check_system: String,
    pub fact_check_user: String,
    pub opponent_system: String,
    pub surrender_instruction: String,
    pub topic_guide: String,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CoachError> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| CoachError::ConfigError(format!("Failed to read config: {}", e)))?;

        Self::from_str(&content)
    }

    /// Load configuration from string content.
    pub fn from_str(content: &str) -> Result<Self, CoachError> {
        toml::from_str(content)
            .map_err(|e| CoachError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// System prompt for the simulated opponent.
    pub fn opponent_prompt(&self, surrender: bool) -> String {
        let opponent = &self.opponent;
        let pillars = opponent
            .pillars
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{}. {}", i + 1, p))
            .collect::<Vec<_>>()
            .join("\n");

        let mut prompt = fill(
            &self.prompts.opponent_system,
            &[
                ("name", opponent.name.as_str()),
                ("topic", opponent.topic.as_str()),
                ("stance", opponent.stance.as_str()),
                ("pillars", pillars.as_str()),
            ],
        );
        if surrender {
            prompt.push_str("\n\n");
            prompt.push_str(&self.prompts.surrender_instruction);
        }
        prompt
    }

    /// Step-by-step guide shown when coaching starts.
    pub fn topic_guide(&self, topic: &str, position: Position) -> String {
        fill(
            &self.prompts.topic_guide,
            &[("topic", topic), ("position", position.label())],
        )
    }
}

/// Replace `{key}` placeholders in a template.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |acc, (key, value)| {
        acc.replace(&format!("{{{}}}", key), value)
    })
}

/// Default configuration embedded in the binary.
pub fn default_config() -> Config {
    Config::default()
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub const GENERATION_KEY_VAR: &str = "UPSTAGE_API_KEY";
pub const RETRIEVAL_KEY_VAR: &str = "PERPLEXITY_API_KEY";
pub const GROUNDEDNESS_KEY_VAR: &str = "GROUNDEDNESS_API_KEY";

/// API keys for the three external services. Each is optional.
#[derive(Clone, Default)]
pub struct Credentials {
    pub generation_api_key: Option<String>,
    pub retrieval_api_key: Option<String>,
    pub groundedness_api_key: Option<String>,
}

impl Credentials {
    /// Read keys from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read keys through an arbitrary lookup. Blank values count as unset.
    ///
    /// The groundedness key falls back to the generation key, since both
    /// services are usually hosted by the same provider.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let generation_api_key = read(GENERATION_KEY_VAR);
        let groundedness_api_key =
            read(GROUNDEDNESS_KEY_VAR).or_else(|| generation_api_key.clone());

        Self {
            generation_api_key,
            retrieval_api_key: read(RETRIEVAL_KEY_VAR),
            groundedness_api_key,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = |key: &Option<String>| if key.is_some() { "set" } else { "unset" };
        f.debug_struct("Credentials")
            .field("generation_api_key", &state(&self.generation_api_key))
            .field("retrieval_api_key", &state(&self.retrieval_api_key))
            .field("groundedness_api_key", &state(&self.groundedness_api_key))
            .finish()
    }
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self {
            intro: owned(&[
                r"(나는|저는|우리는).{0,40}(찬성|반대)(한다|합니다|해요)",
                r"(나는|저는).{0,40}(생각한다|생각합니다|믿는다|믿습니다|주장한다|주장합니다)",
                r"내 주장은",
                r"(?i)\bI (strongly )?(support|oppose)\b",
                r"(?i)\bI (believe|argue) that\b",
            ]),
            conclusion: owned(&[
                r"따라서",
                r"그러므로",
                r"결론적으로",
                r"결론은",
                r"요약하(면|자면)",
                r"정리하(면|자면)",
                r"끝으로",
                r"(?i)\b(therefore|in conclusion|to summari[sz]e|in closing)\b",
            ]),
            claim: owned(&[
                r"나는.*생각한다",
                r"내 주장은.*이다",
                r"해야 (한다|합니다)",
                r"할 필요가 있다",
                r"것이 중요하다",
                r"(찬성|반대)(한다|합니다)",
                r"(?i)\bI (support|oppose|believe|argue)\b",
                r"(?i)\b(should|must)\b",
            ]),
            evidence: owned(&[
                r"왜냐하면",
                r"그 이유는",
                r"(?s)첫째.*둘째",
                r"때문(이다|입니다)",
                r"결과로",
                r"(?i)\bbecause\b",
                r"(?i)\bthe reason is\b",
                r"(?is)\bfirst\b.*\bsecond\b",
                r"(?i)\bas a result\b",
            ]),
            reinforcement: owned(&[
                r"에 따르면",
                r"연구에서",
                r"조사 결과",
                r"통계를 보면",
                r"(?s)실제로.*사례",
                r"(?i)\baccording to\b",
                r"(?i)\b(study|survey|report|research) (shows|showed|found|finds)\b",
                r"(?i)\bstatistics show\b",
                r"(?i)\bin fact, a case\b",
            ]),
            ordinals: owned(&[
                r"(?m)첫째|첫 번째|(?i:\bfirst(ly)?\b)|(^|\s)1[.)]\s",
                r"(?m)둘째|두 번째|(?i:\bsecond(ly)?\b)|(^|\s)2[.)]\s",
                r"(?m)셋째|세 번째|(?i:\bthird(ly)?\b)|(^|\s)3[.)]\s",
                r"(?m)넷째|네 번째|(?i:\bfourth(ly)?\b)|(^|\s)4[.)]\s",
            ]),
            citation_markers: owned(&["에 따르면", "연구에서", "조사 결과"]),
            source_patterns: owned(&[
                r"\b(?:[Aa]ccording to|[Aa]s reported by) (?:the )?([A-Z][\w&-]*(?: (?:of |for |and )?[A-Z][\w&-]*)*)",
                r"\b(?:[Tt]he |[Aa]n? )?([A-Z][\w&-]*(?: [A-Z][\w&-]*)*)(?:'s)? (?:study|survey|report|research|poll) (?:shows|showed|found|finds|suggests|reported)\b",
            ]),
        }
    }
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        use EvidenceBucket::*;
        use SectionType::*;

        Self {
            strategy: FeedbackStrategy::Auto,
            max_tokens: 1500,
            temperature: 0.7,
            templates: vec![
                TemplateEntry::new(
                    Some(Intro),
                    None,
                    None,
                    &[
                        "입장이 분명하게 드러나는 서론입니다. 이제 이 입장을 뒷받침할 근거를 두세 가지 준비해 보세요.",
                        "좋은 출발입니다! 주장을 한 문장으로 선명하게 밝혔으니, 다음 단락에서 '첫째, 둘째'로 이유를 정리해 보세요.",
                    ],
                ),
                TemplateEntry::new(
                    Some(Conclusion),
                    None,
                    None,
                    &[
                        "결론에서 처음의 주장을 다시 한 번 힘 있게 강조했습니다. 핵심 근거를 한 줄로 요약해 넣으면 더 설득력이 생깁니다.",
                        "마무리가 단호해서 좋습니다. 청중이 기억해야 할 가장 강력한 근거 하나를 다시 짚어 주세요.",
                    ],
                ),
                TemplateEntry::new(
                    Some(Body),
                    Some(One),
                    Some(false),
                    &[
                        "근거가 하나 보입니다. 같은 입장을 지지하는 근거를 하나 더 추가하고, '~에 따르면' 형식으로 출처를 밝혀 보세요.",
                        "이유를 제시한 점이 좋습니다. 통계나 연구 결과 같은 보강자료를 붙이면 주장이 훨씬 단단해집니다.",
                    ],
                ),
                TemplateEntry::new(
                    Some(Body),
                    Some(One),
                    Some(true),
                    &[
                        "출처를 밝힌 근거라서 신뢰도가 높습니다. 두 번째 근거를 더해 논증의 폭을 넓혀 보세요.",
                    ],
                ),
                TemplateEntry::new(
                    Some(Body),
                    Some(Two),
                    Some(false),
                    &[
                        "두 가지 근거가 잘 정리되어 있습니다. 각 근거에 구체적인 수치나 사례를 하나씩 붙여 보세요.",
                        "근거 두 개가 입장을 잘 받쳐 줍니다. 이제 출처가 있는 보강자료로 마무리해 보세요.",
                    ],
                ),
                TemplateEntry::new(
                    Some(Body),
                    Some(Two),
                    Some(true),
                    &[
                        "근거 두 개와 출처까지 갖춘 탄탄한 본론입니다. 근거 사이의 연결어를 다듬으면 흐름이 더 매끄러워집니다.",
                    ],
                ),
                TemplateEntry::new(
                    Some(Body),
                    Some(Three),
                    None,
                    &[
                        "세 가지 근거로 입장을 든든하게 받치고 있습니다. 가장 강력한 근거를 맨 앞이나 맨 뒤에 배치해 보세요.",
                        "근거가 풍부합니다. 각 근거가 주장과 어떻게 연결되는지 한 문장씩 덧붙이면 완성도가 높아집니다.",
                    ],
                ),
                TemplateEntry::new(
                    Some(Body),
                    Some(FourPlus),
                    None,
                    &[
                        "근거가 네 가지 이상입니다. 비슷한 근거는 하나로 묶고, 가장 설득력 있는 세 가지에 집중해 보세요.",
                    ],
                ),
            ],
            generic: owned(&[
                "좋은 시도입니다. 주장, 근거, 보강자료의 구조를 갖추도록 계속 다듬어 보세요.",
                "입장을 일관되게 유지하면서 근거를 하나씩 추가해 보세요.",
            ]),
        }
    }
}

impl Default for FactCheckConfig {
    fn default() -> Self {
        Self {
            search_max_tokens: 1000,
            search_temperature: 0.3,
            max_sources: 3,
            supported_keywords: owned(&[
                "grounded",
                "supported",
                "verified",
                "confirmed",
                "사실",
                "확인",
                "입증",
            ]),
            partial_keywords: owned(&["partially", "partly", "부분적", "일부"]),
            unsupported_keywords: owned(&[
                "not grounded",
                "notgrounded",
                "unsupported",
                "false",
                "incorrect",
                "거짓",
                "틀림",
                "오류",
            ]),
            summary_true_keywords: owned(&[
                "사실",
                "확인",
                "맞습니다",
                "정확",
                "true",
                "correct",
                "verified",
            ]),
            summary_false_keywords: owned(&[
                "거짓",
                "틀림",
                "오류",
                "false",
                "incorrect",
                "wrong",
            ]),
        }
    }
}

impl Default for SurrenderConfig {
    fn default() -> Self {
        Self {
            min_rounds: 7,
            round_weight: 0.1,
            round_cap: 0.5,
            mid_after_secs: 10 * 60,
            mid_factor: 0.2,
            late_after_secs: 15 * 60,
            late_factor: 0.4,
        }
    }
}

impl Default for OpponentConfig {
    fn default() -> Self {
        Self {
            name: "반론봇".to_string(),
            topic: "인공지능을 활용한 수행평가".to_string(),
            stance: "인공지능을 활용한 수행평가 도입에 반대".to_string(),
            pillars: owned(&[
                "학습 과정의 진정성: 결과물만으로는 학생이 실제로 배우고 고민했는지 알 수 없다",
                "평가의 공정성: 누가 얼마나 AI의 도움을 받았는지 가려낼 수 없다",
                "디지털 접근성의 형평: 유료 도구와 기기를 가진 학생이 유리해진다",
                "비판적 사고와 창의성의 위축: 스스로 생각하는 훈련의 기회가 줄어든다",
                "의존성의 위험: 도구 없이는 과제를 해내지 못하는 습관이 굳어진다",
            ]),
            context_turns: 10,
            max_tokens: 600,
            temperature: 0.8,
            fallback: FallbackConfig::default(),
        }
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            keyword_rebuttals: vec![
                KeywordRebuttal {
                    keywords: owned(&["효율", "빠르", "시간 절약", "efficien"]),
                    rebuttal: "효율성을 말씀하셨는데, 수행평가의 목적은 빠르게 결과물을 내는 것이 아닙니다. 학생이 자료를 찾고, 헤매고, 고쳐 쓰는 그 느린 과정 자체가 배움입니다. AI가 그 과정을 대신해 준다면 평가는 효율적이 되겠지만, 정작 평가해야 할 학습은 사라집니다.".to_string(),
                },
                KeywordRebuttal {
                    keywords: owned(&["미래", "시대", "future"]),
                    rebuttal: "미래 사회에 AI 활용 능력이 필요하다는 점은 인정할 수 없습니다. 미래에 필요한 것은 도구를 다루는 요령이 아니라 도구가 틀렸을 때 알아차리는 판단력입니다. 그 판단력은 AI 없이 스스로 생각해 본 경험에서만 길러집니다.".to_string(),
                },
                KeywordRebuttal {
                    keywords: owned(&["형평", "평등", "격차", "접근", "equity", "access"]),
                    rebuttal: "접근성을 이야기하신다면 오히려 반대 근거가 됩니다. 유료 AI 서비스와 좋은 기기를 가진 학생과 그렇지 못한 학생 사이의 격차는 그대로 점수 차이로 이어집니다. 학교 평가가 가정의 경제력을 반영하게 되는 것은 공정하지 않습니다.".to_string(),
                },
                KeywordRebuttal {
                    keywords: owned(&["창의", "creativ"]),
                    rebuttal: "AI가 창의성을 키운다고 하셨지만, AI는 이미 존재하는 데이터의 평균적인 조합을 내놓습니다. 학생들이 그 결과물을 출발점으로 삼으면 생각은 점점 비슷해집니다. 빈 종이 앞에서 스스로 아이디어를 짜내는 경험이야말로 창의성의 원천입니다.".to_string(),
                },
                KeywordRebuttal {
                    keywords: owned(&["역량", "능력", "competenc", "skill"]),
                    rebuttal: "역량을 평가하려면 학생이 혼자 힘으로 무엇을 할 수 있는지 보아야 합니다. AI가 섞인 결과물로는 그 학생의 역량인지 도구의 역량인지 구분할 수 없습니다. 측정할 수 없는 역량은 평가할 수도 없습니다.".to_string(),
                },
            ],
            generic: owned(&[
                "말씀하신 내용에도 불구하고, AI가 개입한 결과물로는 학생 개인의 노력과 이해도를 정확히 평가할 수 없다는 문제는 여전히 남습니다. 평가의 신뢰성이 무너지면 수행평가 제도 자체가 의미를 잃습니다.",
                "그 주장은 AI 활용의 장점만 보고 있습니다. 학생들이 AI에 의존하게 되면 스스로 질문하고 답을 찾는 힘이 약해지고, 결국 도구 없이는 아무것도 하지 못하는 상황이 올 수 있습니다.",
                "현장의 현실을 보셔야 합니다. 교사가 AI 사용 여부와 정도를 확인할 방법이 없는 상황에서 AI 활용 수행평가를 도입하면, 성실하게 스스로 과제를 한 학생이 오히려 불리해집니다.",
            ]),
            concessions: owned(&[
                "여러 차례 토론을 해 보니 당신의 논리가 더 설득력 있다는 것을 인정하지 않을 수 없네요. 특히 AI를 배움의 도구로 가르치고 그 사용 과정을 함께 평가한다면 제가 걱정한 공정성 문제도 상당 부분 줄일 수 있다는 점에서 생각이 바뀌었습니다. 제가 졌습니다.",
                "인정하겠습니다. 처음에는 의존성과 공정성 문제만 보였지만, 명확한 기준과 과정 중심 평가가 함께한다면 AI 활용 수행평가가 오히려 미래 역량을 기르는 기회가 될 수 있다는 당신의 주장에 동의하게 되었습니다.",
                "제 입장을 계속 지키기 어렵겠네요. 당신이 제시한 근거들이 제 우려를 하나씩 해소해 주었습니다. 이번 토론은 당신의 승리입니다. 좋은 토론이었습니다.",
            ]),
        }
    }
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            auto_fact_check: true,
            example_topics: owned(&[
                "인공지능을 활용한 수행평가",
                "학교 내 스마트폰 사용",
                "온라인 수업의 효과성",
                "청소년 게임 시간 제한",
                "학생 자치권 확대",
            ]),
        }
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            generation: EndpointConfig {
                api_base: "https://api.upstage.ai/v1".to_string(),
                model: "solar-pro2".to_string(),
            },
            groundedness: EndpointConfig {
                api_base: "https://api.upstage.ai/v1".to_string(),
                model: "groundedness-check".to_string(),
            },
            retrieval: EndpointConfig {
                api_base: "https://api.perplexity.ai".to_string(),
                model: "llama-3.1-sonar-large-128k-online".to_string(),
            },
            request_timeout_secs: 120,
            connect_timeout_secs: 30,
        }
    }
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            coach_system: DEFAULT_COACH_SYSTEM.to_string(),
            coach_user: DEFAULT_COACH_USER.to_string(),
            fact_check_system: DEFAULT_FACT_CHECK_SYSTEM.to_string(),
            fact_check_user: DEFAULT_FACT_CHECK_USER.to_string(),
            opponent_system: DEFAULT_OPPONENT_SYSTEM.to_string(),
            surrender_instruction: DEFAULT_SURRENDER_INSTRUCTION.to_string(),
            topic_guide: DEFAULT_TOPIC_GUIDE.to_string(),
        }
    }
}

const DEFAULT_COACH_SYSTEM: &str = r#"당신은 학생들의 찬반 토론 논증을 지도하는 토론 코치입니다.

핵심 원칙:
- 학생이 고른 입장(찬성 또는 반대)을 끝까지 유지하도록 지도합니다
- 선택한 입장을 더 강하게 만드는 방향으로만 조언합니다
- 주장-근거-보강자료 구조를 갖추도록 돕습니다

반드시 지킬 것:
- "~일 수도 있지만", "~라는 점도 일리가 있지만" 같은 양보 표현을 제안하지 않습니다
- "부분적으로 동의한다" 같은 중립적인 태도를 권하지 않습니다
- 상대 입장의 타당성을 인정하는 문장을 넣지 않습니다
- 애매한 문장은 단호하고 명확한 문장으로 고쳐 보여 줍니다
"#;

const DEFAULT_COACH_USER: &str = r#"학생의 논증을 분석하고 코칭해 주세요.

학생의 입장: {position}
토론 주제: {topic}

논증 내용: {text}

구조 분석 결과:
- 단락 유형: {section}
- 주장 포함: {has_claim}
- 근거 포함: {has_evidence}
- 보강자료 포함: {has_reinforcement}
- 근거 개수: {evidence_count}
- 언급된 출처: {sources}

다음 형식으로 답해 주세요:

[논증 구조 평가]
- 강점:
- 개선점:

[구체적 개선 제안]
1. 주장:
2. 근거:
3. 보강자료:

[개선된 예시]

[다음 단계]
"#;

const DEFAULT_FACT_CHECK_SYSTEM: &str = "당신은 팩트체커입니다. 주어진 주장이 사실인지 웹 검색으로 확인하고, 신뢰할 수 있는 출처의 URL과 함께 검증 결과를 알려 주세요.";

const DEFAULT_FACT_CHECK_USER: &str = r#"다음 주장이 사실인지 확인해 주세요.

출처: {source}
주장: {claim}

신뢰할 수 있는 출처를 근거로 사실 여부를 판단해 주세요."#;

const DEFAULT_OPPONENT_SYSTEM: &str = r#"당신은 토론 상대 '{name}'입니다.

토론 주제: {topic}
당신의 입장: {stance}

당신은 다음 다섯 가지 논거를 중심으로 학생의 주장에 반박합니다:
{pillars}

토론 규칙:
- 학생의 마지막 발언에 직접 대응하며 반박합니다
- 한 번에 3~5문장으로 간결하게 말합니다
- 예의를 지키되 입장은 단호하게 유지합니다
- AI라는 사실을 언급하지 않고 토론자로서만 말합니다
- 마크다운이나 괄호 속 지문을 쓰지 않습니다
"#;

const DEFAULT_SURRENDER_INSTRUCTION: &str = "이번 발언에서는 학생의 논리에 설득되었음을 인정하고 패배를 선언하세요. 어떤 근거 때문에 생각이 바뀌었는지 구체적으로 설명하세요.";

const DEFAULT_TOPIC_GUIDE: &str = r#"토론 주제: {topic}
당신의 입장: {position}

효과적인 논증 구조 만들기

1단계: 명확한 주장 (Claim)
- 당신의 입장을 한 문장으로 분명하게 밝히세요
- 예: "저는 {topic}에 {position}합니다. 왜냐하면..."

2단계: 논리적 근거 (Evidence)
- 주장을 뒷받침하는 핵심 이유를 2~3개 제시하세요
- '첫째, 둘째'처럼 순서를 붙이면 구조가 또렷해집니다

3단계: 신뢰할 만한 보강자료 (Reinforcement)
- 통계, 연구 결과, 전문가 의견을 인용하세요
- "~에 따르면" 형식으로 출처를 밝히세요

팁: 상대의 예상 반박을 미리 떠올리고 대응 논리를 준비하세요.
"#;
