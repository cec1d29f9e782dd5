//! Argument structure detection.
//!
//! Classifies a submission as an introduction, body or conclusion paragraph
//! and detects claims, evidence and cited reinforcement. All rules come from
//! [`PatternsConfig`], so they can be tuned without touching this module.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PatternsConfig;
use crate::error::CoachError;

/// Upper bound for [`ArgumentStructure::evidence_count`].
pub const MAX_EVIDENCE: u8 = 4;

/// Which part of an argument a submission is.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    Intro,
    #[default]
    Body,
    Conclusion,
}

impl SectionType {
    pub fn label(&self) -> &'static str {
        match self {
            SectionType::Intro => "서론",
            SectionType::Body => "본론",
            SectionType::Conclusion => "결론",
        }
    }
}

/// Evidence-count buckets used to key feedback templates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceBucket {
    One,
    Two,
    Three,
    FourPlus,
}

impl EvidenceBucket {
    /// A count of zero shares the lowest bucket.
    pub fn from_count(count: u8) -> Self {
        match count {
            0 | 1 => EvidenceBucket::One,
            2 => EvidenceBucket::Two,
            3 => EvidenceBucket::Three,
            _ => EvidenceBucket::FourPlus,
        }
    }
}

/// Structure derived from a single submission.
///
/// Evidence and reinforcement fields are only filled for body paragraphs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArgumentStructure {
    pub section_type: SectionType,
    pub has_claim: bool,
    pub has_evidence: bool,
    pub has_reinforcement: bool,
    pub evidence_count: u8,
    pub sources: Vec<String>,
}

impl ArgumentStructure {
    pub fn evidence_bucket(&self) -> EvidenceBucket {
        EvidenceBucket::from_count(self.evidence_count)
    }

    pub fn has_sources(&self) -> bool {
        !self.sources.is_empty()
    }
}

/// An ordered list of compiled patterns for one category.
#[derive(Debug, Clone)]
struct PatternSet {
    patterns: Vec<Regex>,
}

impl PatternSet {
    fn compile(category: &'static str, patterns: &[String]) -> Result<Self, CoachError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|source| CoachError::InvalidPattern {
                    category,
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    /// Index of the first pattern found in `text`.
    fn first_match(&self, text: &str) -> Option<usize> {
        self.patterns.iter().position(|re| re.is_match(text))
    }

    fn is_match(&self, text: &str) -> bool {
        self.first_match(text).is_some()
    }

    /// Number of distinct patterns found in `text`.
    fn count_matching(&self, text: &str) -> usize {
        self.patterns.iter().filter(|re| re.is_match(text)).count()
    }
}

/// Regex-driven classifier for argument submissions.
#[derive(Debug, Clone)]
pub struct TextClassifier {
    intro: PatternSet,
    conclusion: PatternSet,
    claim: PatternSet,
    evidence: PatternSet,
    reinforcement: PatternSet,
    ordinals: PatternSet,
    /// Captures the name run preceding a citation marker.
    source_capture: Option<Regex>,
    /// Captures the text following the first citation marker.
    cited_claim: Option<Regex>,
    /// Named-source phrasings such as "according to X" or "the X survey found".
    source_patterns: PatternSet,
}

impl TextClassifier {
    /// Compile the configured pattern lists.
    pub fn new(patterns: &PatternsConfig) -> Result<Self, CoachError> {
        let markers = patterns
            .citation_markers
            .iter()
            .filter(|m| !m.is_empty())
            .map(|m| regex::escape(m))
            .collect::<Vec<_>>();

        let (source_capture, cited_claim) = if markers.is_empty() {
            (None, None)
        } else {
            let alternation = markers.join("|");
            let capture = format!(r"([가-힣A-Za-z0-9\s]+)(?:{})", alternation);
            let claim = format!(r"(?s)(?:{})(.+)", alternation);
            (
                Some(compile_marker(&capture)?),
                Some(compile_marker(&claim)?),
            )
        };

        Ok(Self {
            intro: PatternSet::compile("intro", &patterns.intro)?,
            conclusion: PatternSet::compile("conclusion", &patterns.conclusion)?,
            claim: PatternSet::compile("claim", &patterns.claim)?,
            evidence: PatternSet::compile("evidence", &patterns.evidence)?,
            reinforcement: PatternSet::compile("reinforcement", &patterns.reinforcement)?,
            ordinals: PatternSet::compile("ordinal", &patterns.ordinals)?,
            source_capture,
            cited_claim,
            source_patterns: PatternSet::compile("source", &patterns.source_patterns)?,
        })
    }

    /// Derive the structure of one submission. Never fails.
    pub fn classify(&self, text: &str) -> ArgumentStructure {
        let section_type = self.section_type(text);
        let mut structure = ArgumentStructure {
            section_type,
            has_claim: self.claim.is_match(text),
            ..ArgumentStructure::default()
        };

        if section_type == SectionType::Body {
            structure.has_evidence = self.evidence.is_match(text);
            if self.reinforcement.is_match(text) {
                structure.has_reinforcement = true;
                structure.sources = self.extract_sources(text);
            }
            structure.evidence_count = self.count_evidence(text);
        }

        debug!(
            section = ?structure.section_type,
            claim = structure.has_claim,
            evidence = structure.has_evidence,
            reinforcement = structure.has_reinforcement,
            evidence_count = structure.evidence_count,
            sources = structure.sources.len(),
            "classified submission"
        );

        structure
    }

    /// Intro patterns are tested before conclusion patterns.
    pub fn section_type(&self, text: &str) -> SectionType {
        if self.intro.is_match(text) {
            SectionType::Intro
        } else if self.conclusion.is_match(text) {
            SectionType::Conclusion
        } else {
            SectionType::Body
        }
    }

    /// Source names cited in `text`, in order of appearance.
    pub fn extract_sources(&self, text: &str) -> Vec<String> {
        let mut found = self
            .source_capture
            .iter()
            .chain(&self.source_patterns.patterns)
            .flat_map(|re| re.captures_iter(text))
            .filter_map(|caps| caps.get(1))
            .map(|m| (m.start(), m.as_str().trim()))
            .filter(|(_, name)| !name.is_empty())
            .collect::<Vec<_>>();
        found.sort_by_key(|(start, _)| *start);

        found.into_iter().map(|(_, name)| name.to_string()).collect()
    }

    /// Text following the earliest citation, if any.
    pub fn cited_claim(&self, text: &str) -> Option<String> {
        let after_marker = self
            .cited_claim
            .as_ref()
            .and_then(|re| re.captures(text)?.get(1))
            .map(|m| m.start());
        let after_source = self
            .source_patterns
            .patterns
            .iter()
            .filter_map(|re| re.find(text))
            .map(|m| m.end());
        let start = after_marker.into_iter().chain(after_source).min()?;

        let claim = text[start..]
            .trim_start()
            .trim_start_matches([',', ':'])
            .trim();
        (!claim.is_empty()).then(|| claim.to_string())
    }

    /// Count supporting points, preferring explicit ordinals.
    ///
    /// Without ordinals the count is the number of sentences minus one,
    /// at least 1 for non-blank text. Blank text counts as 0.
    pub fn count_evidence(&self, text: &str) -> u8 {
        if text.trim().is_empty() {
            return 0;
        }

        let ordinals = self.ordinals.count_matching(text);
        let count = if ordinals > 0 {
            ordinals
        } else {
            let sentences = text.split('.').filter(|s| !s.trim().is_empty()).count();
            sentences.saturating_sub(1).max(1)
        };

        count.min(MAX_EVIDENCE as usize) as u8
    }
}

fn compile_marker(pattern: &str) -> Result<Regex, CoachError> {
    Regex::new(pattern).map_err(|source| CoachError::InvalidPattern {
        category: "citation marker",
        pattern: pattern.to_string(),
        source,
    })
}
