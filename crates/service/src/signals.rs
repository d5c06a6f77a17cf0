//! Keyword classification of free-text chat context into [`ContextSignal`]s.
//!
//! Rules are case-insensitive regexes matched per sentence. Brand
//! sentiment needs the brand names, which come from the loaded catalogue.

use regex::{Regex, RegexBuilder};
use stride_matching::{
    Climate, ContextSignal, ExplicitRequest, FitIssue, Injury, Sentiment,
};

const RULES: &[(&str, ContextSignal)] = &[
    (r"\bachilles\b", ContextSignal::Injury { injury: Injury::Achilles }),
    (r"\bknees?\b", ContextSignal::Injury { injury: Injury::Knee }),
    (r"\bshins?\b|\bshin splints\b", ContextSignal::Injury { injury: Injury::Shin }),
    (
        r"\bplantar\b|\bfasciitis\b|\bheel pain\b",
        ContextSignal::Injury { injury: Injury::PlantarFascia },
    ),
    (
        r"\btoes? (?:feel |get |are )?(?:cramped|squashed|squished|crushed)\b|\btoe ?box\b.*\b(?:tight|narrow|small|cramped)\b",
        ContextSignal::Fit { issue: FitIssue::TightToeBox },
    ),
    (
        r"\bwide (?:feet|foot|fit)\b|\bbroad feet\b|\bneeds? (?:a )?wide\b",
        ContextSignal::Fit { issue: FitIssue::WideFeet },
    ),
    (
        r"\bheel (?:slip|slips|slipping|lift|lifts|lifting)\b",
        ContextSignal::Fit { issue: FitIssue::HeelSlip },
    ),
    (
        r"\brain(?:y|s)?\b|\bwet\b|\bpuddles?\b",
        ContextSignal::Climate { climate: Climate::Wet },
    ),
    (
        r"\bhot\b|\bheat\b|\bhumid(?:ity)?\b",
        ContextSignal::Climate { climate: Climate::Hot },
    ),
    (
        r"\bcold\b|\bwinter\b|\bsnow(?:y)?\b|\bicy\b",
        ContextSignal::Climate { climate: Climate::Cold },
    ),
    (
        r"\blighter\b|\bless heavy\b",
        ContextSignal::Request { request: ExplicitRequest::Lighter },
    ),
    (
        r"\bsofter\b|\bmore cushion(?:ing|ed)?\b|\bplusher\b",
        ContextSignal::Request { request: ExplicitRequest::Softer },
    ),
    (
        r"\bmore stable\b|\bmore support(?:ive)?\b",
        ContextSignal::Request { request: ExplicitRequest::MoreStable },
    ),
    (
        r"\bbouncier\b|\bmore (?:bounce|pop|energy return)\b",
        ContextSignal::Request { request: ExplicitRequest::Bouncier },
    ),
    (
        r"\blower drop\b|\blow drop\b|\bzero drop\b",
        ContextSignal::Request { request: ExplicitRequest::LowerDrop },
    ),
    (
        r"\bcheaper\b|\bbudget\b|\bless expensive\b|\baffordable\b",
        ContextSignal::Request { request: ExplicitRequest::Cheaper },
    ),
];

const POSITIVE: &str =
    r"\b(?:love[ds]?|loving|liked?|enjoy(?:ed)?|great|favou?rite|perfect|comfortable)\b";
const NEGATIVE: &str = r"\b(?:hate[ds]?|disliked?|didn'?t like|hurt|pain(?:ful)?|blisters?|uncomfortable|never again|awful|terrible)\b";

/// Compiled keyword rules.
#[derive(Debug, Clone)]
pub struct SignalClassifier {
    rules: Vec<(Regex, ContextSignal)>,
    positive: Regex,
    negative: Regex,
}

fn compile(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

impl SignalClassifier {
    pub fn new() -> Result<Self, regex::Error> {
        let rules = RULES
            .iter()
            .map(|(pattern, signal)| Ok((compile(pattern)?, signal.clone())))
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self {
            rules,
            positive: compile(POSITIVE)?,
            negative: compile(NEGATIVE)?,
        })
    }

    /// Classifies `text` into de-duplicated signals in first-seen order.
    ///
    /// A brand mention yields a past-shoe signal only when its sentence
    /// leans clearly one way.
    pub fn classify(&self, text: &str, brands: &[String]) -> Vec<ContextSignal> {
        let brand_patterns: Vec<(&String, Regex)> = brands
            .iter()
            .filter_map(|brand| {
                compile(&format!(r"\b{}\b", regex::escape(brand)))
                    .map_err(|e| {
                        tracing::debug!(target: "stride::signals", brand = %brand, error = %e, "Skipping brand pattern");
                    })
                    .ok()
                    .map(|re| (brand, re))
            })
            .collect();

        let mut signals = Vec::new();
        for sentence in sentences(text) {
            for (regex, signal) in &self.rules {
                if regex.is_match(sentence) {
                    push_unique(&mut signals, signal.clone());
                }
            }
            for (brand, pattern) in &brand_patterns {
                if let Some(sentiment) = self.brand_sentiment(sentence, pattern) {
                    push_unique(
                        &mut signals,
                        ContextSignal::PastShoe {
                            brand: (*brand).clone(),
                            sentiment,
                        },
                    );
                }
            }
        }
        tracing::debug!(target: "stride::signals", count = signals.len(), "Classified chat context");
        signals
    }

    fn brand_sentiment(&self, sentence: &str, brand: &Regex) -> Option<Sentiment> {
        if !brand.is_match(sentence) {
            return None;
        }
        match (self.positive.is_match(sentence), self.negative.is_match(sentence)) {
            (true, false) => Some(Sentiment::Positive),
            (false, true) => Some(Sentiment::Negative),
            _ => None,
        }
    }
}

fn sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split(['.', '!', '?', '\n', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Appends `signal` unless an equal one is already present.
pub fn push_unique(signals: &mut Vec<ContextSignal>, signal: ContextSignal) {
    if !signals.contains(&signal) {
        signals.push(signal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Vec<ContextSignal> {
        let brands = vec!["Hoka".to_string(), "New Balance".to_string()];
        SignalClassifier::new().unwrap().classify(text, &brands)
    }

    #[test]
    fn test_injury_and_climate_keywords() {
        let signals = classify("My Achilles has been sore. I mostly run in the rain.");
        assert_eq!(
            signals,
            vec![
                ContextSignal::Injury {
                    injury: Injury::Achilles
                },
                ContextSignal::Climate {
                    climate: Climate::Wet
                },
            ]
        );
    }

    #[test]
    fn test_fit_and_requests() {
        let signals = classify("My toes feel cramped and I want something lighter and cheaper");
        assert!(signals.contains(&ContextSignal::Fit {
            issue: FitIssue::TightToeBox
        }));
        assert!(signals.contains(&ContextSignal::Request {
            request: ExplicitRequest::Lighter
        }));
        assert!(signals.contains(&ContextSignal::Request {
            request: ExplicitRequest::Cheaper
        }));
    }

    #[test]
    fn test_words_inside_other_words_do_not_match() {
        assert!(classify("I train in Shropshire and like hotdogs").is_empty());
    }

    #[test]
    fn test_brand_names_match_literally() {
        let classifier = SignalClassifier::new().unwrap();
        let brands = vec!["A*Run".to_string()];
        assert!(classifier.classify("I loved my AAARun trainers.", &brands).is_empty());
        assert_eq!(
            classifier.classify("I loved my A*Run trainers.", &brands),
            vec![ContextSignal::PastShoe {
                brand: "A*Run".into(),
                sentiment: Sentiment::Positive
            }]
        );
    }

    #[test]
    fn test_brand_sentiment_per_sentence() {
        let signals = classify("I loved my Hoka. The New Balance gave me blisters.");
        assert_eq!(
            signals,
            vec![
                ContextSignal::PastShoe {
                    brand: "Hoka".into(),
                    sentiment: Sentiment::Positive
                },
                ContextSignal::PastShoe {
                    brand: "New Balance".into(),
                    sentiment: Sentiment::Negative
                },
            ]
        );
    }

    #[test]
    fn test_mixed_brand_sentence_is_ignored() {
        let signals = classify("I liked the hoka but it hurt");
        assert!(signals
            .iter()
            .all(|s| !matches!(s, ContextSignal::PastShoe { .. })));
    }

    #[test]
    fn test_duplicates_are_collapsed() {
        let signals = classify("Knee pain. More knee pain!");
        let knees = signals
            .iter()
            .filter(|s| {
                **s == ContextSignal::Injury {
                    injury: Injury::Knee,
                }
            })
            .count();
        assert_eq!(knees, 1);
    }
}
