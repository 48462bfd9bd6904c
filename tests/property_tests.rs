//! Property tests for conflict resolution, numbering and substitution

use czanon::anonymization::models::{DetectionMethod, SourcePriority};
use czanon::anonymization::{
    AnonymizationConfig, AnonymizationEngine, AnonymizationLevel, ConflictResolver,
    MappingRegistry, PiiCategory, Span, SubstitutionEngine,
};
use proptest::prelude::*;

const PRIORITIES: [SourcePriority; 4] = [
    SourcePriority::Heuristic,
    SourcePriority::NameSingle,
    SourcePriority::NameGroup,
    SourcePriority::Pattern,
];

fn category() -> impl Strategy<Value = PiiCategory> {
    prop::sample::select(PiiCategory::ALL.to_vec())
}

fn priority() -> impl Strategy<Value = SourcePriority> {
    prop::sample::select(PRIORITIES.to_vec())
}

/// A document plus candidate spans on it, in arbitrary order
fn document_with_candidates() -> impl Strategy<Value = (String, Vec<Span>)> {
    "[a-z0-9 ]{1,120}".prop_flat_map(|text| {
        let len = text.len();
        let candidate = (0..len, 1..=16usize, category(), priority());
        (Just(text), prop::collection::vec(candidate, 0..24)).prop_map(|(text, raw)| {
            let spans = raw
                .into_iter()
                .filter_map(|(start, width, category, priority)| {
                    let end = (start + width).min(text.len());
                    Span::from_document(
                        &text,
                        category,
                        start,
                        end,
                        priority,
                        DetectionMethod::Regex,
                    )
                })
                .collect();
            (text, spans)
        })
    })
}

fn span(category: PiiCategory, text: &str, start: usize, end: usize) -> Span {
    Span::from_document(
        text,
        category,
        start,
        end,
        SourcePriority::Pattern,
        DetectionMethod::Regex,
    )
    .unwrap()
}

proptest! {
    #[test]
    fn resolved_spans_never_overlap((_text, candidates) in document_with_candidates()) {
        let resolved = ConflictResolver::new().resolve(candidates);
        for pair in resolved.as_slice().windows(2) {
            prop_assert!(
                pair[0].end <= pair[1].start,
                "overlap: {:?} / {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn resolution_ignores_input_order((_text, candidates) in document_with_candidates()) {
        let resolver = ConflictResolver::new();
        let mut reversed = candidates.clone();
        reversed.reverse();

        let forward: Vec<(usize, usize)> =
            resolver.resolve(candidates).iter().map(|s| (s.start, s.end)).collect();
        let backward: Vec<(usize, usize)> =
            resolver.resolve(reversed).iter().map(|s| (s.start, s.end)).collect();
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn substitution_length_matches_spans((text, candidates) in document_with_candidates()) {
        let resolved = ConflictResolver::new().resolve(candidates);
        let mut registry = MappingRegistry::new();
        let output = SubstitutionEngine::new().apply(&text, &resolved, &mut registry);

        let removed: usize = resolved.iter().map(Span::len).sum();
        let inserted: usize = resolved
            .iter()
            .map(|s| registry.lookup(s.category, &s.text).map_or(0, |p| p.to_string().len()))
            .sum();
        prop_assert_eq!(output.len(), text.len() - removed + inserted);
    }

    #[test]
    fn longest_match_wins_at_same_start(
        (text, start, short, long) in "[a-z ]{20,60}".prop_flat_map(|text| {
            let len = text.len();
            (Just(text), 0..len / 2, 1..5usize, 5..10usize)
        }),
        shorter_first in any::<bool>(),
    ) {
        let a = span(PiiCategory::Person, &text, start, start + short);
        let b = span(PiiCategory::Email, &text, start, start + long);
        let candidates = if shorter_first { vec![a, b] } else { vec![b, a] };

        let resolved = ConflictResolver::new().resolve(candidates);
        prop_assert_eq!(resolved.len(), 1);
        prop_assert_eq!(resolved.as_slice()[0].end, start + long);
    }

    #[test]
    fn identifier_beats_person_on_tie(
        identifier in prop::sample::select(vec![
            PiiCategory::BirthId,
            PiiCategory::IdCard,
            PiiCategory::Bank,
            PiiCategory::Phone,
            PiiCategory::Email,
        ]),
        person_first in any::<bool>(),
    ) {
        let text = "Novák 850315";
        let person = span(PiiCategory::Person, text, 0, 6);
        let other = span(identifier, text, 0, 6);
        let candidates = if person_first { vec![person, other] } else { vec![other, person] };

        let resolved = ConflictResolver::new().resolve(candidates);
        prop_assert_eq!(resolved.len(), 1);
        prop_assert_eq!(resolved.as_slice()[0].category, identifier);
    }

    #[test]
    fn numbering_is_idempotent(
        category in category(),
        value in "[A-Za-zá-ž]{1,12}( [A-Za-zá-ž]{1,12})?",
        others in prop::collection::vec("[a-z]{1,8}", 0..5),
    ) {
        let mut registry = MappingRegistry::new();
        let first = registry.register(category, &value);
        for other in &others {
            registry.register(category, other);
        }
        let again = registry.register(category, &value);
        let padded = registry.register(category, &format!("  {value} "));

        prop_assert_eq!(first, again);
        prop_assert_eq!(first, padded);
        prop_assert_eq!(
            registry.originals(&first).map(|o| o.iter().filter(|v| **v == value).count()),
            Some(1)
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn engine_output_is_well_formed(text in "\\PC{0,200}") {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let config = AnonymizationConfig {
            level: AnonymizationLevel::Full,
            ..Default::default()
        };
        let engine = AnonymizationEngine::new(config).unwrap();

        let result = runtime.block_on(engine.anonymize_document("prop", &text)).unwrap();
        for span in &result.spans {
            prop_assert!(span.is_well_formed(&text), "{:?}", span);
        }
        for pair in result.spans.windows(2) {
            prop_assert!(pair[0].end <= pair[1].start);
        }
        if result.spans.is_empty() {
            prop_assert_eq!(&result.anonymized_text, &text);
        }
    }
}
