use emcoform_converter::{ConversionParameters, Converter, Dialect, MeasurementSystem};
use proptest::prelude::*;

const FRAGMENTS: &[&str] = &[
    "G0 Z5",
    "G0 Z-1.5",
    "G00 X10 Y10",
    "G1 X1 Y2 F300",
    "G01 Z-2 F80 F90",
    "G2 X10 Y10 I5 J0",
    "G3 X1. Y2. I.5 J-.5",
    "G2 X1 Y1 R2.5",
    "X5 Y5",
    "Z-3",
    "M3 S9000",
    "M6 T2",
    "M06T4",
    "M8",
    "G21",
    "G90 G54",
    "(comment only)",
    "G1 X4 ; trailing comment",
    "%",
    "",
    "N50 G1 X7",
];

fn dialect() -> impl Strategy<Value = Dialect> {
    prop::sample::select(Dialect::ALL.to_vec())
}

fn program() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(FRAGMENTS), 0..40).prop_map(|lines| lines.join("\n"))
}

fn params(step: u32) -> ConversionParameters {
    ConversionParameters::new(1500, 42.5, MeasurementSystem::Metric).with_sequence_step(step)
}

fn sequence_of(block: &str) -> u32 {
    let number = block
        .split_whitespace()
        .next()
        .and_then(|word| word.strip_prefix('N'))
        .unwrap_or_else(|| panic!("block without sequence number: {block}"));
    number.parse().unwrap()
}

proptest! {
    #[test]
    fn sequence_numbers_form_arithmetic_progression(
        dialect in dialect(),
        program in program(),
        step in 1u32..50,
    ) {
        let out = Converter::new(dialect, params(step)).unwrap().convert_str(&program).unwrap();

        for (index, block) in out.iter().enumerate() {
            prop_assert_eq!(sequence_of(block), step * (index as u32 + 1));
        }
    }

    #[test]
    fn output_is_framed(dialect in dialect(), program in program()) {
        let out = Converter::new(dialect, params(10)).unwrap().convert_str(&program).unwrap();

        prop_assert!(out.len() >= 5);
        prop_assert!(out[0].ends_with(" G90"));
        prop_assert!(out[1].ends_with(" G71"));
        prop_assert!(out[2].ends_with(" M03 S1500"));
        prop_assert!(out[out.len() - 2].ends_with(" M05"));
        prop_assert!(out[out.len() - 1].ends_with(" M30"));
    }

    #[test]
    fn feed_override_is_total(dialect in dialect(), program in program()) {
        let out = Converter::new(dialect, params(10)).unwrap().convert_str(&program).unwrap();

        for block in &out {
            let feeds: Vec<&str> = block
                .split_whitespace()
                .filter(|word| word.starts_with('F'))
                .collect();
            prop_assert!(feeds.len() <= 1, "{}", block);
            if let Some(feed) = feeds.first() {
                prop_assert_eq!(*feed, "F42.5");
            }
        }
    }

    #[test]
    fn blocks_are_never_empty(dialect in dialect(), program in program()) {
        let out = Converter::new(dialect, params(10)).unwrap().convert_str(&program).unwrap();

        for block in &out {
            prop_assert!(block.split_whitespace().count() >= 2, "{}", block);
        }
    }
}

#[test]
fn test_empty_program_yields_five_blocks() {
    for dialect in Dialect::ALL {
        let out = Converter::new(dialect, params(10))
            .unwrap()
            .convert_str("")
            .unwrap();
        assert_eq!(out.len(), 5);
    }
}
