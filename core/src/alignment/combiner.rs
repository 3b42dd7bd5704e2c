//! Stitches per-paragraph alignments into one document-level alignment.

use super::Alignment;

/// Concatenate alignments in paragraph order, shifting every timestamp of
/// alignment `k` by the running sum of the previous alignments' last
/// character end times.
///
/// The last-character end time stands in for the paragraph's audio
/// duration. Vendor audio may carry trailing silence past the last
/// character; that padding is not reflected in the offset, so offsets can
/// drift slightly behind the concatenated audio. Offsets accumulate
/// monotonically and the result upholds the `Alignment` invariants.
pub fn combine(alignments: &[Alignment]) -> Alignment {
    let total: usize = alignments.iter().map(Alignment::len).sum();
    let mut out = Alignment {
        chars: Vec::with_capacity(total),
        start_times: Vec::with_capacity(total),
        end_times: Vec::with_capacity(total),
    };
    let mut offset = 0.0_f64;
    for alignment in alignments {
        out.chars.extend_from_slice(&alignment.chars);
        out.start_times
            .extend(alignment.start_times.iter().map(|t| t + offset));
        out.end_times
            .extend(alignment.end_times.iter().map(|t| t + offset));
        offset += alignment.last_end();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Alignment;

    fn alignment(text: &str, step: f64) -> Alignment {
        let chars: Vec<char> = text.chars().collect();
        let start_times: Vec<f64> = (0..chars.len()).map(|i| i as f64 * step).collect();
        let end_times: Vec<f64> = (0..chars.len()).map(|i| (i + 1) as f64 * step).collect();
        Alignment::new(chars, start_times, end_times).unwrap()
    }

    #[test]
    fn test_combine_single_is_identity_with_zero_offset() {
        let a = alignment("Hello world.", 0.05);
        assert_eq!(combine(std::slice::from_ref(&a)), a);
    }

    #[test]
    fn test_combine_empty_is_empty() {
        assert_eq!(combine(&[]), Alignment::default());
    }

    #[test]
    fn test_combine_concatenates_and_offsets_by_last_end() {
        let a1 = alignment("Hello world.", 0.05);
        let a2 = alignment("Goodbye now.", 0.04);
        let combined = combine(&[a1.clone(), a2.clone()]);

        let expected_chars: Vec<char> = a1.chars.iter().chain(a2.chars.iter()).copied().collect();
        assert_eq!(combined.chars, expected_chars);

        let offset = a1.last_end();
        for i in 0..a2.len() {
            let j = a1.len() + i;
            assert!((combined.start_times[j] - (a2.start_times[i] + offset)).abs() < 1e-9);
            assert!((combined.end_times[j] - (a2.end_times[i] + offset)).abs() < 1e-9);
        }
        combined.validate().unwrap();
    }

    #[test]
    fn test_combine_skips_no_offset_for_empty_paragraph() {
        let a1 = alignment("Hi.", 0.1);
        let combined = combine(&[a1.clone(), Alignment::default(), a1.clone()]);
        assert_eq!(combined.len(), a1.len() * 2);
        // Second copy offset only by the first copy's last end.
        let offset = a1.last_end();
        assert!((combined.start_times[a1.len()] - (a1.start_times[0] + offset)).abs() < 1e-9);
        combined.validate().unwrap();
    }

    #[test]
    fn test_combine_offsets_accumulate_monotonically() {
        let parts: Vec<Alignment> = (1..=4).map(|i| alignment("abc def.", 0.01 * i as f64)).collect();
        let combined = combine(&parts);
        combined.validate().unwrap();
        let expected: f64 = parts.iter().map(Alignment::last_end).sum();
        assert!((combined.last_end() - expected).abs() < 1e-9);
    }
}
