//! Choice of the series whose timeline every other series is projected onto.

use serde::{Deserialize, Serialize};

use crate::core::domain::Series;

/// How the alignment reference is picked among a flight's series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferencePolicy {
    /// The densest series.
    Longest,
    /// The series whose sample count is closest to the median sample count.
    #[default]
    MedianClosest,
}

/// Median of the sample counts; the mean of the two middle counts when the
/// number of series is even.
fn median_len(lengths: &[usize]) -> f64 {
    let mut sorted = lengths.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    } else {
        sorted[mid] as f64
    }
}

impl ReferencePolicy {
    /// Index of the reference series, or `None` when there is nothing to
    /// choose from. Ties go to the series encountered first.
    pub fn select(&self, series: &[Series]) -> Option<usize> {
        if series.is_empty() {
            return None;
        }
        let lengths: Vec<usize> = series.iter().map(Series::len).collect();

        match self {
            ReferencePolicy::Longest => {
                let mut best = 0;
                for (idx, &len) in lengths.iter().enumerate() {
                    if len > lengths[best] {
                        best = idx;
                    }
                }
                Some(best)
            }
            ReferencePolicy::MedianClosest => {
                let median = median_len(&lengths);
                let mut best = 0;
                let mut best_distance = f64::INFINITY;
                for (idx, &len) in lengths.iter().enumerate() {
                    let distance = (len as f64 - median).abs();
                    if distance < best_distance {
                        best = idx;
                        best_distance = distance;
                    }
                }
                Some(best)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::SourceId;

    fn series_of_len(name: &str, len: usize) -> Series {
        let ts: Vec<i64> = (0..len as i64).map(|i| i * 1_000).collect();
        Series::new(SourceId::new("topic", name), ts, vec![0.0; len]).unwrap()
    }

    #[test]
    fn test_empty_set_has_no_reference() {
        assert_eq!(ReferencePolicy::MedianClosest.select(&[]), None);
        assert_eq!(ReferencePolicy::Longest.select(&[]), None);
    }

    #[test]
    fn test_median_closest_picks_middle_density() {
        let series = vec![
            series_of_len("a", 100),
            series_of_len("b", 50),
            series_of_len("c", 20),
        ];
        assert_eq!(ReferencePolicy::MedianClosest.select(&series), Some(1));
        assert_eq!(ReferencePolicy::Longest.select(&series), Some(0));
    }

    #[test]
    fn test_median_of_even_count_breaks_ties_by_order() {
        // median = (30 + 50) / 2 = 40, both 30 and 50 are 10 away
        let series = vec![
            series_of_len("a", 50),
            series_of_len("b", 30),
            series_of_len("c", 100),
            series_of_len("d", 20),
        ];
        assert_eq!(ReferencePolicy::MedianClosest.select(&series), Some(0));
    }

    #[test]
    fn test_longest_ties_go_to_first() {
        let series = vec![
            series_of_len("a", 20),
            series_of_len("b", 80),
            series_of_len("c", 80),
        ];
        assert_eq!(ReferencePolicy::Longest.select(&series), Some(1));
    }

    #[test]
    fn test_policy_deserializes_from_snake_case() {
        let policy: ReferencePolicy = serde_json::from_str("\"longest\"").unwrap();
        assert_eq!(policy, ReferencePolicy::Longest);
        assert_eq!(ReferencePolicy::default(), ReferencePolicy::MedianClosest);
    }
}
