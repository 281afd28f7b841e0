//! Aggregates behind the dashboard charts. Each one is a single pass over the
//! view; the correlation heatmap reuses [`super::summary::CorrelationMatrix`].

use std::collections::BTreeMap;

use super::model::{Pclass, Port, Sex, Survival, View};

/// Width of one age histogram bin, in years.
pub const AGE_BIN_WIDTH: f64 = 5.0;

/// Number of age bins. The last bin is open-ended.
pub const MAX_AGE_BINS: usize = 24;

/// Passenger counts in fixed-width age bins, one series per sex.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AgeHistogram {
    pub bin_width: f64,
    /// Bin `i` covers `[i * bin_width, (i + 1) * bin_width)`; the last of
    /// [`MAX_AGE_BINS`] bins also holds every older age.
    pub counts: BTreeMap<Sex, Vec<usize>>,
}

impl AgeHistogram {
    fn from_view(view: &View) -> Self {
        let max_age = view
            .iter()
            .filter_map(|p| p.age)
            .fold(None, |acc: Option<f64>, a| Some(acc.map_or(a, |m| m.max(a))));
        let Some(max_age) = max_age else {
            return AgeHistogram {
                bin_width: AGE_BIN_WIDTH,
                counts: BTreeMap::new(),
            };
        };

        let n_bins = bin_index(max_age) + 1;
        let mut counts: BTreeMap<Sex, Vec<usize>> = BTreeMap::new();
        for p in view.iter() {
            if let Some(age) = p.age {
                counts.entry(p.sex).or_insert_with(|| vec![0; n_bins])[bin_index(age)] += 1;
            }
        }
        AgeHistogram {
            bin_width: AGE_BIN_WIDTH,
            counts,
        }
    }

    /// Lower edge of bin `i`.
    pub fn bin_start(&self, i: usize) -> f64 {
        i as f64 * self.bin_width
    }
}

fn bin_index(age: f64) -> usize {
    let bin = (age.max(0.0) / AGE_BIN_WIDTH).floor();
    if bin >= (MAX_AGE_BINS - 1) as f64 {
        MAX_AGE_BINS - 1
    } else {
        bin as usize
    }
}

/// Five-number summary of one group of values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStats {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl BoxStats {
    fn from_values(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);
        Some(BoxStats {
            count: values.len(),
            min: values[0],
            q1: quantile(&values, 0.25),
            median: quantile(&values, 0.5),
            q3: quantile(&values, 0.75),
            max: values[values.len() - 1],
        })
    }
}

/// Linear-interpolated quantile of sorted, non-empty data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// One box per group; groups without a single value are left out.
fn boxes<K: Ord>(groups: BTreeMap<K, Vec<f64>>) -> Vec<(K, BoxStats)> {
    groups
        .into_iter()
        .filter_map(|(key, values)| BoxStats::from_values(values).map(|b| (key, b)))
        .collect()
}

/// Everything the charts need for one view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartData {
    /// Passengers per class and outcome.
    pub survival_by_class: Vec<(Pclass, Survival, usize)>,
    pub age_by_sex: AgeHistogram,
    /// Age box per sex, drawn in the margin of the histogram.
    pub age_box_by_sex: Vec<(Sex, BoxStats)>,
    /// Number of survivors per sex.
    pub survivors_by_sex: Vec<(Sex, usize)>,
    pub fare_by_survival: Vec<(Survival, BoxStats)>,
    /// Passengers per port, in `C, Q, S` order.
    pub passengers_by_port: Vec<(Port, usize)>,
}

impl ChartData {
    pub fn from_view(view: &View) -> Self {
        let mut by_class: BTreeMap<(Pclass, Survival), usize> = BTreeMap::new();
        let mut survivors: BTreeMap<Sex, usize> = BTreeMap::new();
        let mut ages: BTreeMap<Sex, Vec<f64>> = BTreeMap::new();
        let mut fares: BTreeMap<Survival, Vec<f64>> = BTreeMap::new();
        let mut ports: BTreeMap<Port, usize> = BTreeMap::new();

        for p in view.iter() {
            *by_class.entry((p.pclass, p.survival())).or_default() += 1;
            *survivors.entry(p.sex).or_default() += usize::from(p.survived);
            if let Some(age) = p.age {
                ages.entry(p.sex).or_default().push(age);
            }
            if let Some(fare) = p.fare {
                fares.entry(p.survival()).or_default().push(fare);
            }
            if let Some(port) = p.embarked {
                *ports.entry(port).or_default() += 1;
            }
        }

        ChartData {
            survival_by_class: by_class
                .into_iter()
                .map(|((pclass, survival), n)| (pclass, survival, n))
                .collect(),
            age_by_sex: AgeHistogram::from_view(view),
            age_box_by_sex: boxes(ages),
            survivors_by_sex: survivors.into_iter().collect(),
            fare_by_survival: boxes(fares),
            passengers_by_port: ports.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::data::model::tests::record;
    use crate::data::model::{Dataset, Passenger, PassengerRecord};

    fn view(rows: Vec<PassengerRecord>) -> View {
        View::full(Arc::new(Dataset::new(
            rows.into_iter().map(Passenger::new).collect(),
            "test",
        )))
    }

    #[test]
    fn counts_per_class_sex_and_port() {
        let v = view(vec![
            record(Pclass::First, Sex::Female, Port::Cherbourg, true),
            record(Pclass::First, Sex::Male, Port::Southampton, false),
            record(Pclass::Third, Sex::Male, Port::Southampton, true),
            record(Pclass::Third, Sex::Male, Port::Southampton, false),
            record(Pclass::Third, Sex::Male, Port::Queenstown, false),
        ]);
        let c = ChartData::from_view(&v);
        assert_eq!(
            c.survival_by_class,
            vec![
                (Pclass::First, Survival::DidNotSurvive, 1),
                (Pclass::First, Survival::Survived, 1),
                (Pclass::Third, Survival::DidNotSurvive, 2),
                (Pclass::Third, Survival::Survived, 1),
            ]
        );
        assert_eq!(c.survivors_by_sex, vec![(Sex::Male, 1), (Sex::Female, 1)]);
        assert_eq!(
            c.passengers_by_port,
            vec![(Port::Cherbourg, 1), (Port::Queenstown, 1), (Port::Southampton, 3)]
        );
    }

    #[test]
    fn age_histogram_bins_by_sex() {
        let base = record(Pclass::Second, Sex::Male, Port::Southampton, true);
        let v = view(vec![
            PassengerRecord { age: Some(0.42), ..base.clone() },
            PassengerRecord { age: Some(4.99), ..base.clone() },
            PassengerRecord { age: Some(22.0), ..base.clone() },
            PassengerRecord { age: None, ..base.clone() },
            PassengerRecord { age: Some(5.0), sex: Sex::Female, ..base },
        ]);
        let h = ChartData::from_view(&v).age_by_sex;
        assert_eq!(h.counts[&Sex::Male], vec![2, 0, 0, 0, 1]);
        assert_eq!(h.counts[&Sex::Female], vec![0, 1, 0, 0, 0]);
        assert_eq!(h.bin_start(4), 20.0);
    }

    #[test]
    fn fare_boxes_use_interpolated_quartiles() {
        let base = record(Pclass::First, Sex::Female, Port::Cherbourg, true);
        let v = view(
            [1.0, 2.0, 3.0, 4.0, 5.0]
                .into_iter()
                .map(|f| PassengerRecord { fare: Some(f), ..base.clone() })
                .collect(),
        );
        let c = ChartData::from_view(&v);
        assert_eq!(c.fare_by_survival.len(), 1);
        let (survival, b) = c.fare_by_survival[0];
        assert_eq!(survival, Survival::Survived);
        assert_eq!(b.count, 5);
        assert_eq!((b.min, b.q1, b.median, b.q3, b.max), (1.0, 2.0, 3.0, 4.0, 5.0));
        assert_eq!(quantile(&[1.0, 2.0], 0.5), 1.5);
    }

    #[test]
    fn age_boxes_per_sex_skip_missing_ages() {
        let base = record(Pclass::Second, Sex::Male, Port::Southampton, true);
        let v = view(vec![
            PassengerRecord { age: Some(10.0), ..base.clone() },
            PassengerRecord { age: Some(30.0), ..base.clone() },
            PassengerRecord { age: None, ..base.clone() },
            PassengerRecord { age: None, sex: Sex::Female, ..base },
        ]);
        let c = ChartData::from_view(&v);
        assert_eq!(c.age_box_by_sex.len(), 1);
        let (sex, b) = c.age_box_by_sex[0];
        assert_eq!(sex, Sex::Male);
        assert_eq!((b.count, b.min, b.median, b.max), (2, 10.0, 20.0, 30.0));
    }

    #[test]
    fn extreme_ages_land_in_the_last_bin() {
        let base = record(Pclass::First, Sex::Female, Port::Cherbourg, true);
        let v = view(vec![
            PassengerRecord { age: Some(3.0), ..base.clone() },
            PassengerRecord { age: Some(1e10), ..base.clone() },
            PassengerRecord { age: Some(f64::INFINITY), ..base },
        ]);
        let h = ChartData::from_view(&v).age_by_sex;
        let counts = &h.counts[&Sex::Female];
        assert_eq!(counts.len(), MAX_AGE_BINS);
        assert_eq!(counts[0], 1);
        assert_eq!(counts[MAX_AGE_BINS - 1], 2);
    }

    #[test]
    fn empty_view_yields_empty_charts() {
        let c = ChartData::from_view(&view(vec![]));
        assert!(c.survival_by_class.is_empty());
        assert!(c.age_by_sex.counts.is_empty());
        assert!(c.age_box_by_sex.is_empty());
        assert!(c.fare_by_survival.is_empty());
        assert!(c.passengers_by_port.is_empty());
    }
}
