use serde::Serialize;

use super::model::{Passenger, View};

// ---------------------------------------------------------------------------
// Correlation features
// ---------------------------------------------------------------------------

/// Numeric columns that enter the correlation matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Feature {
    Survived,
    Pclass,
    Age,
    Fare,
    #[serde(rename = "Family Size")]
    FamilySize,
}

impl Feature {
    pub const ALL: [Feature; 5] = [
        Feature::Survived,
        Feature::Pclass,
        Feature::Age,
        Feature::Fare,
        Feature::FamilySize,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Feature::Survived => "Survived",
            Feature::Pclass => "Pclass",
            Feature::Age => "Age",
            Feature::Fare => "Fare",
            Feature::FamilySize => "Family Size",
        }
    }

    /// The passenger's value for this feature; `None` when missing.
    pub fn value(self, p: &Passenger) -> Option<f64> {
        match self {
            Feature::Survived => Some(if p.survived { 1.0 } else { 0.0 }),
            Feature::Pclass => Some(f64::from(p.pclass.number())),
            Feature::Age => p.age,
            Feature::Fare => p.fare,
            Feature::FamilySize => Some(f64::from(p.family_size())),
        }
    }
}

/// Pairwise Pearson correlation of [`Feature::ALL`].
///
/// Missing values are dropped per pair: each cell uses only the rows where
/// both features are present. A cell is `None` when fewer than two such rows
/// exist or either side is constant over them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    features: [Feature; 5],
    values: [[Option<f64>; 5]; 5],
}

impl CorrelationMatrix {
    pub fn compute(view: &View) -> Self {
        let columns: Vec<Vec<Option<f64>>> = Feature::ALL
            .iter()
            .map(|f| view.iter().map(|p| f.value(p)).collect())
            .collect();

        let mut values = [[None; 5]; 5];
        for i in 0..Feature::ALL.len() {
            for j in i..Feature::ALL.len() {
                let r = pearson(&columns[i], &columns[j]);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        CorrelationMatrix {
            features: Feature::ALL,
            values,
        }
    }

    pub fn features(&self) -> &[Feature; 5] {
        &self.features
    }

    pub fn get(&self, a: Feature, b: Feature) -> Option<f64> {
        let i = self.features.iter().position(|&f| f == a)?;
        let j = self.features.iter().position(|&f| f == b)?;
        self.values[i][j]
    }
}

/// Pearson r over the positions where both `x` and `y` are present.
fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    // Constant columns have no variance.
    let (x0, y0) = pairs[0];
    if pairs.iter().all(|&(a, _)| a == x0) || pairs.iter().all(|&(_, b)| b == y0) {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    // Identical columns (the diagonal) are exactly 1.
    if x == y {
        return Some(1.0);
    }
    let r = sxy / (sxx * syy).sqrt();
    // Sums of squares can overflow for extreme values.
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

// ---------------------------------------------------------------------------
// Summary – KPIs over a view
// ---------------------------------------------------------------------------

/// KPIs for the current view.
///
/// Statistics that are undefined for the view are `None` rather than NaN:
/// `survival_rate` when the view is empty, `average_age` when no row has an
/// age.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_count: usize,
    pub total_survived: usize,
    /// Percentage of survivors, `0..=100`.
    pub survival_rate: Option<f64>,
    /// Sum of the fares that are present.
    pub total_fare: f64,
    pub average_age: Option<f64>,
    pub correlation: CorrelationMatrix,
}

pub fn summarize(view: &View) -> Summary {
    let total_count = view.len();
    let total_survived = view.iter().filter(|p| p.survived).count();
    let survival_rate = (total_count > 0)
        .then(|| total_survived as f64 / total_count as f64 * 100.0);

    let total_fare = view.iter().filter_map(|p| p.fare).sum();

    // Missing ages are ignored, not counted as zero.
    let (age_sum, age_n) = view
        .iter()
        .filter_map(|p| p.age)
        .fold((0.0, 0usize), |(sum, n), age| (sum + age, n + 1));
    let average_age = (age_n > 0).then(|| age_sum / age_n as f64);

    Summary {
        total_count,
        total_survived,
        survival_rate,
        total_fare,
        average_age,
        correlation: CorrelationMatrix::compute(view),
    }
}

const UNDEFINED: &str = "n/a";

impl Summary {
    pub fn total_fare_thousands(&self) -> f64 {
        self.total_fare / 1000.0
    }

    pub fn survival_rate_label(&self) -> String {
        self.survival_rate
            .map(|r| format!("{r:.2}%"))
            .unwrap_or_else(|| UNDEFINED.to_string())
    }

    pub fn total_fare_label(&self) -> String {
        format!("$ {:.2}K", self.total_fare_thousands())
    }

    pub fn average_age_label(&self) -> String {
        self.average_age
            .map(|a| format!("{a:.2}"))
            .unwrap_or_else(|| UNDEFINED.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::data::filter::{filter, FilterSelection};
    use crate::data::model::tests::record;
    use crate::data::model::{Dataset, Passenger, PassengerRecord, Pclass, Port, Sex, Survival};

    fn dataset(rows: Vec<PassengerRecord>) -> Arc<Dataset> {
        Arc::new(Dataset::new(
            rows.into_iter().map(Passenger::new).collect(),
            "test",
        ))
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn three_row_scenario() {
        let ds = dataset(vec![
            record(Pclass::First, Sex::Male, Port::Southampton, false),
            record(Pclass::Third, Sex::Female, Port::Cherbourg, true),
            record(Pclass::Second, Sex::Female, Port::Queenstown, true),
        ]);
        let sel = FilterSelection::new(
            [Survival::Survived],
            [Pclass::Second, Pclass::Third],
            [Sex::Female],
            Port::ALL,
        );
        let s = summarize(&filter(&ds, &sel));
        assert_eq!(s.total_count, 2);
        assert_eq!(s.total_survived, 2);
        assert_eq!(s.survival_rate, Some(100.0));
        assert_eq!(s.survival_rate_label(), "100.00%");
    }

    #[test]
    fn empty_view_flags_undefined_statistics() {
        let ds = dataset(vec![record(Pclass::First, Sex::Male, Port::Southampton, true)]);
        let mut sel = FilterSelection::all();
        sel.sex.clear();
        let s = summarize(&filter(&ds, &sel));
        assert_eq!(s.total_count, 0);
        assert_eq!(s.total_survived, 0);
        assert_eq!(s.survival_rate, None);
        assert_eq!(s.average_age, None);
        assert_eq!(s.total_fare, 0.0);
        assert_eq!(s.survival_rate_label(), "n/a");
        assert_eq!(s.average_age_label(), "n/a");
        for a in Feature::ALL {
            for b in Feature::ALL {
                assert_eq!(s.correlation.get(a, b), None);
            }
        }
    }

    #[test]
    fn average_age_ignores_missing_values() {
        let ds = dataset(vec![
            PassengerRecord { age: Some(20.0), ..record(Pclass::First, Sex::Male, Port::Southampton, true) },
            PassengerRecord { age: None, ..record(Pclass::First, Sex::Male, Port::Southampton, true) },
            PassengerRecord { age: Some(40.0), ..record(Pclass::First, Sex::Male, Port::Southampton, false) },
        ]);
        let s = summarize(&View::full(ds));
        assert_eq!(s.average_age, Some(30.0));
        assert_eq!(s.total_survived, 2);
        assert!(approx(s.survival_rate.unwrap(), 200.0 / 3.0));
    }

    #[test]
    fn average_age_undefined_when_no_ages_present() {
        let ds = dataset(vec![PassengerRecord {
            age: None,
            ..record(Pclass::Second, Sex::Female, Port::Cherbourg, true)
        }]);
        let s = summarize(&View::full(ds));
        assert_eq!(s.survival_rate, Some(100.0));
        assert_eq!(s.average_age, None);
    }

    #[test]
    fn total_fare_skips_missing_and_reports_thousands() {
        let ds = dataset(vec![
            PassengerRecord { fare: Some(1500.0), ..record(Pclass::First, Sex::Male, Port::Southampton, true) },
            PassengerRecord { fare: None, ..record(Pclass::First, Sex::Male, Port::Southampton, true) },
            PassengerRecord { fare: Some(250.5), ..record(Pclass::First, Sex::Male, Port::Southampton, true) },
        ]);
        let s = summarize(&View::full(ds));
        assert!(approx(s.total_fare, 1750.5));
        assert_eq!(s.total_fare_label(), "$ 1.75K");
    }

    #[test]
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        let rows = (0..12)
            .map(|i| {
                let pclass = Pclass::ALL[i % 3];
                PassengerRecord {
                    age: if i % 4 == 0 { None } else { Some(5.0 + 3.0 * i as f64) },
                    fare: Some(100.0 / (1.0 + (i % 3) as f64) + i as f64),
                    sib_sp: (i % 2) as u16,
                    parch: (i % 5) as u16,
                    ..record(pclass, Sex::Female, Port::Southampton, i % 3 != 2)
                }
            })
            .collect();
        let m = CorrelationMatrix::compute(&View::full(dataset(rows)));

        for a in Feature::ALL {
            assert_eq!(m.get(a, a), Some(1.0), "{a:?}");
            for b in Feature::ALL {
                assert_eq!(m.get(a, b), m.get(b, a));
                if let Some(r) = m.get(a, b) {
                    assert!((-1.0..=1.0).contains(&r));
                }
            }
        }
    }

    #[test]
    fn perfectly_anticorrelated_columns() {
        // First class always survives, third class never does.
        let ds = dataset(vec![
            record(Pclass::First, Sex::Male, Port::Southampton, true),
            record(Pclass::Third, Sex::Male, Port::Southampton, false),
            record(Pclass::First, Sex::Female, Port::Cherbourg, true),
            record(Pclass::Third, Sex::Female, Port::Cherbourg, false),
        ]);
        let m = CorrelationMatrix::compute(&View::full(ds));
        assert!(approx(m.get(Feature::Survived, Feature::Pclass).unwrap(), -1.0));
    }

    #[test]
    fn constant_feature_has_undefined_correlation() {
        let ds = dataset(vec![
            record(Pclass::First, Sex::Male, Port::Southampton, true),
            record(Pclass::First, Sex::Male, Port::Southampton, false),
        ]);
        let m = CorrelationMatrix::compute(&View::full(ds));
        // Everyone travels first class with the same family size.
        assert_eq!(m.get(Feature::Pclass, Feature::Pclass), None);
        assert_eq!(m.get(Feature::Pclass, Feature::Survived), None);
        assert_eq!(m.get(Feature::FamilySize, Feature::FamilySize), None);
        assert_eq!(m.get(Feature::Survived, Feature::Survived), Some(1.0));
    }

    #[test]
    fn correlation_uses_pairwise_complete_rows() {
        let x = [Some(1.0), Some(2.0), None, Some(3.0)];
        let y = [Some(2.0), Some(4.0), Some(100.0), Some(6.0)];
        assert!(approx(pearson(&x, &y).unwrap(), 1.0));
        assert_eq!(pearson(&[Some(1.0), None], &[None, Some(1.0)]), None);
    }

    #[test]
    fn overflowing_sums_give_undefined_correlation() {
        let x = [Some(1e200), Some(-1e200), Some(0.0)];
        let y = [Some(2e200), Some(-2e200), Some(0.0)];
        assert_eq!(pearson(&x, &y), None);
        assert_eq!(pearson(&x, &x), Some(1.0));
    }

    #[test]
    fn summary_serializes_undefined_as_null() {
        let ds = dataset(vec![]);
        let json = serde_json::to_value(summarize(&View::full(ds))).unwrap();
        assert!(json["survival_rate"].is_null());
        assert!(json["average_age"].is_null());
        assert_eq!(json["correlation"]["features"][4], "Family Size");
    }
}
