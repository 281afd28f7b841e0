use std::collections::BTreeSet;
use std::sync::Arc;

use super::model::{Dataset, Passenger, Pclass, Port, Sex, Survival, View};

// ---------------------------------------------------------------------------
// Filter predicate: which values are accepted per column
// ---------------------------------------------------------------------------

/// One of the four filterable columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Survival,
    Pclass,
    Sex,
    Embarked,
}

/// Accepted values per filterable column.
///
/// A passenger passes when its value in every column is in the accepted set.
/// An empty set accepts nothing, so clearing a column hides every row. A
/// passenger with no embarkation port never passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    pub survival: BTreeSet<Survival>,
    pub pclass: BTreeSet<Pclass>,
    pub sex: BTreeSet<Sex>,
    pub embarked: BTreeSet<Port>,
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self::all()
    }
}

impl FilterSelection {
    pub fn new(
        survival: impl IntoIterator<Item = Survival>,
        pclass: impl IntoIterator<Item = Pclass>,
        sex: impl IntoIterator<Item = Sex>,
        embarked: impl IntoIterator<Item = Port>,
    ) -> Self {
        FilterSelection {
            survival: survival.into_iter().collect(),
            pclass: pclass.into_iter().collect(),
            sex: sex.into_iter().collect(),
            embarked: embarked.into_iter().collect(),
        }
    }

    /// Every value of every column accepted (the initial sidebar state).
    pub fn all() -> Self {
        Self::new(Survival::ALL, Pclass::ALL, Sex::ALL, Port::ALL)
    }

    pub fn matches(&self, p: &Passenger) -> bool {
        self.survival.contains(&p.survival())
            && self.pclass.contains(&p.pclass)
            && self.sex.contains(&p.sex)
            && p.embarked.is_some_and(|port| self.embarked.contains(&port))
    }

    /// Accept every value of one column.
    pub fn select_all(&mut self, dimension: Dimension) {
        match dimension {
            Dimension::Survival => self.survival = Survival::ALL.into_iter().collect(),
            Dimension::Pclass => self.pclass = Pclass::ALL.into_iter().collect(),
            Dimension::Sex => self.sex = Sex::ALL.into_iter().collect(),
            Dimension::Embarked => self.embarked = Port::ALL.into_iter().collect(),
        }
    }

    /// Accept nothing in one column.
    pub fn select_none(&mut self, dimension: Dimension) {
        match dimension {
            Dimension::Survival => self.survival.clear(),
            Dimension::Pclass => self.pclass.clear(),
            Dimension::Sex => self.sex.clear(),
            Dimension::Embarked => self.embarked.clear(),
        }
    }

    pub fn is_accepted<T: Accepted>(&self, value: T) -> bool {
        T::accepted(self).contains(&value)
    }

    /// Flip whether `value` is accepted in its column. Returns the new state.
    pub fn toggle<T: Accepted>(&mut self, value: T) -> bool {
        let set = T::accepted_mut(self);
        if set.remove(&value) {
            false
        } else {
            set.insert(value);
            true
        }
    }
}

/// A value that one filter column accepts or rejects.
pub trait Accepted: Ord + Copy {
    const DIMENSION: Dimension;

    fn accepted(selection: &FilterSelection) -> &BTreeSet<Self>;
    fn accepted_mut(selection: &mut FilterSelection) -> &mut BTreeSet<Self>;
}

macro_rules! accepted_column {
    ($ty:ty, $dimension:ident, $field:ident) => {
        impl Accepted for $ty {
            const DIMENSION: Dimension = Dimension::$dimension;

            fn accepted(selection: &FilterSelection) -> &BTreeSet<Self> {
                &selection.$field
            }

            fn accepted_mut(selection: &mut FilterSelection) -> &mut BTreeSet<Self> {
                &mut selection.$field
            }
        }
    };
}

accepted_column!(Survival, Survival, survival);
accepted_column!(Pclass, Pclass, pclass);
accepted_column!(Sex, Sex, sex);
accepted_column!(Port, Embarked, embarked);

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

impl View {
    /// Rows of this view that pass `selection`, in the same order.
    pub fn filter(&self, selection: &FilterSelection) -> View {
        let all = self.dataset().passengers();
        let rows: Vec<usize> = self
            .rows()
            .iter()
            .copied()
            .filter(|&i| selection.matches(&all[i]))
            .collect();
        log::debug!("Filter kept {} of {} rows", rows.len(), self.len());
        View::from_rows(Arc::clone(self.dataset()), rows)
    }
}

/// Filter the whole dataset.
pub fn filter(dataset: &Arc<Dataset>, selection: &FilterSelection) -> View {
    View::full(Arc::clone(dataset)).filter(selection)
}
