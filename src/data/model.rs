use std::fmt;
use std::sync::{Arc, OnceLock};

use regex::Regex;

// ---------------------------------------------------------------------------
// Cell – a single untyped value read from the source table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring common Pandas dtypes.
///
/// Every file format is decoded into rows of `Cell`s first; the typed
/// [`Passenger`] is built from those in one place.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::String(s) => write!(f, "{s}"),
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Null => write!(f, "<null>"),
        }
    }
}

impl Cell {
    pub fn is_null(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Float(v) => v.is_nan(),
            Cell::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric view of the cell. Numeric text is accepted too.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Float(v) if !v.is_nan() => Some(*v),
            Cell::Integer(i) => Some(*i as f64),
            Cell::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Integer view of the cell. `3.0` is accepted, `3.5` is not.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Integer(i) => Some(*i),
            Cell::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            Cell::Bool(b) => Some(i64::from(*b)),
            Cell::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| Cell::Float(s.parse().ok()?).as_i64())
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::String(s) => Some(s.trim()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Categorical columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Male, Sex::Female];

    pub fn from_cell(cell: &Cell) -> Option<Self> {
        match cell.as_str()?.to_ascii_lowercase().as_str() {
            "male" => Some(Sex::Male),
            "female" => Some(Sex::Female),
            _ => None,
        }
    }

    /// Capitalised label for widgets.
    pub fn label(self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => write!(f, "male"),
            Sex::Female => write!(f, "female"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Pclass {
    First,
    Second,
    Third,
}

impl Pclass {
    pub const ALL: [Pclass; 3] = [Pclass::First, Pclass::Second, Pclass::Third];

    pub fn from_number(n: i64) -> Option<Self> {
        match n {
            1 => Some(Pclass::First),
            2 => Some(Pclass::Second),
            3 => Some(Pclass::Third),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Pclass::First => 1,
            Pclass::Second => 2,
            Pclass::Third => 3,
        }
    }
}

impl fmt::Display for Pclass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Port of embarkation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Port {
    Cherbourg,
    Queenstown,
    Southampton,
}

impl Port {
    pub const ALL: [Port; 3] = [Port::Cherbourg, Port::Queenstown, Port::Southampton];

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "C" => Some(Port::Cherbourg),
            "Q" => Some(Port::Queenstown),
            "S" => Some(Port::Southampton),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Port::Cherbourg => "C",
            Port::Queenstown => "Q",
            Port::Southampton => "S",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Port::Cherbourg => "Cherbourg",
            Port::Queenstown => "Queenstown",
            Port::Southampton => "Southampton",
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Survival label derived from the binary `Survived` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Survival {
    DidNotSurvive,
    Survived,
}

impl Survival {
    pub const ALL: [Survival; 2] = [Survival::Survived, Survival::DidNotSurvive];

    pub fn from_survived(survived: bool) -> Self {
        if survived {
            Survival::Survived
        } else {
            Survival::DidNotSurvive
        }
    }
}

impl fmt::Display for Survival {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Survival::DidNotSurvive => write!(f, "Did not Survive"),
            Survival::Survived => write!(f, "Survived"),
        }
    }
}

// ---------------------------------------------------------------------------
// Passenger – one row of the source table
// ---------------------------------------------------------------------------

/// The raw fields of one passenger, exactly as read from the source.
#[derive(Debug, Clone, PartialEq)]
pub struct PassengerRecord {
    pub passenger_id: Option<i64>,
    pub name: String,
    pub sex: Sex,
    pub age: Option<f64>,
    pub pclass: Pclass,
    pub sib_sp: u16,
    pub parch: u16,
    pub fare: Option<f64>,
    pub embarked: Option<Port>,
    pub survived: bool,
}

/// A passenger with its derived features.
///
/// Derived fields are computed once in [`Passenger::new`] and only exposed
/// through getters.
#[derive(Debug, Clone, PartialEq)]
pub struct Passenger {
    pub passenger_id: Option<i64>,
    pub name: String,
    pub sex: Sex,
    pub age: Option<f64>,
    pub pclass: Pclass,
    pub sib_sp: u16,
    pub parch: u16,
    pub fare: Option<f64>,
    pub embarked: Option<Port>,
    pub survived: bool,
    title: Option<String>,
    family_size: u32,
    survival: Survival,
}

impl Passenger {
    pub fn new(record: PassengerRecord) -> Self {
        let title = extract_title(&record.name);
        let family_size = u32::from(record.sib_sp) + u32::from(record.parch) + 1;
        let survival = Survival::from_survived(record.survived);
        Passenger {
            passenger_id: record.passenger_id,
            name: record.name,
            sex: record.sex,
            age: record.age,
            pclass: record.pclass,
            sib_sp: record.sib_sp,
            parch: record.parch,
            fare: record.fare,
            embarked: record.embarked,
            survived: record.survived,
            title,
            family_size,
            survival,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn family_size(&self) -> u32 {
        self.family_size
    }

    pub fn survival(&self) -> Survival {
        self.survival
    }
}

/// Title from a name such as `"Braund, Mr. Owen Harris"`: the first word that
/// follows a space and ends with a period.
pub fn extract_title(name: &str) -> Option<String> {
    static TITLE: OnceLock<Regex> = OnceLock::new();
    let re = TITLE.get_or_init(|| Regex::new(r" ([A-Za-z]+)\.").expect("title pattern is valid"));
    re.captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset. Read-only once built.
#[derive(Debug, Clone)]
pub struct Dataset {
    passengers: Vec<Passenger>,
    /// Where the rows came from (file path or a descriptive label).
    source: String,
}

impl Dataset {
    pub fn new(passengers: Vec<Passenger>, source: impl Into<String>) -> Self {
        Dataset {
            passengers,
            source: source.into(),
        }
    }

    pub fn passengers(&self) -> &[Passenger] {
        &self.passengers
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of passengers.
    pub fn len(&self) -> usize {
        self.passengers.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.passengers.is_empty()
    }
}

// ---------------------------------------------------------------------------
// View – ordered subset of a dataset
// ---------------------------------------------------------------------------

/// A read-only projection of a [`Dataset`]: the shared table plus the indices
/// of the rows that are visible, in ascending order.
#[derive(Debug, Clone)]
pub struct View {
    dataset: Arc<Dataset>,
    rows: Vec<usize>,
}

impl View {
    /// A view containing every row.
    pub fn full(dataset: Arc<Dataset>) -> Self {
        let rows = (0..dataset.len()).collect();
        View { dataset, rows }
    }

    pub(crate) fn from_rows(dataset: Arc<Dataset>, rows: Vec<usize>) -> Self {
        View { dataset, rows }
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    /// Indices into the base dataset.
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Passenger> + '_ {
        let all = self.dataset.passengers();
        self.rows.iter().map(move |&i| &all[i])
    }
}

impl PartialEq for View {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.dataset, &other.dataset) && self.rows == other.rows
    }
}
