//! Writes a synthetic passenger table for trying out the dashboard:
//! `sample_passengers.parquet` and `sample_passengers.csv`.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const N_PASSENGERS: usize = 891;

const SURNAMES: [&str; 12] = [
    "Braund", "Cumings", "Heikkinen", "Futrelle", "Allen", "Moran",
    "McCarthy", "Palsson", "Johnson", "Nasser", "Sandstrom", "Bonnell",
];
const MALE_NAMES: [&str; 6] = ["Owen", "William", "James", "Timothy", "Gosta", "Hudson"];
const FEMALE_NAMES: [&str; 6] = ["Laina", "Lily", "Elisabeth", "Marguerite", "Adele", "Florence"];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct Columns {
    id: Vec<i64>,
    survived: Vec<i64>,
    pclass: Vec<i64>,
    name: Vec<String>,
    sex: Vec<String>,
    age: Vec<Option<f64>>,
    sib_sp: Vec<i64>,
    parch: Vec<i64>,
    fare: Vec<f64>,
    embarked: Vec<Option<String>>,
}

fn generate(rng: &mut SimpleRng) -> Columns {
    let mut c = Columns {
        id: Vec::new(),
        survived: Vec::new(),
        pclass: Vec::new(),
        name: Vec::new(),
        sex: Vec::new(),
        age: Vec::new(),
        sib_sp: Vec::new(),
        parch: Vec::new(),
        fare: Vec::new(),
        embarked: Vec::new(),
    };

    for i in 0..N_PASSENGERS {
        let pclass: i64 = match rng.next_f64() {
            u if u < 0.24 => 1,
            u if u < 0.45 => 2,
            _ => 3,
        };
        let female = rng.chance(0.35);
        let age = rng.gauss(if pclass == 1 { 38.0 } else { 27.0 }, 13.0).clamp(0.42, 80.0);
        let child = age < 14.0;

        let title = match (female, child) {
            (true, true) => "Miss",
            (true, false) if rng.chance(0.55) => "Mrs",
            (true, false) => "Miss",
            (false, true) => "Master",
            (false, false) if rng.chance(0.02) => "Dr",
            (false, false) => "Mr",
        };
        let first = if female { rng.pick(&FEMALE_NAMES) } else { rng.pick(&MALE_NAMES) };
        let surname = rng.pick(&SURNAMES);

        let sib_sp = if rng.chance(0.3) { 1 + (rng.next_u64() % 3) as i64 } else { 0 };
        let parch = if child || rng.chance(0.2) { 1 + (rng.next_u64() % 2) as i64 } else { 0 };

        let base_fare = match pclass {
            1 => 84.0,
            2 => 20.0,
            _ => 13.0,
        };
        let fare = (base_fare * (1.0 + 0.5 * rng.gauss(0.0, 1.0).abs())).max(0.0);

        let mut p_survive: f64 = if female { 0.74 } else { 0.19 };
        p_survive += match pclass {
            1 => 0.15,
            2 => 0.0,
            _ => -0.12,
        };
        if child {
            p_survive += 0.2;
        }

        let embarked = match rng.next_f64() {
            u if u < 0.002 => None,
            u if u < 0.19 => Some("C"),
            u if u < 0.28 => Some("Q"),
            _ => Some("S"),
        };

        c.id.push(i as i64 + 1);
        c.survived.push(i64::from(rng.chance(p_survive.clamp(0.02, 0.98))));
        c.pclass.push(pclass);
        c.name.push(format!("{surname}, {title}. {first}"));
        c.sex.push(if female { "female" } else { "male" }.to_string());
        c.age.push(if rng.chance(0.2) { None } else { Some(age.round()) });
        c.sib_sp.push(sib_sp);
        c.parch.push(parch);
        c.fare.push((fare * 10_000.0).round() / 10_000.0);
        c.embarked.push(embarked.map(str::to_string));
    }
    c
}

fn write_parquet(c: &Columns, path: &str) {
    let schema = Arc::new(Schema::new(vec![
        Field::new("PassengerId", DataType::Int64, false),
        Field::new("Survived", DataType::Int64, false),
        Field::new("Pclass", DataType::Int64, false),
        Field::new("Name", DataType::Utf8, false),
        Field::new("Sex", DataType::Utf8, false),
        Field::new("Age", DataType::Float64, true),
        Field::new("SibSp", DataType::Int64, false),
        Field::new("Parch", DataType::Int64, false),
        Field::new("Fare", DataType::Float64, false),
        Field::new("Embarked", DataType::Utf8, true),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(c.id.clone())),
        Arc::new(Int64Array::from(c.survived.clone())),
        Arc::new(Int64Array::from(c.pclass.clone())),
        Arc::new(StringArray::from(c.name.clone())),
        Arc::new(StringArray::from(c.sex.clone())),
        Arc::new(Float64Array::from(c.age.clone())),
        Arc::new(Int64Array::from(c.sib_sp.clone())),
        Arc::new(Int64Array::from(c.parch.clone())),
        Arc::new(Float64Array::from(c.fare.clone())),
        Arc::new(StringArray::from(c.embarked.clone())),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).expect("Failed to create RecordBatch");

    let file = std::fs::File::create(path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");
}

fn write_csv(c: &Columns, path: &str) {
    let mut writer = csv::Writer::from_path(path).expect("Failed to create CSV file");
    writer
        .write_record([
            "PassengerId", "Survived", "Pclass", "Name", "Sex", "Age", "SibSp", "Parch", "Fare",
            "Embarked",
        ])
        .expect("Failed to write CSV header");
    for i in 0..c.id.len() {
        writer
            .write_record([
                c.id[i].to_string(),
                c.survived[i].to_string(),
                c.pclass[i].to_string(),
                c.name[i].clone(),
                c.sex[i].clone(),
                c.age[i].map(|a| a.to_string()).unwrap_or_default(),
                c.sib_sp[i].to_string(),
                c.parch[i].to_string(),
                c.fare[i].to_string(),
                c.embarked[i].clone().unwrap_or_default(),
            ])
            .expect("Failed to write CSV row");
    }
    writer.flush().expect("Failed to flush CSV");
}

fn main() {
    let mut rng = SimpleRng::new(42);
    let columns = generate(&mut rng);

    write_parquet(&columns, "sample_passengers.parquet");
    write_csv(&columns, "sample_passengers.csv");

    let survivors: i64 = columns.survived.iter().sum();
    println!(
        "Wrote {} passengers ({} survivors) to sample_passengers.parquet and sample_passengers.csv",
        columns.id.len(),
        survivors
    );
}
