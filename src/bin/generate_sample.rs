//! Writes a synthetic pitch dataset (`sample_pitches.csv` and
//! `sample_pitches.parquet`) with the same headers as the show's export, so
//! the dashboard can be tried without the real file.

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const INDUSTRIES: [&str; 8] = [
    "Food and Beverage",
    "Beauty/Fashion",
    "Technology/Software",
    "Manufacturing",
    "Medical/Health",
    "Agriculture",
    "Education",
    "Vehicles/Electrical Vehicles",
];

/// Header as exported by the show, i.e. before normalization.
const SHARKS: [&str; 7] = [
    "Namita Present",
    "Vineeta Present",
    "Anupam Present",
    "Aman Present",
    "Peyush Present",
    "Amit Present",
    "Ashneer Present",
];

/// Pitches per season.
const SEASONS: [(i64, usize); 3] = [(1, 117), (2, 169), (3, 153)];

/// splitmix64, deterministic so the sample is reproducible.
struct SampleRng(u64);

impl SampleRng {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn chance(&mut self, p: f64) -> bool {
        ((self.next_u64() >> 11) as f64 / (1u64 << 53) as f64) < p
    }
}

struct Pitch {
    season: i64,
    name: String,
    industry: &'static str,
    deal: &'static str,
    present: [i64; 7],
}

fn generate(rng: &mut SampleRng) -> Vec<Pitch> {
    let mut pitches = Vec::new();
    for (season, count) in SEASONS {
        for n in 1..=count {
            // Ashneer left after season one, Amit joined in season two.
            let mut present = [0i64; 7];
            for (i, slot) in present.iter_mut().enumerate() {
                let on_panel = match SHARKS[i] {
                    "Ashneer Present" => season == 1,
                    "Amit Present" => season >= 2,
                    _ => true,
                };
                *slot = i64::from(on_panel && rng.chance(0.7));
            }
            pitches.push(Pitch {
                season,
                name: format!("Startup S{season}-{n:03}"),
                industry: INDUSTRIES[rng.below(INDUSTRIES.len())],
                deal: if rng.chance(0.6) { "Deal" } else { "No Deal" },
                present,
            });
        }
    }
    pitches
}

fn write_csv(path: &str, pitches: &[Pitch]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;

    let mut header = vec!["Season Number", "Startup Name", "Industry", "Deal Status"];
    header.extend(SHARKS);
    writer.write_record(&header)?;

    for p in pitches {
        let mut row = vec![
            p.season.to_string(),
            p.name.clone(),
            p.industry.to_string(),
            p.deal.to_string(),
        ];
        row.extend(p.present.iter().map(|v| v.to_string()));
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &str, pitches: &[Pitch]) -> Result<()> {
    let mut fields = vec![
        Field::new("Season Number", DataType::Int64, false),
        Field::new("Startup Name", DataType::Utf8, false),
        Field::new("Industry", DataType::Utf8, false),
        Field::new("Deal Status", DataType::Utf8, false),
    ];
    fields.extend(SHARKS.iter().map(|s| Field::new(*s, DataType::Int64, false)));
    let schema = Arc::new(Schema::new(fields));

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from_iter_values(pitches.iter().map(|p| p.season))),
        Arc::new(StringArray::from_iter_values(pitches.iter().map(|p| p.name.as_str()))),
        Arc::new(StringArray::from_iter_values(pitches.iter().map(|p| p.industry))),
        Arc::new(StringArray::from_iter_values(pitches.iter().map(|p| p.deal))),
    ];
    for i in 0..SHARKS.len() {
        columns.push(Arc::new(Int64Array::from_iter_values(
            pitches.iter().map(|p| p.present[i]),
        )));
    }

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = SampleRng(42);
    let pitches = generate(&mut rng);

    write_csv("sample_pitches.csv", &pitches)?;
    write_parquet("sample_pitches.parquet", &pitches)?;

    log::info!("Wrote {} pitches over {} seasons", pitches.len(), SEASONS.len());
    println!("Wrote {} pitches to sample_pitches.csv and sample_pitches.parquet", pitches.len());
    Ok(())
}
