use super::normalize::{
    coerce_number, normalize_energy_label, normalize_floors, normalize_garden,
    normalize_house_type, normalize_position, normalize_roof, normalize_toilet, parse_rooms,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("unable to open sales dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid sales CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// One listing row as exported by the scraper. Every column is optional text.
#[derive(Debug, Deserialize)]
struct RawSaleRow {
    #[serde(rename = "Price", default, deserialize_with = "empty_string_as_none")]
    price: Option<String>,
    #[serde(
        rename = "Living space size (m2)",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    living_area: Option<String>,
    #[serde(rename = "Lot size (m2)", default, deserialize_with = "empty_string_as_none")]
    lot_size: Option<String>,
    #[serde(rename = "Build year", default, deserialize_with = "empty_string_as_none")]
    build_year: Option<String>,
    #[serde(rename = "Rooms", default, deserialize_with = "empty_string_as_none")]
    rooms: Option<String>,
    #[serde(rename = "Energy label", default, deserialize_with = "empty_string_as_none")]
    energy_label: Option<String>,
    #[serde(rename = "Build type", default, deserialize_with = "empty_string_as_none")]
    build_type: Option<String>,
    #[serde(rename = "House type", default, deserialize_with = "empty_string_as_none")]
    house_type: Option<String>,
    #[serde(rename = "Garden", default, deserialize_with = "empty_string_as_none")]
    garden: Option<String>,
    #[serde(rename = "Roof", default, deserialize_with = "empty_string_as_none")]
    roof: Option<String>,
    #[serde(rename = "Position", default, deserialize_with = "empty_string_as_none")]
    position: Option<String>,
    #[serde(rename = "Toilet", default, deserialize_with = "empty_string_as_none")]
    toilet: Option<String>,
    #[serde(rename = "Floors", default, deserialize_with = "empty_string_as_none")]
    floors: Option<String>,
    #[serde(rename = "City", default, deserialize_with = "empty_string_as_none")]
    city: Option<String>,
    #[serde(
        rename = "Estimated neighbourhood price per m2",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    neighborhood_price_m2: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty()))
}

/// A sale with coerced numbers, canonical category labels and derived price per m².
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanedSale {
    pub price: f64,
    pub living_area: f64,
    pub price_per_m2: f64,
    pub lot_size: Option<f64>,
    pub build_year: Option<f64>,
    pub rooms: Option<f64>,
    pub energy_label: String,
    pub build_type: String,
    pub house_type: String,
    pub house_type_norm: String,
    pub garden_norm: String,
    pub roof_norm: String,
    pub position_norm: String,
    pub toilet_norm: String,
    pub floors_norm: String,
    pub city: String,
    pub neighborhood_price_m2: Option<f64>,
}

impl CleanedSale {
    fn from_row(row: RawSaleRow) -> Option<Self> {
        let price = row.price.as_deref().and_then(coerce_number)?;
        let living_area = row.living_area.as_deref().and_then(coerce_number)?;

        let text = |value: &Option<String>| value.clone().unwrap_or_default();

        Some(Self {
            price,
            living_area,
            price_per_m2: price / living_area,
            lot_size: row.lot_size.as_deref().and_then(coerce_number),
            build_year: row.build_year.as_deref().and_then(coerce_number),
            rooms: row.rooms.as_deref().and_then(parse_rooms),
            energy_label: normalize_energy_label(row.energy_label.as_deref()),
            build_type: text(&row.build_type),
            house_type: text(&row.house_type),
            house_type_norm: normalize_house_type(&text(&row.house_type)).to_string(),
            garden_norm: normalize_garden(&text(&row.garden)).to_string(),
            roof_norm: normalize_roof(&text(&row.roof)).to_string(),
            position_norm: normalize_position(&text(&row.position)).to_string(),
            toilet_norm: normalize_toilet(&text(&row.toilet)),
            floors_norm: normalize_floors(&text(&row.floors)),
            city: text(&row.city),
            neighborhood_price_m2: row.neighborhood_price_m2.as_deref().and_then(coerce_number),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleanedDataset {
    pub sales: Vec<CleanedSale>,
    pub rows_read: usize,
    pub rows_dropped: usize,
}

impl CleanedDataset {
    pub fn len(&self) -> usize {
        self.sales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
    }
}

/// Turns the raw listing export into a [`CleanedDataset`].
///
/// Rows whose price or living area does not coerce to a number are dropped; every
/// other field degrades to missing or to its category's "Other" label.
pub struct DatasetCleaner;

impl DatasetCleaner {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<CleanedDataset, DatasetError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<CleanedDataset, DatasetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut dataset = CleanedDataset::default();
        for record in csv_reader.deserialize::<RawSaleRow>() {
            let row = record?;
            dataset.rows_read += 1;
            match CleanedSale::from_row(row) {
                Some(sale) => dataset.sales.push(sale),
                None => dataset.rows_dropped += 1,
            }
        }

        if dataset.rows_dropped > 0 {
            warn!(
                dropped = dataset.rows_dropped,
                read = dataset.rows_read,
                "dropped sales without a usable price or living area"
            );
        }
        info!(rows = dataset.len(), "cleaned sales dataset");
        Ok(dataset)
    }
}
