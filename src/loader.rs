use crate::errors::{EstimateError, EstimateResult};
use crate::types::{FinishingQuality, RateRow, RawRateRow, UnitPrices};
use crate::util::{parse_f64_safe, parse_i32_safe};
use csv::{ReaderBuilder, Trim};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
}

/// Unit prices for one finishing quality, keyed by (year, location).
#[derive(Debug, Clone)]
pub struct RateTable {
    quality: FinishingQuality,
    rows: HashMap<(i32, String), RateRow>,
}

impl RateTable {
    /// Build a table from rows already in memory. Duplicate pairs are
    /// rejected the same way the CSV loader rejects them.
    pub fn from_rows(
        quality: FinishingQuality,
        rows: impl IntoIterator<Item = RateRow>,
    ) -> EstimateResult<Self> {
        let mut table = RateTable {
            quality,
            rows: HashMap::new(),
        };
        for row in rows {
            table.insert(row, "<memory>")?;
        }
        Ok(table)
    }

    fn insert(&mut self, row: RateRow, source: &str) -> EstimateResult<()> {
        let key = (row.year, row.location.clone());
        if self.rows.contains_key(&key) {
            return Err(EstimateError::DuplicateRow {
                path: source.to_string(),
                year: row.year,
                location: row.location,
            });
        }
        self.rows.insert(key, row);
        Ok(())
    }

    pub fn quality(&self) -> FinishingQuality {
        self.quality
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Exact match on (year, location); never falls back to another row.
    pub fn lookup(&self, year: i32, location: &str) -> EstimateResult<&RateRow> {
        self.rows
            .get(&(year, location.trim().to_string()))
            .ok_or_else(|| EstimateError::lookup_miss(year, location.trim(), self.quality.to_string()))
    }

    pub fn locations(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self.rows.keys().map(|(_, l)| l.as_str()).collect();
        set.into_iter().map(str::to_string).collect()
    }

    pub fn years(&self) -> Vec<i32> {
        let set: BTreeSet<i32> = self.rows.keys().map(|(y, _)| *y).collect();
        set.into_iter().collect()
    }
}

/// The Standard and Luxury tables side by side. Which one is queried is a
/// property of the request.
#[derive(Debug, Clone)]
pub struct RateTables {
    pub standard: RateTable,
    pub luxury: RateTable,
}

impl RateTables {
    pub fn load(standard_path: &Path, luxury_path: &Path) -> EstimateResult<Self> {
        Self::load_with_reports(standard_path, luxury_path).map(|(tables, _)| tables)
    }

    /// Load both tables and keep their load reports, Standard first.
    pub fn load_with_reports(
        standard_path: &Path,
        luxury_path: &Path,
    ) -> EstimateResult<(Self, [LoadReport; 2])> {
        let (standard, standard_report) =
            load_rate_table(standard_path, FinishingQuality::Standard)?;
        let (luxury, luxury_report) = load_rate_table(luxury_path, FinishingQuality::Luxury)?;
        Ok((RateTables { standard, luxury }, [standard_report, luxury_report]))
    }

    pub fn table(&self, quality: FinishingQuality) -> &RateTable {
        match quality {
            FinishingQuality::Standard => &self.standard,
            FinishingQuality::Luxury => &self.luxury,
        }
    }

    pub fn lookup(
        &self,
        year: i32,
        location: &str,
        quality: FinishingQuality,
    ) -> EstimateResult<&RateRow> {
        self.table(quality).lookup(year, location)
    }

    /// Locations present in either table, sorted.
    pub fn locations(&self) -> Vec<String> {
        let mut set: BTreeSet<String> = self.standard.locations().into_iter().collect();
        set.extend(self.luxury.locations());
        set.into_iter().collect()
    }

    pub fn years(&self) -> Vec<i32> {
        let mut set: BTreeSet<i32> = self.standard.years().into_iter().collect();
        set.extend(self.luxury.years());
        set.into_iter().collect()
    }
}

/// Read one rate table CSV. Headers and cells are trimmed; rows with a
/// missing or unparseable value are skipped and counted.
pub fn load_rate_table(
    path: &Path,
    quality: FinishingQuality,
) -> EstimateResult<(RateTable, LoadReport)> {
    let source = path.display().to_string();
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|e| EstimateError::rate_table_load(&source, e.to_string()))?;

    let mut table = RateTable {
        quality,
        rows: HashMap::new(),
    };
    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;

    for result in rdr.deserialize::<RawRateRow>() {
        total_rows += 1;
        let raw = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(target: "estimator.load", path = %source, line = total_rows + 1, error = %e, "Skipping unreadable row");
                parse_errors += 1;
                continue;
            }
        };
        match clean_row(raw) {
            Some(row) => table.insert(row, &source)?,
            None => {
                warn!(target: "estimator.load", path = %source, line = total_rows + 1, "Skipping row with missing or invalid values");
                parse_errors += 1;
            }
        }
    }

    if table.is_empty() {
        return Err(EstimateError::rate_table_load(
            &source,
            format!("no usable rows ({} read, {} rejected)", total_rows, parse_errors),
        ));
    }

    let report = LoadReport {
        total_rows,
        loaded_rows: table.len(),
        parse_errors,
    };
    info!(
        target: "estimator.load",
        path = %source,
        quality = %quality,
        rows = report.loaded_rows,
        parse_errors = report.parse_errors,
        "Rate table loaded"
    );
    Ok((table, report))
}

fn clean_row(raw: RawRateRow) -> Option<RateRow> {
    let year = parse_i32_safe(raw.year.as_deref())?;
    let location = raw.location?.trim().to_string();
    if location.is_empty() {
        return None;
    }
    let price = |cell: &Option<String>| parse_f64_safe(cell.as_deref()).filter(|v| *v >= 0.0);
    let unit_prices = UnitPrices {
        cement: price(&raw.cement)?,
        steel: price(&raw.steel)?,
        concrete: price(&raw.concrete)?,
        blocks: price(&raw.blocks)?,
        tiles: price(&raw.tiles)?,
        paint: price(&raw.paint)?,
        glass: price(&raw.glass)?,
        wood: price(&raw.wood)?,
        labor: price(&raw.labor)?,
        equipment: price(&raw.equipment)?,
    };
    Some(RateRow {
        year,
        location,
        unit_prices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str = "Year, Location , Cement (SAR/ton), Steel (SAR/ton), Concrete (SAR/m3), Blocks (SAR/1000), Tiles (SAR/m2), Paint (SAR/m2), Glass (SAR/m2), Wood (SAR/m2), Labor (SAR/hour), Equipment (SAR/day)";

    fn write_table(dir: &TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, format!("{}\n{}", HEADER, body)).unwrap();
        path
    }

    #[test]
    fn trims_headers_and_locations() {
        let dir = TempDir::new().unwrap();
        let path = write_table(
            &dir,
            "std.csv",
            "2025,  Riyadh ,300,3200,250,2200,85,25,350,180,30,1200\n",
        );
        let (table, report) = load_rate_table(&path, FinishingQuality::Standard).unwrap();
        assert_eq!(report.loaded_rows, 1);
        let row = table.lookup(2025, "Riyadh").unwrap();
        assert_eq!(row.unit_prices.cement, 300.0);
        assert_eq!(row.unit_prices.equipment, 1200.0);
    }

    #[test]
    fn counts_bad_rows_and_keeps_good_ones() {
        let dir = TempDir::new().unwrap();
        let path = write_table(
            &dir,
            "std.csv",
            "2025,Riyadh,300,3200,250,2200,85,25,350,180,30,1200\n\
             2025,Jeddah,abc,3200,250,2200,85,25,350,180,30,1200\n\
             2024,Jeddah,310,3250,255,2250,88,26,360,185,31\n",
        );
        let (table, report) = load_rate_table(&path, FinishingQuality::Standard).unwrap();
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.loaded_rows, 1);
        assert_eq!(report.parse_errors, 2);
        assert_eq!(table.locations(), vec!["Riyadh".to_string()]);
    }

    #[test]
    fn both_reports_are_returned() {
        let dir = TempDir::new().unwrap();
        let std_path = write_table(
            &dir,
            "std.csv",
            "2025,Riyadh,300,3200,250,2200,85,25,350,180,30,1200\n\
             2025,Jeddah,,3200,250,2200,85,25,350,180,30,1200\n",
        );
        let lux_path = write_table(
            &dir,
            "lux.csv",
            "2025,Riyadh,330,3520,275,2420,153,45,630,324,39,1560\n",
        );
        let (tables, [standard, luxury]) = RateTables::load_with_reports(&std_path, &lux_path).unwrap();
        assert_eq!(
            standard,
            LoadReport {
                total_rows: 2,
                loaded_rows: 1,
                parse_errors: 1
            }
        );
        assert_eq!(luxury.parse_errors, 0);
        assert_eq!(luxury.loaded_rows, tables.luxury.len());
    }

    #[test]
    fn duplicate_pair_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_table(
            &dir,
            "std.csv",
            "2025,Riyadh,300,3200,250,2200,85,25,350,180,30,1200\n\
             2025,Riyadh,301,3200,250,2200,85,25,350,180,30,1200\n",
        );
        let err = load_rate_table(&path, FinishingQuality::Standard).unwrap_err();
        assert_eq!(err.error_code(), "DUPLICATE_ROW");
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = load_rate_table(Path::new("/nonexistent/rates.csv"), FinishingQuality::Luxury)
            .unwrap_err();
        assert_eq!(err.error_code(), "RATE_TABLE_LOAD");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn empty_table_is_a_load_error() {
        let dir = TempDir::new().unwrap();
        let path = write_table(&dir, "std.csv", "");
        let err = load_rate_table(&path, FinishingQuality::Standard).unwrap_err();
        assert_eq!(err.error_code(), "RATE_TABLE_LOAD");
    }

    #[test]
    fn lookup_miss_for_uncovered_year() {
        let rows = (2023..=2025).map(|year| RateRow {
            year,
            location: "Riyadh".to_string(),
            unit_prices: UnitPrices {
                cement: 300.0,
                steel: 3200.0,
                concrete: 250.0,
                blocks: 2200.0,
                tiles: 85.0,
                paint: 25.0,
                glass: 350.0,
                wood: 180.0,
                labor: 30.0,
                equipment: 1200.0,
            },
        });
        let table = RateTable::from_rows(FinishingQuality::Standard, rows).unwrap();
        assert_eq!(table.years(), vec![2023, 2024, 2025]);
        let err = table.lookup(2030, "Riyadh").unwrap_err();
        assert_eq!(err, EstimateError::lookup_miss(2030, "Riyadh", "Standard"));
        assert!(table.lookup(2025, "Dubai").is_err());
    }
}
