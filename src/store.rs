//! Named measurement records and ranking.

use crate::perf::{self, Model};
use crate::session::Measurement;

/// One named top with its latest measurement. `None` fields are empty
/// (not yet measured), which is distinct from zero.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    pub id: u32,
    pub name: String,
    pub power: Option<f64>,
    /// Whole minutes; the fractional part of the time lives in `seconds`.
    pub minutes: Option<u32>,
    pub seconds: Option<f64>,
}

/// Partial update for [`RecordStore::update`]. Outer `None` leaves a field
/// untouched; `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub name: Option<String>,
    pub power: Option<Option<f64>>,
    pub minutes: Option<Option<u32>>,
    pub seconds: Option<Option<f64>>,
}

/// Ranking configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Settings {
    pub model: Model,
    /// Exponent `n` for [`Model::Power`].
    pub exponent: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: Model::Sqrt,
            exponent: 0.5,
        }
    }
}

/// A ranked record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranked<'a> {
    pub record: &'a Record,
    pub performance: f64,
}

/// Ordered record collection.
///
/// Ids are minted from a counter and never reused. Deleting the last record
/// is refused, so a store that has ever held a record keeps at least one.
#[derive(Debug, Clone)]
pub struct RecordStore {
    records: Vec<Record>,
    next_id: u32,
    settings: Settings,
}

impl RecordStore {
    /// Empty store, ids from 1.
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
            settings,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, id: u32) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Id the next added record will get.
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn set_model(&mut self, model: Model) {
        self.settings.model = model;
    }

    /// Accepts only finite exponents > 0. Returns whether it was applied.
    pub fn set_exponent(&mut self, exponent: f64) -> bool {
        if !exponent.is_finite() || exponent <= 0.0 {
            return false;
        }
        self.settings.exponent = exponent;
        true
    }

    /// Append a record. A blank name becomes `Bey <letter>` from the new id.
    pub fn add(
        &mut self,
        name: &str,
        power: Option<f64>,
        minutes: Option<u32>,
        seconds: Option<f64>,
    ) -> u32 {
        let id = self.mint_id();
        let name = match name.trim() {
            "" => lettered_name(id),
            name => name.to_string(),
        };
        self.records.push(Record {
            id,
            name,
            power,
            minutes,
            seconds,
        });
        id
    }

    /// Apply a patch to the record with `id`. False if there is none.
    pub fn update(&mut self, id: u32, patch: RecordPatch) -> bool {
        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            return false;
        };
        if let Some(name) = patch.name {
            record.name = name;
        }
        if let Some(power) = patch.power {
            record.power = power;
        }
        if let Some(minutes) = patch.minutes {
            record.minutes = minutes;
        }
        if let Some(seconds) = patch.seconds {
            record.seconds = seconds;
        }
        true
    }

    /// Overwrite the first record called `name` with `measurement`, or append
    /// a new one. Returns true when a record was added.
    pub fn upsert_by_name(&mut self, name: &str, measurement: &Measurement) -> bool {
        let power = Some(f64::from(measurement.power));
        let minutes = Some(measurement.minutes);
        let seconds = Some(measurement.seconds);

        if let Some(record) = self.records.iter_mut().find(|r| r.name == name) {
            record.power = power;
            record.minutes = minutes;
            record.seconds = seconds;
            return false;
        }
        let id = self.mint_id();
        self.records.push(Record {
            id,
            name: name.to_string(),
            power,
            minutes,
            seconds,
        });
        true
    }

    /// Remove the record with `id`. Refused (false) when it is the only record
    /// left, and false when no record has that id.
    pub fn delete(&mut self, id: u32) -> bool {
        if self.records.len() <= 1 {
            return false;
        }
        match self.records.iter().position(|r| r.id == id) {
            Some(index) => {
                self.records.remove(index);
                true
            }
            None => false,
        }
    }

    /// Performance of a single record under the current settings.
    pub fn performance_of(&self, record: &Record) -> Option<f64> {
        perf::evaluate(
            record.power,
            record.minutes.map(f64::from),
            record.seconds,
            self.settings.model.key(),
            self.settings.exponent,
        )
    }

    /// Measurable records, best first. Ties keep insertion order.
    pub fn rank(&self) -> Vec<Ranked<'_>> {
        let mut ranked: Vec<Ranked<'_>> = self
            .records
            .iter()
            .filter_map(|record| {
                self.performance_of(record)
                    .map(|performance| Ranked { record, performance })
            })
            .collect();
        ranked.sort_by(|a, b| b.performance.total_cmp(&a.performance));
        ranked
    }

    fn mint_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Default for RecordStore {
    /// Two sample tops, ids 1 and 2.
    fn default() -> Self {
        let mut store = Self::new();
        store.add("Bey A", Some(8100.0), Some(3), Some(12.15));
        store.add("Bey B", Some(5000.0), Some(2), Some(10.03));
        store
    }
}

/// `Bey A` for id 1 ... `Bey Z` for id 26, `Bey 27` onwards.
fn lettered_name(id: u32) -> String {
    match u8::try_from(id) {
        Ok(n @ 1..=26) => format!("Bey {}", char::from(b'@' + n)),
        _ => format!("Bey {id}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measurement(power: u16, minutes: u32, seconds: f64) -> Measurement {
        Measurement {
            power,
            minutes,
            seconds,
            shoot_count: 0,
        }
    }

    #[test]
    fn default_seeds_two_records() {
        let store = RecordStore::default();
        assert_eq!(store.len(), 2);
        assert_eq!(store.records()[0].id, 1);
        assert_eq!(store.records()[1].name, "Bey B");
        assert_eq!(store.next_id(), 3);
        assert_eq!(store.settings(), Settings::default());
    }

    #[test]
    fn add_mints_monotonic_ids() {
        let mut store = RecordStore::new();
        assert_eq!(store.add("x", None, None, None), 1);
        assert_eq!(store.add("y", None, None, None), 2);
        assert!(store.delete(2));
        assert_eq!(store.add("z", None, None, None), 3);
    }

    #[test]
    fn add_blank_name_gets_letter() {
        let mut store = RecordStore::default();
        let id = store.add("  ", None, None, None);
        assert_eq!(store.get(id).unwrap().name, "Bey C");
        assert_eq!(lettered_name(26), "Bey Z");
        assert_eq!(lettered_name(27), "Bey 27");
    }

    #[test]
    fn empty_fields_stay_empty() {
        let mut store = RecordStore::default();
        let id = store.add("new", None, None, None);
        let record = store.get(id).unwrap();
        assert_eq!(record.power, None);
        assert_eq!(record.minutes, None);
        assert!(store.performance_of(record).is_none());
    }

    #[test]
    fn update_patches_fields() {
        let mut store = RecordStore::default();
        let patch = RecordPatch {
            power: Some(Some(6000.0)),
            seconds: Some(None),
            ..Default::default()
        };
        assert!(store.update(2, patch));
        let record = store.get(2).unwrap();
        assert_eq!(record.power, Some(6000.0));
        assert_eq!(record.seconds, None);
        assert_eq!(record.minutes, Some(2));
        assert_eq!(record.name, "Bey B");
        assert!(!store.update(99, RecordPatch::default()));
    }

    #[test]
    fn upsert_adds_then_updates() {
        let mut store = RecordStore::default();
        assert!(store.upsert_by_name("X", &measurement(900, 1, 5.5)));
        assert!(!store.upsert_by_name("X", &measurement(1000, 2, 1.25)));
        let named: Vec<_> = store.records().iter().filter(|r| r.name == "X").collect();
        assert_eq!(named.len(), 1);
        assert_eq!(named[0].power, Some(1000.0));
        assert_eq!(named[0].minutes, Some(2));
        assert_eq!(named[0].seconds, Some(1.25));
        assert_eq!(named[0].id, 3);
    }

    #[test]
    fn minutes_are_whole_and_feed_total_time() {
        let mut store = RecordStore::new();
        let id = store.add("timed", Some(400.0), Some(1), Some(30.5));
        assert_eq!(store.get(id).unwrap().minutes, Some(1));
        let p = store.performance_of(store.get(id).unwrap()).unwrap();
        assert!((p - 90.5 / 20.0).abs() < 1e-9);

        assert!(store.update(
            id,
            RecordPatch {
                minutes: Some(Some(2)),
                ..Default::default()
            }
        ));
        let p = store.performance_of(store.get(id).unwrap()).unwrap();
        assert!((p - 150.5 / 20.0).abs() < 1e-9);
    }

    #[test]
    fn upsert_matches_first_duplicate() {
        let mut store = RecordStore::new();
        let first = store.add("dup", None, None, None);
        let second = store.add("dup", None, None, None);
        assert!(!store.upsert_by_name("dup", &measurement(100, 0, 30.0)));
        assert_eq!(store.get(first).unwrap().power, Some(100.0));
        assert_eq!(store.get(second).unwrap().power, None);
    }

    #[test]
    fn delete_keeps_one() {
        let mut store = RecordStore::default();
        assert!(!store.delete(42));
        assert_eq!(store.len(), 2);
        assert!(store.delete(1));
        assert_eq!(store.len(), 1);
        assert!(!store.delete(2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn rank_descending_and_skips_unmeasurable() {
        let mut store = RecordStore::default();
        store.add("unmeasured", None, None, None);
        store.add("slow", Some(9000.0), Some(0), Some(30.0));
        let ranked = store.rank();
        let names: Vec<_> = ranked.iter().map(|r| r.record.name.as_str()).collect();
        assert_eq!(names, vec!["Bey A", "Bey B", "slow"]);
        assert!(ranked.windows(2).all(|w| w[0].performance >= w[1].performance));
        assert!((ranked[0].performance - 192.15 / 90.0).abs() < 1e-9);
    }

    #[test]
    fn rank_ties_keep_order() {
        let mut store = RecordStore::new();
        store.add("first", Some(100.0), Some(1), Some(0.0));
        store.add("second", Some(100.0), Some(1), Some(0.0));
        store.add("third", Some(400.0), Some(1), Some(0.0));
        let names: Vec<_> = store.rank().iter().map(|r| r.record.name.clone()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn rank_is_idempotent() {
        let store = RecordStore::default();
        assert_eq!(store.rank(), store.rank());
    }

    #[test]
    fn settings_change_ranking() {
        let mut store = RecordStore::new();
        store.add("light", Some(2.0), Some(0), Some(10.0));
        store.add("heavy", Some(10_000.0), Some(1), Some(40.0));
        store.set_model(Model::Linear);
        assert_eq!(store.rank()[0].record.name, "light");

        store.set_model(Model::Power);
        assert!(!store.set_exponent(0.0));
        assert!(!store.set_exponent(f64::NAN));
        assert!(store.set_exponent(0.1));
        assert_eq!(store.settings().exponent, 0.1);
        assert_eq!(store.rank()[0].record.name, "heavy");
    }

    #[test]
    fn log_model_drops_unit_power() {
        let mut store = RecordStore::new();
        store.add("one", Some(1.0), Some(1), Some(0.0));
        store.set_model(Model::Log);
        assert!(store.rank().is_empty());
    }
}
