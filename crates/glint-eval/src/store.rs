//! The LED domain store.
//!
//! A fixed-capacity collection of named light arrays. Each light slot
//! holds its raw RGB triple plus the symbolic colour name derived from
//! the classification table. Dump/save rendering lives here too: lights
//! are grouped three to a row, and a partial final row shows the
//! initialized defaults (`0-0-0` / `OFF`) in its missing cells.

use crate::error::{ErrorKind, EvalResult};
use std::fmt;

/// Frame line used by the console dump layouts.
pub const FRAME_LINE: &str = "||-------------------------------------||";

/// Symbolic colour names derived from an RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colour {
    Off,
    White,
    Black,
    Red,
    Lime,
    Blue,
    Yellow,
    Aqua,
    Magenta,
    Silver,
    /// Never produced: its guard is identical to the second SILVER band
    /// and is checked after it. Kept because the language's fixed rule
    /// table includes it.
    Gray,
    Maroon,
    Olive,
    /// Never produced: shadowed by the MAROON band, whose guard is
    /// strictly wider. Kept for the same reason as `Gray`.
    Green,
    Navy,
    Purple,
    Teal,
    Unknown,
}

impl Colour {
    pub fn as_str(self) -> &'static str {
        match self {
            Colour::Off => "OFF",
            Colour::White => "WHITE",
            Colour::Black => "BLACK",
            Colour::Red => "RED",
            Colour::Lime => "LIME",
            Colour::Blue => "BLUE",
            Colour::Yellow => "YELLOW",
            Colour::Aqua => "AQUA",
            Colour::Magenta => "MAGENTA",
            Colour::Silver => "SILVER",
            Colour::Gray => "GRAY",
            Colour::Maroon => "MAROON",
            Colour::Olive => "OLIVE",
            Colour::Green => "GREEN",
            Colour::Navy => "NAVY",
            Colour::Purple => "PURPLE",
            Colour::Teal => "TEAL",
            Colour::Unknown => "UNKNOWN",
        }
    }

    /// Classify an RGB triple. The rules run in a fixed priority order;
    /// the first match wins.
    #[allow(clippy::if_same_then_else)]
    pub fn classify(r: i64, g: i64, b: i64) -> Colour {
        if r > 180 && g > 180 && b > 180 {
            Colour::White
        } else if r < 100 && g < 100 && b < 100 {
            Colour::Black
        } else if r > 180 && g < 99 && b < 99 {
            Colour::Red
        } else if r < 100 && g > 180 && b < 100 {
            Colour::Lime
        } else if r < 100 && g < 100 && b > 180 {
            Colour::Blue
        } else if r > 180 && g > 180 && b < 100 {
            Colour::Yellow
        } else if r < 100 && g > 180 && b > 180 {
            Colour::Aqua
        } else if r > 180 && g < 100 && b > 180 {
            Colour::Magenta
        } else if in_bright(r) && in_bright(g) && in_bright(b) {
            Colour::Silver
        } else if in_mid(r) && in_mid(g) && in_mid(b) {
            Colour::Silver
        } else if in_mid(r) && in_mid(g) && in_mid(b) {
            // Unreachable: same guard as the SILVER band above.
            Colour::Gray
        } else if in_mid(r) && g < 100 && b < 100 {
            Colour::Maroon
        } else if in_mid(r) && in_mid(g) && b < 99 {
            Colour::Olive
        } else if in_mid(g) && r < 99 && b < 99 {
            // The rule table labels the green-dominant band MAROON.
            Colour::Maroon
        } else if in_mid(r) && g < 99 && b < 99 {
            // Unreachable: shadowed by the wider MAROON band above.
            Colour::Green
        } else if in_mid(b) && g < 99 && r < 99 {
            Colour::Navy
        } else if in_mid(r) && in_mid(b) && g < 99 {
            Colour::Purple
        } else if in_mid(b) && in_mid(g) && r < 99 {
            Colour::Teal
        } else {
            Colour::Unknown
        }
    }
}

/// The mid-range band shared by several rules: strictly between 100 and 190.
fn in_mid(channel: i64) -> bool {
    channel > 100 && channel < 190
}

/// The bright band of the first SILVER rule: strictly between 155 and 225.
fn in_bright(channel: i64) -> bool {
    channel > 155 && channel < 225
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One light slot: raw channels plus the derived colour name.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub channels: [i64; 3],
    pub colour: Colour,
}

impl Light {
    fn off() -> Self {
        Self {
            channels: [0, 0, 0],
            colour: Colour::Off,
        }
    }

    /// The raw `R-G-B` record.
    pub fn record(&self) -> String {
        let [r, g, b] = self.channels;
        format!("{r}-{g}-{b}")
    }
}

/// A named, fixed-size sequence of lights.
#[derive(Debug)]
pub struct LedArray {
    name: String,
    lights: Vec<Light>,
}

impl LedArray {
    fn new(name: &str, size: usize) -> Self {
        Self {
            name: name.to_string(),
            lights: vec![Light::off(); size],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.lights.len()
    }

    /// The light at a 1-based language index.
    pub fn light(&self, index: i64) -> Option<&Light> {
        let index = usize::try_from(index.checked_sub(1)?).ok()?;
        self.lights.get(index)
    }

    /// Ceiling-divided row count for the three-per-row layouts.
    pub fn row_count(&self) -> usize {
        self.lights.len().div_ceil(3)
    }

    fn rows(&self, cell: impl Fn(&Light) -> String, sep: &str, lead: &str) -> Vec<String> {
        let default = Light::off();
        (0..self.row_count())
            .map(|row| {
                let mut line = String::from(lead);
                for col in 0..3 {
                    if col > 0 {
                        line.push_str(sep);
                    }
                    let light = self.lights.get(row * 3 + col).unwrap_or(&default);
                    line.push_str(&cell(light));
                }
                line
            })
            .collect()
    }

    /// Console `write` rows: `||<r-g-b>||<r-g-b>||<r-g-b>`.
    pub fn record_rows(&self) -> Vec<String> {
        self.rows(Light::record, "||", "||")
    }

    /// Console `info` rows: `||<NAME>||<NAME>||<NAME>`.
    pub fn colour_rows(&self) -> Vec<String> {
        self.rows(|l| l.colour.to_string(), "||", "||")
    }

    /// Persistence rows: `|<r-g-b>|<r-g-b>|<r-g-b>`.
    pub fn file_rows(&self) -> Vec<String> {
        self.rows(Light::record, "|", "|")
    }
}

/// The collection of declared arrays, bounded by the configured limits.
#[derive(Debug)]
pub struct LightStore {
    arrays: Vec<LedArray>,
    max_arrays: usize,
    max_lights: usize,
}

impl LightStore {
    pub fn new(max_arrays: usize, max_lights: usize) -> Self {
        Self {
            arrays: Vec::new(),
            max_arrays,
            max_lights,
        }
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// Declare a new array, every slot off.
    pub fn declare(&mut self, size: i64, name: &str) -> EvalResult<()> {
        if self.arrays.len() >= self.max_arrays {
            return Err(ErrorKind::ArrayCapacity(self.max_arrays).into());
        }
        if self.get(name).is_some() {
            return Err(ErrorKind::DuplicateArray(name.to_string()).into());
        }
        if size < 0 || size as usize > self.max_lights {
            return Err(ErrorKind::LightCapacity {
                name: name.to_string(),
                max: self.max_lights,
            }
            .into());
        }
        self.arrays.push(LedArray::new(name, size as usize));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&LedArray> {
        self.arrays.iter().find(|a| a.name == name)
    }

    /// Set one light of a named array. An unknown name is reported as
    /// `ArrayNotFound`, which the evaluator treats as non-fatal; an
    /// out-of-range index is a hard failure.
    pub fn update(&mut self, name: &str, index: i64, r: i64, g: i64, b: i64) -> EvalResult<()> {
        let array = self
            .arrays
            .iter_mut()
            .find(|a| a.name == name)
            .ok_or_else(|| ErrorKind::ArrayNotFound(name.to_string()))?;
        if index < 1 || index as usize > array.lights.len() {
            return Err(ErrorKind::IndexOutOfRange {
                array: name.to_string(),
                index,
                size: array.lights.len(),
            }
            .into());
        }
        array.lights[index as usize - 1] = Light {
            channels: [r, g, b],
            colour: Colour::classify(r, g, b),
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_colours() {
        assert_eq!(Colour::classify(200, 200, 200), Colour::White);
        assert_eq!(Colour::classify(10, 10, 10), Colour::Black);
        assert_eq!(Colour::classify(200, 10, 10), Colour::Red);
        assert_eq!(Colour::classify(10, 200, 10), Colour::Lime);
        assert_eq!(Colour::classify(10, 10, 200), Colour::Blue);
        assert_eq!(Colour::classify(200, 200, 10), Colour::Yellow);
        assert_eq!(Colour::classify(10, 200, 200), Colour::Aqua);
        assert_eq!(Colour::classify(200, 10, 200), Colour::Magenta);
    }

    #[test]
    fn white_requires_strictly_more_than_180() {
        // Lands in the first SILVER band instead.
        assert_eq!(Colour::classify(180, 180, 180), Colour::Silver);
    }

    #[test]
    fn both_silver_bands_classify_as_silver() {
        assert_eq!(Colour::classify(200, 160, 160), Colour::Silver);
        assert_eq!(Colour::classify(120, 120, 120), Colour::Silver);
    }

    #[test]
    fn gray_is_unreachable() {
        // Any triple inside the GRAY guard hits the second SILVER band
        // first; above 180 the WHITE rule takes priority over both.
        for v in [101, 150, 180] {
            assert_eq!(Colour::classify(v, v, v), Colour::Silver);
        }
        assert_eq!(Colour::classify(189, 189, 189), Colour::White);
    }

    #[test]
    fn green_is_unreachable() {
        // Any triple inside the GREEN guard hits the MAROON band first.
        assert_eq!(Colour::classify(150, 10, 10), Colour::Maroon);
    }

    #[test]
    fn mid_range_bands() {
        assert_eq!(Colour::classify(150, 10, 10), Colour::Maroon);
        assert_eq!(Colour::classify(150, 150, 10), Colour::Olive);
        assert_eq!(Colour::classify(10, 150, 10), Colour::Maroon);
        assert_eq!(Colour::classify(10, 10, 150), Colour::Navy);
        assert_eq!(Colour::classify(150, 10, 150), Colour::Purple);
        assert_eq!(Colour::classify(10, 150, 150), Colour::Teal);
    }

    #[test]
    fn unmatched_triples_are_unknown() {
        assert_eq!(Colour::classify(240, 150, 10), Colour::Unknown);
    }

    #[test]
    fn declared_arrays_start_off() {
        let mut store = LightStore::new(10, 1000);
        store.declare(4, "strip").unwrap();
        let array = store.get("strip").unwrap();
        assert_eq!(array.size(), 4);
        for i in 1..=4 {
            let light = array.light(i).unwrap();
            assert_eq!(light.record(), "0-0-0");
            assert_eq!(light.colour, Colour::Off);
        }
    }

    #[test]
    fn capacity_and_naming_limits() {
        let mut store = LightStore::new(2, 1000);
        store.declare(1, "a").unwrap();
        store.declare(1, "b").unwrap();
        let err = store.declare(1, "c").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::ArrayCapacity(2)));

        let mut store = LightStore::new(10, 1000);
        store.declare(1, "a").unwrap();
        let err = store.declare(1, "a").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::DuplicateArray(_)));
        let err = store.declare(2000, "big").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::LightCapacity { .. }));
    }

    #[test]
    fn update_misses_and_bounds() {
        let mut store = LightStore::new(10, 1000);
        store.declare(3, "strip").unwrap();

        let err = store.update("nope", 1, 1, 2, 3).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::ArrayNotFound(_)));

        let err = store.update("strip", 0, 1, 2, 3).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::IndexOutOfRange { .. }));
        let err = store.update("strip", 4, 1, 2, 3).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::IndexOutOfRange { .. }));

        store.update("strip", 3, 200, 10, 10).unwrap();
        let light = store.get("strip").unwrap().light(3).unwrap();
        assert_eq!(light.record(), "200-10-10");
        assert_eq!(light.colour, Colour::Red);
    }

    #[test]
    fn row_rendering_groups_by_three() {
        let mut store = LightStore::new(10, 1000);
        store.declare(4, "strip").unwrap();
        store.update("strip", 4, 200, 10, 10).unwrap();
        let array = store.get("strip").unwrap();

        assert_eq!(array.row_count(), 2);
        assert_eq!(
            array.record_rows(),
            vec!["||0-0-0||0-0-0||0-0-0", "||200-10-10||0-0-0||0-0-0"]
        );
        assert_eq!(
            array.colour_rows(),
            vec!["||OFF||OFF||OFF", "||RED||OFF||OFF"]
        );
        assert_eq!(
            array.file_rows(),
            vec!["|0-0-0|0-0-0|0-0-0", "|200-10-10|0-0-0|0-0-0"]
        );
    }

    #[test]
    fn file_and_console_rows_agree_on_content() {
        let mut store = LightStore::new(10, 1000);
        store.declare(9, "grid").unwrap();
        for i in 1..=9 {
            store.update("grid", i, 200, 10, 10).unwrap();
        }
        let array = store.get("grid").unwrap();
        let stripped_console: Vec<String> = array
            .record_rows()
            .iter()
            .map(|row| row.replace("||", "|"))
            .collect();
        assert_eq!(stripped_console, array.file_rows());
        assert_eq!(array.file_rows().len(), 3);
    }
}
