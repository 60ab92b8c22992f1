//! Works out which plates go on each side of the bar for a requested weight.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Plate, WeightUnit};

/// One plate on one side of the bar, in the unit the load was computed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedPlate {
    pub weight: Decimal,
    pub color: String,
    pub already_loaded: bool,
}

/// Plates for one side of the bar, innermost first.
///
/// `remainder` is the per-side weight the inventory could not discharge. It is
/// negative when the bar and collars alone are heavier than the target.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LoadedStack {
    pub plates: Vec<LoadedPlate>,
    pub remainder: Option<Decimal>,
}

impl LoadedStack {
    pub fn is_fully_loaded(&self) -> bool {
        self.remainder.is_none()
    }

    pub fn per_side_total(&self) -> Decimal {
        self.plates.iter().map(|p| p.weight).sum()
    }

    /// Flat sequence where an unloadable remainder is appended as a plate with
    /// negative weight, for consumers that render a single list. The sentinel
    /// is negative whichever side of the target the remainder falls on.
    pub fn display_sequence(&self) -> Vec<LoadedPlate> {
        let mut sequence = self.plates.clone();
        if let Some(remainder) = self.remainder {
            sequence.push(LoadedPlate {
                weight: -remainder.abs(),
                color: String::new(),
                already_loaded: false,
            });
        }
        sequence
    }
}

/// Load `target` onto a bar weighing `bar_and_collars`, heaviest plates first.
///
/// All weights are given in kg. When `use_kg` is false every weight is
/// converted to pounds (rounded to 2 places) before loading, and the returned
/// stack is in pounds.
pub fn load_bar(
    target: Decimal,
    bar_and_collars: Decimal,
    plates: &[Plate],
    use_kg: bool,
) -> LoadedStack {
    let unit = if use_kg { WeightUnit::Kg } else { WeightUnit::Lbs };

    let target = unit.from_kg(target);
    let bar_and_collars = unit.from_kg(bar_and_collars);

    let mut available: Vec<(Decimal, &str, u32)> = plates
        .iter()
        .filter(|p| p.weight_kg > Decimal::ZERO && p.pairs_available > 0)
        .map(|p| (unit.from_kg(p.weight_kg), p.color.as_str(), p.pairs_available))
        .collect();
    available.sort_by(|a, b| b.0.cmp(&a.0));

    let mut per_side = (target - bar_and_collars) / Decimal::TWO;
    let mut loaded = Vec::new();

    while per_side > Decimal::ZERO {
        let Some(plate) = available
            .iter_mut()
            .find(|(weight, _, pairs)| *pairs > 0 && *weight <= per_side)
        else {
            break;
        };

        plate.2 -= 1;
        per_side -= plate.0;
        loaded.push(LoadedPlate {
            weight: plate.0,
            color: plate.1.to_string(),
            already_loaded: false,
        });
    }

    let remainder = if per_side.is_zero() {
        None
    } else {
        Some(per_side.normalize())
    };

    if let Some(remainder) = remainder {
        tracing::debug!(
            "Cannot load {}{}: {} per side left over",
            target,
            unit.as_str(),
            remainder
        );
    }

    LoadedStack {
        plates: loaded,
        remainder,
    }
}

/// Flag the plates of `current` that sit in the same position in `previous`,
/// i.e. the run that can stay on the bar between the two loads.
pub fn mark_already_loaded(current: &mut LoadedStack, previous: &LoadedStack) {
    for plate in current.plates.iter_mut() {
        plate.already_loaded = false;
    }

    for (plate, prev) in current.plates.iter_mut().zip(previous.plates.iter()) {
        if plate.weight != prev.weight {
            break;
        }
        plate.already_loaded = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn kg(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    fn small_set() -> Vec<Plate> {
        vec![
            Plate::new(kg("25"), "red", 4),
            Plate::new(kg("10"), "green", 4),
            Plate::new(kg("5"), "white", 4),
            Plate::new(kg("2.5"), "black", 4),
        ]
    }

    fn weights(stack: &LoadedStack) -> Vec<Decimal> {
        stack.plates.iter().map(|p| p.weight).collect()
    }

    #[test]
    fn test_loads_180_on_20kg_bar() {
        let stack = load_bar(kg("180"), kg("20"), &small_set(), true);

        assert_eq!(weights(&stack), vec![kg("25"), kg("25"), kg("25"), kg("5")]);
        assert!(stack.is_fully_loaded());
        assert_eq!(stack.per_side_total(), kg("80"));
    }

    #[test]
    fn test_pair_counts_are_respected() {
        let plates = vec![Plate::new(kg("25"), "red", 1), Plate::new(kg("10"), "green", 8)];
        let stack = load_bar(kg("120"), kg("20"), &plates, true);

        assert_eq!(weights(&stack), vec![kg("25"), kg("10"), kg("10")]);
        assert_eq!(stack.remainder, Some(kg("5")));
    }

    #[test]
    fn test_reports_unloadable_remainder() {
        let stack = load_bar(kg("101"), kg("20"), &small_set(), true);

        // 40.5 per side: 25 + 10 + 5, 0.5 left
        assert_eq!(weights(&stack), vec![kg("25"), kg("10"), kg("5")]);
        assert_eq!(stack.remainder, Some(kg("0.5")));

        let sequence = stack.display_sequence();
        assert_eq!(sequence.len(), 4);
        assert_eq!(sequence[3].weight, kg("-0.5"));
    }

    #[test]
    fn test_target_below_bar() {
        let stack = load_bar(kg("15"), kg("20"), &small_set(), true);

        assert!(stack.plates.is_empty());
        assert_eq!(stack.remainder, Some(kg("-2.5")));

        let sequence = stack.display_sequence();
        assert_eq!(sequence.len(), 1);
        assert!(sequence[0].weight < Decimal::ZERO);
        assert_eq!(sequence[0].weight, kg("-2.5"));
    }

    #[test]
    fn test_bar_only() {
        let stack = load_bar(kg("25"), kg("25"), &Plate::ipf_defaults(), true);
        assert!(stack.plates.is_empty());
        assert!(stack.is_fully_loaded());
    }

    #[test]
    fn test_symmetry_over_range_of_targets() {
        let plates = Plate::ipf_defaults();
        let bar = kg("25");
        let mut target = kg("25");

        while target <= kg("400") {
            let stack = load_bar(target, bar, &plates, true);
            let remainder = stack.remainder.unwrap_or(Decimal::ZERO);
            assert_eq!(
                bar + Decimal::TWO * stack.per_side_total(),
                target - Decimal::TWO * remainder,
                "target {}",
                target
            );
            target += kg("0.5");
        }
    }

    #[test]
    fn test_pounds_conversion() {
        let plates = vec![Plate::new(kg("20.4117"), "red", 4)];
        // 20.4117 kg is 45 lb; 102.0585 kg is 225 lb on a 45 lb bar.
        let stack = load_bar(kg("102.0585"), kg("20.4117"), &plates, false);

        assert_eq!(stack.plates.len(), 2);
        assert_eq!(stack.plates[0].weight, kg("45.00"));
        assert!(stack.is_fully_loaded());
    }

    #[test]
    fn test_zero_weight_plates_are_ignored() {
        let plates = vec![Plate::new(Decimal::ZERO, "none", 10), Plate::new(kg("5"), "white", 1)];
        let stack = load_bar(kg("40"), kg("20"), &plates, true);

        assert_eq!(weights(&stack), vec![kg("5")]);
        assert_eq!(stack.remainder, Some(kg("5")));
    }

    #[test]
    fn test_mark_already_loaded_common_prefix() {
        let plates = Plate::ipf_defaults();
        let previous = load_bar(kg("200"), kg("25"), &plates, true);
        let mut current = load_bar(kg("207.5"), kg("25"), &plates, true);

        // 87.5 per side: 25,25,25,10,2.5 ; 91.25 per side: 25,25,25,15,1.25
        mark_already_loaded(&mut current, &previous);

        let flags: Vec<bool> = current.plates.iter().map(|p| p.already_loaded).collect();
        assert_eq!(flags, vec![true, true, true, false, false]);
    }
}
