use engine::MeetConfig;
use engine::models::{Entry, Equipment, Event, Lift, SessionKey, Sex};
use engine::services::{LoadedStack, load_bar, mark_already_loaded, order, points};
use rust_decimal::Decimal;

pub fn bar_load(config: &MeetConfig, lift: Lift, weight: Decimal, previous: Option<Decimal>) -> LoadedStack {
    let bar = config.bar_for(lift);
    let mut stack = load_bar(weight, bar, &config.plates, config.use_kg());
    if let Some(previous) = previous {
        let before = load_bar(previous, bar, &config.plates, config.use_kg());
        mark_already_loaded(&mut stack, &before);
    }
    stack
}

pub fn render_stack(config: &MeetConfig, weight: Decimal, stack: &LoadedStack) -> String {
    let unit = config.units.as_str();
    let mut out = format!("{}{} per side:", weight, unit);
    if stack.plates.is_empty() {
        out.push_str(" bar only");
    }
    for plate in &stack.plates {
        let marker = if plate.already_loaded { "=" } else { "+" };
        out.push_str(&format!(" {}{}", marker, plate.weight.normalize()));
    }
    match stack.remainder {
        Some(remainder) if remainder.is_sign_negative() => {
            let short = (-remainder * Decimal::TWO).normalize();
            out.push_str(&format!(" | target below bar by {}{}", short, unit));
        }
        Some(remainder) => {
            out.push_str(&format!(" | cannot load {}{} per side", remainder.normalize(), unit));
        }
        None => {}
    }
    out
}

pub fn score(total: Decimal, bodyweight: Decimal, sex: Sex, equipment: Equipment, event: Event) -> String {
    let score = points(total, bodyweight, sex, equipment, event);
    if score.is_zero() {
        format!("{} (invalid input)", score)
    } else {
        score.to_string()
    }
}

pub fn render_order(entries: &[Entry], session: &SessionKey, lift: Lift, attempt: u8) -> String {
    order(entries, session, lift, attempt)
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let weight = entry
                .slot(lift, attempt)
                .and_then(|slot| slot.declared_weight)
                .map(|w| w.normalize().to_string())
                .unwrap_or_else(|| "-".to_string());
            format!("{:>2}. {:<24} {}", i + 1, entry.name, weight)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
