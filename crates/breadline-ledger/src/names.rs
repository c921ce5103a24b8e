//! Display-name generation.

use rand::Rng;
use rand::seq::IndexedRandom;

const ADJECTIVES: &[&str] = &[
    "Amber", "Ashen", "Bitter", "Brave", "Crooked", "Dusty", "Gentle", "Gilded", "Grim", "Hollow",
    "Honest", "Idle", "Lucky", "Merry", "Quiet", "Restless", "Rusty", "Silent", "Sly", "Stout",
    "Swift", "Thrifty", "Weary", "Wily",
];

const NOUNS: &[&str] = &[
    "Baker", "Boatman", "Carter", "Chandler", "Cooper", "Drover", "Ferryman", "Fishwife", "Gleaner",
    "Lamplighter", "Mason", "Miller", "Peddler", "Porter", "Reeve", "Ropemaker", "Sexton",
    "Tanner", "Thatcher", "Tinker", "Weaver", "Wheelwright",
];

/// Pick a display name not rejected by `taken`.
///
/// Names are "Adjective Noun". A collision gets a numeric suffix
/// (" 2", " 3", ...) until a free name is found.
pub fn generate_name<R: Rng + ?Sized>(rng: &mut R, taken: impl Fn(&str) -> bool) -> String {
    let adjective = ADJECTIVES.choose(rng).copied().unwrap_or("Nameless");
    let noun = NOUNS.choose(rng).copied().unwrap_or("Stranger");
    let base = format!("{adjective} {noun}");
    if !taken(&base) {
        return base;
    }
    let mut suffix: u32 = 2;
    loop {
        let candidate = format!("{base} {suffix}");
        if !taken(&candidate) {
            return candidate;
        }
        suffix = suffix.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn names_have_two_words() {
        let mut rng = SmallRng::seed_from_u64(1);
        let name = generate_name(&mut rng, |_| false);
        assert_eq!(name.split(' ').count(), 2);
    }

    #[test]
    fn collisions_get_suffixes() {
        let mut taken = BTreeSet::new();
        let first = generate_name(&mut SmallRng::seed_from_u64(9), |n| taken.contains(n));
        taken.insert(first.clone());
        let second = generate_name(&mut SmallRng::seed_from_u64(9), |n| taken.contains(n));
        assert_eq!(second, format!("{first} 2"));
        taken.insert(second);
        let third = generate_name(&mut SmallRng::seed_from_u64(9), |n| taken.contains(n));
        assert_eq!(third, format!("{first} 3"));
    }
}
