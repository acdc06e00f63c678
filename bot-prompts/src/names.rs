//! Random first-name substitution for `NAME` placeholders.

use rand::Rng;
use rand::seq::SliceRandom;

/// Placeholder replaced with a freshly drawn first name.
pub const NAME_PLACEHOLDER: &str = "NAME";

/// First names drawn for `NAME` placeholders. All title-case, so no draw can
/// contain or complete the uppercase placeholder.
pub const FIRST_NAMES: &[&str] = &[
    "Aaron", "Abigail", "Adam", "Alice", "Amelia", "Andrew", "Anna", "Ava", "Benjamin", "Bella",
    "Caleb", "Charlotte", "Chloe", "Daniel", "David", "Diana", "Dylan", "Elena", "Eli", "Emily",
    "Emma", "Ethan", "Evelyn", "Felix", "Fiona", "Gabriel", "Grace", "Hannah", "Henry", "Isaac",
    "Isabel", "Jack", "Jacob", "James", "Julia", "Kevin", "Laura", "Leo", "Liam", "Lucas", "Lucy",
    "Maria", "Mason", "Mia", "Nathan", "Noah", "Nora", "Oliver", "Olivia", "Oscar", "Paul",
    "Quinn", "Rachel", "Ryan", "Samuel", "Sarah", "Sophia", "Thomas", "Victoria", "William",
    "Zoe",
];

/// Supplies one name per placeholder occurrence.
pub trait NameSource {
    /// Draws the next name. Draws are independent and may repeat.
    fn next_name(&mut self) -> String;
}

/// Draws uniformly from [`FIRST_NAMES`] using the wrapped generator.
#[derive(Debug)]
pub struct RandomNames<'a, R: Rng + ?Sized> {
    rng: &'a mut R,
}

impl<'a, R: Rng + ?Sized> RandomNames<'a, R> {
    /// Borrows `rng` for the duration of one substitution pass.
    pub fn new(rng: &'a mut R) -> Self {
        Self { rng }
    }
}

impl<R: Rng + ?Sized> NameSource for RandomNames<'_, R> {
    fn next_name(&mut self) -> String {
        FIRST_NAMES
            .choose(&mut *self.rng)
            .copied()
            .unwrap_or("Alex")
            .to_owned()
    }
}

/// Replaces each `NAME` in `text`, first occurrence first, with an
/// independent draw from `names`.
///
/// Scanning resumes after each inserted name, so the loop terminates after
/// exactly one draw per original occurrence.
pub fn substitute_names<S: NameSource + ?Sized>(text: &str, names: &mut S) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(NAME_PLACEHOLDER) {
        out.push_str(&rest[..pos]);
        out.push_str(&names.next_name());
        rest = &rest[pos + NAME_PLACEHOLDER.len()..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    struct Counting {
        draws: usize,
    }

    impl NameSource for Counting {
        fn next_name(&mut self) -> String {
            self.draws += 1;
            format!("<{}>", self.draws)
        }
    }

    #[test]
    fn text_without_placeholder_is_unchanged() {
        let mut names = Counting { draws: 0 };
        let text = "Me: \"hello\"\nBot: \"";
        assert_eq!(substitute_names(text, &mut names), text);
        assert_eq!(names.draws, 0);
    }

    #[test]
    fn each_occurrence_gets_its_own_draw() {
        let mut names = Counting { draws: 0 };
        let out = substitute_names("NAME met NAME and NAMENAME.", &mut names);
        assert_eq!(out, "<1> met <2> and <3><4>.");
        assert_eq!(names.draws, 4);
    }

    #[test]
    fn random_names_remove_every_placeholder() {
        let mut rng = StdRng::seed_from_u64(42);
        let template = "NAME: \"hi NAME\"\nNAME: \"";
        let out = substitute_names(template, &mut RandomNames::new(&mut rng));

        assert!(!out.contains(NAME_PLACEHOLDER));
        let inserted = out
            .split(|c: char| !c.is_alphabetic())
            .filter(|word| FIRST_NAMES.contains(word))
            .count();
        assert_eq!(inserted, 3);
    }

    #[test]
    fn first_names_never_contain_placeholder() {
        assert!(FIRST_NAMES.iter().all(|name| !name.contains(NAME_PLACEHOLDER)));
    }
}
