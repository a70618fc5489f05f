//! Rule-based verb lemmatizer.
//!
//! Reduces inflected verb forms to a base form: `works` to `work`, `tried`
//! to `try`, `running` to `run`, `went` to `go`. Irregular forms come from a
//! lookup table. Regular forms go through suffix rules in the spirit of the
//! Porter stemmer, followed by a restore step that puts back a silent `e` or
//! undoes consonant doubling.
//!
//! Rules are applied repeatedly until none matches, so every output is a
//! fixed point: lemmatizing a lemma returns it unchanged.

use std::borrow::Cow;

use rustc_hash::{FxHashMap, FxHashSet};

/// Irregular inflections and their base form.
const IRREGULAR: &[(&str, &str)] = &[
    ("ate", "eat"),
    ("eaten", "eat"),
    ("began", "begin"),
    ("begun", "begin"),
    ("bit", "bite"),
    ("bitten", "bite"),
    ("bought", "buy"),
    ("broke", "break"),
    ("broken", "break"),
    ("brought", "bring"),
    ("built", "build"),
    ("came", "come"),
    ("caught", "catch"),
    ("chose", "choose"),
    ("chosen", "choose"),
    ("dealt", "deal"),
    ("drank", "drink"),
    ("drunk", "drink"),
    ("drove", "drive"),
    ("driven", "drive"),
    ("dug", "dig"),
    ("dyed", "dye"),
    ("dying", "die"),
    ("fed", "feed"),
    ("fell", "fall"),
    ("fallen", "fall"),
    ("felt", "feel"),
    ("fled", "flee"),
    ("flew", "fly"),
    ("flown", "fly"),
    ("forgot", "forget"),
    ("forgotten", "forget"),
    ("fought", "fight"),
    ("found", "find"),
    ("gave", "give"),
    ("given", "give"),
    ("goes", "go"),
    ("gone", "go"),
    ("went", "go"),
    ("got", "get"),
    ("gotten", "get"),
    ("grew", "grow"),
    ("grown", "grow"),
    ("heard", "hear"),
    ("held", "hold"),
    ("hid", "hide"),
    ("hidden", "hide"),
    ("kept", "keep"),
    ("knew", "know"),
    ("known", "know"),
    ("led", "lead"),
    ("left", "leave"),
    ("lent", "lend"),
    ("lost", "lose"),
    ("lying", "lie"),
    ("made", "make"),
    ("meant", "mean"),
    ("met", "meet"),
    ("paid", "pay"),
    ("ran", "run"),
    ("rode", "ride"),
    ("ridden", "ride"),
    ("rose", "rise"),
    ("risen", "rise"),
    ("said", "say"),
    ("sang", "sing"),
    ("sung", "sing"),
    ("sat", "sit"),
    ("saw", "see"),
    ("seen", "see"),
    ("sent", "send"),
    ("shook", "shake"),
    ("shaken", "shake"),
    ("slept", "sleep"),
    ("sold", "sell"),
    ("spent", "spend"),
    ("spoke", "speak"),
    ("spoken", "speak"),
    ("stole", "steal"),
    ("stolen", "steal"),
    ("stood", "stand"),
    ("swam", "swim"),
    ("taken", "take"),
    ("took", "take"),
    ("taught", "teach"),
    ("thought", "think"),
    ("threw", "throw"),
    ("thrown", "throw"),
    ("told", "tell"),
    ("tore", "tear"),
    ("torn", "tear"),
    ("tying", "tie"),
    ("understood", "understand"),
    ("woke", "wake"),
    ("woken", "wake"),
    ("wore", "wear"),
    ("worn", "wear"),
    ("wrote", "write"),
    ("written", "write"),
];

/// Words that look inflected but are left alone.
const EXCEPTIONS: &[&str] = &[
    "always", "perhaps", "whereas", "news", "series", "species", "lens", "bias", "yes", "plus",
    "thus", "bus", "gas", "basis", "crisis", "analysis", "something", "nothing", "anything",
    "everything", "morning", "evening", "ceiling", "pudding", "wedding", "hundred", "naked",
    "sacred", "wicked",
];

/// Stems whose base form ends in a silent `e` the restore rules cannot infer.
const SILENT_E_STEMS: &[&str] = &[
    "creat", "tast", "wast", "past", "receiv", "believ", "arriv", "purchas", "serv", "deserv",
    "observ", "leav", "prov", "improv", "remov", "approv", "continu", "rescu", "valu", "issu", "argu",
    "caus", "pleas", "releas", "increas", "decreas", "chang", "charg", "arrang", "manag",
    "imagin", "determin", "examin", "compar", "prepar", "declin", "combin", "requir", "acquir",
    "inspir", "expir", "retir", "produc", "reduc", "introduc", "advertis", "promis", "pric",
    "plac", "replac", "notic", "practic", "balanc", "squeez", "sneez", "freez",
];

/// Nouns ending in `-ie` whose plural would otherwise fold to `-y`.
const IE_PLURAL_STEMS: &[&str] = &[
    "cook", "mov", "brown", "calor", "smooth", "good", "vegg", "hood", "rook", "zomb",
];

/// Suffixes dropped as `es` rather than `s`.
const ES_SUFFIXES: &[&str] = &["sses", "xes", "zzes", "ches", "shes"];

#[inline]
fn is_vowel(b: u8) -> bool {
    matches!(b, b'a' | b'e' | b'i' | b'o' | b'u')
}

/// Vowel test where `y` after a consonant counts as a vowel.
fn has_vowel(stem: &[u8]) -> bool {
    stem.iter()
        .enumerate()
        .any(|(i, &b)| is_vowel(b) || (b == b'y' && i > 0 && !is_vowel(stem[i - 1])))
}

/// Number of vowel-consonant sequences.
fn measure(stem: &[u8]) -> usize {
    let mut count = 0;
    let mut prev_vowel = false;
    for &b in stem {
        let vowel = is_vowel(b);
        if !vowel && prev_vowel {
            count += 1;
        }
        prev_vowel = vowel;
    }
    count
}

/// Consonant-vowel-consonant ending, last consonant not `w`, `x` or `y`.
fn ends_with_cvc(stem: &[u8]) -> bool {
    match stem {
        [.., a, b, c] => {
            !is_vowel(*a) && is_vowel(*b) && !is_vowel(*c) && !matches!(c, b'w' | b'x' | b'y')
        }
        _ => false,
    }
}

/// Verb lemmatizer over lowercase ASCII words.
///
/// ```
/// use polarity_core::analyzer::VerbLemmatizer;
///
/// let lemmatizer = VerbLemmatizer::new();
/// assert_eq!(lemmatizer.lemmatize("works"), "work");
/// assert_eq!(lemmatizer.lemmatize("hoped"), "hope");
/// assert_eq!(lemmatizer.lemmatize("went"), "go");
/// ```
#[derive(Debug, Clone)]
pub struct VerbLemmatizer {
    irregular: FxHashMap<&'static str, &'static str>,
    protected: FxHashSet<&'static str>,
    silent_e: FxHashSet<&'static str>,
    ie_plurals: FxHashSet<&'static str>,
}

impl Default for VerbLemmatizer {
    fn default() -> Self {
        Self::new()
    }
}

impl VerbLemmatizer {
    /// Lemmatizer with the built-in irregular-verb table.
    pub fn new() -> Self {
        let irregular: FxHashMap<_, _> = IRREGULAR.iter().copied().collect();
        let protected = IRREGULAR
            .iter()
            .map(|&(_, base)| base)
            .chain(EXCEPTIONS.iter().copied())
            .collect();

        Self {
            irregular,
            protected,
            silent_e: SILENT_E_STEMS.iter().copied().collect(),
            ie_plurals: IE_PLURAL_STEMS.iter().copied().collect(),
        }
    }

    /// Returns the base form of `word`, borrowing when nothing changes.
    pub fn lemmatize<'a>(&self, word: &'a str) -> Cow<'a, str> {
        let mut current = Cow::Borrowed(word);
        while let Some(next) = self.step(&current) {
            current = Cow::Owned(next);
        }
        current
    }

    /// One rewrite, or `None` when `word` is already a base form.
    ///
    /// Every rule except the irregular lookup shortens the word, and irregular
    /// targets are protected, so repeated application terminates.
    fn step(&self, word: &str) -> Option<String> {
        if !word.bytes().all(|b| b.is_ascii_lowercase()) {
            return None;
        }
        if self.protected.contains(word) {
            return None;
        }
        if let Some(&base) = self.irregular.get(word) {
            return Some(base.to_owned());
        }
        if word.len() < 4 {
            return None;
        }

        if let Some(stem) = word.strip_suffix("ies") {
            if self.ie_plurals.contains(stem) {
                return Some(format!("{stem}ie"));
            }
            return Some(if stem.len() >= 2 {
                format!("{stem}y")
            } else {
                word[..word.len() - 1].to_owned()
            });
        }

        if ES_SUFFIXES.iter().any(|s| word.ends_with(s)) {
            return Some(word[..word.len() - 2].to_owned());
        }

        if word.ends_with('s') {
            if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
                return None;
            }
            return Some(word[..word.len() - 1].to_owned());
        }

        if word.ends_with("eed") {
            return None;
        }

        if let Some(stem) = word.strip_suffix("ied") {
            return Some(if stem.len() >= 2 {
                format!("{stem}y")
            } else {
                word[..word.len() - 1].to_owned()
            });
        }

        for suffix in ["ed", "ing"] {
            if let Some(stem) = word.strip_suffix(suffix) {
                if stem.len() >= 2 && has_vowel(stem.as_bytes()) {
                    return Some(self.restore(stem));
                }
                return None;
            }
        }

        None
    }

    /// Rebuilds a base form from a stem left by removing `-ed` or `-ing`.
    fn restore(&self, stem: &str) -> String {
        let bytes = stem.as_bytes();
        let n = bytes.len();

        if self.protected.contains(stem) {
            return stem.to_owned();
        }
        if self.silent_e.contains(stem) {
            return format!("{stem}e");
        }

        let last = bytes[n - 1];
        if n > 3
            && last == bytes[n - 2]
            && !is_vowel(last)
            && !matches!(last, b'l' | b's' | b'z' | b'f')
        {
            return stem[..n - 1].to_owned();
        }

        if stem.ends_with("bl")
            || stem.ends_with("iz")
            || (stem.ends_with("at") && n > 2 && !is_vowel(bytes[n - 3]))
        {
            return format!("{stem}e");
        }

        if measure(bytes) == 1 && ends_with_cvc(bytes) {
            return format!("{stem}e");
        }

        if n == 2 && is_vowel(bytes[0]) && !is_vowel(bytes[1]) {
            return format!("{stem}e");
        }

        stem.to_owned()
    }
}
