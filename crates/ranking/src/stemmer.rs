//! Porter stemmer.
//!
//! M.F. Porter's 1980 algorithm with the extensions NLTK's `PorterStemmer`
//! applies in its default mode: a small table of irregular forms, `ies`/`ied`
//! on four letter words keep their `e`, `y -> i` only after a consonant,
//! extra `fulli`/`lessli` step 2 rules, and two letter stems counting as
//! consonant-vowel-consonant. Only ASCII words are stemmed; anything else
//! comes back lowercased but otherwise untouched, as do words of one or two
//! letters.

/// Forms the suffix rules get wrong, mapped straight to their stem.
const IRREGULAR: &[(&str, &str)] = &[
    ("skies", "sky"),
    ("sky", "sky"),
    ("dying", "die"),
    ("lying", "lie"),
    ("tying", "tie"),
    ("news", "news"),
    ("innings", "inning"),
    ("inning", "inning"),
    ("outings", "outing"),
    ("outing", "outing"),
    ("cannings", "canning"),
    ("canning", "canning"),
    ("howe", "howe"),
    ("proceed", "proceed"),
    ("exceed", "exceed"),
    ("succeed", "succeed"),
];

/// Reduces `word` to its Porter stem.
///
/// ```
/// use ranking::stemmer::stem;
///
/// assert_eq!(stem("soldering"), "solder");
/// assert_eq!(stem("Solder"), "solder");
/// assert_eq!(stem("ties"), "tie");
/// ```
pub fn stem(word: &str) -> String {
    let lower = word.to_lowercase();
    if let Some((_, irregular)) = IRREGULAR.iter().find(|(form, _)| *form == lower) {
        return (*irregular).to_string();
    }
    if lower.len() <= 2 || !lower.is_ascii() {
        return lower;
    }
    let mut stemmer = Porter::new(lower.into_bytes());
    stemmer.run();
    stemmer.finish()
}

struct Porter {
    b: Vec<u8>,
    /// Index of the last character of the current stem.
    k: isize,
    /// Scratch end-of-stem set by a successful `ends`.
    j: isize,
}

impl Porter {
    fn new(b: Vec<u8>) -> Self {
        let k = b.len() as isize - 1;
        Self { b, k, j: 0 }
    }

    fn finish(mut self) -> String {
        self.b.truncate((self.k + 1) as usize);
        // Input was ASCII and only ASCII suffixes are written.
        String::from_utf8(self.b).unwrap_or_default()
    }

    fn at(&self, i: isize) -> u8 {
        self.b[i as usize]
    }

    fn cons(&self, i: isize) -> bool {
        match self.at(i) {
            b'a' | b'e' | b'i' | b'o' | b'u' => false,
            b'y' => i == 0 || !self.cons(i - 1),
            _ => true,
        }
    }

    /// Number of consonant-vowel sequences in `b[0..=j]`.
    fn m(&self) -> usize {
        let mut n = 0;
        let mut i = 0;
        loop {
            if i > self.j {
                return n;
            }
            if !self.cons(i) {
                break;
            }
            i += 1;
        }
        i += 1;
        loop {
            loop {
                if i > self.j {
                    return n;
                }
                if self.cons(i) {
                    break;
                }
                i += 1;
            }
            i += 1;
            n += 1;
            loop {
                if i > self.j {
                    return n;
                }
                if !self.cons(i) {
                    break;
                }
                i += 1;
            }
            i += 1;
        }
    }

    fn vowel_in_stem(&self) -> bool {
        (0..=self.j).any(|i| !self.cons(i))
    }

    fn double_c(&self, j: isize) -> bool {
        if j < 1 || self.at(j) != self.at(j - 1) {
            return false;
        }
        self.cons(j)
    }

    /// `b[i-2..=i]` is consonant-vowel-consonant and the last one is not w, x or y.
    /// A two letter `b[..=i]` only needs to be vowel-consonant.
    fn cvc(&self, i: isize) -> bool {
        if i == 1 {
            return !self.cons(0) && self.cons(1);
        }
        if i < 2 || !self.cons(i) || self.cons(i - 1) || !self.cons(i - 2) {
            return false;
        }
        !matches!(self.at(i), b'w' | b'x' | b'y')
    }

    fn ends(&mut self, s: &str) -> bool {
        let s = s.as_bytes();
        let len = s.len() as isize;
        if len > self.k + 1 {
            return false;
        }
        let start = (self.k - len + 1) as usize;
        if &self.b[start..=self.k as usize] != s {
            return false;
        }
        self.j = self.k - len;
        true
    }

    fn set_to(&mut self, s: &str) {
        self.b.truncate((self.j + 1) as usize);
        self.b.extend_from_slice(s.as_bytes());
        self.k = self.j + s.len() as isize;
    }

    fn r(&mut self, s: &str) {
        if self.m() > 0 {
            self.set_to(s);
        }
    }

    fn run(&mut self) {
        self.step1ab();
        if self.k > 0 {
            self.step1c();
            self.step2();
            self.step3();
            self.step4();
            self.step5();
        }
    }

    /// Plurals and `-ed` / `-ing`.
    fn step1ab(&mut self) {
        if self.at(self.k) == b's' {
            if self.ends("sses") {
                self.k -= 2;
            } else if self.ends("ies") {
                self.set_to(if self.k == 3 { "ie" } else { "i" });
            } else if self.at(self.k - 1) != b's' {
                self.k -= 1;
            }
        }
        if self.ends("ied") {
            self.set_to(if self.k == 3 { "ie" } else { "i" });
        } else if self.ends("eed") {
            if self.m() > 0 {
                self.k -= 1;
            }
        } else if (self.ends("ed") || self.ends("ing")) && self.vowel_in_stem() {
            self.k = self.j;
            if self.ends("at") {
                self.set_to("ate");
            } else if self.ends("bl") {
                self.set_to("ble");
            } else if self.ends("iz") {
                self.set_to("ize");
            } else if self.double_c(self.k) {
                self.k -= 1;
                if matches!(self.at(self.k), b'l' | b's' | b'z') {
                    self.k += 1;
                }
            } else if self.m() == 1 && self.cvc(self.k) {
                self.set_to("e");
            }
        }
    }

    /// Terminal `y` becomes `i` after a consonant, unless that leaves a single letter stem.
    fn step1c(&mut self) {
        if self.ends("y") && self.j >= 1 && self.cons(self.j) {
            let k = self.k as usize;
            self.b[k] = b'i';
        }
    }

    /// Double suffixes map to single ones.
    fn step2(&mut self) {
        // `alli` goes first and the result gets a second pass.
        if self.ends("alli") && self.m() > 0 {
            self.set_to("al");
            self.step2();
            return;
        }
        // Measured with the `l` still attached.
        if self.ends("logi") {
            self.j += 1;
            if self.m() > 0 {
                self.k -= 1;
            }
            return;
        }
        const RULES: &[(u8, &[(&str, &str)])] = &[
            (b'a', &[("ational", "ate"), ("tional", "tion")]),
            (b'c', &[("enci", "ence"), ("anci", "ance")]),
            (b'e', &[("izer", "ize")]),
            (
                b'l',
                &[
                    ("bli", "ble"),
                    ("entli", "ent"),
                    ("eli", "e"),
                    ("ousli", "ous"),
                    ("fulli", "ful"),
                    ("lessli", "less"),
                ],
            ),
            (
                b'o',
                &[("ization", "ize"), ("ation", "ate"), ("ator", "ate")],
            ),
            (
                b's',
                &[
                    ("alism", "al"),
                    ("iveness", "ive"),
                    ("fulness", "ful"),
                    ("ousness", "ous"),
                ],
            ),
            (
                b't',
                &[("aliti", "al"), ("iviti", "ive"), ("biliti", "ble")],
            ),
        ];
        let key = self.at(self.k - 1);
        self.replace_first(RULES, key);
    }

    /// `-ic-`, `-full`, `-ness` and friends.
    fn step3(&mut self) {
        const RULES: &[(u8, &[(&str, &str)])] = &[
            (b'e', &[("icate", "ic"), ("ative", ""), ("alize", "al")]),
            (b'i', &[("iciti", "ic")]),
            (b'l', &[("ical", "ic"), ("ful", "")]),
            (b's', &[("ness", "")]),
        ];
        let key = self.at(self.k);
        self.replace_first(RULES, key);
    }

    fn replace_first(&mut self, rules: &[(u8, &[(&str, &str)])], key: u8) {
        let Some((_, suffixes)) = rules.iter().find(|(c, _)| *c == key) else {
            return;
        };
        for (suffix, replacement) in suffixes.iter() {
            if self.ends(suffix) {
                self.r(replacement);
                return;
            }
        }
    }

    /// Strips `-ant`, `-ence` etc. from stems with measure above one.
    fn step4(&mut self) {
        let matched = match self.at(self.k - 1) {
            b'a' => self.ends("al"),
            b'c' => self.ends("ance") || self.ends("ence"),
            b'e' => self.ends("er"),
            b'i' => self.ends("ic"),
            b'l' => self.ends("able") || self.ends("ible"),
            b'n' => {
                self.ends("ant") || self.ends("ement") || self.ends("ment") || self.ends("ent")
            }
            b'o' => {
                (self.ends("ion") && self.j >= 0 && matches!(self.at(self.j), b's' | b't'))
                    || self.ends("ou")
            }
            b's' => self.ends("ism"),
            b't' => self.ends("ate") || self.ends("iti"),
            b'u' => self.ends("ous"),
            b'v' => self.ends("ive"),
            b'z' => self.ends("ize"),
            _ => false,
        };
        if matched && self.m() > 1 {
            self.k = self.j;
        }
    }

    /// Final `-e` and `-ll`.
    fn step5(&mut self) {
        self.j = self.k;
        if self.at(self.k) == b'e' {
            let a = self.m();
            if a > 1 || (a == 1 && !self.cvc(self.k - 1)) {
                self.k -= 1;
            }
        }
        if self.at(self.k) == b'l' && self.double_c(self.k) && self.m() > 1 {
            self.k -= 1;
        }
    }
}
