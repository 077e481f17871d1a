//! Double Metaphone phonetic encoding.
//!
//! Encodes a word into a primary and an alternate code approximating its
//! English pronunciation, following Lawrence Philips' Double Metaphone
//! rules. Spelling variants such as `Tokyo`/`Tokio` or `London`/`Londn`
//! share a primary code.

use serde::Serialize;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const VOWELS: &str = "AEIOUY";
const SILENT_START: &[&str] = &["GN", "KN", "PN", "WR", "PS"];
const L_R_N_M_B_H_F_V_W_SPACE: &[&str] = &["L", "R", "N", "M", "B", "H", "F", "V", "W", " "];
const ES_EP_EB_EL_EY_IB_IL_IN_IE_EI_ER: &[&str] = &[
    "ES", "EP", "EB", "EL", "EY", "IB", "IL", "IN", "IE", "EI", "ER",
];
const L_T_K_S_N_M_B_Z: &[&str] = &["L", "T", "K", "S", "N", "M", "B", "Z"];

/// Primary and alternate phonetic codes for one word.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhoneticCodes {
    pub primary: String,
    pub alternate: String,
}

/// Double Metaphone encoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DoubleMetaphone {
    max_length: Option<usize>,
}

impl DoubleMetaphone {
    /// Creates an encoder that keeps full-length codes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps both codes at `max` characters (classic Double Metaphone uses 4).
    pub fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    /// Primary code only.
    pub fn primary(&self, word: &str) -> String {
        self.encode(word).primary
    }

    /// Encodes a word. Leading and trailing whitespace is ignored and an
    /// empty word yields empty codes.
    pub fn encode(&self, word: &str) -> PhoneticCodes {
        let word = Word::new(word);
        if word.is_empty() {
            return PhoneticCodes::default();
        }

        let mut encoder = Encoder {
            word: &word,
            out: Codes::new(self.max_length),
        };
        encoder.run();

        PhoneticCodes {
            primary: encoder.out.primary,
            alternate: encoder.out.alternate,
        }
    }
}

/// Upper-cased input with bounds-tolerant lookups.
struct Word {
    chars: Vec<char>,
    slavo_germanic: bool,
}

impl Word {
    /// Decomposes accented letters and drops the combining marks, so `Ç`
    /// reads as `C` and `Á` as `A`.
    fn new(raw: &str) -> Self {
        let upper = raw
            .trim()
            .nfd()
            .filter(|c| !is_combining_mark(*c))
            .collect::<String>()
            .to_uppercase();
        let slavo_germanic = upper.contains('W')
            || upper.contains('K')
            || upper.contains("CZ")
            || upper.contains("WITZ");
        Self {
            chars: upper.chars().collect(),
            slavo_germanic,
        }
    }

    fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    fn len(&self) -> isize {
        self.chars.len() as isize
    }

    fn last(&self) -> isize {
        self.len() - 1
    }

    /// Character at `index`, or `'\0'` outside the word.
    fn at(&self, index: isize) -> char {
        if index < 0 || index >= self.len() {
            '\0'
        } else {
            self.chars[index as usize]
        }
    }

    fn vowel_at(&self, index: isize) -> bool {
        let c = self.at(index);
        c != '\0' && VOWELS.contains(c)
    }

    /// Whether any option appears verbatim starting at `start`.
    fn matches(&self, start: isize, options: &[&str]) -> bool {
        if start < 0 {
            return false;
        }
        options.iter().any(|option| {
            let width = option.chars().count() as isize;
            start + width <= self.len()
                && self.chars[start as usize..(start + width) as usize]
                    .iter()
                    .copied()
                    .eq(option.chars())
        })
    }

    fn starts_with(&self, options: &[&str]) -> bool {
        self.matches(0, options)
    }

    fn germanic_prefix(&self) -> bool {
        self.starts_with(&["VAN ", "VON "]) || self.starts_with(&["SCH"])
    }
}

/// Output buffers honouring the optional length cap.
struct Codes {
    primary: String,
    alternate: String,
    max_length: Option<usize>,
}

impl Codes {
    fn new(max_length: Option<usize>) -> Self {
        Self {
            primary: String::new(),
            alternate: String::new(),
            max_length,
        }
    }

    fn add(&mut self, primary: &str, alternate: &str) {
        push_capped(&mut self.primary, primary, self.max_length);
        push_capped(&mut self.alternate, alternate, self.max_length);
    }

    fn same(&mut self, code: &str) {
        self.add(code, code);
    }

    fn is_complete(&self) -> bool {
        match self.max_length {
            Some(max) => self.primary.chars().count() >= max && self.alternate.chars().count() >= max,
            None => false,
        }
    }
}

fn push_capped(buffer: &mut String, code: &str, max_length: Option<usize>) {
    for c in code.chars() {
        if max_length.is_some_and(|max| buffer.chars().count() >= max) {
            break;
        }
        buffer.push(c);
    }
}

struct Encoder<'a> {
    word: &'a Word,
    out: Codes,
}

impl Encoder<'_> {
    fn run(&mut self) {
        let w = self.word;
        let mut index: isize = if w.starts_with(SILENT_START) { 1 } else { 0 };

        while !self.out.is_complete() && index <= w.last() {
            index = match w.at(index) {
                'A' | 'E' | 'I' | 'O' | 'U' | 'Y' => {
                    if index == 0 {
                        self.out.same("A");
                    }
                    index + 1
                }
                'B' => {
                    self.out.same("P");
                    if w.at(index + 1) == 'B' { index + 2 } else { index + 1 }
                }
                'C' => self.c(index),
                'D' => self.d(index),
                'F' => {
                    self.out.same("F");
                    if w.at(index + 1) == 'F' { index + 2 } else { index + 1 }
                }
                'G' => self.g(index),
                'H' => self.h(index),
                'J' => self.j(index),
                'K' => {
                    self.out.same("K");
                    if w.at(index + 1) == 'K' { index + 2 } else { index + 1 }
                }
                'L' => self.l(index),
                'M' => {
                    self.out.same("M");
                    if self.m_doubles(index) { index + 2 } else { index + 1 }
                }
                'N' => {
                    self.out.same("N");
                    if w.at(index + 1) == 'N' { index + 2 } else { index + 1 }
                }
                'P' => self.p(index),
                'Q' => {
                    self.out.same("K");
                    if w.at(index + 1) == 'Q' { index + 2 } else { index + 1 }
                }
                'R' => self.r(index),
                'S' => self.s(index),
                'T' => self.t(index),
                'V' => {
                    self.out.same("F");
                    if w.at(index + 1) == 'V' { index + 2 } else { index + 1 }
                }
                'W' => self.w(index),
                'X' => self.x(index),
                'Z' => self.z(index),
                _ => index + 1,
            };
        }
    }

    fn c(&mut self, index: isize) -> isize {
        let w = self.word;
        if self.c_sounds_k(index) {
            self.out.same("K");
            index + 2
        } else if index == 0 && w.matches(index, &["CAESAR"]) {
            self.out.same("S");
            index + 2
        } else if w.matches(index, &["CH"]) {
            self.ch(index)
        } else if w.matches(index, &["CZ"]) && !w.matches(index - 2, &["WICZ"]) {
            self.out.add("S", "X");
            index + 2
        } else if w.matches(index + 1, &["CIA"]) {
            self.out.same("X");
            index + 3
        } else if w.matches(index, &["CC"]) && !(index == 1 && w.at(0) == 'M') {
            self.cc(index)
        } else if w.matches(index, &["CK", "CG", "CQ"]) {
            self.out.same("K");
            index + 2
        } else if w.matches(index, &["CI", "CE", "CY"]) {
            if w.matches(index, &["CIO", "CIE", "CIA"]) {
                self.out.add("S", "X");
            } else {
                self.out.same("S");
            }
            index + 2
        } else {
            self.out.same("K");
            if w.matches(index + 1, &[" C", " Q", " G"]) {
                index + 3
            } else if w.matches(index + 1, &["C", "K", "Q"]) && !w.matches(index + 1, &["CE", "CI"]) {
                index + 2
            } else {
                index + 1
            }
        }
    }

    /// Germanic `-ACH-` (but not `-ACHI-`/`-ACHE-` outside BACHER/MACHER), or `CHIA`.
    fn c_sounds_k(&self, index: isize) -> bool {
        let w = self.word;
        if w.matches(index, &["CHIA"]) {
            return true;
        }
        if index <= 1 || w.vowel_at(index - 2) || !w.matches(index - 1, &["ACH"]) {
            return false;
        }
        let next = w.at(index + 2);
        (next != 'I' && next != 'E') || w.matches(index - 2, &["BACHER", "MACHER"])
    }

    fn cc(&mut self, index: isize) -> isize {
        let w = self.word;
        if w.matches(index + 2, &["I", "E", "H"]) && !w.matches(index + 2, &["HU"]) {
            if (index == 1 && w.at(index - 1) == 'A') || w.matches(index - 1, &["UCCEE", "UCCES"]) {
                self.out.same("KS");
            } else {
                self.out.same("X");
            }
            index + 3
        } else {
            self.out.same("K");
            index + 2
        }
    }

    fn ch(&mut self, index: isize) -> isize {
        let w = self.word;
        if index > 0 && w.matches(index, &["CHAE"]) {
            self.out.add("K", "X");
        } else if self.ch_greek(index) || self.ch_germanic(index) {
            self.out.same("K");
        } else if index > 0 {
            if w.starts_with(&["MC"]) {
                self.out.same("K");
            } else {
                self.out.add("X", "K");
            }
        } else {
            self.out.same("X");
        }
        index + 2
    }

    fn ch_greek(&self, index: isize) -> bool {
        let w = self.word;
        index == 0
            && (w.matches(index + 1, &["HARAC", "HARIS"])
                || w.matches(index + 1, &["HOR", "HYM", "HIA", "HEM"]))
            && !w.starts_with(&["CHORE"])
    }

    fn ch_germanic(&self, index: isize) -> bool {
        let w = self.word;
        w.germanic_prefix()
            || w.matches(index - 2, &["ORCHES", "ARCHIT", "ORCHID"])
            || w.matches(index + 2, &["T", "S"])
            || ((w.matches(index - 1, &["A", "O", "U", "E"]) || index == 0)
                && (w.matches(index + 2, L_R_N_M_B_H_F_V_W_SPACE) || index + 1 == w.last()))
    }

    fn d(&mut self, index: isize) -> isize {
        let w = self.word;
        if w.matches(index, &["DG"]) {
            if w.matches(index + 2, &["I", "E", "Y"]) {
                self.out.same("J");
                index + 3
            } else {
                self.out.same("TK");
                index + 2
            }
        } else if w.matches(index, &["DT", "DD"]) {
            self.out.same("T");
            index + 2
        } else {
            self.out.same("T");
            index + 1
        }
    }

    fn g(&mut self, index: isize) -> isize {
        let w = self.word;
        let next = w.at(index + 1);
        if next == 'H' {
            self.gh(index)
        } else if next == 'N' {
            if index == 1 && w.vowel_at(0) && !w.slavo_germanic {
                self.out.add("KN", "N");
            } else if !w.matches(index + 2, &["EY"]) && next != 'Y' && !w.slavo_germanic {
                self.out.add("N", "KN");
            } else {
                self.out.same("KN");
            }
            index + 2
        } else if w.matches(index + 1, &["LI"]) && !w.slavo_germanic {
            self.out.add("KL", "L");
            index + 2
        } else if index == 0 && (next == 'Y' || w.matches(index + 1, ES_EP_EB_EL_EY_IB_IL_IN_IE_EI_ER)) {
            self.out.add("K", "J");
            index + 2
        } else if (w.matches(index + 1, &["ER"]) || next == 'Y')
            && !w.starts_with(&["DANGER", "RANGER", "MANGER"])
            && !w.matches(index - 1, &["E", "I"])
            && !w.matches(index - 1, &["RGY", "OGY"])
        {
            self.out.add("K", "J");
            index + 2
        } else if w.matches(index + 1, &["E", "I", "Y"]) || w.matches(index - 1, &["AGGI", "OGGI"]) {
            if w.germanic_prefix() || w.matches(index + 1, &["ET"]) {
                self.out.same("K");
            } else if w.matches(index + 1, &["IER"]) {
                self.out.same("J");
            } else {
                self.out.add("J", "K");
            }
            index + 2
        } else if next == 'G' {
            self.out.same("K");
            index + 2
        } else {
            self.out.same("K");
            index + 1
        }
    }

    fn gh(&mut self, index: isize) -> isize {
        let w = self.word;
        if index > 0 && !w.vowel_at(index - 1) {
            self.out.same("K");
        } else if index == 0 {
            if w.at(index + 2) == 'I' {
                self.out.same("J");
            } else {
                self.out.same("K");
            }
        } else if (index > 1 && w.matches(index - 2, &["B", "H", "D"]))
            || (index > 2 && w.matches(index - 3, &["B", "H", "D"]))
            || (index > 3 && w.matches(index - 4, &["B", "H"]))
        {
            // Silent, as in "hugh" or "bough".
        } else if index > 2 && w.at(index - 1) == 'U' && w.matches(index - 3, &["C", "G", "L", "R", "T"]) {
            self.out.same("F");
        } else if index > 0 && w.at(index - 1) != 'I' {
            self.out.same("K");
        }
        index + 2
    }

    fn h(&mut self, index: isize) -> isize {
        let w = self.word;
        if (index == 0 || w.vowel_at(index - 1)) && w.vowel_at(index + 1) {
            self.out.same("H");
            index + 2
        } else {
            index + 1
        }
    }

    fn j(&mut self, index: isize) -> isize {
        let w = self.word;
        if w.matches(index, &["JOSE"]) || w.starts_with(&["SAN "]) {
            if (index == 0 && w.at(index + 4) == ' ') || w.len() == 4 || w.starts_with(&["SAN "]) {
                self.out.same("H");
            } else {
                self.out.add("J", "H");
            }
            return index + 1;
        }

        if index == 0 && !w.matches(index, &["JOSE"]) {
            self.out.add("J", "A");
        } else if w.vowel_at(index - 1)
            && !w.slavo_germanic
            && (w.at(index + 1) == 'A' || w.at(index + 1) == 'O')
        {
            self.out.add("J", "H");
        } else if index == w.last() {
            self.out.add("J", " ");
        } else if !w.matches(index + 1, L_T_K_S_N_M_B_Z) && !w.matches(index - 1, &["S", "K", "L"]) {
            self.out.same("J");
        }

        if w.at(index + 1) == 'J' { index + 2 } else { index + 1 }
    }

    fn l(&mut self, index: isize) -> isize {
        let w = self.word;
        if w.at(index + 1) != 'L' {
            self.out.same("L");
            return index + 1;
        }
        if self.spanish_ll(index) {
            self.out.add("L", "");
        } else {
            self.out.same("L");
        }
        index + 2
    }

    fn spanish_ll(&self, index: isize) -> bool {
        let w = self.word;
        if index == w.len() - 3 && w.matches(index - 1, &["ILLO", "ILLA", "ALLE"]) {
            return true;
        }
        (w.matches(w.len() - 2, &["AS", "OS"]) || w.matches(w.len() - 1, &["A", "O"]))
            && w.matches(index - 1, &["ALLE"])
    }

    fn m_doubles(&self, index: isize) -> bool {
        let w = self.word;
        if w.at(index + 1) == 'M' {
            return true;
        }
        w.matches(index - 1, &["UMB"]) && (index + 1 == w.last() || w.matches(index + 2, &["ER"]))
    }

    fn p(&mut self, index: isize) -> isize {
        let w = self.word;
        if w.at(index + 1) == 'H' {
            self.out.same("F");
            return index + 2;
        }
        self.out.same("P");
        if w.matches(index + 1, &["P", "B"]) { index + 2 } else { index + 1 }
    }

    fn r(&mut self, index: isize) -> isize {
        let w = self.word;
        if index == w.last()
            && !w.slavo_germanic
            && w.matches(index - 2, &["IE"])
            && !w.matches(index - 4, &["ME", "MA"])
        {
            self.out.add("", "R");
        } else {
            self.out.same("R");
        }
        if w.at(index + 1) == 'R' { index + 2 } else { index + 1 }
    }

    fn s(&mut self, index: isize) -> isize {
        let w = self.word;
        if w.matches(index - 1, &["ISL", "YSL"]) {
            index + 1
        } else if index == 0 && w.matches(index, &["SUGAR"]) {
            self.out.add("X", "S");
            index + 1
        } else if w.matches(index, &["SH"]) {
            if w.matches(index + 1, &["HEIM", "HOEK", "HOLM", "HOLZ"]) {
                self.out.same("S");
            } else {
                self.out.same("X");
            }
            index + 2
        } else if w.matches(index, &["SIO", "SIA"]) || w.matches(index, &["SIAN"]) {
            if w.slavo_germanic {
                self.out.same("S");
            } else {
                self.out.add("S", "X");
            }
            index + 3
        } else if (index == 0 && w.matches(index + 1, &["M", "N", "L", "W"])) || w.matches(index + 1, &["Z"]) {
            self.out.add("S", "X");
            if w.matches(index + 1, &["Z"]) { index + 2 } else { index + 1 }
        } else if w.matches(index, &["SC"]) {
            self.sc(index)
        } else {
            if index == w.last() && w.matches(index - 2, &["AI", "OI"]) {
                self.out.add("", "S");
            } else {
                self.out.same("S");
            }
            if w.matches(index + 1, &["S", "Z"]) { index + 2 } else { index + 1 }
        }
    }

    fn sc(&mut self, index: isize) -> isize {
        let w = self.word;
        if w.at(index + 2) == 'H' {
            if w.matches(index + 3, &["OO", "ER", "EN", "UY", "ED", "EM"]) {
                if w.matches(index + 3, &["ER", "EN"]) {
                    self.out.add("X", "SK");
                } else {
                    self.out.same("SK");
                }
            } else if index == 0 && !w.vowel_at(3) && w.at(3) != 'W' {
                self.out.add("X", "S");
            } else {
                self.out.same("X");
            }
        } else if w.matches(index + 2, &["I", "E", "Y"]) {
            self.out.same("S");
        } else {
            self.out.same("SK");
        }
        index + 3
    }

    fn t(&mut self, index: isize) -> isize {
        let w = self.word;
        if w.matches(index, &["TION"]) || w.matches(index, &["TIA", "TCH"]) {
            self.out.same("X");
            index + 3
        } else if w.matches(index, &["TH"]) || w.matches(index, &["TTH"]) {
            if w.matches(index + 2, &["OM", "AM"]) || w.germanic_prefix() {
                self.out.same("T");
            } else {
                self.out.add("0", "T");
            }
            index + 2
        } else {
            self.out.same("T");
            if w.matches(index + 1, &["T", "D"]) { index + 2 } else { index + 1 }
        }
    }

    fn w(&mut self, index: isize) -> isize {
        let w = self.word;
        if w.matches(index, &["WR"]) {
            self.out.same("R");
            return index + 2;
        }

        if index == 0 && (w.vowel_at(index + 1) || w.matches(index, &["WH"])) {
            if w.vowel_at(index + 1) {
                self.out.add("A", "F");
            } else {
                self.out.same("A");
            }
            index + 1
        } else if (index == w.last() && w.vowel_at(index - 1))
            || w.matches(index - 1, &["EWSKI", "EWSKY", "OWSKI", "OWSKY"])
            || w.starts_with(&["SCH"])
        {
            self.out.add("", "F");
            index + 1
        } else if w.matches(index, &["WICZ", "WITZ"]) {
            self.out.add("TS", "FX");
            index + 4
        } else {
            index + 1
        }
    }

    fn x(&mut self, index: isize) -> isize {
        let w = self.word;
        if index == 0 {
            self.out.same("S");
            return index + 1;
        }
        let silent_french = index == w.last()
            && (w.matches(index - 3, &["IAU", "EAU"]) || w.matches(index - 2, &["AU", "OU"]));
        if !silent_french {
            self.out.same("KS");
        }
        if w.matches(index + 1, &["C", "X"]) { index + 2 } else { index + 1 }
    }

    fn z(&mut self, index: isize) -> isize {
        let w = self.word;
        if w.at(index + 1) == 'H' {
            self.out.same("J");
            return index + 2;
        }
        if w.matches(index + 1, &["ZO", "ZI", "ZA"])
            || (w.slavo_germanic && index > 0 && w.at(index - 1) != 'T')
        {
            self.out.add("S", "TS");
        } else {
            self.out.same("S");
        }
        if w.at(index + 1) == 'Z' { index + 2 } else { index + 1 }
    }
}
