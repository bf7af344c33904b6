/*!
# CDDA: Text Cleanup

CD-Text strings are single-byte, usually ASCII or Windows-1252, and written
by people who love trailing spaces, leading dashes, and SHOUTING. These
helpers convert them to UTF-8 and tidy them up.
*/

use trimothy::TrimSliceMatches;



/// # Maximum UTF-8 Length (Bytes).
const UTF8_MAX: usize = 256;

/// # CP1252 Upper Control Range.
///
/// Code points for bytes `0x80..=0x9F`. Zero marks the five slots Windows
/// leaves undefined; those bytes are dropped.
const CP1252: [u16; 32] = [
	0x20AC, 0,      0x201A, 0x0192, 0x201E, 0x2026, 0x2020, 0x2021,
	0x02C6, 0x2030, 0x0160, 0x2039, 0x0152, 0,      0x017D, 0,
	0,      0x2018, 0x2019, 0x201C, 0x201D, 0x2022, 0x2013, 0x2014,
	0x02DC, 0x2122, 0x0161, 0x203A, 0x0153, 0,      0x017E, 0x0178,
];



#[must_use]
/// # To UTF-8.
///
/// Convert a NUL-terminated CP1252/Latin-1 byte string to UTF-8.
///
/// Conversion stops at the first NUL, or once the next character would push
/// the output past 256 bytes.
pub fn to_utf8(raw: &[u8]) -> String {
	let mut out = String::with_capacity(raw.len());
	for &b in raw {
		let cp = match b {
			0 => break,
			0x80..=0x9F => u32::from(CP1252[usize::from(b - 0x80)]),
			_ => u32::from(b),
		};

		// Undefined.
		if cp == 0 { continue; }

		let Some(c) = char::from_u32(cp) else { continue; };
		if UTF8_MAX < out.len() + c.len_utf8() { break; }
		out.push(c);
	}
	out
}

/// # Sanitize String.
///
/// Strip leading whitespace, dashes, and slashes, then trailing whitespace.
/// If nothing is left, the string is replaced with `None`.
pub fn sanitize_string(src: &mut Option<String>) {
	let Some(s) = src.as_mut() else { return; };

	let bytes = s.as_bytes();
	let start = bytes.len() - bytes.trim_start_matches(is_garbage).len();
	let end = start + bytes[start..].trim_end_matches(is_space).len();

	if start == end { *src = None; }
	else {
		// Both cuts land on ASCII, so on char boundaries.
		s.truncate(end);
		s.drain(..start);
	}
}

#[must_use]
/// # Find String (Case-Insensitive).
///
/// Return the byte position of the first ASCII case-insensitive occurrence of
/// `needle` within `haystack`. An empty needle matches at zero.
pub fn find_string(haystack: &str, needle: &str) -> Option<usize> {
	let needle = needle.as_bytes();
	if needle.is_empty() { return Some(0); }

	haystack.as_bytes()
		.windows(needle.len())
		.position(|w| w.eq_ignore_ascii_case(needle))
}

/// # Cut String.
///
/// Remove the first case-insensitive occurrence of `cut` from `src`, if any.
pub fn cut_string(src: &mut Option<String>, cut: Option<&str>) {
	if let (Some(s), Some(cut)) = (src.as_mut(), cut) {
		if let Some(pos) = find_string(s, cut) {
			s.replace_range(pos..pos + cut.len(), "");
		}
	}
}

/// # Capitalize String.
///
/// Title-case each word. Apostrophes do not start a new word, so "o'brien"
/// becomes "O'brien".
pub fn capitalize_string(src: &mut String) {
	let mut new_word = src.bytes()
		.next()
		.is_some_and(|b| b.is_ascii_alphabetic() || is_space(b));

	let out: String = src.chars()
		.map(|c|
			if c.is_ascii_alphabetic() {
				if new_word {
					new_word = false;
					c.to_ascii_uppercase()
				}
				else { c.to_ascii_lowercase() }
			}
			else {
				if c != '\'' { new_word = true; }
				c
			}
		)
		.collect();

	*src = out;
}



#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
/// # Single Case Check.
///
/// This tracks whether a _series_ of strings is written in a single case, all
/// upper or all lower. The case is set by the first letter found in any of
/// them.
///
/// ```
/// use cdda_core::CaseCheck;
///
/// let mut chk = CaseCheck::default();
/// assert!(chk.check(Some("HELLO")));
/// assert!(chk.check(None));
/// assert!(! chk.check(Some("world")));
/// ```
pub struct CaseCheck(Option<bool>);

impl CaseCheck {
	/// # Check String.
	///
	/// Return `false` if `src` contains a letter in the other case. `None`
	/// passes without touching the state.
	pub fn check(&mut self, src: Option<&str>) -> bool {
		let Some(src) = src else { return true; };
		for b in src.bytes().filter(u8::is_ascii_alphabetic) {
			let upper = b.is_ascii_uppercase();
			match self.0 {
				Some(case) => if case != upper { return false; },
				None => { self.0 = Some(upper); },
			}
		}
		true
	}

	#[must_use]
	/// # Upper?
	///
	/// Returns the case settled on, if any letters have been seen.
	pub const fn upper(self) -> Option<bool> { self.0 }
}



/// # Is Space?
///
/// This matches C's `isspace`, which unlike Rust's ASCII whitespace includes
/// the vertical tab.
const fn is_space(b: u8) -> bool {
	matches!(b, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

/// # Is Garbage?
const fn is_garbage(b: u8) -> bool {
	is_space(b) || matches!(b, b'-' | b'/' | b'\\')
}



#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn t_to_utf8_bytes() {
		for b in 0..=u8::MAX {
			let out = to_utf8(&[b]);
			let expected = match b {
				0 => 0,
				0x80..=0x9F => u32::from(CP1252[usize::from(b - 0x80)]),
				_ => u32::from(b),
			};

			if expected == 0 {
				assert!(out.is_empty(), "Byte {b:02x} should have been dropped.");
			}
			else {
				let mut chars = out.chars();
				let c = chars.next().expect("Missing char.");
				assert_eq!(u32::from(c), expected, "Wrong code point for {b:02x}.");
				assert!(chars.next().is_none(), "Too many chars for {b:02x}.");
				assert_eq!(out.len(), c.len_utf8());
			}
		}
	}

	#[test]
	fn t_to_utf8() {
		assert_eq!(to_utf8(b"Caf\xe9"), "Café");
		assert_eq!(to_utf8(b"\x93Hi\x94 \x80"), "\u{201c}Hi\u{201d} €");
		assert_eq!(to_utf8(b"ab\0cd"), "ab", "NUL should end the string.");
		assert_eq!(to_utf8(b"a\x81b"), "ab", "Undefined slots should be dropped.");
		assert_eq!(to_utf8(b""), "");

		// Two bytes per char caps at 128 chars.
		let out = to_utf8(&[0xE9; 200]);
		assert_eq!(out.len(), 256);
		assert_eq!(out.chars().count(), 128);

		// Three bytes per char stops before the overflow.
		let out = to_utf8(&[0x80; 100]);
		assert_eq!(out.len(), 255);
	}

	#[test]
	fn t_sanitize_string() {
		for (raw, expected) in [
			("Hello", Some("Hello")),
			("  - /\\Hello World \t ", Some("Hello World")),
			("Hello - ", Some("Hello -")),
			("---", None),
			(" \t\n", None),
			("", None),
			("\tRepeat", Some("Repeat")),
			("-\u{e9}t\u{e9} ", Some("\u{e9}t\u{e9}")),
		] {
			let mut s = Some(raw.to_owned());
			sanitize_string(&mut s);
			assert_eq!(s.as_deref(), expected, "Sanitize failed for {raw:?}.");

			// Again should change nothing.
			let mut s2 = s.clone();
			sanitize_string(&mut s2);
			assert_eq!(s, s2, "Sanitize is not idempotent for {raw:?}.");
		}

		let mut s = None;
		sanitize_string(&mut s);
		assert!(s.is_none());
	}

	#[test]
	fn t_find_cut() {
		assert_eq!(find_string("The Beatles - Abbey Road", "beatles"), Some(4));
		assert_eq!(find_string("Abbey Road", "BEATLES"), None);
		assert_eq!(find_string("Abbey Road", ""), Some(0));
		assert_eq!(find_string("", "a"), None);
		assert_eq!(find_string("ab", "abc"), None);

		let mut s = Some("The Beatles  Abbey Road".to_owned());
		cut_string(&mut s, Some("THE BEATLES"));
		assert_eq!(s.as_deref(), Some("  Abbey Road"));

		let mut s = Some("Song (Album Version) (Album Version)".to_owned());
		cut_string(&mut s, Some("(album version)"));
		assert_eq!(s.as_deref(), Some("Song  (Album Version)"), "Only the first should go.");

		// Non-ASCII neighbors are fine.
		let mut s = Some("Bj\u{f6}rk \u{2013} Post".to_owned());
		cut_string(&mut s, Some("bj\u{f6}rk"));
		assert_eq!(s.as_deref(), Some(" \u{2013} Post"));

		// Nothing to do.
		let mut s = Some("Abbey Road".to_owned());
		cut_string(&mut s, None);
		assert_eq!(s.as_deref(), Some("Abbey Road"));
		let mut s = None;
		cut_string(&mut s, Some("Abbey"));
		assert!(s.is_none());
	}

	#[test]
	fn t_case_check() {
		let mut chk = CaseCheck::default();
		assert_eq!(chk.upper(), None);
		assert!(chk.check(None));
		assert!(chk.check(Some("123 !")), "No letters, no opinion.");
		assert_eq!(chk.upper(), None);
		assert!(chk.check(Some("AC/DC")));
		assert_eq!(chk.upper(), Some(true));
		assert!(chk.check(Some("BACK IN BLACK")));
		assert!(! chk.check(Some("Hells Bells")));

		let mut chk = CaseCheck::default();
		assert!(chk.check(Some("lower case")));
		assert!(! chk.check(Some("UPPER")));
	}

	#[test]
	fn t_capitalize_string() {
		for (raw, expected) in [
			("o'brien", "O'brien"),
			("HELLO WORLD", "Hello World"),
			("rock-n-roll", "Rock-N-Roll"),
			("'tis the season", "'tis The Season"),
			(" leading space", " Leading Space"),
			("caf\u{e9} au lait", "Caf\u{e9} Au Lait"),
			("", ""),
		] {
			let mut s = raw.to_owned();
			capitalize_string(&mut s);
			assert_eq!(s, expected, "Capitalization failed for {raw:?}.");
		}
	}
}
