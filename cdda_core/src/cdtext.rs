/*!
# CDDA: CD-Text
*/

use crate::{
	capitalize_string,
	CaseCheck,
	CddaError,
	cut_string,
	DeviceReader,
	MAX_TRACKS,
	PackField,
	PackParser,
	sanitize_string,
	ScsiCommand,
	to_utf8,
};
use fyi_msg::Msg;
use std::fmt;



/// # Response Buffer Size.
///
/// The four-byte header plus room for 2048 packs.
pub(crate) const CDTEXT_BUFFER_SIZE: usize = 4 + 2048 * 18;

/// # Placeholder Album.
///
/// Some burning software writes this when the user doesn't bother.
const PLACEHOLDER_ALBUM: &str = "My CD";

/// # Genres.
///
/// The standard CD-Text genre codes, starting at two.
const GENRES: [&str; 26] = [
	"Adult Contemporary",
	"Alternative Rock",
	"Childrens Music",
	"Classical",
	"Contemporary Christian",
	"Country",
	"Dance",
	"Easy Listening",
	"Erotic",
	"Folk",
	"Gospel",
	"Hip Hop",
	"Jazz",
	"Latin",
	"Musical",
	"New Age",
	"Opera",
	"Operetta",
	"Pop Music",
	"Rap",
	"Reggae",
	"Rock Music",
	"Rhythm & Blues",
	"Sound Effects",
	"Spoken Word",
	"World Music",
];



/// # Helper: CD-Text Fields.
macro_rules! fields {
	( $( $k:ident $v:literal $vstr:literal ),+ $(,)? ) => (
		#[repr(u8)]
		#[derive(Debug, Clone, Copy, Eq, Hash, PartialEq)]
		/// # CD-Text Field.
		///
		/// The pack type IDs used by CD-Text.
		pub enum CDTextKind {
			$(
				#[doc = concat!("# ", stringify!($k), ".")]
				$k = $v,
			)+
		}

		impl CDTextKind {
			#[must_use]
			/// # As Str.
			///
			/// Return the field as an uppercase string, similar to how it would
			/// appear in track metadata.
			pub const fn as_str(self) -> &'static str {
				match self {
					$( Self::$k => $vstr, )+
				}
			}

			#[must_use]
			/// # From Pack ID.
			pub const fn from_u8(src: u8) -> Option<Self> {
				match src {
					$( $v => Some(Self::$k), )+
					_ => None,
				}
			}
		}
	);
}

fields! {
	Title      0x80 "TITLE",
	Performer  0x81 "ARTIST",
	Songwriter 0x82 "SONGWRITER",
	Composer   0x83 "COMPOSER",
	Arranger   0x84 "ARRANGER",
	Message    0x85 "COMMENT",
	DiscId     0x86 "DISCID",
	Genre      0x87 "GENRE",
	TocInfo    0x88 "TOCINFO",
	TocInfo2   0x89 "TOCINFO2",
	UpcIsrc    0x8E "BARCODE",
	SizeInfo   0x8F "SIZEINFO",
}

impl AsRef<str> for CDTextKind {
	#[inline]
	fn as_ref(&self) -> &str { self.as_str() }
}

impl fmt::Display for CDTextKind {
	#[inline]
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		<str as fmt::Display>::fmt(self.as_str(), f)
	}
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # CD-Text.
///
/// This holds the cleaned-up album-level and per-track strings parsed from a
/// disc's CD-Text.
///
/// Only the first (usually English) language block is used, and double-byte
/// text is not decoded.
pub struct CdText {
	/// # Album.
	album: Option<String>,

	/// # Disc Artist.
	artist: Option<String>,

	/// # Genre.
	genre: Option<String>,

	/// # Message.
	message: Option<String>,

	/// # Track Titles.
	titles: Vec<Option<String>>,

	/// # Track Artists.
	artists: Vec<Option<String>>,

	/// # Track Count.
	track_count: u8,

	/// # Double-Byte Text?
	double_byte: bool,
}

impl Default for CdText {
	fn default() -> Self {
		Self {
			album: None,
			artist: None,
			genre: None,
			message: None,
			titles: vec![None; usize::from(MAX_TRACKS)],
			artists: vec![None; usize::from(MAX_TRACKS)],
			track_count: 0,
			double_byte: false,
		}
	}
}

impl CdText {
	/// # Parse.
	///
	/// Parse a raw READ TOC (CD-Text format) response, header and all, then
	/// tidy the results.
	///
	/// ## Errors
	///
	/// This will return an error if the header is missing, the packs are out
	/// of sequence, or the result is missing an album/artist or any track
	/// title.
	pub fn parse(raw: &[u8]) -> Result<Self, CddaError> {
		let [a, b, _, _, rest @ ..] = raw else {
			return Err(CddaError::CdTextHeader);
		};
		let len = usize::from(u16::from_be_bytes([*a, *b]))
			.saturating_sub(2)
			.min(rest.len());

		let mut out = Self::default();
		let mut unknown = 0_u16;
		let mut parser = PackParser::new(&rest[..len]);
		while let Some(field) = parser.next_field()? {
			if out.push_field(&field) { continue; }

			// Mention each unsupported field once.
			if let Some(bit) = field.id().checked_sub(0x80).filter(|n| *n < 16) {
				let bit = 1_u16 << bit;
				if 0 == unknown & bit {
					unknown |= bit;
					Msg::warning(format!(
						"Skipping unsupported CD-Text field {:#04x}.",
						field.id(),
					)).eprint();
				}
			}
		}

		let errors = parser.crc_errors();
		if errors != 0 {
			Msg::warning(format!(
				"{errors} CD-Text pack(s) failed the CRC check; the text may be wrong."
			)).eprint();
		}

		if out.double_byte {
			Msg::warning("Double-byte CD-Text is not decoded; some text may be garbled.")
				.eprint();
		}

		out.finish()?;
		Ok(out)
	}

	/// # Finish.
	///
	/// Clean up the parsed strings and make sure there's enough left to be
	/// useful.
	fn finish(&mut self) -> Result<(), CddaError> {
		sanitize_string(&mut self.artist);
		sanitize_string(&mut self.genre);
		sanitize_string(&mut self.message);
		self.sanitize_album();
		self.sanitize_titles();
		self.correct_case();

		if
			(self.album.is_none() && self.artist.is_none()) ||
			self.titles[..usize::from(self.track_count)].iter().any(Option::is_none)
		{
			Err(CddaError::CdTextIncomplete)
		}
		else { Ok(()) }
	}

	/// # Push Field.
	///
	/// Store the field if it is one we care about. Returns `false` for
	/// unsupported field types.
	fn push_field(&mut self, field: &PackField) -> bool {
		if field.is_double_byte() { self.double_byte = true; }
		match CDTextKind::from_u8(field.id()) {
			Some(CDTextKind::Title) => self.push_title(field),
			Some(CDTextKind::Performer) => self.push_artist(field),
			Some(CDTextKind::Message) => if field.track() == 0 {
				fill(&mut self.message, field);
			},
			Some(CDTextKind::Genre) => if field.track() == 0 && self.genre.is_none() {
				self.genre = parse_genre(field.raw());
			},
			_ => return false,
		}
		true
	}

	/// # Push Title.
	fn push_title(&mut self, field: &PackField) {
		match field.track() {
			0 => fill(&mut self.album, field),
			n @ 1..=MAX_TRACKS => {
				fill(&mut self.titles[usize::from(n - 1)], field);
				if self.track_count < n { self.track_count = n; }
			},
			_ => {},
		}
	}

	/// # Push Artist.
	fn push_artist(&mut self, field: &PackField) {
		match field.track() {
			0 => fill(&mut self.artist, field),
			n @ 1..=MAX_TRACKS => fill(&mut self.artists[usize::from(n - 1)], field),
			_ => {},
		}
	}

	/// # Sanitize Album.
	///
	/// Remove the artist from the album, drop placeholders, and if there's
	/// no artist, try to split one out of the album.
	fn sanitize_album(&mut self) {
		cut_string(&mut self.album, self.artist.as_deref());
		sanitize_string(&mut self.album);

		if self.album.as_deref().is_some_and(|a| a.eq_ignore_ascii_case(PLACEHOLDER_ALBUM)) {
			self.album = None;
		}

		// "Artist  Album".
		if self.artist.is_none() {
			if let Some(album) = self.album.as_mut() {
				if let Some(pos) = album.find("  ") {
					let mut rest = Some(album.split_off(pos + 2));
					sanitize_string(&mut rest);
					self.artist = self.album.take();
					sanitize_string(&mut self.artist);
					self.album = rest;
				}
			}
		}
	}

	/// # Sanitize Titles.
	///
	/// Tidy up the track titles and artists. Track artists matching the disc
	/// artist are removed, and a title starting with a tab is taken to mean
	/// "same as the last one".
	fn sanitize_titles(&mut self) {
		for i in 0..usize::from(self.track_count) {
			let repeat = 0 < i &&
				self.titles[i].as_deref().is_some_and(|t| t.starts_with('\t'));

			cut_string(&mut self.titles[i], Some("(Album Version)"));
			sanitize_string(&mut self.titles[i]);
			sanitize_string(&mut self.artists[i]);

			if let (Some(a), Some(b)) = (self.artists[i].as_deref(), self.artist.as_deref()) {
				if a.eq_ignore_ascii_case(b) { self.artists[i] = None; }
			}

			if repeat { self.titles[i] = self.titles[i - 1].clone(); }
		}
	}

	/// # Correct Case.
	///
	/// If every album, artist, and title is written in the same case, title
	/// case them all. If any are mixed, nothing changes.
	fn correct_case(&mut self) {
		let len = usize::from(self.track_count);
		let mut chk = CaseCheck::default();
		if
			! chk.check(self.album.as_deref()) ||
			! chk.check(self.artist.as_deref()) ||
			! self.titles[..len].iter()
				.zip(&self.artists[..len])
				.all(|(t, a)| chk.check(t.as_deref()) && chk.check(a.as_deref()))
		{
			return;
		}

		for s in [&mut self.album, &mut self.artist].into_iter()
			.chain(self.titles[..len].iter_mut())
			.chain(self.artists[..len].iter_mut())
			.flatten()
		{
			capitalize_string(s);
		}
	}
}

impl CdText {
	#[must_use]
	/// # Album.
	pub fn album(&self) -> Option<&str> { self.album.as_deref() }

	#[must_use]
	/// # Disc Artist.
	pub fn artist(&self) -> Option<&str> { self.artist.as_deref() }

	#[must_use]
	/// # Genre.
	pub fn genre(&self) -> Option<&str> { self.genre.as_deref() }

	#[must_use]
	/// # Message.
	pub fn message(&self) -> Option<&str> { self.message.as_deref() }

	#[must_use]
	/// # Track Count.
	///
	/// This is the highest track number with a title.
	pub const fn track_count(&self) -> u8 { self.track_count }

	#[must_use]
	/// # Track Title.
	///
	/// Return the title for track `track` (starting at one).
	pub fn title(&self, track: u8) -> Option<&str> {
		let idx = usize::from(track.checked_sub(1)?);
		self.titles.get(idx)?.as_deref()
	}

	#[must_use]
	/// # Double-Byte?
	///
	/// Returns `true` if any field was flagged as double-byte. Such text is
	/// passed through undecoded.
	pub const fn is_double_byte(&self) -> bool { self.double_byte }

	#[must_use]
	/// # Track Artist.
	///
	/// Return the artist for track `track` (starting at one), if it differs
	/// from the disc artist.
	pub fn track_artist(&self, track: u8) -> Option<&str> {
		let idx = usize::from(track.checked_sub(1)?);
		self.artists.get(idx)?.as_deref()
	}
}



/// # Read CD-Text.
///
/// Fetch and parse the CD-Text from the device.
///
/// The command is issued twice and the first response thrown away; some
/// drives return garbage the first time around.
///
/// ## Errors
///
/// This will return an error if the second read fails, or for any of the
/// reasons [`CdText::parse`] might.
pub fn read_cdtext<D: DeviceReader>(dev: &mut D) -> Result<CdText, CddaError> {
	let mut buf = vec![0_u8; CDTEXT_BUFFER_SIZE];
	let _res = dev.read_scsi_command(ScsiCommand::ReadCdText, &mut buf);

	buf.fill(0);
	dev.read_scsi_command(ScsiCommand::ReadCdText, &mut buf)?;
	CdText::parse(&buf)
}



/// # Fill (If Empty).
///
/// The first value for a given slot wins.
fn fill(slot: &mut Option<String>, field: &PackField) {
	if slot.is_none() { *slot = Some(to_utf8(field.text())); }
}

/// # Genre Name.
///
/// Return the name for a standard CD-Text genre code.
fn genre_name(code: u16) -> Option<&'static str> {
	GENRES.get(usize::from(code.checked_sub(2)?)).copied()
}

/// # Parse Genre.
///
/// The genre field is a big-endian code followed by optional free text. The
/// text wins if there is any.
fn parse_genre(raw: &[u8]) -> Option<String> {
	let [a, b, rest @ ..] = raw else { return None; };
	let text = to_utf8(rest);
	if text.trim().is_empty() {
		genre_name(u16::from_be_bytes([*a, *b])).map(String::from)
	}
	else { Some(text) }
}
