/*!
# CDDA: CD-Text Packs

CD-Text is stored as a stream of 18-byte "packs", each carrying twelve bytes
of text for one field (title, performer, etc.) of one track. Strings are
NUL-terminated and packed back-to-back, so a pack can end one track's string
and begin the next one's.
*/

use crate::CddaError;
use crc::{
	Crc,
	CRC_16_GSM,
};



/// # Pack Size.
pub(crate) const PACK_SIZE: usize = 18;

/// # Text Size (Per Pack).
const TEXT_SIZE: usize = 12;

/// # Maximum Field Length.
const FIELD_MAX: usize = 256;

/// # Pack Checksum.
///
/// Polynomial `0x1021`, zero init, inverted; stored big-endian.
const PACK_CRC: Crc<u16> = Crc::<u16>::new(&CRC_16_GSM);



#[derive(Debug, Clone, Copy, Eq, PartialEq)]
/// # Pack.
///
/// The layout is:
///
/// | Byte   | Value |
/// | ------ | ----- |
/// | 0      | Field ID. |
/// | 1      | Track number (of the first character). |
/// | 2      | Sequence number. |
/// | 3      | Bits 0-3: character position; 4-6: block; 7: double-byte. |
/// | 4..16  | Text. |
/// | 16..18 | CRC. |
struct Pack([u8; PACK_SIZE]);

impl Pack {
	/// # From Slice.
	fn from_slice(src: &[u8]) -> Option<Self> {
		src.get(..PACK_SIZE)?.try_into().ok().map(Self)
	}

	/// # Field ID.
	const fn id(&self) -> u8 { self.0[0] }

	/// # Track Number.
	const fn track(&self) -> u8 { self.0[1] }

	/// # Sequence Number.
	const fn sequence(&self) -> u8 { self.0[2] }

	/// # Character Position.
	///
	/// The number of characters of this pack's string that live in earlier
	/// packs. Fifteen means "fifteen or more".
	const fn character_position(&self) -> u8 { self.0[3] & 0b0000_1111 }

	/// # Block Number.
	const fn block(&self) -> u8 { (self.0[3] >> 4) & 0b0000_0111 }

	/// # Double-Byte?
	const fn double_byte(&self) -> bool { 0 != self.0[3] & 0b1000_0000 }

	/// # Text.
	fn text(&self) -> &[u8] { &self.0[4..4 + TEXT_SIZE] }

	/// # Checksum Good?
	fn crc_ok(&self) -> bool {
		PACK_CRC.checksum(&self.0[..PACK_SIZE - 2]) ==
		u16::from_be_bytes([self.0[PACK_SIZE - 2], self.0[PACK_SIZE - 1]])
	}
}



#[derive(Debug, Clone, Eq, PartialEq)]
/// # Pack Field.
///
/// A single field value reassembled from one or more packs.
pub struct PackField {
	/// # Field ID.
	id: u8,

	/// # Track Number.
	track: u8,

	/// # Double-Byte Text?
	double_byte: bool,

	/// # Text (NUL-Bounded).
	text: Vec<u8>,

	/// # Raw Pack Text.
	raw: Vec<u8>,
}

impl PackField {
	#[must_use]
	/// # Field ID.
	pub const fn id(&self) -> u8 { self.id }

	#[must_use]
	/// # Track Number.
	///
	/// Zero refers to the disc as a whole.
	pub const fn track(&self) -> u8 { self.track }

	#[must_use]
	/// # Double-Byte?
	///
	/// Double-byte text is not decoded; it is passed through as single bytes.
	pub const fn is_double_byte(&self) -> bool { self.double_byte }

	#[must_use]
	/// # Text.
	///
	/// The field value, up to but excluding its NUL terminator. This is at
	/// most 255 bytes.
	pub fn text(&self) -> &[u8] { &self.text }

	#[must_use]
	/// # Raw Text.
	///
	/// The unprocessed text bytes of this field's own packs, NULs and all.
	/// Binary fields like the genre code need these.
	pub fn raw(&self) -> &[u8] { &self.raw }
}



#[derive(Debug, Clone)]
/// # Pack Parser.
///
/// This walks a raw pack stream, returning one [`PackField`] per call to
/// [`PackParser::next_field`] (or per iteration).
///
/// Parsing stops when fewer than eighteen bytes remain. Note that the field
/// being assembled when the packs run out is dropped; real discs end with
/// size-information packs, so nothing of value is lost.
pub struct PackParser<'a> {
	/// # Remaining Packs.
	packs: &'a [u8],

	/// # Last Consumed Pack.
	last: Option<Pack>,

	/// # Current Field ID.
	id: u8,

	/// # Current Track.
	track: u8,

	/// # Hidden Title Offset.
	///
	/// When non-zero, the next title begins at this offset into the last
	/// pack's text.
	carry: usize,

	/// # Checksum Failures.
	crc_errors: usize,

	/// # Finished?
	done: bool,
}

impl<'a> PackParser<'a> {
	#[must_use]
	/// # New.
	///
	/// The slice should hold the packs only, not the response header.
	pub const fn new(packs: &'a [u8]) -> Self {
		Self {
			packs,
			last: None,
			id: 0,
			track: 0,
			carry: 0,
			crc_errors: 0,
			done: false,
		}
	}

	#[must_use]
	/// # Checksum Failures.
	///
	/// Return the number of consumed packs whose CRC did not match. These are
	/// parsed all the same.
	pub const fn crc_errors(&self) -> usize { self.crc_errors }

	/// # Next Field.
	///
	/// Return the next field, or `None` once the packs run out.
	///
	/// ## Errors
	///
	/// A gap in the pack sequence numbers is fatal; parsing should not be
	/// resumed afterward.
	pub fn next_field(&mut self) -> Result<Option<PackField>, CddaError> {
		let Some(mut pack) = self.peek() else { return Ok(None); };

		// Finish the hidden title(s) before moving on.
		if self.carry != 0 { return Ok(Some(self.resume(&pack))); }

		self.id = pack.id();
		self.track = pack.track();
		let double_byte = pack.double_byte();
		let mut text = Vec::with_capacity(FIELD_MAX);
		let mut raw = Vec::new();
		let mut len = 0;

		// The start of the string might be at the end of the previous pack.
		let pos = usize::from(pack.character_position()).min(TEXT_SIZE);
		if 0 < pos {
			if let Some(last) = self.last {
				let tail = &last.text()[TEXT_SIZE - pos..];
				len = strnlen(tail);
				text.extend_from_slice(&tail[..len]);
			}
		}

		let mut number = pack.sequence();
		loop {
			if len + TEXT_SIZE < FIELD_MAX {
				text.truncate(len);
				text.extend_from_slice(pack.text());
				len += strnlen(pack.text());
			}
			raw.extend_from_slice(pack.text());
			if ! pack.crc_ok() { self.crc_errors += 1; }

			self.last = Some(pack);
			self.packs = self.packs.get(PACK_SIZE..).unwrap_or_default();
			number = number.wrapping_add(1);

			let Some(next) = self.peek() else { return Ok(None); };
			if next.sequence() != number {
				if next.block() == pack.block() {
					return Err(CddaError::CdTextSequence(number, next.sequence()));
				}

				// Numbering restarts with each language block. We only want
				// the first.
				self.packs = &[];
				break;
			}

			if next.id() != self.id || next.track() != self.track {
				// If a track was skipped, its (short) title is sitting in the
				// last pack right after ours.
				if next.id() == self.id && 1 < next.track().saturating_sub(pack.track()) {
					if let Some(nul) = pack.text().iter().position(|&b| b == 0) {
						if nul + 1 < TEXT_SIZE { self.carry = nul + 1; }
					}
				}
				break;
			}

			pack = next;
		}

		text.truncate(len);
		Ok(Some(PackField {
			id: self.id,
			track: self.track,
			double_byte,
			text,
			raw,
		}))
	}
}

impl PackParser<'_> {
	/// # Peek.
	fn peek(&self) -> Option<Pack> { Pack::from_slice(self.packs) }

	/// # Resume Hidden Title.
	///
	/// Pull the next track's title out of the last pack, and figure out if
	/// there is yet another one after it.
	fn resume(&mut self, next: &Pack) -> PackField {
		self.track = self.track.wrapping_add(1);

		let (text, raw, double_byte) = self.last.as_ref().map_or_else(
			|| (Vec::new(), Vec::new(), false),
			|last| {
				let tail = &last.text()[self.carry.min(TEXT_SIZE)..];
				(tail[..strnlen(tail)].to_vec(), tail.to_vec(), last.double_byte())
			}
		);

		if next.track().wrapping_sub(self.track) == 1 { self.carry = 0; }
		else {
			self.carry += text.len() + 1;
			if TEXT_SIZE <= self.carry { self.carry = 0; }
		}

		PackField {
			id: self.id,
			track: self.track,
			double_byte,
			text,
			raw,
		}
	}
}

impl Iterator for PackParser<'_> {
	type Item = Result<PackField, CddaError>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done { return None; }
		match self.next_field() {
			Ok(Some(field)) => Some(Ok(field)),
			Ok(None) => {
				self.done = true;
				None
			},
			Err(e) => {
				self.done = true;
				Some(Err(e))
			},
		}
	}
}

impl std::iter::FusedIterator for PackParser<'_> {}



/// # String Length.
///
/// Return the position of the first NUL, or the full length if there isn't
/// one.
fn strnlen(src: &[u8]) -> usize {
	src.iter().position(|&b| b == 0).unwrap_or(src.len())
}
